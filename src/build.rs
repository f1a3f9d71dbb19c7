//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the tag feeds: parsing the posts ([`crate::post`]),
//! indexing them by tag ([`crate::tag`]), generating one feed page per tag
//! ([`crate::generator`]), and rendering each page to disk
//! ([`crate::render`]).

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::generator::{generate, TagFeeds};
use crate::layout::{Error as LayoutError, LayoutDirectory, LayoutLoader};
use crate::page::FeedPage;
use crate::post::{Error as ParseError, Parser as PostParser, Post};
use crate::render::{Error as RenderError, Renderer};
use crate::tag::{index_tags, TagIndex};

/// The in-memory state of one build: the tag index and the pages scheduled
/// for rendering.
pub struct Site<'a> {
    pub tags: TagIndex<'a>,
    pub pages: Vec<FeedPage>,
}

impl<'a> Site<'a> {
    /// Indexes `posts` by tag. The site starts with no pages.
    pub fn new(posts: &'a [Post]) -> Site<'a> {
        Site {
            tags: index_tags(posts),
            pages: Vec::new(),
        }
    }

    /// Generates a feed page per tag and adds them to [`Site::pages`].
    /// Returns the number of pages added. On error, no pages are added.
    /// Running this more than once adds duplicate pages.
    pub fn generate_tag_feeds(
        &mut self,
        layouts: &dyn LayoutLoader,
        config: &TagFeeds,
    ) -> Result<usize> {
        let pages = generate(&self.tags, layouts, config)?;
        let generated = pages.len();
        self.pages.extend(pages);
        Ok(generated)
    }

    /// Renders each page in [`Site::pages`] to its output path under
    /// `output_directory`. Pages sharing an output path overwrite each other;
    /// the last one wins. Pages whose output path would leave
    /// `output_directory` (e.g., for the tag `..`) are an [`Error::UnsafePath`].
    pub fn write_pages(&self, renderer: &Renderer, output_directory: &Path) -> Result<()> {
        for page in &self.pages {
            if !page
                .output_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
            {
                return Err(Error::UnsafePath(page.output_path.clone()));
            }
            let path = output_directory.join(&page.output_path);
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let posts = self.tags.get(&page.tag).map(Vec::as_slice).unwrap_or(&[]);
            let mut w = BufWriter::new(File::create(&path)?);
            renderer
                .render(page, posts, &mut w)
                .map_err(|err| Error::Render {
                    path: path.clone(),
                    err,
                })?;
            w.flush()?;
            debug!(path = %path.display(), posts = posts.len(), "wrote tag feed");
        }
        Ok(())
    }
}

/// Builds the tag feeds from a [`Config`] object and returns the number of
/// feeds written. Feed files left over from previous builds are removed
/// first; anything else under the output's `tag` directory is left alone.
pub fn build_site(config: &Config) -> Result<usize> {
    let post_parser = PostParser::new(&config.posts_url);
    let posts = post_parser.parse_posts(&config.posts_source_directory)?;
    info!(posts = posts.len(), "parsed posts");

    let mut site = Site::new(&posts);
    info!(tags = site.tags.len(), "indexed tags");

    // tag discovery must be complete before the generator runs
    let layouts = LayoutDirectory::new(&config.layouts_directory);
    site.generate_tag_feeds(&layouts, &config.tag_feeds)?;

    remove_stale_feeds(&config.output_directory.join(FeedPage::BASE_DIRECTORY))?;

    let renderer = Renderer {
        title: &config.title,
        site_root: &config.site_root,
        author: config.author.as_ref(),
    };
    site.write_pages(&renderer, &config.output_directory)?;
    info!(
        feeds = site.pages.len(),
        output = %config.output_directory.display(),
        "build complete"
    );
    Ok(site.pages.len())
}

// Deletes every `feed.xml` under `dir`, then any directories left empty.
fn remove_stale_feeds(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for result in WalkDir::new(dir).contents_first(true) {
        let entry = result.map_err(|err| Error::Clean {
            path: dir.to_owned(),
            err: err.into(),
        })?;
        let path = entry.path();
        let clean = |err| Error::Clean {
            path: path.to_owned(),
            err,
        };
        if entry.file_type().is_file() && entry.file_name() == FeedPage::FILE_NAME {
            std::fs::remove_file(path).map_err(clean)?;
            debug!(path = %path.display(), "removed stale feed");
        } else if entry.file_type().is_dir()
            && std::fs::read_dir(path).map_err(clean)?.next().is_none()
        {
            std::fs::remove_dir(path).map_err(clean)?;
        }
    }
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, layout
/// loading, rendering, cleaning output directories, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned when the feed layout can't be loaded.
    Layout(LayoutError),

    /// Returned for errors rendering a page to `path`.
    Render { path: PathBuf, err: RenderError },

    /// Returned when a page's output path isn't a plain relative path.
    UnsafePath(PathBuf),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Layout(err) => write!(f, "{}", err),
            Error::Render { path, err } => {
                write!(f, "Rendering '{}': {}", path.display(), err)
            }
            Error::UnsafePath(path) => {
                write!(f, "Refusing to write outside the output directory: '{}'", path.display())
            }
            Error::Clean { path, err } => {
                write!(f, "Cleaning '{}': {}", path.display(), err)
            }
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Layout(err) => Some(err),
            Error::Render { path: _, err } => Some(err),
            Error::UnsafePath(_) => None,
            Error::Clean { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Error {
        Error::Layout(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::{Layout, LayoutMap};
    use std::collections::BTreeSet;
    use tempfile::TempDir;
    use url::Url;

    fn post(id: &str, tags: &[&str]) -> Post {
        Post {
            id: id.to_owned(),
            title: id.to_owned(),
            date: String::from("2021-01-01"),
            url: Url::parse(&format!("https://example.com/posts/{}.html", id)).unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            body: String::new(),
        }
    }

    fn layouts() -> LayoutMap {
        let mut layouts = LayoutMap::new();
        layouts.insert("atom", Layout::parse("{{ len .posts }}").unwrap());
        layouts
    }

    #[test]
    fn test_generate_tag_feeds() -> Result<()> {
        let posts = vec![post("post1", &["go"]), post("post2", &["go", "rust"])];
        let mut site = Site::new(&posts);
        assert_eq!(2, site.generate_tag_feeds(&layouts(), &TagFeeds::default())?);
        assert_eq!(2, site.pages.len());
        Ok(())
    }

    #[test]
    fn test_generate_tag_feeds_twice_duplicates() -> Result<()> {
        let posts = vec![post("post1", &["go"])];
        let mut site = Site::new(&posts);
        site.generate_tag_feeds(&layouts(), &TagFeeds::default())?;
        site.generate_tag_feeds(&layouts(), &TagFeeds::default())?;
        assert_eq!(2, site.pages.len());
        assert_eq!(site.pages[0].output_path, site.pages[1].output_path);
        Ok(())
    }

    #[test]
    fn test_generate_tag_feeds_missing_layout() {
        let posts = vec![post("post1", &["go"])];
        let mut site = Site::new(&posts);
        assert!(matches!(
            site.generate_tag_feeds(&LayoutMap::new(), &TagFeeds::default()),
            Err(Error::Layout(LayoutError::NotFound { .. }))
        ));
        assert!(site.pages.is_empty());
    }

    #[test]
    fn test_write_pages() -> Result<()> {
        let out = TempDir::new()?;
        let posts = vec![post("post1", &["go"]), post("post2", &["go", "rust"])];
        let mut site = Site::new(&posts);
        site.generate_tag_feeds(&layouts(), &TagFeeds::default())?;

        let site_root = Url::parse("https://example.com/").unwrap();
        let renderer = Renderer {
            title: "Example",
            site_root: &site_root,
            author: None,
        };
        site.write_pages(&renderer, out.path())?;

        let read = |tag: &str| {
            std::fs::read_to_string(out.path().join("tag").join(tag).join("feed.xml"))
        };
        assert_eq!("2", read("go")?);
        assert_eq!("1", read("rust")?);
        Ok(())
    }

    #[test]
    fn test_write_pages_unsafe_path() -> Result<()> {
        let out = TempDir::new()?;
        let posts = vec![post("post1", &[".."])];
        let mut site = Site::new(&posts);
        site.generate_tag_feeds(&layouts(), &TagFeeds::default())?;

        let site_root = Url::parse("https://example.com/").unwrap();
        let renderer = Renderer {
            title: "Example",
            site_root: &site_root,
            author: None,
        };
        assert!(matches!(
            site.write_pages(&renderer, out.path()),
            Err(Error::UnsafePath(_))
        ));
        assert!(!out.path().join("feed.xml").exists());
        Ok(())
    }

    #[test]
    fn test_remove_stale_feeds() -> Result<()> {
        let out = TempDir::new()?;
        let tag = out.path().join("tag");
        for dir in &["go", "old", "nested/deep"] {
            std::fs::create_dir_all(tag.join(dir))?;
            std::fs::write(tag.join(dir).join("feed.xml"), "old")?;
        }
        std::fs::write(tag.join("go").join("index.html"), "tag page")?;

        remove_stale_feeds(&tag)?;

        assert!(!tag.join("go").join("feed.xml").exists());
        assert!(tag.join("go").join("index.html").exists());
        assert!(!tag.join("old").exists());
        assert!(!tag.join("nested").exists());
        Ok(())
    }

    #[test]
    fn test_remove_stale_feeds_missing_directory() -> Result<()> {
        let out = TempDir::new()?;
        remove_stale_feeds(&out.path().join("tag"))
    }
}
