//! Defines the [`Post`] and [`Parser`] types and the logic for parsing posts
//! from the file system into memory. Tag discovery happens here: tags are
//! kept as written in a post's frontmatter (trimmed, empty ones dropped), so
//! `R` and `r` are distinct tags with distinct feeds.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use walkdir::WalkDir;

use crate::feed;
use crate::frontmatter::{self, MissingEndFence};
use crate::markdown;

const MARKDOWN_EXTENSION: &str = "md";

/// The marker separating a post's summary from the rest of its body.
const FOLD_TAG: &str = "<!-- more -->";

/// A blog post parsed from a markdown source file.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The path of the source file relative to the posts directory, less the
    /// extension (e.g., `2021/hello` for `{posts}/2021/hello.md`).
    pub id: String,

    /// The title of the post.
    pub title: String,

    /// The date of the post, as written in the frontmatter. Posts without a
    /// `date` field take it from a `YYYY-MM-DD-` file name prefix.
    pub date: String,

    /// The URL of the rendered post, `{posts_url}/{id}.html`.
    pub url: Url,

    /// The tags of the post, as written.
    pub tags: BTreeSet<String>,

    /// The post body, rendered to HTML.
    pub body: String,
}

impl Post {
    /// Returns the portion of the body before the fold (`<!-- more -->`) and
    /// whether the body was in fact folded.
    pub fn summary(&self) -> (&str, bool) {
        match self.body.find(FOLD_TAG) {
            Some(i) => (&self.body[..i], true),
            None => (&self.body, false),
        }
    }
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{post_id}.html`).
    posts_url: &'a Url,
}

impl<'a> Parser<'a> {
    pub fn new(posts_url: &'a Url) -> Parser<'a> {
        Parser { posts_url }
    }

    /// Parses a single [`Post`] from its `id` and source text. The source must
    /// be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally `tags`
    ///    (`date` may be omitted if the file name starts with `YYYY-MM-DD-`)
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body (markdown)
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_post(&self, id: &str, input: &str) -> Result<Post> {
        let (yaml, body) =
            frontmatter::split(input)?.ok_or(Error::FrontmatterMissingStartFence)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;

        let date = match frontmatter.date {
            Some(date) => date,
            None => date_from_id(id).ok_or(Error::MissingDate)?,
        };

        let mut post = Post {
            id: id.to_owned(),
            title: frontmatter.title,
            date,
            url: self.posts_url.join(&format!("{}.html", id))?,
            tags: frontmatter
                .tags
                .map(TagList::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
            body: String::new(),
        };
        markdown::to_html(&mut post.body, body);
        Ok(post)
    }

    /// Searches `source_directory` (recursively) for post files (extension =
    /// `.md`) and returns them sorted by date, most recent first. Dates that
    /// can't be parsed sort after all others, by their text.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION)
            {
                continue;
            }

            // strip_prefix() should never fail; WalkDir yields descendants of
            // `source_directory`
            let relative = path
                .strip_prefix(source_directory)
                .map_err(|_| InvalidFileNameError(path.to_owned()))?;
            let id = post_id(relative)?;
            let contents = std::fs::read_to_string(path)?;
            let post = self.parse_post(&id, &contents).map_err(|e| {
                Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e))
            })?;
            debug!(post = %post.id, tags = post.tags.len(), "parsed post");
            posts.push(post);
        }

        posts.sort_by_cached_key(|post| {
            Reverse((feed::parse_date(&post.date).ok(), post.date.clone()))
        });
        Ok(posts)
    }
}

// Builds a post ID from a path relative to the posts directory:
// `2021/hello.md` becomes `2021/hello` regardless of platform separator.
fn post_id(relative: &Path) -> Result<String> {
    let without_extension = relative.with_extension("");
    let mut segments = Vec::new();
    for component in without_extension.components() {
        segments.push(
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| InvalidFileNameError(relative.to_owned()))?,
        );
    }
    Ok(segments.join("/"))
}

// Jekyll-style file names (`2021-04-16-hello.md`) carry the post date.
fn date_from_id(id: &str) -> Option<String> {
    let file_name = id.rsplit('/').next()?;
    let prefix = file_name.get(..10)?;
    if !file_name[10..].starts_with('-') {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .ok()
        .map(|_| prefix.to_owned())
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(alias = "Title")]
    title: String,

    #[serde(default, alias = "Date")]
    date: Option<String>,

    #[serde(default, alias = "Tags")]
    tags: Option<TagList>,
}

/// Tags may be written as a YAML sequence or as one space-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagList {
    Many(Vec<String>),
    One(String),
}

impl TagList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagList::Many(tags) => tags,
            TagList::One(tags) => tags.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when a post has no `date` field and its file name has no
    /// `YYYY-MM-DD-` prefix.
    MissingDate,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when there is a problem building the post URL.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => write!(f, "{}", MissingEndFence),
            Error::MissingDate => write!(f, "Post has no `date` and no date in its file name"),
            Error::DeserializeYaml(err) => write!(f, "{}", err),
            Error::UrlParse(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
            Error::WalkDir(err) => write!(f, "{}", err),
            Error::InvalidFileName(err) => write!(f, "{}", err),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::MissingDate => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<MissingEndFence> for Error {
    fn from(_: MissingEndFence) -> Error {
        Error::FrontmatterMissingEndFence
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
