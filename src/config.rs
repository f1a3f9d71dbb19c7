//! Loads the project configuration from a `tagatom.yaml` file:
//!
//! ```yaml
//! title: My Blog
//! site_root: https://example.org/
//! author:
//!   name: Jane Doe
//!   email: jane@example.org
//! posts_directory: _posts
//! layouts_directory: _layouts
//! tag_feeds:
//!   enabled: true
//!   layout: atom
//! ```
//!
//! Only `title` and `site_root` are required. Relative directories are
//! resolved against the directory holding the project file.

use crate::generator::TagFeeds;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "tagatom.yaml";

/// The author credited in generated feeds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("_posts")
}

fn default_layouts_directory() -> PathBuf {
    PathBuf::from("_layouts")
}

#[derive(Deserialize)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default = "default_layouts_directory")]
    layouts_directory: PathBuf,

    #[serde(default)]
    tag_feeds: TagFeeds,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,

    /// The root URL of the site. Always ends in a slash.
    pub site_root: Url,

    /// The base URL for post pages, `{site_root}/posts/`.
    pub posts_url: Url,

    pub author: Option<Author>,
    pub posts_source_directory: PathBuf,
    pub layouts_directory: PathBuf,
    pub output_directory: PathBuf,
    pub tag_feeds: TagFeeds,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .map_err(|e| anyhow!("Loading configuration: {}", e))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        use crate::util::read;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Config::parse(&read(path, "project")?, project_root, output_directory)
    }

    /// Parses the contents of a project file. `project_root` is the
    /// directory against which relative directories are resolved.
    pub fn parse(input: &str, project_root: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_str(input)?;

        let mut site_root = project.site_root;
        if !site_root.path().ends_with('/') {
            let path = format!("{}/", site_root.path());
            site_root.set_path(&path);
        }

        Ok(Config {
            title: project.title,
            posts_url: site_root.join("posts/")?,
            site_root,
            author: project.author,
            posts_source_directory: project_root.join(project.posts_directory),
            layouts_directory: project_root.join(project.layouts_directory),
            output_directory: output_directory.to_owned(),
            tag_feeds: project.tag_feeds,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::parse(
            "title: My Blog\nsite_root: https://example.org/blog",
            Path::new("/project"),
            Path::new("/out"),
        )?;

        assert_eq!("My Blog", config.title);
        assert_eq!("https://example.org/blog/", config.site_root.as_str());
        assert_eq!("https://example.org/blog/posts/", config.posts_url.as_str());
        assert_eq!(None, config.author);
        assert_eq!(PathBuf::from("/project/_posts"), config.posts_source_directory);
        assert_eq!(PathBuf::from("/project/_layouts"), config.layouts_directory);
        assert_eq!(PathBuf::from("/out"), config.output_directory);
        assert_eq!(TagFeeds::default(), config.tag_feeds);
        Ok(())
    }

    #[test]
    fn test_custom() -> Result<()> {
        let config = Config::parse(
            "title: My Blog
site_root: https://example.org/
author: { name: Jane, email: jane@example.org }
posts_directory: content
layouts_directory: theme/layouts
tag_feeds:
  enabled: false
  layout: tagfeed
",
            Path::new("/project"),
            Path::new("/out"),
        )?;

        assert_eq!(
            Some(Author {
                name: String::from("Jane"),
                email: Some(String::from("jane@example.org")),
            }),
            config.author
        );
        assert_eq!(PathBuf::from("/project/content"), config.posts_source_directory);
        assert_eq!(PathBuf::from("/project/theme/layouts"), config.layouts_directory);
        assert!(!config.tag_feeds.enabled);
        assert_eq!("tagfeed", config.tag_feeds.layout);
        Ok(())
    }

    #[test]
    fn test_partial_tag_feeds() -> Result<()> {
        let config = Config::parse(
            "title: t\nsite_root: https://example.org/\ntag_feeds: { enabled: false }",
            Path::new("/project"),
            Path::new("/out"),
        )?;
        assert!(!config.tag_feeds.enabled);
        assert_eq!("atom", config.tag_feeds.layout);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "title: t\nsite_root: https://example.org/",
        )?;
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, Path::new("/out"))?;
        assert_eq!(dir.path().join("_posts"), config.posts_source_directory);
        Ok(())
    }

    #[test]
    fn test_missing_title() {
        assert!(Config::parse(
            "site_root: https://example.org/",
            Path::new("/project"),
            Path::new("/out"),
        )
        .is_err());
    }
}
