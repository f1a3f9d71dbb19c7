//! Defines the [`Layout`] type and the [`LayoutLoader`] trait through which
//! layouts are located. A layout is a template file whose optional YAML
//! frontmatter supplies default metadata for every page built from it, e.g.
//! `_layouts/atom.html`:
//!
//! ```text
//! ---
//! title: Posts tagged
//! ---
//! <feed xmlns="http://www.w3.org/2005/Atom">...</feed>
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;
use tracing::debug;

use crate::frontmatter::{self, MissingEndFence};

/// The extensions tried, in order, when resolving a layout name to a file.
const EXTENSIONS: &[&str] = &["html", "xml"];

/// A parsed layout: its frontmatter and the template text that follows it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    /// The frontmatter mapping. Empty if the layout has no frontmatter.
    pub metadata: Mapping,

    /// Everything after the frontmatter.
    pub body: String,
}

impl Layout {
    /// Parses a layout from the contents of a layout file.
    pub fn parse(input: &str) -> Result<Layout> {
        match frontmatter::split(input)? {
            None => Ok(Layout {
                metadata: Mapping::new(),
                body: input.to_owned(),
            }),
            Some((yaml, body)) => Ok(Layout {
                metadata: match yaml.trim().is_empty() {
                    true => Mapping::new(),
                    false => serde_yaml::from_str(yaml)?,
                },
                body: body.to_owned(),
            }),
        }
    }
}

/// Resolves layout names to [`Layout`]s.
pub trait LayoutLoader {
    /// Loads the layout called `name`. A layout that doesn't exist is an
    /// [`Error::NotFound`].
    fn load(&self, name: &str) -> Result<Layout>;
}

/// Loads layouts from files in a directory (conventionally `_layouts`). The
/// layout `atom` resolves to `{directory}/atom.html`, or `{directory}/atom.xml`
/// if there is no HTML file.
pub struct LayoutDirectory {
    directory: PathBuf,
}

impl LayoutDirectory {
    pub fn new<P: Into<PathBuf>>(directory: P) -> LayoutDirectory {
        LayoutDirectory {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl LayoutLoader for LayoutDirectory {
    fn load(&self, name: &str) -> Result<Layout> {
        for extension in EXTENSIONS {
            let path = self.directory.join(format!("{}.{}", name, extension));
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    debug!(layout = name, path = %path.display(), "loaded layout");
                    return Layout::parse(&contents).map_err(|e| {
                        Error::Annotated(
                            format!("parsing layout `{}`", path.display()),
                            Box::new(e),
                        )
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Err(Error::NotFound {
            name: name.to_owned(),
            directory: self.directory.clone(),
        })
    }
}

/// Holds layouts in memory, keyed by name.
#[derive(Default)]
pub struct LayoutMap(HashMap<String, Layout>);

impl LayoutMap {
    pub fn new() -> LayoutMap {
        LayoutMap::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, layout: Layout) {
        self.0.insert(name.into(), layout);
    }
}

impl LayoutLoader for LayoutMap {
    fn load(&self, name: &str) -> Result<Layout> {
        self.0.get(name).cloned().ok_or_else(|| Error::NotFound {
            name: name.to_owned(),
            directory: PathBuf::new(),
        })
    }
}

/// Represents the result of loading a [`Layout`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Layout`].
#[derive(Debug)]
pub enum Error {
    /// Returned when no layout with the requested name exists.
    NotFound { name: String, directory: PathBuf },

    /// Returned when the layout opens a frontmatter block without closing it.
    MissingEndFence,

    /// Returned when the frontmatter isn't a YAML mapping.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound { name, directory } => write!(
                f,
                "Layout `{}` not found in '{}'",
                name,
                directory.display()
            ),
            Error::MissingEndFence => write!(f, "{}", MissingEndFence),
            Error::DeserializeYaml(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound { .. } => None,
            Error::MissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<MissingEndFence> for Error {
    fn from(_: MissingEndFence) -> Error {
        Error::MissingEndFence
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
