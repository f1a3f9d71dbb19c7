//! Renders [`FeedPage`]s into feed documents. A page whose layout has a body
//! is rendered by applying the body as a [`gtmpl`] template; a page whose
//! layout body is blank is rendered as a built-in Atom feed (see
//! [`crate::feed`]).
//!
//! Templates see the following fields:
//!
//! * `.page`: the page metadata (the layout's frontmatter plus `tag`)
//! * `.url`: the URL of the feed itself
//! * `.site`: an object with the site's `title`, `url`, and `author`
//! * `.posts`: the posts carrying the page's tag, newest first, each with
//!   `id`, `title`, `date`, `url`, `summary`, `summarized`, `body`, and `tags`
//! * `.updated`: the RFC 3339 timestamp of the newest post (empty if the date
//!   can't be parsed)

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use gtmpl_value::Value;
use serde_yaml::Value as YamlValue;
use url::Url;

use crate::config::Author;
use crate::feed::{self, FeedConfig};
use crate::page::FeedPage;
use crate::post::Post;

/// Responsible for rendering [`FeedPage`]s with site-wide context.
pub struct Renderer<'a> {
    /// The site title, available to templates and used as the prefix of
    /// built-in feed titles.
    pub title: &'a str,

    /// The root URL of the site; page URLs are resolved against it.
    pub site_root: &'a Url,

    /// The author credited in built-in feeds.
    pub author: Option<&'a Author>,
}

impl Renderer<'_> {
    /// Returns the public URL of `page`.
    pub fn page_url(&self, page: &FeedPage) -> Result<Url> {
        let segments: Vec<String> = page
            .output_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(self.site_root.join(&segments.join("/"))?)
    }

    /// Renders `page` to `w`. `posts` are the posts carrying the page's tag.
    pub fn render<W: Write>(&self, page: &FeedPage, posts: &[&Post], mut w: W) -> Result<()> {
        let url = self.page_url(page)?;
        if page.template.trim().is_empty() {
            let title = match page.metadata.get("title") {
                Some(YamlValue::String(title)) => format!("{}: {}", title, page.tag),
                _ => format!("{}: {}", self.title, page.tag),
            };
            feed::write_feed(
                FeedConfig {
                    title,
                    id: url,
                    author: self.author,
                    home_page: self.site_root,
                },
                posts,
                w,
            )?;
            return Ok(());
        }

        if let Some(offset) = unclosed_action(&page.template) {
            return Err(Error::Template(format!(
                "rendering `{}`: unclosed action at byte {}",
                page.tag, offset
            )));
        }
        let output = gtmpl::template(&page.template, self.context(page, &url, posts))
            .map_err(|e| Error::Template(format!("rendering `{}`: {}", page.tag, e)))?;
        w.write_all(output.as_bytes())?;
        Ok(())
    }

    fn context(&self, page: &FeedPage, url: &Url, posts: &[&Post]) -> Value {
        let mut site: HashMap<String, Value> = HashMap::new();
        site.insert("title".to_owned(), Value::String(self.title.to_owned()));
        site.insert("url".to_owned(), Value::String(self.site_root.to_string()));
        site.insert(
            "author".to_owned(),
            match self.author {
                Some(author) => {
                    let mut m: HashMap<String, Value> = HashMap::new();
                    m.insert("name".to_owned(), Value::String(author.name.clone()));
                    m.insert(
                        "email".to_owned(),
                        match &author.email {
                            Some(email) => Value::String(email.clone()),
                            None => Value::Nil,
                        },
                    );
                    Value::Object(m)
                }
                None => Value::Nil,
            },
        );

        let updated = posts
            .first()
            .and_then(|post| feed::parse_date(&post.date).ok())
            .map(|date| date.to_rfc3339())
            .unwrap_or_default();

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "page".to_owned(),
            yaml_to_value(&YamlValue::Mapping(page.metadata.clone())),
        );
        m.insert("url".to_owned(), Value::String(url.to_string()));
        m.insert("site".to_owned(), Value::Object(site));
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(|post| post_to_value(post)).collect()),
        );
        m.insert("updated".to_owned(), Value::String(updated));
        Value::Object(m)
    }
}

// gtmpl never returns on an action missing its `}}`, so templates are checked
// up front. Returns the offset of the first `{{` with no `}}` after it.
fn unclosed_action(template: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(start) = template[offset..].find("{{") {
        let open = offset + start + 2;
        match template[open..].find("}}") {
            Some(end) => offset = open + end + 2,
            None => return Some(open - 2),
        }
    }
    None
}

fn post_to_value(post: &Post) -> Value {
    let (summary, summarized) = post.summary();
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), Value::String(post.id.clone()));
    m.insert("title".to_owned(), Value::String(post.title.clone()));
    m.insert("date".to_owned(), Value::String(post.date.clone()));
    m.insert("url".to_owned(), Value::String(post.url.to_string()));
    m.insert("summary".to_owned(), Value::String(summary.to_owned()));
    m.insert("summarized".to_owned(), Value::Bool(summarized));
    m.insert("body".to_owned(), Value::String(post.body.clone()));
    m.insert(
        "tags".to_owned(),
        Value::Array(post.tags.iter().map(|t| Value::String(t.clone())).collect()),
    );
    Value::Object(m)
}

/// Converts frontmatter into a template value. Non-string mapping keys are
/// stringified; YAML tags are dropped.
fn yaml_to_value(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Nil,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Value::from(i),
            (None, Some(u), _) => Value::from(u),
            (None, None, Some(f)) => Value::from(f),
            (None, None, None) => Value::String(n.to_string()),
        },
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::Array(items.iter().map(yaml_to_value).collect()),
        YamlValue::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| Some((key_to_string(k)?, yaml_to_value(v))))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

fn key_to_string(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a [`FeedPage`].
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error building the built-in feed.
    Feed(feed::Error),

    /// Returned when the page URL can't be built.
    UrlParse(url::ParseError),

    /// An error writing the output.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "{}", err),
            Error::Feed(err) => write!(f, "{}", err),
            Error::UrlParse(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Feed(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<feed::Error> for Error {
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
