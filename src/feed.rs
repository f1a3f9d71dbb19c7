//! Support for creating a tag's Atom feed from its posts. Used when the feed
//! layout has no body of its own.

use std::fmt;
use std::io::Write;

use atom_syndication::{
    CategoryBuilder, ContentBuilder, EntryBuilder, Error as AtomError, Feed, FeedBuilder,
    FixedDateTime, GeneratorBuilder, LinkBuilder, Person, PersonBuilder, Text,
};
use chrono::{DateTime, ParseError, Utc};
use url::Url;

use crate::config::Author;
use crate::post::Post;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: String,

    /// The feed's own URL, which doubles as its ID.
    pub id: Url,

    pub author: Option<&'a Author>,
    pub home_page: &'a Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: FeedConfig, posts: &[&Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[&Post]) -> Result<Feed> {
    let entries = posts
        .iter()
        .map(|post| {
            let date = parse_date(&post.date)?;
            let (summary, _) = post.summary();
            Ok(EntryBuilder::default()
                .id(post.url.to_string())
                .title(post.title.as_str())
                .updated(date)
                .published(Some(date))
                .authors(author_to_people(config.author))
                .links(vec![LinkBuilder::default()
                    .href(post.url.to_string())
                    .rel("alternate")
                    .build()])
                .categories(
                    post.tags
                        .iter()
                        .map(|tag| CategoryBuilder::default().term(tag.as_str()).build())
                        .collect::<Vec<_>>(),
                )
                .summary(Some(Text::html(summary)))
                .content(Some(
                    ContentBuilder::default()
                        .value(Some(post.body.clone()))
                        .content_type(Some(String::from("html")))
                        .build(),
                ))
                .build())
        })
        .collect::<Result<Vec<_>>>()?;

    // a feed is as fresh as its newest entry; an empty one is fresh now
    let updated = entries
        .iter()
        .map(|entry| *entry.updated())
        .max()
        .unwrap_or_else(|| Utc::now().into());

    Ok(FeedBuilder::default()
        .title(config.title)
        .id(config.id.to_string())
        .updated(updated)
        .authors(author_to_people(config.author))
        .generator(Some(
            GeneratorBuilder::default()
                .value(env!("CARGO_PKG_NAME"))
                .version(Some(String::from(env!("CARGO_PKG_VERSION"))))
                .build(),
        ))
        .links(vec![
            LinkBuilder::default()
                .href(config.home_page.to_string())
                .rel("alternate")
                .build(),
            LinkBuilder::default()
                .href(config.id.to_string())
                .rel("self")
                .build(),
        ])
        .entries(entries)
        .build())
}

/// Parses a post date. Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS ±ZZZZ`
/// timestamps, and bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_date(date: &str) -> Result<FixedDateTime> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(date) {
        return Ok(date_time);
    }
    if let Ok(date_time) = DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(date_time);
    }
    Ok(DateTime::parse_from_str(
        &format!("{} 00:00:00 +0000", date),
        "%Y-%m-%d %H:%M:%S %z",
    )?)
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![PersonBuilder::default()
            .name(author.name.as_str())
            .email(author.email.clone())
            .build()],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude Atom and date-time
/// parsing issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is an Atom-related error, including I/O errors
    /// writing the feed.
    Atom(AtomError),

    /// Returned when there is an issue parsing a post's date.
    DateTimeParse(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Atom(err) => write!(f, "{}", err),
            Error::DateTimeParse(err) => write!(f, "parsing post date: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Atom(err) => Some(err),
            Error::DateTimeParse(err) => Some(err),
        }
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: ParseError) -> Error {
        Error::DateTimeParse(err)
    }
}
