//! The library code for `tagatom`, which generates an Atom feed for every tag
//! used across a blog's posts. A build runs in four steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::post`]), which is
//!    where tags are discovered
//! 2. Indexing the posts by tag ([`crate::tag`])
//! 3. Generating one feed page per tag ([`crate::generator`]), each at
//!    `tag/{tag}/feed.xml` and each seeded from the shared `atom` layout
//!    ([`crate::layout`])
//! 4. Rendering every page to disk ([`crate::render`])
//!
//! The third step is the heart of it and is deliberately small: a
//! [`page::FeedPage`] is plain data, and [`generator::generate`] takes the tag
//! index and a layout loader explicitly and hands back the pages instead of
//! registering them anywhere. [`build::Site`] plays the part of the page
//! collection.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
mod frontmatter;
pub mod generator;
pub mod layout;
pub mod logging;
mod markdown;
pub mod page;
pub mod post;
pub mod render;
pub mod tag;
mod util;
