//! Exports [`generate`], which turns a tag index into one [`FeedPage`] per
//! tag.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::layout::{self, LayoutLoader};
use crate::page::FeedPage;

/// Configuration for tag feed generation (the `tag_feeds` section of the
/// project file).
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TagFeeds {
    /// Whether to generate tag feeds at all.
    pub enabled: bool,

    /// The name of the layout supplying each feed page's defaults.
    pub layout: String,
}

impl Default for TagFeeds {
    fn default() -> Self {
        TagFeeds {
            enabled: true,
            layout: String::from("atom"),
        }
    }
}

/// Creates one [`FeedPage`] for each key of `index`, in key order. The layout
/// named by `config` is loaded once, before any page is created, so a missing
/// layout fails the whole step without producing pages. Returns no pages
/// (and doesn't touch `layouts`) when tag feeds are disabled.
///
/// The pages are returned rather than stored; it's up to the caller to add
/// them to its page collection. Adding the result of two calls to the same
/// collection yields duplicate pages with identical output paths.
pub fn generate<V>(
    index: &BTreeMap<String, V>,
    layouts: &dyn LayoutLoader,
    config: &TagFeeds,
) -> layout::Result<Vec<FeedPage>> {
    if !config.enabled {
        info!("tag feeds disabled; skipping");
        return Ok(Vec::new());
    }

    let layout = layouts.load(&config.layout)?;
    let pages: Vec<FeedPage> = index
        .keys()
        .map(|tag| {
            let page = FeedPage::for_tag(tag, &layout);
            debug!(tag = %tag, path = %page.output_path.display(), "tag feed page");
            page
        })
        .collect();

    info!(tags = pages.len(), layout = %config.layout, "generated tag feed pages");
    Ok(pages)
}
