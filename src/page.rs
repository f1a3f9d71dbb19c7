//! Defines [`FeedPage`], the output page synthesized for a single tag.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::layout::Layout;

/// One tag's feed page. Carries everything [`crate::render`] needs to produce
/// the feed document for the tag.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedPage {
    /// The tag this feed covers.
    pub tag: String,

    /// The output location relative to the site's output root, always
    /// `tag/{tag}/feed.xml`.
    pub output_path: PathBuf,

    /// The layout's frontmatter with `tag` set to [`FeedPage::tag`].
    pub metadata: Mapping,

    /// The layout body with which the page is rendered.
    pub template: String,
}

impl FeedPage {
    /// The directory under which every tag's feed directory lives.
    pub const BASE_DIRECTORY: &'static str = "tag";

    /// The file name of every feed page.
    pub const FILE_NAME: &'static str = "feed.xml";

    /// Builds the feed page for `tag` in `{base}/{tag}/feed.xml` from
    /// `layout`. Any `tag` key in the layout's frontmatter is overwritten. The
    /// tag itself isn't validated; tag discovery is expected to hand over
    /// path-safe names.
    pub fn new(base: &Path, tag: &str, layout: &Layout) -> FeedPage {
        let mut metadata = layout.metadata.clone();
        metadata.insert(Value::from("tag"), Value::from(tag));
        FeedPage {
            tag: tag.to_owned(),
            output_path: base.join(tag).join(Self::FILE_NAME),
            metadata,
            template: layout.body.clone(),
        }
    }

    /// Builds the feed page for `tag` in the conventional `tag/` directory.
    pub fn for_tag(tag: &str, layout: &Layout) -> FeedPage {
        FeedPage::new(Path::new(Self::BASE_DIRECTORY), tag, layout)
    }
}
