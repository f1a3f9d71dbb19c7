//! Defines the [`TagIndex`], the mapping from each tag to the posts carrying
//! it.

use std::collections::BTreeMap;

use crate::post::Post;

/// Maps each tag name to the posts tagged with it. Keys iterate in ascending
/// order and each tag's posts keep the order of the slice they were indexed
/// from.
pub type TagIndex<'a> = BTreeMap<String, Vec<&'a Post>>;

/// Indexes `posts` by tag. Posts without tags don't appear in the index.
pub fn index_tags(posts: &[Post]) -> TagIndex<'_> {
    let mut index = TagIndex::new();
    for post in posts {
        for tag in &post.tags {
            index.entry(tag.clone()).or_insert_with(Vec::new).push(post);
        }
    }
    index
}
