//! Utility functions for Ingot

use std::borrow::Cow;

use md5::{Digest, Md5};

use crate::LOCK_KEY_PREFIX;

/// Derive the coordination key for a piece of content.
///
/// The key carries an MD5 digest rather than the raw content so that it stays
/// bounded for arbitrarily large items. A digest collision only makes two
/// different contents share a lock; the duplicate check still compares exact
/// content.
///
/// # Examples
///
/// ```
/// use ingot_common::content_lock_key;
///
/// assert_eq!(content_lock_key("foo"), content_lock_key("foo"));
/// assert_ne!(content_lock_key("foo"), content_lock_key("bar"));
/// assert!(content_lock_key("foo").starts_with("item-lock:"));
/// ```
pub fn content_lock_key(content: &str) -> String {
    let digest = Md5::digest(content.as_bytes());
    format!("{}{}", LOCK_KEY_PREFIX, const_hex::encode(digest.as_slice()))
}

/// Characters of content kept by [`content_preview`]
pub const CONTENT_PREVIEW_CHARS: usize = 64;

/// Content as shown in messages and logs, cut at a char boundary when long
pub fn content_preview(content: &str) -> Cow<'_, str> {
    match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((end, _)) => Cow::Owned(format!(
            "{}... ({} bytes)",
            &content[..end],
            content.len()
        )),
        None => Cow::Borrowed(content),
    }
}
