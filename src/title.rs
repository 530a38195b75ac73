//! Title composition
//!
//! Builds a video title from a theme and the channel's tag names: random tags
//! are appended as ` #tag` until the 100-character limit would be exceeded.
//! Lengths are counted in Unicode scalar values, not bytes.

use rand::Rng;

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: usize = 100;

/// Append random tags from `tag_names` to `theme` while staying within the
/// character limit. Each tag is used at most once; a tag that would push the
/// title past the limit ends composition.
pub fn compose_title(theme: &str, mut tag_names: Vec<String>) -> String {
    let mut title = theme.to_string();
    let mut rng = rand::thread_rng();

    while title.chars().count() < TITLE_MAX_CHARS && !tag_names.is_empty() {
        let index = rng.gen_range(0..tag_names.len());
        let suffix = format!(" #{}", tag_names.swap_remove(index));
        if title.chars().count() + suffix.chars().count() > TITLE_MAX_CHARS {
            break;
        }
        title.push_str(&suffix);
    }

    title
}
