use super::extract::leaf_texts;
use crate::models::DocumentNode;

/// Description length used for previews and page metadata.
pub const DESCRIPTION_LENGTH: usize = 150;

pub const OMISSION: &str = "...";

/// Concatenate `fragments` and cap the result at `max_length` characters.
///
/// Lengths are counted in chars. When the text is too long the tail is
/// replaced by `omission` so the result is exactly `max_length` chars; a
/// marker longer than the limit is itself cut to `max_length`. Fragments are
/// pulled only until the limit is known to be exceeded.
pub fn build_summary<I, S>(fragments: I, max_length: usize, omission: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    let mut count = 0usize;
    let mut truncated = false;

    'fragments: for fragment in fragments {
        for ch in fragment.as_ref().chars() {
            if count == max_length {
                truncated = true;
                break 'fragments;
            }
            text.push(ch);
            count += 1;
        }
    }

    if !truncated {
        return text;
    }

    let marker_len = omission.chars().count();
    if max_length < marker_len {
        return omission.chars().take(max_length).collect();
    }

    let mut summary: String = text.chars().take(max_length - marker_len).collect();
    summary.push_str(omission);
    summary
}

/// Plain-text summary of a document tree, walking only as far as needed.
pub fn summarize_document(root: &DocumentNode, max_length: usize, omission: &str) -> String {
    build_summary(leaf_texts(root), max_length, omission)
}
