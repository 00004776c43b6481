//! Plain-text helpers for summaries: entity decoding, sentence spacing,
//! whitespace collapsing and word-boundary truncation.
//!
//! Byte limits are respected without ever cutting through a UTF-8 sequence
//! or a word.

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

/// Longest entity reference (`&CounterClockwiseContourIntegral;` and friends).
const MAX_ENTITY_LEN: usize = 40;

/// Decode HTML5 entities, leaving anything that isn't a valid reference as is.
///
/// Bodies are hand-written HTML, so a stray `&` is common and must not make
/// the rest of the text undecodable.
pub fn unescape_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let candidate = tail[1..]
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ENTITY_LEN)
            .find(|(_, c)| *c == ';' || *c == '&' || c.is_whitespace())
            .filter(|(_, c)| *c == ';')
            .map(|(i, _)| &tail[..i + 2]);

        match candidate.and_then(|entity| {
            unescape_with(entity, resolve_html5_entity)
                .ok()
                .map(|decoded| (entity.len(), decoded.into_owned()))
        }) {
            Some((consumed, decoded)) => {
                out.push_str(&decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Insert a space after a period glued to the start of the next sentence.
///
/// Stripping `</p><p>` leaves `end.Next`; numbers (`3.14`), file names
/// (`main.rs`) and abbreviations already followed by a space are untouched.
pub fn space_after_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '.' && chars.peek().is_some_and(|next| next.is_uppercase()) {
            out.push(' ');
        }
    }
    out
}

/// Collapse every whitespace run into one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate `text` to at most `max_bytes`, cutting only at whitespace.
///
/// Text that already fits is returned unchanged. Otherwise the result ends at
/// the last whitespace boundary inside the limit with trailing whitespace
/// removed. A single word longer than the limit truncates to `""`.
pub fn truncate_at_word(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    let word_ends_at_cut = text[cut..].chars().next().is_some_and(char::is_whitespace);
    let head = &text[..cut];
    if word_ends_at_cut {
        return head.trim_end();
    }

    match head.rfind(char::is_whitespace) {
        Some(pos) => head[..pos].trim_end(),
        None => "",
    }
}

/// First `max_bytes` of `text`, backing off to a character boundary.
pub fn prefix_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // unescape_entities
    // =========================================================================

    #[test]
    fn unescape_named_and_numeric() {
        assert_eq!(unescape_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape_entities("it&#39;s &hellip;"), "it's …");
        assert_eq!(unescape_entities("&eacute;t&eacute;"), "été");
    }

    #[test]
    fn unescape_keeps_stray_ampersands() {
        assert_eq!(unescape_entities("R&D &amp; more"), "R&D & more");
        assert_eq!(unescape_entities("a & b"), "a & b");
        assert_eq!(unescape_entities("trailing &"), "trailing &");
        assert_eq!(unescape_entities("&notanentity;"), "&notanentity;");
    }

    #[test]
    fn unescape_borrows_when_nothing_to_do() {
        assert!(matches!(unescape_entities("plain"), Cow::Borrowed(_)));
    }

    // =========================================================================
    // space_after_sentences
    // =========================================================================

    #[test]
    fn spaces_glued_sentences() {
        assert_eq!(space_after_sentences("One.Two.Three"), "One. Two. Three");
    }

    #[test]
    fn leaves_numbers_and_spaced_sentences() {
        assert_eq!(space_after_sentences("Pi is 3.14. Done"), "Pi is 3.14. Done");
        assert_eq!(space_after_sentences("see main.rs"), "see main.rs");
    }

    // =========================================================================
    // truncate_at_word
    // =========================================================================

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_at_word("hello world", 400), "hello world");
        assert_eq!(truncate_at_word("", 10), "");
    }

    #[test]
    fn cuts_back_to_whitespace() {
        assert_eq!(truncate_at_word("hello wonderful world", 12), "hello");
        assert_eq!(truncate_at_word("hello wonderful world", 15), "hello wonderful");
    }

    #[test]
    fn cut_landing_on_space_keeps_last_word() {
        assert_eq!(truncate_at_word("hello world again", 11), "hello world");
    }

    #[test]
    fn never_splits_multibyte_characters() {
        let text = "café crème brûlée";
        for limit in 0..text.len() {
            let cut = truncate_at_word(text, limit);
            assert!(cut.len() <= limit);
            assert!(text.starts_with(cut));
            let rest = &text[cut.len()..];
            assert!(
                cut.is_empty() || rest.is_empty() || rest.starts_with(' '),
                "split word at {limit}: {cut:?}"
            );
        }
    }

    #[test]
    fn single_long_word_truncates_to_empty() {
        assert_eq!(truncate_at_word("supercalifragilistic", 5), "");
    }

    #[test]
    fn prefix_bytes_respects_char_boundaries() {
        assert_eq!(prefix_bytes("héllo", 2), "h");
        assert_eq!(prefix_bytes("héllo", 3), "hé");
        assert_eq!(prefix_bytes("abc", 10), "abc");
    }

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }
}
