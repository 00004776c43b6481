//! Markup scraping behind a typed interface.
//!
//! Bodies are HTML fragments (hand-written or rendered from Markdown), and
//! the pipeline needs three things from them: the first heading, the text
//! without tags, and the `src` attributes that point at gallery assets.
//! [`MarkupScanner`] names those operations; [`RegexScanner`] implements them
//! with a handful of precompiled expressions. A real HTML parser can replace
//! it without touching the callers.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::ops::Range;

use crate::text::unescape_entities;

/// A heading element found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    /// Inner text with tags stripped and entities decoded.
    pub text: String,
    /// The whole element, as written.
    pub element: String,
    /// Byte range of `element` within the scanned fragment.
    pub range: Range<usize>,
}

pub trait MarkupScanner: Sync {
    /// First `<h1>`..`<h{max_level}>` element in document order.
    fn first_heading(&self, html: &str, max_level: u8) -> Option<Heading>;

    /// Replace every tag with `replacement`.
    fn strip_tags(&self, html: &str, replacement: &str) -> String;

    /// Rewrite each `src="..."` value. `rewrite` returns the new value, or
    /// `None` to leave the attribute untouched.
    fn rewrite_sources(&self, html: &str, rewrite: &mut dyn FnMut(&str) -> Option<String>)
    -> String;
}

lazy_static! {
    static ref HEADING_REGEX: Regex =
        Regex::new(r"(?is)<h(?P<level>[1-6])(?:\s[^>]*)?>(?P<inner>.*?)</h[1-6]\s*>").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^<>]*>").unwrap();
    static ref SRC_REGEX: Regex = Regex::new(r#"(?i)\bsrc\s*=\s*"(?P<src>[^"]*)""#).unwrap();
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RegexScanner;

impl MarkupScanner for RegexScanner {
    fn first_heading(&self, html: &str, max_level: u8) -> Option<Heading> {
        HEADING_REGEX.captures_iter(html).find_map(|caps| {
            let level: u8 = caps["level"].parse().ok()?;
            if level > max_level {
                return None;
            }
            let whole = caps.get(0)?;
            let text = self.strip_tags(&caps["inner"], "");
            Some(Heading {
                level,
                text: unescape_entities(text.trim()).into_owned(),
                element: whole.as_str().to_string(),
                range: whole.range(),
            })
        })
    }

    fn strip_tags(&self, html: &str, replacement: &str) -> String {
        TAG_REGEX.replace_all(html, replacement).into_owned()
    }

    fn rewrite_sources(
        &self,
        html: &str,
        rewrite: &mut dyn FnMut(&str) -> Option<String>,
    ) -> String {
        SRC_REGEX
            .replace_all(html, |caps: &Captures| match rewrite(&caps["src"]) {
                Some(new_src) => format!(r#"src="{new_src}""#),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_heading_finds_any_level() {
        let html = "<p>intro</p><h2>Second &amp; more</h2><h1>First</h1>";
        let heading = RegexScanner.first_heading(html, 6).unwrap();
        assert_eq!(heading.level, 2);
        assert_eq!(heading.text, "Second & more");
        assert_eq!(heading.element, "<h2>Second &amp; more</h2>");
        assert_eq!(&html[heading.range], "<h2>Second &amp; more</h2>");
    }

    #[test]
    fn first_heading_respects_max_level() {
        let html = "<h4>Small</h4><h3>Medium</h3>";
        let heading = RegexScanner.first_heading(html, 3).unwrap();
        assert_eq!(heading.text, "Medium");
        assert!(RegexScanner.first_heading("<h5>x</h5>", 3).is_none());
    }

    #[test]
    fn first_heading_handles_attributes_and_nested_markup() {
        let html = "<h1 id=\"top\">Hello <em>there</em></h1>";
        let heading = RegexScanner.first_heading(html, 6).unwrap();
        assert_eq!(heading.text, "Hello there");
    }

    #[test]
    fn no_heading() {
        assert!(RegexScanner.first_heading("<p>nothing</p>", 6).is_none());
        assert!(RegexScanner.first_heading("<header>not one</header>", 6).is_none());
    }

    #[test]
    fn strip_tags_with_replacement() {
        assert_eq!(RegexScanner.strip_tags("<p>a</p><p>b</p>", ""), "ab");
        assert_eq!(RegexScanner.strip_tags("<p>a</p><p>b</p>", " "), " a  b ");
    }

    #[test]
    fn rewrite_sources_only_touches_selected() {
        let html = r#"<img src="cat.png"><img src="https://x.org/a.png">"#;
        let out = RegexScanner.rewrite_sources(html, &mut |src| {
            (!src.contains("://")).then(|| format!("/gallery/pets/{src}"))
        });
        assert_eq!(
            out,
            r#"<img src="/gallery/pets/cat.png"><img src="https://x.org/a.png">"#
        );
    }
}
