//! Highlight query matches in display text.

use crate::utils::html::escape_html;
use regex::{Regex, RegexBuilder};

/// Case-insensitive matcher for a search query.
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a highlighter for `text`; an empty query highlights nothing.
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        let pattern = (!text.is_empty())
            .then(|| {
                RegexBuilder::new(&regex::escape(text))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .flatten();
        Self { pattern }
    }

    /// HTML-escape `text`, wrapping every match in `<mark>`.
    pub fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return escape_html(text);
        };

        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in pattern.find_iter(text) {
            out.push_str(&escape_html(&text[last..m.start()]));
            out.push_str("<mark>");
            out.push_str(&escape_html(m.as_str()));
            out.push_str("</mark>");
            last = m.end();
        }
        out.push_str(&escape_html(&text[last..]));
        out
    }
}
