//! Minification for rendered HTML and generated XML.
//!
//! Both are skipped when `[build].minify` is off.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Content type for minification.
pub enum MinifyType<'a> {
    Html(&'a [u8]),
    Xml(&'a [u8]),
}

/// Minify content based on type and config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify<'a>(content: MinifyType<'a>, config: &SiteConfig) -> Cow<'a, [u8]> {
    match content {
        MinifyType::Html(html) if config.build.minify => Cow::Owned(minify_html_inner(html)),
        MinifyType::Xml(xml) if config.build.minify => Cow::Owned(minify_xml_inner(xml)),
        MinifyType::Html(bytes) | MinifyType::Xml(bytes) => Cow::Borrowed(bytes),
    }
}

fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    // Keep `<details>`/`<li>` closing tags so pages stay valid for old parsers
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = false;
    minify_html::minify(html, &cfg)
}

/// Drop indentation and blank lines.
fn minify_xml_inner(xml: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(xml)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<String>()
        .into_bytes()
}
