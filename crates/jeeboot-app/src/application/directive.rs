//! The `appVersion` directive.
//!
//! Marks up an element so that its text content shows the application
//! version.  In a template it is written as an attribute:
//!
//! ```html
//! <span app-version></span>
//! ```

use std::sync::Arc;

use crate::domain::AppInfo;

/// Attribute that marks an element for the `appVersion` directive.
pub const APP_VERSION_ATTR: &str = "app-version";

/// Something whose text content a directive can set.
pub trait Element {
    fn set_text(&mut self, text: &str);
}

/// A bare text node, for rendering into strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextElement {
    pub text: String,
}

impl Element for TextElement {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// Binds an element's text to `app_info.version`.
#[derive(Debug, Clone)]
pub struct AppVersionDirective {
    app_info: Arc<AppInfo>,
}

impl AppVersionDirective {
    pub fn new(app_info: Arc<AppInfo>) -> Self {
        Self { app_info }
    }

    /// Sets the element's text to the application version.
    pub fn link(&self, element: &mut dyn Element) {
        element.set_text(self.app_info.version);
    }

    /// Applies the directive to every `app-version` element in `markup`,
    /// replacing whatever text the element contained.
    ///
    /// Everything between the marked element's opening tag and its matching
    /// closing tag is replaced, child elements included.  An element that is
    /// never closed loses the rest of the markup.
    pub fn apply(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len() + 16);
        let mut rest = markup;

        while let Some(tag_start) = rest.find('<') {
            let Some(tag_len) = rest[tag_start..].find('>') else {
                break;
            };
            let tag_end = tag_start + tag_len + 1;
            let tag = &rest[tag_start..tag_end];
            out.push_str(&rest[..tag_end]);
            rest = &rest[tag_end..];

            if !is_marked(tag) {
                continue;
            }

            let mut element = TextElement::default();
            self.link(&mut element);
            out.push_str(&element.text);

            rest = match matching_close(rest, tag_name(tag)) {
                Some(close) => &rest[close..],
                None => "",
            };
        }

        out.push_str(rest);
        out
    }
}

/// Element name of an opening tag such as `<span class="v">`.
fn tag_name(tag: &str) -> &str {
    tag.trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("")
}

/// Offset in `content` of the `</name>` that closes an element whose opening
/// tag was just consumed, skipping nested elements of the same name.
fn matching_close(content: &str, name: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = 0;
    while let Some(found) = content[pos..].find('<') {
        let start = pos + found;
        let end = start + content[start..].find('>')? + 1;
        let tag = &content[start..end];
        if let Some(closing) = tag.strip_prefix("</") {
            if tag_name(closing).eq_ignore_ascii_case(name) {
                depth -= 1;
                if depth == 0 {
                    return Some(start);
                }
            }
        } else if !tag.ends_with("/>") && tag_name(tag).eq_ignore_ascii_case(name) {
            depth += 1;
        }
        pos = end;
    }
    None
}

/// `true` for an opening tag carrying the `app-version` attribute.
fn is_marked(tag: &str) -> bool {
    if tag.starts_with("</") || tag.ends_with("/>") {
        return false;
    }
    tag.trim_start_matches('<')
        .trim_end_matches('>')
        .split_whitespace()
        .skip(1)
        .any(|attr| attr == APP_VERSION_ATTR || attr.starts_with("app-version="))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
