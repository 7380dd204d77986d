//! Escaped markup.
//!
//! [`SafeMarkup`] can only be built from escaped text or from static
//! fragments written in this crate, so untrusted strings cannot reach the
//! output without passing through [`html_escape`].

use serde::Serialize;
use std::fmt;

/// Escape text for use in HTML content and double- or single-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML that is safe to insert as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Escape untrusted text.
    pub fn text(s: &str) -> Self {
        Self(html_escape(s))
    }

    /// A fragment written in source code. Never pass runtime data here.
    pub fn trusted(fragment: &'static str) -> Self {
        Self(fragment.to_string())
    }

    pub fn push_trusted(&mut self, fragment: &'static str) {
        self.0.push_str(fragment);
    }

    pub fn push_text(&mut self, s: &str) {
        self.0.push_str(&html_escape(s));
    }

    pub fn push(&mut self, other: &SafeMarkup) {
        self.0.push_str(&other.0);
    }

    /// `name="value"` with the value escaped.
    pub fn push_attr(&mut self, name: &'static str, value: &str) {
        self.0.push(' ');
        self.0.push_str(name);
        self.0.push_str("=\"");
        self.0.push_str(&html_escape(value));
        self.0.push('"');
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let mut m = SafeMarkup::trusted("<a");
        m.push_attr("href", "javascript:\"><script>");
        m.push_trusted(">");
        assert_eq!(m.as_str(), r#"<a href="javascript:&quot;&gt;&lt;script&gt;">"#);
    }

    proptest! {
        #[test]
        fn escaped_text_never_contains_raw_markup(s in ".*") {
            let out = SafeMarkup::text(&s).into_string();
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains('>'));
            prop_assert!(!out.contains('"'));
            prop_assert!(!out.contains('\''));
        }

        #[test]
        fn plain_text_is_unchanged(s in "[a-zA-Z0-9 ăâîșț]*") {
            prop_assert_eq!(html_escape(&s), s);
        }
    }
}
