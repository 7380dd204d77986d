//! Results-page URLs and the navigation seam.

use tracing::info;

use crate::config::{ResultsConfig, UrlStyle};

/// URL of the results page for `query`, or `None` for a blank query.
pub fn results_url(results: &ResultsConfig, query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let encoded = urlencoding::encode(query);
    let url = match results.url_style {
        UrlStyle::Path => format!("{}/{}", results.base_path.trim_end_matches('/'), encoded),
        UrlStyle::Query => {
            let sep = if results.base_path.contains('?') { '&' } else { '?' };
            format!(
                "{}{}{}={}",
                results.base_path,
                sep,
                urlencoding::encode(&results.query_param),
                encoded
            )
        }
    };
    Some(url)
}

/// Where submits end up. A browser page host sets `location.href`; the
/// terminal host opens the system browser.
pub trait Navigator {
    fn navigate(&self, url: &str) -> std::io::Result<()>;
}

impl<F> Navigator for F
where
    F: Fn(&str) -> std::io::Result<()>,
{
    fn navigate(&self, url: &str) -> std::io::Result<()> {
        self(url)
    }
}

/// Opens results pages in the system's default browser.
#[derive(Debug, Clone, Default)]
pub struct BrowserNavigator {
    /// Prepended to site-relative paths, e.g. `https://shop.example.ro`.
    pub origin: Option<String>,
}

impl BrowserNavigator {
    pub fn new(origin: Option<String>) -> Self {
        Self { origin }
    }

    pub fn absolute(&self, url: &str) -> String {
        match &self.origin {
            Some(origin) if url.starts_with('/') => {
                format!("{}{}", origin.trim_end_matches('/'), url)
            }
            _ => url.to_string(),
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> std::io::Result<()> {
        let target = self.absolute(url);
        info!(component = "navigator", url = %target, "opening results page");
        open_in_browser(&target)
    }
}

/// Writes results URLs to stdout, one per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, url: &str) -> std::io::Result<()> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{url}")
    }
}

/// Open a URL in the system's default browser
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(style: UrlStyle, base: &str) -> ResultsConfig {
        ResultsConfig {
            base_path: base.into(),
            url_style: style,
            ..ResultsConfig::default()
        }
    }

    #[test]
    fn query_style() {
        let r = results(UrlStyle::Query, "/search-results");
        assert_eq!(results_url(&r, "chair").as_deref(), Some("/search-results?q=chair"));
        assert_eq!(
            results_url(&r, " masă extensibilă ").as_deref(),
            Some("/search-results?q=mas%C4%83%20extensibil%C4%83")
        );
    }

    #[test]
    fn query_style_appends_to_existing_query_string() {
        let r = results(UrlStyle::Query, "/search?lang=ro");
        assert_eq!(results_url(&r, "chair").as_deref(), Some("/search?lang=ro&q=chair"));
    }

    #[test]
    fn path_style_trims_trailing_slash() {
        let r = results(UrlStyle::Path, "/catalog/q/");
        assert_eq!(results_url(&r, "a/b").as_deref(), Some("/catalog/q/a%2Fb"));
    }

    #[test]
    fn blank_query_has_no_url() {
        let r = results(UrlStyle::Path, "/catalog/q");
        assert_eq!(results_url(&r, "   "), None);
    }

    #[test]
    fn browser_navigator_prefixes_origin() {
        let nav = BrowserNavigator::new(Some("https://shop.example.ro/".into()));
        assert_eq!(nav.absolute("/catalog/q/x"), "https://shop.example.ro/catalog/q/x");
        assert_eq!(nav.absolute("https://other/x"), "https://other/x");
    }
}
