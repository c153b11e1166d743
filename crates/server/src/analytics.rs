//! Google Analytics (gtag.js) snippet for status pages.

use crate::utils::escape_for_script;
use url::Url;

pub const GTAG_LOADER_URL: &str = "https://www.googletagmanager.com/gtag/js";
pub const GTAG_INLINE_PREFIX: &str = "window.dataLayer = window.dataLayer || [];";

/// One `<script>` element of the snippet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub is_async: bool,
    pub body: String,
}

/// Loader + config scripts for `tag_id`. The id is URL-encoded in the loader
/// and written as an escaped JS string literal in the inline script.
pub fn google_analytics_scripts(tag_id: &str) -> Vec<ScriptTag> {
    let loader = match Url::parse_with_params(GTAG_LOADER_URL, &[("id", tag_id)]) {
        Ok(url) => url.to_string(),
        Err(_) => GTAG_LOADER_URL.to_string(),
    };
    let id_literal = serde_json::to_string(tag_id)
        .map(|s| escape_for_script(&s))
        .unwrap_or_else(|_| "\"\"".to_string());

    vec![
        ScriptTag {
            src: Some(loader),
            is_async: true,
            body: String::new(),
        },
        ScriptTag {
            src: None,
            is_async: false,
            body: format!(
                "{GTAG_INLINE_PREFIX}function gtag(){{dataLayer.push(arguments);}}gtag('js', new Date());gtag('config', {id_literal});"
            ),
        },
    ]
}

/// Whether a script element (given its `src` and text) belongs to a previously injected snippet.
pub fn is_analytics_script(src: Option<&str>, body: &str) -> bool {
    src.is_some_and(|s| s.starts_with(GTAG_LOADER_URL)) || body.starts_with(GTAG_INLINE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_loader_and_config() {
        let scripts = google_analytics_scripts("G-ABC123");
        assert_eq!(scripts.len(), 2);
        assert_eq!(
            scripts[0].src.as_deref(),
            Some("https://www.googletagmanager.com/gtag/js?id=G-ABC123")
        );
        assert!(scripts[0].is_async);
        assert!(scripts[1].body.ends_with("gtag('config', \"G-ABC123\");"));
    }

    #[test]
    fn hostile_tag_id_is_escaped() {
        let scripts = google_analytics_scripts("</script><script>alert(1)//");
        assert!(!scripts[1].body.contains("</script"));
        assert!(scripts[0].src.as_deref().unwrap().contains("%3C%2Fscript%3E"));
    }

    #[test]
    fn recognizes_own_scripts() {
        for script in google_analytics_scripts("G-1") {
            assert!(is_analytics_script(script.src.as_deref(), &script.body));
        }
        assert!(!is_analytics_script(Some("/assets/index.js"), ""));
    }
}
