//! Server-side rendering of the SPA shell for one status page.

use super::public::StatusPageData;
use crate::analytics::{ScriptTag, google_analytics_scripts, is_analytics_script};
use crate::entity::status_page;
use crate::error::StatusPageError;
use crate::html::{
    self, Document, append_child, detach, element, get_attr, remove_attr, set_attr, set_text,
    text_content,
};
use crate::utils::{json_for_script, meta_description};

pub const PRELOAD_SCRIPT_ID: &str = "preload-data";

pub fn manifest_href(slug: &str) -> String {
    format!("/api/status-page/{slug}/manifest.json")
}

/// Body of the preload script. The client reads `window.preloadData`.
pub fn preload_script_body(json: &str) -> String {
    format!("\n    window.preloadData = {json};\n")
}

/// Mutate `index_html` so that it describes `page` and carries `data` for hydration.
///
/// Rendering an already rendered document again produces the same head: Open
/// Graph tags are updated in place, and the preload and analytics scripts are
/// replaced rather than appended twice.
#[tracing::instrument(skip_all, fields(slug = %page.slug))]
pub fn render_html(
    index_html: &str,
    page: &status_page::Model,
    data: &StatusPageData,
) -> Result<String, StatusPageError> {
    let doc = Document::parse(index_html);
    let description = meta_description(page.description.as_deref());

    for title in doc.select_str("title") {
        set_text(&title, &page.title);
    }
    for meta in doc.select_str("meta[name=description]") {
        set_attr(&meta, "content", &description);
    }

    if let Some(icon) = page.icon.as_deref().filter(|icon| !icon.is_empty()) {
        for link in doc.select_str("link[rel=icon]") {
            set_attr(&link, "href", icon);
            remove_attr(&link, "type");
        }
        for link in doc.select_str("link[rel=apple-touch-icon]") {
            detach(&link);
        }
    }

    let head = doc
        .head()
        .ok_or_else(|| StatusPageError::Render("document has no <head>".into()))?;

    for script in doc.select_str("script") {
        if is_analytics_script(get_attr(&script, "src").as_deref(), &text_content(&script)) {
            detach(&script);
        }
    }
    if let Some(tag_id) = page
        .google_analytics_tag_id
        .as_deref()
        .filter(|id| !id.is_empty())
    {
        for script in google_analytics_scripts(tag_id) {
            append_child(&head, script_element(&script));
        }
    }

    upsert_og_meta(&doc, &head, "og:title", &page.title);
    upsert_og_meta(&doc, &head, "og:description", &description);

    let json = json_for_script(data).map_err(|e| StatusPageError::Render(e.to_string()))?;
    for old in doc.select_str("script#preload-data") {
        detach(&old);
    }
    let preload = element("script", &[("id", PRELOAD_SCRIPT_ID), ("data-json", "{}")]);
    set_text(&preload, &preload_script_body(&json));
    append_child(&head, preload);

    for link in doc.select_str("link[rel=manifest]") {
        set_attr(&link, "href", &manifest_href(&page.slug));
    }

    doc.to_html()
        .map_err(|e| StatusPageError::Render(e.to_string()))
}

fn script_element(script: &ScriptTag) -> html::Handle {
    let node = match (&script.src, script.is_async) {
        (Some(src), true) => element("script", &[("async", ""), ("src", src)]),
        (Some(src), false) => element("script", &[("src", src)]),
        (None, _) => element("script", &[]),
    };
    if !script.body.is_empty() {
        set_text(&node, &script.body);
    }
    node
}

fn upsert_og_meta(doc: &Document, head: &html::Handle, property: &str, content: &str) {
    let existing = doc.select_str(&format!("meta[property={property}]"));
    match existing.split_first() {
        Some((first, duplicates)) => {
            set_attr(first, "content", content);
            for dup in duplicates {
                detach(dup);
            }
        }
        None => append_child(head, element("meta", &[("property", property), ("content", content)])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status_page::public::PublicStatusPageConfig;

    const SHELL: &str = r#"<!DOCTYPE html><html><head><title>Uptime</title><meta name="description" content="shell"><link rel="icon" type="image/svg+xml" href="/icon.svg"><link rel="apple-touch-icon" href="/apple.png"><link rel="manifest" href="/manifest.json"></head><body><div id="app"></div></body></html>"#;

    fn page() -> status_page::Model {
        status_page::Model {
            id: 1,
            slug: "main".into(),
            title: "Main".into(),
            description: Some("All systems".into()),
            icon: None,
            theme: "light".into(),
            auto_refresh_interval: 300,
            custom_css: None,
            footer_text: None,
            published: true,
            show_tags: false,
            show_powered_by: true,
            show_certificate_expiry: false,
            google_analytics_tag_id: None,
        }
    }

    fn data(page: &status_page::Model) -> StatusPageData {
        StatusPageData {
            config: PublicStatusPageConfig::from(page),
            incident: None,
            public_group_list: Vec::new(),
            maintenance_list: Vec::new(),
        }
    }

    #[test]
    fn sets_title_description_and_manifest() {
        let p = page();
        let out = render_html(SHELL, &p, &data(&p)).unwrap();
        assert!(out.contains("<title>Main</title>"));
        assert!(out.contains(r#"<meta name="description" content="All systems">"#));
        assert!(out.contains(r#"href="/api/status-page/main/manifest.json""#));
        assert!(out.contains(r#"<script id="preload-data" data-json="{}">"#));
        assert!(out.contains("window.preloadData = {"));
    }

    #[test]
    fn default_icon_leaves_links_alone() {
        let p = page();
        let out = render_html(SHELL, &p, &data(&p)).unwrap();
        assert!(out.contains(r#"type="image/svg+xml""#));
        assert!(out.contains("apple-touch-icon"));
    }

    #[test]
    fn custom_icon_rewrites_icon_links() {
        let mut p = page();
        p.icon = Some("/upload/logo.png".into());
        let out = render_html(SHELL, &p, &data(&p)).unwrap();
        assert!(out.contains(r#"<link rel="icon" href="/upload/logo.png">"#));
        assert!(!out.contains("apple-touch-icon"));
    }

    #[test]
    fn every_title_element_is_rewritten() {
        let p = page();
        let shell = SHELL.replace("<title>Uptime</title>", "<title>Uptime</title><title>Second</title>");
        let out = render_html(&shell, &p, &data(&p)).unwrap();
        assert_eq!(out.matches("<title>Main</title>").count(), 2);
        assert!(!out.contains("Uptime"));
        assert!(!out.contains("Second"));
    }

    #[test]
    fn missing_head_elements_are_tolerated() {
        let p = page();
        let out = render_html("<p>bare</p>", &p, &data(&p)).unwrap();
        assert!(out.contains(r#"<meta property="og:title" content="Main">"#));
        assert!(out.contains("preload-data"));
    }
}
