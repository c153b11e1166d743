use serde::Serialize;

/// Maximum length of the `<meta name="description">` text, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 155;

/// Serialize `value` as JSON that can be dropped verbatim inside an inline `<script>`.
#[tracing::instrument(skip(value))]
pub fn json_for_script<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value).map(|json| escape_for_script(&json))
}

/// Escape JSON text for a script execution context.
///
/// `<`, `>` and `&` only ever occur inside JSON strings, so writing them as
/// `\uXXXX` keeps the value identical while making `</script>` and `<!--`
/// impossible. U+2028/U+2029 are escaped because pre-ES2019 engines treat them
/// as line terminators inside string literals.
pub fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len() + 16);
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove everything shaped like an HTML tag (`<` + at least one char + `>`).
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => rest = &after[end + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_basic_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Render markdown to HTML, then flatten it back to plain text.
pub fn markdown_to_plain_text(markdown_src: &str) -> String {
    let options = markdown::Options {
        compile: markdown::CompileOptions {
            allow_dangerous_html: true,
            ..markdown::CompileOptions::default()
        },
        ..markdown::Options::default()
    };
    let html = markdown::to_html_with_options(markdown_src, &options)
        .unwrap_or_else(|_| markdown::to_html(markdown_src));
    decode_basic_entities(&strip_tags(&html)).trim().to_string()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Plain-text page description as used for `meta[name=description]` and `og:description`.
pub fn meta_description(description: Option<&str>) -> String {
    let plain = markdown_to_plain_text(description.unwrap_or_default());
    truncate_chars(&plain, DESCRIPTION_MAX_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_escape_prevents_breakout() {
        let out = json_for_script(&json!({"title": "</script><script>alert(1)</script>"})).unwrap();
        assert!(!out.contains("</script"));
        assert!(!out.contains('<'));
        let back: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["title"], "</script><script>alert(1)</script>");
    }

    #[test]
    fn script_escape_handles_line_separators() {
        let out = json_for_script("a\u{2028}b\u{2029}c").unwrap();
        assert_eq!(out, "\"a\\u2028b\\u2029c\"");
    }

    #[test]
    fn strip_tags_matches_tag_shapes_only() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("1 < 2 <> 3"), "1  3");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("<>"), "<>");
        assert_eq!(strip_tags("<a\nhref=\"x\">link</a>"), "link");
    }

    #[test]
    fn markdown_rendered_to_plain_text() {
        let plain = markdown_to_plain_text("# Title\n\nSome **bold** text & more");
        assert!(plain.starts_with("Title"));
        assert!(plain.ends_with("Some bold text & more"));
        assert!(!plain.contains('<'));
        assert_eq!(markdown_to_plain_text(""), "");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn description_is_capped() {
        let long = "x".repeat(400);
        assert_eq!(meta_description(Some(&long)).chars().count(), DESCRIPTION_MAX_CHARS);
        assert_eq!(meta_description(None), "");
    }
}
