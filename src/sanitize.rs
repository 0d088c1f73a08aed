//! Markup sanitizer for untrusted text fields.
//!
//! Spreadsheet cells and JSON values are typed by staff in whatever tool they
//! like, and end up rendered as HTML. Every string that enters the data model
//! passes through [`sanitize`] first.
//!
//! ## Rules
//!
//! - Inline formatting tags (`<b>`, `<em>`, `<br>`, ...) survive, re-emitted
//!   in canonical lowercase form with every attribute removed. `<a>` keeps an
//!   `href` when it points at `http(s):`, `mailto:` or a relative location.
//! - Active elements (`<script>`, `<style>`, `<iframe>`, ...) are removed
//!   together with their content.
//! - Every other tag, comment, or declaration is removed; its text stays.
//! - A `<` that does not start a tag is escaped as `&lt;`.
//! - An unterminated tag at the end of the input is dropped.
//!
//! The output only ever contains `<` as part of a canonical allowed tag, so
//! sanitizing twice gives the same result as sanitizing once.

use serde_json::Value;

/// Tags kept (without attributes) in sanitized output.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "em", "i", "mark", "q", "s", "small", "span",
    "strong", "sub", "sup", "u",
];

/// Elements removed along with everything up to their closing tag.
const ACTIVE_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
    "svg", "math", "select", "noembed", "noframes", "xmp",
];

/// Sanitize a single untrusted string.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let markup = &rest[lt..];
        match scan_markup(markup) {
            Markup::Text => {
                out.push_str("&lt;");
                rest = &markup[1..];
            }
            Markup::Skip(len) => rest = &markup[len..],
            Markup::Unterminated => rest = "",
            Markup::Tag(tag) => {
                if !tag.closing && ACTIVE_ELEMENTS.contains(&tag.name.as_str()) {
                    rest = skip_element(&markup[tag.len..], &tag.name);
                    continue;
                }
                if let Some(rendered) = render_tag(&tag) {
                    out.push_str(&rendered);
                }
                rest = &markup[tag.len..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Sanitize every string inside a JSON value.
///
/// Strings are sanitized, arrays and objects are walked recursively, and
/// numbers, booleans and nulls pass through unchanged.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

// ============================================================================
// Markup scanning
// ============================================================================

enum Markup {
    /// `<` is plain text.
    Text,
    /// Comment or declaration of the given byte length.
    Skip(usize),
    /// Tag or comment with no terminator before end of input.
    Unterminated,
    Tag(Tag),
}

struct Tag {
    name: String,
    closing: bool,
    href: Option<String>,
    /// Byte length of the tag including `<` and `>`.
    len: usize,
}

/// Classify the markup starting at `input[0] == '<'`.
fn scan_markup(input: &str) -> Markup {
    let bytes = input.as_bytes();
    match bytes.get(1) {
        Some(b'!') => {
            if input.starts_with("<!--") {
                return match input[4..].find("-->") {
                    Some(end) => Markup::Skip(4 + end + 3),
                    None => Markup::Unterminated,
                };
            }
            skip_to_gt(input)
        }
        Some(b'?') => skip_to_gt(input),
        Some(b'/') if bytes.get(2).is_some_and(u8::is_ascii_alphabetic) => scan_tag(input, true),
        Some(c) if c.is_ascii_alphabetic() => scan_tag(input, false),
        _ => Markup::Text,
    }
}

fn skip_to_gt(input: &str) -> Markup {
    match input.find('>') {
        Some(end) => Markup::Skip(end + 1),
        None => Markup::Unterminated,
    }
}

fn scan_tag(input: &str, closing: bool) -> Markup {
    let bytes = input.as_bytes();
    let name_start = if closing { 2 } else { 1 };
    let mut pos = name_start;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    let name = input[name_start..pos].to_ascii_lowercase();

    let mut href = None;
    loop {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
            pos += 1;
        }
        match bytes.get(pos) {
            None => return Markup::Unterminated,
            Some(b'>') => {
                return Markup::Tag(Tag {
                    name,
                    closing,
                    href,
                    len: pos + 1,
                });
            }
            Some(_) => {}
        }

        let attr_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let attr_name = input[attr_start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            continue;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let value = match bytes.get(pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = pos + 1;
                match input[value_start..].find(quote as char) {
                    Some(end) => {
                        pos = value_start + end + 1;
                        &input[value_start..value_start + end]
                    }
                    None => return Markup::Unterminated,
                }
            }
            _ => {
                let value_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>'
                {
                    pos += 1;
                }
                &input[value_start..pos]
            }
        };

        if attr_name == "href" {
            href = Some(value.to_string());
        }
    }
}

/// Skip past the closing tag of an active element. Returns the remaining input.
fn skip_element<'a>(input: &'a str, name: &str) -> &'a str {
    let closing = format!("</{name}");
    let lower = input.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lower[from..].find(&closing) {
        let start = from + found;
        let after = start + closing.len();
        let boundary = lower.as_bytes().get(after).copied();
        if matches!(boundary, Some(b'>') | Some(b'/'))
            || boundary.is_some_and(|b| b.is_ascii_whitespace())
        {
            return match input[after..].find('>') {
                Some(gt) => &input[after + gt + 1..],
                None => "",
            };
        }
        from = after;
    }
    ""
}

fn render_tag(tag: &Tag) -> Option<String> {
    if !INLINE_TAGS.contains(&tag.name.as_str()) {
        return None;
    }
    if tag.name == "br" {
        return (!tag.closing).then(|| "<br>".to_string());
    }
    if tag.closing {
        return Some(format!("</{}>", tag.name));
    }
    match tag.href.as_deref().map(str::trim).filter(|h| is_safe_href(h)) {
        Some(href) if tag.name == "a" => Some(format!("<a href=\"{href}\">")),
        _ => Some(format!("<{}>", tag.name)),
    }
}

fn is_safe_href(href: &str) -> bool {
    if href.is_empty()
        || href.contains(['"', '\'', '<', '>', '`'])
        || href.chars().any(char::is_whitespace)
    {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
    {
        return true;
    }
    // Relative: no scheme (or entity that could spell one) before the first
    // path, query or fragment delimiter.
    let head_end = lower.find(['/', '?', '#']).unwrap_or(lower.len());
    !lower[..head_end].contains([':', '&'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(sanitize("Ages 8-12, Tuesdays"), "Ages 8-12, Tuesdays");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn script_removed_with_content() {
        assert_eq!(
            sanitize("Choir<script>alert('x')</script> rehearsal"),
            "Choir rehearsal"
        );
    }

    #[test]
    fn script_closing_tag_case_insensitive() {
        assert_eq!(sanitize("a<SCRIPT>bad()</Script >b"), "ab");
    }

    #[test]
    fn unclosed_script_drops_rest() {
        assert_eq!(sanitize("ok<script>evil()"), "ok");
    }

    #[test]
    fn inline_formatting_kept_without_attributes() {
        assert_eq!(
            sanitize("<B onclick=\"steal()\">Sold out</B> <em>soon</em>"),
            "<b>Sold out</b> <em>soon</em>"
        );
    }

    #[test]
    fn unknown_tags_stripped_text_kept() {
        assert_eq!(sanitize("<div><p>Hello <b>world</b></p></div>"), "Hello <b>world</b>");
    }

    #[test]
    fn img_with_handler_removed() {
        assert_eq!(sanitize("x<img src=x onerror=alert(1)>y"), "xy");
    }

    #[test]
    fn safe_link_kept() {
        assert_eq!(
            sanitize("<a href='https://example.org/tickets' target=_blank>Tickets</a>"),
            "<a href=\"https://example.org/tickets\">Tickets</a>"
        );
    }

    #[test]
    fn javascript_link_loses_href() {
        assert_eq!(
            sanitize("<a href=\"javascript:alert(1)\">click</a>"),
            "<a>click</a>"
        );
    }

    #[test]
    fn entity_encoded_scheme_loses_href() {
        assert_eq!(
            sanitize("<a href=jav&#x61;script:alert(1)>x</a>"),
            "<a>x</a>"
        );
    }

    #[test]
    fn relative_link_kept() {
        assert_eq!(sanitize("<a href=/classes>Classes</a>"), "<a href=\"/classes\">Classes</a>");
    }

    #[test]
    fn stray_angle_bracket_escaped() {
        assert_eq!(sanitize("ages < 10 > 5"), "ages &lt; 10 > 5");
    }

    #[test]
    fn comment_removed() {
        assert_eq!(sanitize("a<!-- hidden -->b"), "ab");
        assert_eq!(sanitize("a<!-- never closed"), "a");
    }

    #[test]
    fn unterminated_tag_dropped() {
        assert_eq!(sanitize("Tuition <b class=\"x"), "Tuition ");
    }

    #[test]
    fn br_canonicalized() {
        assert_eq!(sanitize("a<BR/>b</br>c"), "a<br>bc");
    }

    #[test]
    fn idempotent_over_hostile_samples() {
        let samples = [
            "plain",
            "<<b>script>alert(1)<</b>/script>",
            "<scr<script>ipt>alert(1)</script>",
            "a < b <c",
            "<a href=\"https://x.org\" onclick=y>t</a>",
            "&lt;script&gt;",
            "<b><i>nested</b></i>",
            "<!doctype html><p>x",
            "</ b>",
            "<svg><script>1</script></svg>tail",
            "<a href=jav&#x61;script:alert(1)>x</a>",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn sanitize_value_walks_strings_only() {
        let value = json!({
            "title": "<script>x</script>Choir",
            "openings": 12,
            "active": true,
            "notes": null,
            "tags": ["<i>new</i>", 3],
        });
        let clean = sanitize_value(value);
        assert_eq!(clean["title"], "Choir");
        assert_eq!(clean["openings"], 12);
        assert_eq!(clean["active"], true);
        assert!(clean["notes"].is_null());
        assert_eq!(clean["tags"], json!(["<i>new</i>", 3]));
    }
}
