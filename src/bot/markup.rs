//! Sanitizing of content text for Telegram's HTML parse mode.
//!
//! Line-break and paragraph markup become newlines; every other tag is
//! dropped unless it is one Telegram renders (`b`, `i`, `u`, `code`), in
//! which case it is kept without attributes. Text between tags is escaped,
//! leaving existing entities such as `&amp;` alone.

use regex::Regex;
use std::sync::LazyLock;

/// Tags passed through.
const ALLOWED_TAGS: &[&str] = &["b", "i", "u", "code"];

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("tag pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z]+|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("entity pattern is valid")
});

/// Clean a content string before it reaches the transport.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in TAG.captures_iter(text) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        escape_text(&text[last..tag.start()], &mut out);
        last = tag.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        match name.as_str() {
            "br" => out.push('\n'),
            "p" if closing => out.push('\n'),
            n if ALLOWED_TAGS.contains(&n) => {
                out.push('<');
                if closing {
                    out.push('/');
                }
                out.push_str(n);
                out.push('>');
            }
            _ => {}
        }
    }
    escape_text(&text[last..], &mut out);
    out.trim().to_string()
}

fn escape_text(segment: &str, out: &mut String) {
    for (i, c) in segment.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if ENTITY.is_match(&segment[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}

/// Escape text that is not markup (category names, quiz options) for HTML mode.
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    result
}

/// "animales" -> "Animales", as shown on category buttons.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_allowed_tags() {
        let text = "<b>negrita</b> <i>it</i> <u>sub</u> <code>x = 1</code>";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_line_breaks_become_newlines() {
        assert_eq!(sanitize("uno<br>dos<br/>tres<br />cuatro"), "uno\ndos\ntres\ncuatro");
    }

    #[test]
    fn test_paragraphs_become_newlines() {
        assert_eq!(sanitize("<p>primero</p><p>segundo</p>"), "primero\nsegundo");
    }

    #[test]
    fn test_strips_other_tags() {
        assert_eq!(
            sanitize(r#"<div class="x">hola <span>mundo</span></div> <img src="a.png">"#),
            "hola mundo"
        );
    }

    #[test]
    fn test_does_not_keep_tags_sharing_a_prefix() {
        // <bold> and <img> are not <b> and <i>
        assert_eq!(sanitize("<bold>a</bold><img>"), "a");
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(sanitize("¿Qué le dijo 2 < 3?"), "¿Qué le dijo 2 &lt; 3?");
        assert_eq!(sanitize("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(sanitize("<b>a > b</b>"), "<b>a &gt; b</b>");
    }

    #[test]
    fn test_existing_entities_kept() {
        assert_eq!(sanitize("Tom &amp; Jerry &#233; &#x41; &quot;"), "Tom &amp; Jerry &#233; &#x41; &quot;");
        assert_eq!(sanitize("a &b c"), "a &amp;b c");
    }

    #[test]
    fn test_allowed_tags_lose_attributes() {
        assert_eq!(sanitize(r#"<B class="x">hola</B>"#), "<b>hola</b>");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("animales"), "Animales");
        assert_eq!(capitalize("ÑOÑO"), "Ñoño");
        assert_eq!(capitalize(""), "");
    }
}
