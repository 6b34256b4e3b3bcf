//! HTML and URL escaping.

/// Escape text for an HTML text node or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

pub(crate) fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn is_href_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-_.~!#$%()*+,/:;=?@".contains(&byte)
}

/// Escape a URL for an `href` or `src` attribute.
///
/// Existing percent escapes are kept; other unsafe bytes are percent-encoded.
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    escape_href_into(url, &mut out);
    out
}

pub(crate) fn escape_href_into(url: &str, out: &mut String) {
    for &byte in url.as_bytes() {
        match byte {
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#x27;"),
            b if is_href_safe(b) => out.push(b as char),
            b => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
}

/// Whether `url` uses a scheme that `safe` rendering strips.
pub fn is_unsafe_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("file:") {
        return true;
    }
    match lower.strip_prefix("data:") {
        Some(rest) => !["image/png", "image/gif", "image/jpeg", "image/webp"]
            .iter()
            .any(|prefix| rest.starts_with(prefix)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("it's"), "it's");
    }

    #[test]
    fn test_escape_href() {
        assert_eq!(escape_href("https://example.com/a b?x=1&y='2'"), "https://example.com/a%20b?x=1&amp;y=&#x27;2&#x27;");
        assert_eq!(escape_href("/caf\u{e9}"), "/caf%C3%A9");
        assert_eq!(escape_href("100%25"), "100%25");
        assert_eq!(escape_href("<x>"), "%3Cx%3E");
    }

    #[test]
    fn test_unsafe_urls() {
        assert!(is_unsafe_url("javascript:alert(1)"));
        assert!(is_unsafe_url("JavaScript:alert(1)"));
        assert!(is_unsafe_url("data:text/html;base64,xx"));
        assert!(!is_unsafe_url("data:image/png;base64,xx"));
        assert!(!is_unsafe_url("https://example.com"));
    }
}
