use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Terminal columns occupied by `s` (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// Widths of 3 or less have no room for an ellipsis, so the result is just
/// the characters that fit.
///
/// ```
/// use ticklist::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Buy groceries", 8), "Buy g...");
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

fn is_stripped_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Remove ANSI escape sequences and control characters other than tab,
/// newline and carriage return.
///
/// Handles CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`)
/// sequences; a bare ESC is dropped on its own. Clean input is returned
/// borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameter bytes run until a final byte in @..=~
                    for n in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&n) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(n) = chars.next() {
                        if n == '\x07' {
                            break;
                        }
                        if n == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_stripped_control(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

/// Clean user input into a single-line todo title or category name.
///
/// Control characters and escape sequences are stripped, line breaks and
/// tabs become spaces, and surrounding whitespace is trimmed. Returns `None`
/// when nothing printable remains.
pub fn sanitize_label(input: &str) -> Option<String> {
    let stripped = strip_control_chars(input);
    let flattened: String = stripped
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let trimmed = flattened.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_ascii() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_truncation_wide_chars() {
        // Each CJK character is 2 columns
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好世界", 5), "你...");
        assert_eq!(truncate_to_width("你好", 10), "你好");
        assert_eq!(display_width("Hi 🎉"), 5);
    }

    #[test]
    fn test_truncation_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
        // A 2-column character never fits in 1 column
        assert_eq!(truncate_to_width("你好", 1), "");
        assert_eq!(truncate_to_width("你好", 3), "你");
    }

    #[test]
    fn test_truncation_borrows_when_it_fits() {
        assert!(matches!(truncate_to_width("fits", 4), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_clean_text_is_borrowed() {
        let input = "line1\nline2\ttabbed\r\nend";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_controls_and_del() {
        assert_eq!(
            strip_control_chars("he\x00ll\x07o\x08 w\x0bor\x0cld\x7f!"),
            "hello world!"
        );
    }

    #[test]
    fn test_strip_escape_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_control_chars("up\x1b[2Adown"), "updown");
        assert_eq!(strip_control_chars("\x1b]0;title\x07text"), "text");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\text"), "text");
        assert_eq!(strip_control_chars("bare\x1besc"), "bareesc");
    }

    #[test]
    fn test_strip_keeps_unicode() {
        assert_eq!(
            strip_control_chars("日本語 \x1b[1m太字\x1b[0m"),
            "日本語 太字"
        );
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("  Buy milk  "), Some("Buy milk".to_string()));
        assert_eq!(
            sanitize_label("two\nlines\tand tab"),
            Some("two lines and tab".to_string())
        );
        assert_eq!(
            sanitize_label("\x1b[31mUrgent\x1b[0m"),
            Some("Urgent".to_string())
        );
    }

    #[test]
    fn test_sanitize_rejects_blank() {
        assert_eq!(sanitize_label(""), None);
        assert_eq!(sanitize_label("   \n\t "), None);
        assert_eq!(sanitize_label("\x1b[0m\x00"), None);
    }
}
