use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// CJK characters and emoji count as two columns, combining marks as zero.
///
/// ```
/// use devhub::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("你好"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Ellipsis appended by the truncation helpers
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends "..." when text is cut. Widths of 3 or less cannot hold a
/// character plus the ellipsis, so those return as many characters as fit.
/// Returns `Cow::Borrowed` when the string already fits.
///
/// ```
/// use devhub::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut byte_end = 0;
        let mut current_width = 0;
        for (idx, c) in s.char_indices() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width > max_width {
                break;
            }
            current_width += char_width;
            byte_end = idx + c.len_utf8();
        }
        if byte_end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..byte_end].to_string());
    }
    let target_width = max_width.saturating_sub(ELLIPSIS_WIDTH);

    let mut current_width = 0;
    let mut cut_point = None;
    let mut exceeded_max = false;

    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);

        if cut_point.is_none() && current_width + char_width > target_width {
            cut_point = Some(idx);
        }
        if current_width + char_width > max_width {
            exceeded_max = true;
            break;
        }
        current_width += char_width;
    }

    if exceeded_max {
        let cut = cut_point.unwrap_or(s.len());
        Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
    } else {
        Cow::Borrowed(s)
    }
}

/// Keeps the first `max_chars` characters and appends "..." if anything was cut.
///
/// This is the character budget used for post previews, where the ellipsis
/// comes on top of the budget rather than inside it.
///
/// ```
/// use devhub::util::truncate_chars;
///
/// assert_eq!(truncate_chars("abcdef", 3), "abc...");
/// assert_eq!(truncate_chars("abc", 3), "abc");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &s[..byte_idx], ELLIPSIS)),
        None => Cow::Borrowed(s),
    }
}

/// Shortens a label so the ellipsis fits inside `max_chars`.
///
/// Used for activity titles in the sidebar (`max_chars` includes the "...").
pub fn shorten_label(s: &str, max_chars: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_chars {
        return Cow::Borrowed(s);
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let end = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(s.len());
    Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
}

/// Tags whose opening or closing form ends a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
    "tr",
];

/// Elements whose content is never text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Converts rich-text HTML into plain text.
///
/// Tags are removed, block-level elements become line breaks, `<script>` and
/// `<style>` content is dropped and the common character entities are decoded.
/// Runs of blank lines collapse to a single blank line.
///
/// ```
/// use devhub::util::strip_markup;
///
/// assert_eq!(strip_markup("<p>Hello <b>world</b></p>"), "Hello world");
/// assert_eq!(strip_markup("a &amp; b"), "a & b");
/// ```
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut skipping: Option<&'static str> = None;

    while let Some(lt) = rest.find('<') {
        if skipping.is_none() {
            push_decoded(&mut out, &rest[..lt]);
        }
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            // Unterminated tag: treat the remainder as text
            if skipping.is_none() {
                push_decoded(&mut out, &rest[lt..]);
            }
            rest = "";
            break;
        };
        let raw = after[..gt].trim();
        rest = &after[gt + 1..];

        let closing = raw.starts_with('/');
        let name: String = raw
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(skipped) = skipping {
            if closing && name == skipped {
                skipping = None;
            }
            continue;
        }

        if !closing {
            if let Some(skipped) = SKIPPED_ELEMENTS.iter().copied().find(|s| *s == name) {
                if !raw.ends_with('/') {
                    skipping = Some(skipped);
                }
                continue;
            }
        }

        if BLOCK_TAGS.contains(&name.as_str()) && !out.ends_with('\n') && !out.is_empty() {
            out.push('\n');
        }
    }
    if skipping.is_none() {
        push_decoded(&mut out, rest);
    }

    collapse_blank_lines(&out)
}

/// Decodes HTML character entities while appending `text` to `out`.
fn push_decoded(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        // Entities are short; anything longer is a literal ampersand
        let semi = after.find(';').filter(|&i| i > 0 && i <= 10);
        match semi.and_then(|i| decode_entity(&after[..i]).map(|c| (i, c))) {
            Some((i, c)) => {
                out.push(c);
                rest = &after[i + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;
    for line in text.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
        previous_blank = blank;
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Removes terminal control characters and ANSI escape sequences.
///
/// Server-supplied text (titles, bodies, usernames) is rendered straight into
/// the terminal, so CSI and OSC sequences, bare ESC and C0 controls other
/// than tab, newline and carriage return are dropped.
///
/// Returns `Cow::Borrowed` when nothing needed stripping.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let len = bytes.len();

    let is_unsafe =
        |b: u8| b == 0x1b || b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d);

    if !bytes.iter().any(|&b| is_unsafe(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == 0x1b {
            if i + 1 < len && bytes[i + 1] == b'[' {
                // CSI: parameters until a final byte in 0x40..=0x7e
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            } else if i + 1 < len && bytes[i + 1] == b']' {
                // OSC: until BEL or ST
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && i + 1 < len && bytes[i + 1] == b'\\' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            } else {
                i += 1;
            }
        } else if is_unsafe(b) {
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < len && !is_unsafe(bytes[i]) {
                i += 1;
            }
            // SAFETY: splits only happen at ASCII control bytes, which are
            // never part of a multi-byte UTF-8 sequence.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn test_cjk_truncation() {
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好", 10), "你好");
    }

    #[test]
    fn test_edge_case_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("你好", 1), "");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_truncate_chars_appends_ellipsis_past_budget() {
        let body = "x".repeat(200);
        let preview = truncate_chars(&body, 150);
        assert_eq!(preview.chars().count(), 153);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_truncate_chars_exact_budget_is_borrowed() {
        let body = "y".repeat(150);
        assert!(matches!(truncate_chars(&body, 150), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
    }

    #[test]
    fn test_shorten_label_keeps_total_length() {
        let title = "Understanding async Rust in production services";
        let short = shorten_label(title, 30);
        assert_eq!(short.chars().count(), 30);
        assert!(short.ends_with("..."));
        assert_eq!(shorten_label("Short title", 30), "Short title");
    }

    #[test]
    fn test_strip_markup_paragraphs_become_lines() {
        let html = "<h1>Title</h1><p>First <em>para</em></p><p>Second</p>";
        assert_eq!(strip_markup(html), "Title\nFirst para\nSecond");
    }

    #[test]
    fn test_strip_markup_decodes_entities() {
        assert_eq!(
            strip_markup("<p>fn main() -&gt; () &#123; &quot;hi&quot; &#x7d;</p>"),
            "fn main() -> () { \"hi\" }"
        );
    }

    #[test]
    fn test_strip_markup_leaves_unknown_ampersands() {
        assert_eq!(strip_markup("Tom & Jerry &bogus; R&D"), "Tom & Jerry &bogus; R&D");
    }

    #[test]
    fn test_strip_markup_drops_script_content() {
        let html = "<p>safe</p><script>alert('x')</script><style>p{}</style><p>text</p>";
        assert_eq!(strip_markup(html), "safe\ntext");
    }

    #[test]
    fn test_strip_markup_unterminated_tag_is_text() {
        assert_eq!(strip_markup("a < b"), "a < b");
    }

    #[test]
    fn test_strip_markup_plain_text_unchanged() {
        assert_eq!(strip_markup("no markup here"), "no markup here");
        assert_eq!(strip_markup(""), "");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Hello, world!\n\ttabbed";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_ansi_and_osc() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_control_chars("\x1b]0;title\x07safe"), "safe");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\safe"), "safe");
        assert_eq!(strip_control_chars("he\x00ll\x07o\x7f"), "hello");
    }

    proptest! {
        #[test]
        fn prop_truncate_to_width_fits(s in "[a-zA-Z0-9 你好世界]{0,80}", width in 0usize..60) {
            let out = truncate_to_width(&s, width);
            prop_assert!(display_width(&out) <= width);
        }

        #[test]
        fn prop_truncate_chars_bounded(s in "[a-z éü]{0,300}", budget in 0usize..200) {
            let out = truncate_chars(&s, budget);
            prop_assert!(out.chars().count() <= budget + 3);
        }

        #[test]
        fn prop_strip_markup_never_emits_tags(s in "(<[a-z]{1,6}>|</[a-z]{1,6}>|[a-z ]{1,6}){0,12}") {
            let out = strip_markup(&s);
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains('>'));
        }
    }
}
