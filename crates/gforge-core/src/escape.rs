//! Escaping for literal text sent into a multiplexer pane.
//!
//! tmux's literal-input mode (`send-keys -l`) still interprets backslash
//! escapes, so raw text needs two substitutions before transmission:
//! backslash -> doubled backslash, then newline -> the two-character
//! sequence `\n`. The order is load-bearing: substituting newlines first
//! would let the backslash pass double the `\` of every inserted `\n`.

use std::time::Duration;

/// Escape `text` for tmux literal-input mode.
///
/// After the multiplexer decodes its input, the pane receives `text`
/// verbatim, including embedded backslashes and newlines.
pub fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Settle delay after delivering `len` bytes of literal text.
///
/// `50ms + ceil(len/100)ms` gives the terminal time to consume the input
/// before another send lands on the same pane.
pub fn send_settle_delay(len: usize) -> Duration {
    Duration::from_millis(50 + (len as u64).div_ceil(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_literal("hello world"), "hello world");
        assert_eq!(escape_literal(""), "");
    }

    #[test]
    fn test_newline_substituted() {
        assert_eq!(escape_literal("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_backslash_doubled() {
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_backslash_doubled_before_newline_substitution() {
        // "regex: \d+\nnext" must reach the wire as "regex: \\d+\nnext"
        // (backslash doubled first, then newline replaced). Reversed order
        // would produce "regex: \\d+\\\\nnext".
        let input = "regex: \\d+\nnext";
        assert_eq!(escape_literal(input), "regex: \\\\d+\\nnext");
    }

    #[test]
    fn test_literal_backslash_n_stays_distinct_from_newline() {
        // A pre-existing two-character "\n" doubles its backslash, so the
        // decoder cannot confuse it with a substituted newline.
        assert_eq!(escape_literal("\\n"), "\\\\n");
        assert_eq!(escape_literal("\n"), "\\n");
    }

    #[test]
    fn test_mixed_sequences() {
        assert_eq!(escape_literal("\\\n\\"), "\\\\\\n\\\\");
    }

    #[test]
    fn test_settle_delay_scales_with_length() {
        assert_eq!(send_settle_delay(0), Duration::from_millis(50));
        assert_eq!(send_settle_delay(1), Duration::from_millis(51));
        assert_eq!(send_settle_delay(100), Duration::from_millis(51));
        assert_eq!(send_settle_delay(101), Duration::from_millis(52));
        assert_eq!(send_settle_delay(250), Duration::from_millis(53));
    }
}
