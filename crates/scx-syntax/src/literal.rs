//! Deferred literal decoding.
//!
//! The parser records only where an atom's token starts. These helpers
//! rescan the source from that offset when the evaluator needs the value,
//! applying the same token rules as the [`lexer`](crate::lexer).
//!
//! # Examples
//!
//! ```
//! use scx_syntax::literal;
//!
//! let source = r#"(f -12 2.5 #t "hi there" name)"#;
//! assert_eq!(literal::parse_int(source, 3), Some(-12));
//! assert_eq!(literal::parse_real(source, 7), Some(2.5));
//! assert!(literal::bool_literal(source, 12));
//! assert_eq!(literal::string_literal(source, 15), "hi there");
//! assert_eq!(literal::ident_text(source, 25), "name");
//! ```

use crate::lexer::is_delimiter;
use crate::span::SrcPos;

fn tail(source: &str, pos: SrcPos) -> &[u8] {
    source.as_bytes().get(pos as usize..).unwrap_or_default()
}

fn slice(source: &str, pos: SrcPos, len: usize) -> &str {
    let start = pos as usize;
    source.get(start..start + len).unwrap_or_default()
}

/// Text of the identifier starting at `pos`: the maximal run of bytes that
/// are neither whitespace nor parentheses.
#[must_use]
pub fn ident_text(source: &str, pos: SrcPos) -> &str {
    let len = tail(source, pos)
        .iter()
        .position(|&byte| is_delimiter(byte))
        .unwrap_or(tail(source, pos).len());
    slice(source, pos, len)
}

/// Text of the numeric token starting at `pos`.
#[must_use]
pub fn number_text(source: &str, pos: SrcPos) -> &str {
    let bytes = tail(source, pos);
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .position(|byte| !byte.is_ascii_digit())
            .map_or(bytes.len(), |len| start + len)
    };

    let mut len = digits_from(usize::from(bytes.first() == Some(&b'-')));
    if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
        len = digits_from(len + 1);
    }
    slice(source, pos, len)
}

/// Integer value of the token at `pos`, or `None` if it does not fit in
/// an `i64`.
#[must_use]
pub fn parse_int(source: &str, pos: SrcPos) -> Option<i64> {
    number_text(source, pos).parse().ok()
}

/// Value of the decimal token at `pos`.
#[must_use]
pub fn parse_real(source: &str, pos: SrcPos) -> Option<f64> {
    number_text(source, pos).parse().ok()
}

/// Value of the boolean token whose letter is at `pos`.
#[must_use]
pub fn bool_literal(source: &str, pos: SrcPos) -> bool {
    tail(source, pos).first() == Some(&b't')
}

/// Contents of the string literal whose first byte is at `pos`, up to the
/// closing quote.
#[must_use]
pub fn string_literal(source: &str, pos: SrcPos) -> &str {
    let bytes = tail(source, pos);
    let len = bytes.iter().position(|&byte| byte == b'"').unwrap_or(bytes.len());
    slice(source, pos, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_text_stops_at_delimiters() {
        assert_eq!(ident_text("(<= a b)", 1), "<=");
        assert_eq!(ident_text("(λ)", 1), "λ");
        assert_eq!(ident_text("abc", 0), "abc");
        assert_eq!(ident_text("abc", 10), "");
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text("12abc", 0), "12");
        assert_eq!(number_text("-3.25)", 0), "-3.25");
        assert_eq!(number_text("1.2.3", 0), "1.2");
        assert_eq!(number_text("7.", 0), "7");
    }

    #[test]
    fn test_int_out_of_range() {
        assert_eq!(parse_int("9223372036854775807", 0), Some(i64::MAX));
        assert_eq!(parse_int("9223372036854775808", 0), None);
        assert_eq!(parse_int("-9223372036854775808", 0), Some(i64::MIN));
    }

    #[test]
    fn test_string_literal_has_no_escapes() {
        let source = r#""a\" b""#;
        assert_eq!(string_literal(source, 1), "a\\");
        assert_eq!(string_literal("\"\"", 1), "");
    }

    #[test]
    fn test_bool_literal() {
        assert!(bool_literal("#t", 1));
        assert!(!bool_literal("#f", 1));
    }
}
