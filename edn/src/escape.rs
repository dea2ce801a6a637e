use logos::Logos;
use std::fmt::Write as _;

use crate::encode::EncodeError;

/// Lexer token for the contents of an escaped string.
#[derive(Debug, Clone, Logos)]
enum EscapedToken {
    #[token(r#"\n"#, |_| '\n')]
    #[token(r#"\r"#, |_| '\r')]
    #[token(r#"\t"#, |_| '\t')]
    #[token(r#"\b"#, |_| '\u{8}')]
    #[token(r#"\f"#, |_| '\u{c}')]
    #[token(r#"\""#, |_| '"')]
    #[token(r#"\\"#, |_| '\\')]
    Escaped(char),

    #[regex(r#"\\u[a-fA-F0-9][a-fA-F0-9][a-fA-F0-9][a-fA-F0-9]"#, |lex| parse_unicode(lex.slice()))]
    Unicode(char),

    #[regex(r#"[^\\]"#)]
    Literal,
}

/// Parses a unicode escape sequence of the form `\uHHHH` where `HHHH` are four
/// hexadecimal digits naming a codepoint in the basic multilingual plane.
fn parse_unicode(str: &str) -> Option<char> {
    // Skip the '\u' prefix
    let hex = str.get(2..)?;
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code)
}

/// Replaces escape sequences with their corresponding characters.
pub fn unescape(str: &str) -> Option<String> {
    let mut lexer = EscapedToken::lexer(str);
    let mut output = String::with_capacity(str.len());

    while let Some(token) = lexer.next() {
        let token = token.ok()?;

        match token {
            EscapedToken::Escaped(c) => output.push(c),
            EscapedToken::Unicode(c) => output.push(c),
            EscapedToken::Literal => output.push_str(lexer.slice()),
        }
    }

    Some(output)
}

pub fn escape_string(str: &str) -> String {
    let mut output = String::with_capacity(str.len() + 2);
    output.push('"');

    for c in str.chars() {
        match c {
            '\n' => output.push_str(r#"\n"#),
            '\r' => output.push_str(r#"\r"#),
            '\t' => output.push_str(r#"\t"#),
            '\u{8}' => output.push_str(r#"\b"#),
            '\u{c}' => output.push_str(r#"\f"#),
            '"' => output.push_str(r#"\""#),
            '\\' => output.push_str(r#"\\"#),
            c if c.is_control() => {
                let _ = write!(output, "\\u{:04x}", c as u32);
            }
            c => output.push(c),
        }
    }

    output.push('"');
    output
}

/// Parses a character literal, including its leading backslash.
pub fn parse_char(str: &str) -> Option<char> {
    let body = str.strip_prefix('\\')?;

    match body {
        "newline" => Some('\n'),
        "return" => Some('\r'),
        "space" => Some(' '),
        "tab" => Some('\t'),
        "formfeed" => Some('\u{c}'),
        "backspace" => Some('\u{8}'),
        _ if body.len() == 5 && body.starts_with('u') => {
            let code = u32::from_str_radix(&body[1..], 16).ok()?;
            char::from_u32(code)
        }
        _ => {
            let mut chars = body.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
    }
}

/// Whether a character literal needs a spelled-out form.
///
/// Commas count as whitespace in EDN, and backspace is grouped with the
/// other control characters that have a named literal.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == '\u{8}'
}

/// Appends the character literal for `c` to `output`.
///
/// Visible characters follow the backslash as they are. Whitespace uses one
/// of the six named literals when it has one, `\,` for the comma, and
/// otherwise always falls back to `\uXXXX` with four lowercase hex digits.
/// Vertical tab, for example, is written as `\u000b`.
pub fn escape_char(c: char, output: &mut String) {
    if !is_whitespace(c) {
        output.push('\\');
        output.push(c);
        return;
    }

    match c {
        '\u{8}' => output.push_str(r"\backspace"),
        '\u{c}' => output.push_str(r"\formfeed"),
        '\n' => output.push_str(r"\newline"),
        '\r' => output.push_str(r"\return"),
        '\t' => output.push_str(r"\tab"),
        ' ' => output.push_str(r"\space"),
        c if c.is_ascii_graphic() => {
            output.push('\\');
            output.push(c);
        }
        c => {
            let _ = write!(output, "\\u{:04x}", c as u32);
        }
    }
}

/// Formats a float so that it reads back as a float rather than an integer.
pub fn format_float(float: f64) -> Result<String, EncodeError> {
    if !float.is_finite() {
        return Err(EncodeError::NonFiniteFloat(float));
    }

    Ok(format!("{:?}", float))
}

#[cfg(test)]
mod test {
    use super::{escape_char, escape_string, format_float, is_whitespace, parse_char, unescape};
    use crate::encode::EncodeError;
    use proptest::prelude::*;
    use rstest::rstest;

    fn char_literal(c: char) -> String {
        let mut output = String::new();
        escape_char(c, &mut output);
        output
    }

    #[rstest]
    #[case('a', r"\a")]
    #[case('\\', r"\\")]
    #[case('λ', r"\λ")]
    #[case('\u{8}', r"\backspace")]
    #[case('\u{c}', r"\formfeed")]
    #[case('\n', r"\newline")]
    #[case('\r', r"\return")]
    #[case('\t', r"\tab")]
    #[case(' ', r"\space")]
    #[case(',', r"\,")]
    #[case('\u{b}', r"\u000b")]
    #[case('\u{a0}', r"\u00a0")]
    #[case('\u{2028}', r"\u2028")]
    #[case('\u{3000}', r"\u3000")]
    fn test_escape_char(#[case] c: char, #[case] expected: &str) {
        assert_eq!(expected, char_literal(c));
    }

    #[rstest]
    #[case(r"\newline", '\n')]
    #[case(r"\space", ' ')]
    #[case(r"\backspace", '\u{8}')]
    #[case(r"\u00a0", '\u{a0}')]
    #[case(r"\u", 'u')]
    #[case(r"\,", ',')]
    fn test_parse_char(#[case] literal: &str, #[case] expected: char) {
        assert_eq!(Some(expected), parse_char(literal));
    }

    #[rstest]
    #[case("string", r#""string""#)]
    #[case("\n", r#""\n""#)]
    #[case(r"\", r#""\\""#)]
    #[case("", r#""""#)]
    #[case("say \"hi\"", r#""say \"hi\"""#)]
    #[case("\u{0}", r#""\u0000""#)]
    fn test_escape_string(#[case] string: &str, #[case] expected: &str) {
        assert_eq!(expected, escape_string(string));
    }

    #[rstest]
    #[case(r#"\""#, r#"""#)]
    #[case(r"\b\f", "\u{8}\u{c}")]
    #[case(r"\u263a", "\u{263A}")]
    fn test_unescape(#[case] escaped: &str, #[case] expected: &str) {
        assert_eq!(expected, unescape(escaped).unwrap());
    }

    #[rstest]
    #[case(r"\q")]
    #[case(r"\uD800")]
    #[case(r"\u12")]
    fn test_unescape_invalid(#[case] escaped: &str) {
        assert_eq!(None, unescape(escaped));
    }

    #[rstest]
    #[case(1.0, "1.0")]
    #[case(-0.5, "-0.5")]
    #[case(1e300, "1e300")]
    fn test_format_float(#[case] float: f64, #[case] expected: &str) {
        assert_eq!(expected, format_float(float).unwrap());
    }

    #[test]
    fn non_finite_floats_do_not_format() {
        assert!(matches!(
            format_float(f64::NAN),
            Err(EncodeError::NonFiniteFloat(_))
        ));
        assert!(format_float(f64::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn visible_chars_escape_raw(
            c in any::<char>().prop_filter("visible", |c| !is_whitespace(*c))
        ) {
            prop_assert_eq!(format!("\\{}", c), char_literal(c));
        }

        #[test]
        fn char_literals_parse_back(c: char) {
            prop_assert_eq!(Some(c), parse_char(&char_literal(c)));
        }

        #[test]
        fn strings_unescape_back(string: String) {
            let escaped = escape_string(&string);
            prop_assert_eq!(Some(string), unescape(&escaped[1..escaped.len() - 1]));
        }
    }
}
