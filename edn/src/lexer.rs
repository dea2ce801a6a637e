use logos::Logos;

use crate::{
    decode::{Span, Token, TokenBuffer},
    escape::{parse_char, unescape},
};

#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(skip r"([ \t\r\n\f,]+|;[^\n]*)+")]
enum LexerToken {
    #[token("(")]
    OpenList,
    #[token(")")]
    CloseList,
    #[token("[")]
    OpenVector,
    #[token("]")]
    CloseVector,
    #[token("#{")]
    OpenSet,
    #[token("{")]
    OpenMap,
    #[token("}")]
    CloseBrace,
    #[token("nil")]
    Nil,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[regex(r"[+-]?[0-9]+")]
    Int,
    #[regex(r"[+-]?[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)")]
    Float,
    #[regex(r#""([^"\\]|\\[^\n])*""#)]
    String,
    #[regex(r"\\(newline|return|space|tab|formfeed|backspace|u[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F]|[^\n])")]
    Char,
    #[regex(r":[a-zA-Z0-9.*+!\-_?$%&=<>/'][a-zA-Z0-9.*+!\-_?$%&=<>/'#]*")]
    Keyword,
    #[regex(r"[a-zA-Z*!_?$%&=<>/'][a-zA-Z0-9.*+!\-_?$%&=<>/'#:]*")]
    #[regex(r"[+\-.]([a-zA-Z*!_?$%&=<>/'+\-.#:][a-zA-Z0-9.*+!\-_?$%&=<>/'#:]*)?")]
    Symbol,
    #[regex(r"#[a-zA-Z][a-zA-Z0-9.*+!\-_?$%&=<>/'#:]*")]
    Tag,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected end of file")]
    Eof(Span),
    #[error("unexpected closing delimiter")]
    UnexpectedClose(Span),
    #[error("closing delimiter does not match the opening one")]
    MismatchedClose(Span),
    #[error("invalid number")]
    InvalidNumber(Span),
    #[error("invalid escape sequence")]
    InvalidEscape(Span),
    #[error("syntax error")]
    Syntax(Span),
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::Eof(span) => span.clone(),
            LexError::UnexpectedClose(span) => span.clone(),
            LexError::MismatchedClose(span) => span.clone(),
            LexError::InvalidNumber(span) => span.clone(),
            LexError::InvalidEscape(span) => span.clone(),
            LexError::Syntax(span) => span.clone(),
        }
    }
}

/// The kind of collection opened by a delimiter that has not been closed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    List,
    Vector,
    Set,
    Map,
}

impl Open {
    fn token(self, size: usize) -> Token {
        match self {
            Open::List => Token::List(size),
            Open::Vector => Token::Vector(size),
            Open::Set => Token::Set(size),
            Open::Map => Token::Map(size),
        }
    }
}

pub fn lex(str: &str) -> Result<TokenBuffer<'_>, LexError> {
    let mut lexer = LexerToken::lexer(str);
    let mut tokens = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut open_stack: Vec<(usize, Open)> = Vec::new();

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let token = token.map_err(|()| LexError::Syntax(span.clone()))?;
        let slice = lexer.slice();

        let token = match token {
            LexerToken::OpenList
            | LexerToken::OpenVector
            | LexerToken::OpenSet
            | LexerToken::OpenMap => {
                let open = match token {
                    LexerToken::OpenList => Open::List,
                    LexerToken::OpenVector => Open::Vector,
                    LexerToken::OpenSet => Open::Set,
                    _ => Open::Map,
                };

                open_stack.push((tokens.len(), open));
                tokens.push(open.token(usize::MAX));
                spans.push(span);
                continue;
            }
            LexerToken::CloseList | LexerToken::CloseVector | LexerToken::CloseBrace => {
                let Some((pos, open)) = open_stack.pop() else {
                    return Err(LexError::UnexpectedClose(span));
                };

                let matches = matches!(
                    (&token, open),
                    (LexerToken::CloseList, Open::List)
                        | (LexerToken::CloseVector, Open::Vector)
                        | (LexerToken::CloseBrace, Open::Set | Open::Map)
                );

                if !matches {
                    return Err(LexError::MismatchedClose(span));
                }

                tokens[pos] = open.token(tokens.len() - pos - 1);
                spans[pos].end = span.end;
                continue;
            }
            LexerToken::Nil => Token::Nil,
            LexerToken::True => Token::Bool(true),
            LexerToken::False => Token::Bool(false),
            LexerToken::Int => {
                Token::Int(slice.parse().map_err(|_| LexError::InvalidNumber(span.clone()))?)
            }
            LexerToken::Float => {
                Token::Float(slice.parse().map_err(|_| LexError::InvalidNumber(span.clone()))?)
            }
            LexerToken::String => {
                let inner = &slice[1..slice.len() - 1];
                let unescaped = unescape(inner).ok_or(LexError::InvalidEscape(span.clone()))?;
                Token::String(unescaped.into())
            }
            LexerToken::Char => {
                Token::Char(parse_char(slice).ok_or(LexError::InvalidEscape(span.clone()))?)
            }
            LexerToken::Keyword => Token::Keyword(slice[1..].into()),
            LexerToken::Symbol => Token::Symbol(slice.into()),
            LexerToken::Tag => Token::Tag,
        };

        tokens.push(token);
        spans.push(span);
    }

    if !open_stack.is_empty() {
        return Err(LexError::Eof(str.len()..str.len()));
    }

    Ok(TokenBuffer {
        source: str,
        tokens,
        spans,
        depth: 0,
    })
}

/// Classification of a single character while scanning a tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexState {
    /// Noise before the tag; not part of the name.
    Ignore,
    /// The character can not appear here.
    Error(ClassifyError),
    /// The name ended before this character.
    EndPrevious,
    /// A complete token ended on this character, so no payload can follow.
    End,
    /// The character belongs to the tag.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("expected `#` to start a tag, found {0:?}")]
    ExpectedSigil(char),
    #[error("a tag name can not start with {0:?}")]
    InvalidTagStart(char),
    #[error("invalid character {0:?} in tag name")]
    InvalidTagCharacter(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ClassifierState {
    #[default]
    Start,
    Sigil,
    Name,
}

/// Character classifier for the tag scanner.
///
/// The classifier is stateful: it must be fed the characters of a single
/// tag literal in order, and a fresh classifier must be used for every scan.
#[derive(Debug, Default)]
pub struct Classifier {
    state: ClassifierState,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, c: char) -> LexState {
        match self.state {
            ClassifierState::Start if is_separator(c) => LexState::Ignore,
            ClassifierState::Start if c == '#' => {
                self.state = ClassifierState::Sigil;
                LexState::Continue
            }
            ClassifierState::Start => LexState::Error(ClassifyError::ExpectedSigil(c)),
            // `#{` opens a set and `#_` discards the next form.
            ClassifierState::Sigil if c == '{' || c == '_' => LexState::End,
            ClassifierState::Sigil if c.is_ascii_alphabetic() => {
                self.state = ClassifierState::Name;
                LexState::Continue
            }
            ClassifierState::Sigil if is_separator(c) || is_delimiter(c) => LexState::EndPrevious,
            ClassifierState::Sigil => LexState::Error(ClassifyError::InvalidTagStart(c)),
            ClassifierState::Name if is_symbol_char(c) => LexState::Continue,
            ClassifierState::Name if is_separator(c) || is_delimiter(c) => LexState::EndPrevious,
            ClassifierState::Name => LexState::Error(ClassifyError::InvalidTagCharacter(c)),
        }
    }
}

/// Characters skipped between tokens.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{c}' | ',')
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\\' | ';')
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '.' | '*' | '+' | '!' | '-' | '_' | '?' | '$' | '%' | '&' | '=' | '<' | '>' | '/'
                | '\'' | '#' | ':'
        )
}

#[cfg(test)]
mod test {
    use super::{lex, ClassifyError, Classifier, LexError, LexState};
    use crate::decode::Token;
    use rstest::rstest;

    fn classify_all(input: &str) -> Vec<LexState> {
        let mut classifier = Classifier::new();
        input.chars().map(|c| classifier.classify(c)).collect()
    }

    #[test]
    fn classifies_tag_name() {
        use LexState::*;
        assert_eq!(
            classify_all("  #foo ("),
            vec![Ignore, Ignore, Continue, Continue, Continue, Continue, EndPrevious, EndPrevious]
        );
    }

    #[rstest]
    #[case("#{", LexState::End)]
    #[case("#_", LexState::End)]
    #[case("# ", LexState::EndPrevious)]
    #[case("#(", LexState::EndPrevious)]
    #[case("#1", LexState::Error(ClassifyError::InvalidTagStart('1')))]
    #[case("#a@", LexState::Error(ClassifyError::InvalidTagCharacter('@')))]
    #[case("#a[", LexState::EndPrevious)]
    #[case("#a:b", LexState::Continue)]
    #[case(":", LexState::Error(ClassifyError::ExpectedSigil(':')))]
    fn test_classify_last(#[case] input: &str, #[case] expected: LexState) {
        assert_eq!(Some(&expected), classify_all(input).last());
    }

    #[test]
    fn collections_record_their_size() {
        let buffer = lex("[1 (2 3)] #{}").unwrap();
        assert!(matches!(
            buffer.tokens.as_slice(),
            [
                Token::Vector(4),
                Token::Int(1),
                Token::List(2),
                Token::Int(2),
                Token::Int(3),
                Token::Set(0)
            ]
        ));
        assert_eq!(0..9, buffer.spans[0]);
        assert_eq!(3..8, buffer.spans[2]);
    }

    #[test]
    fn comments_and_commas_are_skipped() {
        let buffer = lex("; leading\n{:a 1, :b 2} ; trailing").unwrap();
        assert_eq!(5, buffer.tokens.len());
    }

    #[rstest]
    #[case("(1 2", LexError::Eof(4..4))]
    #[case("1)", LexError::UnexpectedClose(1..2))]
    #[case("(1]", LexError::MismatchedClose(2..3))]
    #[case("#{1)", LexError::MismatchedClose(3..4))]
    #[case("99999999999999999999", LexError::InvalidNumber(0..20))]
    #[case(r#""\q""#, LexError::InvalidEscape(0..4))]
    #[case("@", LexError::Syntax(0..1))]
    fn test_lex_errors(#[case] input: &str, #[case] expected: LexError) {
        assert_eq!(expected, lex(input).unwrap_err());
    }

    #[rstest]
    #[case("nil", "nil")]
    #[case("nilly", "symbol")]
    #[case("-", "symbol")]
    #[case("-1", "int")]
    #[case("+.", "symbol")]
    #[case("1.5e3", "float")]
    #[case("2e-2", "float")]
    #[case(":kw", "keyword")]
    #[case("#inst", "tag")]
    #[case(r"\space", "char")]
    #[case(r"\u00a0", "char")]
    fn test_token_kinds(#[case] input: &str, #[case] kind: &str) {
        let buffer = lex(input).unwrap();
        let actual = match &buffer.tokens[..] {
            [Token::Nil] => "nil",
            [Token::Symbol(_)] => "symbol",
            [Token::Int(_)] => "int",
            [Token::Float(_)] => "float",
            [Token::Keyword(_)] => "keyword",
            [Token::Tag] => "tag",
            [Token::Char(_)] => "char",
            _ => "other",
        };
        assert_eq!(kind, actual);
    }
}
