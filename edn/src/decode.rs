//! Decode values from EDN text.
use crate::lexer::{lex, ClassifyError};
use crate::value::{Keyword, Rune, Symbol, Tag};
use delegate::delegate;
use smol_str::SmolStr;
use std::fmt::Display;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub(crate) enum Token {
    List(usize),
    Vector(usize),
    Set(usize),
    Map(usize),
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(SmolStr),
    Char(char),
    Keyword(SmolStr),
    Symbol(SmolStr),
    Tag,
}

/// A lexed representation of an EDN string that can be decoded.
#[derive(Debug, Clone)]
pub struct TokenBuffer<'a> {
    pub(crate) source: &'a str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) spans: Vec<Span>,
    /// Nesting depth of the value this buffer was lexed for.
    pub(crate) depth: usize,
}

impl<'a> TokenBuffer<'a> {
    pub fn new(str: &'a str) -> Result<Self> {
        Self::with_depth(str, 0)
    }

    pub(crate) fn with_depth(str: &'a str, depth: usize) -> Result<Self> {
        let mut buffer = lex(str).map_err(|err| ParseError::new(&err, err.span()))?;
        buffer.depth = depth;
        Ok(buffer)
    }

    #[inline]
    pub fn cursor(&'a self) -> Cursor<'a> {
        Cursor {
            buffer: self,
            index: 0,
            end_index: self.tokens.len(),
            parent: None,
            depth: self.depth,
        }
    }

    #[inline]
    pub fn decoder(&'a self) -> Decoder<'a> {
        Decoder::new(self.cursor())
    }
}

/// A decoder that is stepping through a [`TokenBuffer`].
#[derive(Clone)]
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Decoder<'a> {
    #[inline]
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }

    #[inline]
    pub fn decode<T>(&mut self) -> Result<T>
    where
        T: Decode,
    {
        T::decode(self)
    }

    pub fn nil(&mut self) -> Result<()> {
        self.step(|cursor| cursor.nil().ok_or_else(|| cursor.error("expected nil")))
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.step(|cursor| cursor.bool().ok_or_else(|| cursor.error("expected boolean")))
    }

    pub fn int(&mut self) -> Result<i64> {
        self.step(|cursor| cursor.int().ok_or_else(|| cursor.error("expected integer")))
    }

    pub fn float(&mut self) -> Result<f64> {
        self.step(|cursor| cursor.float().ok_or_else(|| cursor.error("expected float")))
    }

    pub fn string(&mut self) -> Result<&'a SmolStr> {
        self.step(|cursor| {
            cursor
                .string()
                .ok_or_else(|| cursor.error("expected string"))
        })
    }

    pub fn char(&mut self) -> Result<char> {
        self.step(|cursor| {
            cursor
                .char()
                .ok_or_else(|| cursor.error("expected character"))
        })
    }

    pub fn keyword(&mut self) -> Result<&'a SmolStr> {
        self.step(|cursor| {
            cursor
                .keyword()
                .ok_or_else(|| cursor.error("expected keyword"))
        })
    }

    pub fn symbol(&mut self) -> Result<&'a SmolStr> {
        self.step(|cursor| {
            cursor
                .symbol()
                .ok_or_else(|| cursor.error("expected symbol"))
        })
    }

    /// Decode a tagged literal.
    ///
    /// The source text of the tag and its payload is handed to the tag
    /// scanner, which finds the tag name and decodes the payload one level
    /// deeper. Syntax errors from the payload are moved back into this
    /// buffer's coordinates.
    pub fn tag(&mut self) -> Result<Tag> {
        let cursor = self.cursor;
        let source = self.step(|cursor| {
            cursor
                .tag()
                .ok_or_else(|| cursor.error("expected tag"))
        })?;

        if cursor.depth >= MAX_DEPTH {
            return Err(cursor.error(format!("nesting is deeper than {} levels", MAX_DEPTH)));
        }

        Tag::decode_at_depth(source, cursor.depth + 1)
            .map_err(|err| err.offset(cursor.token_span().start))
    }

    pub fn list<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let (inner, after) = self
            .cursor
            .list()
            .ok_or_else(|| self.error("expected list"))?;
        self.enter(inner, after, "expected end of list", f)
    }

    pub fn vector<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let (inner, after) = self
            .cursor
            .vector()
            .ok_or_else(|| self.error("expected vector"))?;
        self.enter(inner, after, "expected end of vector", f)
    }

    pub fn set<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let (inner, after) = self
            .cursor
            .set()
            .ok_or_else(|| self.error("expected set"))?;
        self.enter(inner, after, "expected end of set", f)
    }

    pub fn map<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let (inner, after) = self
            .cursor
            .map()
            .ok_or_else(|| self.error("expected map"))?;
        self.enter(inner, after, "expected end of map", f)
    }

    fn enter<T, F>(
        &mut self,
        inner: Cursor<'a>,
        after: Cursor<'a>,
        message: &str,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if inner.depth > MAX_DEPTH {
            return Err(self.error(format!("nesting is deeper than {} levels", MAX_DEPTH)));
        }

        self.cursor = inner;
        let result = f(self)?;

        if !self.cursor.is_empty() {
            return Err(self.cursor.error(message));
        }

        self.cursor = after;
        Ok(result)
    }

    #[inline]
    pub fn step<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(Cursor<'a>) -> Result<(T, Cursor<'a>)>,
    {
        let (result, cursor) = f(self.cursor)?;
        self.cursor = cursor;
        Ok(result)
    }

    #[inline]
    pub fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }

    delegate! {
        to self.cursor {
            pub fn is_empty(&self) -> bool;
            pub fn span(&self) -> Span;
            pub fn parent_span(&self) -> Span;
            pub fn error(&self, message: impl Display) -> DecodeError;
        }
    }
}

/// A position into a [`TokenBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buffer: &'a TokenBuffer<'a>,
    index: usize,
    end_index: usize,
    parent: Option<usize>,
    depth: usize,
}

impl<'a> Cursor<'a> {
    pub fn decode<T>(self) -> Result<(T, Self)>
    where
        T: Decode,
    {
        let mut decoder = Decoder::new(self);
        let result = decoder.decode()?;
        let cursor = decoder.cursor();
        Ok((result, cursor))
    }

    pub fn error(self, message: impl Display) -> DecodeError {
        ParseError::new(message, self.span()).into()
    }

    fn advance(self, size: usize) -> Self {
        Self {
            buffer: self.buffer,
            index: self.index + size,
            end_index: self.end_index,
            parent: self.parent,
            depth: self.depth,
        }
    }

    pub fn nil(self) -> Option<((), Self)> {
        match self.get()? {
            Token::Nil => Some(((), self.advance(1))),
            _ => None,
        }
    }

    pub fn bool(self) -> Option<(bool, Self)> {
        match self.get()? {
            Token::Bool(bool) => Some((*bool, self.advance(1))),
            _ => None,
        }
    }

    pub fn int(self) -> Option<(i64, Self)> {
        match self.get()? {
            Token::Int(int) => Some((*int, self.advance(1))),
            _ => None,
        }
    }

    pub fn float(self) -> Option<(f64, Self)> {
        match self.get()? {
            Token::Float(float) => Some((*float, self.advance(1))),
            _ => None,
        }
    }

    pub fn string(self) -> Option<(&'a SmolStr, Self)> {
        match self.get()? {
            Token::String(string) => Some((string, self.advance(1))),
            _ => None,
        }
    }

    pub fn char(self) -> Option<(char, Self)> {
        match self.get()? {
            Token::Char(char) => Some((*char, self.advance(1))),
            _ => None,
        }
    }

    pub fn keyword(self) -> Option<(&'a SmolStr, Self)> {
        match self.get()? {
            Token::Keyword(name) => Some((name, self.advance(1))),
            _ => None,
        }
    }

    pub fn symbol(self) -> Option<(&'a SmolStr, Self)> {
        match self.get()? {
            Token::Symbol(name) => Some((name, self.advance(1))),
            _ => None,
        }
    }

    /// Returns the source text from the tag sigil to the end of the payload.
    ///
    /// When there is no payload in the current sequence, the text is just the tag itself.
    pub fn tag(self) -> Option<(&'a str, Self)> {
        match self.get()? {
            Token::Tag => {
                let payload = self.advance(1);
                let end = if payload.is_empty() {
                    self.token_span().end
                } else {
                    payload.tree_end()
                };
                let source = &self.buffer.source[self.token_span().start..end];
                Some((source, payload.advance(payload.tree_size())))
            }
            _ => None,
        }
    }

    pub fn list(self) -> Option<(Self, Self)> {
        match self.get()? {
            Token::List(size) => Some(self.split(1, *size)),
            _ => None,
        }
    }

    pub fn vector(self) -> Option<(Self, Self)> {
        match self.get()? {
            Token::Vector(size) => Some(self.split(1, *size)),
            _ => None,
        }
    }

    pub fn set(self) -> Option<(Self, Self)> {
        match self.get()? {
            Token::Set(size) => Some(self.split(1, *size)),
            _ => None,
        }
    }

    pub fn map(self) -> Option<(Self, Self)> {
        match self.get()? {
            Token::Map(size) => Some(self.split(1, *size)),
            _ => None,
        }
    }

    fn split(self, skip: usize, size: usize) -> (Self, Self) {
        let left = Cursor {
            buffer: self.buffer,
            index: self.index + skip,
            end_index: self.index + size + skip,
            parent: Some(self.index),
            depth: self.depth + 1,
        };

        let right = Cursor {
            buffer: self.buffer,
            index: self.index + skip + size,
            end_index: self.end_index,
            parent: self.parent,
            depth: self.depth,
        };

        (left, right)
    }

    /// Number of tokens taken up by the value at the cursor.
    fn tree_size(self) -> usize {
        match self.get() {
            None => 0,
            Some(Token::List(size) | Token::Vector(size) | Token::Set(size) | Token::Map(size)) => {
                1 + size
            }
            Some(Token::Tag) => 1 + self.advance(1).tree_size(),
            Some(_) => 1,
        }
    }

    /// Source offset at which the value at the cursor ends.
    fn tree_end(self) -> usize {
        match self.get() {
            Some(Token::Tag) if !self.advance(1).is_empty() => self.advance(1).tree_end(),
            _ => self.token_span().end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.end_index
    }

    #[inline]
    pub(crate) fn get(&self) -> Option<&'a Token> {
        if self.is_empty() {
            None
        } else {
            Some(&self.buffer.tokens[self.index])
        }
    }

    /// Span of the value at the cursor.
    ///
    /// Collections cover their delimiters and tags cover their payload.
    #[inline]
    pub fn span(&self) -> Span {
        match self.get() {
            Some(Token::Tag) => self.token_span().start..self.tree_end(),
            _ => self.token_span(),
        }
    }

    /// Span of the single token at the cursor.
    fn token_span(&self) -> Span {
        if self.is_empty() {
            let offset = self.parent_span().end;
            offset..offset
        } else {
            self.buffer.spans[self.index].clone()
        }
    }

    #[inline]
    pub fn parent_span(&self) -> Span {
        match self.parent {
            Some(parent) => self.buffer.spans[parent].clone(),
            None => 0..self.buffer.source.len(),
        }
    }
}

/// Trait for types that can be decoded from EDN.
pub trait Decode: Sized {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self>;
}

/// Decodes all remaining values of the current sequence.
impl<V: Decode> Decode for Vec<V> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        let mut values = Vec::new();
        while !decoder.is_empty() {
            values.push(decoder.decode()?);
        }
        Ok(values)
    }
}

/// `nil` decodes to `None`.
impl<V: Decode> Decode for Option<V> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        if decoder.cursor().nil().is_some() {
            decoder.nil()?;
            Ok(None)
        } else {
            Ok(Some(decoder.decode()?))
        }
    }
}

impl<V: Decode> Decode for Box<V> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Box::new(decoder.decode()?))
    }
}

impl<V: Decode> Decode for Rc<V> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Rc::new(decoder.decode()?))
    }
}

impl<V: Decode> Decode for Arc<V> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Arc::new(decoder.decode()?))
    }
}

impl Decode for bool {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.bool()
    }
}

impl Decode for i64 {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.int()
    }
}

impl Decode for f64 {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.float()
    }
}

impl Decode for SmolStr {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.string().cloned()
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(decoder.string()?.to_string())
    }
}

impl Decode for Keyword {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Keyword::new(decoder.keyword()?.clone()))
    }
}

impl Decode for Symbol {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Symbol::new(decoder.symbol()?.clone()))
    }
}

impl Decode for Rune {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        Ok(Rune(decoder.char()?))
    }
}

impl Decode for Tag {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.tag()
    }
}

/// A syntax error with the span it was found at.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    span: Span,
}

impl ParseError {
    pub fn new(message: impl Display, span: Span) -> Self {
        ParseError {
            message: message.to_string(),
            span,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// Moves the span `by` bytes further into the source.
    pub(crate) fn offset(mut self, by: usize) -> Self {
        self.span = self.span.start + by..self.span.end + by;
        self
    }
}

/// Errors that can occur while decoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("unexpected end of tag")]
    UnexpectedEndOfTag,
    #[error("tag literal ended without a payload")]
    UnexpectedEnd,
    #[error("tag name is empty")]
    EmptyTagName,
    #[error("input is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Syntax(#[from] ParseError),
}

impl DecodeError {
    /// Moves the span of a syntax error `by` bytes further into the source.
    pub(crate) fn offset(self, by: usize) -> Self {
        match self {
            DecodeError::Syntax(err) => DecodeError::Syntax(err.offset(by)),
            err => err,
        }
    }
}

/// Shorthand for a result specialised to decode errors.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Span within a string.
pub type Span = Range<usize>;

/// The deepest nesting of collections and tags that can be decoded.
///
/// Going past it is a syntax error rather than unbounded recursion.
pub const MAX_DEPTH: usize = 128;

/// Decode a `T` from an EDN string.
///
/// The string must contain exactly one value, optionally surrounded by
/// whitespace and comments. Decoding into a `Vec<T>` instead reads every
/// value in the string.
pub fn from_str<T: Decode>(source: &str) -> Result<T> {
    tracing::debug!(len = source.len(), "decoding edn");
    decode_at_depth(source, 0)
}

/// Decode exactly one `T` whose outermost value sits `depth` levels deep.
pub(crate) fn decode_at_depth<T: Decode>(source: &str, depth: usize) -> Result<T> {
    let buffer = TokenBuffer::with_depth(source, depth)?;
    let mut decoder = buffer.decoder();
    let value = decoder.decode()?;

    if !decoder.is_empty() {
        return Err(decoder.error("unexpected content after value"));
    }

    Ok(value)
}

/// Decode a `T` from a buffer of UTF-8 encoded EDN.
pub fn from_slice<T: Decode>(bytes: &[u8]) -> Result<T> {
    from_str(std::str::from_utf8(bytes)?)
}

#[cfg(test)]
mod test {
    use super::{from_slice, from_str, DecodeError, MAX_DEPTH};
    use crate::value::{Keyword, Rune, Symbol, Tag, Value};
    use rstest::rstest;

    #[test]
    fn decodes_typed_scalars() {
        assert_eq!(42, from_str::<i64>(" 42 ").unwrap());
        assert_eq!(-1.5, from_str::<f64>("-1.5").unwrap());
        assert!(from_str::<bool>("true").unwrap());
        assert_eq!("a\tb", from_str::<String>(r#""a\tb""#).unwrap());
        assert_eq!(Keyword::new("a/b"), from_str::<Keyword>(":a/b").unwrap());
        assert_eq!(Symbol::new("+"), from_str::<Symbol>("+").unwrap());
        assert_eq!(Rune('\n'), from_str::<Rune>(r"\newline").unwrap());
        assert_eq!(None, from_str::<Option<i64>>("nil").unwrap());
        assert_eq!(Some(3), from_str::<Option<i64>>("3").unwrap());
    }

    #[test]
    fn decodes_every_top_level_value_into_vec() {
        let values: Vec<i64> = from_str("1 2 ; three\n 4").unwrap();
        assert_eq!(vec![1, 2, 4], values);
    }

    #[test]
    fn decodes_tags_inside_collections() {
        let value: Value = from_str("[#a 1 #b [2] 3]").unwrap();
        assert_eq!(
            Value::vector(vec![
                Tag::new("a", 1).into(),
                Tag::new("b", Value::vector(vec![2.into()])).into(),
                3.into(),
            ]),
            value
        );
    }

    #[test]
    fn decodes_tag_with_tagged_payload_inside_collection() {
        let value: Value = from_str("(#a #b :c :d)").unwrap();
        assert_eq!(
            Value::list(vec![
                Tag::new("a", Tag::new("b", Keyword::new("c"))).into(),
                Keyword::new("d").into(),
            ]),
            value
        );
    }

    #[rstest]
    #[case("", "expected value")]
    #[case("1 2", "unexpected content after value")]
    #[case("{:a}", "map literal is missing a value")]
    #[case("(1", "unexpected end of file")]
    #[case("#a1 @", "syntax error")]
    fn test_syntax_errors(#[case] source: &str, #[case] message: &str) {
        match from_str::<Value>(source) {
            Err(DecodeError::Syntax(err)) => assert_eq!(message, err.message()),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn error_spans_point_into_source() {
        let Err(DecodeError::Syntax(err)) = from_str::<Value>("[1 2] 3") else {
            panic!("expected syntax error");
        };
        assert_eq!(6..7, err.span());
    }

    #[rstest]
    #[case("[1 2 3 4 5 #a {:k}]", 14..18)]
    #[case("#a #b {:k}", 6..10)]
    #[case("[#a (1 #b [2 {3}] x)]", 13..16)]
    fn test_payload_error_spans(#[case] source: &str, #[case] span: std::ops::Range<usize>) {
        match from_str::<Value>(source) {
            Err(DecodeError::Syntax(err)) => {
                assert_eq!("map literal is missing a value", err.message());
                assert_eq!(span, err.span());
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn nesting_up_to_the_limit_decodes() {
        let vectors = format!("{}1{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(from_str::<Value>(&vectors).is_ok());

        let tags = format!("{}1", "#a ".repeat(MAX_DEPTH));
        assert!(from_str::<Value>(&tags).is_ok());
    }

    #[rstest]
    #[case(MAX_DEPTH + 1)]
    #[case(10_000)]
    fn test_deep_vectors_are_rejected(#[case] depth: usize) {
        let source = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        match from_str::<Value>(&source) {
            Err(DecodeError::Syntax(err)) => {
                assert!(err.message().starts_with("nesting is deeper than"));
                assert_eq!(MAX_DEPTH, err.span().start);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[rstest]
    #[case(MAX_DEPTH + 1)]
    #[case(1_000)]
    fn test_deep_tags_are_rejected(#[case] depth: usize) {
        let source = format!("{}1", "#a ".repeat(depth));
        match from_str::<Value>(&source) {
            Err(DecodeError::Syntax(err)) => {
                assert!(err.message().starts_with("nesting is deeper than"));
                assert_eq!(3 * MAX_DEPTH..source.len(), err.span());
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn tags_and_collections_share_the_limit() {
        let half = MAX_DEPTH / 2 + 1;
        let source = format!("{}1{}", "#a [".repeat(half), "]".repeat(half));
        assert!(matches!(
            from_str::<Value>(&source),
            Err(DecodeError::Syntax(_))
        ));
    }

    #[test]
    fn typed_decode_reports_mismatch() {
        assert!(matches!(
            from_str::<i64>(":a"),
            Err(DecodeError::Syntax(_))
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            from_slice::<Value>(b"[\xff]"),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn tag_without_payload_in_collection() {
        assert_eq!(
            Err(DecodeError::UnexpectedEndOfTag),
            from_str::<Value>("[1 #a]")
        );
    }
}
