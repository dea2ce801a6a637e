use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;

use super::Value;
use crate::decode::{decode_at_depth, DecodeError, Result};
use crate::encode::{Encode, Encoder};
use crate::lexer::{Classifier, LexState};

/// A tagged literal such as `#inst "1985-04-12T23:20:50.52Z"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: SmolStr,
    pub value: Box<Value>,
}

impl Tag {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value.into()),
        }
    }

    /// Decodes a tagged literal from a buffer that starts with the tag.
    ///
    /// The tag name is found by feeding the buffer to a [`Classifier`] one
    /// character at a time. Everything after the name is decoded as the
    /// payload, which must be exactly one value.
    pub fn from_edn(bytes: &[u8]) -> Result<Self> {
        Self::decode_at_depth(std::str::from_utf8(bytes)?, 1)
    }

    /// Decodes a tagged literal whose payload sits `depth` levels deep.
    ///
    /// Syntax errors in the payload are reported relative to `source`.
    pub(crate) fn decode_at_depth(source: &str, depth: usize) -> Result<Self> {
        let name = scan_name(source)?;
        let value = decode_at_depth(&source[name.end..], depth)
            .map_err(|err| err.offset(name.end))?;

        Ok(Self {
            name: SmolStr::new(&source[name]),
            value: Box::new(value),
        })
    }
}

/// Finds the span of the tag name at the start of `source`, excluding the `#`.
pub(crate) fn scan_name(source: &str) -> Result<Range<usize>> {
    let mut classifier = Classifier::new();
    let mut chars = source.chars();
    let mut start = 0;
    let mut end = 0;

    loop {
        let c = chars.next().ok_or(DecodeError::UnexpectedEndOfTag)?;

        match classifier.classify(c) {
            LexState::Ignore => {
                start += c.len_utf8();
                end += c.len_utf8();
            }
            LexState::Error(err) => return Err(err.into()),
            LexState::EndPrevious => break,
            LexState::End => return Err(DecodeError::UnexpectedEnd),
            LexState::Continue => end += c.len_utf8(),
        }
    }

    // The classifier only ends a name after it has seen the sigil.
    let name = start + 1..end;
    if name.is_empty() {
        return Err(DecodeError::EmptyTagName);
    }

    tracing::trace!(name = &source[name.clone()], end, "scanned tag");
    Ok(name)
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.name, self.value)
    }
}

impl Encode for Tag {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.tag(&self.name, |encoder| encoder.encode(&self.value))
    }
}
