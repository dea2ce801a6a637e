//! The EDN value model.
mod container;
mod scalar;
mod tag;

pub use container::{List, Map, Set, Vector};
pub use scalar::{Keyword, Rune, Symbol};
pub use tag::Tag;

use crate::decode::{Decode, Decoder, Result, Token};
use crate::encode::{Encode, Encoder};
use crate::escape::{escape_string, format_float};
use ordered_float::OrderedFloat;
use proptest::arbitrary::Arbitrary;
use smol_str::SmolStr;
use std::fmt;

/// An EDN value represented as a recursive enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(SmolStr),
    Char(Rune),
    Keyword(Keyword),
    Symbol(Symbol),
    List(List),
    Vector(Vector),
    Set(Set),
    Map(Map),
    Tag(Tag),
}

impl Value {
    pub fn list(values: Vec<Value>) -> Self {
        Value::List(List::from(values))
    }

    pub fn vector(values: Vec<Value>) -> Self {
        Value::Vector(Vector::from(values))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl Decode for Value {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        match decoder.cursor().get() {
            Some(Token::List(_)) => Ok(Value::List(decoder.decode()?)),
            Some(Token::Vector(_)) => Ok(Value::Vector(decoder.decode()?)),
            Some(Token::Set(_)) => Ok(Value::Set(decoder.decode()?)),
            Some(Token::Map(_)) => Ok(Value::Map(decoder.decode()?)),
            Some(Token::Nil) => {
                decoder.nil()?;
                Ok(Value::Nil)
            }
            Some(Token::Bool(_)) => Ok(Value::Bool(decoder.bool()?)),
            Some(Token::Int(_)) => Ok(Value::Int(decoder.int()?)),
            Some(Token::Float(_)) => Ok(Value::Float(decoder.float()?.into())),
            Some(Token::String(_)) => Ok(Value::String(decoder.string()?.clone())),
            Some(Token::Char(_)) => Ok(Value::Char(decoder.decode()?)),
            Some(Token::Keyword(_)) => Ok(Value::Keyword(decoder.decode()?)),
            Some(Token::Symbol(_)) => Ok(Value::Symbol(decoder.decode()?)),
            Some(Token::Tag) => Ok(Value::Tag(decoder.tag()?)),
            None => Err(decoder.error("expected value")),
        }
    }
}

impl Encode for Value {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        match self {
            Value::Nil => encoder.token("nil"),
            Value::Bool(bool) => encoder.token(if *bool { "true" } else { "false" }),
            Value::Int(int) => encoder.token(&int.to_string()),
            Value::Float(float) => encoder.token(&format_float(float.into_inner())?),
            Value::String(string) => encoder.token(&escape_string(string)),
            Value::Char(rune) => encoder.encode(rune),
            Value::Keyword(keyword) => encoder.encode(keyword),
            Value::Symbol(symbol) => encoder.encode(symbol),
            Value::List(list) => encoder.encode(list),
            Value::Vector(vector) => encoder.encode(vector),
            Value::Set(set) => encoder.encode(set),
            Value::Map(map) => encoder.encode(map),
            Value::Tag(tag) => encoder.encode(tag),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(bool) => write!(f, "{}", bool),
            Value::Int(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::String(string) => f.write_str(string),
            Value::Char(rune) => write!(f, "{}", rune),
            Value::Keyword(keyword) => write!(f, "{}", keyword),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::List(list) => write!(f, "{}", list),
            Value::Vector(vector) => write!(f, "{}", vector),
            Value::Set(set) => write!(f, "{}", set),
            Value::Map(map) => write!(f, "{}", map),
            Value::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value.into())
    }
}

impl From<SmolStr> for Value {
    fn from(value: SmolStr) -> Self {
        Self::String(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Self::Char(Rune(value))
    }
}

impl From<Rune> for Value {
    fn from(value: Rune) -> Self {
        Self::Char(value)
    }
}

impl From<Keyword> for Value {
    fn from(value: Keyword) -> Self {
        Self::Keyword(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl From<Vector> for Value {
    fn from(value: Vector) -> Self {
        Self::Vector(value)
    }
}

impl From<Set> for Value {
    fn from(value: Set) -> Self {
        Self::Set(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Tag> for Value {
    fn from(value: Tag) -> Self {
        Self::Tag(value)
    }
}

/// Names that would be read back as something other than a symbol.
fn is_reserved(name: &str) -> bool {
    matches!(name, "nil" | "true" | "false")
}

impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let name = "[a-z][a-z0-9.*+!_?-]{0,8}";
        let leaf = proptest::prop_oneof![
            Just(Value::Nil),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-1.0e15..1.0e15f64).prop_map(Value::from),
            any::<String>().prop_map(Value::from),
            any::<char>().prop_map(Value::from),
            name.prop_map(|name| Value::Keyword(Keyword::new(name))),
            name.prop_filter("reserved", |name| !is_reserved(name))
                .prop_map(|name| Value::Symbol(Symbol::new(name))),
        ];

        leaf.prop_recursive(6, 128, 8, move |inner| {
            proptest::prop_oneof![
                proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::list),
                proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::vector),
                proptest::collection::hash_set(inner.clone(), 0..8)
                    .prop_map(|set| Value::Set(set.into())),
                proptest::collection::hash_map(inner.clone(), inner.clone(), 0..8)
                    .prop_map(|map| Value::Map(map.into())),
                (name, inner).prop_map(|(name, value)| Value::Tag(Tag::new(name, value))),
            ]
        })
        .boxed()
    }
}
