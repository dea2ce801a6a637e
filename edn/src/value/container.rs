use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};

use super::Value;
use crate::decode::{Decode, Decoder, ParseError, Result};
use crate::encode::{Encode, Encoder};

/// Implements the conversions shared by all collection types.
macro_rules! impl_collection {
    ($name:ident, $inner:ty, $item:ty) => {
        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$inner> for $name {
            fn from(inner: $inner) -> Self {
                Self(inner)
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = <$inner as IntoIterator>::IntoIter;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

/// An ordered sequence written as `[a b c]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Vector(Vec<Value>);

/// An ordered sequence written as `(a b c)`.
///
/// Lists and vectors hold the same data but are never interchangeable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct List(Vec<Value>);

/// An unordered collection of distinct values written as `#{a b c}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set(HashSet<Value>);

/// An unordered association written as `{k v, k v}`.
///
/// Inserting a key that is already present replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map(HashMap<Value, Value>);

impl_collection!(Vector, Vec<Value>, Value);
impl_collection!(List, Vec<Value>, Value);
impl_collection!(Set, HashSet<Value>, Value);
impl_collection!(Map, HashMap<Value, Value>, (Value, Value));

fn hash_one(value: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// Sets and maps have no defined iteration order, so their members are hashed
// individually and combined with a commutative sum.
impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self
            .0
            .iter()
            .fold(0u64, |sum, value| sum.wrapping_add(hash_one(value)));
        self.0.len().hash(state);
        sum.hash(state);
    }
}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self
            .0
            .iter()
            .fold(0u64, |sum, entry| sum.wrapping_add(hash_one(entry)));
        self.0.len().hash(state);
        sum.hash(state);
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a Value>,
) -> fmt::Result {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_joined(f, &self.0)?;
        f.write_str("]")
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_joined(f, &self.0)?;
        f.write_str(")")
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#{")?;
        write_joined(f, &self.0)?;
        f.write_str("}")
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", key, value)?;
        }
        f.write_str("}")
    }
}

impl Decode for Vector {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.vector(|decoder| Ok(Vector(decoder.decode()?)))
    }
}

impl Decode for List {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.list(|decoder| Ok(List(decoder.decode()?)))
    }
}

impl Decode for Set {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.set(|decoder| {
            let mut set = HashSet::<Value>::new();
            while !decoder.is_empty() {
                set.insert(decoder.decode()?);
            }
            Ok(Set(set))
        })
    }
}

impl Decode for Map {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        decoder.map(|decoder| {
            let mut map = HashMap::<Value, Value>::new();
            while !decoder.is_empty() {
                let key = decoder.decode()?;
                if decoder.is_empty() {
                    let span = decoder.parent_span();
                    return Err(ParseError::new("map literal is missing a value", span).into());
                }
                let value = decoder.decode()?;
                map.insert(key, value);
            }
            Ok(Map(map))
        })
    }
}

impl Encode for Vector {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.vector(|encoder| encoder.encode(&self.0))
    }
}

impl Encode for List {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.list(|encoder| encoder.encode(&self.0))
    }
}

impl Encode for Set {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.set(|encoder| {
            for value in &self.0 {
                encoder.encode(value)?;
            }
            Ok(())
        })
    }
}

impl Encode for Map {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.map(|encoder| {
            for (key, value) in &self.0 {
                encoder.entry(|encoder| {
                    encoder.encode(key)?;
                    encoder.encode(value)
                })?;
            }
            Ok(())
        })
    }
}
