//! Encode values as EDN.
//!
//! Scalars that know their own encoded form hand it to the encoder as a
//! finished token. Collections and tags are special-cased by the encoder,
//! which decides how their elements are delimited and laid out.
use std::rc::Rc;
use std::sync::Arc;
mod compact;
mod pretty;
pub use compact::{to_string, to_vec};
pub use pretty::to_string_pretty;

/// Errors that can occur while encoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("can not encode non-finite float {0}")]
    NonFiniteFloat(f64),
}

/// Trait for types that can write EDN.
pub trait Encoder: Sized {
    type Error: From<EncodeError>;

    /// Encode a scalar that is already in its encoded form.
    fn token(&mut self, token: &str) -> Result<(), Self::Error>;

    /// Encode a list given a function that encodes the contents.
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode a vector given a function that encodes the contents.
    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode a set given a function that encodes the members.
    fn set<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode a map given a function that encodes the entries.
    ///
    /// Each key and value pair should be encoded within [`Encoder::entry`].
    fn map<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode a single map entry given a function that encodes the key and the value.
    fn entry<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode a tagged literal given its name and a function that encodes the payload.
    fn tag<F>(&mut self, name: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Encode an encodable value.
    fn encode(&mut self, value: impl Encode) -> Result<(), Self::Error> {
        value.encode(self)
    }
}

/// Trait for types that can be encoded as EDN.
pub trait Encode {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error>;
}

impl<T: Encode + ?Sized> Encode for &T {
    #[inline]
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        (*self).encode(encoder)
    }
}

impl<T: Encode> Encode for Box<T> {
    #[inline]
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.encode(self.as_ref())
    }
}

impl<T: Encode> Encode for Rc<T> {
    #[inline]
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.encode(self.as_ref())
    }
}

impl<T: Encode> Encode for Arc<T> {
    #[inline]
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.encode(self.as_ref())
    }
}

/// Encodes each item in turn, without delimiters.
impl<T: Encode> Encode for Vec<T> {
    #[inline]
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        for item in self {
            encoder.encode(item)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        match self {
            Some(value) => encoder.encode(value),
            None => encoder.token("nil"),
        }
    }
}

impl Encode for bool {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(if *self { "true" } else { "false" })
    }
}

impl Encode for i64 {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&self.to_string())
    }
}

impl Encode for f64 {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&crate::escape::format_float(*self)?)
    }
}

impl Encode for str {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&crate::escape::escape_string(self))
    }
}

impl Encode for String {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.encode(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::{to_string, to_string_pretty, EncodeError};
    use crate::value::{Keyword, Map, Set, Tag, Value};

    #[test]
    fn encodes_rust_values() {
        assert_eq!("42", to_string(42i64).unwrap());
        assert_eq!("nil", to_string(None::<i64>).unwrap());
        assert_eq!(r#""hi""#, to_string("hi").unwrap());
        assert_eq!("1 2 3", to_string(vec![1i64, 2, 3]).unwrap());
    }

    #[test]
    fn map_entries_are_comma_separated() {
        let map = Map::from_iter([(Value::from(Keyword::new("a")), Value::from(1))]);
        assert_eq!("{:a 1}", to_string(&map).unwrap());

        let map = Map::from_iter([
            (Value::from(1), Value::from(2)),
            (Value::from(3), Value::from(4)),
        ]);
        let edn = to_string(&map).unwrap();
        assert!(edn == "{1 2, 3 4}" || edn == "{3 4, 1 2}", "{edn}");
    }

    #[test]
    fn nested_maps_keep_their_own_separators() {
        let inner = Map::from_iter([(Value::from(1), Value::from(2))]);
        let outer = Map::from_iter([(Value::from(Keyword::new("m")), Value::from(inner))]);
        assert_eq!("{:m {1 2}}", to_string(&outer).unwrap());
    }

    #[test]
    fn encodes_tags() {
        let tag = Tag::new("outer", Tag::new("inner", Value::list(vec![1.into()])));
        assert_eq!("#outer #inner (1)", to_string(&tag).unwrap());
        let tags = Value::vector(vec![Tag::new("a", 1).into(), Tag::new("b", 2).into()]);
        assert_eq!("[#a 1 #b 2]", to_string(&tags).unwrap());
    }

    #[test]
    fn element_failure_aborts_container() {
        let value = Value::vector(vec![1.into(), f64::NAN.into()]);
        assert!(matches!(
            to_string(&value),
            Err(EncodeError::NonFiniteFloat(_))
        ));

        let set = Set::from_iter([Value::from(f64::INFINITY)]);
        assert!(to_string_pretty(&set, 80).is_err());
    }

    #[test]
    fn pretty_breaks_long_collections() {
        let value = Value::vector((0..10i64).map(Value::from).collect());
        assert_eq!("[0 1 2 3 4 5 6 7 8 9]", to_string_pretty(&value, 80).unwrap());
        assert_eq!(
            "[0\n 1\n 2\n 3\n 4\n 5\n 6\n 7\n 8\n 9]",
            to_string_pretty(&value, 5).unwrap()
        );
    }

    #[test]
    fn pretty_sets_and_maps() {
        assert_eq!("#{}", to_string_pretty(&Set::new(), 80).unwrap());
        assert_eq!("{}", to_string_pretty(&Map::new(), 80).unwrap());
        let map = Map::from_iter([(Value::from(Keyword::new("a")), Value::from(1))]);
        assert_eq!("{:a 1}", to_string_pretty(&map, 80).unwrap());
    }
}
