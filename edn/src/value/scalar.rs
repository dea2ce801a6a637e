use smol_str::SmolStr;
use std::fmt;

use crate::encode::{Encode, Encoder};
use crate::escape::escape_char;

/// A keyword such as `:name`.
///
/// The name is stored without the leading colon and is trusted to be a valid
/// keyword name; it is never escaped when encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(SmolStr);

impl Keyword {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// The name without the leading colon.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The encoded form of the keyword.
    pub fn to_edn(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl Encode for Keyword {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&self.to_edn())
    }
}

/// A bare identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(SmolStr);

impl Symbol {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn to_edn(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Encode for Symbol {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&self.to_edn())
    }
}

/// A single character, written as a character literal such as `\a` or `\newline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rune(pub char);

impl Rune {
    /// The encoded form of the character literal.
    pub fn to_edn(self) -> String {
        let mut output = String::with_capacity(10);
        escape_char(self.0, &mut output);
        output
    }
}

impl fmt::Display for Rune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_edn())
    }
}

impl From<char> for Rune {
    fn from(c: char) -> Self {
        Rune(c)
    }
}

impl Encode for Rune {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        encoder.token(&self.to_edn())
    }
}

#[cfg(test)]
mod test {
    use super::{Keyword, Rune, Symbol};
    use crate::from_str;
    use proptest::prelude::*;

    #[test]
    fn keyword_text_forms() {
        let keyword = Keyword::new("user/name");
        assert_eq!("user/name", keyword.name());
        assert_eq!(":user/name", keyword.to_string());
        assert_eq!(":user/name", keyword.to_edn());
    }

    #[test]
    fn symbol_text_forms() {
        let symbol = Symbol::new("clojure.core/map");
        assert_eq!("clojure.core/map", symbol.to_string());
        assert_eq!("clojure.core/map", symbol.to_edn());
    }

    #[test]
    fn rune_text_forms() {
        assert_eq!(r"\x", Rune('x').to_edn());
        assert_eq!(r"\tab", Rune('\t').to_string());
    }

    proptest! {
        #[test]
        fn keyword_round_trip(name in "[a-zA-Z*!_?$%&=<>][a-zA-Z0-9.*+!_?$%&=<>/-]{0,12}") {
            let keyword = Keyword::new(name);
            prop_assert_eq!(keyword.clone(), from_str::<Keyword>(&keyword.to_edn()).unwrap());
        }

        #[test]
        fn rune_round_trip(c: char) {
            let rune = Rune(c);
            prop_assert_eq!(rune, from_str::<Rune>(&rune.to_edn()).unwrap());
        }
    }
}
