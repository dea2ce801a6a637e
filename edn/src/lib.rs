//! EDN (extensible data notation) as a data format.
//!
//! # Syntax
//!
//! This crate implements the core of [EDN]. Values are separated by
//! whitespace; commas count as whitespace everywhere.
//!
//! - **Scalars** are `nil`, the booleans `true` and `false`, 64 bit integers
//!   such as `-12`, floats such as `1.5` or `2e10`, keywords such as `:name`
//!   and symbols such as `my.ns/sym`.
//!
//! - **Strings** are enclosed within double quotes. Within strings, the
//!   following escaping rules apply:
//!
//!    - `\"` and `\\` are used to escape `"` and `\`.
//!    - `\n`, `\r`, `\t`, `\b` and `\f` stand for the usual control characters.
//!    - `\uXXXX` stands in for the character with the hexadecimal code point `XXXX`.
//!
//! - **Characters** are written with a leading backslash: `\a`, the names
//!   `\newline`, `\return`, `\space`, `\tab`, `\formfeed` and `\backspace`,
//!   or `\uXXXX`.
//!
//! - **Collections** are lists `(a b)`, vectors `[a b]`, sets `#{a b}` and
//!   maps `{k v, k v}`.
//!
//! - **Tagged literals** are a `#` and a name followed by exactly one value,
//!   such as `#my/point [1 2]`. Tags can be nested.
//!
//! - **Comments** begin with a `;` and extend to the end of the line.
//!
//! [EDN]: https://github.com/edn-format/edn

pub(crate) mod escape;
pub(crate) mod lexer;
pub mod decode;
pub mod encode;
pub mod util;
pub mod value;

pub use decode::{from_slice, from_str, Decode, DecodeError};
pub use encode::{to_string, to_string_pretty, to_vec, Encode, EncodeError};
pub use lexer::{Classifier, ClassifyError, LexState};
pub use value::{Keyword, List, Map, Rune, Set, Symbol, Tag, Value, Vector};
