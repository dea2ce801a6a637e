use super::{Encode, EncodeError, Encoder};

/// An encoder that writes EDN on a single line.
struct CompactEncoder {
    needs_whitespace: bool,
    in_entries: bool,
    string: String,
}

impl CompactEncoder {
    pub fn new() -> Self {
        Self {
            needs_whitespace: false,
            in_entries: false,
            string: String::new(),
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_whitespace {
            self.string.push(' ');
        }
    }

    #[inline]
    fn encode_delimited<F>(&mut self, open: &str, close: char, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        self.separate();
        self.string.push_str(open);
        self.needs_whitespace = false;

        let in_entries = std::mem::replace(&mut self.in_entries, false);
        f(self)?;
        self.in_entries = in_entries;

        self.string.push(close);
        self.needs_whitespace = true;

        Ok(())
    }
}

impl Encoder for CompactEncoder {
    type Error = EncodeError;

    fn token(&mut self, token: &str) -> Result<(), Self::Error> {
        self.separate();
        self.needs_whitespace = true;
        self.string.push_str(token);
        Ok(())
    }

    #[inline]
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("(", ')', f)
    }

    #[inline]
    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("[", ']', f)
    }

    #[inline]
    fn set<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("#{", '}', f)
    }

    #[inline]
    fn map<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("{", '}', f)
    }

    fn entry<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        if self.in_entries {
            self.string.push(',');
        }

        f(self)?;
        self.in_entries = true;
        Ok(())
    }

    fn tag<F>(&mut self, name: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.separate();
        self.string.push('#');
        self.string.push_str(name);
        self.needs_whitespace = true;
        f(self)
    }
}

/// Encode a `T` into an EDN string.
///
/// This function does not produce any line breaks, indentation, or unnecessary whitespace.
/// It is intended to be used when the output is intended to be consumed by another program.
/// Where human readability is a concern, consider using the [`to_string_pretty`] function instead.
///
/// Encoding stops at the first value that can not be encoded, and no partial output is returned.
///
/// [`to_string_pretty`]: `crate::encode::to_string_pretty`
pub fn to_string<T: Encode>(value: T) -> Result<String, EncodeError> {
    let mut encoder = CompactEncoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.string)
}

/// Encode a `T` into a buffer of UTF-8 encoded EDN.
pub fn to_vec<T: Encode>(value: T) -> Result<Vec<u8>, EncodeError> {
    to_string(value).map(String::into_bytes)
}
