use super::{Encode, EncodeError, Encoder};
use pretty::DocAllocator as _;

type Doc<'a> = pretty::DocBuilder<'a, pretty::Arena<'a>>;

/// An encoder that uses the `pretty` crate to lay out the output.
struct PrettyEncoder<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<Doc<'a>>,
}

impl<'a> PrettyEncoder<'a> {
    /// Runs `f` and takes the documents it produced off the item stack.
    fn collect<F>(&mut self, f: F) -> Result<Vec<Doc<'a>>, EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        let position = self.items.len();
        f(self)?;
        Ok(self.items.drain(position..).collect())
    }

    fn encode_delimited<F>(
        &mut self,
        open: &'static str,
        close: &'static str,
        separator: Doc<'a>,
        f: F,
    ) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        let items = self.collect(f)?;

        let docs = self
            .arena
            .intersperse(items, separator)
            .nest(open.len() as isize)
            .group();

        self.items.push(
            self.arena
                .text(open)
                .append(docs)
                .append(self.arena.text(close)),
        );

        Ok(())
    }
}

impl<'a> Encoder for PrettyEncoder<'a> {
    type Error = EncodeError;

    fn token(&mut self, token: &str) -> Result<(), Self::Error> {
        let doc = self.arena.text(token.to_string());
        self.items.push(doc);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("(", ")", self.arena.line(), f)
    }

    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("[", "]", self.arena.line(), f)
    }

    fn set<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.encode_delimited("#{", "}", self.arena.line(), f)
    }

    fn map<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let separator = self.arena.text(",").append(self.arena.line());
        self.encode_delimited("{", "}", separator, f)
    }

    fn entry<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let items = self.collect(f)?;
        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(2)
            .group();
        self.items.push(docs);
        Ok(())
    }

    fn tag<F>(&mut self, name: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let payload = self.collect(f)?;
        let doc = self
            .arena
            .text(format!("#{}", name))
            .append(self.arena.line())
            .append(self.arena.concat(payload))
            .nest(2)
            .group();
        self.items.push(doc);
        Ok(())
    }
}

/// Pretty print a `T` into an EDN string that aims to fit within `width` columns.
///
/// Top-level values are separated by blank lines.
pub fn to_string_pretty<T: Encode>(value: T, width: usize) -> Result<String, EncodeError> {
    let arena = pretty::Arena::new();
    let mut encoder = PrettyEncoder {
        items: vec![],
        arena: &arena,
    };

    value.encode(&mut encoder)?;

    let double_line = arena.line().append(arena.line());
    let doc = arena.intersperse(encoder.items, double_line);

    let mut string = String::new();
    let _ = doc.render_fmt(width, &mut string);
    Ok(string)
}
