use crate::{
    decode::{Decode, Decoder, Result, Span},
    encode::{Encode, Encoder},
};

/// Records the source span around an inner type.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub inner: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Converts into the inner type.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Decode> Decode for Spanned<T> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        let span = decoder.span();
        let inner = decoder.decode()?;
        Ok(Spanned { inner, span })
    }
}

impl<T: Encode> Encode for Spanned<T> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), E::Error> {
        self.inner.encode(encoder)
    }
}

#[cfg(test)]
mod test {
    use super::Spanned;
    use crate::value::{Tag, Value};
    use crate::{from_str, to_string};

    #[test]
    fn records_value_spans() {
        let values: Vec<Spanned<Value>> = from_str("1 [2 3]\n#p (4)").unwrap();
        let spans: Vec<_> = values.iter().map(|value| value.span.clone()).collect();
        assert_eq!(vec![0..1, 2..7, 8..14], spans);
        assert_eq!(Value::Tag(Tag::new("p", Value::list(vec![4.into()]))), values[2].inner);
    }

    #[test]
    fn tag_spans_cover_payload() {
        let values: Vec<Spanned<Value>> = from_str("#a #b [1 2] 3").unwrap();
        let spans: Vec<_> = values.iter().map(|value| value.span.clone()).collect();
        assert_eq!(vec![0..11, 12..13], spans);

        let tag: Spanned<Tag> = from_str("  #p (4) ").unwrap();
        assert_eq!(2..8, tag.span);
    }

    #[test]
    fn encodes_inner_value() {
        let spanned = Spanned { inner: 5i64, span: 0..1 };
        assert_eq!("5", to_string(&spanned).unwrap());
    }
}
