//! Utilities to help with decoding and encoding EDN.
mod spanned;

pub use spanned::Spanned;
