//! Delimited-text codec (§4.5): a top-level Array of U8Str, one per line,
//! joined or split on `\n`.

mod decoder;
mod encoder;

pub use decoder::TextDecoder;
pub use encoder::TextEncoder;
