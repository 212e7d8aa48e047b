//! JSON codec (§4.3): a byte-at-a-time tokenizer, an LL(1) table-driven
//! parser, and a single-pass buffered encoder, wired up behind the
//! `ellis_codec::Decoder`/`Encoder` contract.

mod decoder;
mod encoder;
mod grammar;
mod parser;
mod token;
mod tokenizer;

pub use decoder::JsonDecoder;
pub use encoder::{parse_binary_marker, JsonEncoder};
pub use token::Token;
