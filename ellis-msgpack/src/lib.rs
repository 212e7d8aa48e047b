//! MessagePack codec (§4.4): a resumable frame-stack decoder and a
//! narrowest-encoding encoder, wired up behind the
//! `ellis_codec::Decoder`/`Encoder` contract.

mod decoder;
mod encoder;

pub use decoder::MsgpackDecoder;
pub use encoder::MsgpackEncoder;
