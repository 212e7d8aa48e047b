//! [`ellis_codec::Decoder`] implementation gluing the tokenizer to the
//! parser: bytes go in one at a time, tokens flow to the parser as soon as
//! the tokenizer completes one, and a `Value` comes out once the parser's
//! stack empties.

use tracing::{debug, warn};

use ellis_codec::{Decoder, Disposition};
use ellis_core::{Error, Value};

use crate::parser::Parser;
use crate::token::Token;
use crate::tokenizer::{Step, Tokenizer};

pub struct JsonDecoder {
    tokenizer: Tokenizer,
    parser: Parser,
    finished: bool,
}

impl JsonDecoder {
    pub fn new() -> Self {
        JsonDecoder {
            tokenizer: Tokenizer::new(),
            parser: Parser::new(),
            finished: false,
        }
    }

    fn feed_token(&mut self, token: Token) -> Disposition<Value> {
        match self.parser.feed(token) {
            Disposition::Success(v) => {
                self.finished = true;
                debug!("json decode complete");
                Disposition::Success(v)
            }
            Disposition::Error(e) => {
                warn!(error = %e, "json parse failed");
                Disposition::Error(e)
            }
            other => other,
        }
    }
}

impl Default for JsonDecoder {
    fn default() -> Self {
        JsonDecoder::new()
    }
}

impl Decoder for JsonDecoder {
    fn consume_buffer(&mut self, buf: &[u8], bytecount: &mut usize) -> Disposition<Value> {
        if self.finished {
            return Disposition::Error(Error::parse_fail(
                "decoder already produced a value; call reset before reusing",
            ));
        }
        let len = buf.len().min(*bytecount);
        let mut i = 0;
        while i < len {
            let b = buf[i];
            let step = match self.tokenizer.feed(b) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "json tokenizer rejected input");
                    *bytecount = len - i;
                    return Disposition::Error(e);
                }
            };
            match step {
                Step::Pending => {
                    i += 1;
                }
                Step::Emit(tok) => {
                    i += 1;
                    match self.feed_token(tok) {
                        Disposition::Continue => {}
                        Disposition::Success(v) => {
                            *bytecount = len - i;
                            return Disposition::Success(v);
                        }
                        Disposition::Error(e) => {
                            *bytecount = len - i;
                            return Disposition::Error(e);
                        }
                    }
                }
                Step::EmitReplay(tok) => {
                    // byte at `i` still belongs to the next token
                    match self.feed_token(tok) {
                        Disposition::Continue => {}
                        Disposition::Success(v) => {
                            *bytecount = len - i;
                            return Disposition::Success(v);
                        }
                        Disposition::Error(e) => {
                            *bytecount = len - i;
                            return Disposition::Error(e);
                        }
                    }
                }
            }
        }
        *bytecount = 0;
        Disposition::Continue
    }

    fn chop(&mut self) -> Disposition<Value> {
        if self.finished {
            return Disposition::Error(Error::parse_fail(
                "decoder already produced a value; call reset before reusing",
            ));
        }
        match self.tokenizer.finish() {
            Ok(Some(tok)) => self.feed_token(tok),
            Ok(None) => {
                warn!("json input ended with no complete value");
                Disposition::Error(Error::parse_fail("no complete value in input"))
            }
            Err(e) => {
                warn!(error = %e, "json tokenizer rejected input at eof");
                Disposition::Error(e)
            }
        }
    }

    fn reset(&mut self) {
        self.tokenizer.reset();
        self.parser.reset();
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn decode_all_at_once(input: &str) -> Value {
        let mut d = JsonDecoder::new();
        let bytes = input.as_bytes();
        let mut n = bytes.len();
        match d.consume_buffer(bytes, &mut n) {
            Disposition::Success(v) => v,
            Disposition::Continue => match d.chop() {
                Disposition::Success(v) => v,
                other => panic!("expected success, got {other:?}"),
            },
            Disposition::Error(e) => panic!("decode error: {e}"),
        }
    }

    fn decode_byte_at_a_time(input: &str) -> Value {
        let mut d = JsonDecoder::new();
        for &b in input.as_bytes() {
            let mut n = 1;
            match d.consume_buffer(&[b], &mut n) {
                Disposition::Continue => assert_eq!(n, 0),
                Disposition::Success(v) => return v,
                Disposition::Error(e) => panic!("decode error: {e}"),
            }
        }
        match d.chop() {
            Disposition::Success(v) => v,
            other => panic!("expected success at eof, got {other:?}"),
        }
    }

    #[test]
    fn scalar_values() {
        assert_eq!(decode_all_at_once("42"), Value::from(42i64));
        assert_eq!(decode_all_at_once("true"), Value::from(true));
        assert_eq!(decode_all_at_once("null"), Value::Nil);
        assert_eq!(decode_all_at_once(r#""hi""#), Value::u8str("hi"));
    }

    #[test]
    fn nested_structure_whole_vs_byte_at_a_time_agree() {
        let input = r#"{"a":[1,2,3],"b":null}"#;
        assert_eq!(decode_all_at_once(input), decode_byte_at_a_time(input));
    }

    proptest! {
        #[test]
        fn arbitrary_partitioning_matches_whole_buffer(split in 1usize..=64) {
            let input = r#"{"items":[1,2.5,"x",true,false,null,{"y":[]}]}"#;
            let whole = decode_all_at_once(input);
            let bytes = input.as_bytes();
            let mut d = JsonDecoder::new();
            let mut result = None;
            for chunk in bytes.chunks(split) {
                let mut n = chunk.len();
                match d.consume_buffer(chunk, &mut n) {
                    Disposition::Continue => prop_assert_eq!(n, 0),
                    Disposition::Success(v) => {
                        result = Some(v);
                        break;
                    }
                    Disposition::Error(e) => prop_assert!(false, "decode error at split {split}: {e}"),
                }
            }
            let v = match result {
                Some(v) => v,
                None => match d.chop() {
                    Disposition::Success(v) => v,
                    other => {
                        prop_assert!(false, "expected success at split {split}, got {other:?}");
                        unreachable!()
                    }
                },
            };
            prop_assert_eq!(v, whole);
        }
    }

    #[test]
    fn reset_allows_reuse() {
        let mut d = JsonDecoder::new();
        let mut n = 4;
        assert!(d.consume_buffer(b"true", &mut n).is_success());
        d.reset();
        let mut n2 = 5;
        assert!(d.consume_buffer(b"false", &mut n2).is_success());
    }

    #[test]
    fn malformed_input_is_parse_fail() {
        let mut d = JsonDecoder::new();
        let mut n = 1;
        assert!(d.consume_buffer(b"}", &mut n).is_error());
    }
}
