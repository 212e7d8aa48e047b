//! Delimited-text decoder (§4.5): splits incoming bytes on `\n` into an
//! Array of U8Str lines. The newline itself is a separator, not content,
//! so a trailing unterminated line is still included at `chop()`.

use tracing::{debug, warn};

use ellis_codec::{Decoder, Disposition};
use ellis_core::{Error, Value};

pub struct TextDecoder {
    lines: Vec<Value>,
    current: Vec<u8>,
    done: bool,
}

impl TextDecoder {
    pub fn new() -> Self {
        TextDecoder {
            lines: Vec::new(),
            current: Vec::new(),
            done: false,
        }
    }

    fn push_line(&mut self) -> ellis_core::Result<()> {
        let bytes = std::mem::take(&mut self.current);
        let s = String::from_utf8(bytes)
            .map_err(|e| Error::parse_fail(format!("line is not valid utf-8: {e}")))?;
        self.lines.push(Value::u8str(s));
        Ok(())
    }
}

impl Default for TextDecoder {
    fn default() -> Self {
        TextDecoder::new()
    }
}

impl Decoder for TextDecoder {
    fn consume_buffer(&mut self, buf: &[u8], bytecount: &mut usize) -> Disposition<Value> {
        if self.done {
            return Disposition::Error(Error::parse_fail(
                "decoder already produced a value; call reset before reusing",
            ));
        }
        let len = buf.len().min(*bytecount);
        for &b in &buf[..len] {
            if b == b'\n' {
                if let Err(e) = self.push_line() {
                    warn!(error = %e, "text decode failed");
                    *bytecount = 0;
                    return Disposition::Error(e);
                }
            } else {
                self.current.push(b);
            }
        }
        *bytecount = 0;
        Disposition::Continue
    }

    fn chop(&mut self) -> Disposition<Value> {
        if self.done {
            return Disposition::Error(Error::parse_fail(
                "decoder already produced a value; call reset before reusing",
            ));
        }
        if !self.current.is_empty() {
            if let Err(e) = self.push_line() {
                warn!(error = %e, "text decode failed at eof");
                return Disposition::Error(e);
            }
        }
        self.done = true;
        debug!(lines = self.lines.len(), "text decode complete");
        Disposition::Success(Value::array_from(std::mem::take(&mut self.lines)))
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.current.clear();
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn decode(input: &[u8]) -> Value {
        let mut d = TextDecoder::new();
        let mut n = input.len();
        assert!(matches!(d.consume_buffer(input, &mut n), Disposition::Continue));
        match d.chop() {
            Disposition::Success(v) => v,
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn e5_lines_split_on_newline() {
        let v = decode(b"alpha\nbeta\ngamma\n");
        assert_eq!(
            v,
            Value::array_from(vec![
                Value::u8str("alpha"),
                Value::u8str("beta"),
                Value::u8str("gamma"),
            ])
        );
    }

    #[test]
    fn unterminated_trailing_line_is_still_included() {
        let v = decode(b"alpha\nbeta");
        assert_eq!(
            v,
            Value::array_from(vec![Value::u8str("alpha"), Value::u8str("beta")])
        );
    }

    #[test]
    fn empty_input_yields_empty_array() {
        assert_eq!(decode(b""), Value::array_from(Vec::new()));
    }

    proptest! {
        #[test]
        fn bytes_split_across_calls_match_whole_buffer(split in 1usize..=20) {
            let input = b"one\ntwo\nthree\n";
            let whole = decode(input);
            let mut d = TextDecoder::new();
            for chunk in input.chunks(split) {
                let mut n = chunk.len();
                prop_assert!(matches!(d.consume_buffer(chunk, &mut n), Disposition::Continue));
            }
            match d.chop() {
                Disposition::Success(v) => prop_assert_eq!(v, whole),
                other => prop_assert!(false, "expected success, got {other:?}"),
            }
        }
    }
}
