//! Delimited-text encoder (§4.5): the inverse of [`crate::TextDecoder`].
//! Requires a top-level Array of U8Str; anything else is out of contract.

use tracing::warn;

use ellis_codec::{Disposition, Encoder};
use ellis_core::{Error, Kind, Value};

pub struct TextEncoder {
    rendered: Result<Vec<u8>, Error>,
    cursor: usize,
    done: bool,
}

impl TextEncoder {
    pub fn new() -> Self {
        TextEncoder {
            rendered: Ok(Vec::new()),
            cursor: 0,
            done: true,
        }
    }
}

impl Default for TextEncoder {
    fn default() -> Self {
        TextEncoder::new()
    }
}

impl Encoder for TextEncoder {
    fn reset(&mut self, value: Value) {
        self.rendered = render(&value);
        self.cursor = 0;
        self.done = false;
    }

    fn fill_buffer(&mut self, buf: &mut [u8], bytecount: &mut usize) -> Disposition<bool> {
        if self.done {
            return Disposition::Error(Error::parse_fail(
                "encoder already finished; call reset before reusing",
            ));
        }
        let bytes = match &self.rendered {
            Ok(bytes) => bytes,
            Err(e) => {
                self.done = true;
                warn!(error = %e, "text encode failed");
                return Disposition::Error(e.clone());
            }
        };
        let want = buf.len().min(*bytecount);
        let remaining = bytes.len() - self.cursor;
        let n = want.min(remaining);
        buf[..n].copy_from_slice(&bytes[self.cursor..self.cursor + n]);
        self.cursor += n;
        *bytecount = n;
        if self.cursor == bytes.len() {
            self.done = true;
            Disposition::Success(true)
        } else {
            Disposition::Continue
        }
    }
}

fn render(value: &Value) -> Result<Vec<u8>, Error> {
    let items = value.as_array().map_err(|_| {
        Error::type_mismatch(format!("text encoder root must be an array, got {}", value.kind()))
    })?;
    let mut out = Vec::new();
    for item in items {
        if item.kind() != Kind::U8Str {
            return Err(Error::type_mismatch(format!(
                "text encoder elements must be u8str, got {}",
                item.kind()
            )));
        }
        out.extend_from_slice(item.as_str().unwrap().as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(v: Value) -> Vec<u8> {
        let mut enc = TextEncoder::new();
        enc.reset(v);
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let mut n = buf.len();
            match enc.fill_buffer(&mut buf, &mut n) {
                Disposition::Continue => out.extend_from_slice(&buf[..n]),
                Disposition::Success(_) => {
                    out.extend_from_slice(&buf[..n]);
                    break;
                }
                Disposition::Error(e) => panic!("encode error: {e}"),
            }
        }
        out
    }

    #[test]
    fn joins_lines_with_newline() {
        let v = Value::array_from(vec![Value::u8str("one"), Value::u8str("two")]);
        assert_eq!(encode(v), b"one\ntwo\n".to_vec());
    }

    #[test]
    fn non_array_root_is_type_mismatch() {
        let mut enc = TextEncoder::new();
        enc.reset(Value::from(1i64));
        let mut buf = [0u8; 4];
        let mut n = buf.len();
        assert!(enc.fill_buffer(&mut buf, &mut n).is_error());
    }

    #[test]
    fn non_string_element_is_type_mismatch() {
        let mut enc = TextEncoder::new();
        enc.reset(Value::array_from(vec![Value::from(1i64)]));
        let mut buf = [0u8; 4];
        let mut n = buf.len();
        assert!(enc.fill_buffer(&mut buf, &mut n).is_error());
    }
}
