//! Single-pass JSON encoder (§4.3.3): the whole tree is rendered into an
//! internal buffer up front, then [`Encoder::fill_buffer`] drains it across
//! as many calls as the caller likes, in whatever chunk sizes it likes.

use std::fmt::Write as _;

use ellis_codec::{Disposition, Encoder};
use ellis_core::Value;

pub struct JsonEncoder {
    rendered: Vec<u8>,
    cursor: usize,
}

impl JsonEncoder {
    pub fn new() -> Self {
        JsonEncoder {
            rendered: Vec::new(),
            cursor: 0,
        }
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        JsonEncoder::new()
    }
}

impl Encoder for JsonEncoder {
    fn reset(&mut self, value: Value) {
        let mut out = String::new();
        write_value(&value, &mut out);
        self.rendered = out.into_bytes();
        self.cursor = 0;
    }

    fn fill_buffer(&mut self, buf: &mut [u8], bytecount: &mut usize) -> Disposition<bool> {
        let want = buf.len().min(*bytecount);
        let remaining = self.rendered.len() - self.cursor;
        let n = want.min(remaining);
        buf[..n].copy_from_slice(&self.rendered[self.cursor..self.cursor + n]);
        self.cursor += n;
        *bytecount = n;
        if self.cursor == self.rendered.len() {
            Disposition::Success(true)
        } else {
            Disposition::Continue
        }
    }
}

fn write_value(v: &Value, out: &mut String) {
    match v {
        Value::Nil => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int64(i) => {
            write!(out, "{i}").unwrap();
        }
        Value::Double(d) => write_double(*d, out),
        Value::U8Str(s) => write_string(s, out),
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push_str(" ]");
        }
        Value::Map(entries) => {
            out.push_str("{ ");
            for (i, (k, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(k, out);
                out.push_str(": ");
                write_value(val, out);
            }
            out.push_str(" }");
        }
        Value::Binary(bytes) => write_binary_marker(bytes, out),
    }
}

fn write_double(d: f64, out: &mut String) {
    if d.is_finite() {
        if d == d.trunc() && d.abs() < 1e15 {
            write!(out, "{d:.1}").unwrap();
        } else {
            write!(out, "{d}").unwrap();
        }
    } else if d.is_nan() {
        out.push_str("\"NaN\"");
    } else if d > 0.0 {
        out.push_str("\"Infinity\"");
    } else {
        out.push_str("\"-Infinity\"");
    }
}

/// Escapes a string per RFC 8259: the mandatory control-character and
/// quote/backslash escapes, nothing more. Non-ASCII content passes through
/// as raw UTF-8 rather than being escaped to `\uXXXX`, matching what the
/// tokenizer accepts on the way back in.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                write!(out, "\\u{:04x}", c as u32).unwrap();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Binary values have no native JSON representation; they round-trip
/// through a marker string of the form `/ELLIS_BINARY/` followed by the
/// bytes' hex encoding.
fn write_binary_marker(bytes: &[u8], out: &mut String) {
    out.push_str("\"/ELLIS_BINARY/");
    for b in bytes {
        write!(out, "{b:02x}").unwrap();
    }
    out.push('"');
}

/// Parses the `/ELLIS_BINARY/xHH...` marker produced by [`write_binary_marker`]
/// back into bytes. Returns `None` if `s` isn't a marker string at all, so
/// callers can fall back to treating it as an ordinary string.
pub fn parse_binary_marker(s: &str) -> Option<Vec<u8>> {
    let hex = s.strip_prefix("/ELLIS_BINARY/")?;
    if hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    let hb = hex.as_bytes();
    let mut i = 0;
    while i < hb.len() {
        let hi = (hb[i] as char).to_digit(16)?;
        let lo = (hb[i + 1] as char).to_digit(16)?;
        bytes.push(((hi << 4) | lo) as u8);
        i += 2;
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ellis_core::Map;

    fn render(v: Value) -> String {
        let mut enc = JsonEncoder::new();
        enc.reset(v);
        let mut out = Vec::new();
        let mut buf = [0u8; 7];
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
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(render(Value::Nil), "null");
        assert_eq!(render(Value::from(true)), "true");
        assert_eq!(render(Value::from(42i64)), "42");
        assert_eq!(render(Value::from(2.0)), "2.0");
        assert_eq!(render(Value::u8str("hi")), "\"hi\"");
    }

    #[test]
    fn string_escaping() {
        assert_eq!(render(Value::u8str("a\nb\"c\\d")), "\"a\\nb\\\"c\\\\d\"");
        assert_eq!(render(Value::u8str("\u{1}")), "\"\\u0001\"");
    }

    #[test]
    fn array_and_map() {
        let arr = Value::array_from(vec![Value::from(1i64), Value::from(2i64)]);
        assert_eq!(render(arr), "[ 1, 2 ]");

        let mut m = Map::new();
        m.insert("a".to_string(), Value::from(1i64));
        m.insert("b".to_string(), Value::Nil);
        assert_eq!(render(Value::map_from(m)), "{ \"a\": 1, \"b\": null }");
    }

    #[test]
    fn empty_array_and_map_keep_the_single_bracket_padding_space() {
        assert_eq!(render(Value::array_from(Vec::new())), "[  ]");
        assert_eq!(render(Value::map_from(Map::new())), "{  }");
    }

    #[test]
    fn binary_round_trips_through_marker() {
        let rendered = render(Value::binary_from(&[0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(rendered, "\"/ELLIS_BINARY/deadbeef\"");
        assert_eq!(
            parse_binary_marker("/ELLIS_BINARY/deadbeef"),
            Some(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert_eq!(parse_binary_marker("ordinary string"), None);
    }

    #[test]
    fn output_is_identical_regardless_of_fill_buffer_chunk_size() {
        let v = Value::array_from(vec![
            Value::from(1i64),
            Value::u8str("hello world this is long enough to span chunks"),
            Value::Nil,
        ]);
        let whole = render(v.clone());
        let mut enc = JsonEncoder::new();
        enc.reset(v);
        let mut out = Vec::new();
        let mut buf = [0u8; 1];
        loop {
            let mut n = 1;
            match enc.fill_buffer(&mut buf, &mut n) {
                Disposition::Continue => out.push(buf[0]),
                Disposition::Success(_) => {
                    out.push(buf[0]);
                    break;
                }
                Disposition::Error(e) => panic!("encode error: {e}"),
            }
        }
        assert_eq!(String::from_utf8(out).unwrap(), whole);
    }
}
