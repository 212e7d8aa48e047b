//! Narrowest-encoding MessagePack encoder (§4.4.2): picks the smallest
//! wire family that holds each value, rendering the whole tree up front
//! and draining it the same way the JSON encoder does (§4.3.3).

use ellis_codec::{Disposition, Encoder};
use ellis_core::{Error, Value};

pub struct MsgpackEncoder {
    rendered: Vec<u8>,
    cursor: usize,
    done: bool,
}

impl MsgpackEncoder {
    pub fn new() -> Self {
        MsgpackEncoder {
            rendered: Vec::new(),
            cursor: 0,
            done: true,
        }
    }
}

impl Default for MsgpackEncoder {
    fn default() -> Self {
        MsgpackEncoder::new()
    }
}

impl Encoder for MsgpackEncoder {
    fn reset(&mut self, value: Value) {
        self.rendered.clear();
        write_value(&value, &mut self.rendered);
        self.cursor = 0;
        self.done = false;
    }

    fn fill_buffer(&mut self, buf: &mut [u8], bytecount: &mut usize) -> Disposition<bool> {
        if self.done {
            return Disposition::Error(Error::parse_fail(
                "encoder already finished; call reset before reusing",
            ));
        }
        let want = buf.len().min(*bytecount);
        let remaining = self.rendered.len() - self.cursor;
        let n = want.min(remaining);
        buf[..n].copy_from_slice(&self.rendered[self.cursor..self.cursor + n]);
        self.cursor += n;
        *bytecount = n;
        if self.cursor == self.rendered.len() {
            self.done = true;
            Disposition::Success(true)
        } else {
            Disposition::Continue
        }
    }
}

/// Map keys are `String` by construction (`Value::Map`'s backing is
/// `IndexMap<String, Value>`), so unlike the decoder there is no
/// non-string-key case to reject here: every `Value` is encodable.
fn write_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Nil => out.push(0xc0),
        Value::Bool(false) => out.push(0xc2),
        Value::Bool(true) => out.push(0xc3),
        Value::Int64(i) => write_int(*i, out),
        Value::Double(d) => {
            out.push(0xcb);
            out.extend_from_slice(&d.to_bits().to_be_bytes());
        }
        Value::U8Str(s) => write_str(s, out),
        Value::Binary(bytes) => write_bin(bytes, out),
        Value::Array(items) => {
            write_len_header(items.len(), [0x90, 0x0f], 0xdc, 0xdd, out);
            for item in items.iter() {
                write_value(item, out);
            }
        }
        Value::Map(entries) => {
            write_len_header(entries.len(), [0x80, 0x0f], 0xde, 0xdf, out);
            for (k, val) in entries.iter() {
                write_str(k, out);
                write_value(val, out);
            }
        }
    }
}

fn write_int(i: i64, out: &mut Vec<u8>) {
    if (0..=127).contains(&i) {
        out.push(i as u8);
    } else if (-32..0).contains(&i) {
        out.push(i as u8);
    } else if (-128..=-33).contains(&i) {
        out.push(0xd0);
        out.push(i as i8 as u8);
    } else if (128..=255).contains(&i) {
        out.push(0xcc);
        out.push(i as u8);
    } else if (-32768..=-129).contains(&i) {
        out.push(0xd1);
        out.extend_from_slice(&(i as i16).to_be_bytes());
    } else if (256..=65535).contains(&i) {
        out.push(0xcd);
        out.extend_from_slice(&(i as u16).to_be_bytes());
    } else if (-2147483648..=-32769).contains(&i) {
        out.push(0xd2);
        out.extend_from_slice(&(i as i32).to_be_bytes());
    } else if (65536..=4294967295).contains(&i) {
        out.push(0xce);
        out.extend_from_slice(&(i as u32).to_be_bytes());
    } else {
        out.push(0xd3);
        out.extend_from_slice(&i.to_be_bytes());
    }
}

fn write_str(s: &str, out: &mut Vec<u8>) {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len <= 0x1f {
        out.push(0xa0 + len as u8);
    } else if len <= 0xff {
        out.push(0xd9);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(0xda);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(0xdb);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(bytes);
}

fn write_bin(bytes: &[u8], out: &mut Vec<u8>) {
    let len = bytes.len();
    if len <= 0xff {
        out.push(0xc4);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(0xc5);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(0xc6);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(bytes);
}

/// Writes the length header for array/map, whose families are fix/16/32
/// (no 8-bit tier): `fix` is `[base, max_fixed]` for the embedded-count
/// form (e.g. `[0x90, 0x0f]` for fixarray), `mid` the 16-bit marker byte,
/// `wide` the 32-bit marker byte.
fn write_len_header(len: usize, fix: [u8; 2], mid: u8, wide: u8, out: &mut Vec<u8>) {
    let (base, max_fixed) = (fix[0], fix[1] as usize);
    if len <= max_fixed {
        out.push(base + len as u8);
    } else if len <= 0xffff {
        out.push(mid);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(wide);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ellis_core::Map;

    fn render(v: Value) -> Vec<u8> {
        let mut enc = MsgpackEncoder::new();
        enc.reset(v);
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
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
    fn fixint_and_neg_fixint() {
        assert_eq!(render(Value::from(5i64)), vec![0x05]);
        assert_eq!(render(Value::from(-1i64)), vec![0xff]);
    }

    #[test]
    fn e4_round_trips_narrowest() {
        let arr = Value::array_from(vec![
            Value::from(0i64),
            Value::from(-1i64),
            Value::from(2i64),
            Value::from(-4i64),
        ]);
        assert_eq!(render(arr), vec![0x94, 0x00, 0xff, 0x02, 0xfc]);
    }

    #[test]
    fn int_width_boundaries() {
        assert_eq!(render(Value::from(127i64)), vec![0x7f]);
        assert_eq!(render(Value::from(128i64)), vec![0xcc, 0x80]);
        assert_eq!(render(Value::from(-33i64)), vec![0xd0, 0xdf]);
        assert_eq!(render(Value::from(-128i64)), vec![0xd0, 0x80]);
    }

    #[test]
    fn int64_extremes() {
        let mut expected_min = vec![0xd3];
        expected_min.extend_from_slice(&i64::MIN.to_be_bytes());
        assert_eq!(render(Value::from(i64::MIN)), expected_min);

        let mut expected_max = vec![0xd3];
        expected_max.extend_from_slice(&i64::MAX.to_be_bytes());
        assert_eq!(render(Value::from(i64::MAX)), expected_max);
    }

    #[test]
    fn map_renders_fixmap_with_string_keys() {
        let mut m = Map::new();
        m.insert("k".to_string(), Value::from(1i64));
        assert_eq!(render(Value::map_from(m)), vec![0x81, 0xa1, b'k', 0x01]);
    }

    #[test]
    fn binary_narrowest() {
        assert_eq!(render(Value::binary_from(&[1, 2, 3])), vec![0xc4, 0x03, 1, 2, 3]);
    }
}
