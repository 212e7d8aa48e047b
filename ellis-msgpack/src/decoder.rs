//! Resumable MessagePack decoder (§4.4.1): a stack of in-progress
//! container frames plus a single "currently collecting N raw bytes"
//! cursor, so decoding can suspend at any byte boundary and resume on the
//! next `consume_buffer` call — unlike the original's whole-node-only
//! decoder, which this redesign lifts to full incremental resumption.

use tracing::{debug, warn};

use ellis_codec::{Decoder, Disposition};
use ellis_core::{Error, Map, Value};

#[derive(Debug, Clone, Copy)]
enum Purpose {
    IntPayload { width: u8, signed: bool },
    Float32,
    Float64,
    StrLen { width: u8 },
    StrPayload,
    BinLen { width: u8 },
    BinPayload,
    ArrLen,
    MapLen,
}

struct Collect {
    want: usize,
    buf: Vec<u8>,
    purpose: Purpose,
}

enum Frame {
    Array {
        remaining: usize,
        items: Vec<Value>,
    },
    Map {
        remaining_pairs: usize,
        entries: Map,
        pending_key: Option<String>,
    },
}

pub struct MsgpackDecoder {
    frames: Vec<Frame>,
    collect: Option<Collect>,
    done: bool,
}

impl MsgpackDecoder {
    pub fn new() -> Self {
        MsgpackDecoder {
            frames: Vec::new(),
            collect: None,
            done: false,
        }
    }

    fn step(&mut self, byte: u8) -> ellis_core::Result<Option<Value>> {
        if let Some(collect) = self.collect.as_mut() {
            collect.buf.push(byte);
            if collect.buf.len() < collect.want {
                return Ok(None);
            }
            let Collect { buf, purpose, .. } = self.collect.take().unwrap();
            return self.finish_collect(purpose, buf);
        }
        self.lead_byte(byte)
    }

    fn begin_collect(&mut self, want: usize, purpose: Purpose) -> ellis_core::Result<Option<Value>> {
        self.collect = Some(Collect {
            want,
            buf: Vec::with_capacity(want),
            purpose,
        });
        Ok(None)
    }

    fn lead_byte(&mut self, b: u8) -> ellis_core::Result<Option<Value>> {
        match b {
            0x00..=0x7f => self.attach(Value::from(b as i64)),
            0xe0..=0xff => self.attach(Value::from((b as i8) as i64)),
            0x80..=0x8f => self.open_map((b & 0x0f) as usize),
            0x90..=0x9f => self.open_array((b & 0x0f) as usize),
            0xa0..=0xbf => self.open_str_payload((b & 0x1f) as usize),
            0xc0 => self.attach(Value::Nil),
            0xc1 => Err(Error::parse_fail("reserved lead byte 0xc1")),
            0xc2 => self.attach(Value::from(false)),
            0xc3 => self.attach(Value::from(true)),
            0xc4 => self.begin_collect(1, Purpose::BinLen { width: 1 }),
            0xc5 => self.begin_collect(2, Purpose::BinLen { width: 2 }),
            0xc6 => self.begin_collect(4, Purpose::BinLen { width: 4 }),
            0xc7..=0xc9 => Err(Error::parse_fail("ext family is not supported")),
            0xca => self.begin_collect(4, Purpose::Float32),
            0xcb => self.begin_collect(8, Purpose::Float64),
            0xcc => self.begin_collect(1, Purpose::IntPayload { width: 1, signed: false }),
            0xcd => self.begin_collect(2, Purpose::IntPayload { width: 2, signed: false }),
            0xce => self.begin_collect(4, Purpose::IntPayload { width: 4, signed: false }),
            0xcf => Err(Error::parse_fail("uint 64 is not supported")),
            0xd0 => self.begin_collect(1, Purpose::IntPayload { width: 1, signed: true }),
            0xd1 => self.begin_collect(2, Purpose::IntPayload { width: 2, signed: true }),
            0xd2 => self.begin_collect(4, Purpose::IntPayload { width: 4, signed: true }),
            0xd3 => self.begin_collect(8, Purpose::IntPayload { width: 8, signed: true }),
            0xd4..=0xd8 => Err(Error::parse_fail("fixext family is not supported")),
            0xd9 => self.begin_collect(1, Purpose::StrLen { width: 1 }),
            0xda => self.begin_collect(2, Purpose::StrLen { width: 2 }),
            0xdb => self.begin_collect(4, Purpose::StrLen { width: 4 }),
            0xdc => self.begin_collect(2, Purpose::ArrLen),
            0xdd => self.begin_collect(4, Purpose::ArrLen),
            0xde => self.begin_collect(2, Purpose::MapLen),
            0xdf => self.begin_collect(4, Purpose::MapLen),
        }
    }

    fn finish_collect(&mut self, purpose: Purpose, buf: Vec<u8>) -> ellis_core::Result<Option<Value>> {
        match purpose {
            Purpose::IntPayload { signed, .. } => {
                let v = read_be_int(&buf, signed);
                self.attach(Value::from(v))
            }
            Purpose::Float32 => {
                let bits = u32::from_be_bytes(buf.try_into().unwrap());
                self.attach(Value::from(f32::from_bits(bits) as f64))
            }
            Purpose::Float64 => {
                let bits = u64::from_be_bytes(buf.try_into().unwrap());
                self.attach(Value::from(f64::from_bits(bits)))
            }
            Purpose::StrLen { .. } => {
                let len = read_be_len(&buf);
                self.open_str_payload(len)
            }
            Purpose::StrPayload => {
                let s = String::from_utf8(buf)
                    .map_err(|e| Error::parse_fail(format!("string is not valid utf-8: {e}")))?;
                self.attach(Value::u8str(s))
            }
            Purpose::BinLen { .. } => {
                let len = read_be_len(&buf);
                self.open_bin_payload(len)
            }
            Purpose::BinPayload => self.attach(Value::binary_from(&buf)),
            Purpose::ArrLen => self.open_array(read_be_len(&buf)),
            Purpose::MapLen => self.open_map(read_be_len(&buf)),
        }
    }

    fn open_str_payload(&mut self, len: usize) -> ellis_core::Result<Option<Value>> {
        if len == 0 {
            return self.attach(Value::u8str(""));
        }
        self.begin_collect(len, Purpose::StrPayload)
    }

    fn open_bin_payload(&mut self, len: usize) -> ellis_core::Result<Option<Value>> {
        if len == 0 {
            return self.attach(Value::binary_from(&[]));
        }
        self.begin_collect(len, Purpose::BinPayload)
    }

    fn open_array(&mut self, len: usize) -> ellis_core::Result<Option<Value>> {
        if len == 0 {
            return self.attach(Value::array_from(Vec::new()));
        }
        self.frames.push(Frame::Array {
            remaining: len,
            items: Vec::with_capacity(len.min(1024)),
        });
        Ok(None)
    }

    fn open_map(&mut self, len: usize) -> ellis_core::Result<Option<Value>> {
        if len == 0 {
            return self.attach(Value::map_from(Map::new()));
        }
        self.frames.push(Frame::Map {
            remaining_pairs: len,
            entries: Map::new(),
            pending_key: None,
        });
        Ok(None)
    }

    /// Attaches a completed node's value to whatever is waiting for it:
    /// the enclosing frame, or directly back to the caller if there is
    /// none. Completing a frame this way re-attaches its wrapped value in
    /// turn, so closing a deeply nested container bubbles all the way up
    /// within one call.
    fn attach(&mut self, v: Value) -> ellis_core::Result<Option<Value>> {
        match self.frames.last_mut() {
            None => return Ok(Some(v)),
            Some(Frame::Array { remaining, items }) => {
                items.push(v);
                *remaining -= 1;
            }
            Some(Frame::Map {
                pending_key,
                entries,
                remaining_pairs,
            }) => {
                if let Some(key) = pending_key.take() {
                    entries.insert(key, v);
                    *remaining_pairs -= 1;
                } else {
                    let Value::U8Str(key) = v else {
                        return Err(Error::parse_fail("map key must be a string"));
                    };
                    *pending_key = Some((*key).clone());
                    return Ok(None);
                }
            }
        }

        let done = match self.frames.last() {
            Some(Frame::Array { remaining, .. }) => *remaining == 0,
            Some(Frame::Map { remaining_pairs, .. }) => *remaining_pairs == 0,
            None => unreachable!("frames checked non-empty above"),
        };
        if !done {
            return Ok(None);
        }
        let wrapped = match self.frames.pop().unwrap() {
            Frame::Array { items, .. } => Value::array_from(items),
            Frame::Map { entries, .. } => Value::map_from(entries),
        };
        self.attach(wrapped)
    }
}

fn read_be_len(buf: &[u8]) -> usize {
    read_be_int(buf, false) as usize
}

fn read_be_int(buf: &[u8], signed: bool) -> i64 {
    match buf.len() {
        1 => {
            if signed {
                buf[0] as i8 as i64
            } else {
                buf[0] as i64
            }
        }
        2 => {
            let n = u16::from_be_bytes(buf.try_into().unwrap());
            if signed {
                n as i16 as i64
            } else {
                n as i64
            }
        }
        4 => {
            let n = u32::from_be_bytes(buf.try_into().unwrap());
            if signed {
                n as i32 as i64
            } else {
                n as i64
            }
        }
        8 => i64::from_be_bytes(buf.try_into().unwrap()),
        _ => unreachable!("unsupported integer width {}", buf.len()),
    }
}

impl Default for MsgpackDecoder {
    fn default() -> Self {
        MsgpackDecoder::new()
    }
}

impl Decoder for MsgpackDecoder {
    fn consume_buffer(&mut self, buf: &[u8], bytecount: &mut usize) -> Disposition<Value> {
        if self.done {
            return Disposition::Error(Error::parse_fail(
                "decoder already produced a value; call reset before reusing",
            ));
        }
        let len = buf.len().min(*bytecount);
        for (i, &b) in buf[..len].iter().enumerate() {
            match self.step(b) {
                Ok(Some(v)) => {
                    self.done = true;
                    *bytecount = len - i - 1;
                    debug!("msgpack decode complete");
                    return Disposition::Success(v);
                }
                Ok(None) => {}
                Err(e) => {
                    *bytecount = len - i - 1;
                    warn!(error = %e, "msgpack decode failed");
                    return Disposition::Error(e);
                }
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
        warn!("msgpack input ended mid-message");
        Disposition::Error(Error::parse_fail("incomplete message at end of input"))
    }

    fn reset(&mut self) {
        self.frames.clear();
        self.collect = None;
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn decode(bytes: &[u8]) -> Value {
        let mut d = MsgpackDecoder::new();
        let mut n = bytes.len();
        match d.consume_buffer(bytes, &mut n) {
            Disposition::Success(v) => v,
            other => panic!("expected success, got {other:?}"),
        }
    }

    fn decode_byte_at_a_time(bytes: &[u8]) -> Value {
        let mut d = MsgpackDecoder::new();
        for &b in bytes {
            let mut n = 1;
            match d.consume_buffer(&[b], &mut n) {
                Disposition::Continue => {}
                Disposition::Success(v) => return v,
                Disposition::Error(e) => panic!("decode error: {e}"),
            }
        }
        panic!("ran out of bytes before a value completed");
    }

    #[test]
    fn positive_and_negative_fixint() {
        assert_eq!(decode(&[0x05]), Value::from(5i64));
        assert_eq!(decode(&[0xff]), Value::from(-1i64));
    }

    #[test]
    fn e4_array_of_mixed_width_ints() {
        let bytes = [0x94, 0x00, 0xff, 0x02, 0xfc];
        let expected = Value::array_from(vec![
            Value::from(0i64),
            Value::from(-1i64),
            Value::from(2i64),
            Value::from(-4i64),
        ]);
        assert_eq!(decode(&bytes), expected);
        assert_eq!(decode_byte_at_a_time(&bytes), expected);
    }

    #[test]
    fn e3_compact_map() {
        let bytes = [
            0x82, 0xa7, b'c', b'o', b'm', b'p', b'a', b'c', b't', 0xc3, 0xa6, b's', b'c', b'h',
            b'e', b'm', b'a', 0x00,
        ];
        let mut expected = Map::new();
        expected.insert("compact".to_string(), Value::from(true));
        expected.insert("schema".to_string(), Value::from(0i64));
        assert_eq!(decode(&bytes), Value::map_from(expected));
    }

    #[test]
    fn e7_reserved_lead_byte_is_parse_fail() {
        let mut d = MsgpackDecoder::new();
        let mut n = 1;
        assert!(d.consume_buffer(&[0xc1], &mut n).is_error());
    }

    #[test]
    fn uint64_is_rejected() {
        let mut d = MsgpackDecoder::new();
        let mut n = 9;
        assert!(d
            .consume_buffer(&[0xcf, 0, 0, 0, 0, 0, 0, 0, 1], &mut n)
            .is_error());
    }

    #[test]
    fn int64_extremes_round_trip() {
        let mut bytes = vec![0xd3];
        bytes.extend_from_slice(&i64::MIN.to_be_bytes());
        assert_eq!(decode(&bytes), Value::from(i64::MIN));

        let mut bytes = vec![0xd3];
        bytes.extend_from_slice(&i64::MAX.to_be_bytes());
        assert_eq!(decode(&bytes), Value::from(i64::MAX));
    }

    #[test]
    fn non_string_map_key_is_parse_fail() {
        // fixmap{1} with an integer key
        let mut d = MsgpackDecoder::new();
        let mut n = 2;
        assert!(d.consume_buffer(&[0x81, 0x01], &mut n).is_error());
    }

    #[test]
    fn nested_containers_bubble_up_on_last_element() {
        // [[1]]
        let bytes = [0x91, 0x91, 0x01];
        let inner = Value::array_from(vec![Value::from(1i64)]);
        let outer = Value::array_from(vec![inner]);
        assert_eq!(decode(&bytes), outer);
    }

    proptest! {
        #[test]
        fn arbitrary_byte_partitioning_matches_whole_buffer(split in 1usize..=20) {
            let bytes = [
                0x82, 0xa7, b'c', b'o', b'm', b'p', b'a', b'c', b't', 0xc3, 0xa6, b's', b'c', b'h',
                b'e', b'm', b'a', 0x00,
            ];
            let whole = decode(&bytes);
            let mut d = MsgpackDecoder::new();
            let mut result = None;
            for chunk in bytes.chunks(split) {
                let mut n = chunk.len();
                match d.consume_buffer(chunk, &mut n) {
                    Disposition::Continue => prop_assert_eq!(n, 0),
                    Disposition::Success(v) => {
                        result = Some(v);
                        break;
                    }
                    Disposition::Error(e) => prop_assert!(false, "error at split {split}: {e}"),
                }
            }
            prop_assert_eq!(result, Some(whole));
        }
    }
}
