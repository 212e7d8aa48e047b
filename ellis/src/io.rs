//! The buffer-driving loop (§6.1) that sits between a codec and a
//! [`SyncInputStream`]/[`SyncOutputStream`]: request a buffer, offer it to
//! the codec, repeat until the codec reports `Success` or `Error`.

use ellis_codec::{Decoder, Disposition, Encoder};
use ellis_core::{Error, Result, Value};
use ellis_registry::{SyncInputStream, SyncOutputStream};

/// Drives `decoder` against `input` until a complete Value is produced or
/// decoding fails.
///
/// Each time the decoder reports `Continue`, the next readable region is
/// requested and offered in turn. Once `input.next_input_buf()` returns
/// `None`, the decoder is given a chance to finalize via `chop` (so a
/// decoder whose artifact completes without a trailing delimiter, like a
/// single top-level scalar, still succeeds).
pub fn load(decoder: &mut dyn Decoder, input: &mut dyn SyncInputStream) -> Result<Value> {
    loop {
        match input.next_input_buf() {
            Some(buf) => {
                let mut n = buf.len();
                let disposition = decoder.consume_buffer(buf, &mut n);
                match disposition {
                    Disposition::Continue => {
                        tracing::debug!(offered = buf.len(), "decoder requested more input");
                    }
                    Disposition::Success(v) => {
                        if n > 0 {
                            input.put_back(n);
                        }
                        return Ok(v);
                    }
                    Disposition::Error(e) => {
                        if n > 0 {
                            input.put_back(n);
                        }
                        tracing::warn!(error = %e, "decode failed");
                        return Err(e);
                    }
                }
            }
            None => {
                if let Some(e) = input.take_error() {
                    return Err(e);
                }
                return match decoder.chop() {
                    Disposition::Success(v) => Ok(v),
                    Disposition::Error(e) => Err(e),
                    Disposition::Continue => {
                        Err(Error::parse_fail("input exhausted with decoder still incomplete"))
                    }
                };
            }
        }
    }
}

/// Drives `encoder` (already primed via [`Encoder::reset`]) against
/// `output` until the whole rendering has been emitted.
pub fn dump(encoder: &mut dyn Encoder, output: &mut dyn SyncOutputStream) -> Result<()> {
    loop {
        let buf = output
            .next_output_buf()
            .ok_or_else(|| match output.take_error() {
                Some(e) => e,
                None => Error::io("output stream has no writable buffer"),
            })?;
        let mut n = buf.len();
        let disposition = encoder.fill_buffer(buf, &mut n);
        if n > 0 && !output.emit(n) {
            return Err(output
                .take_error()
                .unwrap_or_else(|| Error::io("output stream rejected emitted bytes")));
        }
        match disposition {
            Disposition::Continue => {
                tracing::debug!(emitted = n, "encoder filled a buffer, more to come");
            }
            Disposition::Success(_) => return Ok(()),
            Disposition::Error(e) => return Err(e),
        }
    }
}
