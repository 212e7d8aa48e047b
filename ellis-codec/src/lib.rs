//! The incremental, buffer-driven codec contract (§4.2) shared by every
//! Ellis wire codec, plus the [`Disposition`] type codecs communicate
//! through.
//!
//! A codec instance is reentrant across calls but not thread-safe against
//! concurrent calls on itself; every suspension point is a `Continue`
//! disposition that preserves all state until the next call.

mod disposition;

pub use disposition::Disposition;

use ellis_core::Value;

/// Consumes bytes, produces a [`Value`].
///
/// `consume_buffer` and `chop` are the two ways a decoder can complete.
/// After either returns `Success` or `Error`, the decoder is in a
/// terminal state: further `consume_buffer`/`chop` calls are a logic
/// error until [`Decoder::reset`] is called.
pub trait Decoder {
    /// Offers up to `*bytecount` bytes at `buf`. On return, `*bytecount`
    /// holds the number of trailing bytes in `buf` that were *not*
    /// consumed (to be re-offered by the caller on the next call).
    fn consume_buffer(&mut self, buf: &[u8], bytecount: &mut usize) -> Disposition<Value>;

    /// Signals end-of-input. `Success` if the accumulated state is a
    /// complete, well-formed artifact; `Error` otherwise.
    fn chop(&mut self) -> Disposition<Value>;

    /// Returns the decoder to its initial state.
    fn reset(&mut self);
}

/// Consumes a [`Value`], produces bytes.
pub trait Encoder {
    /// Adopts a new Value as the source and clears any prior emission
    /// state.
    fn reset(&mut self, value: Value);

    /// Writes at most `*bytecount` bytes into `buf`. On return,
    /// `*bytecount` holds the number of bytes actually written.
    fn fill_buffer(&mut self, buf: &mut [u8], bytecount: &mut usize) -> Disposition<bool>;
}
