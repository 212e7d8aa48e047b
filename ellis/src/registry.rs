//! Populates a [`FormatRegistry`] with the three built-in wire formats
//! (§6.3) and the autoselect helpers layered on top of it.

use ellis_core::{Error, Result, Value};
use ellis_registry::{FormatEntry, FormatRegistry, SliceInputStream, VecOutputStream};

use crate::io;

/// A [`FormatRegistry`] pre-populated with JSON, MessagePack, and
/// delimited-text codecs under their canonical names/extensions.
pub fn builtin() -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    registry.register(FormatEntry::new(
        "builtin.json",
        "json",
        "JSON text with // comments and /ELLIS_BINARY/-marked binary strings",
        || Box::new(ellis_json::JsonDecoder::new()),
        || Box::new(ellis_json::JsonEncoder::new()),
    ));
    registry.register(FormatEntry::new(
        "builtin.msgpack",
        "msgpack",
        "MessagePack binary encoding",
        || Box::new(ellis_msgpack::MsgpackDecoder::new()),
        || Box::new(ellis_msgpack::MsgpackEncoder::new()),
    ));
    registry.register(FormatEntry::new(
        "builtin.txtfile.lines",
        "txt",
        "Newline-delimited text, one Array of U8Str per line",
        || Box::new(ellis_text::TextDecoder::new()),
        || Box::new(ellis_text::TextEncoder::new()),
    ));
    registry
}

/// Decodes `bytes` by trying every format registered under `extension` in
/// turn, reporting whichever error was raised last if none succeed.
///
/// `TranslateFail` if at least one candidate format exists but all of them
/// fail; `NoSuch` if no format is registered under `extension` at all.
pub fn autodecode(registry: &FormatRegistry, extension: &str, bytes: &[u8]) -> Result<Value> {
    let candidates = registry.by_extension(extension);
    if candidates.is_empty() {
        return Err(Error::no_such(format!(
            "no format registered for extension {extension:?}"
        )));
    }
    let mut last_err = None;
    for entry in candidates {
        let mut decoder = (entry.make_decoder)();
        let mut input = SliceInputStream::new(bytes);
        match io::load(decoder.as_mut(), &mut input) {
            Ok(v) => return Ok(v),
            Err(e) => {
                tracing::debug!(format = %entry.info.unique_name, error = %e, "autodecode candidate failed");
                last_err = Some(e);
            }
        }
    }
    Err(Error::translate_fail(format!(
        "no registered format for extension {extension:?} could decode the input: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Encodes `value` with the first format registered under `extension`.
///
/// `NoSuch` if no format is registered under `extension`.
pub fn autoencode(registry: &FormatRegistry, extension: &str, value: Value) -> Result<Vec<u8>> {
    let entry = registry
        .by_extension(extension)
        .into_iter()
        .next()
        .ok_or_else(|| Error::no_such(format!("no format registered for extension {extension:?}")))?;
    let mut encoder = (entry.make_encoder)();
    encoder.reset(value);
    let mut output = VecOutputStream::new();
    io::dump(encoder.as_mut(), &mut output)?;
    Ok(output.into_inner())
}
