//! Ellis: an in-memory, format-independent hierarchical data
//! representation with reference-counted copy-on-write semantics, a
//! `{key}`/`[index]` path sublanguage, and an incremental, resumable codec
//! framework for JSON, MessagePack, and delimited text.
//!
//! This crate is the façade: it re-exports the data model from
//! `ellis-core`, the codec contract from `ellis-codec`, the three
//! built-in wire formats, and wires them together behind [`io::load`]/
//! [`io::dump`] and [`registry::builtin`].

pub mod config;
pub mod io;
pub mod registry;

pub use config::{DumpConfig, LoadConfig};
pub use ellis_core::{parse_path, AddPolicy, Error, ErrorKind, Kind, Map, Result, Selector, Value};
pub use ellis_codec::{Decoder, Disposition, Encoder};
pub use ellis_registry::{
    FileInputStream, FileOutputStream, FormatEntry, FormatInfo, FormatRegistry, SliceInputStream,
    SyncInputStream, SyncOutputStream, VecOutputStream,
};

use std::path::Path;

/// Decodes the file at `path` by trying every format registered for its
/// extension, in the order the registry offers them.
///
/// `InvalidArgs` if `path` has no extension; `NoSuch`/`TranslateFail` per
/// [`registry::autodecode`].
pub fn load_file_autodecode(
    reg: &FormatRegistry,
    path: impl AsRef<Path>,
    _config: &LoadConfig,
) -> Result<Value> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::invalid_args(format!("{path:?} has no file extension")))?;
    let bytes = std::fs::read(path).map_err(|e| Error::io(e.to_string()))?;
    registry::autodecode(reg, extension, &bytes)
}

/// Encodes `value` and writes it to `path`, picking the first format
/// registered for the path's extension.
///
/// `InvalidArgs` if `path` has no extension; `NoSuch` per
/// [`registry::autoencode`].
pub fn dump_file_autoencode(
    reg: &FormatRegistry,
    path: impl AsRef<Path>,
    value: Value,
    _config: &DumpConfig,
) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::invalid_args(format!("{path:?} has no file extension")))?;
    let bytes = registry::autoencode(reg, extension, value)?;
    std::fs::write(path, bytes).map_err(|e| Error::io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_file_autodecode_rejects_extensionless_paths() {
        let reg = registry::builtin();
        let config = LoadConfig::default();
        let err = load_file_autodecode(&reg, "no_extension_here", &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgs);
    }

    #[test]
    fn round_trips_a_value_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.json");
        let reg = registry::builtin();

        let value = Value::array_from(vec![Value::from(1i64), Value::u8str("two")]);
        dump_file_autoencode(&reg, &path, value, &DumpConfig::default()).unwrap();

        let loaded = load_file_autodecode(&reg, &path, &LoadConfig::default()).unwrap();
        assert_eq!(loaded.as_array().unwrap().len(), 2);
    }
}
