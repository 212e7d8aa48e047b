//! Format registry (§6.3): a plain, non-thread-safe map from a format's
//! unique name to the pair of factories that build decoders/encoders for
//! it, also indexable by file extension.

use std::collections::HashMap;

use ellis_codec::{Decoder, Encoder};
use serde::{Deserialize, Serialize};

pub type DecoderFactory = fn() -> Box<dyn Decoder>;
pub type EncoderFactory = fn() -> Box<dyn Encoder>;

/// Metadata describing a registered format, independent of the factory
/// functions that actually build codec instances. This is the piece that
/// is meaningfully serializable (for listing/diagnostics); the factories
/// are not data and are kept on [`FormatEntry`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub unique_name: String,
    pub extension: String,
    pub description: String,
}

pub struct FormatEntry {
    pub info: FormatInfo,
    pub make_decoder: DecoderFactory,
    pub make_encoder: EncoderFactory,
}

impl FormatEntry {
    pub fn new(
        unique_name: impl Into<String>,
        extension: impl Into<String>,
        description: impl Into<String>,
        make_decoder: DecoderFactory,
        make_encoder: EncoderFactory,
    ) -> Self {
        FormatEntry {
            info: FormatInfo {
                unique_name: unique_name.into(),
                extension: extension.into(),
                description: description.into(),
            },
            make_decoder,
            make_encoder,
        }
    }
}

#[derive(Default)]
pub struct FormatRegistry {
    by_name: HashMap<String, FormatEntry>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry::default()
    }

    /// Registers `entry`, taking ownership of it. Replaces any existing
    /// entry under the same unique name.
    pub fn register(&mut self, entry: FormatEntry) {
        if self.by_name.contains_key(&entry.info.unique_name) {
            tracing::debug!(name = %entry.info.unique_name, "replacing existing format registration");
        } else {
            tracing::debug!(name = %entry.info.unique_name, extension = %entry.info.extension, "registering format");
        }
        self.by_name.insert(entry.info.unique_name.clone(), entry);
    }

    /// Revokes a registration, returning it if one existed.
    pub fn deregister(&mut self, unique_name: &str) -> Option<FormatEntry> {
        let removed = self.by_name.remove(unique_name);
        if removed.is_some() {
            tracing::debug!(name = %unique_name, "deregistered format");
        }
        removed
    }

    pub fn by_unique_name(&self, unique_name: &str) -> Option<&FormatEntry> {
        self.by_name.get(unique_name)
    }

    /// Candidate formats registered under `extension`, in no particular
    /// order; callers needing autoselect try each in turn.
    pub fn by_extension(&self, extension: &str) -> Vec<&FormatEntry> {
        self.by_name
            .values()
            .filter(|e| e.info.extension == extension)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatEntry> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ellis_json::{JsonDecoder, JsonEncoder};

    fn json_entry() -> FormatEntry {
        FormatEntry::new(
            "builtin.json",
            "json",
            "JSON",
            || Box::new(JsonDecoder::new()),
            || Box::new(JsonEncoder::new()),
        )
    }

    #[test]
    fn register_and_look_up_by_name_and_extension() {
        let mut reg = FormatRegistry::new();
        reg.register(json_entry());
        assert!(reg.by_unique_name("builtin.json").is_some());
        assert_eq!(reg.by_extension("json").len(), 1);
        assert!(reg.by_extension("msgpack").is_empty());
    }

    #[test]
    fn deregister_removes_the_entry() {
        let mut reg = FormatRegistry::new();
        reg.register(json_entry());
        assert!(reg.deregister("builtin.json").is_some());
        assert!(reg.by_unique_name("builtin.json").is_none());
        assert!(reg.deregister("builtin.json").is_none());
    }

    #[test]
    fn registering_under_the_same_name_replaces() {
        let mut reg = FormatRegistry::new();
        reg.register(json_entry());
        reg.register(FormatEntry::new(
            "builtin.json",
            "json",
            "JSON (replacement)",
            || Box::new(JsonDecoder::new()),
            || Box::new(JsonEncoder::new()),
        ));
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.by_unique_name("builtin.json").unwrap().info.description,
            "JSON (replacement)"
        );
    }
}
