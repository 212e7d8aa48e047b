//! Small, `Default`-derived configuration knobs for the façade's `load`/
//! `dump` loops, analogous to the teacher's feature-gated config structs.

/// Tuning for [`crate::io::load`]/[`crate::io::load_file_autodecode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Size of the scratch buffer used when reading from a file via
    /// [`crate::registry::builtin`] autodecode. Ignored by callers driving
    /// their own [`ellis_registry::SyncInputStream`].
    pub chunk_size: usize,
    /// Upper bound on container nesting depth a decoder is willing to
    /// build before raising `ParseFail`. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            chunk_size: 64 * 1024,
            max_depth: Some(512),
        }
    }
}

/// Tuning for [`crate::io::dump`]/[`crate::io::dump_file_autoencode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// Size of the scratch buffer used when writing to a file via
    /// autoencode. Ignored by callers driving their own
    /// [`ellis_registry::SyncOutputStream`].
    pub chunk_size: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig { chunk_size: 64 * 1024 }
    }
}
