//! The format registry and the synchronous stream interfaces codecs are
//! driven against (§6.1, §6.3). Concrete wire formats (JSON, MessagePack,
//! delimited text) are plugged in by callers — `ellis::registry::builtin`
//! is where the three built-in ones get registered.

pub mod registry;
pub mod stream;

pub use registry::{DecoderFactory, EncoderFactory, FormatEntry, FormatInfo, FormatRegistry};
pub use stream::{FileInputStream, FileOutputStream, SliceInputStream, SyncInputStream, SyncOutputStream, VecOutputStream};
