//! Parser, in-memory index and serializer for HRX, the human-readable
//! archive format.
//!
//! An HRX archive packs files, empty directories and comments into a single
//! UTF-8 stream delimited by boundary lines such as `<===>`:
//!
//! ```text
//! <===> input.scss
//! ul { margin-left: 1em; }
//! <===> dir/
//! ```
//!
//! [`Archive`] is the entry point: parse or load a stream, query and mutate
//! it by path, carve out child views with [`Archive::child_archive`], and
//! emit it again with [`Archive::to_text`].

mod archive;
mod de;
mod entry;
pub mod error;
mod order;
pub mod path;
mod ser;
mod tree;

pub use archive::{Archive, CommentMode, Position, DEFAULT_BOUNDARY_LENGTH};
pub use entry::{DirectoryEntry, Entry, FileEntry};
pub use error::{ArchiveError, ArgumentError, EncodingError, LoadError, ParseError, ParseErrorKind};
pub use path::HrxPath;

pub use glob::MatchOptions;
