use std::path::PathBuf;

use hrx_format::path::IntoHrxPathError;
use hrx_format::{ArchiveError, LoadError};
use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    #[diagnostic(help("Is this a valid .hrx file?"))]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("Archive already exists: `{}`", path.display())]
    #[diagnostic(help("Use -f/--force to overwrite"))]
    ArchiveExists { path: PathBuf },

    #[error("No files specified to add to archive")]
    #[diagnostic(help("Specify one or more files or directories to archive"))]
    NoFilesSpecified,

    #[error("Cannot handle path `{}`", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: IntoHrxPathError,
    },

    #[error("Cannot store path `{}` in an archive", .path.display())]
    #[diagnostic(help("Paths must be relative and UTF-8; use -R/--root to strip a prefix"))]
    UnrepresentablePath { path: PathBuf },

    #[error("Cannot read file `{}`", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File `{}` is not UTF-8 text", .path.display())]
    #[diagnostic(help("HRX archives can only hold text files"))]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Cannot add `{path}` to archive")]
    AddEntry {
        path: String,
        #[source]
        source: ArchiveError,
    },

    #[error("Cannot process directory entry")]
    ProcessDirEntry {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write archive `{}`", .path.display())]
    WriteArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create directory `{}`", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create file `{}`", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: `{}`", .path.display())]
    #[diagnostic(help("Use -f/--force to overwrite"))]
    FileExists { path: PathBuf },

    #[error("Refusing to add archive `{}` to itself", .path.display())]
    RecursiveArchive { path: PathBuf },
}
