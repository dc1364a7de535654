use std::fmt;
use std::path::PathBuf;

use crate::path::IntoHrxPathError;

/// What the parser expected, or found, when it gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected boundary")]
    ExpectedBoundary,

    #[error("expected space")]
    ExpectedSpace,

    #[error("expected path")]
    ExpectedPath,

    #[error("expected newline")]
    ExpectedNewline,

    #[error("invalid path component \"{0}\"")]
    InvalidPathComponent(String),

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("\"{0}\" defined twice")]
    DefinedTwice(String),
}

/// A grammar violation, positioned at a 1-based line and column of the
/// source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn at(text: &str, offset: usize, file: Option<&str>, kind: ParseErrorKind) -> Self {
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        ParseError {
            line,
            column,
            file: file.map(str::to_string),
            kind,
        }
    }
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}: {}", file, self.line, self.column, self.kind),
            None => write!(f, "line {}, column {}: {}", self.line, self.column, self.kind),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Archive is not valid UTF-8{}", .file.as_ref().map(|f| format!(". Path: '{}'", f)).unwrap_or_default())]
pub struct EncodingError {
    pub file: Option<String>,
    #[source]
    pub source: std::str::Utf8Error,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read HRX file. Path: '{}'", .1.display())]
    Io(#[source] std::io::Error, PathBuf),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Logical errors from querying or mutating an archive. The archive is left
/// untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    #[error("\"{0}\" defined twice")]
    DefinedTwice(String),

    #[error("\"{0}\" doesn't exist")]
    NotFound(String),

    #[error("\"{0}\" is a directory")]
    IsDirectory(String),

    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("\"{0}\" is a file, so \"{1}\" can't be created")]
    ParentIsFile(String, String),

    #[error("\"{0}\" is not an explicit directory")]
    NotExplicitDirectory(String),

    #[error("\"{0}\" is a non-empty directory")]
    DirectoryNotEmpty(String),

    #[error("\"{0}\" doesn't exist, so nothing can be inserted next to it")]
    AnchorNotFound(String),

    #[error("Invalid path \"{1}\"")]
    InvalidPath(#[source] IntoHrxPathError, String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("boundary length must be positive, got {0}")]
    InvalidBoundaryLength(usize),
}
