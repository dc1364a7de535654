use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntoHrxPathError {
    EmptyPath,
    LeadingSeparator,
    TrailingSeparator,
    EmptyComponent { column: usize },
    ReservedComponent { component: String, column: usize },
    InvalidCharacter { character: char, column: usize },
}

impl std::error::Error for IntoHrxPathError {}

impl fmt::Display for IntoHrxPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntoHrxPathError::EmptyComponent { column } => {
                write!(f, "{} at column {}", self.as_str(), column)
            }
            IntoHrxPathError::ReservedComponent { component, column } => {
                write!(f, "{} \"{}\" at column {}", self.as_str(), component, column)
            }
            IntoHrxPathError::InvalidCharacter { character, column } => write!(
                f,
                "{} {:?} at column {}",
                self.as_str(),
                character,
                column
            ),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl IntoHrxPathError {
    pub fn as_str(&self) -> &str {
        match self {
            IntoHrxPathError::EmptyPath => "no path provided",
            IntoHrxPathError::LeadingSeparator => "path may not start with a separator",
            IntoHrxPathError::TrailingSeparator => "file path may not end with a separator",
            IntoHrxPathError::EmptyComponent { .. } => "empty path component",
            IntoHrxPathError::ReservedComponent { .. } => "reserved path component",
            IntoHrxPathError::InvalidCharacter { .. } => "invalid character",
        }
    }

    /// 1-based column of the offending character, relative to the start of the path.
    pub fn column(&self) -> usize {
        match self {
            IntoHrxPathError::EmptyComponent { column }
            | IntoHrxPathError::ReservedComponent { column, .. }
            | IntoHrxPathError::InvalidCharacter { column, .. } => *column,
            _ => 1,
        }
    }

    pub fn as_io_error(&self) -> std::io::Error {
        use std::io::{Error, ErrorKind};
        Error::new(ErrorKind::InvalidInput, self.to_string())
    }
}

impl From<IntoHrxPathError> for std::io::Error {
    fn from(err: IntoHrxPathError) -> Self {
        err.as_io_error()
    }
}
