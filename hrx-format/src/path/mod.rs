use std::{fmt, path::PathBuf};

mod error;

pub use self::error::IntoHrxPathError;

/// The separator used between components of an `HrxPath`. A trailing
/// separator marks a directory.
pub const PATH_HRX_SEP: char = '/';

#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct HrxPath(pub(crate) String);

/// Whether `c` may appear inside a path component.
#[inline(always)]
pub fn is_path_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}' | '/' | ':' | '\\')
}

/// Scans a path from the start of `input`, stopping at the first character
/// that cannot continue it. A single trailing separator is accepted.
///
/// Returns the number of bytes that make up the path. The caller decides
/// whether the remainder of `input` is acceptable, which lets the parser use
/// this as its path lexer.
pub fn scan_path(input: &str) -> Result<usize, IntoHrxPathError> {
    let mut pos = 0;
    let mut column = 1;

    loop {
        let start = pos;
        let start_column = column;

        for c in input[pos..].chars() {
            if !is_path_char(c) {
                break;
            }
            pos += c.len_utf8();
            column += 1;
        }

        let component = &input[start..pos];
        if component.is_empty() {
            return Err(match input[pos..].chars().next() {
                None if start == 0 => IntoHrxPathError::EmptyPath,
                Some(PATH_HRX_SEP) if start == 0 => IntoHrxPathError::LeadingSeparator,
                Some(PATH_HRX_SEP) | None => IntoHrxPathError::EmptyComponent {
                    column: start_column,
                },
                Some(character) => IntoHrxPathError::InvalidCharacter {
                    character,
                    column: start_column,
                },
            });
        }

        if component == "." || component == ".." {
            return Err(IntoHrxPathError::ReservedComponent {
                component: component.to_string(),
                column: start_column,
            });
        }

        let mut rest = input[pos..].chars();
        if rest.next() != Some(PATH_HRX_SEP) {
            return Ok(pos);
        }

        match rest.next() {
            Some(c) if is_path_char(c) => {
                pos += 1;
                column += 1;
            }
            Some(PATH_HRX_SEP) => {
                return Err(IntoHrxPathError::EmptyComponent { column: column + 1 })
            }
            _ => return Ok(pos + 1),
        }
    }
}

/// Validates that the whole of `path` is a well-formed path. Directory paths
/// (with a trailing separator) are accepted.
pub fn validate_path(path: &str) -> Result<(), IntoHrxPathError> {
    let len = scan_path(path)?;

    match path[len..].chars().next() {
        None => Ok(()),
        Some(character) => Err(IntoHrxPathError::InvalidCharacter {
            character,
            column: path[..len].chars().count() + 1,
        }),
    }
}

impl HrxPath {
    pub fn new<S: AsRef<str>>(path: S) -> std::result::Result<HrxPath, IntoHrxPathError> {
        let path = path.as_ref();
        validate_path(path)?;
        Ok(HrxPath(path.to_string()))
    }

    /// A path suitable for a file: it may not end with a separator.
    pub fn file<S: AsRef<str>>(path: S) -> std::result::Result<HrxPath, IntoHrxPathError> {
        let path = Self::new(path)?;
        if path.is_directory() {
            return Err(IntoHrxPathError::TrailingSeparator);
        }
        Ok(path)
    }

    /// A path suitable for a directory. The trailing separator is added if
    /// it is missing.
    pub fn directory<S: AsRef<str>>(path: S) -> std::result::Result<HrxPath, IntoHrxPathError> {
        let path = path.as_ref();
        if path.ends_with(PATH_HRX_SEP) {
            Self::new(path)
        } else {
            Self::new(format!("{}{}", path, PATH_HRX_SEP))
        }
    }

    #[inline(always)]
    pub(crate) fn new_unchecked(path: String) -> HrxPath {
        HrxPath(path)
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.0.ends_with(PATH_HRX_SEP)
    }

    /// The path without its directory marker.
    #[inline(always)]
    pub fn trimmed(&self) -> &str {
        self.0.strip_suffix(PATH_HRX_SEP).unwrap_or(&self.0)
    }

    pub fn iter(&self) -> std::str::Split<'_, char> {
        self.trimmed().split(PATH_HRX_SEP)
    }

    /// Number of components in the path.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// The enclosing directory, with its trailing separator.
    pub fn parent(&self) -> Option<HrxPath> {
        let trimmed = self.trimmed();
        trimmed
            .rfind(PATH_HRX_SEP)
            .map(|i| HrxPath(trimmed[..=i].to_string()))
    }

    pub fn filename(&self) -> &str {
        let trimmed = self.trimmed();
        match trimmed.rfind(PATH_HRX_SEP) {
            Some(i) => &trimmed[i + 1..],
            None => trimmed,
        }
    }

    /// Component-wise prefix test, ignoring directory markers.
    pub fn starts_with(&self, other: &HrxPath) -> bool {
        let mut ours = self.iter();
        other.iter().all(|theirs| ours.next() == Some(theirs))
    }

    /// Strips `root` (which ends with a separator) from the front of the path.
    pub fn relative_to(&self, root: Option<&str>) -> HrxPath {
        match root.and_then(|root| self.0.strip_prefix(root)) {
            Some(rest) => HrxPath(rest.to_string()),
            None => self.clone(),
        }
    }

    /// Prepends `root` (which ends with a separator) to the path.
    pub fn absolute_with(&self, root: Option<&str>) -> HrxPath {
        match root {
            Some(root) => HrxPath(format!("{}{}", root, self.0)),
            None => self.clone(),
        }
    }

    /// The path in the platform's preferred form, for use on disk.
    pub fn to_path_buf(&self) -> PathBuf {
        self.iter().collect()
    }
}

impl AsRef<str> for HrxPath {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HrxPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert_eq!(HrxPath::new("somethingelse/foo.txt").unwrap().0, "somethingelse/foo.txt");
        assert_eq!(HrxPath::new("dir/").unwrap().0, "dir/");
        assert!(HrxPath::new("dir/").unwrap().is_directory());
    }

    #[test]
    fn validation_empty() {
        assert_eq!(HrxPath::new(""), Err(IntoHrxPathError::EmptyPath));
    }

    #[test]
    fn validation_leading_slash() {
        assert_eq!(HrxPath::new("/etc"), Err(IntoHrxPathError::LeadingSeparator));
        assert_eq!(HrxPath::new("/"), Err(IntoHrxPathError::LeadingSeparator));
    }

    #[test]
    fn validation_doubled_slash() {
        assert_eq!(
            HrxPath::new("cant/hate//the/path"),
            Err(IntoHrxPathError::EmptyComponent { column: 11 })
        );
    }

    #[test]
    fn validation_dots() {
        assert_eq!(
            HrxPath::new("a/../b"),
            Err(IntoHrxPathError::ReservedComponent {
                component: "..".into(),
                column: 3
            })
        );
        assert!(HrxPath::new("./self").is_err());
        assert!(HrxPath::new("dir/.").is_err());
        assert!(HrxPath::new("...").is_ok());
        assert!(HrxPath::new(".hidden").is_ok());
    }

    #[test]
    fn validation_forbidden_characters() {
        for bad in ["a:b", "a\\b", "a\u{7f}", "tab\there", "nul\0"] {
            assert!(
                matches!(
                    HrxPath::new(bad),
                    Err(IntoHrxPathError::InvalidCharacter { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }

        assert_eq!(
            HrxPath::new("ab:c"),
            Err(IntoHrxPathError::InvalidCharacter {
                character: ':',
                column: 3
            })
        );
    }

    #[test]
    fn validation_unicode() {
        let path = HrxPath::new("this is now العَرَبِيَّة.txt").unwrap();
        assert_eq!(path.as_str(), "this is now العَرَبِيَّة.txt");

        let path = HrxPath::new("🧊/🧊").unwrap();
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn scanning_stops_at_newline() {
        assert_eq!(scan_path("dir/file\ncontents"), Ok(8));
        assert_eq!(scan_path("dir/\n"), Ok(4));
        assert_eq!(scan_path("name with spaces\n"), Ok(16));
    }

    #[test]
    fn file_and_directory_constructors() {
        assert_eq!(HrxPath::file("dir/"), Err(IntoHrxPathError::TrailingSeparator));
        assert_eq!(HrxPath::directory("dir").unwrap().as_str(), "dir/");
        assert_eq!(HrxPath::directory("dir/").unwrap().as_str(), "dir/");
    }

    #[test]
    fn navigation() {
        let path = HrxPath::new("a/b/c.txt").unwrap();
        assert_eq!(path.parent().unwrap().as_str(), "a/b/");
        assert_eq!(path.filename(), "c.txt");
        assert!(path.starts_with(&HrxPath::new("a/b/").unwrap()));
        assert!(!path.starts_with(&HrxPath::new("a/bc").unwrap()));

        let dir = HrxPath::new("a/b/").unwrap();
        assert_eq!(dir.filename(), "b");
        assert_eq!(dir.parent().unwrap().as_str(), "a/");
        assert!(HrxPath::new("top").unwrap().parent().is_none());
    }

    #[test]
    fn rooting() {
        let path = HrxPath::new("dir/sub/mid").unwrap();
        let relative = path.relative_to(Some("dir/"));
        assert_eq!(relative.as_str(), "sub/mid");
        assert_eq!(relative.absolute_with(Some("dir/")), path);
        assert_eq!(path.relative_to(None), path);
        assert_eq!(path.absolute_with(None), path);
    }
}
