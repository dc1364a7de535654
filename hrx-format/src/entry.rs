use std::sync::Arc;

use crate::path::{HrxPath, IntoHrxPathError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl Entry {
    #[inline(always)]
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Entry::File(file) => Some(file),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_directory(&self) -> Option<&DirectoryEntry> {
        match self {
            Entry::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    #[inline(always)]
    pub fn path(&self) -> &HrxPath {
        match self {
            Entry::File(file) => file.path(),
            Entry::Directory(dir) => dir.path(),
        }
    }

    #[inline(always)]
    pub fn comment(&self) -> Option<&str> {
        match self {
            Entry::File(file) => file.comment(),
            Entry::Directory(dir) => dir.comment(),
        }
    }

    /// Content of a file, `None` for a directory.
    #[inline(always)]
    pub fn content(&self) -> Option<&str> {
        self.as_file().map(FileEntry::content)
    }

    /// The same entry with `root` stripped from its path. Content and
    /// comment are shared, not copied.
    pub fn relative_to(&self, root: Option<&str>) -> Entry {
        match root {
            None => self.clone(),
            Some(_) => self.with_path(self.path().relative_to(root)),
        }
    }

    /// The same entry with `root` prepended to its path.
    pub fn absolute_with(&self, root: Option<&str>) -> Entry {
        match root {
            None => self.clone(),
            Some(_) => self.with_path(self.path().absolute_with(root)),
        }
    }

    fn with_path(&self, path: HrxPath) -> Entry {
        match self {
            Entry::File(file) => Entry::File(FileEntry {
                path,
                content: Arc::clone(&file.content),
                comment: file.comment.clone(),
            }),
            Entry::Directory(dir) => Entry::Directory(DirectoryEntry {
                path,
                comment: dir.comment.clone(),
            }),
        }
    }
}

impl From<FileEntry> for Entry {
    fn from(file: FileEntry) -> Self {
        Entry::File(file)
    }
}

impl From<DirectoryEntry> for Entry {
    fn from(dir: DirectoryEntry) -> Self {
        Entry::Directory(dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The path of the file. A path is always relative (no leading separator),
    /// always delimited by `/`, never ends with `/`, and may not contain any
    /// `.` or `..` components.
    pub(crate) path: HrxPath,

    /// The contents of the file, which may be empty.
    pub(crate) content: Arc<str>,

    /// The comment immediately preceding the file in the archive, if any.
    pub(crate) comment: Option<Arc<str>>,
}

impl FileEntry {
    pub fn new<P, C>(path: P, content: C) -> Result<FileEntry, IntoHrxPathError>
    where
        P: AsRef<str>,
        C: Into<Arc<str>>,
    {
        Ok(FileEntry {
            path: HrxPath::file(path)?,
            content: content.into(),
            comment: None,
        })
    }

    pub(crate) fn new_unchecked(path: &str, content: &str, comment: Option<&str>) -> FileEntry {
        FileEntry {
            path: HrxPath::new_unchecked(path.to_string()),
            content: content.into(),
            comment: comment.map(Into::into),
        }
    }

    pub fn with_comment<C: Into<Arc<str>>>(mut self, comment: Option<C>) -> FileEntry {
        self.comment = comment.map(Into::into);
        self
    }

    #[inline(always)]
    pub fn path(&self) -> &HrxPath {
        &self.path
    }

    #[inline(always)]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The content as a shared string, without copying it.
    #[inline(always)]
    pub fn shared_content(&self) -> Arc<str> {
        Arc::clone(&self.content)
    }

    #[inline(always)]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// The path of the directory, always ending with `/`.
    pub(crate) path: HrxPath,

    pub(crate) comment: Option<Arc<str>>,
}

impl DirectoryEntry {
    pub fn new<P: AsRef<str>>(path: P) -> Result<DirectoryEntry, IntoHrxPathError> {
        Ok(DirectoryEntry {
            path: HrxPath::directory(path)?,
            comment: None,
        })
    }

    pub(crate) fn new_unchecked(path: &str, comment: Option<&str>) -> DirectoryEntry {
        DirectoryEntry {
            path: HrxPath::new_unchecked(path.to_string()),
            comment: comment.map(Into::into),
        }
    }

    pub fn with_comment<C: Into<Arc<str>>>(mut self, comment: Option<C>) -> DirectoryEntry {
        self.comment = comment.map(Into::into);
        self
    }

    #[inline(always)]
    pub fn path(&self) -> &HrxPath {
        &self.path
    }

    #[inline(always)]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
