use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use glob::{MatchOptions, Pattern, PatternError};

use crate::entry::{Entry, FileEntry};
use crate::error::{ArchiveError, ArgumentError, EncodingError, LoadError, ParseError};
use crate::order::{OrderedIndex, Slot};
use crate::path::{validate_path, HrxPath, PATH_HRX_SEP};
use crate::tree::{Conflict, Node, PathTree};

/// Boundary width used when nothing else has been asked for: `<===>`.
pub const DEFAULT_BOUNDARY_LENGTH: usize = 3;

/// What [`Archive::write`] does with the comment of a file it overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommentMode {
    /// Drop any existing comment.
    #[default]
    Clear,
    /// Keep the existing file's comment.
    Copy,
    /// Use this comment.
    Set(String),
}

/// Where [`Archive::add`] places a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position<'a> {
    #[default]
    End,
    Before(&'a str),
    After(&'a str),
}

/// The order sequence and path tree shared by an archive and all of its
/// child views.
#[derive(Debug, Default)]
struct Storage {
    order: OrderedIndex,
    tree: PathTree,
}

/// An HRX archive, or a view of one directory within an archive.
///
/// Child views created by [`Archive::child_archive`] share storage with the
/// archive they came from: writes through either are visible through both.
/// Paths passed to and returned from a view are relative to its root.
pub struct Archive {
    storage: Rc<RefCell<Storage>>,

    /// Absolute path of the view's directory, ending with `/`.
    root: Option<String>,

    boundary_length: usize,
    last_comment: Option<String>,
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("root", &self.root)
            .field("boundary_length", &self.boundary_length)
            .field("last_comment", &self.last_comment)
            .field("entries", &self.entries())
            .finish()
    }
}

impl Default for Archive {
    fn default() -> Self {
        Archive::new()
    }
}

impl Archive {
    pub fn new() -> Archive {
        Archive::empty(DEFAULT_BOUNDARY_LENGTH)
    }

    pub fn with_boundary_length(boundary_length: usize) -> Result<Archive, ArgumentError> {
        if boundary_length == 0 {
            return Err(ArgumentError::InvalidBoundaryLength(boundary_length));
        }
        Ok(Archive::empty(boundary_length))
    }

    pub(crate) fn empty(boundary_length: usize) -> Archive {
        Archive {
            storage: Rc::new(RefCell::new(Storage::default())),
            root: None,
            boundary_length,
            last_comment: None,
        }
    }

    /// Parses HRX text. `file` is only used to label error positions.
    pub fn parse(text: &str, file: Option<&str>) -> Result<Archive, ParseError> {
        crate::de::parse(text, file)
    }

    /// Parses raw bytes, which must be UTF-8.
    pub fn parse_bytes(bytes: &[u8], file: Option<&str>) -> Result<Archive, LoadError> {
        let text = std::str::from_utf8(bytes).map_err(|source| EncodingError {
            file: file.map(str::to_string),
            source,
        })?;
        Ok(Archive::parse(text, file)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Archive, LoadError> {
        let path = path.as_ref();
        tracing::debug!("load: {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| LoadError::Io(e, path.to_path_buf()))?;
        Archive::parse_bytes(&bytes, Some(path.display().to_string().as_str()))
    }

    /// Writes [`Archive::to_text`] to `path` in one go.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        tracing::debug!("save: {}", path.display());
        std::fs::write(path, self.to_text())
    }

    #[inline(always)]
    pub fn boundary_length(&self) -> usize {
        self.boundary_length
    }

    /// Sets the preferred boundary width. Serialization may still pick a
    /// wider boundary to avoid colliding with archived text.
    pub fn set_boundary_length(&mut self, boundary_length: usize) -> Result<(), ArgumentError> {
        if boundary_length == 0 {
            return Err(ArgumentError::InvalidBoundaryLength(boundary_length));
        }
        self.boundary_length = boundary_length;
        Ok(())
    }

    #[inline(always)]
    pub fn last_comment(&self) -> Option<&str> {
        self.last_comment.as_deref()
    }

    pub fn set_last_comment<S: Into<String>>(&mut self, comment: Option<S>) {
        self.last_comment = comment.map(Into::into);
    }

    /// The directory this view is rooted at, `None` for a whole archive.
    #[inline(always)]
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// A snapshot of the visible entries in archive order. Later changes to
    /// the archive are not reflected in the returned vector.
    pub fn entries(&self) -> Vec<Entry> {
        let storage = self.storage.borrow();
        storage
            .order
            .iter()
            .filter(|(_, entry)| self.is_visible(entry))
            .map(|(_, entry)| entry.relative_to(self.root()))
            .collect()
    }

    /// The entry at `path`, or `None` if there isn't one. Directories are
    /// found with or without their trailing separator; a trailing separator
    /// never finds a file.
    pub fn lookup(&self, path: &str) -> Option<Entry> {
        if validate_path(path).is_err() {
            return None;
        }

        let storage = self.storage.borrow();
        let slot = self.resolve_slot(&storage, path)?;
        storage
            .order
            .get(slot)
            .map(|entry| entry.relative_to(self.root()))
    }

    /// The content of the file at `path`.
    pub fn read(&self, path: &str) -> Result<Arc<str>, ArchiveError> {
        self.validate(path)?;

        let storage = self.storage.borrow();
        let absolute = self.absolute(path);
        match storage.tree.resolve(&split_path(&absolute)) {
            Some(Node::Leaf(slot)) if !path.ends_with(PATH_HRX_SEP) => {
                match storage.order.get(*slot) {
                    Some(Entry::File(file)) => Ok(file.shared_content()),
                    _ => Err(ArchiveError::NotFound(path.to_string())),
                }
            }
            Some(Node::Branch(_)) => Err(ArchiveError::IsDirectory(path.to_string())),
            _ => Err(ArchiveError::NotFound(path.to_string())),
        }
    }

    /// Entries whose path matches the shell-style `pattern`. See
    /// [`Archive::glob_with`].
    pub fn glob(&self, pattern: &str) -> Result<Vec<Entry>, PatternError> {
        self.glob_with(pattern, MatchOptions::new())
    }

    /// Entries whose path matches `pattern`. Matching is always
    /// pathname-aware: `*` never matches a `/`.
    ///
    /// Directories only match patterns that end with `/` or contain `**`.
    /// Implicit directories never match.
    pub fn glob_with(
        &self,
        pattern: &str,
        options: MatchOptions,
    ) -> Result<Vec<Entry>, PatternError> {
        let compiled = Pattern::new(pattern)?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..options
        };
        let wants_directories = pattern.ends_with(PATH_HRX_SEP);
        let recursive = pattern.contains("**");

        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| match entry {
                Entry::File(file) => compiled.matches_with(file.path().as_str(), options),
                Entry::Directory(dir) => {
                    let path = dir.path();
                    (wants_directories || recursive)
                        && (compiled.matches_with(path.as_str(), options)
                            || (recursive && compiled.matches_with(path.trimmed(), options)))
                }
            })
            .collect())
    }

    /// Writes `content` to the file at `path`.
    ///
    /// An existing file keeps its place in the archive. A new file is placed
    /// after the last entry under its nearest existing ancestor directory,
    /// or at the end of the archive if it has none. Intermediate
    /// directories are implicit; no directory entries are created.
    pub fn write<C: Into<Arc<str>>>(
        &mut self,
        path: &str,
        content: C,
        comment: CommentMode,
    ) -> Result<(), ArchiveError> {
        tracing::trace!("write: {}", path);
        let file_path = HrxPath::file(path).map_err(|err| match err {
            crate::path::IntoHrxPathError::TrailingSeparator => {
                ArchiveError::IsDirectory(path.to_string())
            }
            err => ArchiveError::InvalidPath(err, path.to_string()),
        })?;

        let absolute = self.absolute(file_path.as_str());
        let components = split_path(&absolute);
        let storage = &mut *self.storage.borrow_mut();

        match storage.tree.check_insert(&components, false) {
            Ok(()) => {}
            Err(Conflict::ParentIsFile(depth)) => {
                return Err(ArchiveError::ParentIsFile(
                    self.relative(&components[..depth]),
                    path.to_string(),
                ))
            }
            Err(Conflict::Occupied(_)) => {
                let slot = match storage.tree.resolve(&components) {
                    Some(Node::Leaf(slot)) => *slot,
                    _ => return Err(ArchiveError::IsDirectory(path.to_string())),
                };
                let previous = storage.order.get(slot).and_then(Entry::comment);
                let comment = match comment {
                    CommentMode::Clear => None,
                    CommentMode::Copy => previous.map(Into::into),
                    CommentMode::Set(comment) => Some(comment.into()),
                };
                let file = FileEntry {
                    path: HrxPath::new_unchecked(absolute.clone()),
                    content: content.into(),
                    comment,
                };
                storage.order.replace(slot, file.into());
                return Ok(());
            }
        }

        let comment = match comment {
            CommentMode::Set(comment) => Some(comment.into()),
            _ => None,
        };
        let file = FileEntry {
            path: HrxPath::new_unchecked(absolute.clone()),
            content: content.into(),
            comment,
        };

        let sibling = (1..components.len()).rev().find_map(|depth| {
            match storage.tree.resolve(&components[..depth]) {
                Some(node @ Node::Branch(_)) => last_slot(&storage.order, node),
                _ => None,
            }
        });

        insert_entry(storage, &components, file.into(), sibling, false, path)
    }

    /// Adds a new entry, at the end of the archive (or of this view) or next
    /// to an existing entry.
    ///
    /// The anchor of [`Position::Before`] or [`Position::After`] must be an
    /// actual entry; implicit directories can't be anchors.
    pub fn add(&mut self, entry: Entry, position: Position<'_>) -> Result<(), ArchiveError> {
        tracing::trace!("add: {} {:?}", entry.path(), position);
        let entry = entry.absolute_with(self.root());
        let directory = entry.is_directory();
        let display = entry.path().relative_to(self.root()).to_string();
        let absolute = entry.path().as_str().to_string();
        let components = split_path(&absolute);
        let storage = &mut *self.storage.borrow_mut();

        match storage.tree.check_insert(&components, directory) {
            Ok(()) => {}
            Err(Conflict::Occupied(depth)) | Err(Conflict::ParentIsFile(depth)) => {
                let duplicate = if depth == components.len() {
                    display
                } else {
                    self.relative(&components[..depth])
                };
                return Err(ArchiveError::DefinedTwice(duplicate));
            }
        }

        match position {
            Position::End => {
                let anchor = match &self.root {
                    Some(root) => storage
                        .tree
                        .resolve(&split_path(root))
                        .and_then(|node| last_slot(&storage.order, node)),
                    None => None,
                };
                insert_entry(storage, &components, entry, anchor, false, &display)
            }
            Position::Before(anchor) | Position::After(anchor) => {
                let slot = validate_path(anchor)
                    .ok()
                    .and_then(|_| self.resolve_slot(storage, anchor))
                    .ok_or_else(|| ArchiveError::AnchorNotFound(anchor.to_string()))?;
                let before = matches!(position, Position::Before(_));
                insert_entry(storage, &components, entry, Some(slot), before, &display)
            }
        }
    }

    /// Removes the entry at `path`. Directories with anything beneath them,
    /// and implicit directories, need `recursive`.
    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<(), ArchiveError> {
        tracing::trace!("delete: {} (recursive: {})", path, recursive);
        self.validate(path)?;

        let absolute = self.absolute(path);
        let components = split_path(&absolute);
        let storage = &mut *self.storage.borrow_mut();

        let slots = match storage.tree.resolve(&components) {
            None => return Err(ArchiveError::NotFound(path.to_string())),
            Some(Node::Leaf(_)) if path.ends_with(PATH_HRX_SEP) => {
                return Err(ArchiveError::NotADirectory(path.to_string()))
            }
            Some(Node::Leaf(slot)) => vec![*slot],
            Some(node @ Node::Branch(_)) if recursive => node.slots(),
            Some(Node::Branch(branch)) => match branch.marker {
                None => return Err(ArchiveError::NotExplicitDirectory(path.to_string())),
                Some(_) if !branch.children.is_empty() => {
                    return Err(ArchiveError::DirectoryNotEmpty(path.to_string()))
                }
                Some(marker) => vec![marker],
            },
        };

        storage.tree.remove(&components);
        for slot in slots {
            storage.order.remove(slot);
        }
        Ok(())
    }

    /// A view of the directory at `path`, sharing this archive's storage.
    pub fn child_archive(&self, path: &str) -> Result<Archive, ArchiveError> {
        self.validate(path)?;

        let absolute = self.absolute(path);
        let components = split_path(&absolute);
        match self.storage.borrow().tree.resolve(&components) {
            Some(Node::Branch(_)) => {}
            Some(Node::Leaf(_)) => return Err(ArchiveError::NotADirectory(path.to_string())),
            None => return Err(ArchiveError::NotFound(path.to_string())),
        }

        Ok(Archive {
            storage: Rc::clone(&self.storage),
            root: Some(format!("{}{}", components.join("/"), PATH_HRX_SEP)),
            boundary_length: self.boundary_length,
            last_comment: None,
        })
    }

    /// An independent copy of the visible entries, sharing no storage with
    /// this archive.
    pub fn detached(&self) -> Archive {
        let mut archive = Archive::empty(self.boundary_length);
        archive.last_comment = self.last_comment.clone();
        {
            let storage = &mut *archive.storage.borrow_mut();
            for entry in self.entries() {
                let absolute = entry.path().as_str().to_string();
                let slot = storage.order.push_back(entry.clone());
                let inserted = storage
                    .tree
                    .insert(&split_path(&absolute), slot, entry.is_directory());
                debug_assert!(inserted.is_ok(), "{}: {:?}", absolute, inserted);
            }
        }
        archive
    }

    /// Serializes the visible entries and this view's trailing comment.
    pub fn to_text(&self) -> String {
        crate::ser::serialize(
            &self.entries(),
            self.last_comment(),
            self.boundary_length,
        )
    }

    fn validate(&self, path: &str) -> Result<(), ArchiveError> {
        validate_path(path).map_err(|err| ArchiveError::InvalidPath(err, path.to_string()))
    }

    fn absolute(&self, path: &str) -> String {
        match &self.root {
            Some(root) => format!("{}{}", root, path),
            None => path.to_string(),
        }
    }

    /// Joins absolute `components` into a path relative to this view.
    fn relative(&self, components: &[&str]) -> String {
        let joined = components.join("/");
        match &self.root {
            Some(root) => joined
                .strip_prefix(root.as_str())
                .map(str::to_string)
                .unwrap_or(joined),
            None => joined,
        }
    }

    fn is_visible(&self, entry: &Entry) -> bool {
        match &self.root {
            Some(root) => {
                let path = entry.path().as_str();
                path.len() > root.len() && path.starts_with(root.as_str())
            }
            None => true,
        }
    }

    /// The slot of the actual entry at the view-relative `path`.
    fn resolve_slot(&self, storage: &Storage, path: &str) -> Option<Slot> {
        let absolute = self.absolute(path);
        match storage.tree.resolve(&split_path(&absolute))? {
            Node::Leaf(_) if path.ends_with(PATH_HRX_SEP) => None,
            Node::Leaf(slot) => Some(*slot),
            Node::Branch(branch) => branch.marker,
        }
    }
}

/// Splits an absolute path into components, ignoring a directory marker.
fn split_path(path: &str) -> Vec<&str> {
    path.strip_suffix(PATH_HRX_SEP)
        .unwrap_or(path)
        .split(PATH_HRX_SEP)
        .collect()
}

/// The slot at or beneath `node` that comes last in archive order.
fn last_slot(order: &OrderedIndex, node: &Node) -> Option<Slot> {
    node.slots()
        .into_iter()
        .reduce(|last, slot| if order.precedes(last, slot) { slot } else { last })
}

/// Links `entry` into the order sequence next to `anchor` (or at the end),
/// then records it in the tree. A tree failure unlinks it again, so the two
/// structures never disagree.
fn insert_entry(
    storage: &mut Storage,
    components: &[&str],
    entry: Entry,
    anchor: Option<Slot>,
    before: bool,
    display: &str,
) -> Result<(), ArchiveError> {
    let directory = entry.is_directory();
    let slot = match anchor {
        Some(anchor) if before => storage.order.insert_before(anchor, entry),
        Some(anchor) => storage.order.insert_after(anchor, entry),
        None => storage.order.push_back(entry),
    };

    if storage.tree.insert(components, slot, directory).is_err() {
        storage.order.remove(slot);
        return Err(ArchiveError::DefinedTwice(display.to_string()));
    }
    Ok(())
}
