use std::path::{Component, Path, PathBuf};

use hrx_format::{Archive, DirectoryEntry, Entry, FileEntry, Position};

use crate::cli::CreateArgs;
use crate::error::{Error, Result};

pub fn run(args: CreateArgs, verbose: bool) -> Result<()> {
    let archive_path = &args.archive;

    if args.paths.is_empty() {
        return Err(Error::NoFilesSpecified);
    }

    if archive_path.exists() && !args.force {
        return Err(Error::ArchiveExists {
            path: archive_path.clone(),
        });
    }

    // Only an archive that already exists can turn up during the walk.
    let archive_canonical = std::fs::canonicalize(archive_path).ok();
    let mut archive = Archive::new();

    for path in &args.paths {
        for dir_entry in jwalk::WalkDir::new(path).sort(true).skip_hidden(false) {
            let dir_entry = dir_entry.map_err(|e| Error::ProcessDirEntry {
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?;
            let fs_path = dir_entry.path();
            let file_type = dir_entry.file_type();

            if archive_canonical.is_some()
                && std::fs::canonicalize(&fs_path).ok() == archive_canonical
            {
                return Err(Error::RecursiveArchive {
                    path: archive_path.clone(),
                });
            }

            let hrx_path = match archive_path_for(&fs_path, args.root.as_deref())? {
                Some(v) => v,
                None => continue,
            };

            let entry: Entry = if file_type.is_dir() {
                if !is_empty_dir(&fs_path)? {
                    // Non-empty directories are implied by their contents.
                    continue;
                }
                DirectoryEntry::new(&hrx_path)
                    .map_err(|source| Error::InvalidPath {
                        path: fs_path.clone(),
                        source,
                    })?
                    .into()
            } else if file_type.is_file() {
                FileEntry::new(&hrx_path, read_text(&fs_path)?)
                    .map_err(|source| Error::InvalidPath {
                        path: fs_path.clone(),
                        source,
                    })?
                    .into()
            } else {
                tracing::warn!("skipping {}: not a regular file", fs_path.display());
                continue;
            };

            if verbose {
                println!("{}", entry.path());
            }

            archive
                .add(entry, Position::End)
                .map_err(|source| Error::AddEntry {
                    path: hrx_path,
                    source,
                })?;
        }
    }

    tracing::debug!("writing {} entries", archive.entries().len());
    archive
        .save(archive_path)
        .map_err(|source| Error::WriteArchive {
            path: archive_path.clone(),
            source,
        })
}

/// Converts a filesystem path into the `/`-separated path stored in the
/// archive, relative to `root` if given. Returns `None` for the root itself.
fn archive_path_for(path: &Path, root: Option<&Path>) -> Result<Option<String>> {
    let relative = match root {
        Some(root) => path
            .strip_prefix(root)
            .map_err(|_| Error::UnrepresentablePath {
                path: path.to_path_buf(),
            })?,
        None => path,
    };

    let mut parts = vec![];
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(name) => match name.to_str() {
                Some(name) => parts.push(name),
                None => {
                    return Err(Error::UnrepresentablePath {
                        path: path.to_path_buf(),
                    })
                }
            },
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnrepresentablePath {
                    path: path.to_path_buf(),
                })
            }
        }
    }

    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.join("/")))
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_none())
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| Error::NotUtf8 {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_paths() {
        assert_eq!(
            archive_path_for(Path::new("./src/lib.rs"), None).unwrap(),
            Some("src/lib.rs".into())
        );
        assert_eq!(
            archive_path_for(Path::new("src/lib.rs"), Some(Path::new("src"))).unwrap(),
            Some("lib.rs".into())
        );
        assert_eq!(archive_path_for(Path::new("src"), Some(Path::new("src"))).unwrap(), None);
        assert!(archive_path_for(Path::new("../up"), None).is_err());
        assert!(archive_path_for(Path::new("other"), Some(Path::new("src"))).is_err());
    }
}
