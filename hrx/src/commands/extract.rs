use std::path::PathBuf;

use hrx_format::{Archive, Entry};

use crate::cli::ExtractArgs;
use crate::error::{Error, Result};

pub fn run(args: ExtractArgs, verbose: bool) -> Result<()> {
    let archive = Archive::load(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let output_path = args.directory.unwrap_or_else(|| PathBuf::from("."));

    for entry in archive.entries() {
        if entry.path().depth() <= args.level {
            tracing::debug!("skipping {}: shallower than --level", entry.path());
            continue;
        }

        let dest = entry
            .path()
            .iter()
            .skip(args.level)
            .fold(output_path.clone(), |path, name| path.join(name));

        if verbose {
            println!("{}", entry.path());
        }

        match entry {
            Entry::Directory(_) => {
                std::fs::create_dir_all(&dest).map_err(|source| Error::CreateDirectory {
                    path: dest.clone(),
                    source,
                })?;
            }
            Entry::File(file) => {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        Error::CreateDirectory {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }

                if dest.exists() && !args.force {
                    return Err(Error::FileExists { path: dest });
                }

                std::fs::write(&dest, file.content()).map_err(|source| Error::CreateFile {
                    path: dest.clone(),
                    source,
                })?;
            }
        }
    }

    Ok(())
}
