use hrx_format::{Archive, Entry};

use crate::cli::ListArgs;
use crate::error::{Error, Result};

pub fn run(args: ListArgs) -> Result<()> {
    let archive = Archive::load(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    println!("{:5}  {:>10}  Path", "Kind", "Length");
    println!("{}", "-".repeat(40));

    for entry in archive.entries() {
        match &entry {
            Entry::Directory(dir) => {
                println!("{:5}  {:>10}  {}", "dir", "-", dir.path());
            }
            Entry::File(file) => {
                println!("{:5}  {:>10}  {}", "file", file.content().len(), file.path());
            }
        }
    }

    Ok(())
}
