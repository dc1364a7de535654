use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn hrx() -> Command {
    Command::cargo_bin("hrx").unwrap()
}

fn populate(root: &std::path::Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("src/nested"))?;
    fs::create_dir_all(root.join("src/empty"))?;
    fs::write(root.join("src/a.txt"), "alpha\n")?;
    fs::write(root.join("src/nested/b.txt"), "beta\n")?;
    Ok(())
}

#[test]
fn test_cli_create_list_extract_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    populate(work.path())?;

    hrx()
        .current_dir(work.path())
        .args(["create", "out.hrx", "src"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(work.path().join("out.hrx"))?,
        "<===> src/a.txt\nalpha\n<===> src/empty/\n<===> src/nested/b.txt\nbeta\n"
    );

    hrx()
        .current_dir(work.path())
        .args(["list", "out.hrx"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("src/a.txt")
                .and(predicate::str::contains("src/empty/"))
                .and(predicate::str::contains("src/nested/b.txt")),
        );

    let extract_dir = tempdir()?;
    hrx()
        .arg("extract")
        .arg("-d")
        .arg(extract_dir.path())
        .arg(work.path().join("out.hrx"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(extract_dir.path().join("src/a.txt"))?,
        "alpha\n"
    );
    assert_eq!(
        fs::read_to_string(extract_dir.path().join("src/nested/b.txt"))?,
        "beta\n"
    );
    assert!(extract_dir.path().join("src/empty").is_dir());

    Ok(())
}

#[test]
fn test_cli_create_with_root() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    populate(work.path())?;

    hrx()
        .current_dir(work.path())
        .args(["create", "-R", "src", "out.hrx", "src"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(work.path().join("out.hrx"))?,
        "<===> a.txt\nalpha\n<===> empty/\n<===> nested/b.txt\nbeta\n"
    );
    Ok(())
}

#[test]
fn test_cli_create_refuses_existing_archive() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    populate(work.path())?;
    fs::write(work.path().join("out.hrx"), "precious")?;

    hrx()
        .current_dir(work.path())
        .args(["create", "out.hrx", "src"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(work.path().join("out.hrx"))?, "precious");

    hrx()
        .current_dir(work.path())
        .args(["create", "-f", "out.hrx", "src/a.txt"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(work.path().join("out.hrx"))?,
        "<===> src/a.txt\nalpha\n"
    );
    Ok(())
}

#[test]
fn test_cli_create_rejects_binary_files() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("blob"), [0xffu8, 0xfe, 0x00])?;

    hrx()
        .current_dir(work.path())
        .args(["create", "out.hrx", "blob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not UTF-8"));
    assert!(!work.path().join("out.hrx").exists());
    Ok(())
}

#[test]
fn test_cli_extract_strips_levels() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = work.path().join("in.hrx");
    fs::write(
        &archive,
        "<===> top\nskipped\n<===> pkg/\n<===> pkg/lib/x.txt\nx\n<===> pkg/y.txt\ny\n",
    )?;

    let out = work.path().join("out");
    hrx()
        .arg("extract")
        .arg("--level")
        .arg("1")
        .arg("-d")
        .arg(&out)
        .arg(&archive)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(out.join("lib/x.txt"))?, "x\n");
    assert_eq!(fs::read_to_string(out.join("y.txt"))?, "y\n");
    assert!(!out.join("top").exists());
    assert!(!out.join("pkg").exists());
    Ok(())
}

#[test]
fn test_cli_extract_refuses_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = work.path().join("in.hrx");
    fs::write(&archive, "<===> file\nnew\n")?;
    let out = work.path().join("out");
    fs::create_dir(&out)?;
    fs::write(out.join("file"), "old\n")?;

    hrx()
        .arg("extract")
        .arg("-d")
        .arg(&out)
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(out.join("file"))?, "old\n");

    hrx()
        .arg("extract")
        .arg("-f")
        .arg("-d")
        .arg(&out)
        .arg(&archive)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(out.join("file"))?, "new\n");
    Ok(())
}

#[test]
fn test_cli_invalid_archive() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = work.path().join("bad.hrx");
    fs::write(&archive, "not an archive\n")?;

    hrx()
        .arg("list")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open archive"));
    Ok(())
}
