use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn section(title: &str, body_chars: usize) -> String {
    format!("## {title}\n{}\n", "a".repeat(body_chars))
}

#[test]
fn splits_file_next_to_input() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("channel.md");
    let document = [section("One", 300), section("Two", 300), section("Three", 300)].concat();
    fs::write(&input, &document)?;

    let first = temp.path().join("channel_part1.md");
    let third = temp.path().join("channel_part3.md");
    Command::cargo_bin("split-file")?
        .arg(&input)
        .args(["--max-chars", "400"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "Splitting file: {}\n",
            input.display()
        )))
        .stdout(predicate::str::contains(first.display().to_string()))
        .stdout(predicate::str::contains(third.display().to_string()));

    let rebuilt: String = (1..=3)
        .map(|n| fs::read_to_string(temp.path().join(format!("channel_part{n}.md"))))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(rebuilt, document);
    assert!(!temp.path().join("channel_part4.md").exists());
    Ok(())
}

#[test]
fn writes_into_output_dir() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("notes.txt");
    fs::write(&input, "short text")?;
    let out = temp.path().join("parts");
    fs::create_dir(&out)?;

    Command::cargo_bin("split-file")?
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(out.join("notes_part1.txt"))?, "short text");
    Ok(())
}

#[test]
fn non_positive_limit_is_reported() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("doc.md");
    fs::write(&input, "## A\nbody\n")?;

    Command::cargo_bin("split-file")?
        .arg(&input)
        .args(["--max-size-mb", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error splitting file: "));

    assert!(!temp.path().join("doc_part1.md").exists());
    Ok(())
}

#[test]
fn missing_input_is_reported() -> Result<()> {
    let temp = tempdir()?;

    Command::cargo_bin("split-file")?
        .arg(temp.path().join("absent.md"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error splitting file:"))
        .stderr(predicate::str::contains("absent.md"));
    Ok(())
}
