use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cli_profile_html() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    let file = input.path().join("triangle.edges");
    fs::write(&file, "0 1\n1 2\n2 0\n")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("profile")
        .arg(&file)
        .arg("-o")
        .arg(output.path())
        .arg("--preset")
        .arg("minimal");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("3 nodes, 3 edges"))
        .stdout(predicate::str::contains("Report written"));

    let html = fs::read_to_string(output.path().join("graph.html"))?;
    assert!(html.contains("Centrality.Degree"));
    assert!(html.contains("Partition.ConnectedComponents"));
    Ok(())
}

#[test]
fn test_cli_profile_latex_bundle() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    let file = input.path().join("path.edges");
    fs::write(&file, "0 1\n1 2\n2 3\n")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("profile")
        .arg(&file)
        .arg("-o")
        .arg(output.path())
        .arg("--preset")
        .arg("minimal")
        .arg("--output-type")
        .arg("LaTeX")
        .arg("--filename")
        .arg("path");
    cmd.assert().success();

    assert!(output.path().join("path").join("path.tex").exists());
    assert!(output.path().join("path").join("assets").exists());
    Ok(())
}

#[test]
fn test_cli_rejects_unknown_preset() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let file = input.path().join("g.edges");
    fs::write(&file, "0 1\n")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("profile")
        .arg(&file)
        .arg("-o")
        .arg(input.path())
        .arg("--preset")
        .arg("everything");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"));
    Ok(())
}

#[test]
fn test_cli_rejects_unknown_output_type() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let file = input.path().join("g.edges");
    fs::write(&file, "0 1\n")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("profile")
        .arg(&file)
        .arg("-o")
        .arg(input.path())
        .arg("--output-type")
        .arg("PDF");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown output type"))
        .stderr(predicate::str::contains("HTML"));
    Ok(())
}

#[test]
fn test_cli_walk() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    fs::write(input.path().join("a.edges"), "0 1\n1 2\n")?;
    fs::write(input.path().join("b.edges"), "0 1\n0 2\n0 3\n")?;
    fs::write(input.path().join("notes.txt"), "not a graph")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("walk")
        .arg(input.path())
        .arg(output.path())
        .arg("--pattern")
        .arg("*.edges")
        .arg("--preset")
        .arg("minimal");
    cmd.assert().success().stdout(predicate::str::contains("Done"));

    assert!(output.path().join("a.html").exists());
    assert!(output.path().join("b.html").exists());
    assert!(!output.path().join("notes.html").exists());
    Ok(())
}

#[test]
fn test_cli_bad_color_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempfile::tempdir()?;
    let file = input.path().join("g.edges");
    fs::write(&file, "0 1\n")?;

    let mut cmd = Command::cargo_bin("graphprof")?;
    cmd.arg("profile")
        .arg(&file)
        .arg("-o")
        .arg(input.path())
        .arg("--color")
        .arg("2,0,0");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid color"));
    Ok(())
}
