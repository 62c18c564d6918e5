use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, closed_port, serve_once};

#[test]
fn test_headings_prints_paths() -> Result<()> {
    let test = CliTest::new()?;
    let port = serve_once(200, "text/markdown", "# Project\n## Tasks\ntext\n# Archive\n");

    let output = test.vault_command(port).args(["headings", "plan.md"]).output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "# Project\n## Project::Tasks\n# Archive\n\n\u{2713} 3 headings in plan.md\n"
    );

    Ok(())
}

#[test]
fn test_headings_none_found_is_failure() -> Result<()> {
    let test = CliTest::new()?;
    let port = serve_once(200, "text/markdown", "just text");

    let output = test.vault_command(port).args(["headings", "flat.md"]).output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "\u{2718} No headings found in flat.md.\n"
    );

    Ok(())
}

#[test]
fn test_headings_surfaces_api_error() -> Result<()> {
    let test = CliTest::new()?;
    let port = serve_once(
        404,
        "application/json",
        r#"{"errorCode": 40400, "message": "Not Found"}"#,
    );

    let output = test.vault_command(port).args(["headings", "missing.md"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Error 40400: Not Found"));
    assert!(stderr.contains("Check if the file 'missing.md' exists in your vault."));

    Ok(())
}

#[test]
fn test_headings_connection_refused() -> Result<()> {
    let test = CliTest::new()?;
    let port = closed_port();

    let output = test.vault_command(port).args(["headings", "plan.md"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Request failed: "));
    assert!(stderr.contains("Verify that Obsidian is running"));

    Ok(())
}

#[test]
fn test_config_file_selects_port() -> Result<()> {
    let test = CliTest::new()?;
    let port = serve_once(200, "text/markdown", "# Only");
    test.write_file(
        "obsidian-mcp.json",
        &format!(r#"{{ "apiKey": "file-key", "protocol": "http", "port": {} }}"#, port),
    )?;

    let output = test.command().args(["headings", "one.md"]).output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("# Only\n"));
    assert!(test.root().join("obsidian-mcp.json").exists());

    Ok(())
}
