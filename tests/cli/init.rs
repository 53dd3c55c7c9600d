use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .langsweeprc.json

    ----- stderr -----
    ");

    let content = test.read_file(".langsweeprc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    for field in ["fromLanguage", "toLanguages", "paths", "langDir", "finder", "ai"] {
        assert!(parsed.get(field).is_some(), "Config should have '{field}'");
    }

    Ok(())
}

#[test]
fn test_init_keeps_existing_config() -> Result<()> {
    let test = CliTest::with_file(".langsweeprc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    warning: .langsweeprc.json already exists

    ----- stderr -----
    ");
    assert_eq!(test.read_file(".langsweeprc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("app/Http/Controllers/PostController.php", crate::CONTROLLER)?;

    let output = test.find_command().output()?;
    assert!(
        output.status.success(),
        "find should work with the initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(test.root().join("lang/en.json").exists());

    Ok(())
}
