use anyhow::Result;
use insta::assert_snapshot;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;

use crate::{CONTROLLER, CliTest};

#[test]
fn test_find_records_new_strings() -> Result<()> {
    let test = CliTest::with_file("app/Http/Controllers/PostController.php", CONTROLLER)?;

    assert_cmd_snapshot!(test.find_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ application: scanned 1 file, found 2 strings, 2 new in lang/en.json

    ----- stderr -----
    ");

    assert_snapshot!(test.read_file("lang/en.json")?, @r#"
    {
        "Save": "Save",
        "Shared Message": "Shared Message"
    }
    "#);

    Ok(())
}

#[test]
fn test_find_keeps_existing_entries() -> Result<()> {
    let test = CliTest::with_file("app/Http/Controllers/PostController.php", CONTROLLER)?;
    test.write_file("lang/en.json", "{\n    \"Save\": \"Save changes\"\n}\n")?;

    let output = test.find_command().output()?;
    assert!(output.status.success());
    assert_eq!(
        test.read_file("lang/en.json")?,
        "{\n    \"Save\": \"Save changes\",\n    \"Shared Message\": \"Shared Message\"\n}\n"
    );

    // A second run has nothing new to record.
    let output = test.find_command().output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("found 2 strings, 0 new"), "{stdout}");

    Ok(())
}

#[test]
fn test_find_respects_ignore_strings() -> Result<()> {
    let test = CliTest::with_file("app/Http/Controllers/PostController.php", CONTROLLER)?;
    test.write_file(
        ".langsweeprc.json",
        r#"{ "finder": { "ignoreStrings": ["Save"] } }"#,
    )?;

    test.find_command().output()?;
    assert_eq!(
        test.read_file("lang/en.json")?,
        "{\n    \"Shared Message\": \"Shared Message\"\n}\n"
    );

    Ok(())
}

#[test]
fn test_find_in_modules() -> Result<()> {
    let test = CliTest::with_file("Modules/Blog/Http/PostController.php", CONTROLLER)?;
    test.write_file("Modules/Shop/Http/CartController.php", "<?php echo __('Cart');")?;

    assert_cmd_snapshot!(test.find_command().args(["--modules"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Blog: scanned 1 file, found 2 strings, 2 new in Modules/Blog/lang/en.json
    ✓ Shop: scanned 1 file, found 1 string, 1 new in Modules/Shop/lang/en.json

    ----- stderr -----
    Module Blog (Modules/Blog)
    Module Shop (Modules/Shop)
    ");

    assert!(!test.root().join("lang/en.json").exists());
    assert_eq!(
        test.read_file("Modules/Shop/lang/en.json")?,
        "{\n    \"Cart\": \"Cart\"\n}\n"
    );

    Ok(())
}

#[test]
fn test_find_unknown_module() -> Result<()> {
    let test = CliTest::with_file("Modules/Blog/Http/PostController.php", CONTROLLER)?;

    let output = test.find_command().args(["--modules", "Missing"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Module 'Missing' not found"), "{stderr}");

    Ok(())
}

#[test]
fn test_find_without_scan_roots() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.find_command().output()?;
    assert_eq!(output.status.code(), Some(2));

    Ok(())
}
