use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_init_creates_config_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));

    let config = test.read_file(".transcatrc.json")?;
    assert!(config.contains("\"outputRoot\""));
    assert!(config.contains("\"locale\""));
    assert!(config.contains("\"addReferencePosition\""));
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::with_file(".transcatrc.json", "{ \"locale\": \"fr\" }")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"));
    assert_eq!(test.read_file(".transcatrc.json")?, "{ \"locale\": \"fr\" }");
    Ok(())
}

#[test]
fn test_extract_works_after_init() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('a.b');\n")?;

    assert_eq!(test.command().arg("init").output()?.status.code(), Some(0));
    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    assert!(test.root().join("translations/messages.en.xlf").exists());
    Ok(())
}
