use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_extract_writes_catalogue() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('welcome.title');\n")?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("translations/messages.en.xlf")?;
    assert!(catalogue.contains("resname=\"welcome.title\""));
    assert!(catalogue.contains("<source>welcome.title</source>"));
    assert!(catalogue.contains("<target state=\"new\">welcome.title</target>"));
    assert!(catalogue.contains("target-language=\"en\""));
    Ok(())
}

#[test]
fn test_extract_splits_domains_into_files() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        r#"
trans('nav.home', {}, 'navigation');
ctx.addViolation('error.invalid');
"#,
    )?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let navigation = test.read_file("translations/navigation.en.xlf")?;
    assert!(navigation.contains("resname=\"nav.home\""));

    let validators = test.read_file("translations/validators.en.xlf")?;
    assert!(validators.contains("resname=\"error.invalid\""));
    Ok(())
}

#[test]
fn test_extract_respects_config_file() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('a.b');\n")?;
    test.write_file(
        ".transcatrc.json",
        r#"{ "locale": "fr", "outputRoot": "./i18n" }"#,
    )?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("i18n/messages.fr.xlf")?;
    assert!(catalogue.contains("target-language=\"fr\""));
    Ok(())
}

#[test]
fn test_extract_locale_flag_overrides_config() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('a.b');\n")?;

    let output = test
        .extract_command()
        .args(["--locale", "de", "--no-date"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("translations/messages.de.xlf")?;
    assert!(catalogue.contains("target-language=\"de\""));
    Ok(())
}

#[test]
fn test_extract_annotated_literals() -> Result<()> {
    let test = CliTest::with_file(
        "src/labels.ts",
        r#"
/** @TransString("labels") @Desc("First name field") */
export const FIRST_NAME = 'form.label.firstname';
"#,
    )?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("translations/labels.en.xlf")?;
    assert!(catalogue.contains("resname=\"form.label.firstname\""));
    assert!(catalogue.contains("<source>First name field</source>"));
    Ok(())
}

#[test]
fn test_extract_is_deterministic() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/b.ts", "trans('from.b');\n")?;
    test.write_file("src/a.ts", "trans('from.a');\n")?;

    assert_eq!(
        test.extract_command().arg("--no-date").output()?.status.code(),
        Some(0)
    );
    let first = test.read_file("translations/messages.en.xlf")?;

    assert_eq!(
        test.extract_command().arg("--no-date").output()?.status.code(),
        Some(0)
    );
    let second = test.read_file("translations/messages.en.xlf")?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_extract_preserves_translator_attributes_on_rerun() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('a.b');\n")?;

    assert_eq!(
        test.extract_command().arg("--no-date").output()?.status.code(),
        Some(0)
    );

    // Simulate a translation tool adding its own attribute.
    let catalogue = test.read_file("translations/messages.en.xlf")?;
    let edited = catalogue.replace("resname=\"a.b\"", "resname=\"a.b\" translate=\"no\"");
    test.write_file("translations/messages.en.xlf", &edited)?;

    assert_eq!(
        test.extract_command().arg("--no-date").output()?.status.code(),
        Some(0)
    );
    let merged = test.read_file("translations/messages.en.xlf")?;
    assert!(merged.contains("translate=\"no\""));
    Ok(())
}

#[test]
fn test_dynamic_key_is_reported_and_skipped() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        "trans(dynamicKey);\ntrans('static.key');\n",
    )?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("string literal"));
    assert!(stderr.contains("@Ignore"));

    let catalogue = test.read_file("translations/messages.en.xlf")?;
    assert!(catalogue.contains("resname=\"static.key\""));
    Ok(())
}

#[test]
fn test_strict_mode_aborts_on_dynamic_key() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans(dynamicKey);\n")?;

    let output = test.extract_command().args(["--strict", "--no-date"]).output()?;
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("string literal"));
    Ok(())
}

#[test]
fn test_ignored_dynamic_key_is_silent() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        "/** @Ignore */\ntrans(dynamicKey);\n",
    )?;

    let output = test.extract_command().args(["--strict", "--no-date"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    Ok(())
}

#[test]
fn test_no_date_flag_omits_date_attribute() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "trans('a.b');\n")?;

    assert_eq!(
        test.extract_command().arg("--no-date").output()?.status.code(),
        Some(0)
    );
    let without_date = test.read_file("translations/messages.en.xlf")?;
    assert!(!without_date.contains("date="));

    assert_eq!(test.extract_command().output()?.status.code(), Some(0));
    let with_date = test.read_file("translations/messages.en.xlf")?;
    assert!(with_date.contains("date="));
    Ok(())
}

#[test]
fn test_domain_filter() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        r#"
trans('a.b');
trans('nav.home', {}, 'navigation');
"#,
    )?;

    let output = test
        .extract_command()
        .args(["--domain", "navigation", "--no-date"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    assert!(test.root().join("translations/navigation.en.xlf").exists());
    assert!(!test.root().join("translations/messages.en.xlf").exists());
    Ok(())
}

#[test]
fn test_no_messages_found() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "const x = 1;\n")?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No translatable messages found."));
    Ok(())
}

#[test]
fn test_test_files_are_skipped_by_default() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/app.ts", "trans('app.key');\n")?;
    test.write_file("src/app.test.ts", "trans('test.key');\n")?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("translations/messages.en.xlf")?;
    assert!(catalogue.contains("resname=\"app.key\""));
    assert!(!catalogue.contains("resname=\"test.key\""));
    Ok(())
}

#[test]
fn test_same_message_from_two_files_has_both_references() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/a.ts", "trans('shared.key');\n")?;
    test.write_file("src/b.ts", "trans('shared.key');\n")?;

    let output = test.extract_command().arg("--no-date").output()?;
    assert_eq!(output.status.code(), Some(0));

    let catalogue = test.read_file("translations/messages.en.xlf")?;
    assert_eq!(catalogue.matches("resname=\"shared.key\"").count(), 1);
    assert!(catalogue.contains("a.ts</tc:reference-file>"));
    assert!(catalogue.contains("b.ts</tc:reference-file>"));
    Ok(())
}
