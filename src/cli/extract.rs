//! The `extract` command.
//!
//! Scans the configured source tree, runs both extractors over every file,
//! and writes one XLIFF catalogue per domain, merging translator-added
//! attributes from any catalogue already on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use colored::Colorize;

use super::args::ExtractCommand;
use super::exit_status::ExitStatus;
use crate::config::{Config, load_config};
use crate::dump::XliffDumper;
use crate::extract::{AnnotationExtractor, CallExtractor, ExtractionLogger, Extractor};
use crate::model::Catalogue;
use crate::parsers::js::parse_source;
use crate::scan::{ScanResult, scan_files};

/// Reports extraction-argument errors to stderr and counts them for the
/// exit status.
#[derive(Debug, Default, Clone)]
struct ConsoleLogger {
    errors: Rc<RefCell<usize>>,
}

impl ConsoleLogger {
    fn error_count(&self) -> usize {
        *self.errors.borrow()
    }
}

impl ExtractionLogger for ConsoleLogger {
    fn error(&self, message: &str) {
        *self.errors.borrow_mut() += 1;
        eprintln!("{} {}", "error:".bold().red(), message);
    }
}

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let args = cmd.args;
    let verbose = args.common.verbose;

    let mut config = load_config(Path::new("."))?.config;
    apply_overrides(&mut config, &args.common);

    let scan = scan_files(
        &config.source_root,
        &config.includes,
        &config.ignores,
        config.ignore_test_files,
        verbose,
    );

    let logger = ConsoleLogger::default();
    let call_extractor = if args.strict {
        CallExtractor::new()
    } else {
        CallExtractor::new().with_logger(Box::new(logger.clone()))
    };
    let annotation_extractor = AnnotationExtractor::new();

    let mut catalogue = Catalogue::new(config.locale.clone());
    let mut parse_error_count = 0;

    for file in &scan.files {
        tracing::debug!("extracting from {file}");
        let code = fs::read_to_string(file)
            .with_context(|| format!("Failed to read source file: {}", file))?;
        let roots = match parse_source(code, file) {
            Ok(roots) => roots,
            Err(err) => {
                if args.strict {
                    return Err(err);
                }
                parse_error_count += 1;
                eprintln!("{} {}", "warning:".bold().yellow(), err);
                continue;
            }
        };

        let path = Path::new(file);
        call_extractor
            .extract(path, &roots, &mut catalogue)
            .with_context(|| format!("Extraction failed in {}", file))?;
        annotation_extractor
            .extract(path, &roots, &mut catalogue)
            .with_context(|| format!("Extraction failed in {}", file))?;
    }

    let mut dumper = XliffDumper::new();
    dumper.set_source_language(config.source_language.clone());
    dumper.set_add_date(config.add_date && !args.no_date);
    dumper.set_add_reference(config.add_reference);
    dumper.set_add_reference_position(config.add_reference_position);

    let output_root = Path::new(&config.output_root);
    let mut written = Vec::new();
    for domain in catalogue.domains() {
        if !args.domain.is_empty() && !args.domain.iter().any(|d| d == domain.name()) {
            continue;
        }
        let path = catalogue_path(output_root, domain.name(), catalogue.locale());
        let document = dumper.dump(&catalogue, domain.name(), Some(&path))?;

        fs::create_dir_all(output_root)
            .with_context(|| format!("Failed to create output directory: {:?}", output_root))?;
        fs::write(&path, document)
            .with_context(|| format!("Failed to write catalogue: {:?}", path))?;
        written.push((domain.name().to_string(), domain.len()));
    }

    print_summary(&scan, &written, verbose);

    let error_count = logger.error_count() + parse_error_count;
    if error_count > 0 {
        eprintln!(
            "{} {} occurrence{} could not be extracted",
            "warning:".bold().yellow(),
            error_count,
            if error_count == 1 { "" } else { "s" }
        );
        return Ok(ExitStatus::Failure);
    }
    Ok(ExitStatus::Success)
}

fn apply_overrides(config: &mut Config, common: &super::args::CommonArgs) {
    if let Some(locale) = &common.locale {
        config.locale = locale.clone();
    }
    if let Some(source_root) = &common.source_root {
        config.source_root = source_root.display().to_string();
    }
    if let Some(output_root) = &common.output_root {
        config.output_root = output_root.display().to_string();
    }
}

fn catalogue_path(output_root: &Path, domain: &str, locale: &str) -> PathBuf {
    output_root.join(format!("{}.{}.xlf", domain, locale))
}

fn scan_summary(scanned: usize, skipped: usize) -> String {
    let mut line = format!("Scanned {} file{}", scanned, if scanned == 1 { "" } else { "s" });
    if skipped > 0 {
        line.push_str(&format!(
            ", skipped {} unreadable path{}",
            skipped,
            if skipped == 1 { "" } else { "s" }
        ));
    }
    line
}

fn print_summary(scan: &ScanResult, written: &[(String, usize)], verbose: bool) {
    if verbose {
        for file in &scan.files {
            println!("  scanned {}", file);
        }
    }
    println!(
        "{} {}",
        "✓".green(),
        scan_summary(scan.files.len(), scan.skipped_count)
    );
    for (domain, count) in written {
        println!(
            "{} Wrote {} ({} message{})",
            "✓".green(),
            domain.bold(),
            count,
            if *count == 1 { "" } else { "s" }
        );
    }
    if written.is_empty() {
        println!("No translatable messages found.");
    }
}
