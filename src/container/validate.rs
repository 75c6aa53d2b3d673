//! Integrity checks for `.stereo` containers.
//!
//! 1. **Structure**: the path is a ZIP archive whose first entry is an
//!    uncompressed `mimetype` with the expected content
//! 2. **Layout**: the manifest parses, required entries exist, and every
//!    Parquet entry is Stored
//! 3. **Contents**: the container loads and the assembled dataset passes
//!    the structural check
//! 4. **Consistency**: manifest counts agree with the loaded data

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use zip::{CompressionMethod, ZipArchive};

#[cfg(feature = "colorized_output")]
use console::style;

use crate::dataset::StereoExpData;
use crate::diagnostics::NullSink;

use super::layout::Manifest;
use super::{dataset_path, descriptor_path, entries, read_container, STEREO_MIMETYPE};

/// Validation check result status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed with warnings
    Warning(String),
    /// Check failed
    Failed(String),
}

impl CheckStatus {
    fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok)
    }

    fn is_warning(&self) -> bool {
        matches!(self, CheckStatus::Warning(_))
    }

    fn is_failed(&self) -> bool {
        matches!(self, CheckStatus::Failed(_))
    }
}

/// Individual validation check result
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    /// Name of the check
    pub name: String,
    /// Result status of the check
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// Complete validation report for one container
#[derive(Debug)]
pub struct ValidationReport {
    /// Individual check results in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Path of the validated container
    pub file_path: String,
}

impl ValidationReport {
    /// Create an empty report for `file_path`.
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Append a check result.
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// True if any check failed.
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_failed())
    }

    /// True if any check produced a warning.
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_warning())
    }

    /// Number of passed checks.
    pub fn success_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_ok()).count()
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_warning()).count()
    }

    /// Number of failures.
    pub fn failure_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_failed()).count()
    }

    /// Render with terminal colors when the `colorized_output` feature is on.
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Stereo Container Validation").bold().cyan()));
            output.push_str(&format!("{}\n", style("===========================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.file_path));

            for check in &self.checks {
                match &check.status {
                    CheckStatus::Ok => {
                        output.push_str(&format!("[{}] {}\n", OK, style(&check.name).green()));
                    }
                    CheckStatus::Warning(msg) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        WARN,
                        style(&check.name).yellow(),
                        style("WARNING").yellow().bold(),
                        msg
                    )),
                    CheckStatus::Failed(msg) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        FAIL,
                        style(&check.name).red(),
                        style("FAILED").red().bold(),
                        msg
                    )),
                }
            }

            output.push_str(&format!(
                "\n{}: {} passed, {} warnings, {} failed\n\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.warning_count()).yellow(),
                style(self.failure_count()).red()
            ));
            if self.has_failures() {
                output.push_str(&format!("{}\n", style("Validation FAILED").red().bold()));
            } else if self.has_warnings() {
                output.push_str(&format!(
                    "{}\n",
                    style("Validation PASSED with warnings").yellow().bold()
                ));
            } else {
                output.push_str(&format!("{}\n", style("Validation PASSED").green().bold()));
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stereo Container Validation")?;
        writeln!(f, "===========================")?;
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f)?;

        for check in &self.checks {
            match &check.status {
                CheckStatus::Ok => writeln!(f, "[✓] {}", check.name)?,
                CheckStatus::Warning(msg) => writeln!(f, "[⚠] {} - WARNING: {}", check.name, msg)?,
                CheckStatus::Failed(msg) => writeln!(f, "[✗] {} - FAILED: {}", check.name, msg)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )?;
        writeln!(f)?;
        if self.has_failures() {
            writeln!(f, "Validation FAILED")
        } else if self.has_warnings() {
            writeln!(f, "Validation PASSED with warnings")
        } else {
            writeln!(f, "Validation PASSED")
        }
    }
}

/// Validate a container and report every check.
///
/// Returns `Err` only when the path cannot be inspected at all (missing or
/// not a ZIP archive). Every other problem is recorded as a failed check.
pub fn validate_container(path: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::new(path.display().to_string());

    if !path.is_file() {
        report.add_check(ValidationCheck::failed(
            "Path exists",
            format!("not a file: {}", path.display()),
        ));
        anyhow::bail!("container does not exist: {}", path.display());
    }
    report.add_check(ValidationCheck::ok("Path exists"));

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("{} is not a ZIP archive", path.display()))?;
    report.add_check(ValidationCheck::ok("ZIP archive"));

    let manifest = check_layout(&mut archive, &mut report)?;
    check_contents(path, manifest.as_ref(), &mut report);

    Ok(report)
}

fn check_layout<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    report: &mut ValidationReport,
) -> Result<Option<Manifest>> {
    if archive.len() == 0 {
        report.add_check(ValidationCheck::failed("ZIP structure", "empty archive"));
        return Ok(None);
    }

    {
        let first = archive.by_index(0)?;
        if first.name() == entries::MIMETYPE {
            report.add_check(ValidationCheck::ok("mimetype is first entry"));
        } else {
            report.add_check(ValidationCheck::failed(
                "mimetype is first entry",
                format!("first entry is `{}`", first.name()),
            ));
        }
    }

    match archive.by_name(entries::MIMETYPE) {
        Ok(mut entry) => {
            if entry.compression() == CompressionMethod::Stored {
                report.add_check(ValidationCheck::ok("mimetype is uncompressed"));
            } else {
                report.add_check(ValidationCheck::failed(
                    "mimetype is uncompressed",
                    "mimetype must be Stored",
                ));
            }
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            if content == STEREO_MIMETYPE {
                report.add_check(ValidationCheck::ok(format!("mimetype = {STEREO_MIMETYPE}")));
            } else {
                report.add_check(ValidationCheck::failed(
                    "mimetype content",
                    format!("expected `{STEREO_MIMETYPE}`, found `{content}`"),
                ));
            }
        }
        Err(_) => report.add_check(ValidationCheck::failed("mimetype entry", "missing")),
    }

    let manifest = match archive.by_name(entries::MANIFEST) {
        Ok(mut entry) => {
            if entry.compression() != CompressionMethod::Deflated {
                report.add_check(ValidationCheck::warning(
                    "manifest.json compression",
                    "manifest.json should be Deflated",
                ));
            }
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            match serde_json::from_str::<Manifest>(&content) {
                Ok(manifest) => {
                    report.add_check(ValidationCheck::ok("manifest.json parses"));
                    Some(manifest)
                }
                Err(e) => {
                    report.add_check(ValidationCheck::failed("manifest.json parses", e.to_string()));
                    None
                }
            }
        }
        Err(_) => {
            report.add_check(ValidationCheck::warning(
                "manifest.json exists",
                "container has no manifest",
            ));
            None
        }
    };

    let required = [
        descriptor_path(entries::CELLS),
        descriptor_path(entries::GENES),
        dataset_path(entries::POSITION),
    ];
    for name in &required {
        if archive.index_for_name(name).is_some() {
            report.add_check(ValidationCheck::ok(format!("{name} exists")));
        } else {
            report.add_check(ValidationCheck::failed(format!("{name} exists"), "missing"));
        }
    }
    let has_matrix = archive
        .index_for_name(&dataset_path(entries::EXP_MATRIX))
        .is_some()
        || archive
            .index_for_name(&descriptor_path(entries::EXP_MATRIX))
            .is_some();
    if has_matrix {
        report.add_check(ValidationCheck::ok("exp_matrix exists"));
    } else {
        report.add_check(ValidationCheck::failed("exp_matrix exists", "missing"));
    }

    let mut compressed = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.name().ends_with(".parquet") && entry.compression() != CompressionMethod::Stored {
            compressed.push(entry.name().to_string());
        }
    }
    if compressed.is_empty() {
        report.add_check(ValidationCheck::ok("Parquet entries are Stored"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Parquet entries are Stored",
            format!("compressed entries: {}", compressed.join(", ")),
        ));
    }

    Ok(manifest)
}

fn check_contents(path: &Path, manifest: Option<&Manifest>, report: &mut ValidationReport) {
    let parts = match read_container(path, &NullSink) {
        Ok(parts) => parts,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Contents load", e.to_string()));
            return;
        }
    };
    report.add_check(ValidationCheck::ok("Contents load"));

    let data = match StereoExpData::from_parts(parts) {
        Ok(data) => data,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Dataset structure", e.to_string()));
            return;
        }
    };
    report.add_check(ValidationCheck::ok(format!(
        "Dataset structure ({} cells x {} genes)",
        data.n_cells(),
        data.n_genes()
    )));

    let Some(manifest) = manifest else {
        return;
    };
    let expected = (manifest.n_cells, manifest.n_genes, manifest.nnz);
    let found = (
        data.n_cells() as u64,
        data.n_genes() as u64,
        data.matrix().nnz() as u64,
    );
    if expected == found {
        report.add_check(ValidationCheck::ok("Manifest counts match"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Manifest counts match",
            format!("manifest says {expected:?} (cells, genes, nnz), data has {found:?}"),
        ));
    }
    if manifest.matrix_format != data.matrix().format().encoding() {
        report.add_check(ValidationCheck::warning(
            "Manifest matrix format",
            format!(
                "manifest says `{}`, data is `{}`",
                manifest.matrix_format,
                data.matrix().format().encoding()
            ),
        ));
    }
}
