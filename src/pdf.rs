use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::app_config::PdfConfig;

// @module: Pdf output through an external docx converter

/// Result of one pdf conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfOutcome {
    /// The pdf was written
    Converted(PathBuf),
    /// Conversion failed; the temporary docx was kept at this path
    KeptDocx(PathBuf),
}

impl PdfOutcome {
    /// File that holds the result of the conversion
    pub fn path(&self) -> &Path {
        match self {
            Self::Converted(path) | Self::KeptDocx(path) => path,
        }
    }
}

// @struct: Runs the configured converter command
#[derive(Debug, Clone)]
pub struct PdfConverter {
    config: PdfConfig,
    keep_temp_files: bool,
}

impl PdfConverter {
    pub fn new(config: PdfConfig, keep_temp_files: bool) -> Self {
        Self { config, keep_temp_files }
    }

    // @returns: Whether the default converter can run here (it drives MS Word)
    pub fn platform_supported() -> bool {
        let supported = cfg!(any(target_os = "windows", target_os = "macos"));
        debug!(
            "Operating system = {}, can_convert_to_pdf = {}",
            std::env::consts::OS,
            supported
        );
        supported
    }

    /// Convert `docx` into `pdf`.
    ///
    /// On success the temporary docx is removed unless temp files are kept;
    /// on failure it is left in place and its path returned.
    pub fn convert(&self, docx: &Path, pdf: &Path) -> PdfOutcome {
        debug!("Docx file = {:?}, starting pdf conversion now", docx);

        let output = Command::new(&self.config.converter_command)
            .args(&self.config.converter_args)
            .arg(docx)
            .arg(pdf)
            .output();

        let failure = match output {
            Ok(output) if output.status.success() && pdf.exists() => None,
            Ok(output) => Some(format!(
                "{} exited with {}: {}",
                self.config.converter_command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            Err(e) => Some(format!("failed to run {}: {}", self.config.converter_command, e)),
        };

        if let Some(reason) = failure {
            warn!(
                "A temporary docx file was created in the output folder but cannot be converted to pdf yet ({}). \
                 It is at {:?}",
                reason, docx
            );
            return PdfOutcome::KeptDocx(docx.to_path_buf());
        }

        if !self.keep_temp_files {
            if let Err(e) = fs::remove_file(docx) {
                warn!("Could not remove temporary docx {:?}: {}", docx, e);
            }
        }
        PdfOutcome::Converted(pdf.to_path_buf())
    }
}
