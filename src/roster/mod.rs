//! Leaderboard roster extraction.
//!
//! Screenshot → grayscale → line-level text detection → cleanup → name set.
//! The detector is a black box behind [`LineDetector`]; the shipped one
//! shells out to the Tesseract CLI.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

use image::GrayImage;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::OcrConfig;
use crate::error::StatsError;

/// Leading leaderboard rank, e.g. the `12` in `12 ShadowFox99`.
const RANK_PREFIX: &str = r"^\s*\d+";

/// Cleaned lines this short are OCR noise.
const MIN_NAME_CHARS: usize = 3;

/// Turns an image into ordered raw text lines.
pub trait LineDetector: Send + Sync {
    /// Detector name for logging.
    fn name(&self) -> &'static str;

    fn detect_lines(&self, image: &GrayImage) -> Result<Vec<String>, StatsError>;
}

/// Tesseract CLI line detector.
pub struct TesseractDetector {
    executable: PathBuf,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractDetector {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            executable: config.tesseract_path.clone(),
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }
}

impl LineDetector for TesseractDetector {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn detect_lines(&self, image: &GrayImage) -> Result<Vec<String>, StatsError> {
        let input = NamedTempFile::with_suffix(".png")
            .map_err(|e| StatsError::Detection(format!("temp file: {}", e)))?;
        image
            .save(input.path())
            .map_err(|e| StatsError::Detection(format!("writing detector input: {}", e)))?;

        let output = Command::new(&self.executable)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| {
                StatsError::Detection(format!(
                    "could not run {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StatsError::Detection(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(split_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Non-blank stdout lines, in order.
fn split_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts candidate player names from leaderboard screenshots.
pub struct RosterExtractor {
    detector: Box<dyn LineDetector>,
    rank_prefix: Regex,
}

impl RosterExtractor {
    pub fn new(detector: Box<dyn LineDetector>) -> Self {
        Self {
            detector,
            rank_prefix: Regex::new(RANK_PREFIX).expect("rank prefix pattern is valid"),
        }
    }

    /// Decode `image`, detect its text lines and return the cleaned, deduplicated names.
    ///
    /// The result is unordered; leaderboard order is not preserved.
    pub fn extract_names(&self, image: &[u8]) -> Result<HashSet<String>, StatsError> {
        let decoded = image::load_from_memory(image)?;
        let gray = decoded.to_luma8();
        info!(
            "Detecting text in {}x{} image with {}",
            gray.width(),
            gray.height(),
            self.detector.name()
        );

        let lines = self.detector.detect_lines(&gray)?;
        debug!("Detector returned {} lines", lines.len());

        let names = self.names_from_lines(&lines);
        if names.is_empty() {
            return Err(StatsError::NoNamesFound);
        }

        info!("Extracted {} candidate names", names.len());
        Ok(names)
    }

    /// Clean raw lines into a name set.
    pub fn names_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> HashSet<String> {
        lines
            .iter()
            .filter_map(|line| self.clean_line(line.as_ref()))
            .collect()
    }

    /// Strip the rank prefix and whitespace; `None` for noise.
    pub fn clean_line(&self, line: &str) -> Option<String> {
        let name = self.rank_prefix.replace(line, "");
        let name = name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return None;
        }
        Some(name.to_string())
    }
}
