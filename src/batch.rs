//! Directory batch processing.
//!
//! Outlines every PDF in a directory and writes one `<stem>.json` per
//! document. Documents are independent: one failure is recorded and the
//! rest carry on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::layout::{OutlineConfig, OutlinePipeline};
use crate::parser::{self, ParseOptions};
use crate::render::{self, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Pipeline thresholds
    pub config: OutlineConfig,
    /// Extraction options applied to every document
    pub parse_options: ParseOptions,
    /// JSON layout of the output files
    pub format: JsonFormat,
    /// Process documents in parallel
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            config: OutlineConfig::default(),
            parse_options: ParseOptions::default(),
            format: JsonFormat::Pretty,
            parallel: true,
        }
    }
}

impl BatchOptions {
    /// Create batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set the JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Process one document at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// JSON files written, in input order
    pub succeeded: Vec<PathBuf>,
    /// Inputs that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of documents processed.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Check if every document succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the PDF files directly inside `dir`, sorted by path.
pub fn discover_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Path of the JSON file written for `input`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Outline every PDF in `input_dir`, writing results to `output_dir`.
pub fn process_directory<P, Q>(input_dir: P, output_dir: Q, options: &BatchOptions) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let inputs = discover_pdfs(input_dir)?;
    process_files(&inputs, output_dir.as_ref(), options, |_, _| {})
}

/// Outline the given files, calling `progress` as each one finishes.
///
/// Fails only for problems that affect the whole run: an invalid
/// configuration or an output directory that cannot be created.
pub fn process_files<F>(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &BatchOptions,
    progress: F,
) -> Result<BatchReport>
where
    F: Fn(&Path, &Result<PathBuf>) + Sync,
{
    let pipeline = OutlinePipeline::with_config(options.config.clone())?;
    fs::create_dir_all(output_dir)?;

    let run = |input: &PathBuf| {
        let result = process_one(input, output_dir, &pipeline, options);
        progress(input, &result);
        (input.clone(), result)
    };

    let results: Vec<(PathBuf, Result<PathBuf>)> = if options.parallel {
        inputs.par_iter().map(run).collect()
    } else {
        inputs.iter().map(run).collect()
    };

    let mut report = BatchReport::default();
    for (input, result) in results {
        match result {
            Ok(output) => report.succeeded.push(output),
            Err(e) => {
                log::warn!("Failed to outline {}: {}", input.display(), e);
                report.failed.push((input, e.to_string()));
            }
        }
    }

    log::info!(
        "batch: {} succeeded, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );

    Ok(report)
}

fn process_one(
    input: &Path,
    output_dir: &Path,
    pipeline: &OutlinePipeline,
    options: &BatchOptions,
) -> Result<PathBuf> {
    let doc = parser::extract_file(input, options.parse_options.clone())?;
    let outline = pipeline.run(&doc);
    let json = render::to_json(&outline, options.format)?;

    let output = output_path_for(input, output_dir);
    fs::write(&output, json).map_err(|e| {
        Error::Other(format!("cannot write {}: {}", output.display(), e))
    })?;

    log::debug!(
        "{} -> {} ({} headings)",
        input.display(),
        output.display(),
        outline.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let out = output_path_for(Path::new("/in/Report 2024.PDF"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/Report 2024.json"));
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new()
            .with_format(JsonFormat::Compact)
            .with_parse_options(ParseOptions::new().lenient())
            .sequential();
        assert_eq!(options.format, JsonFormat::Compact);
        assert!(!options.parallel);
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            succeeded: vec![PathBuf::from("a.json")],
            failed: vec![(PathBuf::from("b.pdf"), "boom".to_string())],
        };
        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        assert!(BatchReport::default().is_success());
    }
}
