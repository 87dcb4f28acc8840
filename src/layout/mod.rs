//! Heading inference.
//!
//! Turns per-page text spans into an [`Outline`] in six stages:
//!
//! 1. [`LineAggregator`] groups spans into visual lines
//! 2. [`DocumentProfiler`] finds the body size, running headers/footers and ToC pages
//! 3. [`CoverPageExtractor`] rebuilds the title from page 1
//! 4. [`HeadingClassifier`] accepts heading lines from pages 2..N
//! 5. [`HierarchyAssigner`] ranks heading sizes into H1..H4
//! 6. [`OutlineBuilder`] sorts, filters and assembles the result
//!
//! Every stage is a pure function of its inputs; the pipeline never fails.

mod builder;
mod classify;
mod config;
mod cover;
mod hierarchy;
mod lines;
mod profile;
mod signature;

pub use builder::OutlineBuilder;
pub use classify::{HeadingCandidate, HeadingClassifier, LineFeatures};
pub use config::{
    BuilderConfig, ClassifierConfig, HierarchyConfig, LevelOverflow, LineConfig, OutlineConfig,
    ProfileConfig, TitleConfig,
};
pub use cover::{CoverIgnoreSet, CoverPageExtractor, TitleResult};
pub use hierarchy::{HierarchyAssigner, LeveledHeading};
pub use lines::{DocumentLines, LineAggregator, PageLines};
pub use profile::{DocumentProfile, DocumentProfiler, NoiseSet, TocDetector};
pub use signature::{normalize_text, Signature};

use crate::error::Result;
use crate::model::{Outline, SpanDocument};

/// Quantize a font size to 0.1pt.
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Font size for a quantized key.
pub(crate) fn size_from_key(key: i32) -> f32 {
    key as f32 / 10.0
}

/// The complete heading-inference pipeline.
#[derive(Debug, Clone, Default)]
pub struct OutlinePipeline {
    config: OutlineConfig,
}

impl OutlinePipeline {
    /// Create a pipeline with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom thresholds.
    pub fn with_config(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Infer the outline of a document.
    pub fn run(&self, doc: &SpanDocument) -> Outline {
        let config = &self.config;

        let lines = LineAggregator::new(&config.lines).aggregate(doc);
        log::debug!(
            "lines: {} lines on {} pages",
            lines.line_count(),
            lines.page_count()
        );
        if lines.is_empty() {
            return Outline::new();
        }

        let profile = DocumentProfiler::new(&config.profile).profile(&lines);
        let (title, ignore) = CoverPageExtractor::new(&config.title).extract(&lines, &profile);
        let candidates = HeadingClassifier::new(&config.classifier).classify(&lines, &profile, &ignore);
        let headings = HierarchyAssigner::new(&config.hierarchy).assign(&candidates);

        OutlineBuilder::new(&config.builder).build(title, headings)
    }
}
