//! Document model types for outline inference.
//!
//! This module defines the values that flow through the heading pipeline:
//! raw [`TextSpan`]s handed over by an extractor, the [`Line`]s built from
//! them, and the final [`Outline`] that leaves the library.

mod line;
mod outline;
mod span;

pub use line::Line;
pub(crate) use line::is_spaceless_script_char;
pub use outline::{HeadingLevel, Outline, OutlineEntry};
pub use span::{is_bold_font_name, BBox, PageSpans, SpanDocument, TextSpan};
