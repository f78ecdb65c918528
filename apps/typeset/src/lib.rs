//! Typesetting pipeline for constrained LaTeX resume markup.
//!
//! `render_markup` runs the whole pipeline: parse the markup into a `Document`, classify
//! section bodies into blocks, wrap them against Helvetica metrics, paginate onto A4 pages
//! and encode the painted pages as PDF.

pub mod errors;
pub mod layout;
pub mod markup;
pub mod models;
pub mod pipeline;
pub mod render;

pub use errors::{Degradation, RenderError};
pub use layout::{default_page_config, PageConfig};
pub use markup::{parse, parse_with_report};
pub use models::Document;
pub use pipeline::{render_markup, LayoutMetadata, PageSummary, RenderOutput};
