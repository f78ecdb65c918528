// Layout: glyph metrics, greedy wrapping, flow assembly and pagination.
// Pure CPU work on in-memory structures; the binary runs it inside tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;
pub mod page_config;
pub mod paginator;
pub mod wrap;

// Re-export the public API consumed by the pipeline and renderer.
pub use flow::{layout_document, FlowBlock, FlowItem, LaidOutDocument};
pub use font_metrics::FontFace;
pub use page_config::{default_page_config, PageConfig};
pub use paginator::{paginate, PlacedPage, Placement};
pub use wrap::{wrap, Alignment, LineRun, RunFragment, TypesetLine, Wrapper};
