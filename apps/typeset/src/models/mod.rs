pub mod document;
pub mod page;

pub use document::{ContentBlock, Document, Section, StyledSpan, StyledText, DEFAULT_HEADER_NAME};
pub use page::{Page, PaintOp};
