// Rendering: placed pages -> paint operations -> PDF bytes.
// No measuring happens here; layout already fixed every position and width.

pub mod paint;
pub mod pdf;

pub use paint::{paint, paint_page};
pub use pdf::{encode_pdf, PdfInfo};
