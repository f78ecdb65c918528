// Markup front end: brace-aware scanning, style resolution, document parsing and
// block classification. Parsing never fails; recovered problems become degradations.

pub mod classifier;
pub mod parser;
pub mod scanner;
pub mod styles;

pub use parser::{parse, parse_with_report};
