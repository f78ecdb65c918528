//! Structural document model produced by the markup parser and block classifier.
//!
//! A `Document` is built once per render request and never mutated afterwards.
//! Every span owns its text, so no two blocks ever share span data.

use serde::{Deserialize, Serialize};

/// Header name used when the markup carries no `\LARGE \textbf{...}` construct.
pub const DEFAULT_HEADER_NAME: &str = "Resume";

// ────────────────────────────────────────────────────────────────────────────
// Document / Section
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub header_name: String,
    /// Contact lines from the centered header block, in source order.
    pub contact_lines: Vec<String>,
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            header_name: DEFAULT_HEADER_NAME.to_string(),
            contact_lines: Vec::new(),
            sections: Vec::new(),
        }
    }
}

/// A titled section. `title` is never empty: untitled sections are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

// ────────────────────────────────────────────────────────────────────────────
// Content blocks
// ────────────────────────────────────────────────────────────────────────────

/// One semantic unit of section content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    Paragraph(StyledText),
    List(Vec<StyledText>),
    JobEntry {
        title: String,
        /// Empty for the project form (`\textbf{..} \hfill ..` without a company line).
        company: String,
        dates: Option<String>,
        items: Vec<StyledText>,
    },
}

impl ContentBlock {
    /// Displayable text of the block with all styling removed, joined by single spaces.
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Paragraph(text) => text.plain_text(),
            ContentBlock::List(items) => join_plain(items),
            ContentBlock::JobEntry {
                title,
                company,
                dates,
                items,
            } => {
                let mut parts: Vec<String> = vec![title.clone()];
                if let Some(d) = dates {
                    parts.push(d.clone());
                }
                if !company.is_empty() {
                    parts.push(company.clone());
                }
                let body = join_plain(items);
                if !body.is_empty() {
                    parts.push(body);
                }
                parts.join(" ")
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Paragraph(_) => "paragraph",
            ContentBlock::List(_) => "list",
            ContentBlock::JobEntry { .. } => "job_entry",
        }
    }
}

fn join_plain(items: &[StyledText]) -> String {
    items
        .iter()
        .map(StyledText::plain_text)
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Styled text
// ────────────────────────────────────────────────────────────────────────────

/// A contiguous run of text sharing one bold/italic state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        StyledSpan {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        StyledSpan {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        StyledSpan {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }
}

/// Displayable text of a paragraph or item: spans cover the whole string with no gaps.
///
/// Adjacent spans never share a style; `push` merges them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    pub spans: Vec<StyledSpan>,
}

impl StyledText {
    pub fn new() -> Self {
        StyledText { spans: Vec::new() }
    }

    pub fn from_plain(text: impl Into<String>) -> Self {
        let mut styled = StyledText::new();
        styled.push(&text.into(), false, false);
        styled
    }

    /// Appends text in the given style, merging with the last span when styles match.
    pub fn push(&mut self, text: &str, bold: bool, italic: bool) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.bold == bold && last.italic == italic {
                last.text.push_str(text);
                return;
            }
        }
        self.spans.push(StyledSpan {
            text: text.to_string(),
            bold,
            italic,
        });
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}
