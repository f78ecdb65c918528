//! Document pipeline: markup -> Document -> flow blocks -> placed pages -> paint ops -> PDF.
//!
//! Synchronous and self-contained; each stage consumes the previous stage's output whole.
//! Only PDF serialization can fail. Everything else degrades and is reported in
//! `LayoutMetadata::degradations`.

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{Degradation, RenderError};
use crate::layout::{layout_document, paginate, PageConfig};
use crate::markup::parse_with_report;
use crate::models::Document;
use crate::render::{encode_pdf, paint, PdfInfo};

pub struct RenderOutput {
    pub pdf: Bytes,
    pub metadata: LayoutMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutMetadata {
    pub render_id: Uuid,
    pub header_name: String,
    pub section_titles: Vec<String>,
    pub page_count: usize,
    pub pages: Vec<PageSummary>,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub index: usize,
    pub line_count: usize,
    pub paint_op_count: usize,
    pub cursor_y: f32,
}

/// Renders resume markup into PDF bytes plus layout metadata.
///
/// Never fails on markup content: unstructured or empty input yields a one-page document
/// headed "Resume". Fails only on invalid page geometry or when the PDF cannot be written.
pub fn render_markup(markup: &str, config: &PageConfig) -> Result<RenderOutput, RenderError> {
    config.validate()?;
    let render_id = Uuid::new_v4();
    info!(%render_id, bytes = markup.len(), "Rendering markup");

    // Step 1: Parse and classify
    let (document, degradations) = parse_with_report(markup);
    render_document(&document, degradations, config, render_id)
}

fn render_document(
    document: &Document,
    mut degradations: Vec<Degradation>,
    config: &PageConfig,
    render_id: Uuid,
) -> Result<RenderOutput, RenderError> {
    // Step 2: Wrap into flow blocks
    let laid = layout_document(document, config);
    degradations.extend(laid.degradations);
    debug!(blocks = laid.blocks.len(), "Layout complete");

    // Step 3: Paginate
    let placed = paginate(laid.blocks, config);
    debug!(pages = placed.len(), "Pagination complete");

    // Step 4: Paint
    let pages = paint(&placed, config);

    // Step 5: Encode
    let info = PdfInfo {
        title: document.header_name.clone(),
        render_id,
        created_at: Utc::now(),
    };
    let pdf = encode_pdf(&pages, &info, config.compress)?;

    for degradation in &degradations {
        warn!(%render_id, ?degradation, "Recovered from markup problem");
    }

    let summaries: Vec<PageSummary> = placed
        .iter()
        .zip(&pages)
        .enumerate()
        .map(|(index, (placed, page))| PageSummary {
            index,
            line_count: placed.line_count(),
            paint_op_count: page.paint_ops().len(),
            cursor_y: page.cursor_y,
        })
        .collect();

    info!(
        %render_id,
        pages = pages.len(),
        bytes = pdf.len(),
        degradations = degradations.len(),
        "Render complete"
    );

    Ok(RenderOutput {
        pdf: Bytes::from(pdf),
        metadata: LayoutMetadata {
            render_id,
            header_name: document.header_name.clone(),
            section_titles: document.sections.iter().map(|s| s.title.clone()).collect(),
            page_count: pages.len(),
            pages: summaries,
            degradations,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_page_config;
    use crate::render::pdf::to_win_ansi;
    use lopdf::content::Content;
    use lopdf::Document as PdfDocument;

    const JANE: &str = r"\begin{center}
    {\LARGE \textbf{Jane Roe}}\\
    jane@example.com | 555-0100
\end{center}

\section{Experience}
\textbf{Engineer} \hfill 2020--2022 \\
\textit{Acme Corp}
\begin{itemize}
    \item Built things.
\end{itemize}
";

    /// Every `Tj` string on every page, in order.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
        let doc = PdfDocument::load_mem(pdf).expect("load");
        doc.get_pages()
            .values()
            .flat_map(|page_id| {
                let content = doc.get_page_content(*page_id).expect("content");
                Content::decode(&content).expect("decode").operations
            })
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()).map(<[u8]>::to_vec))
            .collect()
    }

    fn long_markup(sections: usize, items: usize) -> String {
        let mut markup =
            String::from("\\begin{center}{\\LARGE \\textbf{Long Resume}}\\end{center}\n");
        for s in 0..sections {
            markup.push_str(&format!("\\section{{Section {s}}}\n\\begin{{itemize}}\n"));
            for i in 0..items {
                markup.push_str(&format!(
                    "\\item Delivered \\textbf{{project {s}.{i}}} on time with measurable impact\n"
                ));
            }
            markup.push_str("\\end{itemize}\n");
        }
        markup
    }

    #[test]
    fn test_jane_roe_renders_one_page() {
        let output = render_markup(JANE, &default_page_config()).unwrap();
        assert_eq!(output.metadata.page_count, 1);
        assert_eq!(output.metadata.header_name, "Jane Roe");
        assert_eq!(output.metadata.section_titles, vec!["Experience"]);
        assert!(output.metadata.degradations.is_empty());

        let shown = shown_strings(&output.pdf);
        for expected in [
            "Jane Roe",
            "jane@example.com \u{2022} 555-0100",
            "Engineer",
            "2020--2022",
            "Acme Corp",
            "Built things.",
        ] {
            assert!(shown.contains(&to_win_ansi(expected)), "missing {expected:?}");
        }
    }

    #[test]
    fn test_empty_markup_is_a_degenerate_single_page() {
        let output = render_markup("", &default_page_config()).unwrap();
        assert_eq!(output.metadata.page_count, 1);
        assert_eq!(output.metadata.header_name, "Resume");
        assert!(output.metadata.section_titles.is_empty());
        assert!(output.metadata.degradations.contains(&Degradation::MissingHeader));
        assert!(output.metadata.degradations.contains(&Degradation::NoSections));
        assert_eq!(shown_strings(&output.pdf), vec![b"Resume".to_vec()]);
    }

    #[test]
    fn test_long_document_spans_pages_without_losing_items() {
        let output = render_markup(&long_markup(5, 30), &default_page_config()).unwrap();
        let meta = &output.metadata;
        assert!(meta.page_count > 1);
        assert_eq!(meta.pages.len(), meta.page_count);

        let doc = PdfDocument::load_mem(&output.pdf).unwrap();
        assert_eq!(doc.get_pages().len(), meta.page_count);

        let shown = shown_strings(&output.pdf);
        for s in 0..5 {
            for i in 0..30 {
                let label = to_win_ansi(&format!("project {s}.{i}"));
                let count = shown.iter().filter(|t| **t == label).count();
                assert_eq!(count, 1, "project {s}.{i} shown {count} times");
            }
        }
        for page in &meta.pages {
            assert!(page.cursor_y >= 50.0);
            assert!(page.line_count > 0);
        }
    }

    #[test]
    fn test_metadata_serializes_to_json() {
        let output = render_markup("no structure", &default_page_config()).unwrap();
        let json = serde_json::to_value(&output.metadata).unwrap();
        assert_eq!(json["header_name"], "Resume");
        assert_eq!(json["page_count"], 1);
        assert_eq!(json["degradations"][0]["kind"], "missing_header");
        assert!(json["render_id"].is_string());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let config = PageConfig {
            page_width: 0.0,
            ..default_page_config()
        };
        assert!(matches!(
            render_markup(JANE, &config),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_uncompressed_output_is_readable() {
        let config = PageConfig {
            compress: false,
            ..default_page_config()
        };
        let output = render_markup(JANE, &config).unwrap();
        assert!(String::from_utf8_lossy(&output.pdf).contains("(Engineer) Tj"));
    }

    #[test]
    fn test_unmeasurable_glyph_is_reported_not_fatal() {
        let output =
            render_markup(r"\section{Caf\'e} Zürich office", &default_page_config()).unwrap();
        assert!(output
            .metadata
            .degradations
            .contains(&Degradation::UnmeasurableGlyph { ch: 'ü' }));
        assert_eq!(output.metadata.page_count, 1);
    }
}
