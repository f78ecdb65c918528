//! Translates placed pages into paint operations.
//!
//! Pure translation: every width used here was measured during layout. Runs are placed
//! left at `margin + indent`, centered at `margin + (column - width) / 2`, or right at
//! `margin + column - width`; each fragment then sits at its own offset inside the run.

use crate::layout::font_metrics::FontFace;
use crate::layout::page_config::PageConfig;
use crate::layout::paginator::{PlacedPage, Placement};
use crate::layout::wrap::{Alignment, LineRun};
use crate::models::{Page, PaintOp};

/// Glyph drawn in front of the first line of a list item.
pub const BULLET: &str = "\u{2022}";

/// Paints every placed page, in order.
pub fn paint(pages: &[PlacedPage], config: &PageConfig) -> Vec<Page> {
    pages.iter().map(|placed| paint_page(placed, config)).collect()
}

pub fn paint_page(placed: &PlacedPage, config: &PageConfig) -> Page {
    let mut page = Page::new(config.page_width, config.page_height, config.margin);
    let column = config.column_width();

    for placement in &placed.placements {
        match placement {
            Placement::Line { line, baseline } => {
                for run in &line.runs {
                    paint_run(&mut page, run, *baseline, config);
                }
            }
            Placement::Rule { y } => page.push(PaintOp::StrokeLine {
                x0: config.margin,
                y0: *y,
                x1: config.margin + column,
                y1: *y,
            }),
        }
    }
    page.cursor_y = placed.cursor_y;
    page
}

fn paint_run(page: &mut Page, run: &LineRun, baseline: f32, config: &PageConfig) {
    let x = run_origin(run, config);
    if run.bullet {
        page.push(PaintOp::ShowText {
            x: x - config.bullet_gap,
            y: baseline,
            font: FontFace::Regular,
            size: run.font_size,
            text: BULLET.to_string(),
        });
    }
    for fragment in &run.fragments {
        page.push(PaintOp::ShowText {
            x: x + fragment.offset,
            y: baseline,
            font: fragment.face,
            size: run.font_size,
            text: fragment.text.clone(),
        });
    }
}

/// Left edge of a run.
pub fn run_origin(run: &LineRun, config: &PageConfig) -> f32 {
    let column = config.column_width();
    match run.alignment {
        Alignment::Left => config.margin + run.indent,
        Alignment::Center => config.margin + (column - run.width) / 2.0,
        Alignment::Right => config.margin + column - run.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::flow::layout_document;
    use crate::layout::font_metrics::measure;
    use crate::layout::page_config::default_page_config;
    use crate::layout::paginator::paginate;
    use crate::markup::parse;

    const JANE: &str = r"\begin{center}
    {\LARGE \textbf{Jane Roe}}\\
    jane@example.com | 555-0100
\end{center}
\section{Experience}
\textbf{Engineer} \hfill 2020--2022 \\
\textit{Acme Corp}
\begin{itemize}
    \item Built things.
\end{itemize}";

    fn painted(markup: &str) -> Vec<Page> {
        let config = default_page_config();
        let laid = layout_document(&parse(markup), &config);
        paint(&paginate(laid.blocks, &config), &config)
    }

    fn show_text(page: &Page, text: &str) -> (f32, f32, FontFace, f32) {
        page.paint_ops()
            .iter()
            .find_map(|op| match op {
                PaintOp::ShowText {
                    x,
                    y,
                    font,
                    size,
                    text: t,
                } if t == text => Some((*x, *y, *font, *size)),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no text op for {text:?}"))
    }

    #[test]
    fn test_header_name_is_centered_bold() {
        let pages = painted(JANE);
        let (x, _, font, size) = show_text(&pages[0], "Jane Roe");
        let width = measure("Jane Roe", FontFace::Bold, 18.0);
        assert_eq!(font, FontFace::Bold);
        assert_eq!(size, 18.0);
        assert!((x - (50.0 + (495.0 - width) / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_dates_are_right_aligned_to_the_column() {
        let pages = painted(JANE);
        let (x, _, font, _) = show_text(&pages[0], "2020--2022");
        let width = measure("2020--2022", FontFace::Regular, 10.0);
        assert_eq!(font, FontFace::Regular);
        assert!((x - (50.0 + 495.0 - width)).abs() < 1e-3, "x = {x}");
    }

    #[test]
    fn test_title_and_dates_share_a_baseline() {
        let pages = painted(JANE);
        let (title_x, title_y, font, _) = show_text(&pages[0], "Engineer");
        let (_, dates_y, _, _) = show_text(&pages[0], "2020--2022");
        assert_eq!(title_x, 50.0);
        assert_eq!(font, FontFace::Bold);
        assert_eq!(title_y, dates_y);
    }

    #[test]
    fn test_company_is_italic() {
        let pages = painted(JANE);
        assert_eq!(show_text(&pages[0], "Acme Corp").2, FontFace::Italic);
    }

    #[test]
    fn test_bullet_sits_before_indented_item() {
        let pages = painted(JANE);
        let (item_x, item_y, _, _) = show_text(&pages[0], "Built things.");
        let (bullet_x, bullet_y, _, _) = show_text(&pages[0], BULLET);
        assert_eq!(item_x, 65.0);
        assert_eq!(bullet_x, 55.0);
        assert_eq!(bullet_y, item_y);
    }

    #[test]
    fn test_section_rule_spans_the_column() {
        let pages = painted(JANE);
        let (_, title_y, _, _) = show_text(&pages[0], "Experience");
        let rule = pages[0]
            .paint_ops()
            .iter()
            .find_map(|op| match op {
                PaintOp::StrokeLine { x0, y0, x1, y1 } => Some((*x0, *y0, *x1, *y1)),
                _ => None,
            })
            .expect("section rule");
        assert_eq!(rule.0, 50.0);
        assert_eq!(rule.2, 545.0);
        assert_eq!(rule.1, rule.3);
        assert!((rule.1 - (title_y - 5.0)).abs() < 1e-4);
    }

    #[test]
    fn test_mixed_styles_switch_fonts_mid_line() {
        let pages = painted(r"\section{Skills} \textbf{Languages:} Rust, Go");
        let (bold_x, y0, bold_face, _) = show_text(&pages[0], "Languages:");
        let (plain_x, y1, plain_face, _) = show_text(&pages[0], " Rust, Go");
        assert_eq!(bold_face, FontFace::Bold);
        assert_eq!(plain_face, FontFace::Regular);
        assert_eq!(y0, y1);
        let expected = bold_x + measure("Languages:", FontFace::Bold, 10.0);
        assert!((plain_x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_page_geometry_and_cursor_carry_over() {
        let pages = painted("");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].width, 595.0);
        assert_eq!(pages[0].height, 842.0);
        assert_eq!(pages[0].margin, 50.0);
        assert!(pages[0].cursor_y < 792.0);
        assert_eq!(pages[0].text_ops().count(), 1);
    }
}
