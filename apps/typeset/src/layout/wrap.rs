//! Greedy word-wrap of styled text into printed lines, measured against Helvetica metrics.
//!
//! # Rules
//! - Words are whitespace-delimited; a line closes when the next word plus its joining
//!   space would exceed the available width.
//! - A word wider than the available width sits alone on its own line, unsplit.
//! - Style boundaries survive wrapping: each line keeps one `RunFragment` per style change,
//!   already measured, so the renderer never re-measures.
//! - List items wrap against `column_width - list_indent`; only the first line of an item
//!   carries the bullet.
//! - A job-entry head puts the title (left) and dates (right) on the same line as two runs.

use serde::Serialize;

use crate::errors::Degradation;
use crate::layout::font_metrics::{is_measurable, measure, FontFace};
use crate::layout::page_config::{default_page_config, PageConfig};
use crate::models::{ContentBlock, Document, StyledSpan, StyledText};

// ────────────────────────────────────────────────────────────────────────────
// Line types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// A measured piece of a run in a single face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFragment {
    pub text: String,
    pub face: FontFace,
    /// Horizontal offset from the start of the run.
    pub offset: f32,
    pub width: f32,
}

/// A horizontally placed group of fragments; one alignment, one font size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRun {
    pub fragments: Vec<RunFragment>,
    pub alignment: Alignment,
    /// Left indent from the margin. Only meaningful for left-aligned runs.
    pub indent: f32,
    pub font_size: f32,
    /// Draw a bullet glyph in front of this run.
    pub bullet: bool,
    /// Sum of fragment widths.
    pub width: f32,
}

impl LineRun {
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// One physical printed line: one run, or a left run plus a right-aligned run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypesetLine {
    pub runs: Vec<LineRun>,
    /// Size governing the line advance.
    pub font_size: f32,
}

impl TypesetLine {
    fn single(run: LineRun) -> Self {
        TypesetLine {
            font_size: run.font_size,
            runs: vec![run],
        }
    }

    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(LineRun::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lines of one block plus how many leading lines must share a page.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedBlock {
    pub lines: Vec<TypesetLine>,
    pub keep: usize,
}

/// Wraps a content block against `column_width` at `base_font_size`, using the default
/// list indent.
pub fn wrap(block: &ContentBlock, column_width: f32, base_font_size: f32) -> Vec<TypesetLine> {
    Wrapper::new(column_width, base_font_size, default_page_config().list_indent)
        .block(block)
        .lines
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapper
// ────────────────────────────────────────────────────────────────────────────

/// Wraps blocks for one document and collects the degradations met on the way.
pub struct Wrapper {
    column_width: f32,
    base_font_size: f32,
    list_indent: f32,
    report: Vec<Degradation>,
}

impl Wrapper {
    pub fn new(column_width: f32, base_font_size: f32, list_indent: f32) -> Self {
        Wrapper {
            column_width,
            base_font_size,
            list_indent,
            report: Vec::new(),
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Wrapper::new(config.column_width(), config.base_font_size, config.list_indent)
    }

    pub fn into_report(self) -> Vec<Degradation> {
        self.report
    }

    pub fn block(&mut self, block: &ContentBlock) -> WrappedBlock {
        match block {
            ContentBlock::Paragraph(text) => {
                let lines =
                    self.lines(text, self.column_width, self.base_font_size, Alignment::Left);
                WrappedBlock { keep: lines.len().min(1), lines }
            }
            ContentBlock::List(items) => {
                let lines = self.list(items);
                WrappedBlock { keep: lines.len().min(1), lines }
            }
            ContentBlock::JobEntry {
                title,
                company,
                dates,
                items,
            } => self.job_entry(title, company, dates.as_deref(), items),
        }
    }

    /// Centered name followed by centered contact lines.
    pub fn header(&mut self, document: &Document, name_font_size: f32) -> Vec<TypesetLine> {
        let name = StyledText {
            spans: vec![StyledSpan::bold(document.header_name.as_str())],
        };
        let mut lines = self.lines(&name, self.column_width, name_font_size, Alignment::Center);
        for contact in &document.contact_lines {
            let text = StyledText::from_plain(contact.as_str());
            lines.extend(self.lines(
                &text,
                self.column_width,
                self.base_font_size,
                Alignment::Center,
            ));
        }
        lines
    }

    /// Bold, left-aligned section title.
    pub fn section_title(&mut self, title: &str, size: f32) -> Vec<TypesetLine> {
        let text = StyledText {
            spans: vec![StyledSpan::bold(title)],
        };
        self.lines(&text, self.column_width, size, Alignment::Left)
    }

    fn list(&mut self, items: &[StyledText]) -> Vec<TypesetLine> {
        let available = self.column_width - self.list_indent;
        let mut lines = Vec::new();
        for item in items {
            let wrapped = self.wrap_styled(item, available, self.base_font_size);
            for (i, (fragments, width)) in wrapped.into_iter().enumerate() {
                lines.push(TypesetLine::single(LineRun {
                    fragments,
                    alignment: Alignment::Left,
                    indent: self.list_indent,
                    font_size: self.base_font_size,
                    bullet: i == 0,
                    width,
                }));
            }
        }
        lines
    }

    fn job_entry(
        &mut self,
        title: &str,
        company: &str,
        dates: Option<&str>,
        items: &[StyledText],
    ) -> WrappedBlock {
        let size = self.base_font_size;
        let dates_run = dates.filter(|d| !d.trim().is_empty()).map(|d| {
            self.note_glyphs(d);
            let width = measure(d, FontFace::Regular, size);
            LineRun {
                fragments: vec![RunFragment {
                    text: d.to_string(),
                    face: FontFace::Regular,
                    offset: 0.0,
                    width,
                }],
                alignment: Alignment::Right,
                indent: 0.0,
                font_size: size,
                bullet: false,
                width,
            }
        });

        // Title shares its first line with the dates unless they take over half the column.
        let reserved = dates_run.as_ref().map(|r| r.width + size).unwrap_or(0.0);
        let shares_line = reserved <= self.column_width / 2.0;
        let title_width = if shares_line {
            self.column_width - reserved
        } else {
            self.column_width
        };

        let title_text = StyledText {
            spans: vec![StyledSpan::bold(title)],
        };
        let mut lines = self.lines(&title_text, title_width, size, Alignment::Left);
        if let Some(run) = dates_run {
            match lines.first_mut() {
                Some(first) if shares_line => first.runs.push(run),
                _ => lines.push(TypesetLine::single(run)),
            }
        }

        if !company.is_empty() {
            let company_text = StyledText {
                spans: vec![StyledSpan::italic(company)],
            };
            lines.extend(self.lines(&company_text, self.column_width, size, Alignment::Left));
        }

        let head = lines.len();
        let item_lines = self.list(items);
        let keep = head + item_lines.len().min(1);
        lines.extend(item_lines);
        WrappedBlock { lines, keep }
    }

    fn lines(
        &mut self,
        text: &StyledText,
        available: f32,
        size: f32,
        alignment: Alignment,
    ) -> Vec<TypesetLine> {
        self.wrap_styled(text, available, size)
            .into_iter()
            .map(|(fragments, width)| {
                TypesetLine::single(LineRun {
                    fragments,
                    alignment,
                    indent: 0.0,
                    font_size: size,
                    bullet: false,
                    width,
                })
            })
            .collect()
    }

    /// Greedy wrap. Returns each line's fragments and total width.
    fn wrap_styled(
        &mut self,
        text: &StyledText,
        available: f32,
        size: f32,
    ) -> Vec<(Vec<RunFragment>, f32)> {
        let mut lines = Vec::new();
        let mut line = LineBuilder::new(size);

        for word in tokenize(text) {
            self.note_glyphs(&word.text());
            let word_w = word.width(size);

            if !line.is_empty() {
                let space_face = word.space_face.unwrap_or(FontFace::Regular);
                let space_w = measure(" ", space_face, size);
                if line.width + space_w + word_w <= available {
                    line.push(" ", space_face);
                    line.push_word(&word);
                    continue;
                }
                lines.push(line.finish());
            }

            line.push_word(&word);
            if word_w > available {
                self.report.push(Degradation::OversizedToken { word: word.text() });
                lines.push(line.finish());
            }
        }
        if !line.is_empty() {
            lines.push(line.finish());
        }
        lines
    }

    fn note_glyphs(&mut self, text: &str) {
        for ch in text.chars().filter(|c| !is_measurable(*c)) {
            let seen = self
                .report
                .iter()
                .any(|d| matches!(d, Degradation::UnmeasurableGlyph { ch: c } if *c == ch));
            if !seen {
                self.report.push(Degradation::UnmeasurableGlyph { ch });
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Words
// ────────────────────────────────────────────────────────────────────────────

/// A whitespace-delimited word; may cross a style boundary (`\textbf{C}++`).
#[derive(Debug, Default)]
struct Word {
    pieces: Vec<(String, FontFace)>,
    /// Face of the whitespace in front of the word, if any.
    space_face: Option<FontFace>,
}

impl Word {
    fn push(&mut self, ch: char, face: FontFace) {
        match self.pieces.last_mut() {
            Some((text, last_face)) if *last_face == face => text.push(ch),
            _ => self.pieces.push((ch.to_string(), face)),
        }
    }

    fn width(&self, size: f32) -> f32 {
        self.pieces
            .iter()
            .map(|(text, face)| measure(text, *face, size))
            .sum()
    }

    fn text(&self) -> String {
        self.pieces.iter().map(|(t, _)| t.as_str()).collect()
    }
}

fn tokenize(text: &StyledText) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();
    let mut pending_space: Option<FontFace> = None;

    for span in &text.spans {
        let face = FontFace::from_style(span.bold, span.italic);
        for ch in span.text.chars() {
            if ch.is_whitespace() && ch != '\u{00A0}' {
                if !current.pieces.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                if pending_space.is_none() && !words.is_empty() {
                    pending_space = Some(face);
                }
            } else {
                if current.pieces.is_empty() {
                    current.space_face = pending_space.take();
                }
                current.push(ch, face);
            }
        }
    }
    if !current.pieces.is_empty() {
        words.push(current);
    }
    words
}

struct LineBuilder {
    size: f32,
    fragments: Vec<RunFragment>,
    width: f32,
}

impl LineBuilder {
    fn new(size: f32) -> Self {
        LineBuilder {
            size,
            fragments: Vec::new(),
            width: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, text: &str, face: FontFace) {
        let w = measure(text, face, self.size);
        match self.fragments.last_mut() {
            Some(last) if last.face == face => {
                last.text.push_str(text);
                last.width += w;
            }
            _ => self.fragments.push(RunFragment {
                text: text.to_string(),
                face,
                offset: self.width,
                width: w,
            }),
        }
        self.width += w;
    }

    fn push_word(&mut self, word: &Word) {
        for (text, face) in &word.pieces {
            self.push(text, *face);
        }
    }

    fn finish(&mut self) -> (Vec<RunFragment>, f32) {
        let width = self.width;
        self.width = 0.0;
        (std::mem::take(&mut self.fragments), width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMN: f32 = 495.0;

    fn long_item() -> StyledText {
        let mut text = StyledText::new();
        text.push("Led development of a distributed ingestion pipeline that ", false, false);
        text.push("reduced end-to-end latency", true, false);
        text.push(
            " by forty percent across every regional cluster while mentoring six engineers \
             and documenting the operational runbooks for the on-call rotation",
            false,
            false,
        );
        text
    }

    fn words_of(lines: &[TypesetLine]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|l| l.runs.iter())
            .flat_map(|r| r.text().split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_short_paragraph_is_one_line() {
        let block = ContentBlock::Paragraph(StyledText::from_plain("Built things."));
        let lines = wrap(&block, COLUMN, 10.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].runs[0].text(), "Built things.");
        assert_eq!(lines[0].runs[0].alignment, Alignment::Left);
    }

    #[test]
    fn test_every_line_fits_the_column() {
        let block = ContentBlock::Paragraph(long_item());
        let lines = wrap(&block, 200.0, 10.0);
        assert!(lines.len() > 2);
        for line in &lines {
            let width: f32 = line.runs[0].fragments.iter().map(|f| f.width).sum();
            assert!(width <= 200.0 + 1e-3, "line too wide: {width}");
            assert!((width - line.runs[0].width).abs() < 1e-3);
        }
    }

    #[test]
    fn test_wrap_keeps_every_word_in_order() {
        let text = long_item();
        let lines = wrap(&ContentBlock::Paragraph(text.clone()), 150.0, 10.0);
        let expected: Vec<String> = text
            .plain_text()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert_eq!(words_of(&lines), expected);
    }

    #[test]
    fn test_style_boundary_kept_within_line() {
        let lines = wrap(&ContentBlock::Paragraph(long_item()), COLUMN, 10.0);
        let first = &lines[0].runs[0];
        assert!(first.fragments.len() >= 2);
        assert_eq!(first.fragments[0].face, FontFace::Regular);
        assert_eq!(first.fragments[1].face, FontFace::Bold);
        assert!((first.fragments[1].offset - first.fragments[0].width).abs() < 1e-3);
    }

    #[test]
    fn test_oversized_word_sits_alone() {
        let word = "Supercalifragilisticexpialidocious-internationalization";
        let text = StyledText::from_plain(format!("a {word} b"));
        let mut wrapper = Wrapper::new(100.0, 10.0, 15.0);
        let block = wrapper.block(&ContentBlock::Paragraph(text));
        let texts: Vec<String> = block.lines.iter().map(TypesetLine::text).collect();
        assert_eq!(texts, vec!["a".to_string(), word.to_string(), "b".to_string()]);
        assert!(wrapper
            .into_report()
            .contains(&Degradation::OversizedToken { word: word.to_string() }));
    }

    #[test]
    fn test_long_list_item_indents_and_bullets_first_line_only() {
        let block = ContentBlock::List(vec![long_item()]);
        let lines = wrap(&block, COLUMN, 10.0);
        assert!(lines.len() >= 2);
        assert!(lines[0].runs[0].bullet);
        for line in &lines[1..] {
            assert!(!line.runs[0].bullet);
        }
        for line in &lines {
            assert_eq!(line.runs[0].indent, 15.0);
            assert!(line.runs[0].width <= COLUMN - 15.0 + 1e-3);
        }
    }

    #[test]
    fn test_job_entry_head_layout() {
        let block = ContentBlock::JobEntry {
            title: "Engineer".to_string(),
            company: "Acme Corp".to_string(),
            dates: Some("2020--2022".to_string()),
            items: vec![StyledText::from_plain("Built things.")],
        };
        let mut wrapper = Wrapper::new(COLUMN, 10.0, 15.0);
        let wrapped = wrapper.block(&block);
        assert_eq!(wrapped.lines.len(), 3);
        assert_eq!(wrapped.keep, 3);

        let head = &wrapped.lines[0];
        assert_eq!(head.runs.len(), 2);
        assert_eq!(head.runs[0].fragments[0].face, FontFace::Bold);
        assert_eq!(head.runs[1].alignment, Alignment::Right);
        assert!((head.runs[1].width - measure("2020--2022", FontFace::Regular, 10.0)).abs() < 1e-4);

        assert_eq!(wrapped.lines[1].runs[0].fragments[0].face, FontFace::Italic);
        assert!(wrapped.lines[2].runs[0].bullet);
    }

    #[test]
    fn test_job_title_wraps_clear_of_dates() {
        let title = "Principal Staff Software Engineer for Distributed Storage Infrastructure";
        let dates = "January 2019 -- December 2023";
        let block = ContentBlock::JobEntry {
            title: title.to_string(),
            company: String::new(),
            dates: Some(dates.to_string()),
            items: vec![],
        };
        let lines = wrap(&block, 400.0, 10.0);
        let dates_w = measure(dates, FontFace::Regular, 10.0);
        assert!(lines[0].runs[0].width <= 400.0 - dates_w);
        assert_eq!(lines[0].runs[1].text(), dates);
        assert!(lines.len() >= 2);
    }

    #[test]
    fn test_project_form_has_no_company_line() {
        let block = ContentBlock::JobEntry {
            title: "Shop".to_string(),
            company: String::new(),
            dates: None,
            items: vec![],
        };
        let lines = wrap(&block, COLUMN, 10.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].runs.len(), 1);
    }

    #[test]
    fn test_header_is_centered() {
        let doc = Document {
            header_name: "Jane Roe".to_string(),
            contact_lines: vec!["jane@example.com \u{2022} 555-0100".to_string()],
            sections: vec![],
        };
        let mut wrapper = Wrapper::new(COLUMN, 10.0, 15.0);
        let lines = wrapper.header(&doc, 18.0);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.runs[0].alignment == Alignment::Center));
        assert_eq!(lines[0].font_size, 18.0);
        assert_eq!(lines[0].runs[0].fragments[0].face, FontFace::Bold);
        assert!(wrapper.into_report().is_empty());
    }

    #[test]
    fn test_unmeasurable_glyph_reported_once() {
        let mut wrapper = Wrapper::new(COLUMN, 10.0, 15.0);
        wrapper.block(&ContentBlock::Paragraph(StyledText::from_plain("café déjà")));
        let report = wrapper.into_report();
        let unmeasurable: Vec<&Degradation> = report
            .iter()
            .filter(|d| matches!(d, Degradation::UnmeasurableGlyph { .. }))
            .collect();
        assert_eq!(
            unmeasurable,
            vec![
                &Degradation::UnmeasurableGlyph { ch: 'é' },
                &Degradation::UnmeasurableGlyph { ch: 'à' },
            ]
        );
    }

    #[test]
    fn test_joining_space_takes_source_style() {
        let mut text = StyledText::new();
        text.push("Bold words", true, false);
        text.push(" plain", false, false);
        let lines = wrap(&ContentBlock::Paragraph(text), COLUMN, 10.0);
        let fragments = &lines[0].runs[0].fragments;
        assert_eq!(fragments[0].text, "Bold words");
        assert_eq!(fragments[1].text, " plain");
    }
}
