//! Splits a section body into paragraphs, bullet lists and job entries, in source order.
//!
//! A body is read as an ordered run of segments:
//! - `\begin{itemize} .. \end{itemize}` becomes a list segment, one entry per `\item`;
//! - a job-entry head at the start of a line: `\textbf{TITLE} \hfill DATES \\ \textit{COMPANY}`
//!   (or the project form `\textbf{TITLE} \hfill DATES` with no company line). Text after the
//!   company on its line, such as `\hfill Remote`, is appended to the company;
//! - anything else is paragraph text, split on blank lines and on `\\` line breaks.
//!
//! A head followed directly by a list owns that list as its items. Head detection works on
//! a copy of the cursor, so a failed match leaves the text for paragraph handling.

use crate::markup::scanner::{
    find_environment_end, split_line_breaks, top_level_commands, Scanner,
};
use crate::markup::styles::{resolve, resolve_plain};
use crate::models::{ContentBlock, StyledText};

#[derive(Debug, Clone, PartialEq)]
struct JobHead {
    title: String,
    company: String,
    dates: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Paragraph(StyledText),
    Head(JobHead),
    List(Vec<StyledText>),
}

/// Classifies a raw section body into content blocks, in source order.
pub fn classify(body: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut segments = segments(body).into_iter().peekable();

    while let Some(segment) = segments.next() {
        match segment {
            Segment::Head(head) => {
                let items = match segments.peek() {
                    Some(Segment::List(_)) => match segments.next() {
                        Some(Segment::List(items)) => items,
                        _ => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                blocks.push(ContentBlock::JobEntry {
                    title: head.title,
                    company: head.company,
                    dates: head.dates,
                    items,
                });
            }
            Segment::List(items) => {
                if !items.is_empty() {
                    blocks.push(ContentBlock::List(items));
                }
            }
            Segment::Paragraph(text) => blocks.push(ContentBlock::Paragraph(text)),
        }
    }
    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Segmentation
// ────────────────────────────────────────────────────────────────────────────

fn segments(body: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut cursor = 0usize;

    for hit in top_level_commands(body) {
        if hit.start < cursor {
            continue;
        }
        match hit.name {
            "begin" => {
                let mut sc = Scanner::at(body, hit.end);
                sc.skip_inline_whitespace();
                if sc.read_group().map(str::trim) != Some("itemize") {
                    continue;
                }
                sc.skip_optional_arg();
                let content_start = sc.pos();
                let (content_end, after) = find_environment_end(body, "itemize", content_start)
                    .unwrap_or((body.len(), body.len()));

                push_paragraphs(&body[cursor..hit.start], &mut out);
                out.push(Segment::List(split_items(&body[content_start..content_end])));
                cursor = after;
            }
            "textbf" if starts_line(body, cursor, hit.start) => {
                if let Some((head, after)) = match_job_head(body, hit.start) {
                    push_paragraphs(&body[cursor..hit.start], &mut out);
                    out.push(Segment::Head(head));
                    cursor = after;
                }
            }
            _ => {}
        }
    }
    push_paragraphs(&body[cursor..], &mut out);
    out
}

/// True if only whitespace separates `pos` from the previous newline or the cursor.
fn starts_line(body: &str, cursor: usize, pos: usize) -> bool {
    let line_start = body[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0).max(cursor);
    body[line_start.min(pos)..pos].trim().is_empty()
}

/// Splits raw text on blank lines and hand line breaks (`\\`); each piece becomes a paragraph.
fn push_paragraphs(raw: &str, out: &mut Vec<Segment>) {
    let mut chunk = String::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut chunk, out);
        } else {
            chunk.push_str(line);
            chunk.push('\n');
        }
    }
    flush_paragraph(&mut chunk, out);
}

fn flush_paragraph(chunk: &mut String, out: &mut Vec<Segment>) {
    for line in split_line_breaks(chunk.as_str()) {
        let text = resolve(line);
        if !text.is_empty() {
            out.push(Segment::Paragraph(text));
        }
    }
    chunk.clear();
}

// ────────────────────────────────────────────────────────────────────────────
// Lists
// ────────────────────────────────────────────────────────────────────────────

/// Splits itemize content on `\item` markers that belong to this environment.
fn split_items(content: &str) -> Vec<StyledText> {
    let mut starts = Vec::new();
    let mut nesting = 0usize;
    for hit in top_level_commands(content) {
        match hit.name {
            "begin" => nesting += 1,
            "end" => nesting = nesting.saturating_sub(1),
            "item" if nesting == 0 => starts.push(hit),
            _ => {}
        }
    }

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, hit)| {
            let mut sc = Scanner::at(content, hit.end);
            sc.skip_optional_arg();
            let end = starts.get(i + 1).map(|next| next.start).unwrap_or(content.len());
            let text = resolve(&content[sc.pos()..end.max(sc.pos())]);
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Job-entry heads
// ────────────────────────────────────────────────────────────────────────────

/// Matches a job-entry head starting at the `\textbf` at `pos`.
/// Returns the head and the offset just past it.
fn match_job_head(body: &str, pos: usize) -> Option<(JobHead, usize)> {
    let mut sc = Scanner::at(body, pos);
    if !sc.eat_command("textbf") {
        return None;
    }
    let title = resolve_plain(sc.read_group()?);
    if title.is_empty() {
        return None;
    }

    sc.skip_inline_whitespace();
    let mut dates = None;
    let has_hfill = sc.eat_command("hfill");
    if has_hfill {
        let (text, end) = line_tail(body, sc.pos());
        dates = (!text.is_empty()).then_some(text);
        sc = Scanner::at(body, end);
    }

    // Line break followed by the italic company name.
    let mut next = sc.clone();
    next.skip_inline_whitespace();
    let mut company = String::new();
    if next.eat_command("\\") {
        next.skip_optional_arg();
        next.skip_whitespace();
        if next.eat_command("textit") {
            if let Some(raw) = next.read_group() {
                company = resolve_plain(raw);
                // Location or other text on the company line: `\textit{Acme} \hfill Remote`.
                let (location, end) = line_tail(body, next.pos());
                if !location.is_empty() {
                    company = format!("{company}, {location}");
                }
                sc = Scanner::at(body, end);
            }
        }
    }

    if company.is_empty() && !has_hfill {
        return None;
    }
    let mut trailing = sc.clone();
    trailing.skip_inline_whitespace();
    if trailing.eat_command("\\") {
        sc = trailing;
    }

    Some((
        JobHead {
            title,
            company,
            dates,
        },
        sc.pos(),
    ))
}

/// Resolved text from `start` to the end of its line, stopping early at a top-level `\\`
/// or `\begin`. Returns the text and the offset where it stopped.
fn line_tail(body: &str, start: usize) -> (String, usize) {
    let line_end = body[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(body.len());
    let end = top_level_commands(&body[start..line_end])
        .into_iter()
        .find(|hit| hit.name == "\\" || hit.name == "begin")
        .map(|hit| start + hit.start)
        .unwrap_or(line_end);
    (resolve_plain(&body[start..end]), end)
}
