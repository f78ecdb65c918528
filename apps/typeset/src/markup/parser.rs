//! Turns LaTeX resume markup into a `Document`: header name, contact lines and sections.
//!
//! Parsing never fails. Missing structure falls back to defaults (header "Resume",
//! no contact lines, no sections) and is recorded as a `Degradation`.

use std::ops::Range;

use tracing::debug;

use crate::errors::Degradation;
use crate::markup::classifier::classify;
use crate::markup::scanner::{
    commands, find_environment_end, split_line_breaks, strip_comments, top_level_commands,
    Scanner,
};
use crate::markup::styles::resolve_plain;
use crate::models::{Document, Section, DEFAULT_HEADER_NAME};

/// Size commands accepted in front of the header name.
const HEADER_SIZES: &[&str] = &["LARGE", "Large", "huge", "Huge"];

/// Glyph replacing `|` separators in contact lines.
const CONTACT_SEPARATOR: &str = "\u{2022}";

/// Parses markup into a `Document`, discarding the degradation report.
pub fn parse(markup: &str) -> Document {
    parse_with_report(markup).0
}

/// Parses markup into a `Document` and lists every fallback that was taken.
pub fn parse_with_report(markup: &str) -> (Document, Vec<Degradation>) {
    let src = strip_comments(markup);
    let mut report = Vec::new();

    let header = find_header_construct(&src);
    let header_name = match header.as_ref().map(|h| h.name.clone()) {
        Some(name) if !name.is_empty() => name,
        _ => {
            report.push(Degradation::MissingHeader);
            DEFAULT_HEADER_NAME.to_string()
        }
    };

    let contact_lines = extract_contact_lines(&src, header.as_ref());
    let sections = extract_sections(&src, &mut report);
    if sections.is_empty() {
        report.push(Degradation::NoSections);
    }

    debug!(
        header = %header_name,
        contact_lines = contact_lines.len(),
        sections = sections.len(),
        "Parsed markup"
    );

    (
        Document {
            header_name,
            contact_lines,
            sections,
        },
        report,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

/// Location of the first `{\LARGE \textbf{NAME}}` construct.
#[derive(Debug, Clone, PartialEq)]
struct HeaderConstruct {
    /// Byte range of the construct, including a wrapping `{..}` group when present.
    range: Range<usize>,
    name: String,
}

fn find_header_construct(src: &str) -> Option<HeaderConstruct> {
    commands(src)
        .into_iter()
        .filter(|hit| HEADER_SIZES.contains(&hit.name))
        .find_map(|hit| {
            let mut sc = Scanner::at(src, hit.end);
            sc.skip_whitespace();
            if !sc.eat_command("textbf") {
                return None;
            }
            sc.skip_whitespace();
            let raw_name = sc.read_group()?;
            let mut range = hit.start..sc.pos();

            // Widen to the wrapping group: `{\LARGE \textbf{..}}`.
            let before = src[..range.start].trim_end();
            if before.ends_with('{') {
                let mut after = Scanner::at(src, range.end);
                after.skip_whitespace();
                if after.peek() == Some('}') {
                    range = before.len() - 1..after.pos() + 1;
                }
            }

            Some(HeaderConstruct {
                range,
                name: resolve_plain(raw_name),
            })
        })
}

/// Contact lines of the first `center` environment, in order, with the header removed.
fn extract_contact_lines(src: &str, header: Option<&HeaderConstruct>) -> Vec<String> {
    let Some(body) = first_environment_body(src, "center") else {
        return Vec::new();
    };

    // Drop the header construct when it sits inside the centered block.
    let content = match header {
        Some(h) if body.start <= h.range.start && h.range.end <= body.end => {
            format!("{}{}", &src[body.start..h.range.start], &src[h.range.end..body.end])
        }
        _ => src[body].to_string(),
    };

    split_line_breaks(&content)
        .into_iter()
        .map(|line| {
            resolve_plain(line)
                .replace('|', CONTACT_SEPARATOR)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Byte range of the content of the first `\begin{env} .. \end{env}`.
fn first_environment_body(src: &str, env: &str) -> Option<Range<usize>> {
    commands(src)
        .into_iter()
        .filter(|hit| hit.name == "begin")
        .find_map(|hit| {
            let mut sc = Scanner::at(src, hit.end);
            sc.skip_inline_whitespace();
            if sc.read_group().map(str::trim) != Some(env) {
                return None;
            }
            let start = sc.pos();
            let (end, _) = find_environment_end(src, env, start)?;
            Some(start..end)
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn extract_sections(src: &str, report: &mut Vec<Degradation>) -> Vec<Section> {
    let mut hits = top_level_commands(src);

    // An unclosed `{` before the sections pushes every marker below depth 0.
    if !hits.iter().any(|hit| hit.name == "section") {
        let nested: Vec<_> = commands(src)
            .into_iter()
            .filter(|hit| hit.name != "section" || opens_title(src, hit.end))
            .collect();
        if let Some(first) = nested.iter().find(|hit| hit.name == "section") {
            report.push(Degradation::MalformedMarkup {
                offset: first.start,
                detail: "unbalanced braces before the first section".to_string(),
            });
            hits = nested;
        }
    }

    let doc_end = hits
        .iter()
        .filter(|hit| hit.name == "end")
        .find(|hit| {
            let mut sc = Scanner::at(src, hit.end);
            sc.read_group().map(str::trim) == Some("document")
        })
        .map(|hit| hit.start)
        .unwrap_or(src.len());

    let markers: Vec<_> = hits
        .iter()
        .filter(|hit| hit.name == "section" && hit.start < doc_end)
        .collect();

    let mut sections = Vec::new();
    for (index, marker) in markers.iter().enumerate() {
        let mut sc = Scanner::at(src, marker.end);
        if sc.peek() == Some('*') {
            sc.bump();
        }
        sc.skip_optional_arg();
        sc.skip_whitespace();
        let Some(raw_title) = sc.read_group() else {
            report.push(Degradation::MalformedMarkup {
                offset: marker.start,
                detail: "section title is not a balanced group".to_string(),
            });
            continue;
        };

        let body_start = sc.pos();
        let body_end = markers
            .get(index + 1)
            .map(|next| next.start)
            .unwrap_or(doc_end)
            .max(body_start);

        let title = resolve_plain(raw_title);
        if title.is_empty() {
            report.push(Degradation::DroppedSection { index });
            continue;
        }

        sections.push(Section {
            title,
            blocks: classify(&src[body_start..body_end]),
        });
    }
    sections
}

/// True if a section title (or its `*` / `[..]` prefix) follows `pos`.
/// Rules out references such as `\titleformat{\section}`.
fn opens_title(src: &str, pos: usize) -> bool {
    matches!(src[pos..].trim_start().chars().next(), Some('{' | '*' | '['))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentBlock, StyledText};

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

    // Sample template shipped with the resume editor.
    const SAMPLE: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage{titlesec}
\titleformat{\section}{\Large\bfseries}{}{0em}{}[\titlerule]
\begin{document}

\begin{center}
    {\LARGE \textbf{John Doe}}\\
    123 Main Street, City, State 12345\\
    (123) 456-7890 | \href{mailto:john.doe@email.com}{john.doe@email.com} |
    \href{https://github.com/johndoe}{github.com/johndoe}
\end{center}

\section{Summary}
Experienced software engineer with 5+ years of expertise.

\section{Skills}
\begin{itemize}[leftmargin=*, noitemsep]
    \item \textbf{Frontend:} React, Redux
    \item \textbf{Backend:} Node.js, Express
\end{itemize}

\section{Education}
\textbf{Master of Science} \hfill 2016 - 2018\\
\textit{Massachusetts Institute of Technology}

\textbf{Bachelor of Science} \hfill 2012 - 2016\\
\textit{University of California}

\end{document}";

    #[test]
    fn test_jane_roe_scenario() {
        let doc = parse(JANE);
        let expected = Document {
            header_name: "Jane Roe".to_string(),
            contact_lines: vec!["jane@example.com \u{2022} 555-0100".to_string()],
            sections: vec![Section {
                title: "Experience".to_string(),
                blocks: vec![ContentBlock::JobEntry {
                    title: "Engineer".to_string(),
                    company: "Acme Corp".to_string(),
                    dates: Some("2020--2022".to_string()),
                    items: vec![StyledText::from_plain("Built things.")],
                }],
            }],
        };
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_no_sections_and_no_header_fall_back() {
        let (doc, report) = parse_with_report("Just some words without structure.");
        assert_eq!(doc.header_name, "Resume");
        assert!(doc.sections.is_empty());
        assert!(doc.contact_lines.is_empty());
        assert!(report.contains(&Degradation::MissingHeader));
        assert!(report.contains(&Degradation::NoSections));
    }

    #[test]
    fn test_empty_input_is_default_document() {
        assert_eq!(parse(""), Document::default());
    }

    #[test]
    fn test_sample_template_structure() {
        let doc = parse(SAMPLE);
        assert_eq!(doc.header_name, "John Doe");
        assert_eq!(
            doc.contact_lines,
            vec![
                "123 Main Street, City, State 12345".to_string(),
                "(123) 456-7890 \u{2022} john.doe@email.com \u{2022} github.com/johndoe"
                    .to_string(),
            ]
        );
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Summary", "Skills", "Education"]);

        assert!(matches!(doc.sections[0].blocks[..], [ContentBlock::Paragraph(_)]));
        match &doc.sections[1].blocks[..] {
            [ContentBlock::List(items)] => assert_eq!(items.len(), 2),
            other => panic!("expected a single list, got {other:?}"),
        }
        let entries = doc.sections[2]
            .blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::JobEntry { .. }))
            .count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_title_with_nested_braces_is_not_truncated() {
        let doc = parse(r"\section{Skills \textbf{and} {Tools}} body");
        assert_eq!(doc.sections[0].title, "Skills and Tools");
    }

    #[test]
    fn test_section_without_body_is_kept() {
        let doc = parse(r"\section{Awards}\section{Projects}");
        assert_eq!(doc.sections.len(), 2);
        assert!(doc.sections[0].blocks.is_empty());
        assert!(doc.sections[1].blocks.is_empty());
    }

    #[test]
    fn test_empty_title_section_is_dropped() {
        let (doc, report) = parse_with_report(r"\section{} lost \section{Kept} text");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Kept");
        assert!(report.contains(&Degradation::DroppedSection { index: 0 }));
    }

    #[test]
    fn test_unbalanced_title_is_reported() {
        let (doc, report) = parse_with_report(r"\section{Broken title");
        assert!(doc.sections.is_empty());
        assert!(matches!(
            report[..],
            [
                Degradation::MissingHeader,
                Degradation::MalformedMarkup { .. },
                Degradation::NoSections
            ]
        ));
    }

    #[test]
    fn test_unclosed_brace_before_sections_keeps_them() {
        let markup = "\\begin{center}{\\LARGE \\textbf{Jane}\\\\ a@b.c\\end{center}\n\
                      \\section{Experience}\nWork.\n\\section{Skills}\nRust.";
        let (doc, report) = parse_with_report(markup);
        assert_eq!(doc.header_name, "Jane");
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Experience", "Skills"]);
        assert_eq!(
            doc.sections[1].blocks,
            vec![ContentBlock::Paragraph(StyledText::from_plain("Rust."))]
        );
        assert!(report
            .iter()
            .any(|d| matches!(d, Degradation::MalformedMarkup { .. })));
        assert!(!report.contains(&Degradation::NoSections));
    }

    #[test]
    fn test_nested_fallback_ignores_section_references() {
        let markup =
            "\\titleformat{\\section}{\\bfseries}{}{0em}{}\n{\\bfseries \\section{Only}\nText.";
        let (doc, report) = parse_with_report(markup);
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Only"]);
        let malformed = report
            .iter()
            .filter(|d| matches!(d, Degradation::MalformedMarkup { .. }))
            .count();
        assert_eq!(malformed, 1);
    }

    #[test]
    fn test_starred_section_and_comments() {
        let doc = parse("% preamble comment\n\\section*{Projects} % trailing\nSolo work.");
        assert_eq!(doc.sections[0].title, "Projects");
        assert_eq!(
            doc.sections[0].blocks,
            vec![ContentBlock::Paragraph(StyledText::from_plain("Solo work."))]
        );
    }

    #[test]
    fn test_section_order_is_preserved() {
        let doc = parse(r"\section{B} x \section{A} y \section{C} z");
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_header_outside_center_block() {
        let doc = parse(r"\LARGE\textbf{Solo Name} \section{A}");
        assert_eq!(doc.header_name, "Solo Name");
        assert!(doc.contact_lines.is_empty());
    }
}
