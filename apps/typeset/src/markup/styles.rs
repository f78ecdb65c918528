//! Style resolution: turns a raw markup fragment into `StyledText`.
//!
//! `\textbf{X}` makes X bold, `\textit{X}` / `\emph{X}` make X italic, `\href{URL}{LABEL}`
//! keeps LABEL, and escapes such as `\%` become literal characters. Unknown commands lose
//! their name but keep the text of their arguments. Whitespace runs collapse to one space,
//! styled like the first whitespace character of the run; leading and trailing
//! whitespace is dropped.

use crate::markup::scanner::Scanner;
use crate::models::StyledText;

/// Commands whose arguments are layout parameters, not displayable text.
const DROP_WITH_ARGS: &[&str] = &[
    "begin",
    "end",
    "hspace",
    "vspace",
    "label",
    "setlength",
    "usepackage",
    "documentclass",
    "geometry",
    "titleformat",
    "titlespacing",
    "pagestyle",
];

/// Commands that separate words.
const SPACING: &[&str] = &["\\", "hfill", "newline", "quad", "qquad", "item", "par", "linebreak"];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Style {
    bold: bool,
    italic: bool,
}

/// Resolves markup into styled spans covering the displayable text.
pub fn resolve(src: &str) -> StyledText {
    let mut builder = SpanBuilder::default();
    resolve_into(src, Style::default(), &mut builder);
    builder.text
}

/// Resolves markup and returns only the displayable text.
pub fn resolve_plain(src: &str) -> String {
    resolve(src).plain_text()
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution walk
// ────────────────────────────────────────────────────────────────────────────

fn resolve_into(src: &str, mut style: Style, out: &mut SpanBuilder) {
    let mut sc = Scanner::new(src);
    while let Some(c) = sc.peek() {
        match c {
            '\\' => {
                let Some(name) = sc.read_command() else {
                    sc.bump();
                    continue;
                };
                apply_command(name, &mut sc, &mut style, out);
            }
            '{' => match sc.read_group() {
                Some(inner) => resolve_into(inner, style, out),
                None => {
                    sc.bump();
                }
            },
            '}' | '$' => {
                sc.bump();
            }
            '~' => {
                sc.bump();
                out.push_space(style);
            }
            c if c.is_whitespace() => {
                sc.bump();
                out.push_space(style);
            }
            c => {
                sc.bump();
                out.push_char(c, style);
            }
        }
    }
}

fn apply_command(name: &str, sc: &mut Scanner<'_>, style: &mut Style, out: &mut SpanBuilder) {
    match name {
        "textbf" => styled_argument(sc, Style { bold: true, ..*style }, out),
        "textit" | "emph" => styled_argument(sc, Style { italic: true, ..*style }, out),
        "bfseries" | "bf" => style.bold = true,
        "itshape" | "it" | "em" => style.italic = true,
        "href" => {
            let first = sc.read_group();
            match sc.read_group() {
                Some(label) => resolve_into(label, *style, out),
                None => {
                    if let Some(only) = first {
                        resolve_into(only, *style, out);
                    }
                }
            }
        }
        "%" | "&" | "$" | "#" | "_" | "{" | "}" => {
            if let Some(c) = name.chars().next() {
                out.push_char(c, *style);
            }
        }
        "," | ";" | " " => out.push_space(*style),
        n if SPACING.contains(&n) => {
            sc.skip_optional_arg();
            out.push_space(*style);
        }
        n if DROP_WITH_ARGS.contains(&n) => {
            if sc.peek() == Some('*') {
                sc.bump();
            }
            sc.skip_optional_arg();
            while sc.read_group().is_some() {}
        }
        n if n.chars().all(|c| c.is_ascii_alphabetic()) => {
            // Unknown command: the name goes, argument text stays.
            sc.skip_optional_arg();
            while let Some(arg) = sc.read_group() {
                resolve_into(arg, *style, out);
            }
        }
        // Accents and other control symbols.
        _ => {}
    }
}

fn styled_argument(sc: &mut Scanner<'_>, style: Style, out: &mut SpanBuilder) {
    if let Some(arg) = sc.read_group() {
        resolve_into(arg, style, out);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Span builder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SpanBuilder {
    text: StyledText,
    pending_space: Option<Style>,
}

impl SpanBuilder {
    fn push_char(&mut self, c: char, style: Style) {
        if let Some(space_style) = self.pending_space.take() {
            self.text.push(" ", space_style.bold, space_style.italic);
        }
        let mut buf = [0u8; 4];
        self.text.push(c.encode_utf8(&mut buf), style.bold, style.italic);
    }

    fn push_space(&mut self, style: Style) {
        if self.pending_space.is_none() && !self.text.is_empty() {
            self.pending_space = Some(style);
        }
    }
}
