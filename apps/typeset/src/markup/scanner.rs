//! Brace-aware scanning primitives shared by every extraction site.
//!
//! All brace-delimited arguments (`\section{..}`, `\textbf{..}`, `\href{..}{..}`) are read
//! through `Scanner::read_group`, a recursive-descent scanner that returns the exact balanced
//! span. Escaped braces (`\{`, `\}`) never change the nesting depth.
//!
//! Markup syntax characters are all ASCII, so the byte-level walks below never split a
//! multi-byte character when they slice.

/// Nesting limit for `read_group`. Deeper input is treated as unbalanced.
const MAX_GROUP_DEPTH: usize = 256;

// ────────────────────────────────────────────────────────────────────────────
// Scanner
// ────────────────────────────────────────────────────────────────────────────

/// A cursor over markup text. Failed reads leave the cursor where it was.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    pub fn at(src: &'a str, pos: usize) -> Self {
        Scanner {
            src,
            pos: pos.min(src.len()),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skips spaces and tabs but stops at a newline.
    pub fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() && c != '\n') {
            self.bump();
        }
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Name of the command at the cursor without consuming it.
    pub fn peek_command(&self) -> Option<&'a str> {
        command_name_at(self.src, self.pos)
    }

    /// Reads `\name` (letters) or a control symbol such as `\\` or `\%`.
    /// Returns the name without the leading backslash.
    pub fn read_command(&mut self) -> Option<&'a str> {
        let name = command_name_at(self.src, self.pos)?;
        self.pos += 1 + name.len();
        Some(name)
    }

    /// Reads `\name` only if it is exactly `expected`.
    pub fn eat_command(&mut self, expected: &str) -> bool {
        if self.peek_command() == Some(expected) {
            self.pos += 1 + expected.len();
            true
        } else {
            false
        }
    }

    /// Reads a balanced `{...}` group at the cursor and returns its inner text.
    pub fn read_group(&mut self) -> Option<&'a str> {
        if self.peek() != Some('{') {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        if self.scan_to_close(1).is_some() {
            Some(&self.src[start + 1..self.pos - 1])
        } else {
            self.pos = start;
            None
        }
    }

    /// Skips a `[...]` optional argument at the cursor (after optional whitespace).
    pub fn skip_optional_arg(&mut self) -> Option<&'a str> {
        let save = self.pos;
        self.skip_inline_whitespace();
        if self.peek() != Some('[') {
            self.pos = save;
            return None;
        }
        let start = self.pos + 1;
        self.bump();
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '{' => {
                    depth += 1;
                    self.bump();
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                ']' if depth == 0 => {
                    let inner = &self.src[start..self.pos];
                    self.bump();
                    return Some(inner);
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.pos = save;
        None
    }

    /// Consumes input up to and including the `}` that closes the current group.
    fn scan_to_close(&mut self, depth: usize) -> Option<()> {
        if depth > MAX_GROUP_DEPTH {
            return None;
        }
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '{' => {
                    self.bump();
                    self.scan_to_close(depth + 1)?;
                }
                '}' => {
                    self.bump();
                    return Some(());
                }
                _ => {
                    self.bump();
                }
            }
        }
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Command search
// ────────────────────────────────────────────────────────────────────────────

/// A command occurrence. `start` is the backslash, `end` is just past the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHit<'a> {
    pub start: usize,
    pub end: usize,
    pub name: &'a str,
    /// Brace nesting depth at the command.
    pub depth: usize,
}

/// Returns the command name for a backslash at `pos`, if any.
fn command_name_at(src: &str, pos: usize) -> Option<&str> {
    let bytes = src.as_bytes();
    if bytes.get(pos) != Some(&b'\\') {
        return None;
    }
    let name_start = pos + 1;
    let letters = bytes[name_start..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters > 0 {
        return Some(&src[name_start..name_start + letters]);
    }
    let symbol = src[name_start..].chars().next()?;
    Some(&src[name_start..name_start + symbol.len_utf8()])
}

/// Every command that sits at brace depth 0 of `src`, in source order.
///
/// Commands inside `{...}` groups (e.g. `\titleformat{\section}`) are not reported.
pub fn top_level_commands(src: &str) -> Vec<CommandHit<'_>> {
    commands(src).into_iter().filter(|h| h.depth == 0).collect()
}

/// Every command in `src` at any depth, in source order.
pub fn commands(src: &str) -> Vec<CommandHit<'_>> {
    let bytes = src.as_bytes();
    let mut hits = Vec::new();
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => match command_name_at(src, i) {
                Some(name) => {
                    let end = i + 1 + name.len();
                    hits.push(CommandHit {
                        start: i,
                        end,
                        name,
                        depth,
                    });
                    i = end;
                }
                None => i += 1,
            },
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            _ => i += 1,
        }
    }
    hits
}

/// Splits `src` on top-level `\\` line breaks. A spacing argument (`\\[4pt]`) is dropped.
pub fn split_line_breaks(src: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last = 0usize;
    for hit in top_level_commands(src).into_iter().filter(|h| h.name == "\\") {
        if hit.start < last {
            continue;
        }
        parts.push(&src[last..hit.start]);
        let mut sc = Scanner::at(src, hit.end);
        sc.skip_optional_arg();
        last = sc.pos();
    }
    parts.push(&src[last..]);
    parts
}

/// Finds the `\end{env}` matching a `\begin{env}` whose argument ended at `from`.
///
/// Returns `(end_start, end_after)`: the backslash of `\end` and the offset past `{env}`.
pub fn find_environment_end(src: &str, env: &str, from: usize) -> Option<(usize, usize)> {
    let mut nesting = 0usize;
    for hit in top_level_commands(&src[from..]) {
        if hit.name != "begin" && hit.name != "end" {
            continue;
        }
        let mut sc = Scanner::at(src, from + hit.end);
        sc.skip_inline_whitespace();
        if sc.read_group().map(str::trim) != Some(env) {
            continue;
        }
        if hit.name == "begin" {
            nesting += 1;
        } else if nesting == 0 {
            return Some((from + hit.start, sc.pos()));
        } else {
            nesting -= 1;
        }
    }
    None
}

/// Removes `%` line comments. Escaped `\%` is kept; comment-only lines vanish entirely.
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.split_inclusive('\n') {
        match unescaped_percent(line) {
            Some(idx) => {
                let kept = &line[..idx];
                if kept.trim().is_empty() {
                    continue;
                }
                out.push_str(kept);
                if line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(line),
        }
    }
    out
}

fn unescaped_percent(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        if b != b'%' {
            return None;
        }
        let backslashes = bytes[..i].iter().rev().take_while(|&&c| c == b'\\').count();
        (backslashes % 2 == 0).then_some(i)
    })
}
