//! Static glyph-metric tables for the Helvetica base-14 family.
//!
//! Character widths are in em units (relative to font size), taken from the Adobe
//! core-font AFM files. Oblique faces share the advance widths of their upright face.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters), index = (char as usize) - 32.
//! A handful of WinAnsi punctuation glyphs (bullet, dashes, curly quotes) have explicit
//! widths; every other character is unmeasurable and gets `fallback_width`.
//!
//! The tables are read-only constant data and may be shared freely across threads.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

/// The four faces used by the renderer. A span's bold/italic flags pick exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    pub const ALL: [FontFace; 4] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Italic,
        FontFace::BoldItalic,
    ];

    pub fn from_style(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontFace::Regular,
            (true, false) => FontFace::Bold,
            (false, true) => FontFace::Italic,
            (true, true) => FontFace::BoldItalic,
        }
    }

    /// PostScript name of the base-14 font backing this face.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
            FontFace::BoldItalic => "Helvetica-BoldOblique",
        }
    }

    /// Name of the font in each page's resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
            FontFace::BoldItalic => "F4",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one upright weight.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// (bullet, en dash, em dash, single quote, double quote)
    punctuation: [f32; 5],
    /// Advance substituted for characters the table does not cover.
    pub fallback_width: f32,
}

impl FontMetricTable {
    /// Width in em units, or `None` when the glyph is not in the table.
    pub fn lookup(&self, ch: char) -> Option<f32> {
        let code = ch as usize;
        if (32..=126).contains(&code) {
            return Some(self.widths[code - 32]);
        }
        let [bullet, en_dash, em_dash, single_quote, double_quote] = self.punctuation;
        match ch {
            '\u{2022}' => Some(bullet),
            '\u{2013}' => Some(en_dash),
            '\u{2014}' => Some(em_dash),
            '\u{2018}' | '\u{2019}' => Some(single_quote),
            '\u{201C}' | '\u{201D}' => Some(double_quote),
            '\u{00A0}' => Some(self.widths[0]),
            _ => None,
        }
    }

    /// Width in em units; unmeasurable glyphs fall back to `fallback_width`.
    pub fn char_width(&self, ch: char) -> f32 {
        self.lookup(ch).unwrap_or(self.fallback_width)
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica / Helvetica-Oblique.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    punctuation: [0.350, 0.556, 1.000, 0.222, 0.333],
    fallback_width: 0.556,
};

/// Helvetica-Bold / Helvetica-BoldOblique.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    punctuation: [0.350, 0.556, 1.000, 0.278, 0.500],
    fallback_width: 0.556,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular | FontFace::Italic => &HELVETICA_TABLE,
        FontFace::Bold | FontFace::BoldItalic => &HELVETICA_BOLD_TABLE,
    }
}

/// Advance width of `ch` in user units at `size`.
pub fn width(ch: char, face: FontFace, size: f32) -> f32 {
    get_metrics(face).char_width(ch) * size
}

/// Advance width of `text` in user units at `size`.
pub fn measure(text: &str, face: FontFace, size: f32) -> f32 {
    get_metrics(face).measure_str(text) * size
}

/// True if every face has a real width for `ch` (no fallback substitution).
pub fn is_measurable(ch: char) -> bool {
    get_metrics(FontFace::Regular).lookup(ch).is_some()
}
