//! Output page model: each page owns a closed, append-only list of paint operations.

use serde::Serialize;

use crate::layout::font_metrics::FontFace;

/// A low-level drawing primitive in PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PaintOp {
    ShowText {
        x: f32,
        y: f32,
        font: FontFace,
        size: f32,
        text: String,
    },
    StrokeLine {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Cursor position after the last placed item.
    pub cursor_y: f32,
    paint_ops: Vec<PaintOp>,
}

impl Page {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Page {
            width,
            height,
            margin,
            cursor_y: height - margin,
            paint_ops: Vec::new(),
        }
    }

    /// Appends an operation. Written operations are never modified.
    pub fn push(&mut self, op: PaintOp) {
        self.paint_ops.push(op);
    }

    pub fn paint_ops(&self) -> &[PaintOp] {
        &self.paint_ops
    }

    pub fn text_ops(&self) -> impl Iterator<Item = &PaintOp> {
        self.paint_ops
            .iter()
            .filter(|op| matches!(op, PaintOp::ShowText { .. }))
    }
}
