//! Places flow blocks on pages with a running vertical cursor, breaking to a new page as needed.
//!
//! # States
//! - `FillingPage`: items are placed on the current page, moving the cursor down.
//! - `NeedsNewPage`: entered when the next unit would need `cursor_y - required` below
//!   `margin + low_water`; resolved at once by closing the page and opening a blank one with
//!   the cursor reset to `height - margin`.
//!
//! A block's kept items (a section title with its first content) never straddle a break.
//! Lines after them are checked one by one, so a long block continues on the next page
//! while the lines already placed stay where they are. Pages are never revisited.

use serde::Serialize;
use tracing::debug;

use crate::layout::flow::{FlowBlock, FlowItem};
use crate::layout::page_config::PageConfig;
use crate::layout::wrap::TypesetLine;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Placement {
    Line { line: TypesetLine, baseline: f32 },
    Rule { y: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPage {
    pub placements: Vec<Placement>,
    /// Cursor after the last placed item.
    pub cursor_y: f32,
}

impl PlacedPage {
    fn blank(config: &PageConfig) -> Self {
        PlacedPage {
            placements: Vec::new(),
            cursor_y: config.top(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| matches!(p, Placement::Line { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaginatorState {
    FillingPage,
    NeedsNewPage,
}

/// Places every block in order. Always returns at least one page.
pub fn paginate(blocks: Vec<FlowBlock>, config: &PageConfig) -> Vec<PlacedPage> {
    let mut paginator = Paginator::new(config);
    for block in blocks {
        paginator.place_block(block);
    }
    paginator.finish()
}

struct Paginator<'a> {
    config: &'a PageConfig,
    state: PaginatorState,
    done: Vec<PlacedPage>,
    current: PlacedPage,
    last_baseline: f32,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Paginator {
            config,
            state: PaginatorState::FillingPage,
            done: Vec::new(),
            current: PlacedPage::blank(config),
            last_baseline: config.top(),
        }
    }

    fn place_block(&mut self, block: FlowBlock) {
        let keep = block.keep.min(block.items.len());
        let required = self.height_of(&block.items[..keep]);

        // A kept group taller than a whole page is placed line by line instead.
        let usable = self.config.top() - self.config.margin;
        let keep = if required <= usable { keep } else { 0 };
        if keep > 0 {
            self.ensure_room(required, block.low_water);
        }

        for (i, item) in block.items.into_iter().enumerate() {
            match item {
                FlowItem::Gap(gap) => self.skip(gap),
                FlowItem::Rule => self.place_rule(),
                FlowItem::Line(line) => {
                    if i >= keep {
                        let advance = self.config.line_advance(line.font_size);
                        self.ensure_room(advance, self.config.line_low_water);
                    }
                    self.place_line(line);
                }
            }
        }
    }

    fn finish(mut self) -> Vec<PlacedPage> {
        self.done.push(self.current);
        self.done
    }

    // ────────────────────────────────────────────────────────────────────────
    // State transitions
    // ────────────────────────────────────────────────────────────────────────

    fn ensure_room(&mut self, required: f32, low_water: f32) {
        if self.state == PaginatorState::FillingPage && !self.fits(required, low_water) {
            self.state = PaginatorState::NeedsNewPage;
        }
        if self.state == PaginatorState::NeedsNewPage {
            self.new_page();
        }
    }

    /// A blank page accepts anything, so an item taller than the page cannot loop.
    fn fits(&self, required: f32, low_water: f32) -> bool {
        self.current.placements.is_empty()
            || self.current.cursor_y - required >= self.config.margin + low_water
    }

    fn new_page(&mut self) {
        let full = std::mem::replace(&mut self.current, PlacedPage::blank(self.config));
        debug!(
            page = self.done.len() + 1,
            lines = full.line_count(),
            cursor_y = full.cursor_y,
            "Page break"
        );
        self.done.push(full);
        self.last_baseline = self.config.top();
        self.state = PaginatorState::FillingPage;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Placement
    // ────────────────────────────────────────────────────────────────────────

    fn place_line(&mut self, line: TypesetLine) {
        let baseline = self.current.cursor_y - line.font_size;
        self.current.cursor_y -= self.config.line_advance(line.font_size);
        self.last_baseline = baseline;
        self.current
            .placements
            .push(Placement::Line { line, baseline });
    }

    fn place_rule(&mut self) {
        let y = self.last_baseline - self.config.rule_offset;
        self.current.cursor_y = self.current.cursor_y.min(y).max(self.config.margin);
        self.current.placements.push(Placement::Rule { y });
    }

    fn skip(&mut self, gap: f32) {
        if !self.current.placements.is_empty() {
            self.current.cursor_y = (self.current.cursor_y - gap).max(self.config.margin);
        }
    }

    /// Vertical space consumed by `items` when placed mid-page.
    fn height_of(&self, items: &[FlowItem]) -> f32 {
        let mut height = 0.0_f32;
        let mut last_drop = 0.0_f32;
        for item in items {
            match item {
                FlowItem::Gap(gap) => height += gap,
                FlowItem::Line(line) => {
                    let advance = self.config.line_advance(line.font_size);
                    last_drop = height + line.font_size;
                    height += advance;
                }
                FlowItem::Rule => height = height.max(last_drop + self.config.rule_offset),
            }
        }
        height
    }
}
