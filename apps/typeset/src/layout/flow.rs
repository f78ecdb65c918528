//! Turns a `Document` into the ordered flow the paginator consumes.
//!
//! The flow is a list of `FlowBlock`s: the header, one block per section start (gap, title,
//! rule, and the first content block) and one block per further content block. Each block
//! names how many leading items must land on the same page and the free space it needs
//! below the cursor before it may start.

use serde::Serialize;

use crate::errors::Degradation;
use crate::layout::page_config::PageConfig;
use crate::layout::wrap::{TypesetLine, Wrapper};
use crate::models::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FlowItem {
    Line(TypesetLine),
    /// Horizontal rule under the preceding line.
    Rule,
    /// Vertical space. Dropped at the top of a page.
    Gap(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowBlock {
    pub items: Vec<FlowItem>,
    /// Number of leading items placed as one unit.
    pub keep: usize,
    /// Free space required below the kept items.
    pub low_water: f32,
}

impl FlowBlock {
    pub fn lines(&self) -> impl Iterator<Item = &TypesetLine> {
        self.items.iter().filter_map(|item| match item {
            FlowItem::Line(line) => Some(line),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LaidOutDocument {
    pub blocks: Vec<FlowBlock>,
    pub degradations: Vec<Degradation>,
}

/// Wraps every part of `document` and groups the lines into flow blocks, in order.
pub fn layout_document(document: &Document, config: &PageConfig) -> LaidOutDocument {
    let mut wrapper = Wrapper::from_config(config);
    let mut blocks = Vec::new();

    let mut header: Vec<FlowItem> = wrapper
        .header(document, config.name_font_size)
        .into_iter()
        .map(FlowItem::Line)
        .collect();
    header.push(FlowItem::Gap(config.header_gap));
    blocks.push(FlowBlock {
        keep: header.len(),
        items: header,
        low_water: 0.0,
    });

    for section in &document.sections {
        let mut items = vec![FlowItem::Gap(config.section_gap)];
        items.extend(
            wrapper
                .section_title(&section.title, config.section_title_size)
                .into_iter()
                .map(FlowItem::Line),
        );
        items.push(FlowItem::Rule);
        items.push(FlowItem::Gap(config.title_gap));

        let mut wrapped = section
            .blocks
            .iter()
            .map(|block| wrapper.block(block))
            .filter(|w| !w.lines.is_empty());

        // The title travels with the kept lines of the first block.
        let mut keep = items.len();
        if let Some(first) = wrapped.next() {
            keep += first.keep;
            items.extend(first.lines.into_iter().map(FlowItem::Line));
        }
        blocks.push(FlowBlock {
            items,
            keep,
            low_water: config.section_low_water,
        });

        for block in wrapped {
            let mut items = vec![FlowItem::Gap(config.block_gap)];
            items.extend(block.lines.into_iter().map(FlowItem::Line));
            blocks.push(FlowBlock {
                items,
                keep: 1 + block.keep,
                low_water: config.line_low_water,
            });
        }
    }

    LaidOutDocument {
        blocks,
        degradations: wrapper.into_report(),
    }
}
