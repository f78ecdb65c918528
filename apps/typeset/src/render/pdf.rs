//! Encodes painted pages as a PDF document with lopdf.
//!
//! Every page shares one resource dictionary holding the four base-14 Helvetica faces
//! (F1..F4, WinAnsiEncoding). Text is encoded to WinAnsi; characters outside it become `?`.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, ObjectId, Stream, StringFormat};
use uuid::Uuid;

use crate::errors::RenderError;
use crate::layout::font_metrics::FontFace;
use crate::models::{Page, PaintOp};

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = "typeset";
const RULE_WIDTH: f32 = 0.5;

/// Document-level metadata written to the Info dictionary and trailer.
#[derive(Debug, Clone)]
pub struct PdfInfo {
    pub title: String,
    pub render_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Serializes `pages` into PDF bytes.
pub fn encode_pdf(pages: &[Page], info: &PdfInfo, compress: bool) -> Result<Vec<u8>, RenderError> {
    let mut doc = PdfDocument::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page);
        let stream = Stream::new(dictionary! {}, content.encode()?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info_dictionary(&mut doc, info);

    let file_id = Object::String(info.render_id.as_bytes().to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    if compress {
        doc.compress();
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn info_dictionary(doc: &mut PdfDocument, info: &PdfInfo) -> ObjectId {
    let created = info.created_at.format("D:%Y%m%d%H%M%SZ").to_string();
    doc.add_object(dictionary! {
        "Title" => Object::String(to_win_ansi(&info.title), StringFormat::Literal),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(created),
    })
}

/// Content stream operations for one page, in paint order.
fn page_content(page: &Page) -> Content {
    let mut operations = Vec::new();
    for op in page.paint_ops() {
        match op {
            PaintOp::ShowText {
                x,
                y,
                font,
                size,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font.resource_name().as_bytes().to_vec()),
                        (*size).into(),
                    ],
                ));
                operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            PaintOp::StrokeLine { x0, y0, x1, y1 } => {
                operations.push(Operation::new("w", vec![RULE_WIDTH.into()]));
                operations.push(Operation::new("m", vec![(*x0).into(), (*y0).into()]));
                operations.push(Operation::new("l", vec![(*x1).into(), (*y1).into()]));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }
    Content { operations }
}

/// Encodes text as WinAnsi (Windows-1252). Unmappable characters become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
