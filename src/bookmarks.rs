//! Sheet outlines built on top of `lopdf`.
//!
//! Large decks span many sheets; the outline lets a reader jump straight to `Sheet 7 (back)` to
//! reprint a single damaged sheet.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::layout::Page;

/// Failures while adding the sheet outline.
#[derive(Debug)]
pub enum BookmarkError {
    /// `lopdf` could not read or write the document.
    Parse(lopdf::Error),
    /// The trailer has no `/Root` catalog reference.
    MissingCatalog,
    /// `/Root` does not point at a dictionary.
    InvalidCatalog,
    /// The laid out pages outnumber the pages in the PDF.
    MissingPage {
        /// 1-based page number without a PDF page object.
        page_number: usize,
    },
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(_) => f.write_str("cannot process rendered PDF"),
            Self::MissingCatalog => f.write_str("rendered PDF has no catalog"),
            Self::InvalidCatalog => f.write_str("rendered PDF catalog is not a dictionary"),
            Self::MissingPage { page_number } => {
                write!(f, "rendered PDF has no page {page_number}")
            }
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<io::Error> for BookmarkError {
    fn from(err: io::Error) -> Self {
        Self::Parse(err.into())
    }
}

/// Adds a two-level outline: one `Sheet N` entry per sheet, with its front and back pages as
/// children.
///
/// Page `n` of `pages` is expected to be page `n + 1` of the PDF, which holds as long as every
/// sheet fits on its paper.
pub fn apply_sheet_bookmarks(pdf_bytes: &[u8], pages: &[Page]) -> Result<Vec<u8>, BookmarkError> {
    if pages.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pdf_pages = document.get_pages();
    let sheets = group_by_sheet(&mut document, pages, &pdf_pages)?;

    let outlines_id = document.new_object_id();
    write_sheet_items(&mut document, outlines_id, &sheets);
    attach_outline(&mut document, outlines_id, &sheets)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineItem {
    id: ObjectId,
    title: String,
    target: ObjectId,
}

struct SheetOutline {
    number: usize,
    item: OutlineItem,
    sides: Vec<OutlineItem>,
}

fn page_object(
    pdf_pages: &BTreeMap<u32, ObjectId>,
    page_number: usize,
) -> Result<ObjectId, BookmarkError> {
    u32::try_from(page_number)
        .ok()
        .and_then(|number| pdf_pages.get(&number).copied())
        .ok_or(BookmarkError::MissingPage { page_number })
}

fn group_by_sheet(
    document: &mut Document,
    pages: &[Page],
    pdf_pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<SheetOutline>, BookmarkError> {
    let mut sheets: Vec<SheetOutline> = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        let target = page_object(pdf_pages, index + 1)?;

        if sheets.last().map_or(true, |sheet| sheet.number != page.sheet()) {
            sheets.push(SheetOutline {
                number: page.sheet(),
                item: OutlineItem {
                    id: document.new_object_id(),
                    title: format!("Sheet {}", page.sheet()),
                    target,
                },
                sides: Vec::with_capacity(2),
            });
        }

        let side = OutlineItem {
            id: document.new_object_id(),
            title: page.title(),
            target,
        };
        if let Some(sheet) = sheets.last_mut() {
            sheet.sides.push(side);
        }
    }

    Ok(sheets)
}

fn item_dictionary(
    item: &OutlineItem,
    parent: ObjectId,
    siblings: &[ObjectId],
    index: usize,
) -> Dictionary {
    let mut dictionary = Dictionary::new();
    dictionary.set("Title", Object::string_literal(item.title.as_str()));
    dictionary.set(
        "Dest",
        Object::Array(vec![
            Object::Reference(item.target),
            Object::Name("Fit".into()),
        ]),
    );
    dictionary.set("Parent", Object::Reference(parent));
    if let Some(prev) = index.checked_sub(1).and_then(|i| siblings.get(i)) {
        dictionary.set("Prev", Object::Reference(*prev));
    }
    if let Some(next) = siblings.get(index + 1) {
        dictionary.set("Next", Object::Reference(*next));
    }
    dictionary
}

fn link_children(dictionary: &mut Dictionary, children: &[ObjectId], visible: usize) {
    if let (Some(first), Some(last)) = (children.first(), children.last()) {
        dictionary.set("First", Object::Reference(*first));
        dictionary.set("Last", Object::Reference(*last));
        dictionary.set("Count", Object::Integer(visible as i64));
    }
}

fn write_sheet_items(document: &mut Document, outlines_id: ObjectId, sheets: &[SheetOutline]) {
    let sheet_ids: Vec<ObjectId> = sheets.iter().map(|sheet| sheet.item.id).collect();

    for (position, sheet) in sheets.iter().enumerate() {
        let side_ids: Vec<ObjectId> = sheet.sides.iter().map(|side| side.id).collect();

        let mut dictionary = item_dictionary(&sheet.item, outlines_id, &sheet_ids, position);
        link_children(&mut dictionary, &side_ids, side_ids.len());
        document
            .objects
            .insert(sheet.item.id, Object::Dictionary(dictionary));

        for (index, side) in sheet.sides.iter().enumerate() {
            let dictionary = item_dictionary(side, sheet.item.id, &side_ids, index);
            document.objects.insert(side.id, Object::Dictionary(dictionary));
        }
    }
}

fn attach_outline(
    document: &mut Document,
    outlines_id: ObjectId,
    sheets: &[SheetOutline],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    let sheet_ids: Vec<ObjectId> = sheets.iter().map(|sheet| sheet.item.id).collect();
    let visible = sheets.iter().map(|sheet| 1 + sheet.sides.len()).sum();

    let mut root = Dictionary::new();
    root.set("Type", Object::Name("Outlines".into()));
    link_children(&mut root, &sheet_ids, visible);
    document.objects.insert(outlines_id, Object::Dictionary(root));

    Ok(())
}
