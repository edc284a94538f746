use flashcard_pdf::builder::{FlashcardBuilder, RenderedPdf};
use flashcard_pdf::fonts;
use flashcard_pdf::model::Side;
use sha2::{Digest, Sha256};

const SKIP_HINT: &str =
    "fonts missing. Set FLASHCARDS_FONTS_DIR or install DejaVu Sans to run rendering tests.";

fn sample_builder() -> FlashcardBuilder {
    FlashcardBuilder::new()
        .with_title("Sample deck")
        .add_entry("amicus", "de vriend", "*amici, m*", "1")
        .add_entry("deus", "de god", "*dei, m*", "2")
        .add_entry("**dominus**", "de __meester__", "*domini, m*", "3")
        .add_entry("equus", "het paard", "", "")
        .add_entry("filius", "de zoon", "*filii, m*", "5")
        .add_entry("servus", "de slaaf", "*servi, m*", "6")
}

fn render(builder: &FlashcardBuilder) -> Option<RenderedPdf> {
    if !fonts::default_fonts_available() {
        return None;
    }
    Some(builder.render().expect("render flashcards"))
}

/// Values that change between runs: timestamps, the producer string and the random document ids.
const VOLATILE_FIELDS: &[(&[u8], &[u8])] = &[
    (b"/CreationDate(", b")"),
    (b"/ModDate(", b")"),
    (b"/Producer(", b")"),
    (b"/ID[", b"]"),
    (b"<xmp:CreateDate>", b"</"),
    (b"<xmp:ModifyDate>", b"</"),
    (b"<xmp:MetadataDate>", b"</"),
    (b"<xmpMM:DocumentID>", b"</"),
    (b"<xmpMM:InstanceID>", b"</"),
];

/// Blanks every volatile value, keeping delimiters so offsets and lengths stay intact.
fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    let mut data = bytes.to_vec();
    for (open, close) in VOLATILE_FIELDS {
        let mut from = 0;
        while let Some(found) = find(&data[from..], open) {
            let start = from + found + open.len();
            let Some(length) = find(&data[start..], close) else {
                break;
            };
            for byte in &mut data[start..start + length] {
                if !matches!(*byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            from = start + length;
        }
    }
    data
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_a_pdf_with_front_and_back_pages() {
    let Some(pdf) = render(&sample_builder()) else {
        eprintln!("Skipping renders_a_pdf_with_front_and_back_pages: {SKIP_HINT}");
        return;
    };
    assert!(pdf.bytes.starts_with(b"%PDF"), "output should be a PDF file");
    assert_eq!(pdf.pages.len(), 2);
    assert_eq!(pdf.pages[0].side(), Side::Front);
    assert_eq!(pdf.pages[1].side(), Side::Back);
}

#[test]
fn rendering_is_deterministic() {
    let builder = sample_builder();
    let (Some(pdf_a), Some(pdf_b)) = (render(&builder), render(&builder)) else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_HINT}");
        return;
    };

    assert_eq!(pdf_a.bytes.len(), pdf_b.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&pdf_a.bytes),
        normalized_hash(&pdf_b.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn overflowing_text_still_renders() {
    let builder = FlashcardBuilder::new()
        .with_card_height(genpdf::Mm::from(12))
        .add_entry(
            "a sentence that is far too long to fit on such a small card at any size",
            "kort",
            "*and a gloss that is long as well, wrapping over several lines*",
            "idx",
        );
    let Some(pdf) = render(&builder) else {
        eprintln!("Skipping overflowing_text_still_renders: {SKIP_HINT}");
        return;
    };
    assert!(!pdf.bytes.is_empty());
}

#[test]
fn multi_sheet_decks_render_every_page() {
    let builder = (1..=130).fold(FlashcardBuilder::new(), |builder, n| {
        builder.add_entry(format!("word {n}"), format!("woord {n}"), "", n.to_string())
    });
    let Some(pdf) = render(&builder) else {
        eprintln!("Skipping multi_sheet_decks_render_every_page: {SKIP_HINT}");
        return;
    };
    assert_eq!(pdf.pages.len(), 6);
    assert_eq!(pdf.pages[5].title(), "Sheet 3 (back)");
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_name_every_sheet_side() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping bookmarks_name_every_sheet_side: {SKIP_HINT}");
        return;
    }
    let pdf = sample_builder()
        .render_with_bookmarks()
        .expect("render with bookmarks");
    let document = lopdf::Document::load_mem(&pdf.bytes).expect("valid PDF");
    let titles: Vec<String> = document
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter_map(|dict| dict.get(b"Title").ok())
        .filter_map(|title| title.as_str().ok())
        .map(|title| String::from_utf8_lossy(title).into_owned())
        .collect();
    assert!(titles.contains(&"Sheet 1 (front)".to_owned()));
    assert!(titles.contains(&"Sheet 1 (back)".to_owned()));
}
