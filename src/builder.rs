//! Fluent configuration of a flashcard document and its hand-off to `genpdf`.
//!
//! ```no_run
//! use flashcard_pdf::builder::FlashcardBuilder;
//!
//! let path = FlashcardBuilder::new()
//!     .with_output("Latin.pdf")
//!     .add_entry("amicus", "de vriend", "*amici, m*", "1")
//!     .add_entry("deus", "de god", "*dei, m*", "2")
//!     .generate()?;
//! # Ok::<(), flashcard_pdf::builder::FlashcardError>(())
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::elements::PageBreak;
use genpdf::error::Error;
use genpdf::style;
use genpdf::{self, Margins, Mm, PageDecorator, Size};
use log::{debug, info};

use crate::elements::{mm_from_f64, mm_to_f64, CardSheet};
use crate::fonts::FontTable;
use crate::layout::{self, ConfigurationError, EdgeMargins, LayoutConfig, Page};
use crate::model::{Deck, Entry};

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError};

/// Output file used when none is configured.
pub const DEFAULT_OUTPUT: &str = "flashcards.pdf";

/// Errors produced while generating a flashcard document.
#[derive(Debug)]
pub enum FlashcardError {
    /// The layout settings are degenerate.
    Configuration(ConfigurationError),
    /// The deck has no entries, so there is nothing to print.
    EmptyDeck,
    /// No usable font family could be loaded.
    Fonts(Error),
    /// `genpdf` failed while rendering the document.
    Render(Error),
    /// Writing the output file failed.
    Io(io::Error),
    /// Adding the outline to the rendered document failed.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl fmt::Display for FlashcardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(_) => f.write_str("Invalid layout"),
            Self::EmptyDeck => write!(f, "The deck contains no entries"),
            Self::Fonts(_) => f.write_str("Failed to load fonts"),
            Self::Render(_) => f.write_str("Failed to render PDF"),
            Self::Io(_) => f.write_str("Failed to write PDF"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => f.write_str("Failed to add bookmarks"),
        }
    }
}

impl std::error::Error for FlashcardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::EmptyDeck => None,
            Self::Fonts(err) | Self::Render(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for FlashcardError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}

impl From<io::Error> for FlashcardError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for FlashcardError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

/// A rendered document kept in memory.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// The PDF file contents.
    pub bytes: Vec<u8>,
    /// The pages in the order they appear in the document.
    pub pages: Vec<Page>,
}

/// Collects entries and layout settings, then renders duplex flashcard sheets.
///
/// Every setter consumes and returns the builder so calls can be chained.  Entries keep the order
/// in which they were added.
#[derive(Clone, Default)]
pub struct FlashcardBuilder {
    deck: Deck,
    output: Option<PathBuf>,
    config: LayoutConfig,
    fonts: Option<FontTable>,
    title: Option<String>,
}

impl FlashcardBuilder {
    /// Creates a builder with A4 paper, 5 mm margins, 5 cards per row and 23 mm tall cards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing deck.
    pub fn from_deck(deck: Deck) -> Self {
        Self {
            deck,
            ..Self::default()
        }
    }

    /// Sets the file written by [`generate`](Self::generate).
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the number of cards in a full row.
    pub fn with_cards_per_row(mut self, count: usize) -> Self {
        self.config.cards_per_row = count;
        self
    }

    /// Sets the paper size.
    pub fn with_page_size(mut self, size: impl Into<Size>) -> Self {
        let size = size.into();
        self.config.page_width = mm_to_f64(size.width);
        self.config.page_height = mm_to_f64(size.height);
        self
    }

    /// Sets all four margins at once, in millimetres.
    ///
    /// Accepts an [`EdgeMargins`], a single value for every edge, or a `(top, right, bottom, left)`
    /// tuple.
    pub fn with_margins(mut self, margins: impl Into<EdgeMargins>) -> Self {
        self.config.margins = margins.into();
        self
    }

    /// Overrides the top margin only.
    pub fn with_top_margin(mut self, margin: impl Into<Mm>) -> Self {
        self.config.margins.top = mm_to_f64(margin.into());
        self
    }

    /// Overrides the bottom margin only.
    pub fn with_bottom_margin(mut self, margin: impl Into<Mm>) -> Self {
        self.config.margins.bottom = mm_to_f64(margin.into());
        self
    }

    /// Overrides the left margin only.
    pub fn with_left_margin(mut self, margin: impl Into<Mm>) -> Self {
        self.config.margins.left = mm_to_f64(margin.into());
        self
    }

    /// Overrides the right margin only.
    pub fn with_right_margin(mut self, margin: impl Into<Mm>) -> Self {
        self.config.margins.right = mm_to_f64(margin.into());
        self
    }

    /// Sets the height of every card.
    pub fn with_card_height(mut self, height: impl Into<Mm>) -> Self {
        self.config.card_height = mm_to_f64(height.into());
        self
    }

    /// Replaces the whole layout configuration.
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses the given fonts instead of discovering them at render time.
    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Sets the PDF document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a card.  Empty `extra` or `index` strings leave the field unset.
    pub fn add_entry(
        self,
        original: impl AsRef<str>,
        translation: impl AsRef<str>,
        extra: impl AsRef<str>,
        index: impl AsRef<str>,
    ) -> Self {
        self.add(
            Entry::new(original, translation)
                .with_extra(extra)
                .with_index(index),
        )
    }

    /// Appends an already built entry.
    pub fn add(mut self, entry: Entry) -> Self {
        self.deck.push(entry);
        self
    }

    /// The entries added so far.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// The configured output path.
    pub fn output(&self) -> &Path {
        self.output
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT))
    }

    /// The current layout settings.
    pub fn layout_config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the deck without rendering anything.
    pub fn pages(&self) -> Result<Vec<Page>, ConfigurationError> {
        layout::paginate(&self.deck, &self.config)
    }

    /// Renders the document into memory.
    pub fn render(&self) -> Result<RenderedPdf, FlashcardError> {
        let geometry = self.config.geometry()?;
        let pages = layout::paginate(&self.deck, &self.config)?;
        if pages.is_empty() {
            return Err(FlashcardError::EmptyDeck);
        }

        let fonts = match &self.fonts {
            Some(fonts) => fonts.clone(),
            None => FontTable::discover().map_err(FlashcardError::Fonts)?,
        };
        debug!("rendering {} pages with the {} fonts", pages.len(), fonts.name());

        let mut document = genpdf::Document::new(fonts.family());
        document.set_paper_size(Size::new(
            mm_from_f64(self.config.page_width),
            mm_from_f64(self.config.page_height),
        ));
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }
        document.set_page_decorator(SheetDecorator::new(self.config.margins));

        let center_x = self.config.page_width / 2.0 - self.config.margins.left;
        let last = pages.len() - 1;
        for (position, page) in pages.iter().enumerate() {
            document.push(CardSheet::new(page.clone(), geometry, center_x));
            if position != last {
                document.push(PageBreak::new());
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(FlashcardError::Render)?;
        Ok(RenderedPdf { bytes, pages })
    }

    /// Renders the document and adds one outline entry per sheet side.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedPdf, FlashcardError> {
        let rendered = self.render()?;
        let bytes = bookmarks::apply_sheet_bookmarks(&rendered.bytes, &rendered.pages)?;
        Ok(RenderedPdf { bytes, ..rendered })
    }

    /// Renders the document and writes it to the output path, returning that path.
    ///
    /// An existing file is overwritten.  If writing fails, whatever was written stays on disk.
    pub fn generate(&self) -> Result<PathBuf, FlashcardError> {
        let rendered = self.render()?;
        self.write(rendered)
    }

    /// Like [`generate`](Self::generate), with an outline of the sheets.
    #[cfg(feature = "bookmarks")]
    pub fn generate_with_bookmarks(&self) -> Result<PathBuf, FlashcardError> {
        let rendered = self.render_with_bookmarks()?;
        self.write(rendered)
    }

    fn write(&self, rendered: RenderedPdf) -> Result<PathBuf, FlashcardError> {
        let path = self.output().to_path_buf();
        fs::write(&path, &rendered.bytes)?;
        info!(
            "wrote {} ({} pages, {} bytes)",
            path.display(),
            rendered.pages.len(),
            rendered.bytes.len()
        );
        Ok(path)
    }
}

/// Applies the sheet margins to every page.
struct SheetDecorator {
    page: usize,
    margins: Margins,
}

impl SheetDecorator {
    fn new(margins: EdgeMargins) -> Self {
        Self {
            page: 0,
            margins: Margins::trbl(
                mm_from_f64(margins.top),
                mm_from_f64(margins.right),
                mm_from_f64(margins.bottom),
                mm_from_f64(margins.left),
            ),
        }
    }
}

impl PageDecorator for SheetDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        debug!("starting PDF page {}", self.page);
        area.add_margins(self.margins);
        Ok(area)
    }
}
