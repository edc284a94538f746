//! Page layout for duplex flashcard sheets.
//!
//! [`paginate`] turns a [`Deck`] into alternating front and back [`Page`]s.  Back pages keep the
//! row order of their front page but reverse every row, so that after printing on both sides
//! (flip on the long edge) and cutting along the grid each card's two faces belong together.
//!
//! Everything here is measured in millimetres and is independent of fonts and of `genpdf`.

use std::fmt;

use log::debug;

use crate::model::{Deck, Entry, Side};

/// Horizontal space subtracted from every card's share of the page width.
pub const GUTTER_MM: f64 = 2.0;

/// Vertical space kept free at the top of every page before rows are counted.
pub const TOP_ALLOWANCE_MM: f64 = 10.0;

/// A4 portrait, the default sheet size.
pub const A4_MM: (f64, f64) = (210.0, 297.0);

const DEFAULT_MARGIN_MM: f64 = 5.0;
const DEFAULT_CARDS_PER_ROW: usize = 5;
const DEFAULT_CARD_HEIGHT_MM: f64 = 23.0;

/// Margins around the printable area, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeMargins {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

impl EdgeMargins {
    /// Uses the same margin on every edge.
    pub fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    fn values(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

impl Default for EdgeMargins {
    fn default() -> Self {
        Self::all(DEFAULT_MARGIN_MM)
    }
}

impl From<f64> for EdgeMargins {
    fn from(value: f64) -> Self {
        Self::all(value)
    }
}

/// `(top, right, bottom, left)`, the order CSS and `genpdf::Margins::trbl` use.
impl From<(f64, f64, f64, f64)> for EdgeMargins {
    fn from((top, right, bottom, left): (f64, f64, f64, f64)) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Sheet geometry and grid settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Sheet width in millimetres.
    pub page_width: f64,
    /// Sheet height in millimetres.
    pub page_height: f64,
    /// Printable-area margins.
    pub margins: EdgeMargins,
    /// Number of cards in a full row.
    pub cards_per_row: usize,
    /// Height of every card in millimetres.
    pub card_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4_MM.0,
            page_height: A4_MM.1,
            margins: EdgeMargins::default(),
            cards_per_row: DEFAULT_CARDS_PER_ROW,
            card_height: DEFAULT_CARD_HEIGHT_MM,
        }
    }
}

/// Card dimensions and grid capacity derived from a [`LayoutConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Width of one card cell.
    pub card_width: f64,
    /// Height of one card cell.
    pub card_height: f64,
    /// Cards in a full row.
    pub cards_per_row: usize,
    /// Rows per sheet side.
    pub rows_per_page: usize,
}

impl Geometry {
    /// Number of cards on one sheet side.
    pub fn cards_per_page(&self) -> usize {
        self.cards_per_row * self.rows_per_page
    }
}

/// Degenerate layout settings, reported before any page is produced.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// `cards_per_row` was zero.
    NoCardsPerRow,
    /// The sheet has a non-positive or non-finite dimension.
    InvalidPageSize {
        /// Requested width in millimetres.
        width: f64,
        /// Requested height in millimetres.
        height: f64,
    },
    /// The card height is non-positive or non-finite.
    InvalidCardHeight(f64),
    /// A margin is negative or non-finite, or the margins leave no printable area.
    InvalidMargins(EdgeMargins),
    /// Splitting the sheet width leaves no room for a card.
    CardWidthTooSmall {
        /// The computed card width in millimetres.
        card_width: f64,
    },
    /// The card height is not smaller than the usable height, which is the page height less the
    /// top allowance or less both vertical margins, whichever is smaller.
    NoRowsFit {
        /// The requested card height in millimetres.
        card_height: f64,
        /// The height available for rows in millimetres.
        usable_height: f64,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCardsPerRow => write!(f, "cards per row must be at least 1"),
            Self::InvalidPageSize { width, height } => {
                write!(f, "page size {width} x {height} mm is not usable")
            }
            Self::InvalidCardHeight(height) => {
                write!(f, "card height {height} mm must be a positive number")
            }
            Self::InvalidMargins(margins) => write!(
                f,
                "margins (top {}, right {}, bottom {}, left {} mm) leave no printable area",
                margins.top, margins.right, margins.bottom, margins.left
            ),
            Self::CardWidthTooSmall { card_width } => {
                write!(f, "computed card width {card_width:.2} mm is not positive")
            }
            Self::NoRowsFit {
                card_height,
                usable_height,
            } => write!(
                f,
                "card height {card_height} mm does not fit into the usable page height of {usable_height} mm"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl LayoutConfig {
    /// Validates the configuration and derives the card grid.
    pub fn geometry(&self) -> Result<Geometry, ConfigurationError> {
        if self.cards_per_row == 0 {
            return Err(ConfigurationError::NoCardsPerRow);
        }

        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.page_width) || !positive(self.page_height) {
            return Err(ConfigurationError::InvalidPageSize {
                width: self.page_width,
                height: self.page_height,
            });
        }
        if !positive(self.card_height) {
            return Err(ConfigurationError::InvalidCardHeight(self.card_height));
        }

        let margins = self.margins;
        let margins_valid = margins
            .values()
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
            && margins.left + margins.right < self.page_width
            && margins.top + margins.bottom < self.page_height;
        if !margins_valid {
            return Err(ConfigurationError::InvalidMargins(margins));
        }

        let card_width = self.page_width / self.cards_per_row as f64 - GUTTER_MM;
        if card_width <= 0.0 {
            return Err(ConfigurationError::CardWidthTooSmall { card_width });
        }

        let printable_height = self.page_height - margins.top - margins.bottom;
        let usable_height = (self.page_height - TOP_ALLOWANCE_MM).min(printable_height);
        if self.card_height >= usable_height {
            return Err(ConfigurationError::NoRowsFit {
                card_height: self.card_height,
                usable_height,
            });
        }
        let rows = (usable_height / self.card_height).floor();

        Ok(Geometry {
            card_width,
            card_height: self.card_height,
            cards_per_row: self.cards_per_row,
            rows_per_page: rows as usize,
        })
    }
}

/// One side of one printed sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    side: Side,
    sheet: usize,
    rows: Vec<Vec<Entry>>,
}

impl Page {
    /// Which side of the sheet this page is.
    pub fn side(&self) -> Side {
        self.side
    }

    /// 1-based sheet number; a front page and its back page share it.
    pub fn sheet(&self) -> usize {
        self.sheet
    }

    /// Rows of entries in the order they are drawn, left to right.
    pub fn rows(&self) -> &[Vec<Entry>] {
        &self.rows
    }

    /// Number of cards in each row.
    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Human readable label such as `Sheet 2 (back)`.
    pub fn title(&self) -> String {
        format!("Sheet {} ({})", self.sheet, self.side.label())
    }
}

/// Pads a deck that spans more than one row so that every row is full.
///
/// A deck that fits into a single row is returned as-is: a short lone row still lines up when
/// printed, while multi-row sheets need rectangular grids.
pub fn padded_entries(deck: &Deck, cards_per_row: usize) -> Vec<Entry> {
    let mut entries = deck.entries().to_vec();
    if cards_per_row > 0 && entries.len() > cards_per_row {
        let remainder = entries.len() % cards_per_row;
        if remainder != 0 {
            entries.resize(entries.len() + cards_per_row - remainder, Entry::blank());
        }
    }
    entries
}

/// Lays the deck out as alternating front and back pages.
///
/// The configuration is validated first; an invalid one fails without producing any page.  The
/// deck itself is not modified, so it can be laid out again with different settings.
pub fn paginate(deck: &Deck, config: &LayoutConfig) -> Result<Vec<Page>, ConfigurationError> {
    let geometry = config.geometry()?;
    let entries = padded_entries(deck, geometry.cards_per_row);
    let cards_per_page = geometry.cards_per_page();

    debug!(
        "laying out {} cards ({} after padding): {:.1} x {:.1} mm cards, {} per row, {} per page",
        deck.len(),
        entries.len(),
        geometry.card_width,
        geometry.card_height,
        geometry.cards_per_row,
        cards_per_page
    );

    let mut pages = Vec::new();
    for (chunk_index, chunk) in entries.chunks(cards_per_page).enumerate() {
        let sheet = chunk_index + 1;
        let front: Vec<Vec<Entry>> = chunk
            .chunks(geometry.cards_per_row)
            .map(<[Entry]>::to_vec)
            .collect();
        let back = front
            .iter()
            .map(|row| row.iter().rev().cloned().collect())
            .collect();

        pages.push(Page {
            side: Side::Front,
            sheet,
            rows: front,
        });
        pages.push(Page {
            side: Side::Back,
            sheet,
            rows: back,
        });
    }

    debug!("produced {} pages", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_matches_a4_grid() {
        let geometry = LayoutConfig::default().geometry().expect("valid config");
        assert!((geometry.card_width - 40.0).abs() < 1e-9);
        assert_eq!(geometry.rows_per_page, 12);
        assert_eq!(geometry.cards_per_page(), 60);
    }

    #[test]
    fn rejects_zero_cards_per_row() {
        let config = LayoutConfig {
            cards_per_row: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.geometry(), Err(ConfigurationError::NoCardsPerRow));
    }

    #[test]
    fn rejects_card_taller_than_usable_height() {
        let config = LayoutConfig {
            card_height: 300.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::NoRowsFit { .. })
        ));
    }

    #[test]
    fn rejects_card_as_tall_as_usable_height() {
        let config = LayoutConfig {
            card_height: 287.0,
            ..LayoutConfig::default()
        };
        assert_eq!(
            config.geometry(),
            Err(ConfigurationError::NoRowsFit {
                card_height: 287.0,
                usable_height: 287.0,
            })
        );

        let config = LayoutConfig {
            card_height: 286.0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.geometry().map(|g| g.rows_per_page), Ok(1));
    }

    #[test]
    fn vertical_margins_limit_rows() {
        let config = LayoutConfig {
            margins: EdgeMargins {
                top: 50.0,
                ..EdgeMargins::default()
            },
            ..LayoutConfig::default()
        };
        let geometry = config.geometry().expect("valid config");
        assert_eq!(geometry.rows_per_page, 10);

        let grid_bottom =
            config.margins.top + geometry.rows_per_page as f64 * geometry.card_height;
        assert!(grid_bottom <= config.page_height - config.margins.bottom);
    }

    #[test]
    fn margins_leaving_no_room_for_a_row_are_rejected() {
        let config = LayoutConfig {
            margins: EdgeMargins {
                top: 140.0,
                bottom: 140.0,
                ..EdgeMargins::default()
            },
            ..LayoutConfig::default()
        };
        match config.geometry() {
            Err(ConfigurationError::NoRowsFit { usable_height, .. }) => {
                assert!((usable_height - 17.0).abs() < 1e-9);
            }
            other => panic!("expected NoRowsFit, got {other:?}"),
        }
    }

    #[test]
    fn margins_convert_from_values_and_tuples() {
        assert_eq!(EdgeMargins::from(2.5), EdgeMargins::all(2.5));
        let margins = EdgeMargins::from((1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            (margins.top, margins.right, margins.bottom, margins.left),
            (1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let config = LayoutConfig {
            card_height: 0.0,
            ..LayoutConfig::default()
        };
        assert_eq!(
            config.geometry(),
            Err(ConfigurationError::InvalidCardHeight(0.0))
        );

        let config = LayoutConfig {
            page_width: -1.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::InvalidPageSize { .. })
        ));

        let config = LayoutConfig {
            page_height: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::InvalidPageSize { .. })
        ));
    }

    #[test]
    fn rejects_too_many_columns() {
        let config = LayoutConfig {
            cards_per_row: 200,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::CardWidthTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_margins_without_printable_area() {
        let config = LayoutConfig {
            margins: EdgeMargins {
                left: 110.0,
                right: 100.0,
                ..EdgeMargins::default()
            },
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::InvalidMargins(_))
        ));

        let config = LayoutConfig {
            margins: EdgeMargins {
                top: -1.0,
                ..EdgeMargins::default()
            },
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(ConfigurationError::InvalidMargins(_))
        ));
    }

    #[test]
    fn padding_fills_last_row_only_for_multi_row_decks() {
        let deck: Deck = (0..6).map(|i| Entry::new(i.to_string(), "")).collect();
        let padded = padded_entries(&deck, 5);
        assert_eq!(padded.len(), 10);
        assert!(padded[6..].iter().all(Entry::is_blank));

        let deck: Deck = (0..3).map(|i| Entry::new(i.to_string(), "")).collect();
        assert_eq!(padded_entries(&deck, 5).len(), 3);

        let deck: Deck = (0..10).map(|i| Entry::new(i.to_string(), "")).collect();
        assert_eq!(padded_entries(&deck, 5).len(), 10);
    }

    #[test]
    fn empty_deck_has_no_pages() {
        let pages = paginate(&Deck::new(), &LayoutConfig::default()).expect("valid config");
        assert!(pages.is_empty());
    }

    #[test]
    fn page_titles_name_sheet_and_side() {
        let deck: Deck = vec![Entry::new("a", "b")].into();
        let pages = paginate(&deck, &LayoutConfig::default()).expect("valid config");
        assert_eq!(pages[0].title(), "Sheet 1 (front)");
        assert_eq!(pages[1].title(), "Sheet 1 (back)");
    }
}
