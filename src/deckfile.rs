//! Plain-text deck files.
//!
//! One card per line, fields separated by tabs:
//!
//! ```text
//! # original<TAB>translation<TAB>extra<TAB>index
//! amicus	de vriend	*amici, m*	1
//! deus	de god
//! ```
//!
//! `extra` and `index` are optional.  Blank lines and lines starting with `#` are ignored.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::model::{Deck, Entry};

/// Errors reading a deck file.
#[derive(Debug)]
pub enum DeckFileError {
    /// The file could not be read.
    Io(io::Error),
    /// A card line has no translation field.
    MissingTranslation {
        /// 1-based line number.
        line: usize,
    },
}

impl fmt::Display for DeckFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => f.write_str("Failed to read deck file"),
            Self::MissingTranslation { line } => {
                write!(f, "line {line}: expected at least two tab-separated fields")
            }
        }
    }
}

impl std::error::Error for DeckFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::MissingTranslation { .. } => None,
        }
    }
}

impl From<io::Error> for DeckFileError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Parses deck text into entries, in file order.
pub fn parse_deck(text: &str) -> Result<Deck, DeckFileError> {
    let mut deck = Deck::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let mut fields = line.split('\t').map(str::trim);
        let original = fields.next().unwrap_or_default();
        let Some(translation) = fields.next() else {
            return Err(DeckFileError::MissingTranslation { line: number + 1 });
        };
        let extra = fields.next().unwrap_or_default();
        let index = fields.next().unwrap_or_default();

        deck.push(
            Entry::new(original, translation)
                .with_extra(extra)
                .with_index(index),
        );
    }

    Ok(deck)
}

/// Reads and parses the deck file at `path`.
pub fn load_deck(path: impl AsRef<Path>) -> Result<Deck, DeckFileError> {
    let text = fs::read_to_string(path)?;
    parse_deck(&text)
}
