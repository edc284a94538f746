//! Data structures describing the content of a flashcard deck.
//!
//! An [`Entry`] keeps both the normalized markup of each field and the parsed run list, so the
//! values compare structurally while the renderer never has to look at markup again.

use crate::richtext::{normalize_markup, RichText};

/// One field of an entry: normalized tag text plus its parsed runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    markup: String,
    text: RichText,
}

impl Field {
    fn new(raw: &str) -> Self {
        let markup = normalize_markup(raw);
        let text = RichText::from_tagged(&markup);
        Self { markup, text }
    }

    /// Returns the normalized tag-language representation.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Returns the parsed runs.
    pub fn text(&self) -> &RichText {
        &self.text
    }

    /// Returns `true` when the field has no visible content.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn non_empty(&self) -> Option<&RichText> {
        (!self.is_empty()).then_some(&self.text)
    }
}

/// A single two-sided flashcard.
///
/// Markup is normalized once when a field is set; the entry is a plain value afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    original: Field,
    translation: Field,
    extra: Field,
    index: Field,
}

impl Entry {
    /// Creates an entry with the front text and its translation.
    pub fn new(original: impl AsRef<str>, translation: impl AsRef<str>) -> Self {
        Self {
            original: Field::new(original.as_ref()),
            translation: Field::new(translation.as_ref()),
            ..Self::default()
        }
    }

    /// Creates the empty entry used to pad incomplete rows.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Sets the gloss printed below the front text and returns the updated entry.
    pub fn with_extra(mut self, extra: impl AsRef<str>) -> Self {
        self.extra = Field::new(extra.as_ref());
        self
    }

    /// Sets the index label and returns the updated entry.
    pub fn with_index(mut self, index: impl AsRef<str>) -> Self {
        self.index = Field::new(index.as_ref());
        self
    }

    /// Front-side primary text.
    pub fn original(&self) -> &Field {
        &self.original
    }

    /// Back-side primary text.
    pub fn translation(&self) -> &Field {
        &self.translation
    }

    /// Gloss shown in small print on the front.
    pub fn extra(&self) -> &Field {
        &self.extra
    }

    /// Short label pinned to the bottom-right corner.
    pub fn index(&self) -> &Field {
        &self.index
    }

    /// Whether every field of the entry is empty.
    pub fn is_blank(&self) -> bool {
        self.original.is_empty()
            && self.translation.is_empty()
            && self.extra.is_empty()
            && self.index.is_empty()
    }

    /// Returns what the given side of the card shows.
    pub fn face(&self, side: Side) -> CardFace<'_> {
        match side {
            Side::Front => CardFace {
                primary: &self.original.text,
                gloss: self.extra.non_empty(),
                index: self.index.non_empty(),
            },
            Side::Back => CardFace {
                primary: &self.translation.text,
                gloss: None,
                index: self.index.non_empty(),
            },
        }
    }
}

/// Side of a printed sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Original text, gloss and index.
    Front,
    /// Translation and index.
    Back,
}

impl Side {
    /// Lowercase label used in logs and bookmarks.
    pub fn label(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

/// The content one cell shows for one side of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardFace<'a> {
    /// Centered main text.
    pub primary: &'a RichText,
    /// Smaller secondary text near the bottom, if any.
    pub gloss: Option<&'a RichText>,
    /// Corner label, if any.
    pub index: Option<&'a RichText>,
}

/// An ordered list of entries.  Position in the deck decides page, row and column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    entries: Vec<Entry>,
}

impl Deck {
    /// Creates an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Number of entries in the deck.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the deck has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in deck order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates the entries in deck order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}

impl From<Vec<Entry>> for Deck {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<Entry> for Deck {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<Entry> for Deck {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
