//! Duplex flashcard sheets rendered to PDF.
//!
//! Entries are collected with a [`builder::FlashcardBuilder`], laid out by [`layout::paginate`]
//! into alternating front and back pages, and drawn with `genpdf`.  Back pages hold the same cards
//! with every row reversed, so a sheet printed double-sided on the long edge puts each translation
//! directly behind its original.

pub mod builder;
pub mod deckfile;
pub mod demos;
pub mod elements;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod richtext;
pub mod textfit;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;
