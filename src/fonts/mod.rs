//! Font lookup for flashcard documents.
//!
//! Fonts are never registered globally.  A [`FontTable`] is loaded once and handed to the
//! [`FlashcardBuilder`](crate::builder::FlashcardBuilder); every generated document gets its own
//! copy, so documents with different fonts can be produced side by side.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Environment variable that points at a directory containing the font files.
pub const FONTS_DIR_ENV: &str = "FLASHCARDS_FONTS_DIR";

/// Name of the preferred font family, loaded with `genpdf`'s file naming scheme.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// Name of the fallback family found on most Linux systems.
pub const FALLBACK_FONT_FAMILY_NAME: &str = "DejaVuSans";

struct FamilyFiles {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }
}

const DEJAVU_FONT_FILES: FamilyFiles = FamilyFiles {
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
    "/Library/Fonts",
];

/// A loaded font family ready to be used by a document.
#[derive(Clone)]
pub struct FontTable {
    name: String,
    family: FontFamily<FontData>,
}

impl FontTable {
    /// Wraps an already loaded family.
    pub fn new(name: impl Into<String>, family: FontFamily<FontData>) -> Self {
        Self {
            name: name.into(),
            family,
        }
    }

    /// Loads the `Roboto` family from `directory`.
    pub fn from_directory(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let directory = directory.as_ref();
        let missing = missing_font_files(directory, FONT_FILES);
        if !missing.is_empty() {
            return Err(Error::new(
                format!(
                    "Missing font files in {}: {}",
                    directory.display(),
                    missing.join(", ")
                ),
                io::Error::new(io::ErrorKind::NotFound, "font files missing"),
            ));
        }

        let family =
            fonts::from_files(directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
                Error::new(
                    format!(
                        "Failed to load font family '{}' from {}: {}",
                        DEFAULT_FONT_FAMILY_NAME,
                        directory.display(),
                        err
                    ),
                    io::Error::new(io::ErrorKind::Other, err.to_string()),
                )
            })?;
        Ok(Self::new(DEFAULT_FONT_FAMILY_NAME, family))
    }

    /// Loads the DejaVu Sans family (regular, bold, oblique, bold oblique) from `directory`.
    pub fn dejavu(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let directory = directory.as_ref();
        let family = FontFamily {
            regular: load_font(directory, DEJAVU_FONT_FILES.regular, "regular")?,
            bold: load_font(directory, DEJAVU_FONT_FILES.bold, "bold")?,
            italic: load_font(directory, DEJAVU_FONT_FILES.italic, "italic")?,
            bold_italic: load_font(directory, DEJAVU_FONT_FILES.bold_italic, "bold italic")?,
        };
        Ok(Self::new(FALLBACK_FONT_FAMILY_NAME, family))
    }

    /// Loads fonts from `directory`, accepting either the Roboto or the DejaVu Sans files.
    pub fn from_any_directory(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let directory = directory.as_ref();
        if missing_font_files(directory, FONT_FILES).is_empty() {
            Self::from_directory(directory)
        } else {
            Self::dejavu(directory)
        }
    }

    /// Finds fonts in the usual places.
    ///
    /// Search order: `FLASHCARDS_FONTS_DIR`, `assets/fonts` next to the executable, the crate's
    /// `assets/fonts`, then DejaVu Sans in common system font directories.
    pub fn discover() -> Result<Self, Error> {
        match resolve_font_directory() {
            Ok(directory) => {
                debug!("loading fonts from {}", directory.display());
                Self::from_directory(directory)
            }
            Err(err) if fonts_missing(&err) => match system_fallback() {
                Ok(table) => {
                    warn!(
                        "Bundled fonts unavailable ({}); falling back to '{}'.",
                        err, FALLBACK_FONT_FAMILY_NAME
                    );
                    Ok(table)
                }
                Err(fallback_err) => {
                    warn!(
                        "Bundled fonts unavailable ({}); fallback failed: {}",
                        err, fallback_err
                    );
                    Err(Error::new(
                        format!(
                            "No usable fonts found. Set {} to a directory with {} or {} files: {}",
                            FONTS_DIR_ENV,
                            DEFAULT_FONT_FAMILY_NAME,
                            FALLBACK_FONT_FAMILY_NAME,
                            fallback_err
                        ),
                        io::Error::new(io::ErrorKind::NotFound, "fonts are not available"),
                    ))
                }
            },
            Err(err) => Err(err),
        }
    }

    /// Name of the loaded family.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of the family for a new document.
    pub fn family(&self) -> FontFamily<FontData> {
        self.family.clone()
    }
}

/// The crate's own `assets/fonts` directory.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path, files: &[&str]) -> Vec<String> {
    files
        .iter()
        .filter(|name| !path.join(name).is_file())
        .map(|name| (*name).to_owned())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate, FONT_FILES);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} fonts. Checked: {}",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", ")
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn system_fallback_directory() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = env_path(FONTS_DIR_ENV).into_iter().collect();
    candidates.extend(SYSTEM_FONT_DIRECTORIES.iter().map(PathBuf::from));
    candidates
        .into_iter()
        .find(|dir| missing_font_files(dir, &DEJAVU_FONT_FILES.all()).is_empty())
}

fn system_fallback() -> Result<FontTable, Error> {
    let directory = system_fallback_directory().ok_or_else(|| {
        Error::new(
            format!("{} not found in any system font directory", FALLBACK_FONT_FAMILY_NAME),
            io::Error::new(io::ErrorKind::NotFound, "fallback fonts not found"),
        )
    })?;
    FontTable::dejavu(directory)
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Indicates whether [`FontTable::discover`] can find a usable family.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok() || system_fallback_directory().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_reports_not_found() {
        let err = FontTable::from_directory("/__flashcards_missing_fonts__")
            .err()
            .expect("loading from a missing directory fails");
        assert!(fonts_missing(&err));
    }

    #[test]
    fn dejavu_from_missing_directory_fails() {
        assert!(FontTable::dejavu("/__flashcards_missing_fonts__").is_err());
    }

    #[test]
    fn candidates_include_manifest_directory() {
        assert!(font_directory_candidates().contains(&bundled_fonts_source_dir()));
    }
}
