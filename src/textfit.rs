//! Word wrapping and shrink-to-fit for styled runs.
//!
//! Measurements go through [`TextMetrics`] so the algorithm can be exercised without font files;
//! the element layer implements the trait for `genpdf`'s font cache.  All lengths are
//! millimetres.

use genpdf::style::Style;

use crate::richtext::{RichText, Span};

/// Measures text for a given style (font variant and size).
pub trait TextMetrics {
    /// Advance width of `text` in millimetres.
    fn text_width(&self, text: &str, style: Style) -> f64;

    /// Distance between two baselines in millimetres.
    fn line_height(&self, style: Style) -> f64;
}

/// Font size limits for one block of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitOptions {
    /// Size tried first, in points.
    pub max_size: u8,
    /// Smallest size the text may shrink to, in points.
    pub min_size: u8,
}

impl FitOptions {
    /// Shrinks from `max_size` down to `min_size` as needed.
    pub fn shrinking(max_size: u8, min_size: u8) -> Self {
        Self {
            max_size,
            min_size: min_size.min(max_size),
        }
    }

    /// Always uses the same size.
    pub fn fixed(size: u8) -> Self {
        Self::shrinking(size, size)
    }
}

/// A wrapped line of merged spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FittedLine {
    /// Spans in drawing order; neighbours never share the same style.
    pub spans: Vec<Span>,
    /// Measured width in millimetres.
    pub width: f64,
}

impl FittedLine {
    /// Concatenated text of the line.
    pub fn text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }
}

/// The result of fitting text into a box.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    /// Chosen font size in points.
    pub font_size: u8,
    /// Baseline distance at the chosen size.
    pub line_height: f64,
    /// Wrapped lines.
    pub lines: Vec<FittedLine>,
    /// Set when the text is still too tall at the smallest size.
    pub overflows: bool,
}

impl FittedText {
    /// Total height of the wrapped block.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }
}

/// A whitespace-delimited word, possibly made of several differently styled parts.
struct Word {
    parts: Vec<Span>,
    space_before: Option<Span>,
}

fn split_words(paragraph: &[Span]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut parts: Vec<Span> = Vec::new();
    let mut pending_space: Option<Span> = None;

    for span in paragraph {
        let mut buffer = String::new();
        for ch in span.text().chars() {
            if ch.is_whitespace() {
                if !buffer.is_empty() {
                    parts.push(span.with_text(std::mem::take(&mut buffer)));
                }
                finish_word(&mut parts, &mut pending_space, &mut words);
                if pending_space.is_none() {
                    pending_space = Some(span.with_text(" "));
                }
            } else {
                buffer.push(ch);
            }
        }
        if !buffer.is_empty() {
            parts.push(span.with_text(buffer));
        }
    }
    finish_word(&mut parts, &mut pending_space, &mut words);

    words
}

fn finish_word(parts: &mut Vec<Span>, pending_space: &mut Option<Span>, words: &mut Vec<Word>) {
    if !parts.is_empty() {
        words.push(Word {
            parts: std::mem::take(parts),
            space_before: pending_space.take(),
        });
    }
}

fn push_merged(spans: &mut Vec<Span>, span: &Span) {
    match spans.last_mut() {
        Some(last) if last.same_style(span) => {
            *last = last.with_text(format!("{}{}", last.text(), span.text()));
        }
        _ => spans.push(span.clone()),
    }
}

fn measure(spans: &[Span], metrics: &dyn TextMetrics, font_size: u8) -> f64 {
    spans
        .iter()
        .map(|span| metrics.text_width(span.text(), span.style(font_size)))
        .sum()
}

fn finish_line(spans: Vec<Span>, metrics: &dyn TextMetrics, font_size: u8) -> FittedLine {
    let width = measure(&spans, metrics, font_size);
    FittedLine { spans, width }
}

/// Greedily wraps every paragraph of `text` to `max_width` at `font_size`.
///
/// A word that is wider than `max_width` on its own is placed on a line by itself.  Empty
/// paragraphs (consecutive hard breaks) produce empty lines.
pub fn wrap(
    text: &RichText,
    metrics: &dyn TextMetrics,
    max_width: f64,
    font_size: u8,
) -> Vec<FittedLine> {
    let mut lines = Vec::new();

    for paragraph in text.paragraphs() {
        let mut current: Vec<Span> = Vec::new();
        let mut current_width = 0.0;

        for word in split_words(paragraph) {
            let word_width = measure(&word.parts, metrics, font_size);

            if current.is_empty() {
                current_width = word_width;
            } else {
                let space_width = word
                    .space_before
                    .as_ref()
                    .map(|space| metrics.text_width(space.text(), space.style(font_size)))
                    .unwrap_or_default();
                if current_width + space_width + word_width <= max_width {
                    if let Some(space) = &word.space_before {
                        push_merged(&mut current, space);
                    }
                    current_width += space_width + word_width;
                } else {
                    lines.push(finish_line(std::mem::take(&mut current), metrics, font_size));
                    current_width = word_width;
                }
            }

            for part in &word.parts {
                push_merged(&mut current, part);
            }
        }

        lines.push(finish_line(current, metrics, font_size));
    }

    lines
}

/// Wraps `text` into a `max_width` by `max_height` box, shrinking the font one point at a time.
///
/// Never fails: if the text does not fit at `options.min_size` it is returned at that size with
/// [`FittedText::overflows`] set, and the caller draws it clipped.
pub fn fit_text(
    text: &RichText,
    metrics: &dyn TextMetrics,
    max_width: f64,
    max_height: f64,
    options: FitOptions,
) -> FittedText {
    let mut font_size = options.max_size;
    loop {
        let lines = wrap(text, metrics, max_width, font_size);
        let line_height = metrics.line_height(Style::new().with_font_size(font_size));
        let fitted = FittedText {
            font_size,
            line_height,
            lines,
            overflows: false,
        };

        if fitted.height() <= max_height {
            return fitted;
        }
        if font_size <= options.min_size {
            return FittedText {
                overflows: true,
                ..fitted
            };
        }
        font_size -= 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Monospaced fake: every character is half the font size wide (bold a bit wider), lines are
    /// 0.4 mm per point.
    pub(crate) struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn text_width(&self, text: &str, style: Style) -> f64 {
            let per_char = f64::from(style.font_size()) * if style.is_bold() { 0.6 } else { 0.5 };
            text.chars().count() as f64 * per_char
        }

        fn line_height(&self, style: Style) -> f64 {
            f64::from(style.font_size()) * 0.4
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let text = RichText::from_markup("de vriend");
        let lines = wrap(&text, &FixedMetrics, 100.0, 10);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "de vriend");
        assert!((lines[0].width - 45.0).abs() < 1e-9);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        // 5 mm per character at 10pt: "en de ezel" is exactly 50 mm wide.
        let text = RichText::from_markup("het paard en de ezel");
        let lines = wrap(&text, &FixedMetrics, 50.0, 10);
        let texts: Vec<_> = lines.iter().map(FittedLine::text).collect();
        assert_eq!(texts, vec!["het paard", "en de ezel"]);
    }

    #[test]
    fn long_word_gets_its_own_line() {
        let text = RichText::from_markup("a supercalifragilistic b");
        let lines = wrap(&text, &FixedMetrics, 20.0, 10);
        let texts: Vec<_> = lines.iter().map(FittedLine::text).collect();
        assert_eq!(texts, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn hard_breaks_come_before_wrapping() {
        let text = RichText::from_markup("one\ntwo<br/>three");
        let lines = wrap(&text, &FixedMetrics, 1000.0, 10);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn styles_survive_wrapping_and_merge() {
        let text = RichText::from_markup("**bold words** plain");
        let lines = wrap(&text, &FixedMetrics, 1000.0, 10);
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], Span::new("bold words").bold());
        assert_eq!(spans[1], Span::new(" plain"));
        // 10 bold chars at 6 mm plus 6 regular at 5 mm.
        assert!((lines[0].width - 90.0).abs() < 1e-9);
    }

    #[test]
    fn word_split_across_styles_stays_together() {
        let text = RichText::from_tagged("ami<b>cus</b> x");
        let lines = wrap(&text, &FixedMetrics, 35.0, 10);
        assert_eq!(lines[0].text(), "amicus");
        assert_eq!(lines[1].text(), "x");
    }

    #[test]
    fn underline_covers_inner_spaces() {
        let text = RichText::from_markup("__two words__");
        let lines = wrap(&text, &FixedMetrics, 1000.0, 10);
        assert_eq!(lines[0].spans, vec![Span::new("two words").underline()]);
    }

    #[test]
    fn fit_keeps_default_size_when_possible() {
        let text = RichText::from_markup("amicus");
        let fitted = fit_text(&text, &FixedMetrics, 40.0, 14.0, FitOptions::shrinking(10, 6));
        assert_eq!(fitted.font_size, 10);
        assert!(!fitted.overflows);
    }

    #[test]
    fn fit_shrinks_long_text() {
        let text = RichText::from_markup("de curia (Romeinse senaatsgebouw)");
        let fitted = fit_text(&text, &FixedMetrics, 40.0, 10.0, FitOptions::shrinking(10, 6));
        assert!(fitted.font_size < 10);
        assert!(fitted.font_size >= 6);
        assert!(fitted.height() <= 10.0);
        assert!(!fitted.overflows);
    }

    #[test]
    fn fit_degrades_to_floor_without_failing() {
        let text = RichText::from_markup(&"lorem ipsum ".repeat(50));
        let fitted = fit_text(&text, &FixedMetrics, 40.0, 8.0, FitOptions::shrinking(10, 6));
        assert_eq!(fitted.font_size, 6);
        assert!(fitted.overflows);
        assert!(!fitted.lines.is_empty());
    }

    #[test]
    fn fixed_size_never_shrinks() {
        let text = RichText::from_markup(&"word ".repeat(20));
        let fitted = fit_text(&text, &FixedMetrics, 40.0, 3.0, FitOptions::fixed(8));
        assert_eq!(fitted.font_size, 8);
        assert!(fitted.overflows);
    }

    #[test]
    fn empty_text_fits_trivially() {
        let fitted = fit_text(&RichText::default(), &FixedMetrics, 40.0, 10.0, FitOptions::fixed(10));
        assert!(fitted.lines.is_empty());
        assert!(!fitted.overflows);
    }
}
