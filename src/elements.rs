//! `genpdf` elements that draw flashcard sheets.
//!
//! [`CardSheet`] renders one [`Page`] as a grid of framed cells, and [`CardCell`] renders a single
//! [`CardFace`] inside its cell: centered main text that shrinks to fit, an optional gloss near the
//! bottom and an optional index label in the bottom-right corner.  Underlines are drawn as thin
//! strokes since `genpdf` styles cannot express them.

use genpdf::error::Error;
use genpdf::fonts::FontCache;
use genpdf::style::Style;
use genpdf::{render, Element, Mm, Position, RenderResult, Size};
use log::warn;

use crate::layout::{Geometry, Page};
use crate::model::CardFace;
use crate::richtext::RichText;
use crate::textfit::{self, FitOptions, FittedLine, FittedText, TextMetrics};

const MM_PER_PT: f64 = 25.4 / 72.0;

/// Starting size of the main text.
pub const MAIN_FONT_SIZE: u8 = 10;
/// The main text never shrinks below this size.
pub const MIN_FONT_SIZE: u8 = 6;
/// Size of the gloss printed under the main text.
pub const GLOSS_FONT_SIZE: u8 = 8;
/// Size of the index label.
pub const INDEX_FONT_SIZE: u8 = 6;

const RESERVED_LEADING_PT: f64 = 12.0;
const GLOSS_CENTER_FROM_BOTTOM_PT: f64 = 17.0;
const INDEX_INSET_PT: f64 = 2.0;
const TEXT_INSET_PT: f64 = 2.0;
const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.4;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn pt(value: f64) -> f64 {
    value * MM_PER_PT
}

impl TextMetrics for FontCache {
    fn text_width(&self, text: &str, style: Style) -> f64 {
        mm_to_f64(style.str_width(self, text))
    }

    fn line_height(&self, style: Style) -> f64 {
        mm_to_f64(style.line_height(self))
    }
}

/// Prints one wrapped line with its top edge at `(x, y)` and strokes underlined spans.
///
/// Lines that would cross the bottom of `area` are skipped, which clips overflowing text.
fn print_line(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    line: &FittedLine,
    font_size: u8,
    base: Style,
) -> Result<(), Error> {
    if line.spans.is_empty() {
        return Ok(());
    }

    let line_style = base.and(Style::new().with_font_size(font_size));
    let mut prepared: Vec<(Style, bool, f64)> = Vec::with_capacity(line.spans.len());
    let mut max_glyph_height = Mm::default();
    for span in &line.spans {
        let style = base.and(span.style(font_size));
        let width = context.font_cache.text_width(span.text(), style);
        let glyph_height = style.font(&context.font_cache).glyph_height(font_size);
        max_glyph_height = max_glyph_height.max(glyph_height);
        prepared.push((style, span.is_underlined(), width));
    }

    let position = Position::new(mm_from_f64(x), mm_from_f64(y));
    let Some(mut section) = area.text_section(&context.font_cache, position, line_style) else {
        return Ok(());
    };
    for (span, (style, _, _)) in line.spans.iter().zip(&prepared) {
        section.print_str(span.text(), *style)?;
    }
    drop(section);

    let baseline = y + mm_to_f64(max_glyph_height) + DEFAULT_UNDERLINE_OFFSET_MM;
    let mut cursor = x;
    for (style, underline, width) in &prepared {
        if *underline {
            let mut stroke = Style::new();
            if let Some(color) = style.color().or(base.color()) {
                stroke = stroke.with_color(color);
            }
            area.draw_line(
                vec![
                    Position::new(mm_from_f64(cursor), mm_from_f64(baseline)),
                    Position::new(mm_from_f64(cursor + width), mm_from_f64(baseline)),
                ],
                stroke,
            );
        }
        cursor += width;
    }

    Ok(())
}

/// Draws a framed card face of a fixed size.
pub struct CardCell<'a> {
    face: CardFace<'a>,
    width: f64,
    height: f64,
}

impl<'a> CardCell<'a> {
    /// Creates a cell of `width` by `height` millimetres.
    pub fn new(face: CardFace<'a>, width: f64, height: f64) -> Self {
        Self {
            face,
            width,
            height,
        }
    }

    fn text_width(&self) -> f64 {
        (self.width - 2.0 * pt(TEXT_INSET_PT)).max(0.0)
    }

    /// Fits the main text into the space left after reserving room for gloss and index.
    pub fn fit_primary(&self, metrics: &dyn TextMetrics) -> FittedText {
        let budget = (self.height - 2.0 * pt(RESERVED_LEADING_PT)).max(0.0);
        textfit::fit_text(
            self.face.primary,
            metrics,
            self.text_width(),
            budget,
            FitOptions::shrinking(MAIN_FONT_SIZE, MIN_FONT_SIZE),
        )
    }

    fn fit_gloss(&self, gloss: &RichText, metrics: &dyn TextMetrics) -> FittedText {
        textfit::fit_text(
            gloss,
            metrics,
            self.text_width(),
            pt(RESERVED_LEADING_PT),
            FitOptions::fixed(GLOSS_FONT_SIZE),
        )
    }

    fn draw_centered(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        fitted: &FittedText,
        top: f64,
        style: Style,
    ) -> Result<(), Error> {
        for (row, line) in fitted.lines.iter().enumerate() {
            let x = (self.width - line.width) / 2.0;
            let y = top + row as f64 * fitted.line_height;
            print_line(context, area, x, y, line, fitted.font_size, style)?;
        }
        Ok(())
    }

    fn draw_index(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        index: &RichText,
        style: Style,
    ) -> Result<(), Error> {
        let lines = textfit::wrap(index, &context.font_cache, f64::INFINITY, INDEX_FONT_SIZE);
        let index_style = style.and(Style::new().with_font_size(INDEX_FONT_SIZE));
        let glyph_height = mm_to_f64(
            index_style
                .font(&context.font_cache)
                .glyph_height(INDEX_FONT_SIZE),
        );
        let line_height = context.font_cache.line_height(index_style);

        let baseline = self.height - pt(INDEX_INSET_PT);
        for (from_bottom, line) in lines.iter().rev().enumerate() {
            let x = self.width - pt(INDEX_INSET_PT) - line.width;
            let y = baseline - glyph_height - from_bottom as f64 * line_height;
            print_line(context, area, x, y, line, INDEX_FONT_SIZE, style)?;
        }
        Ok(())
    }
}

impl Element for CardCell<'_> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let primary = self.fit_primary(&context.font_cache);
        if primary.overflows {
            warn!(
                "card text {:?} does not fit at {}pt and will be clipped",
                self.face.primary.plain_text(),
                primary.font_size
            );
        }
        let top = ((self.height - primary.height()) / 2.0).max(0.0);
        self.draw_centered(context, &area, &primary, top, style)?;

        if let Some(gloss) = self.face.gloss {
            let fitted = self.fit_gloss(gloss, &context.font_cache);
            let center = self.height - pt(GLOSS_CENTER_FROM_BOTTOM_PT);
            let top = center - fitted.height() / 2.0;
            self.draw_centered(context, &area, &fitted, top, style)?;
        }

        if let Some(index) = self.face.index {
            self.draw_index(context, &area, index, style)?;
        }

        let mut result = RenderResult::default();
        result.size = Size::new(mm_from_f64(self.width), mm_from_f64(self.height));
        Ok(result)
    }
}

/// Draws one side of a sheet: every row centered on the physical page, every cell framed.
///
/// Rows are centered around the middle of the paper rather than the middle of the printable area,
/// so front and back grids mirror each other even with unequal left and right margins.
pub struct CardSheet {
    page: Page,
    geometry: Geometry,
    center_x: f64,
}

impl CardSheet {
    /// Creates a sheet element.
    ///
    /// `center_x` is the horizontal middle of the paper measured from the left edge of the
    /// printable area, in millimetres.
    pub fn new(page: Page, geometry: Geometry, center_x: f64) -> Self {
        Self {
            page,
            geometry,
            center_x,
        }
    }

    /// Returns the page drawn by this element.
    pub fn page(&self) -> &Page {
        &self.page
    }

    fn draw_frame(area: &render::Area<'_>, width: f64, height: f64) {
        let (w, h) = (mm_from_f64(width), mm_from_f64(height));
        let zero = Mm::default();
        area.draw_line(
            vec![
                Position::new(zero, zero),
                Position::new(w, zero),
                Position::new(w, h),
                Position::new(zero, h),
                Position::new(zero, zero),
            ],
            Style::new(),
        );
    }
}

impl Element for CardSheet {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let Geometry {
            card_width,
            card_height,
            ..
        } = self.geometry;
        let side = self.page.side();

        let total_height = self.page.rows().len() as f64 * card_height;
        let available = mm_to_f64(area.size().height);
        if total_height > available {
            warn!(
                "{} needs {:.1} mm but only {:.1} mm are printable; the last rows run into the margin",
                self.page.title(),
                total_height,
                available
            );
        }

        for (row_index, row) in self.page.rows().iter().enumerate() {
            let y = row_index as f64 * card_height;
            let x0 = self.center_x - row.len() as f64 * card_width / 2.0;

            for (column, entry) in row.iter().enumerate() {
                let mut cell_area = area.clone();
                cell_area.add_offset(Position::new(
                    mm_from_f64(x0 + column as f64 * card_width),
                    mm_from_f64(y),
                ));
                cell_area.set_height(mm_from_f64(card_height));

                Self::draw_frame(&cell_area, card_width, card_height);
                CardCell::new(entry.face(side), card_width, card_height).render(
                    context,
                    cell_area,
                    style,
                )?;
            }
        }

        let mut result = RenderResult::default();
        result.size = Size::new(area.size().width, mm_from_f64(total_height));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Side};
    use crate::textfit::tests::FixedMetrics;

    #[test]
    fn mm_conversions_round_trip() {
        assert!((mm_to_f64(mm_from_f64(12.5)) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn primary_text_uses_default_size_when_it_fits() {
        let entry = Entry::new("amicus", "de vriend");
        let cell = CardCell::new(entry.face(Side::Front), 40.0, 23.0);
        let fitted = cell.fit_primary(&FixedMetrics);
        assert_eq!(fitted.font_size, MAIN_FONT_SIZE);
        assert_eq!(fitted.lines.len(), 1);
    }

    #[test]
    fn oversized_primary_text_shrinks_without_error() {
        let entry = Entry::new(
            "curia, the senate house of Rome where the senators met to debate",
            "",
        );
        let cell = CardCell::new(entry.face(Side::Front), 40.0, 23.0);
        let fitted = cell.fit_primary(&FixedMetrics);
        assert!(fitted.font_size < MAIN_FONT_SIZE);
        assert!(fitted.font_size >= MIN_FONT_SIZE);
    }

    #[test]
    fn tiny_cells_fall_back_to_the_floor_size() {
        let entry = Entry::new("a very long text that cannot possibly fit", "");
        let cell = CardCell::new(entry.face(Side::Front), 10.0, 5.0);
        let fitted = cell.fit_primary(&FixedMetrics);
        assert_eq!(fitted.font_size, MIN_FONT_SIZE);
        assert!(fitted.overflows);
    }
}
