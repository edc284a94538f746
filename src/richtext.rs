//! Inline markup handling for flashcard text.
//!
//! Card fields accept a tiny markdown-like syntax (`**bold**`, `*italic*`, `__underline__`).  The
//! syntax is first rewritten into a minimal tag language (`<b>`, `<i>`, `<u>`) by
//! [`normalize_markup`], and the tagged text is then parsed once into a flat list of [`Span`]s by
//! [`RichText::from_tagged`].  Renderers only ever walk the span list, so markup is never re-parsed
//! at draw time.

use std::sync::OnceLock;

use genpdf::style::Style;
use regex::Regex;

/// A run of card text sharing one set of attributes.
///
/// Bold and italic select the font variant; `underline` is not supported by `genpdf`'s
/// [`Style`], so the element layer draws the stroke itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Span {
    /// Creates an unstyled span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Shorthand for `with_bold(true)`.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    pub fn italic(self) -> Self {
        self.with_italic(true)
    }

    pub fn underline(self) -> Self {
        self.with_underline(true)
    }

    /// Returns a span with the same attributes but different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }

    /// Whether `other` carries exactly the same attributes as this span.
    pub fn same_style(&self, other: &Span) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.underline == other.underline
    }

    /// Builds the `genpdf` [`Style`] for the span at the given font size.
    pub fn style(&self, font_size: u8) -> Style {
        let mut style = Style::new().with_font_size(font_size);
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }
}

/// Styled text split at hard line breaks.
///
/// Each paragraph is a run list; wrapping happens later, per paragraph, once the available width
/// and font size are known.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichText {
    paragraphs: Vec<Vec<Span>>,
}

impl RichText {
    /// Parses text written in the normalized tag language.
    ///
    /// Tags are applied as a run stack: `<b>`, `<i>` and `<u>` open a style that lasts until the
    /// matching close tag.  Close tags without an opener are dropped, openers without a close tag
    /// end with the field.  `<br/>` and newlines force a line break; any other `<...>` sequence is
    /// kept as literal text.
    pub fn from_tagged(input: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current = Vec::new();
        let mut buffer = String::new();
        let mut state = RunState::default();
        let mut index = 0;

        while index < input.len() {
            let rest = &input[index..];

            if let Some((tag, len)) = Tag::parse(rest) {
                flush_buffer(&mut buffer, &mut current, state);
                match tag {
                    Tag::Break => paragraphs.push(std::mem::take(&mut current)),
                    Tag::Open(kind) => state.open(kind),
                    Tag::Close(kind) => state.close(kind),
                }
                index += len;
                continue;
            }

            if rest.starts_with('\n') {
                flush_buffer(&mut buffer, &mut current, state);
                paragraphs.push(std::mem::take(&mut current));
                index += 1;
                continue;
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            if ch != '\r' {
                buffer.push(ch);
            }
            index += ch.len_utf8();
        }

        flush_buffer(&mut buffer, &mut current, state);
        if !current.is_empty() || !paragraphs.is_empty() {
            paragraphs.push(current);
        }

        Self { paragraphs }
    }

    /// Builds rich text from raw card input, normalizing markdown-style markup first.
    pub fn from_markup(input: &str) -> Self {
        Self::from_tagged(&normalize_markup(input))
    }

    /// Returns the paragraphs (hard-broken lines) of the text.
    pub fn paragraphs(&self) -> &[Vec<Span>] {
        &self.paragraphs
    }

    /// Returns `true` when the text contains nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.paragraphs
            .iter()
            .flatten()
            .all(|span| span.text.trim().is_empty())
    }

    /// Returns the text without any styling, paragraphs joined by `\n`.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|spans| spans.iter().map(Span::text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TagKind {
    Bold,
    Italic,
    Underline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Open(TagKind),
    Close(TagKind),
    Break,
}

impl Tag {
    const TABLE: [(&'static str, Tag); 8] = [
        ("<b>", Tag::Open(TagKind::Bold)),
        ("</b>", Tag::Close(TagKind::Bold)),
        ("<i>", Tag::Open(TagKind::Italic)),
        ("</i>", Tag::Close(TagKind::Italic)),
        ("<u>", Tag::Open(TagKind::Underline)),
        ("</u>", Tag::Close(TagKind::Underline)),
        ("<br/>", Tag::Break),
        ("<br>", Tag::Break),
    ];

    fn parse(input: &str) -> Option<(Tag, usize)> {
        if !input.starts_with('<') {
            return None;
        }
        Self::TABLE
            .iter()
            .find(|(token, _)| input.starts_with(token))
            .map(|(token, tag)| (*tag, token.len()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct RunState {
    bold: usize,
    italic: usize,
    underline: usize,
}

impl RunState {
    fn depth(&mut self, kind: TagKind) -> &mut usize {
        match kind {
            TagKind::Bold => &mut self.bold,
            TagKind::Italic => &mut self.italic,
            TagKind::Underline => &mut self.underline,
        }
    }

    fn open(&mut self, kind: TagKind) {
        *self.depth(kind) += 1;
    }

    fn close(&mut self, kind: TagKind) {
        let depth = self.depth(kind);
        *depth = depth.saturating_sub(1);
    }

    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }
}

fn flush_buffer(buffer: &mut String, spans: &mut Vec<Span>, state: RunState) {
    if buffer.is_empty() {
        return;
    }
    let span = state.to_span(std::mem::take(buffer));
    match spans.last_mut() {
        Some(last) if last.same_style(&span) => last.text.push_str(&span.text),
        _ => spans.push(span),
    }
}

struct MarkupPatterns {
    bold: Regex,
    italic: Regex,
    underline: Regex,
}

fn patterns() -> &'static MarkupPatterns {
    static PATTERNS: OnceLock<MarkupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkupPatterns {
        bold: Regex::new(r"\*\*([^<>\n]+?)\*\*").expect("bold pattern is valid"),
        italic: Regex::new(r"\*([^*<>\n]+)\*").expect("italic pattern is valid"),
        underline: Regex::new(r"__([^<>\n]+?)__").expect("underline pattern is valid"),
    })
}

/// Rewrites markdown-style emphasis into the tag language understood by [`RichText`].
///
/// - `**text**` becomes `<b>text</b>`
/// - `*text*` becomes `<i>text</i>`
/// - `__text__` becomes `<u>text</u>`
///
/// The passes run in that order and match the shortest enclosed span.  A span must be non-empty,
/// must stay on one line and cannot reach across a tag produced by an earlier match, which makes
/// the rewrite idempotent.  Markers without a partner are left untouched, and so is emphasis
/// around text containing `<` or `>`.
pub fn normalize_markup(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let patterns = patterns();
    let text = patterns.bold.replace_all(text, "<b>${1}</b>");
    let text = patterns.italic.replace_all(&text, "<i>${1}</i>");
    patterns
        .underline
        .replace_all(&text, "<u>${1}</u>")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_each_marker() {
        assert_eq!(normalize_markup("**bold**"), "<b>bold</b>");
        assert_eq!(normalize_markup("*italic*"), "<i>italic</i>");
        assert_eq!(normalize_markup("__underline__"), "<u>underline</u>");
        assert_eq!(
            normalize_markup("**bold** and *italic* and __underline__"),
            "<b>bold</b> and <i>italic</i> and <u>underline</u>"
        );
        assert_eq!(normalize_markup("normal text"), "normal text");
        assert_eq!(normalize_markup(""), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_markup("**bold** *it* __u__");
        assert_eq!(once.matches("<b>").count(), 1);
        assert_eq!(once.matches("<i>").count(), 1);
        assert_eq!(once.matches("<u>").count(), 1);
        assert_eq!(normalize_markup(&once), once);

        for input in ["**a* b*", "****", "***x***", "a * b * c", "__x__ __", "*a*b*"] {
            let once = normalize_markup(input);
            assert_eq!(normalize_markup(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn unmatched_markers_stay_verbatim() {
        assert_eq!(normalize_markup("2 * 3"), "2 * 3");
        assert_eq!(normalize_markup("**open"), "**open");
        assert_eq!(normalize_markup("snake_case"), "snake_case");
        assert_eq!(normalize_markup("**"), "**");
    }

    #[test]
    fn matching_is_non_greedy() {
        assert_eq!(normalize_markup("*a* and *b*"), "<i>a</i> and <i>b</i>");
        assert_eq!(normalize_markup("*amici, m*"), "<i>amici, m</i>");
    }

    #[test]
    fn spans_do_not_cross_lines() {
        assert_eq!(normalize_markup("*a\nb*"), "*a\nb*");
    }

    #[test]
    fn emphasis_never_encloses_angle_brackets() {
        assert_eq!(normalize_markup("*a < b*"), "*a < b*");
        assert_eq!(normalize_markup("**x > y**"), "**x > y**");
        assert_eq!(normalize_markup("**a** *b*"), "<b>a</b> <i>b</i>");
    }

    #[test]
    fn parses_tagged_runs() {
        let text = RichText::from_tagged("plain <b>bold <i>both</i></b> <u>under</u>");
        let spans = &text.paragraphs()[0];
        assert_eq!(spans.len(), 5);
        assert_eq!(spans[0], Span::new("plain "));
        assert_eq!(spans[1], Span::new("bold ").bold());
        assert_eq!(spans[2], Span::new("both").bold().italic());
        assert_eq!(spans[3], Span::new(" "));
        assert_eq!(spans[4], Span::new("under").underline());
    }

    #[test]
    fn interleaved_tags_are_tolerated() {
        let text = RichText::from_tagged("<b>a<i>b</b>c</i>d");
        let spans = &text.paragraphs()[0];
        assert_eq!(spans[0], Span::new("a").bold());
        assert_eq!(spans[1], Span::new("b").bold().italic());
        assert_eq!(spans[2], Span::new("c").italic());
        assert_eq!(spans[3], Span::new("d"));
    }

    #[test]
    fn stray_close_tags_are_ignored_and_open_tags_end_with_field() {
        let text = RichText::from_tagged("</b>x<u>y");
        let spans = &text.paragraphs()[0];
        assert_eq!(spans, &vec![Span::new("x"), Span::new("y").underline()]);
    }

    #[test]
    fn unknown_tags_are_literal() {
        let text = RichText::from_tagged("a <span> b < c");
        assert_eq!(text.plain_text(), "a <span> b < c");
        assert_eq!(text.paragraphs()[0].len(), 1);
    }

    #[test]
    fn hard_breaks_split_paragraphs() {
        let text = RichText::from_tagged("one<br/>two\nthree");
        assert_eq!(text.paragraphs().len(), 3);
        assert_eq!(text.plain_text(), "one\ntwo\nthree");

        let text = RichText::from_tagged("<b>a<br/>b</b>");
        assert_eq!(text.paragraphs()[1], vec![Span::new("b").bold()]);
    }

    #[test]
    fn empty_input_has_no_paragraphs() {
        let text = RichText::from_markup("");
        assert!(text.paragraphs().is_empty());
        assert!(text.is_empty());
        assert!(RichText::from_markup("   ").is_empty());
    }

    #[test]
    fn span_style_reflects_flags() {
        let style = Span::new("x").bold().italic().style(9);
        assert!(style.is_bold());
        assert!(style.is_italic());
        assert_eq!(style.font_size(), 9);
    }
}
