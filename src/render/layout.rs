//! Page layout for the PDF export: wrap and paginate Markdown source lines.
//!
//! Pure geometry, no pdfium. Every source line becomes one block of full
//! content width; blocks flow top to bottom and break onto a new page when
//! the next line would cross the bottom margin. Markdown markers (`#`, `|`,
//! `-`) are ordinary characters here.
//!
//! ```text
//!  ┌──────────────── 210 mm ────────────────┐
//!  │ 10 ┌────────── 190 mm cell ────────┐ 10 │  top 10 mm
//!  │    │ 1 │      188 mm text      │ 1 │    │  line k at y = 10 + 10k
//!  │    └───────────────────────────────┘    │
//!  │                  ...                    │  27 lines
//!  │                                         │  bottom break 15 mm
//!  └─────────────────────────────────────────┘
//! ```

/// A4 portrait.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const MARGIN_MM: f32 = 10.0;
pub const BOTTOM_MARGIN_MM: f32 = 15.0;
pub const CELL_PADDING_MM: f32 = 1.0;

pub const FONT_SIZE_PT: f32 = 12.0;
pub const LINE_HEIGHT_MM: f32 = 10.0;

/// Width available to glyphs on one line.
pub const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - 2.0 * CELL_PADDING_MM;

/// Lines that fit between the top margin and the bottom break.
pub const LINES_PER_PAGE: usize = 27;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Width of a glyph missing from the table below.
const DEFAULT_GLYPH_WIDTH: u16 = 556;

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

/// One wrapped line, positioned on its page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge of the text, from the page's left edge.
    pub x_mm: f32,
    /// Text baseline, from the page's top edge.
    pub baseline_mm: f32,
}

impl PlacedLine {
    /// `(x, y)` in PDF points with the origin at the bottom-left corner.
    pub fn origin_pt(&self) -> (f32, f32) {
        (
            mm_to_pt(self.x_mm),
            mm_to_pt(PAGE_HEIGHT_MM - self.baseline_mm),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// The whole export, page by page. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// Wrap every source line and distribute the result over pages.
pub fn layout_document(markdown: &str) -> DocumentLayout {
    let wrapped: Vec<String> = markdown
        .lines()
        .flat_map(|line| wrap_line(&sanitize_line(line), TEXT_WIDTH_MM, FONT_SIZE_PT))
        .collect();

    let mut pages: Vec<PageLayout> = wrapped
        .chunks(LINES_PER_PAGE)
        .map(|chunk| PageLayout {
            lines: chunk
                .iter()
                .enumerate()
                .map(|(k, text)| PlacedLine {
                    text: text.clone(),
                    x_mm: MARGIN_MM + CELL_PADDING_MM,
                    baseline_mm: baseline_for_slot(k),
                })
                .collect(),
        })
        .collect();

    if pages.is_empty() {
        pages.push(PageLayout::default());
    }
    DocumentLayout { pages }
}

/// Number of pages `line_count` wrapped lines occupy.
pub fn pages_for_lines(line_count: usize) -> usize {
    line_count.div_ceil(LINES_PER_PAGE).max(1)
}

/// Baseline of the `slot`-th line on a page: vertically centred in its cell.
fn baseline_for_slot(slot: usize) -> f32 {
    let top = MARGIN_MM + LINE_HEIGHT_MM * slot as f32;
    top + LINE_HEIGHT_MM / 2.0 + 0.3 * FONT_SIZE_PT * MM_PER_PT
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// Advance width of `c` in 1/1000 em.
pub fn glyph_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        _ => DEFAULT_GLYPH_WIDTH,
    }
}

/// Width of `text` in millimetres at `font_size_pt`.
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c) as u32).sum();
    units as f32 * font_size_pt * MM_PER_PT / 1000.0
}

/// Greedy wrap. Breaks at the last space that still fits and drops it; a run
/// with no space is split between characters. Always returns at least one
/// line.
pub fn wrap_line(line: &str, max_width_mm: f32, font_size_pt: f32) -> Vec<String> {
    let max_units = max_width_mm * 1000.0 / (font_size_pt * MM_PER_PT);
    let chars: Vec<char> = line.chars().collect();
    let mut out = Vec::new();

    let mut start = 0;
    let mut i = 0;
    let mut last_space: Option<usize> = None;
    let mut units = 0u32;

    while i < chars.len() {
        let c = chars[i];
        if c == ' ' {
            last_space = Some(i);
        }
        units += glyph_width(c) as u32;

        if units as f32 > max_units {
            match last_space {
                Some(space) => {
                    out.push(chars[start..space].iter().collect());
                    i = space + 1;
                }
                None => {
                    if i == start {
                        i += 1;
                    }
                    out.push(chars[start..i].iter().collect());
                }
            }
            start = i;
            last_space = None;
            units = 0;
            continue;
        }
        i += 1;
    }

    out.push(chars[start..].iter().collect());
    out
}

/// Map text onto what the built-in Helvetica can show.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\t' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{2023}' | '\u{25CF}' | '\u{25E6}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' => out.push(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            c if c.is_control() => out.push('?'),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_constants_agree() {
        assert!((TEXT_WIDTH_MM - 188.0).abs() < f32::EPSILON);
        let last_top = MARGIN_MM + LINE_HEIGHT_MM * (LINES_PER_PAGE - 1) as f32;
        assert!(last_top + LINE_HEIGHT_MM <= PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM);
        let next_top = MARGIN_MM + LINE_HEIGHT_MM * LINES_PER_PAGE as f32;
        assert!(next_top + LINE_HEIGHT_MM > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM);
    }

    #[test]
    fn widths_match_known_glyphs() {
        assert_eq!(glyph_width(' '), 278);
        assert_eq!(glyph_width('0'), 556);
        assert_eq!(glyph_width('@'), 1015);
        assert_eq!(glyph_width('M'), 833);
        assert_eq!(glyph_width('W'), 944);
        assert_eq!(glyph_width('i'), 222);
        assert_eq!(glyph_width('|'), 260);
        assert_eq!(glyph_width('~'), 584);
        assert_eq!(glyph_width('£'), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn short_line_is_untouched() {
        assert_eq!(wrap_line("- Shortfall: 0", TEXT_WIDTH_MM, FONT_SIZE_PT), vec!["- Shortfall: 0"]);
    }

    #[test]
    fn empty_line_takes_one_line() {
        assert_eq!(wrap_line("", TEXT_WIDTH_MM, FONT_SIZE_PT), vec![String::new()]);
    }

    #[test]
    fn wraps_at_last_space_and_drops_it() {
        let words = vec!["funds"; 60].join(" ");
        let lines = wrap_line(&words, TEXT_WIDTH_MM, FONT_SIZE_PT);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.starts_with(' ') && !line.ends_with(' '), "got: {line:?}");
            assert!(text_width_mm(line, FONT_SIZE_PT) <= TEXT_WIDTH_MM);
        }
        assert_eq!(lines.join(" "), words);
    }

    #[test]
    fn long_word_is_split_by_character() {
        let word = "X".repeat(200);
        let lines = wrap_line(&word, TEXT_WIDTH_MM, FONT_SIZE_PT);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width_mm(line, FONT_SIZE_PT) <= TEXT_WIDTH_MM);
        }
    }

    #[test]
    fn narrow_width_still_makes_progress() {
        let lines = wrap_line("abc", 0.1, FONT_SIZE_PT);
        assert_eq!(&lines[..3], &["a", "b", "c"]);
        assert_eq!(lines.concat(), "abc");
    }

    #[test]
    fn sanitize_replaces_non_latin1() {
        assert_eq!(sanitize_line("“Gift” – ‘Mum’"), "\"Gift\" - 'Mum'");
        assert_eq!(sanitize_line("• item…"), "* item...");
        assert_eq!(sanitize_line("£500 café"), "£500 café");
        assert_eq!(sanitize_line("a\tb"), "a b");
        assert_eq!(sanitize_line("€10 ✓"), "EUR10 ?");
    }

    #[test]
    fn pages_hold_27_lines() {
        let md = (0..60).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let layout = layout_document(&md);
        assert_eq!(layout.line_count(), 60);
        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.page_count(), pages_for_lines(60));
        assert_eq!(layout.pages[0].lines.len(), 27);
        assert_eq!(layout.pages[2].lines.len(), 6);
        assert_eq!(layout.pages[1].lines[0].text, "line 27");
    }

    #[test]
    fn page_count_is_ceiling_of_wrapped_lines() {
        for n in [1usize, 26, 27, 28, 54, 55] {
            let md = vec!["x"; n].join("\n");
            assert_eq!(layout_document(&md).page_count(), n.div_ceil(LINES_PER_PAGE), "n = {n}");
        }
    }

    #[test]
    fn trailing_newline_adds_no_line() {
        assert_eq!(layout_document("a\nb\n").line_count(), 2);
        assert_eq!(layout_document("a\n\nb").line_count(), 3);
    }

    #[test]
    fn empty_markdown_still_has_a_page() {
        let layout = layout_document("");
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.line_count(), 0);
        assert_eq!(pages_for_lines(0), 1);
    }

    #[test]
    fn lines_are_placed_top_down() {
        let layout = layout_document("first\nsecond");
        let lines = &layout.pages[0].lines;
        assert!((lines[0].x_mm - 11.0).abs() < 1e-4);
        assert!((lines[1].baseline_mm - lines[0].baseline_mm - LINE_HEIGHT_MM).abs() < 1e-4);
        let (x, y) = lines[0].origin_pt();
        assert!((x - 31.18).abs() < 0.01, "x = {x}");
        assert!(y > 780.0 && y < 800.0, "y = {y}");
    }

    #[test]
    fn layout_is_deterministic() {
        let md = "### Summary\nThe applicant's funds are consistent with salary.";
        assert_eq!(layout_document(md), layout_document(md));
    }
}
