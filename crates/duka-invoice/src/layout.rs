//! Page layout with a top-down cursor.
//!
//! Coordinates are in points measured from the top-left corner of an A4
//! page. The PDF writer flips them into PDF's bottom-up space.

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 40.0;
/// Width between the left and right margins.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// One drawing instruction. `gray` is 0.0 (black) to 1.0 (white).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at `y`.
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        gray: f32,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Every string drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Rough Helvetica advance width; good enough for right-aligning numbers.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Hard-wrap `text` at `width` characters, breaking on whitespace where it
/// can and mid-word where a single word is longer than a line. A zero width
/// is treated as one.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..width).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Sequential layout state: the pages so far and the current `y`.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    pages: Vec<Page>,
    y: f32,
}

impl Default for LayoutCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCursor {
    /// One empty page, cursor at the top margin.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: MARGIN,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    /// Lowest `y` content may reach.
    pub fn bottom(&self) -> f32 {
        PAGE_HEIGHT - MARGIN
    }

    pub fn remaining(&self) -> f32 {
        self.bottom() - self.y
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    /// Start a new page unless `height` still fits. Returns whether a page
    /// break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.y + height > self.bottom() {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn advance(&mut self, height: f32) {
        self.y += height;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Draw text whose baseline sits `baseline` points below the cursor.
    pub fn text(&mut self, x: f32, baseline: f32, size: f32, font: Font, text: impl Into<String>) {
        self.text_gray(x, baseline, size, font, 0.0, text);
    }

    pub fn text_gray(
        &mut self,
        x: f32,
        baseline: f32,
        size: f32,
        font: Font,
        gray: f32,
        text: impl Into<String>,
    ) {
        let y = self.y + baseline;
        self.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            gray,
            text: text.into(),
        });
    }

    /// Text whose right edge ends at `right`.
    pub fn text_right(&mut self, right: f32, baseline: f32, size: f32, font: Font, text: &str) {
        let x = right - text_width(text, size);
        self.text(x, baseline, size, font, text);
    }

    /// Filled rectangle whose top edge is at the cursor.
    pub fn fill_rect(&mut self, x: f32, width: f32, height: f32, gray: f32) {
        let y = self.y;
        self.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            gray,
        });
    }

    pub fn stroke_rect(&mut self, x: f32, width: f32, height: f32) {
        let y = self.y;
        self.push(DrawOp::StrokeRect {
            x,
            y,
            width,
            height,
            line_width: 1.0,
        });
    }

    /// Horizontal rule across the content width, `offset` below the cursor.
    pub fn rule(&mut self, offset: f32) {
        let y = self.y + offset;
        self.push(DrawOp::Line {
            x1: MARGIN,
            y1: y,
            x2: PAGE_WIDTH - MARGIN,
            y2: y,
            line_width: 0.5,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_space_breaks_page() {
        let mut cursor = LayoutCursor::new();
        assert!(!cursor.ensure_space(100.0));
        cursor.advance(700.0);
        assert_eq!(cursor.y(), MARGIN + 700.0);
        assert!(cursor.ensure_space(100.0));
        assert_eq!(cursor.page_count(), 2);
        assert_eq!(cursor.y(), MARGIN);
    }

    #[test]
    fn test_exact_fit_stays_on_page() {
        let mut cursor = LayoutCursor::new();
        let room = cursor.remaining();
        assert!(!cursor.ensure_space(room));
        assert_eq!(cursor.page_count(), 1);
    }

    #[test]
    fn test_ops_land_on_current_page() {
        let mut cursor = LayoutCursor::new();
        cursor.text(MARGIN, 12.0, 10.0, Font::Regular, "first");
        cursor.new_page();
        cursor.text(MARGIN, 12.0, 10.0, Font::Bold, "second");
        let pages = cursor.into_pages();
        assert_eq!(pages[0].texts().collect::<Vec<_>>(), vec!["first"]);
        assert_eq!(pages[1].texts().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn test_wrap_text_at_width() {
        let text = "Call me at the gate near the blue kiosk opposite the petrol station, \
                    the one with the big mango tree";
        let lines = wrap_text(text, 60);
        assert!(lines.len() >= 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 60));
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        let lines = wrap_text(&"x".repeat(130), 60);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 60);
        assert_eq!(lines[2].len(), 10);
        assert!(wrap_text("   ", 60).is_empty());
    }

    #[test]
    fn test_wrap_text_zero_width_is_one_char_per_line() {
        assert_eq!(wrap_text("ab c", 0), vec!["a", "b", "c"]);
    }
}
