//! Minimal PDF 1.4 serializer for laid-out pages.
//!
//! Uses the two standard Helvetica faces, so no fonts are embedded. Text
//! outside printable ASCII is replaced with `?`.

use crate::layout::{DrawOp, Font, Page, PAGE_HEIGHT, PAGE_WIDTH};
use std::fmt::Write;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

fn font_name(font: Font) -> &'static str {
    match font {
        Font::Regular => "F1",
        Font::Bold => "F2",
    }
}

/// Content stream for one page.
fn content_stream(page: &Page) -> String {
    let mut out = String::new();
    for op in &page.ops {
        let _ = match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                gray,
                text,
            } => writeln!(
                out,
                "BT /{} {size:.1} Tf {gray:.2} g {x:.2} {:.2} Td ({}) Tj ET",
                font_name(*font),
                PAGE_HEIGHT - y,
                escape(text)
            ),
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => writeln!(
                out,
                "{gray:.2} g {x:.2} {:.2} {width:.2} {height:.2} re f",
                PAGE_HEIGHT - y - height
            ),
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
            } => writeln!(
                out,
                "{line_width:.2} w 0 G {x:.2} {:.2} {width:.2} {height:.2} re S",
                PAGE_HEIGHT - y - height
            ),
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                line_width,
            } => writeln!(
                out,
                "{line_width:.2} w 0 G {x1:.2} {:.2} m {x2:.2} {:.2} l S",
                PAGE_HEIGHT - y1,
                PAGE_HEIGHT - y2
            ),
        };
    }
    out
}

struct PdfBuffer {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuffer {
    fn object(&mut self, id: usize, body: &str) {
        // Objects are written in id order, so offsets[id - 1] is this one.
        debug_assert_eq!(self.offsets.len() + 1, id);
        self.offsets.push(self.bytes.len());
        self.bytes
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }
}

/// Serialize pages into a complete PDF file.
pub fn write_pdf(pages: &[Page], title: &str) -> Vec<u8> {
    let mut pdf = PdfBuffer {
        bytes: b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec(),
        offsets: Vec::new(),
    };

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    pdf.object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"));
    pdf.object(
        PAGES_ID,
        &format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    );
    pdf.object(
        FONT_REGULAR_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    pdf.object(
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (page, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        pdf.object(
            *page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
                 /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
                 /Contents {content_id} 0 R >>"
            ),
        );
        let stream = content_stream(page);
        pdf.object(
            content_id,
            &format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        );
    }

    let info_id = pdf.offsets.len() + 1;
    pdf.object(
        info_id,
        &format!("<< /Title ({}) /Producer (Duka) >>", escape(title)),
    );

    let xref_offset = pdf.bytes.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", pdf.offsets.len() + 1);
    for offset in &pdf.offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        pdf.offsets.len() + 1
    );
    pdf.bytes.extend_from_slice(xref.as_bytes());
    pdf.bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutCursor, MARGIN};

    /// One char per byte so string offsets match byte offsets.
    fn as_text(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '.' })
            .collect()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a (b) \\c"), "a \\(b\\) \\\\c");
        assert_eq!(escape("Café"), "Caf?");
    }

    #[test]
    fn test_document_structure() {
        let mut cursor = LayoutCursor::new();
        cursor.text(MARGIN, 12.0, 10.0, Font::Regular, "Hello (world)");
        cursor.new_page();
        cursor.fill_rect(MARGIN, 100.0, 20.0, 0.9);
        let bytes = write_pdf(cursor.pages(), "Invoice ORD-1");
        let text = as_text(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("(Hello \\(world\\)) Tj"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/Title (Invoice ORD-1)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let cursor = LayoutCursor::new();
        let bytes = write_pdf(cursor.pages(), "t");
        let text = as_text(&bytes);

        let start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[start..].starts_with("xref"));

        let entries: Vec<usize> = text[start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 7);
        for (i, offset) in entries.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn test_coordinates_flip_to_bottom_up() {
        let mut cursor = LayoutCursor::new();
        cursor.text(MARGIN, 10.0, 10.0, Font::Regular, "top");
        let stream = content_stream(&cursor.pages()[0]);
        assert!(stream.contains(&format!("{:.2} {:.2} Td", MARGIN, PAGE_HEIGHT - MARGIN - 10.0)));
    }
}
