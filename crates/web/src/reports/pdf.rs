//! Minimal PDF output: monospaced report pages and the one-page diploma.
//!
//! The reports are text documents typeset in Courier so the padded table
//! lines keep their alignment. Non WinAnsi characters are folded to
//! their ASCII base letter, the same way slugs are built.

use chrono::Timelike;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use storage::dto::result::ResultDetailResponse;
use storage::models::Competition;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const BODY_SIZE: f32 = 8.0;
const LEADING: f32 = 11.0;
const LINES_PER_PAGE: usize = 68;

/// One titled block of preformatted lines in a report.
pub struct PdfSection {
    pub title: String,
    pub lines: Vec<String>,
}

pub fn render_report(title: &str, sections: &[PdfSection]) -> Vec<u8> {
    let mut lines = Vec::with_capacity(64);
    lines.push(title.to_string());
    lines.push("=".repeat(title.chars().count()));

    for section in sections {
        lines.push(String::new());
        lines.push(section.title.clone());
        lines.push("-".repeat(section.title.chars().count()));
        lines.extend(section.lines.iter().cloned());
    }

    let contents = lines
        .chunks(LINES_PER_PAGE)
        .map(page_content)
        .collect::<Vec<_>>();

    document(b"Courier", contents)
}

/// A single page with the finisher's name, time and places.
pub fn render_diploma(competition: &Competition, detail: &ResultDetailResponse) -> Vec<u8> {
    let mut content = Content::new();
    content.begin_text();

    content.set_font(Name(b"F1"), 22.0);
    content.next_line(MARGIN + 30.0, 700.0);
    content.show(Str(&encode_win_ansi(&competition.name)));

    content.set_font(Name(b"F1"), 12.0);
    content.next_line(0.0, -28.0);
    content.show(Str(
        &encode_win_ansi(&competition.competition_date.to_string()),
    ));

    content.set_font(Name(b"F1"), 26.0);
    content.next_line(0.0, -110.0);
    let full_name = format!(
        "{} {}",
        detail.participant.first_name, detail.participant.last_name
    );
    content.show(Str(&encode_win_ansi(&full_name)));

    if let Some(number) = detail.participant.number {
        content.set_font(Name(b"F1"), 12.0);
        content.next_line(0.0, -28.0);
        content.show(Str(&encode_win_ansi(&format!("Number {}", number))));
    }

    if let Some(time) = detail.result.time {
        content.set_font(Name(b"F1"), 16.0);
        content.next_line(0.0, -60.0);
        let formatted = format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        );
        content.show(Str(&encode_win_ansi(&formatted)));
    }

    content.set_font(Name(b"F1"), 12.0);
    if let Some(place) = detail.result.place_distance {
        content.next_line(0.0, -30.0);
        content.show(Str(&encode_win_ansi(&format!("Distance place {}", place))));
    }
    if let Some(place) = detail.result.place_group {
        content.next_line(0.0, -16.0);
        let group = detail.participant.group_name.as_deref().unwrap_or("group");
        content.show(Str(&encode_win_ansi(&format!(
            "Place {} in {}",
            place, group
        ))));
    }

    content.end_text();

    document(b"Helvetica", vec![content])
}

fn page_content(lines: &[String]) -> Content {
    let mut content = Content::new();
    content.begin_text();
    content.set_font(Name(b"F1"), BODY_SIZE);

    let mut first = true;
    for line in lines {
        if first {
            content.next_line(MARGIN, PAGE_HEIGHT - MARGIN - BODY_SIZE);
            first = false;
        } else {
            content.next_line(0.0, -LEADING);
        }
        content.show(Str(&encode_win_ansi(line)));
    }

    content.end_text();
    content
}

/// Assembles a document with one shared base font and one content
/// stream per page.
fn document(base_font: &[u8], contents: Vec<Content>) -> Vec<u8> {
    let mut pdf = Pdf::new();

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let font_id = Ref::new(3);

    let mut next_id = 4;
    let mut page_ids = Vec::with_capacity(contents.len());
    let mut content_ids = Vec::with_capacity(contents.len());
    for _ in 0..contents.len().max(1) {
        page_ids.push(Ref::new(next_id));
        content_ids.push(Ref::new(next_id + 1));
        next_id += 2;
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    pdf.type1_font(font_id)
        .base_font(Name(base_font))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    for (index, page_id) in page_ids.iter().enumerate() {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(content_ids[index]);
        page.resources().fonts().pair(Name(b"F1"), font_id);
    }

    let mut contents = contents;
    if contents.is_empty() {
        contents.push(Content::new());
    }
    for (content, content_id) in contents.into_iter().zip(content_ids) {
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match storage::slug::fold_char(c) {
            folded @ ' '..='~' => folded as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    #[test]
    fn test_report_is_a_pdf() {
        let sections = vec![PdfSection {
            title: "Sport 120km".to_string(),
            lines: vec!["1  Ozola  01:02:03".to_string()],
        }];

        let bytes = render_report("Vienibas brauciens", &sections);

        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_long_reports_break_into_pages() {
        let sections = vec![PdfSection {
            title: "Sport".to_string(),
            lines: (0..150).map(|i| format!("row {}", i)).collect(),
        }];

        let bytes = render_report("Season report", &sections);

        assert_eq!(occurrences(&bytes, b"/Contents"), 3);
    }

    #[test]
    fn test_empty_report_still_has_a_page() {
        let bytes = render_report("", &[]);

        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(occurrences(&bytes, b"/Contents"), 1);
    }

    #[test]
    fn test_encode_folds_diacritics() {
        assert_eq!(encode_win_ansi("Jānis Bērziņš"), b"Janis Berzins".to_vec());
        assert_eq!(encode_win_ansi("±"), b"?".to_vec());
    }
}
