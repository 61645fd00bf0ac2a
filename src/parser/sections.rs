use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::model::Section;

static SEARCH_HEADINGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3, h4").unwrap());

/// Headings at or above this level close a section.
const STOP_LEVEL: u8 = 4;

/// `h1`..`h6` → 1..6.
pub fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn closes_section(el: &ElementRef) -> bool {
    heading_level(el.value().name()).is_some_and(|l| l <= STOP_LEVEL)
}

/// Collapse whitespace runs (newlines included) to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element_text(el: ElementRef) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// First `h2`..`h4` whose text contains any of `keywords` (lowercase).
pub fn find_heading<'a>(doc: &'a Html, keywords: &[&str]) -> Option<ElementRef<'a>> {
    doc.select(&SEARCH_HEADINGS).find(|h| {
        let text = element_text(*h).to_lowercase();
        keywords.iter().any(|k| text.contains(k))
    })
}

/// Element siblings after `heading`, up to the next `h1`..`h4`.
pub fn section_blocks<'a>(heading: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !closes_section(el))
}

/// Locate the section headed by `keywords` and let `collect` pull text out
/// of each block in it. Only the first matching heading is used.
pub fn scan_section<'a, F>(doc: &'a Html, keywords: &[&str], mut collect: F) -> Option<Section>
where
    F: FnMut(ElementRef<'a>, &mut Vec<String>),
{
    let heading = find_heading(doc, keywords)?;
    let mut paragraphs = Vec::new();
    for block in section_blocks(heading) {
        collect(block, &mut paragraphs);
    }
    Some(Section {
        heading: element_text(heading),
        paragraphs,
    })
}
