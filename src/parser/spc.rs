use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::sections::{element_text, scan_section};
use crate::model::ExtractionResult;

static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

const SUBSTANCE_HEADINGS: &[&str] = &["aktivt stof", "aktive stoffer", "active substance"];
const INDICATION_HEADINGS: &[&str] = &["indikation", "therapeutic indication"];

/// Indication fragments this short are labels, not text.
const MIN_INDICATION_CHARS: usize = 10;

/// Pull active substances and indications out of an SPC page.
pub fn extract_spc(html: &str) -> ExtractionResult {
    let doc = Html::parse_document(html);
    ExtractionResult {
        active_substances: section_entries(&doc, SUBSTANCE_HEADINGS, collect_substances),
        indications: section_entries(&doc, INDICATION_HEADINGS, collect_indications),
    }
}

fn section_entries<F>(doc: &Html, keywords: &[&str], collect: F) -> Vec<String>
where
    F: FnMut(ElementRef, &mut Vec<String>),
{
    match scan_section(doc, keywords, collect) {
        Some(section) => {
            debug!("{:?}: {} entries", section.heading, section.paragraphs.len());
            section.paragraphs
        }
        None => {
            debug!("no heading matching {:?}", keywords);
            Vec::new()
        }
    }
}

fn collect_substances(block: ElementRef, out: &mut Vec<String>) {
    match block.value().name() {
        "ul" | "ol" => {
            for li in block.select(&LIST_ITEMS) {
                push_longer_than(li, 0, out);
            }
        }
        "li" | "p" => push_longer_than(block, 0, out),
        _ => {}
    }
}

fn collect_indications(block: ElementRef, out: &mut Vec<String>) {
    match block.value().name() {
        "p" => push_longer_than(block, MIN_INDICATION_CHARS, out),
        "ul" | "ol" => {
            for li in block.select(&LIST_ITEMS) {
                push_longer_than(li, MIN_INDICATION_CHARS, out);
            }
        }
        "div" => {
            let paragraphs = block
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "p");
            for p in paragraphs {
                push_longer_than(p, MIN_INDICATION_CHARS, out);
            }
        }
        _ => {}
    }
}

fn push_longer_than(el: ElementRef, min_chars: usize, out: &mut Vec<String>) {
    let text = element_text(el);
    if text.chars().count() > min_chars {
        out.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metacam_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/metacam_spc.html").unwrap();
        let r = extract_spc(&html);
        assert_eq!(r.active_substances, vec!["Meloxicam : 5 mg/ml"]);
        assert_eq!(
            r.indications,
            vec![
                "Kvæg: Akut mastitis i kombination med antibiotikabehandling.",
                "Gris: Behandling af fødselsbetingede sygdomme.",
            ]
        );
        assert!(r.indications.iter().all(|i| !i.contains("Dosering")));
    }

    #[test]
    fn english_headings_and_nested_blocks() {
        let html = std::fs::read_to_string("tests/fixtures/english_spc.html").unwrap();
        let r = extract_spc(&html);
        assert_eq!(r.active_substances, vec!["Carprofen 50 mg", "Excipient note"]);
        assert_eq!(
            r.indications,
            vec![
                "Reduction of inflammation and pain caused by musculo-skeletal disorders.",
                "Follow-up of post-operative analgesia in dogs.",
                "Nested paragraph inside a container block.",
            ]
        );
    }

    #[test]
    fn standalone_list_items_count_as_substances() {
        let r = extract_spc("<h3>Aktive stoffer</h3><li>Milbemycinoxim</li><li>Praziquantel</li>");
        assert_eq!(r.active_substances, vec!["Milbemycinoxim", "Praziquantel"]);
    }

    #[test]
    fn whitespace_inside_items_is_collapsed() {
        let r = extract_spc("<h2>Aktivt stof</h2><ul><li>\n  Meloxicam\n   :  5 mg/ml </li></ul>");
        assert_eq!(r.active_substances, vec!["Meloxicam : 5 mg/ml"]);
    }

    #[test]
    fn short_indication_fragments_are_dropped() {
        let r = extract_spc(
            "<h3>Indikationer</h3><p>Hund:</p><p>0123456789</p><p>Smerter og inflammation.</p>",
        );
        assert_eq!(r.indications, vec!["Smerter og inflammation."]);
    }

    #[test]
    fn only_direct_div_paragraphs_are_indications() {
        let r = extract_spc(
            "<h3>Indikationer</h3><div><p>Direct child paragraph.</p><section><p>Deeper paragraph text.</p></section></div>",
        );
        assert_eq!(r.indications, vec!["Direct child paragraph."]);
    }

    #[test]
    fn missing_headings_give_empty_fields() {
        let r = extract_spc("<h3>Dosering</h3><p>Some other content here.</p>");
        assert!(r.active_substances.is_empty());
        assert!(r.indications.is_empty());
    }

    #[test]
    fn only_first_substance_heading_is_read() {
        let r = extract_spc(
            "<h3>Aktivt stof</h3><p>First</p><h3>Aktivt stof (gentaget)</h3><p>Second</p>",
        );
        assert_eq!(r.active_substances, vec!["First"]);
    }
}
