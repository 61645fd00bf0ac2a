use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::sections::element_text;
use crate::model::VariantLink;

static LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const VARIANT_MARKERS: &[&str] = &["/spcs/", "/spc/"];

/// Every distinct SPC link on a product page, in page order.
pub fn extract_variants(html: &str, base_url: &str) -> Vec<VariantLink> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut variants = Vec::new();

    for link in doc.select(&LINKS) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !is_variant_href(href) {
            continue;
        }
        let url = absolute_url(href, base_url);
        if !seen.insert(url.clone()) {
            continue;
        }
        variants.push(VariantLink {
            display_name: element_text(link),
            url,
            variant_id: variant_id(href),
        });
    }

    variants
}

fn is_variant_href(href: &str) -> bool {
    VARIANT_MARKERS.iter().any(|m| href.contains(m))
}

fn absolute_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with("//") {
        if let Some(joined) = Url::parse(base_url).ok().and_then(|b| b.join(href).ok()) {
            return joined.to_string();
        }
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Last path segment, without query or fragment.
fn variant_id(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://vetisearch.dk";

    #[test]
    fn metacam_product_page() {
        let html = std::fs::read_to_string("tests/fixtures/metacam_product.html").unwrap();
        let v = extract_variants(&html, BASE);
        assert_eq!(v.len(), 4);
        assert_eq!(v[0].display_name, "Metacam 5 mg/ml injektionsvæske, opløsning");
        assert_eq!(
            v[0].url,
            "https://vetisearch.dk/spcs/191-metacam-5-mg-ml-injektionsvaeske"
        );
        assert_eq!(v[0].variant_id, "191-metacam-5-mg-ml-injektionsvaeske");
        assert_eq!(v[3].display_name, "Metacam 2,5 mg tyggetabletter");
        assert_eq!(v[3].url, "https://vetisearch.dk/spc/194-metacam-2-5-mg-tyggetabletter");
    }

    #[test]
    fn duplicate_target_keeps_first_text() {
        let html = r#"<a href="/spcs/1-a">First text</a><a href="/spcs/1-a">Second text</a>"#;
        let v = extract_variants(html, BASE);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].display_name, "First text");
    }

    #[test]
    fn ignores_non_variant_links() {
        let html = r#"<a href="/products/metacam">P</a><a href="/about">A</a><a>no href</a>"#;
        assert!(extract_variants(html, BASE).is_empty());
    }

    #[test]
    fn marker_needs_leading_slash() {
        let html = r#"<a href="spc/9-x">a</a><a href="spcs/10-y">b</a><a href="/spc/11-z">c</a>"#;
        let urls: Vec<_> = extract_variants(html, BASE).into_iter().map(|v| v.url).collect();
        assert_eq!(urls, vec!["https://vetisearch.dk/spc/11-z"]);
    }

    #[test]
    fn url_resolution() {
        assert_eq!(
            absolute_url("https://other.dk/spcs/9", BASE),
            "https://other.dk/spcs/9"
        );
        assert_eq!(absolute_url("/spcs/9", BASE), "https://vetisearch.dk/spcs/9");
        assert_eq!(absolute_url("spcs/9", BASE), "https://vetisearch.dk/spcs/9");
        assert_eq!(absolute_url("/spcs/9", "https://vetisearch.dk/"), "https://vetisearch.dk/spcs/9");
        assert_eq!(absolute_url("//cdn.vetisearch.dk/spcs/9", BASE), "https://cdn.vetisearch.dk/spcs/9");
    }

    #[test]
    fn relative_and_absolute_resolve_to_same_url_dedup() {
        let html = r#"<a href="/spcs/5-x">one</a><a href="https://vetisearch.dk/spcs/5-x">two</a>"#;
        let v = extract_variants(html, BASE);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].display_name, "one");
    }

    #[test]
    fn id_drops_query() {
        assert_eq!(variant_id("/spcs/191-metacam?lang=da#top"), "191-metacam");
        assert_eq!(variant_id("191-metacam"), "191-metacam");
    }
}
