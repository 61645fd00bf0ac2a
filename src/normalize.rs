use std::sync::LazyLock;

use regex::Regex;

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static DOSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d+(?:[.,]\d+)?\s*(?:(?:mikrog|mcg|mg|ml|g)(?:/(?:mikrog|mcg|mg|ml|g|dosis))?\b\.?|%)",
    )
    .unwrap()
});
static FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FORM_WORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b\.?")).unwrap()
});
static VET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bvet\b\.?").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Pharmaceutical form words as they appear in catalog product names.
/// Longer spellings come first so the alternation prefers them.
const FORM_WORDS: &[&str] = &[
    r"inj\.væske",
    "tyggetabletter",
    "tabletter",
    "kapsler",
    "spot-on",
    "øredråber",
    "øjendråber",
    "øresalve",
    "øjensalve",
    "øjengel",
    "salve",
    "gel",
    "pulver",
    "solvens",
    "suspension",
    "emulsion",
    "opløsning",
    "væske",
    "oral",
    "smagsatte",
    "bløde",
    "protectorband",
    "halsbånd",
    "inj",
    "tbl",
    "smag",
];

const DIACRITICS: &[(char, &str)] = &[
    ('æ', "ae"),
    ('ø', "oe"),
    ('å', "aa"),
    ('ä', "a"),
    ('ö', "o"),
];

/// Lowercase and spell out Danish/Nordic letters in ASCII.
pub fn fold_diacritics(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    for ch in lower.chars() {
        match DIACRITICS.iter().find(|(c, _)| *c == ch) {
            Some((_, repl)) => out.push_str(repl),
            None => out.push(ch),
        }
    }
    out
}

/// Reduce a product name to its core: no parentheses, dosages, form words
/// or `vet.` marker.
pub fn strip_dosage_and_form(text: &str) -> String {
    let text = PAREN_RE.replace_all(text, " ");
    let text = DOSAGE_RE.replace_all(&text, " ");
    let text = FORM_RE.replace_all(&text, " ");
    let text = VET_RE.replace_all(&text, " ");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

pub fn to_slug(text: &str) -> String {
    let folded = fold_diacritics(&strip_dosage_and_form(text));
    let kept = NON_SLUG_RE.replace_all(&folded, "");
    SEPARATOR_RE
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

/// Candidate catalog slugs for a free-text name, most specific first.
pub fn slug_variants(name: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let mut push = |slug: String| {
        if !slug.is_empty() && !variants.contains(&slug) {
            variants.push(slug);
        }
    };

    push(to_slug(name));

    let cleaned = strip_dosage_and_form(name);
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if let Some(first) = words.first() {
        push(to_slug(first));
    }
    if words.len() >= 2 {
        push(to_slug(&words[..2].join(" ")));
    }

    // Fallback for names the cleaning rules eat entirely.
    if let Some(raw_first) = name.split_whitespace().next() {
        let folded = fold_diacritics(raw_first);
        push(NON_WORD_RE.replace_all(&folded, "").into_owned());
    }

    variants
}
