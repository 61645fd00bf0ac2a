use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{ScoredVariant, VariantLink};

static CONCENTRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*(?:mg|g|ml|%|mikrog|mcg)").unwrap());

/// Dosage forms as the catalog spells them: injection, tablet, capsule,
/// spot-on, ear drops, eye drops, ointment, gel, suspension, emulsion,
/// solution.
const FORM_TERMS: &[&str] = &[
    "inj",
    "tablet",
    "kapsel",
    "spot-on",
    "øredråber",
    "øjendråber",
    "salve",
    "gel",
    "suspension",
    "emulsion",
    "opløsning",
];

const CONCENTRATION_WEIGHT: usize = 30;
const FORM_WEIGHT: usize = 20;
const WORD_WEIGHT: usize = 10;
const MAX_SCORE: usize = 100;

/// Scores above this are reported as exact matches.
pub const EXACT_MATCH_THRESHOLD: u8 = 60;

fn concentrations(s: &str) -> HashSet<&str> {
    CONCENTRATION_RE.find_iter(s).map(|m| m.as_str()).collect()
}

/// How well `variant_name` matches `input`, 0..=100.
pub fn score_match(input: &str, variant_name: &str) -> u8 {
    let input = input.to_lowercase();
    let variant = variant_name.to_lowercase();

    let shared_conc = concentrations(&input)
        .intersection(&concentrations(&variant))
        .count();
    let shared_forms = FORM_TERMS
        .iter()
        .filter(|f| input.contains(**f) && variant.contains(**f))
        .count();
    let input_words: HashSet<&str> = input.split_whitespace().collect();
    let variant_words: HashSet<&str> = variant.split_whitespace().collect();
    let shared_words = input_words.intersection(&variant_words).count();

    let score = shared_conc * CONCENTRATION_WEIGHT
        + shared_forms * FORM_WEIGHT
        + shared_words * WORD_WEIGHT;
    score.min(MAX_SCORE) as u8
}

/// All variants scored against `input`, best first. Equal scores keep
/// page order.
pub fn rank_variants(variants: &[VariantLink], input: &str) -> Vec<ScoredVariant> {
    let mut scored: Vec<ScoredVariant> = variants
        .iter()
        .map(|v| {
            let score = score_match(input, &v.display_name);
            debug!("score {:>3} for {:?}", score, v.display_name);
            ScoredVariant::new(v.clone(), score)
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

pub fn select_best(variants: &[VariantLink], input: &str) -> Option<ScoredVariant> {
    rank_variants(variants, input).into_iter().next()
}
