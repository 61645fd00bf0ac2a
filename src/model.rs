use serde::{Deserialize, Serialize};

use crate::matcher::EXACT_MATCH_THRESHOLD;

/// One medication to resolve, as loaded from the batch input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationQuery {
    pub name: String,
    #[serde(default, alias = "varenr")]
    pub external_id: String,
}

impl MedicationQuery {
    pub fn new(name: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_id: external_id.into(),
        }
    }
}

/// A link to a variant (SPC) page found on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantLink {
    pub display_name: String,
    pub url: String,
    pub variant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredVariant {
    #[serde(flatten)]
    pub link: VariantLink,
    pub score: u8,
    pub is_exact_match: bool,
}

impl ScoredVariant {
    pub fn new(link: VariantLink, score: u8) -> Self {
        Self {
            link,
            score,
            is_exact_match: score > EXACT_MATCH_THRESHOLD,
        }
    }
}

/// A heading and the text collected underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub active_substances: Vec<String>,
    pub indications: Vec<String>,
}

/// Per-query result. Optional keys are omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub query: MedicationQuery,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_variant: Option<ScoredVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ResolutionOutcome {
    pub fn success(
        query: MedicationQuery,
        product_url: String,
        variant: ScoredVariant,
        extraction: ExtractionResult,
    ) -> Self {
        Self {
            query,
            found: true,
            product_url: Some(product_url),
            chosen_variant: Some(variant),
            extraction: Some(extraction),
            failure_reason: None,
        }
    }

    pub fn failure(query: MedicationQuery, reason: impl Into<String>) -> Self {
        Self {
            query,
            found: false,
            product_url: None,
            chosen_variant: None,
            extraction: None,
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_exact_match(&self) -> bool {
        self.chosen_variant
            .as_ref()
            .is_some_and(|v| self.found && v.is_exact_match)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub name: String,
    pub external_id: String,
    pub reason: String,
}

impl FailureRecord {
    /// `None` for successful outcomes.
    pub fn from_outcome(outcome: &ResolutionOutcome) -> Option<Self> {
        if outcome.found {
            return None;
        }
        Some(Self {
            name: outcome.query.name.clone(),
            external_id: outcome.query.external_id.clone(),
            reason: outcome.failure_reason.clone().unwrap_or_default(),
        })
    }
}

/// Everything one batch run produces: outcomes in input order plus the
/// failures accumulated along the way.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub outcomes: Vec<ResolutionOutcome>,
    pub failures: Vec<FailureRecord>,
}

impl BatchResult {
    pub fn push(&mut self, outcome: ResolutionOutcome) {
        if let Some(failure) = FailureRecord::from_outcome(&outcome) {
            self.failures.push(failure);
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> VariantLink {
        VariantLink {
            display_name: "Metacam 5 mg/ml".into(),
            url: "https://vetisearch.dk/spcs/191-metacam".into(),
            variant_id: "191-metacam".into(),
        }
    }

    fn variant(exact: bool) -> ScoredVariant {
        ScoredVariant::new(link(), if exact { 70 } else { 30 })
    }

    #[test]
    fn exact_threshold_is_strict() {
        assert!(!ScoredVariant::new(link(), 60).is_exact_match);
        assert!(ScoredVariant::new(link(), 61).is_exact_match);
    }

    #[test]
    fn failure_omits_payload_keys() {
        let out = ResolutionOutcome::failure(MedicationQuery::new("X", "1"), "No variants found");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["failure_reason"], "No variants found");
        assert!(json.get("chosen_variant").is_none());
        assert!(json.get("extraction").is_none());
    }

    #[test]
    fn success_flattens_variant_link() {
        let out = ResolutionOutcome::success(
            MedicationQuery::new("Metacam", "42"),
            "https://vetisearch.dk/products/metacam".into(),
            variant(true),
            ExtractionResult::default(),
        );
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["chosen_variant"]["variant_id"], "191-metacam");
        assert_eq!(json["chosen_variant"]["is_exact_match"], true);
        assert!(json.get("failure_reason").is_none());
        assert!(out.is_exact_match());
    }

    #[test]
    fn query_accepts_legacy_id_key() {
        let q: MedicationQuery =
            serde_json::from_str(r#"{"name": "Rimadyl", "varenr": "123456"}"#).unwrap();
        assert_eq!(q.external_id, "123456");
        let q: MedicationQuery = serde_json::from_str(r#"{"name": "Rimadyl"}"#).unwrap();
        assert!(q.external_id.is_empty());
    }

    #[test]
    fn batch_collects_failures_only() {
        let mut batch = BatchResult::default();
        batch.push(ResolutionOutcome::failure(MedicationQuery::new("A", ""), "No variants found"));
        batch.push(ResolutionOutcome::success(
            MedicationQuery::new("B", ""),
            "u".into(),
            variant(false),
            ExtractionResult::default(),
        ));
        assert_eq!(batch.outcomes.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].name, "A");
    }
}
