use serde::{Deserialize, Serialize};

use crate::model::ResolutionOutcome;

/// Flash-card record consumed by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashCard {
    pub input_name: String,
    pub external_id: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_substances: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indications: Option<Vec<String>>,
}

impl From<&ResolutionOutcome> for FlashCard {
    fn from(outcome: &ResolutionOutcome) -> Self {
        let mut card = FlashCard {
            input_name: outcome.query.name.clone(),
            external_id: outcome.query.external_id.clone(),
            found: outcome.found,
            exact_match: None,
            variant_name: None,
            spc_url: None,
            active_substances: None,
            indications: None,
        };
        if !outcome.found {
            return card;
        }
        if let Some(v) = &outcome.chosen_variant {
            card.exact_match = Some(v.is_exact_match);
            card.variant_name = Some(v.link.display_name.clone());
            card.spc_url = Some(v.link.url.clone());
        }
        if let Some(x) = &outcome.extraction {
            card.active_substances = Some(x.active_substances.clone());
            card.indications = Some(x.indications.clone());
        }
        card
    }
}

pub fn to_cards(outcomes: &[ResolutionOutcome]) -> Vec<FlashCard> {
    outcomes.iter().map(FlashCard::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractionResult, MedicationQuery, ScoredVariant, VariantLink};

    #[test]
    fn found_card_carries_clinical_fields() {
        let outcome = ResolutionOutcome::success(
            MedicationQuery::new("Metacam inj. 5 mg/ml", "100"),
            "https://vetisearch.dk/products/metacam".into(),
            ScoredVariant::new(
                VariantLink {
                    display_name: "Metacam 5 mg/ml".into(),
                    url: "https://vetisearch.dk/spcs/191-metacam".into(),
                    variant_id: "191-metacam".into(),
                },
                80,
            ),
            ExtractionResult {
                active_substances: vec!["Meloxicam : 5 mg/ml".into()],
                indications: vec!["Kvæg: Akut mastitis.".into()],
            },
        );
        let card = FlashCard::from(&outcome);
        assert_eq!(card.exact_match, Some(true));
        assert_eq!(card.spc_url.as_deref(), Some("https://vetisearch.dk/spcs/191-metacam"));
        assert_eq!(card.active_substances.unwrap(), vec!["Meloxicam : 5 mg/ml"]);
    }

    #[test]
    fn missing_card_is_bare() {
        let outcome =
            ResolutionOutcome::failure(MedicationQuery::new("Ukendt", "7"), "No variants found");
        let json = serde_json::to_value(to_cards(&[outcome])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "input_name": "Ukendt", "external_id": "7", "found": false }])
        );
    }
}
