// Derived read model of a ledger for one render pass.

use super::reconcile::{Echo, EditTarget, EXCHANGE_RATE_DECIMALS, VOLUME_DECIMALS};
use super::Ledger;
use serde::{Deserialize, Serialize};
use shared::models::{ConceptId, DecimalPlaces, Representation, RepresentationSet};
use shared::utils::number_format::format_number;

/// Display strings for the four representation columns of one row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub mxn_per_liter: String,
    pub mxn_total: String,
    pub usd_total: String,
    pub usd_per_gallon: String,
}

impl DisplayRow {
    pub fn from_set(set: &RepresentationSet, places: DecimalPlaces) -> Self {
        Self::with_echo(set, places, EditTarget::Margin, None)
    }

    /// Formats every column, except the one `echo` names for `target`,
    /// which shows the user's text verbatim.
    fn with_echo(set: &RepresentationSet, places: DecimalPlaces, target: EditTarget, echo: Option<&Echo>) -> Self {
        let cell = |representation: Representation| match echo {
            Some(echo) if echo.covers(target, representation) => echo.text.clone(),
            _ => format_number(set.get(representation), places.digits()),
        };
        DisplayRow {
            mxn_per_liter: cell(Representation::MxnPerLiter),
            mxn_total: cell(Representation::MxnTotal),
            usd_total: cell(Representation::UsdTotal),
            usd_per_gallon: cell(Representation::UsdPerGallon),
        }
    }

    pub fn get(&self, representation: Representation) -> &str {
        match representation {
            Representation::MxnPerLiter => &self.mxn_per_liter,
            Representation::MxnTotal => &self.mxn_total,
            Representation::UsdTotal => &self.usd_total,
            Representation::UsdPerGallon => &self.usd_per_gallon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConceptView {
    pub id: ConceptId,
    pub name: String,
    pub is_base: bool,
    /// Column the stored value was entered in.
    pub input_type: Representation,
    pub values: RepresentationSet,
    pub display: DisplayRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerView {
    pub exchange_rate: f64,
    pub exchange_rate_display: String,
    pub gallons: f64,
    pub gallons_display: String,
    pub liters: f64,
    pub liters_display: String,
    pub decimal_places: DecimalPlaces,
    pub concepts: Vec<ConceptView>,
    pub totals: RepresentationSet,
    pub totals_display: DisplayRow,
    pub margin: RepresentationSet,
    pub margin_input_type: Representation,
    pub margin_display: DisplayRow,
    pub sale_price: RepresentationSet,
    pub sale_price_display: DisplayRow,
}

/// Plain exportable copy of every derived number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub exchange_rate: f64,
    pub gallons: f64,
    pub liters: f64,
    pub decimal_places: DecimalPlaces,
    pub rows: Vec<SnapshotRow>,
    pub totals: RepresentationSet,
    pub margin: RepresentationSet,
    pub sale_price: RepresentationSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub name: String,
    pub is_base: bool,
    pub values: RepresentationSet,
}

impl Ledger {
    /// Builds the view. `echo` is the outcome of the edit committed just
    /// before this pass, if any.
    pub fn render(&self, echo: Option<&Echo>) -> LedgerView {
        let places = self.decimal_places();
        let state = self.state();
        let scalar = |target: EditTarget, value: f64, decimals: usize| match echo {
            Some(echo) if echo.target == target => echo.text.clone(),
            _ => format_number(value, decimals),
        };

        let concepts = state
            .concepts
            .iter()
            .map(|concept| {
                let values = self.concept_values(concept);
                let (target, input_type) = if concept.is_base {
                    (EditTarget::BasePrice, state.base_price_input_type)
                } else {
                    (EditTarget::Concept(concept.id), concept.input_type)
                };
                // an echo addressed to the base row by concept id still lands here
                let echo = echo.map(|e| match e.target {
                    EditTarget::Concept(id) if concept.is_base && id == concept.id => Echo {
                        target: EditTarget::BasePrice,
                        ..e.clone()
                    },
                    _ => e.clone(),
                });
                ConceptView {
                    id: concept.id,
                    name: concept.name.clone(),
                    is_base: concept.is_base,
                    input_type,
                    values,
                    display: DisplayRow::with_echo(&values, places, target, echo.as_ref()),
                }
            })
            .collect();

        let totals = self.totals();
        let margin = self.margin_values();
        let sale_price = self.sale_price();
        LedgerView {
            exchange_rate: state.exchange_rate,
            exchange_rate_display: scalar(EditTarget::ExchangeRate, state.exchange_rate, EXCHANGE_RATE_DECIMALS),
            gallons: state.gallons,
            gallons_display: scalar(EditTarget::Gallons, state.gallons, VOLUME_DECIMALS),
            liters: state.liters,
            liters_display: scalar(EditTarget::Liters, state.liters, VOLUME_DECIMALS),
            decimal_places: places,
            concepts,
            totals,
            totals_display: DisplayRow::from_set(&totals, places),
            margin,
            margin_input_type: state.margin_input_type,
            margin_display: DisplayRow::with_echo(&margin, places, EditTarget::Margin, echo),
            sale_price,
            sale_price_display: DisplayRow::from_set(&sale_price, places),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state();
        LedgerSnapshot {
            exchange_rate: state.exchange_rate,
            gallons: state.gallons,
            liters: state.liters,
            decimal_places: state.decimal_places,
            rows: state
                .concepts
                .iter()
                .map(|concept| SnapshotRow {
                    name: concept.name.clone(),
                    is_base: concept.is_base,
                    values: self.concept_values(concept),
                })
                .collect(),
            totals: self.totals(),
            margin: self.margin_values(),
            sale_price: self.sale_price(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculatorSettings;
    use crate::ledger::{EditOutcome, FieldEdit};

    fn priced_ledger() -> Ledger {
        let mut ledger = Ledger::new(&CalculatorSettings::default());
        for edit in [
            FieldEdit::unpriced(EditTarget::ExchangeRate, "20"),
            FieldEdit::unpriced(EditTarget::Gallons, "1000"),
            FieldEdit::new(EditTarget::BasePrice, Representation::UsdPerGallon, "2.5"),
        ] {
            ledger.commit_edit(&edit).unwrap();
        }
        ledger
    }

    fn echo_of(outcome: EditOutcome) -> Echo {
        match outcome {
            EditOutcome::Applied { echo } => echo,
            other => panic!("expected applied edit, got {:?}", other),
        }
    }

    #[test]
    fn test_render_formats_with_grouping() {
        let ledger = priced_ledger();
        let view = ledger.render(None);
        assert_eq!(view.exchange_rate_display, "20.0000");
        assert_eq!(view.gallons_display, "1,000.00");
        assert_eq!(view.liters_display, "3,785.41");
        let base = &view.concepts[0];
        assert!(base.is_base);
        assert_eq!(base.input_type, Representation::UsdPerGallon);
        assert_eq!(base.display.usd_total, "2,500.0000");
        assert_eq!(base.display.mxn_total, "50,000.0000");
        assert_eq!(view.totals_display, base.display);
        assert_eq!(view.sale_price_display, base.display);
    }

    #[test]
    fn test_decimal_toggle_changes_display_only() {
        let mut ledger = priced_ledger();
        let before = ledger.render(None);
        ledger.toggle_decimal_places();
        let after = ledger.render(None);
        assert_eq!(after.concepts[0].display.usd_per_gallon, "2.50");
        assert_eq!(after.totals, before.totals);
        assert_eq!(after.gallons_display, before.gallons_display);
    }

    #[test]
    fn test_echo_shows_raw_text_in_edited_cell_only() {
        let mut ledger = priced_ledger();
        let id = ledger.add_concept("Freight");
        let edit = FieldEdit::new(EditTarget::Concept(id), Representation::MxnTotal, "1500.");
        let echo = echo_of(ledger.commit_edit(&edit).unwrap());

        let view = ledger.render(Some(&echo));
        let row = view.concepts.iter().find(|c| c.id == id).unwrap();
        assert_eq!(row.display.mxn_total, "1500.");
        assert_eq!(row.display.usd_total, "75.0000");
        assert_eq!(view.concepts[0].display.mxn_total, "50,000.0000");
        assert_eq!(view.totals_display.mxn_total, "51,500.0000");

        // next pass without the echo formats normally
        let view = ledger.render(None);
        let row = view.concepts.iter().find(|c| c.id == id).unwrap();
        assert_eq!(row.display.mxn_total, "1,500.0000");
    }

    #[test]
    fn test_echo_on_base_row_by_concept_id() {
        let mut ledger = priced_ledger();
        let base_id = ledger.base_concept().unwrap().id;
        let edit = FieldEdit::new(EditTarget::Concept(base_id), Representation::UsdTotal, "3000");
        let echo = echo_of(ledger.commit_edit(&edit).unwrap());
        let view = ledger.render(Some(&echo));
        assert_eq!(view.concepts[0].display.usd_total, "3000");
        assert_eq!(view.concepts[0].display.usd_per_gallon, "3.0000");
        assert_eq!(view.concepts[0].input_type, Representation::UsdTotal);
    }

    #[test]
    fn test_echo_on_volume_field() {
        let mut ledger = priced_ledger();
        let echo = echo_of(ledger.commit_edit(&FieldEdit::unpriced(EditTarget::Liters, "378.541")).unwrap());
        let view = ledger.render(Some(&echo));
        assert_eq!(view.liters_display, "378.541");
        assert_eq!(view.gallons_display, "100.00");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let ledger = priced_ledger();
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].name, "Molecule Price");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("salePrice").is_some());
        assert_eq!(json["rows"][0]["isBase"], serde_json::Value::Bool(true));
    }
}
