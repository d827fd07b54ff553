// Last-edited-field-wins reconciliation.
//
// A committed edit names one cell: an entity and, for priced entities, a
// representation column. The parsed value becomes that entity's canonical
// pair; every other cell is re-derived on the next render. Unparseable text
// never mutates state.

use super::Ledger;
use crate::conversion::{gallons_to_liters, liters_to_gallons};
use crate::error::LedgerError;
use shared::models::{ConceptId, Representation};
use shared::utils::number_format::{format_number, parse_formatted_number};

pub const VOLUME_DECIMALS: usize = 2;
pub const EXCHANGE_RATE_DECIMALS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Concept(ConceptId),
    BasePrice,
    Margin,
    Gallons,
    Liters,
    ExchangeRate,
}

impl EditTarget {
    /// Volume and rate fields have no representation column.
    pub fn is_priced(self) -> bool {
        matches!(self, EditTarget::Concept(_) | EditTarget::BasePrice | EditTarget::Margin)
    }

    fn accepts(self, value: f64) -> bool {
        match self {
            EditTarget::Gallons | EditTarget::Liters | EditTarget::ExchangeRate => value >= 0.0,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub target: EditTarget,
    /// Ignored for volume and rate targets.
    pub representation: Representation,
    pub raw: String,
}

impl FieldEdit {
    pub fn new(target: EditTarget, representation: Representation, raw: impl Into<String>) -> Self {
        FieldEdit {
            target,
            representation,
            raw: raw.into(),
        }
    }

    pub fn unpriced(target: EditTarget, raw: impl Into<String>) -> Self {
        Self::new(target, Representation::default(), raw)
    }
}

/// Text to show verbatim in the edited cell on the pass right after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Echo {
    pub target: EditTarget,
    pub representation: Representation,
    pub text: String,
}

impl Echo {
    /// Whether this echo belongs to the given priced cell.
    pub(crate) fn covers(&self, target: EditTarget, representation: Representation) -> bool {
        self.target == target && (!target.is_priced() || self.representation == representation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Applied { echo: Echo },
    /// State untouched; `restored` is the cell's previous display text.
    Rejected { restored: String },
}

impl Ledger {
    pub fn commit_edit(&mut self, edit: &FieldEdit) -> Result<EditOutcome, LedgerError> {
        let target = self.resolve_target(edit.target)?;
        let parsed = parse_formatted_number(&edit.raw)
            .ok()
            .filter(|value| target.accepts(*value));

        let Some(value) = parsed else {
            let restored = self.display_cell(target, edit.representation)?;
            tracing::debug!(field = ?edit.target, raw = %edit.raw, restored = %restored, "Discarding unparseable edit");
            return Ok(EditOutcome::Rejected { restored });
        };

        let representation = edit.representation;
        match target {
            EditTarget::Concept(id) => {
                let index = self.concept_index(id)?;
                let concept = &mut self.state.concepts[index];
                concept.value = value;
                concept.input_type = representation;
            }
            EditTarget::BasePrice => {
                // canonical base price is always USD per gallon
                let usd_per_gallon = self.context().convert(value, representation, Representation::UsdPerGallon);
                self.state.base_price = usd_per_gallon;
                self.state.base_price_input_type = representation;
            }
            EditTarget::Margin => {
                self.state.margin = value;
                self.state.margin_input_type = representation;
            }
            EditTarget::Gallons => {
                self.state.gallons = value;
                self.state.liters = gallons_to_liters(value);
            }
            EditTarget::Liters => {
                self.state.liters = value;
                self.state.gallons = liters_to_gallons(value);
            }
            EditTarget::ExchangeRate => {
                self.state.exchange_rate = value;
            }
        }
        tracing::debug!(field = ?edit.target, ?representation, value, "Applied edit");

        Ok(EditOutcome::Applied {
            echo: Echo {
                target: edit.target,
                representation,
                text: edit.raw.trim().to_string(),
            },
        })
    }

    /// The base concept's row edits the base price.
    fn resolve_target(&self, target: EditTarget) -> Result<EditTarget, LedgerError> {
        match target {
            EditTarget::Concept(id) if self.concept(id)?.is_base => Ok(EditTarget::BasePrice),
            other => Ok(other),
        }
    }

    /// Current formatted text of one cell.
    pub fn display_cell(&self, target: EditTarget, representation: Representation) -> Result<String, LedgerError> {
        let places = self.state.decimal_places.digits();
        let text = match self.resolve_target(target)? {
            EditTarget::Concept(id) => format_number(self.concept_values(self.concept(id)?).get(representation), places),
            EditTarget::BasePrice => format_number(self.base_values().get(representation), places),
            EditTarget::Margin => format_number(self.margin_values().get(representation), places),
            EditTarget::Gallons => format_number(self.state.gallons, VOLUME_DECIMALS),
            EditTarget::Liters => format_number(self.state.liters, VOLUME_DECIMALS),
            EditTarget::ExchangeRate => format_number(self.state.exchange_rate, EXCHANGE_RATE_DECIMALS),
        };
        Ok(text)
    }
}
