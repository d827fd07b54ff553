// Concept ledger: the ordered list of priced concepts plus margin, and every
// derived representation, total and sale price computed from it.
//
// Each entity stores exactly one canonical `(value, representation)` pair.
// The base concept's pair is `LedgerState::base_price` in USD per gallon.

pub mod reconcile;
pub mod view;

pub use reconcile::{Echo, EditOutcome, EditTarget, FieldEdit};
pub use view::{ConceptView, DisplayRow, LedgerSnapshot, LedgerView, SnapshotRow};

use crate::config::CalculatorSettings;
use crate::conversion::{gallons_to_liters, PricingContext};
use crate::error::LedgerError;
use crate::reorder;
use shared::models::{Concept, ConceptId, DecimalPlaces, LedgerState, PriceInput, RepresentationSet};

/// Every operation on a ledger, for callers that dispatch user intents
/// through a single entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    CommitEdit(FieldEdit),
    AddConcept { name: String },
    RemoveConcept { id: ConceptId },
    RenameConcept { id: ConceptId, name: String },
    MoveToIndex { id: ConceptId, index: usize },
    MoveUp { id: ConceptId },
    MoveDown { id: ConceptId },
    SetDecimalPlaces(DecimalPlaces),
    ToggleDecimalPlaces,
    Replace(LedgerState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Edited(EditOutcome),
    Added(ConceptId),
    Removed(Concept),
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    state: LedgerState,
    base_concept_name: String,
}

impl Ledger {
    pub fn new(settings: &CalculatorSettings) -> Self {
        let state = LedgerState {
            decimal_places: settings.decimal_places,
            concepts: vec![Concept::base(settings.base_concept_name.clone())],
            ..LedgerState::default()
        };
        Ledger {
            state,
            base_concept_name: settings.base_concept_name.clone(),
        }
    }

    /// Wholesale replacement, e.g. from a preset.
    pub fn from_state(state: LedgerState, settings: &CalculatorSettings) -> Self {
        let mut ledger = Ledger {
            state,
            base_concept_name: settings.base_concept_name.clone(),
        };
        ledger.normalize();
        ledger
    }

    /// Restores the structural invariants: exactly one base concept and
    /// liters derived from gallons.
    fn normalize(&mut self) {
        let mut seen_base = false;
        for concept in self.state.concepts.iter_mut() {
            if concept.is_base {
                if seen_base {
                    tracing::warn!(concept_id = %concept.id, "Demoting duplicate base concept");
                    concept.is_base = false;
                }
                seen_base = true;
            }
        }
        if !seen_base {
            self.state.concepts.insert(0, Concept::base(self.base_concept_name.clone()));
        }
        self.state.liters = gallons_to_liters(self.state.gallons);
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.state.concepts
    }

    pub fn decimal_places(&self) -> DecimalPlaces {
        self.state.decimal_places
    }

    pub fn context(&self) -> PricingContext {
        PricingContext {
            exchange_rate: self.state.exchange_rate,
            gallons: self.state.gallons,
            liters: self.state.liters,
        }
    }

    pub fn base_concept(&self) -> Option<&Concept> {
        self.state.concepts.iter().find(|c| c.is_base)
    }

    pub fn concept(&self, id: ConceptId) -> Result<&Concept, LedgerError> {
        self.state
            .concepts
            .iter()
            .find(|c| c.id == id)
            .ok_or(LedgerError::ConceptNotFound(id))
    }

    fn concept_index(&self, id: ConceptId) -> Result<usize, LedgerError> {
        reorder::position(&self.state.concepts, id).ok_or(LedgerError::ConceptNotFound(id))
    }

    pub fn concept_input(&self, concept: &Concept) -> PriceInput {
        if concept.is_base {
            self.state.base_input()
        } else {
            concept.canonical()
        }
    }

    pub fn concept_values(&self, concept: &Concept) -> RepresentationSet {
        self.context().derive(self.concept_input(concept))
    }

    pub fn base_values(&self) -> RepresentationSet {
        self.context().derive(self.state.base_input())
    }

    /// Sum over all concepts, each representation independently.
    pub fn totals(&self) -> RepresentationSet {
        let ctx = self.context();
        self.state
            .concepts
            .iter()
            .map(|concept| ctx.derive(self.concept_input(concept)))
            .sum()
    }

    pub fn margin_values(&self) -> RepresentationSet {
        self.context().derive(self.state.margin_input())
    }

    pub fn sale_price(&self) -> RepresentationSet {
        self.totals() + self.margin_values()
    }

    pub fn add_concept(&mut self, name: impl Into<String>) -> ConceptId {
        let concept = Concept::new(name);
        let id = concept.id;
        tracing::debug!(concept_id = %id, name = %concept.name, "Adding concept");
        self.state.concepts.push(concept);
        id
    }

    pub fn remove_concept(&mut self, id: ConceptId) -> Result<Concept, LedgerError> {
        let index = self.concept_index(id)?;
        if self.state.concepts[index].is_base {
            return Err(LedgerError::BaseConceptRemoval);
        }
        if self.state.concepts.len() <= 1 {
            return Err(LedgerError::LastConcept);
        }
        let removed = self.state.concepts.remove(index);
        tracing::debug!(concept_id = %id, name = %removed.name, "Removed concept");
        Ok(removed)
    }

    pub fn rename_concept(&mut self, id: ConceptId, name: impl Into<String>) -> Result<(), LedgerError> {
        let index = self.concept_index(id)?;
        let concept = &mut self.state.concepts[index];
        if concept.is_base {
            return Err(LedgerError::BaseConceptRename);
        }
        concept.name = name.into();
        Ok(())
    }

    pub fn set_decimal_places(&mut self, places: DecimalPlaces) {
        self.state.decimal_places = places;
    }

    pub fn toggle_decimal_places(&mut self) -> DecimalPlaces {
        self.state.decimal_places = self.state.decimal_places.toggle();
        self.state.decimal_places
    }

    pub fn move_to_index(&mut self, id: ConceptId, index: usize) -> Result<bool, LedgerError> {
        reorder::move_to_index(&mut self.state.concepts, id, index).ok_or(LedgerError::ConceptNotFound(id))
    }

    pub fn move_up(&mut self, id: ConceptId) -> Result<bool, LedgerError> {
        reorder::move_up(&mut self.state.concepts, id).ok_or(LedgerError::ConceptNotFound(id))
    }

    pub fn move_down(&mut self, id: ConceptId) -> Result<bool, LedgerError> {
        reorder::move_down(&mut self.state.concepts, id).ok_or(LedgerError::ConceptNotFound(id))
    }

    pub fn apply(&mut self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
        let moved = |moved: bool| if moved { CommandOutcome::Changed } else { CommandOutcome::Unchanged };
        match command {
            LedgerCommand::CommitEdit(edit) => self.commit_edit(&edit).map(CommandOutcome::Edited),
            LedgerCommand::AddConcept { name } => Ok(CommandOutcome::Added(self.add_concept(name))),
            LedgerCommand::RemoveConcept { id } => self.remove_concept(id).map(CommandOutcome::Removed),
            LedgerCommand::RenameConcept { id, name } => {
                self.rename_concept(id, name)?;
                Ok(CommandOutcome::Changed)
            }
            LedgerCommand::MoveToIndex { id, index } => self.move_to_index(id, index).map(moved),
            LedgerCommand::MoveUp { id } => self.move_up(id).map(moved),
            LedgerCommand::MoveDown { id } => self.move_down(id).map(moved),
            LedgerCommand::SetDecimalPlaces(places) => {
                self.set_decimal_places(places);
                Ok(CommandOutcome::Changed)
            }
            LedgerCommand::ToggleDecimalPlaces => {
                self.toggle_decimal_places();
                Ok(CommandOutcome::Changed)
            }
            LedgerCommand::Replace(state) => {
                self.state = state;
                self.normalize();
                Ok(CommandOutcome::Changed)
            }
        }
    }
}
