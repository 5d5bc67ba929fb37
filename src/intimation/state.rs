use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::form::{
    Allocation, AllocationPatch, InsurerInformation, InsurerInformationPatch, PolicyDetails,
    PolicyDetailsPatch, WorkshopDetails, WorkshopDetailsPatch,
};

/// Number of sequential intake sections.
pub const STEP_COUNT: usize = 4;

/// Field name to error sentence, one map per step.
pub type FieldErrors = HashMap<String, String>;

/// In-memory state of one claim intake in progress. No persistence lives
/// here: draft save and submit belong to the backend, this state only tracks
/// whether it has been flagged as saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntimationForm {
    pub policy: PolicyDetails,
    pub insurer: InsurerInformation,
    pub workshop: WorkshopDetails,
    pub allocation: Allocation,
    pub current_step: usize,
    pub is_draft_saved: bool,
    pub draft_id: Option<String>,
    pub reference_id: Option<String>,
    pub is_loading: bool,
    pub errors: [FieldErrors; STEP_COUNT],
}

/// One variant per state transition the form supports. Section patches carry
/// shallow-merge semantics and always drop the draft-saved flag, even when
/// the patch is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormAction {
    PatchPolicy(PolicyDetailsPatch),
    PatchInsurer(InsurerInformationPatch),
    PatchWorkshop(WorkshopDetailsPatch),
    PatchAllocation(AllocationPatch),
    SetStep { step: usize },
    SetDraftId { draft_id: Option<String> },
    SetReferenceId { reference_id: Option<String> },
    SetErrors { step: usize, errors: FieldErrors },
    ClearErrors { step: usize },
    SetLoading { loading: bool },
    MarkDraftSaved,
    Reset,
}

impl IntimationForm {
    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::PatchPolicy(p) => {
                p.apply_to(&mut self.policy);
                self.is_draft_saved = false;
            }
            FormAction::PatchInsurer(p) => {
                p.apply_to(&mut self.insurer);
                self.is_draft_saved = false;
            }
            FormAction::PatchWorkshop(p) => {
                p.apply_to(&mut self.workshop);
                self.is_draft_saved = false;
            }
            FormAction::PatchAllocation(p) => {
                p.apply_to(&mut self.allocation);
                self.is_draft_saved = false;
            }
            // Range discipline is the caller's; the expected values are 0..=3.
            FormAction::SetStep { step } => self.current_step = step,
            FormAction::SetDraftId { draft_id } => self.draft_id = draft_id,
            FormAction::SetReferenceId { reference_id } => self.reference_id = reference_id,
            FormAction::SetErrors { step, errors } => {
                // Steps without an error slot have nowhere to put the map; dropped.
                if let Some(slot) = self.errors.get_mut(step) {
                    *slot = errors;
                }
            }
            FormAction::ClearErrors { step } => {
                if let Some(slot) = self.errors.get_mut(step) {
                    slot.clear();
                }
            }
            FormAction::SetLoading { loading } => self.is_loading = loading,
            FormAction::MarkDraftSaved => self.is_draft_saved = true,
            FormAction::Reset => *self = Self::default(),
        }
    }

    /// True when any field across the four sections moved off its empty
    /// sentinel. Step position, error maps and identifiers do not count as
    /// user changes.
    pub fn has_unsaved_changes(&self) -> bool {
        !(self.policy.is_pristine()
            && self.insurer.is_pristine()
            && self.workshop.is_pristine()
            && self.allocation.is_pristine())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
