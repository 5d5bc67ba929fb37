//! Four-step claim-intake form: section data, per-step validation error maps,
//! draft/reference tracking and step progression, driven by a typed action
//! set through a single reducer.

mod form;
mod state;

pub use form::{
    Allocation, AllocationPatch, InsurerInformation, InsurerInformationPatch, PolicyDetails,
    PolicyDetailsPatch, SurveyorPreference, WorkshopDetails, WorkshopDetailsPatch,
    WorkshopPreference,
};
pub use state::{FieldErrors, FormAction, IntimationForm, STEP_COUNT};
