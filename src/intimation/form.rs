//! Section data for the four intake steps, plus the patch types used for
//! shallow-merge updates. A field is "untouched" while it still holds its
//! empty sentinel: `""`, `0`, `false` or `None`. Zero and false therefore
//! read as untouched even when typed deliberately; the dirty check is lossy
//! on purpose to match the submission flow's draft semantics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyDetails {
    pub policy_number: String,
    pub insured_name: String,
    pub vehicle_registration: String,
    pub date_of_loss: String,
    pub loss_description: String,
    pub claim_type: String,
}

impl PolicyDetails {
    pub fn is_pristine(&self) -> bool {
        self.policy_number.is_empty()
            && self.insured_name.is_empty()
            && self.vehicle_registration.is_empty()
            && self.date_of_loss.is_empty()
            && self.loss_description.is_empty()
            && self.claim_type.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_registration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_loss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
}

impl PolicyDetailsPatch {
    pub fn apply_to(&self, target: &mut PolicyDetails) {
        if let Some(v) = &self.policy_number { target.policy_number = v.clone(); }
        if let Some(v) = &self.insured_name { target.insured_name = v.clone(); }
        if let Some(v) = &self.vehicle_registration { target.vehicle_registration = v.clone(); }
        if let Some(v) = &self.date_of_loss { target.date_of_loss = v.clone(); }
        if let Some(v) = &self.loss_description { target.loss_description = v.clone(); }
        if let Some(v) = &self.claim_type { target.claim_type = v.clone(); }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsurerInformation {
    pub insurer_name: String,
    pub branch: String,
    pub contact_person: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub policy_start: String,
    pub policy_end: String,
}

impl InsurerInformation {
    pub fn is_pristine(&self) -> bool {
        self.insurer_name.is_empty()
            && self.branch.is_empty()
            && self.contact_person.is_empty()
            && self.contact_email.is_empty()
            && self.contact_phone.is_empty()
            && self.policy_start.is_empty()
            && self.policy_end.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsurerInformationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_end: Option<String>,
}

impl InsurerInformationPatch {
    pub fn apply_to(&self, target: &mut InsurerInformation) {
        if let Some(v) = &self.insurer_name { target.insurer_name = v.clone(); }
        if let Some(v) = &self.branch { target.branch = v.clone(); }
        if let Some(v) = &self.contact_person { target.contact_person = v.clone(); }
        if let Some(v) = &self.contact_email { target.contact_email = v.clone(); }
        if let Some(v) = &self.contact_phone { target.contact_phone = v.clone(); }
        if let Some(v) = &self.policy_start { target.policy_start = v.clone(); }
        if let Some(v) = &self.policy_end { target.policy_end = v.clone(); }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkshopDetails {
    pub workshop_name: String,
    pub workshop_city: String,
    pub workshop_address: String,
    pub contact_phone: String,
    pub estimated_cost: f64,
    pub vehicle_at_workshop: bool,
}

impl WorkshopDetails {
    pub fn is_pristine(&self) -> bool {
        self.workshop_name.is_empty()
            && self.workshop_city.is_empty()
            && self.workshop_address.is_empty()
            && self.contact_phone.is_empty()
            && self.estimated_cost == 0.0
            && !self.vehicle_at_workshop
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkshopDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_at_workshop: Option<bool>,
}

impl WorkshopDetailsPatch {
    pub fn apply_to(&self, target: &mut WorkshopDetails) {
        if let Some(v) = &self.workshop_name { target.workshop_name = v.clone(); }
        if let Some(v) = &self.workshop_city { target.workshop_city = v.clone(); }
        if let Some(v) = &self.workshop_address { target.workshop_address = v.clone(); }
        if let Some(v) = &self.contact_phone { target.contact_phone = v.clone(); }
        if let Some(v) = self.estimated_cost { target.estimated_cost = v; }
        if let Some(v) = self.vehicle_at_workshop { target.vehicle_at_workshop = v; }
    }
}

/// Preferred workshop nominated by the insured, inspected one level deep by
/// the dirty check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkshopPreference {
    pub preferred: bool,
    pub name: String,
    pub city: String,
}

impl WorkshopPreference {
    pub fn is_pristine(&self) -> bool {
        !self.preferred && self.name.is_empty() && self.city.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SurveyorPreference {
    pub required: bool,
    pub name: String,
    pub phone: String,
}

impl SurveyorPreference {
    pub fn is_pristine(&self) -> bool {
        !self.required && self.name.is_empty() && self.phone.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    pub claim_handler_id: i64,
    pub remarks: String,
    pub workshop_preference: WorkshopPreference,
    pub surveyor_preference: SurveyorPreference,
}

impl Allocation {
    pub fn is_pristine(&self) -> bool {
        self.claim_handler_id == 0
            && self.remarks.is_empty()
            && self.workshop_preference.is_pristine()
            && self.surveyor_preference.is_pristine()
    }
}

/// Shallow merge: scalar fields are replaced individually, the nested
/// preference objects are replaced wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AllocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_handler_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_preference: Option<WorkshopPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surveyor_preference: Option<SurveyorPreference>,
}

impl AllocationPatch {
    pub fn apply_to(&self, target: &mut Allocation) {
        if let Some(v) = self.claim_handler_id { target.claim_handler_id = v; }
        if let Some(v) = &self.remarks { target.remarks = v.clone(); }
        if let Some(v) = &self.workshop_preference { target.workshop_preference = v.clone(); }
        if let Some(v) = &self.surveyor_preference { target.surveyor_preference = v.clone(); }
    }
}
