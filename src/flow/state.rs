use serde::{Deserialize, Serialize};

use crate::database::models::BookingType;

/// Everything a booking needs before the client types their contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub specialist_id: String,
    pub specialist_name: String,
    pub date: String,
    pub time: String,
    pub booking_type: BookingType,
    /// `HH:MM` for scheduled bookings, a phrase like "within 15 minutes" for urgent ones.
    pub time_label: String,
}

/// Per-chat conversation state. Each variant carries only what its step needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    #[default]
    Idle,

    // Client booking flow
    ViewingSpecialist {
        specialist_id: String,
    },
    ChoosingTimeType {
        specialist_id: String,
    },
    ChoosingTime {
        specialist_id: String,
    },
    EnteringName {
        draft: BookingDraft,
    },
    EnteringPhone {
        draft: BookingDraft,
        client_name: String,
    },

    // Admin capture steps
    AddSpecialistId,
    AddSpecialistName {
        id: String,
    },
    AddSpecialistDescription {
        id: String,
        name: String,
    },
    AddSpecialistPhoto {
        id: String,
        name: String,
        description: String,
    },
    EditSpecialistName {
        id: String,
    },
    EditSpecialistDescription {
        id: String,
    },
    EditSpecialistPhoto {
        id: String,
    },
    AddTimeSlot,
}

impl DialogueState {
    /// States whose free text belongs to the client booking flow.
    pub fn awaits_client_text(&self) -> bool {
        matches!(
            self,
            DialogueState::EnteringName { .. } | DialogueState::EnteringPhone { .. }
        )
    }

    /// States whose text or photo messages belong to the admin panel.
    pub fn awaits_admin_input(&self) -> bool {
        matches!(
            self,
            DialogueState::AddSpecialistId
                | DialogueState::AddSpecialistName { .. }
                | DialogueState::AddSpecialistDescription { .. }
                | DialogueState::AddSpecialistPhoto { .. }
                | DialogueState::EditSpecialistName { .. }
                | DialogueState::EditSpecialistDescription { .. }
                | DialogueState::EditSpecialistPhoto { .. }
                | DialogueState::AddTimeSlot
        )
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::ViewingSpecialist { .. } => "viewing_specialist",
            DialogueState::ChoosingTimeType { .. } => "choosing_time_type",
            DialogueState::ChoosingTime { .. } => "choosing_time",
            DialogueState::EnteringName { .. } => "entering_name",
            DialogueState::EnteringPhone { .. } => "entering_phone",
            DialogueState::AddSpecialistId => "add_specialist_id",
            DialogueState::AddSpecialistName { .. } => "add_specialist_name",
            DialogueState::AddSpecialistDescription { .. } => "add_specialist_description",
            DialogueState::AddSpecialistPhoto { .. } => "add_specialist_photo",
            DialogueState::EditSpecialistName { .. } => "edit_specialist_name",
            DialogueState::EditSpecialistDescription { .. } => "edit_specialist_description",
            DialogueState::EditSpecialistPhoto { .. } => "edit_specialist_photo",
            DialogueState::AddTimeSlot => "add_time_slot",
        }
    }
}
