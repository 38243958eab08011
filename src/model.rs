//! Core state: the lookup screen, the registration form and its
//! submission lifecycle.

use serde::{Deserialize, Serialize};

use crate::api::{ApiConfig, GuestPayload, HouseOption, ResidentRecord};
use crate::attachment::Attachment;
use crate::event::{FormField, Gender, PhotoSlot};
use crate::validation::{FormMode, ValidationErrors};
use crate::SEARCH_MIN_DIGITS;

/// Which screen the shell should be showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Lookup,
    Form,
}

/// Lifecycle of a submit attempt. `Validating` never survives a single
/// `update` call; it exists so the view can label the brief synchronous
/// check distinctly if it wants to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmitState {
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Submitting)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// One-shot banner the shell shows as a toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }
}

/// State of the phone lookup screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupState {
    pub phone: String,
    pub searching: bool,
}

impl LookupState {
    /// A search needs enough digits to be worth a round trip, and only
    /// one may be in flight.
    #[must_use]
    pub fn can_search(&self) -> bool {
        self.phone.len() >= SEARCH_MIN_DIGITS && !self.searching
    }
}

/// The registration form proper. Field values are stored post-
/// normalization; `errors` is refreshed on every edit and on submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuestForm {
    pub full_name: String,
    pub gender: Option<Gender>,
    pub phone_number: String,
    pub email: Option<String>,
    pub plate_number: String,
    pub house_id: Option<String>,
    pub visit_date: String,
    pub visit_time: String,
    pub guest_photo: Option<Attachment>,
    pub plate_photo: Option<Attachment>,
    pub errors: ValidationErrors,
    pub submit: SubmitState,
    /// Backend id of the record being updated; `None` means this is a
    /// fresh registration.
    pub editing: Option<String>,
    /// Expiry the pre-filled record came with, kept verbatim so an
    /// update that leaves the schedule untouched resubmits it as-is.
    pub stored_expired_at: Option<String>,
}

impl GuestForm {
    #[must_use]
    pub const fn mode(&self) -> FormMode {
        if self.editing.is_some() {
            FormMode::Update
        } else {
            FormMode::Register
        }
    }

    /// Called on every edit: the field's stale error is dropped, and a
    /// failed attempt returns to rest so the retry starts clean.
    pub fn note_edit(&mut self, field: FormField) {
        self.errors.remove(&field);
        if self.submit == SubmitState::Failed {
            self.submit = SubmitState::Idle;
        }
    }

    pub fn photo_mut(&mut self, slot: PhotoSlot) -> &mut Option<Attachment> {
        match slot {
            PhotoSlot::Guest => &mut self.guest_photo,
            PhotoSlot::Plate => &mut self.plate_photo,
        }
    }

    /// The expiry that would be submitted right now: the visit schedule
    /// when both halves are filled in, otherwise whatever the record
    /// already carried.
    #[must_use]
    pub fn expired_at(&self) -> Option<String> {
        if !self.visit_date.is_empty() && !self.visit_time.is_empty() {
            Some(merge_expiry(&self.visit_date, &self.visit_time))
        } else {
            self.stored_expired_at.clone()
        }
    }

    /// Assembles the submit body. `None` when a required piece is still
    /// missing; validation runs before this, so in practice `None` only
    /// happens if the photos or expiry are absent.
    #[must_use]
    pub fn payload(&self) -> Option<GuestPayload> {
        Some(GuestPayload {
            full_name: self.full_name.trim().to_string(),
            gender: self.gender?,
            phone_number: self.phone_number.clone(),
            email: self.email.as_ref().filter(|e| !e.is_empty()).cloned(),
            plate_number: self.plate_number.clone(),
            house_id: self.house_id.clone()?,
            birth_date: None,
            image: self.guest_photo.as_ref()?.transport_base64.clone(),
            plate_image: self.plate_photo.as_ref()?.transport_base64.clone(),
            expired_at: self.expired_at()?,
        })
    }

    /// Load an existing guest record into the form for updating.
    pub fn prefill(&mut self, record: &ResidentRecord) {
        *self = Self::default();
        self.editing = Some(record.id.clone());
        self.full_name = record.full_name.clone();
        self.gender = record.gender.as_deref().and_then(Gender::from_code);
        self.phone_number = record.phone_number.clone();
        self.email = record.email.clone().filter(|e| !e.is_empty());
        self.guest_photo = record
            .image_base64
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(Attachment::from_stored);

        if let Some(link) = record.resident_houses.first() {
            self.house_id = link.house.as_ref().map(|h| h.id.clone());
            if let Some(expired_at) = link.expired_at.as_deref() {
                self.stored_expired_at = Some(expired_at.to_string());
                if let Some((date, time)) = split_expiry(expired_at) {
                    self.visit_date = date;
                    self.visit_time = time;
                }
            }
            if let Some(vehicle) = link.guest_vehicles.first() {
                if let Some(plate) = &vehicle.plate_number {
                    self.plate_number = plate.clone();
                }
                self.plate_photo = vehicle
                    .plate_image_base64
                    .as_deref()
                    .filter(|b| !b.is_empty())
                    .map(Attachment::from_stored);
            }
        }
    }
}

/// `"2025-08-30 18:30:00"` → `("2025-08-30", "18:30")`. The seconds are
/// display noise and get dropped.
#[must_use]
pub fn split_expiry(expired_at: &str) -> Option<(String, String)> {
    let (date, time) = expired_at.split_once(' ')?;
    let hhmm: String = time.chars().take(5).collect();
    if date.is_empty() || hhmm.is_empty() {
        return None;
    }
    Some((date.to_string(), hhmm))
}

/// `("2025-08-30", "18:30")` → `"2025-08-30 18:30:00"`, the shape the
/// backend stores.
#[must_use]
pub fn merge_expiry(date: &str, time: &str) -> String {
    format!("{date} {time}:00")
}

#[derive(Default)]
pub struct Model {
    pub config: Option<ApiConfig>,
    pub screen: Screen,
    pub lookup: LookupState,
    pub form: GuestForm,
    pub houses: Vec<HouseOption>,
    pub houses_loading: bool,
    pub notice: Option<Notice>,
}
