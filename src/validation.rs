//! Form validation and input normalization.
//!
//! `validate` is a pure function of the form's current field values; it
//! holds no state and consults no clock, so the error map it produces is
//! identical for identical input regardless of history. Normalization
//! happens at the point of entry (the edit event), never here.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::event::FormField;
use crate::model::GuestForm;
use crate::{NAME_MAX_CHARS, NAME_MIN_CHARS, PHONE_MAX_DIGITS, PHONE_MIN_DIGITS, PLATE_MAX_CHARS};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// First failing rule per field; every field is always checked.
pub type ValidationErrors = BTreeMap<FormField, FieldError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    Required,
    TooShort,
    TooLong,
    InvalidFormat,
}

impl FieldError {
    /// The message shown inline under the field, matching the production UI.
    #[must_use]
    pub const fn message(self, field: FormField) -> &'static str {
        match (field, self) {
            (FormField::FullName, Self::Required) => "Full name is required",
            (FormField::FullName, Self::TooShort) => "Name must be at least 2 characters",
            (FormField::FullName, Self::TooLong) => "Name cannot exceed 35 characters",
            (FormField::Gender, _) => "Please select gender",
            (FormField::PhoneNumber, Self::Required) => "Phone number is required",
            (FormField::PhoneNumber, Self::InvalidFormat) => "Only numbers are allowed",
            (FormField::PhoneNumber, Self::TooShort) => "Phone number must be at least 10 digits",
            (FormField::PhoneNumber, Self::TooLong) => "Phone number cannot exceed 15 digits",
            (FormField::Email, _) => "Please enter a valid email",
            (FormField::PlateNumber, Self::Required) => "Plate number is required",
            (FormField::PlateNumber, _) => "Plate number cannot exceed 10 characters",
            (FormField::HouseId, _) => "Please select house number",
            (FormField::VisitDate, Self::Required) => "Visit date is required",
            (FormField::VisitDate, _) => "Please enter a valid date",
            (FormField::VisitTime, Self::Required) => "Visit time is required",
            (FormField::VisitTime, _) => "Please enter a valid time",
            _ => "Invalid value",
        }
    }
}

/// A pre-filled session updates an existing guest; a blank session
/// registers a new one. The visit schedule is only mandatory when
/// registering — an update may keep the expiry the record came with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Register,
    Update,
}

#[must_use]
pub fn validate(form: &GuestForm, mode: FormMode) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if form.full_name.trim().is_empty() {
        errors.insert(FormField::FullName, FieldError::Required);
    } else {
        let chars = form.full_name.chars().count();
        if chars < NAME_MIN_CHARS {
            errors.insert(FormField::FullName, FieldError::TooShort);
        } else if chars > NAME_MAX_CHARS {
            errors.insert(FormField::FullName, FieldError::TooLong);
        }
    }

    if form.gender.is_none() {
        errors.insert(FormField::Gender, FieldError::Required);
    }

    if form.phone_number.trim().is_empty() {
        errors.insert(FormField::PhoneNumber, FieldError::Required);
    } else if !form.phone_number.chars().all(|c| c.is_ascii_digit()) {
        errors.insert(FormField::PhoneNumber, FieldError::InvalidFormat);
    } else if form.phone_number.len() < PHONE_MIN_DIGITS {
        errors.insert(FormField::PhoneNumber, FieldError::TooShort);
    } else if form.phone_number.len() > PHONE_MAX_DIGITS {
        errors.insert(FormField::PhoneNumber, FieldError::TooLong);
    }

    if let Some(email) = &form.email {
        if !email.is_empty() && !email_pattern().is_match(email) {
            errors.insert(FormField::Email, FieldError::InvalidFormat);
        }
    }

    if form.plate_number.trim().is_empty() {
        errors.insert(FormField::PlateNumber, FieldError::Required);
    } else if form.plate_number.chars().count() > PLATE_MAX_CHARS {
        errors.insert(FormField::PlateNumber, FieldError::TooLong);
    }

    if form.house_id.is_none() {
        errors.insert(FormField::HouseId, FieldError::Required);
    }

    if form.visit_date.is_empty() {
        if mode == FormMode::Register {
            errors.insert(FormField::VisitDate, FieldError::Required);
        }
    } else if NaiveDate::parse_from_str(&form.visit_date, DATE_FORMAT).is_err() {
        errors.insert(FormField::VisitDate, FieldError::InvalidFormat);
    }

    if form.visit_time.is_empty() {
        if mode == FormMode::Register {
            errors.insert(FormField::VisitTime, FieldError::Required);
        }
    } else if NaiveTime::parse_from_str(&form.visit_time, TIME_FORMAT).is_err() {
        errors.insert(FormField::VisitTime, FieldError::InvalidFormat);
    }

    errors
}

/// Keystroke normalization for phone inputs: every non-digit is dropped.
#[must_use]
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Keystroke normalization for plate inputs: non-alphanumerics dropped,
/// rest uppercased.
#[must_use]
pub fn normalize_plate(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("pattern is valid"))
}
