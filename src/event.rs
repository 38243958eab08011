use serde::{Deserialize, Serialize};

use crate::api::{ApiConfig, HousingResponse, SearchResponse, SubmitAck};

/// Form fields addressable by the shell; doubles as the key of the
/// validation error map.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    FullName,
    Gender,
    PhoneNumber,
    Email,
    PlateNumber,
    HouseId,
    VisitDate,
    VisitTime,
}

impl FormField {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Gender => "gender",
            Self::PhoneNumber => "phone_number",
            Self::Email => "email",
            Self::PlateNumber => "plate_number",
            Self::HouseId => "house_id",
            Self::VisitDate => "visit_date",
            Self::VisitTime => "visit_time",
        }
    }
}

/// Wire codes follow the backend contract: `"m"` / `"f"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Self::Male),
            "f" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSlot {
    Guest,
    Plate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Event {
    /// Shell hands over backend endpoint and credentials on launch.
    Started { config: ApiConfig },

    // Lookup screen
    LookupPhoneEdited(String),
    SearchPressed,
    /// Fed back by the HTTP capability, never by the shell directly.
    #[serde(skip)]
    SearchResponse(crux_http::Result<crux_http::Response<SearchResponse>>),
    NewRegistrationPressed,
    BackToLookupPressed,

    // Form screen
    FieldEdited {
        field: FormField,
        value: String,
    },
    GenderSelected(Gender),
    HouseSelected {
        house_id: String,
    },
    #[serde(skip)]
    HousingResponse(crux_http::Result<crux_http::Response<HousingResponse>>),
    PhotoAttached {
        slot: PhotoSlot,
        mime_type: String,
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    },
    PhotoRemoved {
        slot: PhotoSlot,
    },
    ResetPressed,
    SubmitPressed,
    #[serde(skip)]
    SubmitResponse(crux_http::Result<crux_http::Response<SubmitAck>>),
}
