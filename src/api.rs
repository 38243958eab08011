//! Request/response contract of the residence backend.
//!
//! The backend is consumed over four public endpoints, all authenticated
//! with a static `x-api-key` header. Search and housing responses wrap
//! their payload in `{ records: [...] }`; register/update responses carry
//! an application-level status alongside the HTTP one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::event::Gender;

pub const API_KEY_HEADER: &str = "x-api-key";

pub const RESIDENT_PATH: &str = "public/master/resident";
pub const HOUSING_PATH: &str = "public/master/housing";
pub const REGISTER_PATH: &str = "public/master/guest-register";
pub const UPDATE_PATH: &str = "public/master/update-guest";

/// Residency type filter for the lookup search; this kiosk only ever
/// deals with guests.
pub const RESIDENCE_TYPE: &str = "guest";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("api key must not be empty")]
    EmptyApiKey,
}

/// Backend endpoint and credentials, supplied by the shell at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    base_url: String,
    api_key: String,
}

impl ApiConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let parsed =
            Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl("missing host".into()));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }

        // Normalize the trailing slash so endpoint joins stay simple.
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{base_url}/")
        };

        Ok(Self { base_url, api_key })
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The phone is digit-normalized before it gets here, so it needs no
    /// percent-encoding.
    #[must_use]
    pub fn search_resident_url(&self, phone: &str) -> String {
        format!(
            "{}{}?search={}&residenceType={}&include[]=image_base64",
            self.base_url, RESIDENT_PATH, phone, RESIDENCE_TYPE
        )
    }

    #[must_use]
    pub fn housing_url(&self) -> String {
        format!("{}{}?isNotPaginate=true", self.base_url, HOUSING_PATH)
    }

    #[must_use]
    pub fn register_url(&self) -> String {
        format!("{}{}", self.base_url, REGISTER_PATH)
    }

    #[must_use]
    pub fn update_url(&self, resident_id: &str) -> String {
        format!("{}{}/{}", self.base_url, UPDATE_PATH, resident_id)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with HTTP status {0}")]
    Status(u16),
    #[error("request rejected: {message} (status {status})")]
    Rejected { status: u16, message: String },
}

// --- Lookup / pre-fill ---

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub records: Vec<ResidentRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidentRecord {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub resident_houses: Vec<ResidentHouseLink>,
}

/// Association between a guest record and a house, carrying its own
/// expiry and the registered vehicle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidentHouseLink {
    #[serde(default)]
    pub expired_at: Option<String>,
    #[serde(default)]
    pub house: Option<HouseRef>,
    #[serde(default)]
    pub guest_vehicles: Vec<GuestVehicle>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseRef {
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestVehicle {
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub plate_image_base64: Option<String>,
}

// --- Housing hierarchy ---

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingResponse {
    #[serde(default)]
    pub records: Vec<Region>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub houses: Vec<House>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub detail_address: Option<String>,
}

/// One selectable entry of the house picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseOption {
    pub id: String,
    pub label: String,
}

/// The housing endpoint returns the full region → cluster → block → house
/// hierarchy; the picker wants a flat list.
#[must_use]
pub fn flatten_housing(records: &[Region]) -> Vec<HouseOption> {
    records
        .iter()
        .flat_map(|region| &region.clusters)
        .flat_map(|cluster| &cluster.blocks)
        .flat_map(|block| &block.houses)
        .map(|house| HouseOption {
            id: house.id.clone(),
            label: match &house.detail_address {
                Some(detail) => format!("{} - {}", house.house_number, detail),
                None => house.house_number.clone(),
            },
        })
        .collect()
}

// --- Submission ---

/// Body of both the register (POST) and update (PUT) calls. `birth_date`
/// is a placeholder the backend expects to be present and null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuestPayload {
    pub full_name: String,
    pub gender: Gender,
    pub phone_number: String,
    pub email: Option<String>,
    pub plate_number: String,
    pub house_id: String,
    pub birth_date: Option<String>,
    pub image: String,
    pub plate_image: String,
    pub expired_at: String,
}

/// Application-level envelope of the register/update responses. Success
/// means HTTP success *and* `status` of 200 or 201 here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl SubmitAck {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}
