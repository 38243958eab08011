#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared core of the guest self-registration kiosk for a residential
//! complex. Shells (web, Android, iOS) render the [`ViewModel`] and feed
//! [`Event`]s back in; every remote call leaves the core as an HTTP effect.

pub mod api;
pub mod app;
pub mod attachment;
pub mod capabilities;
pub mod event;
pub mod model;
pub mod validation;

pub use api::{ApiConfig, ConfigError, HouseOption, ResidentRecord, TransportError};
pub use app::{App, FormView, LookupView, ViewModel};
pub use attachment::{Attachment, AttachmentError, MAX_UPLOAD_MIB};
pub use capabilities::{Capabilities, Effect};
pub use event::{Event, FormField, Gender, PhotoSlot};
pub use model::{GuestForm, LookupState, Model, Notice, NoticeKind, Screen, SubmitState};
pub use validation::{validate, FieldError, FormMode, ValidationErrors};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 35;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const PLATE_MAX_CHARS: usize = 10;

/// Digits needed before the lookup screen enables its search action.
pub const SEARCH_MIN_DIGITS: usize = 10;
