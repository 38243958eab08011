//! Event loop of the registration kiosk.
//!
//! `update` is the single entry point for everything that happens: shell
//! interactions arrive as [`Event`]s, remote calls leave as HTTP effects
//! and come back as `*Response` events. The model is only ever mutated
//! here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{flatten_housing, HouseOption, SubmitAck, API_KEY_HEADER};
use crate::attachment::Attachment;
use crate::capabilities::Capabilities;
use crate::event::{Event, FormField, Gender, PhotoSlot};
use crate::model::{GuestForm, LookupState, Model, Notice, Screen, SubmitState};
use crate::validation::{self, FormMode};

pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields";
pub const MSG_PHOTOS_REQUIRED: &str = "Please upload both guest and plate images";
pub const MSG_PHONE_NOT_FOUND: &str = "Phone number not found";
pub const MSG_REGISTERED: &str = "Guest registered successfully";
pub const MSG_UPDATED: &str = "Guest updated successfully";
pub const MSG_SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const MSG_SUBMIT_FAILED: &str = "Registration failed. Please try again.";
pub const MSG_HOUSES_FAILED: &str = "Failed to load house list";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupView {
    pub phone: String,
    pub searching: bool,
    pub can_search: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
    pub mode: FormMode,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub phone_number: String,
    pub email: String,
    pub plate_number: String,
    pub house_id: Option<String>,
    pub visit_date: String,
    pub visit_time: String,
    /// Inline messages keyed by field name, ready to render.
    pub errors: BTreeMap<String, String>,
    pub houses: Vec<HouseOption>,
    pub houses_loading: bool,
    /// `data:` URIs for the two preview thumbnails.
    pub guest_photo: Option<String>,
    pub plate_photo: Option<String>,
    pub submit: SubmitState,
    pub can_submit: bool,
    /// The expiry that would be sent if the form were submitted now.
    pub expiry_preview: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub screen: Screen,
    pub notice: Option<Notice>,
    pub lookup: LookupView,
    pub form: FormView,
}

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Self::Event, model: &mut Self::Model, caps: &Self::Capabilities) {
        match event {
            Event::Started { config } => {
                debug!("core started");
                model.config = Some(config);
            }

            Event::LookupPhoneEdited(input) => {
                model.lookup.phone = validation::normalize_phone(&input);
            }
            Event::SearchPressed => Self::begin_search(model, caps),
            Event::SearchResponse(result) => Self::handle_search_response(result, model, caps),

            Event::NewRegistrationPressed => {
                model.form = GuestForm::default();
                model.notice = None;
                model.screen = Screen::Form;
                Self::fetch_housing(model, caps);
            }
            Event::BackToLookupPressed => {
                model.form = GuestForm::default();
                model.notice = None;
                model.screen = Screen::Lookup;
            }

            Event::FieldEdited { field, value } => Self::apply_edit(&mut model.form, field, value),
            Event::GenderSelected(gender) => {
                model.form.gender = Some(gender);
                model.form.note_edit(FormField::Gender);
            }
            Event::HouseSelected { house_id } => {
                model.form.house_id = Some(house_id);
                model.form.note_edit(FormField::HouseId);
            }
            Event::HousingResponse(result) => Self::handle_housing_response(result, model),

            Event::PhotoAttached { slot, mime_type, data } => {
                Self::attach_photo(model, slot, &mime_type, &data);
            }
            Event::PhotoRemoved { slot } => {
                *model.form.photo_mut(slot) = None;
                if model.form.submit == SubmitState::Failed {
                    model.form.submit = SubmitState::Idle;
                }
            }
            Event::ResetPressed => {
                model.form = GuestForm::default();
                model.notice = None;
            }

            Event::SubmitPressed => Self::begin_submit(model, caps),
            Event::SubmitResponse(result) => Self::handle_submit_response(result, model),
        }

        caps.render.render();
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        let form = &model.form;

        let errors = form
            .errors
            .iter()
            .map(|(field, error)| (field.name().to_string(), error.message(*field).to_string()))
            .collect();

        ViewModel {
            screen: model.screen,
            notice: model.notice.clone(),
            lookup: LookupView {
                phone: model.lookup.phone.clone(),
                searching: model.lookup.searching,
                can_search: model.lookup.can_search(),
            },
            form: FormView {
                mode: form.mode(),
                full_name: form.full_name.clone(),
                gender: form.gender,
                phone_number: form.phone_number.clone(),
                email: form.email.clone().unwrap_or_default(),
                plate_number: form.plate_number.clone(),
                house_id: form.house_id.clone(),
                visit_date: form.visit_date.clone(),
                visit_time: form.visit_time.clone(),
                errors,
                houses: model.houses.clone(),
                houses_loading: model.houses_loading,
                guest_photo: form.guest_photo.as_ref().map(|a| a.preview_data_uri.clone()),
                plate_photo: form.plate_photo.as_ref().map(|a| a.preview_data_uri.clone()),
                submit: form.submit,
                can_submit: !form.submit.is_in_flight(),
                expiry_preview: form.expired_at(),
            },
        }
    }
}

impl App {
    fn begin_search(model: &mut Model, caps: &Capabilities) {
        if !model.lookup.can_search() {
            debug!(digits = model.lookup.phone.len(), "search gate not met");
            return;
        }
        let Some(config) = &model.config else {
            warn!("search pressed before configuration arrived");
            return;
        };

        model.lookup.searching = true;
        model.notice = None;

        caps.http
            .get(config.search_resident_url(&model.lookup.phone))
            .header(API_KEY_HEADER, config.api_key())
            .expect_json()
            .send(Event::SearchResponse);
    }

    fn handle_search_response(
        result: crux_http::Result<crux_http::Response<crate::api::SearchResponse>>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        model.lookup.searching = false;

        match result {
            Ok(mut response) if response.status().is_success() => {
                let record = response
                    .take_body()
                    .and_then(|body| body.records.into_iter().next());
                match record {
                    Some(record) => {
                        debug!(guest = %record.id, "lookup matched, pre-filling form");
                        model.form.prefill(&record);
                        model.notice = None;
                        model.screen = Screen::Form;
                        Self::fetch_housing(model, caps);
                    }
                    None => {
                        model.notice = Some(Notice::info(MSG_PHONE_NOT_FOUND));
                    }
                }
            }
            Ok(response) => {
                warn!(status = u16::from(response.status()), "lookup rejected");
                model.notice = Some(Notice::error(MSG_SEARCH_FAILED));
            }
            Err(error) => {
                warn!(%error, "lookup request failed");
                model.notice = Some(Notice::error(MSG_SEARCH_FAILED));
            }
        }
    }

    fn fetch_housing(model: &mut Model, caps: &Capabilities) {
        if model.houses_loading {
            return;
        }
        let Some(config) = &model.config else {
            warn!("house list requested before configuration arrived");
            return;
        };

        model.houses_loading = true;

        caps.http
            .get(config.housing_url())
            .header(API_KEY_HEADER, config.api_key())
            .expect_json()
            .send(Event::HousingResponse);
    }

    fn handle_housing_response(
        result: crux_http::Result<crux_http::Response<crate::api::HousingResponse>>,
        model: &mut Model,
    ) {
        model.houses_loading = false;

        match result {
            Ok(mut response) if response.status().is_success() => {
                if let Some(body) = response.take_body() {
                    model.houses = flatten_housing(&body.records);
                    debug!(houses = model.houses.len(), "house list loaded");
                } else {
                    model.notice = Some(Notice::error(MSG_HOUSES_FAILED));
                }
            }
            Ok(response) => {
                warn!(status = u16::from(response.status()), "house list rejected");
                model.notice = Some(Notice::error(MSG_HOUSES_FAILED));
            }
            Err(error) => {
                warn!(%error, "house list request failed");
                model.notice = Some(Notice::error(MSG_HOUSES_FAILED));
            }
        }
    }

    fn apply_edit(form: &mut GuestForm, field: FormField, value: String) {
        match field {
            FormField::FullName => form.full_name = value,
            FormField::PhoneNumber => form.phone_number = validation::normalize_phone(&value),
            FormField::Email => {
                form.email = if value.is_empty() { None } else { Some(value) };
            }
            FormField::PlateNumber => form.plate_number = validation::normalize_plate(&value),
            FormField::VisitDate => form.visit_date = value,
            FormField::VisitTime => form.visit_time = value,
            FormField::Gender | FormField::HouseId => {
                warn!(field = field.name(), "selection fields have dedicated events");
                return;
            }
        }
        form.note_edit(field);
    }

    fn attach_photo(model: &mut Model, slot: PhotoSlot, mime_type: &str, data: &[u8]) {
        match Attachment::from_upload(mime_type, data) {
            Ok(attachment) => {
                *model.form.photo_mut(slot) = Some(attachment);
                if model.form.submit == SubmitState::Failed {
                    model.form.submit = SubmitState::Idle;
                }
            }
            Err(error) => {
                debug!(%error, ?slot, "photo rejected");
                model.notice = Some(Notice::error(error.to_string()));
            }
        }
    }

    fn begin_submit(model: &mut Model, caps: &Capabilities) {
        if model.form.submit.is_in_flight() {
            debug!("submit ignored, one already in flight");
            return;
        }
        let Some(config) = model.config.clone() else {
            warn!("submit pressed before configuration arrived");
            return;
        };

        model.form.submit = SubmitState::Validating;
        model.form.errors = validation::validate(&model.form, model.form.mode());
        if !model.form.errors.is_empty() {
            model.form.submit = SubmitState::Idle;
            model.notice = Some(Notice::error(MSG_REQUIRED_FIELDS));
            return;
        }
        if model.form.guest_photo.is_none() || model.form.plate_photo.is_none() {
            model.form.submit = SubmitState::Idle;
            model.notice = Some(Notice::error(MSG_PHOTOS_REQUIRED));
            return;
        }
        let Some(payload) = model.form.payload() else {
            // Only reachable updating a record that never carried an expiry.
            model.form.submit = SubmitState::Idle;
            model.notice = Some(Notice::error(MSG_REQUIRED_FIELDS));
            return;
        };

        let builder = match &model.form.editing {
            Some(id) => caps.http.put(config.update_url(id)),
            None => caps.http.post(config.register_url()),
        };

        match builder
            .header(API_KEY_HEADER, config.api_key())
            .body_json(&payload)
        {
            Ok(request) => {
                model.form.submit = SubmitState::Submitting;
                model.notice = None;
                request.expect_json().send(Event::SubmitResponse);
            }
            Err(error) => {
                warn!(%error, "could not encode submit body");
                model.form.submit = SubmitState::Failed;
                model.notice = Some(Notice::error(MSG_SUBMIT_FAILED));
            }
        }
    }

    fn handle_submit_response(
        result: crux_http::Result<crux_http::Response<SubmitAck>>,
        model: &mut Model,
    ) {
        if !model.form.submit.is_in_flight() {
            debug!("stale submit response dropped");
            return;
        }

        match result {
            Ok(mut response) if response.status().is_success() => match response.take_body() {
                Some(ack) if ack.is_accepted() => {
                    let was_update = model.form.editing.is_some();
                    debug!(was_update, "submission accepted");
                    model.form = GuestForm {
                        submit: SubmitState::Succeeded,
                        ..GuestForm::default()
                    };
                    model.screen = Screen::Lookup;
                    model.lookup = LookupState::default();
                    model.notice = Some(Notice::success(if was_update {
                        MSG_UPDATED
                    } else {
                        MSG_REGISTERED
                    }));
                }
                Some(ack) => {
                    warn!(status = ack.status, message = %ack.message, "submission rejected");
                    Self::submit_failed(model, &ack);
                }
                None => {
                    warn!("submission response had no body");
                    model.form.submit = SubmitState::Failed;
                    model.notice = Some(Notice::error(MSG_SUBMIT_FAILED));
                }
            },
            Ok(response) => {
                warn!(status = u16::from(response.status()), "submission rejected");
                model.form.submit = SubmitState::Failed;
                model.notice = Some(Notice::error(MSG_SUBMIT_FAILED));
            }
            Err(error) => {
                warn!(%error, "submission request failed");
                model.form.submit = SubmitState::Failed;
                model.notice = Some(Notice::error(MSG_SUBMIT_FAILED));
            }
        }
    }

    /// HTTP succeeded but the envelope said no. Surface the backend's own
    /// message when it sent one.
    fn submit_failed(model: &mut Model, ack: &SubmitAck) {
        model.form.submit = SubmitState::Failed;
        let message = if ack.message.is_empty() {
            MSG_SUBMIT_FAILED.to_string()
        } else {
            ack.message.clone()
        };
        model.notice = Some(Notice::error(message));
    }
}
