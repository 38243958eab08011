use assert_matches::assert_matches;
use crux_core::testing::AppTester;
use crux_http::testing::ResponseBuilder;

use gatepass_core::api::{
    Block, Cluster, GuestVehicle, House, HouseRef, HousingResponse, Region, ResidentHouseLink,
    ResidentRecord, SearchResponse, SubmitAck,
};
use gatepass_core::app::{
    MSG_PHOTOS_REQUIRED, MSG_REGISTERED, MSG_REQUIRED_FIELDS, MSG_SUBMIT_FAILED, MSG_UPDATED,
};
use gatepass_core::{
    ApiConfig, App, Effect, Event, FormField, Gender, Model, Notice, NoticeKind, PhotoSlot,
    Screen, SubmitState,
};

fn started() -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let config = ApiConfig::new("https://api.example.test/", "test-key").unwrap();
    app.update(Event::Started { config }, &mut model);
    (app, model)
}

fn http_operations(effects: &[Effect]) -> Vec<&crux_http::protocol::HttpRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .collect()
}

fn housing_with_one_house() -> HousingResponse {
    HousingResponse {
        records: vec![Region {
            clusters: vec![Cluster {
                blocks: vec![Block {
                    houses: vec![House {
                        id: "h1".into(),
                        house_number: "A-01".into(),
                        detail_address: Some("Jl. Melati 1".into()),
                    }],
                }],
            }],
        }],
    }
}

/// Opens a blank registration form with the house list already loaded.
fn open_form() -> (AppTester<App, Effect>, Model) {
    let (app, mut model) = started();
    app.update(Event::NewRegistrationPressed, &mut model);
    let response = ResponseBuilder::ok().body(housing_with_one_house()).build();
    app.update(Event::HousingResponse(Ok(response)), &mut model);
    (app, model)
}

fn edit(app: &AppTester<App, Effect>, model: &mut Model, field: FormField, value: &str) {
    app.update(Event::FieldEdited { field, value: value.into() }, model);
}

/// Fills every field with raw (un-normalized) input and attaches both photos.
fn fill_valid_form(app: &AppTester<App, Effect>, model: &mut Model) {
    edit(app, model, FormField::FullName, "Jane Doe");
    app.update(Event::GenderSelected(Gender::Female), model);
    edit(app, model, FormField::PhoneNumber, "0812-345-678");
    edit(app, model, FormField::Email, "jane@example.com");
    edit(app, model, FormField::PlateNumber, "b 1234 xyz");
    app.update(Event::HouseSelected { house_id: "h1".into() }, model);
    edit(app, model, FormField::VisitDate, "2025-09-01");
    edit(app, model, FormField::VisitTime, "18:30");
    app.update(
        Event::PhotoAttached {
            slot: PhotoSlot::Guest,
            mime_type: "image/png".into(),
            data: vec![1, 2, 3],
        },
        model,
    );
    app.update(
        Event::PhotoAttached {
            slot: PhotoSlot::Plate,
            mime_type: "image/jpeg".into(),
            data: vec![4, 5, 6],
        },
        model,
    );
}

#[test]
fn house_hierarchy_flattens_into_the_picker() {
    let (_app, model) = open_form();

    assert!(!model.houses_loading);
    assert_eq!(model.houses.len(), 1);
    assert_eq!(model.houses[0].id, "h1");
    assert_eq!(model.houses[0].label, "A-01 - Jl. Melati 1");
}

#[test]
fn submit_blocked_while_invalid() {
    let (app, mut model) = open_form();

    let update = app.update(Event::SubmitPressed, &mut model);

    assert!(http_operations(&update.effects).is_empty());
    assert!(!model.form.errors.is_empty());
    assert_eq!(model.form.submit, SubmitState::Idle);
    assert_eq!(model.notice, Some(Notice::error(MSG_REQUIRED_FIELDS)));

    // The view carries rendered messages for the shell.
    let view = app.view(&model);
    assert_eq!(
        view.form.errors.get("full_name").map(String::as_str),
        Some("Full name is required")
    );
}

#[test]
fn submit_blocked_without_both_photos() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);
    app.update(Event::PhotoRemoved { slot: PhotoSlot::Plate }, &mut model);

    let update = app.update(Event::SubmitPressed, &mut model);

    assert!(http_operations(&update.effects).is_empty());
    assert_eq!(model.form.submit, SubmitState::Idle);
    assert_eq!(model.notice, Some(Notice::error(MSG_PHOTOS_REQUIRED)));
}

#[test]
fn oversized_photo_is_rejected_with_a_notice() {
    let (app, mut model) = open_form();

    app.update(
        Event::PhotoAttached {
            slot: PhotoSlot::Guest,
            mime_type: "image/jpeg".into(),
            data: vec![0u8; 5 * 1024 * 1024],
        },
        &mut model,
    );

    assert!(model.form.guest_photo.is_none());
    assert_matches!(
        &model.notice,
        Some(Notice { kind: NoticeKind::Error, message })
            if message == "Please select an image file less than 5MB"
    );
}

#[test]
fn register_posts_the_normalized_payload() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);

    let update = app.update(Event::SubmitPressed, &mut model);

    let operations = http_operations(&update.effects);
    assert_eq!(operations.len(), 1);
    let operation = operations[0];
    assert_eq!(operation.method, "POST");
    assert_eq!(
        operation.url,
        "https://api.example.test/public/master/guest-register"
    );
    assert!(operation
        .headers
        .iter()
        .any(|h| h.name == "x-api-key" && h.value == "test-key"));

    let body: serde_json::Value = serde_json::from_slice(&operation.body).unwrap();
    assert_eq!(body["full_name"], "Jane Doe");
    assert_eq!(body["gender"], "f");
    assert_eq!(body["phone_number"], "0812345678");
    assert_eq!(body["plate_number"], "B1234XYZ");
    assert_eq!(body["house_id"], "h1");
    assert!(body["birth_date"].is_null());
    assert_eq!(body["expired_at"], "2025-09-01 18:30:00");
    assert_eq!(body["image"], "AQID");
    assert_eq!(body["plate_image"], "BAUG");

    assert_eq!(model.form.submit, SubmitState::Submitting);

    // Pressing again while in flight must not dispatch a second request.
    let update = app.update(Event::SubmitPressed, &mut model);
    assert!(http_operations(&update.effects).is_empty());
    assert_eq!(model.form.submit, SubmitState::Submitting);
}

#[test]
fn accepted_submission_wipes_the_form_and_returns_to_lookup() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);
    app.update(Event::SubmitPressed, &mut model);

    let ack = SubmitAck { status: 201, message: "created".into() };
    let response = ResponseBuilder::ok().body(ack).build();
    app.update(Event::SubmitResponse(Ok(response)), &mut model);

    assert_eq!(model.screen, Screen::Lookup);
    assert!(model.lookup.phone.is_empty());
    assert!(model.form.full_name.is_empty());
    assert!(model.form.guest_photo.is_none());
    assert_eq!(model.form.submit, SubmitState::Succeeded);
    assert_eq!(model.notice, Some(Notice::success(MSG_REGISTERED)));
}

#[test]
fn rejected_envelope_keeps_the_form_for_retry() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);
    app.update(Event::SubmitPressed, &mut model);

    let ack = SubmitAck { status: 500, message: "Quota exceeded".into() };
    let response = ResponseBuilder::ok().body(ack).build();
    app.update(Event::SubmitResponse(Ok(response)), &mut model);

    assert_eq!(model.screen, Screen::Form);
    assert_eq!(model.form.submit, SubmitState::Failed);
    assert_eq!(model.form.full_name, "Jane Doe");
    assert_eq!(model.notice, Some(Notice::error("Quota exceeded")));

    // Any edit returns the attempt to rest, and retrying dispatches again.
    edit(&app, &mut model, FormField::FullName, "Jane D.");
    assert_eq!(model.form.submit, SubmitState::Idle);

    let update = app.update(Event::SubmitPressed, &mut model);
    assert_eq!(http_operations(&update.effects).len(), 1);
}

#[test]
fn transport_failure_marks_the_attempt_failed() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);
    app.update(Event::SubmitPressed, &mut model);

    let error = crux_http::HttpError::Io("connection reset".into());
    app.update(Event::SubmitResponse(Err(error)), &mut model);

    assert_eq!(model.form.submit, SubmitState::Failed);
    assert_eq!(model.form.full_name, "Jane Doe");
    assert_eq!(model.notice, Some(Notice::error(MSG_SUBMIT_FAILED)));
}

#[test]
fn reset_clears_the_form_but_stays_on_it() {
    let (app, mut model) = open_form();
    fill_valid_form(&app, &mut model);

    app.update(Event::ResetPressed, &mut model);

    assert_eq!(model.screen, Screen::Form);
    assert!(model.form.full_name.is_empty());
    assert!(model.form.guest_photo.is_none());
    assert!(model.form.errors.is_empty());
}

#[test]
fn update_flow_puts_to_the_guest_record() {
    let (app, mut model) = started();

    // Arrive at the form through a successful lookup.
    app.update(Event::LookupPhoneEdited("0812345678".into()), &mut model);
    app.update(Event::SearchPressed, &mut model);
    let record = ResidentRecord {
        id: "guest-1".into(),
        full_name: "Jane Doe".into(),
        gender: Some("f".into()),
        phone_number: "0812345678".into(),
        email: Some("jane@example.com".into()),
        image_base64: Some("QUJD".into()),
        resident_houses: vec![ResidentHouseLink {
            expired_at: Some("2025-08-30 18:30:00".into()),
            house: Some(HouseRef { id: "h1".into() }),
            guest_vehicles: vec![GuestVehicle {
                plate_number: Some("B1234XYZ".into()),
                plate_image_base64: Some("REVG".into()),
            }],
        }],
    };
    let response = ResponseBuilder::ok()
        .body(SearchResponse { records: vec![record] })
        .build();
    app.update(Event::SearchResponse(Ok(response)), &mut model);
    assert_eq!(model.screen, Screen::Form);

    let update = app.update(Event::SubmitPressed, &mut model);

    let operations = http_operations(&update.effects);
    assert_eq!(operations.len(), 1);
    let operation = operations[0];
    assert_eq!(operation.method, "PUT");
    assert_eq!(
        operation.url,
        "https://api.example.test/public/master/update-guest/guest-1"
    );

    let body: serde_json::Value = serde_json::from_slice(&operation.body).unwrap();
    // The stored photos and expiry are resubmitted untouched.
    assert_eq!(body["image"], "QUJD");
    assert_eq!(body["plate_image"], "REVG");
    assert_eq!(body["expired_at"], "2025-08-30 18:30:00");

    let ack = SubmitAck { status: 200, message: "updated".into() };
    let response = ResponseBuilder::ok().body(ack).build();
    app.update(Event::SubmitResponse(Ok(response)), &mut model);

    assert_eq!(model.screen, Screen::Lookup);
    assert_eq!(model.notice, Some(Notice::success(MSG_UPDATED)));
}
