use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use artesala_common::EuroCents;
use artesala_engine::{db_types::BookingStatus, BookingEngineError, BookingFlowApi};
use log::*;
use redsys_tools::{RedirectForm, SIGNATURE_VERSION};
use serde_json::json;

use super::mocks::*;
use crate::routes::checkout;

async fn post_checkout(mock: MockBookingBackend, body: serde_json::Value) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let api = BookingFlowApi::new(mock);
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_config()))
        .route("/checkout", web::post().to(checkout::<MockBookingBackend>));
    let app = test::init_service(app).await;
    let req = TestRequest::post().uri("/checkout").set_json(&body).to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    info!("Response body: {body}");
    (status, body)
}

fn two_hour_request() -> serde_json::Value {
    json!({
        "room_id": 2,
        "slots": [{"start": "2026-09-01T10:00:00Z", "end": "2026-09-01T12:00:00Z"}],
        "customer": {"name": "Ana", "email": "ana@example.com"}
    })
}

#[actix_web::test]
async fn checkout_holds_slots_and_returns_signed_redirect_form() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    // Two hours at 15.00/h must be priced at 3000 minor units.
    mock.expect_hold_booking()
        .withf(|b| b.total == EuroCents::from(3000) && b.slots.len() == 1 && b.slots[0].room_id == 2)
        .returning(|b| Ok(sample_booking(b.payment_ref.as_str(), BookingStatus::Pending, 3000)));
    let (status, body) = post_checkout(mock, two_hour_request()).await;
    assert_eq!(status, StatusCode::OK);
    let form: RedirectForm = serde_json::from_str(&body).expect("response should be a redirect form");
    assert_eq!(form.signature_version, SIGNATURE_VERSION);
    assert_eq!(form.url, test_config().redsys.gateway_url);
    assert!(!form.merchant_parameters.is_empty());
    assert!(!form.signature.is_empty());
}

#[actix_web::test]
async fn checkout_slot_conflict_is_a_409() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    mock.expect_hold_booking().returning(|_| Err(BookingEngineError::SlotConflict));
    let (status, body) = post_checkout(mock, two_hour_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("no longer available"), "was: {body}");
}

#[actix_web::test]
async fn checkout_for_unknown_room_is_a_404() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(None));
    let (status, _body) = post_checkout(mock, two_hour_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_without_slots_is_rejected() {
    let mock = MockBookingBackend::new();
    let body = json!({
        "room_id": 2,
        "slots": [],
        "customer": {"name": "Ana", "email": "ana@example.com"}
    });
    let (status, body) = post_checkout(mock, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("At least one time slot"), "was: {body}");
}

#[actix_web::test]
async fn checkout_with_inverted_slot_is_rejected() {
    let mock = MockBookingBackend::new();
    let body = json!({
        "room_id": 2,
        "slots": [{"start": "2026-09-01T12:00:00Z", "end": "2026-09-01T10:00:00Z"}],
        "customer": {"name": "Ana", "email": "ana@example.com"}
    });
    let (status, body) = post_checkout(mock, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("start must precede"), "was: {body}");
}
