use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use artesala_engine::{db_types::BookingStatus, BookingEngineError, BookingFlowApi};
use log::*;
use redsys_tools::{expected_signature, NotificationForm, SIGNATURE_VERSION};
use serde_json::{json, Value};

use super::mocks::*;
use crate::routes::{redsys_notification, redsys_notification_return};

/// Build a correctly-signed notification form from a parameter object, the way the gateway would.
fn signed_form(params: &Value) -> NotificationForm {
    let order = params["Ds_Order"].as_str().expect("params need a Ds_Order").to_string();
    let params_b64 = base64::encode(params.to_string());
    let signature = expected_signature(TEST_KEY, &order, &params_b64).expect("test key must sign");
    NotificationForm { signature_version: SIGNATURE_VERSION.to_string(), merchant_parameters: params_b64, signature }
}

fn authorised_params(order: &str) -> Value {
    let merchant_data = json!({
        "room_id": 2,
        "slots": [{"start": "2026-09-01T10:00:00Z", "end": "2026-09-01T12:00:00Z"}],
        "name": "Ana",
        "email": "ana@example.com",
    });
    json!({
        "Ds_Order": order,
        "Ds_Response": "0000",
        "Ds_Amount": "3000",
        "Ds_AuthorisationCode": "123456",
        "Ds_MerchantData": merchant_data.to_string(),
    })
}

async fn post_notification(mock: MockBookingBackend, form: &NotificationForm) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let api = BookingFlowApi::new(mock);
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_config()))
        .route("/redsys/notification", web::post().to(redsys_notification::<MockBookingBackend>))
        .route("/redsys/notification", web::get().to(redsys_notification_return::<MockBookingBackend>));
    let app = test::init_service(app).await;
    let req = TestRequest::post().uri("/redsys/notification").set_form(form).to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    info!("Response body: {body}");
    (status, body)
}

#[actix_web::test]
async fn authorised_notification_is_acknowledged() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    mock.expect_confirm_booking().withf(|b| b.payment_ref.as_str() == "000123456789" && b.slots.len() == 1).returning(
        |b| {
            let recorded = sample_booking(b.payment_ref.as_str(), BookingStatus::Paid, 3000);
            Ok((recorded, true))
        },
    );
    let form = signed_form(&authorised_params("000123456789"));
    let (status, body) = post_notification(mock, &form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn tampered_parameters_are_rejected_before_any_db_call() {
    // No expectations on the mock: a signature failure must never reach the backend.
    let mock = MockBookingBackend::new();
    let mut form = signed_form(&authorised_params("000123456789"));
    form.merchant_parameters = base64::encode(authorised_params("999999999999").to_string());
    let (status, body) = post_notification(mock, &form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ERROR");
}

#[actix_web::test]
async fn garbage_parameters_are_rejected() {
    let mock = MockBookingBackend::new();
    let form = NotificationForm {
        signature_version: SIGNATURE_VERSION.to_string(),
        merchant_parameters: "not-base64-at-all!!!".to_string(),
        signature: "AAAA".to_string(),
    };
    let (status, body) = post_notification(mock, &form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ERROR");
}

#[actix_web::test]
async fn declined_notification_releases_the_hold() {
    let mut mock = MockBookingBackend::new();
    mock.expect_cancel_booking()
        .withf(|order| order.as_str() == "555566667777")
        .returning(|order| Ok(Some(sample_booking(order.as_str(), BookingStatus::Cancelled, 3000))));
    let params = json!({ "Ds_Order": "555566667777", "Ds_Response": "0180", "Ds_Amount": "3000" });
    let (status, body) = post_notification(mock, &signed_form(&params)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn unusable_merchant_data_is_acknowledged_without_persistence() {
    // From the gateway's point of view this delivery succeeded; redelivering a bad blob will never fix it.
    let mock = MockBookingBackend::new();
    let params = json!({
        "Ds_Order": "123412341234",
        "Ds_Response": "0000",
        "Ds_Amount": "3000",
        "Ds_MerchantData": "certainly not bookable data",
    });
    let (status, body) = post_notification(mock, &signed_form(&params)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn slot_conflict_fails_the_delivery_so_the_gateway_retries() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    mock.expect_confirm_booking().returning(|_| Err(BookingEngineError::SlotConflict));
    let form = signed_form(&authorised_params("000123456789"));
    let (status, body) = post_notification(mock, &form).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "ERROR");
}

#[actix_web::test]
async fn redelivery_is_still_acknowledged() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    // The backend reports the booking as already recorded. The handler must still answer OK.
    mock.expect_confirm_booking()
        .returning(|b| Ok((sample_booking(b.payment_ref.as_str(), BookingStatus::Paid, 3000), false)));
    let form = signed_form(&authorised_params("000123456789"));
    let (status, body) = post_notification(mock, &form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn redirect_fallback_get_reaches_the_same_handler() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_room().returning(|_| Ok(Some(sample_room(2, 15))));
    mock.expect_confirm_booking()
        .returning(|b| Ok((sample_booking(b.payment_ref.as_str(), BookingStatus::Paid, 3000), true)));
    let form = signed_form(&authorised_params("000123456789"));
    let api = BookingFlowApi::new(mock);
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_config()))
        .route("/redsys/notification", web::get().to(redsys_notification_return::<MockBookingBackend>));
    let app = test::init_service(app).await;
    // '+' must be percent-encoded or the query parser reads it as a space.
    let uri = format!(
        "/redsys/notification?Ds_SignatureVersion={}&Ds_MerchantParameters={}&Ds_Signature={}",
        form.signature_version,
        form.merchant_parameters.replace('+', "%2B"),
        form.signature.replace('+', "%2B"),
    );
    let req = TestRequest::get().uri(&uri).to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
