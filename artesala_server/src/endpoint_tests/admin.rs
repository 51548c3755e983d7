use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use artesala_engine::{db_types::BookingStatus, BookingFlowApi};
use log::*;

use super::mocks::*;
use crate::{
    middleware::AdminGateMiddlewareFactory,
    routes::{admin_booking_by_order, admin_bookings},
};

const ADMIN: &str = "admin@artesala.org";

async fn get_admin(mock: MockBookingBackend, uri: &str, email: Option<&str>) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let api = BookingFlowApi::new(mock);
    let scope = web::scope("/api")
        .wrap(AdminGateMiddlewareFactory::new(ADMIN))
        .route("/bookings", web::get().to(admin_bookings::<MockBookingBackend>))
        .route("/bookings/{order_id}", web::get().to(admin_booking_by_order::<MockBookingBackend>));
    let app = App::new().app_data(web::Data::new(api)).service(scope);
    let app = test::init_service(app).await;
    let mut req = TestRequest::get().uri(uri);
    if let Some(email) = email {
        req = req.insert_header(("X-Auth-Email", email));
    }
    let res = match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => res.map_into_boxed_body().into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    info!("Response body: {body}");
    (status, body)
}

#[actix_web::test]
async fn admin_without_email_header_is_denied() {
    // No expectations: the gate must trip before the handler runs.
    let mock = MockBookingBackend::new();
    let (status, _body) = get_admin(mock, "/api/bookings", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_with_wrong_email_is_denied() {
    let mock = MockBookingBackend::new();
    let (status, _body) = get_admin(mock, "/api/bookings", Some("intruder@example.com")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_email_comparison_ignores_case() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_recent_bookings().returning(|_| Ok(vec![]));
    let (status, body) = get_admin(mock, "/api/bookings", Some("Admin@ArteSala.org")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn admin_lists_recent_bookings() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_recent_bookings()
        .withf(|limit| *limit == 100)
        .returning(|_| Ok(vec![sample_booking("000123456789", BookingStatus::Paid, 3000)]));
    let (status, body) = get_admin(mock, "/api/bookings", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("000123456789"), "was: {body}");
}

#[actix_web::test]
async fn admin_fetches_one_booking_with_slots() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_booking_by_payment_ref()
        .withf(|order| order.as_str() == "000123456789")
        .returning(|order| Ok(Some(sample_booking(order.as_str(), BookingStatus::Paid, 3000))));
    mock.expect_fetch_slots_for_booking().returning(|_| Ok(vec![]));
    let (status, body) = get_admin(mock, "/api/bookings/000123456789", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"booking\""), "was: {body}");
}

#[actix_web::test]
async fn admin_lookup_of_unknown_order_is_a_404() {
    let mut mock = MockBookingBackend::new();
    mock.expect_fetch_booking_by_payment_ref().returning(|_| Ok(None));
    let (status, _body) = get_admin(mock, "/api/bookings/314159265358", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
