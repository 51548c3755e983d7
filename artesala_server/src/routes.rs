//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate function. Keep this module neat and tidy 🙏
//!
//! The handlers are generic over the [`BookingDatabase`] backend so that the endpoint tests can run them against a
//! mock. Actix cannot register generic handlers through the attribute macros, so everything except `health` is
//! registered manually in [`crate::server`].
//!
//! The notification handlers never use `?`/[`ServerError`] for the gateway-facing outcome: Redsys only looks at
//! the response body (`OK` acknowledges, anything else redelivers), so each exit path picks its body and status
//! explicitly.

use actix_web::{get, web, HttpResponse, Responder};
use artesala_common::EuroCents;
use artesala_engine::{
    db_types::{NewBooking, NewTimeSlot, OrderId},
    helpers::amount::expected_total,
    BookingDatabase,
    BookingEngineError,
    BookingFlowApi,
};
use log::*;
use redsys_tools::{
    generate_order_id,
    verify_signature,
    CheckoutRequestBuilder,
    DecodedMerchantData,
    MerchantData,
    NotificationForm,
    PaymentNotification,
};

use crate::{
    config::ServerConfig,
    data_objects::{BookingDetail, CheckoutRequest},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------   Payment notification  ----------------------------------------------

/// The asynchronous gateway webhook. Redsys POSTs the notification form and inspects the body of the response:
/// a bare `OK` acknowledges, anything else schedules a redelivery.
pub async fn redsys_notification<B: BookingDatabase>(
    form: web::Form<NotificationForm>,
    api: web::Data<BookingFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> HttpResponse {
    handle_notification(form.into_inner(), &api, &config).await
}

/// The synchronous redirect fallback: the customer's browser lands on the return URL carrying the same form
/// fields as query parameters. Feeding it through the same handler makes resubmission indistinguishable from a
/// webhook redelivery.
pub async fn redsys_notification_return<B: BookingDatabase>(
    query: web::Query<NotificationForm>,
    api: web::Data<BookingFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> HttpResponse {
    handle_notification(query.into_inner(), &api, &config).await
}

async fn handle_notification<B: BookingDatabase>(
    form: NotificationForm,
    api: &BookingFlowApi<B>,
    config: &ServerConfig,
) -> HttpResponse {
    trace!("🏦️ Received payment notification ({})", form.signature_version);
    // The envelope must be decoded before the signature can be checked, since the per-order HMAC key is derived
    // from the order number inside it. Nothing from the envelope is acted on until the signature passes.
    let notification = match PaymentNotification::from_merchant_parameters(&form.merchant_parameters) {
        Ok(n) => n,
        Err(e) => {
            warn!("🏦️ Could not decode notification parameters. {e}");
            return HttpResponse::BadRequest().body("ERROR");
        },
    };
    let secret = config.redsys.secret_key.reveal();
    if let Err(e) = verify_signature(secret, &notification.order, &form.merchant_parameters, &form.signature) {
        warn!("🏦️ Rejecting notification for [{}]: {e}", notification.order);
        return HttpResponse::BadRequest().body("ERROR");
    }
    let order = OrderId::from(notification.order.clone());
    if !notification.response.is_authorised() {
        info!("🏦️ Payment declined for {order} (response code {})", notification.response);
        return match api.process_declined_payment(&order).await {
            Ok(_) => HttpResponse::Ok().body("OK"),
            Err(e) => {
                error!("🏦️ Could not release the hold for declined payment {order}. {e}");
                HttpResponse::InternalServerError().body("ERROR")
            },
        };
    }
    // Authorised. The customer's card has been charged, so from here on every data problem is resolved in favour
    // of acknowledging the gateway; redelivery cannot make a bad blob good.
    match DecodedMerchantData::decode(notification.merchant_data.as_deref()) {
        DecodedMerchantData::Unrecognized => {
            warn!(
                "🏦️ Authorised payment {order} for {} carried missing or unusable merchant data. Acknowledging; \
                 manual follow-up required.",
                notification.amount
            );
            HttpResponse::Ok().body("OK")
        },
        DecodedMerchantData::Recognized(data) => {
            let booking = booking_from_merchant_data(order.clone(), notification.amount, data);
            match api.process_authorised_payment(booking).await {
                Ok(_) => HttpResponse::Ok().body("OK"),
                Err(BookingEngineError::SlotConflict) => {
                    error!(
                        "🏦️ Authorised payment {order} clashes with an existing reservation. Failing the delivery \
                         so the gateway retries."
                    );
                    HttpResponse::InternalServerError().body("ERROR")
                },
                Err(e) => {
                    error!("🏦️ Could not record authorised payment {order}. {e}");
                    HttpResponse::InternalServerError().body("ERROR")
                },
            }
        },
    }
}

fn booking_from_merchant_data(order: OrderId, amount: EuroCents, data: MerchantData) -> NewBooking {
    let MerchantData { room_id, slots, name, email, phone, note } = data;
    let mut booking = NewBooking::new(order, name, email, amount);
    booking.phone = phone;
    booking.note = note;
    slots.into_iter().fold(booking, |b, s| b.with_slot(room_id, s.start, s.end))
}

//----------------------------------------------   Checkout  ----------------------------------------------------

/// Start a checkout: validate the room and slots, compute the charge, hold the slots under a `Pending` booking,
/// and hand back the signed form the UI auto-submits to the gateway.
pub async fn checkout<B: BookingDatabase>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<BookingFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    if request.slots.is_empty() {
        return Err(ServerError::InvalidRequestBody("At least one time slot is required".to_string()));
    }
    if request.slots.iter().any(|s| s.start >= s.end) {
        return Err(ServerError::InvalidRequestBody("Slot start must precede its end".to_string()));
    }
    let room = api.room(request.room_id).await?;
    let slots = request
        .slots
        .iter()
        .map(|s| NewTimeSlot { room_id: request.room_id, starts_at: s.start, ends_at: s.end })
        .collect::<Vec<_>>();
    let total = expected_total(room.hourly_rate, &slots);
    let order = generate_order_id();
    debug!("🛒️ Checkout for {} slot(s) in {} comes to {total}. Order number {order}", slots.len(), room.name);
    let mut booking = NewBooking::new(
        OrderId::from(order.clone()),
        request.customer.name.clone(),
        request.customer.email.clone(),
        total,
    );
    booking.phone = request.customer.phone.clone();
    booking.note = request.customer.note.clone();
    booking.slots = slots;
    let held = api.initiate_checkout(booking).await?;
    let merchant_data = MerchantData {
        room_id: request.room_id,
        slots: request.slots,
        name: request.customer.name,
        email: request.customer.email,
        phone: request.customer.phone,
        note: request.customer.note,
    };
    let blob = serde_json::to_string(&merchant_data)
        .map_err(|e| ServerError::Unspecified(format!("Could not serialize merchant data: {e}")))?;
    let form = CheckoutRequestBuilder::new()
        .order(order.as_str())
        .amount_minor_units(held.total.to_minor_units())
        .description(format!("Reserva {}", room.name))
        .titular(merchant_data.name.clone())
        .merchant_data(blob)
        .return_urls(&config.base_url)
        .build(&config.redsys)?;
    info!("🛒️ Hold {} placed. Redirecting customer to the gateway.", held.payment_ref);
    Ok(HttpResponse::Ok().json(form))
}

//----------------------------------------------   Admin  ----------------------------------------------------

/// Most recent bookings, newest first. Sits behind the admin gate middleware.
pub async fn admin_bookings<B: BookingDatabase>(
    api: web::Data<BookingFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let bookings = api.recent_bookings(100).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// One booking, looked up by its payment reference, with its slots.
pub async fn admin_booking_by_order<B: BookingDatabase>(
    path: web::Path<String>,
    api: web::Data<BookingFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = OrderId::from(path.into_inner());
    let (booking, slots) = api.booking_with_slots(&order).await?;
    Ok(HttpResponse::Ok().json(BookingDetail { booking, slots }))
}
