use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use artesala_engine::{BookingFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    middleware::AdminGateMiddlewareFactory,
    routes::{admin_booking_by_order, admin_bookings, checkout, health, redsys_notification, redsys_notification_return},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let database_url =
        if config.database_url.is_empty() { artesala_engine::db_url() } else { config.database_url.clone() };
    let db = SqliteDatabase::new_with_url(&database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let _expiry_handle = start_expiry_worker(db.clone(), config.pending_timeout);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let api = BookingFlowApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("asp::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(config.clone()));
        let admin_scope = web::scope("/api")
            .wrap(AdminGateMiddlewareFactory::new(&config.admin_email))
            .route("/bookings", web::get().to(admin_bookings::<SqliteDatabase>))
            .route("/bookings/{order_id}", web::get().to(admin_booking_by_order::<SqliteDatabase>));
        app.service(health)
            .route("/checkout", web::post().to(checkout::<SqliteDatabase>))
            .route("/redsys/notification", web::post().to(redsys_notification::<SqliteDatabase>))
            .route("/redsys/notification", web::get().to(redsys_notification_return::<SqliteDatabase>))
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
