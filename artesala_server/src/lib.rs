//! # ArteSala payment server
//! This crate hosts the HTTP layer of the ArteSala payment server. It is responsible for:
//! Listening for incoming payment notifications from the Redsys gateway (webhook POST, plus the synchronous
//! redirect GET fallback).
//! Initiating checkouts: holding the selected calendar slots and returning the signed redirect form.
//! Serving the admin booking queries behind the auth-proxy email gate.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/redsys/notification`: The payment notification endpoint. Responds with a bare `OK` body to acknowledge;
//!   anything else makes the gateway redeliver.
//! * `/checkout`: Places a pending hold and returns the signed gateway redirect parameters.
//! * `/api/bookings`, `/api/bookings/{order_id}`: Admin queries.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
