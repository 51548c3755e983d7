//! ArteSala Booking Engine
//!
//! Core persistence and reconciliation logic for the ArteSala payment server. The engine records room bookings that
//! are paid for through the Redsys card gateway, and guarantees that each gateway order results in exactly one
//! booking no matter how many times the payment notification is delivered.
//!
//! The library is divided into three sections:
//! 1. Database types and backend traits ([`db_types`], [`traits`]). SQLite is the supported backend. Callers should
//!    not touch the database directly; the data types are public, the queries are not.
//! 2. The SQLite backend itself, enabled by the (default) `sqlite` feature.
//! 3. The public API ([`BookingFlowApi`]), which implements the reconciliation flow on top of any
//!    [`traits::BookingDatabase`] backend: hold slots at checkout, confirm on an authorised notification, release on
//!    a decline, and expire abandoned holds.
mod api;

pub mod db_types;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

pub use api::BookingFlowApi;
#[cfg(feature = "sqlite")]
pub use sqlite::{db_url, SqliteDatabase};
pub use traits::{BookingDatabase, BookingEngineError};
