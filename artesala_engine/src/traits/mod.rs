//! Interface contracts for booking-engine database backends.
//!
//! [`BookingDatabase`] is the single trait a backend must implement. The engine deliberately does no
//! application-level locking: the backend's uniqueness constraint on the payment reference and its slot-overlap
//! constraint are the only synchronization primitives, and the error variants of [`BookingEngineError`] are how the
//! backend reports those constraints firing.
mod booking_database;

pub use booking_database::{BookingDatabase, BookingEngineError};
