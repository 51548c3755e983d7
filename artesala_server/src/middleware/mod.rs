mod admin;

pub use admin::{AdminGateMiddlewareFactory, AdminGateMiddlewareService};
