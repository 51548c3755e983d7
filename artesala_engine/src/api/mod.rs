mod booking_flow;

pub use booking_flow::BookingFlowApi;
