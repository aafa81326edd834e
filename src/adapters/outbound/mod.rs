mod http_booking_service;
mod status_board;
mod system_clock;

pub use http_booking_service::{HttpBookingConfig, HttpBookingService};
pub use status_board::{StatusBoard, StatusSnapshot};
pub use system_clock::SystemClock;
