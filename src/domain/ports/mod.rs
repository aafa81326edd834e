mod booking_service;
mod card_reader;
mod clock;
mod status_display;

pub use booking_service::{BookingService, ServiceError};
pub use card_reader::{CardReader, ReaderPoll};
pub use clock::Clock;
pub use status_display::StatusDisplay;
