mod line_card_reader;
mod status_server;

pub use line_card_reader::{LineCardReader, UidParseError};
pub use status_server::{HealthResponse, StatusServer, StatusState};
