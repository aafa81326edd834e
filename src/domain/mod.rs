//! Domain Layer
//!
//! Entities, value objects, ports and pure services of the booking domain.

pub mod entities;
pub mod ports;
pub mod services;
pub mod time;
pub mod value_objects;
