mod badge_debouncer;
mod identity_cache;

pub use badge_debouncer::BadgeDebouncer;
pub use identity_cache::IdentityCache;
