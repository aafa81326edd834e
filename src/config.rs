use serde::Deserialize;
use std::time::Duration;

/// Comment attached to bookings created at the resource.
pub const DEFAULT_BOOKING_COMMENTS: &str = "This booking was made on-site using your badge. \
     Badge again at the machine to end it early.";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Booking service settings
    pub resource_id: String,
    pub access_token: String,
    pub access_token_file: Option<String>,
    pub api_url: String,
    pub http_timeout_secs: u64,
    pub lookahead_mins: u64,

    // Controller timing
    pub refresh_interval_secs: u64,
    pub booking_duration_mins: u64,
    pub cancellation_threshold_secs: u64,
    pub checkin_grace_secs: u64,
    pub poll_interval_ms: u64,

    // Attribution of on-site bookings
    pub booking_title: String,
    pub booking_comments: String,

    // Status API settings
    pub status_api_enabled: bool,
    pub status_api_listen_addr: String,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_id: String::new(),
            access_token: String::new(),
            access_token_file: None,
            api_url: String::new(),
            http_timeout_secs: 10,
            lookahead_mins: 31,
            refresh_interval_secs: 300,
            booking_duration_mins: 30,
            cancellation_threshold_secs: 300,
            checkin_grace_secs: 300,
            poll_interval_ms: 50,
            booking_title: "On-site Booking".to_string(),
            booking_comments: DEFAULT_BOOKING_COMMENTS.to_string(),
            status_api_enabled: false,
            status_api_listen_addr: "0.0.0.0:8081".to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn booking_duration(&self) -> Duration {
        Duration::from_secs(self.booking_duration_mins.saturating_mul(60))
    }

    pub fn cancellation_threshold(&self) -> Duration {
        Duration::from_secs(self.cancellation_threshold_secs)
    }

    pub fn checkin_grace(&self) -> Duration {
        Duration::from_secs(self.checkin_grace_secs)
    }

    pub fn lookahead(&self) -> Duration {
        Duration::from_secs(self.lookahead_mins.saturating_mul(60))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resource_id.trim().is_empty() {
            return Err(ConfigError::MissingResourceId);
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("ONSITE_RESOURCE_ID is required")]
    MissingResourceId,
    #[error("ONSITE_ACCESS_TOKEN or ONSITE_ACCESS_TOKEN_FILE is required")]
    MissingAccessToken,
    #[error("ONSITE_API_URL is required")]
    MissingApiUrl,
    #[error("cannot read access token file {path}: {reason}")]
    TokenFile { path: String, reason: String },
}

pub fn load_config() -> anyhow::Result<Config> {
    let resource_id = std::env::var("ONSITE_RESOURCE_ID").unwrap_or_default();

    let access_token_file = std::env::var("ONSITE_ACCESS_TOKEN_FILE").ok();

    // An explicit token wins over the file.
    let access_token = match std::env::var("ONSITE_ACCESS_TOKEN") {
        Ok(token) => token,
        Err(_) => match &access_token_file {
            Some(path) => read_token_file(path)?,
            None => String::new(),
        },
    };

    let api_url = std::env::var("ONSITE_API_URL")
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_default();

    let http_timeout_secs = std::env::var("ONSITE_HTTP_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let lookahead_mins = std::env::var("ONSITE_LOOKAHEAD_MINS")
        .unwrap_or_else(|_| "31".to_string())
        .parse()
        .unwrap_or(31);

    // Controller timing
    let refresh_interval_secs = std::env::var("ONSITE_REFRESH_INTERVAL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let booking_duration_mins = std::env::var("ONSITE_BOOKING_DURATION_MINS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let cancellation_threshold_secs = std::env::var("ONSITE_CANCELLATION_THRESHOLD_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let checkin_grace_secs = std::env::var("ONSITE_CHECKIN_GRACE_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let poll_interval_ms = std::env::var("ONSITE_POLL_INTERVAL_MS")
        .unwrap_or_else(|_| "50".to_string())
        .parse()
        .unwrap_or(50);

    // Attribution
    let booking_title = std::env::var("ONSITE_BOOKING_TITLE")
        .unwrap_or_else(|_| "On-site Booking".to_string());

    let booking_comments = std::env::var("ONSITE_BOOKING_COMMENTS")
        .unwrap_or_else(|_| DEFAULT_BOOKING_COMMENTS.to_string());

    // Status API settings
    let status_api_enabled = std::env::var("ONSITE_STATUS_API_ENABLED")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let status_api_listen_addr = std::env::var("ONSITE_STATUS_API_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        resource_id,
        access_token,
        access_token_file,
        api_url,
        http_timeout_secs,
        lookahead_mins,
        refresh_interval_secs,
        booking_duration_mins,
        cancellation_threshold_secs,
        checkin_grace_secs,
        poll_interval_ms,
        booking_title,
        booking_comments,
        status_api_enabled,
        status_api_listen_addr,
        debug,
    })
}

fn read_token_file(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|contents| contents.trim().to_string())
        .map_err(|e| ConfigError::TokenFile {
            path: path.to_string(),
            reason: e.to_string(),
        })
}
