//! HTTP Booking Service
//!
//! Implements BookingService against the member portal's REST API.
//! The pre-provisioned access token travels as the `access_token` query
//! parameter on every request.

use crate::domain::entities::{Booking, BookingRequest};
use crate::domain::ports::{BookingService, Clock, ServiceError};
use crate::domain::time::{
    format_service_timestamp, parse_service_timestamp, to_chrono, TimestampError,
};
use crate::domain::value_objects::{BookingField, BookingId, CheckinToken, MembershipId, ResourceId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Response of the check-in token lookup.
#[derive(Debug, Deserialize)]
struct CheckInTokenResponse {
    membership: Option<MembershipRef>,
}

#[derive(Debug, Deserialize)]
struct MembershipRef {
    #[serde(default)]
    id: serde_json::Value,
}

/// Booking as returned by the portal. Ids may be numbers or strings.
#[derive(Debug, Deserialize)]
struct BookingDto {
    id: serde_json::Value,
    #[serde(default)]
    membership_id: serde_json::Value,
    from: String,
    to: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    comments: Option<String>,
}

impl BookingDto {
    fn into_booking(self) -> Result<Booking, ServiceError> {
        let malformed = |e: TimestampError| ServiceError::Malformed(e.to_string());
        Ok(Booking {
            id: BookingId::new(id_string(&self.id)),
            membership_id: MembershipId::new(id_string(&self.membership_id)),
            start_time: parse_service_timestamp(&self.from).map_err(malformed)?,
            end_time: parse_service_timestamp(&self.to).map_err(malformed)?,
            title: self.title.unwrap_or_default(),
            comments: self.comments.unwrap_or_default(),
        })
    }
}

/// Body of the range query.
#[derive(Debug, Serialize)]
struct RangeQuery {
    from: String,
    to: String,
}

/// Body of the create call.
#[derive(Debug, Serialize)]
struct CreateBookingBody<'a> {
    membership_id: &'a str,
    from: String,
    to: String,
    title: &'a str,
    comments: &'a str,
}

/// Render a JSON id as text; null and other shapes become empty.
fn id_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Configuration for the portal connection.
#[derive(Debug, Clone)]
pub struct HttpBookingConfig {
    /// Base URL of the portal (e.g., "https://members.example.org")
    pub api_url: String,
    pub access_token: String,
    /// Width of the availability window starting at now
    pub lookahead: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpBookingConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            access_token: String::new(),
            lookahead: Duration::from_secs(31 * 60),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Portal-backed booking service.
pub struct HttpBookingService {
    config: HttpBookingConfig,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl HttpBookingService {
    /// Create a client for the given portal.
    pub fn new(config: HttpBookingConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            clock,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn auth(&self) -> [(&'static str, &str); 1] {
        [("access_token", self.config.access_token.as_str())]
    }

    /// Send a request, mapping transport failures and non-success statuses.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = request
            .query(&self.auth())
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("booking service answered {}: {}", status, body);
        if status == StatusCode::CONFLICT {
            return Err(ServiceError::Conflict(body));
        }
        Err(ServiceError::Rejected {
            status: status.as_u16(),
            message: body,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    async fn lookup_identity(&self, token: &CheckinToken) -> Result<MembershipId, ServiceError> {
        let request = self
            .client
            .get(self.url(&format!("/api/check_in_tokens/{}", token)));

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(ServiceError::Rejected { status: 404, .. }) => {
                return Err(ServiceError::InvalidIdentity(token.to_string()));
            }
            Err(e) => return Err(e),
        };

        let data: CheckInTokenResponse = Self::decode(response).await?;
        let id = data
            .membership
            .map(|m| id_string(&m.id))
            .unwrap_or_default();
        Ok(MembershipId::new(id))
    }

    async fn get_current_booking(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Option<Booking>, ServiceError> {
        let now = self.clock.now();
        let until = now + to_chrono(self.config.lookahead);

        let bookings = self.get_bookings_in_range(resource_id, now, until).await?;

        // Earliest upcoming or running booking wins.
        Ok(bookings
            .into_iter()
            .filter(|b| !b.has_ended(now))
            .min_by_key(|b| b.start_time))
    }

    async fn get_bookings_in_range(
        &self,
        resource_id: &ResourceId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, ServiceError> {
        let body = RangeQuery {
            from: format_service_timestamp(from),
            to: format_service_timestamp(to),
        };
        let request = self
            .client
            .get(self.url(&format!("/api/resources/{}/bookings", resource_id)))
            .json(&body);

        let response = self.send(request).await?;
        let dtos: Vec<BookingDto> = Self::decode(response).await?;
        dtos.into_iter().map(BookingDto::into_booking).collect()
    }

    async fn create_booking(
        &self,
        resource_id: &ResourceId,
        request: &BookingRequest,
    ) -> Result<Booking, ServiceError> {
        let body = CreateBookingBody {
            membership_id: request.membership_id.as_str(),
            from: format_service_timestamp(request.start_time),
            to: format_service_timestamp(request.end_time),
            title: &request.title,
            comments: &request.comments,
        };
        let http_request = self
            .client
            .post(self.url(&format!("/api/resources/{}/bookings", resource_id)))
            .json(&body);

        let response = self.send(http_request).await?;
        let dto: BookingDto = Self::decode(response).await?;
        dto.into_booking()
    }

    async fn update_booking(
        &self,
        booking_id: &BookingId,
        field: BookingField,
        value: DateTime<Utc>,
    ) -> Result<Booking, ServiceError> {
        let mut body = HashMap::new();
        body.insert(field.wire_name(), format_service_timestamp(value));
        let request = self
            .client
            .put(self.url(&format!("/api/bookings/{}/", booking_id)))
            .json(&body);

        let response = self.send(request).await?;
        let dto: BookingDto = Self::decode(response).await?;
        dto.into_booking()
    }

    async fn delete_booking(&self, booking_id: &BookingId) -> Result<(), ServiceError> {
        let request = self
            .client
            .delete(self.url(&format!("/api/bookings/{}/", booking_id)));

        self.send(request).await?;
        Ok(())
    }
}
