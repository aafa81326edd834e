//! Test doubles for the application layer.

use crate::domain::entities::{Booking, BookingRequest};
use crate::domain::ports::{BookingService, CardReader, Clock, ReaderPoll, ServiceError, StatusDisplay};
use crate::domain::value_objects::{
    BookingField, BookingId, CheckinToken, MembershipId, ResourceId, StatusSignal,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fixed reference instant for tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn booking(id: &str, membership: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
    Booking {
        id: BookingId::new(id),
        membership_id: MembershipId::new(membership),
        start_time: start,
        end_time: end,
        title: "Workshop".to_string(),
        comments: String::new(),
    }
}

/// Remote calls recorded by [`MockBookingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    GetCurrent,
    GetRange,
    Create {
        membership_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Update {
        id: String,
        field: BookingField,
        value: DateTime<Utc>,
    },
    Delete(String),
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Lookup,
    Current,
    Create,
    Update,
    Delete,
}

/// In-memory booking service holding at most one booking.
pub struct MockBookingService {
    members: HashMap<String, String>,
    current: Mutex<Option<Booking>>,
    external: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
}

impl MockBookingService {
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            current: Mutex::new(None),
            external: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn with_member(mut self, token: &str, membership: &str) -> Self {
        self.members.insert(token.to_string(), membership.to_string());
        self
    }

    pub fn set_current(&self, booking: Booking) {
        *self.current.lock().unwrap() = Some(booking);
    }

    pub fn current(&self) -> Option<Booking> {
        self.current.lock().unwrap().clone()
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Make deletes of `id` fail with a conflict.
    pub fn mark_external(&self, id: &BookingId) {
        self.external.lock().unwrap().insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<(), ServiceError> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(ServiceError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingService for MockBookingService {
    async fn lookup_identity(&self, token: &CheckinToken) -> Result<MembershipId, ServiceError> {
        self.record(Call::Lookup(token.to_string()));
        self.check(Op::Lookup)?;
        Ok(MembershipId::new(
            self.members.get(token.as_str()).cloned().unwrap_or_default(),
        ))
    }

    async fn get_current_booking(
        &self,
        _resource_id: &ResourceId,
    ) -> Result<Option<Booking>, ServiceError> {
        self.record(Call::GetCurrent);
        self.check(Op::Current)?;
        Ok(self.current())
    }

    async fn get_bookings_in_range(
        &self,
        _resource_id: &ResourceId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, ServiceError> {
        self.record(Call::GetRange);
        self.check(Op::Current)?;
        Ok(self
            .current()
            .into_iter()
            .filter(|b| b.start_time < to && b.end_time > from)
            .collect())
    }

    async fn create_booking(
        &self,
        _resource_id: &ResourceId,
        request: &BookingRequest,
    ) -> Result<Booking, ServiceError> {
        self.record(Call::Create {
            membership_id: request.membership_id.to_string(),
            start: request.start_time,
            end: request.end_time,
        });
        self.check(Op::Create)?;
        if self.current().is_some() {
            return Err(ServiceError::Rejected {
                status: 422,
                message: "resource already booked".to_string(),
            });
        }
        let created = Booking {
            id: BookingId::new(format!("b-{}", self.next_id.fetch_add(1, Ordering::SeqCst))),
            membership_id: request.membership_id.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            title: request.title.clone(),
            comments: request.comments.clone(),
        };
        self.set_current(created.clone());
        Ok(created)
    }

    async fn update_booking(
        &self,
        booking_id: &BookingId,
        field: BookingField,
        value: DateTime<Utc>,
    ) -> Result<Booking, ServiceError> {
        self.record(Call::Update {
            id: booking_id.to_string(),
            field,
            value,
        });
        self.check(Op::Update)?;
        let mut current = self.current.lock().unwrap();
        match current.as_mut() {
            Some(b) if &b.id == booking_id => {
                let mut updated = b.clone();
                match field {
                    BookingField::StartTime => updated.start_time = value,
                    BookingField::EndTime => updated.end_time = value,
                }
                if updated.start_time >= updated.end_time {
                    return Err(ServiceError::Rejected {
                        status: 422,
                        message: "to must be after from".to_string(),
                    });
                }
                *b = updated.clone();
                Ok(updated)
            }
            _ => Err(ServiceError::Rejected {
                status: 404,
                message: "not found".to_string(),
            }),
        }
    }

    async fn delete_booking(&self, booking_id: &BookingId) -> Result<(), ServiceError> {
        self.record(Call::Delete(booking_id.to_string()));
        self.check(Op::Delete)?;
        if self.external.lock().unwrap().contains(booking_id.as_str()) {
            return Err(ServiceError::Conflict("booking belongs to an event".to_string()));
        }
        let mut current = self.current.lock().unwrap();
        match current.as_ref() {
            Some(b) if &b.id == booking_id => {
                *current = None;
                Ok(())
            }
            _ => Err(ServiceError::Rejected {
                status: 404,
                message: "not found".to_string(),
            }),
        }
    }
}

/// Status display that records every signal.
pub struct RecordingDisplay {
    signals: Mutex<Vec<StatusSignal>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            signals: Mutex::new(Vec::new()),
        }
    }

    pub fn signals(&self) -> Vec<StatusSignal> {
        self.signals.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<StatusSignal> {
        self.signals.lock().unwrap().last().copied()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&self, signal: StatusSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// Clock advanced by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Reader replaying a fixed script, then reporting no card.
pub struct ScriptedReader {
    polls: VecDeque<ReaderPoll>,
}

impl ScriptedReader {
    pub fn new(polls: impl IntoIterator<Item = ReaderPoll>) -> Self {
        Self {
            polls: polls.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CardReader for ScriptedReader {
    async fn poll(&mut self) -> ReaderPoll {
        self.polls.pop_front().unwrap_or(ReaderPoll::NoCard)
    }
}
