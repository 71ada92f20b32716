// src/domain/booking.rs
// Booking aggregate: lifecycle state machine, line-item snapshots and the
// time-based refund policy.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::event::BookingEvent;
use crate::domain::money::Money;

const TIME_FORMAT: &str = "%H:%M";

/// Lifecycle states. Transitions are only legal where the predicates below
/// say so; every mutating operation on the aggregate re-checks its
/// predicate so the legality check and the mutation cannot diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn can_be_confirmed(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    pub fn can_be_started(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    pub fn can_be_completed(&self) -> bool {
        matches!(self, BookingStatus::InProgress)
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable point-in-time copy of a purchased catalog service. Later edits
/// to the catalog never alter historical bookings.
#[derive(Debug, Clone, Serialize)]
pub struct BookingService {
    pub id: String,
    pub booking_id: String,
    pub service_id: String,
    pub service_name: String,
    pub price: Money,
    pub duration_minutes: i64,
}

/// Refund percentages by time remaining until the scheduled start.
#[derive(Debug, Clone)]
pub struct RefundPolicy {
    pub full_refund_hours: i64,
    pub partial_refund_hours: i64,
    pub partial_refund_percent: Decimal,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            full_refund_hours: 24,
            partial_refund_hours: 2,
            partial_refund_percent: dec!(50),
        }
    }
}

/// Creation parameters for a booking. Line items are snapshotted by the
/// caller from catalog data before this is handed to `Booking::create`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: String,
    pub customer_id: String,
    pub provider_id: String,
    pub location_id: String,
    pub staff_id: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_home_service: bool,
    pub service_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub services: Vec<BookingService>,
}

/// Aggregate root for a paid service booking.
#[derive(Debug, Clone)]
pub struct Booking {
    id: String,
    customer_id: String,
    provider_id: String,
    location_id: String,
    staff_id: Option<String>,
    status: BookingStatus,
    scheduled_date: NaiveDate,
    start_time: String,
    end_time: String,
    total_amount: Money,
    paid_amount: Money,
    is_home_service: bool,
    service_address: Option<String>,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    notes: Option<String>,
    cancelled_by: Option<String>,
    cancellation_reason: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    services: Vec<BookingService>,
    version: u64,
}

impl Booking {
    /// Builds a booking in `pending` with nothing paid. The total is the sum
    /// of the line-item prices and is immutable afterward.
    pub fn create(params: NewBooking) -> DomainResult<(Booking, BookingEvent)> {
        for (field, value) in [
            ("booking id", &params.id),
            ("customer id", &params.customer_id),
            ("provider id", &params.provider_id),
            ("location id", &params.location_id),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!("Missing {}", field)));
            }
        }
        if params.services.is_empty() {
            return Err(DomainError::Validation(
                "Booking requires at least one service".to_string(),
            ));
        }
        if params.is_home_service
            && params
                .service_address
                .as_deref()
                .map_or(true, |a| a.trim().is_empty())
        {
            return Err(DomainError::Validation(
                "Home service bookings require a service address".to_string(),
            ));
        }
        let start = parse_wall_clock(&params.start_time)?;
        let end = parse_wall_clock(&params.end_time)?;
        if start >= end {
            return Err(DomainError::Validation(format!(
                "Start time {} must be before end time {}",
                params.start_time, params.end_time
            )));
        }

        let mut total = Money::zero(params.services[0].price.currency())?;
        for item in &params.services {
            total = total.add(&item.price)?;
        }
        let paid = Money::zero(total.currency())?;

        let now = Utc::now();
        let booking = Booking {
            id: params.id.clone(),
            customer_id: params.customer_id.clone(),
            provider_id: params.provider_id.clone(),
            location_id: params.location_id,
            staff_id: params.staff_id,
            status: BookingStatus::Pending,
            scheduled_date: params.scheduled_date,
            start_time: params.start_time,
            end_time: params.end_time,
            total_amount: total.clone(),
            paid_amount: paid,
            is_home_service: params.is_home_service,
            service_address: params.service_address,
            customer_phone: params.customer_phone,
            customer_email: params.customer_email,
            notes: params.notes,
            cancelled_by: None,
            cancellation_reason: None,
            confirmed_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
            services: params.services,
            version: 0,
        };
        let event = BookingEvent::Created {
            booking_id: params.id,
            customer_id: params.customer_id,
            provider_id: params.provider_id,
            total_amount: total,
        };
        Ok((booking, event))
    }

    pub fn confirm(&mut self) -> DomainResult<BookingEvent> {
        self.ensure_transition(self.status.can_be_confirmed(), BookingStatus::Confirmed)?;
        let now = Utc::now();
        self.status = BookingStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(BookingEvent::Confirmed {
            booking_id: self.id.clone(),
            at: now,
        })
    }

    pub fn start(&mut self) -> DomainResult<BookingEvent> {
        self.ensure_transition(self.status.can_be_started(), BookingStatus::InProgress)?;
        let now = Utc::now();
        self.status = BookingStatus::InProgress;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(BookingEvent::Started {
            booking_id: self.id.clone(),
            at: now,
        })
    }

    pub fn complete(&mut self) -> DomainResult<BookingEvent> {
        self.ensure_transition(self.status.can_be_completed(), BookingStatus::Completed)?;
        let now = Utc::now();
        self.status = BookingStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(BookingEvent::Completed {
            booking_id: self.id.clone(),
            at: now,
        })
    }

    pub fn cancel(&mut self, cancelled_by: &str, reason: &str) -> DomainResult<BookingEvent> {
        self.ensure_transition(self.status.can_be_cancelled(), BookingStatus::Cancelled)?;
        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.cancelled_by = Some(cancelled_by.to_string());
        self.cancellation_reason = Some(reason.to_string());
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(BookingEvent::Cancelled {
            booking_id: self.id.clone(),
            cancelled_by: cancelled_by.to_string(),
            reason: reason.to_string(),
            at: now,
        })
    }

    /// Records that payment was taken for this booking. `paid_amount` is a
    /// historical record; refunds are bookkept on the wallet, never by
    /// reducing this value.
    pub fn mark_payment_received(&mut self, amount: Money) -> DomainResult<BookingEvent> {
        if !self.paid_amount.is_zero() {
            return Err(DomainError::Conflict(format!(
                "Payment already recorded for booking {}",
                self.id
            )));
        }
        if amount.currency() != self.total_amount.currency() {
            return Err(DomainError::Validation(format!(
                "Payment currency {} does not match booking currency {}",
                amount.currency(),
                self.total_amount.currency()
            )));
        }
        self.paid_amount = amount.clone();
        self.updated_at = Utc::now();
        Ok(BookingEvent::PaymentReceived {
            booking_id: self.id.clone(),
            amount,
        })
    }

    /// Refund due under `policy`, evaluated against `now` in the booking's
    /// local calendar. Zero unless the booking is cancelled and was paid.
    pub fn calculate_refund_amount(
        &self,
        policy: &RefundPolicy,
        now: NaiveDateTime,
    ) -> DomainResult<Money> {
        let zero = Money::zero(self.total_amount.currency())?;
        if self.status != BookingStatus::Cancelled || self.paid_amount.is_zero() {
            return Ok(zero);
        }
        let start = parse_wall_clock(&self.start_time)?;
        let scheduled = self.scheduled_date.and_time(start);
        let minutes_until = (scheduled - now).num_minutes();
        if minutes_until >= self.full_refund_cutoff(policy) {
            Ok(self.paid_amount.clone())
        } else if minutes_until >= self.partial_refund_cutoff(policy) {
            let partial = self
                .paid_amount
                .multiply(policy.partial_refund_percent / dec!(100))?;
            Ok(partial.rounded_to_unit())
        } else {
            Ok(zero)
        }
    }

    pub fn reschedule(
        &mut self,
        new_date: NaiveDate,
        new_start_time: &str,
        new_end_time: &str,
    ) -> DomainResult<BookingEvent> {
        if !matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            return Err(DomainError::Conflict(format!(
                "Cannot reschedule booking in status {}",
                self.status
            )));
        }
        let start = parse_wall_clock(new_start_time)?;
        let end = parse_wall_clock(new_end_time)?;
        if start >= end {
            return Err(DomainError::Validation(format!(
                "Start time {} must be before end time {}",
                new_start_time, new_end_time
            )));
        }
        self.scheduled_date = new_date;
        self.start_time = new_start_time.to_string();
        self.end_time = new_end_time.to_string();
        self.updated_at = Utc::now();
        Ok(BookingEvent::Rescheduled {
            booking_id: self.id.clone(),
            scheduled_date: new_date,
            start_time: new_start_time.to_string(),
            end_time: new_end_time.to_string(),
        })
    }

    pub fn total_duration_minutes(&self) -> i64 {
        self.services.iter().map(|s| s.duration_minutes).sum()
    }

    fn ensure_transition(&self, allowed: bool, target: BookingStatus) -> DomainResult<()> {
        if !allowed {
            return Err(DomainError::Conflict(format!(
                "Cannot transition from {} to {}",
                self.status, target
            )));
        }
        Ok(())
    }

    fn full_refund_cutoff(&self, policy: &RefundPolicy) -> i64 {
        policy.full_refund_hours * 60
    }

    fn partial_refund_cutoff(&self, policy: &RefundPolicy) -> i64 {
        policy.partial_refund_hours * 60
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn staff_id(&self) -> Option<&str> {
        self.staff_id.as_deref()
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn total_amount(&self) -> &Money {
        &self.total_amount
    }

    pub fn paid_amount(&self) -> &Money {
        &self.paid_amount
    }

    pub fn currency(&self) -> &str {
        self.total_amount.currency()
    }

    pub fn is_home_service(&self) -> bool {
        self.is_home_service
    }

    pub fn service_address(&self) -> Option<&str> {
        self.service_address.as_deref()
    }

    pub fn customer_phone(&self) -> Option<&str> {
        self.customer_phone.as_deref()
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn cancelled_by(&self) -> Option<&str> {
        self.cancelled_by.as_deref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn services(&self) -> &[BookingService] {
        &self.services
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

fn parse_wall_clock(value: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| DomainError::Validation(format!("Invalid time '{}', expected HH:MM", value)))
}
