// src/application/dto.rs
// Commands, read-side projections and the application error type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::booking::{Booking, BookingService, BookingStatus};
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::wallet::{TransactionType, Wallet, WalletTransaction};

pub use crate::domain::repository::{Page, Pagination};

/// Use cases add caller context but never reinterpret domain errors, so
/// the domain taxonomy passes through unchanged.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApplicationError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApplicationError::Domain(DomainError::Conflict(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplicationError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApplicationError::Domain(DomainError::Validation(_)))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl From<ApplicationError> for crate::domain::errors::AppError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => crate::domain::errors::AppError::Domain(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub customer_id: String,
    pub provider_id: String,
    pub location_id: String,
    pub staff_id: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub service_ids: Vec<String>,
    pub is_home_service: bool,
    pub service_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub booking_id: String,
    pub actor_id: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct RescheduleBookingCommand {
    pub booking_id: String,
    pub actor_id: String,
    pub new_date: NaiveDate,
    pub new_start_time: String,
}

/// Transitions an administrator may force. Legality is still decided by
/// the booking state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedTransition {
    Confirm,
    Start,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingServiceView {
    pub id: String,
    pub service_id: String,
    pub service_name: String,
    pub price: Money,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub id: String,
    pub customer_id: String,
    pub provider_id: String,
    pub location_id: String,
    pub staff_id: Option<String>,
    pub status: BookingStatus,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub currency: String,
    pub is_home_service: bool,
    pub service_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub services: Vec<BookingServiceView>,
}

impl From<&BookingService> for BookingServiceView {
    fn from(item: &BookingService) -> Self {
        Self {
            id: item.id.clone(),
            service_id: item.service_id.clone(),
            service_name: item.service_name.clone(),
            price: item.price.clone(),
            duration_minutes: item.duration_minutes,
        }
    }
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id().to_string(),
            customer_id: booking.customer_id().to_string(),
            provider_id: booking.provider_id().to_string(),
            location_id: booking.location_id().to_string(),
            staff_id: booking.staff_id().map(str::to_string),
            status: booking.status(),
            scheduled_date: booking.scheduled_date(),
            start_time: booking.start_time().to_string(),
            end_time: booking.end_time().to_string(),
            total_amount: booking.total_amount().clone(),
            paid_amount: booking.paid_amount().clone(),
            currency: booking.currency().to_string(),
            is_home_service: booking.is_home_service(),
            service_address: booking.service_address().map(str::to_string),
            customer_phone: booking.customer_phone().map(str::to_string),
            customer_email: booking.customer_email().map(str::to_string),
            notes: booking.notes().map(str::to_string),
            cancelled_by: booking.cancelled_by().map(str::to_string),
            cancellation_reason: booking.cancellation_reason().map(str::to_string),
            confirmed_at: booking.confirmed_at(),
            started_at: booking.started_at(),
            completed_at: booking.completed_at(),
            cancelled_at: booking.cancelled_at(),
            created_at: booking.created_at(),
            updated_at: booking.updated_at(),
            services: booking.services().iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub id: String,
    pub user_id: String,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Wallet> for WalletView {
    fn from(wallet: &Wallet) -> Self {
        Self {
            id: wallet.id().to_string(),
            user_id: wallet.user_id().to_string(),
            balance: wallet.balance().clone(),
            created_at: wallet.created_at(),
            updated_at: wallet.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletTransactionView {
    pub id: String,
    pub wallet_id: String,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub balance_after: Money,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&WalletTransaction> for WalletTransactionView {
    fn from(tx: &WalletTransaction) -> Self {
        Self {
            id: tx.id().to_string(),
            wallet_id: tx.wallet_id().to_string(),
            transaction_type: tx.transaction_type(),
            amount: tx.amount().clone(),
            balance_after: tx.balance_after().clone(),
            reference_type: tx.reference_type().map(str::to_string),
            reference_id: tx.reference_id().map(str::to_string),
            description: tx.description().to_string(),
            created_at: tx.created_at(),
        }
    }
}
