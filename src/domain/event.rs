// src/domain/event.rs
// Domain events returned by aggregate mutations.
//
// Aggregates never queue events internally; every mutating operation hands
// its event back to the caller, and the orchestration layer dispatches them
// only after the involved aggregates have been persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::money::Money;
use crate::domain::wallet::{TransactionType, WalletTransaction};

#[derive(Debug, Clone, Serialize)]
pub enum BookingEvent {
    Created {
        booking_id: String,
        customer_id: String,
        provider_id: String,
        total_amount: Money,
    },
    Confirmed {
        booking_id: String,
        at: DateTime<Utc>,
    },
    PaymentReceived {
        booking_id: String,
        amount: Money,
    },
    Started {
        booking_id: String,
        at: DateTime<Utc>,
    },
    Completed {
        booking_id: String,
        at: DateTime<Utc>,
    },
    Cancelled {
        booking_id: String,
        cancelled_by: String,
        reason: String,
        at: DateTime<Utc>,
    },
    Rescheduled {
        booking_id: String,
        scheduled_date: NaiveDate,
        start_time: String,
        end_time: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub enum WalletEvent {
    Created {
        wallet_id: String,
        user_id: String,
    },
    Credited {
        wallet_id: String,
        transaction_id: String,
        transaction_type: TransactionType,
        amount: Money,
        balance_after: Money,
    },
    Debited {
        wallet_id: String,
        transaction_id: String,
        transaction_type: TransactionType,
        amount: Money,
        balance_after: Money,
    },
}

impl WalletEvent {
    /// Derives the credit/debit event for a freshly produced ledger entry.
    /// Adjustments are reported as credits or debits according to how the
    /// balance actually moved, passed in by the wallet operation.
    pub fn from_transaction(tx: &WalletTransaction, credited: bool) -> Self {
        let base = (
            tx.wallet_id().to_string(),
            tx.id().to_string(),
            tx.transaction_type(),
            tx.amount().clone(),
            tx.balance_after().clone(),
        );
        if credited {
            WalletEvent::Credited {
                wallet_id: base.0,
                transaction_id: base.1,
                transaction_type: base.2,
                amount: base.3,
                balance_after: base.4,
            }
        } else {
            WalletEvent::Debited {
                wallet_id: base.0,
                transaction_id: base.1,
                transaction_type: base.2,
                amount: base.3,
                balance_after: base.4,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum DomainEvent {
    Booking(BookingEvent),
    Wallet(WalletEvent),
}

impl From<BookingEvent> for DomainEvent {
    fn from(event: BookingEvent) -> Self {
        DomainEvent::Booking(event)
    }
}

impl From<WalletEvent> for DomainEvent {
    fn from(event: WalletEvent) -> Self {
        DomainEvent::Wallet(event)
    }
}
