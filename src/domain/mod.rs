// src/domain/mod.rs
pub mod booking;
pub mod errors;
pub mod event;
pub mod money;
pub mod repository;
pub mod wallet;

// Re-export common types for convenience
pub use booking::{Booking, BookingService, BookingStatus, NewBooking, RefundPolicy};
pub use errors::{AppError, AppResult, DomainError, DomainResult};
pub use event::{BookingEvent, DomainEvent, WalletEvent};
pub use money::Money;
pub use wallet::{AdjustmentDirection, TransactionType, Wallet, WalletTransaction};
