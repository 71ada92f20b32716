// src/application/usecase/mod.rs
pub mod booking_usecase;
pub mod wallet_usecase;

// Re-export public API
pub use booking_usecase::{BookingLifecycleUseCase, BookingManager};
pub use wallet_usecase::{WalletManager, WalletOperationsUseCase};
