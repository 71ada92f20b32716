// tests/common/mod.rs
// Shared wiring for integration tests: in-memory infrastructure, a seeded
// catalog and the two use-case managers.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use bookpay::application::dto::{BookingView, CreateBookingCommand};
use bookpay::application::usecase::{BookingLifecycleUseCase, BookingManager, WalletManager};
use bookpay::domain::booking::RefundPolicy;
use bookpay::domain::money::Money;
use bookpay::domain::repository::{CatalogService, Location, Provider};
use bookpay::infrastructure::event::RecordingEventDispatcher;
use bookpay::infrastructure::memory::{
    InMemoryBookingRepository, InMemoryProviderCatalog, InMemoryTimeSlotRepository,
    InMemoryWalletRepository, InMemoryWalletTransactionRepository,
};

pub const CUSTOMER: &str = "customer-1";
pub const PROVIDER: &str = "provider-1";
pub const LOCATION: &str = "location-1";
pub const HAIRCUT: &str = "service-haircut";
pub const SPA: &str = "service-spa";

pub struct TestApp {
    pub bookings: Arc<InMemoryBookingRepository>,
    pub wallets: Arc<InMemoryWalletRepository>,
    pub transactions: Arc<InMemoryWalletTransactionRepository>,
    pub time_slots: Arc<InMemoryTimeSlotRepository>,
    pub catalog: Arc<InMemoryProviderCatalog>,
    pub dispatcher: Arc<RecordingEventDispatcher>,
    pub booking_ops: BookingManager,
    pub wallet_ops: WalletManager,
}

pub async fn test_app() -> TestApp {
    let bookings = Arc::new(InMemoryBookingRepository::new());
    let wallets = Arc::new(InMemoryWalletRepository::new());
    let transactions = Arc::new(InMemoryWalletTransactionRepository::new());
    let time_slots = Arc::new(InMemoryTimeSlotRepository::new());
    let catalog = Arc::new(InMemoryProviderCatalog::new());
    let dispatcher = Arc::new(RecordingEventDispatcher::new());

    catalog
        .add_provider(Provider {
            id: PROVIDER.to_string(),
            active: true,
            supports_home_service: true,
        })
        .await;
    catalog
        .add_location(Location {
            id: LOCATION.to_string(),
            provider_id: PROVIDER.to_string(),
        })
        .await;
    catalog
        .add_service(CatalogService {
            id: HAIRCUT.to_string(),
            provider_id: PROVIDER.to_string(),
            name: "Haircut".to_string(),
            price: vnd(100_000),
            duration_minutes: 60,
            active: true,
        })
        .await;
    catalog
        .add_service(CatalogService {
            id: SPA.to_string(),
            provider_id: PROVIDER.to_string(),
            name: "Spa treatment".to_string(),
            price: vnd(50_000),
            duration_minutes: 30,
            active: true,
        })
        .await;

    let wallet_ops = WalletManager::new(wallets.clone(), transactions.clone(), dispatcher.clone());
    let booking_ops = BookingManager::new(
        bookings.clone(),
        wallets.clone(),
        transactions.clone(),
        time_slots.clone(),
        catalog.clone(),
        dispatcher.clone(),
        RefundPolicy::default(),
    );

    TestApp {
        bookings,
        wallets,
        transactions,
        time_slots,
        catalog,
        dispatcher,
        booking_ops,
        wallet_ops,
    }
}

pub fn vnd(amount: i64) -> Money {
    Money::new(Decimal::from(amount), "VND").unwrap()
}

/// A schedule comfortably more than 24 hours away, clear of midnight.
pub fn far_schedule() -> (NaiveDate, String) {
    let date = (Utc::now() + Duration::hours(48)).date_naive();
    (date, "10:00".to_string())
}

/// A schedule between 2 and 24 hours away, shifted earlier when the start
/// time would push the booking past midnight.
pub fn partial_window_schedule() -> (NaiveDate, String) {
    let mut at = Utc::now().naive_utc() + Duration::hours(10);
    if at.time() > chrono::NaiveTime::from_hms_opt(22, 0, 0).unwrap() {
        at -= Duration::hours(3);
    }
    (at.date(), at.time().format("%H:%M").to_string())
}

pub fn booking_command(date: NaiveDate, start_time: &str) -> CreateBookingCommand {
    CreateBookingCommand {
        customer_id: CUSTOMER.to_string(),
        provider_id: PROVIDER.to_string(),
        location_id: LOCATION.to_string(),
        staff_id: None,
        scheduled_date: date,
        start_time: start_time.to_string(),
        service_ids: vec![HAIRCUT.to_string(), SPA.to_string()],
        is_home_service: false,
        service_address: None,
        customer_phone: Some("0900000000".to_string()),
        customer_email: None,
        notes: None,
    }
}

pub async fn create_far_booking(app: &TestApp) -> BookingView {
    let (date, start) = far_schedule();
    app.booking_ops
        .create_booking(booking_command(date, &start))
        .await
        .unwrap()
}
