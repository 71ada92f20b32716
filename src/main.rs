// src/main.rs
// Demo composition root: wires the in-memory infrastructure and walks a
// booking through deposit -> create -> confirm -> cancel.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use bookpay::application::dto::{CancelBookingCommand, CreateBookingCommand, Pagination};
use bookpay::application::usecase::{
    BookingLifecycleUseCase, BookingManager, WalletManager, WalletOperationsUseCase,
};
use bookpay::config::Config;
use bookpay::domain::errors::AppResult;
use bookpay::domain::money::Money;
use bookpay::domain::repository::{CatalogService, Location, Provider};
use bookpay::infrastructure::event::LogEventDispatcher;
use bookpay::infrastructure::memory::{
    InMemoryBookingRepository, InMemoryProviderCatalog, InMemoryTimeSlotRepository,
    InMemoryWalletRepository, InMemoryWalletTransactionRepository,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    log::info!("Starting bookpay v{}", env!("CARGO_PKG_VERSION"));
    let currency = config.service.default_currency.clone();

    let bookings = Arc::new(InMemoryBookingRepository::new());
    let wallets = Arc::new(InMemoryWalletRepository::new());
    let transactions = Arc::new(InMemoryWalletTransactionRepository::new());
    let time_slots = Arc::new(InMemoryTimeSlotRepository::new());
    let catalog = Arc::new(InMemoryProviderCatalog::new());
    let dispatcher = Arc::new(LogEventDispatcher::new());

    seed_catalog(&catalog, &currency).await?;

    let wallet_ops = WalletManager::new(wallets.clone(), transactions.clone(), dispatcher.clone());
    let booking_ops = BookingManager::new(
        bookings,
        wallets,
        transactions,
        time_slots,
        catalog,
        dispatcher,
        config.refund.to_policy(),
    );

    let customer = "customer-demo";
    let provider = "provider-demo";

    wallet_ops.create_wallet(customer, &currency).await?;
    wallet_ops
        .deposit(
            customer,
            Money::new(Decimal::from(200_000), &currency)?,
            "initial top up",
        )
        .await?;

    let booking = booking_ops
        .create_booking(CreateBookingCommand {
            customer_id: customer.to_string(),
            provider_id: provider.to_string(),
            location_id: "location-demo".to_string(),
            staff_id: None,
            scheduled_date: (Utc::now() + Duration::days(3)).date_naive(),
            start_time: "10:00".to_string(),
            service_ids: vec!["service-haircut".to_string(), "service-spa".to_string()],
            is_home_service: false,
            service_address: None,
            customer_phone: Some("0900000000".to_string()),
            customer_email: None,
            notes: Some("demo booking".to_string()),
        })
        .await?;
    log::info!(
        "Booking {} created: total {}, status {}",
        booking.id,
        booking.total_amount,
        booking.status
    );

    let confirmed = booking_ops.confirm_booking(&booking.id, customer).await?;
    log::info!(
        "Booking confirmed, paid {}; wallet balance {}",
        confirmed.paid_amount,
        wallet_ops.get_wallet(customer).await?.balance
    );

    let cancelled = booking_ops
        .cancel_booking(CancelBookingCommand {
            booking_id: booking.id.clone(),
            actor_id: customer.to_string(),
            reason: "change of plans".to_string(),
        })
        .await?;
    log::info!(
        "Booking cancelled by {:?}; wallet balance {}",
        cancelled.cancelled_by,
        wallet_ops.get_wallet(customer).await?.balance
    );

    let statement = wallet_ops
        .list_transactions(customer, Pagination::default())
        .await?;
    log::info!("Wallet statement ({} entries):", statement.total);
    for tx in &statement.items {
        log::info!(
            "  {} {} -> balance {} ({})",
            tx.transaction_type,
            tx.amount,
            tx.balance_after,
            tx.description
        );
    }

    Ok(())
}

async fn seed_catalog(catalog: &InMemoryProviderCatalog, currency: &str) -> AppResult<()> {
    catalog
        .add_provider(Provider {
            id: "provider-demo".to_string(),
            active: true,
            supports_home_service: true,
        })
        .await;
    catalog
        .add_location(Location {
            id: "location-demo".to_string(),
            provider_id: "provider-demo".to_string(),
        })
        .await;
    catalog
        .add_service(CatalogService {
            id: "service-haircut".to_string(),
            provider_id: "provider-demo".to_string(),
            name: "Haircut".to_string(),
            price: Money::new(Decimal::from(100_000), currency)?,
            duration_minutes: 60,
            active: true,
        })
        .await;
    catalog
        .add_service(CatalogService {
            id: "service-spa".to_string(),
            provider_id: "provider-demo".to_string(),
            name: "Spa treatment".to_string(),
            price: Money::new(Decimal::from(50_000), currency)?,
            duration_minutes: 30,
            active: true,
        })
        .await;
    Ok(())
}
