// src/infrastructure/memory/mod.rs
// In-memory repository implementations.
//
// Booking and wallet saves are version-checked: the stored version must
// match the version the caller loaded, so of two concurrent writers the
// second one fails with a conflict instead of overwriting the first.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::domain::booking::Booking;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repository::{
    BookingRepository, BookingSearchFilters, CatalogService, Location, Page, Pagination,
    Provider, ProviderCatalog, TimeSlot, TimeSlotRepository, WalletRepository,
    WalletTransactionRepository,
};
use crate::domain::wallet::{TransactionType, Wallet, WalletTransaction};

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<String, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.lock().await.get(id).cloned())
    }

    async fn search(
        &self,
        filters: &BookingSearchFilters,
        pagination: Pagination,
    ) -> DomainResult<Page<Booking>> {
        let bookings = self.bookings.lock().await;
        let mut matches: Vec<Booking> = bookings
            .values()
            .filter(|b| {
                filters
                    .customer_id
                    .as_deref()
                    .map_or(true, |id| b.customer_id() == id)
                    && filters
                        .provider_id
                        .as_deref()
                        .map_or(true, |id| b.provider_id() == id)
                    && filters.status.map_or(true, |s| b.status() == s)
                    && filters.from_date.map_or(true, |d| b.scheduled_date() >= d)
                    && filters.to_date.map_or(true, |d| b.scheduled_date() <= d)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|b| b.created_at());
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();
        Ok(Page {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn save(&self, booking: &Booking) -> DomainResult<()> {
        let mut bookings = self.bookings.lock().await;
        if let Some(stored) = bookings.get(booking.id()) {
            if stored.version() != booking.version() {
                return Err(DomainError::Conflict(format!(
                    "Booking {} was modified concurrently",
                    booking.id()
                )));
            }
        }
        let mut next = booking.clone();
        next.bump_version();
        bookings.insert(next.id().to_string(), next);
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.bookings.lock().await.remove(id).map(|_| ()).ok_or_else(|| {
            DomainError::NotFound(format!("Booking {} not found", id))
        })
    }
}

#[derive(Default)]
pub struct InMemoryWalletRepository {
    wallets: Mutex<HashMap<String, Wallet>>,
}

impl InMemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Wallet>> {
        Ok(self.wallets.lock().await.get(id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<Wallet>> {
        Ok(self
            .wallets
            .lock()
            .await
            .values()
            .find(|w| w.user_id() == user_id)
            .cloned())
    }

    async fn exists(&self, user_id: &str) -> DomainResult<bool> {
        Ok(self
            .wallets
            .lock()
            .await
            .values()
            .any(|w| w.user_id() == user_id))
    }

    async fn save(&self, wallet: &Wallet) -> DomainResult<()> {
        let mut wallets = self.wallets.lock().await;
        if let Some(stored) = wallets.get(wallet.id()) {
            if stored.version() != wallet.version() {
                return Err(DomainError::Conflict(format!(
                    "Wallet {} was modified concurrently",
                    wallet.id()
                )));
            }
        }
        let mut next = wallet.clone();
        next.bump_version();
        wallets.insert(next.id().to_string(), next);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryWalletTransactionRepository {
    transactions: Mutex<Vec<WalletTransaction>>,
}

impl InMemoryWalletTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletTransactionRepository for InMemoryWalletTransactionRepository {
    async fn find_by_wallet_id(
        &self,
        wallet_id: &str,
        pagination: Pagination,
    ) -> DomainResult<Vec<WalletTransaction>> {
        let transactions = self.transactions.lock().await;
        let mut matches: Vec<WalletTransaction> = transactions
            .iter()
            .filter(|t| t.wallet_id() == wallet_id)
            .cloned()
            .collect();
        // Newest first, the order a statement is read in.
        matches.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matches
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect())
    }

    async fn count_by_wallet_id(&self, wallet_id: &str) -> DomainResult<usize> {
        Ok(self
            .transactions
            .lock()
            .await
            .iter()
            .filter(|t| t.wallet_id() == wallet_id)
            .count())
    }

    async fn find_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> DomainResult<Vec<WalletTransaction>> {
        Ok(self
            .transactions
            .lock()
            .await
            .iter()
            .filter(|t| {
                t.reference_type() == Some(reference_type)
                    && t.reference_id() == Some(reference_id)
            })
            .cloned()
            .collect())
    }

    async fn save(&self, transaction: &WalletTransaction) -> DomainResult<()> {
        let mut transactions = self.transactions.lock().await;
        // (reference, operation type) is an idempotency key: at most one
        // refund per booking, and at most one payment that has not been
        // reversed by a booking-referenced adjustment.
        if let (Some(ref_type), Some(ref_id)) =
            (transaction.reference_type(), transaction.reference_id())
        {
            let same_ref = |t: &&WalletTransaction| {
                t.reference_type() == Some(ref_type) && t.reference_id() == Some(ref_id)
            };
            match transaction.transaction_type() {
                TransactionType::Refund => {
                    let refunded = transactions
                        .iter()
                        .filter(same_ref)
                        .any(|t| t.transaction_type() == TransactionType::Refund);
                    if refunded {
                        return Err(DomainError::Conflict(format!(
                            "A refund for {} {} is already recorded",
                            ref_type, ref_id
                        )));
                    }
                }
                TransactionType::Payment => {
                    let payments = transactions
                        .iter()
                        .filter(same_ref)
                        .filter(|t| t.transaction_type() == TransactionType::Payment)
                        .count();
                    let reversals = transactions
                        .iter()
                        .filter(same_ref)
                        .filter(|t| t.transaction_type() == TransactionType::Adjustment)
                        .count();
                    if payments > reversals {
                        return Err(DomainError::Conflict(format!(
                            "A payment for {} {} is already recorded",
                            ref_type, ref_id
                        )));
                    }
                }
                _ => {}
            }
        }
        // Append-only: entries are never updated or removed.
        transactions.push(transaction.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTimeSlotRepository {
    slots: Mutex<HashMap<String, TimeSlot>>,
}

impl InMemoryTimeSlotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimeSlotRepository for InMemoryTimeSlotRepository {
    async fn find_by_location_and_date(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<TimeSlot>> {
        Ok(self
            .slots
            .lock()
            .await
            .values()
            .filter(|s| s.location_id == location_id && s.date == date)
            .cloned()
            .collect())
    }

    async fn save(&self, slot: &TimeSlot) -> DomainResult<()> {
        self.slots
            .lock()
            .await
            .insert(slot.id.clone(), slot.clone());
        Ok(())
    }
}

/// Seedable stand-in for the partner/catalog service this core talks to.
#[derive(Default)]
pub struct InMemoryProviderCatalog {
    providers: Mutex<HashMap<String, Provider>>,
    locations: Mutex<HashMap<String, Location>>,
    services: Mutex<HashMap<String, CatalogService>>,
}

impl InMemoryProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_provider(&self, provider: Provider) {
        self.providers
            .lock()
            .await
            .insert(provider.id.clone(), provider);
    }

    pub async fn add_location(&self, location: Location) {
        self.locations
            .lock()
            .await
            .insert(location.id.clone(), location);
    }

    pub async fn add_service(&self, service: CatalogService) {
        self.services
            .lock()
            .await
            .insert(service.id.clone(), service);
    }
}

#[async_trait]
impl ProviderCatalog for InMemoryProviderCatalog {
    async fn find_provider(&self, id: &str) -> DomainResult<Option<Provider>> {
        Ok(self.providers.lock().await.get(id).cloned())
    }

    async fn find_location(&self, id: &str) -> DomainResult<Option<Location>> {
        Ok(self.locations.lock().await.get(id).cloned())
    }

    async fn find_service(&self, id: &str) -> DomainResult<Option<CatalogService>> {
        Ok(self.services.lock().await.get(id).cloned())
    }
}
