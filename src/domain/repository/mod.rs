// src/domain/repository/mod.rs
// Repository and collaborator interfaces for the booking/wallet core.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::errors::DomainResult;
use crate::domain::money::Money;
use crate::domain::wallet::{Wallet, WalletTransaction};

/// Page request. Defaults to the first page of 20 items.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BookingSearchFilters {
    pub customer_id: Option<String>,
    pub provider_id: Option<String>,
    pub status: Option<BookingStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Saving an aggregate enforces optimistic concurrency: the stored version
/// must match the version the aggregate was loaded at, otherwise the save
/// fails with a conflict and the caller's decision is stale.
#[async_trait]
pub trait BookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;
    async fn search(
        &self,
        filters: &BookingSearchFilters,
        pagination: Pagination,
    ) -> DomainResult<Page<Booking>>;
    async fn save(&self, booking: &Booking) -> DomainResult<()>;
    /// Administrative escape hatch; business logic never deletes bookings.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}

#[async_trait]
pub trait WalletRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Wallet>>;
    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<Wallet>>;
    async fn exists(&self, user_id: &str) -> DomainResult<bool>;
    async fn save(&self, wallet: &Wallet) -> DomainResult<()>;
}

#[async_trait]
pub trait WalletTransactionRepository {
    async fn find_by_wallet_id(
        &self,
        wallet_id: &str,
        pagination: Pagination,
    ) -> DomainResult<Vec<WalletTransaction>>;
    async fn count_by_wallet_id(&self, wallet_id: &str) -> DomainResult<usize>;
    async fn find_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> DomainResult<Vec<WalletTransaction>>;
    async fn save(&self, transaction: &WalletTransaction) -> DomainResult<()>;
}

/// Reservation held against a location's calendar. Released when the
/// booking that holds it is cancelled.
#[derive(Debug, Clone)]
pub struct TimeSlot {
    pub id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    booking_id: Option<String>,
}

impl TimeSlot {
    pub fn reserved(
        id: &str,
        location_id: &str,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
        booking_id: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            location_id: location_id.to_string(),
            date,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            booking_id: Some(booking_id.to_string()),
        }
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.booking_id.as_deref()
    }

    pub fn release(&mut self) {
        self.booking_id = None;
    }
}

#[async_trait]
pub trait TimeSlotRepository {
    async fn find_by_location_and_date(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<TimeSlot>>;
    async fn save(&self, slot: &TimeSlot) -> DomainResult<()>;
}

// Catalog collaborator types. Ownership and activity checks for booking
// creation happen against these; the catalog itself is maintained outside
// this core.

#[derive(Debug, Clone)]
pub struct Provider {
    pub id: String,
    pub active: bool,
    pub supports_home_service: bool,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub id: String,
    pub provider_id: String,
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub price: Money,
    pub duration_minutes: i64,
    pub active: bool,
}

#[async_trait]
pub trait ProviderCatalog {
    async fn find_provider(&self, id: &str) -> DomainResult<Option<Provider>>;
    async fn find_location(&self, id: &str) -> DomainResult<Option<Location>>;
    async fn find_service(&self, id: &str) -> DomainResult<Option<CatalogService>>;
}
