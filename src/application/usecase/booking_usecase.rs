// src/application/usecase/booking_usecase.rs
// Booking lifecycle use cases: sequencing of booking-state changes with
// wallet payments and refunds.
//
// Money is persisted before booking state in the paired flows. A confirm or
// cancel that fails between the two writes can be retried: existing
// payment/refund transactions referencing the booking are detected through
// the ledger and never applied twice.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, Utc};
use uuid::Uuid;

use crate::application::dto::{
    ApplicationResult, BookingView, CancelBookingCommand, CreateBookingCommand, ForcedTransition,
    Page, Pagination, RescheduleBookingCommand,
};
use crate::application::service::EventDispatcher;
use crate::domain::booking::{Booking, BookingService, BookingStatus, NewBooking, RefundPolicy};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::event::{DomainEvent, WalletEvent};
use crate::domain::money::Money;
use crate::domain::repository::{
    BookingRepository, BookingSearchFilters, ProviderCatalog, TimeSlotRepository,
    WalletRepository, WalletTransactionRepository,
};
use crate::domain::wallet::{TransactionType, BOOKING_REFERENCE};

const TIME_FORMAT: &str = "%H:%M";

/// Booking lifecycle use case
#[async_trait]
pub trait BookingLifecycleUseCase {
    async fn create_booking(&self, cmd: CreateBookingCommand) -> ApplicationResult<BookingView>;
    async fn confirm_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView>;
    async fn start_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView>;
    async fn complete_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView>;
    async fn cancel_booking(&self, cmd: CancelBookingCommand) -> ApplicationResult<BookingView>;
    async fn reschedule_booking(
        &self,
        cmd: RescheduleBookingCommand,
    ) -> ApplicationResult<BookingView>;
    async fn admin_cancel_booking(
        &self,
        booking_id: &str,
        admin_id: &str,
        reason: &str,
    ) -> ApplicationResult<BookingView>;
    async fn admin_force_status(
        &self,
        booking_id: &str,
        admin_id: &str,
        transition: ForcedTransition,
    ) -> ApplicationResult<BookingView>;
    async fn get_booking(&self, booking_id: &str) -> ApplicationResult<BookingView>;
    async fn search_bookings(
        &self,
        filters: BookingSearchFilters,
        pagination: Pagination,
    ) -> ApplicationResult<Page<BookingView>>;
}

pub struct BookingManager {
    bookings: Arc<dyn BookingRepository + Send + Sync>,
    wallets: Arc<dyn WalletRepository + Send + Sync>,
    transactions: Arc<dyn WalletTransactionRepository + Send + Sync>,
    time_slots: Arc<dyn TimeSlotRepository + Send + Sync>,
    catalog: Arc<dyn ProviderCatalog + Send + Sync>,
    dispatcher: Arc<dyn EventDispatcher + Send + Sync>,
    refund_policy: RefundPolicy,
}

impl BookingManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: Arc<dyn BookingRepository + Send + Sync>,
        wallets: Arc<dyn WalletRepository + Send + Sync>,
        transactions: Arc<dyn WalletTransactionRepository + Send + Sync>,
        time_slots: Arc<dyn TimeSlotRepository + Send + Sync>,
        catalog: Arc<dyn ProviderCatalog + Send + Sync>,
        dispatcher: Arc<dyn EventDispatcher + Send + Sync>,
        refund_policy: RefundPolicy,
    ) -> Self {
        Self {
            bookings,
            wallets,
            transactions,
            time_slots,
            catalog,
            dispatcher,
            refund_policy,
        }
    }

    async fn load_booking(&self, booking_id: &str) -> ApplicationResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Booking {} not found", booking_id)).into()
            })
    }

    /// Customer or provider only. Anyone else gets the same answer as for
    /// an absent booking.
    fn authorize_party(&self, booking: &Booking, actor_id: &str) -> DomainResult<()> {
        if actor_id == booking.customer_id() || actor_id == booking.provider_id() {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!(
                "Booking {} not found",
                booking.id()
            )))
        }
    }

    fn authorize_provider(&self, booking: &Booking, actor_id: &str) -> DomainResult<()> {
        if actor_id == booking.provider_id() {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!(
                "Booking {} not found",
                booking.id()
            )))
        }
    }

    async fn snapshot_line_items(
        &self,
        cmd: &CreateBookingCommand,
        booking_id: &str,
    ) -> ApplicationResult<Vec<BookingService>> {
        let mut items = Vec::with_capacity(cmd.service_ids.len());
        for service_id in &cmd.service_ids {
            let service = self
                .catalog
                .find_service(service_id)
                .await?
                .ok_or_else(|| {
                    DomainError::NotFound(format!("Service {} not found", service_id))
                })?;
            if service.provider_id != cmd.provider_id || !service.active {
                return Err(DomainError::Validation(format!(
                    "Service {} is not available from provider {}",
                    service_id, cmd.provider_id
                ))
                .into());
            }
            items.push(BookingService {
                id: Uuid::new_v4().to_string(),
                booking_id: booking_id.to_string(),
                service_id: service.id,
                service_name: service.name,
                price: service.price,
                duration_minutes: service.duration_minutes,
            });
        }
        Ok(items)
    }

    fn end_time_from(&self, start_time: &str, duration_minutes: i64) -> DomainResult<String> {
        let start = NaiveTime::parse_from_str(start_time, TIME_FORMAT).map_err(|_| {
            DomainError::Validation(format!("Invalid time '{}', expected HH:MM", start_time))
        })?;
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes));
        if wrapped != 0 {
            return Err(DomainError::Validation(
                "Booking must start and end on the same day".to_string(),
            ));
        }
        Ok(end.format(TIME_FORMAT).to_string())
    }

    /// Reverses a debit taken by a confirm whose booking write lost the
    /// race. The reversal carries the booking reference so a retried
    /// confirm nets it against the payment and charges afresh. Logged on
    /// failure; the original conflict is still surfaced.
    async fn compensate_payment(&self, booking: &Booking, amount: &Money) {
        let note = format!(
            "reversal of payment for booking {}: confirmation failed",
            booking.id()
        );
        match self.wallets.find_by_user_id(booking.customer_id()).await {
            Ok(Some(mut wallet)) => {
                match wallet.reverse_payment(amount.clone(), booking.id(), &note) {
                    Ok(tx) => {
                        if let Err(e) = self.wallets.save(&wallet).await {
                            log::error!("Failed to persist compensation for booking {}: {}", booking.id(), e);
                            return;
                        }
                        if let Err(e) = self.transactions.save(&tx).await {
                            log::error!("Failed to record compensation for booking {}: {}", booking.id(), e);
                        }
                    }
                    Err(e) => log::error!("Compensation rejected for booking {}: {}", booking.id(), e),
                }
            }
            _ => log::error!(
                "Wallet for customer {} unavailable while compensating booking {}",
                booking.customer_id(),
                booking.id()
            ),
        }
    }

    async fn release_time_slots(&self, booking: &Booking) -> ApplicationResult<()> {
        let slots = self
            .time_slots
            .find_by_location_and_date(booking.location_id(), booking.scheduled_date())
            .await?;
        for mut slot in slots {
            if slot.booking_id() == Some(booking.id()) {
                slot.release();
                self.time_slots.save(&slot).await?;
                log::debug!("Released time slot {} for booking {}", slot.id, booking.id());
            }
        }
        Ok(())
    }

    async fn do_cancel(
        &self,
        mut booking: Booking,
        actor: &str,
        reason: &str,
    ) -> ApplicationResult<BookingView> {
        let booking_id = booking.id().to_string();
        let mut events: Vec<DomainEvent> = vec![booking.cancel(actor, reason)?.into()];

        let refund_due = booking
            .calculate_refund_amount(&self.refund_policy, Utc::now().naive_utc())?;
        if !refund_due.is_zero() {
            let refs = self
                .transactions
                .find_by_reference(BOOKING_REFERENCE, &booking_id)
                .await?;
            let already_refunded = refs
                .iter()
                .any(|t| t.transaction_type() == TransactionType::Refund);
            if already_refunded {
                log::info!(
                    "Refund for booking {} already recorded, skipping credit",
                    booking_id
                );
            } else {
                let mut wallet = self
                    .wallets
                    .find_by_user_id(booking.customer_id())
                    .await?
                    .ok_or_else(|| {
                        DomainError::NotFound(format!(
                            "Wallet for user {} not found",
                            booking.customer_id()
                        ))
                    })?;
                let tx = wallet.refund(
                    refund_due.clone(),
                    &booking_id,
                    &format!("Refund for booking {}", booking_id),
                )?;
                self.wallets.save(&wallet).await?;
                self.transactions.save(&tx).await?;
                log::info!(
                    "Refunded {} to wallet {} for booking {}",
                    refund_due,
                    wallet.id(),
                    booking_id
                );
                events.push(WalletEvent::from_transaction(&tx, true).into());
            }
        }

        self.bookings.save(&booking).await?;
        // The cancellation is durable at this point; a stuck reservation is
        // recoverable, a surfaced error on a cancelled booking is not.
        if let Err(err) = self.release_time_slots(&booking).await {
            log::error!(
                "Failed to release time slots for booking {}: {}",
                booking_id,
                err
            );
        }
        self.dispatch_all(events).await;
        Ok(BookingView::from(&booking))
    }

    async fn dispatch_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.dispatcher.dispatch(event).await;
        }
    }
}

#[async_trait]
impl BookingLifecycleUseCase for BookingManager {
    async fn create_booking(&self, cmd: CreateBookingCommand) -> ApplicationResult<BookingView> {
        let provider = self
            .catalog
            .find_provider(&cmd.provider_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Provider {} not found", cmd.provider_id))
            })?;
        if !provider.active {
            return Err(
                DomainError::Validation(format!("Provider {} is not active", provider.id)).into(),
            );
        }
        let location = self
            .catalog
            .find_location(&cmd.location_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Location {} not found", cmd.location_id))
            })?;
        if location.provider_id != provider.id {
            return Err(DomainError::Validation(format!(
                "Location {} does not belong to provider {}",
                location.id, provider.id
            ))
            .into());
        }
        if cmd.is_home_service && !provider.supports_home_service {
            return Err(DomainError::Validation(format!(
                "Provider {} does not offer home service",
                provider.id
            ))
            .into());
        }

        let booking_id = Uuid::new_v4().to_string();
        let items = self.snapshot_line_items(&cmd, &booking_id).await?;
        let duration: i64 = items.iter().map(|s| s.duration_minutes).sum();
        let end_time = self.end_time_from(&cmd.start_time, duration)?;

        let (booking, event) = Booking::create(NewBooking {
            id: booking_id,
            customer_id: cmd.customer_id,
            provider_id: cmd.provider_id,
            location_id: cmd.location_id,
            staff_id: cmd.staff_id,
            scheduled_date: cmd.scheduled_date,
            start_time: cmd.start_time,
            end_time,
            is_home_service: cmd.is_home_service,
            service_address: cmd.service_address,
            customer_phone: cmd.customer_phone,
            customer_email: cmd.customer_email,
            notes: cmd.notes,
            services: items,
        })?;
        self.bookings.save(&booking).await?;
        log::info!(
            "Created booking {} for customer {}: {}",
            booking.id(),
            booking.customer_id(),
            booking.total_amount()
        );
        self.dispatch_all(vec![event.into()]).await;
        Ok(BookingView::from(&booking))
    }

    async fn confirm_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView> {
        let mut booking = self.load_booking(booking_id).await?;
        self.authorize_party(&booking, actor_id)?;
        if !booking.status().can_be_confirmed() {
            return Err(DomainError::Conflict(format!(
                "Cannot transition from {} to {}",
                booking.status(),
                BookingStatus::Confirmed
            ))
            .into());
        }

        let mut events: Vec<DomainEvent> = Vec::new();
        let mut debited: Option<Money> = None;

        // Booking-referenced adjustments are payment reversals; a payment
        // only counts as prior if it has not been reversed.
        let refs = self
            .transactions
            .find_by_reference(BOOKING_REFERENCE, booking_id)
            .await?;
        let payments = refs
            .iter()
            .filter(|t| t.transaction_type() == TransactionType::Payment)
            .count();
        let reversals = refs
            .iter()
            .filter(|t| t.transaction_type() == TransactionType::Adjustment)
            .count();
        let prior_payment = if payments > reversals {
            refs.iter()
                .rev()
                .find(|t| t.transaction_type() == TransactionType::Payment)
                .cloned()
        } else {
            None
        };

        if let Some(prior) = prior_payment {
            // Retried confirm: the debit already happened, only the booking
            // side still needs to catch up.
            log::info!(
                "Booking {} already paid by transaction {}, skipping debit",
                booking_id,
                prior.id()
            );
            if booking.paid_amount().is_zero() {
                events.push(booking.mark_payment_received(prior.amount().clone())?.into());
            }
        } else if let Some(mut wallet) =
            self.wallets.find_by_user_id(booking.customer_id()).await?
        {
            let total = booking.total_amount().clone();
            if wallet.has_sufficient_balance(&total) {
                let tx = wallet.pay(
                    total.clone(),
                    booking_id,
                    &format!("Payment for booking {}", booking_id),
                )?;
                self.wallets.save(&wallet).await?;
                self.transactions.save(&tx).await?;
                log::info!(
                    "Debited {} from wallet {} for booking {}",
                    total,
                    wallet.id(),
                    booking_id
                );
                events.push(WalletEvent::from_transaction(&tx, false).into());
                events.push(booking.mark_payment_received(total.clone())?.into());
                debited = Some(total);
            } else {
                // Payment stays optional at confirmation time; enforcement
                // is deferred to a later step.
                log::info!(
                    "Wallet {} cannot cover booking {}, confirming unpaid",
                    wallet.id(),
                    booking_id
                );
            }
        } else {
            log::debug!(
                "No wallet for customer {}, confirming booking {} unpaid",
                booking.customer_id(),
                booking_id
            );
        }

        events.push(booking.confirm()?.into());
        if let Err(err) = self.bookings.save(&booking).await {
            if let Some(amount) = debited {
                self.compensate_payment(&booking, &amount).await;
            }
            return Err(err.into());
        }
        self.dispatch_all(events).await;
        Ok(BookingView::from(&booking))
    }

    async fn start_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView> {
        let mut booking = self.load_booking(booking_id).await?;
        self.authorize_provider(&booking, actor_id)?;
        let event = booking.start()?;
        self.bookings.save(&booking).await?;
        self.dispatch_all(vec![event.into()]).await;
        Ok(BookingView::from(&booking))
    }

    async fn complete_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
    ) -> ApplicationResult<BookingView> {
        let mut booking = self.load_booking(booking_id).await?;
        self.authorize_provider(&booking, actor_id)?;
        let event = booking.complete()?;
        self.bookings.save(&booking).await?;
        self.dispatch_all(vec![event.into()]).await;
        Ok(BookingView::from(&booking))
    }

    async fn cancel_booking(&self, cmd: CancelBookingCommand) -> ApplicationResult<BookingView> {
        let booking = self.load_booking(&cmd.booking_id).await?;
        self.authorize_party(&booking, &cmd.actor_id)?;
        self.do_cancel(booking, &cmd.actor_id, &cmd.reason).await
    }

    async fn reschedule_booking(
        &self,
        cmd: RescheduleBookingCommand,
    ) -> ApplicationResult<BookingView> {
        let mut booking = self.load_booking(&cmd.booking_id).await?;
        self.authorize_party(&booking, &cmd.actor_id)?;
        let end_time =
            self.end_time_from(&cmd.new_start_time, booking.total_duration_minutes())?;
        let event = booking.reschedule(cmd.new_date, &cmd.new_start_time, &end_time)?;
        self.bookings.save(&booking).await?;
        self.dispatch_all(vec![event.into()]).await;
        Ok(BookingView::from(&booking))
    }

    async fn admin_cancel_booking(
        &self,
        booking_id: &str,
        admin_id: &str,
        reason: &str,
    ) -> ApplicationResult<BookingView> {
        // Administrators skip the party check but not the state machine.
        let booking = self.load_booking(booking_id).await?;
        let actor = format!("admin:{}", admin_id);
        let reason = format!("[admin] {}", reason);
        self.do_cancel(booking, &actor, &reason).await
    }

    async fn admin_force_status(
        &self,
        booking_id: &str,
        admin_id: &str,
        transition: ForcedTransition,
    ) -> ApplicationResult<BookingView> {
        let mut booking = self.load_booking(booking_id).await?;
        let event = match transition {
            ForcedTransition::Confirm => booking.confirm()?,
            ForcedTransition::Start => booking.start()?,
            ForcedTransition::Complete => booking.complete()?,
        };
        self.bookings.save(&booking).await?;
        log::info!(
            "Admin {} forced booking {} to {}",
            admin_id,
            booking_id,
            booking.status()
        );
        self.dispatch_all(vec![event.into()]).await;
        Ok(BookingView::from(&booking))
    }

    async fn get_booking(&self, booking_id: &str) -> ApplicationResult<BookingView> {
        let booking = self.load_booking(booking_id).await?;
        Ok(BookingView::from(&booking))
    }

    async fn search_bookings(
        &self,
        filters: BookingSearchFilters,
        pagination: Pagination,
    ) -> ApplicationResult<Page<BookingView>> {
        let page = self.bookings.search(&filters, pagination).await?;
        Ok(Page {
            items: page.items.iter().map(BookingView::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        })
    }
}
