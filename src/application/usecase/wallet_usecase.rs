// src/application/usecase/wallet_usecase.rs
// Wallet use cases: one wallet per user, deposits, withdrawals and
// administrative adjustments. Payments and refunds are reachable only
// through the booking orchestration, which owns the cross-aggregate flow.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::{
    ApplicationResult, Page, Pagination, WalletTransactionView, WalletView,
};
use crate::application::service::EventDispatcher;
use crate::domain::errors::DomainError;
use crate::domain::event::WalletEvent;
use crate::domain::money::Money;
use crate::domain::repository::{WalletRepository, WalletTransactionRepository};
use crate::domain::wallet::{AdjustmentDirection, Wallet};

/// Wallet operations use case
#[async_trait]
pub trait WalletOperationsUseCase {
    async fn create_wallet(&self, user_id: &str, currency: &str) -> ApplicationResult<WalletView>;
    async fn deposit(
        &self,
        user_id: &str,
        amount: Money,
        description: &str,
    ) -> ApplicationResult<WalletTransactionView>;
    async fn withdraw(
        &self,
        user_id: &str,
        amount: Money,
        description: &str,
    ) -> ApplicationResult<WalletTransactionView>;
    async fn adjust(
        &self,
        user_id: &str,
        amount: Money,
        direction: AdjustmentDirection,
        admin_id: &str,
        reason: &str,
    ) -> ApplicationResult<WalletTransactionView>;
    async fn get_wallet(&self, user_id: &str) -> ApplicationResult<WalletView>;
    async fn list_transactions(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> ApplicationResult<Page<WalletTransactionView>>;
}

pub struct WalletManager {
    wallets: Arc<dyn WalletRepository + Send + Sync>,
    transactions: Arc<dyn WalletTransactionRepository + Send + Sync>,
    dispatcher: Arc<dyn EventDispatcher + Send + Sync>,
}

impl WalletManager {
    pub fn new(
        wallets: Arc<dyn WalletRepository + Send + Sync>,
        transactions: Arc<dyn WalletTransactionRepository + Send + Sync>,
        dispatcher: Arc<dyn EventDispatcher + Send + Sync>,
    ) -> Self {
        Self {
            wallets,
            transactions,
            dispatcher,
        }
    }

    async fn load_wallet(&self, user_id: &str) -> ApplicationResult<Wallet> {
        self.wallets
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Wallet for user {} not found", user_id)).into()
            })
    }

    async fn persist(
        &self,
        wallet: &Wallet,
        tx: &crate::domain::wallet::WalletTransaction,
        credited: bool,
    ) -> ApplicationResult<WalletTransactionView> {
        self.wallets.save(wallet).await?;
        self.transactions.save(tx).await?;
        self.dispatcher
            .dispatch(WalletEvent::from_transaction(tx, credited).into())
            .await;
        Ok(WalletTransactionView::from(tx))
    }
}

#[async_trait]
impl WalletOperationsUseCase for WalletManager {
    async fn create_wallet(&self, user_id: &str, currency: &str) -> ApplicationResult<WalletView> {
        if self.wallets.exists(user_id).await? {
            return Err(DomainError::Conflict(format!(
                "Wallet already exists for user {}",
                user_id
            ))
            .into());
        }
        let wallet = Wallet::create(&Uuid::new_v4().to_string(), user_id, currency)?;
        self.wallets.save(&wallet).await?;
        log::info!("Created wallet {} for user {}", wallet.id(), user_id);
        self.dispatcher
            .dispatch(
                WalletEvent::Created {
                    wallet_id: wallet.id().to_string(),
                    user_id: user_id.to_string(),
                }
                .into(),
            )
            .await;
        Ok(WalletView::from(&wallet))
    }

    async fn deposit(
        &self,
        user_id: &str,
        amount: Money,
        description: &str,
    ) -> ApplicationResult<WalletTransactionView> {
        let mut wallet = self.load_wallet(user_id).await?;
        let tx = wallet.deposit(amount, description)?;
        log::info!(
            "Deposited {} into wallet {}, balance {}",
            tx.amount(),
            wallet.id(),
            wallet.balance()
        );
        self.persist(&wallet, &tx, true).await
    }

    async fn withdraw(
        &self,
        user_id: &str,
        amount: Money,
        description: &str,
    ) -> ApplicationResult<WalletTransactionView> {
        let mut wallet = self.load_wallet(user_id).await?;
        let tx = wallet.withdraw(amount, description)?;
        log::info!(
            "Withdrew {} from wallet {}, balance {}",
            tx.amount(),
            wallet.id(),
            wallet.balance()
        );
        self.persist(&wallet, &tx, false).await
    }

    async fn adjust(
        &self,
        user_id: &str,
        amount: Money,
        direction: AdjustmentDirection,
        admin_id: &str,
        reason: &str,
    ) -> ApplicationResult<WalletTransactionView> {
        let mut wallet = self.load_wallet(user_id).await?;
        let description = format!("{} [by admin {}]", reason, admin_id);
        let tx = wallet.adjust(amount, direction, &description)?;
        log::info!(
            "Admin {} adjusted wallet {}: {}",
            admin_id,
            wallet.id(),
            tx.description()
        );
        self.persist(&wallet, &tx, direction == AdjustmentDirection::Credit)
            .await
    }

    async fn get_wallet(&self, user_id: &str) -> ApplicationResult<WalletView> {
        let wallet = self.load_wallet(user_id).await?;
        Ok(WalletView::from(&wallet))
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> ApplicationResult<Page<WalletTransactionView>> {
        let wallet = self.load_wallet(user_id).await?;
        let items = self
            .transactions
            .find_by_wallet_id(wallet.id(), pagination)
            .await?;
        let total = self.transactions.count_by_wallet_id(wallet.id()).await?;
        Ok(Page {
            items: items.iter().map(WalletTransactionView::from).collect(),
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }
}
