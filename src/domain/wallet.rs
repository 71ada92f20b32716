// src/domain/wallet.rs
// Wallet aggregate and its append-only transaction ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::money::Money;

pub const BOOKING_REFERENCE: &str = "booking";

/// Direction is carried by the type, never by the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
    Adjustment,
}

impl TransactionType {
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Refund)
    }

    pub fn is_debit(&self) -> bool {
        matches!(self, TransactionType::Withdrawal | TransactionType::Payment)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Payment => "payment",
            TransactionType::Refund => "refund",
            TransactionType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of an administrative adjustment, chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentDirection {
    Credit,
    Debit,
}

/// One immutable ledger entry. `balance_after` freezes the wallet balance
/// immediately after the change, so the ledger can be audited without
/// re-running business logic.
#[derive(Debug, Clone, Serialize)]
pub struct WalletTransaction {
    id: String,
    wallet_id: String,
    transaction_type: TransactionType,
    amount: Money,
    balance_after: Money,
    reference_type: Option<String>,
    reference_id: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
}

impl WalletTransaction {
    fn new(
        wallet_id: &str,
        transaction_type: TransactionType,
        amount: Money,
        balance_after: Money,
        reference: Option<(&str, &str)>,
        description: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            transaction_type,
            amount,
            balance_after,
            reference_type: reference.map(|(t, _)| t.to_string()),
            reference_id: reference.map(|(_, id)| id.to_string()),
            description: description.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn balance_after(&self) -> &Money {
        &self.balance_after
    }

    pub fn reference_type(&self) -> Option<&str> {
        self.reference_type.as_deref()
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Aggregate root holding a user's balance. The balance is never negative;
/// any operation that would make it so fails without applying. Every
/// mutation produces exactly one transaction.
#[derive(Debug, Clone)]
pub struct Wallet {
    id: String,
    user_id: String,
    balance: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Wallet {
    pub fn create(id: &str, user_id: &str, currency: &str) -> DomainResult<Self> {
        if id.trim().is_empty() || user_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "Wallet id and user id are required".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            balance: Money::zero(currency)?,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn deposit(&mut self, amount: Money, description: &str) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        self.balance = self.balance.add(&amount)?;
        Ok(self.record(TransactionType::Deposit, amount, None, description))
    }

    pub fn withdraw(
        &mut self,
        amount: Money,
        description: &str,
    ) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        self.debit(&amount)?;
        Ok(self.record(TransactionType::Withdrawal, amount, None, description))
    }

    pub fn pay(
        &mut self,
        amount: Money,
        booking_id: &str,
        description: &str,
    ) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        self.debit(&amount)?;
        Ok(self.record(
            TransactionType::Payment,
            amount,
            Some((BOOKING_REFERENCE, booking_id)),
            description,
        ))
    }

    /// Crediting never fails on balance grounds.
    pub fn refund(
        &mut self,
        amount: Money,
        booking_id: &str,
        description: &str,
    ) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        self.balance = self.balance.add(&amount)?;
        Ok(self.record(
            TransactionType::Refund,
            amount,
            Some((BOOKING_REFERENCE, booking_id)),
            description,
        ))
    }

    /// Reverses a payment whose booking-side write did not complete.
    /// Credits the balance and records an adjustment carrying the booking
    /// reference, so the ledger nets it against the original payment.
    pub fn reverse_payment(
        &mut self,
        amount: Money,
        booking_id: &str,
        description: &str,
    ) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        self.balance = self.balance.add(&amount)?;
        Ok(self.record(
            TransactionType::Adjustment,
            amount,
            Some((BOOKING_REFERENCE, booking_id)),
            description,
        ))
    }

    /// Administrative correction. The stored magnitude is non-negative and
    /// the direction is encoded in the description alongside the reason.
    pub fn adjust(
        &mut self,
        amount: Money,
        direction: AdjustmentDirection,
        description: &str,
    ) -> DomainResult<WalletTransaction> {
        self.reject_zero(&amount)?;
        let prefix = match direction {
            AdjustmentDirection::Credit => {
                self.balance = self.balance.add(&amount)?;
                "credit"
            }
            AdjustmentDirection::Debit => {
                self.debit(&amount)?;
                "debit"
            }
        };
        let description = format!("{}: {}", prefix, description);
        Ok(self.record(TransactionType::Adjustment, amount, None, &description))
    }

    pub fn has_sufficient_balance(&self, amount: &Money) -> bool {
        self.balance.gte(amount).unwrap_or(false)
    }

    fn debit(&mut self, amount: &Money) -> DomainResult<()> {
        if !self.has_sufficient_balance(amount) {
            return Err(DomainError::Validation("Insufficient balance".to_string()));
        }
        self.balance = self.balance.subtract(amount)?;
        Ok(())
    }

    fn reject_zero(&self, amount: &Money) -> DomainResult<()> {
        if amount.is_zero() {
            return Err(DomainError::Validation(
                "Transaction amount must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn record(
        &mut self,
        transaction_type: TransactionType,
        amount: Money,
        reference: Option<(&str, &str)>,
        description: &str,
    ) -> WalletTransaction {
        self.updated_at = Utc::now();
        WalletTransaction::new(
            &self.id,
            transaction_type,
            amount,
            self.balance.clone(),
            reference,
            description,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn balance(&self) -> &Money {
        &self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn vnd(amount: i64) -> Money {
        Money::new(Decimal::from(amount), "VND").unwrap()
    }

    fn wallet_with(balance: i64) -> Wallet {
        let mut wallet = Wallet::create("w-1", "user-1", "VND").unwrap();
        if balance > 0 {
            wallet.deposit(vnd(balance), "seed").unwrap();
        }
        wallet
    }

    #[test]
    fn deposit_credits_and_freezes_balance_after() {
        let mut wallet = wallet_with(0);
        let tx = wallet.deposit(vnd(200_000), "top up").unwrap();
        assert_eq!(tx.transaction_type(), TransactionType::Deposit);
        assert_eq!(tx.amount(), &vnd(200_000));
        assert_eq!(tx.balance_after(), wallet.balance());
        assert!(tx.reference_id().is_none());
    }

    #[test]
    fn withdraw_requires_sufficient_balance() {
        let mut wallet = wallet_with(100);
        let err = wallet.withdraw(vnd(200), "too much").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(wallet.balance(), &vnd(100));

        let tx = wallet.withdraw(vnd(40), "cash out").unwrap();
        assert_eq!(wallet.balance(), &vnd(60));
        assert_eq!(tx.balance_after(), &vnd(60));
    }

    #[test]
    fn zero_amounts_are_rejected_everywhere() {
        let zero = Money::zero("VND").unwrap();
        let mut wallet = wallet_with(100);
        assert!(wallet.deposit(zero.clone(), "noop").is_err());
        assert!(wallet.withdraw(zero.clone(), "noop").is_err());
        assert!(wallet.pay(zero.clone(), "bk-1", "noop").is_err());
        assert!(wallet.refund(zero.clone(), "bk-1", "noop").is_err());
        assert!(wallet
            .adjust(zero, AdjustmentDirection::Credit, "noop")
            .is_err());
        assert_eq!(wallet.balance(), &vnd(100));
    }

    #[test]
    fn pay_then_refund_restores_balance_with_consistent_ledger() {
        let mut wallet = wallet_with(200_000);
        let payment = wallet
            .pay(vnd(150_000), "bk-1", "booking payment")
            .unwrap();
        assert_eq!(payment.balance_after(), &vnd(50_000));
        assert_eq!(payment.reference_type(), Some(BOOKING_REFERENCE));
        assert_eq!(payment.reference_id(), Some("bk-1"));

        let refund = wallet
            .refund(vnd(150_000), "bk-1", "booking refund")
            .unwrap();
        assert_eq!(refund.balance_after(), &vnd(200_000));
        assert_eq!(wallet.balance(), &vnd(200_000));
    }

    #[test]
    fn pay_fails_without_sufficient_balance() {
        let mut wallet = wallet_with(100_000);
        assert!(matches!(
            wallet.pay(vnd(150_000), "bk-1", "booking payment"),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(wallet.balance(), &vnd(100_000));
    }

    #[test]
    fn reverse_payment_credits_back_with_the_booking_reference() {
        let mut wallet = wallet_with(200_000);
        wallet.pay(vnd(150_000), "bk-1", "booking payment").unwrap();
        let tx = wallet
            .reverse_payment(vnd(150_000), "bk-1", "payment reversal")
            .unwrap();
        assert_eq!(tx.transaction_type(), TransactionType::Adjustment);
        assert_eq!(tx.reference_type(), Some(BOOKING_REFERENCE));
        assert_eq!(tx.reference_id(), Some("bk-1"));
        assert_eq!(wallet.balance(), &vnd(200_000));
    }

    #[test]
    fn adjustments_encode_direction_in_description() {
        let mut wallet = wallet_with(100);
        let credit = wallet
            .adjust(vnd(50), AdjustmentDirection::Credit, "admin-7 correction")
            .unwrap();
        assert_eq!(credit.transaction_type(), TransactionType::Adjustment);
        assert!(credit.description().starts_with("credit: "));
        assert_eq!(wallet.balance(), &vnd(150));

        let debit = wallet
            .adjust(vnd(30), AdjustmentDirection::Debit, "admin-7 correction")
            .unwrap();
        assert!(debit.description().starts_with("debit: "));
        assert_eq!(wallet.balance(), &vnd(120));

        assert!(wallet
            .adjust(vnd(500), AdjustmentDirection::Debit, "overdraw")
            .is_err());
    }

    #[test]
    fn balance_equals_credits_minus_debits() {
        let mut wallet = wallet_with(0);
        let mut ledger = Vec::new();
        ledger.push(wallet.deposit(vnd(300_000), "seed").unwrap());
        ledger.push(wallet.pay(vnd(120_000), "bk-1", "pay").unwrap());
        ledger.push(wallet.withdraw(vnd(30_000), "cash").unwrap());
        ledger.push(wallet.refund(vnd(60_000), "bk-1", "partial refund").unwrap());

        let mut expected = Decimal::ZERO;
        for tx in &ledger {
            if tx.transaction_type().is_credit() {
                expected += tx.amount().amount();
            } else if tx.transaction_type().is_debit() {
                expected -= tx.amount().amount();
            }
            assert!(tx.balance_after().amount() >= Decimal::ZERO);
        }
        assert_eq!(wallet.balance().amount(), expected);
        assert_eq!(expected, dec!(210000));
    }

    #[test]
    fn transaction_types_classify_direction() {
        assert!(TransactionType::Deposit.is_credit());
        assert!(TransactionType::Refund.is_credit());
        assert!(TransactionType::Withdrawal.is_debit());
        assert!(TransactionType::Payment.is_debit());
        assert!(!TransactionType::Adjustment.is_credit());
        assert!(!TransactionType::Adjustment.is_debit());
    }
}
