// src/domain/money.rs
// Money value object: non-negative decimal amount plus ISO-style currency code.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// Immutable monetary value. Amounts are stored rounded to 2 decimal
/// places and can never be negative; debits are modeled as subtraction
/// that fails instead of going below zero. Two values can only be
/// combined or compared when their currencies match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "Money amount cannot be negative: {}",
                amount
            )));
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::Validation(format!(
                "Currency must be a 3-letter code, got '{}'",
                currency
            )));
        }
        Ok(Self {
            amount: round_2dp(amount),
            currency: currency.to_ascii_uppercase(),
        })
    }

    pub fn zero(currency: &str) -> DomainResult<Self> {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.assert_same_currency(other)?;
        Money::new(self.amount + other.amount, &self.currency)
    }

    /// Fails when the result would be negative or the currencies differ.
    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.assert_same_currency(other)?;
        let result = self.amount - other.amount;
        if result < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "Cannot subtract {} {} from {} {}: result would be negative",
                other.amount, other.currency, self.amount, self.currency
            )));
        }
        Money::new(result, &self.currency)
    }

    pub fn multiply(&self, factor: Decimal) -> DomainResult<Money> {
        if factor < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "Cannot multiply money by negative factor: {}",
                factor
            )));
        }
        Money::new(self.amount * factor, &self.currency)
    }

    /// Rounds to the nearest whole currency unit, midpoint away from zero.
    /// Used for partial refunds.
    pub fn rounded_to_unit(&self) -> Money {
        Money {
            amount: self
                .amount
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            currency: self.currency.clone(),
        }
    }

    pub fn gt(&self, other: &Money) -> DomainResult<bool> {
        self.assert_same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    pub fn gte(&self, other: &Money) -> DomainResult<bool> {
        self.assert_same_currency(other)?;
        Ok(self.amount >= other.amount)
    }

    pub fn lt(&self, other: &Money) -> DomainResult<bool> {
        self.assert_same_currency(other)?;
        Ok(self.amount < other.amount)
    }

    pub fn lte(&self, other: &Money) -> DomainResult<bool> {
        self.assert_same_currency(other)?;
        Ok(self.amount <= other.amount)
    }

    fn assert_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::Validation(format!(
                "Currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

fn round_2dp(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
