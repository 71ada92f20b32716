// tests/wallet_ops.rs
// Wallet use-case scenarios: one wallet per user, deposits, withdrawals,
// administrative adjustments and statement pagination.

mod common;

use bookpay::application::dto::Pagination;
use bookpay::application::usecase::WalletOperationsUseCase;
use bookpay::domain::money::Money;
use bookpay::domain::wallet::{AdjustmentDirection, TransactionType};
use rust_decimal_macros::dec;

use common::*;

#[tokio::test]
async fn one_wallet_per_user() {
    let app = test_app().await;
    let wallet = app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();
    assert_eq!(wallet.user_id, CUSTOMER);
    assert!(wallet.balance.is_zero());

    let err = app
        .wallet_ops
        .create_wallet(CUSTOMER, "VND")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn deposit_and_withdraw_update_balance_and_statement() {
    let app = test_app().await;
    app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();

    app.wallet_ops
        .deposit(CUSTOMER, vnd(100_000), "salary")
        .await
        .unwrap();
    let withdrawal = app
        .wallet_ops
        .withdraw(CUSTOMER, vnd(30_000), "groceries")
        .await
        .unwrap();
    assert_eq!(withdrawal.balance_after, vnd(70_000));

    let statement = app
        .wallet_ops
        .list_transactions(CUSTOMER, Pagination::default())
        .await
        .unwrap();
    assert_eq!(statement.total, 2);
    assert_eq!(statement.page, 1);
    assert_eq!(statement.limit, 20);
    // Newest first.
    assert_eq!(
        statement.items[0].transaction_type,
        TransactionType::Withdrawal
    );
    assert_eq!(statement.items[1].transaction_type, TransactionType::Deposit);
}

#[tokio::test]
async fn withdrawals_never_overdraw() {
    let app = test_app().await;
    app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();
    app.wallet_ops
        .deposit(CUSTOMER, vnd(50_000), "top up")
        .await
        .unwrap();

    let err = app
        .wallet_ops
        .withdraw(CUSTOMER, vnd(50_001), "too much")
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        app.wallet_ops.get_wallet(CUSTOMER).await.unwrap().balance,
        vnd(50_000)
    );
}

#[tokio::test]
async fn operations_on_a_missing_wallet_are_not_found() {
    let app = test_app().await;
    let err = app
        .wallet_ops
        .deposit("nobody", vnd(10_000), "into the void")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = app.wallet_ops.get_wallet("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn zero_and_mismatched_amounts_are_rejected() {
    let app = test_app().await;
    app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();

    let err = app
        .wallet_ops
        .deposit(CUSTOMER, Money::zero("VND").unwrap(), "noop")
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = app
        .wallet_ops
        .deposit(
            CUSTOMER,
            Money::new(dec!(10), "USD").unwrap(),
            "wrong currency",
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn adjustments_record_direction_and_administrator() {
    let app = test_app().await;
    app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();
    app.wallet_ops
        .deposit(CUSTOMER, vnd(100_000), "top up")
        .await
        .unwrap();

    let credit = app
        .wallet_ops
        .adjust(
            CUSTOMER,
            vnd(20_000),
            AdjustmentDirection::Credit,
            "admin-7",
            "promo compensation",
        )
        .await
        .unwrap();
    assert_eq!(credit.transaction_type, TransactionType::Adjustment);
    assert!(credit.description.starts_with("credit: "));
    assert!(credit.description.contains("[by admin admin-7]"));
    assert_eq!(credit.balance_after, vnd(120_000));

    let debit = app
        .wallet_ops
        .adjust(
            CUSTOMER,
            vnd(120_001),
            AdjustmentDirection::Debit,
            "admin-7",
            "claw back",
        )
        .await
        .unwrap_err();
    assert!(debit.is_validation());
    assert_eq!(
        app.wallet_ops.get_wallet(CUSTOMER).await.unwrap().balance,
        vnd(120_000)
    );
}

#[tokio::test]
async fn statements_paginate() {
    let app = test_app().await;
    app.wallet_ops.create_wallet(CUSTOMER, "VND").await.unwrap();
    for i in 1..=5 {
        app.wallet_ops
            .deposit(CUSTOMER, vnd(i * 1_000), "installment")
            .await
            .unwrap();
    }

    let page = app
        .wallet_ops
        .list_transactions(CUSTOMER, Pagination::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);

    let tail = app
        .wallet_ops
        .list_transactions(CUSTOMER, Pagination::new(3, 2))
        .await
        .unwrap();
    assert_eq!(tail.items.len(), 1);
}
