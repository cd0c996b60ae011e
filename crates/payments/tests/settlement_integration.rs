//! End-to-end settlement scenarios against the in-memory repository.

use std::sync::Arc;

use catalog::{InMemoryCatalog, Product};
use chrono::{TimeZone, Utc};
use common::{FixedClock, Money, UserId};
use orders::{
    InMemoryOrderRepository, Order, OrderItem, OrderRepository, OrderStatus, PaymentMethod,
    PaymentStatus, ShippingAddress,
};
use payments::{
    CARD_DECLINED, CARD_EXPIRED, MockGateway, NoLatency, PaymentDetails, PaymentError,
    SettlementService,
};

fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Ada Lovelace".to_string(),
        phone: "+1-555-0100".to_string(),
        line1: "1 Analytical Way".to_string(),
        line2: None,
        city: "London".to_string(),
        state: "LDN".to_string(),
        postal_code: "SW1A".to_string(),
        country: "GB".to_string(),
    }
}

fn card(number: &str) -> PaymentDetails {
    PaymentDetails {
        card_number: Some(number.to_string()),
        card_holder: Some("Ada Lovelace".to_string()),
        expiry_month: Some(12),
        expiry_year: Some(2027),
        cvv: Some("123".to_string()),
        ..PaymentDetails::default()
    }
}

struct Harness {
    service: Arc<SettlementService<InMemoryOrderRepository, InMemoryCatalog>>,
    repo: InMemoryOrderRepository,
    catalog: InMemoryCatalog,
}

async fn harness() -> Harness {
    let repo = InMemoryOrderRepository::new();
    let catalog = InMemoryCatalog::new();
    catalog.put_product(Product::new(
        "SKU-001",
        "Widget",
        Money::from_cents(9999),
        10,
    ));

    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap(),
    ));
    let gateway = MockGateway::with_parts(Arc::new(NoLatency), clock.clone());
    let service = Arc::new(SettlementService::with_parts(
        repo.clone(),
        catalog.clone(),
        gateway,
        clock,
    ));

    Harness {
        service,
        repo,
        catalog,
    }
}

async fn pending_order(repo: &InMemoryOrderRepository) -> Order {
    let order = Order::create(
        UserId::new(),
        vec![OrderItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(9999),
            2,
        )],
        address(),
        PaymentMethod::CreditCard,
        None,
        Utc::now(),
    );
    repo.insert(order.clone()).await.unwrap();
    order
}

#[tokio::test]
async fn test_successful_card_settlement() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let settlement = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card("4111111111111111"))
        .await
        .unwrap();

    assert_eq!(settlement.status, "completed");
    assert_eq!(settlement.amount.cents(), 19998);
    assert!(settlement.reference.starts_with("PAY-"));

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.payment_reference, Some(settlement.reference));
    assert!(stored.paid_at.is_some());
    assert_eq!(stored.status_history.len(), 2);
}

#[tokio::test]
async fn test_declined_card_leaves_order_pending() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let err = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card(CARD_DECLINED))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Declined));

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(stored.payment_reference.is_none());
    assert!(stored.paid_at.is_none());
    assert_eq!(h.catalog.stock_of(&"SKU-001".into()), Some(10));
}

#[tokio::test]
async fn test_expired_card_is_distinct_from_declined() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let err = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card(CARD_EXPIRED))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Expired));
}

#[tokio::test]
async fn test_concurrent_settlements_have_exactly_one_winner() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let card_a = card("4111111111111111");
    let card_b = card("4111111111111111");
    let (a, b) = tokio::join!(
        h.service
            .process_payment(order.id, PaymentMethod::CreditCard, &card_a),
        h.service
            .process_payment(order.id, PaymentMethod::CreditCard, &card_b),
    );

    assert!(
        a.is_ok() ^ b.is_ok(),
        "exactly one settlement must win: a={:?} b={:?}",
        a.as_ref().map(|s| &s.reference),
        b.as_ref().map(|s| &s.reference)
    );
    let (winner, loser) = if a.is_ok() {
        (a.unwrap(), b.unwrap_err())
    } else {
        (b.unwrap(), a.unwrap_err())
    };
    // The loser hits either the early check or the lost conditional
    // update; both map to AlreadyPaid.
    assert!(matches!(loser, PaymentError::AlreadyPaid));

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.payment_reference, Some(winner.reference));

    // Stock was decremented exactly once.
    assert_eq!(h.catalog.stock_of(&"SKU-001".into()), Some(8));
}

#[tokio::test]
async fn test_retry_after_settlement_keeps_first_reference() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let first = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card("4111111111111111"))
        .await
        .unwrap();

    let err = h
        .service
        .process_payment(
            order.id,
            PaymentMethod::BankTransfer,
            &PaymentDetails {
                account_number: Some("1234567890".to_string()),
                routing_number: Some("12345678".to_string()),
                ..PaymentDetails::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::AlreadyPaid));

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_method, PaymentMethod::CreditCard);
    assert_eq!(stored.payment_reference, Some(first.reference));
    assert_eq!(h.catalog.stock_of(&"SKU-001".into()), Some(8));
}

#[tokio::test]
async fn test_retry_after_decline_succeeds() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let err = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card(CARD_DECLINED))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Declined));

    let settlement = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card("4111111111111111"))
        .await
        .unwrap();
    assert_eq!(settlement.status, "completed");

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_settling_admin_confirmed_order_keeps_status() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    // Simulate an admin confirming before payment arrives.
    let applied = h
        .repo
        .conditional_update(
            order.id,
            orders::UpdateGuard::status_is(OrderStatus::Pending),
            orders::OrderPatch::set_status(OrderStatus::Confirmed),
        )
        .await
        .unwrap();
    assert!(applied);

    let settlement = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &card("4111111111111111"))
        .await
        .unwrap();
    assert_eq!(settlement.status, "completed");

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    // Confirmed appears once in the history, from the admin update.
    let confirmed_entries = stored
        .status_history
        .iter()
        .filter(|c| c.status == OrderStatus::Confirmed)
        .count();
    assert_eq!(confirmed_entries, 1);
}

#[tokio::test]
async fn test_missing_details_reported_per_field() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let err = h
        .service
        .process_payment(order.id, PaymentMethod::CreditCard, &PaymentDetails::default())
        .await
        .unwrap_err();

    match err {
        PaymentError::MissingFields(errors) => {
            assert!(errors.iter().any(|e| e.field == "card_number"));
            assert!(errors.iter().any(|e| e.field == "cvv"));
        }
        other => panic!("expected MissingFields, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cash_on_delivery_settles_without_details() {
    let h = harness().await;
    let order = pending_order(&h.repo).await;

    let settlement = h
        .service
        .process_payment(
            order.id,
            PaymentMethod::CashOnDelivery,
            &PaymentDetails::default(),
        )
        .await
        .unwrap();

    let stored = h.repo.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.payment_method, PaymentMethod::CashOnDelivery);
    assert_eq!(stored.payment_reference, Some(settlement.reference));
}
