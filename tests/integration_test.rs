use std::collections::HashSet;
use std::time::Duration;

use orders_service::clients::{MockCatalog, MockPayments};
use orders_service::config::SystemConfig;
use orders_service::domain::{
    CreateOrder, OrderDetails, OrderId, OrderLine, OrderQuery, OrderStatus, PaymentNotice,
    ProductId, ProductRecord,
};
use orders_service::error::OrderError;
use orders_service::router::OrdersClient;
use orders_service::runtime::OrderSystem;
use rust_decimal::Decimal;

fn product(id: &str, name: &str, price: Decimal) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        price,
        name: name.to_string(),
    }
}

fn seeded_catalog() -> MockCatalog {
    MockCatalog::new(vec![
        product("P1", "Widget", Decimal::from(10)),
        product("P2", "Gadget", Decimal::new(250, 2)),
    ])
}

fn order_of(lines: &[(&str, u32)]) -> CreateOrder {
    CreateOrder {
        items: lines
            .iter()
            .map(|(id, quantity)| OrderLine {
                product_id: ProductId::new(*id),
                quantity: *quantity,
            })
            .collect(),
    }
}

/// Payment confirmation is an event with no reply, so tests poll the read
/// side until the write becomes visible.
async fn wait_until_paid(orders: &OrdersClient, id: &str) -> OrderDetails {
    for _ in 0..100 {
        let details = orders
            .find_one(id.to_string())
            .await
            .expect("Failed to fetch order");
        if details.order.paid {
            return details;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("order {id} never became paid");
}

/// Full end-to-end lifecycle: create, pay, deliver.
#[tokio::test]
async fn test_full_order_lifecycle() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    // Place an order: 2 × Widget at 10.00
    let checkout = system
        .orders
        .create_order(order_of(&[("P1", 2)]))
        .await
        .expect("Failed to create order");

    assert_eq!(checkout.order.order.total_amount, Decimal::from(20));
    assert_eq!(checkout.order.order.total_items, 2);
    assert_eq!(checkout.order.order.status, OrderStatus::Pending);
    assert!(!checkout.order.order.paid);
    assert!(checkout.order.receipt.is_none());
    assert_eq!(checkout.order.items.len(), 1);
    assert_eq!(checkout.order.items[0].name, "Widget");
    assert_eq!(checkout.order.items[0].price, Decimal::from(10));

    // The payment session comes back as the collaborator produced it
    assert!(checkout.payment_session.is_object());
    assert_eq!(payments.calls(), 1);

    let order_id = checkout.order.order.id.to_string();

    // The payment collaborator confirms out of band
    system
        .orders
        .payment_succeeded(PaymentNotice {
            order_id: order_id.clone(),
            stripe_payment_id: "ch_123".to_string(),
            receipt_url: "https://pay.example/r/123".to_string(),
        })
        .await
        .expect("Failed to publish payment event");

    let paid = wait_until_paid(&system.orders, &order_id).await;
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert!(paid.order.paid);
    assert!(paid.order.paid_at.is_some());
    assert_eq!(paid.order.payment_reference.as_deref(), Some("ch_123"));
    assert_eq!(
        paid.receipt.map(|r| r.receipt_url).as_deref(),
        Some("https://pay.example/r/123")
    );
    // Totals never move after creation
    assert_eq!(paid.order.total_amount, Decimal::from(20));

    // Fulfilment moves the order along
    let delivered = system
        .orders
        .change_status(order_id.clone(), OrderStatus::Delivered)
        .await
        .expect("Failed to change status");
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    // The payment record survives the status change
    assert!(delivered.order.paid);
    assert!(delivered.receipt.is_some());

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Listing pages through orders in creation order and reports totals for
/// the whole result set, not just the page.
#[tokio::test]
async fn test_pagination_over_many_orders() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let mut created = Vec::new();
    for _ in 0..15 {
        let checkout = system
            .orders
            .create_order(order_of(&[("P2", 1)]))
            .await
            .expect("Failed to create order");
        created.push(checkout.order.order.id);
    }

    let first = system
        .orders
        .find_all(OrderQuery::page(1, 10))
        .await
        .expect("Failed to list orders");
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.data[0].id, created[0]);
    assert_eq!(first.meta.total, 15);
    assert_eq!(first.meta.last_page, 2);

    let second = system
        .orders
        .find_all(OrderQuery::page(2, 10))
        .await
        .expect("Failed to list orders");
    assert_eq!(second.data.len(), 5);
    assert_eq!(second.data[0].id, created[10]);

    // Pages past the end are empty but keep the full-set metadata
    let third = system
        .orders
        .find_all(OrderQuery::page(3, 10))
        .await
        .expect("Failed to list orders");
    assert!(third.data.is_empty());
    assert_eq!(third.meta.total, 15);
    assert_eq!(third.meta.last_page, 2);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// An order naming a product the catalog does not know is rejected whole;
/// nothing is persisted and no payment session is opened.
#[tokio::test]
async fn test_unknown_product_rejects_order() {
    let catalog = MockCatalog::new(vec![product("P1", "Widget", Decimal::from(10))]);
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let result = system
        .orders
        .create_order(order_of(&[("P1", 1), ("P404", 1)]))
        .await;
    match result {
        Err(OrderError::UnknownProduct { product_id }) => assert_eq!(product_id, "P404"),
        other => panic!("expected UnknownProduct, got {other:?}"),
    }

    let page = system
        .orders
        .find_all(OrderQuery::default())
        .await
        .expect("Failed to list orders");
    assert_eq!(page.meta.total, 0, "rejected order must not be persisted");
    assert_eq!(payments.calls(), 0, "no session for a rejected order");

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Lookups of unknown or malformed ids fail without touching collaborators.
#[tokio::test]
async fn test_find_one_rejects_unknown_and_malformed_ids() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let missing = OrderId::new().to_string();
    let result = system.orders.find_one(missing.clone()).await;
    match result {
        Err(err @ OrderError::NotFound { .. }) => {
            assert!(err.to_string().contains(&missing), "message names the id")
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    let result = system.orders.find_one("not-a-uuid".to_string()).await;
    assert!(matches!(result, Err(OrderError::InvalidInput { .. })));
    assert_eq!(catalog.calls(), 0, "failed lookups never reach the catalog");

    system.shutdown().await.expect("Failed to shutdown system");
}

/// A catalog outage fails the creation; the same request succeeds once the
/// catalog is back.
#[tokio::test]
async fn test_catalog_outage_fails_creation() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    catalog.fail_next();
    let result = system.orders.create_order(order_of(&[("P1", 1)])).await;
    match result {
        Err(OrderError::UpstreamFailure { service, .. }) => assert_eq!(service, "catalog"),
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }

    let page = system
        .orders
        .find_all(OrderQuery::default())
        .await
        .expect("Failed to list orders");
    assert_eq!(page.meta.total, 0);

    system
        .orders
        .create_order(order_of(&[("P1", 1)]))
        .await
        .expect("creation should succeed once the catalog recovers");

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Reads resolve names on every call, so a catalog outage fails the lookup
/// of an order that is stored and fine; the next read succeeds again.
#[tokio::test]
async fn test_catalog_outage_fails_reads() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let checkout = system
        .orders
        .create_order(order_of(&[("P1", 1)]))
        .await
        .expect("Failed to create order");
    let order_id = checkout.order.order.id.to_string();

    catalog.fail_next();
    let result = system.orders.find_one(order_id.clone()).await;
    match result {
        Err(OrderError::UpstreamFailure { service, .. }) => assert_eq!(service, "catalog"),
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }

    let details = system
        .orders
        .find_one(order_id)
        .await
        .expect("lookup should succeed once the catalog recovers");
    assert_eq!(details.items[0].name, "Widget");

    system.shutdown().await.expect("Failed to shutdown system");
}

/// A payment outage fails the call but leaves the created order behind in
/// PENDING; there is no rollback.
#[tokio::test]
async fn test_payment_outage_leaves_order_pending() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    payments.fail_next();
    let result = system.orders.create_order(order_of(&[("P1", 1)])).await;
    match result {
        Err(OrderError::UpstreamFailure { service, .. }) => assert_eq!(service, "payments"),
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }

    let page = system
        .orders
        .find_all(OrderQuery::default())
        .await
        .expect("Failed to list orders");
    assert_eq!(page.meta.total, 1, "order survives the failed session call");
    assert_eq!(page.data[0].status, OrderStatus::Pending);
    assert!(!page.data[0].paid);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// The status filter matches exactly and pairs with paging metadata.
#[tokio::test]
async fn test_list_filters_by_status() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let mut ids = Vec::new();
    for _ in 0..3 {
        let checkout = system
            .orders
            .create_order(order_of(&[("P1", 1)]))
            .await
            .expect("Failed to create order");
        ids.push(checkout.order.order.id.to_string());
    }

    system
        .orders
        .payment_succeeded(PaymentNotice {
            order_id: ids[1].clone(),
            stripe_payment_id: "ch_f".to_string(),
            receipt_url: "https://pay.example/r/f".to_string(),
        })
        .await
        .expect("Failed to publish payment event");
    wait_until_paid(&system.orders, &ids[1]).await;

    let paid = system
        .orders
        .find_all(OrderQuery::with_status(OrderStatus::Paid))
        .await
        .expect("Failed to list orders");
    assert_eq!(paid.meta.total, 1);
    assert_eq!(paid.data[0].id.to_string(), ids[1]);

    let pending = system
        .orders
        .find_all(OrderQuery::with_status(OrderStatus::Pending))
        .await
        .expect("Failed to list orders");
    assert_eq!(pending.meta.total, 2);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// A payment event for an order that does not exist is logged and dropped;
/// the system keeps serving requests.
#[tokio::test]
async fn test_payment_event_for_unknown_order_is_dropped() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    system
        .orders
        .payment_succeeded(PaymentNotice {
            order_id: OrderId::new().to_string(),
            stripe_payment_id: "ch_ghost".to_string(),
            receipt_url: "https://pay.example/r/ghost".to_string(),
        })
        .await
        .expect("Failed to publish payment event");

    let checkout = system
        .orders
        .create_order(order_of(&[("P1", 1)]))
        .await
        .expect("system must keep working after a bad event");
    let details = system
        .orders
        .find_one(checkout.order.order.id.to_string())
        .await
        .expect("Failed to fetch order");
    assert!(!details.order.paid);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Concurrent checkouts all land, each with its own id and correct total.
#[tokio::test]
async fn test_concurrent_checkouts() {
    let catalog = seeded_catalog();
    let payments = MockPayments::new();
    let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());

    let mut handles = vec![];
    for _ in 0..10 {
        let orders = system.orders.clone();
        handles.push(tokio::spawn(async move {
            orders.create_order(order_of(&[("P1", 1)])).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let checkout = handle
            .await
            .expect("task panicked")
            .expect("Failed to create order");
        assert_eq!(checkout.order.order.total_amount, Decimal::from(10));
        ids.insert(checkout.order.order.id);
    }
    assert_eq!(ids.len(), 10, "every checkout gets its own order");

    let page = system
        .orders
        .find_all(OrderQuery::page(1, 20))
        .await
        .expect("Failed to list orders");
    assert_eq!(page.meta.total, 10);

    system.shutdown().await.expect("Failed to shutdown system");
}
