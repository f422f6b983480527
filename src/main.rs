//! # Orders Service Demo
//!
//! Runs one full order lifecycle against in-process collaborator doubles:
//!
//! 1. Start the [`OrderSystem`] with a seeded catalog and a payment stub.
//! 2. Place an order and receive the payment session.
//! 3. Deliver a payment confirmation event and read the order back.
//! 4. Move the order to DELIVERED and shut down.

use std::time::Duration;

use orders_service::clients::{MockCatalog, MockPayments};
use orders_service::config::SystemConfig;
use orders_service::domain::{
    CreateOrder, OrderLine, OrderQuery, OrderStatus, PaymentNotice, ProductId, ProductRecord,
};
use orders_service::runtime::{setup_tracing, OrderSystem};
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("starting orders service demo");

    // In-process stand-ins for the two collaborators
    let catalog = MockCatalog::new(vec![
        ProductRecord {
            id: ProductId::new("PROD-1"),
            price: Decimal::new(1999, 2),
            name: "Mechanical Keyboard".to_string(),
        },
        ProductRecord {
            id: ProductId::new("PROD-2"),
            price: Decimal::new(499, 2),
            name: "USB Cable".to_string(),
        },
    ]);
    let payments = MockPayments::new();

    let system = OrderSystem::start(SystemConfig::from_env(), catalog.client(), payments.client());

    // Place an order
    let span = tracing::info_span!("checkout");
    let checkout = async {
        info!("placing order");
        system
            .orders
            .create_order(CreateOrder {
                items: vec![
                    OrderLine {
                        product_id: ProductId::new("PROD-1"),
                        quantity: 1,
                    },
                    OrderLine {
                        product_id: ProductId::new("PROD-2"),
                        quantity: 3,
                    },
                ],
            })
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let order_id = checkout.order.order.id.to_string();
    info!(
        %order_id,
        total = %checkout.order.order.total_amount,
        session = %checkout.payment_session,
        "order placed, awaiting payment"
    );

    // The payment collaborator confirms with a fire-and-forget event
    system
        .orders
        .payment_succeeded(PaymentNotice {
            order_id: order_id.clone(),
            stripe_payment_id: "ch_demo_1".to_string(),
            receipt_url: "https://pay.example/receipts/demo".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;

    // Event delivery is asynchronous; give it a beat before reading back
    tokio::time::sleep(Duration::from_millis(50)).await;

    let paid = system
        .orders
        .find_one(order_id.clone())
        .await
        .map_err(|e| e.to_string())?;
    info!(
        %order_id,
        status = ?paid.order.status,
        paid = paid.order.paid,
        receipt = paid.receipt.as_ref().map(|r| r.receipt_url.as_str()),
        "payment recorded"
    );

    // Hand the order to fulfilment
    let span = tracing::info_span!("fulfilment");
    let delivered = async {
        system
            .orders
            .change_status(order_id.clone(), OrderStatus::Delivered)
            .await
    }
    .instrument(span)
    .await;

    match delivered {
        Ok(details) => info!(%order_id, status = ?details.order.status, "order delivered"),
        Err(e) => error!(error = %e, "status change failed"),
    }

    let page = system
        .orders
        .find_all(OrderQuery::default())
        .await
        .map_err(|e| e.to_string())?;
    info!(total = page.meta.total, "orders on file");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("demo completed");
    Ok(())
}
