use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use sweetshop_engine::domain::{ItemCreate, LineRequest, Principal, PrincipalId};
use sweetshop_engine::{setup_tracing, EngineConfig, OrderSystem, StockDirection};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    setup_tracing(&config.log_filter);

    info!("Starting application with complete order system");

    let system = OrderSystem::new(&config);

    let span = tracing::info_span!("catalog_seeding");
    let (fudge, toffee) = async {
        info!("Seeding catalog");
        let fudge = system
            .catalog
            .create_item(ItemCreate::new("Fudge", "Chocolate", Decimal::new(300, 2), 10))
            .await?;
        let toffee = system
            .catalog
            .create_item(ItemCreate::new("Toffee", "Candy", Decimal::new(125, 2), 4))
            .await?;
        Ok::<_, sweetshop_engine::CatalogError>((fudge, toffee))
    }
    .instrument(span)
    .await?;

    let alice = Principal::customer(PrincipalId::new(1));
    let bob = Principal::customer(PrincipalId::new(2));
    let admin = Principal::admin(PrincipalId::new(3));

    // Two customers race for the same fudge; only one of them can get six.
    let span = tracing::info_span!("order_processing");
    let (first, second) = async {
        info!("Processing racing orders");
        tokio::join!(
            system.orders.create_order(
                alice.id,
                vec![LineRequest::new(fudge, 6), LineRequest::new(toffee, 1)],
            ),
            system.orders.create_order(bob.id, vec![LineRequest::new(fudge, 6)]),
        )
    }
    .instrument(span)
    .await;

    for result in [first, second] {
        match result {
            Ok(order_id) => info!(order_id = %order_id, "Order processed successfully"),
            Err(e) => error!(error = %e, retryable = e.is_retryable(), "Order processing failed"),
        }
    }

    system
        .stock_ledger
        .adjust_stock(fudge, 20, StockDirection::Restock)
        .await?;

    let orders = system.order_queries.list_for_principal(&admin).await?;
    info!(order_count = orders.len(), "Retrieved order history");

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
