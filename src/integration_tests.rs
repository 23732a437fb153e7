#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::clients::{OrderCoordinator, StockDirection, StockLedger};
    use crate::config::EngineConfig;
    use crate::domain::{
        Item, ItemCreate, ItemId, ItemPatch, LineRequest, OrderId, Principal, PrincipalId,
    };
    use crate::error::{CatalogError, OrderError, StockError, StoreError};
    use crate::mock_framework::{
        create_mock_store, expect_begin, expect_commit, expect_request, expect_rollback,
        expect_tx_request,
    };
    use crate::store::{RowCounts, StoreRequest};
    use crate::OrderSystem;

    fn fudge(quantity: u32) -> Item {
        Item {
            id: ItemId::new(1),
            name: "Fudge".to_string(),
            category: "Chocolate".to_string(),
            price: dec!(3.00),
            quantity,
        }
    }

    fn mock_coordinator(
        buffer: usize,
    ) -> (
        OrderCoordinator,
        tokio::sync::mpsc::Receiver<crate::store::Envelope>,
    ) {
        let (store, receiver) = create_mock_store(buffer);
        let ledger = StockLedger::new(store.clone());
        (OrderCoordinator::new(store, ledger), receiver)
    }

    async fn seed(system: &OrderSystem, name: &str, price: Decimal, quantity: u32) -> ItemId {
        system
            .catalog
            .create_item(ItemCreate::new(name, "Candy", price, quantity))
            .await
            .unwrap()
    }

    async fn stock(system: &OrderSystem, id: ItemId) -> u32 {
        system.catalog.get_item(id).await.unwrap().quantity
    }

    async fn counts(system: &OrderSystem) -> RowCounts {
        system.store().row_counts().await.unwrap()
    }

    // =========================================================================
    // Coordinator against a mocked store
    // =========================================================================

    #[tokio::test]
    async fn test_order_creation_flow() {
        // 1. Setup Mocks
        let (coordinator, mut store_rx) = mock_coordinator(10);

        // 2. Execute Order Creation in background
        let order_task = tokio::spawn(async move {
            coordinator
                .create_order(PrincipalId::new(9), vec![LineRequest::new(ItemId::new(1), 2)])
                .await
        });

        // 3. Verify Interactions

        // Pre-check read
        match expect_request(&mut store_rx).await.expect("Expected GetItem") {
            StoreRequest::GetItem { id, respond_to } => {
                assert_eq!(id, ItemId::new(1));
                respond_to.send(Ok(fudge(5))).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }

        let mut tx_rx = expect_begin(&mut store_rx, 8).await.expect("Expected Begin");

        match expect_tx_request(&mut tx_rx).await.expect("Expected InsertOrder") {
            StoreRequest::InsertOrder { params, respond_to } => {
                assert_eq!(params.owner_id, PrincipalId::new(9));
                assert_eq!(params.total, dec!(6.00));
                respond_to.send(Ok(OrderId::new(1))).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }

        match expect_tx_request(&mut tx_rx).await.expect("Expected InsertOrderLine") {
            StoreRequest::InsertOrderLine { params, respond_to } => {
                assert_eq!(params.order_id, OrderId::new(1));
                assert_eq!(params.item_id, ItemId::new(1));
                assert_eq!(params.quantity, 2);
                assert_eq!(params.unit_price_at_purchase, dec!(3.00));
                respond_to.send(Ok(())).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }

        match expect_tx_request(&mut tx_rx).await.expect("Expected AdjustQuantity") {
            StoreRequest::AdjustQuantity {
                id,
                delta,
                respond_to,
            } => {
                assert_eq!(id, ItemId::new(1));
                assert_eq!(delta, -2);
                respond_to.send(Ok(())).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }

        let responder = expect_commit(&mut tx_rx).await.expect("Expected Commit");
        responder.send(Ok(())).unwrap();

        // 4. Verify Result
        let result = order_task.await.unwrap();
        assert_eq!(result, Ok(OrderId::new(1)));
    }

    #[tokio::test]
    async fn test_empty_order_never_reaches_the_store() {
        let (coordinator, mut store_rx) = mock_coordinator(10);

        let result = coordinator.create_order(PrincipalId::new(1), vec![]).await;

        assert!(matches!(result, Err(OrderError::ValidationError(_))));
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_item_opens_no_unit_of_work() {
        let (coordinator, mut store_rx) = mock_coordinator(10);

        let order_task = tokio::spawn(async move {
            coordinator
                .create_order(PrincipalId::new(1), vec![LineRequest::new(ItemId::new(42), 1)])
                .await
        });

        match expect_request(&mut store_rx).await.expect("Expected GetItem") {
            StoreRequest::GetItem { id, respond_to } => {
                respond_to.send(Err(StoreError::ItemNotFound(id))).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }

        let result = order_task.await.unwrap();
        assert_eq!(result, Err(OrderError::ItemNotFound(ItemId::new(42))));
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stock_guard_failure_rolls_back() {
        let (coordinator, mut store_rx) = mock_coordinator(10);

        let order_task = tokio::spawn(async move {
            coordinator
                .create_order(PrincipalId::new(1), vec![LineRequest::new(ItemId::new(1), 4)])
                .await
        });

        // The pre-check sees enough stock...
        match expect_request(&mut store_rx).await.expect("Expected GetItem") {
            StoreRequest::GetItem { respond_to, .. } => respond_to.send(Ok(fudge(5))).unwrap(),
            other => panic!("Unexpected request: {:?}", other),
        }
        let mut tx_rx = expect_begin(&mut store_rx, 8).await.expect("Expected Begin");

        match expect_tx_request(&mut tx_rx).await.expect("Expected InsertOrder") {
            StoreRequest::InsertOrder { respond_to, .. } => {
                respond_to.send(Ok(OrderId::new(3))).unwrap()
            }
            other => panic!("Unexpected request: {:?}", other),
        }
        match expect_tx_request(&mut tx_rx).await.expect("Expected InsertOrderLine") {
            StoreRequest::InsertOrderLine { respond_to, .. } => respond_to.send(Ok(())).unwrap(),
            other => panic!("Unexpected request: {:?}", other),
        }

        // ...but a concurrent order got there first.
        match expect_tx_request(&mut tx_rx).await.expect("Expected AdjustQuantity") {
            StoreRequest::AdjustQuantity { id, respond_to, .. } => respond_to
                .send(Err(StoreError::InsufficientStock {
                    item_id: id,
                    requested: 4,
                    available: 1,
                }))
                .unwrap(),
            other => panic!("Unexpected request: {:?}", other),
        }

        assert!(expect_rollback(&mut tx_rx).await, "Expected Rollback");

        let result = order_task.await.unwrap();
        assert_eq!(
            result,
            Err(OrderError::InsufficientStock {
                item_id: ItemId::new(1),
                requested: 4,
                available: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_commit_failure_is_retryable() {
        let (coordinator, mut store_rx) = mock_coordinator(10);

        let order_task = tokio::spawn(async move {
            coordinator
                .create_order(PrincipalId::new(1), vec![LineRequest::new(ItemId::new(1), 1)])
                .await
        });

        match expect_request(&mut store_rx).await.expect("Expected GetItem") {
            StoreRequest::GetItem { respond_to, .. } => respond_to.send(Ok(fudge(5))).unwrap(),
            other => panic!("Unexpected request: {:?}", other),
        }
        let mut tx_rx = expect_begin(&mut store_rx, 8).await.expect("Expected Begin");

        for _ in 0..3 {
            match expect_tx_request(&mut tx_rx).await.expect("Expected write") {
                StoreRequest::InsertOrder { respond_to, .. } => {
                    respond_to.send(Ok(OrderId::new(1))).unwrap()
                }
                StoreRequest::InsertOrderLine { respond_to, .. } => {
                    respond_to.send(Ok(())).unwrap()
                }
                StoreRequest::AdjustQuantity { respond_to, .. } => {
                    respond_to.send(Ok(())).unwrap()
                }
                other => panic!("Unexpected request: {:?}", other),
            }
        }

        let responder = expect_commit(&mut tx_rx).await.expect("Expected Commit");
        responder
            .send(Err(StoreError::Aborted("disk full".to_string())))
            .unwrap();

        let result = order_task.await.unwrap();
        match result {
            Err(e @ OrderError::TransactionFailure(_)) => assert!(e.is_retryable()),
            other => panic!("Expected TransactionFailure, got {:?}", other),
        }
    }

    // =========================================================================
    // Full system
    // =========================================================================

    #[tokio::test]
    async fn test_order_decrements_stock_and_snapshots_price() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(3.00), 5).await;
        let customer = Principal::customer(PrincipalId::new(1));

        let order_id = system
            .orders
            .create_order(customer.id, vec![LineRequest::new(x, 2)])
            .await
            .unwrap();

        assert_eq!(stock(&system, x).await, 3);

        let view = system
            .order_queries
            .get_order(&customer, order_id)
            .await
            .unwrap()
            .expect("order should be visible to its owner");
        assert_eq!(view.total, dec!(6.00));
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].item_name, "X");
        assert_eq!(view.lines[0].unit_price_at_purchase, dec!(3.00));

        system.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_orders_never_oversell() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 10).await;

        let first = system.orders.clone();
        let second = system.orders.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move {
                first
                    .create_order(PrincipalId::new(1), vec![LineRequest::new(x, 6)])
                    .await
            }),
            tokio::spawn(async move {
                second
                    .create_order(PrincipalId::new(2), vec![LineRequest::new(x, 6)])
                    .await
            }),
        );
        let results = [a.unwrap(), b.unwrap()];

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(OrderError::InsufficientStock { .. }))));
        assert_eq!(stock(&system, x).await, 4);
        assert_eq!(counts(&system).await.orders, 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_conserve_stock() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(0.50), 20).await;

        let tasks: Vec<_> = (0..30)
            .map(|n| {
                let orders = system.orders.clone();
                tokio::spawn(async move {
                    orders
                        .create_order(PrincipalId::new(n), vec![LineRequest::new(x, 1)])
                        .await
                })
            })
            .collect();

        let mut sold = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => sold += 1,
                Err(OrderError::InsufficientStock { .. }) => {}
                Err(e) => panic!("Unexpected error: {:?}", e),
            }
        }

        assert_eq!(sold, 20);
        assert_eq!(stock(&system, x).await, 0);
        let counts = counts(&system).await;
        assert_eq!(counts.orders, 20);
        assert_eq!(counts.order_lines, 20);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_guarded_together() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 5).await;

        let result = system
            .orders
            .create_order(
                PrincipalId::new(1),
                vec![LineRequest::new(x, 3), LineRequest::new(x, 3)],
            )
            .await;

        assert_eq!(
            result,
            Err(OrderError::InsufficientStock {
                item_id: x,
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(stock(&system, x).await, 5);
        let counts = counts(&system).await;
        assert_eq!(counts.orders, 0);
        assert_eq!(counts.order_lines, 0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_item_leaves_no_trace() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 5).await;
        let missing = ItemId::new(999);

        let result = system
            .orders
            .create_order(
                PrincipalId::new(1),
                vec![LineRequest::new(x, 1), LineRequest::new(missing, 1)],
            )
            .await;

        assert_eq!(result, Err(OrderError::ItemNotFound(missing)));
        assert_eq!(stock(&system, x).await, 5);
        assert_eq!(counts(&system).await.orders, 0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_price_change_does_not_rewrite_history() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(3.00), 10).await;
        let admin = Principal::admin(PrincipalId::new(100));

        let before = system
            .orders
            .create_order(PrincipalId::new(1), vec![LineRequest::new(x, 1)])
            .await
            .unwrap();

        let updated = system
            .catalog
            .update_item(x, ItemPatch::default().price(dec!(5.00)))
            .await
            .unwrap();
        assert_eq!(updated.price, dec!(5.00));
        assert_eq!(updated.quantity, 9);

        let after = system
            .orders
            .create_order(PrincipalId::new(1), vec![LineRequest::new(x, 1)])
            .await
            .unwrap();

        let old = system.order_queries.get_order(&admin, before).await.unwrap().unwrap();
        let new = system.order_queries.get_order(&admin, after).await.unwrap().unwrap();
        assert_eq!(old.total, dec!(3.00));
        assert_eq!(old.lines[0].unit_price_at_purchase, dec!(3.00));
        assert_eq!(new.total, dec!(5.00));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_history_is_scoped_by_role() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(2.00), 10).await;
        let alice = Principal::customer(PrincipalId::new(1));
        let bob = Principal::customer(PrincipalId::new(2));
        let admin = Principal::admin(PrincipalId::new(3));

        let first = system
            .orders
            .create_order(alice.id, vec![LineRequest::new(x, 1)])
            .await
            .unwrap();
        let second = system
            .orders
            .create_order(alice.id, vec![LineRequest::new(x, 2)])
            .await
            .unwrap();
        let bobs = system
            .orders
            .create_order(bob.id, vec![LineRequest::new(x, 1)])
            .await
            .unwrap();

        let mine = system.order_queries.list_for_principal(&alice).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![second, first]);

        // Reads are idempotent.
        assert_eq!(
            system.order_queries.list_for_principal(&alice).await.unwrap(),
            mine
        );

        let everything = system.order_queries.list_for_principal(&admin).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert_eq!(everything[0].order_id, bobs);

        assert_eq!(system.order_queries.get_order(&alice, bobs).await.unwrap(), None);
        assert!(system.order_queries.get_order(&admin, bobs).await.unwrap().is_some());
        assert_eq!(
            system.order_queries.get_order(&admin, OrderId::new(77)).await.unwrap(),
            None
        );

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_committed_orders_total_their_lines() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(3.00), 10).await;
        let y = seed(&system, "Y", dec!(1.25), 10).await;

        system
            .orders
            .create_order(
                PrincipalId::new(1),
                vec![LineRequest::new(x, 2), LineRequest::new(y, 3)],
            )
            .await
            .unwrap();
        system
            .orders
            .create_order(PrincipalId::new(2), vec![LineRequest::new(y, 1)])
            .await
            .unwrap();

        let admin = Principal::admin(PrincipalId::new(99));
        for order in system.order_queries.list_for_principal(&admin).await.unwrap() {
            assert!(!order.lines.is_empty());
            assert_eq!(order.total, order.lines_total());
        }

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_and_retry_succeeds() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 5).await;
        let items = vec![LineRequest::new(x, 2)];

        system.store().fail_next_commit().await.unwrap();
        let result = system.orders.create_order(PrincipalId::new(1), items.clone()).await;

        let err = result.unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {:?}", err);
        assert_eq!(stock(&system, x).await, 5);
        assert_eq!(counts(&system).await.orders, 0);

        system
            .orders
            .create_order(PrincipalId::new(1), items)
            .await
            .unwrap();
        assert_eq!(stock(&system, x).await, 3);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stock_adjustments_outside_orders() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 2).await;
        let ledger = &system.stock_ledger;

        ledger.adjust_stock(x, 5, StockDirection::Restock).await.unwrap();
        assert_eq!(stock(&system, x).await, 7);

        ledger.adjust_stock(x, 7, StockDirection::Purchase).await.unwrap();
        assert_eq!(stock(&system, x).await, 0);

        assert_eq!(
            ledger.adjust_stock(x, 1, StockDirection::Purchase).await,
            Err(StockError::InsufficientStock {
                item_id: x,
                requested: 1,
                available: 0,
            })
        );
        assert_eq!(
            ledger.adjust_stock(x, 0, StockDirection::Restock).await,
            Err(StockError::InvalidQuantity(0))
        );
        assert_eq!(
            ledger
                .adjust_stock(ItemId::new(404), 1, StockDirection::Restock)
                .await,
            Err(StockError::NotFound(ItemId::new(404)))
        );
        // Purchases outside an order do not create one.
        assert_eq!(counts(&system).await.orders, 0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_catalog_rejects_bad_payloads() {
        let system = OrderSystem::new(&EngineConfig::default());
        let x = seed(&system, "X", dec!(1.00), 2).await;

        assert!(matches!(
            system.catalog.update_item(x, ItemPatch::default()).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            system
                .catalog
                .update_item(x, ItemPatch::default().price(dec!(-1)))
                .await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            system
                .catalog
                .create_item(ItemCreate::new("  ", "Candy", dec!(1.00), 1))
                .await,
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(
            system
                .catalog
                .update_item(ItemId::new(404), ItemPatch::default().name("Y"))
                .await,
            Err(CatalogError::NotFound(ItemId::new(404)))
        );

        let renamed = system
            .catalog
            .update_item(x, ItemPatch::default().name("Nougat").category("Chewy"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Nougat");
        assert_eq!(renamed.price, dec!(1.00));
        assert_eq!(counts(&system).await.items, 1);

        system.shutdown().await.unwrap();
    }
}
