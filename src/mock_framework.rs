//! # Mock Framework
//!
//! Utilities for testing clients without a running store.
//!
//! Use [`create_mock_store`] to get a [`StoreClient`] and the receiving end of
//! its queue. Then use helpers like [`expect_request`] or [`expect_begin`] to
//! assert what the client sends and answer it by hand.

use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;
use crate::store::{Envelope, StoreClient, StoreRequest, TxMessage, UnitOfWork};

/// Creates a store handle whose queue is drained by the test instead of a store task.
///
/// Tests play the store: they receive each message, check it, and reply through
/// its responder. Failures and odd interleavings are then fully deterministic.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<Envelope>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Next message must be an autocommit request.
pub async fn expect_request(receiver: &mut mpsc::Receiver<Envelope>) -> Option<StoreRequest> {
    match receiver.recv().await {
        Some(Envelope::Request(request)) => Some(request),
        _ => None,
    }
}

/// Next message must open a unit of work. Hands the caller its unit of work and
/// returns the receiver for the requests sent through it.
pub async fn expect_begin(
    receiver: &mut mpsc::Receiver<Envelope>,
    tx_buffer: usize,
) -> Option<mpsc::Receiver<TxMessage>> {
    match receiver.recv().await {
        Some(Envelope::Begin { respond_to }) => {
            let (sender, tx_receiver) = mpsc::channel(tx_buffer);
            respond_to.send(UnitOfWork::new(sender)).ok()?;
            Some(tx_receiver)
        }
        _ => None,
    }
}

/// Next unit of work message must be a request.
pub async fn expect_tx_request(receiver: &mut mpsc::Receiver<TxMessage>) -> Option<StoreRequest> {
    match receiver.recv().await {
        Some(TxMessage::Request(request)) => Some(request),
        _ => None,
    }
}

/// Next unit of work message must be a commit.
pub async fn expect_commit(
    receiver: &mut mpsc::Receiver<TxMessage>,
) -> Option<oneshot::Sender<Result<(), StoreError>>> {
    match receiver.recv().await {
        Some(TxMessage::Commit { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next unit of work message must be an explicit rollback.
pub async fn expect_rollback(receiver: &mut mpsc::Receiver<TxMessage>) -> bool {
    matches!(receiver.recv().await, Some(TxMessage::Rollback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemId;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_mock_store() {
        let (client, mut receiver) = create_mock_store(10);

        // Autocommit request
        let task = tokio::spawn({
            let client = client.clone();
            async move { client.adjust_quantity(ItemId::new(7), -2).await }
        });

        match expect_request(&mut receiver).await.expect("Expected request") {
            StoreRequest::AdjustQuantity {
                id,
                delta,
                respond_to,
            } => {
                assert_eq!(id, ItemId::new(7));
                assert_eq!(delta, -2);
                respond_to.send(Ok(())).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }
        assert_eq!(task.await.unwrap(), Ok(()));

        // Unit of work
        let task = tokio::spawn(async move {
            let uow = client.begin().await?;
            uow.commit().await
        });

        let mut tx = expect_begin(&mut receiver, 4).await.expect("Expected Begin");
        let responder = expect_commit(&mut tx).await.expect("Expected Commit");
        responder
            .send(Err(StoreError::Aborted("nope".to_string())))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(StoreError::Aborted("nope".to_string()))
        );
    }
}
