use std::future::Future;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::error::StoreError;
use super::messages::{Envelope, Response, StoreRequest, TxMessage};

/// Anything that can carry a [`StoreRequest`] to the store.
///
/// Both the autocommit [`StoreClient`] and an open [`UnitOfWork`] implement it,
/// so every store operation has the same contract in either mode.
pub trait Executor: Send + Sync {
    fn submit(&self, request: StoreRequest) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Sends one request through `executor` and waits for its typed reply.
pub async fn call<E, T>(
    executor: &E,
    build: impl FnOnce(Response<T>) -> StoreRequest,
) -> Result<T, StoreError>
where
    E: Executor,
{
    let (respond_to, response) = oneshot::channel();
    executor.submit(build(respond_to)).await?;
    response
        .await
        .map_err(|_| StoreError::Communication("Store dropped the request".to_string()))?
}

// =============================================================================
// Autocommit handle
// =============================================================================

/// Cloneable handle to the store task. Each request is its own atomic step.
#[derive(Clone, Debug)]
pub struct StoreClient {
    sender: mpsc::Sender<Envelope>,
}

impl StoreClient {
    pub(crate) fn new(sender: mpsc::Sender<Envelope>) -> Self {
        Self { sender }
    }

    async fn send(&self, envelope: Envelope) -> Result<(), StoreError> {
        self.sender
            .send(envelope)
            .await
            .map_err(|_| StoreError::Communication("Store closed".to_string()))
    }

    /// Opens a unit of work. Until it is committed, rolled back, dropped or
    /// timed out, the store serves no other request.
    #[instrument(skip(self))]
    pub async fn begin(&self) -> Result<UnitOfWork, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(Envelope::Begin { respond_to }).await?;
        response
            .await
            .map_err(|_| StoreError::Communication("Store dropped the request".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.send(Envelope::Shutdown).await
    }

    #[cfg(test)]
    pub(crate) async fn row_counts(&self) -> Result<super::messages::RowCounts, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(Envelope::RowCounts { respond_to }).await?;
        response
            .await
            .map_err(|_| StoreError::Communication("Store dropped the request".to_string()))
    }

    #[cfg(test)]
    pub(crate) async fn fail_next_commit(&self) -> Result<(), StoreError> {
        self.send(Envelope::FailNextCommit).await
    }
}

impl Executor for StoreClient {
    async fn submit(&self, request: StoreRequest) -> Result<(), StoreError> {
        self.send(Envelope::Request(request)).await
    }
}

impl_store_api!(StoreClient);

// =============================================================================
// Unit of work
// =============================================================================

/// An open unit of work holding the store's single writer.
///
/// Requests sent through it see each other's writes. Dropping it without
/// calling [`UnitOfWork::commit`] discards every write it made.
#[derive(Debug)]
pub struct UnitOfWork {
    sender: mpsc::Sender<TxMessage>,
}

impl UnitOfWork {
    pub(crate) fn new(sender: mpsc::Sender<TxMessage>) -> Self {
        Self { sender }
    }

    fn closed() -> StoreError {
        StoreError::Aborted("unit of work is no longer open".to_string())
    }

    /// # Errors
    /// `Aborted` if any request inside the unit of work failed, if it timed out,
    /// or if the store refused the commit. Nothing is kept in those cases.
    #[instrument(skip(self))]
    pub async fn commit(self) -> Result<(), StoreError> {
        debug!("Sending commit");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TxMessage::Commit { respond_to })
            .await
            .map_err(|_| Self::closed())?;
        response.await.map_err(|_| Self::closed())?
    }

    #[instrument(skip(self))]
    pub async fn rollback(self) {
        debug!("Sending rollback");
        // A closed channel means the store already discarded the writes.
        let _ = self.sender.send(TxMessage::Rollback).await;
    }
}

impl Executor for UnitOfWork {
    async fn submit(&self, request: StoreRequest) -> Result<(), StoreError> {
        self.sender
            .send(TxMessage::Request(request))
            .await
            .map_err(|_| Self::closed())
    }
}

impl_store_api!(UnitOfWork);
