//! Cooperative cancellation shared by every upstream operation.
//!
//! A [`Cancel`] plays the role of a request context: clones observe the same
//! signal, and any in-flight call raced through [`Cancel::run`] returns
//! [`Error::Cancelled`] as soon as the signal fires.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Cancel {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Cancel {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Fires the signal for this handle and all of its clones.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal has fired.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // sender lives in `self`, so this branch only runs during teardown
            std::future::pending::<()>().await;
        }
    }

    /// Drives `fut` to completion unless cancellation wins the race.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}
