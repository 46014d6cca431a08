//! Lazily opened provider connection handles

use crate::error::Result;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A client connection to a provider API
pub trait Connection: Send + Sync {
    /// Release the connection. Called at most once per handle.
    fn shutdown(&self) -> anyhow::Result<()>;
}

/// A connection handle that is opened on first use and cached until closed.
///
/// Resource tasks of one batch may race to open the handle; the slot lock is
/// held while connecting so only one handle is ever created per opening.
/// A handle still open when the slot is dropped is shut down then.
pub struct LazyConnection<C: Connection> {
    label: String,
    slot: Mutex<Option<Arc<C>>>,
}

impl<C: Connection> LazyConnection<C> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slot: Mutex::new(None),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<C>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached handle, opening it with `connect` if there is none.
    pub fn get_or_connect<F>(&self, connect: F) -> Result<Arc<C>>
    where
        F: FnOnce() -> Result<C>,
    {
        let mut slot = self.lock();
        if let Some(conn) = slot.as_ref() {
            return Ok(Arc::clone(conn));
        }

        let conn = Arc::new(connect()?);
        tracing::info!("Opened connection to {}", self.label);
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }

    /// The cached handle, if one is open
    pub fn get(&self) -> Option<Arc<C>> {
        self.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Shut the handle down and clear the cache.
    ///
    /// Returns `true` if a handle was open. Shutdown failures are logged.
    pub fn close(&self) -> bool {
        let Some(conn) = self.lock().take() else {
            return false;
        };
        shutdown(&self.label, conn.as_ref());
        true
    }
}

fn shutdown<C: Connection>(label: &str, conn: &C) {
    match conn.shutdown() {
        Ok(()) => tracing::info!("Closed connection to {}", label),
        Err(e) => tracing::warn!("Failed to close connection to {}: {:#}", label, e),
    }
}

impl<C: Connection> Drop for LazyConnection<C> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = slot.take() {
            shutdown(&self.label, conn.as_ref());
        }
    }
}

impl<C: Connection> fmt::Debug for LazyConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self
            .slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("LazyConnection")
            .field("label", &self.label)
            .field("open", &open)
            .finish()
    }
}
