//! Persistence-backed CRUD for transactions.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{debug, info};
use uuid::Uuid;

use tally_domain::{Displayable, Transaction};

use crate::{
    storage::{
        load_records, load_records_or_default, save_records, BlobStore, DEFAULT_LOAD_TIMEOUT,
        TRANSACTIONS_KEY,
    },
    CoreError,
};

/// Stores transactions as a single JSON blob.
///
/// Deletes are debounced per id: while a delete of an id is in flight, further
/// deletes of that id return `Ok(false)` without touching storage.
pub struct TransactionService {
    store: Arc<dyn BlobStore>,
    write_lock: Mutex<()>,
    deleting: Mutex<HashSet<Uuid>>,
    load_timeout: Duration,
}

impl TransactionService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_load_timeout(store, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_load_timeout(store: Arc<dyn BlobStore>, load_timeout: Duration) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            deleting: Mutex::new(HashSet::new()),
            load_timeout,
        }
    }

    /// Returns every stored transaction. Unreadable data degrades to an empty list.
    pub fn list(&self) -> Vec<Transaction> {
        load_records_or_default(self.store.as_ref(), TRANSACTIONS_KEY, self.load_timeout)
    }

    pub fn get(&self, id: Uuid) -> Result<Transaction, CoreError> {
        self.load()?
            .into_iter()
            .find(|txn| txn.id == id)
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// Adds a new transaction and returns its identifier.
    pub fn add(&self, transaction: Transaction) -> Result<Uuid, CoreError> {
        validate(&transaction)?;
        let _guard = self.lock_writes()?;
        let mut transactions = self.load()?;
        if transactions.iter().any(|txn| txn.id == transaction.id) {
            return Err(CoreError::InvalidOperation(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        let id = transaction.id;
        let label = transaction.display_label();
        transactions.push(transaction);
        save_records(self.store.as_ref(), TRANSACTIONS_KEY, &transactions)?;
        info!(%id, transaction = %label, "transaction added");
        Ok(id)
    }

    /// Replaces the stored transaction that shares `transaction.id`.
    pub fn edit(&self, transaction: Transaction) -> Result<(), CoreError> {
        validate(&transaction)?;
        let _guard = self.lock_writes()?;
        let mut transactions = self.load()?;
        let slot = transactions
            .iter_mut()
            .find(|txn| txn.id == transaction.id)
            .ok_or(CoreError::TransactionNotFound(transaction.id))?;
        let id = transaction.id;
        *slot = transaction;
        save_records(self.store.as_ref(), TRANSACTIONS_KEY, &transactions)?;
        info!(%id, "transaction updated");
        Ok(())
    }

    /// Removes the transaction identified by `id`.
    ///
    /// Returns `Ok(false)` when the id is unknown or already being deleted.
    pub fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        if !self.begin_delete(id)? {
            debug!(%id, "delete already in progress, ignoring");
            return Ok(false);
        }
        let outcome = self.remove(id);
        self.finish_delete(id);
        outcome
    }

    fn remove(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.lock_writes()?;
        let mut transactions = self.load()?;
        let before = transactions.len();
        transactions.retain(|txn| txn.id != id);
        if transactions.len() == before {
            debug!(%id, "transaction already gone");
            return Ok(false);
        }
        save_records(self.store.as_ref(), TRANSACTIONS_KEY, &transactions)?;
        info!(%id, "transaction deleted");
        Ok(true)
    }

    fn begin_delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let mut deleting = self
            .deleting
            .lock()
            .map_err(|_| CoreError::Storage("delete guard poisoned".into()))?;
        Ok(deleting.insert(id))
    }

    fn finish_delete(&self, id: Uuid) {
        if let Ok(mut deleting) = self.deleting.lock() {
            deleting.remove(&id);
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("transaction write lock poisoned".into()))
    }

    fn load(&self) -> Result<Vec<Transaction>, CoreError> {
        load_records(self.store.as_ref(), TRANSACTIONS_KEY)
    }
}

fn validate(transaction: &Transaction) -> Result<(), CoreError> {
    if !transaction.amount.is_finite() || transaction.amount <= 0.0 {
        return Err(CoreError::Validation(
            "transaction amount must be greater than zero".into(),
        ));
    }
    if transaction.description.trim().is_empty() {
        return Err(CoreError::Validation(
            "transaction description is required".into(),
        ));
    }
    Ok(())
}
