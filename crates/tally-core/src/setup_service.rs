//! Onboarding state persisted under the `user_setup` key.

use std::sync::Arc;

use tracing::{info, warn};

use tally_domain::UserSetup;

use crate::{
    storage::{load_document, save_document, BlobStore, USER_SETUP_KEY},
    CoreError,
};

pub struct SetupService {
    store: Arc<dyn BlobStore>,
}

impl SetupService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Stored setup, or the defaults when nothing readable is stored.
    pub fn load(&self) -> UserSetup {
        match load_document(self.store.as_ref(), USER_SETUP_KEY) {
            Ok(Some(setup)) => setup,
            Ok(None) => UserSetup::default(),
            Err(err) => {
                warn!(error = %err, "user setup unreadable, using defaults");
                UserSetup::default()
            }
        }
    }

    pub fn save(&self, setup: &UserSetup) -> Result<(), CoreError> {
        if setup.currency.trim().is_empty() {
            return Err(CoreError::Validation("currency is required".into()));
        }
        if let Some(income) = setup.monthly_income {
            if !income.is_finite() || income < 0.0 {
                return Err(CoreError::Validation(
                    "monthly income cannot be negative".into(),
                ));
            }
        }
        save_document(self.store.as_ref(), USER_SETUP_KEY, setup)?;
        info!(completed = setup.completed, "user setup saved");
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.load().completed
    }
}
