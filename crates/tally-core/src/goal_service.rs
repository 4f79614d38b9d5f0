//! Persistence-backed goal lifecycle: create, progress, complete, delete.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{debug, info};
use uuid::Uuid;

use tally_domain::{normalize_key, Category, Displayable, Goal, GoalKind, Transaction};

use crate::{
    progress_service::ProgressService,
    storage::{
        load_records, load_records_or_default, save_records, BlobStore, DEFAULT_LOAD_TIMEOUT,
        GOALS_KEY,
    },
    time::Clock,
    CoreError,
};

pub struct GoalService {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
    load_timeout: Duration,
}

impl GoalService {
    pub fn new(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_load_timeout(store, clock, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_load_timeout(
        store: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        load_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
            load_timeout,
        }
    }

    /// Returns every stored goal. Unreadable data degrades to an empty list.
    pub fn list(&self) -> Vec<Goal> {
        load_records_or_default(self.store.as_ref(), GOALS_KEY, self.load_timeout)
    }

    /// Active goals, highest priority first.
    pub fn active(&self) -> Vec<Goal> {
        let mut goals: Vec<Goal> = self.list().into_iter().filter(|goal| goal.is_active).collect();
        goals.sort_by_key(|goal| goal.priority);
        goals
    }

    pub fn get(&self, id: Uuid) -> Result<Goal, CoreError> {
        self.load()?
            .into_iter()
            .find(|goal| goal.id == id)
            .ok_or(CoreError::GoalNotFound(id))
    }

    /// Validates and stores a new goal.
    pub fn create(&self, mut goal: Goal) -> Result<Uuid, CoreError> {
        validate_goal(&goal)?;
        ProgressService::enforce_invariants(&mut goal);
        let _guard = self.lock_writes()?;
        let mut goals = self.load()?;
        if goals.iter().any(|existing| existing.id == goal.id) {
            return Err(CoreError::InvalidOperation(format!(
                "goal {} already exists",
                goal.id
            )));
        }
        let id = goal.id;
        info!(%id, goal = %goal.display_label(), "goal created");
        goals.push(goal);
        save_records(self.store.as_ref(), GOALS_KEY, &goals)?;
        Ok(id)
    }

    /// Replaces the stored goal sharing `goal.id`, revalidating it first.
    pub fn update(&self, mut goal: Goal) -> Result<(), CoreError> {
        validate_goal(&goal)?;
        ProgressService::enforce_invariants(&mut goal);
        let id = goal.id;
        self.mutate(id, |stored| *stored = goal)?;
        info!(%id, "goal updated");
        Ok(())
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.lock_writes()?;
        let mut goals = self.load()?;
        let before = goals.len();
        goals.retain(|goal| goal.id != id);
        if goals.len() == before {
            return Ok(false);
        }
        save_records(self.store.as_ref(), GOALS_KEY, &goals)?;
        info!(%id, "goal deleted");
        Ok(true)
    }

    /// Moves a goal by `amount` and completes it when it reaches 100%.
    ///
    /// Savings and spending goals increase, debt goals decrease.
    pub fn contribute(&self, id: Uuid, amount: f64) -> Result<Goal, CoreError> {
        if !amount.is_finite() {
            return Err(CoreError::Validation("contribution must be a number".into()));
        }
        let today = self.clock.today();
        self.mutate(id, |goal| {
            if !goal.is_active {
                return;
            }
            ProgressService::apply_contribution(goal, amount);
            if ProgressService::is_complete(goal) {
                goal.mark_completed(today);
                info!(id = %goal.id, "goal completed");
            }
        })
    }

    /// Adds an expense to every active spending goal tracking its category.
    ///
    /// Returns the ids of the goals that changed.
    pub fn record_spending(
        &self,
        transaction: &Transaction,
        categories: &[Category],
    ) -> Result<Vec<Uuid>, CoreError> {
        self.apply_spending(transaction, categories, transaction.magnitude())
    }

    /// Takes a previously recorded expense back out of its spending goals.
    ///
    /// Progress never drops below zero.
    pub fn reverse_spending(
        &self,
        transaction: &Transaction,
        categories: &[Category],
    ) -> Result<Vec<Uuid>, CoreError> {
        self.apply_spending(transaction, categories, -transaction.magnitude())
    }

    fn apply_spending(
        &self,
        transaction: &Transaction,
        categories: &[Category],
        amount: f64,
    ) -> Result<Vec<Uuid>, CoreError> {
        if !transaction.is_expense() {
            return Ok(Vec::new());
        }
        let _guard = self.lock_writes()?;
        let mut goals = self.load()?;
        let mut touched = Vec::new();
        for goal in goals.iter_mut().filter(|goal| {
            goal.is_active
                && goal.kind == GoalKind::Spending
                && goal
                    .category_id
                    .as_deref()
                    .is_some_and(|reference| {
                        references_match(reference, transaction.category_label(), categories)
                    })
        }) {
            ProgressService::apply_contribution(goal, amount);
            touched.push(goal.id);
        }
        if !touched.is_empty() {
            save_records(self.store.as_ref(), GOALS_KEY, &goals)?;
            debug!(
                txn = %transaction.id,
                amount,
                goals = touched.len(),
                "spending applied to goals"
            );
        }
        Ok(touched)
    }

    fn mutate<F>(&self, id: Uuid, mutator: F) -> Result<Goal, CoreError>
    where
        F: FnOnce(&mut Goal),
    {
        let _guard = self.lock_writes()?;
        let mut goals = self.load()?;
        let goal = goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or(CoreError::GoalNotFound(id))?;
        mutator(goal);
        let updated = goal.clone();
        save_records(self.store.as_ref(), GOALS_KEY, &goals)?;
        Ok(updated)
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("goal write lock poisoned".into()))
    }

    fn load(&self) -> Result<Vec<Goal>, CoreError> {
        load_records(self.store.as_ref(), GOALS_KEY)
    }
}

/// Form-level validation applied on create and update.
pub fn validate_goal(goal: &Goal) -> Result<(), CoreError> {
    if goal.title.trim().is_empty() {
        return Err(CoreError::Validation("goal title is required".into()));
    }
    if !goal.target.is_finite() || goal.target <= 0.0 {
        return Err(CoreError::Validation(
            "goal target must be greater than zero".into(),
        ));
    }
    if !goal.current.is_finite() || goal.current < 0.0 {
        return Err(CoreError::Validation(
            "goal progress cannot be negative".into(),
        ));
    }
    if goal.kind == GoalKind::Debt {
        match goal.original_amount {
            Some(original) if original.is_finite() && original > 0.0 => {
                if goal.current > original {
                    return Err(CoreError::Validation(
                        "remaining debt cannot exceed the original amount".into(),
                    ));
                }
            }
            _ => {
                return Err(CoreError::Validation(
                    "debt goals need an original amount".into(),
                ))
            }
        }
    }
    let has_category = goal
        .category_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    if goal.kind == GoalKind::Spending && !has_category {
        return Err(CoreError::Validation("spending goals need a category".into()));
    }
    Ok(())
}

/// Matches two category references by id or name, directly or through category metadata.
fn references_match(left: &str, right: &str, categories: &[Category]) -> bool {
    if normalize_key(left) == normalize_key(right) {
        return true;
    }
    categories
        .iter()
        .any(|category| category.matches(left) && category.matches(right))
}
