//! The [`Tally`] facade: configuration, storage and services wired together.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use tally_config::Config;
use tally_core::{
    storage::BlobStore,
    time::{Clock, SystemClock},
    BalanceService, BreakdownService, CategoryProvider, CategoryService, CoreError, GoalService,
    InsightService, PeriodService, ProgressService, SetupService, TransactionService,
};
use tally_domain::{
    normalize_key, BalanceSummary, Category, Goal, Granularity, Insight, Period, PeriodBreakdown,
    Transaction,
};
use tally_storage_json::JsonBlobStorage;

use crate::TallyError;

/// Extra rule marking a transaction as recurring beyond its own `recurrence`.
pub type RecurringPredicate = Arc<dyn Fn(&Transaction, &[Transaction]) -> bool + Send + Sync>;

pub struct Tally {
    config: Config,
    clock: Arc<dyn Clock>,
    transactions: TransactionService,
    goals: GoalService,
    categories: CategoryService,
    setup: SetupService,
    is_recurring: RecurringPredicate,
}

impl Tally {
    /// Opens JSON storage in the configured data directory.
    pub fn open(config: Config) -> Result<Self, TallyError> {
        config.validate()?;
        let root = config.resolve_data_dir();
        let store = Arc::new(JsonBlobStorage::new(root.clone())?);
        info!(path = %root.display(), "opened tally storage");
        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    pub fn with_store(config: Config, store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        let timeout = config.load_timeout();
        Self {
            transactions: TransactionService::with_load_timeout(store.clone(), timeout),
            goals: GoalService::with_load_timeout(store.clone(), clock.clone(), timeout),
            categories: CategoryService::with_load_timeout(store.clone(), timeout),
            setup: SetupService::new(store),
            config,
            clock,
            is_recurring: Arc::new(matches_recurring_template),
        }
    }

    /// Replaces the default recurring-template predicate.
    pub fn with_recurring_predicate(mut self, predicate: RecurringPredicate) -> Self {
        self.is_recurring = predicate;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn goals(&self) -> &GoalService {
        &self.goals
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn setup(&self) -> &SetupService {
        &self.setup
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Stores a transaction and moves the spending goals tracking its category.
    ///
    /// The transaction stays stored even if the goal update fails.
    pub fn add_transaction(&self, transaction: Transaction) -> Result<Uuid, TallyError> {
        let id = self.transactions.add(transaction.clone())?;
        if transaction.is_expense() {
            let categories = self.category_list();
            if let Err(err) = self.goals.record_spending(&transaction, &categories) {
                warn!(%id, error = %err, "failed to apply expense to spending goals");
            }
        }
        Ok(id)
    }

    /// Replaces a stored transaction, moving spending goals from the old
    /// amount and category to the new ones.
    pub fn edit_transaction(&self, transaction: Transaction) -> Result<(), TallyError> {
        let previous = self.transactions.get(transaction.id)?;
        self.transactions.edit(transaction.clone())?;
        if previous.is_expense() || transaction.is_expense() {
            let categories = self.category_list();
            let moved = self
                .goals
                .reverse_spending(&previous, &categories)
                .and_then(|_| self.goals.record_spending(&transaction, &categories));
            if let Err(err) = moved {
                warn!(id = %transaction.id, error = %err, "failed to move spending goals");
            }
        }
        Ok(())
    }

    /// Deletes a transaction and takes its amount back out of spending goals.
    pub fn delete_transaction(&self, id: Uuid) -> Result<bool, TallyError> {
        let previous = self.transactions.get(id).ok();
        let deleted = self.transactions.delete(id)?;
        if let Some(previous) = previous.filter(|txn| deleted && txn.is_expense()) {
            let categories = self.category_list();
            if let Err(err) = self.goals.reverse_spending(&previous, &categories) {
                warn!(%id, error = %err, "failed to reverse expense on spending goals");
            }
        }
        Ok(deleted)
    }

    pub fn create_goal(&self, goal: Goal) -> Result<Uuid, TallyError> {
        if let Some(reference) = goal.category_id.as_deref() {
            let categories = self.category_list();
            if !categories.iter().any(|category| category.matches(reference)) {
                warn!(category = reference, "goal references an unknown category");
            }
        }
        Ok(self.goals.create(goal)?)
    }

    pub fn contribute(&self, goal_id: Uuid, amount: f64) -> Result<Goal, TallyError> {
        Ok(self.goals.contribute(goal_id, amount)?)
    }

    pub fn goal_progress(&self, goal_id: Uuid) -> Result<f64, TallyError> {
        let goal = self.goals.get(goal_id)?;
        Ok(ProgressService::progress(&goal))
    }

    /// Buckets holding discretionary spending, newest first.
    pub fn periods(&self, granularity: Granularity) -> Vec<Period> {
        let transactions = self.transactions.list();
        self.periods_of(granularity, &transactions)
    }

    /// Category breakdown of the bucket containing `selected`.
    ///
    /// Empty buckets resolve to the highest-spending bucket; `None` when there
    /// is no discretionary spending at all.
    pub fn breakdown(
        &self,
        granularity: Granularity,
        selected: NaiveDate,
    ) -> Option<PeriodBreakdown> {
        let transactions = self.transactions.list();
        let periods = self.periods_of(granularity, &transactions);
        let period = PeriodService::resolve(granularity, selected, &periods)?;
        let categories = self.category_list();
        Some(BreakdownService::breakdown(
            &period,
            &transactions,
            &categories,
            self.config.rule_table(),
            |txn| (self.is_recurring)(txn, transactions.as_slice()),
        ))
    }

    /// Takeout trend between the resolved bucket and the one before it.
    ///
    /// Only discretionary spending counts, matching the breakdown.
    pub fn takeout_insight(
        &self,
        granularity: Granularity,
        selected: NaiveDate,
    ) -> Option<Insight> {
        let transactions = self.transactions.list();
        let periods = self.periods_of(granularity, &transactions);
        let (current, previous) =
            PeriodService::resolve_with_previous(granularity, selected, &periods)?;
        let is_recurring = |txn: &Transaction| (self.is_recurring)(txn, transactions.as_slice());
        InsightService::takeout_trend(
            granularity,
            PeriodService::discretionary_in(&current, &transactions, is_recurring),
            PeriodService::discretionary_in(&previous, &transactions, is_recurring),
            &self.config.insight_settings(),
        )
    }

    /// Balance card for the bucket containing `selected`.
    pub fn balance(&self, granularity: Granularity, selected: NaiveDate) -> BalanceSummary {
        let period = PeriodService::bucket_for(granularity, selected);
        BalanceService::summarize(
            &period,
            &self.transactions.list(),
            &self.goals.list(),
            self.clock.today(),
        )
    }

    fn periods_of(&self, granularity: Granularity, transactions: &[Transaction]) -> Vec<Period> {
        PeriodService::build_periods(granularity, transactions, |txn| {
            (self.is_recurring)(txn, transactions)
        })
    }

    fn category_list(&self) -> Vec<Category> {
        self.categories.get_categories().unwrap_or_else(|err: CoreError| {
            warn!(error = %err, "categories unavailable");
            Vec::new()
        })
    }
}

/// An expense is recurring when a recurring transaction with the same
/// description and category exists.
pub fn matches_recurring_template(transaction: &Transaction, all: &[Transaction]) -> bool {
    let description = normalize_key(&transaction.description);
    let category = normalize_key(transaction.category_label());
    all.iter().any(|template| {
        template.is_recurring()
            && template.id != transaction.id
            && template.kind == transaction.kind
            && normalize_key(&template.description) == description
            && normalize_key(template.category_label()) == category
    })
}
