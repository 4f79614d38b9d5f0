//! Category reference data backed by the blob store.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use tracing::{info, warn};

use tally_domain::{normalize_key, Category, Displayable};

use crate::{
    storage::{
        load_records, report_slow_load, save_records, BlobStore, CATEGORIES_KEY,
        DEFAULT_LOAD_TIMEOUT,
    },
    CoreError,
};

const MAX_NAME_LEN: usize = 40;

/// Source of category reference data consumed by forms and breakdowns.
pub trait CategoryProvider: Send + Sync {
    fn get_categories(&self) -> Result<Vec<Category>, CoreError>;
    fn add_category(&self, category: Category) -> Result<(), CoreError>;
    /// Checks that `name` is usable for a new category.
    fn validate_category(&self, name: &str) -> Result<(), CoreError>;
}

pub struct CategoryService {
    store: Arc<dyn BlobStore>,
    write_lock: Mutex<()>,
    load_timeout: Duration,
}

impl CategoryService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_load_timeout(store, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_load_timeout(store: Arc<dyn BlobStore>, load_timeout: Duration) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            load_timeout,
        }
    }

    /// Built-in categories written on first use.
    pub fn default_categories() -> Vec<Category> {
        vec![
            Category::new("food", "Food")
                .with_style("restaurant", "#FF8A65")
                .with_subcategory("takeout", "Takeout")
                .with_subcategory("groceries", "Groceries")
                .with_subcategory("dining", "Dining Out"),
            Category::new("transport", "Transport")
                .with_style("directions-car", "#4FC3F7")
                .with_subcategory("fuel", "Fuel")
                .with_subcategory("rideshare", "Rideshare")
                .with_subcategory("public", "Public Transport"),
            Category::new("shopping", "Shopping").with_style("shopping-bag", "#BA68C8"),
            Category::new("entertainment", "Entertainment").with_style("movie", "#FFD54F"),
            Category::new("bills", "Bills").with_style("receipt", "#90A4AE"),
            Category::new("health", "Health").with_style("favorite", "#E57373"),
            Category::new("other", "Other").with_style("more-horiz", "#BDBDBD"),
        ]
    }

    /// Looks up a category by id or name.
    pub fn find(&self, reference: &str) -> Result<Category, CoreError> {
        self.get_categories()?
            .into_iter()
            .find(|category| category.matches(reference))
            .ok_or_else(|| CoreError::CategoryNotFound(reference.to_string()))
    }

    fn load_or_seed(&self) -> Result<Vec<Category>, CoreError> {
        let started = Instant::now();
        let loaded = load_records::<Category>(self.store.as_ref(), CATEGORIES_KEY);
        report_slow_load(CATEGORIES_KEY, started, self.load_timeout);
        match loaded {
            Ok(categories) if !categories.is_empty() => Ok(categories),
            Ok(_) => {
                let defaults = Self::default_categories();
                save_records(self.store.as_ref(), CATEGORIES_KEY, &defaults)?;
                info!(count = defaults.len(), "seeded default categories");
                Ok(defaults)
            }
            Err(err) => {
                warn!(error = %err, "category data unreadable, using defaults");
                Ok(Self::default_categories())
            }
        }
    }

    fn validate_against(existing: &[Category], name: &str) -> Result<(), CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("category name is required".into()));
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "category name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if existing.iter().any(|category| category.matches(trimmed)) {
            return Err(CoreError::Validation(format!(
                "Category `{}` already exists",
                trimmed
            )));
        }
        Ok(())
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("category write lock poisoned".into()))
    }
}

impl CategoryProvider for CategoryService {
    fn get_categories(&self) -> Result<Vec<Category>, CoreError> {
        self.load_or_seed()
    }

    fn add_category(&self, mut category: Category) -> Result<(), CoreError> {
        let _guard = self.lock_writes()?;
        let mut categories = self.load_or_seed()?;
        Self::validate_against(&categories, &category.name)?;
        category.name = category.name.trim().to_string();
        if category.id.trim().is_empty() {
            category.id = slug(&category.name);
        }
        if categories.iter().any(|existing| existing.matches(&category.id)) {
            return Err(CoreError::Validation(format!(
                "Category id `{}` already exists",
                category.id
            )));
        }
        info!(id = %category.id, category = %category.display_label(), "category added");
        categories.push(category);
        save_records(self.store.as_ref(), CATEGORIES_KEY, &categories)
    }

    fn validate_category(&self, name: &str) -> Result<(), CoreError> {
        let categories = self.load_or_seed()?;
        Self::validate_against(&categories, name)
    }
}

fn slug(name: &str) -> String {
    let mut slug = String::new();
    for ch in normalize_key(name).chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
