//! The starter set of categories offered to new users.

use serde::{Deserialize, Serialize};

use crate::{
    Error, category::CategoryTemplate, store::LedgerStore, transaction::TransactionType,
    user::UserID,
};

/// The categories created by [seed_default_categories]: four for income, ten for expenses.
pub const DEFAULT_CATEGORIES: [CategoryTemplate; 14] = [
    income("Salary", "#4CAF50", "wallet"),
    income("Investments", "#2196F3", "trending-up"),
    income("Gifts", "#9C27B0", "gift"),
    income("Other Income", "#607D8B", "plus-circle"),
    expense("Food & Dining", "#FF9800", "utensils"),
    expense("Housing", "#795548", "home"),
    expense("Transportation", "#F44336", "car"),
    expense("Entertainment", "#673AB7", "film"),
    expense("Shopping", "#E91E63", "shopping-bag"),
    expense("Utilities", "#00BCD4", "power"),
    expense("Healthcare", "#8BC34A", "activity"),
    expense("Personal", "#3F51B5", "user"),
    expense("Education", "#009688", "book"),
    expense("Other Expenses", "#9E9E9E", "more-horizontal"),
];

const fn income(name: &'static str, color: &'static str, icon: &'static str) -> CategoryTemplate {
    CategoryTemplate {
        name,
        transaction_type: TransactionType::Income,
        color,
        icon,
    }
}

const fn expense(name: &'static str, color: &'static str, icon: &'static str) -> CategoryTemplate {
    CategoryTemplate {
        name,
        transaction_type: TransactionType::Expense,
        color,
        icon,
    }
}

/// The result of [seed_default_categories].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOutcome {
    /// Whether the default categories were created by this call.
    pub created: bool,
}

impl SeedOutcome {
    /// A short description of the outcome for clients.
    pub fn message(&self) -> &'static str {
        if self.created {
            "Default categories created"
        } else {
            "User already has categories"
        }
    }
}

/// Give `user_id` the [DEFAULT_CATEGORIES] if they have no categories yet.
///
/// Users that already have at least one category are left untouched. When two calls race for the
/// same user, the loser's bulk insert hits the unique name constraint and is rolled back, so the
/// defaults are never created twice.
///
/// # Errors
/// Returns any error from `store` other than a duplicate category name.
pub fn seed_default_categories(
    store: &impl LedgerStore,
    user_id: UserID,
) -> Result<SeedOutcome, Error> {
    if store.count_categories(user_id)? > 0 {
        tracing::debug!("User {user_id} already has categories, skipping default categories");
        return Ok(SeedOutcome { created: false });
    }

    match store.bulk_insert_categories(user_id, &DEFAULT_CATEGORIES) {
        Ok(categories) => {
            tracing::info!(
                "Created {} default categories for user {user_id}",
                categories.len()
            );
            Ok(SeedOutcome { created: true })
        }
        Err(Error::DuplicateCategoryName(name, transaction_type)) => {
            tracing::debug!(
                "Default category \"{name}\" ({transaction_type}) already exists for user \
                {user_id}, another request seeded the defaults first"
            );
            Ok(SeedOutcome { created: false })
        }
        Err(error) => Err(error),
    }
}
