//! Categories group a user's transactions of one type, e.g. 'Housing' or 'Salary'.

mod db;
mod defaults;
mod domain;
mod endpoints;

pub use db::{
    count_categories, create_categories, create_category, create_category_table,
    delete_category, get_categories, get_category, update_category,
};
pub use defaults::{DEFAULT_CATEGORIES, SeedOutcome, seed_default_categories};
pub use domain::{Category, CategoryName, CategoryTemplate, NewCategory};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_category_endpoint,
    list_categories_endpoint, seed_default_categories_endpoint, update_category_endpoint,
};
#[cfg(test)]
pub use endpoints::SeedResponse;
