//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, transaction::TransactionType, user::UserID};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only
    /// whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty
    /// invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryName::new(&value)
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named bucket for transactions of one type (e.g. 'Housing', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name, unique per owner and type.
    pub name: CategoryName,
    /// The type of transaction this category may hold.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A display colour such as `#4CAF50`.
    pub color: Option<String>,
    /// The name of a display icon such as `wallet`.
    pub icon: Option<String>,
    /// The owner of the category.
    pub user_id: UserID,
}

/// The details needed to create or update a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    /// The display name.
    pub name: CategoryName,
    /// The type of transaction the category may hold.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// An optional display colour.
    #[serde(default)]
    pub color: Option<String>,
    /// An optional display icon.
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewCategory {
    /// Describe a category without a colour or icon.
    pub fn new(name: CategoryName, transaction_type: TransactionType) -> Self {
        Self {
            name,
            transaction_type,
            color: None,
            icon: None,
        }
    }

    /// Set the display colour.
    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_owned());
        self
    }

    /// Set the display icon.
    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_owned());
        self
    }
}

/// A compile-time description of a category, used for the default set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTemplate {
    /// The display name.
    pub name: &'static str,
    /// The type of transaction the category may hold.
    pub transaction_type: TransactionType,
    /// The display colour.
    pub color: &'static str,
    /// The display icon.
    pub icon: &'static str,
}

impl From<&CategoryTemplate> for NewCategory {
    fn from(template: &CategoryTemplate) -> Self {
        NewCategory::new(
            CategoryName::new_unchecked(template.name),
            template.transaction_type,
        )
        .color(template.color)
        .icon(template.icon)
    }
}
