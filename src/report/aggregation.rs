//! Pure functions that turn transactions into report figures.
//!
//! Nothing here touches the database or suspends, callers fetch the transactions first and pass
//! them in. All sums use exact decimal arithmetic so totals never drift away from the cent.

use std::collections::HashMap;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{
    category::{Category, CategoryName},
    database_id::CategoryId,
    transaction::{Transaction, TransactionType},
};

/// Totals and counts of income and expenses over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: Decimal,
    /// The sum of all expense amounts.
    pub total_expense: Decimal,
    /// `total_income - total_expense`, negative when more was spent than earned.
    pub balance: Decimal,
    /// The number of income transactions.
    pub income_count: usize,
    /// The number of expense transactions.
    pub expense_count: usize,
    /// `income_count + expense_count`.
    pub transaction_count: usize,
}

/// Summarise `transactions` by type.
///
/// The result does not depend on the order of `transactions`, and an empty slice gives a summary
/// of zeros.
pub fn compute_summary(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => {
                summary.total_income += transaction.amount.value();
                summary.income_count += 1;
            }
            TransactionType::Expense => {
                summary.total_expense += transaction.amount.value();
                summary.expense_count += 1;
            }
        }
    }

    summary.balance = summary.total_income - summary.total_expense;
    summary.transaction_count = summary.income_count + summary.expense_count;

    summary
}

/// How much one category accounts for within its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistic {
    /// The category's ID.
    pub id: CategoryId,
    /// The category's name.
    pub name: CategoryName,
    /// The category's display colour.
    pub color: Option<String>,
    /// The category's display icon.
    pub icon: Option<String>,
    /// The sum of the category's transaction amounts.
    pub total_amount: Decimal,
    /// The number of transactions in the category.
    pub transaction_count: usize,
    /// The share of the overall total, from 0 to 100.
    ///
    /// Zero when the overall total is zero.
    pub percentage: f64,
}

/// Per-category statistics and the total they share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    /// One entry per category, including categories without transactions, ordered by name.
    pub categories: Vec<CategoryStatistic>,
    /// The sum of every category's `total_amount`.
    pub overall_total: Decimal,
}

/// Compute the total, count and share of each category.
///
/// `transactions_by_category` maps a category ID to that category's transactions. Categories
/// missing from the map are reported with zeros rather than dropped. Entries for IDs that are not
/// in `categories` are ignored.
///
/// The statistics are ordered by name, comparing bytes so upper case sorts before lower case.
pub fn compute_category_statistics(
    categories: &[Category],
    transactions_by_category: &HashMap<CategoryId, Vec<Transaction>>,
) -> CategoryStatistics {
    let mut totals: Vec<(&Category, Decimal, usize)> = categories
        .iter()
        .map(|category| {
            let transactions = transactions_by_category
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let total = transactions
                .iter()
                .map(|transaction| transaction.amount.value())
                .sum::<Decimal>();

            (category, total, transactions.len())
        })
        .collect();

    let overall_total: Decimal = totals.iter().map(|(_, total, _)| *total).sum();

    // `sort_by` is stable, so categories with equal names keep their input order.
    totals.sort_by(|(a, _, _), (b, _, _)| a.name.as_ref().cmp(b.name.as_ref()));

    let categories = totals
        .into_iter()
        .map(|(category, total_amount, transaction_count)| CategoryStatistic {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            total_amount,
            transaction_count,
            percentage: percentage(total_amount, overall_total),
        })
        .collect();

    CategoryStatistics {
        categories,
        overall_total,
    }
}

fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }

    (part * Decimal::ONE_HUNDRED / whole)
        .to_f64()
        .unwrap_or_default()
}

/// Group `transactions` by category ID, dropping uncategorised transactions.
pub fn group_by_category(transactions: Vec<Transaction>) -> HashMap<CategoryId, Vec<Transaction>> {
    let mut groups: HashMap<CategoryId, Vec<Transaction>> = HashMap::new();

    for transaction in transactions {
        if let Some(category_id) = transaction.category_id {
            groups.entry(category_id).or_default().push(transaction);
        }
    }

    groups
}


#[cfg(test)]
mod category_statistics_tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        category::{Category, CategoryName},
        transaction::{Amount, Transaction, TransactionType},
        user::UserID,
    };

    use super::{compute_category_statistics, group_by_category};

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: CategoryName::new_unchecked(name),
            transaction_type: TransactionType::Expense,
            color: None,
            icon: None,
            user_id: UserID::new(1),
        }
    }

    fn expense(id: i64, amount: &str, category_id: Option<i64>) -> Transaction {
        Transaction {
            id,
            amount: amount.parse().unwrap(),
            description: None,
            date: date!(2024 - 01 - 10),
            transaction_type: TransactionType::Expense,
            category_id,
            user_id: UserID::new(1),
        }
    }

    fn decimal(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn assert_percentages_sum_to_100(percentages: impl Iterator<Item = f64>) {
        let sum: f64 = percentages.sum();
        assert!((sum - 100.0).abs() < 1e-9, "want percentages to sum to 100, got {sum}");
    }

    #[test]
    fn food_and_transport() {
        let categories = [category(1, "Food"), category(2, "Transport")];
        let transactions = group_by_category(vec![expense(1, "15", Some(1))]);

        let statistics = compute_category_statistics(&categories, &transactions);

        assert_eq!(statistics.overall_total, decimal("15"));
        assert_eq!(statistics.categories.len(), 2);
        let food = &statistics.categories[0];
        assert_eq!(food.name.as_ref(), "Food");
        assert_eq!(food.total_amount, decimal("15"));
        assert_eq!(food.transaction_count, 1);
        assert_eq!(food.percentage, 100.0);
        let transport = &statistics.categories[1];
        assert_eq!(transport.name.as_ref(), "Transport");
        assert_eq!(transport.total_amount, Decimal::ZERO);
        assert_eq!(transport.transaction_count, 0);
        assert_eq!(transport.percentage, 0.0);
    }

    #[test]
    fn no_categories_is_empty_not_an_error() {
        let statistics = compute_category_statistics(&[], &HashMap::new());

        assert!(statistics.categories.is_empty());
        assert_eq!(statistics.overall_total, Decimal::ZERO);
    }

    #[test]
    fn zero_overall_total_gives_zero_percentages() {
        let categories = [category(1, "Food"), category(2, "Rent")];

        let statistics = compute_category_statistics(&categories, &HashMap::new());

        assert_eq!(statistics.overall_total, Decimal::ZERO);
        assert!(
            statistics
                .categories
                .iter()
                .all(|statistic| statistic.percentage == 0.0)
        );
    }

    #[test]
    fn percentages_sum_to_100() {
        let categories = [category(1, "A"), category(2, "B"), category(3, "C")];
        let transactions = group_by_category(vec![
            expense(1, "10", Some(1)),
            expense(2, "10", Some(2)),
            expense(3, "10", Some(3)),
            expense(4, "0.01", Some(3)),
        ]);

        let statistics = compute_category_statistics(&categories, &transactions);

        assert_percentages_sum_to_100(
            statistics
                .categories
                .iter()
                .map(|statistic| statistic.percentage),
        );
    }

    #[test]
    fn sorts_by_name_with_upper_case_first() {
        let categories = [category(1, "food"), category(2, "Rent"), category(3, "Food")];

        let statistics = compute_category_statistics(&categories, &HashMap::new());

        let names: Vec<&str> = statistics
            .categories
            .iter()
            .map(|statistic| statistic.name.as_ref())
            .collect();
        assert_eq!(names, ["Food", "Rent", "food"]);
    }

    #[test]
    fn equal_names_keep_input_order() {
        let mut income = category(7, "Gifts");
        income.transaction_type = TransactionType::Income;
        let categories = [category(9, "Gifts"), income];

        let statistics = compute_category_statistics(&categories, &HashMap::new());

        let ids: Vec<i64> = statistics.categories.iter().map(|s| s.id).collect();
        assert_eq!(ids, [9, 7]);
    }

    #[test]
    fn largest_amounts_give_exact_percentages() {
        let categories = [category(1, "Housing"), category(2, "Investments")];
        let max = Amount::MAX.to_string();
        let transactions = group_by_category(vec![
            expense(1, &max, Some(1)),
            expense(2, &max, Some(1)),
            expense(3, &max, Some(1)),
            expense(4, &max, Some(2)),
        ]);

        let statistics = compute_category_statistics(&categories, &transactions);

        assert_eq!(statistics.overall_total, Amount::MAX * Decimal::from(4));
        assert_eq!(statistics.categories[0].percentage, 75.0);
        assert_eq!(statistics.categories[1].percentage, 25.0);
    }

    #[test]
    fn ignores_transactions_of_unlisted_categories() {
        let categories = [category(1, "Food")];
        let transactions = group_by_category(vec![
            expense(1, "5", Some(1)),
            expense(2, "95", Some(2)),
            expense(3, "20", None),
        ]);

        let statistics = compute_category_statistics(&categories, &transactions);

        assert_eq!(statistics.overall_total, decimal("5"));
        assert_eq!(statistics.categories[0].percentage, 100.0);
    }
}
