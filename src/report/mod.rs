//! Reports: income and expense summaries and per-category breakdowns.
//!
//! The calculations are pure functions over slices of transactions, the report builders read
//! from a [LedgerStore](crate::store::LedgerStore) and run them.

mod aggregation;
mod endpoints;
mod facade;

pub use aggregation::{
    CategoryStatistic, CategoryStatistics, Summary, compute_category_statistics,
    compute_summary, group_by_category,
};
pub use endpoints::{get_category_statistics_endpoint, get_report_endpoint, get_summary_endpoint};
pub use facade::{Report, ReportQuery, build_report, get_category_statistics, get_summary};
