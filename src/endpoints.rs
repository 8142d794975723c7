//! The API endpoints URIs.
//!
//! For endpoints that take parameters, e.g., '/api/users/{user_id}/categories', use
//! [format_endpoint].

/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to list and create a user's categories.
pub const CATEGORIES: &str = "/api/users/{user_id}/categories";
/// The route to give a user the default categories.
pub const DEFAULT_CATEGORIES: &str = "/api/users/{user_id}/categories/defaults";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/users/{user_id}/categories/{category_id}";
/// The route to list and create a user's transactions.
pub const TRANSACTIONS: &str = "/api/users/{user_id}/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/users/{user_id}/transactions/{transaction_id}";
/// The route for a user's full report.
pub const REPORT: &str = "/api/users/{user_id}/reports";
/// The route for a user's income and expense summary.
pub const SUMMARY_REPORT: &str = "/api/users/{user_id}/reports/summary";
/// The route for a user's per-category statistics.
pub const CATEGORY_REPORT: &str = "/api/users/{user_id}/reports/categories";

/// Replace the parameters in `endpoint_path` with `ids`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters.
/// Parameters without a matching ID are left as they are, and extra IDs are ignored.
pub fn format_endpoint(endpoint_path: &str, ids: &[i64]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut ids = ids.iter();
    let mut rest = endpoint_path;

    while let Some(param_start) = rest.find('{') {
        let Some(param_len) = rest[param_start..].find('}') else {
            break;
        };
        let param_end = param_start + param_len + 1;

        formatted.push_str(&rest[..param_start]);
        match ids.next() {
            Some(id) => formatted.push_str(&id.to_string()),
            None => formatted.push_str(&rest[param_start..param_end]),
        }
        rest = &rest[param_end..];
    }

    formatted.push_str(rest);
    formatted
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CATEGORIES, &[1]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::DEFAULT_CATEGORIES, &[1]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CATEGORY, &[1, 2]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTIONS, &[1]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, &[1, 2]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::REPORT, &[1]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::SUMMARY_REPORT, &[1]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CATEGORY_REPORT, &[1]));
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", &[1]);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", &[1]);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", &[1]);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", &[1]);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn replaces_parameters_in_order() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, &[3, 14]);

        assert_eq!(formatted_path, "/api/users/3/transactions/14");
    }

    #[test]
    fn keeps_parameters_without_ids() {
        let formatted_path = format_endpoint(endpoints::CATEGORY, &[3]);

        assert_eq!(formatted_path, "/api/users/3/categories/{category_id}");
    }
}
