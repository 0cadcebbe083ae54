//! API handlers and the small helpers they share.

pub mod analytics;
pub mod auth;
pub mod contact;
pub mod events;
pub mod health;
pub mod inquiries;
pub mod pages;
pub mod root;
pub mod stats;

/// Trim an optional text field, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  Oslo ".to_string())).as_deref(), Some("Oslo"));
        assert_eq!(non_blank(Some(" \t ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
