use crate::history::History;

/// Exact match on the `category:external_id` key
pub fn is_duplicate(key: &str, history: &History) -> bool {
    history.contains(key)
}
