//! No-show blocking policy

/// True when a customer with `count` recorded no-shows may no longer book
///
/// Blocking never expires on its own; only an explicit admin reset of the
/// counter re-enables booking.
pub fn is_blocked(count: i32, max_no_show_count: i32) -> bool {
    count >= max_no_show_count
}

#[cfg(test)]
mod tests {
    use super::is_blocked;

    #[test]
    fn blocks_at_threshold_and_above() {
        assert!(!is_blocked(0, 3));
        assert!(!is_blocked(2, 3));
        assert!(is_blocked(3, 3));
        assert!(is_blocked(7, 3));
    }

    #[test]
    fn reset_counter_unblocks() {
        assert!(is_blocked(3, 3));
        assert!(!is_blocked(0, 3));
    }
}
