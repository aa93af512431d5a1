pub mod types;

pub use types::*;

/// Format a millisecond duration as `MM:SS` for progress lines.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_and_whole_minutes() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(180_000), "03:00");
    }

    #[test]
    fn truncates_sub_second_remainders() {
        assert_eq!(format_duration(61_999), "01:01");
        assert_eq!(format_duration(3_599_000), "59:59");
    }
}
