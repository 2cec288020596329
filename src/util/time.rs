/// Get the current time in seconds since the UNIX epoch
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get a timestamp in seconds since the UNIX epoch
pub fn timestamp_secs() -> u64 {
    current_time_secs() as u64
}

/// UTC wall-clock prefix for console lines, `HH:MM:SS`
pub fn clock_prefix() -> String {
    let secs = timestamp_secs() % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_prefix_shape() {
        let prefix = clock_prefix();
        assert_eq!(prefix.len(), 8);
        assert_eq!(prefix.matches(':').count(), 2);
        assert!(prefix[..2].parse::<u64>().unwrap() < 24);
    }
}
