use std::time::{Duration, SystemTime};
use chrono::{DateTime, Local};

pub fn format_datetime(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.4}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_renders_with_fixed_precision() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.5000s");
        assert_eq!(format_elapsed(Duration::ZERO), "0.0000s");
    }
}
