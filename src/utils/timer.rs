use std::future::Future;
use std::time::{Duration, Instant};

/// `HH:MM:SS.ss`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let hh = (secs / 3600.0) as u64;
    let mm = ((secs % 3600.0) / 60.0) as u64;
    let ss = secs % 60.0;
    format!("{:02}:{:02}:{:05.2}", hh, mm, ss)
}

/// Awaits `fut` and logs its wall-clock duration under `label`.
pub async fn timed<F: Future>(label: &str, fut: F) -> F::Output {
    let start = Instant::now();
    let output = fut.await;
    tracing::info!("{} {}", label, format_elapsed(start.elapsed()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "00:00:01.50");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05.00");
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00.00");
    }

    #[tokio::test]
    async fn passes_output_through() {
        let value = timed("compute", async { 21 * 2 }).await;
        assert_eq!(value, 42);
    }
}
