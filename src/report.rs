use tracing::warn;

use crate::fetcher::FeedError;

/// Sink for per-feed failures. Reporting cannot fail the aggregation.
pub trait FeedErrorReporter: Send + Sync {
    fn report_feed_error(&self, source_id: &str, error: &FeedError);
}

/// Logs every feed failure as a `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FeedErrorReporter for TracingReporter {
    fn report_feed_error(&self, source_id: &str, error: &FeedError) {
        warn!(
            source = source_id,
            kind = error.kind().as_str(),
            "Failed to fetch feed '{}': {}",
            source_id,
            error
        );
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingReporter;
    use super::*;
    use crate::fetcher::FeedErrorKind;
    use std::time::Duration;

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.report_feed_error("ndtv", &FeedError::Timeout(Duration::from_secs(1)));
    }

    #[test]
    fn test_recording_reporter_keeps_kind() {
        let reporter = RecordingReporter::default();
        reporter.report_feed_error("ndtv", &FeedError::Timeout(Duration::from_secs(1)));
        assert_eq!(
            reporter.reported(),
            vec![("ndtv".to_string(), FeedErrorKind::Unavailable)]
        );
    }
}
