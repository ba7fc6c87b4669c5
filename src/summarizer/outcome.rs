/// Result of one summary pipeline run. Failures are values, not errors:
/// the renderer turns every variant into visible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    PermissionDenied,
    Failed(String),
}

impl SummaryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SummaryOutcome::Summary(_) => "summary",
            SummaryOutcome::PermissionDenied => "permission_denied",
            SummaryOutcome::Failed(_) => "failed",
        }
    }
}

/// Maps a failure message onto an outcome.
pub fn classify_failure(message: impl Into<String>) -> SummaryOutcome {
    let message = message.into();
    if message.contains("403 Forbidden") {
        SummaryOutcome::PermissionDenied
    } else {
        SummaryOutcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_forbidden() {
        let outcome = classify_failure(
            "Error fetching from https://example.com: [403 Forbidden] Permission denied",
        );
        assert_eq!(outcome, SummaryOutcome::PermissionDenied);
    }

    #[test]
    fn test_classify_other_failures_keep_message() {
        assert_eq!(
            classify_failure("[500 Internal Server Error] boom"),
            SummaryOutcome::Failed("[500 Internal Server Error] boom".to_string())
        );
        // Status code alone is not enough.
        assert_eq!(
            classify_failure("status 403"),
            SummaryOutcome::Failed("status 403".to_string())
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(SummaryOutcome::Summary("x".into()).label(), "summary");
        assert_eq!(SummaryOutcome::PermissionDenied.label(), "permission_denied");
        assert_eq!(SummaryOutcome::Failed("x".into()).label(), "failed");
    }
}
