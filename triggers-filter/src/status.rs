//! PipelineRun status classifier

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use triggers_core::domain::pipeline_run::PipelineRun;

use crate::error::{FilterError, Result};

/// Timeout applied when the PipelineRun does not declare one
pub const DEFAULT_PIPELINE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Canonical status of a PipelineRun
///
/// The string forms are matched verbatim against Build triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineRunOutcome {
    Successful,
    Failed,
    Cancelled,
    TimedOut,
    Started,
}

impl PipelineRunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineRunOutcome::Successful => "Successful",
            PipelineRunOutcome::Failed => "Failed",
            PipelineRunOutcome::Cancelled => "Cancelled",
            PipelineRunOutcome::TimedOut => "TimedOut",
            PipelineRunOutcome::Started => "Started",
        }
    }
}

impl fmt::Display for PipelineRunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the run exceeded its timeout at `now`
///
/// A zero timeout disables the check, runs without start time never time out.
pub fn has_timed_out(now: DateTime<Utc>, pipeline_run: &PipelineRun) -> bool {
    let Some(start_time) = pipeline_run.status.start_time else {
        return false;
    };

    let timeout = pipeline_run
        .spec
        .timeout
        .unwrap_or(DEFAULT_PIPELINE_TIMEOUT);
    if timeout.is_zero() {
        return false;
    }

    // a start time in the future is treated as no time elapsed
    let elapsed = (now - start_time).to_std().unwrap_or(Duration::ZERO);
    elapsed > timeout
}

/// Parses the PipelineRun status fields into its canonical status
///
/// Branches are evaluated most specific first: a done run reports its outcome
/// even when also cancelled, and a timed out run reports `TimedOut` before
/// `Started`.
pub fn parse_pipeline_run_status(
    now: DateTime<Utc>,
    pipeline_run: &PipelineRun,
) -> Result<PipelineRunOutcome> {
    if pipeline_run.is_done() {
        if pipeline_run.is_succeeded() {
            return Ok(PipelineRunOutcome::Successful);
        }
        return Ok(PipelineRunOutcome::Failed);
    }

    if pipeline_run.is_cancelled() {
        return Ok(PipelineRunOutcome::Cancelled);
    }

    if has_timed_out(now, pipeline_run) {
        return Ok(PipelineRunOutcome::TimedOut);
    }

    if pipeline_run.has_started() {
        return Ok(PipelineRunOutcome::Started);
    }

    Err(FilterError::UnknownStatus(pipeline_run.namespaced_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use triggers_core::domain::pipeline_run::SPEC_STATUS_CANCELLED;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn pipeline_run() -> PipelineRun {
        PipelineRun::new("default", "pipeline", "pipeline")
    }

    #[test]
    fn test_succeeded() {
        let mut pr = pipeline_run();
        pr.mark_succeeded("Succeeded", "PipelineRun \"pipeline\" has succeeded");
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Successful
        );
    }

    #[test]
    fn test_failed() {
        let mut pr = pipeline_run();
        pr.mark_failed("Failed", "PipelineRun \"pipeline\" has failed");
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Failed
        );
    }

    #[test]
    fn test_cancelled() {
        let mut pr = pipeline_run();
        pr.spec.status = Some(SPEC_STATUS_CANCELLED.to_string());
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Cancelled
        );
    }

    #[test]
    fn test_done_takes_precedence_over_cancelled() {
        let mut pr = pipeline_run();
        pr.spec.status = Some(SPEC_STATUS_CANCELLED.to_string());
        pr.mark_failed("Failed", "cancelled and finished");
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Failed
        );
    }

    #[test]
    fn test_timed_out() {
        let mut pr = pipeline_run();
        pr.spec.timeout = Some(Duration::from_secs(1));
        pr.status.start_time = Some(Utc.with_ymd_and_hms(1982, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::TimedOut
        );
    }

    #[test]
    fn test_default_timeout_applies() {
        let mut pr = pipeline_run();
        pr.status.start_time = Some(now() - chrono::Duration::minutes(61));
        assert!(has_timed_out(now(), &pr));

        pr.status.start_time = Some(now() - chrono::Duration::minutes(59));
        assert!(!has_timed_out(now(), &pr));
    }

    #[test]
    fn test_zero_timeout_never_times_out() {
        let mut pr = pipeline_run();
        pr.spec.timeout = Some(Duration::ZERO);
        pr.status.start_time = Some(Utc.with_ymd_and_hms(1982, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Started
        );
    }

    #[test]
    fn test_started() {
        let mut pr = pipeline_run();
        pr.status.start_time = Some(now());
        assert_eq!(
            parse_pipeline_run_status(now(), &pr).unwrap(),
            PipelineRunOutcome::Started
        );
    }

    #[test]
    fn test_unknown_status() {
        let result = parse_pipeline_run_status(now(), &pipeline_run());
        match result {
            Err(FilterError::UnknownStatus(nn)) => assert_eq!(nn.to_string(), "default/pipeline"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_outcome_strings() {
        let all = [
            PipelineRunOutcome::Successful,
            PipelineRunOutcome::Failed,
            PipelineRunOutcome::Cancelled,
            PipelineRunOutcome::TimedOut,
            PipelineRunOutcome::Started,
        ];
        let strings: Vec<String> = all.iter().map(ToString::to_string).collect();
        assert_eq!(
            strings,
            vec!["Successful", "Failed", "Cancelled", "TimedOut", "Started"]
        );
    }
}
