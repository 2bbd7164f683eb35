//! Shared `Retry`/`Catch` resolution for `Task`, `Parallel`, and `Map`
//! states: given the error a core action threw, decide whether to retry
//! (with backoff/jitter), hand off to a catcher, or propagate the failure.

use crate::asl::state::{Catcher, JitterStrategy, Retrier};
use crate::error::TaskError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Retry(Duration),
    Catch { next: String, result_path: Option<String> },
    Propagate,
}

/// One slot per `retry` entry, tracking how many attempts that entry has
/// already consumed across a single state invocation.
#[must_use]
pub fn fresh_attempts(retry: &[Retrier]) -> Vec<u32> {
    vec![0; retry.len()]
}

pub fn choose_resolution(
    retry: &[Retrier],
    catch: &[Catcher],
    attempts: &mut [u32],
    err: &TaskError,
) -> Resolution {
    for (i, retrier) in retry.iter().enumerate() {
        if err.matches(&retrier.error_equals) && attempts[i] < retrier.max_attempts {
            let delay = compute_delay(retrier, attempts[i]);
            attempts[i] += 1;
            return Resolution::Retry(delay);
        }
    }
    for catcher in catch {
        if err.matches(&catcher.error_equals) {
            return Resolution::Catch {
                next: catcher.next.clone(),
                result_path: catcher.result_path.clone(),
            };
        }
    }
    Resolution::Propagate
}

fn compute_delay(retrier: &Retrier, attempt: u32) -> Duration {
    let base = retrier.interval_seconds as f64 * retrier.backoff_rate.powi(attempt as i32);
    let capped = match retrier.max_delay_seconds {
        Some(max) => base.min(max as f64),
        None => base,
    };
    let secs = match retrier.jitter_strategy {
        JitterStrategy::None => capped,
        JitterStrategy::Full => rand::random_range(0.0..=capped.max(0.0)),
    };
    Duration::from_secs_f64(secs.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::state::Catcher;

    fn retrier(error_equals: &[&str], max_attempts: u32) -> Retrier {
        Retrier {
            error_equals: error_equals.iter().map(|s| s.to_string()).collect(),
            interval_seconds: 1,
            max_attempts,
            backoff_rate: 2.0,
            max_delay_seconds: None,
            jitter_strategy: JitterStrategy::None,
        }
    }

    #[test]
    fn retries_while_attempts_remain_then_falls_through_to_catch() {
        let retry = vec![retrier(&["States.ALL"], 1)];
        let catch = vec![Catcher { error_equals: vec!["States.ALL".to_string()], next: "Cleanup".to_string(), result_path: None }];
        let mut attempts = fresh_attempts(&retry);
        let err = TaskError::new("States.TaskFailed", "boom");

        assert!(matches!(choose_resolution(&retry, &catch, &mut attempts, &err), Resolution::Retry(_)));
        assert_eq!(
            choose_resolution(&retry, &catch, &mut attempts, &err),
            Resolution::Catch { next: "Cleanup".to_string(), result_path: None }
        );
    }

    #[test]
    fn no_matching_retry_or_catch_propagates() {
        let retry = vec![retrier(&["Specific.Error"], 3)];
        let mut attempts = fresh_attempts(&retry);
        let err = TaskError::new("Other.Error", "boom");
        assert_eq!(choose_resolution(&retry, &[], &mut attempts, &err), Resolution::Propagate);
    }

    #[test]
    fn backoff_rate_scales_delay_across_attempts() {
        let retrier = Retrier {
            error_equals: vec!["States.ALL".to_string()],
            interval_seconds: 2,
            max_attempts: 5,
            backoff_rate: 2.0,
            max_delay_seconds: None,
            jitter_strategy: JitterStrategy::None,
        };
        assert_eq!(compute_delay(&retrier, 0), Duration::from_secs_f64(2.0));
        assert_eq!(compute_delay(&retrier, 2), Duration::from_secs_f64(8.0));
    }
}
