//! Harness-wide configuration: step limits, the cooperative wait cap, and
//! the base path mock data files resolve against.

use std::path::PathBuf;
use std::time::Duration;

/// Tunables for a [`crate::machine_executor::StateMachineExecutor`] run.
///
/// `Default` matches the fixed constants the distilled interpreter hardcodes
/// (100 sub-execution steps, a 100ms wait cap); a library caller may relax
/// them without changing interpreter semantics.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Step budget for a top-level `StateMachineExecutor::run`.
    pub step_limit_top: u32,
    /// Step budget for a nested Map iteration / Parallel branch sub-run.
    pub step_limit_sub: u32,
    /// Upper bound on any cooperative sleep (`Wait` state, mock `delay`).
    pub wait_cap: Duration,
    /// Base directory external mock data file paths resolve against when
    /// they are neither absolute nor `./`/`../`-relative.
    pub mock_base_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            step_limit_top: 1_000,
            step_limit_sub: 100,
            wait_cap: Duration::from_millis(100),
            mock_base_path: None,
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn with_mock_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mock_base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_wait_cap(mut self, cap: Duration) -> Self {
        self.wait_cap = cap;
        self
    }
}
