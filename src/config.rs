//! Options of a single solve.
//!
//! A [SolveConfig] is a plain value: it is passed to every call to
//! [Model::solve](crate::Model::solve) and never stored in the model,
//! so two solves of the same model with the same configuration behave the same.
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::tolerance::ToleranceContext;

/// An error when setting the relative MIP gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipGapError {
    /// The gap was negative (this includes `-0.0`)
    Negative,
    /// The gap was infinite
    Infinite,
}

impl Display for MipGapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MipGapError::Negative => write!(f, "The MIP gap cannot be negative"),
            MipGapError::Infinite => write!(f, "The MIP gap cannot be infinite"),
        }
    }
}

impl std::error::Error for MipGapError {}

/// An error when setting the time budgets of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLimitError {
    /// The abort deadline would elapse before the sufficiency deadline
    AbortBeforeSufficiency {
        /// requested sufficiency budget
        suffice: Duration,
        /// requested abort budget
        abort: Duration,
    },
}

impl Display for TimeLimitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeLimitError::AbortBeforeSufficiency { suffice, abort } => write!(
                f,
                "The abort time ({:?}) must not be shorter than the sufficiency time ({:?})",
                abort, suffice
            ),
        }
    }
}

impl std::error::Error for TimeLimitError {}

/// Immutable solve options.
///
/// ```
/// use std::time::Duration;
/// use mip_lp::SolveConfig;
///
/// let config = SolveConfig::default()
///     .with_mip_gap(0.01)?
///     .with_threads(4);
/// assert_eq!(config.mip_gap(), Some(0.01));
/// assert!(!config.relax());
/// # Ok::<_, mip_lp::MipGapError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolveConfig {
    relax: bool,
    time_suffice: Option<Duration>,
    time_abort: Option<Duration>,
    mip_gap: Option<f32>,
    feasibility: ToleranceContext,
    integrality: ToleranceContext,
    node_limit: Option<u64>,
    iteration_limit: usize,
    threads: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig {
            relax: false,
            time_suffice: None,
            time_abort: None,
            mip_gap: None,
            feasibility: ToleranceContext::new(12, 9),
            integrality: ToleranceContext::new(12, 6),
            node_limit: None,
            iteration_limit: 50_000,
            threads: 1,
        }
    }
}

impl SolveConfig {
    /// Treat integer and binary variables as continuous
    pub fn relaxed(self) -> Self {
        self.with_relaxation(true)
    }

    /// Enable or disable the relaxation of integrality
    pub fn with_relaxation(mut self, relax: bool) -> Self {
        self.relax = relax;
        self
    }

    /// Set both time budgets.
    /// After `suffice` the search stops as soon as it has a solution,
    /// after `abort` it stops unconditionally.
    pub fn with_time_limits(
        mut self,
        suffice: Duration,
        abort: Duration,
    ) -> Result<Self, TimeLimitError> {
        if abort < suffice {
            return Err(TimeLimitError::AbortBeforeSufficiency { suffice, abort });
        }
        self.time_suffice = Some(suffice);
        self.time_abort = Some(abort);
        Ok(self)
    }

    /// Set only the hard time limit
    pub fn with_time_abort(mut self, abort: Duration) -> Self {
        self.time_abort = Some(abort);
        if matches!(self.time_suffice, Some(suffice) if suffice > abort) {
            self.time_suffice = Some(abort);
        }
        self
    }

    /// Set the relative MIP gap: a node is pruned when its bound cannot improve
    /// the incumbent by more than this fraction.
    pub fn with_mip_gap(mut self, mip_gap: f32) -> Result<Self, MipGapError> {
        if mip_gap.is_sign_negative() {
            Err(MipGapError::Negative)
        } else if mip_gap.is_infinite() {
            Err(MipGapError::Infinite)
        } else {
            self.mip_gap = Some(mip_gap);
            Ok(self)
        }
    }

    /// Tolerance used for primal feasibility inside the relaxation solver
    pub fn with_feasibility(mut self, context: ToleranceContext) -> Self {
        self.feasibility = context;
        self
    }

    /// Tolerance used to decide whether a value is integral
    pub fn with_integrality(mut self, context: ToleranceContext) -> Self {
        self.integrality = context;
        self
    }

    /// Stop after exploring this many nodes
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Maximum number of simplex pivots per relaxation
    pub fn with_iteration_limit(mut self, iterations: usize) -> Self {
        self.iteration_limit = iterations;
        self
    }

    /// Number of node relaxations solved concurrently. `0` is treated as `1`.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Whether integrality is relaxed
    pub fn relax(&self) -> bool {
        self.relax
    }

    /// The sufficiency time budget
    pub fn time_suffice(&self) -> Option<Duration> {
        self.time_suffice
    }

    /// The abort time budget
    pub fn time_abort(&self) -> Option<Duration> {
        self.time_abort
    }

    /// The relative MIP gap, if any
    pub fn mip_gap(&self) -> Option<f32> {
        self.mip_gap
    }

    /// Feasibility tolerance
    pub fn feasibility(&self) -> &ToleranceContext {
        &self.feasibility
    }

    /// Integrality tolerance
    pub fn integrality(&self) -> &ToleranceContext {
        &self.integrality
    }

    /// The node limit, if any
    pub fn node_limit(&self) -> Option<u64> {
        self.node_limit
    }

    /// The simplex iteration limit
    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }

    /// The number of threads
    pub fn threads(&self) -> usize {
        self.threads
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{MipGapError, SolveConfig, TimeLimitError};

    #[test]
    fn mipgap_default() {
        assert_eq!(SolveConfig::default().mip_gap(), None);
    }

    #[test]
    fn mipgap_pos_zero() {
        let config = SolveConfig::default().with_mip_gap(0.0).unwrap();
        assert_eq!(config.mip_gap(), Some(0.0));
    }

    #[test]
    fn mipgap_neg_zero() {
        assert_eq!(
            SolveConfig::default().with_mip_gap(-0.0),
            Err(MipGapError::Negative)
        );
    }

    #[test]
    fn mipgap_infinities() {
        assert_eq!(
            SolveConfig::default().with_mip_gap(f32::INFINITY),
            Err(MipGapError::Infinite)
        );
        assert_eq!(
            SolveConfig::default().with_mip_gap(f32::NEG_INFINITY),
            Err(MipGapError::Negative)
        );
    }

    #[test]
    fn abort_must_follow_sufficiency() {
        let err = SolveConfig::default()
            .with_time_limits(Duration::from_secs(10), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, TimeLimitError::AbortBeforeSufficiency { .. }));
        let config = SolveConfig::default()
            .with_time_limits(Duration::from_secs(4), Duration::from_secs(8))
            .unwrap();
        assert_eq!(config.time_suffice(), Some(Duration::from_secs(4)));
        assert_eq!(config.time_abort(), Some(Duration::from_secs(8)));
    }

    #[test]
    fn abort_alone_caps_sufficiency() {
        let config = SolveConfig::default()
            .with_time_limits(Duration::from_secs(4), Duration::from_secs(8))
            .unwrap()
            .with_time_abort(Duration::from_secs(2));
        assert_eq!(config.time_suffice(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn zero_threads_means_one() {
        assert_eq!(SolveConfig::default().with_threads(0).threads(), 1);
    }
}
