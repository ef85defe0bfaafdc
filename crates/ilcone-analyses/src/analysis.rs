use std::fmt::Display;

use dyn_clone::DynClone;
use ilcone_core::{Beam, Event, Histogram};
use serde::{Deserialize, Serialize};

/// What is known about a run before any event is seen.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// The centre-of-mass energy in GeV.
    pub sqrt_s: f64,
    /// The generator cross-section in pb, if one was provided.
    pub cross_section: Option<f64>,
}

impl RunInfo {
    pub fn new(sqrt_s: f64) -> Self {
        Self {
            sqrt_s,
            cross_section: None,
        }
    }
    pub fn with_cross_section(mut self, cross_section: f64) -> Self {
        self.cross_section = Some(cross_section);
        self
    }
    /// Read the centre-of-mass energy off the beams of `event`.
    pub fn from_event(event: &Event) -> Option<Self> {
        Beam::sqrt_s(event).map(Self::new)
    }
}

/// Totals over a finished run, handed to [`Analysis::finalize`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub n_events: usize,
    pub sum_of_weights: f64,
    pub cross_section: Option<f64>,
}

impl RunStats {
    /// The cross-section per unit of event weight, used to turn weighted counts into pb.
    pub fn cross_section_per_weight(&self) -> Option<f64> {
        match self.cross_section {
            Some(xs) if self.sum_of_weights != 0.0 => Some(xs / self.sum_of_weights),
            _ => None,
        }
    }
}

/// An event which failed a selection. The rest of the event is skipped by the analysis which
/// returned it; other analyses are unaffected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Veto {
    pub reason: String,
}

impl Veto {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for Veto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vetoed: {}", self.reason)
    }
}

/// Veto the current event when `condition` holds.
///
/// ```
/// use ilcone_analyses::veto_if;
///
/// let n_jets = 1;
/// assert!(veto_if(n_jets < 2, "fewer than two jets").is_err());
/// assert!(veto_if(n_jets < 1, "no jets").is_ok());
/// ```
pub fn veto_if(condition: bool, reason: &str) -> Result<(), Veto> {
    if condition {
        Err(Veto::new(reason))
    } else {
        Ok(())
    }
}

/// The interface every registered analysis implements.
///
/// An analysis is created (with its projections declared and its histograms booked) by the
/// `init` function of its [`AnalysisEntry`](crate::AnalysisEntry), sees every event once through
/// [`analyze`](Analysis::analyze), and rescales its histograms in
/// [`finalize`](Analysis::finalize). Analyses are [`Clone`] so that a handler can produce
/// intermediate results without disturbing the running accumulators.
pub trait Analysis: DynClone + Send + Sync {
    /// The registered name, which also prefixes every histogram path.
    fn name(&self) -> &str;
    /// Apply the selection to a single event and fill histograms.
    fn analyze(&mut self, event: &Event) -> Result<(), Veto>;
    /// Normalise or scale the histograms once all events have been seen.
    fn finalize(&mut self, stats: &RunStats);
    /// The booked histograms, in booking order.
    fn histograms(&self) -> Vec<Histogram>;
}

dyn_clone::clone_trait_object!(Analysis);
