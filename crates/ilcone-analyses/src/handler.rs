use accurate::{sum::Klein, traits::*};
use ilcone_core::{AnalysisResults, Event, IlconeError, IlconeResult};
use log::{debug, error, info};

use crate::{
    analysis::{Analysis, RunInfo, RunStats},
    registry::get_analysis,
};

/// Drives a set of analyses through a run: every event is handed to every analysis, and the
/// analyses are finalised together once the run is over.
#[derive(Clone)]
pub struct AnalysisHandler {
    run: RunInfo,
    analyses: Vec<Box<dyn Analysis>>,
    vetoes: Vec<usize>,
    n_events: usize,
    sum_of_weights: Klein<f64>,
}

impl AnalysisHandler {
    pub fn new(run: RunInfo) -> Self {
        Self {
            run,
            analyses: Vec::default(),
            vetoes: Vec::default(),
            n_events: 0,
            sum_of_weights: Klein::zero(),
        }
    }

    pub fn run(&self) -> &RunInfo {
        &self.run
    }

    /// Initialise and add the registered analysis called `name`. Returns `false` when the
    /// analysis does not support this run (the reason is logged) and the run continues without
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`IlconeError::AnalysisNotFound`] if no analysis has that name, and any other
    /// error raised while the analysis books its histograms.
    pub fn add_analysis(&mut self, name: &str) -> IlconeResult<bool> {
        match get_analysis(name, &self.run) {
            Ok(analysis) => {
                self.push(analysis);
                Ok(true)
            }
            Err(err @ IlconeError::UnsupportedBeamEnergy { .. }) => {
                error!("{}, it will not be run", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Add several analyses by name, stopping at the first unknown name.
    pub fn add_analyses<I, S>(&mut self, names: I) -> IlconeResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for name in names {
            if self.add_analysis(name.as_ref())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Add an analysis which was constructed outside the registry.
    pub fn push(&mut self, analysis: Box<dyn Analysis>) {
        debug!("Adding analysis {}", analysis.name());
        self.analyses.push(analysis);
        self.vetoes.push(0);
    }

    /// The names of the active analyses, in the order they were added.
    pub fn analysis_names(&self) -> Vec<&str> {
        self.analyses.iter().map(|a| a.name()).collect()
    }

    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// The number of events vetoed so far by the analysis called `name`.
    pub fn n_vetoed(&self, name: &str) -> Option<usize> {
        self.analyses
            .iter()
            .position(|a| a.name() == name)
            .map(|i| self.vetoes[i])
    }

    /// Feed one event to every analysis.
    pub fn analyze(&mut self, event: &Event) {
        self.n_events += 1;
        self.sum_of_weights += event.weight;
        let n = self.n_events;
        for (analysis, vetoes) in self.analyses.iter_mut().zip(self.vetoes.iter_mut()) {
            if let Err(veto) = analysis.analyze(event) {
                *vetoes += 1;
                debug!("{}: event {} {}", analysis.name(), n, veto);
            }
        }
    }

    /// The totals of the run so far.
    pub fn stats(&self) -> RunStats {
        RunStats {
            n_events: self.n_events,
            sum_of_weights: self.sum_of_weights.sum(),
            cross_section: self.run.cross_section,
        }
    }

    /// Finalise copies of the analyses, leaving the running accumulators untouched so that
    /// more events can be added afterwards.
    pub fn snapshot(&self) -> AnalysisResults {
        self.clone().finalize()
    }

    /// Finalise every analysis and collect their histograms.
    pub fn finalize(mut self) -> AnalysisResults {
        let stats = self.stats();
        info!(
            "Finalising {} analyses after {} events (sum of weights = {})",
            self.analyses.len(),
            stats.n_events,
            stats.sum_of_weights
        );
        let mut results = AnalysisResults::new();
        for (analysis, vetoes) in self.analyses.iter_mut().zip(&self.vetoes) {
            debug!(
                "{}: {} of {} events vetoed",
                analysis.name(),
                vetoes,
                stats.n_events
            );
            analysis.finalize(&stats);
            results.extend(analysis.histograms());
        }
        results
    }
}
