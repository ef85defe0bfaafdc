use ilcone_core::{Event, FinalStateProjection, IlconeResult, Vec4};
use serde::{Deserialize, Serialize};

use crate::{
    ilcone::{ILConeAlgorithm, ILConeConfig},
    jet::Jet,
};

/// Jets built by running the [`ILConeAlgorithm`] over a final state.
///
/// Final-state particles softer than `item_threshold` are left out of the clustering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConeJets<F> {
    fs: F,
    algorithm: ILConeAlgorithm,
    item_threshold: f64,
}

impl<F: FinalStateProjection> ConeJets<F> {
    /// Cluster `fs` with the given cone configuration.
    pub fn new(fs: F, config: ILConeConfig) -> IlconeResult<Self> {
        Ok(Self {
            fs,
            algorithm: ILConeAlgorithm::new(config)?,
            item_threshold: 0.0,
        })
    }
    /// Cluster `fs` with the D0 Run II cone at $`R = 0.7`$, using the
    /// [`ILConeConfig::d0_il_cone`] merge limit. Use [`ConeJets::new`] with
    /// [`ILConeConfig::d0_run2`] for the `D0RunIIconeJets` limit.
    pub fn d0_il_cone(fs: F) -> Self {
        Self {
            fs,
            algorithm: ILConeAlgorithm::d0_il_cone(),
            item_threshold: 0.0,
        }
    }
    pub fn with_item_threshold(mut self, item_threshold: f64) -> Self {
        self.item_threshold = item_threshold;
        self
    }
    pub fn algorithm(&self) -> &ILConeAlgorithm {
        &self.algorithm
    }
    pub fn final_state(&self) -> &F {
        &self.fs
    }
    /// The jets of `event`, hardest first. Constituent indices refer to the list returned by
    /// the final state's [`FinalStateProjection::momenta`].
    pub fn project(&self, event: &Event) -> Vec<Jet> {
        let items = self.fs.momenta(event);
        self.algorithm.cluster(&items, self.item_threshold)
    }
    /// The four-momenta of the jets of `event`, hardest first.
    pub fn project_momenta(&self, event: &Event) -> Vec<Vec4> {
        self.project(event).into_iter().map(|j| j.momentum).collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ilcone_core::{test_event, FinalState, VetoedFinalState};

    use super::*;

    #[test]
    fn test_d0_cone_jets_on_test_event() {
        let jets = ConeJets::d0_il_cone(FinalState::new(-4.2, 4.2, 0.0));
        let found = jets.project(&test_event());
        assert_eq!(found.len(), 5);
        let momenta = jets.project_momenta(&test_event());
        assert_eq!(momenta.len(), found.len());
        assert!(momenta[0].pt() > 95.0);
        assert!(momenta[1].pt() > 90.0);
        assert_relative_eq!(momenta[0].pt(), found[0].pt());
        assert_eq!(jets.algorithm().config().merge_max, 1000);
        let run2 =
            ConeJets::new(FinalState::new(-4.2, 4.2, 0.0), ILConeConfig::d0_run2()).unwrap();
        assert_eq!(run2.algorithm().config().merge_max, 10000);
        assert_eq!(run2.project(&test_event()), found);
    }

    #[test]
    fn test_thresholds_and_vetoes() {
        let fs = VetoedFinalState::new(FinalState::all()).veto_neutrinos();
        let jets = ConeJets::new(fs, ILConeConfig::d0_run2_with(0.7, 6.0, 0.5))
            .unwrap()
            .with_item_threshold(1.0);
        let found = jets.project(&test_event());
        assert_eq!(found.len(), 2);
        assert!(ConeJets::new(FinalState::all(), ILConeConfig::d0_run2().with_cone_radius(-1.0))
            .is_err());
    }
}
