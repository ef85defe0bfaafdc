use std::f64::consts::{FRAC_PI_2, PI};

use ilcone_core::{
    delta_phi, Event, FinalState, Histo1D, Histogram, IlconeResult, TotalVisibleMomentum,
};
use ilcone_jets::{ConeJets, ILConeConfig};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::{veto_if, Analysis, RunInfo, RunStats, Veto};

/// The registered name of [`D0DijetDecorrelation`].
pub const NAME: &str = "D0_2004_S5992206";

/// Cuts for the D0 Run II dijet azimuthal decorrelation measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct D0DijetConfig {
    /// The cone used to find the jets.
    pub cone: ILConeConfig,
    /// Calorimeter acceptance $`|\eta|`$ for the jet and missing-$`p_T`$ inputs.
    pub eta_max: f64,
    /// The second jet must be harder than this.
    pub second_jet_pt_min: f64,
    /// Both leading jets must have $`|y|`$ below this.
    pub jet_rapidity_max: f64,
    /// The visible missing $`p_T`$ must be below this fraction of the leading jet $`p_T`$.
    pub missing_pt_fraction: f64,
    /// Lower edges of the leading-jet $`p_T`$ ranges; the last range is open above.
    pub leading_pt_edges: [f64; 4],
    /// Bins of $`\Delta\phi`$ between $`\pi/2`$ and $`\pi`$.
    pub n_bins: usize,
}

impl Default for D0DijetConfig {
    fn default() -> Self {
        Self {
            cone: ILConeConfig::d0_run2(),
            eta_max: 3.0,
            second_jet_pt_min: 40.0,
            jet_rapidity_max: 0.5,
            missing_pt_fraction: 0.7,
            leading_pt_edges: [75.0, 100.0, 130.0, 180.0],
            n_bins: 20,
        }
    }
}

/// One $`\Delta\phi_\text{dijet}`$ distribution per leading-jet $`p_T`$ range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct D0DijetHistograms {
    pub azimuth: [Histo1D; 4],
}

impl D0DijetHistograms {
    fn book(config: &D0DijetConfig) -> IlconeResult<Self> {
        let book = |i: usize| {
            Histo1D::new(
                &format!("/{}/d{:02}-x02-y01", NAME, i + 1),
                config.n_bins,
                (FRAC_PI_2, PI),
            )
        };
        Ok(Self {
            azimuth: [book(0)?, book(1)?, book(2)?, book(3)?],
        })
    }
}

/// Dijet azimuthal decorrelation in $`p\bar{p}`$ collisions at $`\sqrt{s} = 1.96`$ TeV.
///
/// The two hardest D0 cone jets must both be central, the second must pass a $`p_T`$ cut and
/// the event must be well balanced. Their azimuthal separation is filled in the range of the
/// leading jet $`p_T`$, and every distribution is normalised to unit area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct D0DijetDecorrelation {
    config: D0DijetConfig,
    jets: ConeJets<FinalState>,
    calorimeter: TotalVisibleMomentum<FinalState>,
    histograms: D0DijetHistograms,
}

impl D0DijetDecorrelation {
    pub fn new(config: D0DijetConfig) -> IlconeResult<Self> {
        let fs = FinalState::new(-config.eta_max, config.eta_max, 0.0);
        Ok(Self {
            jets: ConeJets::new(fs, config.cone)?,
            calorimeter: TotalVisibleMomentum::new(fs),
            histograms: D0DijetHistograms::book(&config)?,
            config,
        })
    }
    /// The registry hook.
    pub fn init(_run: &RunInfo) -> IlconeResult<Box<dyn Analysis>> {
        Ok(Box::new(Self::new(D0DijetConfig::default())?))
    }
    pub fn config(&self) -> &D0DijetConfig {
        &self.config
    }
    pub fn results(&self) -> &D0DijetHistograms {
        &self.histograms
    }
    /// The leading-jet $`p_T`$ range `pt` falls in, ranges being open below and closed above.
    fn leading_pt_range(&self, pt: f64) -> Option<usize> {
        let edges = &self.config.leading_pt_edges;
        if pt <= edges[0] {
            return None;
        }
        Some(edges.partition_point(|&edge| edge < pt) - 1)
    }
}

impl Analysis for D0DijetDecorrelation {
    fn name(&self) -> &str {
        NAME
    }

    fn analyze(&mut self, event: &Event) -> Result<(), Veto> {
        let jets = self.jets.project(event);
        debug!("{}: jet multiplicity before any pT cut = {}", NAME, jets.len());
        veto_if(jets.len() < 2, "fewer than two jets")?;
        let (leading, second) = (&jets[0], &jets[1]);
        veto_if(
            second.pt() <= self.config.second_jet_pt_min,
            "second jet too soft",
        )?;
        veto_if(
            leading.rapidity().abs() >= self.config.jet_rapidity_max
                || second.rapidity().abs() >= self.config.jet_rapidity_max,
            "leading jets not central",
        )?;
        let missing_pt = self.calorimeter.missing_pt(event);
        debug!("{}: visible missing pT = {}", NAME, missing_pt);
        veto_if(
            missing_pt >= self.config.missing_pt_fraction * leading.pt(),
            "missing pT too large",
        )?;
        let dphi = delta_phi(leading.phi(), second.phi());
        if let Some(range) = self.leading_pt_range(leading.pt()) {
            self.histograms.azimuth[range].fill(dphi, event.weight);
        }
        Ok(())
    }

    fn finalize(&mut self, _stats: &RunStats) {
        for histogram in self.histograms.azimuth.iter_mut() {
            histogram.normalize(1.0);
        }
    }

    fn histograms(&self) -> Vec<Histogram> {
        self.histograms
            .azimuth
            .iter()
            .cloned()
            .map(Histogram::from)
            .collect()
    }
}
