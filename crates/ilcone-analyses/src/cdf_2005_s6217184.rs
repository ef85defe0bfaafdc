use ilcone_core::{
    data::MUON, Event, FinalState, FinalStateProjection, Histogram, IlconeResult, Profile1D,
    Vec4, VetoedFinalState,
};
use ilcone_jets::{ConeJets, ILConeConfig, JetShape, JetShapeConfig};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::{veto_if, Analysis, RunInfo, RunStats, Veto};

/// The registered name of [`CDFJetShapes`].
pub const NAME: &str = "CDF_2005_S6217184";

/// Edges of the jet $`p_T`$ bins in GeV.
pub const PT_BINS: [f64; 19] = [
    37.0, 45.0, 55.0, 63.0, 73.0, 84.0, 97.0, 112.0, 128.0, 148.0, 166.0, 186.0, 208.0, 229.0,
    250.0, 277.0, 304.0, 340.0, 380.0,
];

/// Cuts and binning for the CDF Run II jet-shape measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CDFJetShapesConfig {
    pub cone: ILConeConfig,
    /// Final-state acceptance in $`|\eta|`$.
    pub eta_max: f64,
    /// Muons harder than this are left out of the shapes (neutrinos always are).
    pub muon_veto_pt: f64,
    /// Allowed $`|y|`$ of a jet axis, open at both ends.
    pub axis_rapidity: (f64, f64),
    pub shape: JetShapeConfig,
}

impl Default for CDFJetShapesConfig {
    fn default() -> Self {
        Self {
            cone: ILConeConfig::d0_run2(),
            eta_max: 2.0,
            muon_veto_pt: 1.0,
            axis_rapidity: (0.1, 0.7),
            shape: JetShapeConfig::new(0.0, 0.7, 0.1, 0.3),
        }
    }
}

/// $`\rho(r/R)`$ and $`\Psi(r/R)`$ profiles for each of the 18 jet $`p_T`$ bins, and
/// $`\Psi(0.3/R)`$ against jet $`p_T`$.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CDFJetShapesHistograms {
    pub rho: Vec<Profile1D>,
    pub psi: Vec<Profile1D>,
    pub psi_vs_pt: Profile1D,
}

impl CDFJetShapesHistograms {
    fn book(config: &CDFJetShapesConfig, n_shape_bins: usize) -> IlconeResult<Self> {
        let radius = config.cone.cone_radius;
        let JetShapeConfig {
            r_min,
            r_max,
            interval,
            ..
        } = config.shape;
        let (lo, hi) = (r_min / radius, r_max / radius);
        let half = 0.5 * interval / radius;
        let n_pt = PT_BINS.len() - 1;
        let mut rho = Vec::with_capacity(n_pt);
        let mut psi = Vec::with_capacity(n_pt);
        for k in 0..n_pt {
            let (i, j) = (k / 3, k % 3);
            rho.push(Profile1D::new(
                &format!("/{}/d{:02}-x01-y{:02}", NAME, i + 1, j + 1),
                n_shape_bins,
                (lo, hi),
            )?);
            // centred on the outer edge of each radial bin
            psi.push(Profile1D::new(
                &format!("/{}/d{:02}-x01-y{:02}", NAME, i + 7, j + 1),
                n_shape_bins,
                (lo + half, hi + half),
            )?);
        }
        let psi_vs_pt = Profile1D::from_edges(&format!("/{}/d13-x01-y01", NAME), PT_BINS.to_vec())?;
        Ok(Self {
            rho,
            psi,
            psi_vs_pt,
        })
    }
}

/// Jet shapes in inclusive jet production in $`p\bar{p}`$ collisions at
/// $`\sqrt{s} = 1.96`$ TeV, for central jets between 37 and 380 GeV.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CDFJetShapes {
    config: CDFJetShapesConfig,
    jets: ConeJets<FinalState>,
    shape_fs: VetoedFinalState,
    shape: JetShape,
    histograms: CDFJetShapesHistograms,
}

impl CDFJetShapes {
    pub fn new(config: CDFJetShapesConfig) -> IlconeResult<Self> {
        let fs = FinalState::new(-config.eta_max, config.eta_max, 0.0);
        let shape = JetShape::new(config.shape)?;
        Ok(Self {
            jets: ConeJets::new(fs, config.cone)?,
            shape_fs: VetoedFinalState::new(fs)
                .veto_neutrinos()
                .add_veto_detail(MUON, config.muon_veto_pt, f64::MAX),
            histograms: CDFJetShapesHistograms::book(&config, shape.n_bins())?,
            shape,
            config,
        })
    }
    /// The registry hook.
    pub fn init(_run: &RunInfo) -> IlconeResult<Box<dyn Analysis>> {
        Ok(Box::new(Self::new(CDFJetShapesConfig::default())?))
    }
    pub fn config(&self) -> &CDFJetShapesConfig {
        &self.config
    }
    pub fn results(&self) -> &CDFJetShapesHistograms {
        &self.histograms
    }
    fn is_axis(&self, jet: &Vec4) -> bool {
        let pt = jet.pt();
        let y = jet.rapidity().abs();
        let (y_lo, y_hi) = self.config.axis_rapidity;
        pt > PT_BINS[0] && pt <= PT_BINS[PT_BINS.len() - 1] && y > y_lo && y < y_hi
    }
}

/// The index of the $`p_T`$ bin, open below and closed above, holding `pt`.
fn pt_bin(pt: f64) -> Option<usize> {
    PT_BINS
        .windows(2)
        .position(|edges| pt > edges[0] && pt <= edges[1])
}

impl Analysis for CDFJetShapes {
    fn name(&self) -> &str {
        NAME
    }

    fn analyze(&mut self, event: &Event) -> Result<(), Veto> {
        let jets = self.jets.project_momenta(event);
        debug!("{}: jet multiplicity before cuts = {}", NAME, jets.len());
        let axes: Vec<Vec4> = jets.into_iter().filter(|j| self.is_axis(j)).collect();
        veto_if(axes.is_empty(), "no jet axes")?;

        let shapes = self
            .shape
            .compute(&self.shape_fs.particles(event), &axes);
        let radius = self.config.cone.cone_radius;
        let weight = event.weight;
        for (jet, axis) in axes.iter().enumerate() {
            let Some(k) = pt_bin(axis.pt()) else {
                continue;
            };
            for bin in 0..shapes.n_bins() {
                self.histograms.rho[k].fill(
                    shapes.bin_centre(bin) / radius,
                    radius * shapes.diff(jet, bin),
                    weight,
                );
                self.histograms.psi[k].fill(
                    shapes.bin_upper(bin) / radius,
                    shapes.int(jet, bin),
                    weight,
                );
            }
            let pt_centre = 0.5 * (PT_BINS[k] + PT_BINS[k + 1]);
            self.histograms
                .psi_vs_pt
                .fill(pt_centre, shapes.psi(jet), weight);
        }
        Ok(())
    }

    fn finalize(&mut self, _stats: &RunStats) {}

    fn histograms(&self) -> Vec<Histogram> {
        self.histograms
            .rho
            .iter()
            .chain(self.histograms.psi.iter())
            .chain(std::iter::once(&self.histograms.psi_vs_pt))
            .cloned()
            .map(Histogram::from)
            .collect()
    }
}
