use std::f64::consts::PI;

use ilcone_core::{
    fuzzy_equals, Event, FinalState, FinalStateProjection, Histo1D, Histogram, IlconeError,
    IlconeResult,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{veto_if, Analysis, RunInfo, RunStats, Veto};

/// The registered name of [`JADEEnergyCorrelation`].
pub const NAME: &str = "JADE_1984_I202784";

/// The centre-of-mass energies (GeV) with a measurement, in histogram order.
pub const ENERGIES: [f64; 3] = [14.0, 22.0, 34.0];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JADEConfig {
    /// Events with fewer final-state particles are treated as leptonic and vetoed.
    pub min_particles: usize,
    /// Bins of the EEC between 0 and 180 degrees.
    pub n_eec_bins: usize,
    /// Bins of the asymmetry between 0 and 90 degrees.
    pub n_aeec_bins: usize,
}

impl Default for JADEConfig {
    fn default() -> Self {
        Self {
            min_particles: 2,
            n_eec_bins: 50,
            n_aeec_bins: 25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JADEHistograms {
    pub eec: Histo1D,
    pub aeec: Histo1D,
}

/// The energy-energy correlation in $`e^+e^-`$ annihilation at 14, 22 and 34 GeV.
///
/// Every ordered pair of final-state particles (including a particle with itself) contributes
/// $`E_iE_j/E_\text{vis}^2`$ at their opening angle $`\chi_{ij}`$ in degrees. The asymmetry
/// $`\text{AEEC}(\chi) = \text{EEC}(180^\circ - \chi) - \text{EEC}(\chi)`$ is filled on
/// $`[0^\circ, 90^\circ)`$.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JADEEnergyCorrelation {
    config: JADEConfig,
    fs: FinalState,
    weight_sum: f64,
    histograms: JADEHistograms,
}

impl JADEEnergyCorrelation {
    /// Book the histograms for the measurement at `sqrt_s`.
    pub fn new(config: JADEConfig, sqrt_s: f64) -> IlconeResult<Self> {
        let Some(index) = ENERGIES
            .iter()
            .position(|&e| fuzzy_equals(sqrt_s, e, 1e-3))
        else {
            return Err(IlconeError::UnsupportedBeamEnergy {
                analysis: NAME.to_string(),
                sqrt_s,
            });
        };
        let histograms = JADEHistograms {
            eec: Histo1D::new(
                &format!("/{}/d01-x01-y{:02}", NAME, index + 1),
                config.n_eec_bins,
                (0.0, 180.0),
            )?,
            aeec: Histo1D::new(
                &format!("/{}/d02-x01-y{:02}", NAME, index + 1),
                config.n_aeec_bins,
                (0.0, 90.0),
            )?,
        };
        Ok(Self {
            config,
            fs: FinalState::all(),
            weight_sum: 0.0,
            histograms,
        })
    }
    /// The registry hook.
    pub fn init(run: &RunInfo) -> IlconeResult<Box<dyn Analysis>> {
        Ok(Box::new(Self::new(JADEConfig::default(), run.sqrt_s)?))
    }
    pub fn config(&self) -> &JADEConfig {
        &self.config
    }
    pub fn results(&self) -> &JADEHistograms {
        &self.histograms
    }
    /// The summed weight of the events which passed the selection.
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }
}

impl Analysis for JADEEnergyCorrelation {
    fn name(&self) -> &str {
        NAME
    }

    fn analyze(&mut self, event: &Event) -> Result<(), Veto> {
        let particles = self.fs.particles(event);
        veto_if(
            particles.len() < self.config.min_particles,
            "failed leptonic event cut",
        )?;
        debug!("{}: passed leptonic event cut", NAME);
        let weight = event.weight;
        self.weight_sum += weight;

        let e_vis: f64 = particles.iter().map(|p| p.momentum.e()).sum();
        let e_vis2 = e_vis * e_vis;
        for (i, p_i) in particles.iter().enumerate() {
            for (j, p_j) in particles.iter().enumerate().skip(i) {
                let chi = p_i
                    .momentum
                    .vec3()
                    .angle(&p_j.momentum.vec3())
                    .to_degrees();
                let mut eec = p_i.momentum.e() * p_j.momentum.e() / e_vis2;
                if i != j {
                    eec *= 2.0;
                }
                self.histograms.eec.fill(chi, eec * weight);
                if chi < 90.0 {
                    self.histograms.aeec.fill(chi, -eec * weight);
                } else {
                    self.histograms.aeec.fill(180.0 - chi, eec * weight);
                }
            }
        }
        Ok(())
    }

    fn finalize(&mut self, _stats: &RunStats) {
        if self.weight_sum == 0.0 {
            warn!("{}: no events passed the selection, skipping scaling", NAME);
            return;
        }
        let factor = 180.0 / PI / self.weight_sum * 1000.0;
        self.histograms.eec.scale(factor);
        self.histograms.aeec.scale(factor);
    }

    fn histograms(&self) -> Vec<Histogram> {
        vec![
            self.histograms.eec.clone().into(),
            self.histograms.aeec.clone().into(),
        ]
    }
}
