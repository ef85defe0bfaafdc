use ilcone_core::{IlconeError, IlconeResult};

use crate::{
    analysis::{Analysis, RunInfo},
    cdf_2005_s6217184::{self, CDFJetShapes},
    d0_2004_s5992206::{self, D0DijetDecorrelation},
    jade_1984_i202784::{self, JADEEnergyCorrelation},
};

/// A registered analysis: its name, a one-line summary, and the function which declares its
/// projections and books its histograms for a given run.
#[derive(Copy, Clone)]
pub struct AnalysisEntry {
    pub name: &'static str,
    pub summary: &'static str,
    pub init: fn(&RunInfo) -> IlconeResult<Box<dyn Analysis>>,
}

impl std::fmt::Debug for AnalysisEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEntry")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish()
    }
}

/// Every analysis which can be run by name.
pub static ANALYSES: &[AnalysisEntry] = &[
    AnalysisEntry {
        name: d0_2004_s5992206::NAME,
        summary: "D0 Run II dijet azimuthal decorrelation",
        init: D0DijetDecorrelation::init,
    },
    AnalysisEntry {
        name: cdf_2005_s6217184::NAME,
        summary: "CDF Run II jet shapes",
        init: CDFJetShapes::init,
    },
    AnalysisEntry {
        name: jade_1984_i202784::NAME,
        summary: "JADE energy-energy correlation at 14, 22 and 34 GeV",
        init: JADEEnergyCorrelation::init,
    },
];

/// The names of all registered analyses, in registration order.
pub fn available_analyses() -> Vec<&'static str> {
    ANALYSES.iter().map(|entry| entry.name).collect()
}

/// Look up the registry entry called `name`.
pub fn find_analysis(name: &str) -> IlconeResult<&'static AnalysisEntry> {
    ANALYSES
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| IlconeError::AnalysisNotFound {
            name: name.to_string(),
        })
}

/// Create the analysis called `name` for the given run.
///
/// # Errors
///
/// Returns [`IlconeError::AnalysisNotFound`] for an unregistered name, or whatever error the
/// analysis raises while booking (for instance [`IlconeError::UnsupportedBeamEnergy`]).
pub fn get_analysis(name: &str, run: &RunInfo) -> IlconeResult<Box<dyn Analysis>> {
    (find_analysis(name)?.init)(run)
}
