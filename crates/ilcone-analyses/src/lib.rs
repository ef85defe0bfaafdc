//! # ilcone-analyses
//!
//! This is an internal crate used by `ilcone`. It contains the [`Analysis`] lifecycle, the
//! static registry of analyses, the [`AnalysisHandler`] which runs them over a stream of events,
//! and the analyses themselves.
#![warn(clippy::perf, clippy::style)]

/// The [`Analysis`] trait and the run information handed to it.
pub mod analysis;
/// Running many analyses over one event stream.
pub mod handler;
/// Lookup of analyses by name.
pub mod registry;

/// CDF Run II jet shapes.
pub mod cdf_2005_s6217184;
/// D0 Run II dijet azimuthal decorrelation.
pub mod d0_2004_s5992206;
/// JADE energy-energy correlation.
pub mod jade_1984_i202784;

pub use analysis::{veto_if, Analysis, RunInfo, RunStats, Veto};
pub use cdf_2005_s6217184::{CDFJetShapes, CDFJetShapesConfig};
pub use d0_2004_s5992206::{D0DijetConfig, D0DijetDecorrelation};
pub use handler::AnalysisHandler;
pub use jade_1984_i202784::{JADEConfig, JADEEnergyCorrelation};
pub use registry::{available_analyses, find_analysis, get_analysis, AnalysisEntry, ANALYSES};
