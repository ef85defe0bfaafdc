//! `ilcone` is a library for finding jets with the D0 Run II "improved legacy" cone algorithm,
//! measuring jet shapes, and running small collider analyses over streams of events. It is split
//! into three internal crates (`ilcone-core`, `ilcone-jets` and `ilcone-analyses`) which are
//! re-exported here.
//!
//! # Table of Contents
//! - [Key Features](#key-features)
//! - [Quick Start](#quick-start)
//!   - [Finding Jets](#finding-jets)
//!   - [Measuring Jet Shapes](#measuring-jet-shapes)
//!   - [Running Analyses](#running-analyses)
//! - [Writing a New Analysis](#writing-a-new-analysis)
//! - [Output Format](#output-format)
//! - [Logging](#logging)
//!
//! # Key Features
//! * The [`ILConeAlgorithm`]: seeded cones, midpoint cones, duplicate removal and split/merge,
//!   configured through [`ILConeConfig`] with the D0 Run II values as the default.
//! * A [`JetShape`] accumulator for differential ($`\rho`$) and integral ($`\Psi`$) jet shapes
//!   around externally supplied jet axes.
//! * Final-state projections ([`FinalState`], [`ChargedFinalState`], [`VetoedFinalState`],
//!   [`TotalVisibleMomentum`]) and weighted [`Histo1D`]/[`Profile1D`] accumulators.
//! * A single [`Analysis`](crate::traits::Analysis) trait, a static registry of analyses, and an
//!   [`AnalysisHandler`] which drives them through a run.
//! * Optional parallel clustering of many events with [`rayon`](https://github.com/rayon-rs/rayon).
//!
//! # Quick Start
//! ## Finding Jets
//! Jets are found from a list of four-momenta. Each returned [`Jet`] records the indices of its
//! constituents, and jets come out hardest first:
//! ```rust
//! use ilcone::{ILConeAlgorithm, ILConeConfig, Vec4};
//!
//! let algorithm = ILConeAlgorithm::new(ILConeConfig::d0_run2().with_cone_radius(0.5)).unwrap();
//! let items = vec![
//!     Vec4::from_pt_y_phi_m(40.0, 0.0, 0.0, 0.0),
//!     Vec4::from_pt_y_phi_m(20.0, 0.1, 0.1, 0.0),
//!     Vec4::from_pt_y_phi_m(35.0, -0.4, 3.1, 0.0),
//! ];
//! let jets = algorithm.cluster(&items, 0.0);
//! assert_eq!(jets.len(), 2);
//! assert_eq!(jets[0].constituents, vec![0, 1]);
//! ```
//! The same algorithm can be attached to a final state with [`ConeJets`], which is how the
//! analyses use it:
//! ```rust
//! use ilcone::{test_event, ConeJets, FinalState};
//!
//! let jets = ConeJets::d0_il_cone(FinalState::new(-4.2, 4.2, 0.0));
//! for jet in jets.project(&test_event()) {
//!     println!("{}", jet);
//! }
//! ```
//!
//! ## Measuring Jet Shapes
//! ```rust
//! use ilcone::{test_event, ConeJets, FinalState, FinalStateProjection, JetShape, JetShapeConfig};
//!
//! let event = test_event();
//! let fs = FinalState::new(-2.0, 2.0, 0.0);
//! let axes = ConeJets::d0_il_cone(fs).project_momenta(&event);
//! let shape = JetShape::new(JetShapeConfig::default()).unwrap();
//! let shapes = shape.compute(&fs.particles(&event), &axes);
//! println!("Psi(0.3) of the leading jet = {}", shapes.psi(0));
//! ```
//!
//! ## Running Analyses
//! Analyses are created by name from the registry (see [`available_analyses`]). An analysis
//! which cannot run at the requested energy is reported through the log and skipped, while an
//! unknown name is an error:
//! ```rust
//! use ilcone::{toy_dijet_event, AnalysisHandler, RunInfo};
//!
//! let mut handler = AnalysisHandler::new(RunInfo::new(1960.0));
//! handler.add_analyses(["D0_2004_S5992206", "CDF_2005_S6217184"]).unwrap();
//! let mut rng = fastrand::Rng::with_seed(0);
//! for _ in 0..100 {
//!     handler.analyze(&toy_dijet_event(&mut rng, 1960.0));
//! }
//! let results = handler.finalize();
//! println!("{}", results);
//! ```
//!
//! # Writing a New Analysis
//! An analysis owns its projections and histograms, which it books when it is created. Selection
//! failures are not errors; they are returned as a [`Veto`] and simply skip the rest of the event:
//! ```rust
//! use ilcone::traits::*;
//! use ilcone::{
//!     veto_if, AnalysisHandler, ChargedFinalState, Event, FinalState, Histo1D, Histogram,
//!     IlconeResult, RunInfo, RunStats, Veto,
//! };
//!
//! #[derive(Clone)]
//! struct ChargedMultiplicity {
//!     fs: ChargedFinalState,
//!     multiplicity: Histo1D,
//! }
//!
//! impl ChargedMultiplicity {
//!     fn new() -> IlconeResult<Self> {
//!         Ok(Self {
//!             fs: ChargedFinalState::new(FinalState::new(-1.0, 1.0, 0.5)),
//!             multiplicity: Histo1D::new("/MY_ANALYSIS/nch", 20, (-0.5, 19.5))?,
//!         })
//!     }
//! }
//!
//! impl Analysis for ChargedMultiplicity {
//!     fn name(&self) -> &str {
//!         "MY_ANALYSIS"
//!     }
//!     fn analyze(&mut self, event: &Event) -> Result<(), Veto> {
//!         let n = self.fs.particles(event).len();
//!         veto_if(n == 0, "no charged particles")?;
//!         self.multiplicity.fill(n as f64, event.weight);
//!         Ok(())
//!     }
//!     fn finalize(&mut self, _stats: &RunStats) {
//!         self.multiplicity.normalize(1.0);
//!     }
//!     fn histograms(&self) -> Vec<Histogram> {
//!         vec![self.multiplicity.clone().into()]
//!     }
//! }
//!
//! let mut handler = AnalysisHandler::new(RunInfo::new(1960.0));
//! handler.push(Box::new(ChargedMultiplicity::new().unwrap()));
//! handler.analyze(&ilcone::test_event());
//! let results = handler.finalize();
//! assert!(results.get("/MY_ANALYSIS/nch").is_some());
//! ```
//!
//! # Output Format
//! [`AnalysisResults`] maps histogram paths (`/<ANALYSIS>/<name>`) to histograms in booking
//! order. It implements [`ReadWrite`](crate::traits::ReadWrite), so results can be written to
//! and read back from disk with `bincode`. Paths may contain `~` and environment variables:
//! ```rust,no_run
//! use ilcone::traits::*;
//! use ilcone::AnalysisResults;
//!
//! let results = AnalysisResults::new();
//! results.save("~/ilcone/results.bin").unwrap();
//! let loaded = AnalysisResults::load("~/ilcone/results.bin").unwrap();
//! assert_eq!(results, loaded);
//! ```
//!
//! # Logging
//! The library logs through the [`log`](https://docs.rs/log) facade: per-event jet
//! multiplicities and vetoes at `debug`, run summaries at `info`, and analyses which cannot run
//! at `error`. Install any logger to see them; the `ilcone-toy` binary uses `env_logger`,
//! configured with the `ILCONE_LOG` environment variable.
#![warn(clippy::perf, clippy::style, missing_docs)]

/// Particles, events and the toy event generator.
pub mod data {
    pub use ilcone_core::data::{
        charge, collider_beams, is_charged, is_neutrino, test_event, three_charge,
        toy_dijet_event, Event, Particle, ELECTRON, MUON, PHOTON, PROTON,
    };
}

/// Final-state projections.
pub mod projections {
    pub use ilcone_core::projections::*;
}

/// Histograms, profiles and collected results.
pub mod histograms {
    pub use ilcone_core::histograms::*;
}

/// Utility functions, enums, and vector types.
pub mod utils {
    pub use ilcone_core::utils::*;
}

/// Jet finding and jet shapes.
pub mod jets {
    pub use ilcone_jets::*;
}

/// The analysis lifecycle, registry and the shipped analyses.
pub mod analyses {
    pub use ilcone_analyses::*;
}

/// Traits which need to be in scope to use some methods.
pub mod traits {
    pub use ilcone_analyses::Analysis;
    pub use ilcone_core::FinalStateProjection;
    pub use ilcone_core::ReadWrite;
}

pub use ilcone_analyses::{
    available_analyses, get_analysis, veto_if, AnalysisHandler, RunInfo, RunStats, Veto,
};
pub use ilcone_core::{
    test_event, toy_dijet_event, AnalysisResults, Beam, ChargedFinalState, DeltaRScheme, Event,
    FinalState, FinalStateProjection, Histo1D, Histogram, IlconeError, IlconeResult, Particle,
    Profile1D, Recombination, ShapeScheme, TotalVisibleMomentum, Vec3, Vec4, VetoedFinalState,
};
pub use ilcone_jets::{ConeJets, ILConeAlgorithm, ILConeConfig, Jet, JetShape, JetShapeConfig};
pub use serde::{Deserialize, Serialize};
