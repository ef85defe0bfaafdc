//! # ilcone-jets
//!
//! This is an internal crate used by `ilcone`. It contains the D0 Run II improved legacy cone
//! algorithm, the [`ConeJets`] projection built on it, and the [`JetShape`] accumulator.
#![warn(clippy::perf, clippy::style)]

/// The D0 Run II improved legacy cone algorithm.
pub mod ilcone;
/// The [`Jet`] type.
pub mod jet;
/// Jets as a projection of an [`Event`](ilcone_core::Event).
pub mod projection;
/// Differential and integral jet shapes.
pub mod shape;

pub use ilcone::{ILConeAlgorithm, ILConeConfig};
pub use jet::Jet;
pub use projection::ConeJets;
pub use shape::{JetShape, JetShapeConfig, JetShapes};
