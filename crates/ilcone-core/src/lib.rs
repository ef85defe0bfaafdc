//! # ilcone-core
//!
//! This is an internal crate used by `ilcone`. It holds the value types every other crate
//! works with (four-vectors, particles and events), the final-state projections, the
//! histogram accumulators and the shared error type.
#![warn(clippy::perf, clippy::style)]
#![allow(clippy::excessive_precision)]

use std::{fs, path::PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Particles, events and PDG-id helpers.
pub mod data;
/// Weighted histograms, profiles and the collected results of a run.
pub mod histograms;
/// Projections which select final-state particles from an [`Event`].
pub mod projections;
/// Utility functions, enums, and vector types
pub mod utils;

pub use crate::data::{test_event, toy_dijet_event, Event, Particle};
pub use crate::histograms::{AnalysisResults, Histo1D, Histogram, Profile1D};
pub use crate::projections::{
    Beam, ChargedFinalState, FinalState, FinalStateProjection, TotalVisibleMomentum,
    VetoedFinalState,
};
pub use crate::utils::enums::{DeltaRScheme, Recombination, ShapeScheme};
pub use crate::utils::math::{delta_phi, delta_r, fuzzy_equals, map_angle_m_pi_to_pi};
pub use crate::utils::vectors::{Vec3, Vec4};

/// The error type used by all `ilcone` internal methods
#[derive(Error, Debug)]
pub enum IlconeError {
    /// An alias for [`std::io::Error`].
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// An alias for [`shellexpand::LookupError`].
    #[error("Failed to expand path: {0}")]
    LookupError(#[from] shellexpand::LookupError<std::env::VarError>),
    /// An error returned by the Rust encoder
    #[error("Encoder error: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),
    /// An error returned by the Rust decoder
    #[error("Decoder error: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),
    /// A configuration value outside of its allowed range.
    #[error("Invalid value {value} for parameter \"{name}\": {reason}")]
    InvalidParameter {
        /// The name of the parameter
        name: String,
        /// The rejected value
        value: f64,
        /// What the value must satisfy
        reason: String,
    },
    /// Histogram or jet-shape binning which would have no (or negative-width) bins.
    #[error("Invalid binning: {0}")]
    InvalidBinning(String),
    /// An error which occurs when the user asks for an analysis which is not registered.
    #[error("No registered analysis with name \"{name}\"!")]
    AnalysisNotFound {
        /// Name of the analysis which failed lookup
        name: String,
    },
    /// An analysis was asked to run at a centre-of-mass energy it has no measurement for.
    #[error("Analysis \"{analysis}\" does not support a beam energy of sqrt(s) = {sqrt_s} GeV")]
    UnsupportedBeamEnergy {
        /// Name of the analysis
        analysis: String,
        /// The requested centre-of-mass energy in GeV
        sqrt_s: f64,
    },
    /// An error which occurs when the user tries to parse an invalid string of text, typically
    /// into an enum variant.
    #[error("Failed to parse string: \"{name}\" does not correspond to a valid \"{object}\"!")]
    ParseError {
        /// The string which was parsed
        name: String,
        /// The name of the object it failed to parse into
        object: String,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own error
    /// category.
    #[error("{0}")]
    Custom(String),
}

impl Clone for IlconeError {
    // the wrapped library errors are not cloneable, so clones keep only the message
    fn clone(&self) -> Self {
        let err_string = self.to_string();
        IlconeError::Custom(err_string)
    }
}

/// A [`Result`] type alias for [`IlconeError`]s.
pub type IlconeResult<T> = Result<T, IlconeError>;

pub(crate) fn expand_path(file_path: &str) -> IlconeResult<PathBuf> {
    Ok(PathBuf::from(&*shellexpand::full(file_path)?))
}

/// A trait which gives any [`Serialize`] and [`Deserialize`](`serde::Deserialize`) struct a
/// compact binary encoding and file persistence. Paths may contain `~` and environment
/// variables.
pub trait ReadWrite: Serialize + DeserializeOwned {
    /// Encode `self` with the standard `bincode` configuration.
    fn to_bytes(&self) -> IlconeResult<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(
            self,
            bincode::config::standard(),
        )?)
    }
    /// Decode a value produced by [`ReadWrite::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> IlconeResult<Self> {
        let (value, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(value)
    }
    /// Write `self` to `file_path`, replacing any existing file.
    fn save(&self, file_path: &str) -> IlconeResult<()> {
        let path = expand_path(file_path)?;
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
    /// Read a value previously written with [`ReadWrite::save`].
    fn load(file_path: &str) -> IlconeResult<Self> {
        let path = expand_path(file_path)?;
        Self::from_bytes(&fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_round_trip() {
        let mut results = AnalysisResults::new();
        let mut h = Histo1D::new("/TEST/d01-x01-y01", 3, (0.0, 3.0)).unwrap();
        h.fill(1.5, 0.25);
        h.fill(9.0, 1.0);
        let mut p = Profile1D::from_edges("/TEST/d02-x01-y01", vec![0.0, 0.5, 2.0]).unwrap();
        p.fill(1.0, 0.7, 2.0);
        results.insert(h.into());
        results.insert(p.into());
        let dir = std::env::temp_dir().join(format!("ilcone-core-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("results.bin");
        let path = path.to_str().unwrap();
        results.save(path).unwrap();
        let loaded = AnalysisResults::load(path).unwrap();
        assert_eq!(loaded, results);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_paths() {
        assert!(matches!(
            AnalysisResults::load("/definitely/not/a/real/ilcone/file.bin"),
            Err(IlconeError::IOError(_))
        ));
        assert!(matches!(
            AnalysisResults::load("$ILCONE_SURELY_UNSET_VARIABLE/x.bin"),
            Err(IlconeError::LookupError(_))
        ));
        assert!(AnalysisResults::from_bytes(&[0xff, 0xff]).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = IlconeError::UnsupportedBeamEnergy {
            analysis: "JADE_1984_I202784".to_string(),
            sqrt_s: 91.2,
        };
        assert_eq!(
            err.to_string(),
            "Analysis \"JADE_1984_I202784\" does not support a beam energy of sqrt(s) = 91.2 GeV"
        );
        assert!(matches!(err.clone(), IlconeError::Custom(_)));
    }
}
