use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{IlconeError, Vec4};

/// How the axis of a protojet is computed from its constituents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recombination {
    /// The axis is the $`(y, \phi)`$ direction of the four-vector sum of the constituents.
    #[default]
    Energy,
    /// The axis is the $`p_T`$-weighted average of the constituent $`(y, \phi)`$ positions, with
    /// azimuths measured relative to the leading constituent so that the average does not
    /// straddle the $`\pm\pi`$ boundary.
    Snowmass,
}
impl Display for Recombination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recombination::Energy => write!(f, "E-scheme"),
            Recombination::Snowmass => write!(f, "Snowmass"),
        }
    }
}
impl FromStr for Recombination {
    type Err = IlconeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energy" | "e" | "e-scheme" | "escheme" => Ok(Self::Energy),
            "snowmass" | "pt" | "et" => Ok(Self::Snowmass),
            _ => Err(IlconeError::ParseError {
                name: s.to_string(),
                object: "Recombination".to_string(),
            }),
        }
    }
}

/// The per-particle weight used when accumulating jet shapes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeScheme {
    /// Each particle contributes its transverse momentum.
    #[default]
    Energy,
    /// Each particle contributes one unit (a multiplicity profile).
    Snowmass,
}
impl ShapeScheme {
    /// The weight a particle with four-momentum `p4` carries under this scheme.
    pub fn weight(&self, p4: &Vec4) -> f64 {
        match self {
            ShapeScheme::Energy => p4.pt(),
            ShapeScheme::Snowmass => 1.0,
        }
    }
}
impl Display for ShapeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeScheme::Energy => write!(f, "Energy"),
            ShapeScheme::Snowmass => write!(f, "Snowmass"),
        }
    }
}
impl FromStr for ShapeScheme {
    type Err = IlconeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energy" | "e" | "et" | "pt" => Ok(Self::Energy),
            "snowmass" | "count" | "n" => Ok(Self::Snowmass),
            _ => Err(IlconeError::ParseError {
                name: s.to_string(),
                object: "ShapeScheme".to_string(),
            }),
        }
    }
}

/// The longitudinal coordinate used when measuring $`\Delta R`$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaRScheme {
    /// Rapidity $`y`$.
    #[default]
    Rapidity,
    /// Pseudorapidity $`\eta`$.
    Pseudorapidity,
}
impl DeltaRScheme {
    /// The longitudinal coordinate of `p4` in this scheme.
    pub fn longitudinal(&self, p4: &Vec4) -> f64 {
        match self {
            DeltaRScheme::Rapidity => p4.rapidity(),
            DeltaRScheme::Pseudorapidity => p4.eta(),
        }
    }
    /// The distance between two four-vectors in the $`(\cdot, \phi)`$ plane of this scheme.
    pub fn delta_r(&self, a: &Vec4, b: &Vec4) -> f64 {
        crate::utils::math::delta_r(self.longitudinal(a), a.phi(), self.longitudinal(b), b.phi())
    }
}
impl Display for DeltaRScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeltaRScheme::Rapidity => write!(f, "Rapidity"),
            DeltaRScheme::Pseudorapidity => write!(f, "Pseudorapidity"),
        }
    }
}
impl FromStr for DeltaRScheme {
    type Err = IlconeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rapidity" | "y" => Ok(Self::Rapidity),
            "pseudorapidity" | "eta" | "pseudo-rapidity" => Ok(Self::Pseudorapidity),
            _ => Err(IlconeError::ParseError {
                name: s.to_string(),
                object: "DeltaRScheme".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn enum_displays() {
        assert_eq!(format!("{}", Recombination::Energy), "E-scheme");
        assert_eq!(format!("{}", Recombination::Snowmass), "Snowmass");
        assert_eq!(format!("{}", ShapeScheme::Energy), "Energy");
        assert_eq!(format!("{}", DeltaRScheme::Pseudorapidity), "Pseudorapidity");
    }

    #[test]
    fn enum_from_str() {
        assert_eq!(
            Recombination::from_str("E-Scheme").unwrap(),
            Recombination::Energy
        );
        assert_eq!(
            Recombination::from_str("snowmass").unwrap(),
            Recombination::Snowmass
        );
        assert_eq!(ShapeScheme::from_str("count").unwrap(), ShapeScheme::Snowmass);
        assert_eq!(
            DeltaRScheme::from_str("ETA").unwrap(),
            DeltaRScheme::Pseudorapidity
        );
        assert!(Recombination::from_str("kt").is_err());
        assert!(matches!(
            ShapeScheme::from_str("?"),
            Err(IlconeError::ParseError { .. })
        ));
    }

    #[test]
    fn scheme_weights_and_distances() {
        let a = Vec4::from_pt_y_phi_m(20.0, 0.5, 0.1, 5.0);
        let b = Vec4::from_pt_y_phi_m(10.0, 0.1, 0.4, 5.0);
        assert_relative_eq!(ShapeScheme::Energy.weight(&a), 20.0, epsilon = 1e-12);
        assert_eq!(ShapeScheme::Snowmass.weight(&a), 1.0);
        assert_relative_eq!(DeltaRScheme::Rapidity.delta_r(&a, &b), 0.5, epsilon = 1e-12);
        assert!(DeltaRScheme::Pseudorapidity.delta_r(&a, &b) > 0.5);
    }
}
