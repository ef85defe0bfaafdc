use std::fmt::Display;

use ilcone_core::Vec4;
use serde::{Deserialize, Serialize};

/// A clustered jet: the four-vector sum of its constituents.
///
/// `constituents` are indices into the slice of four-vectors that was clustered, in ascending
/// order. A jet only lives as long as the event it was built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub momentum: Vec4,
    pub constituents: Vec<usize>,
}

impl Jet {
    /// Build a jet from the given constituent indices of `items`.
    pub fn from_constituents(items: &[Vec4], mut constituents: Vec<usize>) -> Self {
        constituents.sort_unstable();
        constituents.dedup();
        let momentum = constituents.iter().map(|&i| items[i]).sum();
        Self {
            momentum,
            constituents,
        }
    }
    pub fn pt(&self) -> f64 {
        self.momentum.pt()
    }
    pub fn et(&self) -> f64 {
        self.momentum.et()
    }
    pub fn rapidity(&self) -> f64 {
        self.momentum.rapidity()
    }
    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }
    pub fn phi(&self) -> f64 {
        self.momentum.phi()
    }
    pub fn n_constituents(&self) -> usize {
        self.constituents.len()
    }
    /// The scalar sum of constituent transverse momenta.
    pub fn scalar_pt_sum(&self, items: &[Vec4]) -> f64 {
        self.constituents.iter().map(|&i| items[i].pt()).sum()
    }
}

impl Display for Jet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Jet(pt = {:.4}, y = {:.4}, phi = {:.4}, n = {})",
            self.pt(),
            self.rapidity(),
            self.phi(),
            self.constituents.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_jet_from_constituents() {
        let items = vec![
            Vec4::from_pt_y_phi_m(10.0, 0.0, 0.0, 0.0),
            Vec4::from_pt_y_phi_m(20.0, 0.1, 0.1, 0.0),
            Vec4::from_pt_y_phi_m(5.0, 2.0, 2.0, 0.0),
        ];
        let jet = Jet::from_constituents(&items, vec![1, 0, 1]);
        assert_eq!(jet.constituents, vec![0, 1]);
        assert_eq!(jet.n_constituents(), 2);
        assert_eq!(jet.momentum, items[0] + items[1]);
        assert_relative_eq!(jet.scalar_pt_sum(&items), 30.0, epsilon = 1e-12);
        assert!(jet.pt() < 30.0);
        assert!(format!("{}", jet).starts_with("Jet(pt = "));
    }
}
