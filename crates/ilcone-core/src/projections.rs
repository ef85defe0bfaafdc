use serde::{Deserialize, Serialize};

use crate::{
    data::{is_neutrino, Event, Particle},
    utils::vectors::Vec4,
};

/// A projection which selects a subset of an [`Event`]'s final-state particles.
pub trait FinalStateProjection {
    /// The selected particles, in event order.
    fn particles(&self, event: &Event) -> Vec<Particle>;

    /// The four-momenta of the selected particles, in event order.
    fn momenta(&self, event: &Event) -> Vec<Vec4> {
        self.particles(event).iter().map(|p| p.momentum).collect()
    }
}

/// The stable final state within a pseudorapidity window and above a transverse-momentum cut.
///
/// Both pseudorapidity bounds are inclusive, so [`FinalState::all`] keeps particles along the
/// beam line as well.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    pub eta_min: f64,
    pub eta_max: f64,
    pub pt_min: f64,
}

impl Default for FinalState {
    fn default() -> Self {
        Self::all()
    }
}

impl FinalState {
    pub fn new(eta_min: f64, eta_max: f64, pt_min: f64) -> Self {
        Self {
            eta_min,
            eta_max,
            pt_min,
        }
    }
    /// Every final-state particle.
    pub fn all() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY, 0.0)
    }
    /// Check a single particle against the acceptance.
    pub fn accepts(&self, particle: &Particle) -> bool {
        let eta = particle.eta();
        eta >= self.eta_min && eta <= self.eta_max && particle.pt() >= self.pt_min
    }
}

impl FinalStateProjection for FinalState {
    fn particles(&self, event: &Event) -> Vec<Particle> {
        event
            .particles
            .iter()
            .filter(|p| self.accepts(p))
            .copied()
            .collect()
    }
}

/// The charged particles of a [`FinalState`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargedFinalState {
    pub fs: FinalState,
}

impl ChargedFinalState {
    pub fn new(fs: FinalState) -> Self {
        Self { fs }
    }
}

impl FinalStateProjection for ChargedFinalState {
    fn particles(&self, event: &Event) -> Vec<Particle> {
        event
            .particles
            .iter()
            .filter(|p| p.is_charged() && self.fs.accepts(p))
            .copied()
            .collect()
    }
}

/// A single veto rule: particles with `|pid| == abs_pid` and $`p_T \in [p_{T,\min}, p_{T,\max})`$.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VetoRule {
    pub abs_pid: u32,
    pub pt_min: f64,
    pub pt_max: f64,
}

impl VetoRule {
    fn matches(&self, particle: &Particle) -> bool {
        let pt = particle.pt();
        particle.pid.unsigned_abs() == self.abs_pid && pt >= self.pt_min && pt < self.pt_max
    }
}

/// Another final-state projection with some particle species removed.
///
/// Veto rules are matched on the absolute PDG id, so a rule removes a particle together with its
/// antiparticle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VetoedFinalState<F = FinalState> {
    pub fs: F,
    pub vetoes: Vec<VetoRule>,
}

impl<F: FinalStateProjection> VetoedFinalState<F> {
    pub fn new(fs: F) -> Self {
        Self { fs, vetoes: vec![] }
    }
    /// Remove all neutrinos.
    pub fn veto_neutrinos(self) -> Self {
        [12, 14, 16, 18]
            .into_iter()
            .fold(self, |vfs, pid| vfs.add_veto_pair_id(pid))
    }
    /// Remove a particle species and its antiparticle at any transverse momentum.
    pub fn add_veto_pair_id(self, pid: i32) -> Self {
        self.add_veto_detail(pid, 0.0, f64::INFINITY)
    }
    /// Remove a particle species and its antiparticle when its transverse momentum lies in
    /// `[pt_min, pt_max)`.
    pub fn add_veto_detail(mut self, pid: i32, pt_min: f64, pt_max: f64) -> Self {
        self.vetoes.push(VetoRule {
            abs_pid: pid.unsigned_abs(),
            pt_min,
            pt_max,
        });
        self
    }
    pub fn is_vetoed(&self, particle: &Particle) -> bool {
        self.vetoes.iter().any(|rule| rule.matches(particle))
    }
}

impl<F: FinalStateProjection> FinalStateProjection for VetoedFinalState<F> {
    fn particles(&self, event: &Event) -> Vec<Particle> {
        self.fs
            .particles(event)
            .into_iter()
            .filter(|p| !self.is_vetoed(p))
            .collect()
    }
}

/// Access to the incoming beams of an [`Event`].
pub struct Beam;

impl Beam {
    /// The two beam particles, if the event carries them.
    pub fn beams(event: &Event) -> Option<[Particle; 2]> {
        event.beams
    }
    /// The centre-of-mass energy of the beam pair.
    pub fn sqrt_s(event: &Event) -> Option<f64> {
        event.sqrt_s()
    }
}

/// The visible (non-neutrino) momentum balance of a final state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalVisibleMomentum<F = FinalState> {
    pub fs: F,
}

impl<F: FinalStateProjection> TotalVisibleMomentum<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
    /// The four-vector sum of all visible particles.
    pub fn momentum(&self, event: &Event) -> Vec4 {
        self.fs
            .particles(event)
            .iter()
            .filter(|p| !is_neutrino(p.pid))
            .map(|p| p.momentum)
            .sum()
    }
    /// The scalar sum of the visible transverse momenta.
    pub fn scalar_et(&self, event: &Event) -> f64 {
        self.fs
            .particles(event)
            .iter()
            .filter(|p| !is_neutrino(p.pid))
            .map(|p| p.pt())
            .sum()
    }
    /// The magnitude of the visible transverse momentum imbalance.
    pub fn missing_pt(&self, event: &Event) -> f64 {
        self.momentum(event).pt()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::{test_event, MUON};

    #[test]
    fn test_final_state_acceptance() {
        let event = test_event();
        assert_eq!(FinalState::all().particles(&event).len(), 9);
        let central = FinalState::new(-1.0, 1.0, 0.0).particles(&event);
        // the muon, the far-forward pion and the neutrino (eta ~ 1.5) are outside
        assert_eq!(central.len(), 6);
        let hard = FinalState::new(-5.0, 5.0, 20.0).particles(&event);
        assert_eq!(hard.len(), 4);
        assert!(hard.iter().all(|p| p.pt() >= 20.0));
        assert_eq!(FinalState::all().momenta(&event), event.momenta());
    }

    #[test]
    fn test_charged_final_state() {
        let event = test_event();
        let charged = ChargedFinalState::new(FinalState::all()).particles(&event);
        assert_eq!(charged.len(), 6);
        assert!(charged.iter().all(|p| p.is_charged()));
    }

    #[test]
    fn test_vetoed_final_state() {
        let event = test_event();
        let vfs = VetoedFinalState::new(FinalState::all()).veto_neutrinos();
        let particles = vfs.particles(&event);
        assert_eq!(particles.len(), 8);
        assert!(particles.iter().all(|p| !p.is_neutrino()));
        let hard_muons = VetoedFinalState::new(FinalState::all()).add_veto_detail(
            MUON,
            5.0,
            f64::INFINITY,
        );
        assert_eq!(hard_muons.particles(&event).len(), 9);
        let soft_muons =
            VetoedFinalState::new(FinalState::all()).add_veto_detail(-MUON, 1.0, f64::INFINITY);
        assert_eq!(soft_muons.particles(&event).len(), 8);
        let no_pions = VetoedFinalState::new(FinalState::all()).add_veto_pair_id(211);
        assert_eq!(no_pions.particles(&event).len(), 6);
    }

    #[test]
    fn test_beam_and_visible_momentum() {
        let event = test_event();
        assert_relative_eq!(Beam::sqrt_s(&event).unwrap(), 1960.0, epsilon = 1e-9);
        let tvm = TotalVisibleMomentum::new(FinalState::all());
        let visible: Vec4 = event
            .particles
            .iter()
            .filter(|p| !p.is_neutrino())
            .map(|p| p.momentum)
            .sum();
        assert_eq!(tvm.momentum(&event), visible);
        assert_relative_eq!(tvm.missing_pt(&event), visible.pt());
        assert!(tvm.scalar_et(&event) > tvm.missing_pt(&event));
    }
}
