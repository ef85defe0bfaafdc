use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::utils::vectors::{Vec3, Vec4};

/// Three times the electric charge of each quark flavour, indexed by PDG quark code (`0` is a
/// placeholder, `7` and `8` are the fourth-generation quarks).
const QUARK_THREE_CHARGE: [i32; 10] = [0, -1, 2, -1, 2, -1, 2, -1, 2, 0];

/// Three times the electric charge of the particle with PDG id `pid`.
///
/// Leptons, gauge bosons and quarks are looked up directly. Hadrons are decomposed into their
/// quark content ($`n_{q_1} n_{q_2} n_{q_3} n_J`$ digits), and nuclei (`10LZZZAAAI`) use their
/// proton number. Unknown codes are neutral.
pub fn three_charge(pid: i32) -> i32 {
    let aid = pid.unsigned_abs();
    let sign = pid.signum();
    let charge = match aid {
        0 => 0,
        1..=8 => QUARK_THREE_CHARGE[aid as usize],
        11 | 13 | 15 | 17 => -3,
        12 | 14 | 16 | 18 => 0,
        21..=23 | 25 => 0,
        24 | 37 => 3,
        aid if aid >= 1_000_000_000 => 3 * ((aid / 10_000) % 1_000) as i32,
        aid if aid >= 100 => {
            let code = aid % 10_000;
            let nq1 = ((code / 1_000) % 10) as usize;
            let nq2 = ((code / 100) % 10) as usize;
            let nq3 = ((code / 10) % 10) as usize;
            if nq1 == 0 {
                // mesons: the heavier quark is the particle for down-type flavours
                if nq2 == 3 || nq2 == 5 {
                    QUARK_THREE_CHARGE[nq3] - QUARK_THREE_CHARGE[nq2]
                } else {
                    QUARK_THREE_CHARGE[nq2] - QUARK_THREE_CHARGE[nq3]
                }
            } else {
                QUARK_THREE_CHARGE[nq1] + QUARK_THREE_CHARGE[nq2] + QUARK_THREE_CHARGE[nq3]
            }
        }
        _ => 0,
    };
    sign * charge
}

/// The electric charge of the particle with PDG id `pid`, in units of $`e`$.
pub fn charge(pid: i32) -> f64 {
    three_charge(pid) as f64 / 3.0
}

/// Whether the particle with PDG id `pid` is electrically charged.
pub fn is_charged(pid: i32) -> bool {
    three_charge(pid) != 0
}

/// Whether `pid` is a (possibly fourth-generation) neutrino or anti-neutrino.
pub fn is_neutrino(pid: i32) -> bool {
    matches!(pid.unsigned_abs(), 12 | 14 | 16 | 18)
}

/// The PDG id of a muon.
pub const MUON: i32 = 13;
/// The PDG id of an electron.
pub const ELECTRON: i32 = 11;
/// The PDG id of a proton.
pub const PROTON: i32 = 2212;
/// The PDG id of a photon.
pub const PHOTON: i32 = 22;

/// A final-state particle: a PDG id and its four-momentum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// The PDG Monte Carlo id.
    pub pid: i32,
    /// The four-momentum in GeV.
    pub momentum: Vec4,
}

impl Particle {
    /// Create a new [`Particle`].
    pub const fn new(pid: i32, momentum: Vec4) -> Self {
        Self { pid, momentum }
    }
    pub fn three_charge(&self) -> i32 {
        three_charge(self.pid)
    }
    pub fn charge(&self) -> f64 {
        charge(self.pid)
    }
    pub fn is_charged(&self) -> bool {
        is_charged(self.pid)
    }
    pub fn is_neutrino(&self) -> bool {
        is_neutrino(self.pid)
    }
    pub fn pt(&self) -> f64 {
        self.momentum.pt()
    }
    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }
    pub fn rapidity(&self) -> f64 {
        self.momentum.rapidity()
    }
    pub fn phi(&self) -> f64 {
        self.momentum.phi()
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>8} {}", self.pid, self.momentum.to_p4_string())
    }
}

/// A generated collision event.
///
/// An [`Event`] owns its final-state particles, the optional pair of incoming beams, and the
/// event weight. Projections and analyses only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The stable final-state particles.
    pub particles: Vec<Particle>,
    /// The two incoming beam particles, if known.
    pub beams: Option<[Particle; 2]>,
    /// The weight given to the event.
    pub weight: f64,
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Event:")?;
        if let Some(beams) = &self.beams {
            writeln!(f, "  beams:")?;
            for beam in beams {
                writeln!(f, "    {}", beam)?;
            }
        }
        writeln!(f, "  particles:")?;
        for particle in &self.particles {
            writeln!(f, "    {}", particle)?;
        }
        writeln!(f, "  weight:")?;
        writeln!(f, "    {}", self.weight)?;
        Ok(())
    }
}

impl Event {
    /// Create a new unit-weight [`Event`] without beam information.
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            beams: None,
            weight: 1.0,
        }
    }
    /// Attach a pair of incoming beams.
    pub fn with_beams(mut self, beams: [Particle; 2]) -> Self {
        self.beams = Some(beams);
        self
    }
    /// Set the event weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
    /// The centre-of-mass energy of the beam pair, if beams are attached.
    pub fn sqrt_s(&self) -> Option<f64> {
        self.beams.map(|[a, b]| (a.momentum + b.momentum).m())
    }
    /// The four-momenta of all final-state particles, in order.
    pub fn momenta(&self) -> Vec<Vec4> {
        self.particles.iter().map(|p| p.momentum).collect()
    }
    /// Return a four-momentum from the sum of four-momenta at the given indices.
    pub fn get_p4_sum<T: AsRef<[usize]>>(&self, indices: T) -> Vec4 {
        indices
            .as_ref()
            .iter()
            .map(|i| self.particles[*i].momentum)
            .sum::<Vec4>()
    }
}

/// A pair of head-on beams of the given species sharing `sqrt_s` equally.
pub fn collider_beams(pid_a: i32, pid_b: i32, sqrt_s: f64) -> [Particle; 2] {
    let e = 0.5 * sqrt_s;
    [
        Particle::new(pid_a, Vec4::new(0.0, 0.0, e, e)),
        Particle::new(pid_b, Vec4::new(0.0, 0.0, -e, e)),
    ]
}

/// An event that can be used to test projections and jet finding. This particular event contains
/// a $`p\bar{p}`$ collision at $`\sqrt{s} = 1960`$ GeV with two hard, back-to-back sprays of
/// hadrons, a soft muon and a neutrino.
pub fn test_event() -> Event {
    Event {
        particles: vec![
            Particle::new(211, Vec4::from_pt_y_phi_m(60.0, 0.20, 0.10, 0.1396)),
            Particle::new(-211, Vec4::from_pt_y_phi_m(25.0, 0.35, 0.25, 0.1396)),
            Particle::new(22, Vec4::from_pt_y_phi_m(15.0, 0.05, -0.05, 0.0)),
            Particle::new(2212, Vec4::from_pt_y_phi_m(55.0, -0.30, 3.20, 0.938)),
            Particle::new(-321, Vec4::from_pt_y_phi_m(30.0, -0.10, 3.05, 0.4937)),
            Particle::new(130, Vec4::from_pt_y_phi_m(8.0, -0.45, 3.35, 0.4976)),
            Particle::new(13, Vec4::from_pt_y_phi_m(3.0, 1.80, -2.00, 0.1057)), // muon
            Particle::new(-14, Vec3::new(4.0, -2.0, 10.0).with_mass(0.0)),       // neutrino
            Particle::new(211, Vec4::from_pt_y_phi_m(0.8, 3.10, 1.00, 0.1396)),
        ],
        beams: Some(collider_beams(PROTON, -PROTON, 1960.0)),
        weight: 1.0,
    }
}

fn hadron_mass(pid: i32) -> f64 {
    match pid.unsigned_abs() {
        211 => 0.13957,
        321 => 0.49368,
        130 => 0.49761,
        2212 => 0.93827,
        2112 => 0.93957,
        _ => 0.0,
    }
}

const TOY_HADRONS: [i32; 8] = [211, -211, 22, 22, 321, -321, 130, 2212];

fn fragment(rng: &mut fastrand::Rng, parton: (f64, f64, f64), particles: &mut Vec<Particle>) {
    let (pt, rapidity, phi) = parton;
    let n = 3 + rng.usize(0..6);
    let fractions: Vec<f64> = (0..n).map(|_| 0.05 + rng.f64()).collect();
    let total: f64 = fractions.iter().sum();
    for z in fractions {
        let pid = TOY_HADRONS[rng.usize(0..TOY_HADRONS.len())];
        particles.push(Particle::new(
            pid,
            Vec4::from_pt_y_phi_m(
                pt * z / total,
                rapidity + 0.5 * (rng.f64() - 0.5),
                phi + 0.5 * (rng.f64() - 0.5),
                hadron_mass(pid),
            ),
        ));
    }
}

/// Generate a toy dijet event at centre-of-mass energy `sqrt_s`.
///
/// Two partons are produced roughly back-to-back in azimuth with a steeply falling
/// $`p_T`$ spectrum and fragmented into a handful of hadrons each; a soft underlying event and,
/// occasionally, a neutrino are added. Beams are protons at or above 100 GeV and an
/// $`e^+e^-`$ pair below. This is not a physics generator, only a reproducible source of
/// jet-like events.
pub fn toy_dijet_event(rng: &mut fastrand::Rng, sqrt_s: f64) -> Event {
    let pt_max = (0.45 * sqrt_s).min(600.0);
    let pt_min = (0.2 * sqrt_s).min(20.0);
    let pt = pt_min * (pt_max / pt_min).powf(rng.f64().powi(2));
    let y1 = 3.0 * (rng.f64() - 0.5);
    let y2 = 3.0 * (rng.f64() - 0.5);
    let phi1 = std::f64::consts::TAU * rng.f64();
    let phi2 = phi1 + std::f64::consts::PI + 0.6 * (rng.f64() - 0.5);
    let mut particles = Vec::new();
    fragment(rng, (pt, y1, phi1), &mut particles);
    let pt2 = pt * (0.8 + 0.2 * rng.f64());
    fragment(rng, (pt2, y2, phi2), &mut particles);
    for _ in 0..(5 + rng.usize(0..10)) {
        let pid = if rng.bool() { 211 } else { -211 };
        particles.push(Particle::new(
            pid,
            Vec4::from_pt_y_phi_m(
                0.3 + 1.7 * rng.f64(),
                8.0 * (rng.f64() - 0.5),
                std::f64::consts::TAU * rng.f64(),
                hadron_mass(pid),
            ),
        ));
    }
    if rng.f64() < 0.1 {
        particles.push(Particle::new(
            12,
            Vec4::from_pt_y_phi_m(5.0 + 15.0 * rng.f64(), 2.0 * (rng.f64() - 0.5), phi1, 0.0),
        ));
    }
    let beams = if sqrt_s >= 100.0 {
        collider_beams(PROTON, -PROTON, sqrt_s)
    } else {
        collider_beams(-ELECTRON, ELECTRON, sqrt_s)
    };
    Event {
        particles,
        beams: Some(beams),
        weight: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_three_charge_rules() {
        assert_eq!(three_charge(11), -3);
        assert_eq!(three_charge(-13), 3);
        assert_eq!(three_charge(12), 0);
        assert_eq!(three_charge(22), 0);
        assert_eq!(three_charge(-24), -3);
        assert_eq!(three_charge(2), 2);
        assert_eq!(three_charge(-1), 1);
        assert_eq!(three_charge(211), 3);
        assert_eq!(three_charge(-211), -3);
        assert_eq!(three_charge(111), 0);
        assert_eq!(three_charge(321), 3);
        assert_eq!(three_charge(311), 0);
        assert_eq!(three_charge(130), 0);
        assert_eq!(three_charge(310), 0);
        assert_eq!(three_charge(411), 3);
        assert_eq!(three_charge(521), 3);
        assert_eq!(three_charge(2212), 3);
        assert_eq!(three_charge(-2212), -3);
        assert_eq!(three_charge(2112), 0);
        assert_eq!(three_charge(3122), 0);
        assert_eq!(three_charge(3222), 3);
        assert_eq!(three_charge(1000020040), 6);
        assert_eq!(three_charge(0), 0);
    }

    #[test]
    fn test_charge_helpers() {
        assert_relative_eq!(charge(2), 2.0 / 3.0);
        assert!(is_charged(211));
        assert!(!is_charged(130));
        assert!(is_neutrino(-16));
        assert!(!is_neutrino(13));
        let muon = Particle::new(MUON, Vec4::new(1.0, 0.0, 0.0, 2.0));
        assert_eq!(muon.charge(), -1.0);
        assert!(muon.is_charged());
    }

    #[test]
    fn test_event_contents() {
        let event = test_event();
        assert_eq!(event.particles.len(), 9);
        assert_relative_eq!(event.sqrt_s().unwrap(), 1960.0, epsilon = 1e-9);
        assert_eq!(event.momenta().len(), 9);
        let sum = event.get_p4_sum([0, 1]);
        assert_relative_eq!(
            sum.e(),
            event.particles[0].momentum.e() + event.particles[1].momentum.e()
        );
        assert!(Event::new(vec![]).sqrt_s().is_none());
        let text = format!("{}", event);
        assert!(text.starts_with("Event:"));
        assert!(text.contains("weight:"));
    }

    #[test]
    fn test_toy_events_are_reproducible() {
        let mut rng_a = fastrand::Rng::with_seed(7);
        let mut rng_b = fastrand::Rng::with_seed(7);
        for _ in 0..10 {
            let a = toy_dijet_event(&mut rng_a, 1960.0);
            let b = toy_dijet_event(&mut rng_b, 1960.0);
            assert_eq!(a, b);
            assert!(a.particles.len() >= 11);
            assert!(a.particles.iter().all(|p| p.momentum.e().is_finite()));
            assert_relative_eq!(a.sqrt_s().unwrap(), 1960.0, epsilon = 1e-9);
        }
        let lep = toy_dijet_event(&mut rng_a, 34.0);
        assert_eq!(lep.beams.unwrap()[0].pid, -ELECTRON);
    }
}
