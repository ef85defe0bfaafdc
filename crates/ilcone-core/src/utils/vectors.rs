use std::{fmt::Display, iter::Sum};

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

use crate::utils::math::map_angle_m_pi_to_pi;

/// A three-vector of momentum components (GeV).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// The $`x`$-component.
    pub x: f64,
    /// The $`y`$-component.
    pub y: f64,
    /// The $`z`$-component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new [`Vec3`] from its Cartesian components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
    /// Promote this three-momentum to a four-momentum of the given mass.
    pub fn with_mass(&self, mass: f64) -> Vec4 {
        let e = f64::sqrt(mass.powi(2) + self.mag2());
        Vec4::new(self.x, self.y, self.z, e)
    }
    /// Promote this three-momentum to a four-momentum with the given energy.
    pub fn with_energy(&self, energy: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, energy)
    }
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }
    /// The cosine of the polar angle, or 1 for the null vector.
    pub fn costheta(&self) -> f64 {
        let mag = self.mag();
        if mag == 0.0 {
            1.0
        } else {
            self.z / mag
        }
    }
    pub fn theta(&self) -> f64 {
        self.costheta().acos()
    }
    /// The azimuthal angle in $`(-\pi, \pi]`$.
    pub fn phi(&self) -> f64 {
        map_angle_m_pi_to_pi(self.y.atan2(self.x))
    }
    /// The unit vector in the direction of `self` (the null vector stays null).
    pub fn unit(&self) -> Self {
        let mag = self.mag();
        if mag == 0.0 {
            *self
        } else {
            *self / mag
        }
    }
    /// The opening angle between two three-vectors.
    pub fn angle(&self, other: &Self) -> f64 {
        self.unit().dot(&other.unit()).clamp(-1.0, 1.0).acos()
    }
}

impl_op_ex!(+ |a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(-|a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Vec3| -> Vec3 { Vec3::new(-a.x, -a.y, -a.z) });
impl_op_ex_commutative!(*|a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x * b, a.y * b, a.z * b) });
impl_op_ex!(/ |a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x / b, a.y / b, a.z / b) });

/// A Lorentz four-momentum $`(p_x, p_y, p_z, E)`$ in GeV.
///
/// This is a small [`Copy`] value type: jets are built by summing these, and every derived
/// quantity (transverse momentum, rapidity, azimuth) is computed on demand.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    /// The $`x`$-component of the momentum.
    pub x: f64,
    /// The $`y`$-component of the momentum.
    pub y: f64,
    /// The $`z`$-component of the momentum.
    pub z: f64,
    /// The energy.
    pub t: f64,
}

impl Display for Vec4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_p4_string())
    }
}

impl Vec4 {
    /// Create a new [`Vec4`] from momentum components and energy.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            x: px,
            y: py,
            z: pz,
            t: e,
        }
    }
    /// Create a [`Vec4`] from collider coordinates: transverse momentum, rapidity, azimuth and
    /// mass.
    pub fn from_pt_y_phi_m(pt: f64, rapidity: f64, phi: f64, mass: f64) -> Self {
        let mt = f64::sqrt(pt.powi(2) + mass.powi(2));
        Self::new(
            pt * phi.cos(),
            pt * phi.sin(),
            mt * rapidity.sinh(),
            mt * rapidity.cosh(),
        )
    }
    pub fn px(&self) -> f64 {
        self.x
    }
    pub fn py(&self) -> f64 {
        self.y
    }
    pub fn pz(&self) -> f64 {
        self.z
    }
    pub fn e(&self) -> f64 {
        self.t
    }
    pub fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
    pub fn pt2(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2)
    }
    /// The transverse momentum $`\sqrt{p_x^2 + p_y^2}`$.
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }
    /// The transverse energy $`E \sin\theta = E p_T / |\vec{p}|`$.
    pub fn et(&self) -> f64 {
        let p = self.vec3().mag();
        if p == 0.0 {
            0.0
        } else {
            self.t * self.pt() / p
        }
    }
    /// The rapidity $`\frac{1}{2}\ln\frac{E+p_z}{E-p_z}`$.
    ///
    /// Vectors with $`E = |p_z|`$ have infinite rapidity (signed like $`p_z`$); the null
    /// vector has zero rapidity.
    pub fn rapidity(&self) -> f64 {
        if self.t == self.z.abs() {
            if self.z == 0.0 {
                return 0.0;
            }
            return f64::INFINITY.copysign(self.z);
        }
        0.5 * ((self.t + self.z) / (self.t - self.z)).ln()
    }
    /// The pseudorapidity $`-\ln\tan(\theta/2)`$.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            if self.z == 0.0 {
                return 0.0;
            }
            return f64::INFINITY.copysign(self.z);
        }
        (self.z / pt).asinh()
    }
    /// The azimuthal angle in $`(-\pi, \pi]`$.
    pub fn phi(&self) -> f64 {
        self.vec3().phi()
    }
    pub fn m2(&self) -> f64 {
        self.t.powi(2) - self.vec3().mag2()
    }
    /// The invariant mass (negative squared masses from rounding are clipped to zero).
    pub fn m(&self) -> f64 {
        self.m2().max(0.0).sqrt()
    }
    pub fn beta(&self) -> Vec3 {
        self.vec3() / self.t
    }
    pub fn gamma(&self) -> f64 {
        self.t / self.m()
    }
    /// Boost this four-momentum by the velocity `beta`.
    pub fn boost(&self, beta: &Vec3) -> Self {
        let b2 = beta.mag2();
        if b2 == 0.0 {
            return *self;
        }
        let gamma = 1.0 / f64::sqrt(1.0 - b2);
        let p3 = self.vec3() + beta * ((gamma - 1.0) * self.vec3().dot(beta) / b2 + gamma * self.t);
        Self::new(p3.x, p3.y, p3.z, gamma * (self.t + beta.dot(&self.vec3())))
    }
    pub fn to_p4_string(&self) -> String {
        format!(
            "[e = {:.5}; p = ({:.5}, {:.5}, {:.5}); m = {:.5}]",
            self.t,
            self.x,
            self.y,
            self.z,
            self.m()
        )
    }
}

impl_op_ex!(+ |a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x + b.x, a.y + b.y, a.z + b.z, a.t + b.t) });
impl_op_ex!(-|a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x - b.x, a.y - b.y, a.z - b.z, a.t - b.t) });
impl_op_ex!(-|a: &Vec4| -> Vec4 { Vec4::new(-a.x, -a.y, -a.z, -a.t) });
impl_op_ex_commutative!(*|a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x * b, a.y * b, a.z * b, a.t * b) });
impl_op_ex!(/ |a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x / b, a.y / b, a.z / b, a.t / b) });

impl Sum for Vec4 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vec4::default(), |acc, p4| acc + p4)
    }
}

impl<'a> Sum<&'a Vec4> for Vec4 {
    fn sum<I: Iterator<Item = &'a Vec4>>(iter: I) -> Self {
        iter.fold(Vec4::default(), |acc, p4| acc + p4)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_three_to_four_momentum_conversion() {
        let p3 = Vec3::new(1.0, 2.0, 3.0);
        let target_p4 = Vec4::new(1.0, 2.0, 3.0, 10.0);
        let p4_from_mass = p3.with_mass(target_p4.m());
        assert_relative_eq!(target_p4.e(), p4_from_mass.e());
        assert_relative_eq!(target_p4.px(), p4_from_mass.px());
        let p4_from_energy = p3.with_energy(target_p4.e());
        assert_eq!(target_p4, p4_from_energy);
    }

    #[test]
    fn test_four_momentum_basics() {
        let p = Vec4::new(3.0, 4.0, 5.0, 10.0);
        assert_eq!(p.pt(), 5.0);
        assert_eq!(p.pt2(), 25.0);
        assert_relative_eq!(p.m2(), 50.0, epsilon = 1e-12);
        assert_relative_eq!(p.m(), 50.0_f64.sqrt());
        assert_relative_eq!(p.gamma(), 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(p.beta().x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(p.rapidity(), 0.5 * (15.0_f64 / 5.0).ln());
        assert_relative_eq!(p.eta(), (5.0_f64 / 5.0).asinh());
        assert_relative_eq!(p.phi(), 4.0_f64.atan2(3.0));
        assert_relative_eq!(p.et(), 10.0 * 5.0 / 50.0_f64.sqrt());
    }

    #[test]
    fn test_collider_coordinates() {
        let p = Vec4::from_pt_y_phi_m(50.0, 0.4, -2.5, 1.2);
        assert_relative_eq!(p.pt(), 50.0, epsilon = 1e-12);
        assert_relative_eq!(p.rapidity(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(p.phi(), -2.5, epsilon = 1e-12);
        assert_relative_eq!(p.m(), 1.2, epsilon = 1e-9);
        let massless = Vec4::from_pt_y_phi_m(10.0, 1.3, 0.1, 0.0);
        assert_relative_eq!(massless.eta(), massless.rapidity(), epsilon = 1e-12);
        assert_relative_eq!(massless.et(), massless.pt(), epsilon = 1e-12);
    }

    #[test]
    fn test_divergent_rapidity() {
        let along_beam = Vec4::new(0.0, 0.0, 7.0, 7.0);
        assert_eq!(along_beam.rapidity(), f64::INFINITY);
        let against_beam = Vec4::new(0.0, 0.0, -7.0, 7.0);
        assert_eq!(against_beam.rapidity(), f64::NEG_INFINITY);
        assert_eq!(Vec4::default().rapidity(), 0.0);
        assert_eq!(Vec4::default().eta(), 0.0);
    }

    #[test]
    fn test_phi_range() {
        let p = Vec4::new(-1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.phi(), PI);
        let q = Vec4::new(-1.0, -1e-300, 0.0, 1.0);
        assert!(q.phi() > -PI && q.phi() <= PI);
    }

    #[test]
    fn test_vec_sums() {
        let a = Vec4::new(1.0, 2.0, 3.0, 10.0);
        let b = Vec4::new(4.0, 5.0, 6.0, 20.0);
        let c = a + b;
        assert_eq!(c, Vec4::new(5.0, 7.0, 9.0, 30.0));
        let total: Vec4 = [a, b, -a].iter().sum();
        assert_eq!(total, b);
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!((a * 2.0) / 2.0, a);
    }

    #[test]
    fn test_three_momentum_basics() {
        let p3 = Vec4::new(3.0, 4.0, 5.0, 10.0).vec3();
        let q3 = Vec4::new(1.2, -3.4, 7.6, 0.0).vec3();
        assert_relative_eq!(p3.mag(), 50.0_f64.sqrt());
        assert_relative_eq!(p3.costheta(), 5.0 / 50.0_f64.sqrt());
        let cross = p3.cross(&q3);
        assert_relative_eq!(cross.x, 47.4, epsilon = 1e-12);
        assert_relative_eq!(cross.y, -16.8, epsilon = 1e-12);
        assert_relative_eq!(cross.z, -15.0, epsilon = 1e-12);
        assert_relative_eq!(p3.angle(&p3), 0.0, epsilon = 1e-7);
        assert_relative_eq!(p3.angle(&-p3), PI, epsilon = 1e-7);
    }

    #[test]
    fn test_boost_com() {
        let p = Vec4::new(3.0, 4.0, 5.0, 10.0);
        let zero = p.boost(&-p.beta()).vec3();
        assert_relative_eq!(zero.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(zero.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(zero.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boost() {
        let pa = Vec4::new(3.0, 4.0, 5.0, 10.0);
        let pb = Vec4::new(3.4, 2.3, 1.2, 9.0);
        let boosted = pa.boost(&-pb.beta());
        assert_relative_eq!(boosted.e(), 8.157632144622882, epsilon = 1e-10);
        assert_relative_eq!(boosted.px(), -0.6489200627053444, epsilon = 1e-10);
        assert_relative_eq!(boosted.py(), 1.5316128987581492, epsilon = 1e-10);
        assert_relative_eq!(boosted.pz(), 3.712145860221643, epsilon = 1e-10);
    }
}
