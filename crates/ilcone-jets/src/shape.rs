use ilcone_core::{DeltaRScheme, IlconeError, IlconeResult, Particle, ShapeScheme, Vec4};
use serde::{Deserialize, Serialize};

/// Radial binning and weighting of a jet-shape measurement.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JetShapeConfig {
    /// The inner edge of the first radial bin.
    pub r_min: f64,
    /// The outer edge of the last radial bin.
    pub r_max: f64,
    /// The width of each radial bin.
    pub interval: f64,
    /// The radius at which the single integral value $`\Psi(r_1)`$ is taken.
    pub r1_psi: f64,
    /// Per-particle weight.
    pub scheme: ShapeScheme,
    /// Longitudinal coordinate of $`\Delta R`$.
    pub distance: DeltaRScheme,
}

impl Default for JetShapeConfig {
    fn default() -> Self {
        Self {
            r_min: 0.0,
            r_max: 0.7,
            interval: 0.1,
            r1_psi: 0.3,
            scheme: ShapeScheme::Energy,
            distance: DeltaRScheme::Rapidity,
        }
    }
}

impl JetShapeConfig {
    pub fn new(r_min: f64, r_max: f64, interval: f64, r1_psi: f64) -> Self {
        Self {
            r_min,
            r_max,
            interval,
            r1_psi,
            ..Self::default()
        }
    }
    pub fn with_scheme(mut self, scheme: ShapeScheme) -> Self {
        self.scheme = scheme;
        self
    }
    pub fn with_distance(mut self, distance: DeltaRScheme) -> Self {
        self.distance = distance;
        self
    }
}

/// Differential and integral jet shapes around a set of fixed jet axes.
///
/// For a bin of width $`\delta r`$ starting at $`r`$, the differential shape is
/// ```math
/// \rho(r) = \frac{1}{\delta r} \frac{\sum_{r \le \Delta R < r + \delta r} w}{\sum_{r_\text{min} \le \Delta R < r_\text{max}} w}
/// ```
/// and the integral shape $`\Psi(r + \delta r)`$ is the fraction with $`\Delta R < r + \delta r`$,
/// where every particle is counted once, around its nearest axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JetShape {
    config: JetShapeConfig,
    n_bins: usize,
}

impl JetShape {
    /// Create a jet-shape accumulator, rejecting binnings with no bins.
    pub fn new(config: JetShapeConfig) -> IlconeResult<Self> {
        let JetShapeConfig {
            r_min,
            r_max,
            interval,
            ..
        } = config;
        if !(r_min.is_finite() && r_max.is_finite() && interval.is_finite()) {
            return Err(IlconeError::InvalidBinning(format!(
                "jet shape radii must be finite (r_min = {r_min}, r_max = {r_max}, interval = {interval})"
            )));
        }
        if interval <= 0.0 || r_max <= r_min {
            return Err(IlconeError::InvalidBinning(format!(
                "jet shape needs interval > 0 and r_max > r_min (r_min = {r_min}, r_max = {r_max}, interval = {interval})"
            )));
        }
        let n_bins = ((r_max - r_min) / interval).round() as usize;
        if n_bins == 0 {
            return Err(IlconeError::InvalidBinning(format!(
                "jet shape interval {interval} leaves no bins in [{r_min}, {r_max}]"
            )));
        }
        Ok(Self { config, n_bins })
    }

    pub fn config(&self) -> &JetShapeConfig {
        &self.config
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Compute the shapes of `particles` around `axes`. Nothing carries over between calls.
    pub fn compute(&self, particles: &[Particle], axes: &[Vec4]) -> JetShapes {
        let JetShapeConfig {
            r_min,
            interval,
            r1_psi,
            scheme,
            distance,
            ..
        } = self.config;
        let n_bins = self.n_bins;
        let r_outer = r_min + n_bins as f64 * interval;
        let mut diff = vec![vec![0.0; n_bins]; axes.len()];
        let mut int = vec![vec![0.0; n_bins]; axes.len()];
        let mut psi = vec![0.0; axes.len()];
        if !axes.is_empty() {
            for particle in particles {
                let Some((jet, dr)) = closest_axis(&particle.momentum, axes, distance) else {
                    continue;
                };
                let weight = scheme.weight(&particle.momentum);
                for bin in 0..n_bins {
                    let low = r_min + bin as f64 * interval;
                    let high = low + interval;
                    if dr >= r_min && dr < high {
                        int[jet][bin] += weight;
                        if dr >= low {
                            diff[jet][bin] += weight / interval;
                        }
                    }
                }
                // counted in the same window as the normalisation
                if dr >= r_min && dr < r1_psi && dr < r_outer {
                    psi[jet] += weight;
                }
            }
            for jet in 0..axes.len() {
                let total = int[jet][n_bins - 1];
                if total > 0.0 {
                    diff[jet].iter_mut().for_each(|v| *v /= total);
                    int[jet].iter_mut().for_each(|v| *v /= total);
                    psi[jet] /= total;
                }
            }
        }
        JetShapes {
            r_min,
            r_max: self.config.r_max,
            interval,
            diff,
            int,
            psi,
        }
    }
}

fn closest_axis(p4: &Vec4, axes: &[Vec4], distance: DeltaRScheme) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, axis) in axes.iter().enumerate() {
        let dr = distance.delta_r(p4, axis);
        // strict comparison keeps the lower index on ties, and skips NaN distances
        if dr.is_finite() && best.map_or(true, |(_, d)| dr < d) {
            best = Some((index, dr));
        }
    }
    best
}

/// The per-jet output of [`JetShape::compute`], indexed by jet then radial bin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JetShapes {
    r_min: f64,
    r_max: f64,
    interval: f64,
    diff: Vec<Vec<f64>>,
    int: Vec<Vec<f64>>,
    psi: Vec<f64>,
}

impl JetShapes {
    pub fn n_jets(&self) -> usize {
        self.psi.len()
    }
    pub fn is_empty(&self) -> bool {
        self.psi.is_empty()
    }
    pub fn n_bins(&self) -> usize {
        self.diff.first().map_or(0, Vec::len)
    }
    pub fn r_min(&self) -> f64 {
        self.r_min
    }
    pub fn r_max(&self) -> f64 {
        self.r_max
    }
    pub fn interval(&self) -> f64 {
        self.interval
    }
    /// The differential shape $`\rho`$ of `jet` in radial `bin`.
    pub fn diff(&self, jet: usize, bin: usize) -> f64 {
        self.diff[jet][bin]
    }
    /// The integral shape $`\Psi`$ of `jet` at the outer edge of radial `bin`.
    pub fn int(&self, jet: usize, bin: usize) -> f64 {
        self.int[jet][bin]
    }
    /// $`\Psi(r_1)`$ of `jet`.
    pub fn psi(&self, jet: usize) -> f64 {
        self.psi[jet]
    }
    pub fn one_minus_psi(&self, jet: usize) -> f64 {
        1.0 - self.psi[jet]
    }
    pub fn bin_centre(&self, bin: usize) -> f64 {
        self.r_min + (bin as f64 + 0.5) * self.interval
    }
    pub fn bin_upper(&self, bin: usize) -> f64 {
        self.r_min + (bin as f64 + 1.0) * self.interval
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn pion(pt: f64, y: f64, phi: f64) -> Particle {
        Particle::new(211, Vec4::from_pt_y_phi_m(pt, y, phi, 0.0))
    }

    fn axis() -> Vec4 {
        Vec4::from_pt_y_phi_m(100.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_normalised_shapes() {
        let shape = JetShape::new(JetShapeConfig::default()).unwrap();
        assert_eq!(shape.n_bins(), 7);
        let particles = vec![
            pion(40.0, 0.0, 0.05),
            pion(30.0, 0.15, 0.0),
            pion(20.0, 0.0, -0.35),
            pion(10.0, 0.55, 0.0),
            pion(50.0, 2.5, 0.0),
        ];
        let shapes = shape.compute(&particles, &[axis()]);
        assert_eq!(shapes.n_jets(), 1);
        assert_eq!(shapes.n_bins(), 7);
        assert_relative_eq!(shapes.int(0, 6), 1.0, epsilon = 1e-12);
        assert_relative_eq!(shapes.diff(0, 0), 0.4 / 0.1, epsilon = 1e-9);
        assert_relative_eq!(shapes.diff(0, 1), 0.3 / 0.1, epsilon = 1e-9);
        assert_relative_eq!(shapes.diff(0, 2), 0.0, epsilon = 1e-12);
        assert_relative_eq!(shapes.diff(0, 3), 0.2 / 0.1, epsilon = 1e-9);
        assert_relative_eq!(shapes.diff(0, 5), 0.1 / 0.1, epsilon = 1e-9);
        let mut running = 0.0;
        for bin in 0..shapes.n_bins() {
            running += shapes.diff(0, bin) * shapes.interval();
            assert_relative_eq!(shapes.int(0, bin), running, epsilon = 1e-9);
            if bin > 0 {
                assert!(shapes.int(0, bin) >= shapes.int(0, bin - 1));
            }
        }
        assert_relative_eq!(shapes.psi(0), 0.7, epsilon = 1e-9);
        assert_relative_eq!(shapes.one_minus_psi(0), 0.3, epsilon = 1e-9);
        assert_relative_eq!(shapes.bin_centre(2), 0.25, epsilon = 1e-12);
        assert_relative_eq!(shapes.bin_upper(2), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_count_weighting() {
        let shape =
            JetShape::new(JetShapeConfig::default().with_scheme(ShapeScheme::Snowmass)).unwrap();
        let particles = vec![
            pion(90.0, 0.0, 0.05),
            pion(1.0, 0.0, 0.25),
            pion(1.0, 0.0, 0.26),
            pion(1.0, 0.0, 0.45),
        ];
        let shapes = shape.compute(&particles, &[axis()]);
        assert_relative_eq!(shapes.int(0, 0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(shapes.int(0, 2), 0.75, epsilon = 1e-12);
        assert_relative_eq!(shapes.diff(0, 2), 0.5 / 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_closest_axis_assignment() {
        let shape = JetShape::new(JetShapeConfig::default()).unwrap();
        let axes = [axis(), Vec4::from_pt_y_phi_m(80.0, 0.0, 1.0, 0.0)];
        let particles = vec![
            pion(10.0, 0.0, 0.05),
            pion(10.0, 0.0, 0.45),
            pion(30.0, 0.0, 0.55),
            pion(10.0, 0.0, 0.95),
        ];
        let shapes = shape.compute(&particles, &axes);
        assert_eq!(shapes.n_jets(), 2);
        // the first jet only sees the two particles closer to it
        assert_relative_eq!(shapes.int(0, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(shapes.diff(0, 4), 0.5 / 0.1, epsilon = 1e-9);
        assert_relative_eq!(shapes.int(1, 0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(shapes.int(1, 4), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_psi_ignores_particles_outside_the_radial_window() {
        let shape = JetShape::new(JetShapeConfig::new(0.1, 0.7, 0.1, 0.3)).unwrap();
        let particles = vec![
            pion(50.0, 0.0, 0.05),
            pion(30.0, 0.0, 0.15),
            pion(20.0, 0.0, 0.45),
        ];
        let shapes = shape.compute(&particles, &[axis()]);
        assert_relative_eq!(shapes.int(0, 5), 1.0, epsilon = 1e-12);
        assert_relative_eq!(shapes.psi(0), 0.6, epsilon = 1e-9);
        assert!(shapes.one_minus_psi(0) >= 0.0);

        let wide = JetShape::new(JetShapeConfig::new(0.0, 0.5, 0.1, 1.0)).unwrap();
        let shapes = wide.compute(&[pion(10.0, 0.0, 0.2), pion(10.0, 0.0, 0.8)], &[axis()]);
        assert_relative_eq!(shapes.psi(0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(shapes.one_minus_psi(0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        let shape = JetShape::new(JetShapeConfig::default()).unwrap();
        let shapes = shape.compute(&[pion(10.0, 0.0, 0.0)], &[]);
        assert!(shapes.is_empty());
        assert_eq!(shapes.n_bins(), 0);
        let lonely = shape.compute(&[], &[axis()]);
        assert_eq!(lonely.n_jets(), 1);
        assert_eq!(lonely.int(0, 6), 0.0);
        assert_eq!(lonely.psi(0), 0.0);
    }

    #[test]
    fn test_pseudorapidity_distance() {
        let shape = JetShape::new(
            JetShapeConfig::default().with_distance(DeltaRScheme::Pseudorapidity),
        )
        .unwrap();
        let heavy = Particle::new(2212, Vec4::from_pt_y_phi_m(1.0, 0.5, 0.0, 0.938));
        let shapes = shape.compute(&[pion(10.0, 0.0, 0.0), heavy], &[axis()]);
        // the proton has y = 0.5 but a pseudorapidity of about 0.66, so it lands in the last bin
        assert_relative_eq!(shapes.diff(0, 6) * 0.1, 1.0 / 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_binning() {
        assert!(matches!(
            JetShape::new(JetShapeConfig::new(0.0, 0.7, 0.0, 0.3)),
            Err(IlconeError::InvalidBinning(_))
        ));
        assert!(JetShape::new(JetShapeConfig::new(0.5, 0.4, 0.1, 0.3)).is_err());
        assert!(JetShape::new(JetShapeConfig::new(0.0, 0.1, 0.3, 0.3)).is_err());
        assert!(JetShape::new(JetShapeConfig::new(0.0, f64::NAN, 0.1, 0.3)).is_err());
        assert_eq!(
            JetShape::new(JetShapeConfig::new(0.1, 1.0, 0.3, 0.3))
                .unwrap()
                .n_bins(),
            3
        );
    }
}
