use std::fmt::Display;

use accurate::{sum::Klein, traits::*};
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    utils::{get_bin_edges, get_bin_index, get_edge_index},
    IlconeError, IlconeResult, ReadWrite,
};

fn validate_edges(path: &str, edges: &[f64]) -> IlconeResult<()> {
    if edges.len() < 2 {
        return Err(IlconeError::InvalidBinning(format!(
            "{path}: at least two bin edges are required"
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(IlconeError::InvalidBinning(format!(
            "{path}: bin edges must be finite and strictly increasing"
        )));
    }
    Ok(())
}

/// The binning shared by [`Histo1D`] and [`Profile1D`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Axis {
    edges: Vec<f64>,
    uniform: bool,
}

impl Axis {
    fn uniform(path: &str, bins: usize, range: (f64, f64)) -> IlconeResult<Self> {
        if bins == 0 {
            return Err(IlconeError::InvalidBinning(format!(
                "{path}: the number of bins must be greater than zero"
            )));
        }
        let edges = get_bin_edges(bins, range);
        validate_edges(path, &edges)?;
        Ok(Self {
            edges,
            uniform: true,
        })
    }
    fn explicit(path: &str, edges: Vec<f64>) -> IlconeResult<Self> {
        validate_edges(path, &edges)?;
        Ok(Self {
            edges,
            uniform: false,
        })
    }
    fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }
    fn low(&self) -> f64 {
        self.edges[0]
    }
    fn high(&self) -> f64 {
        self.edges[self.n_bins()]
    }
    fn index(&self, x: f64) -> Option<usize> {
        if self.uniform {
            get_bin_index(x, self.n_bins(), (self.low(), self.high()))
        } else {
            get_edge_index(x, &self.edges)
        }
    }
    fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }
    fn centre(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }
}

/// A weighted one-dimensional histogram.
///
/// Each bin keeps the sum of weights and the sum of squared weights; fills outside the axis go
/// to the underflow and overflow counters. Bins are closed below and open above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histo1D {
    path: String,
    axis: Axis,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: usize,
}

impl Histo1D {
    /// Book a histogram with `bins` evenly spaced bins over `range`.
    pub fn new(path: &str, bins: usize, range: (f64, f64)) -> IlconeResult<Self> {
        Ok(Self::with_axis(path, Axis::uniform(path, bins, range)?))
    }
    /// Book a histogram with explicit, strictly increasing bin `edges`.
    pub fn from_edges(path: &str, edges: Vec<f64>) -> IlconeResult<Self> {
        Ok(Self::with_axis(path, Axis::explicit(path, edges)?))
    }
    fn with_axis(path: &str, axis: Axis) -> Self {
        let n = axis.n_bins();
        Self {
            path: path.to_string(),
            axis,
            sumw: vec![0.0; n],
            sumw2: vec![0.0; n],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        }
    }
    pub fn path(&self) -> &str {
        &self.path
    }
    pub fn n_bins(&self) -> usize {
        self.axis.n_bins()
    }
    pub fn edges(&self) -> &[f64] {
        &self.axis.edges
    }
    pub fn bin_centre(&self, bin: usize) -> f64 {
        self.axis.centre(bin)
    }
    /// The number of fill calls, including under/overflow and NaN fills.
    pub fn entries(&self) -> usize {
        self.entries
    }
    /// Add `weight` to the bin containing `x`.
    pub fn fill(&mut self, x: f64, weight: f64) {
        self.entries += 1;
        match self.axis.index(x) {
            Some(bin) => {
                self.sumw[bin] += weight;
                self.sumw2[bin] += weight * weight;
            }
            None if x < self.axis.low() => self.underflow += weight,
            None if x >= self.axis.high() => self.overflow += weight,
            None => {}
        }
    }
    pub fn sumw(&self) -> &[f64] {
        &self.sumw
    }
    pub fn sumw2(&self) -> &[f64] {
        &self.sumw2
    }
    pub fn underflow(&self) -> f64 {
        self.underflow
    }
    pub fn overflow(&self) -> f64 {
        self.overflow
    }
    /// The sum of in-range weights.
    pub fn integral(&self) -> f64 {
        self.sumw
            .iter()
            .copied()
            .sum_with_accumulator::<Klein<f64>>()
    }
    /// Bin contents divided by bin widths.
    pub fn heights(&self) -> Vec<f64> {
        (0..self.n_bins())
            .map(|i| self.sumw[i] / self.axis.width(i))
            .collect()
    }
    /// Statistical errors on [`Histo1D::heights`].
    pub fn errors(&self) -> Vec<f64> {
        (0..self.n_bins())
            .map(|i| self.sumw2[i].sqrt() / self.axis.width(i))
            .collect()
    }
    /// Multiply every weight by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.sumw.iter_mut().for_each(|w| *w *= factor);
        self.sumw2.iter_mut().for_each(|w2| *w2 *= factor * factor);
        self.underflow *= factor;
        self.overflow *= factor;
    }
    /// Scale the histogram so that its in-range integral equals `norm`.
    ///
    /// An empty histogram cannot be normalised and is left untouched.
    pub fn normalize(&mut self, norm: f64) {
        let integral = self.integral();
        if integral == 0.0 {
            warn!(
                "Histogram {} has zero integral and will not be normalised",
                self.path
            );
            return;
        }
        self.scale(norm / integral);
    }
}

/// A one-dimensional profile: the weighted mean of some $`y`$ in bins of $`x`$.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile1D {
    path: String,
    axis: Axis,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    sumwy: Vec<f64>,
    sumwy2: Vec<f64>,
    entries: usize,
}

impl Profile1D {
    pub fn new(path: &str, bins: usize, range: (f64, f64)) -> IlconeResult<Self> {
        Ok(Self::with_axis(path, Axis::uniform(path, bins, range)?))
    }
    pub fn from_edges(path: &str, edges: Vec<f64>) -> IlconeResult<Self> {
        Ok(Self::with_axis(path, Axis::explicit(path, edges)?))
    }
    fn with_axis(path: &str, axis: Axis) -> Self {
        let n = axis.n_bins();
        Self {
            path: path.to_string(),
            axis,
            sumw: vec![0.0; n],
            sumw2: vec![0.0; n],
            sumwy: vec![0.0; n],
            sumwy2: vec![0.0; n],
            entries: 0,
        }
    }
    pub fn path(&self) -> &str {
        &self.path
    }
    pub fn n_bins(&self) -> usize {
        self.axis.n_bins()
    }
    pub fn edges(&self) -> &[f64] {
        &self.axis.edges
    }
    pub fn bin_centre(&self, bin: usize) -> f64 {
        self.axis.centre(bin)
    }
    pub fn entries(&self) -> usize {
        self.entries
    }
    /// Record the value `y` at position `x` with the given `weight`. Out-of-range `x` is ignored.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        self.entries += 1;
        if let Some(bin) = self.axis.index(x) {
            self.sumw[bin] += weight;
            self.sumw2[bin] += weight * weight;
            self.sumwy[bin] += weight * y;
            self.sumwy2[bin] += weight * y * y;
        }
    }
    pub fn sumw(&self, bin: usize) -> f64 {
        self.sumw[bin]
    }
    /// The weighted mean of `y` in `bin`, or zero for an empty bin.
    pub fn mean(&self, bin: usize) -> f64 {
        if self.sumw[bin] == 0.0 {
            0.0
        } else {
            self.sumwy[bin] / self.sumw[bin]
        }
    }
    /// The standard error on [`Profile1D::mean`]: $`\sqrt{\sigma^2_y / N_\text{eff}}`$, with the
    /// unbiased weighted variance. Bins with fewer than two effective entries give zero.
    pub fn std_err(&self, bin: usize) -> f64 {
        let (sw, sw2) = (self.sumw[bin], self.sumw2[bin]);
        let denominator = sw * sw - sw2;
        if sw == 0.0 || sw2 == 0.0 || denominator <= 0.0 {
            return 0.0;
        }
        let variance = (self.sumwy2[bin] * sw - self.sumwy[bin].powi(2)) / denominator;
        let n_eff = sw * sw / sw2;
        (variance.max(0.0) / n_eff).sqrt()
    }
    /// Rescale the fill weights; the means are unchanged.
    pub fn scale_w(&mut self, factor: f64) {
        for bin in 0..self.n_bins() {
            self.sumw[bin] *= factor;
            self.sumw2[bin] *= factor * factor;
            self.sumwy[bin] *= factor;
            self.sumwy2[bin] *= factor;
        }
    }
}

/// Any of the booked output objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Histogram {
    Histo1D(Histo1D),
    Profile1D(Profile1D),
}

impl Histogram {
    pub fn path(&self) -> &str {
        match self {
            Histogram::Histo1D(h) => h.path(),
            Histogram::Profile1D(p) => p.path(),
        }
    }
    pub fn as_histo1d(&self) -> Option<&Histo1D> {
        match self {
            Histogram::Histo1D(h) => Some(h),
            Histogram::Profile1D(_) => None,
        }
    }
    pub fn as_profile1d(&self) -> Option<&Profile1D> {
        match self {
            Histogram::Histo1D(_) => None,
            Histogram::Profile1D(p) => Some(p),
        }
    }
}

impl From<Histo1D> for Histogram {
    fn from(value: Histo1D) -> Self {
        Histogram::Histo1D(value)
    }
}

impl From<Profile1D> for Histogram {
    fn from(value: Profile1D) -> Self {
        Histogram::Profile1D(value)
    }
}

impl Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Histogram::Histo1D(h) => {
                writeln!(
                    f,
                    "Histo1D {} ({} bins, integral = {:.6e})",
                    h.path(),
                    h.n_bins(),
                    h.integral()
                )?;
                for (i, (height, error)) in h.heights().iter().zip(h.errors()).enumerate() {
                    writeln!(
                        f,
                        "  [{:>10.4}, {:>10.4})  {:>14.6e} +- {:.3e}",
                        h.edges()[i],
                        h.edges()[i + 1],
                        height,
                        error
                    )?;
                }
            }
            Histogram::Profile1D(p) => {
                writeln!(f, "Profile1D {} ({} bins)", p.path(), p.n_bins())?;
                for i in 0..p.n_bins() {
                    writeln!(
                        f,
                        "  [{:>10.4}, {:>10.4})  {:>14.6e} +- {:.3e}",
                        p.edges()[i],
                        p.edges()[i + 1],
                        p.mean(i),
                        p.std_err(i)
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// The finalised output of a run, keyed by histogram path in booking order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    histograms: IndexMap<String, Histogram>,
}

impl AnalysisResults {
    pub fn new() -> Self {
        Self::default()
    }
    /// Add a histogram under its own path, replacing any previous one with the same path.
    pub fn insert(&mut self, histogram: Histogram) {
        self.histograms
            .insert(histogram.path().to_string(), histogram);
    }
    pub fn get(&self, path: &str) -> Option<&Histogram> {
        self.histograms.get(path)
    }
    pub fn len(&self) -> usize {
        self.histograms.len()
    }
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.histograms.keys().map(|k| k.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = &Histogram> {
        self.histograms.values()
    }
}

impl Extend<Histogram> for AnalysisResults {
    fn extend<T: IntoIterator<Item = Histogram>>(&mut self, iter: T) {
        for histogram in iter {
            self.insert(histogram);
        }
    }
}

impl Display for AnalysisResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for histogram in self.histograms.values() {
            write!(f, "{}", histogram)?;
        }
        Ok(())
    }
}

impl ReadWrite for AnalysisResults {}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_histogram_fill_and_flows() {
        let mut h = Histo1D::new("/TEST/h", 4, (0.0, 2.0)).unwrap();
        h.fill(0.1, 1.0);
        h.fill(0.6, 2.0);
        h.fill(0.6, 2.0);
        h.fill(1.99, 0.5);
        h.fill(-1.0, 3.0);
        h.fill(2.0, 4.0);
        h.fill(f64::NAN, 5.0);
        assert_eq!(h.sumw(), &[1.0, 4.0, 0.0, 0.5]);
        assert_eq!(h.sumw2(), &[1.0, 8.0, 0.0, 0.25]);
        assert_eq!(h.underflow(), 3.0);
        assert_eq!(h.overflow(), 4.0);
        assert_eq!(h.entries(), 7);
        assert_relative_eq!(h.integral(), 5.5);
        assert_eq!(h.heights(), vec![2.0, 8.0, 0.0, 1.0]);
        assert_relative_eq!(h.errors()[1], 8.0_f64.sqrt() / 0.5);
    }

    #[test]
    fn test_histogram_explicit_edges() {
        let mut h = Histo1D::from_edges("/TEST/e", vec![0.0, 1.0, 3.0, 10.0]).unwrap();
        h.fill(2.9, 1.0);
        h.fill(3.0, 1.0);
        assert_eq!(h.sumw(), &[0.0, 1.0, 1.0]);
        assert_eq!(h.bin_centre(2), 6.5);
        assert!(Histo1D::from_edges("/TEST/bad", vec![0.0, 0.0]).is_err());
        assert!(Histo1D::from_edges("/TEST/bad", vec![1.0]).is_err());
        assert!(matches!(
            Histo1D::new("/TEST/bad", 0, (0.0, 1.0)),
            Err(IlconeError::InvalidBinning(_))
        ));
        assert!(Histo1D::new("/TEST/bad", 3, (1.0, 1.0)).is_err());
    }

    #[test]
    fn test_histogram_normalize() {
        let mut h = Histo1D::new("/TEST/n", 2, (0.0, 1.0)).unwrap();
        h.normalize(1.0);
        assert_eq!(h.integral(), 0.0);
        h.fill(0.25, 3.0);
        h.fill(0.75, 1.0);
        h.fill(5.0, 10.0);
        h.normalize(1.0);
        assert_relative_eq!(h.integral(), 1.0);
        assert_relative_eq!(h.sumw()[0], 0.75);
        assert_relative_eq!(h.overflow(), 2.5);
        h.scale(2.0);
        assert_relative_eq!(h.sumw2()[0], 9.0 / 16.0 * 4.0);
    }

    #[test]
    fn test_profile_means() {
        let mut p = Profile1D::new("/TEST/p", 2, (0.0, 2.0)).unwrap();
        p.fill(0.5, 1.0, 1.0);
        p.fill(0.5, 3.0, 1.0);
        p.fill(1.5, 4.0, 2.0);
        p.fill(7.0, 100.0, 1.0);
        assert_relative_eq!(p.mean(0), 2.0);
        assert_relative_eq!(p.mean(1), 4.0);
        assert_eq!(p.std_err(1), 0.0);
        // unbiased variance of {1, 3} is 2, over two entries
        assert_relative_eq!(p.std_err(0), 1.0, epsilon = 1e-12);
        p.scale_w(0.5);
        assert_relative_eq!(p.mean(0), 2.0);
        assert_relative_eq!(p.sumw(0), 1.0);
        let empty = Profile1D::from_edges("/TEST/q", vec![0.0, 1.0]).unwrap();
        assert_eq!(empty.mean(0), 0.0);
    }

    #[test]
    fn test_results_order_and_display() {
        let mut results = AnalysisResults::new();
        let mut h = Histo1D::new("/A/b", 1, (0.0, 1.0)).unwrap();
        h.fill(0.5, 1.0);
        results.insert(h.into());
        results.insert(Profile1D::new("/A/a", 1, (0.0, 1.0)).unwrap().into());
        assert_eq!(results.paths().collect::<Vec<_>>(), vec!["/A/b", "/A/a"]);
        assert!(results.get("/A/a").unwrap().as_profile1d().is_some());
        assert!(results.get("/A/b").unwrap().as_histo1d().is_some());
        let text = format!("{}", results);
        assert!(text.contains("Histo1D /A/b"));
        assert!(text.contains("Profile1D /A/a"));
    }
}
