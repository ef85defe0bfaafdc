/// Useful enumerations for recombination schemes and distance measures.
pub mod enums;
/// Angle wrapping, distances in the $`(y, \phi)`$ plane and fuzzy comparisons.
pub mod math;
/// Three- and four-vector value types.
pub mod vectors;

/// A helper method to get histogram edges from evenly-spaced `bins` over a given `range`
/// # See Also
/// [`Histo1D`](crate::histograms::Histo1D)
/// [`get_bin_index`]
pub fn get_bin_edges(bins: usize, range: (f64, f64)) -> Vec<f64> {
    let bin_width = (range.1 - range.0) / (bins as f64);
    (0..=bins)
        .map(|i| range.0 + (i as f64 * bin_width))
        .collect()
}

/// A helper method to obtain the index of a bin where a value should go in a histogram with evenly
/// spaced `bins` over a given `range`
///
/// # See Also
/// [`Histo1D`](crate::histograms::Histo1D)
/// [`get_bin_edges`]
pub fn get_bin_index(value: f64, bins: usize, limits: (f64, f64)) -> Option<usize> {
    if bins > 0 && value >= limits.0 && value < limits.1 {
        let bin_width = (limits.1 - limits.0) / bins as f64;
        let bin_index = ((value - limits.0) / bin_width).floor() as usize;
        Some(bin_index.min(bins - 1))
    } else {
        None
    }
}

/// Locate `value` in a list of ascending `edges`, with each bin closed below and open above.
pub fn get_edge_index(value: f64, edges: &[f64]) -> Option<usize> {
    if edges.len() < 2 || !(value >= edges[0] && value < edges[edges.len() - 1]) {
        return None;
    }
    // first edge strictly above `value`, minus one
    Some(edges.partition_point(|edge| *edge <= value) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning() {
        assert_eq!(get_bin_index(0.5, 3, (0.0, 1.0)), Some(1));
        assert_eq!(get_bin_index(0.0, 3, (0.0, 1.0)), Some(0));
        assert_eq!(get_bin_index(0.1, 3, (0.0, 1.0)), Some(0));
        assert_eq!(get_bin_index(0.9, 3, (0.0, 1.0)), Some(2));
        assert_eq!(get_bin_index(1.0, 3, (0.0, 1.0)), None);
        assert_eq!(get_bin_index(2.0, 3, (0.0, 1.0)), None);
        assert_eq!(get_bin_index(f64::NAN, 3, (0.0, 1.0)), None);
        assert_eq!(get_bin_edges(4, (0.0, 1.0)), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_edge_lookup() {
        let edges = [37.0, 45.0, 55.0, 63.0];
        assert_eq!(get_edge_index(36.9, &edges), None);
        assert_eq!(get_edge_index(37.0, &edges), Some(0));
        assert_eq!(get_edge_index(45.0, &edges), Some(1));
        assert_eq!(get_edge_index(62.999, &edges), Some(2));
        assert_eq!(get_edge_index(63.0, &edges), None);
        assert_eq!(get_edge_index(f64::NAN, &edges), None);
        assert_eq!(get_edge_index(1.0, &[1.0]), None);
    }
}
