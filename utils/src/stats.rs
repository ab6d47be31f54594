//! Descriptive statistics over solve-time and difficulty samples.
//!
//! All functions use population statistics (divide by `n`) and return `None`
//! rather than NaN when the input cannot produce a meaningful value.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation. `None` for an empty slice.
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    let variance = samples
        .iter()
        .map(|s| {
            let d = s - mean;
            d * d
        })
        .sum::<f64>()
        / samples.len() as f64;
    Some(variance.sqrt())
}

/// Coefficient of variation `stddev / mean`.
///
/// `None` for an empty slice or a zero mean.
pub fn coefficient_of_variation(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    if mean == 0.0 {
        return None;
    }
    Some(std_dev(samples)? / mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_stats() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(coefficient_of_variation(&[]), None);
    }

    #[test]
    fn constant_series_has_zero_spread() {
        let samples = [480.0; 11];
        assert_eq!(mean(&samples), Some(480.0));
        assert_eq!(std_dev(&samples), Some(0.0));
        assert_eq!(coefficient_of_variation(&samples), Some(0.0));
    }

    #[test]
    fn population_std_dev() {
        // Classic example: population stddev of this set is exactly 2.
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&samples), Some(5.0));
        assert_eq!(std_dev(&samples), Some(2.0));
        assert_eq!(coefficient_of_variation(&samples), Some(0.4));
    }

    #[test]
    fn zero_mean_has_no_cv() {
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), None);
    }
}
