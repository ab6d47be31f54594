//! Linearly weighted moving average of clamped solve times.

use dmwda_types::RetargetParams;

/// Computes an LWMA over the most recent entries of a solve-time series.
///
/// Index 0 of every series is the genesis sentinel and is never part of a
/// window. Inside the window the oldest sample has weight 1 and the newest
/// has weight `window`. Each sample is clamped to
/// `[clamp_min, clamp_max]` first, so one forged timestamp moves the average
/// by a bounded amount.
#[derive(Clone, Debug)]
pub struct WindowAverager {
    target: f64,
    clamp_min: f64,
    clamp_max: f64,
}

impl WindowAverager {
    pub fn new(params: &RetargetParams) -> Self {
        Self {
            target: params.target_secs(),
            clamp_min: params.clamp_min(),
            clamp_max: params.clamp_max(),
        }
    }

    /// LWMA over the trailing `window_size` samples of `time_series`.
    ///
    /// The window is clamped to `time_series.len() - 1`. Series with fewer
    /// than two entries, or an empty window, yield the target time.
    pub fn average(&self, time_series: &[f64], window_size: usize) -> f64 {
        if time_series.len() < 2 {
            return self.target;
        }

        let window = window_size.min(time_series.len() - 1);
        let recent = &time_series[time_series.len() - window..];

        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for (position, &solve_time) in (1u32..).zip(recent) {
            let weight = f64::from(position);
            weighted_sum += solve_time.clamp(self.clamp_min, self.clamp_max) * weight;
            weight_sum += weight;
        }

        if weight_sum == 0.0 {
            return self.target;
        }
        weighted_sum / weight_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averager() -> WindowAverager {
        WindowAverager::new(&RetargetParams::production())
    }

    /// Sentinel followed by the given samples.
    fn series(samples: &[f64]) -> Vec<f64> {
        let mut s = vec![480.0];
        s.extend_from_slice(samples);
        s
    }

    #[test]
    fn short_series_returns_target() {
        let avg = averager();
        assert_eq!(avg.average(&[], 15), 480.0);
        assert_eq!(avg.average(&[100.0], 15), 480.0);
    }

    #[test]
    fn zero_window_returns_target() {
        assert_eq!(averager().average(&series(&[100.0, 200.0]), 0), 480.0);
    }

    #[test]
    fn constant_series_averages_to_itself() {
        assert_eq!(averager().average(&series(&[480.0; 30]), 15), 480.0);
    }

    #[test]
    fn newer_samples_weigh_more() {
        // Weights 1, 2, 3: (100 + 2*200 + 3*300) / 6 = 1400 / 6
        let avg = averager().average(&series(&[100.0, 200.0, 300.0]), 3);
        assert_eq!(avg, 1400.0 / 6.0);

        let reversed = averager().average(&series(&[300.0, 200.0, 100.0]), 3);
        assert!(avg > reversed);
    }

    #[test]
    fn window_uses_most_recent_samples() {
        // Only the last two samples fall inside a window of 2.
        let avg = averager().average(&series(&[4000.0, 100.0, 100.0]), 2);
        assert_eq!(avg, 100.0);
    }

    #[test]
    fn window_is_capped_by_history_and_skips_sentinel() {
        // Sentinel would pull the average toward 480 if it were included.
        let s = vec![1.0e6, 100.0, 100.0];
        assert_eq!(averager().average(&s, 120), 100.0);
    }

    #[test]
    fn samples_are_clamped() {
        let avg = averager();
        assert_eq!(avg.average(&series(&[1.0, 1.0, 1.0]), 3), 48.0);
        assert_eq!(avg.average(&series(&[1.0e9, 1.0e9]), 2), 4800.0);
    }

    #[test]
    fn clamp_follows_target_time() {
        let params = RetargetParams {
            target_time: 60,
            ..RetargetParams::production()
        };
        let avg = WindowAverager::new(&params);
        assert_eq!(avg.average(&series(&[0.5, 0.5]), 2), 6.0);
    }
}
