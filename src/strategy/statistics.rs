//! Rolling Statistics
//!
//! Mean, standard deviation, z-score and volatility-spike detection over a
//! [`PriceWindow`].
//!
//! Z-Score Formula: z = (mid - rolling_mean) / rolling_std
//!
//! A zero (or numerically negligible) standard deviation yields the sentinel
//! z-score `0.0`, which the classifier treats as "no information".

use statrs::statistics::Statistics;

use crate::strategy::params::{StdDevConvention, StrategyConfig};
use crate::strategy::window::PriceWindow;

/// Observations used for the short side of spike detection
pub const SPIKE_RECENT_WINDOW: usize = 5;

/// Standard deviations at or below this are treated as zero
const MIN_STD_DEV: f64 = 1e-10;

/// Signals computed for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSnapshot {
    /// Mid price of the current tick
    pub mid: f64,
    /// Rolling mean over the z window
    pub mean: f64,
    /// Rolling standard deviation over the z window
    pub std_dev: f64,
    /// Sentinel `0.0` when `std_dev` is zero
    pub z_score: f64,
    pub volatility_spike: bool,
}

impl SignalSnapshot {
    /// Rolling dispersion is large enough to standardize against
    pub fn has_dispersion(&self) -> bool {
        self.std_dev > MIN_STD_DEV
    }

    /// Check if z-score indicates oversold (below negative threshold)
    pub fn is_oversold(&self, threshold: f64) -> bool {
        self.z_score < -threshold
    }

    /// Check if z-score indicates overbought (above positive threshold)
    pub fn is_overbought(&self, threshold: f64) -> bool {
        self.z_score > threshold
    }

    /// Distance from mean in terms of standard deviations
    pub fn deviation_magnitude(&self) -> f64 {
        self.z_score.abs()
    }
}

/// Pure statistics over a price window, fixed to one std-dev convention
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine {
    convention: StdDevConvention,
}

impl StatisticsEngine {
    pub fn new(convention: StdDevConvention) -> Self {
        Self { convention }
    }

    /// Mean of the last `w` observations
    pub fn mean(&self, window: &PriceWindow, w: usize) -> Option<f64> {
        if w == 0 || !window.ready(w) {
            return None;
        }
        Some(window.recent(w).mean())
    }

    /// Standard deviation of the last `w` observations
    pub fn std_dev(&self, window: &PriceWindow, w: usize) -> Option<f64> {
        if w == 0 || !window.ready(w) {
            return None;
        }
        Some(self.dispersion(window, w))
    }

    /// `(mid - mean) / std`, or `0.0` when there is no dispersion
    pub fn z_score(mid: f64, mean: f64, std_dev: f64) -> f64 {
        if std_dev > MIN_STD_DEV && std_dev.is_finite() {
            (mid - mean) / std_dev
        } else {
            0.0
        }
    }

    /// Recent dispersion exceeds `spike_factor` times the `vol_window` baseline.
    /// Always false until `vol_window` observations exist.
    pub fn volatility_spike(&self, window: &PriceWindow, vol_window: usize, spike_factor: f64) -> bool {
        if vol_window == 0 || !window.ready(vol_window) {
            return false;
        }
        let baseline = self.dispersion(window, vol_window);
        let recent = self.dispersion(window, SPIKE_RECENT_WINDOW.min(window.len()));
        recent > spike_factor * baseline
    }

    /// Signals for the latest observation once every lookback is filled
    pub fn signals(&self, window: &PriceWindow, config: &StrategyConfig) -> Option<SignalSnapshot> {
        if !window.ready(config.max_window()) {
            return None;
        }
        let mid = window.latest()?;
        let mean = self.mean(window, config.z_window)?;
        let std_dev = self.std_dev(window, config.z_window)?;
        let volatility_spike = config
            .vol_window
            .map(|vol_window| self.volatility_spike(window, vol_window, config.vol_spike_factor))
            .unwrap_or(false);

        Some(SignalSnapshot {
            mid,
            mean,
            std_dev,
            z_score: Self::z_score(mid, mean, std_dev),
            volatility_spike,
        })
    }

    fn dispersion(&self, window: &PriceWindow, w: usize) -> f64 {
        let values = window.recent(w);
        let std_dev = match self.convention {
            StdDevConvention::Population => values.population_std_dev(),
            // a single observation has no sample dispersion
            StdDevConvention::Sample if w < 2 => 0.0,
            StdDevConvention::Sample => values.std_dev(),
        };
        if std_dev.is_finite() {
            std_dev
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window_of(prices: &[f64]) -> PriceWindow {
        let mut window = PriceWindow::new(prices.len());
        for &price in prices {
            window.append(price);
        }
        window
    }

    #[test]
    fn test_mean_and_population_std() {
        let window = window_of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let stats = StatisticsEngine::new(StdDevConvention::Population);

        assert_relative_eq!(stats.mean(&window, 8).unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev(&window, 8).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        let window = window_of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let stats = StatisticsEngine::new(StdDevConvention::Sample);

        // population variance 4.0 scaled by 8/7
        let expected = (32.0_f64 / 7.0).sqrt();
        assert_relative_eq!(stats.std_dev(&window, 8).unwrap(), expected, epsilon = 1e-12);

        // one observation has no sample dispersion rather than NaN
        assert_eq!(stats.std_dev(&window, 1), Some(0.0));
    }

    #[test]
    fn test_statistics_guard_on_history() {
        let window = window_of(&[100.0, 101.0]);
        let stats = StatisticsEngine::default();
        assert!(stats.mean(&window, 3).is_none());
        assert!(stats.std_dev(&window, 3).is_none());
        assert!(stats.mean(&window, 0).is_none());
    }

    #[test]
    fn test_statistics_use_last_w_only() {
        let window = window_of(&[1000.0, 10.0, 20.0, 30.0]);
        let stats = StatisticsEngine::default();
        assert_relative_eq!(stats.mean(&window, 3).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_z_score_sentinel() {
        assert_eq!(StatisticsEngine::z_score(105.0, 100.0, 0.0), 0.0);
        assert_eq!(StatisticsEngine::z_score(105.0, 100.0, 1e-12), 0.0);
        assert_relative_eq!(StatisticsEngine::z_score(105.0, 100.0, 2.0), 2.5);
        assert_relative_eq!(StatisticsEngine::z_score(96.0, 100.0, 2.0), -2.0);
    }

    #[test]
    fn test_volatility_spike_detection() {
        // baseline std over 10 is 9, recent std over 5 is 12
        let mut prices = vec![100.0; 9];
        prices.push(130.0);
        let window = window_of(&prices);
        let stats = StatisticsEngine::default();

        assert!(stats.volatility_spike(&window, 10, 1.25));
        assert!(!stats.volatility_spike(&window, 10, 1.5));
    }

    #[test]
    fn test_volatility_spike_needs_history() {
        let window = window_of(&[100.0, 130.0, 90.0]);
        let stats = StatisticsEngine::default();
        assert!(!stats.volatility_spike(&window, 10, 0.1));
        assert!(!stats.volatility_spike(&window, 0, 0.1));
    }

    #[test]
    fn test_flat_prices_produce_no_spike() {
        let window = window_of(&[100.0; 20]);
        let stats = StatisticsEngine::default();
        assert!(!stats.volatility_spike(&window, 20, 0.1));
    }

    #[test]
    fn test_signals_for_constant_prices() {
        let config = StrategyConfig::default().with_lookback(10);
        let mut window = PriceWindow::new(config.max_window());
        for _ in 0..10 {
            window.append(100.0);
        }

        let signals = StatisticsEngine::default().signals(&window, &config).unwrap();
        assert_eq!(signals.std_dev, 0.0);
        assert_eq!(signals.z_score, 0.0);
        assert!(!signals.has_dispersion());
    }

    #[test]
    fn test_signals_wait_for_longest_window() {
        let config = StrategyConfig::default()
            .with_lookback(5)
            .with_spike_gate(crate::strategy::SpikeGate::Required, 8, 1.0);
        let mut window = PriceWindow::new(config.max_window());
        let stats = StatisticsEngine::default();

        for i in 0..7 {
            window.append(100.0 + i as f64);
            assert!(stats.signals(&window, &config).is_none());
        }
        window.append(110.0);
        assert!(stats.signals(&window, &config).is_some());
    }

    #[test]
    fn test_snapshot_helpers() {
        let snapshot = SignalSnapshot {
            mid: 95.0,
            mean: 100.0,
            std_dev: 2.0,
            z_score: -2.5,
            volatility_spike: false,
        };
        assert!(snapshot.is_oversold(2.0));
        assert!(!snapshot.is_overbought(2.0));
        assert_eq!(snapshot.deviation_magnitude(), 2.5);
    }
}
