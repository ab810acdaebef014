#[cfg(test)]
mod tests {
    use crate::indicators::*;
    use report_core::TrendDirection;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn sample_prices() -> Vec<Option<f64>> {
        some(&[
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ])
    }

    #[test]
    fn rsi_stays_within_bounds() {
        let result = rsi(&sample_prices(), 14);

        assert!(result.last().unwrap().is_some());
        for value in result.iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn rsi_clamps_to_hundred_without_losses() {
        let uptrend: Vec<Option<f64>> = (0..20).map(|i| Some(100.0 + i as f64)).collect();
        let result = rsi(&uptrend, 14);

        assert_eq!(*result.last().unwrap(), Some(100.0));
    }

    #[test]
    fn rsi_is_undefined_on_a_flat_window() {
        let flat = some(&[1000.0; 30]);
        let result = rsi(&flat, 14);

        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_needs_a_full_window_of_changes() {
        let result = rsi(&some(&[1.0, 2.0, 3.0]), 14);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let result = macd(&sample_prices(), 12, 26, 9);

        for i in 0..result.line.len() {
            if let (Some(line), Some(signal), Some(hist)) =
                (result.line[i], result.signal[i], result.histogram[i])
            {
                assert!((hist - (line - signal)).abs() < 1e-9);
            }
        }
        assert!(result.histogram.last().unwrap().is_some());
    }

    #[test]
    fn bollinger_bands_keep_their_ordering() {
        let result = bollinger_bands(&sample_prices(), 10, 2.0);

        for i in 0..result.upper.len() {
            if let (Some(upper), Some(middle), Some(lower)) =
                (result.upper[i], result.middle[i], result.lower[i])
            {
                assert!(upper >= middle);
                assert!(middle >= lower);
            }
        }
    }

    #[test]
    fn bollinger_bands_collapse_on_constant_prices() {
        let flat = some(&[1000.0; 25]);
        let result = bollinger_bands(&flat, 20, 2.0);

        assert_eq!(*result.upper.last().unwrap(), Some(1000.0));
        assert_eq!(*result.middle.last().unwrap(), Some(1000.0));
        assert_eq!(*result.lower.last().unwrap(), Some(1000.0));
    }

    #[test]
    fn stochastic_stays_within_bounds() {
        let closes: Vec<Option<f64>> = (0..30).map(|i| Some(100.0 + (i % 7) as f64)).collect();
        let highs: Vec<Option<f64>> = closes.iter().map(|c| c.map(|c| c + 1.0)).collect();
        let lows: Vec<Option<f64>> = closes.iter().map(|c| c.map(|c| c - 1.0)).collect();

        let result = stochastic(&highs, &lows, &closes, 14, 3);

        assert!(result.k.last().unwrap().is_some());
        assert!(result.d.last().unwrap().is_some());
        for value in result.k.iter().chain(result.d.iter()).flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn stochastic_is_undefined_on_a_zero_range() {
        let flat = some(&[1000.0; 20]);
        let result = stochastic(&flat, &flat, &flat, 14, 3);

        assert!(result.k.iter().all(|v| v.is_none()));
        assert!(result.d.iter().all(|v| v.is_none()));
    }

    #[test]
    fn volume_ratio_is_one_for_constant_volume() {
        let volumes = some(&[5_000.0; 25]);
        let result = volume_ratio(&volumes, 20);

        assert!((result.last().unwrap().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_is_zero_on_constant_prices() {
        let flat = some(&[1000.0; 30]);
        let result = volatility(&flat, 20);

        assert!((result.last().unwrap().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn trend_follows_rising_prices() {
        let rising: Vec<Option<f64>> = (0..120).map(|i| Some(100.0 + i as f64)).collect();

        assert_eq!(
            trend_direction(&rising, 100),
            Some(TrendDirection::Uptrend)
        );
        let strength = trend_strength(&rising, 100).unwrap();
        assert!(strength > 0.0);
        assert!(strength <= 100.0);
    }

    #[test]
    fn trend_is_flat_on_constant_prices() {
        let flat = some(&[500.0; 60]);
        assert_eq!(trend_direction(&flat, 50), Some(TrendDirection::Flat));
        assert_eq!(trend_strength(&flat, 50), Some(0.0));
    }

    #[test]
    fn support_resistance_brackets_the_sample() {
        let closes: Vec<Option<f64>> = (0..100).map(|i| Some(100.0 + i as f64)).collect();
        let (support, resistance) = support_resistance(&closes, 100);

        assert_eq!(support.len(), 3);
        assert_eq!(resistance.len(), 3);
        assert_eq!(support[0], 100.0);
        assert_eq!(resistance[0], 199.0);
        // Quantile levels stay inside the observed range.
        for level in support.iter().chain(resistance.iter()) {
            assert!((100.0..=199.0).contains(level));
        }
    }

    #[test]
    fn support_resistance_is_empty_without_data() {
        let (support, resistance) = support_resistance(&[None, None], 50);
        assert!(support.is_empty());
        assert!(resistance.is_empty());
    }

    #[test]
    fn max_drawdown_finds_the_deepest_decline() {
        let closes = some(&[100.0, 120.0, 90.0, 110.0, 105.0]);
        let dd = max_drawdown(&closes, 252).unwrap();
        assert!((dd - 0.25).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_is_zero_for_monotone_gains() {
        let rising: Vec<Option<f64>> = (0..50).map(|i| Some(100.0 + i as f64)).collect();
        assert_eq!(max_drawdown(&rising, 252), Some(0.0));
    }
}
