pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Number of values greater than or equal to `threshold`.
    pub fn count_at_least(values: &[f64], threshold: f64) -> usize {
        values.iter().filter(|&&v| v >= threshold).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
    }

    #[test]
    fn mean_handles_mixed_values() {
        assert_eq!(StatsHelper::mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn count_at_least_includes_threshold() {
        assert_eq!(StatsHelper::count_at_least(&[0.0, 8.0, 7.99, 12.0], 8.0), 2);
        assert_eq!(StatsHelper::count_at_least(&[0.0, 0.0], 0.0), 2);
    }
}
