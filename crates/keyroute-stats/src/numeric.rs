//! Numeric helpers shared by the analyzer

use std::time::Duration;

/// Arithmetic mean of `durations`, truncated to whole nanoseconds
///
/// Zero for an empty slice.
pub fn average_duration(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }

    let total: u128 = durations.iter().map(Duration::as_nanos).sum();
    let average = total / durations.len() as u128;
    Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX))
}

/// Smallest and largest value, `None` when empty
pub fn min_max<I>(counts: I) -> Option<(u64, u64)>
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().fold(None, |acc, count| match acc {
        None => Some((count, count)),
        Some((min, max)) => Some((min.min(count), max.max(count))),
    })
}

/// Population standard deviation of `counts` around `mean`
///
/// Zero when empty.
pub fn population_std_dev(counts: &[u64], mean: f64) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = counts
        .iter()
        .map(|&count| {
            let diff = count as f64 - mean;
            diff * diff
        })
        .sum();

    (sum_squares / counts.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_duration() {
        let durations = [
            Duration::from_nanos(100),
            Duration::from_nanos(200),
            Duration::from_nanos(301),
        ];
        // 601 / 3 truncates to 200
        assert_eq!(average_duration(&durations), Duration::from_nanos(200));
        assert_eq!(average_duration(&[]), Duration::ZERO);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max([5, 1, 9, 3]), Some((1, 9)));
        assert_eq!(min_max([7]), Some((7, 7)));
        assert_eq!(min_max(std::iter::empty()), None);
    }

    #[test]
    fn test_population_std_dev() {
        // Classic example: population sd of [2,4,4,4,5,5,7,9] is 2
        let counts = [2, 4, 4, 4, 5, 5, 7, 9];
        assert!((population_std_dev(&counts, 5.0) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[], 0.0), 0.0);
        assert_eq!(population_std_dev(&[10, 10, 10], 10.0), 0.0);
    }
}
