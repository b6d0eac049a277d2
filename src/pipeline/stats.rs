// ---------------------------------------------------------------------------
// NaN-aware reductions
// ---------------------------------------------------------------------------

/// Mean of the non-NaN values. NaN when none remain.
pub fn nan_mean<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Median of the non-NaN values (mean of the two middle values for an even
/// count). NaN when none remain. Infinities take part in the ordering.
pub fn nan_median<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let mut finite: Vec<f64> = values.into_iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(|a, b| a.total_cmp(b));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    }
}

/// Plain arithmetic mean: any NaN poisons the result, no values gives NaN.
pub fn mean<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_relative_eq!(nan_median(&[3.0, 1.0, 2.0]), 2.0);
        assert_relative_eq!(nan_median(&[2.0, 4.0, 4.0, 10.0]), 4.0);
        assert_relative_eq!(nan_median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn nan_values_are_skipped() {
        assert_relative_eq!(nan_median(&[f64::NAN, 5.0, 1.0]), 3.0);
        assert_relative_eq!(nan_mean(&[f64::NAN, 5.0, 1.0]), 3.0);
    }

    #[test]
    fn all_nan_gives_nan() {
        assert!(nan_median(&[f64::NAN, f64::NAN]).is_nan());
        assert!(nan_mean(&[f64::NAN]).is_nan());
        assert!(nan_median(&Vec::<f64>::new()).is_nan());
    }

    #[test]
    fn plain_mean_propagates_nan() {
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert!(mean(&Vec::<f64>::new()).is_nan());
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn infinity_is_ordered_not_dropped() {
        assert_relative_eq!(nan_median(&[1.0, f64::INFINITY, 2.0]), 2.0);
    }
}
