//! Order-independent summation of hour values.

/// Sums `values` so that the result depends only on the multiset of values,
/// never on the order they arrive in.
///
/// Values are sorted with [`f64::total_cmp`] and added with Neumaier
/// compensation, so short decimal sums like `0.1 + 0.2 + 0.3` come out as
/// `0.6`.
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for value in values {
        let next = sum + value;
        if sum.abs() >= value.abs() {
            compensation += (sum - next) + value;
        } else {
            compensation += (value - next) + sum;
        }
        sum = next;
    }

    sum + compensation
}
