pub struct QuadratureHelper;

impl QuadratureHelper {
    /// Composite Simpson rule over `[a, b]`; `intervals` is rounded up to an even count.
    pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
    where
        F: Fn(f64) -> f64,
    {
        if a == b {
            return 0.0;
        }
        let n = (intervals.max(2) + 1) & !1;
        let h = (b - a) / n as f64;
        let mut sum = f(a) + f(b);
        for i in 1..n {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * f(a + i as f64 * h);
        }
        sum * h / 3.0
    }

    /// Running trapezoid integral of `y` over `x`; the first entry is zero.
    pub fn cumulative_trapezoid(x: &[f64], y: &[f64]) -> Vec<f64> {
        let mut cumulative = Vec::with_capacity(x.len());
        if x.is_empty() {
            return cumulative;
        }
        cumulative.push(0.0);
        let mut total = 0.0;
        for i in 1..x.len().min(y.len()) {
            total += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
            cumulative.push(total);
        }
        cumulative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simpson_is_exact_for_cubics() {
        let value = QuadratureHelper::simpson(|x| x * x * x - 2.0 * x, 0.0, 2.0, 2);
        assert!((value - 0.0).abs() < 1e-12);
        let value = QuadratureHelper::simpson(|x| x * x, 0.0, 3.0, 3);
        assert!((value - 9.0).abs() < 1e-12);
    }

    #[test]
    fn simpson_of_empty_interval_is_zero() {
        assert_eq!(QuadratureHelper::simpson(|x| x, 1.0, 1.0, 10), 0.0);
    }

    #[test]
    fn cumulative_trapezoid_accumulates_areas() {
        let cumulative = QuadratureHelper::cumulative_trapezoid(&[0.0, 1.0, 3.0], &[1.0, 1.0, 2.0]);
        assert_eq!(cumulative, vec![0.0, 1.0, 4.0]);
    }
}
