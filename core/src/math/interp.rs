pub struct InterpHelper;

impl InterpHelper {
    /// Linear interpolation on an increasing grid, `None` outside `[xs[0], xs[n-1]]`.
    pub fn linear(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
        let (first, last) = (*xs.first()?, *xs.last()?);
        if !(first..=last).contains(&x) || ys.len() != xs.len() {
            return None;
        }
        let upper = xs.partition_point(|&v| v < x);
        if upper == 0 {
            return Some(ys[0]);
        }
        let lower = upper - 1;
        let span = xs[upper] - xs[lower];
        let t = (x - xs[lower]) / span;
        Some(ys[lower] + t * (ys[upper] - ys[lower]))
    }
}
