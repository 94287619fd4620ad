//! Change tracking between a current and a previous scalar.

use common::{finite, round2, safe_div};

/// Absolute and percent change, both rounded to 2 decimals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Change {
    pub delta: Option<f64>,
    pub delta_pct: Option<f64>,
}

/// Change from `previous` to `current`.
///
/// Both fields are `None` if either side is missing or non-finite;
/// `delta_pct` alone is `None` when `previous == 0`.
pub fn change(current: Option<f64>, previous: Option<f64>) -> Change {
    let (Some(current), Some(previous)) = (finite(current), finite(previous)) else {
        return Change::default();
    };

    let delta = round2(current - previous);
    let delta_pct = safe_div(Some(current), Some(previous)).and_then(|r| round2((r - 1.0) * 100.0));

    Change { delta, delta_pct }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_change() {
        for x in [1.0, 1020.55, -3.5] {
            let c = change(Some(x), Some(x));
            assert_eq!(c.delta, Some(0.0));
            assert_eq!(c.delta_pct, Some(0.0));
        }
    }

    #[test]
    fn test_zero_previous() {
        let c = change(Some(12.346), Some(0.0));
        assert_eq!(c.delta, Some(12.35));
        assert_eq!(c.delta_pct, None);
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(change(None, Some(1.0)), Change::default());
        assert_eq!(change(Some(1.0), None), Change::default());
        assert_eq!(change(Some(f64::NAN), Some(1.0)), Change::default());
        assert_eq!(change(Some(1.0), Some(f64::INFINITY)), Change::default());
    }

    #[test]
    fn test_rounding() {
        let c = change(Some(1045.5), Some(1020.0));
        assert_eq!(c.delta, Some(25.5));
        assert_eq!(c.delta_pct, Some(2.5));

        let c = change(Some(1.02), Some(1.01));
        assert_eq!(c.delta, Some(0.01));
        assert_eq!(c.delta_pct, Some(0.99));
    }
}
