//! Engine-wide numeric tolerances and output rounding.
//!
//! Both engines classify "balanced", "tight", and "saturated" against the
//! same two tolerances so that a certificate can never disagree with the
//! outcome that produced it.

/// Tolerance for conservation, saturation, and slack classification.
pub const EPS_BALANCE: f64 = 1e-9;

/// A residual capacity at or below this is treated as zero during BFS and
/// cut extraction.
pub const EPS_RESIDUAL: f64 = 1e-12;

/// Stand-in capacity for "unlimited" admission edges. Large enough that it
/// can never be the bottleneck of an augmenting path; flows are recovered
/// from reverse residuals and original-edge residuals, never by subtracting
/// from this value.
pub const UNBOUNDED: f64 = 1e12;

/// Round to six decimals, half away from zero. All numbers emitted by the
/// engines pass through this so repeat runs are byte-identical.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Whether a value is zero for output purposes (dropped from emitted maps).
pub fn negligible(value: f64) -> bool {
    value.abs() <= EPS_BALANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round6_truncates_to_six_decimals() {
        assert_eq!(round6(1636.3636363636), 1636.363636);
        assert_eq!(round6(1363.6363636363), 1363.636364);
        assert_eq!(round6(0.0000004), 0.0);
    }

    #[test]
    fn round6_rounds_away_from_zero() {
        assert_eq!(round6(0.00000075), 0.000001);
        assert_eq!(round6(-0.00000075), -0.000001);
        assert_eq!(round6(-0.0000002), 0.0);
    }

    #[test]
    fn round6_keeps_integers_exact() {
        assert_eq!(round6(1500.0), 1500.0);
        assert_eq!(round6(0.0), 0.0);
    }

    #[test]
    fn unbounded_sentinel_never_binds() {
        // Realistic throughputs leave the sentinel residual enormous, so a
        // sentinel edge can never be the bottleneck or read as saturated.
        let residual = UNBOUNDED - 1.0e6;
        assert!(residual > UNBOUNDED / 2.0);
        assert!(residual > EPS_RESIDUAL);
    }

    #[test]
    fn negligible_classification() {
        assert!(negligible(0.0));
        assert!(negligible(5e-10));
        assert!(!negligible(1e-8));
    }
}
