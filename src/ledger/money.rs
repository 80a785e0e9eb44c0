//! Cent-precision helpers for `f64` amounts.

/// Rounds an amount to cent precision (two decimal places).
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_cents(100.0 / 3.0), 33.33);
        assert_eq!(round_cents(1200.0 / 7.0), 171.43);
        assert_eq!(round_cents(400.0), 400.0);
    }

    #[test]
    fn rounds_negative_amounts_symmetrically() {
        assert_eq!(round_cents(-100.0 / 3.0), -33.33);
        assert_eq!(round_cents(-10.004), -10.0);
    }
}
