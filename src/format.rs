use rust_decimal::{Decimal, RoundingStrategy};

/// Format a value with exactly `dp` decimal places.
///
/// Rounds half away from zero, then pads or truncates the fraction so the
/// fixed-width report columns line up.
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    pad_fraction_to_dp(&rounded.normalize().to_string(), dp)
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    if dp == 0 {
        return s
            .split_once('.')
            .map(|(i, _)| i.to_string())
            .unwrap_or_else(|| s.to_string());
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(dp as usize) {
        out.push(ch);
        written += 1;
    }
    while written < dp as usize {
        out.push('0');
        written += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn format_fixed_pads_trailing_zeros() {
        let d = Decimal::from_str("1234.5").unwrap();
        assert_eq!(format_fixed(d, 2), "1234.50");
    }

    #[test]
    fn format_fixed_rounds_half_away_from_zero() {
        let d = Decimal::from_str("2.345").unwrap();
        assert_eq!(format_fixed(d, 2), "2.35");
        let d = Decimal::from_str("-2.345").unwrap();
        assert_eq!(format_fixed(d, 2), "-2.35");
    }

    #[test]
    fn format_fixed_with_zero_dp_drops_the_fraction() {
        let d = Decimal::from_str("1234.99").unwrap();
        assert_eq!(format_fixed(d, 0), "1235");
    }

    #[test]
    fn format_fixed_whole_numbers_gain_a_fraction() {
        let d = Decimal::from_str("7").unwrap();
        assert_eq!(format_fixed(d, 4), "7.0000");
    }
}
