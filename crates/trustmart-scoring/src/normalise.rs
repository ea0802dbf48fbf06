//! Price band normalisation and amount formatting.

/// Lower edge multiplier absorbing regional discounts.
pub const BAND_LOWER: f64 = 0.8;
/// Upper edge multiplier absorbing taxes and import duty.
pub const BAND_UPPER: f64 = 1.2;
/// Relative distance beyond a band edge still considered "Slightly Off".
pub const SLIGHT_TOLERANCE: f64 = 0.10;

/// Tolerance band around the observed `[min, max]` price range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandPosition {
    Within,
    /// Fraction below the lower edge, relative to that edge.
    Below(f64),
    /// Fraction above the upper edge, relative to that edge.
    Above(f64),
}

impl PriceBand {
    /// `None` when there are no usable amounts.
    pub fn from_amounts(amounts: &[f64]) -> Option<Self> {
        let usable = amounts.iter().copied().filter(|a| a.is_finite() && *a > 0.0);
        let (min, max) = usable.fold(None, |acc: Option<(f64, f64)>, a| match acc {
            None => Some((a, a)),
            Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
        })?;
        Some(Self { min, max, lower: min * BAND_LOWER, upper: max * BAND_UPPER })
    }

    pub fn position(&self, price: f64) -> BandPosition {
        if price < self.lower {
            BandPosition::Below((self.lower - price) / self.lower)
        } else if price > self.upper {
            BandPosition::Above((price - self.upper) / self.upper)
        } else {
            BandPosition::Within
        }
    }
}

/// `₹12,000`, `₹1,234.50`, `$99`.
pub fn format_amount(symbol: &str, amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{symbol}{grouped}")
    } else {
        format!("{sign}{symbol}{grouped}.{frac:02}")
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_from_amounts() {
        let band = PriceBand::from_amounts(&[15_000.0, 12_000.0]).unwrap();
        assert!((band.lower - 9_600.0).abs() < 1e-9);
        assert!((band.upper - 18_000.0).abs() < 1e-9);
        assert!(PriceBand::from_amounts(&[]).is_none());
        assert!(PriceBand::from_amounts(&[f64::NAN, 0.0]).is_none());
    }

    #[test]
    fn test_position_relative_to_edge() {
        let band = PriceBand::from_amounts(&[12_000.0, 15_000.0]).unwrap();
        assert_eq!(band.position(9_600.0), BandPosition::Within);
        assert_eq!(band.position(18_000.0), BandPosition::Within);
        match band.position(8_500.0) {
            BandPosition::Below(f) => assert!((f - 0.114_583).abs() < 1e-5),
            other => panic!("expected below, got {other:?}"),
        }
        assert!(matches!(band.position(19_000.0), BandPosition::Above(f) if f < SLIGHT_TOLERANCE));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("₹", 8_500.0), "₹8,500");
        assert_eq!(format_amount("₹", 149_999.0), "₹149,999");
        assert_eq!(format_amount("$", 99.5), "$99.50");
        assert_eq!(format_amount("₹", 950.0), "₹950");
        assert_eq!(format_percent(1_100.0 / 9_600.0), "11.5%");
    }
}
