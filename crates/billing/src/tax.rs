//! Tax arithmetic on integer cents.

/// A total split into its taxable base and tax portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    /// Taxable base in smallest currency unit.
    pub subtotal: u64,
    /// Tax portion in smallest currency unit.
    pub tax: u64,
}

/// Split a tax-inclusive total into subtotal and tax for the given rate
/// (whole percent): `subtotal = total / (1 + rate/100)` rounded half-up to
/// the cent, `tax = total - subtotal`.
///
/// `subtotal + tax == total` holds by construction; the reconstruction
/// `subtotal * (1 + rate/100)` lands back on the total within one cent of
/// rounding.
pub fn split_total(total: u64, rate_percent: u8) -> TaxBreakdown {
    if rate_percent == 0 {
        return TaxBreakdown {
            subtotal: total,
            tax: 0,
        };
    }

    let denom = 100u128 + rate_percent as u128;
    let numer = total as u128 * 100;
    // Integer division, rounded half-up.
    let subtotal = ((numer + denom / 2) / denom) as u64;

    TaxBreakdown {
        subtotal,
        tax: total - subtotal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_fifteen_percent_exactly() {
        // $57.50 at 15% => subtotal $50.00, tax $7.50
        let b = split_total(5750, 15);
        assert_eq!(b.subtotal, 5000);
        assert_eq!(b.tax, 750);
    }

    #[test]
    fn zero_rate_means_no_tax() {
        let b = split_total(1234, 0);
        assert_eq!(b.subtotal, 1234);
        assert_eq!(b.tax, 0);
    }

    #[test]
    fn rounds_half_up_to_the_cent() {
        // $1.00 at 15% => base 86.956..c, rounds to 87c, tax 13c.
        let b = split_total(100, 15);
        assert_eq!(b.subtotal, 87);
        assert_eq!(b.tax, 13);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: the split always reassembles the total, and the
            /// reconstructed gross `subtotal * (1 + rate/100)` is within one
            /// cent of the original total.
            #[test]
            fn split_reconstructs_total(
                total in 0u64..100_000_000,
                rate in prop::sample::select(vec![0u8, 8, 12, 13, 14, 15])
            ) {
                let b = split_total(total, rate);
                prop_assert_eq!(b.subtotal + b.tax, total);

                let denom = 100u128 + rate as u128;
                let gross = (b.subtotal as u128 * denom + 50) / 100;
                let diff = gross.abs_diff(total as u128);
                prop_assert!(diff <= 1, "gross {} vs total {}", gross, total);
            }
        }
    }
}
