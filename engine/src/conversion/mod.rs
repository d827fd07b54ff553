// Unit and currency conversion between the four price representations.
//
// Every function is total. A conversion that would divide by an unset (zero)
// exchange rate or a zero volume yields 0 instead of NaN or infinity.

use shared::models::{PriceInput, Representation, RepresentationSet};

pub const LITERS_PER_GALLON: f64 = 3.78541;

pub fn gallons_to_liters(gallons: f64) -> f64 {
    gallons * LITERS_PER_GALLON
}

pub fn liters_to_gallons(liters: f64) -> f64 {
    liters / LITERS_PER_GALLON
}

pub fn usd_to_mxn(usd: f64, rate: f64) -> f64 {
    usd * rate
}

pub fn mxn_to_usd(mxn: f64, rate: f64) -> f64 {
    if rate == 0.0 {
        return 0.0;
    }
    mxn / rate
}

pub fn usd_per_gal_to_mxn_per_ltr(usd_per_gallon: f64, rate: f64) -> f64 {
    if rate == 0.0 {
        return 0.0;
    }
    (usd_per_gallon / LITERS_PER_GALLON) * rate
}

pub fn mxn_per_ltr_to_usd_per_gal(mxn_per_liter: f64, rate: f64) -> f64 {
    if rate == 0.0 {
        return 0.0;
    }
    (mxn_per_liter / rate) * LITERS_PER_GALLON
}

/// `numerator / denominator`, or 0 when the denominator is zero.
fn per_unit(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Live inputs every conversion depends on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricingContext {
    /// MXN per USD. 0 means unset.
    pub exchange_rate: f64,
    pub gallons: f64,
    pub liters: f64,
}

impl PricingContext {
    pub fn new(exchange_rate: f64, gallons: f64) -> Self {
        Self {
            exchange_rate,
            gallons,
            liters: gallons_to_liters(gallons),
        }
    }

    /// Re-expresses `value`, stored as `from`, in the `to` representation.
    pub fn convert(&self, value: f64, from: Representation, to: Representation) -> f64 {
        use Representation::*;

        let rate = self.exchange_rate;
        let liters = self.liters;
        let gallons = self.gallons;
        match (from, to) {
            (MxnPerLiter, MxnPerLiter) => value,
            (MxnPerLiter, MxnTotal) => value * liters,
            (MxnPerLiter, UsdTotal) => mxn_to_usd(value * liters, rate),
            (MxnPerLiter, UsdPerGallon) => mxn_per_ltr_to_usd_per_gal(value, rate),

            (MxnTotal, MxnPerLiter) => per_unit(value, liters),
            (MxnTotal, MxnTotal) => value,
            (MxnTotal, UsdTotal) => mxn_to_usd(value, rate),
            (MxnTotal, UsdPerGallon) => per_unit(mxn_to_usd(value, rate), gallons),

            (UsdTotal, MxnPerLiter) => per_unit(usd_to_mxn(value, rate), liters),
            (UsdTotal, MxnTotal) => usd_to_mxn(value, rate),
            (UsdTotal, UsdTotal) => value,
            (UsdTotal, UsdPerGallon) => per_unit(value, gallons),

            (UsdPerGallon, MxnPerLiter) => usd_per_gal_to_mxn_per_ltr(value, rate),
            (UsdPerGallon, MxnTotal) => usd_per_gal_to_mxn_per_ltr(value, rate) * liters,
            (UsdPerGallon, UsdTotal) => value * gallons,
            (UsdPerGallon, UsdPerGallon) => value,
        }
    }

    /// All four representations of one canonical pair.
    pub fn derive(&self, input: PriceInput) -> RepresentationSet {
        RepresentationSet::from_fn(|to| self.convert(input.value, input.representation, to))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {} but got {} (tolerance {})",
            expected,
            actual,
            tolerance
        );
    }

    fn sample_context() -> PricingContext {
        PricingContext::new(20.0, 100.0)
    }

    #[test]
    fn test_volume_round_trip() {
        for gallons in [0.0, 1.0, 3.5, 100.0, 12345.678] {
            assert_close(liters_to_gallons(gallons_to_liters(gallons)), gallons);
        }
        assert_close(gallons_to_liters(100.0), 378.541);
    }

    #[test]
    fn test_zero_rate_yields_zero() {
        assert_eq!(mxn_to_usd(100.0, 0.0), 0.0);
        assert_eq!(usd_per_gal_to_mxn_per_ltr(3.0, 0.0), 0.0);
        assert_eq!(mxn_per_ltr_to_usd_per_gal(3.0, 0.0), 0.0);
        assert_eq!(usd_to_mxn(5.0, 0.0), 0.0);

        let ctx = PricingContext::new(0.0, 100.0);
        for from in Representation::ALL {
            for to in Representation::ALL {
                let value = ctx.convert(7.0, from, to);
                assert!(value.is_finite(), "{:?} -> {:?} produced {}", from, to, value);
            }
        }
    }

    #[test]
    fn test_zero_volume_yields_zero() {
        let ctx = PricingContext::new(20.0, 0.0);
        assert_eq!(ctx.convert(50.0, Representation::MxnTotal, Representation::MxnPerLiter), 0.0);
        assert_eq!(ctx.convert(50.0, Representation::MxnTotal, Representation::UsdPerGallon), 0.0);
        assert_eq!(ctx.convert(50.0, Representation::UsdTotal, Representation::UsdPerGallon), 0.0);
        assert_eq!(ctx.convert(50.0, Representation::UsdTotal, Representation::MxnPerLiter), 0.0);
    }

    #[test]
    fn test_usd_per_gallon_derivation() {
        let set = sample_context().derive(PriceInput::new(1.0, Representation::UsdPerGallon));
        assert_close(set.mxn_per_liter, 20.0 / LITERS_PER_GALLON);
        assert!((set.mxn_per_liter - 5.2834).abs() < 1e-3);
        assert_close(set.mxn_total, 2000.0);
        assert_close(set.usd_total, 100.0);
        assert_close(set.usd_per_gallon, 1.0);
    }

    #[test]
    fn test_every_pair_round_trips() {
        let ctx = sample_context();
        for from in Representation::ALL {
            for to in Representation::ALL {
                let there = ctx.convert(12.345, from, to);
                let back = ctx.convert(there, to, from);
                assert_close(back, 12.345);
            }
        }
    }

    #[test]
    fn test_derived_set_is_self_consistent() {
        let ctx = PricingContext::new(17.25, 42.0);
        for from in Representation::ALL {
            let set = ctx.derive(PriceInput::new(3.21, from));
            for r1 in Representation::ALL {
                for r2 in Representation::ALL {
                    assert_close(ctx.convert(set.get(r1), r1, r2), set.get(r2));
                }
            }
        }
    }
}
