use keel_mparith::{MpFlt, MpInt};
use proptest::prelude::*;

fn int(v: i64) -> MpInt {
    MpInt::from_i64(v)
}

/// Dyadic value `n / 1024`, exact in both representations.
fn dyadic(n: i32) -> (MpFlt, f64) {
    let value = n as f64 / 1024.0;
    (MpFlt::from_f64(value).unwrap(), value)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn int_ring_ops_match_i128(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (a as i128, b as i128);
        prop_assert_eq!((int(a) + int(b)).to_string(), (x + y).to_string());
        prop_assert_eq!((int(a) - int(b)).to_string(), (x - y).to_string());
        prop_assert_eq!((int(a) * int(b)).to_string(), (x * y).to_string());
        prop_assert_eq!(int(a).compare(&int(b)), a.cmp(&b));
    }

    #[test]
    fn int_division_truncates_like_native(a in any::<i64>(), b in any::<i64>().prop_filter("nonzero", |b| *b != 0)) {
        let (x, y) = (a as i128, b as i128);
        prop_assert_eq!(int(a).checked_div(int(b)).unwrap().to_string(), (x / y).to_string());
        prop_assert_eq!(int(a).checked_rem(int(b)).unwrap().to_string(), (x % y).to_string());
    }

    #[test]
    fn int_shift_round_trips(a in any::<i64>(), s in 0u32..300) {
        prop_assert_eq!((int(a) << s) >> s, int(a));
    }

    #[test]
    fn int_display_parses_back(a in any::<i64>(), s in 0u32..200) {
        let value = int(a) << s;
        prop_assert_eq!(value.to_string().parse::<MpInt>(), Ok(value));
    }

    #[test]
    fn int_bitwise_matches_native(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!((int(a) & int(b)).to_i64(), Some(a & b));
        prop_assert_eq!((int(a) | int(b)).to_i64(), Some(a | b));
        prop_assert_eq!((int(a) ^ int(b)).to_i64(), Some(a ^ b));
        prop_assert_eq!((!int(a)).to_i64(), Some(!a));
    }

    #[test]
    fn float_f64_round_trip(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        prop_assert_eq!(MpFlt::from_f64(v).unwrap().to_f64(), v);
    }

    #[test]
    fn float_sum_is_exact(a in any::<i32>(), b in any::<i32>()) {
        let (x, xf) = dyadic(a);
        let (y, yf) = dyadic(b);
        prop_assert_eq!((x + y).to_f64(), xf + yf);
        prop_assert_eq!((x + y) - y, x);
        prop_assert_eq!(x.compare(&y), xf.partial_cmp(&yf).unwrap());
    }

    #[test]
    fn float_product_is_exact(a in any::<i16>(), b in any::<i16>()) {
        let (x, xf) = dyadic(a as i32);
        let (y, yf) = dyadic(b as i32);
        prop_assert_eq!((x * y).to_f64(), xf * yf);
    }

    #[test]
    fn float_parse_matches_f64(int_part in 0u32..1_000_000, frac in 0u32..1000, exp in -20i32..20) {
        let text = format!("{int_part}.{frac:03}e{exp}");
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(MpFlt::parse(&text).unwrap().to_f64(), expected);
    }
}
