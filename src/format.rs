/// Rounds `x` to `precision` decimal places, infinities and `NaN` pass through
pub fn round(x: f64, precision: usize) -> f64 {
    if !x.is_finite() {
        return x;
    }

    let scale = 10f64.powi(precision as i32);
    let rounded = (x * scale).round() / scale;

    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}

/// `x` with exactly `precision` decimal places
pub fn fixed(x: f64, precision: usize) -> String {
    if x.is_infinite() {
        if x > 0.0 {
            "inf".to_owned()
        } else {
            "-inf".to_owned()
        }
    } else {
        format!("{:.*}", precision, x)
    }
}

/// At most 6 characters for positive values below a million
pub fn short(n: f64) -> String {
    if n.is_infinite() {
        return fixed(n, 0);
    }

    if n < 10.0 {
        format!("{:.4}", n)
    } else if n < 100.0 {
        format!("{:.3}", n)
    } else if n < 1000.0 {
        format!("{:.2}", n)
    } else if n < 10000.0 {
        format!("{:.1}", n)
    } else {
        format!("{:.0}", n)
    }
}

/// `short` with an explicit sign
pub fn signed_short(n: f64) -> String {
    let n_abs = n.abs();

    let sign = if n >= 0.0 { '+' } else { '\u{2212}' };
    format!("{}{}", sign, short(n_abs))
}

/// p-values below the displayable range are shown as an upper bound
pub fn p_value(p: f64) -> String {
    if p < 1e-4 {
        "< 0.0001".to_owned()
    } else {
        format!("{:.4}", p)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_max_len() {
        let mut float = 1.0;
        while float < 999_999.9 {
            let string = short(float);
            println!("{}", string);
            assert!(string.len() <= 6);
            float *= 2.0;
        }
    }

    #[test]
    fn signed_short_max_len() {
        let mut float = -1.0;
        while float > -999_999.9 {
            let string = signed_short(float);
            println!("{}", string);
            assert!(string.chars().count() <= 7);
            float *= 2.0;
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round(9.7845, 2), 9.78);
        assert_eq!(round(-0.125, 1), -0.1);
        assert_eq!(round(2.5, 0), 3.0);
        assert_eq!(round(f64::INFINITY, 2), f64::INFINITY);
        assert!(round(f64::NAN, 2).is_nan());
    }

    #[test]
    fn fixed_places() {
        assert_eq!(fixed(0.6, 2), "0.60");
        assert_eq!(fixed(2.2, 0), "2");
        assert_eq!(fixed(f64::INFINITY, 3), "inf");
        assert_eq!(fixed(f64::NEG_INFINITY, 3), "-inf");
    }

    #[test]
    fn p_values() {
        assert_eq!(p_value(0.124_027), "0.1240");
        assert_eq!(p_value(0.0), "< 0.0001");
        assert_eq!(p_value(3e-7), "< 0.0001");
    }
}
