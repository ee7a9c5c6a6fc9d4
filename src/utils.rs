/// decode a native-endian `f64` from the first 8 bytes of a slice
pub(crate) fn bytes_to_float(bytes: &[u8]) -> f64 {
    let mut arr = [0; 8];
    arr.copy_from_slice(&bytes[..8]);
    f64::from_ne_bytes(arr)
}

/// Append `value` to `out` with `precision` significant digits, following the rules of the
/// C `%g` conversion (which is also what a C++ stream does with `setprecision`).
///
/// Scientific notation is used when the decimal exponent is below -4 or at least
/// `precision`. Trailing zeros of the fraction are removed, and exponents carry a sign and
/// at least two digits.
pub(crate) fn format_significant(value: f64, precision: usize, out: &mut String) {
    if value.is_nan() {
        out.push_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        return;
    }

    if value.is_infinite() {
        out.push_str(if value.is_sign_negative() { "-inf" } else { "inf" });
        return;
    }

    if value == 0.0 {
        out.push_str(if value.is_sign_negative() { "-0" } else { "0" });
        return;
    }

    let precision = precision.max(1);

    // the exponent has to be taken after rounding to `precision` digits, 9.99..e2 may
    // round up to 1e3
    let scientific = format!("{:.*e}", precision - 1, value);
    // `{:e}` always writes `<mantissa>e<integer exponent>` for finite values
    let parsed = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)));
    let (mantissa, exponent) = match parsed {
        Some(parts) => parts,
        None => {
            out.push_str(&scientific);
            return;
        }
    };

    if exponent < -4 || exponent >= precision as i32 {
        out.push_str(trim_fraction(mantissa));
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.unsigned_abs()));
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        out.push_str(trim_fraction(&fixed));
    }
}

/// remove trailing zeros after a decimal point, and the point itself if nothing is left
fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
