/// Number-to-text rendering for the logger's hot path.
///
/// These routines append decimal text straight into a caller-owned byte
/// buffer. They never allocate beyond growing that buffer and never go
/// through `core::fmt`, which keeps header composition and `%d`/`%f`
/// rendering cheap.

/// Largest number of decimal digits a `u64` can need.
const MAX_DIGITS: usize = 20;

/// Appends `i` in base 10 to `dst`.
///
/// `min_width` pads the digits with leading zeros; `0` means natural length.
/// For negative values the minus sign comes before the padding, so
/// `itoa(dst, -5, 3)` appends `-005`.
///
/// # Examples
///
/// ```
/// # use alog::codec::itoa;
/// let mut buf = Vec::new();
/// itoa(&mut buf, 7, 2);
/// buf.push(b'/');
/// itoa(&mut buf, -42, 0);
/// assert_eq!(buf, b"07/-42");
/// ```
#[inline]
pub fn itoa(dst: &mut Vec<u8>, i: i64, min_width: usize) {
    push_digits(dst, i.unsigned_abs(), i < 0, min_width);
}

/// Appends the unsigned value `u` in base 10 to `dst`, padded like [`itoa`].
#[inline]
pub fn utoa(dst: &mut Vec<u8>, u: u64, min_width: usize) {
    push_digits(dst, u, false, min_width);
}

/// Appends `f` with exactly `places` decimal places.
///
/// The integer part is truncated toward zero and rendered through [`itoa`];
/// the fractional part is scaled by `10^places`, truncated, and rendered with
/// zero padding to `places` digits. No rounding is performed.
///
/// # Examples
///
/// ```
/// # use alog::codec::ftoa;
/// let mut buf = Vec::new();
/// ftoa(&mut buf, -0.5, 2);
/// assert_eq!(buf, b"-0.50");
/// ```
pub fn ftoa(dst: &mut Vec<u8>, f: f64, places: usize) {
    let whole = f.trunc() as i64;
    // itoa cannot carry the sign of a zero integer part
    if whole == 0 && f < 0.0 {
        dst.push(b'-');
    }
    itoa(dst, whole, 0);

    if places > 0 {
        let multiplier = 10u64.saturating_pow(places as u32);
        dst.push(b'.');
        let frac = ((f - f.trunc()) * multiplier as f64) as i64;
        utoa(dst, frac.unsigned_abs(), places);
    }
}

fn push_digits(dst: &mut Vec<u8>, mut mag: u64, negative: bool, min_width: usize) {
    let mut digits = [0u8; MAX_DIGITS];
    let mut idx = MAX_DIGITS;

    loop {
        idx -= 1;
        digits[idx] = b'0' + (mag % 10) as u8;
        mag /= 10;
        if mag == 0 {
            break;
        }
    }

    if negative {
        dst.push(b'-');
    }
    let len = MAX_DIGITS - idx;
    if min_width > len {
        dst.resize(dst.len() + (min_width - len), b'0');
    }
    dst.extend_from_slice(&digits[idx..]);
}
