//! Integer helpers for block and stride arithmetic.

use std::ops::{Add, Rem, Sub};

/// Aligns a `value` to an `alignment`.
///
/// Returns the first number greater than or equal to `value` that is also a
/// multiple of `alignment`. If `value` is already a multiple of `alignment`,
/// `value` will be returned.
///
/// # Examples
///
/// ```
/// # use texcopy_types::math::align_to;
/// assert_eq!(align_to(253, 16), 256);
/// assert_eq!(align_to(256, 16), 256);
/// assert_eq!(align_to(0, 16), 0);
/// ```
pub fn align_to<T>(value: T, alignment: T) -> T
where
    T: Add<Output = T> + Copy + Default + PartialEq<T> + Rem<Output = T> + Sub<Output = T>,
{
    let remainder = value % alignment;
    if remainder == T::default() {
        value
    } else {
        value + alignment - remainder
    }
}

/// Number of `divisor`-sized blocks needed to cover `value` units.
///
/// Does not overflow for any `value`.
///
/// ```
/// # use texcopy_types::math::div_round_up;
/// assert_eq!(div_round_up(7, 4), 2);
/// assert_eq!(div_round_up(8, 4), 2);
/// assert_eq!(div_round_up(0, 4), 0);
/// assert_eq!(div_round_up(u32::MAX, 4), 1 << 30);
/// ```
pub fn div_round_up(value: u32, divisor: u32) -> u32 {
    value / divisor + u32::from(value % divisor != 0)
}
