//! Integer linear interpolation between ranges.

/// Re-maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Either range may be reversed. The result is not clamped: values outside
/// the input range extrapolate. Division truncates toward zero. A degenerate
/// input range maps everything to `out_min`.
///
/// # Examples
///
/// ```
/// use rover_bridge::control::interpolate::map_range;
///
/// assert_eq!(map_range(127, 127, 255, 0, 255), 0);
/// assert_eq!(map_range(255, 127, 255, 0, 255), 255);
/// assert_eq!(map_range(0, 127, 0, 0, 255), 255);
/// assert_eq!(map_range(0, 0, 255, 5, -5), 5);
/// ```
#[inline]
#[must_use]
pub fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_min == in_max {
        return out_min;
    }
    let scaled = (i64::from(value) - i64::from(in_min)) * (i64::from(out_max) - i64::from(out_min))
        / (i64::from(in_max) - i64::from(in_min));
    (scaled + i64::from(out_min)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// [`map_range`] clamped into `[0, max]` as a byte.
#[inline]
#[must_use]
pub fn map_to_byte(value: i32, in_min: i32, in_max: i32, max: u8) -> u8 {
    map_range(value, in_min, in_max, 0, i32::from(max)).clamp(0, i32::from(max)) as u8
}
