/// Rounds a channel value and clamps it into `0..=255`.
pub(crate) fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Clamps a signed coordinate into `0..len`, or 0 for an empty axis.
pub(crate) fn in_range(v: i64, len: usize) -> usize {
    if v < 0 || len == 0 {
        0
    } else if v as u64 >= len as u64 {
        len - 1
    } else {
        v as usize
    }
}

/// Milliseconds as `f64` for log fields.
pub(crate) fn millis(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_rounds_and_clamps() {
        assert_eq!(channel(127.5), 128);
        assert_eq!(channel(-3.0), 0);
        assert_eq!(channel(300.2), 255);
        assert_eq!(channel(f64::NAN), 0);
    }

    #[test]
    fn in_range_clamps_both_ends() {
        assert_eq!(in_range(-4, 10), 0);
        assert_eq!(in_range(4, 10), 4);
        assert_eq!(in_range(12, 10), 9);
        assert_eq!(in_range(3, 0), 0);
    }
}
