//! Con level: how difficult `compare` looks from `level`'s point of view.
//!
//! # Formula
//!
//! ```text
//! step = max(1, (level + 9) / 10)        // integer division
//! con  = (compare - level) / step
//! ```
//!
//! Positive when `compare` is the higher level. Steps widen as `level` grows,
//! so a fixed level gap matters less at high level.

pub fn con_level(level: u8, compare: u8) -> f64 {
    let step = ((i32::from(level) + 9) / 10).max(1);
    f64::from(i32::from(compare) - i32::from(level)) / f64::from(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_levels_con_zero() {
        assert_eq!(con_level(30, 30), 0.0);
    }

    #[test]
    fn low_levels_use_unit_step() {
        assert_eq!(con_level(1, 3), 2.0);
        assert_eq!(con_level(1, 0), -1.0);
    }

    #[test]
    fn step_widens_with_level() {
        // level 50: step = 5
        assert_eq!(con_level(50, 55), 1.0);
        assert_eq!(con_level(50, 40), -2.0);
    }
}
