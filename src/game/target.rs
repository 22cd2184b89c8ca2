use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::state::MAX_GUESS;

/// 手机号末位为 0 或 1 时无法生成有效的数字范围。
pub const MIN_LAST_DIGIT: u8 = 2;
pub const MAX_LAST_DIGIT: u8 = 9;

/// 取手机号最后一位数字；非数字或不在 2..=9 范围内时返回 None。
pub fn last_digit_of(phone: &str) -> Option<u8> {
    let digit = phone.chars().last()?.to_digit(10)? as u8;
    (MIN_LAST_DIGIT..=MAX_LAST_DIGIT)
        .contains(&digit)
        .then_some(digit)
}

/// `last_digit` 在 1..=100 中的所有倍数。
pub fn multiples_of(last_digit: u8) -> Vec<u8> {
    if last_digit == 0 {
        return Vec::new();
    }
    (last_digit..=MAX_GUESS).step_by(last_digit as usize).collect()
}

pub struct TargetPicker {
    rng: SmallRng,
}

impl TargetPicker {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 在所有倍数中等概率选出一个。
    pub fn pick(&mut self, last_digit: u8) -> Option<u8> {
        multiples_of(last_digit).choose(&mut self.rng).copied()
    }
}

impl Default for TargetPicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn last_digit_rejects_zero_one_and_garbage() {
        assert_eq!(last_digit_of("5551234564"), Some(4));
        assert_eq!(last_digit_of("5551234569"), Some(9));
        assert_eq!(last_digit_of("5551234561"), None);
        assert_eq!(last_digit_of("5551234560"), None);
        assert_eq!(last_digit_of("555123456x"), None);
        assert_eq!(last_digit_of(""), None);
    }

    #[test]
    fn domain_sizes_match_the_multiples_up_to_100() {
        assert_eq!(multiples_of(4).len(), 25);
        assert_eq!(multiples_of(4).first(), Some(&4));
        assert_eq!(multiples_of(4).last(), Some(&100));
        assert_eq!(multiples_of(9).len(), 11);
        assert_eq!(multiples_of(9).last(), Some(&99));
        assert_eq!(multiples_of(2).len(), 50);
        assert!(multiples_of(0).is_empty());
    }

    #[test]
    fn picks_are_always_multiples_within_range() {
        let mut picker = TargetPicker::with_seed(7);
        for digit in MIN_LAST_DIGIT..=MAX_LAST_DIGIT {
            for _ in 0..200 {
                let target = picker.pick(digit).expect("domain is never empty");
                assert_eq!(target % digit, 0, "{target} is not a multiple of {digit}");
                assert!((digit..=MAX_GUESS).contains(&target));
            }
        }
    }

    #[test]
    fn picks_are_roughly_uniform() {
        let mut picker = TargetPicker::with_seed(2024);
        let digit = 7;
        let domain = multiples_of(digit);
        let trials = 42_000;
        let mut counts: HashMap<u8, u32> = HashMap::new();
        for _ in 0..trials {
            let target = picker.pick(digit).expect("domain is never empty");
            *counts.entry(target).or_default() += 1;
        }

        assert_eq!(counts.len(), domain.len(), "every multiple should be drawn");
        let expected = trials as f64 / domain.len() as f64;
        for value in &domain {
            let observed = f64::from(counts[value]);
            assert!(
                (observed - expected).abs() < expected * 0.15,
                "{value} drawn {observed} times, expected about {expected}"
            );
        }
    }
}
