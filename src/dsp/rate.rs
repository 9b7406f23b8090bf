/*
Rational Rates
==============

A resampling ratio is stored as two small integers, `up` and `down`, always
in lowest terms. The output of a conversion has `up / down` times as many
samples as its input:

    up = 3, down = 2   →   64 input samples become 96 output samples
    up = 2, down = 3   →   96 input samples become 64 output samples

Why lowest terms? 4:2 and 2:1 describe the same conversion, but 4:2 would
run the filter at twice the intermediate rate for no benefit and would skew
every buffer size derived from the ratio.


Block Length Negotiation
------------------------

A realtime caller always asks for the same number of OUTPUT samples per
block. Input lengths are only ever whole multiples of `down`, so each call
yields a whole multiple of `up` outputs. When the block size is not a
multiple of `up`, no single input length works:

    up = 3, down = 2, block = 64

      max = ceil(64 / 3) * 2 = 44   →   66 outputs   (2 too many)
      min = floor(64 / 3) * 2 = 42  →   63 outputs   (1 too few)

Alternate the two so the surplus of one cancels the deficit of the other:

      [44, 42, 42]   →   66 + 63 + 63 = 192 = 3 * 64

The number of `min` calls equals the surplus of a `max` call and vice versa,
so the cycle is always exactly `up` calls long and never drifts.
*/

/// Binary GCD (Stein's algorithm).
///
/// `binary_gcd(0, v) == v`, `binary_gcd(u, 0) == u`, `binary_gcd(0, 0) == 0`.
pub const fn binary_gcd(mut u: u32, mut v: u32) -> u32 {
    if u == 0 {
        return v;
    }
    if v == 0 {
        return u;
    }

    // Largest power of two dividing both
    let shift = (u | v).trailing_zeros();
    u >>= u.trailing_zeros();

    loop {
        // u is odd from here on
        v >>= v.trailing_zeros();
        if u > v {
            let t = v;
            v = u;
            u = t;
        }
        v -= u;
        if v == 0 {
            break;
        }
    }

    u << shift
}

/// Input lengths that produce a fixed output block length.
///
/// Feed `max` for `num_max` calls, then `min` for `num_min` calls, and repeat.
/// When `min == max` both counts are 1 and every call uses the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLengths {
    pub min: usize,
    pub max: usize,
    pub num_min: usize,
    pub num_max: usize,
}

impl BlockLengths {
    /// True when every call uses the same input length.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Number of calls in one negotiation cycle.
    pub fn cycle_len(&self) -> usize {
        if self.is_fixed() {
            1
        } else {
            self.num_min + self.num_max
        }
    }

    /// Total input consumed over one cycle.
    pub fn cycle_input(&self) -> usize {
        if self.is_fixed() {
            self.max
        } else {
            self.num_max * self.max + self.num_min * self.min
        }
    }
}

/// Upsample/downsample factor pair in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RationalRate {
    up: u32,
    down: u32,
}

impl Default for RationalRate {
    fn default() -> Self {
        Self::UNITY
    }
}

impl RationalRate {
    pub const UNITY: RationalRate = RationalRate { up: 1, down: 1 };

    /// Build a rate from any factor pair. Zero factors are treated as 1.
    pub const fn new(up: u32, down: u32) -> Self {
        let up = if up == 0 { 1 } else { up };
        let down = if down == 0 { 1 } else { down };
        let gcd = binary_gcd(up, down);
        Self {
            up: up / gcd,
            down: down / gcd,
        }
    }

    pub const fn up(&self) -> u32 {
        self.up
    }

    pub const fn down(&self) -> u32 {
        self.down
    }

    pub const fn is_unity(&self) -> bool {
        self.up == 1 && self.down == 1
    }

    /// The larger of the two factors; selects the anti-alias kernel.
    pub const fn max_factor(&self) -> u32 {
        if self.up > self.down {
            self.up
        } else {
            self.down
        }
    }

    /// Output length for `num_in` input samples starting on the decimation grid.
    pub fn output_len(&self, num_in: usize) -> usize {
        (num_in * self.up as usize).div_ceil(self.down as usize)
    }

    /// Negotiate input lengths for a fixed output block of `num_out` samples.
    pub fn input_lengths(&self, num_out: usize) -> BlockLengths {
        let up = self.up as usize;
        let down = self.down as usize;

        let max = num_out.div_ceil(up) * down;
        let min = (num_out / up) * down;

        if max == min {
            return BlockLengths {
                min,
                max,
                num_min: 1,
                num_max: 1,
            };
        }

        BlockLengths {
            min,
            max,
            // surplus of one max-length call
            num_min: self.output_len(max) - num_out,
            // deficit of one min-length call
            num_max: num_out - self.output_len(min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euclid(mut a: u32, mut b: u32) -> u32 {
        while b != 0 {
            let t = b;
            b = a % b;
            a = t;
        }
        a
    }

    #[test]
    fn binary_gcd_matches_euclid() {
        let values = [
            0u32, 1, 2, 3, 4, 5, 6, 7, 8, 9, 12, 16, 18, 24, 27, 35, 48, 64, 81, 96, 100, 441,
            480, 1000, 44_100, 48_000, 65_536, 1 << 31, u32::MAX, u32::MAX - 1,
        ];
        for &u in &values {
            for &v in &values {
                assert_eq!(binary_gcd(u, v), euclid(u, v), "gcd({u}, {v})");
            }
        }
    }

    #[test]
    fn binary_gcd_edge_cases() {
        assert_eq!(binary_gcd(0, 0), 0);
        assert_eq!(binary_gcd(0, 7), 7);
        assert_eq!(binary_gcd(7, 0), 7);
        assert_eq!(binary_gcd(12, 12), 12);
        assert_eq!(binary_gcd(17, 4), 1);
        assert_eq!(binary_gcd(44_100, 48_000), 300);
    }

    #[test]
    fn rate_is_stored_in_lowest_terms() {
        let rate = RationalRate::new(16, 24);
        assert_eq!((rate.up(), rate.down()), (2, 3));
        assert_eq!(binary_gcd(rate.up(), rate.down()), 1);

        assert!(RationalRate::new(4, 4).is_unity());
        assert_eq!(RationalRate::new(0, 3), RationalRate::new(1, 3));
    }

    #[test]
    fn input_lengths_for_three_over_two() {
        let lengths = RationalRate::new(3, 2).input_lengths(64);
        assert_eq!(
            lengths,
            BlockLengths {
                min: 42,
                max: 44,
                num_min: 2,
                num_max: 1
            }
        );
        assert_eq!(lengths.cycle_len(), 3);
        assert_eq!(lengths.cycle_input(), 128);
    }

    #[test]
    fn input_lengths_fixed_when_block_divides() {
        let lengths = RationalRate::new(2, 3).input_lengths(64);
        assert!(lengths.is_fixed());
        assert_eq!(lengths.max, 96);
        assert_eq!(lengths.cycle_len(), 1);
    }

    #[test]
    fn negotiation_cycle_is_exact() {
        for up in 1..=4u32 {
            for down in 1..=4u32 {
                let rate = RationalRate::new(up, down);
                for block in [1usize, 7, 63, 64, 96, 127, 256] {
                    let lengths = rate.input_lengths(block);
                    let produced: usize = if lengths.is_fixed() {
                        rate.output_len(lengths.max)
                    } else {
                        lengths.num_max * rate.output_len(lengths.max)
                            + lengths.num_min * rate.output_len(lengths.min)
                    };
                    assert_eq!(
                        produced,
                        block * lengths.cycle_len(),
                        "rate {up}:{down}, block {block}"
                    );
                }
            }
        }
    }
}
