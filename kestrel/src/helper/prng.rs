//! Xorshift pseudo-random number generator, used to build magic numbers and Zobrist keys
//! reproducibly from fixed seeds.

/// Object for generating pseudo-random numbers.
pub struct PRNG {
    seed: u64,
}

impl PRNG {
    /// Creates PRNG from a seed. The seed must not be zero.
    #[inline(always)]
    pub fn init(s: u64) -> PRNG {
        debug_assert_ne!(s, 0);
        PRNG { seed: s }
    }

    /// Returns a pseudo-random number.
    pub fn rand(&mut self) -> u64 {
        self.seed ^= self.seed >> 12;
        self.seed ^= self.seed << 25;
        self.seed ^= self.seed >> 27;
        self.seed.wrapping_mul(2_685_821_657_736_338_717)
    }

    /// Returns a pseudo-random number with on average 8 bits being set.
    pub fn sparse_rand(&mut self) -> u64 {
        let mut s = self.rand();
        s &= self.rand();
        s &= self.rand();
        s
    }
}
