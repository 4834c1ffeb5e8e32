//! Macros for implementing bit operations, shifts and the `From` conversions on
//! single-field tuple structs such as `BitBoard` and `SQ`.

/// Implements a binary operator and its assigning form, both against the struct
/// itself and against the wrapped integer.
macro_rules! impl_indv_bit_ops {
    ($t:ty, $b:ty, $tname:ident, $fname:ident, $w:ident, $ta_name:ident, $fa_name:ident) => {
        impl $tname for $t {
            type Output = $t;

            #[inline(always)]
            fn $fname(self, rhs: $t) -> $t {
                Self::from((self.0).$w(rhs.0))
            }
        }

        impl $ta_name for $t {
            #[inline(always)]
            fn $fa_name(&mut self, rhs: $t) {
                *self = Self::from((self.0).$w(rhs.0));
            }
        }

        impl $tname<$b> for $t {
            type Output = $t;

            #[inline(always)]
            fn $fname(self, rhs: $b) -> $t {
                Self::from((self.0).$w(rhs))
            }
        }

        impl $ta_name<$b> for $t {
            #[inline(always)]
            fn $fa_name(&mut self, rhs: $b) {
                *self = Self::from((self.0).$w(rhs));
            }
        }
    };
}

/// Implements a shift operator by a `usize` amount. Shifting past the width yields zero
/// rather than wrapping around.
macro_rules! impl_indv_shift_ops {
    ($t:ty, $tname:ident, $fname:ident, $w:ident, $ta_name:ident, $fa_name:ident) => {
        impl $tname<usize> for $t {
            type Output = $t;

            #[inline(always)]
            fn $fname(self, rhs: usize) -> $t {
                Self::from((self.0).$w(rhs as u32).unwrap_or(0))
            }
        }

        impl $ta_name<usize> for $t {
            #[inline(always)]
            fn $fa_name(&mut self, rhs: usize) {
                *self = Self::from((self.0).$w(rhs as u32).unwrap_or(0));
            }
        }
    };
}

/// Implements `&, |, ^, !`, `<<, >>`, wrapping `+, -` and `From` in both directions for
/// a tuple struct wrapping the integer type `$b`.
macro_rules! impl_bit_ops {
    ($t:tt, $b:tt) => {
        impl From<$b> for $t {
            #[inline(always)]
            fn from(bit_type: $b) -> Self {
                $t(bit_type)
            }
        }

        impl From<$t> for $b {
            #[inline(always)]
            fn from(it: $t) -> Self {
                it.0
            }
        }

        impl_indv_bit_ops!($t, $b, BitOr, bitor, bitor, BitOrAssign, bitor_assign);
        impl_indv_bit_ops!($t, $b, BitAnd, bitand, bitand, BitAndAssign, bitand_assign);
        impl_indv_bit_ops!($t, $b, BitXor, bitxor, bitxor, BitXorAssign, bitxor_assign);
        impl_indv_bit_ops!($t, $b, Add, add, wrapping_add, AddAssign, add_assign);
        impl_indv_bit_ops!($t, $b, Sub, sub, wrapping_sub, SubAssign, sub_assign);

        impl_indv_shift_ops!($t, Shl, shl, checked_shl, ShlAssign, shl_assign);
        impl_indv_shift_ops!($t, Shr, shr, checked_shr, ShrAssign, shr_assign);

        impl Not for $t {
            type Output = $t;

            #[inline(always)]
            fn not(self) -> $t {
                $t(!self.0)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::ops::*;

    #[derive(Copy, Clone, Default, Hash, PartialEq, Eq, Debug)]
    struct DummyBB(pub u64);

    impl_bit_ops!(DummyBB, u64);

    const BIT_CONSTS: [u64; 6] = [
        0xFE00_C4D0,
        0x0001_2F45_0012,
        0xFFFF_FFFF,
        0x0000_0001,
        0xA0E3_4001_0000_0000,
        0x7BBB_B005,
    ];

    #[test]
    fn bit_ops_match_integers() {
        for &a in BIT_CONSTS.iter() {
            assert_eq!((!DummyBB(a)).0, !a);
            for &b in BIT_CONSTS.iter() {
                assert_eq!((DummyBB(a) & DummyBB(b)).0, a & b);
                assert_eq!((DummyBB(a) | DummyBB(b)).0, a | b);
                assert_eq!((DummyBB(a) ^ b).0, a ^ b);
                assert_eq!((DummyBB(a) - DummyBB(b)).0, a.wrapping_sub(b));
            }
        }
    }

    #[test]
    fn shifts_saturate_to_zero() {
        assert_eq!((DummyBB(1) << 63).0, 1 << 63);
        assert_eq!((DummyBB(1) << 64).0, 0);
        assert_eq!((DummyBB(u64::MAX) >> 70).0, 0);
    }
}
