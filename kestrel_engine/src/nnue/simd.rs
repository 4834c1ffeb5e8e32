//! Fixed-width vector operations used by the network.
//!
//! Everything works on 16-lane chunks of `i16`. The implementation is plain portable Rust over
//! fixed-size arrays, which the compiler turns into packed instructions on every target.

pub const LANES: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C, align(32))]
pub struct VecI16(pub [i16; LANES]);

#[inline(always)]
pub fn zero() -> VecI16 {
    VecI16([0; LANES])
}

#[inline(always)]
pub fn load(src: &[i16]) -> VecI16 {
    let mut v = [0; LANES];
    v.copy_from_slice(&src[..LANES]);
    VecI16(v)
}

#[inline(always)]
pub fn store(dst: &mut [i16], v: VecI16) {
    dst[..LANES].copy_from_slice(&v.0);
}

#[inline(always)]
pub fn add_i16(a: VecI16, b: VecI16) -> VecI16 {
    let mut out = a.0;
    for (o, x) in out.iter_mut().zip(b.0.iter()) {
        *o = o.wrapping_add(*x);
    }
    VecI16(out)
}

#[inline(always)]
pub fn sub_i16(a: VecI16, b: VecI16) -> VecI16 {
    let mut out = a.0;
    for (o, x) in out.iter_mut().zip(b.0.iter()) {
        *o = o.wrapping_sub(*x);
    }
    VecI16(out)
}

/// Clamps every lane into `[0, max]`.
#[inline(always)]
pub fn crelu(a: VecI16, max: i16) -> VecI16 {
    let mut out = a.0;
    for o in out.iter_mut() {
        *o = (*o).clamp(0, max);
    }
    VecI16(out)
}

/// Dot product of an activated chunk with output weights.
#[inline(always)]
pub fn dot(a: VecI16, w: &[i8]) -> i32 {
    a.0.iter()
        .zip(w[..LANES].iter())
        .map(|(x, w)| *x as i32 * *w as i32)
        .sum()
}

/// Squared clipped ReLU dot product, `sum(clamp(x, 0, max)^2 * w)`.
#[inline(always)]
pub fn screlu_dot(a: VecI16, w: &[i8], max: i16) -> i32 {
    let c = crelu(a, max);
    c.0.iter()
        .zip(w[..LANES].iter())
        .map(|(x, w)| {
            let x = *x as i32;
            x * (x * *w as i32)
        })
        .sum()
}

/// `acc += weights`, chunk by chunk.
#[inline]
pub fn add_assign(acc: &mut [i16], weights: &[i16]) {
    debug_assert_eq!(acc.len(), weights.len());
    for (a, w) in acc.chunks_exact_mut(LANES).zip(weights.chunks_exact(LANES)) {
        store(a, add_i16(load(a), load(w)));
    }
}

/// `acc -= weights`, chunk by chunk.
#[inline]
pub fn sub_assign(acc: &mut [i16], weights: &[i16]) {
    debug_assert_eq!(acc.len(), weights.len());
    for (a, w) in acc.chunks_exact_mut(LANES).zip(weights.chunks_exact(LANES)) {
        store(a, sub_i16(load(a), load(w)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_arithmetic() {
        let a = VecI16([3; LANES]);
        let b = VecI16([-5; LANES]);
        assert_eq!(add_i16(a, b), VecI16([-2; LANES]));
        assert_eq!(sub_i16(a, b), VecI16([8; LANES]));
        assert_eq!(crelu(b, 255), zero());
        assert_eq!(crelu(VecI16([300; LANES]), 255), VecI16([255; LANES]));
    }

    #[test]
    fn dots() {
        let a = VecI16([10; LANES]);
        let w = [2i8; LANES];
        assert_eq!(dot(a, &w), 10 * 2 * LANES as i32);
        assert_eq!(screlu_dot(a, &w, 255), 100 * 2 * LANES as i32);
        assert_eq!(screlu_dot(VecI16([-4; LANES]), &w, 255), 0);
    }

    #[test]
    fn slices() {
        let mut acc = vec![1i16; LANES * 3];
        let w: Vec<i16> = (0..LANES as i16 * 3).collect();
        add_assign(&mut acc, &w);
        assert_eq!(acc[5], 6);
        sub_assign(&mut acc, &w);
        assert!(acc.iter().all(|&x| x == 1));
    }
}
