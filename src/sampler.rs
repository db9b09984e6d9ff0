//! Random ternary polynomial sampling.

use rand::Rng;

use crate::ring::RingElement;

/// A uniformly random length-`n` sequence with exactly `plus` entries equal
/// to `+1`, `minus` entries equal to `-1`, and the remainder zero.
///
/// Built by laying out the multiset of values and running a Fisher–Yates
/// shuffle, so the RNG is the only source of randomness and can be a seeded
/// PRNG for reproducible tests. Panics if `plus + minus > n`.
pub fn gen_ternary<R: Rng + ?Sized>(n: usize, plus: usize, minus: usize, rng: &mut R) -> RingElement {
    assert!(plus + minus <= n, "too many nonzero coefficients for N={n}");

    let mut coeffs = Vec::with_capacity(n);
    coeffs.extend(std::iter::repeat(1i64).take(plus));
    coeffs.extend(std::iter::repeat(-1i64).take(minus));
    coeffs.extend(std::iter::repeat(0i64).take(n - plus - minus));

    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        coeffs.swap(i, j);
    }

    RingElement::new(coeffs)
}
