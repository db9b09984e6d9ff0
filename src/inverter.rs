//! Inversion of a ring element modulo a prime, and lifting that inverse to
//! a prime power via Hensel/Newton iteration.
//!
//! `invert` distinguishes two outcomes that are not the same kind of
//! thing: "no inverse exists" is routine control flow for key generation
//! (it triggers a resample), while "the modulus isn't a prime or a prime
//! power" is a genuine misuse of the API. The former is `Ok(None)`, the
//! latter is `Err(NtruError::ParameterInvalid(..))`.

use crate::error::{NtruError, Result};
use crate::numeric;
use crate::ring::{reduction_polynomial, RingElement};

/// Safety valve on the extended-Euclid loop below. Each non-swap step
/// strictly reduces `deg(f) + deg(g)`, so this is never approached for any
/// sane `N`; it exists to turn a logic bug into a `None` instead of a hang.
const MAX_EUCLID_STEPS: usize = 100_000;

/// `a * result ≡ 1 (mod x^N - 1, mod m)`.
///
/// `m` must be prime, or a prime power `p^k` whose base `p` is prime (the
/// only moduli the presets ever use: `p` itself, or `q` as a power of 2).
/// Returns `Ok(None)` when `a` has no inverse for that modulus — the
/// ordinary case when `gcd(a, x^N - 1)` is nontrivial over `F_p`.
pub fn invert(a: &RingElement, n: usize, m: i64) -> Result<Option<RingElement>> {
    if numeric::is_prime(m) {
        return Ok(invert_prime(a, n, m));
    }
    match prime_power_base(m) {
        Some(base) => match invert_prime(a, n, base) {
            Some(b1) => Ok(Some(lift(a, &b1, n, base, m))),
            None => Ok(None),
        },
        None => Err(NtruError::ParameterInvalid(format!(
            "modulus {m} is neither prime nor a prime power"
        ))),
    }
}

/// If `m = p^k` for a single prime `p`, return `p`.
fn prime_power_base(m: i64) -> Option<i64> {
    let factors = numeric::factorize(m);
    match factors.as_slice() {
        [(p, _)] => Some(*p),
        _ => None,
    }
}

/// Extended Euclidean algorithm in `F_p[x] / (x^N - 1)`. `p` must be prime.
fn invert_prime(a: &RingElement, n: usize, p: i64) -> Option<RingElement> {
    let mut f = a.reduce_coeffs(p).trim();
    let mut g = reduction_polynomial(n).reduce_coeffs(p).trim();
    let mut b = RingElement::new(vec![1]);
    let mut c = RingElement::new(vec![0]);

    for _ in 0..MAX_EUCLID_STEPS {
        let fd = match f.degree() {
            Some(0) => {
                let lead_f = f.coeffs()[0];
                let inv_lead = mod_inverse(lead_f, p)?;
                let result = b
                    .mul(&RingElement::new(vec![inv_lead]))
                    .reduce_coeffs(p)
                    .reduce_mod_i(n)
                    .pad_to(n);
                return Some(result);
            }
            None => return None,
            Some(d) => d,
        };
        let gd = match g.degree() {
            Some(d) => d,
            None => return None,
        };

        if fd < gd {
            std::mem::swap(&mut f, &mut g);
            std::mem::swap(&mut b, &mut c);
            continue;
        }

        let d = fd - gd;
        let lead_f = f.coeffs()[fd];
        let lead_g = g.coeffs()[gd];
        let inv_lead_g = mod_inverse(lead_g, p)?;
        let u = (lead_f * inv_lead_g).rem_euclid(p);
        let u_poly = RingElement::new(vec![u]);

        let term_f = u_poly.mul(&shift(&g, d)).reduce_coeffs(p);
        f = f.sub(&term_f).reduce_coeffs(p).trim();

        let term_b = u_poly.mul(&shift(&c, d)).reduce_coeffs(p);
        b = b.sub(&term_b).reduce_coeffs(p).trim();
    }
    None
}

/// Multiply by `x^d`: prepend `d` zero coefficients.
fn shift(poly: &RingElement, d: usize) -> RingElement {
    let mut coeffs = vec![0i64; d];
    coeffs.extend_from_slice(poly.coeffs());
    RingElement::new(coeffs)
}

/// Modular inverse of an integer via the extended Euclidean algorithm.
/// `None` if `a` and `m` are not coprime.
fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    let (mut old_r, mut r) = (a.rem_euclid(m), m);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        None
    } else {
        Some(old_s.rem_euclid(m))
    }
}

/// Hensel/Newton lift of a mod-`base` inverse `b1` to a mod-`target`
/// inverse, where `target` is a power of `base`. Doubles p-adic precision
/// each iteration: `b_{k+1} = b_k * (2 - a * b_k) mod p^{2^k} mod I`.
fn lift(a: &RingElement, b1: &RingElement, n: usize, base: i64, target: i64) -> RingElement {
    let mut b = b1.reduce_coeffs(base).pad_to(n);
    let mut precision = base;

    let mut two = vec![0i64; n];
    two[0] = 2;
    let two = RingElement::new(two);

    while precision < target {
        let next_precision = precision * precision;
        let ab = a.mul(&b).reduce_mod_i(n);
        let two_minus_ab = two.sub(&ab).reduce_coeffs(next_precision);
        b = b
            .mul(&two_minus_ab)
            .reduce_mod_i(n)
            .reduce_coeffs(next_precision);
        precision = next_precision;
    }

    b.reduce_coeffs(target)
}
