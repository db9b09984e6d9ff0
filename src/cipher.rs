//! Single-block encryption and decryption primitives.

use rand::Rng;

use crate::error::{NtruError, Result};
use crate::params::Params;
use crate::ring::RingElement;
use crate::sampler::gen_ternary;

/// `e = r*h + m mod I`, reduced mod `q` into balanced representatives.
/// `r` is a freshly sampled ternary masking polynomial.
pub fn encrypt_block<R: Rng + ?Sized>(
    m: &RingElement,
    h: &RingElement,
    params: &Params,
    rng: &mut R,
) -> RingElement {
    let r = gen_ternary(params.n, params.dr, params.dr, rng);
    r.mul(h).add(m).reduce_mod_i(params.n).reduce_coeffs(params.q)
}

/// Recover `m` from ciphertext block `e` given the private key `(f, f_p)`.
///
/// Rejects with [`NtruError::InputTooLong`] if `e`'s apparent degree is
/// `>= N` (a ciphertext block must have been produced by `encrypt_block`,
/// which never yields degree `>= N`).
pub fn decrypt_block(e: &RingElement, f: &RingElement, f_p: &RingElement, params: &Params) -> Result<RingElement> {
    if let Some(d) = e.degree() {
        if d >= params.n {
            return Err(NtruError::InputTooLong);
        }
    }

    let a = f.mul(e).reduce_mod_i(params.n).reduce_coeffs(params.q);
    let b = a.reduce_coeffs(params.p);
    let m = f_p.mul(&b).reduce_mod_i(params.n).reduce_coeffs(params.p);
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{KeyEngine, NullObserver};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_params() -> Params {
        Params::custom(11, 3, 32, 4, 3, 3).unwrap()
    }

    #[test]
    fn round_trips_a_ternary_message() {
        let params = small_params();
        let mut observer = NullObserver;
        let mut engine = KeyEngine::new(params, &mut observer);
        let mut rng = StdRng::seed_from_u64(7);
        let key = engine.generate(&mut rng, true).unwrap();

        let m = RingElement::new(vec![1, 0, -1, 0, 0, 1, 0, 0, -1, 0, 0]);
        let e = encrypt_block(&m, &key.h, &params, &mut rng);
        let recovered = decrypt_block(&e, &key.f, &key.f_p, &params).unwrap();

        assert_eq!(recovered.pad_to(params.n), m.pad_to(params.n));
    }

    #[test]
    fn rejects_oversized_ciphertext() {
        let params = small_params();
        let mut e_coeffs = vec![0i64; params.n + 1];
        e_coeffs[params.n] = 1;
        let e = RingElement::new(e_coeffs);
        let f = RingElement::zero(params.n);
        let f_p = RingElement::zero(params.n);
        let err = decrypt_block(&e, &f, &f_p, &params).unwrap_err();
        assert!(matches!(err, NtruError::InputTooLong));
    }

    #[test]
    fn spec_worked_example() {
        // Concrete scenario from the design document: N=11 ring with a
        // fixed f/g pair and a fixed masking polynomial r.
        let params = Params::custom(11, 3, 32, 4, 3, 3).unwrap();
        let f = RingElement::new(vec![1, 1, -1, 1, 0, 0, 0, -1, 0, 1, -1]);
        let fp = crate::inverter::invert(&f, params.n, params.p)
            .unwrap()
            .expect("f invertible mod p");
        let fq = crate::inverter::invert(&f, params.n, params.q)
            .unwrap()
            .expect("f invertible mod q");

        let check_p = f.mul(&fp).reduce_mod_i(params.n).reduce_coeffs(params.p);
        assert_eq!(check_p.degree(), Some(0));
        assert_eq!(check_p.coeffs()[0], 1);

        let check_q = f.mul(&fq).reduce_mod_i(params.n).reduce_coeffs(params.q);
        assert_eq!(check_q.degree(), Some(0));
        assert_eq!(check_q.coeffs()[0], 1);

        let g = RingElement::new(vec![0, 1, 0, -1, 1, 0, -1, 0, 1, 0, 0]);
        let h = {
            let p_const = RingElement::new(vec![params.p]);
            p_const.mul(&fq).mul(&g).reduce_mod_i(params.n).reduce_coeffs(params.q)
        };

        let m = RingElement::new(vec![1, 0, -1, 0, 0, 1, 0, 0, -1, 0, 0]);
        let r = RingElement::new(vec![0, 1, -1, 0, 1, 0, -1, 0, 0, 0, 0]);
        let e = r.mul(&h).add(&m).reduce_mod_i(params.n).reduce_coeffs(params.q);

        let recovered = decrypt_block(&e, &f, &fp, &params).unwrap();
        assert_eq!(recovered.pad_to(params.n), m.pad_to(params.n));
    }
}
