//! NTRU parameter sets: `N`, `p`, `q`, and the three sampling weights.

use num_integer::Integer;

use crate::error::{NtruError, Result};
use crate::numeric;

/// Immutable parameter set for a session. Construct via a preset
/// ([`Params::moderate`], [`Params::high`], [`Params::highest`]) or
/// [`Params::custom`]; both paths run the same validation as the
/// original `setNpq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub n: usize,
    pub p: i64,
    pub q: i64,
    pub df: usize,
    pub dg: usize,
    pub dr: usize,
}

impl Params {
    /// Validate and construct a parameter set. Mirrors `setNpq`: `N` must
    /// be prime, `p` and `q` coprime with `8p <= q`, and every weight
    /// `d` must satisfy `2*d <= N`.
    pub fn custom(n: usize, p: i64, q: i64, df: usize, dg: usize, dr: usize) -> Result<Self> {
        if !numeric::is_prime(n as i64) {
            return Err(NtruError::ParameterInvalid(format!("N={n} is not prime")));
        }
        if p.gcd(&q) != 1 {
            return Err(NtruError::ParameterInvalid(format!(
                "p={p} and q={q} are not coprime"
            )));
        }
        if 8 * p > q {
            return Err(NtruError::ParameterInvalid(format!(
                "require 8p <= q, got 8*{p}={} > q={q}",
                8 * p
            )));
        }
        for (name, d) in [("df", df), ("dg", dg), ("dr", dr)] {
            if 2 * d > n {
                return Err(NtruError::ParameterInvalid(format!(
                    "2*{name}={} exceeds N={n}",
                    2 * d
                )));
            }
        }
        Ok(Self {
            n,
            p,
            q,
            df,
            dg,
            dr,
        })
    }

    pub fn moderate() -> Self {
        Self::custom(107, 3, 64, 15, 12, 5).expect("moderate preset is always valid")
    }

    pub fn high() -> Self {
        Self::custom(167, 3, 128, 61, 20, 18).expect("high preset is always valid")
    }

    pub fn highest() -> Self {
        Self::custom(503, 3, 256, 216, 72, 55).expect("highest preset is always valid")
    }

    pub fn from_mode(mode: &str) -> Result<Self> {
        match mode {
            "moderate" => Ok(Self::moderate()),
            "high" => Ok(Self::high()),
            "highest" => Ok(Self::highest()),
            other => Err(NtruError::ParameterInvalid(format!(
                "mode must be 'moderate', 'high', or 'highest', got '{other}'"
            ))),
        }
    }
}
