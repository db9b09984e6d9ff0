//! Packing an arbitrary byte string into a sequence of ring-element blocks,
//! and the whitespace-separated-decimal ciphertext framing.

use rand::Rng;

use crate::cipher;
use crate::error::{NtruError, Result};
use crate::keygen::KeyPair;
use crate::numeric;
use crate::params::Params;
use crate::ring::RingElement;

/// Number of `N`-blocks needed to hold [`numeric::LENGTH_HEADER_BITS`].
fn header_block_count(n: usize) -> usize {
    round_up_to_multiple(numeric::LENGTH_HEADER_BITS, n) / n
}

/// Encrypt an arbitrary byte string under `h`, returning ciphertext as
/// whitespace-separated decimal coefficients, one block of `N` integers
/// per plaintext block (ECB-style concatenation: identical plaintext
/// blocks produce identical ciphertext blocks, which this format does not
/// hide).
///
/// The first [`header_block_count`] blocks carry the message's exact byte
/// length (zero-padded), so decryption can tell real trailing zero bytes
/// apart from the padding added to round the message up to a multiple of
/// `N`; the message itself follows, zero-padded the same way.
pub fn encrypt_string<R: Rng + ?Sized>(
    message: &[u8],
    h: &RingElement,
    params: &Params,
    rng: &mut R,
) -> String {
    let mut header_bits = numeric::u32_to_bits(message.len() as u32);
    header_bits.resize(header_block_count(params.n) * params.n, 0);

    let mut message_bits = numeric::bytes_to_bits(message);
    let padded_len = round_up_to_multiple(message_bits.len(), params.n);
    message_bits.resize(padded_len, 0);

    let mut bits = header_bits;
    bits.extend(message_bits);

    let mut out = String::new();
    for chunk in bits.chunks(params.n) {
        let m = RingElement::new(chunk.to_vec());
        let e = cipher::encrypt_block(&m, h, params, rng);
        push_block(&mut out, &e);
    }
    out
}

/// Decrypt a ciphertext produced by [`encrypt_string`] using the private
/// key. Rejects with [`NtruError::FramingError`] if the integer count
/// isn't a multiple of `N`, if the ciphertext is too short to carry the
/// length header, or if the header declares more bytes than remain.
pub fn decrypt_string(ciphertext: &str, key: &KeyPair, params: &Params) -> Result<Vec<u8>> {
    let values = parse_ciphertext(ciphertext)?;
    if values.len() % params.n != 0 {
        return Err(NtruError::FramingError(format!(
            "ciphertext has {} integers, not a multiple of N={}",
            values.len(),
            params.n
        )));
    }

    let mut bits = Vec::with_capacity(values.len());
    for block in values.chunks(params.n) {
        let e = RingElement::new(block.to_vec());
        let m = cipher::decrypt_block(&e, &key.f, &key.f_p, params)?;
        bits.extend(m.coeffs().iter().map(|&c| if c == 0 { 0 } else { 1 }));
    }

    let header_len = header_block_count(params.n) * params.n;
    if bits.len() < header_len {
        return Err(NtruError::FramingError(
            "ciphertext is shorter than the length header".to_string(),
        ));
    }
    let byte_len = numeric::bits_to_u32(&bits[..numeric::LENGTH_HEADER_BITS]) as usize;

    let message_bits = &bits[header_len..];
    let needed_bits = byte_len * 8;
    if message_bits.len() < needed_bits {
        return Err(NtruError::FramingError(format!(
            "length header declares {byte_len} bytes but only {} remain",
            message_bits.len() / 8
        )));
    }

    Ok(numeric::bits_to_bytes(&message_bits[..needed_bits]))
}

fn round_up_to_multiple(len: usize, n: usize) -> usize {
    if n == 0 {
        return len;
    }
    len.div_ceil(n) * n
}

fn push_block(out: &mut String, e: &RingElement) {
    for c in e.coeffs() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&c.to_string());
    }
}

fn parse_ciphertext(ciphertext: &str) -> Result<Vec<i64>> {
    ciphertext
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i64>().map_err(|_| {
                NtruError::FramingError(format!("malformed ciphertext integer: '{tok}'"))
            })
        })
        .collect()
}
