//! Reading and writing the flat, whitespace-delimited `.pub`/`.priv` key
//! file formats. This is the one external collaborator in the core: a
//! line-oriented parser that validates every header field and the
//! coefficient count against `N`, surfacing [`NtruError::FramingError`] on
//! any mismatch rather than silently truncating (the original's numpy
//! loader would happily read a short or ragged line).

use std::io::{BufRead, Write};

use crate::error::{NtruError, Result};
use crate::ring::RingElement;

/// Contents of a `.pub` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyFile {
    pub p: i64,
    pub q: i64,
    pub n: usize,
    pub dr: usize,
    pub h: RingElement,
}

/// Contents of a `.priv` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyFile {
    pub p: i64,
    pub q: i64,
    pub n: usize,
    pub df: usize,
    pub dg: usize,
    pub dr: usize,
    pub f: RingElement,
    pub fp: RingElement,
    pub fq: RingElement,
    pub g: RingElement,
}

pub fn write_public<W: Write>(w: &mut W, key: &PublicKeyFile) -> Result<()> {
    writeln!(w, "# p ::: {}", key.p)?;
    writeln!(w, "# q ::: {}", key.q)?;
    writeln!(w, "# N ::: {}", key.n)?;
    writeln!(w, "# d ::: {}", key.dr)?;
    writeln!(w, "# h :::")?;
    writeln!(w, "{}", coeffs_line(&key.h))?;
    Ok(())
}

pub fn read_public<R: BufRead>(r: &mut R) -> Result<PublicKeyFile> {
    let mut lines = r.lines();
    let p = parse_header_field(&mut lines, "p")?;
    let q = parse_header_field(&mut lines, "q")?;
    let n = parse_header_field(&mut lines, "N")? as usize;
    let dr = parse_header_field(&mut lines, "d")? as usize;
    expect_marker(&mut lines, "h")?;
    let h = parse_coeffs_line(&mut lines, n, "h")?;

    Ok(PublicKeyFile { p, q, n, dr, h })
}

pub fn write_private<W: Write>(w: &mut W, key: &PrivateKeyFile) -> Result<()> {
    writeln!(w, "# p ::: {}", key.p)?;
    writeln!(w, "# q ::: {}", key.q)?;
    writeln!(w, "# N ::: {}", key.n)?;
    writeln!(w, "# df ::: {}", key.df)?;
    writeln!(w, "# dg ::: {}", key.dg)?;
    writeln!(w, "# d ::: {}", key.dr)?;
    writeln!(w, "# f/fp/fq/g :::")?;
    writeln!(w, "{}", coeffs_line(&key.f))?;
    writeln!(w, "{}", coeffs_line(&key.fp))?;
    writeln!(w, "{}", coeffs_line(&key.fq))?;
    writeln!(w, "{}", coeffs_line(&key.g))?;
    Ok(())
}

pub fn read_private<R: BufRead>(r: &mut R) -> Result<PrivateKeyFile> {
    let mut lines = r.lines();
    let p = parse_header_field(&mut lines, "p")?;
    let q = parse_header_field(&mut lines, "q")?;
    let n = parse_header_field(&mut lines, "N")? as usize;
    let df = parse_header_field(&mut lines, "df")? as usize;
    let dg = parse_header_field(&mut lines, "dg")? as usize;
    let dr = parse_header_field(&mut lines, "d")? as usize;
    expect_marker(&mut lines, "f/fp/fq/g")?;
    let f = parse_coeffs_line(&mut lines, n, "f")?;
    let fp = parse_coeffs_line(&mut lines, n, "fp")?;
    let fq = parse_coeffs_line(&mut lines, n, "fq")?;
    let g = parse_coeffs_line(&mut lines, n, "g")?;

    Ok(PrivateKeyFile {
        p,
        q,
        n,
        df,
        dg,
        dr,
        f,
        fp,
        fq,
        g,
    })
}

fn coeffs_line(e: &RingElement) -> String {
    e.coeffs()
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_line(lines: &mut std::io::Lines<impl BufRead>, what: &str) -> Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(NtruError::FramingError(format!(
            "key file ended before {what}"
        ))),
    }
}

fn parse_header_field(lines: &mut std::io::Lines<impl BufRead>, name: &str) -> Result<i64> {
    let line = next_line(lines, name)?;
    let marker = format!("# {name} ::: ");
    let value = line.strip_prefix(&marker).ok_or_else(|| {
        NtruError::FramingError(format!("expected header '{marker}...', got '{line}'"))
    })?;
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| NtruError::FramingError(format!("malformed integer for field '{name}': '{value}'")))
}

fn expect_marker(lines: &mut std::io::Lines<impl BufRead>, name: &str) -> Result<()> {
    let line = next_line(lines, name)?;
    let expected = format!("# {name} :::");
    if line.trim_end() != expected {
        return Err(NtruError::FramingError(format!(
            "expected marker '{expected}', got '{line}'"
        )));
    }
    Ok(())
}

fn parse_coeffs_line(lines: &mut std::io::Lines<impl BufRead>, n: usize, name: &str) -> Result<RingElement> {
    let line = next_line(lines, name)?;
    let coeffs: std::result::Result<Vec<i64>, _> = line.split_whitespace().map(|t| t.parse::<i64>()).collect();
    let coeffs = coeffs
        .map_err(|_| NtruError::FramingError(format!("malformed coefficient in '{name}' line")))?;
    if coeffs.len() != n {
        return Err(NtruError::FramingError(format!(
            "'{name}' has {} coefficients, expected N={n}",
            coeffs.len()
        )));
    }
    Ok(RingElement::new(coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn public_key_round_trips() {
        let key = PublicKeyFile {
            p: 3,
            q: 64,
            n: 5,
            dr: 2,
            h: RingElement::new(vec![1, -2, 3, 0, -1]),
        };
        let mut buf = Vec::new();
        write_public(&mut buf, &key).unwrap();

        let mut cursor = Cursor::new(buf);
        let parsed = read_public(&mut cursor).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn private_key_round_trips() {
        let key = PrivateKeyFile {
            p: 3,
            q: 64,
            n: 4,
            df: 2,
            dg: 1,
            dr: 1,
            f: RingElement::new(vec![1, -1, 0, 1]),
            fp: RingElement::new(vec![1, 0, 0, 0]),
            fq: RingElement::new(vec![1, 2, 3, 4]),
            g: RingElement::new(vec![0, 1, -1, 0]),
        };
        let mut buf = Vec::new();
        write_private(&mut buf, &key).unwrap();

        let mut cursor = Cursor::new(buf);
        let parsed = read_private(&mut cursor).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn coefficient_count_mismatch_is_a_framing_error() {
        let text = "# p ::: 3\n# q ::: 64\n# N ::: 5\n# d ::: 2\n# h :::\n1 2 3\n";
        let mut cursor = Cursor::new(text);
        let err = read_public(&mut cursor).unwrap_err();
        assert!(matches!(err, NtruError::FramingError(_)));
    }

    #[test]
    fn malformed_header_is_a_framing_error() {
        let text = "not a header\n";
        let mut cursor = Cursor::new(text);
        let err = read_public(&mut cursor).unwrap_err();
        assert!(matches!(err, NtruError::FramingError(_)));
    }

    #[test]
    fn truncated_file_is_a_framing_error() {
        let text = "# p ::: 3\n";
        let mut cursor = Cursor::new(text);
        let err = read_public(&mut cursor).unwrap_err();
        assert!(matches!(err, NtruError::FramingError(_)));
    }
}
