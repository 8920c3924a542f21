//! Run-length encoding for texel data.
//!
//! Captured textures are mostly flat color, lightmaps especially, so even a
//! naive run-length encoding shrinks them a lot before they go into a
//! command log's side stream.
//!
//! The unit of comparison is one texel, `texel_size` bytes wide. A stream of
//! identical RGBA texels looks like a repeating four-byte pattern when viewed
//! as bytes, and has no byte runs at all, but compresses perfectly as texels.
//!
//! ## Format
//!
//! The data is written as alternating 'runs' and 'literals':
//!
//! - A 'run' is a count C followed by one texel, and represents C repetitions
//!   of that texel.
//!
//! - A 'literal' is a count C followed by C texels, verbatim.
//!
//! The stream is either empty, or starts with a run. Runs and literals
//! alternate from there. Literal counts may be zero, if the encoder just wants
//! to switch from one run to another. All counts are unsigned LEB128.

use crate::var::{self, DeserializeError};
use std::io;

/// The shortest repetition we bother ending a literal for.
const MIN_RUN: usize = 4;

/// Write `data`, a sequence of `texel_size`-byte texels, to `stream` with
/// run-length encoding.
pub fn write_texels<S>(stream: &mut S, data: &[u8], texel_size: usize) -> Result<(), io::Error>
where
    S: io::Write,
{
    assert!(texel_size > 0);
    assert_eq!(
        data.len() % texel_size,
        0,
        "gl-snapshot: rle::write_texels: data is not a whole number of texels"
    );

    let texels: Vec<&[u8]> = data.chunks_exact(texel_size).collect();
    let mut pos = 0;
    while pos < texels.len() {
        // A run always covers at least one texel.
        let run = run_length(&texels[pos..], usize::MAX);
        leb128::write::unsigned(stream, run as u64)?;
        stream.write_all(texels[pos])?;
        pos += run;

        if pos == texels.len() {
            break;
        }

        // Don't bother trying to find the optimal place to end a literal;
        // just stop at the first run of `MIN_RUN` texels.
        let start = pos;
        while pos < texels.len() && run_length(&texels[pos..], MIN_RUN) < MIN_RUN {
            pos += 1;
        }
        leb128::write::unsigned(stream, (pos - start) as u64)?;
        stream.write_all(&data[start * texel_size..pos * texel_size])?;
    }

    Ok(())
}

/// Count how many texels at the front of `texels` equal the first, up to `limit`.
fn run_length(texels: &[&[u8]], limit: usize) -> usize {
    match texels.first() {
        None => 0,
        Some(lead) => texels.iter().take(limit).take_while(|t| t == &lead).count(),
    }
}

/// Decode the run-length encoded texels in `buf`, which must hold exactly
/// one encoded stream.
///
/// Fail if the stream would produce more than `max_len` bytes, so corrupt
/// counts can't make us allocate without bound.
pub fn read_texels(
    mut buf: &[u8],
    texel_size: usize,
    max_len: usize,
) -> Result<Vec<u8>, DeserializeError> {
    assert!(texel_size > 0);
    let mut texels = Vec::new();
    let mut in_run = true;

    while !buf.is_empty() {
        let count = leb128::read::unsigned(&mut buf)?;
        let count = usize::try_from(count).map_err(|_| DeserializeError::Overflow)?;
        let len = count
            .checked_mul(texel_size)
            .ok_or(DeserializeError::Overflow)?;
        let total = texels
            .len()
            .checked_add(len)
            .ok_or(DeserializeError::Overflow)?;
        if total > max_len {
            return Err(DeserializeError::SizeMismatch {
                expected: max_len,
                actual: total,
            });
        }

        if in_run {
            let texel = var::take(&mut buf, texel_size)?;
            for _ in 0..count {
                texels.extend_from_slice(texel);
            }
        } else {
            texels.extend_from_slice(var::take(&mut buf, len)?);
        }
        in_run = !in_run;
    }

    Ok(texels)
}

#[test]
fn test_write_bytes() {
    fn check(data: &[u8], rle: &[u8]) {
        let mut buf = vec![];
        assert!(write_texels(&mut buf, data, 1).is_ok());
        assert_eq!(buf, rle);
        assert_eq!(read_texels(&buf, 1, data.len()).unwrap(), data);
    }

    check(&[], &[]);
    check(&[1], &[1, 1]);
    check(&[1, 1], &[2, 1]);
    check(&[1, 1, 1, 2, 2, 2, 2], &[3, 1, 0, 4, 2]);
    check(&[1, 2, 3, 4, 5, 6], &[1, 1, 5, 2, 3, 4, 5, 6]);
    check(&[1, 2, 3, 3, 3], &[1, 1, 4, 2, 3, 3, 3]);
    check(&[1, 2, 3, 3, 3, 3], &[1, 1, 1, 2, 4, 3]);
    check(&[1, 2, 3, 3, 3, 3, 3, 4, 5], &[1, 1, 1, 2, 5, 3, 2, 4, 5]);
    check(
        &[1, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5],
        &[1, 1, 1, 2, 4, 3, 0, 4, 4, 0, 4, 5],
    );
}

#[test]
fn test_write_rgba() {
    let red = [255, 0, 0, 255];
    let blue = [0, 0, 255, 255];

    // 200 red texels and one blue one. As bytes this has no runs longer than
    // two, but as texels it's a single run and a one-texel literal.
    let mut data = Vec::new();
    for _ in 0..200 {
        data.extend_from_slice(&red);
    }
    data.extend_from_slice(&blue);

    let mut buf = vec![];
    write_texels(&mut buf, &data, 4).unwrap();
    // 200 needs two bytes of LEB128.
    assert_eq!(buf, [0xc8, 0x01, 255, 0, 0, 255, 1, 0, 0, 255, 255]);
    assert_eq!(read_texels(&buf, 4, data.len()).unwrap(), data);
}

#[test]
fn test_read_limits() {
    // A run of 1000 bytes, when we only expected ten.
    let buf = [0xe8, 0x07, 42];
    assert!(matches!(
        read_texels(&buf, 1, 10),
        Err(DeserializeError::SizeMismatch { expected: 10, actual: 1000 })
    ));

    // A literal whose bytes are missing.
    let buf = [1, 7, 3, 1];
    assert!(matches!(
        read_texels(&buf, 1, 10),
        Err(DeserializeError::UnexpectedEof)
    ));

    // A literal so long the running total wraps.
    let mut buf = vec![1, b'x'];
    leb128::write::unsigned(&mut buf, u64::MAX).unwrap();
    assert!(matches!(
        read_texels(&buf, 1, 100),
        Err(DeserializeError::Overflow)
    ));
}
