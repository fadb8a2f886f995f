use std::io::{self, Write};

use log::info;

use crate::error::{Error, Result};
use crate::waveform::render_waveform;

/// Index of the first occurrence of `candidate` as a contiguous run in `reference`.
pub(crate) fn find_subsequence(candidate: &[bool], reference: &[bool]) -> Option<usize> {
    if candidate.is_empty() {
        return Some(0);
    }
    reference
        .windows(candidate.len())
        .position(|window| window == candidate)
}

pub(crate) fn contains_subsequence(candidate: &[bool], reference: &[bool]) -> bool {
    find_subsequence(candidate, reference).is_some()
}

/// Prints both traces, then whether and where `candidate` was found.
pub(crate) fn report_match<W: Write>(
    candidate: &[bool],
    reference: &[bool],
    out: &mut W,
) -> io::Result<Option<usize>> {
    writeln!(out, "Finding the sequence:")?;
    render_waveform(candidate, out)?;
    writeln!(out, "In the expected output of the generator:")?;
    render_waveform(reference, out)?;

    let found = find_subsequence(candidate, reference);
    match found {
        Some(i) => writeln!(out, "Match found at index {}", i)?,
        None => writeln!(out, "Sequence Not Found")?,
    }
    info!(
        "{} bit candidate in {} bit reference: {:?}",
        candidate.len(),
        reference.len(),
        found
    );
    Ok(found)
}

/// Parses a string of `0`/`1` characters. Whitespace, `_` and `,` are skipped.
pub(crate) fn parse_bits(s: &str) -> Result<Vec<bool>> {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != ',')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(Error::InvalidBit(other)),
        })
        .collect()
}
