use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::{Error, Result};

/// Fixed width shift register state. Bit 0 is the front, i.e. the bit most
/// recently shifted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Register {
    bits: u32,
    width: u8,
}

impl Register {
    /// A full run keeps up to `2^(width + 1)` eight byte snapshots, 256 MiB at this width.
    pub const MAX_WIDTH: usize = 24;
    pub const DEFAULT_WIDTH: usize = 8;

    pub fn zeroed(width: usize) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(Error::InvalidWidth {
                width,
                max: Self::MAX_WIDTH,
            });
        }
        Ok(Self {
            bits: 0,
            width: width as u8,
        })
    }

    /// Reads the bit at position `i`, failing for positions past the register width.
    pub fn bit(&self, i: usize) -> Result<bool> {
        if i >= self.width() {
            return Err(Error::TapOutOfRange {
                tap: i,
                width: self.width(),
            });
        }
        Ok((self.bits >> i) & 1 == 1)
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn front(&self) -> bool {
        self.bits & 1 == 1
    }

    #[inline(always)]
    fn mask(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.width as u32)
    }

    fn shift_in(&mut self, bit: bool) {
        self.bits = ((self.bits << 1) | bit as u32) & self.mask();
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.width() {
            let c = if (self.bits >> i) & 1 == 1 { '1' } else { '0' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Computes the bit shifted into the front of the register on each step.
pub(crate) trait Feedback {
    fn next_bit(&self, register: &Register) -> Result<bool>;
}

impl<F> Feedback for F
where
    F: Fn(&Register) -> Result<bool>,
{
    fn next_bit(&self, register: &Register) -> Result<bool> {
        self(register)
    }
}

/// XOR of a set of register positions, optionally inverted (XNOR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Taps {
    positions: Vec<usize>,
    invert: bool,
}

impl Taps {
    pub fn new(positions: Vec<usize>, invert: bool) -> Self {
        Self { positions, invert }
    }

    /// 8 bit Fibonacci sequence generator
    pub fn fibonacci8() -> Self {
        Self::new(vec![5, 4, 7, 3], true)
    }

    /// 16 bit Fibonacci sequence generator
    pub fn fibonacci16() -> Self {
        Self::new(vec![15, 14, 12, 3], true)
    }

    pub fn with_invert(self, invert: bool) -> Self {
        Self { invert, ..self }
    }
}

impl Feedback for Taps {
    fn next_bit(&self, register: &Register) -> Result<bool> {
        let mut bit = self.invert;
        for &tap in &self.positions {
            bit ^= register.bit(tap)?;
        }
        Ok(bit)
    }
}

impl fmt::Display for Taps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = if self.invert { "XNOR" } else { "XOR" };
        let positions = self
            .positions
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} of taps {}", gate, positions)
    }
}

impl FromStr for Taps {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let positions = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .map_err(|e| Error::InvalidTaps(format!("{:?}: {}", p.trim(), e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(positions, false))
    }
}

/// Runs the register from all zeros until it returns to its first recorded
/// state, or until `2^(width + 1)` steps have been taken.
pub(crate) fn simulate<F: Feedback>(feedback: &F, width: usize) -> Result<Vec<Register>> {
    let mut register = Register::zeroed(width)?;
    register.shift_in(feedback.next_bit(&register)?);

    let first = register;
    let mut sequence = vec![first];
    let ceiling = 1u64 << (width + 1);

    for step in 0..ceiling {
        register.shift_in(feedback.next_bit(&register)?);
        debug!("step {}: {}", step, register);

        if register == first {
            debug!("first state {} reached again after {} steps", first, step + 1);
            return Ok(sequence);
        }
        sequence.push(register);
    }

    warn!(
        "feedback never returned to state {} within {} steps",
        first, ceiling
    );
    Ok(sequence)
}

/// Primary output bits, one per snapshot.
pub(crate) fn output_trace(sequence: &[Register]) -> Vec<bool> {
    sequence.iter().map(Register::front).collect()
}
