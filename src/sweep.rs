//! Fibonacci sweep of array sizes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The two starting values of the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPair {
    first: usize,
    second: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SeedPairError {
    #[error("expected two comma separated integers, got '{0}'")]
    Malformed(String),
    #[error("seed pair ({0},{1}) must satisfy first <= second and second > 0")]
    Degenerate(usize, usize),
}

impl SeedPair {
    /// `1, 2, 3, 5, 8, ...`
    pub const ONE_TWO: SeedPair = SeedPair { first: 1, second: 2 };
    /// `0, 1, 1, 2, 3, 5, ...`
    pub const ZERO_ONE: SeedPair = SeedPair { first: 0, second: 1 };

    /// `(0, 0)` never grows and is rejected, as is a decreasing pair.
    pub fn new(first: usize, second: usize) -> Result<Self, SeedPairError> {
        if second == 0 || first > second {
            return Err(SeedPairError::Degenerate(first, second));
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn second(&self) -> usize {
        self.second
    }
}

impl Default for SeedPair {
    fn default() -> Self {
        Self::ONE_TWO
    }
}

impl fmt::Display for SeedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.first, self.second)
    }
}

impl FromStr for SeedPair {
    type Err = SeedPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| SeedPairError::Malformed(s.to_string()))?;
        let first = a
            .trim()
            .parse()
            .map_err(|_| SeedPairError::Malformed(s.to_string()))?;
        let second = b
            .trim()
            .parse()
            .map_err(|_| SeedPairError::Malformed(s.to_string()))?;
        SeedPair::new(first, second)
    }
}

/// Generate the array sizes to test, in increasing order, up to `ceiling`.
///
/// Seeds larger than `ceiling` are dropped. Growth stops early instead of
/// wrapping if the next value would overflow `usize`.
pub fn generate_sweep(ceiling: usize, seed: SeedPair) -> Vec<usize> {
    let mut sweep: Vec<usize> = [seed.first, seed.second]
        .into_iter()
        .filter(|&v| v <= ceiling)
        .collect();
    if sweep.len() < 2 {
        return sweep;
    }

    loop {
        let len = sweep.len();
        match sweep[len - 1].checked_add(sweep[len - 2]) {
            Some(next) if next <= ceiling => sweep.push(next),
            _ => break,
        }
    }
    sweep
}
