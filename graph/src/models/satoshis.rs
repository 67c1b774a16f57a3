//! Amount, fee rate and block delta units.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

const MSAT_PER_SAT: u64 = 1_000;
const MSAT_PER_BTC: f64 = 100_000_000_000.0;

/// An amount of bitcoin, held in millisatoshis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Satoshis {
    millisatoshis: u64,
}

impl Satoshis {
    pub fn from_millisatoshis(millisatoshis: u64) -> Self {
        Self { millisatoshis }
    }

    pub fn from_satoshis(satoshis: u64) -> Self {
        Self {
            millisatoshis: satoshis.saturating_mul(MSAT_PER_SAT),
        }
    }

    pub fn millisatoshis(&self) -> u64 {
        self.millisatoshis
    }

    /// Whole satoshis, rounded down.
    pub fn satoshis(&self) -> u64 {
        self.millisatoshis / MSAT_PER_SAT
    }

    pub fn bitcoins(&self) -> f64 {
        self.millisatoshis as f64 / MSAT_PER_BTC
    }

    /// This amount relative to `reference`, in parts per million. Zero when
    /// the reference is zero.
    pub fn parts_per_million(&self, reference: Satoshis) -> f64 {
        if reference.millisatoshis == 0 {
            return 0.0;
        }
        self.millisatoshis as f64 / reference.millisatoshis as f64 * 1_000_000.0
    }
}

impl Display for Satoshis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} msat", self.millisatoshis)
    }
}

/// A proportional fee rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rate {
    parts_per_million: u64,
}

impl Rate {
    pub fn from_parts_per_million(parts_per_million: u64) -> Self {
        Self { parts_per_million }
    }

    pub fn parts_per_million(&self) -> u64 {
        self.parts_per_million
    }

    pub fn percentage(&self) -> f64 {
        self.parts_per_million as f64 / 10_000.0
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ppm", self.parts_per_million)
    }
}

/// Difference in blocks between the incoming and outgoing HTLC time locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlocksDelta {
    blocks: u32,
}

impl BlocksDelta {
    pub fn new(blocks: u32) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> u32 {
        self.blocks
    }
}
