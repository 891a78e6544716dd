use crate::core::errors::ExchangeError;
use chrono::Utc;

/// Clock resolution an exchange expects its nonce in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceResolution {
    Seconds,
    Millis,
    Micros,
}

impl NonceResolution {
    fn now(self) -> u64 {
        let now = Utc::now();
        let value = match self {
            Self::Seconds => now.timestamp(),
            Self::Millis => now.timestamp_millis(),
            Self::Micros => now.timestamp_micros(),
        };
        u64::try_from(value).unwrap_or(0)
    }
}

/// Strictly increasing request counter owned by one adapter.
///
/// Seeded from the wall clock when created and bumped by one per authenticated call. The state
/// is in memory only: a restart inside the same clock tick can reuse a value the exchange has
/// already seen, and the exchange will then reject the call as a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceGenerator {
    last: u64,
    resolution: NonceResolution,
}

impl NonceGenerator {
    pub fn new(resolution: NonceResolution) -> Self {
        Self::starting_at(resolution.now(), resolution)
    }

    /// Start from a fixed seed; the first `next()` returns `seed + 1`
    pub const fn starting_at(seed: u64, resolution: NonceResolution) -> Self {
        Self {
            last: seed,
            resolution,
        }
    }

    /// Next nonce, greater than every value handed out before.
    pub fn next(&mut self) -> Result<u64, ExchangeError> {
        self.last = self.last.checked_add(1).ok_or_else(|| {
            ExchangeError::invalid_request("nonce", "Nonce counter exhausted")
        })?;
        Ok(self.last)
    }

    /// Most recently issued value (or the seed before the first call)
    pub const fn last(&self) -> u64 {
        self.last
    }

    pub const fn resolution(&self) -> NonceResolution {
        self.resolution
    }
}
