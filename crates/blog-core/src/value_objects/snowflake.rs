//! Snowflake ID - 64-bit time-ordered identifier used for posts
//!
//! Structure:
//! - Bits 63-22: Timestamp (milliseconds since custom epoch)
//! - Bits 21-12: Worker ID (0-1023)
//! - Bits 11-0:  Sequence number (0-4095)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time-ordered 64-bit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_704_067_200_000;

    const WORKER_BITS: i64 = 10;
    const SEQUENCE_BITS: i64 = 12;
    const SEQUENCE_MASK: i64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Largest worker id that fits in the worker bits
    pub const MAX_WORKER_ID: u16 = (1 << Self::WORKER_BITS) - 1;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which this id was minted
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> (Self::WORKER_BITS + Self::SEQUENCE_BITS)) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> Self::SEQUENCE_BITS) & i64::from(Self::MAX_WORKER_ID)) as u16
    }

    /// Parse from the decimal string form used on the wire
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(SnowflakeParseError::InvalidFormat),
        }
    }

    fn compose(timestamp: i64, worker_id: u16, sequence: i64) -> Self {
        Self(
            ((timestamp - Self::EPOCH) << (Self::WORKER_BITS + Self::SEQUENCE_BITS))
                | (i64::from(worker_id) << Self::SEQUENCE_BITS)
                | (sequence & Self::SEQUENCE_MASK),
        )
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid id format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialized as a string so JavaScript clients never lose precision
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

// Accepts either the string form or a bare integer
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(id) if id > 0 => Ok(Snowflake(id)),
            Raw::Int(_) => Err(serde::de::Error::custom(SnowflakeParseError::InvalidFormat)),
            Raw::Str(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Thread-safe post id generator
///
/// State is packed into one atomic word (`timestamp << 12 | sequence`) so
/// that claiming the next id is a single compare-and-swap.
pub struct SnowflakeGenerator {
    worker_id: u16,
    state: AtomicI64,
}

impl SnowflakeGenerator {
    /// # Panics
    /// Panics if `worker_id` does not fit in 10 bits
    pub fn new(worker_id: u16) -> Self {
        assert!(
            worker_id <= Snowflake::MAX_WORKER_ID,
            "Worker ID must be < 1024"
        );
        Self {
            worker_id,
            state: AtomicI64::new(0),
        }
    }

    /// Generate a new unique id
    pub fn generate(&self) -> Snowflake {
        loop {
            let now = current_millis();
            let prev = self.state.load(Ordering::Acquire);
            let prev_ts = prev >> Snowflake::SEQUENCE_BITS;
            let prev_seq = prev & Snowflake::SEQUENCE_MASK;

            let (ts, seq) = if now > prev_ts {
                (now, 0)
            } else if prev_seq < Snowflake::SEQUENCE_MASK {
                // same millisecond, or the clock stepped back: stay on prev_ts
                (prev_ts, prev_seq + 1)
            } else {
                std::hint::spin_loop();
                continue;
            };

            let next = (ts << Snowflake::SEQUENCE_BITS) | seq;
            if self
                .state
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Snowflake::compose(ts, self.worker_id, seq);
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(Snowflake::EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parse_rejects_garbage_and_non_positive() {
        assert_eq!(Snowflake::parse("42").unwrap().into_inner(), 42);
        assert_eq!(Snowflake::parse(" 42 ").unwrap().into_inner(), 42);
        assert!(Snowflake::parse("abc").is_err());
        assert!(Snowflake::parse("0").is_err());
        assert!(Snowflake::parse("-5").is_err());
    }

    #[test]
    fn test_json_uses_string_form() {
        let id = Snowflake::new(123_456_789_012_345_678);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"123456789012345678\"");

        let back: Snowflake = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let from_int: Snowflake = serde_json::from_str("12345").unwrap();
        assert_eq!(from_int.into_inner(), 12345);
    }

    #[test]
    fn test_json_rejects_non_positive_in_both_forms() {
        for json in ["0", "-5", "\"0\"", "\"-5\""] {
            assert!(serde_json::from_str::<Snowflake>(json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_generator_is_unique_and_monotonic() {
        let gen = SnowflakeGenerator::new(7);
        let mut last = Snowflake::default();
        let mut seen = HashSet::new();

        for _ in 0..5000 {
            let id = gen.generate();
            assert!(id > last);
            assert!(seen.insert(id));
            assert_eq!(id.worker_id(), 7);
            last = id;
        }
    }

    #[test]
    fn test_generator_across_threads() {
        let gen = Arc::new(SnowflakeGenerator::new(1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                thread::spawn(move || (0..1000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        assert_eq!(all.len(), 4000);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let before = current_millis();
        let id = SnowflakeGenerator::new(3).generate();
        let after = current_millis();
        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }

    #[test]
    #[should_panic(expected = "Worker ID must be < 1024")]
    fn test_generator_invalid_worker_id() {
        SnowflakeGenerator::new(1024);
    }
}
