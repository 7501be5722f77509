//! Storage key generation.
//!
//! Keys look like `<prefix>2024-05-06T07-08-09-123Z-1a2b3c4d.png`: they sort by
//! upload time and the UUID fragment keeps two uploads in the same
//! millisecond (from this or any other machine) apart. Nothing checks the
//! store for an existing key.

use chrono::{DateTime, Utc};
use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type Entropy = Box<dyn Fn() -> Uuid + Send + Sync>;

pub struct KeyGenerator {
    clock: Clock,
    entropy: Entropy,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::system()
    }
}

impl KeyGenerator {
    /// Wall clock and random v4 UUIDs.
    pub fn system() -> Self {
        Self {
            clock: Box::new(Utc::now),
            entropy: Box::new(Uuid::new_v4),
        }
    }

    pub fn with_sources<C, E>(clock: C, entropy: E) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
        E: Fn() -> Uuid + Send + Sync + 'static,
    {
        Self {
            clock: Box::new(clock),
            entropy: Box::new(entropy),
        }
    }

    pub fn generate(&self, prefix: &str, extension: &str) -> String {
        let timestamp = format_timestamp((self.clock)());
        let id = (self.entropy)().hyphenated().to_string();
        format!(
            "{}{}-{}.{}",
            prefix,
            timestamp,
            &id[..SHORT_ID_LEN],
            extension
        )
    }
}

/// ISO-8601 in UTC with milliseconds, with `:` and `.` swapped for `-`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}
