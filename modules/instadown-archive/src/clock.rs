use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

/// Source of the timestamp stamped onto a record when it is built.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in a configured IANA zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA name such as "Asia/Ho_Chi_Minh".
    pub fn from_name(name: &str) -> anyhow::Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|e| anyhow::anyhow!("unknown timezone {name:?}: {e}"))?;
        Ok(Self::new(tz))
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz).fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
