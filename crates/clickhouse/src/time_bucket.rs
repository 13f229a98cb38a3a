use std::{fmt, str::FromStr};

/// Granularity used to group events into time series buckets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    /// One microsecond
    Microsecond,
    /// One millisecond
    Millisecond,
    /// One second
    Second,
    /// One minute
    Minute,
    /// One hour
    Hour,
    /// One day
    Day,
    /// One week
    Week,
    /// One calendar month
    Month,
    /// One calendar quarter
    Quarter,
    /// One calendar year
    Year,
    /// Ten years
    Decade,
    /// A hundred years
    Century,
    /// A thousand years
    Millennium,
}

impl TimeBucket {
    /// Every supported bucket, finest first.
    pub const ALL: [Self; 13] = [
        Self::Microsecond,
        Self::Millisecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
        Self::Decade,
        Self::Century,
        Self::Millennium,
    ];

    /// Lowercase bucket name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Microsecond => "microsecond",
            Self::Millisecond => "millisecond",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::Decade => "decade",
            Self::Century => "century",
            Self::Millennium => "millennium",
        }
    }

    /// Return the `ClickHouse` interval string for this bucket.
    ///
    /// Event times are stored with second resolution, so sub-second buckets
    /// collapse to one second.
    pub const fn interval(self) -> &'static str {
        match self {
            Self::Microsecond | Self::Millisecond | Self::Second => "1 SECOND",
            Self::Minute => "1 MINUTE",
            Self::Hour => "1 HOUR",
            Self::Day => "1 DAY",
            Self::Week => "1 WEEK",
            Self::Month => "1 MONTH",
            Self::Quarter => "1 QUARTER",
            Self::Year => "1 YEAR",
            Self::Decade => "10 YEAR",
            Self::Century => "100 YEAR",
            Self::Millennium => "1000 YEAR",
        }
    }

    /// SQL expression truncating a unix-seconds column to the bucket start,
    /// returned as unix seconds.
    pub fn bucket_expr(self, column: &str) -> String {
        format!(
            "toUInt64(toUnixTimestamp(toStartOfInterval(toDateTime({column}), INTERVAL {})))",
            self.interval()
        )
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| format!("unknown time bucket `{s}`"))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_bucket() {
        for bucket in TimeBucket::ALL {
            assert_eq!(bucket.as_str().parse::<TimeBucket>(), Ok(bucket));
        }
    }

    #[test]
    fn rejects_unknown_buckets() {
        assert!("fortnight".parse::<TimeBucket>().is_err());
        assert!("Day".parse::<TimeBucket>().is_err());
        assert!("".parse::<TimeBucket>().is_err());
    }

    #[test]
    fn bucket_expression_uses_interval() {
        assert_eq!(
            TimeBucket::Day.bucket_expr("vt.timestamp"),
            "toUInt64(toUnixTimestamp(toStartOfInterval(toDateTime(vt.timestamp), INTERVAL 1 DAY)))"
        );
        assert_eq!(TimeBucket::Millennium.interval(), "1000 YEAR");
        assert_eq!(TimeBucket::Millisecond.interval(), "1 SECOND");
    }
}
