//! Field codecs for `LogSettings`.

/// `Duration` stored as whole milliseconds.
pub mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Retention window in days. `-1`, `0` and a missing value all mean
/// "keep files forever" and read back as `None`.
pub mod retention_days {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match days {
            Some(days) => serializer.serialize_i64(i64::from(*days)),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        match raw {
            None | Some(-1 | 0) => Ok(None),
            Some(days) if days > 0 => u32::try_from(days)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("save_days out of range: {days}"))),
            Some(days) => Err(D::Error::custom(format!(
                "save_days must be positive or -1, got {days}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Fields {
        #[serde(with = "super::millis")]
        interval: Duration,
        #[serde(with = "super::retention_days")]
        days: Option<u32>,
    }

    #[test]
    fn test_retention_sentinels() {
        let forever: Fields = toml::from_str("interval = 250\ndays = -1").unwrap();
        assert_eq!(forever.interval, Duration::from_millis(250));
        assert_eq!(forever.days, None);

        let zero: Fields = toml::from_str("days = 0").unwrap();
        assert_eq!(zero.days, None);

        let week: Fields = toml::from_str("days = 7").unwrap();
        assert_eq!(week.days, Some(7));

        assert!(toml::from_str::<Fields>("days = -3").is_err());
    }

    #[test]
    fn test_serialized_form() {
        let fields = Fields {
            interval: Duration::from_secs(3),
            days: None,
        };
        let text = toml::to_string(&fields).unwrap();
        assert!(text.contains("interval = 3000"));
        assert!(text.contains("days = -1"));
    }
}
