use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};

/// Daily wall-clock times (local time) at which each library type is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Time of day for movie libraries (default: 02:00)
    #[serde(default = "default_movies_at", deserialize_with = "deserialize_time_of_day")]
    pub movies: NaiveTime,

    /// Time of day for series libraries (default: 07:00)
    #[serde(default = "default_series_at", deserialize_with = "deserialize_time_of_day")]
    pub series: NaiveTime,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            movies: default_movies_at(),
            series: default_series_at(),
        }
    }
}

fn default_movies_at() -> NaiveTime {
    NaiveTime::from_hms_opt(2, 0, 0).unwrap_or_default()
}

fn default_series_at() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default()
}

/// Accepts "HH:MM" or "HH:MM:SS"
fn deserialize_time_of_day<'de, D>(deserializer: D) -> std::result::Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();

    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| serde::de::Error::custom(format!("invalid time of day '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_defaults() {
        let schedule: ScheduleConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(schedule.movies, NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(schedule.series, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(schedule, ScheduleConfig::default());
    }

    #[test]
    fn test_schedule_custom_times() {
        let yaml = r#"
movies: "23:30"
series: "04:15:30"
"#;
        let schedule: ScheduleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule.movies, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        assert_eq!(schedule.series, NaiveTime::from_hms_opt(4, 15, 30).unwrap());
    }

    #[test]
    fn test_schedule_rejects_garbage() {
        let result: std::result::Result<ScheduleConfig, _> =
            serde_yaml::from_str("movies: \"25:99\"");
        assert!(result.is_err());
    }
}
