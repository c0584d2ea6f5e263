use chrono::NaiveDate;
use rgb::RGB8;
use serde::de::{self, Deserialize, Deserializer};

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(de::Error::custom)
}

pub fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<&str>::deserialize(deserializer)?
        .map(|s| NaiveDate::parse_from_str(s, "%Y%m%d").map_err(de::Error::custom))
        .transpose()
}

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<u32, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parses `H:MM:SS` or `HH:MM:SS` into seconds since midnight. Hours may go past 24.
pub fn parse_time(s: &str) -> Result<u32, crate::Error> {
    let len = s.len();

    if !(7..=8).contains(&len) || !s.is_ascii() {
        Err(crate::Error::InvalidTime(s.to_owned()))
    } else {
        let sec = &s[len - 2..];
        let min = &s[len - 5..len - 3];
        let hour = &s[..len - 6];
        parse_time_impl(hour, min, sec).map_err(|_| crate::Error::InvalidTime(s.to_owned()))
    }
}

pub fn deserialize_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_time(s).map_err(de::Error::custom)
}

pub fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<&str>::deserialize(deserializer)?
        .map(|t| parse_time(t).map_err(de::Error::custom))
        .transpose()
}

pub fn parse_color(s: &str) -> Result<RGB8, crate::Error> {
    if s.len() != 6 || !s.is_ascii() {
        return Err(crate::Error::InvalidColor(s.to_owned()));
    }
    let r =
        u8::from_str_radix(&s[0..2], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    let g =
        u8::from_str_radix(&s[2..4], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    let b =
        u8::from_str_radix(&s[4..6], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    Ok(RGB8::new(r, g, b))
}

pub fn deserialize_option_color<'de, D>(de: D) -> Result<Option<RGB8>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<&str>::deserialize(de)?
        .map(|s| parse_color(s).map_err(de::Error::custom))
        .transpose()
}

pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        &_ => Err(de::Error::custom(format!(
            "Invalid value `{}`, expected 0 or 1",
            s
        ))),
    }
}

#[test]
fn test_parse_time() {
    assert_eq!(Ok(3600 + 60 + 1), parse_time("01:01:01").map_err(|e| e.to_string()));
    assert_eq!(Ok(9 * 3600 + 30 * 60), parse_time("9:30:00").map_err(|e| e.to_string()));
    assert_eq!(Ok(25 * 3600), parse_time("25:00:00").map_err(|e| e.to_string()));
    assert!(parse_time("1:1:1").is_err());
    assert!(parse_time("ab:cd:ef").is_err());
}

#[test]
fn test_parse_color() {
    assert_eq!(RGB8::new(255, 0, 16), parse_color("FF0010").unwrap());
    assert!(parse_color("#FF0010").is_err());
    assert!(parse_color("FFF").is_err());
}
