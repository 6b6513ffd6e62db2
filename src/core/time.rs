use serde::de::Error as _;
use serde::Deserialize;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) fn format_offset(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// The exam backend serialises `LocalDateTime` without an offset; those are read as UTC.
pub(crate) fn parse_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }
    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }

    None
}

pub(crate) fn deserialize_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime_flexible(&raw).ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time, UtcOffset};

    fn utc(year: i32, month: time::Month, day: u8, h: u8, m: u8, s: u8) -> OffsetDateTime {
        let date = Date::from_calendar_date(year, month, day).unwrap();
        let time = Time::from_hms(h, m, s).unwrap();
        PrimitiveDateTime::new(date, time).assume_utc()
    }

    #[test]
    fn format_offset_preserves_offset() {
        let offset = UtcOffset::from_hms(3, 0, 0).unwrap();
        let shifted = utc(2025, time::Month::January, 2, 10, 20, 30).to_offset(offset);
        assert_eq!(format_offset(shifted), "2025-01-02T13:20:30+03:00");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_datetime_flexible("2025-03-01T09:00:00+03:00").unwrap();
        assert_eq!(parsed, utc(2025, time::Month::March, 1, 6, 0, 0));
    }

    #[test]
    fn parses_local_datetime_as_utc() {
        assert_eq!(
            parse_datetime_flexible("2025-03-01T09:15:30").unwrap(),
            utc(2025, time::Month::March, 1, 9, 15, 30)
        );
        assert_eq!(
            parse_datetime_flexible("2025-03-01T09:15").unwrap(),
            utc(2025, time::Month::March, 1, 9, 15, 0)
        );
        let fractional = parse_datetime_flexible("2025-03-01T09:15:30.250").unwrap();
        assert_eq!(fractional.millisecond(), 250);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime_flexible("yesterday").is_none());
        assert!(parse_datetime_flexible("").is_none());
    }
}
