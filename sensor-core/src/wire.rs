use crate::error::WireError;
use crate::types::SensorReading;

/// Разобранная wire-строка (то, что клиент получает на `get`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireLine {
    /// Логический канал
    pub port: u32,
    /// Уровень освещённости
    pub light: i64,
    /// Температура, два знака после запятой
    pub temperature: f64,
    /// Unix-время приёма, секунды
    pub unix_seconds: i64,
}

/// Кодирует показание в строку `"<port> <light:03> <temp*100:04> <unix>\n"`.
pub fn encode(reading: &SensorReading) -> Vec<u8> {
    let centi = (reading.temperature * 100.0).round() as i64;

    format!(
        "{} {:03} {:04} {}\n",
        reading.port,
        reading.light,
        centi,
        reading.received_at.timestamp()
    )
    .into_bytes()
}

/// Обратная операция к [`encode`]. Перевод строки в конце необязателен.
pub fn parse_line(line: &str) -> Result<WireLine, WireError> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(' ').collect();
    if fields.len() != 4 {
        return Err(WireError::FieldCount(fields.len()));
    }

    let centi: i64 = parse_field("temperature", fields[2])?;

    Ok(WireLine {
        port: parse_field("port", fields[0])?,
        light: parse_field("light", fields[1])?,
        temperature: centi as f64 / 100.0,
        unix_seconds: parse_field("timestamp", fields[3])?,
    })
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, WireError> {
    raw.parse().map_err(|_| WireError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(unix: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(unix, 0).unwrap()
    }

    fn reading(port: u32, light: i64, temperature: f64, unix: i64) -> SensorReading {
        SensorReading {
            received_at: at(unix),
            port,
            light,
            temperature,
        }
    }

    #[test]
    fn encode_pads_light_and_temperature() {
        let line = encode(&reading(1, 42, 23.5, 1000));
        assert_eq!(line, b"1 042 2350 1000\n");
    }

    #[test]
    fn encode_zero_reading() {
        let line = encode(&SensorReading::zero(at(1_700_000_000)));
        assert_eq!(line, b"0 000 0000 1700000000\n");
    }

    #[test]
    fn encode_rounds_temperature_to_hundredths() {
        // 21.456 * 100 = 2145.6 -> 2146
        assert_eq!(encode(&reading(2, 7, 21.456, 5)), b"2 007 2146 5\n");
        // 0.07 * 100 даёт 7.000000000000001, не должно уехать в 8
        assert_eq!(encode(&reading(2, 7, 0.07, 5)), b"2 007 0007 5\n");
    }

    #[test]
    fn encode_does_not_truncate_wide_values() {
        assert_eq!(encode(&reading(12, 1234, 123.45, 9)), b"12 1234 12345 9\n");
    }

    #[test]
    fn encode_negative_temperature_keeps_sign_inside_width() {
        assert_eq!(encode(&reading(1, 0, -0.05, 1)), b"1 000 -005 1\n");
    }

    #[test]
    fn parse_line_recovers_encoded_reading() {
        let cases = [
            reading(1, 42, 23.5, 1000),
            reading(0, 0, 0.0, 0),
            reading(200, 999, 37.123, 1_700_000_123),
            reading(3, 5, -12.349, 42),
        ];

        for r in cases {
            let bytes = encode(&r);
            let line = std::str::from_utf8(&bytes).unwrap();
            let parsed = parse_line(line).unwrap();

            assert_eq!(parsed.port, r.port);
            assert_eq!(parsed.light, r.light);
            assert!(
                (parsed.temperature - r.temperature).abs() <= 0.01,
                "{} vs {}",
                parsed.temperature,
                r.temperature
            );
            assert_eq!(parsed.unix_seconds, r.received_at.timestamp());
        }
    }

    #[test]
    fn parse_line_rejects_wrong_field_count() {
        assert_eq!(parse_line("1 042 2350\n"), Err(WireError::FieldCount(3)));
        assert_eq!(parse_line("try again\n"), Err(WireError::FieldCount(2)));
    }

    #[test]
    fn parse_line_rejects_non_numeric_field() {
        let err = parse_line("1 abc 2350 1000").unwrap_err();
        assert_eq!(
            err,
            WireError::InvalidField {
                field: "light",
                value: "abc".to_string()
            }
        );
    }
}
