use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::FeedError;
use crate::types::SensorReading;

#[derive(Debug, Deserialize)]
struct UplinkEnvelope {
    uplink_message: UplinkMessage,
}

#[derive(Debug, Deserialize)]
struct UplinkMessage {
    #[serde(default)]
    received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    f_port: u32,
    decoded_payload: DecodedPayload,
}

#[derive(Debug, Deserialize)]
struct DecodedPayload {
    // приходит от декодера устройства, в wire-строку не попадает
    #[serde(default)]
    #[allow(dead_code)]
    event: Option<String>,
    light: i64,
    temperature: f64,
}

/// Декодирует uplink-сообщение (JSON в формате TTN v3) в показание.
///
/// Если в сообщении нет `received_at`, берётся `now`.
pub fn decode_uplink(payload: &[u8], now: DateTime<Utc>) -> Result<SensorReading, FeedError> {
    let env: UplinkEnvelope = serde_json::from_slice(payload)?;
    let msg = env.uplink_message;

    Ok(SensorReading {
        received_at: msg.received_at.unwrap_or(now),
        port: msg.f_port,
        light: msg.decoded_payload.light,
        temperature: msg.decoded_payload.temperature,
    })
}
