//! # sensor-core
//!
//! Базовые типы и протокол для sensor-gateway / sensor-client.
//!
//! Этот крейт содержит:
//!
//! - [`types`] — доменные типы (показание датчика)
//! - [`wire`] — текстовая строка, которую клиент получает на `get`
//! - [`protocol`] — классификация строк клиента и форматирование ответов
//! - [`challenge`] — одноразовые коды подтверждения команд
//! - [`cache`] — потокобезопасный слот с последним показанием
//! - [`feed`] — декодирование uplink-сообщений из MQTT
//! - [`error`] — типы ошибок, которые возвращают компоненты `sensor-core`
//!
//! ## Пример: показание → wire-строка
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use sensor_core::{SensorReading, wire};
//!
//! let r = SensorReading {
//!     received_at: Utc.timestamp_opt(1000, 0).unwrap(),
//!     port: 1,
//!     light: 42,
//!     temperature: 23.5,
//! };
//! assert_eq!(wire::encode(&r), b"1 042 2350 1000\n");
//! ```
//!
//! ## Пример: классификация строки
//!
//! ```rust
//! use sensor_core::protocol::{classify, Request};
//!
//! assert_eq!(classify(b"get\n"), Request::Fetch);
//! assert_eq!(classify(b"5 set light on\n"), Request::Command(b"5 set light on".to_vec()));
//! assert_eq!(classify(b"banana\n"), Request::Unknown);
//! ```
//!
//! ## Дизайн
//!
//! Как и раньше, здесь только чистые типы, кодеки и мелкая утилитарщина,
//! без сети и без runtime. Сокеты, MQTT и CLI живут в бинарниках.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Потокобезопасный кэш последнего показания.
pub mod cache;

/// Генерация и проверка challenge-кодов.
pub mod challenge;

/// Ошибки `sensor-core`.
pub mod error;

/// Декодирование uplink-сообщений фида.
pub mod feed;

/// Текстовый протокол (`get`, команды, ответы).
pub mod protocol;

/// Доменные типы.
pub mod types;

/// Wire-строка показания.
pub mod wire;

/// Общие константы
mod constants;
pub use constants::{
    ACK_PREFIX, DEFAULT_MAX_LINE, FETCH_PREFIX, INVALID_CODE, TRY_AGAIN, WRITE_TIMEOUT,
};

// --- Re-exports (публичный фасад API) ---

pub use crate::cache::ReadingCache;
pub use crate::challenge::{Challenge, ChallengeSource, OsChallenge};
pub use crate::error::{ChallengeError, FeedError, SensorCoreError, WireError};
pub use crate::protocol::Request;
pub use crate::types::SensorReading;
