use thiserror::Error;

/// Верхнеуровневый тип ошибок крейта
#[derive(Debug, Error)]
pub enum SensorCoreError {
    /// Ошибки разбора wire-строки
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Ошибки генерации challenge
    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    /// Ошибки декодирования сообщений из фида
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Ошибки разбора wire-строки `"<port> <light> <temp*100> <unix>"`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Неверное количество полей
    #[error("expected 4 fields, got {0}")]
    FieldCount(usize),

    /// Поле не является числом
    #[error("invalid {field}: {value:?}")]
    InvalidField {
        /// имя поля
        field: &'static str,
        /// исходное значение
        value: String,
    },
}

/// Ошибки генерации challenge
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// Источник энтропии не смог выдать байты
    #[error("random source exhausted: {0}")]
    RandomSourceExhausted(String),
}

/// Ошибки декодирования uplink-сообщения
#[derive(Debug, Error)]
pub enum FeedError {
    /// Невалидный JSON или не та структура
    #[error("uplink decode error: {0}")]
    Json(#[from] serde_json::Error),
}
