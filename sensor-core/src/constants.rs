use std::time::Duration;

/// Дедлайн на одну запись в клиентский сокет
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// Ответ на нераспознанную строку (и на сбой генерации challenge)
pub const TRY_AGAIN: &[u8] = b"try again\n";

/// Ответ на неверно повторённый challenge
pub const INVALID_CODE: &[u8] = b"invalid code\n";

/// Префикс запроса последнего показания
pub const FETCH_PREFIX: &str = "get";

/// Префикс подтверждения команды
pub const ACK_PREFIX: &str = "ACK ";

/// Максимальная длина строки от клиента по умолчанию
pub const DEFAULT_MAX_LINE: usize = 1024;
