use chrono::{DateTime, Utc};

/// Одно показание датчика.
///
/// Неизменяемо после создания: кэш подменяет закодированную строку целиком,
/// сами показания никто не мутирует.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Когда событие было принято upstream
    pub received_at: DateTime<Utc>,
    /// Логический канал (LoRaWAN f_port)
    pub port: u32,
    /// Уровень освещённости
    pub light: i64,
    /// Температура, градусы
    pub temperature: f64,
}

impl SensorReading {
    /// Нулевое показание со штампом времени `at`.
    /// Используется как начальное значение кэша до первого сообщения из фида.
    pub fn zero(at: DateTime<Utc>) -> Self {
        Self {
            received_at: at,
            port: 0,
            light: 0,
            temperature: 0.0,
        }
    }
}
