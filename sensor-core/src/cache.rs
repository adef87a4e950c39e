use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::types::SensorReading;
use crate::wire::encode;

/// Последнее показание в готовом к отправке виде.
///
/// Один писатель (фид) и много читателей (соединения). Слот хранит
/// `Arc<[u8]>`: читатель клонирует указатель под блокировкой и пишет в сокет
/// уже без неё, поэтому частично записанную строку увидеть нельзя.
#[derive(Debug)]
pub struct ReadingCache {
    line: RwLock<Arc<[u8]>>,
}

impl ReadingCache {
    /// Кэш с нулевым показанием, помеченным временем `started_at`
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            line: RwLock::new(encode(&SensorReading::zero(started_at)).into()),
        }
    }

    /// Кэш с нулевым показанием на текущий момент
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Атомарно подменить текущую строку
    pub fn replace(&self, reading: &SensorReading) {
        let encoded: Arc<[u8]> = encode(reading).into();

        let mut slot = match self.line.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(), // продолжаем, несмотря на poison
        };
        *slot = encoded;
    }

    /// Атомарно прочитать текущую строку
    pub fn current(&self) -> Arc<[u8]> {
        let slot = match self.line.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.clone()
    }
}
