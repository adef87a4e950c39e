use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ChallengeError;
use crate::protocol::strip_terminator;

/// Минимальное число случайных байт в коде
pub const MIN_CHALLENGE_BYTES: usize = 5;
/// Максимальное число случайных байт в коде
pub const MAX_CHALLENGE_BYTES: usize = 9;

/// Одноразовый код подтверждения команды
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    bytes: Vec<u8>,
    hex: String,
}

impl Challenge {
    /// Собрать код из готовых байт
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let hex = hex::encode(&bytes);
        Self { bytes, hex }
    }

    /// Сырые байты кода
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-представление, которое уходит клиенту
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Строка для отправки: hex + `\n`
    pub fn to_line(&self) -> String {
        format!("{}\n", self.hex)
    }

    /// Сверяет ответ клиента с кодом побайтно.
    ///
    /// После снятия одного завершающего `\n` / `\r\n` ответ должен совпасть
    /// с hex-строкой целиком: укороченный, удлинённый или в другом регистре
    /// код не принимается.
    pub fn verify(&self, reply: &[u8]) -> bool {
        strip_terminator(reply) == self.hex.as_bytes()
    }
}

/// Источник challenge-кодов.
///
/// Обработчик соединения обобщён по этому трейту, чтобы в тестах можно было
/// подставить фиксированный или сбойный источник.
pub trait ChallengeSource: Send + Sync {
    /// Сгенерировать новый код
    fn generate(&self) -> Result<Challenge, ChallengeError>;
}

/// Боевой источник: CSPRNG, засеянный из энтропии ОС на каждый запрос.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsChallenge;

impl ChallengeSource for OsChallenge {
    fn generate(&self) -> Result<Challenge, ChallengeError> {
        let mut rng = StdRng::try_from_os_rng()
            .map_err(|e| ChallengeError::RandomSourceExhausted(e.to_string()))?;

        let count = rng.random_range(MIN_CHALLENGE_BYTES..=MAX_CHALLENGE_BYTES);
        let mut bytes = vec![0u8; count];
        rng.fill(bytes.as_mut_slice());

        Ok(Challenge::from_bytes(bytes))
    }
}
