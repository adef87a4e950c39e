use std::time::Duration;

pub(crate) use sensor_core::{DEFAULT_MAX_LINE, WRITE_TIMEOUT};

pub(crate) const TCP_BIND_ADDR: &str = "0.0.0.0:8080";

/// Idle-таймаут чтения по умолчанию, секунды (0 — без таймаута)
pub(crate) const IDLE_TIMEOUT_S: &str = "300";

/// Сколько ждём CONNACK от брокера при старте, секунды
pub(crate) const BROKER_CONNECT_TIMEOUT_S: &str = "30";

pub(crate) const MQTT_DEFAULT_PORT: u16 = 1883;
pub(crate) const MQTT_KEEP_ALIVE: Duration = Duration::from_secs(30);
pub(crate) const MQTT_TOPIC: &str = "#";
pub(crate) const MQTT_CHANNEL_CAP: usize = 16;

/// Тик, с которым accept-цикл проверяет флаг shutdown
pub(crate) const ACCEPT_TICK: Duration = Duration::from_millis(50);

/// Одно ожидание CONNACK при старте: между ними проверяется shutdown.
/// Не меньше собственного connection timeout rumqttc (5 с), иначе
/// медленное подключение обрывалось бы на каждом срезе.
pub(crate) const MQTT_CONNECT_SLICE: Duration = Duration::from_secs(5);

/// Пауза перед повторным poll после ошибки транспорта MQTT
pub(crate) const MQTT_RETRY_PAUSE: Duration = Duration::from_secs(1);

pub(crate) fn default_client_id() -> String {
    format!("sensor-gateway-{}", std::process::id())
}

/// 0 секунд означает "без таймаута"
pub(crate) fn idle_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
