use crate::broker::BrokerUri;
use crate::config::{
    MQTT_CHANNEL_CAP, MQTT_CONNECT_SLICE, MQTT_KEEP_ALIVE, MQTT_RETRY_PAUSE, MQTT_TOPIC,
};
use chrono::Utc;
use log::{debug, info, warn};
use rumqttc::{
    Client, Connection, ConnectionError, Event, MqttOptions, Packet, QoS, RecvTimeoutError,
};
use sensor_core::ReadingCache;
use sensor_core::feed::decode_uplink;
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// MQTT-фид: клиент для запросов + цикл событий.
pub(crate) struct Feed {
    client: Client,
    connection: Connection,
}

/// Что сделал фид с очередным событием
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedAction {
    /// показание принято, кэш обновлён
    Updated,
    /// publish пришёл, но payload не разобрался
    Dropped,
    /// брокер (пере)принял соединение, нужна подписка
    Resubscribe,
    /// служебное событие, ничего не делаем
    Idle,
}

impl Feed {
    /// Собирает клиента без сетевого ввода-вывода: соединение
    /// устанавливается только при первом poll.
    pub(crate) fn new(broker: &BrokerUri, client_id: &str) -> Self {
        let mut opts = MqttOptions::new(client_id, broker.host.clone(), broker.port);
        opts.set_keep_alive(MQTT_KEEP_ALIVE);
        if let Some(user) = &broker.username {
            opts.set_credentials(user.clone(), broker.password.clone().unwrap_or_default());
        }

        let (client, connection) = Client::new(opts, MQTT_CHANNEL_CAP);
        Self { client, connection }
    }

    /// Хэндл для остановки фида из другого потока
    pub(crate) fn client(&self) -> Client {
        self.client.clone()
    }

    /// Ждёт CONNACK не дольше `timeout`.
    ///
    /// Ошибки транспорта внутри окна повторяются, отказ брокера
    /// (CONNACK с ошибкой) фатален сразу. `Ok(false)` - пока ждали,
    /// попросили остановиться.
    fn wait_connected(
        &mut self,
        broker: &BrokerUri,
        timeout: Duration,
        shutdown: &AtomicBool,
    ) -> anyhow::Result<bool> {
        let deadline = Instant::now() + timeout;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(false);
            }

            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                anyhow::bail!(
                    "broker {}:{} not reachable within {:?}",
                    broker.host,
                    broker.port,
                    timeout
                );
            }

            match self.connection.recv_timeout(left.min(MQTT_CONNECT_SLICE)) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => break,
                Ok(Ok(_)) => {}
                Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                    anyhow::bail!("broker {} refused connection: {:?}", broker.host, code);
                }
                Ok(Err(e)) => {
                    warn!("broker {}:{} connect failed: {e}; retrying", broker.host, broker.port);
                    thread::sleep(MQTT_RETRY_PAUSE.min(left));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => anyhow::bail!("mqtt event loop stopped"),
            }
        }

        info!("connected to broker {}:{}", broker.host, broker.port);
        subscribe(&self.client)?;
        Ok(true)
    }

    /// Цикл фида: каждый валидный uplink подменяет кэш.
    /// После обрыва rumqttc переподключается сам на следующем poll,
    /// подписку восстанавливаем на каждом CONNACK.
    pub(crate) fn run(mut self, cache: Arc<ReadingCache>, shutdown: Arc<AtomicBool>) -> anyhow::Result<()> {
        for notification in self.connection.iter() {
            match notification {
                Ok(event) => {
                    if handle_event(&cache, &event) == FeedAction::Resubscribe {
                        info!("reconnected to broker");
                        subscribe(&self.client)?;
                    }
                }
                Err(e) => {
                    if !shutdown.load(Ordering::Relaxed) {
                        warn!("mqtt connection error: {e}");
                        thread::sleep(MQTT_RETRY_PAUSE);
                    }
                }
            }

            if shutdown.load(Ordering::Relaxed) {
                info!("shutting down feed listener");
                break;
            }
        }

        Ok(())
    }
}

/// Тело потока фида: ограниченное ожидание брокера, затем основной цикл.
///
/// Не дождались брокера - ставим `shutdown`, чтобы accept-цикл тоже
/// завершился, и отдаём ошибку наверх: процесс выходит с ненулевым кодом.
pub(crate) fn run_feed_listener(
    mut feed: Feed,
    broker: &BrokerUri,
    timeout: Duration,
    cache: Arc<ReadingCache>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    match feed.wait_connected(broker, timeout, &shutdown) {
        Ok(true) => feed.run(cache, shutdown),
        Ok(false) => Ok(()),
        Err(e) => {
            shutdown.store(true, Ordering::Relaxed);
            Err(e.context("connect to mqtt broker"))
        }
    }
}

/// Разбирает одно событие eventloop'а.
pub(crate) fn handle_event(cache: &ReadingCache, event: &Event) -> FeedAction {
    match event {
        Event::Incoming(Packet::Publish(p)) => {
            if apply_payload(cache, &p.topic, &p.payload) {
                FeedAction::Updated
            } else {
                FeedAction::Dropped
            }
        }
        Event::Incoming(Packet::ConnAck(_)) => FeedAction::Resubscribe,
        _ => FeedAction::Idle,
    }
}

fn subscribe(client: &Client) -> anyhow::Result<()> {
    client.subscribe(MQTT_TOPIC, QoS::AtMostOnce)?;
    debug!("subscribed to {MQTT_TOPIC:?}");
    Ok(())
}

/// Декодирует payload и кладёт показание в кэш.
/// Мусор молча отбрасывается, в кэше остаётся предыдущее значение.
pub(crate) fn apply_payload(cache: &ReadingCache, topic: &str, payload: &[u8]) -> bool {
    match decode_uplink(payload, Utc::now()) {
        Ok(reading) => {
            info!(
                "new reading on {topic}: port={} light={} temperature={}",
                reading.port, reading.light, reading.temperature
            );
            cache.replace(&reading);
            true
        }
        Err(e) => {
            debug!("dropping payload on {topic}: {e}");
            false
        }
    }
}
