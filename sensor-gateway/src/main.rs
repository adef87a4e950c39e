//! Точка входа `sensor-gateway`.
//!
//! Жизненный цикл:
//! - парсинг CLI и адреса брокера (ошибка фатальна)
//! - bind TCP listener (ошибка фатальна)
//! - поток фида: подключение к MQTT с ограниченным ожиданием
//!   (не дождались - shutdown и ненулевой код выхода)
//! - accept-цикл в главном потоке, запускается сразу после bind
//! - корректная остановка по `Ctrl+C`

mod broker;
mod cli;
mod config;
mod feed;
mod session;
mod tcp;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use sensor_core::{OsChallenge, ReadingCache};

use crate::broker::BrokerUri;
use crate::session::SessionCtx;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let args = cli::Args::parse();
    let broker = BrokerUri::parse(&args.mqtt)?;

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let listener = tcp::bind_listener(args.bind)?;
    info!("listening on {}", args.bind);

    let cache = Arc::new(ReadingCache::starting_now());

    // Брокера ждём в потоке фида: клиенты сразу получают нулевое показание.
    let feed = feed::Feed::new(&broker, &args.client_id());
    let feed_client = feed.client();
    let connect_timeout = Duration::from_secs(args.connect_timeout_s);

    let feed_handle = {
        let cache = cache.clone();
        let shutdown = shutdown.clone();
        thread::spawn(move || {
            feed::run_feed_listener(feed, &broker, connect_timeout, cache, shutdown)
        })
    };

    let ctx = Arc::new(SessionCtx {
        cache,
        challenges: OsChallenge,
        max_line: args.max_line,
    });

    tcp::run_tcp_listener(
        listener,
        ctx,
        config::idle_timeout(args.idle_timeout_s),
        shutdown,
    )?;

    // фид мог уже завершиться сам, если брокер так и не ответил
    if !feed_handle.is_finished() {
        if let Err(e) = feed_client.disconnect() {
            warn!("mqtt disconnect: {e}");
        }
    }
    match feed_handle.join() {
        Ok(res) => res.context("feed listener")?,
        Err(panic) => warn!("feed thread panicked: {:?}", panic),
    }

    Ok(())
}
