//! Точка входа `sensor-client`.
//!
//! - без `--command`: `get` и печать разобранного показания
//! - с `--command`: команда, эхо challenge-кода, печать `ACK ...`
//!
//! Ненулевой код выхода, если сервер ответил `try again` или `invalid code`.

mod cli;
mod tcp;

use chrono::DateTime;
use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let args = cli::Args::parse();
    args.validate()?;

    let addr = args.server_socket_addr()?;
    info!("connecting to {addr}");
    let mut conn = tcp::GatewayConn::connect(addr)?;

    match &args.command {
        None => {
            let r = conn.fetch()?;
            let at = DateTime::from_timestamp(r.unix_seconds, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| r.unix_seconds.to_string());
            println!(
                "port={} light={} temperature={:.2} received_at={}",
                r.port, r.light, r.temperature, at
            );
        }
        Some(cmd) => {
            println!("{}", conn.command(cmd)?);
        }
    }

    Ok(())
}
