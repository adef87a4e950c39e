use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Result, bail};
use clap::Parser;
use sensor_core::protocol::is_command_request;

/// Sensor Client - читает последнее показание или отправляет команду
/// с подтверждением challenge-кодом.
#[derive(Parser, Debug, Clone)]
#[command(name = "sensor-client", version, about)]
pub(crate) struct Args {
    /// TCP адрес sensor-gateway, например 127.0.0.1:8080
    #[arg(long)]
    pub(crate) server: String,

    /// Команда вида "5 set light on". Без неё клиент шлёт get
    #[arg(long)]
    pub(crate) command: Option<String>,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }

        if let Some(cmd) = &self.command {
            if !is_command_request(cmd.as_bytes()) {
                bail!("--command must look like \"<digit> <word> <word> <text>\" (got: {cmd:?})");
            }
            if cmd.contains('\n') {
                bail!("--command must be a single line");
            }
        }

        Ok(())
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(server: &str, command: Option<&str>) -> Args {
        Args {
            server: server.to_string(),
            command: command.map(str::to_string),
        }
    }

    #[test]
    fn validate_accepts_get_and_command() {
        args("127.0.0.1:8080", None).validate().unwrap();
        args("127.0.0.1:8080", Some("5 set light on")).validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_server_and_command() {
        assert!(args("", None).validate().is_err());
        assert!(args("localhost", None).validate().is_err());
        assert!(args("127.0.0.1:8080", Some("turn light on")).validate().is_err());
        assert!(args("127.0.0.1:8080", Some("5 set light on\nget")).validate().is_err());
    }
}
