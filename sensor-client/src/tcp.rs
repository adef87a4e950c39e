use log::debug;
use sensor_core::wire::{WireLine, parse_line};
use sensor_core::{ACK_PREFIX, FETCH_PREFIX, WRITE_TIMEOUT};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

const TCP_READ_TIMEOUT_S: u64 = 5;

/// Одно соединение с gateway: запрос строкой, ответ строкой.
pub(crate) struct GatewayConn {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl GatewayConn {
    pub(crate) fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)?;

        stream.set_nodelay(true).ok();
        stream
            .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT_S)))
            .ok();
        stream.set_write_timeout(Some(WRITE_TIMEOUT)).ok();

        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { stream, reader })
    }

    fn request(&mut self, line: &str) -> anyhow::Result<String> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;

        let mut resp = String::new();
        let n = self.reader.read_line(&mut resp)?;
        if n == 0 {
            anyhow::bail!("server closed connection without response");
        }

        let resp = resp.trim_end_matches(&['\r', '\n'][..]).to_string();
        debug!("{line:?} -> {resp:?}");
        Ok(resp)
    }

    /// `get` -> разобранная wire-строка
    pub(crate) fn fetch(&mut self) -> anyhow::Result<WireLine> {
        let resp = self.request(FETCH_PREFIX)?;
        parse_line(&resp).map_err(|e| anyhow::anyhow!("unexpected server response {resp:?}: {e}"))
    }

    /// Команда + эхо challenge-кода. Возвращает строку ACK.
    pub(crate) fn command(&mut self, cmd: &str) -> anyhow::Result<String> {
        let code = self.request(cmd)?;
        if !code.bytes().all(|b| b.is_ascii_hexdigit()) || code.is_empty() {
            anyhow::bail!("server error: {}", code);
        }

        let resp = self.request(&code)?;
        if resp.starts_with(ACK_PREFIX) {
            return Ok(resp);
        }

        anyhow::bail!("server error: {}", resp);
    }
}
