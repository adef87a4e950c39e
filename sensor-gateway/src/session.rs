use anyhow::Context;
use log::{debug, info, warn};
use sensor_core::protocol::{Request, classify, format_ack};
use sensor_core::{ChallengeSource, INVALID_CODE, ReadingCache, TRY_AGAIN};
use std::io::{self, BufRead, Read, Write};
use std::sync::Arc;

/// Всё, что нужно сессии: общий кэш, источник challenge и лимит строки.
/// Один экземпляр на процесс, раздаётся соединениям через `Arc`.
pub(crate) struct SessionCtx<C> {
    pub(crate) cache: Arc<ReadingCache>,
    pub(crate) challenges: C,
    pub(crate) max_line: usize,
}

/// Цикл чтение -> разбор -> ответ для одного клиента.
///
/// Возвращает `Ok(())`, когда клиент сам закрыл соединение, и ошибку на любой
/// сбой ввода-вывода. В обоих случаях соединение дальше не используется.
pub(crate) fn run_session<R, W, C>(
    reader: &mut R,
    writer: &mut W,
    ctx: &SessionCtx<C>,
    peer: &str,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    C: ChallengeSource,
{
    loop {
        let Some(line) = read_line(reader, ctx.max_line, peer)
            .with_context(|| format!("read from {peer}"))?
        else {
            info!("client {peer} closed connection");
            return Ok(());
        };

        match classify(&line) {
            Request::Fetch => {
                debug!("{peer}: get");
                let current = ctx.cache.current();
                send(writer, &current).with_context(|| format!("write reading to {peer}"))?;
            }
            Request::Command(cmd) => {
                debug!("{peer}: command {:?}", String::from_utf8_lossy(&cmd));
                confirm_command(reader, writer, ctx, peer, &cmd)?;
            }
            Request::Unknown => {
                debug!("{peer}: unknown request {:?}", String::from_utf8_lossy(&line));
                send(writer, TRY_AGAIN).with_context(|| format!("write to {peer}"))?;
            }
        }
    }
}

// challenge -> ответ клиента -> ACK / invalid code
fn confirm_command<R, W, C>(
    reader: &mut R,
    writer: &mut W,
    ctx: &SessionCtx<C>,
    peer: &str,
    cmd: &[u8],
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    C: ChallengeSource,
{
    let challenge = match ctx.challenges.generate() {
        Ok(c) => c,
        Err(e) => {
            warn!("no challenge for {peer}: {e}");
            send(writer, TRY_AGAIN).with_context(|| format!("write to {peer}"))?;
            return Ok(());
        }
    };

    send(writer, challenge.to_line().as_bytes())
        .with_context(|| format!("write challenge to {peer}"))?;

    let Some(reply) = read_line(reader, ctx.max_line, peer)
        .with_context(|| format!("read challenge reply from {peer}"))?
    else {
        anyhow::bail!("client {peer} closed connection before answering challenge");
    };

    // только для логов; в ACK уходят исходные байты
    let shown = String::from_utf8_lossy(cmd);

    if challenge.verify(&reply) {
        info!("{peer}: confirmed {shown:?}");
        send(writer, &format_ack(cmd)).with_context(|| format!("write ack to {peer}"))?;
    } else {
        info!("{peer}: wrong code for {shown:?}");
        send(writer, INVALID_CODE).with_context(|| format!("write to {peer}"))?;
    }

    Ok(())
}

/// Читает до `\n` включительно, но не больше `max_line` байт, как есть.
/// `None` - EOF. Слишком длинный ввод режется на несколько строк, не теряется.
fn read_line<R: BufRead>(reader: &mut R, max_line: usize, peer: &str) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();

    let n = reader.by_ref().take(max_line as u64).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if n == max_line && !buf.ends_with(b"\n") {
        warn!("line from {peer} exceeds {max_line} bytes, splitting");
    }

    Ok(Some(buf))
}

// write_all: короткая запись = ошибка (WriteZero).
// Таймаут записи сокета ограничивает каждый write(2), а не весь write_all.
fn send<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes)?;
    writer.flush()
}
