use crate::config::{ACCEPT_TICK, WRITE_TIMEOUT};
use crate::session::{SessionCtx, run_session};
use anyhow::Context;
use log::{info, warn};
use sensor_core::ChallengeSource;
use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use std::time::Duration;

/// Привязка слушающего сокета. Ошибка здесь фатальна для процесса.
pub(crate) fn bind_listener(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener =
        TcpListener::bind(addr).with_context(|| format!("bind TCP listener {}", addr))?;
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;
    Ok(listener)
}

// accept loop: по потоку на соединение
pub(crate) fn run_tcp_listener<C>(
    listener: TcpListener,
    ctx: Arc<SessionCtx<C>>,
    idle_timeout: Option<Duration>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    C: ChallengeSource + 'static,
{
    let mut session_handles = Vec::new();

    loop {
        reap_finished_sessions(&mut session_handles);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                info!("new client: {addr}");

                let ctx = ctx.clone();
                let h = thread::spawn(move || {
                    if let Err(e) = handle_conn(stream, addr, &ctx, idle_timeout) {
                        warn!("closing {addr}: {e:#}");
                    }
                });
                session_handles.push(h);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(ACCEPT_TICK);
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(ACCEPT_TICK);
            }
        }
    }

    reap_finished_sessions(&mut session_handles);
    if !session_handles.is_empty() {
        // висят на read() от молчащих клиентов, ждать их не будем
        info!("{} client sessions still open at shutdown", session_handles.len());
    }

    Ok(())
}

fn reap_finished_sessions(handles: &mut Vec<thread::JoinHandle<()>>) {
    let mut i = 0;
    while i < handles.len() {
        if handles[i].is_finished() {
            let h = handles.swap_remove(i);
            if let Err(panic) = h.join() {
                warn!("session thread panicked: {:?}", panic);
            }
        } else {
            i += 1;
        }
    }
}

fn handle_conn<C: ChallengeSource>(
    stream: TcpStream,
    addr: SocketAddr,
    ctx: &SessionCtx<C>,
    idle_timeout: Option<Duration>,
) -> anyhow::Result<()> {
    stream
        .set_nonblocking(false)
        .context("stream.set_nonblocking(false)")?;
    stream.set_nodelay(true).ok();
    stream
        .set_write_timeout(Some(WRITE_TIMEOUT))
        .context("set write timeout")?;
    stream
        .set_read_timeout(idle_timeout)
        .context("set read timeout")?;

    let mut reader = BufReader::new(stream.try_clone().context("clone client stream")?);
    let mut writer = stream;
    let peer = addr.to_string();

    let res = run_session(&mut reader, &mut writer, ctx, &peer);

    writer.shutdown(std::net::Shutdown::Both).ok();
    res
}
