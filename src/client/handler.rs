use std::io;
use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};

use crate::client::{ClientId, ClientSession, ConnectionHandle};
use crate::error::{ChatServerError, RegistryError, TransportError};
use crate::protocol::responses;
use crate::protocol::{CommandOutcome, handle_input};
use crate::server::ServerContext;

/// Drives one client connection from handshake to teardown.
///
/// - Sends the capacity signal and negotiates a unique username.
/// - Welcomes the client, activates it and announces the join.
/// - Hands each received line to `handle_input`.
/// - Removes the client when the connection ends, announcing the departure
///   unless `/quit` already did.
pub async fn handle_client<R, W>(
    reader: R,
    writer: W,
    peer: Option<SocketAddr>,
    context: ServerContext,
) -> Result<(), ChatServerError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let handle = ConnectionHandle::new(writer, peer);
    let label = peer.map_or_else(|| "in-process client".to_string(), |p| p.to_string());

    handle.send(responses::NOT_FULL).await?;

    let Some(id) = negotiate_name(&mut reader, &handle, &context).await? else {
        info!("Connection closed by {} before joining", label);
        return Ok(());
    };

    let session = ClientSession::new(id, handle.clone(), context);
    let joined = join_session(&session).await;
    let announced = joined.is_ok();
    let result = match joined {
        Ok(()) => run_session(&mut reader, &session).await,
        Err(e) => Err(e.into()),
    };

    if let Some(record) = session.registry().remove(id).await {
        if announced {
            info!("{} has left.", record.name());
            session
                .router()
                .broadcast_except(id, &responses::left(record.name()))
                .await;
        }
    }
    handle.shutdown().await;
    info!("Client {} ({}) disconnected", label, id);

    result
}

/// One line read from a client.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// Line text without its terminator, decoded lossily.
    Line(String),
    /// More than `limit` bytes before the newline; the rest of the line was discarded.
    Overlong,
    Closed,
}

/// Reads one newline-terminated line, buffering at most `limit` bytes of text.
///
/// Invalid UTF-8 is replaced rather than rejected. An overlong line is
/// drained up to its newline so the next read starts on a fresh line.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    // Room for the text plus a "\r\n" terminator.
    let cap = limit + 2;
    let read = (&mut *reader)
        .take(cap as u64)
        .read_until(b'\n', buf)
        .await?;

    if read == 0 {
        return Ok(Frame::Closed);
    }

    if buf.last() != Some(&b'\n') && read == cap {
        discard_line(reader).await?;
        return Ok(Frame::Overlong);
    }

    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    if end > limit {
        return Ok(Frame::Overlong);
    }
    Ok(Frame::Line(String::from_utf8_lossy(&buf[..end]).into_owned()))
}

/// Skips input up to and including the next newline, or to EOF.
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (found, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Welcomes a freshly registered client and makes it visible to others.
async fn join_session(session: &ClientSession) -> Result<(), TransportError> {
    session.reply(responses::WELCOME).await?;
    session.registry().activate(session.id()).await;

    let name = session.name().await;
    info!("{} has joined.", name);
    session
        .router()
        .broadcast_except(session.id(), &responses::joined(&name))
        .await;
    Ok(())
}

/// Join-time loop: keeps reading candidate names until one registers.
///
/// Returns `None` when the peer disconnects first.
async fn negotiate_name<R>(
    reader: &mut R,
    handle: &ConnectionHandle,
    context: &ServerContext,
) -> Result<Option<ClientId>, ChatServerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    loop {
        let candidate = match read_frame(reader, &mut buf, context.config.buffer_size).await? {
            Frame::Closed => return Ok(None),
            Frame::Overlong => {
                debug!("Discarded overlong username candidate");
                handle.send(responses::NAME_INVALID).await?;
                continue;
            }
            Frame::Line(candidate) => candidate,
        };

        if candidate.is_empty() {
            continue;
        }

        match context.registry.try_register(&candidate, handle.clone()).await {
            Ok(id) => {
                if let Err(e) = handle.send(responses::NAME_UNIQUE).await {
                    context.registry.remove(id).await;
                    return Err(e.into());
                }
                return Ok(Some(id));
            }
            Err(RegistryError::NameTaken(name)) => {
                info!("Username {} is taken; asking again", name);
                handle.send(responses::NAME_NOT_UNIQUE).await?;
            }
            Err(e) => {
                info!("Rejected username: {}", e);
                handle.send(responses::NAME_INVALID).await?;
            }
        }
    }
}

/// Post-join receive loop. Ends on `/quit`, EOF, read failure, or when the
/// handle is closed by the router after a failed delivery.
async fn run_session<R>(reader: &mut R, session: &ClientSession) -> Result<(), ChatServerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = session.buffer_size();

    loop {
        let frame = tokio::select! {
            frame = read_frame(reader, &mut buf, limit) => frame?,
            _ = session.handle().closed() => {
                warn!("Connection to {} marked dead; ending session", session.id());
                return Ok(());
            }
        };

        let text = match frame {
            Frame::Closed => {
                info!("Connection closed by client {}", session.id());
                return Ok(());
            }
            Frame::Overlong => {
                session.reply(&responses::message_length(limit)).await?;
                continue;
            }
            Frame::Line(text) => text,
        };

        if text.is_empty() {
            continue;
        }

        if handle_input(session, &text).await? == CommandOutcome::ClientLeaving {
            return Ok(());
        }
    }
}
