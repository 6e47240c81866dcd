//! Connection handler
//!
//! Handles individual client connections: line framing, registration with
//! the ChatServer, and the independent read and write paths of a session.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::message::ServerMessage;
use crate::server::ServerHandle;
use crate::session::SessionControl;
use crate::types::ClientId;

/// How long a closing session may spend flushing its remaining lines
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Handle a new connection
///
/// Registers with the ChatServer (or answers `SERVER FULL` and returns),
/// then runs the read and write paths until the session closes. Whichever
/// path stops first closes the session for the other; the client is then
/// deregistered.
pub async fn handle_connection<S>(
    stream: S,
    server: ServerHandle,
    max_line_length: usize,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));

    let client_id = ClientId::new();
    let session = Arc::new(SessionControl::new());

    // Create mailbox for server -> client lines
    let (msg_tx, msg_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let name = match server.connect(client_id, msg_tx, session.clone()).await {
        Ok(name) => name,
        Err(AppError::ServerFull) => {
            framed.send(ServerMessage::Rejected.to_string()).await?;
            SinkExt::<String>::close(&mut framed).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    debug!("Session {} started for {}", client_id, name);

    let (sink, lines) = framed.split();

    let read_task = tokio::spawn(read_path(
        client_id,
        lines,
        server.clone(),
        session.clone(),
    ));
    let write_task = tokio::spawn(write_path(client_id, sink, msg_rx, session.clone()));

    if let Err(e) = read_task.await {
        warn!("Read task for {} panicked: {}", client_id, e);
    }
    if let Err(e) = write_task.await {
        warn!("Write task for {} panicked: {}", client_id, e);
    }

    session.finish();

    // No-op unless the read task died before deregistering
    if server.disconnect(client_id).await.is_err() {
        debug!("Server closed before {} was deregistered", client_id);
    }

    info!("Session {} ({}) closed", client_id, name);
    Ok(())
}

/// Read path: forward each line to the ChatServer until the peer goes away,
/// a line fails to decode, or the session is closed.
///
/// On the way out the session is closed and the client deregistered, without
/// waiting for the write path.
pub async fn read_path<R>(
    client_id: ClientId,
    mut lines: R,
    server: ServerHandle,
    session: Arc<SessionControl>,
) where
    R: Stream<Item = Result<String, LinesCodecError>> + Unpin,
{
    loop {
        tokio::select! {
            _ = session.closed() => break,
            next = lines.next() => match next {
                Some(Ok(line)) => {
                    if server.line(client_id, line).await.is_err() {
                        debug!("Server closed, ending read task for {}", client_id);
                        break;
                    }
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    warn!("Client {} sent an over-long line", client_id);
                    break;
                }
                Some(Err(LinesCodecError::Io(e))) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Client {} sent a line that is not UTF-8", client_id);
                    break;
                }
                Some(Err(e)) => {
                    warn!("Read error for {}: {}", client_id, e);
                    break;
                }
                None => {
                    debug!("Client {} closed the connection", client_id);
                    break;
                }
            },
        }
    }

    session.close();
    if server.disconnect(client_id).await.is_err() {
        debug!("Server closed before {} was deregistered", client_id);
    }
    debug!("Read task ended for {}", client_id);
}

/// Write path: drain the mailbox into the connection until the mailbox is
/// closed, a write fails, or the session is closed.
///
/// A write stuck on a peer that stopped reading is abandoned as soon as the
/// session closes. After that, lines the ChatServer still queues get
/// `CLOSE_GRACE` to go out before the connection is shut.
pub async fn write_path<W>(
    client_id: ClientId,
    mut sink: W,
    mut mailbox: mpsc::UnboundedReceiver<ServerMessage>,
    session: Arc<SessionControl>,
) where
    W: Sink<String, Error = LinesCodecError> + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            msg = mailbox.recv() => msg,
            _ = session.closed() => break,
        };

        let Some(msg) = msg else {
            break;
        };

        let sent = tokio::select! {
            biased;
            sent = sink.send(msg.to_string()) => sent,
            _ = session.closed() => break,
        };

        if let Err(e) = sent {
            warn!("Write error for {}: {}", client_id, e);
            session.close();
            break;
        }
    }

    let flushed = timeout(CLOSE_GRACE, async {
        while let Some(msg) = mailbox.recv().await {
            sink.feed(msg.to_string()).await?;
        }
        sink.close().await
    })
    .await;

    match flushed {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Closing connection for {} failed: {}", client_id, e),
        Err(_) => debug!("Gave up flushing {} after {:?}", client_id, CLOSE_GRACE),
    }
    debug!("Write task ended for {}", client_id);
}
