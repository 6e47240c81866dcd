//! Line client
//!
//! Terminal front end for the chat server: typed lines go to the server,
//! server lines are printed as they arrive.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info};

use crate::error::AppError;

/// Connect to `addr` and relay between the terminal and the server
pub async fn run(addr: &str) -> Result<(), AppError> {
    let stream = TcpStream::connect(addr).await?;
    info!("Connected to {}", addr);

    relay(stream, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Pump `input` lines to `server` and `server` lines to `output`
///
/// When `input` ends, the write half to the server is shut and server lines
/// keep flowing until the server closes the connection.
pub async fn relay<S, I, O>(server: S, input: I, output: O) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (mut to_server, mut from_server) = Framed::new(server, LinesCodec::new()).split();
    let mut typed = FramedRead::new(input, LinesCodec::new());
    let mut shown = FramedWrite::new(output, LinesCodec::new());
    let mut input_open = true;

    loop {
        tokio::select! {
            line = from_server.next() => match line {
                Some(line) => shown.send(line?).await?,
                None => {
                    debug!("Server closed the connection");
                    break;
                }
            },
            line = typed.next(), if input_open => match line {
                Some(line) => to_server.send(line?).await?,
                None => {
                    debug!("Input closed, waiting for the server to hang up");
                    input_open = false;
                    to_server.close().await?;
                }
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_relay_pumps_both_ways() {
        let (client_side, server_side) = tokio::io::duplex(1024);
        let (screen, mut terminal) = tokio::io::duplex(1024);
        let mut server = Framed::new(server_side, LinesCodec::new());

        let task = tokio::spawn(relay(client_side, &b"hello\n"[..], screen));

        assert_eq!(server.next().await.unwrap().unwrap(), "hello");
        // End of input shuts the client's write half
        assert!(server.next().await.is_none());

        server.send("Server says: Goodbye").await.unwrap();
        drop(server);

        timeout(Duration::from_secs(1), task)
            .await
            .expect("relay should end when the server hangs up")
            .unwrap()
            .unwrap();

        let shown: Vec<String> = FramedRead::new(&mut terminal, LinesCodec::new())
            .map(|line| line.unwrap())
            .collect()
            .await;
        assert_eq!(shown, vec!["Server says: Goodbye"]);
    }

    #[tokio::test]
    async fn test_run_reports_refused_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = run(&addr).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
