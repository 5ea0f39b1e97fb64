use crate::game::room::{Room, OUTBOUND_QUEUE_FRAMES};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Longest client record accepted, newline included.
pub const MAX_RECORD_BYTES: u64 = 4096;

/// Serves one client: a dedicated writer task drains the outbound queue while this
/// task reads newline-terminated records until the peer goes away.
pub async fn handle_socket(stream: TcpStream, address: SocketAddr, room: Arc<Room>) {
    let _ = stream.set_nodelay(true);
    let (reader, writer) = stream.into_split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_FRAMES);
    let Some(session_id) = room.add_session(tx) else { return };
    tracing::debug!(session_id, %address, "session started");

    let send_task = tokio::spawn(async move {
        let mut writer = BufWriter::new(writer);
        while let Some(payload) = rx.recv().await {
            if writer.write_all(payload.as_bytes()).await.is_err() {
                return;
            }
            while let Ok(payload) = rx.try_recv() {
                if writer.write_all(payload.as_bytes()).await.is_err() {
                    return;
                }
            }
            if writer.flush().await.is_err() {
                return;
            }
        }
    });

    let mut reader = BufReader::new(reader);
    let mut record = Vec::new();
    loop {
        record.clear();
        match (&mut reader)
            .take(MAX_RECORD_BYTES)
            .read_until(b'\n', &mut record)
            .await
        {
            Ok(0) => break,
            Ok(read) => {
                // A record cut off by end of stream is never applied.
                if record.last() != Some(&b'\n') {
                    if read as u64 >= MAX_RECORD_BYTES {
                        tracing::warn!(session_id, %address, "client record too long");
                    }
                    break;
                }
                let Ok(line) = std::str::from_utf8(&record) else { continue };
                room.handle_text_message(session_id, line);
            }
            Err(error) => {
                tracing::debug!(session_id, ?error, "read failed");
                break;
            }
        }
    }

    room.remove_session(session_id);
    send_task.abort();
}
