//! Background reader worker.
//!
//! One thread owns the line source for its whole lifetime. It blocks on reads
//! (timeouts are not errors), runs every complete line through the pipeline
//! and hands the result to the presentation side over a bounded channel.
//!
//! Channel policy:
//! - malformed lines are skipped silently, as are lines longer than
//!   `MAX_LINE_BYTES`
//! - when the channel is full the newest reading is dropped and counted
//! - the final `Disconnected` event is always delivered (blocking send)
//! - the worker stops on source failure, end of stream, or once the receiver
//!   has been dropped

use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError, sync_channel};
use std::thread::{self, JoinHandle};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::app::pipeline::process_line;
use crate::domain::LinkEvent;
use crate::io::decode::decode_bytes;

/// Presentation-side handle to a running reader thread.
pub struct ReaderHandle {
    events: Receiver<LinkEvent>,
    dropped: Arc<AtomicU64>,
    // Detached on drop; the worker exits on its own.
    _worker: JoinHandle<()>,
}

impl ReaderHandle {
    /// Non-blocking: every event queued so far, oldest first.
    pub fn drain(&self) -> Vec<LinkEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Blocking: the next event, or `None` once the worker has exited.
    pub fn recv(&self) -> Option<LinkEvent> {
        self.events.recv().ok()
    }

    /// Readings discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Spawn the reader thread over `source`.
pub fn spawn_reader<R>(source: R, capacity: usize) -> io::Result<ReaderHandle>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = sync_channel(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    let worker_dropped = Arc::clone(&dropped);

    let worker = thread::Builder::new()
        .name("leafmon-reader".to_string())
        .spawn(move || {
            info!("reader started");
            if let Some(reason) = read_loop(source, &tx, &worker_dropped) {
                warn!(%reason, "serial link lost, reader stopped");
                // Receiver may already be gone; nothing left to notify then.
                let _ = tx.send(LinkEvent::Disconnected { reason });
            } else {
                debug!("receiver dropped, reader stopped");
            }
        })?;

    Ok(ReaderHandle {
        events: rx,
        dropped,
        _worker: worker,
    })
}

/// Longest line kept. Anything longer is discarded up to the next newline.
pub const MAX_LINE_BYTES: usize = 1024;

/// Read lines until the source fails.
///
/// Returns the disconnect reason, or `None` when the receiver went away first.
fn read_loop<R: Read>(source: R, tx: &SyncSender<LinkEvent>, dropped: &AtomicU64) -> Option<String> {
    let mut reader = BufReader::new(source);
    // Partial line bytes survive read timeouts.
    let mut buf = Vec::new();
    // Set while skipping the rest of an overlong line.
    let mut overflowed = false;

    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if is_idle(&e) => continue,
            Err(e) => return Some(e.to_string()),
        };

        if chunk.is_empty() {
            if !buf.is_empty() && !overflowed && !forward_line(&decode_bytes(&buf), tx, dropped) {
                return None;
            }
            return Some("end of stream".to_string());
        }

        let newline = chunk.iter().position(|&b| b == b'\n');
        let part = &chunk[..newline.unwrap_or(chunk.len())];
        if !overflowed {
            if buf.len() + part.len() > MAX_LINE_BYTES {
                overflowed = true;
                buf.clear();
            } else {
                buf.extend_from_slice(part);
            }
        }
        let used = newline.map_or(chunk.len(), |i| i + 1);
        reader.consume(used);

        if newline.is_some() {
            let complete = !std::mem::replace(&mut overflowed, false);
            if complete {
                let line = decode_bytes(&buf);
                buf.clear();
                if !forward_line(&line, tx, dropped) {
                    return None;
                }
            }
        }
    }
}

/// Returns `false` once the receiver is gone.
fn forward_line(line: &str, tx: &SyncSender<LinkEvent>, dropped: &AtomicU64) -> bool {
    let Ok(reading) = process_line(line, Local::now()) else {
        return true;
    };
    match tx.try_send(LinkEvent::Reading(reading)) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            dropped.fetch_add(1, Ordering::Relaxed);
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}
