//! Log capture for tests
//!
//! `LogBuffer` implements `MakeWriter` so tracing-subscriber writes formatted
//! lines into memory instead of stderr. `capture` runs a closure under such a
//! subscriber and returns what it logged.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Shared sink of formatted log lines. Every clone appends to the same list.
#[derive(Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
    }

    /// Take every line captured so far, oldest first.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Per-event writer: collects bytes and hands whole lines to the buffer.
pub struct BufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl BufferWriter {
    fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            pending: Vec::new(),
        }
    }

    fn flush_lines(&mut self) {
        // The fmt layer may split one event across several writes
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let s = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            self.buffer.push(s);
        }
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            let s = String::from_utf8_lossy(&self.pending).into_owned();
            self.buffer.push(s);
            self.pending.clear();
        }
        Ok(())
    }
}

/// An event without a trailing newline still lands as a line.
impl Drop for BufferWriter {
    fn drop(&mut self) {
        let _ = Write::flush(self);
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter::new(self.clone())
    }
}

/// Run `f` with a thread-local subscriber writing into a fresh buffer.
///
/// Lines look like `" INFO ESPSRTP: message"`: no timestamps, no colour,
/// every level enabled.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let buf = LogBuffer::new();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buf.drain())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_takes_everything_once() {
        let buf = LogBuffer::new();
        let other = buf.clone();
        for i in 0..600 {
            other.push(format!("line {}", i));
        }

        let lines = buf.drain();
        assert_eq!(lines.len(), 600);
        assert_eq!(lines[0], "line 0");
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn test_buffer_writer_partial() {
        let buf = LogBuffer::new();
        {
            let mut writer = BufferWriter::new(buf.clone());
            write!(writer, "hello\npartial").unwrap();
            assert_eq!(buf.drain(), vec!["hello"]);
        }
        assert_eq!(buf.drain(), vec!["partial"]);
    }

    #[test]
    fn test_capture_formats_target() {
        let ((), lines) = capture(|| tracing::info!(target: "ESPSRTP", "SUCCESS"));
        assert_eq!(lines, vec![" INFO ESPSRTP: SUCCESS"]);
    }
}
