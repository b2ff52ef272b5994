//! crates/core/src/handler/sink.rs
//!
//! Output destinations for handlers: console streams, plain and rotating
//! files, a lazily-connected TCP socket, and the null sink. Every sink writes
//! one newline-terminated line per record and flushes immediately; emit-time
//! I/O failures are swallowed so a broken destination never fails the
//! logging call site.
//!
//! Console output can be redirected into thread-local memory with
//! [`ConsoleCapture`], which is how in-process tests assert on what a
//! console handler printed.

use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Console stream targets for stream handlers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamTarget {
    /// Standard output.
    Stdout,
    /// Standard error (the default for stream handlers).
    Stderr,
}

impl StreamTarget {
    /// Parse a stream name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "stderr" => Some(Self::Stderr),
            _ => None,
        }
    }

    /// The configuration spelling of this target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

#[derive(Clone, Default)]
struct CaptureState {
    stdout: Rc<RefCell<String>>,
    stderr: Rc<RefCell<String>>,
}

thread_local! {
    static CAPTURE: RefCell<Option<CaptureState>> = const { RefCell::new(None) };
}

/// Guard that redirects this thread's console handler output into memory.
///
/// While the guard lives, every console-targeted handler on this thread
/// appends to in-memory buffers instead of the process streams; dropping it
/// restores direct console output. Intended for tests and capture-style
/// assertions.
///
/// # Examples
///
/// ```rust
/// use logrig_core::handler::sink::ConsoleCapture;
///
/// let capture = ConsoleCapture::install();
/// // ... emit through a logger with a stream handler ...
/// assert_eq!(capture.stdout(), "");
/// ```
#[derive(Debug)]
pub struct ConsoleCapture {
    stdout: Rc<RefCell<String>>,
    stderr: Rc<RefCell<String>>,
}

impl ConsoleCapture {
    /// Install a fresh capture on the current thread, replacing any
    /// previous one.
    #[must_use]
    pub fn install() -> Self {
        let state = CaptureState::default();
        let guard = Self {
            stdout: Rc::clone(&state.stdout),
            stderr: Rc::clone(&state.stderr),
        };
        CAPTURE.with(|capture| *capture.borrow_mut() = Some(state));
        guard
    }

    /// Everything console handlers wrote to standard output so far.
    #[must_use]
    pub fn stdout(&self) -> String {
        self.stdout.borrow().clone()
    }

    /// Everything console handlers wrote to standard error so far.
    #[must_use]
    pub fn stderr(&self) -> String {
        self.stderr.borrow().clone()
    }
}

impl Drop for ConsoleCapture {
    fn drop(&mut self) {
        CAPTURE.with(|capture| *capture.borrow_mut() = None);
    }
}

/// Where a handler's formatted lines go.
#[derive(Debug)]
pub(crate) enum Sink {
    Console(StreamTarget),
    File(FileSink),
    Rotating(RotatingSink),
    Socket(SocketSink),
    Null,
}

impl Sink {
    pub(crate) fn write_line(&mut self, line: &str) {
        match self {
            Self::Console(target) => write_console(*target, line),
            Self::File(sink) => sink.write_line(line),
            Self::Rotating(sink) => sink.write_line(line),
            Self::Socket(sink) => sink.write_line(line),
            Self::Null => {}
        }
    }
}

fn write_console(target: StreamTarget, line: &str) {
    let captured = CAPTURE.with(|capture| {
        capture.borrow().as_ref().map(|state| match target {
            StreamTarget::Stdout => Rc::clone(&state.stdout),
            StreamTarget::Stderr => Rc::clone(&state.stderr),
        })
    });
    if let Some(buffer) = captured {
        let mut buffer = buffer.borrow_mut();
        buffer.push_str(line);
        buffer.push('\n');
        return;
    }
    match target {
        StreamTarget::Stdout => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
        StreamTarget::Stderr => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{line}");
            let _ = err.flush();
        }
    }
}

/// A plain file sink, opened at handler construction.
#[derive(Debug)]
pub(crate) struct FileSink {
    file: File,
}

impl FileSink {
    pub(crate) fn open(path: &Path, append: bool) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        Ok(Self {
            file: options.open(path)?,
        })
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.file, "{line}");
        let _ = self.file.flush();
    }
}

/// A size-rotating file sink: when a record would push the file past
/// `max_bytes`, the file rolls to numbered backups (`base.1`, `base.2`, …)
/// before the record is written.
#[derive(Debug)]
pub(crate) struct RotatingSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    file: File,
    written: u64,
}

impl RotatingSink {
    pub(crate) fn open(path: &Path, max_bytes: u64, backup_count: u32) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        Ok(Self {
            path: path.to_owned(),
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    fn write_line(&mut self, line: &str) {
        let len = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.written + len > self.max_bytes && self.rotate().is_err() {
            tracing::debug!(
                path = %self.path.display(),
                "log rotation failed; continuing with the current file"
            );
        }
        if writeln!(self.file, "{line}").is_ok() {
            self.written += len;
        }
        let _ = self.file.flush();
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count > 0 {
            let oldest = self.backup_path(self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        } else {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
        }
        self.written = 0;
        tracing::debug!(path = %self.path.display(), "rotated log file");
        Ok(())
    }

    fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }
}

/// A TCP sink that connects lazily on the first record and silently drops
/// records while the peer is unreachable.
#[derive(Debug)]
pub(crate) struct SocketSink {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl SocketSink {
    pub(crate) fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            stream: None,
        }
    }

    fn write_line(&mut self, line: &str) {
        if self.stream.is_none() {
            self.stream = TcpStream::connect((self.host.as_str(), self.port)).ok();
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if writeln!(stream, "{line}").is_err() {
            // Drop the connection; the next record retries.
            self.stream = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_target_parses_case_insensitively() {
        assert_eq!(StreamTarget::parse("stdout"), Some(StreamTarget::Stdout));
        assert_eq!(StreamTarget::parse("STDERR"), Some(StreamTarget::Stderr));
        assert_eq!(StreamTarget::parse("tty"), None);
    }

    #[test]
    fn capture_sees_console_lines_per_target() {
        let capture = ConsoleCapture::install();

        write_console(StreamTarget::Stdout, "to stdout");
        write_console(StreamTarget::Stderr, "to stderr");

        assert_eq!(capture.stdout(), "to stdout\n");
        assert_eq!(capture.stderr(), "to stderr\n");
    }

    #[test]
    fn dropping_capture_restores_direct_output() {
        {
            let _capture = ConsoleCapture::install();
        }
        let replacement = ConsoleCapture::install();
        write_console(StreamTarget::Stdout, "after reinstall");
        assert_eq!(replacement.stdout(), "after reinstall\n");
    }

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");

        let mut sink = FileSink::open(&path, true).unwrap();
        sink.write_line("first");
        sink.write_line("second");

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn file_sink_truncates_in_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old contents\n").unwrap();

        let mut sink = FileSink::open(&path, false).unwrap();
        sink.write_line("fresh");

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn rotating_sink_rolls_to_numbered_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.log");

        let mut sink = RotatingSink::open(&path, 16, 2).unwrap();
        sink.write_line("aaaaaaaaaa"); // 11 bytes
        sink.write_line("bbbbbbbbbb"); // would exceed 16: rotates first
        sink.write_line("cccccccccccccccccccc"); // rotates again

        assert_eq!(fs::read_to_string(&path).unwrap(), "cccccccccccccccccccc\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("rot.log.1")).unwrap(),
            "bbbbbbbbbb\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("rot.log.2")).unwrap(),
            "aaaaaaaaaa\n"
        );
    }

    #[test]
    fn rotating_sink_truncates_without_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.log");

        let mut sink = RotatingSink::open(&path, 8, 0).unwrap();
        sink.write_line("1234567"); // 8 bytes, fits exactly
        sink.write_line("next"); // exceeds: truncate in place

        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
        assert!(!dir.path().join("rot.log.1").exists());
    }

    #[test]
    fn socket_sink_drops_records_while_unreachable() {
        // Port 9 on localhost is overwhelmingly unbound; the write must
        // neither panic nor error out of the sink.
        let mut sink = SocketSink::new("127.0.0.1".to_owned(), 9);
        sink.write_line("lost");
        assert!(sink.stream.is_none());
    }

    #[test]
    fn null_sink_accepts_everything() {
        let mut sink = Sink::Null;
        sink.write_line("dropped");
    }
}
