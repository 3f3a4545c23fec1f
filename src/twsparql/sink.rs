//! Output sink: standard output, or a file opened for this run.
//!
//! The sink is an owned value. [`OutputSink::close`] consumes it, and a sink dropped on an
//! error path releases its file handle through `Drop`, so a handle can neither leak nor be
//! closed twice. Standard output is flushed but never closed.

use crate::error::{Result, TwsError};
use std::fs::File;
use std::io::{self, BufWriter, IntoInnerError, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub enum OutputSink<W: Write = File> {
    Stdout(io::Stdout),
    File { path: PathBuf, writer: BufWriter<W> },
}

impl OutputSink<File> {
    /// Opens `target` for writing (truncating it), or falls back to standard output.
    pub fn open(target: Option<&Path>) -> Result<Self> {
        let Some(path) = target else {
            return Ok(Self::stdout());
        };

        let file = File::create(path).map_err(|source| TwsError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "output file opened");
        Ok(Self::from_writer(path, file))
    }
}

impl<W: Write> OutputSink<W> {
    pub fn stdout() -> Self {
        Self::Stdout(io::stdout())
    }

    pub fn from_writer(path: impl Into<PathBuf>, writer: W) -> Self {
        Self::File {
            path: path.into(),
            writer: BufWriter::new(writer),
        }
    }

    #[cfg(test)]
    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout(_))
    }

    #[cfg(test)]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout(_) => None,
            Self::File { path, .. } => Some(path.as_path()),
        }
    }

    /// Writes the complete rendered output in one operation and flushes it.
    pub fn write_output(&mut self, output: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout(out) => {
                let mut lock = out.lock();
                lock.write_all(output)?;
                lock.flush()
            }
            Self::File { writer, .. } => {
                writer.write_all(output)?;
                writer.flush()
            }
        }
    }

    /// Flushes and releases the sink. File handles are closed here; stdout stays open.
    pub fn close(self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.lock().flush(),
            Self::File { path, writer } => {
                let inner = writer.into_inner().map_err(IntoInnerError::into_error)?;
                drop(inner);
                debug!(path = %path.display(), "output file closed");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Writer that records its content and counts how often it is released.
    #[derive(Clone, Default)]
    pub(crate) struct TrackedWriter {
        pub content: Rc<RefCell<Vec<u8>>>,
        pub releases: Rc<Cell<usize>>,
        handle: Rc<()>,
        broken: bool,
    }

    impl TrackedWriter {
        /// A writer whose every write fails, as on a full disk.
        pub fn broken() -> Self {
            let mut writer = Self::default();
            writer.broken = true;
            writer
        }

        pub fn bytes(&self) -> Vec<u8> {
            self.content.borrow().clone()
        }

        /// Number of outstanding clones, i.e. the handle is still held while above one.
        pub fn holders(&self) -> usize {
            Rc::strong_count(&self.handle)
        }

        pub fn text(&self) -> String {
            String::from_utf8(self.bytes()).unwrap()
        }
    }

    impl Write for TrackedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken {
                return Err(io::Error::other("no space left on device"));
            }
            self.content.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for TrackedWriter {
        fn drop(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[test]
    fn test_open_without_target_is_stdout() {
        let sink = OutputSink::open(None).unwrap();
        assert!(sink.is_stdout());
        assert!(sink.path().is_none());
        sink.close().unwrap();
    }

    #[test]
    fn test_open_file_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let mut sink = OutputSink::open(Some(path.as_path())).unwrap();
        assert_eq!(sink.path(), Some(path.as_path()));
        sink.write_output(b"<p>rendered</p>").unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>rendered</p>");
    }

    #[test]
    fn test_open_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        std::fs::write(&path, "old content that is longer").unwrap();
        let mut sink = OutputSink::open(Some(path.as_path())).unwrap();
        sink.write_output(b"new").unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_open_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.html");
        let err = OutputSink::open(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, TwsError::OutputOpen { .. }));
        assert!(err.to_string().starts_with("could not create output file"));
    }

    #[test]
    fn test_close_releases_writer_once() {
        let writer = TrackedWriter::default();
        let probe = writer.clone();
        let mut sink = OutputSink::from_writer("out.html", writer);
        sink.write_output(b"abc").unwrap();
        sink.close().unwrap();
        assert_eq!(probe.releases.get(), 1);
        assert_eq!(probe.holders(), 1);
        assert_eq!(probe.text(), "abc");
    }

    #[test]
    fn test_drop_releases_writer_once() {
        let writer = TrackedWriter::default();
        let probe = writer.clone();
        let sink = OutputSink::from_writer("out.html", writer);
        drop(sink);
        assert_eq!(probe.releases.get(), 1);
        assert_eq!(probe.holders(), 1);
    }

    #[test]
    fn test_failed_write_still_releases_writer_once() {
        let writer = TrackedWriter::broken();
        let probe = writer.clone();
        let mut sink = OutputSink::from_writer("out.html", writer);
        assert!(sink.write_output(b"abc").is_err());
        assert!(sink.close().is_err());
        assert_eq!(probe.releases.get(), 1);
        assert_eq!(probe.holders(), 1);
    }
}
