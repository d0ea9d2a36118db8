//! Stream plumbing for the VM
//!
//! Program output and the diagnostic channel are shared, lockable writers so
//! an embedder (or a test) can keep a handle and read what was written.

use crate::value::RuntimeError;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::sync::{Arc, Mutex};

/// Shared output sink
pub type OutputWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Line-oriented input source for `READ`
pub type InputReader = Box<dyn BufRead + Send>;

/// Buffered stdout; the VM flushes it when a run ends
pub fn stdout_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(BufWriter::new(io::stdout()))))
}

pub fn stderr_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(io::stderr())))
}

pub fn stdin_reader() -> InputReader {
    Box::new(BufReader::new(io::stdin()))
}

/// Input source with nothing to read
pub fn empty_reader() -> InputReader {
    Box::new(io::empty())
}

/// Input source over an in-memory string
pub fn string_reader(text: impl Into<String>) -> InputReader {
    Box::new(io::Cursor::new(text.into().into_bytes()))
}

/// Write text through a shared writer
pub fn emit(writer: &OutputWriter, text: &str) -> Result<(), RuntimeError> {
    let mut guard = writer.lock().map_err(|_| poisoned())?;
    guard.write_all(text.as_bytes())?;
    Ok(())
}

pub fn flush(writer: &OutputWriter) -> Result<(), RuntimeError> {
    writer.lock().map_err(|_| poisoned())?.flush()?;
    Ok(())
}

fn poisoned() -> RuntimeError {
    RuntimeError::Io {
        message: "output writer lock poisoned".to_string(),
    }
}

/// In-memory writer whose contents stay readable through a cloned handle
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a handle to this buffer as an [`OutputWriter`]
    pub fn writer(&self) -> OutputWriter {
        Arc::new(Mutex::new(Box::new(self.clone())))
    }

    pub fn contents(&self) -> String {
        let bytes = match self.buf.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
