//! Logging setup
//!
//! Everything is logged to stdout and, at debug level, into an in-memory
//! buffer that is stored next to the cluster document.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Shared in-memory log sink
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything logged so far
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }
}

pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Filter at `level` for the kubecatalog crates, `info` for dependencies
fn crate_filter(level: &str) -> EnvFilter {
    // Targets match by prefix, so this covers every kubecatalog_* crate
    EnvFilter::new(format!("info,kubecatalog={}", level))
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the stdout level.
pub fn init(verbose: bool, capture: LogCapture) {
    let stdout_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| crate_filter(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_filter(stdout_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(capture)
                .with_filter(crate_filter("debug")),
        )
        .init();
}
