use once_cell::sync::{Lazy, OnceCell};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

static FILTER: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();
static LOG_FILE: Lazy<Mutex<Option<(NonBlocking, WorkerGuard)>>> = Lazy::new(|| Mutex::new(None));

/// Initialise logging. `debug` level can be explicitly enabled via the
/// settings file, otherwise only `info` and above is shown. With debug
/// logging on, `RUST_LOG` may override the level.
///
/// Calling this again replaces the level and the log file.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging `RUST_LOG` is ignored so a stray variable in the
    // user's environment cannot turn on verbose output.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    match FILTER.get() {
        Some(handle) => {
            if let Err(err) = handle.reload(filter) {
                tracing::warn!("failed to update log filter: {err}");
            }
        }
        None => {
            let (filter, handle) = reload::Layer::new(filter);
            let installed = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(FileWriter))
                .try_init();
            if installed.is_ok() {
                let _ = FILTER.set(handle);
            }
        }
    }

    set_log_file(log_file.as_deref());
}

fn set_log_file(path: Option<&Path>) {
    let writer = path.and_then(|path| match open_appender(path) {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to open log file: {err}");
            None
        }
    });
    if let Ok(mut current) = LOG_FILE.lock() {
        // dropping the old guard flushes the previous file
        *current = writer;
    }
}

fn open_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?)
}

struct FileWriter;

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let writer = LOG_FILE
            .lock()
            .ok()
            .and_then(|current| current.as_ref().map(|(writer, _)| writer.clone()));
        LogFileWriter(writer)
    }
}

struct LogFileWriter(Option<NonBlocking>);

impl io::Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(writer) => writer.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
