use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime, writer::BoxMakeWriter, writer::MakeWriterExt},
    EnvFilter,
};

use crate::{shell_config::ShellConfig, DESKTOP_LOG_FILE};

const LOG_DIR_NAME: &str = "logs";

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

pub fn resolve_desktop_log_path(root_dir: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    root_dir.map(|root| root.join(LOG_DIR_NAME).join(file_name))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber. Returns the log file path when file output
/// is active. Safe to call twice; the second call is a no-op.
pub fn init_logging(config: &ShellConfig) -> Option<PathBuf> {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|error| {
        eprintln!(
            "invalid log filter '{}' ({error}), using default",
            config.log_filter
        );
        EnvFilter::new(crate::DEFAULT_LOG_FILTER)
    });

    let log_path = resolve_desktop_log_path(config.root_dir(), DESKTOP_LOG_FILE);
    let (writer, file_path, file_error) = match log_path {
        Some(path) => match open_log_file(&path) {
            Ok(file) => (
                BoxMakeWriter::new(io::stderr.and(Mutex::new(file))),
                Some(path),
                None,
            ),
            Err(error) => (BoxMakeWriter::new(io::stderr), None, Some((path, error))),
        },
        None => (BoxMakeWriter::new(io::stderr), None, None),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTimer)
        .with_target(true)
        .with_ansi(file_path.is_none())
        .with_writer(writer)
        .try_init()
        .is_ok();
    if !installed {
        return None;
    }

    if let Some((path, error)) = file_error {
        tracing::warn!(%error, path = %path.display(), "desktop log file unavailable, logging to stderr only");
    }
    file_path
}

pub fn append_desktop_log(message: &str) {
    tracing::info!(target: "desktop", "{message}");
}

pub fn append_startup_log(message: &str) {
    tracing::info!(target: "startup", "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_lives_under_root_logs_dir() {
        assert_eq!(
            resolve_desktop_log_path(Some(Path::new("/data/sparkpilot")), "desktop.log"),
            Some(PathBuf::from("/data/sparkpilot/logs/desktop.log"))
        );
        assert_eq!(resolve_desktop_log_path(None, "desktop.log"), None);
    }

    #[test]
    fn open_log_file_creates_missing_directories_and_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("desktop.log");

        {
            use std::io::Write;
            let mut file = open_log_file(&path).expect("first open");
            writeln!(file, "first").expect("write");
            let mut file = open_log_file(&path).expect("second open");
            writeln!(file, "second").expect("write");
        }

        let contents = fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "first\nsecond\n");
    }
}
