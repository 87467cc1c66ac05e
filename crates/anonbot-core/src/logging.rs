use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Local, NaiveDate};
use tracing_subscriber::{fmt, fmt::writer::MakeWriter, prelude::*, EnvFilter};

use crate::{errors::Error, Result};

pub const LATEST_LOG: &str = "latest.log";
const ROTATED_SUFFIX: &str = ".log";

/// Initialize logging for the bot: console plus a daily-rotated file in `log_dir`.
///
/// The file sink writes to `latest.log`; at the first write after local
/// midnight the file is renamed to `YYYYMMDD.log` and a fresh one is started.
/// Only the newest `retention` rotated files are kept.
pub fn init(service_name: &str, log_dir: &Path, retention: usize) -> Result<()> {
    // Default: info for our crates. Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,anonbot_core=info,anonbot_slack=info,{service_name}=info"
        ))
    });

    let file_writer = DailyLogWriter::new(log_dir.to_path_buf(), retention)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_file(true))
        .with(
            fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| Error::External(format!("logging init failed: {e}")))?;

    Ok(())
}

#[derive(Debug)]
struct DailyState {
    current_day: NaiveDate,
    file: File,
}

#[derive(Clone, Debug)]
struct DailyLogWriter {
    log_dir: PathBuf,
    retention: usize,
    state: Arc<Mutex<DailyState>>,
}

impl DailyLogWriter {
    fn new(log_dir: PathBuf, retention: usize) -> Result<Self> {
        fs::create_dir_all(&log_dir)?;
        let today = Local::now().date_naive();

        // A leftover `latest.log` from an earlier day is rotated before appending.
        if let Some(day) = last_modified_day(&log_dir.join(LATEST_LOG)) {
            if day != today {
                rotate_latest(&log_dir, day)?;
            }
        }
        cleanup_rotated_logs(&log_dir, retention)?;

        let file = open_latest(&log_dir)?;
        Ok(Self {
            log_dir,
            retention,
            state: Arc::new(Mutex::new(DailyState {
                current_day: today,
                file,
            })),
        })
    }
}

impl<'a> MakeWriter<'a> for DailyLogWriter {
    type Writer = DailyLogGuard;

    fn make_writer(&'a self) -> Self::Writer {
        DailyLogGuard {
            log_dir: self.log_dir.clone(),
            retention: self.retention,
            state: self.state.clone(),
        }
    }
}

struct DailyLogGuard {
    log_dir: PathBuf,
    retention: usize,
    state: Arc<Mutex<DailyState>>,
}

impl Write for DailyLogGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let today = Local::now().date_naive();
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("failed to lock log writer"))?;

        if state.current_day != today {
            state.file.flush()?;
            rotate_latest(&self.log_dir, state.current_day)
                .map_err(|e| io::Error::other(e.to_string()))?;
            state.file = open_latest(&self.log_dir)?;
            state.current_day = today;
            let _ = cleanup_rotated_logs(&self.log_dir, self.retention);
        }

        state.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("failed to lock log writer"))?;
        state.file.flush()
    }
}

fn open_latest(log_dir: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LATEST_LOG))
}

fn last_modified_day(path: &Path) -> Option<NaiveDate> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}

pub fn rotated_name(day: NaiveDate) -> String {
    format!("{}{ROTATED_SUFFIX}", day.format("%Y%m%d"))
}

fn parse_rotated_name(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(ROTATED_SUFFIX)?;
    if stem.len() != 8 || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stem, "%Y%m%d").ok()
}

/// Move `latest.log` to the dated name for `day`. No-op when there is nothing to rotate.
pub fn rotate_latest(log_dir: &Path, day: NaiveDate) -> Result<()> {
    let latest = log_dir.join(LATEST_LOG);
    if !latest.exists() {
        return Ok(());
    }
    let target = log_dir.join(rotated_name(day));
    if target.exists() {
        // Same day rotated twice (restart across midnight); keep both halves.
        let tail = fs::read(&latest)?;
        let mut out = OpenOptions::new().append(true).open(&target)?;
        out.write_all(&tail)?;
        fs::remove_file(&latest)?;
    } else {
        fs::rename(&latest, &target)?;
    }
    Ok(())
}

/// Keep only the newest `keep` rotated files; `latest.log` is never touched.
pub fn cleanup_rotated_logs(log_dir: &Path, keep: usize) -> Result<()> {
    let entries = match fs::read_dir(log_dir) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut rotated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(day) = path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(parse_rotated_name)
        else {
            continue;
        };
        rotated.push((day, path));
    }

    rotated.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in rotated.into_iter().skip(keep) {
        let _ = fs::remove_file(path);
    }
    Ok(())
}
