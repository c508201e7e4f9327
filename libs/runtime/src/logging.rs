//! Logging bootstrap.
//!
//! The `default` section covers every target that no other section claims;
//! any other key is a target prefix such as `card_portal::infra::http`.
//! Console output goes to stderr so command output on stdout stays clean.
//! Files are JSON lines, rotated by size and resolved under `home_dir`.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use tracing::level_filters::LevelFilter;
use tracing::Metadata;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const ROTATED_FILES_KEPT: usize = 3;

/// "off"/"none" disable output; anything unrecognised falls back to info.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// `target` is `prefix` itself or one of its submodules.
fn belongs_to(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Per-target levels; the longest matching prefix wins.
#[derive(Clone, Debug)]
struct LevelMap {
    fallback: LevelFilter,
    by_prefix: Vec<(String, LevelFilter)>,
}

impl LevelMap {
    fn new(fallback: LevelFilter, mut by_prefix: Vec<(String, LevelFilter)>) -> Self {
        by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            fallback,
            by_prefix,
        }
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| belongs_to(target, prefix))
            .map_or(self.fallback, |(_, level)| *level)
    }

    fn enabled(&self, meta: &Metadata<'_>) -> bool {
        *meta.level() <= self.level_for(meta.target())
    }

    fn is_silent(&self) -> bool {
        self.fallback == LevelFilter::OFF && self.by_prefix.iter().all(|(_, l)| *l == LevelFilter::OFF)
    }
}

/// A size-rotated log file shared by every record routed to it.
#[derive(Clone)]
struct LogFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl LogFile {
    fn open(path: &Path, max_size_mb: u64) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = usize::try_from(max_size_mb.max(1).saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);
        let rotate = FileRotate::new(
            path,
            AppendCount::new(ROTATED_FILES_KEPT),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Writer for one record; `None` swallows the bytes.
struct RecordWriter(Option<LogFile>);

impl Write for RecordWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => match file.0.lock() {
                Ok(mut rotate) => rotate.write(buf),
                Err(_) => Ok(buf.len()),
            },
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => match file.0.lock() {
                Ok(mut rotate) => rotate.flush(),
                Err(_) => Ok(()),
            },
            None => Ok(()),
        }
    }
}

/// Picks the file of the most specific section that has one.
#[derive(Clone, Default)]
struct FileSinks {
    fallback: Option<LogFile>,
    by_prefix: Vec<(String, LogFile)>,
}

impl FileSinks {
    fn file_for(&self, target: &str) -> Option<LogFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| belongs_to(target, prefix))
            .map(|(_, f)| f.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> MakeWriter<'a> for FileSinks {
    type Writer = RecordWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RecordWriter(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        RecordWriter(self.file_for(meta.target()))
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<LogFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    let max_mb = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB);
    match LogFile::open(&path, max_mb) {
        Ok(file) => Some(file),
        Err(e) => {
            // No subscriber yet, so stderr is the only channel.
            eprintln!("cannot open log file for '{name}' at {}: {e}", path.display());
            None
        }
    }
}

/// Console and file levels plus the opened files, derived from the config.
struct Plan {
    console: LevelMap,
    file: LevelMap,
    sinks: FileSinks,
}

impl Plan {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let default = cfg.get(DEFAULT_SECTION);
        let subsystems: Vec<(&String, &Section)> =
            cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION).collect();

        let mut sinks = FileSinks {
            fallback: default.and_then(|s| open_section_file(DEFAULT_SECTION, s, base_dir)),
            by_prefix: Vec::new(),
        };
        let mut file_levels = Vec::new();
        for (name, section) in &subsystems {
            let file = open_section_file(name, section, base_dir);
            // A subsystem without its own file is not written to any file.
            let level = if file.is_some() {
                parse_level(&section.file_level)
            } else {
                LevelFilter::OFF
            };
            if let Some(file) = file {
                sinks.by_prefix.push(((*name).clone(), file));
            }
            file_levels.push(((*name).clone(), level));
        }
        sinks.by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let default_file_level = match (default, sinks.fallback.is_some()) {
            (Some(s), true) => parse_level(&s.file_level),
            _ => LevelFilter::OFF,
        };

        let console = LevelMap::new(
            default.map_or(LevelFilter::WARN, |s| parse_level(&s.console_level)),
            subsystems
                .iter()
                .map(|(name, s)| ((*name).clone(), parse_level(&s.console_level)))
                .collect(),
        );

        Self {
            console,
            file: LevelMap::new(default_file_level, file_levels),
            sinks,
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
///
/// `base_dir` anchors relative log file paths (normally `client.home_dir`).
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Route `log` records from dependencies into tracing.
    let _ = tracing_log::LogTracer::init();

    let plan = Plan::build(cfg, base_dir);
    let ansi = std::io::stderr().is_terminal();

    let console = (!plan.console.is_silent()).then(|| {
        let levels = plan.console.clone();
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(FilterFn::new(move |meta| levels.enabled(meta)))
    });

    let files = (!plan.sinks.is_empty() && !plan.file.is_silent()).then(|| {
        let levels = plan.file.clone();
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(plan.sinks.clone())
            .with_filter(FilterFn::new(move |meta| levels.enabled(meta)))
    });

    let _ = Registry::default().with(console).with(files).try_init();
}
