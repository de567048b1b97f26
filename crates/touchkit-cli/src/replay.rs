//! Trace loading, offline replay and output rendering.

use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use touchkit_core::{ConfigError, GestureConfig, GestureEngine, GestureEvent, Point, TouchInput};

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid YAML trace: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// A gesture with the time it was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct TimedEvent {
    pub(crate) at_ms: u64,
    pub(crate) event: GestureEvent,
}

/// Read a trace file. `.json` files are parsed as JSON, anything else as YAML.
pub(crate) fn load_trace(path: &Path) -> Result<Vec<TouchInput>, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&source)?)
    } else {
        Ok(serde_yaml_ng::from_str(&source)?)
    }
}

/// Fire timers one deadline at a time so each event keeps its own time.
fn flush(engine: &mut GestureEngine, until_ms: u64, out: &mut Vec<TimedEvent>) {
    while let Some(deadline) = engine.next_deadline() {
        if deadline > until_ms {
            break;
        }
        out.extend(
            engine
                .advance_to(deadline)
                .into_iter()
                .map(|event| TimedEvent {
                    at_ms: deadline,
                    event,
                }),
        );
    }
}

/// Run `frames` through a fresh engine.
///
/// Timers are flushed up to `until_ms`, or the last frame time plus the
/// longest configured delay.
pub(crate) fn replay(
    frames: &[TouchInput],
    config: GestureConfig,
    until_ms: Option<u64>,
) -> Vec<TimedEvent> {
    let mut engine = GestureEngine::with_config(config);
    let mut out = Vec::new();

    for frame in frames {
        let at_ms = match frame.timestamp_ms() {
            Some(t) => {
                flush(&mut engine, t, &mut out);
                t
            }
            None => engine.clock_ms(),
        };
        out.extend(
            engine
                .process(frame)
                .into_iter()
                .map(|event| TimedEvent { at_ms, event }),
        );
    }

    let last = frames
        .iter()
        .filter_map(TouchInput::timestamp_ms)
        .max()
        .unwrap_or(0);
    let until_ms = until_ms.unwrap_or_else(|| last + engine.config().max_delay_ms());
    flush(&mut engine, until_ms, &mut out);
    tracing::debug!(events = out.len(), until_ms, "replay finished");
    out
}

fn point(p: Point) -> String {
    format!("({:.1}, {:.1})", p.x, p.y)
}

fn describe(event: &GestureEvent) -> String {
    match event {
        GestureEvent::Tap { position }
        | GestureEvent::DoubleTap { position }
        | GestureEvent::LongPress { position }
        | GestureEvent::PanStart { position }
        | GestureEvent::PanEnd { position } => format!("at {}", point(*position)),
        GestureEvent::PanMove { position, delta } => {
            format!("at {} delta {}", point(*position), point(*delta))
        }
        GestureEvent::Swipe(swipe) => format!(
            "{} {:.1}px {:.2}px/ms in {}ms",
            swipe.direction, swipe.distance, swipe.velocity, swipe.duration_ms
        ),
        GestureEvent::Pinch(pinch) => {
            format!("scale {:.3} center {}", pinch.scale, point(pinch.center))
        }
    }
}

/// Format events for printing.
pub(crate) fn render(events: &[TimedEvent], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => {
            let mut text = String::new();
            for timed in events {
                text.push_str(&format!(
                    "{:>8}ms  {:<11} {}\n",
                    timed.at_ms,
                    timed.event.kind().to_string(),
                    describe(&timed.event)
                ));
            }
            Ok(text)
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(events)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Load and validate a config file, returning its effective values as YAML.
pub(crate) fn check_config(path: &Path) -> Result<String, CliError> {
    let config = GestureConfig::from_path(path)?;
    Ok(serde_yaml_ng::to_string(&config)?)
}
