use std::collections::BTreeMap;

use crate::alerting::domain::monitor_event::{EventSeverity, MonitorEvent};

/// Cross-cutting sink for monitor events.
///
/// Keeps the frame loop independent of where events end up (log backend,
/// test recorder, nothing).
pub trait MonitorLogger: Send {
    fn event(&mut self, event: &MonitorEvent);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullMonitorLogger;

impl MonitorLogger for NullMonitorLogger {
    fn event(&mut self, _event: &MonitorEvent) {}
}

/// Forwards events to the `log` crate as `key=value` lines and keeps
/// per-kind counts and signal averages for the summary.
#[derive(Default)]
pub struct LogMonitorLogger {
    counts: BTreeMap<&'static str, usize>,
    ear_sum: f64,
    mar_sum: f64,
    samples: usize,
    last_at: f64,
}

impl LogMonitorLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.counts.is_empty() {
            return None;
        }

        let mut lines = vec![format!(
            "Monitor summary ({} frames measured, {:.1}s):",
            self.samples, self.last_at
        )];
        if self.samples > 0 {
            let n = self.samples as f64;
            lines.push(format!(
                "  EAR avg {:.2}  MAR avg {:.2}",
                self.ear_sum / n,
                self.mar_sum / n
            ));
        }
        for (kind, count) in &self.counts {
            lines.push(format!("  {kind:18}: {count}"));
        }
        Some(lines.join("\n"))
    }
}

impl MonitorLogger for LogMonitorLogger {
    fn event(&mut self, event: &MonitorEvent) {
        *self.counts.entry(event.kind()).or_default() += 1;
        self.last_at = self.last_at.max(event.at().as_secs_f64());
        if let MonitorEvent::Metrics { metrics, .. } = event {
            self.ear_sum += metrics.ear;
            self.mar_sum += metrics.mar;
            self.samples += 1;
        }

        match event.severity() {
            EventSeverity::Frame | EventSeverity::Lifecycle => log::info!("{event}"),
            EventSeverity::Transition => log::warn!("{event}"),
            EventSeverity::Failure => log::error!("{event}"),
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
