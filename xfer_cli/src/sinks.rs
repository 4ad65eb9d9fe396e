use indicatif::{ProgressBar, ProgressStyle};

use xfer_core::progress::{format_bytes, ProgressReport, ProgressSink, Stage};

/// Prints each report's message on stdout, one line per event.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_report(&mut self, report: &ProgressReport) {
        println!("{}", report.message);
    }
}

/// Prints each report as a JSON object, one per line.
pub struct JsonSink;

impl ProgressSink for JsonSink {
    fn on_report(&mut self, report: &ProgressReport) {
        match serde_json::to_string(report) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("[json] could not serialize report: {}", e),
        }
    }
}

/// Renders a transfer as a single indicatif bar.
///
/// The bar is created on the first report. It starts as a spinner and is
/// switched to a bar once the total size is known.
pub struct TerminalSink {
    label: String,
    bar: Option<ProgressBar>,
}

impl TerminalSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: None,
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        let label = &self.label;
        self.bar.get_or_insert_with(|| {
            let style = ProgressStyle::with_template("{spinner} {prefix} {bytes} ({binary_bytes_per_sec}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            let pb = ProgressBar::new_spinner();
            pb.set_style(style);
            pb.set_prefix(label.clone());
            pb
        })
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix} [{bar:30.cyan/blue}] {percent:>3}% {bytes}/{total_bytes} ({binary_bytes_per_sec}) ETA {eta} {msg}",
    )
    .map(|s| s.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressSink for TerminalSink {
    fn on_report(&mut self, report: &ProgressReport) {
        let pb = self.bar();
        match report.stage {
            Stage::Started => pb.set_message(format!("{}...", report.direction.verb())),
            Stage::TotalKnown => {
                if let Some(total) = report.total_bytes {
                    pb.set_style(bar_style());
                    pb.set_length(total);
                }
            }
            Stage::Progress => pb.set_position(report.bytes_so_far),
            Stage::Succeeded => pb.finish_with_message(format!(
                "done, {} {}",
                format_bytes(report.bytes_so_far),
                report.direction.past()
            )),
            Stage::Failed => pb.abandon_with_message(format!(
                "failed after {}",
                format_bytes(report.bytes_so_far)
            )),
            Stage::Anomaly => pb.println(format!("warning: {}", report.message)),
            Stage::Ignored => {}
        }
    }
}
