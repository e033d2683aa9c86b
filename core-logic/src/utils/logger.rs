use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target used by the activity log; shown on the console at INFO.
pub const ACTIVITY_TARGET: &str = "activity";

/// Installs the console + rolling file subscriber.
///
/// The returned guard flushes the file writer and MUST be kept alive by the caller.
pub fn setup_logger(file_prefix: &str) -> WorkerGuard {
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer: INFO for activity, WARN for others
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(ACTIVITY_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console layer: INFO for activity, ERROR for others
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(ACTIVITY_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn paint_keywords(msg: String) -> String {
    let green = Style::new().fg(Color::LightGreen).bold();
    let red = Style::new().fg(Color::LightRed).bold();
    let yellow = Style::new().fg(Color::Yellow).bold();

    let rules: [(&str, Style); 5] = [
        ("succeeded", green),
        ("finished", green),
        ("failed", red),
        ("Error", red),
        ("cancelled", yellow),
    ];

    rules.iter().fold(msg, |acc, (word, style)| {
        if acc.contains(word) {
            acc.replace(word, &style.paint(*word).to_string())
        } else {
            acc
        }
    })
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);

        let msg = if event.metadata().target() == ACTIVITY_TARGET {
            paint_keywords(msg_visitor.message)
        } else {
            let level = Style::new()
                .fg(Color::LightRed)
                .paint(event.metadata().level().to_string());
            format!("{} {}", level, msg_visitor.message)
        };

        writeln!(writer, "{}", msg)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;

        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        writeln!(writer, "{}", msg_visitor.message)
    }
}
