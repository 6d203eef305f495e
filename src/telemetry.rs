use prometheus::register_int_counter_vec;
use prometheus::{Encoder, IntCounterVec, TextEncoder};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

pub use prometheus::TEXT_FORMAT as METRICS_CONTENT_TYPE;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounterVec = register_int_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out by the quiz endpoint",
        &["category"]
    )
    .unwrap();
}

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
>;

/// Installs the global subscriber. `LOG_LEVEL` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let log_level = std::env::var("LOG_LEVEL").ok();
    let filter_layer = level_filter(log_level.as_deref(), default_filter)?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// An unparsable `log_level` is ignored in favour of `default_filter`.
fn level_filter(log_level: Option<&str>, default_filter: &str) -> Result<EnvFilter, ParseError> {
    log_level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .map_or_else(|| EnvFilter::try_new(default_filter), Ok)
}

/// Request spans at INFO with latency in milliseconds, so they show under the default filter.
pub fn http_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

/// Text exposition of everything in the default registry.
pub fn render_metrics() -> prometheus::Result<Vec<u8>> {
    let mut buf = vec![];
    TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_overrides_default() {
        let filter = level_filter(Some("debug"), "info").unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn default_applies_without_log_level() {
        let filter = level_filter(None, "warn").unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn broken_default_is_an_error() {
        assert!(level_filter(None, "trivia=loud").is_err());
    }

    #[test]
    fn served_questions_show_up_in_exposition() {
        QUIZ_QUESTIONS_SERVED.with_label_values(&["42"]).inc();

        let text = String::from_utf8(render_metrics().unwrap()).unwrap();
        assert!(text.contains(r#"quiz_questions_served_total{category="42"}"#));
        assert!(METRICS_CONTENT_TYPE.starts_with("text/plain"));
    }
}
