use prometheus::{register_counter_vec, register_int_counter};
use prometheus::{CounterVec, Encoder, IntCounter, TextEncoder};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUESTION_MUTATIONS: CounterVec = register_counter_vec!(
        "trivia_question_mutations_total",
        "Question creations and deletions by outcome",
        &["operation", "outcome"]
    )
    .unwrap();
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounter = register_int_counter!(
        "trivia_quiz_questions_served_total",
        "Number of questions handed out by the quiz endpoint"
    )
    .unwrap();
}

pub fn record_mutation(operation: &str, succeeded: bool) {
    let outcome = if succeeded { "ok" } else { "failed" };
    QUESTION_MUTATIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Text exposition of everything in the default registry, with its content type.
pub fn render_metrics() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    encoder.encode(&prometheus::gather(), &mut buf)?;
    Ok((encoder.format_type().to_owned(), buf))
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
