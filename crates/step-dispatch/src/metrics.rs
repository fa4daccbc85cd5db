use lazy_static::lazy_static;
use prometheus::{opts, IntCounterVec, Registry};
use tracing::error;

lazy_static! {
    static ref DISPATCH_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "pagefactory_dispatch_total",
            "Action dispatches grouped by outcome"
        ),
        &["outcome"]
    )
    .unwrap();
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Outcome {
    Invoked,
    NotFound,
    Ambiguous,
    Failed,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Outcome::Invoked => "invoked",
            Outcome::NotFound => "not_found",
            Outcome::Ambiguous => "ambiguous",
            Outcome::Failed => "failed",
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    if let Err(err) = registry.register(Box::new(DISPATCH_TOTAL.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register dispatch metric");
        }
    }
}

pub(crate) fn record(outcome: Outcome) {
    DISPATCH_TOTAL.with_label_values(&[outcome.label()]).inc();
}

/// Current count for one outcome label.
pub fn dispatch_count(outcome: &str) -> u64 {
    DISPATCH_TOTAL.with_label_values(&[outcome]).get()
}
