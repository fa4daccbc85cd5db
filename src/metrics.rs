use anyhow::{Context, Result};
use once_cell::sync::{Lazy, OnceCell};
use pagefactory_registry::metrics as registry_metrics;
use prometheus::{Encoder, Registry, TextEncoder};
use step_dispatch::metrics as dispatch_metrics;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = global_registry();
        registry_metrics::register_metrics(registry);
        dispatch_metrics::register_metrics(registry);
    });
}

/// Prometheus text exposition of every registered metric.
pub fn render() -> Result<String> {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&global_registry().gather(), &mut buffer)
        .context("failed to encode prometheus metrics")?;
    String::from_utf8(buffer).context("metrics output is not utf-8")
}
