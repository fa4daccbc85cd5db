use lazy_static::lazy_static;
use prometheus::{core::Collector, opts, IntCounterVec, IntGauge, Registry};
use tracing::error;

use crate::errors::EntityKind;

lazy_static! {
    static ref REGISTRY_PAGES_TOTAL: IntGauge =
        IntGauge::new("pagefactory_registry_pages_total", "Registered pages").unwrap();
    static ref REGISTRY_ELEMENTS_TOTAL: IntGauge =
        IntGauge::new("pagefactory_registry_elements_total", "Registered elements").unwrap();
    static ref REGISTRY_ACTIONS_TOTAL: IntGauge = IntGauge::new(
        "pagefactory_registry_actions_total",
        "Registered action overloads"
    )
    .unwrap();
    static ref REGISTRY_LOOKUP_MISSES: IntCounterVec = IntCounterVec::new(
        opts!(
            "pagefactory_registry_lookup_misses_total",
            "Title lookups that found nothing, grouped by entity kind"
        ),
        &["kind"]
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register registry metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, REGISTRY_PAGES_TOTAL.clone());
    register(registry, REGISTRY_ELEMENTS_TOTAL.clone());
    register(registry, REGISTRY_ACTIONS_TOTAL.clone());
    register(registry, REGISTRY_LOOKUP_MISSES.clone());
}

pub(crate) fn set_index_size(pages: usize, elements: usize, actions: usize) {
    REGISTRY_PAGES_TOTAL.set(pages as i64);
    REGISTRY_ELEMENTS_TOTAL.set(elements as i64);
    REGISTRY_ACTIONS_TOTAL.set(actions as i64);
}

pub(crate) fn record_lookup_miss(kind: EntityKind) {
    REGISTRY_LOOKUP_MISSES
        .with_label_values(&[&kind.to_string()])
        .inc();
}
