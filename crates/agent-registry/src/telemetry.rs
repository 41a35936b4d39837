//! Metric hooks. Real counters with the `metrics` feature, no-ops without.

#[cfg(feature = "metrics")]
mod imp {
    use crate::domain::authorization::Operation;
    use crate::domain::value_objects::U256;
    use crate::errors::ErrorKind;
    use agent_telemetry::metrics::{self, HistogramTimer};

    pub(crate) fn committed(operation: Operation) {
        metrics::record_operation(operation.name(), true);
    }

    pub(crate) fn rejected(operation: Operation, kind: ErrorKind) {
        metrics::record_operation(operation.name(), false);
        metrics::record_rejection(kind.as_str());
    }

    pub(crate) fn agent_created() {
        metrics::AGENTS_CREATED.inc();
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn value_moved(deposit: bool, amount: U256) {
        let approx = if amount.bits() <= 128 {
            amount.low_u128() as f64
        } else {
            f64::MAX
        };
        metrics::record_value_moved(deposit, approx);
    }

    pub(crate) fn payout_failed() {
        metrics::PAYOUT_FAILURES.inc();
    }

    pub(crate) fn timer() -> HistogramTimer {
        HistogramTimer::new(&metrics::OPERATION_DURATION)
    }
}

#[cfg(not(feature = "metrics"))]
mod imp {
    use crate::domain::authorization::Operation;
    use crate::domain::value_objects::U256;
    use crate::errors::ErrorKind;

    pub(crate) fn committed(_operation: Operation) {}

    pub(crate) fn rejected(_operation: Operation, _kind: ErrorKind) {}

    pub(crate) fn agent_created() {}

    pub(crate) fn value_moved(_deposit: bool, _amount: U256) {}

    pub(crate) fn payout_failed() {}

    pub(crate) fn timer() {}
}

pub(crate) use imp::*;
