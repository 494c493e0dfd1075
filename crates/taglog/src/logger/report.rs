use crate::error::{DeliveryError, DeliveryFailure, DispatchError};
use crate::output::Delivery;

/// Per-dispatch summary of what every output did with the message.
#[derive(Debug, Default)]
#[must_use = "inspect the report or call into_result() to surface delivery failures"]
pub struct DispatchReport {
    delivered: usize,
    filtered: usize,
    failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub(super) fn record(&mut self, index: usize, outcome: Result<Delivery, DeliveryError>) {
        match outcome {
            Ok(Delivery::Delivered) => self.delivered += 1,
            Ok(Delivery::Filtered) => self.filtered += 1,
            Err(error) => self.failures.push(DeliveryFailure { index, error }),
        }
    }

    /// Outputs whose destination received the message.
    pub const fn delivered(&self) -> usize {
        self.delivered
    }

    /// Outputs whose filters rejected the message.
    pub const fn filtered(&self) -> usize {
        self.filtered
    }

    /// Outputs that failed, in registration order.
    pub fn failures(&self) -> &[DeliveryFailure] {
        &self.failures
    }

    /// Reports whether no output failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the delivered count, or every failure when at least one
    /// output failed.
    pub fn into_result(self) -> Result<usize, DispatchError> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(DispatchError::Delivery { failures: self.failures })
        }
    }
}
