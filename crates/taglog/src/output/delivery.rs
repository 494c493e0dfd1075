use super::{Delivery, Output};
use crate::error::DeliveryError;
use crate::filter::Filter;
use crate::formatter::Formatter;
use crate::message::Message;

impl Output {
    /// Runs `message` through the filter chain, formats it and writes it.
    ///
    /// Filters run in order and stop at the first rejection; the formatter is
    /// only invoked once every filter has accepted. Formatter and destination
    /// errors are returned unchanged.
    pub fn deliver(&self, message: &Message) -> Result<Delivery, DeliveryError> {
        let mut state = self.lock();
        if !state.filters.accepts(message) {
            return Ok(Delivery::Filtered);
        }
        let formatted = state.formatter.format(message)?;
        state.destination.write_entry(&formatted)?;
        Ok(Delivery::Delivered)
    }

    /// Appends a filter to the end of the chain.
    pub fn add_filter(&self, filter: Filter) {
        self.lock().filters.push(filter);
    }

    /// Replaces the formatter used for subsequent deliveries.
    pub fn set_formatter(&self, formatter: Formatter) {
        self.lock().formatter = formatter;
    }

    /// Number of filters currently in the chain.
    pub fn filter_count(&self) -> usize {
        self.lock().filters.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::destination::MemoryDestination;
    use crate::error::FormatError;
    use crate::filter::filters;
    use crate::message::{Content, Tags};

    fn message(tags: &[&str]) -> Message {
        Message::new(Tags::from_display(tags), Content::text("payload"))
    }

    fn counting_formatter(calls: &Arc<AtomicUsize>) -> Formatter {
        let calls = Arc::clone(calls);
        Formatter::custom(move |message| {
            calls.fetch_add(1, Ordering::SeqCst);
            message.tags().to_string()
        })
    }

    #[test]
    fn rejected_messages_never_reach_the_formatter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memory = MemoryDestination::new();
        let output = Output::builder(memory.clone())
            .formatter(counting_formatter(&calls))
            .filter(Filter::new(|_| false))
            .build();

        assert_eq!(output.deliver(&message(&["a"])).unwrap(), Delivery::Filtered);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(memory.is_empty());
    }

    #[test]
    fn accepted_messages_are_formatted_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memory = MemoryDestination::new();
        let output = Output::builder(memory.clone())
            .formatter(counting_formatter(&calls))
            .filters([Filter::accept_all(), filters::has_tag("a")])
            .build();

        assert_eq!(output.deliver(&message(&["a", "b"])).unwrap(), Delivery::Delivered);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memory.entries(), ["a b"]);
    }

    #[test]
    fn later_filters_are_skipped_after_a_rejection() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let probe = Arc::clone(&evaluated);
        let output = Output::builder(MemoryDestination::new())
            .filter(filters::has_tag("missing"))
            .filter(Filter::new(move |_| {
                probe.fetch_add(1, Ordering::SeqCst);
                true
            }))
            .build();

        assert_eq!(output.deliver(&message(&["a"])).unwrap(), Delivery::Filtered);
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn single_filter_behaves_like_a_one_element_list() {
        let single = Output::builder(MemoryDestination::new())
            .filter(filters::has_tag("x"))
            .build();
        let list = Output::builder(MemoryDestination::new())
            .filters(vec![filters::has_tag("x")])
            .build();

        for tags in [&["x"][..], &["y"][..], &["x", "y"][..]] {
            let msg = message(tags);
            assert_eq!(single.deliver(&msg).unwrap(), list.deliver(&msg).unwrap());
        }
    }

    #[test]
    fn filters_and_formatter_can_change_after_construction() {
        let memory = MemoryDestination::new();
        let output = Output::new(memory.clone());
        assert_eq!(output.filter_count(), 0);

        output.set_formatter(Formatter::template("{tags}").unwrap());
        output.add_filter(filters::lacks_tag("noise"));
        assert_eq!(output.filter_count(), 1);

        output.deliver(&message(&["noise"])).unwrap();
        output.deliver(&message(&["signal"])).unwrap();
        assert_eq!(memory.entries(), ["signal"]);
    }

    #[test]
    fn destination_errors_are_returned() {
        let output = Output::new(|_: &str| -> io::Result<()> { Err(io::Error::other("disk full")) });
        let error = output.deliver(&message(&["a"])).unwrap_err();
        assert!(matches!(error, DeliveryError::Destination(ref e) if e.to_string() == "disk full"));
    }

    #[test]
    fn format_errors_are_returned() {
        let output = Output::builder(MemoryDestination::new())
            .template("{kwargs[absent]}")
            .unwrap()
            .build();
        let error = output.deliver(&message(&["a"])).unwrap_err();
        assert!(matches!(error, DeliveryError::Format(FormatError::MissingKey { .. })));
    }

    #[test]
    fn debug_reports_formatter_and_filter_count() {
        let output = Output::builder(MemoryDestination::new())
            .template("{tags}")
            .unwrap()
            .filter(Filter::accept_all())
            .build();
        let rendered = format!("{output:?}");
        assert!(rendered.contains("Template(\"{tags}\")"), "{rendered}");
        assert!(rendered.contains("filters: 1"), "{rendered}");
    }
}
