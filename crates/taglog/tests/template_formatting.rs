//! Integration tests for formatting messages on their way to a destination.
//!
//! Messages are built through a logger with a fixed timestamp so the default
//! template produces stable output.

use std::io;
use std::sync::{Arc, Mutex};

use taglog::{
    Content, Destination, Formatter, LineMode, Logger, MemoryDestination, Message, Output,
    OutputConfig, Tags, Template, TemplateError, WriterDestination, content,
};
use time::macros::datetime;

fn fixed_clock_logger() -> Logger {
    Logger::with_factory(|tags: Tags, content: Content| {
        Message::new(tags, content).with_date(datetime!(2024-03-05 14:07:09.250 UTC))
    })
}

/// Writer shared between the test and an output.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Default Template
// ============================================================================

/// Verifies the default layout `date : tags : args kwargs`.
#[test]
fn default_template_layout() {
    let memory = MemoryDestination::new();
    let logger = fixed_clock_logger();
    logger.add_output(Output::new(memory.clone()));

    logger.tags(["tag1", "tag2"]).emit(content!("hello world!")).into_result().unwrap();

    let entries = memory.entries();
    assert_eq!(entries, ["2024-03-05 14:07:09.250000 : tag1 tag2 : [\"hello world!\"] {}\n"]);
    assert!(entries[0].contains("tag1 tag2"));
}

/// Verifies the default template ends each entry with exactly one newline.
#[test]
fn default_template_through_writer_keeps_single_newline() {
    let buffer = SharedBuffer::default();
    let logger = fixed_clock_logger();
    logger.add_output(Output::new(WriterDestination::new(buffer.clone())));

    logger.log(["a"]).into_result().unwrap();
    logger.log(["b"]).into_result().unwrap();

    let text = buffer.text();
    assert_eq!(text.lines().count(), 2);
    assert!(!text.contains("\n\n"));
}

// ============================================================================
// Custom Templates
// ============================================================================

/// Verifies keyword lookup inside a template string.
#[test]
fn keyword_lookup_template() {
    let memory = MemoryDestination::new();
    let logger = Logger::new();
    logger.add_output(
        Output::builder(memory.clone())
            .template("just testing, key = {kwargs[key]}")
            .unwrap()
            .build(),
    );

    logger.tags(["t"]).emit(content!(key = 1337)).into_result().unwrap();
    assert_eq!(memory.entries(), ["just testing, key = 1337"]);
}

/// Verifies templates with several fields, conversions and date specs.
#[test]
fn mixed_template_fields() {
    let buffer = SharedBuffer::default();
    let logger = fixed_clock_logger();
    logger.add_output(
        Output::builder(WriterDestination::new(buffer.clone()))
            .template("{date:[hour]:[minute]} {tags:<8}|{args[0]!r} user={kwargs[user]}")
            .unwrap()
            .build(),
    );

    logger.curry(["auth"]).tags(["ok"]).emit(content!("login", user = "ada")).into_result().unwrap();
    assert_eq!(buffer.text(), "14:07 auth ok |\"login\" user=ada\n");
}

/// Verifies writer destinations without newline mode keep entries adjacent.
#[test]
fn writer_without_newline_concatenates() {
    let buffer = SharedBuffer::default();
    let logger = Logger::new();
    logger.add_output(
        Output::builder(WriterDestination::with_line_mode(buffer.clone(), LineMode::WithoutNewline))
            .template("<{tags}>")
            .unwrap()
            .build(),
    );

    logger.log(["a"]).into_result().unwrap();
    logger.log(["b"]).into_result().unwrap();
    assert_eq!(buffer.text(), "<a><b>");
}

/// Verifies template mistakes are reported when the output is configured.
#[test]
fn template_errors_surface_at_construction() {
    let error = Output::builder(MemoryDestination::new()).template("{tags").unwrap_err();
    assert_eq!(error, TemplateError::UnclosedField(0));

    assert!(matches!(Template::parse("{level}"), Err(TemplateError::UnknownField(name)) if name == "level"));
    assert!(matches!(Template::parse("{}"), Err(TemplateError::PositionalField(_))));
}

// ============================================================================
// Custom Formatters and Destinations
// ============================================================================

/// Verifies a closure formatter is used verbatim.
#[test]
fn custom_formatter_output_is_used_verbatim() {
    let memory = MemoryDestination::new();
    let logger = Logger::new();
    logger.add_output(
        Output::builder(memory.clone())
            .formatter(Formatter::custom(|message| {
                format!("{} tag(s), {} arg(s)", message.tags().len(), message.args().len())
            }))
            .build(),
    );

    logger.tags(["a", "b"]).emit(content!(1, 2, 3)).into_result().unwrap();
    assert_eq!(memory.entries(), ["2 tag(s), 3 arg(s)"]);
}

/// Verifies that closures work as destinations.
#[test]
fn closure_destination_receives_text() {
    fn assert_destination<D: Destination>(_: &D) {}

    let received = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&received);
    let destination = move |text: &str| -> io::Result<()> {
        sink.lock().unwrap().push_str(text);
        Ok(())
    };
    assert_destination(&destination);

    let logger = Logger::new();
    logger.add_output(Output::builder(destination).format_with(|message| message.to_string()).build());
    logger.tags(["x"]).emit(content!("y", k = 1)).into_result().unwrap();

    assert_eq!(*received.lock().unwrap(), "[x] [\"y\"] {\"k\": 1}");
}

/// Verifies an output assembled from configuration.
#[test]
fn configured_output_formats_and_filters() {
    let buffer = SharedBuffer::default();
    let mut config = OutputConfig {
        template: Some("{tags}: {args[0]}".to_owned()),
        ..OutputConfig::default()
    };
    config.apply_tag_rules("+audit,-debug").unwrap();

    let logger = Logger::new();
    logger.add_output(config.build_writer(buffer.clone()).unwrap());

    logger.tags(["audit"]).emit(content!("granted")).into_result().unwrap();
    logger.tags(["audit", "debug"]).emit(content!("trace")).into_result().unwrap();
    logger.tags(["other"]).emit(content!("ignored")).into_result().unwrap();

    assert_eq!(buffer.text(), "audit: granted\n");
}
