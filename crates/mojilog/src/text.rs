//! A renderer writing one colored, human-readable line per record.

use std::{
    borrow::Cow,
    fmt::{self, Write as _},
};

use colored::{ColoredString, Colorize};
use time::{format_description::BorrowedFormatItem, macros::format_description};
use tracing::Level;

use crate::{clock, keys, Attr, Decoration, LoggerError, Record, Renderer, RendererOptions, Sink};

const TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:1]");

/// Renders records as
/// `<time> <LEVEL> [<file>:<function()>:<line>] <emoji><spacing><message> [<key=value> ...]`.
///
/// The call-site is only present when enabled in the [`RendererOptions`] and resolvable. Without
/// it, its slot stays empty and two spaces separate the level from the emoji.
/// Attributes attached through [`Renderer::with_attrs`] come first, followed by the record's
/// own attributes in insertion order.
#[derive(Clone, Debug)]
pub struct TextRenderer {
    sink: Sink,
    options: RendererOptions,
    decorate: bool,
    // Already filtered and qualified with the group path in effect when they were attached.
    context: Vec<(Cow<'static, str>, String)>,
    group_prefix: String,
}

impl TextRenderer {
    /// Creates a renderer that decorates each message with an emoji.
    pub fn new(sink: Sink, options: RendererOptions) -> Self {
        Self {
            sink,
            options,
            decorate: true,
            context: Vec::new(),
            group_prefix: String::new(),
        }
    }

    /// Disables the built-in decoration, for use behind [`Decorated`](crate::Decorated).
    #[must_use]
    pub fn without_decoration(mut self) -> Self {
        self.decorate = false;
        self
    }

    fn qualify(&self, key: &str) -> Cow<'static, str> {
        if self.group_prefix.is_empty() {
            Cow::Owned(key.to_owned())
        } else {
            Cow::Owned(format!("{}{key}", self.group_prefix))
        }
    }

    fn paint<'a>(&self, text: &'a str, style: fn(&'a str) -> ColoredString) -> Painted<'a> {
        if self.options.color {
            Painted::Colored(style(text))
        } else {
            Painted::Plain(text)
        }
    }

    fn level_badge(&self, level: Level) -> Painted<'static> {
        match level {
            Level::ERROR => self.paint("ERROR", |s| s.red().bold()),
            Level::WARN => self.paint(" WARN", Colorize::yellow),
            Level::INFO => self.paint(" INFO", Colorize::green),
            Level::DEBUG => self.paint("DEBUG", Colorize::cyan),
            Level::TRACE => Painted::Plain("TRACE"),
        }
    }

    fn format_attrs(&self, record: &Record) -> Result<String, fmt::Error> {
        let mut out = String::new();
        let mut push = |key: &str, value: &dyn fmt::Display| -> fmt::Result {
            if !out.is_empty() {
                out.push(' ');
            }
            write!(out, "{key}={value}")
        };

        for (key, value) in &self.context {
            push(key, value)?;
        }

        let mut result = Ok(());
        record.attrs(|attr| {
            if attr.key().is_empty() || keys::should_skip(attr.key()) {
                return true;
            }
            result = if self.group_prefix.is_empty() {
                push(attr.key(), attr.value())
            } else {
                push(&self.qualify(attr.key()), attr.value())
            };
            result.is_ok()
        });
        result?;

        Ok(out)
    }

    fn format_line(&self, record: &Record) -> Result<String, fmt::Error> {
        let mut line = String::with_capacity(128);

        let local = clock::local(record.time());
        let time = local.format(TIME_FORMAT).map_err(|_| fmt::Error)?;
        write!(
            line,
            "{} {} ",
            self.paint(&time, Colorize::bright_black),
            self.level_badge(record.level())
        )?;

        if self.options.add_source {
            if let Some(source) = record.call_site().and_then(|call_site| call_site.resolve()) {
                let file = self.paint(source.file, Colorize::blue);
                match source.function {
                    Some(function) => {
                        let function = format!("{function}()");
                        write!(
                            line,
                            "{file}:{}:{}",
                            self.paint(&function, Colorize::blue),
                            source.line
                        )?;
                    }
                    None => write!(line, "{file}:{}", source.line)?,
                }
            }
        }
        // The source slot is followed by a space even when it is empty.
        line.push(' ');

        if self.decorate {
            write!(
                line,
                "{}",
                Decoration::resolve(record.level(), record.message())
            )?;
        }
        line.push_str(record.message());

        let attrs = self.format_attrs(record)?;
        if !attrs.is_empty() {
            write!(line, " {}", self.paint(&attrs, Colorize::magenta))?;
        }

        line.push('\n');
        Ok(line)
    }
}

impl Renderer for TextRenderer {
    fn enabled(&self, level: Level) -> bool {
        self.options.enabled(level)
    }

    fn render(&self, record: Record) -> Result<(), LoggerError> {
        self.sink.write_record(|buffer| {
            let line = self.format_line(&record)?;
            buffer.extend_from_slice(line.as_bytes());
            Ok(())
        })
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut derived = self.clone();
        derived.context.extend(
            attrs
                .iter()
                .filter(|attr| !attr.key().is_empty() && !keys::should_skip(attr.key()))
                .map(|attr| (self.qualify(attr.key()), attr.value().to_string())),
        );
        derived
    }

    fn with_group(&self, name: &str) -> Self {
        let mut derived = self.clone();
        if !name.is_empty() {
            derived.group_prefix.push_str(name);
            derived.group_prefix.push('.');
        }
        derived
    }
}

/// A text fragment, colored or not depending on the renderer options.
enum Painted<'a> {
    Colored(ColoredString),
    Plain(&'a str),
}

impl fmt::Display for Painted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Colored(s) => write!(f, "{s}"),
            Self::Plain(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{sink::testing::Capture, CallSite, Value};

    fn decorated(level: Level, message: &str) -> String {
        format!("{}{message}", Decoration::resolve(level, message))
    }

    fn renderer(capture: &Capture, level: Level) -> TextRenderer {
        TextRenderer::new(
            capture.sink(),
            RendererOptions {
                level,
                add_source: false,
                color: false,
            },
        )
    }

    fn record(level: Level, message: &str, attrs: Vec<Attr>) -> Record {
        let mut record = Record::now(level, message);
        record.add_attrs(attrs);
        record
    }

    #[test]
    fn renders_decorated_line_with_attrs() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO);

        let attrs = vec![Attr::new("port", 8080)];
        text.render(record(Level::INFO, "Server started", attrs)).unwrap();

        let output = capture.contents();
        // No call-site: the empty source slot leaves two spaces after the level.
        assert!(
            output.ends_with(" INFO  🚀 Server started port=8080\n"),
            "{output}"
        );
        assert_eq!(output.matches('\n').count(), 1);
    }

    #[test]
    fn unmatched_message_gets_level_emoji() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO);

        text.render(record(Level::INFO, "hello", Vec::new())).unwrap();

        let output = capture.contents();
        assert!(output.ends_with(&format!(" INFO  {}\n", decorated(Level::INFO, "hello"))));
        assert!(output.contains("ℹ️"));
    }

    #[test]
    fn time_has_tenths_of_a_second() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO);

        text.render(record(Level::WARN, "x", Vec::new())).unwrap();

        let output = capture.contents();
        let (time, rest) = output.split_once(' ').unwrap();
        assert_eq!(time.len(), "00:00:00.0".len(), "{output}");
        assert_eq!(time.as_bytes().get(8), Some(&b'.'));
        assert!(rest.starts_with(" WARN  "), "{output}");
    }

    #[test]
    fn denylisted_keys_are_never_rendered() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO).with_attrs(vec![
            Attr::string("service", "api"),
            Attr::string("request_id", "r-1"),
        ]);

        text.render(record(
            Level::INFO,
            "Server started",
            vec![
                Attr::new("pid", 42),
                Attr::new("port", 8080),
                Attr::string("metric_name", "latency"),
            ],
        ))
        .unwrap();

        let output = capture.contents();
        assert!(output.contains("request_id=r-1 port=8080"), "{output}");
        for key in ["service", "pid", "metric_name", "api", "latency"] {
            assert!(!output.contains(key), "{key} leaked into {output}");
        }
    }

    #[test]
    fn derivation_does_not_touch_the_parent() {
        let capture = Capture::default();
        let parent = renderer(&capture, Level::INFO);
        let child = parent.with_attrs(vec![Attr::string("user", "alice")]);

        parent.render(record(Level::INFO, "from parent", Vec::new())).unwrap();
        child.render(record(Level::INFO, "from child", Vec::new())).unwrap();

        let output = capture.contents();
        let mut lines = output.lines();
        assert!(!lines.next().unwrap().contains("user="));
        assert!(lines.next().unwrap().ends_with("from child user=alice"));
    }

    #[test]
    fn groups_qualify_keys() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO)
            .with_attrs(vec![Attr::new("before", 1)])
            .with_group("http")
            .with_attrs(vec![Attr::string("method", "GET")])
            .with_group("")
            .with_group("req")
            .with_attrs(vec![Attr::string("pid", "hidden")]);

        text.render(record(Level::INFO, "hello", vec![Attr::new("id", 7)])).unwrap();

        let output = capture.contents();
        assert!(
            output.ends_with("hello before=1 http.method=GET http.req.id=7\n"),
            "{output}"
        );
    }

    #[test]
    fn call_site_fills_the_source_slot() {
        let capture = Capture::default();
        let text = TextRenderer::new(
            capture.sink(),
            RendererOptions {
                level: Level::INFO,
                add_source: true,
                color: false,
            },
        );

        let without_function = CallSite::new("src/bin/server.rs", 12, None);
        let with_function = CallSite::new("src/main.rs", 3, Some("app::main"));
        let unresolvable = CallSite::new("", 0, None);
        for call_site in [without_function, with_function, unresolvable] {
            let record = Record::now(Level::INFO, "hello").with_call_site(call_site);
            text.render(record).unwrap();
        }

        let output = capture.contents();
        let hello = decorated(Level::INFO, "hello");
        let lines: Vec<_> = output.lines().collect();
        let [without_function, with_function, unresolvable] = lines.as_slice() else {
            panic!("expected three lines: {output}");
        };
        assert!(without_function.ends_with(&format!(" INFO server.rs:12 {hello}")));
        assert!(with_function.ends_with(&format!(" INFO main.rs:main():3 {hello}")));
        assert!(unresolvable.ends_with(&format!(" INFO  {hello}")));
    }

    #[test]
    fn without_decoration_leaves_message_alone() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO).without_decoration();

        text.render(record(Level::INFO, "hello", Vec::new())).unwrap();

        assert!(capture.contents().ends_with(" INFO  hello\n"));
    }

    #[test]
    fn values_are_displayed() {
        let capture = Capture::default();
        let text = renderer(&capture, Level::INFO);

        text.render(record(
            Level::INFO,
            "values",
            vec![
                Attr::bool("ok", true),
                Attr::new("ratio", Value::F64(0.5)),
                Attr::duration("took", std::time::Duration::from_millis(250)),
            ],
        ))
        .unwrap();

        assert!(capture.contents().ends_with("ok=true ratio=0.5 took=250ms\n"));
    }

    #[test]
    fn concurrent_records_produce_whole_lines() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 50;

        let capture = Capture::default();
        let text = Arc::new(renderer(&capture, Level::INFO));

        let handles: Vec<_> = (0..THREADS)
            .map(|thread| {
                let text = Arc::clone(&text);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        text.render(record(
                            Level::INFO,
                            "concurrent",
                            vec![Attr::new("thread", thread), Attr::new("i", i)],
                        ))
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = format!(" INFO  {} thread=", decorated(Level::INFO, "concurrent"));
        let output = capture.contents();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), THREADS * PER_THREAD);
        for line in lines {
            assert!(line.contains(&expected), "{line}");
        }
    }
}
