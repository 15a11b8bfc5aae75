//! Provides a [`tracing_subscriber::Layer`] ([`RendererLayer`]) rendering `tracing` events
//! through any [`Renderer`].

use std::{error::Error, fmt};

use time::OffsetDateTime;
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Record as SpanRecord},
    Event, Id, Metadata, Subscriber,
};
use tracing_subscriber::{layer::Context, registry::LookupSpan, EnvFilter, Layer};

use crate::{Attr, CallSite, LoggerConfig, LoggerError, Record, Renderer, Value};

const MESSAGE: &str = "message";

/// A [`tracing_subscriber::Layer`] that turns each event into a [`Record`] and renders it.
///
/// Fields of the spans an event occurs in are attached to the record before the event's own
/// fields, outermost span first. Render errors cannot be reported through `tracing` and are
/// dropped.
#[derive(Clone, Debug)]
pub struct RendererLayer<R> {
    renderer: R,
}

impl<R: Renderer> RendererLayer<R> {
    /// Creates a layer rendering through `renderer`.
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

/// Creates the [`EnvFilter`] for a [`RendererLayer`]: `config.level` as the default directive,
/// refined by `config.filtering_directive`.
pub fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    // Using an empty string causes it to use the default directive
    let directive = config.filtering_directive.as_deref().unwrap_or_default();
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .parse(directive)?;
    Ok(filter)
}

/// Like [`env_filter`], skipping invalid directives instead of failing.
pub(crate) fn env_filter_lossy(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.level.into())
        .parse_lossy(config.filtering_directive.as_deref().unwrap_or_default())
}

/// Fields recorded for a span, including the ones inherited from its parent.
#[derive(Clone, Debug, Default)]
struct SpanFields(Vec<Attr>);

/// Collects the fields of a span or an event.
#[derive(Debug, Default)]
struct FieldVisitor {
    attrs: Vec<Attr>,
    message: Option<String>,
    /// Whether the `message` field is collected separately, as for events.
    takes_message: bool,
}

impl FieldVisitor {
    fn for_event() -> Self {
        Self {
            takes_message: true,
            ..Self::default()
        }
    }

    fn for_span(inherited: Vec<Attr>) -> Self {
        Self {
            attrs: inherited,
            ..Self::default()
        }
    }

    fn record_value(&mut self, field: &Field, value: Value) {
        match field.name() {
            MESSAGE if self.takes_message => {
                if self.message.is_none() {
                    self.message = Some(value.to_string());
                }
            }
            // Fields emitted by `tracing-log` duplicate the metadata
            name if name.starts_with("log.") => (),
            name => {
                let name = name.strip_prefix("r#").unwrap_or(name);
                // Values recorded later for a span replace the earlier ones.
                self.attrs.retain(|attr| attr.key() != name);
                self.attrs.push(Attr::new(name, value));
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::F64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::U64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE && self.takes_message {
            // `record_str()` is preferred for `message`
            self.message = Some(value.to_owned());
        } else {
            self.record_value(field, Value::String(value.to_owned()));
        }
    }

    fn record_bytes(&mut self, field: &Field, value: &[u8]) {
        self.record_value(field, Value::Bytes(value.to_vec()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.record_value(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{value:?}")));
    }
}

impl<S, R> Layer<S> for RendererLayer<R>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    R: Renderer + 'static,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        metadata.is_span() || self.renderer.enabled(*metadata.level())
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        // Inherit fields from the parent span if it exists.
        let inherited = span
            .parent()
            .and_then(|parent| parent.extensions().get::<SpanFields>().cloned())
            .unwrap_or_default();

        let mut visitor = FieldVisitor::for_span(inherited.0);
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.attrs));
    }

    fn on_record(&self, id: &Id, values: &SpanRecord<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        let Some(fields) = extensions.get_mut::<SpanFields>() else {
            return;
        };

        let mut visitor = FieldVisitor::for_span(std::mem::take(&mut fields.0));
        values.record(&mut visitor);
        fields.0 = visitor.attrs;
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.renderer.enabled(*metadata.level()) {
            return;
        }

        let mut visitor = FieldVisitor::for_event();
        event.record(&mut visitor);

        // Obtain the value of the `message` field if set, or the `target` from metadata otherwise.
        let message = visitor
            .message
            .take()
            .unwrap_or_else(|| metadata.target().to_owned());

        let mut record = Record::new(
            OffsetDateTime::now_utc(),
            *metadata.level(),
            message,
            CallSite::from_metadata(metadata),
        );

        if let Some(span) = ctx.event_span(event) {
            if let Some(fields) = span.extensions().get::<SpanFields>() {
                record.add_attrs(fields.0.iter().cloned());
            }
        }
        record.add_attrs(visitor.attrs);

        let _ = self.renderer.render(record);
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;
    use tracing_subscriber::{layer::SubscriberExt, registry};

    use super::*;
    use crate::{logger::testing::Counting, sink::testing::Capture, RendererOptions, TextRenderer};

    fn registry_with<R: Renderer + 'static>(renderer: R) -> impl Subscriber + Send + Sync {
        registry().with(RendererLayer::new(renderer))
    }

    fn keys(record: &Record) -> Vec<String> {
        let mut keys = Vec::new();
        record.attrs(|attr| {
            keys.push(attr.key().to_owned());
            true
        });
        keys
    }

    #[test]
    fn events_become_records() {
        let renderer = Counting::new(Level::INFO);
        let subscriber = registry_with(renderer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(port = 8080, r#type = "http", "Server started");
            tracing::debug!("filtered out");
        });

        let records = renderer.records();
        assert_eq!(records.len(), 1);

        let record = records.first().unwrap();
        assert_eq!(record.level(), Level::INFO);
        assert_eq!(record.message(), "Server started");
        assert_eq!(keys(record), ["port", "type"]);

        let source = record.call_site().and_then(|c| c.resolve()).unwrap();
        assert_eq!(source.file, "layer.rs");
        assert_eq!(source.function, None);
    }

    #[test]
    fn span_fields_come_before_event_fields() {
        let renderer = Counting::new(Level::INFO);
        let subscriber = registry_with(renderer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let outer =
                tracing::info_span!("request", request_id = "r-1", user = tracing::field::Empty);
            let _outer = outer.enter();
            outer.record("user", "alice");

            let inner = tracing::info_span!("db", table = "users");
            let _inner = inner.enter();
            tracing::warn!(rows = 3_u64, "slow query");
        });

        let records = renderer.records();
        let record = records.first().unwrap();
        assert_eq!(keys(record), ["request_id", "user", "table", "rows"]);
    }

    #[test]
    fn renders_through_a_text_renderer() {
        let capture = Capture::default();
        let renderer = TextRenderer::new(
            capture.sink(),
            RendererOptions {
                level: Level::INFO,
                add_source: false,
                color: false,
            },
        );
        let subscriber = registry_with(renderer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                pid = 1,
                service = "api",
                attempt = 2,
                "Reconnecting to upstream"
            );
        });

        let output = capture.contents();
        assert!(
            output.contains("Reconnecting to upstream attempt=2\n"),
            "{output}"
        );
        assert!(output.contains("🔌"));
        assert!(!output.contains("pid"));
        assert!(!output.contains("service"));
    }

    #[test]
    fn message_falls_back_to_target() {
        let renderer = Counting::new(Level::INFO);
        let subscriber = registry_with(renderer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "billing", amount = 5);
        });

        let records = renderer.records();
        assert_eq!(records.first().map(Record::message), Some("billing"));
    }

    #[test]
    fn filter_uses_level_and_directive() {
        let config = LoggerConfig {
            level: Level::WARN,
            filtering_directive: Some("my_crate=debug".to_owned()),
            ..LoggerConfig::default()
        };
        let filter = env_filter(&config).unwrap();
        assert!(filter.to_string().contains("my_crate=debug"));

        let invalid = LoggerConfig {
            filtering_directive: Some("my_crate=verbose".to_owned()),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            env_filter(&invalid),
            Err(LoggerError::InvalidFilteringDirective(_))
        ));
    }
}
