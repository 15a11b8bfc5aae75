//! A renderer writing one JSON object per record.

use colored::Colorize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{
    ser::{CompactFormatter, Formatter, PrettyFormatter},
    Map, Number, Value as JsonValue,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};
use tracing::Level;

use crate::{
    clock, keys, Attr, Decoration, LoggerError, Record, Renderer, RendererOptions, Sink, Value,
};

const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
);

mod fields {
    pub(super) const TIME: &str = "time";
    pub(super) const LEVEL: &str = "level";
    pub(super) const EMOJI: &str = "emoji";
    pub(super) const MESSAGE: &str = "msg";
    pub(super) const SOURCE: &str = "source";
    pub(super) const ATTRS: &str = "attrs";
}

/// An attribute attached through [`Renderer::with_attrs`], converted once at attachment time.
#[derive(Clone, Debug)]
struct ContextAttr {
    groups: Vec<String>,
    key: String,
    value: JsonValue,
}

/// Renders records as JSON objects with the fields `time`, `level`, `emoji`, `msg`, `source` and
/// `attrs`, in that order.
///
/// `emoji` is only present when the emoji field is enabled, `source` only when call-sites are
/// enabled and resolvable, and `attrs` only when there is at least one attribute to show.
/// Attributes attached under a group are nested in an object named after the group.
///
/// The serialization style is determined by the [`serde_json::ser::Formatter`]: see
/// [`JsonRenderer::compact`] and [`JsonRenderer::pretty`].
#[derive(Clone, Debug)]
pub struct JsonRenderer<F> {
    sink: Sink,
    formatter: F,
    options: RendererOptions,
    emoji_field: bool,
    context: Vec<ContextAttr>,
    groups: Vec<String>,
}

impl JsonRenderer<CompactFormatter> {
    /// Creates a renderer writing each record on a single line.
    pub fn compact(sink: Sink, options: RendererOptions) -> Self {
        Self::new(sink, options, CompactFormatter)
    }
}

impl JsonRenderer<PrettyFormatter<'static>> {
    /// Creates a renderer writing each record as a block indented with two spaces.
    pub fn pretty(sink: Sink, options: RendererOptions) -> Self {
        Self::new(sink, options, PrettyFormatter::new())
    }
}

impl<F> JsonRenderer<F>
where
    F: Formatter + Clone + Send + Sync,
{
    /// Creates a renderer using a custom formatter.
    pub fn new(sink: Sink, options: RendererOptions, formatter: F) -> Self {
        Self {
            sink,
            formatter,
            options,
            emoji_field: false,
            context: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Enables or disables the `emoji` field.
    ///
    /// Leave it disabled when the renderer sits behind a [`Decorated`](crate::Decorated), which
    /// puts the decoration in the message instead.
    #[must_use]
    pub fn with_emoji_field(mut self, enabled: bool) -> Self {
        self.emoji_field = enabled;
        self
    }

    /// Collects the context and record attributes into a single object.
    fn attrs(&self, record: &Record) -> Map<String, JsonValue> {
        let mut attrs = Map::new();

        for attr in &self.context {
            insert_nested(&mut attrs, &attr.groups, &attr.key, attr.value.clone());
        }

        record.attrs(|attr| {
            if !attr.key().is_empty() && !keys::should_skip(attr.key()) {
                insert_nested(&mut attrs, &self.groups, attr.key(), to_json(attr.value()));
            }
            true
        });

        attrs
    }

    fn serialize(&self, record: &Record) -> Result<Vec<u8>, LoggerError> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, self.formatter.clone());
        let mut map_serializer = serializer.serialize_map(None)?;

        if let Ok(time) = clock::local(record.time()).format(TIME_FORMAT) {
            map_serializer.serialize_entry(fields::TIME, &time)?;
        }
        map_serializer.serialize_entry(fields::LEVEL, record.level().as_str())?;
        if self.emoji_field {
            let decoration = Decoration::resolve(record.level(), record.message());
            map_serializer.serialize_entry(fields::EMOJI, decoration.symbol)?;
        }
        map_serializer.serialize_entry(fields::MESSAGE, record.message())?;

        if self.options.add_source {
            if let Some(source) = record.call_site().and_then(|call_site| call_site.resolve()) {
                map_serializer.serialize_entry(fields::SOURCE, &source)?;
            }
        }

        let attrs = self.attrs(record);
        if !attrs.is_empty() {
            map_serializer.serialize_entry(fields::ATTRS, &attrs)?;
        }

        map_serializer.end()?;
        Ok(buffer)
    }

    /// Appends the serialized record and a trailing newline to `buffer`, wrapping the whole
    /// block in the color of `level` when colors are enabled.
    fn finish(&self, buffer: &mut Vec<u8>, level: Level, serialized: Vec<u8>) {
        if !self.options.color || level == Level::TRACE {
            buffer.extend_from_slice(&serialized);
        } else {
            let block = String::from_utf8_lossy(&serialized);
            let colored = match level {
                Level::ERROR => block.red(),
                Level::WARN => block.yellow(),
                Level::INFO => block.green(),
                _ => block.cyan(),
            };
            buffer.extend_from_slice(colored.to_string().as_bytes());
        }
        buffer.push(b'\n');
    }
}

impl<F> Renderer for JsonRenderer<F>
where
    F: Formatter + Clone + Send + Sync,
{
    fn enabled(&self, level: Level) -> bool {
        self.options.enabled(level)
    }

    fn render(&self, record: Record) -> Result<(), LoggerError> {
        self.sink.write_record(|buffer| {
            let serialized = self.serialize(&record)?;
            self.finish(buffer, record.level(), serialized);
            Ok(())
        })
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut derived = self.clone();
        derived.context.extend(
            attrs
                .iter()
                .filter(|attr| !attr.key().is_empty() && !keys::should_skip(attr.key()))
                .map(|attr| ContextAttr {
                    groups: self.groups.clone(),
                    key: attr.key().to_owned(),
                    value: to_json(attr.value()),
                }),
        );
        derived
    }

    fn with_group(&self, name: &str) -> Self {
        let mut derived = self.clone();
        if !name.is_empty() {
            derived.groups.push(name.to_owned());
        }
        derived
    }
}

/// Inserts `value` at `key` inside the objects named by `groups`, creating them as needed.
///
/// Later insertions of the same key replace earlier ones.
fn insert_nested(
    map: &mut Map<String, JsonValue>,
    groups: &[String],
    key: &str,
    value: JsonValue,
) {
    let mut target = map;
    for group in groups {
        let entry = target
            .entry(group.as_str())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !entry.is_object() {
            *entry = JsonValue::Object(Map::new());
        }
        let Some(nested) = entry.as_object_mut() else {
            return;
        };
        target = nested;
    }
    target.insert(key.to_owned(), value);
}

/// Converts an attribute value to JSON, embedding serialized JSON found in text and bytes.
fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => embedded_json(s).unwrap_or_else(|| s.as_str().into()),
        Value::I64(n) => JsonValue::from(*n),
        Value::U64(n) => JsonValue::from(*n),
        // NaN and infinities have no JSON representation.
        Value::F64(n) => match Number::from_f64(*n) {
            Some(number) => JsonValue::Number(number),
            None => JsonValue::String(n.to_string()),
        },
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Duration(d) => JsonValue::String(format!("{d:?}")),
        Value::Bytes(bytes) => match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(_) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        },
        Value::RawJson(s) => match serde_json::from_str(s) {
            Ok(value) => value,
            Err(_) => JsonValue::String(s.clone()),
        },
        Value::Json(value) => value.clone(),
    }
}

fn embedded_json(s: &str) -> Option<JsonValue> {
    if s.starts_with('{') || s.starts_with('[') {
        serde_json::from_str(s).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{sink::testing::Capture, CallSite};

    fn options(add_source: bool) -> RendererOptions {
        RendererOptions {
            level: Level::INFO,
            add_source,
            color: false,
        }
    }

    fn single(capture: &Capture) -> JsonValue {
        let output = capture.contents();
        assert!(output.ends_with('\n'), "{output}");
        serde_json::from_str(&output).unwrap()
    }

    fn record(level: Level, message: &str, attrs: Vec<Attr>) -> Record {
        let mut record = Record::now(level, message);
        record.add_attrs(attrs);
        record
    }

    #[test]
    fn compact_record_is_one_line_in_field_order() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false));

        let attrs = vec![Attr::string("key", "user:1")];
        json.render(record(Level::WARN, "cache miss", attrs)).unwrap();

        let output = capture.contents();
        assert_eq!(output.matches('\n').count(), 1);

        let time = output.find(r#""time":"#).unwrap();
        let level = output.find(r#""level":"WARN""#).unwrap();
        let msg = output.find(r#""msg":"cache miss""#).unwrap();
        let attrs = output.find(r#""attrs":{"key":"user:1"}"#).unwrap();
        assert!(time < level && level < msg && msg < attrs, "{output}");
        assert!(!output.contains(r#""emoji""#));
        assert!(!output.contains(r#""source""#));
    }

    #[test]
    fn time_has_milliseconds() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false));

        json.render(record(Level::INFO, "x", Vec::new())).unwrap();

        let value = single(&capture);
        let time = value["time"].as_str().unwrap();
        assert_eq!(time.len(), "2025-01-01 00:00:00.000".len(), "{time}");
        assert_eq!(time.as_bytes().get(10), Some(&b' '));
        assert_eq!(time.as_bytes().get(19), Some(&b'.'));
    }

    #[test]
    fn pretty_record_carries_emoji_and_indentation() {
        let capture = Capture::default();
        let json = JsonRenderer::pretty(capture.sink(), options(false)).with_emoji_field(true);

        json.render(record(Level::INFO, "Graceful shutdown", Vec::new())).unwrap();

        let output = capture.contents();
        assert!(output.starts_with("{\n  \"time\": "), "{output}");
        assert!(output.ends_with("}\n"));

        let value = single(&capture);
        assert_eq!(value["emoji"], "🛑");
        assert_eq!(value["msg"], "Graceful shutdown");
        assert!(value.get("attrs").is_none());
    }

    #[test]
    fn embedded_json_is_nested() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false));

        json.render(record(
            Level::INFO,
            "payload",
            vec![
                Attr::string("object", r#"{"a":1,"b":[true]}"#),
                Attr::string("list", "[1, 2]"),
                Attr::string("broken", "{not json"),
                Attr::new("bytes", &br#"{"c":"d"}"#[..]),
                Attr::new("text_bytes", &b"plain"[..]),
                Attr::raw_json("raw", r#"{"e":null}"#),
                Attr::raw_json("bad_raw", "nope"),
            ],
        ))
        .unwrap();

        let attrs = &single(&capture)["attrs"];
        assert_eq!(attrs["object"], json!({"a": 1, "b": [true]}));
        assert_eq!(attrs["list"], json!([1, 2]));
        assert_eq!(attrs["broken"], "{not json");
        assert_eq!(attrs["bytes"], json!({"c": "d"}));
        assert_eq!(attrs["text_bytes"], "plain");
        assert_eq!(attrs["raw"], json!({"e": null}));
        assert_eq!(attrs["bad_raw"], "nope");
    }

    #[test]
    fn scalar_values() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false));

        json.render(record(
            Level::INFO,
            "values",
            vec![
                Attr::int("signed", -3),
                Attr::new("unsigned", 7_u64),
                Attr::new("ratio", 0.25),
                Attr::new("nan", f64::NAN),
                Attr::bool("flag", false),
                Attr::duration("took", std::time::Duration::from_millis(1500)),
                Attr::any("tags", &["a", "b"]),
            ],
        ))
        .unwrap();

        let attrs = &single(&capture)["attrs"];
        assert_eq!(attrs["signed"], -3);
        assert_eq!(attrs["unsigned"], 7);
        assert_eq!(attrs["ratio"], 0.25);
        assert_eq!(attrs["nan"], "NaN");
        assert_eq!(attrs["flag"], false);
        assert_eq!(attrs["took"], "1.5s");
        assert_eq!(attrs["tags"], json!(["a", "b"]));
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false))
            .with_attrs(vec![Attr::string("user", "from context")]);

        let attrs = vec![Attr::string("user", "first"), Attr::string("user", "last")];
        json.render(record(Level::INFO, "dup", attrs)).unwrap();

        assert_eq!(single(&capture)["attrs"], json!({"user": "last"}));
    }

    #[test]
    fn derivation_accumulates_and_nests_groups() {
        let capture = Capture::default();
        let parent = JsonRenderer::compact(capture.sink(), options(false));
        let child = parent
            .with_attrs(vec![Attr::string("request_id", "r-1")])
            .with_group("http")
            .with_attrs(vec![Attr::string("method", "GET")])
            .with_group("")
            .with_group("client");

        let attrs = vec![Attr::string("ip", "10.0.0.1")];
        child.render(record(Level::INFO, "request", attrs)).unwrap();

        assert_eq!(
            single(&capture)["attrs"],
            json!({
                "request_id": "r-1",
                "http": {
                    "method": "GET",
                    "client": {"ip": "10.0.0.1"},
                },
            })
        );

        let capture = Capture::default();
        let parent = JsonRenderer::compact(capture.sink(), options(false));
        let _child = parent.with_attrs(vec![Attr::string("request_id", "r-1")]);
        parent.render(record(Level::INFO, "parent", Vec::new())).unwrap();
        assert!(single(&capture).get("attrs").is_none());
    }

    #[test]
    fn denylisted_keys_are_never_rendered() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(false))
            .with_attrs(vec![
                Attr::string("service", "api"),
                Attr::string("version", "1.0"),
            ])
            .with_group("inner")
            .with_attrs(vec![Attr::string("environment", "prod")]);

        let attrs = vec![
            Attr::new("pid", 1),
            Attr::new("metric_value", 2),
            Attr::new("port", 80),
        ];
        json.render(record(Level::INFO, "filtered", attrs)).unwrap();

        let value = single(&capture);
        assert_eq!(value["attrs"], json!({"inner": {"port": 80}}));
        let output = capture.contents();
        for key in ["service", "version", "environment", "pid", "metric_value"] {
            assert!(!output.contains(key), "{key} leaked into {output}");
        }
    }

    #[test]
    fn source_is_included_when_enabled() {
        let capture = Capture::default();
        let json = JsonRenderer::compact(capture.sink(), options(true));

        let with_function = CallSite::new("src/app/main.rs", 9, Some("app::main"));
        let without_function = CallSite::new("src/lib.rs", 4, None);
        let unresolvable = CallSite::new("", 0, None);
        for call_site in [with_function, without_function, unresolvable] {
            let record = Record::now(Level::INFO, "located").with_call_site(call_site);
            json.render(record).unwrap();
        }

        let output = capture.contents();
        let values: Vec<JsonValue> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let [with_function, without_function, unresolved] = values.as_slice() else {
            panic!("expected three records: {output}");
        };
        assert_eq!(
            with_function["source"],
            json!({"file": "main.rs", "line": 9, "function": "main"})
        );
        assert_eq!(
            without_function["source"],
            json!({"file": "lib.rs", "line": 4})
        );
        assert!(unresolved.get("source").is_none());
    }
}
