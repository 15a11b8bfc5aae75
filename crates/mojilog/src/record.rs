//! The values handed to renderers: [`Record`], its [`Attr`]ibutes and its [`CallSite`].

use std::{borrow::Cow, fmt, panic::Location, path::Path, time::Duration};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{Level, Metadata};

/// The value of an attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string.
    String(String),

    /// A signed integer.
    I64(i64),

    /// An unsigned integer.
    U64(u64),

    /// A floating point number.
    F64(f64),

    /// A boolean.
    Bool(bool),

    /// A duration, rendered in its human-readable form (`1.5s`).
    Duration(Duration),

    /// Raw bytes. The JSON renderer embeds them as structured data if they hold valid JSON.
    Bytes(Vec<u8>),

    /// Text that is already serialized JSON.
    RawJson(String),

    /// An arbitrary structured value.
    Json(serde_json::Value),
}

impl Value {
    /// Serializes any [`Serialize`] type into a structured value.
    ///
    /// Serialization failures are kept as the error's message, so that logging never fails
    /// because of one value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Json(value),
            Err(error) => Self::String(error.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::RawJson(s) => f.write_str(s),
            Self::I64(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            Self::F64(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Duration(d) => write!(f, "{d:?}"),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    String => String,
    &str => String,
    Cow<'_, str> => String,
    i8 => I64,
    i16 => I64,
    i32 => I64,
    i64 => I64,
    u8 => U64,
    u16 => U64,
    u32 => U64,
    u64 => U64,
    f32 => F64,
    f64 => F64,
    bool => Bool,
    Duration => Duration,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    serde_json::Value => Json,
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| Self::String(value.to_string()), Self::U64)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::String(value.to_string()), Self::I64)
    }
}

/// A key-value pair attached to a record or a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    key: Cow<'static, str>,
    value: Value,
}

impl Attr {
    /// Creates an attribute.
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a string attribute.
    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    /// Creates a signed integer attribute.
    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, Value::I64(value))
    }

    /// Creates a boolean attribute.
    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// Creates a duration attribute.
    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    /// Creates an attribute holding text that is already serialized JSON.
    pub fn raw_json(key: impl Into<Cow<'static, str>>, json: impl Into<String>) -> Self {
        Self::new(key, Value::RawJson(json.into()))
    }

    /// Creates an attribute from any serializable value.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        Self::new(key, Value::from_serialize(value))
    }

    /// The attribute key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The attribute value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The place in the source code a record was produced at.
///
/// Capturing a call-site only stores static references; the string work needed to present it
/// happens in [`CallSite::resolve`], which renderers call only when call-site output is
/// enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    function: Option<&'static str>,
}

impl CallSite {
    /// Creates a call-site. `function` is the fully qualified path of the enclosing function.
    pub const fn new(file: &'static str, line: u32, function: Option<&'static str>) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// Captures the location of the caller.
    ///
    /// Every function between the code that should be reported and this call must be annotated
    /// with `#[track_caller]`, otherwise the location of the innermost unannotated function is
    /// reported instead.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), None)
    }

    /// Builds a call-site from `tracing` metadata, if it carries a file and line.
    pub fn from_metadata(metadata: &'static Metadata<'static>) -> Option<Self> {
        Some(Self::new(metadata.file()?, metadata.line()?, None))
    }

    /// Resolves the call-site to the form renderers display: base filename, unqualified
    /// function name and line.
    ///
    /// Returns `None` if the call-site carries no usable location.
    pub fn resolve(&self) -> Option<Source<'static>> {
        if self.file.is_empty() || self.line == 0 {
            return None;
        }

        let file = Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file);

        Some(Source {
            file,
            function: self.function.map(unqualified_function_name),
            line: self.line,
        })
    }
}

/// Strips the module path and any closure markers from a function path, so that
/// `app::server::run::{{closure}}` becomes `run`.
fn unqualified_function_name(mut path: &str) -> &str {
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }

    path.rsplit_once("::").map_or(path, |(_, name)| name)
}

/// A resolved [`CallSite`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Source<'a> {
    /// Base name of the source file.
    pub file: &'a str,

    /// Line number within the file.
    pub line: u32,

    /// Name of the enclosing function, without its module path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<&'a str>,
}

/// A single log event.
#[derive(Clone, Debug)]
pub struct Record {
    time: OffsetDateTime,
    level: Level,
    message: String,
    attrs: Vec<Attr>,
    call_site: Option<CallSite>,
}

impl Record {
    /// Creates a record without attributes.
    pub fn new(
        time: OffsetDateTime,
        level: Level,
        message: impl Into<String>,
        call_site: Option<CallSite>,
    ) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            attrs: Vec::new(),
            call_site,
        }
    }

    /// Creates a record timestamped now, without call-site.
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Self::new(OffsetDateTime::now_utc(), level, message, None)
    }

    /// Sets the call-site.
    #[must_use]
    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Appends one attribute.
    pub fn add(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    /// Appends attributes, keeping their order.
    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    /// Visits attributes in insertion order until `visit` returns `false`.
    pub fn attrs(&self, mut visit: impl FnMut(&Attr) -> bool) {
        for attr in &self.attrs {
            if !visit(attr) {
                break;
            }
        }
    }

    /// The number of attributes.
    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    /// When the record was created.
    pub fn time(&self) -> OffsetDateTime {
        self.time
    }

    /// The record level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The record message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The captured call-site, if any.
    pub fn call_site(&self) -> Option<CallSite> {
        self.call_site
    }

    /// Prepends `prefix` to the message.
    ///
    /// This is the only mutation a record undergoes after it was handed to a renderer, and it is
    /// reserved for [`Decorated`](crate::Decorated).
    pub(crate) fn prefix_message(&mut self, prefix: impl fmt::Display) {
        self.message = format!("{prefix}{}", self.message);
    }
}
