//! Opt-in conversion of canonical leaves into richer types
//!
//! Conversion is a lookup: a [`ConversionTable`] maps field names or paths to a
//! [`Conversion`], and [`ConversionTable::convert`] applies it to one leaf. A
//! leaf that has no entry, or that does not parse, comes back unchanged.
//!
//! Converted timestamps remember how they were encoded, so
//! [`Value::to_canonical`] reproduces the server's original value exactly.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use indexmap::IndexMap;
use log::trace;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

const ISO_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Wire encoding a timestamp was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// `YYYY-MM-DDTHH:MM:SS[.f]Z` with the given number of fractional digits.
    Iso8601 { fraction_digits: u8 },
    /// Integer seconds since the UNIX epoch.
    EpochSeconds,
    /// Integer milliseconds since the UNIX epoch.
    EpochMillis,
}

/// A converted date-time leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    at: DateTime<Utc>,
    encoding: TimestampEncoding,
}

impl Timestamp {
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn encoding(&self) -> TimestampEncoding {
        self.encoding
    }

    /// The canonical value this timestamp was converted from.
    pub fn to_raw(&self) -> JsonValue {
        match self.encoding {
            TimestampEncoding::Iso8601 { fraction_digits } => {
                let mut out = self.at.format(ISO_SECONDS_FORMAT).to_string();
                if fraction_digits > 0 {
                    let nanos = format!("{:09}", self.at.timestamp_subsec_nanos());
                    out.push('.');
                    out.push_str(&nanos[..usize::from(fraction_digits)]);
                }
                out.push('Z');
                JsonValue::String(out)
            }
            TimestampEncoding::EpochSeconds => JsonValue::from(self.at.timestamp()),
            TimestampEncoding::EpochMillis => JsonValue::from(self.at.timestamp_millis()),
        }
    }
}

/// Parse a Panther ISO-8601 timestamp. Fractional seconds may carry 0-9 digits.
pub fn parse_iso8601(raw: &str) -> Option<Timestamp> {
    let body = raw.strip_suffix('Z')?;
    let (seconds, fraction) = match body.split_once('.') {
        Some((seconds, fraction)) => (seconds, fraction),
        None => (body, ""),
    };

    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if body.contains('.') && fraction.is_empty() {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(seconds, ISO_SECONDS_FORMAT).ok()?;
    // reject lenient parses that would not print back identically
    if naive.format(ISO_SECONDS_FORMAT).to_string() != seconds {
        return None;
    }
    // chrono reads `:60` as a leap second, which `with_nanosecond` would drop
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }

    let nanos: u32 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().ok()?
    };
    let at = naive.and_utc().with_nanosecond(nanos)?;

    Some(Timestamp {
        at,
        encoding: TimestampEncoding::Iso8601 {
            fraction_digits: fraction.len() as u8,
        },
    })
}

/// A conversion applied to a matching leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Iso8601,
    EpochSeconds,
    EpochMillis,
}

impl Conversion {
    /// Apply to one raw leaf, `None` when the leaf is not of the expected form
    /// or would not reproduce exactly.
    pub fn apply(&self, raw: &JsonValue) -> Option<Timestamp> {
        self.parse(raw).filter(|ts| ts.to_raw() == *raw)
    }

    fn parse(&self, raw: &JsonValue) -> Option<Timestamp> {
        match self {
            Conversion::Iso8601 => raw.as_str().and_then(parse_iso8601),
            Conversion::EpochSeconds => {
                let secs = raw.as_i64()?;
                DateTime::from_timestamp(secs, 0).map(|at| Timestamp {
                    at,
                    encoding: TimestampEncoding::EpochSeconds,
                })
            }
            Conversion::EpochMillis => {
                let millis = raw.as_i64()?;
                DateTime::from_timestamp_millis(millis).map(|at| Timestamp {
                    at,
                    encoding: TimestampEncoding::EpochMillis,
                })
            }
        }
    }
}

/// Which leaves a table entry applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPattern {
    /// The leaf's field name, at any depth.
    Name(String),
    /// A dotted path from the result root. `*` matches any single segment,
    /// including sequence indices.
    Path(Vec<String>),
}

impl FieldPattern {
    pub fn name(name: impl Into<String>) -> Self {
        FieldPattern::Name(name.into())
    }

    pub fn path(path: &str) -> Self {
        FieldPattern::Path(path.split('.').map(str::to_string).collect())
    }

    fn matches(&self, hint: &FieldHint<'_>) -> bool {
        match self {
            FieldPattern::Name(name) => hint.name == Some(name.as_str()),
            FieldPattern::Path(pattern) => {
                pattern.len() == hint.path.len()
                    && pattern
                        .iter()
                        .zip(hint.path)
                        .all(|(p, seg)| p == "*" || p == seg)
            }
        }
    }
}

/// Where a leaf sits: its nearest field name and its full path.
#[derive(Debug, Clone, Copy)]
pub struct FieldHint<'a> {
    pub name: Option<&'a str>,
    pub path: &'a [String],
}

/// Static table from field patterns to conversions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionTable {
    entries: Vec<(FieldPattern, Conversion)>,
}

/// Timestamp fields Panther returns as ISO-8601 strings.
const DEFAULT_ISO_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "lastModified",
    "lastLoggedInAt",
    "lastEventReceived",
    "firstEventOccurredAt",
    "lastReceivedEventAt",
    "startedAt",
    "completedAt",
    "expiresAt",
    "issuedAt",
];

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table covering the timestamp fields of Panther resources.
    pub fn panther_defaults() -> Self {
        DEFAULT_ISO_FIELDS
            .iter()
            .fold(Self::new(), |table, name| {
                table.with(FieldPattern::name(*name), Conversion::Iso8601)
            })
    }

    pub fn with(mut self, pattern: FieldPattern, conversion: Conversion) -> Self {
        self.entries.push((pattern, conversion));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path entries win over name entries; within a kind, the first match wins.
    pub fn lookup(&self, hint: &FieldHint<'_>) -> Option<Conversion> {
        let by_path = self
            .entries
            .iter()
            .find(|(p, _)| matches!(p, FieldPattern::Path(_)) && p.matches(hint));
        let by_name = || {
            self.entries
                .iter()
                .find(|(p, _)| matches!(p, FieldPattern::Name(_)) && p.matches(hint))
        };
        by_path.or_else(by_name).map(|(_, c)| *c)
    }

    /// Convert one scalar leaf. Unrecognised leaves are returned unchanged.
    pub fn convert(&self, hint: &FieldHint<'_>, raw: &JsonValue) -> Value {
        if let Some(conversion) = self.lookup(hint) {
            match conversion.apply(raw) {
                Some(ts) => return Value::Timestamp(ts),
                None => trace!("no {:?} conversion for {:?} at {:?}", conversion, raw, hint.path),
            }
        }
        Value::from_scalar(raw)
    }
}

/// A canonical value whose leaves may have been converted.
///
/// Structure (keys, order, nesting) always mirrors the canonical value it came
/// from; only leaves differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Timestamp(Timestamp),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    fn from_scalar(raw: &JsonValue) -> Self {
        match raw {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.clone()),
            JsonValue::String(s) => Value::String(s.clone()),
            // containers are walked by callers; reaching here means no conversion applies
            other => Value::from(other.clone()),
        }
    }

    /// Walk `raw`, converting leaves that match `table`.
    pub fn convert(raw: JsonValue, table: &ConversionTable) -> Self {
        let mut path = Vec::new();
        convert_at(raw, None, &mut path, table)
    }

    /// The canonical value this was converted from.
    pub fn to_canonical(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::Number(n.clone()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Timestamp(ts) => ts.to_raw(),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_canonical).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_canonical()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Follow a dotted path of keys and indices.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |value, segment| match value {
            Value::Map(map) => map.get(segment),
            Value::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Leaf rendered for display: strings bare, timestamps in RFC 3339,
    /// everything else as JSON text.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => ts.at().to_rfc3339(),
            other => other.to_canonical().to_string(),
        }
    }
}

fn convert_at(
    raw: JsonValue,
    name: Option<&str>,
    path: &mut Vec<String>,
    table: &ConversionTable,
) -> Value {
    match raw {
        JsonValue::Array(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    path.push(i.to_string());
                    let converted = convert_at(item, name, path, table);
                    path.pop();
                    converted
                })
                .collect(),
        ),
        JsonValue::Object(map) => Value::Map(
            map.into_iter()
                .map(|(key, item)| {
                    path.push(key.clone());
                    let converted = convert_at(item, Some(&key), path, table);
                    path.pop();
                    (key, converted)
                })
                .collect(),
        ),
        scalar => table.convert(&FieldHint { name, path }, &scalar),
    }
}

impl From<JsonValue> for Value {
    fn from(raw: JsonValue) -> Self {
        Value::convert(raw, &ConversionTable::new())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_canonical().serialize(serializer)
    }
}
