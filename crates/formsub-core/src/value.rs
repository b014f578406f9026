//! Normalized form values and the JSON → native value coercion ladder.
//!
//! Incoming form data is arbitrary JSON. Before it is persisted every value
//! is converted into a [`NormalizedValue`], picking the most precise native
//! representation available for numbers without any schema knowledge.
//!
//! Numbers are inspected through their exact source text (serde_json is built
//! with `arbitrary_precision`), so a payload such as `123.456` never passes
//! through a lossy `f64` on its way to becoming a decimal.

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  ser::{Error as _, SerializeMap, SerializeSeq},
};
use serde_json::{Number, Value};

use crate::{Error, Result};

/// Ordered field name → value mapping; insertion order is preserved.
pub type FormData = IndexMap<String, NormalizedValue>;

/// Most significant digits an exact decimal may carry (the envelope of a
/// 128-bit decimal).
pub const MAX_DECIMAL_DIGITS: usize = 28;

/// Most fractional digits an exact decimal may carry.
pub const MAX_DECIMAL_SCALE: i64 = 28;

// ─── NormalizedValue ─────────────────────────────────────────────────────────

/// A JSON value after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
  String(String),
  /// A whole number that fits in 32 bits.
  Int32(i32),
  /// A whole number that overflows 32 bits but fits in 64.
  Int64(i64),
  /// A number representable exactly in decimal.
  Decimal(BigDecimal),
  /// Fallback for numbers no exact representation can hold.
  Float(f64),
  Bool(bool),
  Null,
  List(Vec<NormalizedValue>),
  Map(FormData),
}

impl NormalizedValue {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&FormData> {
    match self {
      Self::Map(m) => Some(m),
      _ => None,
    }
  }

  pub fn is_number(&self) -> bool {
    matches!(
      self,
      Self::Int32(_) | Self::Int64(_) | Self::Decimal(_) | Self::Float(_)
    )
  }

  /// Serialise to a [`serde_json::Value`], applying null-omission to maps.
  pub fn to_json(&self) -> Result<Value> { Ok(serde_json::to_value(self)?) }

  /// Compare a value as written (`self`) with a value read back from
  /// storage (`read_back`).
  ///
  /// Numbers may come back as a different numeric variant as long as the
  /// numeric value and the integer-vs-fraction character are unchanged.
  /// Null map entries in `self` must be absent from `read_back`. Everything
  /// else, including key order, must match exactly.
  pub fn is_equivalent(&self, read_back: &Self) -> bool {
    match (self, read_back) {
      (Self::String(a), Self::String(b)) => a == b,
      (Self::Bool(a), Self::Bool(b)) => a == b,
      (Self::Null, Self::Null) => true,
      (Self::List(a), Self::List(b)) => {
        a.len() == b.len()
          && a.iter().zip(b).all(|(x, y)| x.is_equivalent(y))
      }
      (Self::Map(a), Self::Map(b)) => form_data_equivalent(a, b),
      (a, b) => match (a.numeric(), b.numeric()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
      },
    }
  }

  /// Numbers are classified from the JSON text they serialise to, which is
  /// the text a backend persists: `10.0` is fractional whichever variant
  /// wrote it, `10` and `1e21` are not.
  fn numeric(&self) -> Option<Numeric> {
    if !self.is_number() {
      return None;
    }
    let value: BigDecimal = serde_json::to_string(self).ok()?.parse().ok()?;
    let fractional = value.as_bigint_and_exponent().1 > 0;
    Some(Numeric { value, fractional })
  }

  /// Drop null map entries at every depth. Nulls that are list elements
  /// stay, though maps inside lists are cleaned as well.
  pub fn without_nulls(self) -> Self {
    match self {
      Self::Map(map) => Self::Map(without_nulls(map)),
      Self::List(items) => {
        Self::List(items.into_iter().map(Self::without_nulls).collect())
      }
      other => other,
    }
  }
}

/// [`NormalizedValue::without_nulls`] for a whole field map. The result
/// is exactly what survives a serialise / deserialise round trip.
pub fn without_nulls(data: FormData) -> FormData {
  data
    .into_iter()
    .filter(|(_, v)| !v.is_null())
    .map(|(k, v)| (k, v.without_nulls()))
    .collect()
}

#[derive(PartialEq)]
struct Numeric {
  value:      BigDecimal,
  fractional: bool,
}

/// [`NormalizedValue::is_equivalent`] for whole field maps.
pub fn form_data_equivalent(written: &FormData, read_back: &FormData) -> bool {
  let mut read = read_back.iter();
  for (key, value) in written.iter().filter(|(_, v)| !v.is_null()) {
    match read.next() {
      Some((k, v)) if k == key && value.is_equivalent(v) => {}
      _ => return false,
    }
  }
  read.next().is_none()
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Converts parsed JSON into [`NormalizedValue`] trees.
///
/// Numbers walk a ladder and take the first representation that holds them
/// exactly: `i32`, `i64`, decimal, then `f64`. A number none of those can
/// hold is kept as text, in serde_json's rendering of the number: the
/// digits are untouched but an exponent may gain an explicit `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
  /// When `false` the decimal rung is skipped and fractional numbers go
  /// straight to `f64`.
  pub exact_decimals: bool,
}

impl Default for Normalizer {
  fn default() -> Self { Self { exact_decimals: true } }
}

impl Normalizer {
  pub fn new(exact_decimals: bool) -> Self { Self { exact_decimals } }

  /// Normalize a possibly-missing JSON value.
  ///
  /// `None` stands for the undefined sentinel (e.g. a lookup that found
  /// nothing) and is rejected rather than coerced.
  pub fn normalize(&self, value: Option<&Value>) -> Result<NormalizedValue> {
    value
      .map(|v| self.normalize_value(v))
      .ok_or_else(|| Error::malformed("undefined JSON value encountered"))
  }

  pub fn normalize_value(&self, value: &Value) -> NormalizedValue {
    match value {
      Value::String(s) => NormalizedValue::String(s.clone()),
      Value::Bool(b) => NormalizedValue::Bool(*b),
      Value::Null => NormalizedValue::Null,
      Value::Number(n) => self.normalize_number(n),
      Value::Array(items) => NormalizedValue::List(
        items.iter().map(|v| self.normalize_value(v)).collect(),
      ),
      Value::Object(map) => NormalizedValue::Map(self.normalize_object(map)),
    }
  }

  /// Normalize every field of a JSON object, keeping keys verbatim.
  pub fn normalize_object(
    &self,
    map: &serde_json::Map<String, Value>,
  ) -> FormData {
    map
      .iter()
      .map(|(k, v)| (k.clone(), self.normalize_value(v)))
      .collect()
  }

  fn normalize_number(&self, n: &Number) -> NormalizedValue {
    if let Some(i) = n.as_i64() {
      return match i32::try_from(i) {
        Ok(small) => NormalizedValue::Int32(small),
        Err(_) => NormalizedValue::Int64(i),
      };
    }

    let text = n.to_string();
    if self.exact_decimals
      && let Some(d) = exact_decimal(&text)
    {
      return NormalizedValue::Decimal(d);
    }

    match text.parse::<f64>() {
      Ok(f) if f.is_finite() => NormalizedValue::Float(f),
      _ => NormalizedValue::String(text),
    }
  }
}

/// Parse `text` as a decimal if it fits the decimal envelope without
/// rounding.
fn exact_decimal(text: &str) -> Option<BigDecimal> {
  let mut parsed: BigDecimal = text.parse().ok()?;

  let (_, scale) = parsed.as_bigint_and_exponent();
  if scale < 0 {
    // `1e3` style input; refuse before expanding a huge exponent.
    if -scale > MAX_DECIMAL_DIGITS as i64 {
      return None;
    }
    parsed = parsed.with_scale(0);
  }

  let (mantissa, scale) = parsed.as_bigint_and_exponent();
  let digits = mantissa.to_string().trim_start_matches('-').len();
  (digits <= MAX_DECIMAL_DIGITS && scale <= MAX_DECIMAL_SCALE).then_some(parsed)
}

// ─── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for NormalizedValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::String(s) => serializer.serialize_str(s),
      Self::Int32(i) => serializer.serialize_i32(*i),
      Self::Int64(i) => serializer.serialize_i64(*i),
      Self::Decimal(d) => d
        .to_plain_string()
        .parse::<Number>()
        .map_err(S::Error::custom)?
        .serialize(serializer),
      Self::Float(f) => serializer.serialize_f64(*f),
      Self::Bool(b) => serializer.serialize_bool(*b),
      Self::Null => serializer.serialize_unit(),
      Self::List(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
      Self::Map(map) => serialize_form_data(map, serializer),
    }
  }
}

/// Serialise a [`FormData`] map, omitting null-valued entries.
pub fn serialize_form_data<S: Serializer>(
  data: &FormData,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  let present = data.values().filter(|v| !v.is_null()).count();
  let mut map = serializer.serialize_map(Some(present))?;
  for (key, value) in data.iter().filter(|(_, v)| !v.is_null()) {
    map.serialize_entry(key, value)?;
  }
  map.end()
}

impl<'de> Deserialize<'de> for NormalizedValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(Normalizer::default().normalize_value(&raw))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
