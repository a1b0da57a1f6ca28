//! Conversion between token text and feature values, keyed by rule name.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

use super::{Value, ValueConversionError};

/// Converts the text of one terminal or datatype rule.
pub trait ValueConverter: Send + Sync {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError>;

    /// Render `value` back to source text.
    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError>;
}

#[cold]
fn unsupported(value: &Value, target: &str) -> ValueConversionError {
    ValueConversionError::new(format!("cannot serialize {value:?} as {target}"))
}

/// `INT`: decimal `i64`.
#[derive(Copy, Clone, Debug, Default)]
pub struct IntConverter;

impl ValueConverter for IntConverter {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError> {
        if text.is_empty() {
            return Err(ValueConversionError::new(
                "Couldn't convert empty string to int value.",
            ));
        }
        text.parse::<i64>().map(Value::Int).map_err(|_| {
            ValueConversionError::new(format!("Couldn't convert '{text}' to int value."))
        })
    }

    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError> {
        match value {
            Value::Int(v) => Ok(v.to_string()),
            other => Err(unsupported(other, "INT")),
        }
    }
}

/// `ID`: identifiers; a leading `^` escapes keywords.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdConverter;

impl ValueConverter for IdConverter {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError> {
        Ok(Value::Text(text.strip_prefix('^').unwrap_or(text).to_owned()))
    }

    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(unsupported(other, "ID")),
        }
    }
}

/// `STRING`: single or double quoted, with backslash escapes.
#[derive(Copy, Clone, Debug, Default)]
pub struct StringConverter;

impl ValueConverter for StringConverter {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError> {
        let mut chars = text.chars();
        let quote = match chars.next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(ValueConversionError::new("String literal is not quoted.")),
        };
        if text.len() < 2 || !text.ends_with(quote) {
            return Err(ValueConversionError::new("String literal is not terminated."));
        }
        unescape(&text[1..text.len() - 1]).map(Value::Text)
    }

    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError> {
        match value {
            Value::Text(v) => {
                let mut out = String::with_capacity(v.len() + 2);
                out.push('"');
                for c in v.chars() {
                    match c {
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        c => out.push(c),
                    }
                }
                out.push('"');
                Ok(out)
            }
            other => Err(unsupported(other, "STRING")),
        }
    }
}

fn unescape(body: &str) -> Result<String, ValueConversionError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = Some(&hex)
                    .filter(|hex| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        ValueConversionError::new(format!("Illegal unicode escape '\\u{hex}'."))
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {
                return Err(ValueConversionError::new(
                    "String literal ends with an escape character.",
                ))
            }
        }
    }
    Ok(out)
}

/// `DECIMAL`: plain decimal numbers.
#[derive(Copy, Clone, Debug, Default)]
pub struct DecimalConverter;

impl ValueConverter for DecimalConverter {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError> {
        parse_decimal(text).map(Value::Decimal)
    }

    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError> {
        match value {
            Value::Decimal(v) => Ok(v.to_string()),
            other => Err(unsupported(other, "DECIMAL")),
        }
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, ValueConversionError> {
    Decimal::from_str(text.trim()).map_err(|e| {
        ValueConversionError::new(format!("Couldn't convert '{text}' to decimal value: {e}."))
    })
}

/// Fractions such as `123/246`, stored as a decimal.
///
/// Serializes back as a fraction over a power of ten: `0.5` becomes `5/10`.
#[derive(Copy, Clone, Debug, Default)]
pub struct FractionConverter;

impl ValueConverter for FractionConverter {
    fn to_value(&self, text: &str) -> Result<Value, ValueConversionError> {
        let value = match text.split_once('/') {
            None => parse_decimal(text)?,
            Some((numerator, denominator)) => {
                let numerator = parse_decimal(numerator)?;
                let denominator = parse_decimal(denominator)?;
                if denominator.is_zero() {
                    return Err(ValueConversionError::new(format!(
                        "Division by zero in '{text}'."
                    )));
                }
                numerator.checked_div(denominator).ok_or_else(|| {
                    ValueConversionError::new(format!("Fraction '{text}' is out of range."))
                })?
            }
        };
        Ok(Value::Decimal(value.normalize()))
    }

    fn to_text(&self, value: &Value) -> Result<String, ValueConversionError> {
        let Value::Decimal(value) = value else {
            return Err(unsupported(value, "Fraction"));
        };
        let value = value.normalize();
        if value.scale() == 0 {
            return Ok(value.to_string());
        }
        let denominator = 10_i128.pow(value.scale());
        Ok(format!("{}/{denominator}", value.mantissa()))
    }
}

/// Converters by rule name.
pub struct ValueConverterRegistry {
    converters: FxHashMap<String, Box<dyn ValueConverter>>,
}

impl ValueConverterRegistry {
    /// A registry without converters. Every value stays text.
    pub fn empty() -> Self {
        ValueConverterRegistry {
            converters: FxHashMap::default(),
        }
    }

    /// Converters for `INT`, `ID`, `STRING`, `DECIMAL` and `Fraction`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("INT", IntConverter);
        registry.register("ID", IdConverter);
        registry.register("STRING", StringConverter);
        registry.register("DECIMAL", DecimalConverter);
        registry.register("Fraction", FractionConverter);
        registry
    }

    pub fn register(&mut self, rule: impl Into<String>, converter: impl ValueConverter + 'static) {
        self.converters.insert(rule.into(), Box::new(converter));
    }

    pub fn get(&self, rule: &str) -> Option<&dyn ValueConverter> {
        self.converters.get(rule).map(|c| &**c)
    }

    /// Convert `text` produced by `rule`. Text of rules without a converter
    /// is kept as is.
    pub fn to_value(&self, rule: &str, text: &str) -> Result<Value, ValueConversionError> {
        match self.get(rule) {
            Some(converter) => converter.to_value(text),
            None => Ok(Value::Text(text.to_owned())),
        }
    }
}

impl Default for ValueConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ValueConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.converters.keys().collect();
        rules.sort();
        f.debug_struct("ValueConverterRegistry")
            .field("rules", &rules)
            .finish()
    }
}

#[cfg(test)]
mod tests;
