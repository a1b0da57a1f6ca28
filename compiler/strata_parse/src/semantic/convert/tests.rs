use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::{
    FractionConverter, IdConverter, IntConverter, StringConverter, ValueConverter,
    ValueConverterRegistry,
};
use crate::semantic::Value;

fn decimal(text: &str) -> Value {
    Value::Decimal(Decimal::from_str(text).unwrap_or_default())
}

#[test]
fn test_fraction_simple_value() {
    assert_eq!(FractionConverter.to_value("123"), Ok(decimal("123")));
}

#[test]
fn test_fraction_divides() {
    assert_eq!(FractionConverter.to_value("123/246"), Ok(decimal("0.5")));
}

#[test]
fn test_fraction_zero_denominator() {
    let error = FractionConverter.to_value("123/0").map_err(|e| e.message().to_owned());
    assert_eq!(error, Err("Division by zero in '123/0'.".to_owned()));
}

#[test]
fn test_fraction_to_text() {
    assert_eq!(FractionConverter.to_text(&decimal("123")), Ok("123".to_owned()));
    assert_eq!(FractionConverter.to_text(&decimal("0.5")), Ok("5/10".to_owned()));
    assert_eq!(
        FractionConverter.to_text(&decimal("1.557")),
        Ok("1557/1000".to_owned())
    );
}

#[test]
fn test_int_converter() {
    assert_eq!(IntConverter.to_value("42"), Ok(Value::Int(42)));
    let error = IntConverter.to_value("99999999999999999999");
    assert_eq!(
        error.map_err(|e| e.message().to_owned()),
        Err("Couldn't convert '99999999999999999999' to int value.".to_owned())
    );
    assert!(IntConverter.to_value("").is_err());
    assert_eq!(IntConverter.to_text(&Value::Int(-3)), Ok("-3".to_owned()));
}

#[test]
fn test_id_strips_caret() {
    assert_eq!(IdConverter.to_value("^model"), Ok(Value::Text("model".into())));
    assert_eq!(IdConverter.to_value("name"), Ok(Value::Text("name".into())));
}

#[test]
fn test_string_unquotes_and_unescapes() {
    assert_eq!(
        StringConverter.to_value(r#""a\tb\"c""#),
        Ok(Value::Text("a\tb\"c".into()))
    );
    assert_eq!(
        StringConverter.to_value(r"'A'"),
        Ok(Value::Text("A".into()))
    );
    assert!(StringConverter.to_value("\"open").is_err());
    assert!(StringConverter.to_value("bare").is_err());
    assert!(StringConverter.to_value(r#""\u00""#).is_err());
}

#[test]
fn test_unicode_escape_requires_four_hex_digits() {
    assert_eq!(
        StringConverter.to_value(r#""\u00e9x""#),
        Ok(Value::Text("\u{e9}x".into()))
    );
    assert!(StringConverter.to_value(r#""\u+123""#).is_err());
    assert!(StringConverter.to_value(r#""\u-123""#).is_err());
    assert!(StringConverter.to_value(r#""\u12g4""#).is_err());
}

#[test]
fn test_string_round_trips_escapes() {
    let text = StringConverter.to_text(&Value::Text("x\n\"y\"".into()));
    assert_eq!(text, Ok(r#""x\n\"y\"""#.to_owned()));
}

#[test]
fn test_registry_falls_back_to_text() {
    let registry = ValueConverterRegistry::with_defaults();
    assert_eq!(registry.to_value("INT", "7"), Ok(Value::Int(7)));
    assert_eq!(
        registry.to_value("QualifiedName", "a.b"),
        Ok(Value::Text("a.b".into()))
    );
    assert!(registry.get("Fraction").is_some());
    assert!(ValueConverterRegistry::empty().get("INT").is_none());
}

#[test]
fn test_unsupported_value_is_rejected() {
    assert!(IntConverter.to_text(&Value::Bool(true)).is_err());
}
