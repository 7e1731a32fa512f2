use heavyai_sql::{DataType, DialectType, SqlGenError, TypeName};
use proptest::prelude::*;

fn any_typename() -> impl Strategy<Value = TypeName> {
    proptest::sample::select(TypeName::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_dialect_type_round_trips(typename in any_typename(), nullable in any::<bool>()) {
        let original = DialectType::new(typename.as_str(), nullable).unwrap();
        let host = original.to_data_type();
        prop_assert_eq!(DialectType::from_data_type(&host, nullable).unwrap(), original);
        prop_assert_eq!(DialectType::parse(&original.to_string()).unwrap(), original);
    }

    #[test]
    fn prop_names_round_trip(typename in any_typename()) {
        let name = typename.as_str();
        prop_assert_eq!(DialectType::from_name(name).unwrap().to_name(), name);
        prop_assert_eq!(host_name_round_trip(name), name);
    }
}

fn host_name_round_trip(name: &str) -> &'static str {
    let host = DialectType::from_name(name).unwrap().to_data_type();
    host.dialect_name().unwrap()
}

#[test]
fn test_aliases_resolve_to_canonical_names() {
    for (alias, canonical) in [
        ("numeric", TypeName::Decimal),
        ("BOOLEAN", TypeName::Bool),
        ("integer", TypeName::Int),
        ("text", TypeName::Str),
        ("Varchar", TypeName::Str),
    ] {
        assert_eq!(DialectType::new(alias, false).unwrap().typename(), canonical);
    }
    // Aliases are accepted on input only.
    assert_eq!(DialectType::new("NUMERIC", true).unwrap().to_string(), "Nullable(DECIMAL)");
}

#[test]
fn test_unknown_type_names() {
    assert_eq!(
        DialectType::new("GEOGRAPHY", true).unwrap_err(),
        SqlGenError::UnsupportedType {
            token: "GEOGRAPHY".to_string()
        }
    );
    assert!(DialectType::from_data_type(&DataType::Binary, true).is_err());
}

#[test]
fn test_decimal_details_from_server() {
    let decimal = DialectType::new("DECIMAL", true).unwrap();
    assert_eq!(decimal.to_data_type(), DataType::decimal());
    assert_eq!(
        decimal.to_data_type_with(10, 2),
        DataType::Decimal {
            precision: 10,
            scale: 2
        }
    );
    assert_eq!(decimal.to_data_type_with(0, 0), DataType::decimal());

    let field = decimal.to_field("price");
    assert_eq!(field.name, "price");
    assert!(field.nullable);
}
