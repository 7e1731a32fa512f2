use heavyai_sql::quote_identifier;
use heavyai_sql::sql_generator::sanitize::{is_reserved, safe_ident};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_quoting_is_idempotent(name in "\\PC{1,40}") {
        let once = quote_identifier(&name);
        prop_assert_eq!(quote_identifier(&once), once.clone());
    }

    #[test]
    fn prop_plain_identifiers_stay_bare(name in "[a-z][a-z0-9_]{0,20}") {
        prop_assume!(!is_reserved(&name));
        prop_assert_eq!(quote_identifier(&name), name);
    }
}

#[test]
fn test_quoting_rules() {
    assert_eq!(quote_identifier("select"), "\"select\"");
    assert_eq!(quote_identifier("Count"), "\"Count\"");
    assert_eq!(quote_identifier("my col"), "\"my col\"");
    assert_eq!(quote_identifier("1st"), "\"1st\"");
    assert_eq!(quote_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(quote_identifier("\"already\""), "\"already\"");
}

#[test]
fn test_invalid_identifiers() {
    assert!(safe_ident("").is_err());
    assert!(safe_ident(&"x".repeat(129)).is_err());
    assert!(safe_ident("nul\0byte").is_err());
    assert_eq!(safe_ident(&"x".repeat(128)).unwrap().len(), 128);
}
