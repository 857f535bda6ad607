//! Tests for ges-model types.

use chrono::NaiveDate;
use proptest::prelude::*;

use ges_model::{
    Condition, Identifier, OutputRecord, ProcedureCode, RawIdentifier, normalize_code,
};

proptest! {
    #[test]
    fn check_character_case_is_irrelevant(body in 1u64..99_999_999, check in "[0-9kK]") {
        let lower = Identifier::normalize(&body.to_string(), &check.to_lowercase());
        let upper = Identifier::normalize(&body.to_string(), &check.to_uppercase());
        prop_assert!(lower.is_some());
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn combined_and_split_forms_agree(body in 1u64..99_999_999, check in "[0-9kK]") {
        let split = Identifier::normalize(&body.to_string(), &check);
        let combined = Identifier::parse_combined(&format!("{body}-{check}"));
        prop_assert_eq!(split, combined);
    }

    #[test]
    fn six_digit_codes_gain_a_leading_zero(code in "[0-9]{6}") {
        let normalized = normalize_code(&code);
        prop_assert_eq!(normalized.len(), 7);
        prop_assert!(normalized.starts_with('0'));
        prop_assert!(normalized.ends_with(code.as_str()));
    }

    #[test]
    fn seven_digit_codes_are_unchanged(code in "[0-9]{7}") {
        prop_assert_eq!(normalize_code(&code), code);
    }
}

#[test]
fn canonical_string_round_trips() {
    let id: Identifier = "7654321-k".parse().expect("parse identifier");
    assert_eq!(id.canonical_string(), "7654321-K");
    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, "\"7654321-K\"");
    let back: Identifier = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, id);
}

#[test]
fn raw_identifier_prefers_split_columns() {
    let split = RawIdentifier::split("12345678", "k");
    assert_eq!(split.identifier().map(|id| id.to_string()), Some("12345678-K".into()));

    let combined = RawIdentifier::combined("12345678-k");
    assert_eq!(combined.identifier(), split.identifier());

    let bare = RawIdentifier::combined("12345678");
    assert!(bare.identifier().is_none());
    assert_eq!(bare.body_number(), Some(12_345_678));
}

#[test]
fn output_record_cells_follow_load_file_order() {
    let record = OutputRecord {
        date: NaiveDate::from_ymd_opt(2025, 1, 15),
        date_text: "15-01-2025".to_string(),
        identifier: Identifier::normalize("12345678", "5").expect("id"),
        code: ProcedureCode::new("101113").expect("code"),
        condition: Condition::Asthma,
        family_code: Condition::Asthma.family_code().to_string(),
        specialty: "07-102-0".to_string(),
    };
    assert_eq!(
        record.cells(),
        [
            "15-01-2025".to_string(),
            "12345678".to_string(),
            "5".to_string(),
            "0101113".to_string(),
            "AUGE".to_string(),
            "61".to_string(),
            "07-102-0".to_string(),
        ]
    );
}

#[test]
fn output_record_serializes_iso_dates() {
    let record = OutputRecord {
        date: NaiveDate::from_ymd_opt(2025, 3, 2),
        date_text: "02-03-2025".to_string(),
        identifier: Identifier::normalize("11111111", "1").expect("id"),
        code: ProcedureCode::new("0101110").expect("code"),
        condition: Condition::Epoc,
        family_code: Condition::Epoc.family_code().to_string(),
        specialty: "07-102-0".to_string(),
    };
    let json = serde_json::to_value(&record).expect("serialize");
    assert_eq!(json["date"], "2025-03-02");

    let back: OutputRecord = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, record);

    let undated = OutputRecord { date: None, ..record };
    let json = serde_json::to_value(&undated).expect("serialize");
    assert!(json["date"].is_null());
}
