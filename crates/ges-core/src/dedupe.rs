//! Collapse load-file records to one per (identifier, procedure code).

use std::collections::{HashMap, HashSet};

use ges_model::{Identifier, OutputRecord};

/// Keep the most recent record per procedure code within one identifier's
/// records.
///
/// Records are ordered newest first; unparseable dates count as the
/// earliest and ties keep their input order.
pub fn dedupe_latest(mut records: Vec<OutputRecord>) -> Vec<OutputRecord> {
    records.sort_by(|left, right| right.date.cmp(&left.date));
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.code.clone()));
    records
}

/// Group records by identifier in order of first appearance and apply
/// [`dedupe_latest`] to each group.
pub fn dedupe_by_identifier(records: Vec<OutputRecord>) -> Vec<OutputRecord> {
    let mut positions: HashMap<Identifier, usize> = HashMap::new();
    let mut groups: Vec<Vec<OutputRecord>> = Vec::new();
    for record in records {
        let position = *positions.entry(record.identifier).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[position].push(record);
    }
    groups.into_iter().flat_map(dedupe_latest).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ges_model::{Condition, ProcedureCode};

    fn record(id: &str, code: &str, date: Option<(i32, u32, u32)>, specialty: &str) -> OutputRecord {
        let date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        OutputRecord {
            date,
            date_text: date.map(|d| d.format("%d-%m-%Y").to_string()).unwrap_or_default(),
            identifier: id.parse().expect("identifier"),
            code: ProcedureCode::new(code).expect("code"),
            condition: Condition::Asthma,
            family_code: "61".to_string(),
            specialty: specialty.to_string(),
        }
    }

    #[test]
    fn keeps_latest_per_code() {
        let records = vec![
            record("11111111-1", "0101113", Some((2025, 1, 1)), "07-102-0"),
            record("11111111-1", "0101113", Some((2025, 1, 15)), "07-102-2"),
            record("11111111-1", "3902001", Some((2025, 1, 3)), "07-102-0"),
        ];
        let deduped = dedupe_latest(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].date_text, "15-01-2025");
        assert_eq!(deduped[0].specialty, "07-102-2");
        assert_eq!(deduped[1].code.as_str(), "3902001");
    }

    #[test]
    fn unparseable_dates_lose_and_ties_keep_input_order() {
        let records = vec![
            record("11111111-1", "0101113", None, "first"),
            record("11111111-1", "0101113", Some((2025, 2, 1)), "second"),
            record("11111111-1", "3902001", Some((2025, 2, 1)), "third"),
            record("11111111-1", "3902001", Some((2025, 2, 1)), "fourth"),
        ];
        let deduped = dedupe_latest(records);
        let specialties: Vec<&str> = deduped.iter().map(|r| r.specialty.as_str()).collect();
        assert_eq!(specialties, vec!["second", "third"]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let records = vec![
            record("22222222-2", "0101113", Some((2025, 1, 1)), "a"),
            record("11111111-1", "0101113", Some((2025, 1, 1)), "b"),
            record("22222222-2", "0101113", Some((2025, 3, 1)), "c"),
        ];
        let deduped = dedupe_by_identifier(records);
        let specialties: Vec<&str> = deduped.iter().map(|r| r.specialty.as_str()).collect();
        assert_eq!(specialties, vec!["c", "b"]);
    }
}
