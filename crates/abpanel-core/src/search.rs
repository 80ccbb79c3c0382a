//! Stateless query helpers over the inventory.

use abpanel_model::{ReagentRecord, StainType};

/// Key used by the name-uniqueness indexes.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive substring match against antigen, metal or clone.
/// An empty query matches everything.
pub fn matches_query(record: &ReagentRecord, query: &str) -> bool {
    let query = query.to_lowercase();
    record.antigen.to_lowercase().contains(&query)
        || record.metal.to_lowercase().contains(&query)
        || record.clone.to_lowercase().contains(&query)
}

/// Leading integer of a metal label: "170Er" is 170, "Er170" is 0.
pub fn numeric_prefix(metal: &str) -> u32 {
    let digits: String = metal.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Display ordering: antigen (case-insensitive), then metal mass.
pub fn sort_key(record: &ReagentRecord) -> (String, u32) {
    (record.antigen.to_lowercase(), numeric_prefix(&record.metal))
}

/// Sorts by [`sort_key`]; ties keep their relative order.
pub fn sort_records(records: &mut [&ReagentRecord]) {
    records.sort_by_cached_key(|record| sort_key(record));
}

/// Records matching `query`, optionally only low-stock ones, in display order.
pub fn filter_inventory<'a>(
    records: &'a [ReagentRecord],
    query: &str,
    low_stock_only: bool,
) -> Vec<&'a ReagentRecord> {
    let mut found: Vec<&ReagentRecord> = records
        .iter()
        .filter(|record| matches_query(record, query))
        .filter(|record| !low_stock_only || record.is_low_stock())
        .collect();
    sort_records(&mut found);
    found
}

/// Reagents split into staining sections, order preserved within each.
#[derive(Debug, Default, PartialEq)]
pub struct StainGroups<'a> {
    pub extracellular: Vec<&'a ReagentRecord>,
    pub intracellular: Vec<&'a ReagentRecord>,
}

pub fn group_by_stain<'a>(records: &[&'a ReagentRecord]) -> StainGroups<'a> {
    let mut groups = StainGroups::default();
    for &record in records {
        match record.stain_type {
            StainType::Extracellular => groups.extracellular.push(record),
            StainType::Intracellular => groups.intracellular.push(record),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use abpanel_model::ReagentId;

    fn record(id: u64, antigen: &str, clone: &str, metal: &str) -> ReagentRecord {
        ReagentRecord {
            id: ReagentId::new(id),
            antigen: antigen.to_string(),
            clone: clone.to_string(),
            metal: metal.to_string(),
            concentration: 0.5,
            antibody_per_test: 1.0,
            volume_per_test: 2.0,
            stock_volume: 100.0,
            notes: String::new(),
            date_conjugated: String::new(),
            alert_threshold: 50.0,
            stain_type: StainType::Extracellular,
        }
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("170Er"), 170);
        assert_eq!(numeric_prefix("89Y"), 89);
        assert_eq!(numeric_prefix("Er170"), 0);
        assert_eq!(numeric_prefix(""), 0);
    }

    #[test]
    fn test_matches_query_any_field() {
        let ab = record(1, "CD3", "UCHT1", "170Er");
        assert!(matches_query(&ab, "cd3"));
        assert!(matches_query(&ab, "ucht"));
        assert!(matches_query(&ab, "er"));
        assert!(matches_query(&ab, ""));
        assert!(!matches_query(&ab, "cd4"));
    }

    #[test]
    fn test_sort_by_antigen_then_mass() {
        let records = vec![
            record(1, "cd4", "a", "145Nd"),
            record(2, "CD3", "b", "170Er"),
            record(3, "CD3", "c", "141Pr"),
            record(4, "CD3", "d", "Qdot"),
        ];
        let sorted = filter_inventory(&records, "", false);
        let ids: Vec<u64> = sorted.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, [4, 3, 2, 1]);
    }

    #[test]
    fn test_group_by_stain() {
        let mut intra = record(2, "IFNg", "B27", "165Ho");
        intra.stain_type = StainType::Intracellular;
        let surface = record(1, "CD3", "UCHT1", "170Er");
        let groups = group_by_stain(&[&surface, &intra]);
        assert_eq!(groups.extracellular.len(), 1);
        assert_eq!(groups.intracellular[0].antigen, "IFNg");
    }
}
