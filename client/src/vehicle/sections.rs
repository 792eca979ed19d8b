use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use shared::types::VehicleRecord;

// ---------------------------------------------------------------------------
// Section table
// ---------------------------------------------------------------------------

/// Display sections, in output order. `Other` is the catch-all and owns no
/// keys of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Owner,
    Rc,
    Vehicle,
    Insurance,
    Puc,
    Loan,
    Permit,
    Other,
}

const OWNER_KEYS: &[&str] = &[
    "owner",
    "ownerFatherName",
    "mobileNumber",
    "presentAddress",
    "permanentAddress",
    "ownerCount",
];

const RC_KEYS: &[&str] = &[
    "regNo",
    "vehicleNumber",
    "status",
    "statusAsOn",
    "regAuthority",
    "regDate",
    "rcExpiryDate",
    "vehicleTaxUpto",
    "nocDetails",
    "blacklistStatus",
    "blacklistDetails",
    "dbResult",
    "partialData",
];

const VEHICLE_KEYS: &[&str] = &[
    "vehicleClass",
    "chassis",
    "engine",
    "vehicleManufacturerName",
    "model",
    "vehicleColour",
    "type",
    "normsType",
    "bodyType",
    "vehicleCubicCapacity",
    "grossVehicleWeight",
    "unladenWeight",
    "vehicleCategory",
    "vehicleCylindersNo",
    "vehicleSeatCapacity",
    "vehicleSleeperCapacity",
    "vehicleStandingCapacity",
    "wheelbase",
    "electricVehicle",
    "rtoCode",
];

const INSURANCE_KEYS: &[&str] = &[
    "vehicleInsuranceCompanyName",
    "vehicleInsuranceUpto",
    "vehicleInsurancePolicyNumber",
];

const PUC_KEYS: &[&str] = &["puccNumber", "puccUpto"];

const LOAN_KEYS: &[&str] = &["rcFinancer", "financed"];

const PERMIT_KEYS: &[&str] = &[
    "permitIssueDate",
    "permitNumber",
    "permitType",
    "permitValidFrom",
    "permitValidUpto",
    "nationalPermitNumber",
    "nationalPermitUpto",
    "nationalPermitIssuedBy",
    "nonUseStatus",
    "nonUseFrom",
    "nonUseTo",
];

impl SectionId {
    pub const ALL: [SectionId; 8] = [
        Self::Owner,
        Self::Rc,
        Self::Vehicle,
        Self::Insurance,
        Self::Puc,
        Self::Loan,
        Self::Permit,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Rc => "rc",
            Self::Vehicle => "vehicle",
            Self::Insurance => "insurance",
            Self::Puc => "puc",
            Self::Loan => "loan",
            Self::Permit => "permit",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Owner => "Owner Identity",
            Self::Rc => "Registration (RC)",
            Self::Vehicle => "Vehicle Specs",
            Self::Insurance => "Insurance",
            Self::Puc => "PUC",
            Self::Loan => "Loan / Finances",
            Self::Permit => "Permit",
            Self::Other => "Other",
        }
    }

    /// Keys assigned to this section, in display order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Owner => OWNER_KEYS,
            Self::Rc => RC_KEYS,
            Self::Vehicle => VEHICLE_KEYS,
            Self::Insurance => INSURANCE_KEYS,
            Self::Puc => PUC_KEYS,
            Self::Loan => LOAN_KEYS,
            Self::Permit => PERMIT_KEYS,
            Self::Other => &[],
        }
    }

    /// The section a key is assigned to, `Other` when it is in no table.
    pub fn for_key(key: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.keys().contains(&key))
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| format!("unknown section: {}", s.trim()))
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub fields: VehicleRecord,
}

impl Section {
    pub fn label(&self) -> &'static str {
        self.id.label()
    }
}

/// Non-empty sections in table order, `Other` last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections(Vec<Section>);

impl Sections {
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.0.iter()
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.0.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> Vec<SectionId> {
        self.0.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of fields across all sections.
    pub fn field_count(&self) -> usize {
        self.0.iter().map(|s| s.fields.len()).sum()
    }

    /// Keep only `id`.
    pub fn only(self, id: SectionId) -> Self {
        Self(self.0.into_iter().filter(|s| s.id == id).collect())
    }

    /// Keep fields for which `keep` holds; sections left empty are dropped.
    pub fn retain_fields(self, mut keep: impl FnMut(&str, &Value) -> bool) -> Self {
        Self(
            self.0
                .into_iter()
                .filter_map(|mut section| {
                    section.fields.retain(|k, v| keep(k, v));
                    (!section.fields.is_empty()).then_some(section)
                })
                .collect(),
        )
    }
}

impl IntoIterator for Sections {
    type Item = Section;
    type IntoIter = std::vec::IntoIter<Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Split a flat record into display sections.
///
/// Walks the section table in declaration order, moving each present key
/// into its section; whatever is left lands in `Other` in input order.
/// Every input key ends up in exactly one section and empty sections are
/// omitted.
pub fn group_by_section(record: &VehicleRecord) -> Sections {
    let mut assigned: HashSet<&str> = HashSet::new();
    let mut sections = Vec::new();

    for id in SectionId::ALL.iter().copied().filter(|id| *id != SectionId::Other) {
        let mut fields = VehicleRecord::new();
        for key in id.keys() {
            if let Some(value) = record.get(*key) {
                fields.insert((*key).to_string(), value.clone());
                assigned.insert(*key);
            }
        }
        if !fields.is_empty() {
            sections.push(Section { id, fields });
        }
    }

    let other: VehicleRecord = record
        .iter()
        .filter(|(key, _)| !assigned.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if !other.is_empty() {
        sections.push(Section {
            id: SectionId::Other,
            fields: other,
        });
    }

    Sections(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> VehicleRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn groups_known_and_unknown_keys() {
        let sections = group_by_section(&record(json!({
            "owner": "A",
            "puccNumber": "X",
            "foo": "bar"
        })));

        assert_eq!(sections.ids(), vec![SectionId::Owner, SectionId::Puc, SectionId::Other]);
        assert_eq!(sections.get(SectionId::Owner).unwrap().fields, record(json!({"owner": "A"})));
        assert_eq!(sections.get(SectionId::Puc).unwrap().fields, record(json!({"puccNumber": "X"})));
        assert_eq!(sections.get(SectionId::Other).unwrap().fields, record(json!({"foo": "bar"})));
    }

    #[test]
    fn section_order_ignores_input_order() {
        let sections = group_by_section(&record(json!({
            "permitType": "NP",
            "financed": true,
            "regNo": "MH01",
            "owner": "B"
        })));

        assert_eq!(
            sections.ids(),
            vec![SectionId::Owner, SectionId::Rc, SectionId::Loan, SectionId::Permit]
        );
    }

    #[test]
    fn other_keeps_input_order() {
        let sections = group_by_section(&record(json!({"zeta": 1, "alpha": 2, "mid": 3})));
        let keys: Vec<_> = sections.get(SectionId::Other).unwrap().fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn empty_record_has_no_sections() {
        assert!(group_by_section(&VehicleRecord::new()).is_empty());
    }

    #[test]
    fn null_values_are_still_assigned() {
        let sections = group_by_section(&record(json!({"rcFinancer": null})));
        assert_eq!(sections.ids(), vec![SectionId::Loan]);
    }

    #[test]
    fn keys_belong_to_one_table_only() {
        let mut seen = HashSet::new();
        for id in SectionId::ALL {
            for key in id.keys() {
                assert!(seen.insert(*key), "{} listed twice", key);
            }
        }
    }

    #[test]
    fn section_ids_parse() {
        assert_eq!("Insurance".parse::<SectionId>(), Ok(SectionId::Insurance));
        assert_eq!(" rc ".parse::<SectionId>(), Ok(SectionId::Rc));
        assert!("engine".parse::<SectionId>().is_err());
        assert_eq!(SectionId::for_key("chassis"), SectionId::Vehicle);
        assert_eq!(SectionId::for_key("whatever"), SectionId::Other);
    }

    #[test]
    fn retain_drops_emptied_sections() {
        let sections = group_by_section(&record(json!({"owner": "A", "regNo": "B"})))
            .retain_fields(|k, _| k == "regNo");
        assert_eq!(sections.ids(), vec![SectionId::Rc]);
    }
}
