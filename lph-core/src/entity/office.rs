//! Office administration records: ledger, agenda, assets and paperwork

use serde::{Deserialize, Deserializer, Serialize};

use super::{Attribution, Entity, EntityKind};

/// One line of the running finance ledger (amounts in rupiah)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub debit: i64,
    #[serde(default)]
    pub credit: i64,
    /// Balance after this entry, fixed when the entry was posted
    #[serde(default)]
    pub balance: i64,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for FinanceEntry {
    const KIND: EntityKind = EntityKind::FinanceEntry;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Agenda item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleActivity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub delegates: Vec<String>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for ScheduleActivity {
    const KIND: EntityKind = EntityKind::ScheduleActivity;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Accept delegates either as a JSON list or as a comma-separated string
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AssetCondition {
    #[default]
    Good,
    Broken,
    Maintenance,
}

/// Office inventory item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_no: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub received_date: String,
    #[serde(default)]
    pub estimated_value: i64,
    #[serde(default)]
    pub condition: AssetCondition,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for Asset {
    const KIND: EntityKind = EntityKind::Asset;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Internal documentation (SOPs, guidelines, regulations)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub link: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LetterKind {
    #[default]
    Incoming,
    Outgoing,
}

/// Registered correspondence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub letter_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub kind: LetterKind,
    #[serde(default)]
    pub link: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for Letter {
    const KIND: EntityKind = EntityKind::Letter;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delegates_accept_csv() {
        let activity: ScheduleActivity = serde_json::from_value(json!({
            "event": "Halal Expo 2024",
            "date": "2024-03-12",
            "delegates": "Ahmad Fauzi, Dr. Khoirul,"
        }))
        .unwrap();
        assert_eq!(activity.delegates, vec!["Ahmad Fauzi", "Dr. Khoirul"]);

        let activity: ScheduleActivity = serde_json::from_value(json!({
            "delegates": ["Siti Aminah"]
        }))
        .unwrap();
        assert_eq!(activity.delegates, vec!["Siti Aminah"]);
    }

    #[test]
    fn test_letter_type_field() {
        let letter: Letter = serde_json::from_value(json!({
            "title": "Undangan Rapat BPJPH",
            "letterNumber": "045/LPH/UNISMA/III/2024",
            "type": "Outgoing"
        }))
        .unwrap();
        assert_eq!(letter.kind, LetterKind::Outgoing);

        let value = serde_json::to_value(&letter).unwrap();
        assert_eq!(value["type"], "Outgoing");
    }
}
