//! Staff, auditors and partner organisations

use serde::{Deserialize, Serialize};

use super::{Attribution, Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalMember {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for InternalMember {
    const KIND: EntityKind = EntityKind::InternalMember;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auditor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub cert_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for Auditor {
    const KIND: EntityKind = EntityKind::Auditor;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partner organisation; `full_name` holds the organisation name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    /// Agreement reference (MoU, partnership scheme)
    #[serde(default)]
    pub cert: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for Partner {
    const KIND: EntityKind = EntityKind::Partner;

    fn id(&self) -> &str {
        &self.id
    }
}
