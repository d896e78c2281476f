//! Business records across the certification pipeline

use serde::{Deserialize, Serialize};

use super::{Attribution, Entity, EntityKind};

/// Business holding a valid halal certificate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedBusiness {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub reg_no: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub business_address: String,
    #[serde(default)]
    pub production_address: String,
    #[serde(default)]
    pub nib: String,
    #[serde(default)]
    pub halal_id: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for CertifiedBusiness {
    const KIND: EntityKind = EntityKind::CertifiedBusiness;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Business whose certification is under way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProcessBusiness {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub reg_no: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social_media: String,
    #[serde(default)]
    pub business_address: String,
    #[serde(default)]
    pub production_address: String,
    #[serde(default)]
    pub nib: String,
    /// Free-form pipeline stage, e.g. "Audit Lapangan"
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for InProcessBusiness {
    const KIND: EntityKind = EntityKind::InProcessBusiness;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Lead that has not applied yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectBusiness {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub wa_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social_media: String,
    #[serde(default)]
    pub follow_up_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl Entity for ProspectBusiness {
    const KIND: EntityKind = EntityKind::ProspectBusiness;

    fn id(&self) -> &str {
        &self.id
    }
}
