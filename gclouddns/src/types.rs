//! Cloud DNS v1 REST resources

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ManagedZone {
    /// Opaque name used in API paths
    pub name: String,
    /// Zone suffix, always ending in a dot
    pub dns_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManagedZonesListResponse {
    #[serde(default)]
    pub managed_zones: Vec<ManagedZone>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    #[serde(default)]
    pub rrdatas: Vec<String>,
}

impl ResourceRecordSet {
    pub fn txt(name: &str, value: &str, ttl: u32) -> Self {
        Self {
            name: name.to_string(),
            record_type: "TXT".to_string(),
            ttl,
            rrdatas: vec![value.to_string()],
        }
    }

    pub fn is_txt(&self) -> bool {
        self.record_type == "TXT"
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceRecordSetsListResponse {
    #[serde(default)]
    pub rrsets: Vec<ResourceRecordSet>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Done,
    #[default]
    #[serde(other)]
    Other,
}

/// An atomic batch of additions and deletions applied to a zone
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additions: Vec<ResourceRecordSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletions: Vec<ResourceRecordSet>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing)]
    pub status: ChangeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl Change {
    pub fn addition(record: ResourceRecordSet) -> Self {
        Self {
            additions: vec![record],
            ..Default::default()
        }
    }

    pub fn deletion(record: ResourceRecordSet) -> Self {
        Self {
            deletions: vec![record],
            ..Default::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_addition() {
        let change = Change::addition(ResourceRecordSet::txt(
            "_acme-challenge.example.com.",
            "abc",
            120,
        ));
        let encoded = serde_json::to_value(&change).unwrap();
        assert_eq!(
            serde_json::json!({
                "additions": [{
                    "name": "_acme-challenge.example.com.",
                    "type": "TXT",
                    "ttl": 120,
                    "rrdatas": ["abc"],
                }]
            }),
            encoded
        );
    }

    #[test]
    fn test_deserialize_change_status() {
        let change: Change =
            serde_json::from_str(r#"{"id": "7", "status": "done", "kind": "dns#change"}"#).unwrap();
        assert_eq!("7", change.id);
        assert_eq!(ChangeStatus::Done, change.status);
        assert!(!change.is_pending());

        let change: Change = serde_json::from_str(r#"{"id": "8", "status": "pending"}"#).unwrap();
        assert!(change.is_pending());

        let change: Change = serde_json::from_str(r#"{"id": "9", "status": "applied"}"#).unwrap();
        assert_eq!(ChangeStatus::Other, change.status);
        assert!(!change.is_pending());
    }

    #[test]
    fn test_deserialize_zones_without_list() {
        let response: ManagedZonesListResponse =
            serde_json::from_str(r#"{"kind": "dns#managedZonesListResponse"}"#).unwrap();
        assert!(response.managed_zones.is_empty());
        assert!(response.next_page_token.is_none());
    }
}
