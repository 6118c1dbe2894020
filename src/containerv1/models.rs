/// Worker pool data models for the container-cluster API
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Network isolation of the workers in a pool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    #[default]
    Public,
    Private,
    /// Isolation string this client does not know about, empty when the API omits it
    #[serde(untagged)]
    Other(String),
}

fn unspecified_isolation() -> Isolation {
    Isolation::Other(String::new())
}

impl fmt::Display for Isolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Isolation::Public => f.write_str("public"),
            Isolation::Private => f.write_str("private"),
            Isolation::Other(isolation) => f.write_str(isolation),
        }
    }
}

impl FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Isolation::Public),
            "private" => Ok(Isolation::Private),
            other => Err(format!(
                "unknown isolation '{}', expected 'public' or 'private'",
                other
            )),
        }
    }
}

/// Lifecycle state reported by the API for a worker pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerPoolState {
    Normal,
    Resizing,
    Deleting,
    Deleted,
    /// Any state string this client does not know about yet
    #[serde(untagged)]
    Other(String),
}

impl Default for WorkerPoolState {
    fn default() -> Self {
        WorkerPoolState::Other(String::new())
    }
}

impl fmt::Display for WorkerPoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerPoolState::Normal => f.write_str("normal"),
            WorkerPoolState::Resizing => f.write_str("resizing"),
            WorkerPoolState::Deleting => f.write_str("deleting"),
            WorkerPoolState::Deleted => f.write_str("deleted"),
            WorkerPoolState::Other(state) => f.write_str(state),
        }
    }
}

/// Caller-supplied shape of a worker pool
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerPoolConfig {
    pub name: String,
    pub size: u32,
    pub machine_type: String,
    #[serde(default = "unspecified_isolation")]
    pub isolation: Isolation,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// Request body for creating a worker pool
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerPoolRequest {
    #[serde(flatten)]
    pub worker_pool_config: WorkerPoolConfig,
    pub disk_encryption: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<WorkerPoolZone>,
}

/// Worker pool as reported by the API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerPool {
    #[serde(flatten)]
    pub worker_pool_config: WorkerPoolConfig,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub state: WorkerPoolState,
    #[serde(default)]
    pub worker_version: String,
    #[serde(rename = "MasterEOS", default)]
    pub master_eos: String,
    #[serde(default)]
    pub reason_for_delete: String,
    #[serde(default)]
    pub is_balanced: bool,
    #[serde(default)]
    pub zones: Vec<ZoneResponse>,
}

/// Per-zone worker count attached to a worker pool response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneResponse {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub worker_count: u32,
}

/// VLANs used by the workers of a pool in one zone
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerPoolZoneNetwork {
    #[serde(rename = "PrivateVLAN", default)]
    pub private_vlan: String,
    #[serde(rename = "PublicVLAN", default)]
    pub public_vlan: String,
}

/// Zone attached to a worker pool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerPoolZone {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(flatten)]
    pub worker_pool_zone_network: WorkerPoolZoneNetwork,
}

/// Body of the resize PATCH
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResizeRequest {
    pub state: &'static str,
    pub size: u32,
}

/// Body of the label update PATCH
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LabelsRequest<'a> {
    pub state: &'static str,
    pub labels: &'a HashMap<String, String>,
}

/// Error document returned by the API on failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub description: String,
    #[serde(rename = "incidentID", default)]
    pub incident_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const POOL_JSON: &str = r#"{"Name":"testpool","Size":5,"MachineType": "u2c.2x4","Isolation": "public","ID":"rtr4tg5", "Region":"us-south", "State":"normal", "WorkerVersion":"1.9.0","MasterEOS":"1.9.0","ReasonForDelete":"","IsBalanced":true}"#;

    #[test]
    fn test_worker_pool_decodes_wire_fields() {
        let pool: WorkerPool = serde_json::from_str(POOL_JSON).unwrap();

        assert_eq!(pool.worker_pool_config.name, "testpool");
        assert_eq!(pool.worker_pool_config.size, 5);
        assert_eq!(pool.worker_pool_config.machine_type, "u2c.2x4");
        assert_eq!(pool.worker_pool_config.isolation, Isolation::Public);
        assert_eq!(pool.id, "rtr4tg5");
        assert_eq!(pool.region, "us-south");
        assert_eq!(pool.state, WorkerPoolState::Normal);
        assert_eq!(pool.worker_version, "1.9.0");
        assert_eq!(pool.master_eos, "1.9.0");
        assert!(pool.reason_for_delete.is_empty());
        assert!(pool.is_balanced);
        assert!(pool.zones.is_empty());
    }

    #[test]
    fn test_unknown_state_is_preserved() {
        let pool: WorkerPool = serde_json::from_value(json!({
            "Name": "p", "Size": 1, "MachineType": "b3c.4x16",
            "Isolation": "private", "ID": "x", "State": "provisioning"
        }))
        .unwrap();

        assert_eq!(
            pool.state,
            WorkerPoolState::Other("provisioning".to_string())
        );
        assert_eq!(pool.state.to_string(), "provisioning");
    }

    #[test]
    fn test_request_flattens_config() {
        let request = WorkerPoolRequest {
            worker_pool_config: WorkerPoolConfig {
                name: "test-pool".to_string(),
                size: 5,
                machine_type: "u2c.2x4".to_string(),
                isolation: Isolation::Public,
                labels: HashMap::new(),
            },
            disk_encryption: true,
            zones: vec![],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "Name": "test-pool",
                "Size": 5,
                "MachineType": "u2c.2x4",
                "Isolation": "public",
                "DiskEncryption": true
            })
        );
    }

    #[test]
    fn test_zone_flattens_network() {
        let zone = WorkerPoolZone {
            id: "dal10".to_string(),
            worker_pool_zone_network: WorkerPoolZoneNetwork {
                private_vlan: "12345".to_string(),
                public_vlan: "43215".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&zone).unwrap(),
            json!({"ID": "dal10", "PrivateVLAN": "12345", "PublicVLAN": "43215"})
        );
    }

    #[test]
    fn test_worker_pool_decodes_labels_and_zones() {
        let pool: WorkerPool = serde_json::from_value(json!({
            "Name": "p", "Size": 3, "MachineType": "b3c.4x16", "Isolation": "public",
            "ID": "x", "State": "normal",
            "Labels": {"team": "storage"},
            "Zones": [{"ID": "dal10", "WorkerCount": 3}]
        }))
        .unwrap();

        assert_eq!(
            pool.worker_pool_config.labels,
            HashMap::from([("team".to_string(), "storage".to_string())])
        );
        assert_eq!(
            pool.zones,
            vec![ZoneResponse {
                id: "dal10".to_string(),
                worker_count: 3,
            }]
        );
    }

    #[test]
    fn test_odd_isolation_does_not_fail_decode() {
        let empty: WorkerPool = serde_json::from_value(json!({
            "Name": "p", "Size": 1, "MachineType": "m", "Isolation": "", "ID": "x"
        }))
        .unwrap();
        assert_eq!(
            empty.worker_pool_config.isolation,
            Isolation::Other(String::new())
        );

        let missing: WorkerPool = serde_json::from_value(json!({
            "Name": "p", "Size": 1, "MachineType": "m", "ID": "x"
        }))
        .unwrap();
        assert_eq!(
            missing.worker_pool_config.isolation,
            Isolation::Other(String::new())
        );

        let dedicated: Isolation = serde_json::from_value(json!("dedicated")).unwrap();
        assert_eq!(dedicated.to_string(), "dedicated");
    }

    #[test]
    fn test_zone_vlans_default_to_empty() {
        let zone: WorkerPoolZone = serde_json::from_value(json!({"ID": "dal10"})).unwrap();

        assert_eq!(zone.worker_pool_zone_network, WorkerPoolZoneNetwork::default());
    }

    #[test]
    fn test_isolation_from_str() {
        assert_eq!("private".parse::<Isolation>(), Ok(Isolation::Private));
        assert_eq!("PUBLIC".parse::<Isolation>(), Ok(Isolation::Public));
        assert!("dedicated".parse::<Isolation>().is_err());
    }
}
