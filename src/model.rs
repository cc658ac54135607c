//! Wire types for the WEAPM-LOGSERVER API.
//!
//! Field names follow the server exactly, including its mixed casing and
//! the `updateime` spelling on node records. Response types default every
//! field so partial payloads still decode.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Common response wrapper: `{ "code": 0, "message": "...", "result": ... }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ApiEnvelope {
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/* ---- Dashboard ---- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardResult {
    #[serde(rename = "subsystemCount")]
    pub subsystem_count: i64,
    #[serde(rename = "clusterNum")]
    pub cluster_num: i64,
    #[serde(rename = "clusterTrafficData")]
    pub cluster_traffic_data: Vec<ClusterTrafficData>,
    #[serde(rename = "topSubsystems")]
    pub top_subsystems: Vec<SubsystemLogDetail>,
    #[serde(rename = "clusterLogCounts")]
    pub cluster_log_counts: Vec<ClusterLogCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterTrafficData {
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
    #[serde(rename = "trafficBytes")]
    pub traffic_bytes: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemLogDetail {
    pub department: String,
    pub subsys_name: String,
    pub business_owner: String,
    pub subsystem_owner: String,
    pub subsys_id: String,
    pub cluster_name: String,
    pub total_log_mb: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterLogCount {
    #[serde(rename = "clustername")]
    pub cluster_name: String,
    pub total_log_gb: i64,
    pub capacity: i64,
}

/* ---- Clusters ---- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogClusterInfo {
    #[serde(rename = "clustername")]
    pub cluster_name: String,
    /// 1 for the default cluster.
    #[serde(rename = "isdefault")]
    pub is_default: i64,
    pub topic: String,
    #[serde(rename = "bucketnames")]
    pub bucket_names: String,
    #[serde(rename = "backenddomain")]
    pub backend_domain: String,
    #[serde(rename = "storagedomain")]
    pub storage_domain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogStoreInstance {
    pub address: String,
    #[serde(rename = "clustername")]
    pub cluster_name: String,
    pub role: String,
    pub topic: String,
    #[serde(rename = "bucketnames")]
    pub bucket_names: String,
    #[serde(rename = "backenddomain")]
    pub backend_domain: String,
    #[serde(rename = "storagedomain")]
    pub storage_domain: String,
    #[serde(rename = "isdefault")]
    pub is_default: bool,
    pub status: String,
    #[serde(rename = "cpulimit")]
    pub cpu_limit: String,
    #[serde(rename = "memlimit")]
    pub mem_limit: String,
    #[serde(rename = "createtime")]
    pub create_time: String,
    #[serde(rename = "updateime")]
    pub update_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDetailResult {
    #[serde(rename = "clusterInfo")]
    pub cluster_info: LogClusterInfo,
    #[serde(rename = "nodeGroups")]
    pub node_groups: Vec<NodeGroup>,
    #[serde(rename = "managedSubSystems")]
    pub managed_sub_systems: Vec<LogSubClusterSubSystem>,
    #[serde(rename = "reportData")]
    pub report_data: ClusterReportData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGroup {
    pub role: String,
    pub nodes: Vec<LogStoreInstance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterReportData {
    #[serde(rename = "peakTraffic")]
    pub peak_traffic: i64,
    #[serde(rename = "peakTime")]
    pub peak_time: String,
    #[serde(rename = "totalSubSystems")]
    pub total_sub_systems: i64,
    #[serde(rename = "topicBacklog")]
    pub topic_backlog: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSubClusterSubSystem {
    #[serde(rename = "clustername")]
    pub cluster_name: String,
    #[serde(rename = "subsystemid")]
    pub subsystem_id: String,
    pub subsys_name: String,
    pub subsystem_owner: String,
    pub business_owner: String,
    #[serde(rename = "devdept")]
    pub dev_dept: String,
    pub traffic: i64,
    pub status: String,
    #[serde(rename = "createtime")]
    pub create_time: String,
    #[serde(rename = "updatetime")]
    pub update_time: String,
}

/// Body of `POST /operation/clusters/{name}/nodes`.
///
/// `address`, `clustername` and `role` are required by the server; the rest
/// are omitted when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddClusterNodeRequest {
    pub address: String,
    #[serde(rename = "clustername")]
    pub cluster_name: String,
    pub role: String,
    #[serde(rename = "cpulimit", skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,
    #[serde(rename = "memlimit", skip_serializing_if = "Option::is_none")]
    pub mem_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(rename = "bucketnames", skip_serializing_if = "Option::is_none")]
    pub bucket_names: Option<String>,
    #[serde(rename = "backenddomain", skip_serializing_if = "Option::is_none")]
    pub backend_domain: Option<String>,
    #[serde(rename = "storagedomain", skip_serializing_if = "Option::is_none")]
    pub storage_domain: Option<String>,
    #[serde(rename = "isdefault", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "createtime", skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(rename = "updateime", skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl AddClusterNodeRequest {
    pub fn new(address: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            role: role.into(),
            ..Default::default()
        }
    }
}

/* ---- Subsystems ---- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubSystem {
    pub id: i64,
    pub subsys_id: String,
    pub subsys_name: String,
    pub subsys_chtname: String,
    pub subsys_updtime: String,
    #[serde(rename = "devdept")]
    pub dev_dept: String,
    pub business_owner: String,
    pub subsystem_owner: String,
    pub system_name: String,
    pub state: String,
    pub important_level: String,
    pub create_topic: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemExistsResult {
    #[serde(rename = "subsystemId")]
    pub subsystem_id: String,
    pub exists: bool,
    #[serde(rename = "subsystemName")]
    pub subsystem_name: String,
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemDetailResult {
    #[serde(rename = "subsystemInfo")]
    pub subsystem_info: SubSystem,
    pub collected: bool,
    #[serde(rename = "scanFileWhitelist")]
    pub scan_file_whitelist: Vec<String>,
    #[serde(rename = "expectedTraffic")]
    pub expected_traffic: i64,
    #[serde(rename = "actualTraffic")]
    pub actual_traffic: i64,
    #[serde(rename = "keywordFilters")]
    pub keyword_filters: Vec<String>,
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
    /// One map per instance group: label -> host list.
    pub instances: Vec<BTreeMap<String, Vec<String>>>,
}

/// Body of `POST /operation/subsystem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddSubsystemRequest {
    #[serde(rename = "subSystemId")]
    pub sub_system_id: String,
    #[serde(rename = "logImportValue")]
    pub log_import_value: String,
    #[serde(rename = "logImportFiles")]
    pub log_import_files: String,
    pub traffic: i64,
    pub cluster: String,
}

/// Query parameters for moving a subsystem to another cluster.
#[derive(Debug, Clone, Default)]
pub struct AdjustClusterParams {
    pub target_cluster_name: String,
    pub log_import_value: String,
    pub log_import_files: String,
    pub traffic: i64,
}

impl AdjustClusterParams {
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("targetClusterName".into(), self.target_cluster_name.clone()),
            ("logImportValue".into(), self.log_import_value.clone()),
            ("logImportFiles".into(), self.log_import_files.clone()),
            ("traffic".into(), self.traffic.to_string()),
        ]
    }
}

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Filters for `GET /operation/subsystems/search`.
#[derive(Debug, Clone)]
pub struct SearchSubsystemsRequest {
    pub subsys_id: Option<String>,
    pub limit: u32,
}

impl Default for SearchSubsystemsRequest {
    fn default() -> Self {
        Self {
            subsys_id: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchSubsystemsRequest {
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(id) = self.subsys_id.as_deref().map(str::trim)
            && !id.is_empty()
        {
            pairs.push(("subsysId".into(), id.to_string()));
        }
        let limit = if self.limit == 0 {
            DEFAULT_SEARCH_LIMIT
        } else {
            self.limit
        };
        pairs.push(("limit".into(), limit.to_string()));
        pairs
    }
}

/// Target state for `POST /operation/subsystem/{id}/status/{status}`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsystemStatus {
    Enable,
    Disable,
}

impl SubsystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsystemStatus::Enable => "enable",
            SubsystemStatus::Disable => "disable",
        }
    }
}

impl fmt::Display for SubsystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_request_omits_unset_optionals() {
        let mut req = AddClusterNodeRequest::new("127.0.0.2", "write");
        req.cluster_name = "LOG008".into();
        req.cpu_limit = Some("8".into());
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "address": "127.0.0.2",
                "clustername": "LOG008",
                "role": "write",
                "cpulimit": "8"
            })
        );
    }

    #[test]
    fn node_record_keeps_server_spelling() {
        let node: LogStoreInstance = serde_json::from_value(json!({
            "address": "10.0.0.1",
            "isdefault": true,
            "updateime": "2024-01-01 00:00:00"
        }))
        .unwrap();
        assert!(node.is_default);
        assert_eq!(node.update_time, "2024-01-01 00:00:00");
        assert!(node.role.is_empty());
    }

    #[test]
    fn dashboard_decodes_partial_payload() {
        let d: DashboardResult = serde_json::from_value(json!({
            "subsystemCount": 42,
            "clusterLogCounts": [{"clustername": "LOG001", "total_log_gb": 7, "capacity": 100}]
        }))
        .unwrap();
        assert_eq!(d.subsystem_count, 42);
        assert_eq!(d.cluster_num, 0);
        assert_eq!(d.cluster_log_counts[0].cluster_name, "LOG001");
        assert!(d.top_subsystems.is_empty());
    }

    #[test]
    fn search_query_skips_blank_id_and_defaults_limit() {
        let req = SearchSubsystemsRequest {
            subsys_id: Some("  ".into()),
            limit: 0,
        };
        assert_eq!(
            req.query_pairs(),
            vec![("limit".to_string(), "20".to_string())]
        );

        let req = SearchSubsystemsRequest {
            subsys_id: Some("SYS001".into()),
            limit: 5,
        };
        assert_eq!(
            req.query_pairs(),
            vec![
                ("subsysId".to_string(), "SYS001".to_string()),
                ("limit".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn envelope_tolerates_missing_code() {
        let env: ApiEnvelope = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert_eq!(env.code, 0);
        assert_eq!(env.message(), "ok");
        assert!(env.result.is_none());

        let env: ApiEnvelope =
            serde_json::from_str(r#"{"code":0,"message":null,"result":null}"#).unwrap();
        assert_eq!(env.message(), "");
        assert!(env.result.is_none());
    }
}
