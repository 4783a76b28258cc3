use super::{BackendError, BackendResult, ClusterBackend};
use crate::domain::cluster::{HealthLevel, ResourceList};
use crate::domain::reroute::RerouteCommand;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Mutex;
use tracing::debug;

const CLUSTER_NAME: &str = "memory-cluster";
const NODE_ID: &str = "memory-node-1";

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    IndexExists(String),
    ClusterHealth {
        indices: Vec<String>,
        level: HealthLevel,
    },
    CreateIndex(String),
    DeleteIndex(String),
    NodesInfo,
    Reroute(Vec<RerouteCommand>),
}

#[derive(Serialize, Clone)]
struct HealthReport {
    cluster_name: String,
    status: String,
    timed_out: bool,
    number_of_nodes: u32,
    number_of_data_nodes: u32,
    active_primary_shards: u32,
    active_shards: u32,
    relocating_shards: u32,
    initializing_shards: u32,
    unassigned_shards: u32,
    number_of_pending_tasks: u32,
    active_shards_percent_as_number: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    indices: Option<Map<String, Value>>,
}

/// Single-node cluster, one primary shard per index. Only instances built with
/// [`MemoryBackend::recording`] keep a call log.
pub struct MemoryBackend {
    indices: DashSet<String>,
    failures: DashMap<String, BackendError>,
    outage: Mutex<Option<BackendError>>,
    calls: Option<Mutex<Vec<BackendCall>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            indices: DashSet::new(),
            failures: DashMap::new(),
            outage: Mutex::new(None),
            calls: None,
        }
    }

    pub fn recording() -> Self {
        Self {
            calls: Some(Mutex::new(Vec::new())),
            ..Self::new()
        }
    }

    pub fn with_indices<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.indices.insert(name.into());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains(name)
    }

    pub fn fail_index(&self, name: impl Into<String>, err: BackendError) {
        self.failures.insert(name.into(), err);
    }

    pub fn fail_all(&self, err: BackendError) {
        if let Ok(mut outage) = self.outage.lock() {
            *outage = Some(err);
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .as_ref()
            .and_then(|calls| calls.lock().ok().map(|c| c.clone()))
            .unwrap_or_default()
    }

    fn record(&self, call: BackendCall) {
        debug!("memory backend call: {:?}", call);
        if let Some(calls) = &self.calls {
            if let Ok(mut calls) = calls.lock() {
                calls.push(call);
            }
        }
    }

    fn check(&self, index: Option<&str>) -> BackendResult<()> {
        if let Some(err) = self.outage.lock().ok().and_then(|o| o.clone()) {
            return Err(err);
        }
        match index.and_then(|name| self.failures.get(name)) {
            Some(err) => Err(err.value().clone()),
            None => Ok(()),
        }
    }

    fn index_report(level: HealthLevel) -> Value {
        let mut report = json!({
            "status": "green",
            "number_of_shards": 1,
            "number_of_replicas": 0,
            "active_primary_shards": 1,
            "active_shards": 1,
            "relocating_shards": 0,
            "initializing_shards": 0,
            "unassigned_shards": 0
        });
        if level == HealthLevel::Shards {
            report["shards"] = json!({
                "0": {
                    "status": "green",
                    "primary_active": true,
                    "active_shards": 1,
                    "relocating_shards": 0,
                    "initializing_shards": 0,
                    "unassigned_shards": 0
                }
            });
        }
        report
    }

    fn not_found(name: &str) -> BackendError {
        BackendError::with_status(404, format!("index_not_found_exception: no such index [{name}]"))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterBackend for MemoryBackend {
    async fn index_exists(&self, name: &str) -> BackendResult<bool> {
        self.record(BackendCall::IndexExists(name.to_string()));
        self.check(Some(name))?;
        Ok(self.indices.contains(name))
    }

    async fn cluster_health(
        &self,
        indices: &ResourceList,
        level: HealthLevel,
    ) -> BackendResult<Value> {
        self.record(BackendCall::ClusterHealth {
            indices: indices.iter().map(str::to_string).collect(),
            level,
        });
        self.check(None)?;

        let selected: Vec<String> = if indices.is_empty() {
            let mut all: Vec<String> = self.indices.iter().map(|n| n.key().clone()).collect();
            all.sort();
            all
        } else {
            let mut selected = Vec::new();
            for name in indices.iter() {
                self.check(Some(name))?;
                if !self.indices.contains(name) {
                    return Err(Self::not_found(name));
                }
                selected.push(name.to_string());
            }
            selected
        };

        let shards = selected.len() as u32;
        let report = HealthReport {
            cluster_name: CLUSTER_NAME.to_string(),
            status: "green".to_string(),
            timed_out: false,
            number_of_nodes: 1,
            number_of_data_nodes: 1,
            active_primary_shards: shards,
            active_shards: shards,
            relocating_shards: 0,
            initializing_shards: 0,
            unassigned_shards: 0,
            number_of_pending_tasks: 0,
            active_shards_percent_as_number: 100.0,
            indices: match level {
                HealthLevel::Cluster => None,
                HealthLevel::Indices | HealthLevel::Shards => Some(
                    selected
                        .into_iter()
                        .map(|name| (name, Self::index_report(level)))
                        .collect(),
                ),
            },
        };

        serde_json::to_value(report).map_err(|e| BackendError::transport(e.to_string()))
    }

    async fn create_index(&self, name: &str) -> BackendResult<Value> {
        self.record(BackendCall::CreateIndex(name.to_string()));
        self.check(Some(name))?;

        if !self.indices.insert(name.to_string()) {
            return Err(BackendError::with_status(
                400,
                format!("resource_already_exists_exception: index [{name}] already exists"),
            ));
        }
        Ok(json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": name
        }))
    }

    async fn delete_index(&self, name: &str) -> BackendResult<Value> {
        self.record(BackendCall::DeleteIndex(name.to_string()));
        self.check(Some(name))?;

        match self.indices.remove(name) {
            Some(_) => Ok(json!({ "acknowledged": true })),
            None => Err(Self::not_found(name)),
        }
    }

    async fn nodes_info(&self) -> BackendResult<Value> {
        self.record(BackendCall::NodesInfo);
        self.check(None)?;

        Ok(json!({
            "_nodes": { "total": 1, "successful": 1, "failed": 0 },
            "cluster_name": CLUSTER_NAME,
            "nodes": {
                NODE_ID: {
                    "name": NODE_ID,
                    "roles": ["data", "master"],
                    "version": "8.10.0"
                }
            }
        }))
    }

    async fn reroute(&self, commands: &[RerouteCommand]) -> BackendResult<Value> {
        self.record(BackendCall::Reroute(commands.to_vec()));
        self.check(None)?;

        for command in commands {
            let index = match command {
                RerouteCommand::Allocate { index, .. } | RerouteCommand::Move { index, .. } => {
                    index
                }
            };
            self.check(Some(index))?;
            if !self.indices.contains(index.as_str()) {
                return Err(Self::not_found(index));
            }
        }
        Ok(json!({ "acknowledged": true }))
    }
}
