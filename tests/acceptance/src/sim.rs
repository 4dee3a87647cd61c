//! Simulated message-bus namespace service.
//!
//! A deterministic, in-memory stand-in for the provisioning backend: it
//! converges namespace declarations, plans against live state, imports by
//! identity, destroys, and rejects declarations that alias an identity it
//! does not already manage. Scenario tables run the real engine against
//! this service, so every acceptance test is hermetic and repeatable.
//!
//! Behavior intentionally mirrors a real namespace service:
//!
//! - sku is accepted case-insensitively but canonicalized on write, so a
//!   follow-up plan sees no drift
//! - credentials are generated at creation, survive updates, and the bare
//!   keys are never exposed on read
//! - an auto-inflate ceiling is persisted verbatim even when auto-inflate
//!   is disabled; the flag wins at runtime

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use veristate_backend::{
    Applied, ChangeSet, DeclaredConfig, ObservedState, ProvisionError, Provisioner, RemoteClient,
    RemoteError, ResourceIdentity,
};

/// Resource kind served by the simulation.
pub const BUS_NAMESPACE_KIND: &str = "bus_namespace";

/// Fields the service never exposes on read. Import comparisons must
/// allow-list exactly these.
pub const NON_READABLE_FIELDS: &[&str] = &["default_primary_key", "default_secondary_key"];

const SKUS: &[&str] = &["Basic", "Standard"];
const MAX_CAPACITY: u32 = 20;
const MAX_THROUGHPUT_UNITS: u32 = 20;
const KEY_LEN: usize = 32;

#[derive(Debug, Deserialize)]
struct NamespaceConfig {
    kind: String,
    logical_name: String,
    resource_group: String,
    name: String,
    location: String,
    sku: String,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    auto_inflate_enabled: Option<bool>,
    #[serde(default)]
    maximum_throughput_units: Option<u32>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    network_rulesets: Option<NetworkRulesets>,
}

#[derive(Debug, Deserialize)]
struct NetworkRulesets {
    default_action: String,
    #[serde(default)]
    ip_rules: Vec<String>,
}

/// One namespace the service holds, with the logical declaration that
/// manages it.
#[derive(Debug, Clone)]
struct NamespaceRecord {
    owner: String,
    attrs: ObservedState,
}

/// The simulated service. One instance is one isolated "cloud"; concurrent
/// cases against the same instance share it the way real cases share a
/// subscription.
pub struct SimBus {
    namespaces: Mutex<HashMap<(String, String), NamespaceRecord>>,
}

impl SimBus {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            namespaces: Mutex::new(HashMap::new()),
        })
    }

    /// Number of namespaces currently held.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces.lock().map_or(0, |namespaces| namespaces.len())
    }

    fn parse(config: &DeclaredConfig) -> Result<NamespaceConfig, ProvisionError> {
        let cfg: NamespaceConfig = serde_json::from_str(config.as_str())
            .map_err(|e| ProvisionError::Convergence(format!("invalid configuration: {e}")))?;
        if cfg.kind != BUS_NAMESPACE_KIND {
            return Err(ProvisionError::Convergence(format!(
                "unsupported resource kind {:?}",
                cfg.kind
            )));
        }
        Ok(cfg)
    }

    fn validate(cfg: &NamespaceConfig) -> Result<String, ProvisionError> {
        let sku = SKUS
            .iter()
            .find(|s| s.eq_ignore_ascii_case(&cfg.sku))
            .ok_or_else(|| {
                ProvisionError::Convergence(format!("unsupported sku {:?}", cfg.sku))
            })?;
        let capacity = cfg.capacity.unwrap_or(1);
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ProvisionError::Convergence(format!(
                "capacity {capacity} out of range 1..={MAX_CAPACITY}"
            )));
        }
        if let Some(units) = cfg.maximum_throughput_units {
            if units > MAX_THROUGHPUT_UNITS {
                return Err(ProvisionError::Convergence(format!(
                    "maximum_throughput_units {units} out of range 0..={MAX_THROUGHPUT_UNITS}"
                )));
            }
        }
        Ok((*sku).to_string())
    }

    /// Flattens the declared (mutable) attributes with canonicalized values.
    /// Server-generated attributes are layered on top of this.
    fn declared_attrs(cfg: &NamespaceConfig, sku: &str) -> ObservedState {
        let mut attrs = ObservedState::new()
            .with("resource_group", &cfg.resource_group)
            .with("name", &cfg.name)
            .with("location", &cfg.location)
            .with("sku", sku)
            .with("capacity", cfg.capacity.unwrap_or(1).to_string())
            .with(
                "auto_inflate_enabled",
                cfg.auto_inflate_enabled.unwrap_or(false).to_string(),
            )
            .with(
                "maximum_throughput_units",
                cfg.maximum_throughput_units.unwrap_or(0).to_string(),
            );
        attrs.set("tags.%", cfg.tags.len().to_string());
        for (key, value) in &cfg.tags {
            attrs.set(format!("tags.{key}"), value);
        }
        if let Some(rules) = &cfg.network_rulesets {
            attrs.set("network_rulesets.default_action", &rules.default_action);
            attrs.set("network_rulesets.ip_rule.#", rules.ip_rules.len().to_string());
            for (i, mask) in rules.ip_rules.iter().enumerate() {
                attrs.set(format!("network_rulesets.ip_rule.{i}.ip_mask"), mask);
            }
        }
        attrs
    }

    fn generated_key() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_LEN)
            .map(char::from)
            .collect()
    }

    fn connection_string(name: &str, key: &str) -> String {
        format!(
            "Endpoint=sb://{name}.simbus.local/;SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey={key}"
        )
    }

    /// Attaches server-generated attributes to a freshly created namespace.
    fn attach_generated(attrs: &mut ObservedState, name: &str) {
        let primary = Self::generated_key();
        let mut secondary = Self::generated_key();
        while secondary == primary {
            secondary = Self::generated_key();
        }
        attrs.set("namespace_id", uuid::Uuid::new_v4().simple().to_string());
        attrs.set(
            "default_primary_connection_string",
            Self::connection_string(name, &primary),
        );
        attrs.set(
            "default_secondary_connection_string",
            Self::connection_string(name, &secondary),
        );
        attrs.set("default_primary_key", primary);
        attrs.set("default_secondary_key", secondary);
    }

    /// Carries server-generated attributes across an update.
    fn carry_generated(attrs: &mut ObservedState, existing: &ObservedState) {
        for field in [
            "namespace_id",
            "default_primary_connection_string",
            "default_secondary_connection_string",
            "default_primary_key",
            "default_secondary_key",
        ] {
            if let Some(value) = existing.get(field) {
                attrs.set(field, value);
            }
        }
    }

    /// The view a point read returns: everything except the bare keys.
    fn readable_view(attrs: &ObservedState) -> ObservedState {
        attrs
            .iter()
            .filter(|(field, _)| !NON_READABLE_FIELDS.contains(field))
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect()
    }
}

#[async_trait]
impl Provisioner for SimBus {
    async fn apply(&self, config: &DeclaredConfig) -> Result<Applied, ProvisionError> {
        let cfg = Self::parse(config)?;
        let sku = Self::validate(&cfg)?;
        let mut attrs = Self::declared_attrs(&cfg, &sku);

        let key = (cfg.resource_group.clone(), cfg.name.clone());
        let mut namespaces = self
            .namespaces
            .lock()
            .map_err(|_| ProvisionError::Transport("lock poisoned".to_string()))?;
        match namespaces.get(&key) {
            Some(record) if record.owner != cfg.logical_name => {
                return Err(ProvisionError::Convergence(format!(
                    "{BUS_NAMESPACE_KIND} \"{}/{}\" already exists; to be managed, \
                     this resource needs to be imported",
                    cfg.resource_group, cfg.name
                )));
            }
            Some(record) => {
                tracing::debug!(group = %cfg.resource_group, name = %cfg.name, "updating namespace");
                Self::carry_generated(&mut attrs, &record.attrs);
            }
            None => {
                tracing::debug!(group = %cfg.resource_group, name = %cfg.name, "creating namespace");
                Self::attach_generated(&mut attrs, &cfg.name);
            }
        }

        namespaces.insert(
            key,
            NamespaceRecord {
                owner: cfg.logical_name.clone(),
                attrs: attrs.clone(),
            },
        );

        Ok(Applied {
            identity: ResourceIdentity::new(
                BUS_NAMESPACE_KIND,
                cfg.logical_name,
                cfg.resource_group,
                cfg.name,
            ),
            state: attrs,
        })
    }

    async fn plan(
        &self,
        config: &DeclaredConfig,
        previous: &ObservedState,
    ) -> Result<ChangeSet, ProvisionError> {
        let cfg = Self::parse(config)?;
        let sku = Self::validate(&cfg)?;
        let declared = Self::declared_attrs(&cfg, &sku);

        let key = (cfg.resource_group.clone(), cfg.name.clone());
        let current = self
            .namespaces
            .lock()
            .map_err(|_| ProvisionError::Transport("lock poisoned".to_string()))?
            .get(&key)
            .map_or_else(|| previous.clone(), |record| record.attrs.clone());

        let mut changes = ChangeSet::empty();
        for (field, declared_value) in declared.iter() {
            let current_value = current.get(field);
            if current_value != Some(declared_value) {
                changes.push(
                    field,
                    current_value.map(str::to_string),
                    Some(declared_value.to_string()),
                );
            }
        }
        Ok(changes)
    }

    async fn import_resource(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<ObservedState, ProvisionError> {
        let key = (identity.resource_group.clone(), identity.resource_name.clone());
        self.namespaces
            .lock()
            .map_err(|_| ProvisionError::Transport("lock poisoned".to_string()))?
            .get(&key)
            .map(|record| Self::readable_view(&record.attrs))
            .ok_or_else(|| {
                ProvisionError::Convergence(format!("cannot import {identity}: not found"))
            })
    }

    async fn destroy(&self, identity: &ResourceIdentity) -> Result<(), ProvisionError> {
        let key = (identity.resource_group.clone(), identity.resource_name.clone());
        let removed = self
            .namespaces
            .lock()
            .map_err(|_| ProvisionError::Transport("lock poisoned".to_string()))?
            .remove(&key);
        tracing::debug!(%identity, existed = removed.is_some(), "destroy");
        // Destroying an absent namespace is a no-op, as with any idempotent
        // delete API.
        Ok(())
    }
}

#[async_trait]
impl RemoteClient for SimBus {
    async fn get(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError> {
        let key = (identity.resource_group.clone(), identity.resource_name.clone());
        Ok(self
            .namespaces
            .lock()
            .map_err(|_| RemoteError::Transport("lock poisoned".to_string()))?
            .get(&key)
            .map(|record| Self::readable_view(&record.attrs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;
    use crate::TestData;
    use regex::Regex;
    use veristate_harness::requires_import_error;

    fn data() -> TestData {
        TestData::new()
    }

    #[tokio::test]
    async fn sku_is_canonicalized_on_write() {
        let sim = SimBus::new();
        let data = data();
        let applied = sim.apply(&template::non_standard_casing(&data)).await.unwrap();
        assert_eq!(applied.state.get("sku"), Some("Basic"));

        // The very next plan sees no drift despite the lower-case input.
        let changes = sim
            .plan(&template::non_standard_casing(&data), &applied.state)
            .await
            .unwrap();
        assert!(changes.is_empty(), "unexpected drift: {changes}");
    }

    #[tokio::test]
    async fn duplicate_declaration_matches_guard_signature() {
        let sim = SimBus::new();
        let data = data();
        sim.apply(&template::basic(&data)).await.unwrap();

        let err = sim.apply(&template::requires_import(&data)).await.unwrap_err();
        let pattern = Regex::new(&requires_import_error(BUS_NAMESPACE_KIND)).unwrap();
        assert!(
            pattern.is_match(&err.to_string()),
            "signature not recognized: {err}"
        );
    }

    #[tokio::test]
    async fn update_preserves_generated_credentials() {
        let sim = SimBus::new();
        let data = data();
        let created = sim.apply(&template::basic(&data)).await.unwrap();
        let updated = sim.apply(&template::standard(&data)).await.unwrap();

        assert_eq!(updated.state.get("sku"), Some("Standard"));
        assert_eq!(
            created.state.get("default_primary_key"),
            updated.state.get("default_primary_key")
        );
        assert_eq!(created.state.get("namespace_id"), updated.state.get("namespace_id"));
    }

    #[tokio::test]
    async fn reads_never_expose_bare_keys() {
        let sim = SimBus::new();
        let data = data();
        sim.apply(&template::basic(&data)).await.unwrap();

        let read = sim.get(&data.identity()).await.unwrap().unwrap();
        for field in NON_READABLE_FIELDS {
            assert!(read.get(field).is_none(), "{field} leaked on read");
        }
        assert!(read.get("default_primary_connection_string").is_some());
    }

    #[tokio::test]
    async fn rejects_out_of_range_capacity() {
        let sim = SimBus::new();
        let data = data();
        let err = sim.apply(&template::capacity(&data, 99)).await.unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn ceiling_persists_verbatim_with_auto_inflate_disabled() {
        let sim = SimBus::new();
        let data = data();
        let applied = sim
            .apply(&template::auto_inflate_disabled_with_ceiling(&data))
            .await
            .unwrap();
        assert_eq!(applied.state.get("auto_inflate_enabled"), Some("false"));
        assert_eq!(applied.state.get("maximum_throughput_units"), Some("4"));
    }
}
