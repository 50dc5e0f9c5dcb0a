//! Global default feature flags
//!
//! A process-wide table of features switched on for everyone regardless of
//! plan. It sits below plan membership in resolution order, so it can only
//! turn features on for plans that lack them. The table is never mutated in
//! place: updates build a new [`GlobalFlags`] and swap it in through
//! [`EntitlementService`](crate::entitlement::EntitlementService).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalFlags {
    flags: BTreeMap<String, bool>,
}

impl GlobalFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, bool)>) -> Self {
        Self {
            flags: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parse a flag list such as `ai_assistant=true, webhooks, sso=off`.
    ///
    /// A bare key means enabled. Accepted values: true/false, 1/0, on/off, yes/no.
    pub fn parse(list: &str) -> BillingResult<Self> {
        let mut flags = BTreeMap::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = match entry.split_once('=') {
                Some((key, value)) => (key.trim(), parse_bool(value.trim(), entry)?),
                None => (entry, true),
            };
            if key.is_empty() {
                return Err(BillingError::InvalidInput(format!(
                    "Flag entry '{}' has no feature key",
                    entry
                )));
            }
            flags.insert(key.to_lowercase(), value);
        }
        Ok(Self { flags })
    }

    /// Explicit value for a key, if the table has one
    pub fn get(&self, feature_key: &str) -> Option<bool> {
        self.flags.get(feature_key).copied()
    }

    pub fn is_enabled(&self, feature_key: &str) -> bool {
        self.get(feature_key).unwrap_or(false)
    }

    pub fn with_flag(mut self, feature_key: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(feature_key.into(), enabled);
        self
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn parse_bool(value: &str, entry: &str) -> BillingResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(BillingError::InvalidInput(format!(
            "Invalid flag value in '{}'",
            entry
        ))),
    }
}
