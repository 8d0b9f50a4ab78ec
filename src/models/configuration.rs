//! Control panel configuration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::traits::{Edit, Get};

const READ_PATH: &str = "settings/configuration.json";
const WRITE_PATH: &str = "settings.json";

/// Response envelope key.
const READ_KEY: &str = "settings";
/// Request envelope key.
const WRITE_KEY: &str = "configuration";

/// Global control panel settings.
///
/// The settings document has several hundred keys that vary between
/// releases. The common ones are typed; everything else lands in
/// [`Configuration::extra`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub system_email: Option<String>,

    #[serde(default)]
    pub system_host: Option<String>,

    #[serde(default)]
    pub system_theme: Option<String>,

    #[serde(default)]
    pub system_notification: bool,

    #[serde(default)]
    pub allow_incremental_backups: bool,

    #[serde(default)]
    pub allow_start_vms_with_one_ip: bool,

    #[serde(default)]
    pub backups_path: Option<String>,

    #[serde(default)]
    pub templates_path: Option<String>,

    /// Seconds before an idle session expires.
    #[serde(default)]
    pub session_timeout: Option<u64>,

    #[serde(default)]
    pub max_memory_ratio: Option<u32>,

    #[serde(default)]
    pub service_account_name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Configuration {
    /// Any setting by name, typed or not.
    pub fn setting(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.extra.get(name) {
            return Some(v.clone());
        }
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut(name).map(Value::take))
            .filter(|v| !v.is_null())
    }
}

/// Settings to change. Unset fields keep their current value.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigurationParams {
    pub system_email: Option<String>,
    pub system_host: Option<String>,
    pub system_theme: Option<String>,
    pub system_notification: Option<bool>,
    pub allow_incremental_backups: Option<bool>,
    pub allow_start_vms_with_one_ip: Option<bool>,
    pub backups_path: Option<String>,
    pub templates_path: Option<String>,
    pub session_timeout: Option<u64>,
    pub max_memory_ratio: Option<u32>,

    /// Settings without a typed field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[async_trait]
impl Get for Configuration {
    type Id = ();

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, _id: ()) -> Result<Self> {
        client.fetch(READ_PATH, READ_KEY).await
    }
}

#[async_trait]
impl Edit for Configuration {
    type Id = ();
    type Params = ConfigurationParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, _id: (), params: Self::Params) -> Result<()> {
        client.edit(WRITE_PATH, WRITE_KEY, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_keeps_unknown_settings() {
        let json = serde_json::json!({
            "settings": {
                "system_email": "noc@example.com",
                "system_host": "cp.example.com",
                "allow_incremental_backups": true,
                "session_timeout": 3600,
                "cdn_enabled": false,
                "default_firewall_policy": "DROP"
            }
        });
        let config: Configuration = crate::envelope::unwrap_one(READ_KEY, json).unwrap();
        assert_eq!(config.system_host.as_deref(), Some("cp.example.com"));
        assert_eq!(config.extra.len(), 2);
        assert_eq!(
            config.setting("default_firewall_policy"),
            Some(Value::from("DROP"))
        );
        assert_eq!(config.setting("session_timeout"), Some(Value::from(3600)));
        assert_eq!(config.setting("backups_path"), None);
    }

    #[test]
    fn test_params_flatten_extra() {
        let mut params = ConfigurationParams {
            session_timeout: Some(900),
            ..Default::default()
        };
        params
            .extra
            .insert("cdn_enabled".to_string(), Value::Bool(true));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"session_timeout": 900, "cdn_enabled": true})
        );
    }
}
