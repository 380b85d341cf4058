use crate::data::holiday::{Holiday, HolidayTable};
use crate::data::ledger::QuotaSeed;
use crate::data::persistence::Persistable;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftProvider {
    /// Local, deterministic draft; needs no network.
    #[default]
    Template,
    /// Gemini `generateContent` over HTTPS.
    Gemini,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DraftSettings {
    pub provider: DraftProvider,
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Use the local template when the provider fails instead of showing
    /// a failed draft.
    pub fallback_to_template: bool,
}

impl Default for DraftSettings {
    fn default() -> Self {
        DraftSettings {
            provider: DraftProvider::Template,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 30,
            fallback_to_template: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub user_name: String,
    /// Address the finished draft is mailed to.
    pub recipient: String,
    pub quota: QuotaSeed,
    pub draft: DraftSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            user_name: "Maggie".to_string(),
            recipient: "we.cheng@elsevier.com".to_string(),
            quota: QuotaSeed::default(),
            draft: DraftSettings::default(),
        }
    }
}

/// Shape of config.yaml.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: AppSettings,
    /// Replaces the built-in holiday table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holidays: Option<Vec<Holiday>>,
}

impl Persistable for ConfigFile {
    fn filename() -> &'static str {
        "config.yaml"
    }
}

impl ConfigFile {
    pub fn holiday_table(&self) -> HolidayTable {
        match &self.holidays {
            Some(list) => HolidayTable::new(list.clone()),
            None => HolidayTable::builtin(),
        }
    }
}
