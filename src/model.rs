use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

pub const BODY_VARIANTS: [&str; 4] = ["No body", "Json", "Xml", "Plain"];
pub const NO_BODY: usize = 0;

pub const NEW_REQUEST_NAME: &str = "New Request";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthKind {
    None,
    Basic,
    Digest,
    Bearer,
    Custom,
}

impl AuthKind {
    pub const ALL: [AuthKind; 5] = [
        AuthKind::None,
        AuthKind::Basic,
        AuthKind::Digest,
        AuthKind::Bearer,
        AuthKind::Custom,
    ];

    pub fn from_index(idx: usize) -> AuthKind {
        Self::ALL.get(idx).copied().unwrap_or(AuthKind::None)
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthKind::None => "No Auth",
            AuthKind::Basic => "Basic Auth",
            AuthKind::Digest => "Digest",
            AuthKind::Bearer => "Bearer Token",
            AuthKind::Custom => "Custom",
        }
    }

    pub fn field_labels(self) -> &'static [&'static str] {
        match self {
            AuthKind::None => &[],
            AuthKind::Basic | AuthKind::Digest => &["Username", "Password"],
            AuthKind::Bearer => &["Prefix", "Token"],
            AuthKind::Custom => &["Value"],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// Body variants with their buffered text; `variants[i].name` is the variant label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySpec {
    #[serde(default)]
    pub variants: Vec<NameValue>,
    #[serde(default)]
    pub selected: usize,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            variants: BODY_VARIANTS
                .iter()
                .map(|label| NameValue::new(*label, ""))
                .collect(),
            selected: NO_BODY,
        }
    }
}

impl BodySpec {
    /// Pads or trims stored variants to the known set and clamps the selection.
    pub fn normalize(&mut self) {
        let mut fixed = BodySpec::default();
        for (slot, stored) in fixed.variants.iter_mut().zip(self.variants.iter()) {
            slot.value = stored.value.clone();
        }
        fixed.selected = self.selected.min(BODY_VARIANTS.len() - 1);
        *self = fixed;
    }

    pub fn text(&self, variant: usize) -> &str {
        self.variants
            .get(variant)
            .map(|v| v.value.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthVariant {
    pub kind: String,
    #[serde(default)]
    pub fields: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    #[serde(default)]
    pub variants: Vec<AuthVariant>,
    #[serde(default)]
    pub selected: usize,
}

impl Default for AuthSpec {
    fn default() -> Self {
        Self {
            variants: AuthKind::ALL
                .iter()
                .map(|kind| AuthVariant {
                    kind: kind.label().to_string(),
                    fields: kind
                        .field_labels()
                        .iter()
                        .map(|label| NameValue::new(*label, ""))
                        .collect(),
                })
                .collect(),
            selected: 0,
        }
    }
}

impl AuthSpec {
    pub fn normalize(&mut self) {
        let mut fixed = AuthSpec::default();
        for (slot, stored) in fixed.variants.iter_mut().zip(self.variants.iter()) {
            for (field, value) in slot.fields.iter_mut().zip(stored.fields.iter()) {
                field.value = value.value.clone();
            }
        }
        fixed.selected = self.selected.min(AuthKind::ALL.len() - 1);
        *self = fixed;
    }

    pub fn value(&self, variant: usize, field: usize) -> &str {
        self.variants
            .get(variant)
            .and_then(|v| v.fields.get(field))
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }
}

/// A request as last written through the store, plus its response history
/// (most recent first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: Option<i64>,
    pub name: String,
    pub method: String,
    pub url: String,
    pub body: BodySpec,
    pub auth: AuthSpec,
    pub query: Vec<NameValue>,
    pub headers: Vec<NameValue>,
    pub responses: Vec<ResponseRecord>,
}

impl RequestRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            method: METHODS[0].to_string(),
            url: String::new(),
            body: BodySpec::default(),
            auth: AuthSpec::default(),
            query: Vec::new(),
            headers: Vec::new(),
            responses: Vec::new(),
        }
    }

    pub fn method_index(&self) -> usize {
        METHODS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&self.method))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub id: Option<i64>,
    pub request_id: i64,
    pub request_method: String,
    pub request_url: String,
    pub body: String,
    pub status: String,
    pub headers: Vec<NameValue>,
    pub cookies: Vec<NameValue>,
    pub duration: String,
    pub size: String,
    pub response_at: DateTime<Utc>,
    pub trace_logs: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            timeout_secs: default_timeout_secs(),
            toast_secs: default_toast_secs(),
            log_file: None,
            theme: None,
            debug: false,
        }
    }
}

fn default_db_path() -> String {
    "./requests.db".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_toast_secs() -> u64 {
    4
}
