use crate::utils::error::{JrcError, Result};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base URLs of every service the scholarly client talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub arxiv: String,
    pub biorxiv: String,
    pub crossref: String,
    pub datacite: String,
    pub elsevier: String,
    pub figshare: String,
    pub ncbi_idconv: String,
    pub oa: String,
    pub orcid: String,
    pub people: String,
    pub protocolsio: String,
    pub pubmed: String,
    pub zenodo: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            arxiv: "https://export.arxiv.org/api/query".to_string(),
            biorxiv: "https://api.biorxiv.org/details/biorxiv/".to_string(),
            crossref: "https://api.crossref.org/works/".to_string(),
            datacite: "https://api.datacite.org/dois/".to_string(),
            elsevier: "https://api.elsevier.com/content/".to_string(),
            figshare: "https://api.figshare.com/v2/".to_string(),
            ncbi_idconv: "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/".to_string(),
            oa: "https://bg.api.oa.works/report/works".to_string(),
            orcid: "https://pub.orcid.org/v3.0/".to_string(),
            people: "https://hhmipeople-prod.azurewebsites.net/People/".to_string(),
            protocolsio: "https://www.protocols.io/api/v3/".to_string(),
            pubmed: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string(),
            zenodo: "https://zenodo.org/api/".to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at `base`, keeping the per-service suffix layout.
    /// Handy for local mock servers.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            arxiv: format!("{}/arxiv/query", base),
            biorxiv: format!("{}/biorxiv/", base),
            crossref: format!("{}/crossref/works/", base),
            datacite: format!("{}/datacite/dois/", base),
            elsevier: format!("{}/elsevier/content/", base),
            figshare: format!("{}/figshare/v2/", base),
            ncbi_idconv: format!("{}/idconv/v1.0/", base),
            oa: format!("{}/oa/report/works", base),
            orcid: format!("{}/orcid/v3.0/", base),
            people: format!("{}/People/", base),
            protocolsio: format!("{}/protocolsio/api/v3/", base),
            pubmed: format!("{}/eutils/esearch.fcgi", base),
            zenodo: format!("{}/zenodo/api/", base),
        }
    }

    fn all(&self) -> [(&'static str, &str); 13] {
        [
            ("endpoints.arxiv", self.arxiv.as_str()),
            ("endpoints.biorxiv", self.biorxiv.as_str()),
            ("endpoints.crossref", self.crossref.as_str()),
            ("endpoints.datacite", self.datacite.as_str()),
            ("endpoints.elsevier", self.elsevier.as_str()),
            ("endpoints.figshare", self.figshare.as_str()),
            ("endpoints.ncbi_idconv", self.ncbi_idconv.as_str()),
            ("endpoints.oa", self.oa.as_str()),
            ("endpoints.orcid", self.orcid.as_str()),
            ("endpoints.people", self.people.as_str()),
            ("endpoints.protocolsio", self.protocolsio.as_str()),
            ("endpoints.pubmed", self.pubmed.as_str()),
            ("endpoints.zenodo", self.zenodo.as_str()),
        ]
    }
}

/// API keys and contact details. Every field is optional; calls that need a
/// missing credential fail with [`JrcError::MissingEnvVar`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub elsevier_api_key: Option<String>,
    pub people_api_key: Option<String>,
    pub protocols_api_token: Option<String>,
    pub zenodo_api_key: Option<String>,
    pub ncbi_api_key: Option<String>,
    pub contact_email: Option<String>,
}

pub const ELSEVIER_API_KEY: &str = "ELSEVIER_API_KEY";
pub const PEOPLE_API_KEY: &str = "PEOPLE_API_KEY";
pub const PROTOCOLS_API_TOKEN: &str = "PROTOCOLS_API_TOKEN";
pub const ZENODO_API_KEY: &str = "ZENODO_API_KEY";
pub const NCBI_API_KEY: &str = "NCBI_API_KEY";
pub const CONTACT_EMAIL: &str = "CONTACT_EMAIL";

impl Credentials {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            elsevier_api_key: var(ELSEVIER_API_KEY),
            people_api_key: var(PEOPLE_API_KEY),
            protocols_api_token: var(PROTOCOLS_API_TOKEN),
            zenodo_api_key: var(ZENODO_API_KEY),
            ncbi_api_key: var(NCBI_API_KEY),
            contact_email: var(CONTACT_EMAIL),
        }
    }

    /// Fills gaps from `other`.
    pub fn or(self, other: Credentials) -> Self {
        Self {
            elsevier_api_key: self.elsevier_api_key.or(other.elsevier_api_key),
            people_api_key: self.people_api_key.or(other.people_api_key),
            protocols_api_token: self.protocols_api_token.or(other.protocols_api_token),
            zenodo_api_key: self.zenodo_api_key.or(other.zenodo_api_key),
            ncbi_api_key: self.ncbi_api_key.or(other.ncbi_api_key),
            contact_email: self.contact_email.or(other.contact_email),
        }
    }

    // Placeholders that survived substitution mean the variable was unset.
    fn drop_placeholders(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty() && !s.starts_with("${"));
        Self {
            elsevier_api_key: keep(self.elsevier_api_key),
            people_api_key: keep(self.people_api_key),
            protocols_api_token: keep(self.protocols_api_token),
            zenodo_api_key: keep(self.zenodo_api_key),
            ncbi_api_key: keep(self.ncbi_api_key),
            contact_email: keep(self.contact_email),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Replaces every per-service default timeout when set.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_tries: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_tries: 4,
            delay_ms: 2000,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_tries, Duration::from_millis(self.delay_ms))
    }
}

/// Local client settings, usually read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub http: HttpSettings,
    pub retry: RetrySettings,
    pub endpoints: Endpoints,
    pub credentials: Credentials,
}

impl ClientSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses settings after substituting `${VAR}` references from the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let mut settings: ClientSettings = toml::from_str(&processed)?;
        settings.credentials = settings.credentials.drop_placeholders();
        Ok(settings)
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.http.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        for (field, url) in self.endpoints.all() {
            validate_url(field, url)?;
        }
        validate_positive_number("retry.max_tries", u64::from(self.retry.max_tries), 1)?;
        if let Some(timeout) = self.http.timeout_seconds {
            validate_positive_number("http.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| JrcError::ConfigError {
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
