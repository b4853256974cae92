use crate::config::settings::{
    ClientSettings, Credentials, Endpoints, ELSEVIER_API_KEY, PROTOCOLS_API_TOKEN, ZENODO_API_KEY,
};
use crate::core::http::{FetchRequest, HttpFetcher, ResponseFormat};
use crate::utils::error::{JrcError, Result};
use crate::utils::retry::RetryPolicy;
use serde_json::Value;
use std::time::Duration;

/// OA.Works report query selecting Janelia-affiliated or HHMI-funded journal
/// articles, editorials, letters and reviews that are not preprints.
pub const JANELIA_OA_QUERY: &str = concat!(
    "?q=(openalx.authorships.institutions.display_name:",
    "janelia%20OR%20openalx.authorships.affiliations.raw_affiliation_string:",
    "janelia%20OR%20openalx.authorships.institutions.ror:",
    "013sk6x84%20OR%20openalx.authorships.institutions.id:",
    "%22i195573530%22)%20AND%20((supplements.sheets:",
    "(%22pmc__hhmi%22%20OR%20%22name_epmc__hhmi%22%20OR%20%22",
    "all-time__hhmi%22%20OR%20%22authorship__hhmi%22%20OR%20%22",
    "staff__hhmi%22%20OR%20%22preprints_oa_locations__hhmi",
    "%22%20OR%20%22preprints-enrichment__hhmi%22)%20OR%20",
    "(funder.DOI:(%2210.13039/100000011%22)%20OR%20funder.name:",
    "(%22Howard%20Hughes%20Medical%20Institute%22%20OR",
    "%20%22Janelia%20Research%20Campus%22%20OR",
    "%20%22Freeman%20Hrabowski%22)%20OR%20openalx.grants.funder:",
    "(%22F4320306082%22))%20OR%20(authorships.institutions.ror:",
    "(%22006w34k90%22%20OR%20%22013sk6x84%22)%20OR",
    "%20authorships.institutions.display_name:",
    "(%22Howard%20Hughes%20Medical%20Institute%22%20OR%20%22",
    "Janelia%20Research%20Campus%22%20OR",
    "%20%22Freeman%20Hrabowski%22)%20OR",
    "%20authorships.raw_affiliation_string:",
    "(%22Howard%20Hughes%20Medical%20Institute%22%20OR",
    "%20%22Janelia%20Research%20Campus%22%20OR",
    "%20%22Freeman%20Hrabowski%22))%20OR%20",
    "supplements.funder.display_name_ic:%22hhmi%22)%20AND",
    "%20NOT%20(supplements.removed_from_report:",
    "%22hhmi%22%20OR%20supplements.is_financial_disclosure:",
    "%22hhmi%22))%20AND%20type:",
    "(%22article%22%20OR%20%22editorial%22%20OR",
    "%20%22letter%22%20OR%20%22review%22)%20AND%20NOT",
    "%20openalx.type_crossref:",
    "%22proceedings-article%22%20AND%20NOT",
    "%20(supplements.is_preprint:true%20OR",
    "%20(pubtype:preprint%20AND%20NOT%20supplements.is_preprint:",
    "false)%20OR%20subtype:preprint)%20AND%20openalex:*%20AND",
    "%20journal:*"
);

const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// Client for the scholarly and HR web APIs.
#[derive(Debug, Clone)]
pub struct ScholarlyClient {
    pub(crate) fetcher: HttpFetcher,
    pub(crate) endpoints: Endpoints,
    pub(crate) credentials: Credentials,
    pub(crate) retry_policy: RetryPolicy,
    timeout_override: Option<Duration>,
}

impl ScholarlyClient {
    /// Default endpoints, credentials from the environment.
    pub fn new() -> Result<Self> {
        Self::from_settings(&ClientSettings::default())
    }

    /// Settings credentials take precedence; the environment fills the gaps.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::new()?,
            endpoints: settings.endpoints.clone(),
            credentials: settings.credentials.clone().or(Credentials::from_env()),
            retry_policy: settings.retry.policy(),
            timeout_override: settings.timeout_override(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replaces the credentials outright, ignoring the environment.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn timeout(&self, default_secs: u64) -> Duration {
        self.timeout_override
            .unwrap_or_else(|| Duration::from_secs(default_secs))
    }

    pub(crate) fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| JrcError::missing_env(name))
    }

    /// arXiv Atom feed for a search query, converted to JSON.
    pub async fn arxiv(&self, query: &str) -> Result<Value> {
        let url = format!("{}?search_query={}", self.endpoints.arxiv, query);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .timeout(self.timeout(10))
                    .format(ResponseFormat::Xml),
            )
            .await
    }

    pub async fn biorxiv(&self, doi: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoints.biorxiv, doi);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header(ACCEPT_JSON.0, ACCEPT_JSON.1)
                    .timeout(self.timeout(10)),
            )
            .await
    }

    pub async fn crossref(&self, doi: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoints.crossref, doi);
        let mut request = FetchRequest::new(url).timeout(self.timeout(10));
        if let Some(email) = &self.credentials.contact_email {
            request = request.header("mailto", email.as_str());
        }
        self.fetcher.fetch(request).await
    }

    pub async fn datacite(&self, doi: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoints.datacite, doi);
        self.fetcher
            .fetch(FetchRequest::new(url).timeout(self.timeout(10)))
            .await
    }

    pub async fn elsevier(&self, query: &str) -> Result<Value> {
        let key = Self::require(&self.credentials.elsevier_api_key, ELSEVIER_API_KEY)?;
        let url = format!("{}{}", self.endpoints.elsevier, query);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header("X-ELS-APIKey", key)
                    .timeout(self.timeout(15)),
            )
            .await
    }

    pub async fn figshare(&self, doi: &str) -> Result<Value> {
        let url = format!("{}articles?doi={}", self.endpoints.figshare, doi);
        self.fetcher
            .fetch(FetchRequest::new(url).timeout(self.timeout(10)))
            .await
    }

    /// OA.Works record for a single DOI.
    pub async fn oa(&self, doi: &str) -> Result<Value> {
        let url = format!("{}/{}", self.endpoints.oa, doi);
        self.oa_get(url).await
    }

    /// The full Janelia OA.Works report; `suffix` is appended to the query
    /// (paging, size, sort).
    pub async fn oa_report(&self, suffix: &str) -> Result<Value> {
        let url = format!("{}{}{}", self.endpoints.oa, JANELIA_OA_QUERY, suffix);
        self.oa_get(url).await
    }

    async fn oa_get(&self, url: String) -> Result<Value> {
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header(ACCEPT_JSON.0, ACCEPT_JSON.1)
                    .timeout(self.timeout(10)),
            )
            .await
    }

    pub async fn orcid(&self, orcid_id: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoints.orcid, orcid_id);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header(ACCEPT_JSON.0, ACCEPT_JSON.1)
                    .timeout(self.timeout(10)),
            )
            .await
    }

    pub async fn protocolsio(&self, query: &str) -> Result<Value> {
        let token = Self::require(&self.credentials.protocols_api_token, PROTOCOLS_API_TOKEN)?;
        let url = format!("{}{}", self.endpoints.protocolsio, query);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header("Authorization", format!("Bearer {}", token))
                    .timeout(self.timeout(15)),
            )
            .await
    }

    pub async fn zenodo(&self, query: &str) -> Result<Value> {
        let key = Self::require(&self.credentials.zenodo_api_key, ZENODO_API_KEY)?;
        let url = format!("{}{}", self.endpoints.zenodo, query);
        self.fetcher
            .fetch(
                FetchRequest::new(url)
                    .header("Authorization", format!("Bearer {}", key))
                    .timeout(self.timeout(15)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> ScholarlyClient {
        ScholarlyClient::new()
            .unwrap()
            .with_credentials(Credentials::default())
    }

    #[test]
    fn per_call_timeouts_can_be_overridden() {
        let client = offline_client();
        assert_eq!(client.timeout(15), Duration::from_secs(15));

        let client = client.with_timeout(Duration::from_secs(3));
        assert_eq!(client.timeout(15), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let client = offline_client();
        for result in [
            client.elsevier("search/scopus?query=x").await,
            client.zenodo("records?q=x").await,
            client.protocolsio("protocols?key=x").await,
        ] {
            assert!(matches!(result, Err(JrcError::MissingEnvVar { .. })));
        }
    }

    #[test]
    fn oa_query_is_url_safe() {
        assert!(JANELIA_OA_QUERY.starts_with("?q="));
        assert!(!JANELIA_OA_QUERY.contains(' '));
    }
}
