use crate::core::http::FetchRequest;
use crate::core::scholarly::ScholarlyClient;
use crate::domain::model::PmidTarget;
use crate::utils::error::{JrcError, Result};
use crate::utils::xml::xml_to_json;
use serde_json::Value;
use url::Url;

const NCBI_TOOL: &str = "jrc_common";

fn first_record<'a>(response: &'a Value, field: &str) -> Option<&'a Value> {
    if response.get("status").and_then(Value::as_str) != Some("ok") {
        return None;
    }
    response.get("records")?.get(0)?.get(field)
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// PubMed and PubMed Central identifier conversion.
impl ScholarlyClient {
    fn idconv_url(&self, ids: &str) -> Result<String> {
        let mut url = Url::parse(&self.endpoints.ncbi_idconv).map_err(|e| {
            JrcError::InvalidConfigValueError {
                field: "endpoints.ncbi_idconv".to_string(),
                value: self.endpoints.ncbi_idconv.clone(),
                reason: e.to_string(),
            }
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tool", NCBI_TOOL);
            if let Some(email) = &self.credentials.contact_email {
                query.append_pair("email", email);
            }
            query.append_pair("format", "json");
            query.append_pair("ids", ids);
        }
        Ok(url.into())
    }

    fn esearch_url(&self, api_key: &str, doi: &str) -> Result<String> {
        let mut url = Url::parse(&self.endpoints.pubmed).map_err(|e| {
            JrcError::InvalidConfigValueError {
                field: "endpoints.pubmed".to_string(),
                value: self.endpoints.pubmed.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("db", "pubmed")
            .append_pair("api_key", api_key)
            .append_pair("term", &format!("/{}[DOI]", doi));
        Ok(url.into())
    }

    /// Looks up the PMID for a DOI: PubMed Central's ID converter first, then a
    /// PubMed search when `NCBI_API_KEY` is available.
    pub async fn get_pmid(&self, doi: &str) -> Result<Option<String>> {
        let request = FetchRequest::new(self.idconv_url(doi)?)
            .timeout(self.timeout(10))
            .allow(&[400, 403, 404]);
        let response = self.fetcher.fetch(request).await?;
        if let Some(pmid) = first_record(&response, "pmid").and_then(identifier) {
            return Ok(Some(pmid));
        }

        let Some(api_key) = self.credentials.ncbi_api_key.as_deref() else {
            tracing::debug!("No PMC record for {} and no NCBI_API_KEY set", doi);
            return Ok(None);
        };

        let url = self.esearch_url(api_key, doi)?;
        let request = FetchRequest::new(url.clone()).timeout(self.timeout(10));
        let response = self.fetcher.send(&request).await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(JrcError::PmidNotFound {
                message: format!("Could not find PMID for {}", doi),
                details: format!("Status: {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        let data = xml_to_json(&body).map_err(|e| JrcError::XmlError {
            url,
            message: e.to_string(),
        })?;
        interpret_esearch(doi, &data)
    }

    /// Converts a PMID to a PMCID or DOI. `None` when the converter has no answer.
    pub async fn convert_pmid(&self, pmid: &str, target: PmidTarget) -> Result<Option<String>> {
        let request = FetchRequest::new(self.idconv_url(pmid)?).timeout(self.timeout(10));
        let response = self.fetcher.send(&request).await?;
        let body: Value = response.json().await?;
        Ok(first_record(&body, target.as_str()).and_then(identifier))
    }
}

fn interpret_esearch(doi: &str, data: &Value) -> Result<Option<String>> {
    let result = data.get("eSearchResult");
    let count = result.and_then(|r| r.get("Count")).and_then(Value::as_str);

    match (result, count) {
        (Some(result), Some("1")) => {
            let id = result
                .get("IdList")
                .and_then(|ids| ids.get("Id"))
                .and_then(Value::as_str);
            match id {
                Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
                    Ok(Some(id.to_string()))
                }
                Some(_) => Ok(None),
                None => Err(JrcError::PmidNotFound {
                    message: format!("Invalid PMID for {}", doi),
                    details: data.to_string(),
                }),
            }
        }
        (Some(result), Some("0")) => {
            let details = result
                .get("ErrorList")
                .or_else(|| result.get("WarningList"))
                .unwrap_or(data);
            Err(JrcError::PmidNotFound {
                message: format!("No PMID found for {}", doi),
                details: details.to_string(),
            })
        }
        _ => Err(JrcError::PmidNotFound {
            message: format!("Invalid PMID for {}", doi),
            details: data.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_hit_returns_numeric_id() {
        let data = json!({"eSearchResult": {"Count": "1", "IdList": {"Id": "38012345"}}});
        assert_eq!(
            interpret_esearch("10.1/x", &data).unwrap().as_deref(),
            Some("38012345")
        );

        let data = json!({"eSearchResult": {"Count": "1", "IdList": {"Id": "abc"}}});
        assert_eq!(interpret_esearch("10.1/x", &data).unwrap(), None);
    }

    #[test]
    fn no_hits_report_error_list() {
        let data = json!({"eSearchResult": {
            "Count": "0",
            "ErrorList": {"PhraseNotFound": "/10.1/x[DOI]"}
        }});
        match interpret_esearch("10.1/x", &data) {
            Err(JrcError::PmidNotFound { message, details }) => {
                assert_eq!(message, "No PMID found for 10.1/x");
                assert!(details.contains("PhraseNotFound"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn single_hit_without_id_list_is_invalid() {
        let data = json!({"eSearchResult": {"Count": "1"}});
        assert!(matches!(
            interpret_esearch("10.1/x", &data),
            Err(JrcError::PmidNotFound { ref message, .. }) if message == "Invalid PMID for 10.1/x"
        ));

        let data = json!({"eSearchResult": {"Count": "1", "IdList": null}});
        assert!(interpret_esearch("10.1/x", &data).is_err());
    }

    #[test]
    fn several_hits_are_invalid() {
        let data = json!({"eSearchResult": {"Count": "2"}});
        assert!(matches!(
            interpret_esearch("10.1/x", &data),
            Err(JrcError::PmidNotFound { ref message, .. }) if message == "Invalid PMID for 10.1/x"
        ));
    }

    #[test]
    fn records_need_ok_status() {
        let ok = json!({"status": "ok", "records": [{"pmid": "123", "pmcid": "PMC9"}]});
        assert_eq!(first_record(&ok, "pmcid"), Some(&json!("PMC9")));

        let error = json!({"status": "error", "records": [{"pmid": "123"}]});
        assert_eq!(first_record(&error, "pmid"), None);
        assert_eq!(identifier(&json!(42)).as_deref(), Some("42"));
    }
}
