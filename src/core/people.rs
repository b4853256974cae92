use crate::config::settings::PEOPLE_API_KEY;
use crate::core::http::FetchRequest;
use crate::core::scholarly::ScholarlyClient;
use crate::utils::error::Result;
use crate::utils::retry::retry;
use serde_json::Value;

// People system lookups. Each call is retried on timeouts.
impl ScholarlyClient {
    fn people_request(&self, path: String, default_timeout: u64) -> Result<FetchRequest> {
        let key = Self::require(&self.credentials.people_api_key, PEOPLE_API_KEY)?;
        Ok(FetchRequest::new(format!("{}{}", self.endpoints.people, path))
            .header("APIKey", key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout(default_timeout)))
    }

    /// `None` when the employee is unknown or the record has no first name.
    pub async fn people_by_id(&self, employee_id: &str) -> Result<Option<Value>> {
        let request = self.people_request(format!("Person/GetById/{}", employee_id), 5)?;
        let response = retry(&self.retry_policy, "people_by_id", || {
            self.fetcher.fetch(request.clone())
        })
        .await?;

        let has_first_name = response
            .get("nameFirst")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        Ok(has_first_name.then_some(response))
    }

    pub async fn people_by_name(&self, name: &str) -> Result<Value> {
        let request = self.people_request(format!("Search/ByName/{}", name), 5)?;
        retry(&self.retry_policy, "people_by_name", || {
            self.fetcher.fetch(request.clone())
        })
        .await
    }

    /// One page (starting at 0) of a supervisory organization's members.
    pub async fn people_by_suporg(&self, code: &str, page: u32) -> Result<Value> {
        let request = self.people_request(format!("GetByOrg/{}/{}", code, page), 10)?;
        retry(&self.retry_policy, "people_by_suporg", || {
            self.fetcher.fetch(request.clone())
        })
        .await
    }
}
