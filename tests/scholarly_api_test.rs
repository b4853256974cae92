use httpmock::prelude::*;
use jrc_common::core::scholarly::JANELIA_OA_QUERY;
use jrc_common::utils::retry::RetryPolicy;
use jrc_common::{Credentials, Endpoints, JrcError, ScholarlyClient};
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn client_for(server: &MockServer, credentials: Credentials) -> ScholarlyClient {
    ScholarlyClient::new()
        .unwrap()
        .with_endpoints(Endpoints::rooted_at(&server.base_url()))
        .with_credentials(credentials)
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
}

#[tokio::test]
async fn crossref_sends_contact_header() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/crossref/works/10.7554/eLife.12345")
            .header("mailto", "ops@example.org");
        then.status(200)
            .json_body(json!({"status": "ok", "message": {"DOI": "10.7554/elife.12345"}}));
    });

    let credentials = Credentials {
        contact_email: Some("ops@example.org".to_string()),
        ..Default::default()
    };
    let client = client_for(&server, credentials);
    let value = assert_ok!(client.crossref("10.7554/eLife.12345").await);

    mock.assert();
    assert_eq!(value["message"]["DOI"], json!("10.7554/elife.12345"));
}

#[tokio::test]
async fn unknown_doi_is_empty_not_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/datacite/dois/10.0000/missing");
        then.status(404);
    });

    let client = client_for(&server, Credentials::default());
    let value = assert_ok!(client.datacite("10.0000/missing").await);
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn server_errors_surface_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/biorxiv/10.1101/2024.01.01.000001");
        then.status(503);
    });

    let client = client_for(&server, Credentials::default());
    let err = assert_err!(client.biorxiv("10.1101/2024.01.01.000001").await);
    assert!(matches!(err, JrcError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn figshare_uses_doi_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/figshare/v2/articles")
            .query_param("doi", "10.25378/janelia.1");
        then.status(200).json_body(json!([{"id": 1}]));
    });

    let client = client_for(&server, Credentials::default());
    let value = assert_ok!(client.figshare("10.25378/janelia.1").await);
    mock.assert();
    assert_eq!(value[0]["id"], json!(1));
}

#[tokio::test]
async fn arxiv_feed_becomes_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/arxiv/query")
            .query_param("search_query", "doi:10.48550/arXiv.2401.00001");
        then.status(200).body(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><id>http://arxiv.org/abs/2401.00001v1</id><title>One</title></entry>
</feed>"#,
        );
    });

    let client = client_for(&server, Credentials::default());
    let value = assert_ok!(client.arxiv("doi:10.48550/arXiv.2401.00001").await);
    mock.assert();
    assert_eq!(value["feed"]["entry"]["title"], json!("One"));
}

#[tokio::test]
async fn authenticated_services_send_their_keys() {
    let server = MockServer::start();
    let elsevier = server.mock(|when, then| {
        when.method(GET)
            .path("/elsevier/content/abstract/doi/10.1016/j.cell.1")
            .header("X-ELS-APIKey", "els-key");
        then.status(200).json_body(json!({"abstracts-retrieval-response": {}}));
    });
    let zenodo = server.mock(|when, then| {
        when.method(GET)
            .path("/zenodo/api/records")
            .header("Authorization", "Bearer zen-key");
        then.status(200).json_body(json!({"hits": {"total": 0}}));
    });
    let protocols = server.mock(|when, then| {
        when.method(GET)
            .path("/protocolsio/api/v3/protocols/42")
            .header("Authorization", "Bearer proto-token");
        then.status(200).json_body(json!({"protocol": {"id": 42}}));
    });

    let credentials = Credentials {
        elsevier_api_key: Some("els-key".to_string()),
        zenodo_api_key: Some("zen-key".to_string()),
        protocols_api_token: Some("proto-token".to_string()),
        ..Default::default()
    };
    let client = client_for(&server, credentials);

    assert_ok!(client.elsevier("abstract/doi/10.1016/j.cell.1").await);
    assert_ok!(client.zenodo("records").await);
    assert_ok!(client.protocolsio("protocols/42").await);
    elsevier.assert();
    zenodo.assert();
    protocols.assert();
}

#[tokio::test]
async fn oa_single_doi_and_report() {
    let server = MockServer::start();
    let single = server.mock(|when, then| {
        when.method(GET)
            .path("/oa/report/works/10.1038/s41586-024-00001-1")
            .header("Accept", "application/json");
        then.status(200).json_body(json!({"DOI": "10.1038/s41586-024-00001-1"}));
    });

    let client = client_for(&server, Credentials::default());
    assert_ok!(client.oa("10.1038/s41586-024-00001-1").await);
    single.assert();

    // The report query is long; only check that it reaches the same base path.
    let report = server.mock(|when, then| {
        when.method(GET).path("/oa/report/works");
        then.status(200).json_body(json!({"hits": {"hits": []}}));
    });
    let value = assert_ok!(client.oa_report("&size=10").await);
    report.assert();
    assert_eq!(value["hits"]["hits"], json!([]));
    assert!(JANELIA_OA_QUERY.contains("janelia"));
}

#[tokio::test]
async fn orcid_asks_for_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/orcid/v3.0/0000-0002-1825-0097")
            .header("Accept", "application/json");
        then.status(200)
            .json_body(json!({"orcid-identifier": {"path": "0000-0002-1825-0097"}}));
    });

    let client = client_for(&server, Credentials::default());
    let value = assert_ok!(client.orcid("0000-0002-1825-0097").await);
    mock.assert();
    assert_eq!(value["orcid-identifier"]["path"], json!("0000-0002-1825-0097"));
}
