// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP Data API client for the hosted document database.
//!
//! Every action is a `POST {base_url}/action/{name}` whose JSON body names the
//! `dataSource`, `database` and `collection`, authenticated with the
//! `api-key` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use super::{Document, DocumentStore, StoreError, StoreResult, UpdateResult};
use crate::config::DataApiConfig;

#[derive(Debug, Clone)]
pub struct DataApiStore {
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
    http: Client,
}

impl DataApiStore {
    pub fn new(config: &DataApiConfig, timeout: Duration) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database.clone(),
            http,
        })
    }

    async fn action(&self, action: &str, collection: &str, params: Value) -> StoreResult<Value> {
        let body = request_body(
            &self.data_source,
            &self.database,
            collection,
            params,
        );

        debug!(action, collection, "Data API request");

        let response = self
            .http
            .post(format!("{}/action/{action}", self.base_url))
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("{action} on {collection} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_duplicate_key_error(status, &body) {
                return Err(StoreError::Duplicate(format!("{collection}: {body}")));
            }
            return Err(StoreError::Request(format!(
                "{action} on {collection} returned {status}: {body}"
            )));
        }

        response.json().await.map_err(|e| {
            StoreError::InvalidResponse(format!("{action} on {collection} invalid JSON: {e}"))
        })
    }
}

#[async_trait]
impl DocumentStore for DataApiStore {
    async fn find(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        let response = self
            .action("find", collection, json!({ "filter": filter }))
            .await?;
        parse_documents(response)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> StoreResult<Option<Document>> {
        let response = self
            .action("findOne", collection, json!({ "filter": filter }))
            .await?;
        parse_document(response)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.action("insertOne", collection, json!({ "document": document }))
            .await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        let response = self
            .action(
                "updateOne",
                collection,
                json!({
                    "filter": filter,
                    "update": { "$set": set },
                    "upsert": upsert,
                }),
            )
            .await?;
        parse_update_result(&response)
    }
}

fn request_body(data_source: &str, database: &str, collection: &str, params: Value) -> Value {
    let mut body = json!({
        "dataSource": data_source,
        "database": database,
        "collection": collection,
    });
    if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), params) {
        target.extend(extra);
    }
    body
}

/// The Data API reports unique-index violations either as 409 Conflict or
/// as a 400 whose body carries the server's `E11000` / `DuplicateKey` error.
fn is_duplicate_key_error(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT || body.contains("E11000") || body.contains("DuplicateKey")
}

fn parse_documents(response: Value) -> StoreResult<Vec<Document>> {
    match response.get("documents") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map.clone()),
                other => Err(StoreError::InvalidResponse(format!(
                    "document is not an object: {other}"
                ))),
            })
            .collect(),
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(StoreError::InvalidResponse(format!(
            "documents is not an array: {other}"
        ))),
    }
}

fn parse_document(response: Value) -> StoreResult<Option<Document>> {
    match response.get("document") {
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        None | Some(Value::Null) => Ok(None),
        Some(other) => Err(StoreError::InvalidResponse(format!(
            "document is not an object: {other}"
        ))),
    }
}

fn parse_update_result(response: &Value) -> StoreResult<UpdateResult> {
    let count = |field: &str| {
        response
            .get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| StoreError::InvalidResponse(format!("missing {field} in response")))
    };

    Ok(UpdateResult {
        matched_count: count("matchedCount")?,
        modified_count: count("modifiedCount")?,
        upserted: response
            .get("upsertedId")
            .map(|id| !id.is_null())
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_merges_location_and_params() {
        let body = request_body(
            "Cluster0",
            "verifree",
            "allowlist",
            json!({ "filter": { "address": "0xabc" } }),
        );
        assert_eq!(body["dataSource"], "Cluster0");
        assert_eq!(body["database"], "verifree");
        assert_eq!(body["collection"], "allowlist");
        assert_eq!(body["filter"]["address"], "0xabc");
    }

    #[test]
    fn duplicate_key_detection() {
        assert!(is_duplicate_key_error(StatusCode::CONFLICT, ""));
        assert!(is_duplicate_key_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Failed to insert document: FunctionError: (DuplicateKey) E11000 duplicate key error"}"#
        ));
        assert!(!is_duplicate_key_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid session"}"#
        ));
    }

    #[test]
    fn parse_documents_handles_missing_and_present() {
        assert!(parse_documents(json!({})).unwrap().is_empty());

        let docs = parse_documents(json!({
            "documents": [{ "domain": "@mit.edu" }, { "domain": "@stanford.edu" }]
        }))
        .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["domain"], "@stanford.edu");

        assert!(parse_documents(json!({ "documents": [1] })).is_err());
    }

    #[test]
    fn parse_document_treats_null_as_absent() {
        assert!(parse_document(json!({ "document": null })).unwrap().is_none());
        let doc = parse_document(json!({ "document": { "message": "0xdeadbeef" } }))
            .unwrap()
            .expect("document present");
        assert_eq!(doc["message"], "0xdeadbeef");
    }

    #[test]
    fn parse_update_result_reads_counts_and_upsert() {
        let result = parse_update_result(&json!({
            "matchedCount": 0,
            "modifiedCount": 0,
            "upsertedId": "65a1f0c2e4b0a1b2c3d4e5f6"
        }))
        .unwrap();
        assert_eq!(
            result,
            UpdateResult {
                matched_count: 0,
                modified_count: 0,
                upserted: true
            }
        );

        let result = parse_update_result(&json!({ "matchedCount": 1, "modifiedCount": 1 })).unwrap();
        assert!(!result.upserted);
        assert_eq!(result.modified_count, 1);

        assert!(parse_update_result(&json!({ "modifiedCount": 1 })).is_err());
    }

    mod transport {
        use std::time::Duration;

        use serde_json::json;
        use crate::config::DataApiConfig;
        use crate::storage::{document, DataApiStore, DocumentStore, StoreError};
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn store(server: &MockServer, timeout: Duration) -> DataApiStore {
            let config = DataApiConfig {
                url: format!("{}/", server.uri()),
                api_key: "data-api-key".into(),
                data_source: "Cluster0".into(),
                database: "verifree".into(),
            };
            DataApiStore::new(&config, timeout).unwrap()
        }

        #[tokio::test]
        async fn find_one_posts_action_with_api_key() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/findOne"))
                .and(header("api-key", "data-api-key"))
                .and(body_partial_json(json!({
                    "dataSource": "Cluster0",
                    "database": "verifree",
                    "collection": "allowlist",
                    "filter": { "address": "0xabc" }
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "document": { "address": "0xabc", "contractsAdmin": true }
                })))
                .expect(1)
                .mount(&server)
                .await;

            let doc = store(&server, Duration::from_secs(5))
                .find_one("allowlist", document(json!({ "address": "0xabc" })))
                .await
                .unwrap()
                .expect("document present");
            assert_eq!(doc["contractsAdmin"], true);
        }

        #[tokio::test]
        async fn insert_conflict_is_duplicate() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/insertOne"))
                .and(body_partial_json(json!({ "document": { "message": "0xdeadbeef" } })))
                .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
                .mount(&server)
                .await;

            let err = store(&server, Duration::from_secs(5))
                .insert_one("subnetmessages", document(json!({ "message": "0xdeadbeef" })))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Duplicate(_)), "{err:?}");
        }

        #[tokio::test]
        async fn insert_e11000_body_is_duplicate() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/insertOne"))
                .respond_with(ResponseTemplate::new(400).set_body_string(
                    r#"{"error":"Failed to insert document: FunctionError: (DuplicateKey) E11000 duplicate key error"}"#,
                ))
                .mount(&server)
                .await;

            let err = store(&server, Duration::from_secs(5))
                .insert_one("alloweddomains", document(json!({ "domain": "@mit.edu" })))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Duplicate(_)), "{err:?}");
        }

        #[tokio::test]
        async fn update_one_sends_set_and_upsert() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/updateOne"))
                .and(body_partial_json(json!({
                    "filter": { "address": "0xabc" },
                    "update": { "$set": { "mintSubnetVSBT": true } },
                    "upsert": true
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "matchedCount": 0,
                    "modifiedCount": 0,
                    "upsertedId": "65a1f0c2e4b0a1b2c3d4e5f6"
                })))
                .mount(&server)
                .await;

            let result = store(&server, Duration::from_secs(5))
                .update_one(
                    "allowlist",
                    document(json!({ "address": "0xabc" })),
                    document(json!({ "mintSubnetVSBT": true })),
                    true,
                )
                .await
                .unwrap();
            assert!(result.upserted);
        }

        #[tokio::test]
        async fn error_status_carries_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/find"))
                .respond_with(ResponseTemplate::new(401).set_body_string("invalid session"))
                .mount(&server)
                .await;

            let err = store(&server, Duration::from_secs(5))
                .find("alloweddomains", document(json!({})))
                .await
                .unwrap_err();
            match err {
                StoreError::Request(msg) => {
                    assert!(msg.contains("401"), "{msg}");
                    assert!(msg.contains("invalid session"), "{msg}");
                }
                other => panic!("expected request error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_response_times_out() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action/findOne"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "document": null }))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let err = store(&server, Duration::from_millis(100))
                .find_one("allowlist", document(json!({})))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Request(_)), "{err:?}");
        }
    }
}
