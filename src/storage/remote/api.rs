use reqwest::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use serde_json::Value;

use crate::core::FukushuError;

const PROTOCOL_VERSION: u32 = 1;

/// Standard envelope every sync-server action answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// An `error` field means the action failed server-side; otherwise the
    /// result is whatever the server sent (possibly nothing, e.g. a missing
    /// document).
    pub fn into_result(self) -> Result<Option<T>, FukushuError> {
        if let Some(error) = self.error {
            return Err(FukushuError::RemoteApi(error));
        }
        Ok(self.result)
    }
}

/// One document in a batch write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentWrite {
    pub collection: String,
    pub id: String,
    pub data: Value,
}

/// HTTP client for one account's document collections on the sync server.
/// The server speaks a single-endpoint action/params protocol.
pub struct SyncClient {
    client: Client,
    base_url: String,
    account: String,
}

impl SyncClient {
    pub fn new(base_url: &str, account: &str) -> Self {
        SyncClient {
            client: Client::new(),
            base_url: base_url.to_string(),
            account: account.to_string(),
        }
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<ApiResponse<T>, FukushuError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), Value::String(action.to_string()));
        body.insert("version".to_string(), Value::Number(PROTOCOL_VERSION.into()));
        body.insert("account".to_string(), Value::String(self.account.clone()));
        body.insert("params".to_string(), params);

        let response: ApiResponse<T> =
            self.client.post(&self.base_url).json(&body).send().await?.json().await?;

        Ok(response)
    }

    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, FukushuError> {
        let params = serde_json::json!({ "collection": collection, "id": id });
        let doc = self.make_request::<Value>("getDocument", params).await?.into_result()?;
        Ok(doc.filter(|value| !value.is_null()))
    }

    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), FukushuError> {
        let params = serde_json::json!({
            "collection": collection,
            "id": id,
            "data": data,
            "merge": merge,
        });
        self.make_request::<Value>("setDocument", params).await?.into_result()?;
        Ok(())
    }

    /// Range query: every document in `collection` whose numeric `field`
    /// is `<= max`.
    pub async fn query_leq(
        &self,
        collection: &str,
        field: &str,
        max: i64,
    ) -> Result<Vec<Value>, FukushuError> {
        let params = serde_json::json!({ "collection": collection, "field": field, "max": max });
        let docs = self.make_request::<Vec<Value>>("queryDocuments", params).await?.into_result()?;
        Ok(docs.unwrap_or_default())
    }

    /// Atomic multi-document write. The server commits every write or none.
    pub async fn commit_batch(&self, writes: Vec<DocumentWrite>) -> Result<(), FukushuError> {
        let params = serde_json::json!({ "writes": writes });
        self.make_request::<Value>("commitBatch", params).await?.into_result()?;
        Ok(())
    }
}
