use crate::config::Config;
use crate::store::api_types::{ApiDocument, ApiDocumentBody, ApiErrorResponse, ApiListResponse};
use crate::store::types::{Member, NewMember};
use color_eyre::{eyre::eyre, Result};
use reqwest::{Response, StatusCode};
use tracing::{info, warn};

/// All records live in this one logical collection.
const COLLECTION: &str = "users";

/// Client for the hosted document store (Firestore REST v1), scoped to the
/// roster collection.
#[derive(Clone)]
pub struct StoreClient {
  http: reqwest::Client,
  base_url: String,
  api_key: String,
}

impl StoreClient {
  pub fn new(config: &Config) -> Result<Self> {
    let api_key = Config::get_api_key()?;

    let base_url = format!(
      "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
      config.store.project_id, config.store.database
    );

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      api_key,
    })
  }

  fn collection_url(&self) -> String {
    format!("{}/{}?key={}", self.base_url, COLLECTION, self.api_key)
  }

  fn document_url(&self, id: &str) -> String {
    format!("{}/{}/{}?key={}", self.base_url, COLLECTION, id, self.api_key)
  }

  /// List the full collection, in store order.
  pub async fn list_members(&self) -> Result<Vec<Member>> {
    let response = self
      .http
      .get(self.collection_url())
      .send()
      .await
      .map_err(|e| eyre!("Failed to list members: {}", e))?;
    let response = check_status(response, "list members").await?;

    let list: ApiListResponse = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse member list: {}", e))?;

    let members: Vec<Member> = list
      .documents
      .into_iter()
      .map(ApiDocument::into_member)
      .collect();

    info!(count = members.len(), "listed members");
    Ok(members)
  }

  /// Get a single record by id. `Ok(None)` means the id does not exist,
  /// distinct from a transport or permission failure.
  pub async fn get_member(&self, id: &str) -> Result<Option<Member>> {
    let response = self
      .http
      .get(self.document_url(id))
      .send()
      .await
      .map_err(|e| eyre!("Failed to get member {}: {}", id, e))?;

    if response.status() == StatusCode::NOT_FOUND {
      info!(id, "member not found");
      return Ok(None);
    }
    let response = check_status(response, "get member").await?;

    let doc: ApiDocument = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse member {}: {}", id, e))?;

    Ok(Some(doc.into_member()))
  }

  /// Create a record; the store assigns the id.
  pub async fn add_member(&self, member: &NewMember) -> Result<Member> {
    let body = ApiDocumentBody::from_fields(member);

    let response = self
      .http
      .post(self.collection_url())
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Failed to add member: {}", e))?;
    let response = check_status(response, "add member").await?;

    let doc: ApiDocument = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse created member: {}", e))?;

    let created = doc.into_member();
    info!(id = %created.id, "added member");
    Ok(created)
  }

  /// Replace a record's fields wholesale.
  pub async fn update_member(&self, id: &str, fields: &NewMember) -> Result<()> {
    let body = ApiDocumentBody::from_fields(fields);

    let response = self
      .http
      .patch(self.document_url(id))
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Failed to update member {}: {}", id, e))?;
    check_status(response, "update member").await?;

    info!(id, "updated member");
    Ok(())
  }

  /// Permanently remove a record. No soft delete, no recovery.
  pub async fn delete_member(&self, id: &str) -> Result<()> {
    let response = self
      .http
      .delete(self.document_url(id))
      .send()
      .await
      .map_err(|e| eyre!("Failed to delete member {}: {}", id, e))?;
    check_status(response, "delete member").await?;

    info!(id, "deleted member");
    Ok(())
  }
}

/// Turn a non-2xx response into an error carrying the store's message.
async fn check_status(response: Response, operation: &str) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let detail = match response.json::<ApiErrorResponse>().await {
    Ok(body) => format!("{} ({})", body.error.message, body.error.status),
    Err(_) => status.to_string(),
  };
  warn!(operation, %status, "store request failed");
  Err(eyre!("Failed to {}: {}", operation, detail))
}
