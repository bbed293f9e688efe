//! Generic entity-manager client (§6).
//!
//! Every entity manager exposes the same shape —
//! `GET /api/<entity>/{id}`, `GET /api/<entity>/paged`,
//! `GET /api/<entity>/composite/...`, `POST`, `PUT /api/<entity>/{id}`,
//! `DELETE /api/<entity>/{id}`, `GET /api/<entity>/{refField}/{id}/exists`
//! — so one generic client, parameterised over the entity type and its
//! name, covers all eight without repeating the HTTP plumbing per
//! entity (see `entities.rs` for the thin typed wrappers built on top).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};
use crate::pagination::{Page, PageRequest};

#[derive(Debug, Clone)]
pub struct ManagerClient {
    http: reqwest::Client,
    base_url: String,
    entity: &'static str,
}

impl ManagerClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, entity: &'static str) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            entity,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.entity,
            path
        )
    }

    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            serde_json::from_str(&body).map_err(ClientError::from)
        } else {
            Err(ClientError::from_status(status, body))
        }
    }

    /// `GET /api/<entity>/{id}`.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> ClientResult<T> {
        let response = self.http.get(self.url(id)).send().await?;
        Self::handle(response).await
    }

    /// `GET /api/<entity>/paged?page=&pageSize=`.
    pub async fn get_paged<T: DeserializeOwned>(&self, request: PageRequest) -> ClientResult<Page<T>> {
        let response = self
            .http
            .get(self.url("paged"))
            .query(&request.query())
            .send()
            .await?;
        Self::handle(response).await
    }

    /// `GET /api/<entity>/composite/{composite_path}` — e.g.
    /// `processor/composite/{version}/{name}`.
    pub async fn get_composite<T: DeserializeOwned>(&self, composite_path: &str) -> ClientResult<T> {
        let response = self
            .http
            .get(self.url(&format!("composite/{composite_path}")))
            .send()
            .await?;
        Self::handle(response).await
    }

    /// `POST /api/<entity>` — 201 on success.
    pub async fn create<T: DeserializeOwned, B: Serialize>(&self, body: &B) -> ClientResult<T> {
        let response = self
            .http
            .post(self.url(""))
            .json(body)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// `PUT /api/<entity>/{id}` — 409 if this is a breaking schema
    /// change on a referenced schema (§6).
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        id: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .http
            .put(self.url(id))
            .json(body)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// `DELETE /api/<entity>/{id}` — 409 `ReferenceExists` if a
    /// referrer still points at this entity.
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let response = self.http.delete(self.url(id)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::from_status(status, body))
        }
    }

    /// `GET /api/<entity>/{refField}/{id}/exists`.
    pub async fn exists(&self, ref_field: &str, id: &str) -> ClientResult<bool> {
        let response = self
            .http
            .get(self.url(&format!("{ref_field}/{id}/exists")))
            .send()
            .await?;
        Self::handle(response).await
    }
}
