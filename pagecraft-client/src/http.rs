use log::{debug, warn};
use pagecraft_sections::RecordId;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::store::{unwrap_envelope, ContentStore, Resource, SettingsDoc};

/// [`ContentStore`] backed by the REST content API.
///
/// Every request carries the configured bearer token. A 401 from any
/// endpoint surfaces as [`ClientError::Unauthorized`].
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: ClientConfig,
}

impl HttpStore {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(HttpStore { client, config })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replace the token after the editor signs in again
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.config.token = Some(token.into());
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        let builder = self.client.request(method, self.url(path));
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON body. An empty body decodes as `null`.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.send_raw(builder).await?;
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };
        Ok(serde_json::from_value(unwrap_envelope(value))?)
    }

    async fn send_raw(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let error = ClientError::from_status(status.as_u16(), &body);
        if error.is_unauthorized() {
            warn!("content API rejected the token");
        } else {
            debug!("content API returned {}: {}", status, body.trim());
        }
        Err(error)
    }
}

fn item_path(resource: Resource, key: &str) -> String {
    format!("{}/{}", resource.path(), key)
}

impl ContentStore for HttpStore {
    async fn list<T>(&self, resource: Resource) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.send(self.request(Method::GET, resource.path())).await
    }

    async fn get<T>(&self, resource: Resource, key: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        self.send(self.request(Method::GET, &item_path(resource, key))).await
    }

    async fn create<T>(&self, resource: Resource, record: &T) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.send(self.request(Method::POST, resource.path()).json(record)).await
    }

    async fn update<T>(&self, resource: Resource, id: &RecordId, record: &T) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let path = item_path(resource, &id.to_string());
        self.send(self.request(Method::PUT, &path).json(record)).await
    }

    async fn delete(&self, resource: Resource, id: &RecordId) -> ClientResult<()> {
        let path = item_path(resource, &id.to_string());
        self.send_raw(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn settings(&self, doc: SettingsDoc) -> ClientResult<Value> {
        self.send(self.request(Method::GET, doc.path())).await
    }

    async fn put_settings(&self, doc: SettingsDoc, value: &Value) -> ClientResult<Value> {
        self.send(self.request(Method::PUT, doc.path()).json(value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn urls_join_base_and_path() {
        let store = HttpStore::new(ClientConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(store.url("pages"), "http://localhost:9000/api/pages");
        assert_eq!(
            store.url(&item_path(Resource::CaseStudies, "7")),
            "http://localhost:9000/api/case-studies/7"
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ClientError::from_status(401, ""), ClientError::Unauthorized);
        assert_eq!(
            ClientError::from_status(404, "no page\n"),
            ClientError::NotFound("no page".to_string())
        );
        assert_eq!(
            ClientError::from_status(500, "boom"),
            ClientError::Status {
                status: 500,
                message: "boom".to_string()
            }
        );
    }
}
