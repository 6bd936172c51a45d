// API client module: a small async HTTP client for the instance's drive
// API. The API is POST-only JSON and authenticates by carrying the access
// token inside every request body under the `i` key.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::MigrateError;

/// API client holding a reqwest client, the instance base URL and the
/// access token merged into every request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

/// A drive folder as returned by `drive/folders`. `path` is not part of the
/// remote record: the folder walk fills it with the breadcrumb of names
/// leading to this folder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(skip_deserializing)]
    pub path: Option<String>,
}

impl Folder {
    /// Breadcrumb if the walk assigned one, otherwise the bare name.
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// A drive file as returned by `drive/files/find`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileQuery<'a> {
    name: &'a str,
    folder_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileUpdate<'a> {
    file_id: &'a str,
    comment: &'a str,
}

impl ApiClient {
    /// Create a client for `base_url` (already normalised, no trailing
    /// slash) authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `params` (plus the token) to `{base}/api/{endpoint}` and decode
    /// the JSON response as `T`.
    pub async fn call<P, T>(&self, endpoint: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self.send(endpoint, params).await?;
        let txt = res
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", endpoint))?;
        serde_json::from_str(&txt).with_context(|| format!("Parsing {} response json", endpoint))
    }

    /// Same request as [`ApiClient::call`] but the response body is ignored.
    pub async fn execute<P>(&self, endpoint: &str, params: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        self.send(endpoint, params).await?;
        Ok(())
    }

    /// List the folders directly under `parent_id`, or the drive root when
    /// `None`.
    pub async fn list_folders(&self, parent_id: Option<&str>) -> Result<Vec<Folder>> {
        self.call("drive/folders", &FolderQuery { folder_id: parent_id })
            .await
    }

    /// Files named exactly `name` inside folder `folder_id`.
    pub async fn find_files(&self, name: &str, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.call("drive/files/find", &FileQuery { name, folder_id })
            .await
    }

    /// Set the comment (alt text) of a drive file.
    pub async fn update_file_comment(&self, file_id: &str, comment: &str) -> Result<()> {
        self.execute("drive/files/update", &FileUpdate { file_id, comment })
            .await
    }

    fn request_body<P>(&self, endpoint: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let mut body = serde_json::to_value(params)
            .with_context(|| format!("Failed to serialize {} parameters", endpoint))?;
        let map = body.as_object_mut().ok_or_else(|| MigrateError::InvalidParams {
            endpoint: endpoint.to_string(),
        })?;
        map.insert("i".into(), Value::String(self.token.clone()));
        Ok(body)
    }

    async fn send<P>(&self, endpoint: &str, params: &P) -> Result<reqwest::Response>
    where
        P: Serialize + ?Sized,
    {
        let url = format!("{}/api/{}", &self.base_url, endpoint);
        let body = self.request_body(endpoint, params)?;
        debug!(%endpoint, "sending request");
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", endpoint))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().await.unwrap_or_default();
            anyhow::bail!("{} failed: {} - {}", endpoint, status, txt);
        }
        Ok(res)
    }
}
