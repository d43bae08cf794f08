//! REST tracking service implementation

use crate::error::{Error, Result};
use crate::tracking::{Filter, Query, TrackingService};
use crate::types::{Entity, RecordData};
use async_trait::async_trait;
use reqwest::{Body, Client};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Content type of filter-hash searches
const SEARCH_CONTENT_TYPE: &str = "application/vnd+shotgun.api3_hash+json";

/// Tracking service speaking the site's REST API with a bearer token
pub struct RestTrackingService {
    client: Client,
    token: String,
    base_url: Url,
}

#[derive(Deserialize)]
struct Single {
    data: Record,
}

#[derive(Deserialize)]
struct Many {
    data: Vec<Record>,
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "type")]
    entity_type: String,
    id: u64,
    #[serde(default)]
    attributes: RecordData,
    #[serde(default)]
    relationships: serde_json::Map<String, Value>,
}

impl From<Record> for Entity {
    fn from(record: Record) -> Self {
        let mut fields = record.attributes;
        for (name, rel) in record.relationships {
            let value = rel.get("data").cloned().unwrap_or(Value::Null);
            fields.insert(name, value);
        }
        Self {
            entity_type: record.entity_type,
            id: record.id,
            fields,
        }
    }
}

#[derive(Deserialize)]
struct UploadTicket {
    data: Value,
    links: UploadLinks,
}

#[derive(Deserialize)]
struct UploadLinks {
    upload: String,
    complete_upload: String,
}

impl RestTrackingService {
    /// Create a new REST service
    pub fn new(base_url: Url, token: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            base_url,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    fn link_url(&self, link: &str) -> Result<Url> {
        // Upload links are either absolute (external storage) or site-relative
        Url::parse(link)
            .or_else(|_| self.base_url.join(link))
            .map_err(|e| Error::Tracking(format!("bad link {link}: {e}")))
    }

    fn search_body(query: &Query) -> Value {
        json!({ "filters": Filter::All(query.filters.clone()).to_json() })
    }

    fn search_params(query: &Query) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !query.fields.is_empty() {
            params.push(("fields".to_string(), query.fields.join(",")));
        }
        if !query.order.is_empty() {
            let sort = query
                .order
                .iter()
                .map(|o| {
                    if o.descending {
                        format!("-{}", o.field)
                    } else {
                        o.field.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), sort));
        }
        if let Some(limit) = query.limit {
            params.push(("page[size]".to_string(), limit.to_string()));
            params.push(("page[number]".to_string(), "1".to_string()));
        }
        params
    }
}

/// REST collection for an entity type: `HumanUser` → `human_users`
pub fn collection_name(entity_type: &str) -> String {
    let mut out = String::with_capacity(entity_type.len() + 4);
    for (i, c) in entity_type.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out.push('s');
    out
}

#[async_trait]
impl TrackingService for RestTrackingService {
    async fn find(&self, entity_type: &str, query: &Query) -> Result<Vec<Entity>> {
        let url = self.api_url(&format!("/entity/{}/_search", collection_name(entity_type)));
        debug!("Searching {entity_type}");

        let found: Many = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, SEARCH_CONTENT_TYPE)
            .query(&Self::search_params(query))
            .body(Self::search_body(query).to_string())
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Tracking(e.to_string()))?
            .json()
            .await?;

        Ok(found.data.into_iter().map(Entity::from).collect())
    }

    async fn create(&self, entity_type: &str, data: RecordData) -> Result<Entity> {
        let url = self.api_url(&format!("/entity/{}", collection_name(entity_type)));
        debug!("Creating {entity_type}");

        let created: Single = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&data)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Tracking(e.to_string()))?
            .json()
            .await?;

        Ok(created.data.into())
    }

    async fn upload(
        &self,
        entity_type: &str,
        entity_id: u64,
        path: &Path,
        field_name: &str,
    ) -> Result<()> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Tracking(format!("no file name in {}", path.display())))?;

        let url = self.api_url(&format!(
            "/entity/{}/{entity_id}/{field_name}/_upload?filename={}",
            collection_name(entity_type),
            urlencoding::encode(&filename)
        ));

        let ticket: UploadTicket = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Tracking(e.to_string()))?
            .json()
            .await?;

        let read_error = |source| Error::Filesystem {
            op: "read",
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).await.map_err(read_error)?;
        let length = file.metadata().await.map_err(read_error)?.len();
        debug!("Uploading {length} bytes of {filename}");

        let upload_url = self.link_url(&ticket.links.upload)?;
        let mut put = self
            .client
            .put(upload_url)
            .header(reqwest::header::CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(file)));
        if upload_url_is_site(&self.base_url, &ticket.links.upload) {
            put = put.bearer_auth(&self.token);
        }
        put.send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Tracking(e.to_string()))?;

        let complete_url = self.link_url(&ticket.links.complete_upload)?;
        self.client
            .post(complete_url)
            .bearer_auth(&self.token)
            .json(&json!({ "upload_info": ticket.data, "upload_data": {} }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Tracking(e.to_string()))?;

        Ok(())
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// The token only goes to the site itself, never to external storage
fn upload_url_is_site(base: &Url, link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => url.origin() == base.origin(),
        Err(_) => true,
    }
}
