use super::Catalog;
use super::models::{Item, ItemsResponse, Library, RawLibrary, RawSeason, SystemInfo};
use crate::error::{AppError, FetchError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Jellyfin API client
pub struct JellyfinClient {
    base_url: String,
    api_key: String,
    user_id: String,
    client: Client,
}

impl JellyfinClient {
    /// Create new Jellyfin client
    pub fn new(base_url: String, api_key: String, user_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;

        // Normalize base_url: ensure it ends with /
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            base_url,
            api_key,
            user_id,
            client,
        })
    }

    pub fn from_config(config: &crate::ArchiverConfig) -> Result<Self> {
        Self::new(
            config.jellyfin_url.clone(),
            config.api_key.clone(),
            config.user_id.clone(),
            config.request_timeout(),
        )
    }

    /// Health check - verify Jellyfin is reachable and the API key is accepted
    pub fn health_check(&self) -> Result<()> {
        tracing::info!("Performing Jellyfin health check: {}", self.base_url);

        let url = format!("{}System/Info", self.base_url);
        let info: SystemInfo = self.get_json(&url, &[]).map_err(|e| {
            AppError::External(format!(
                "Failed to reach Jellyfin at {}: {e}",
                self.base_url
            ))
        })?;

        tracing::info!(
            "Jellyfin health check passed: {} (version {})",
            info.server_name,
            info.version
        );
        Ok(())
    }

    fn items_url(&self) -> String {
        format!("{}Users/{}/Items", self.base_url, self.user_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.api_key)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, FetchError> {
        tracing::debug!("GET {url} {query:?}");

        let response = self
            .authorized(self.client.get(url).query(query))
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let response_text = response.text().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

        tracing::trace!("Jellyfin response from {url}: {response_text}");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                "Response body (first 1000 chars): {}",
                response_text.chars().take(1000).collect::<String>()
            );
            FetchError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn get_items<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Vec<T>, FetchError> {
        let response: ItemsResponse<T> = self.get_json(url, query)?;
        Ok(response.into_items())
    }
}

impl Catalog for JellyfinClient {
    fn list_libraries(&self) -> std::result::Result<Vec<Library>, FetchError> {
        let url = format!("{}Users/{}/Views", self.base_url, self.user_id);
        let raw: Vec<RawLibrary> = self.get_items(&url, &[])?;
        let libraries: Vec<Library> = raw.into_iter().map(Library::from).collect();

        tracing::debug!("Fetched {} libraries", libraries.len());
        Ok(libraries)
    }

    fn list_watched_items(&self, library_id: &str) -> std::result::Result<Vec<Item>, FetchError> {
        let items: Vec<Item> = self.get_items(
            &self.items_url(),
            &[
                ("ParentId", library_id),
                ("Recursive", "true"),
                ("Filters", "IsPlayed"),
                ("IsFolder", "false"),
                ("Fields", "Path"),
            ],
        )?;

        tracing::debug!("Fetched {} watched items for library {library_id}", items.len());
        Ok(items)
    }

    fn list_seasons(&self, library_id: &str) -> std::result::Result<Vec<u32>, FetchError> {
        let seasons: Vec<RawSeason> = self.get_items(
            &self.items_url(),
            &[
                ("ParentId", library_id),
                ("Recursive", "true"),
                ("IncludeItemTypes", "Season"),
            ],
        )?;

        let numbers: Vec<u32> = seasons.iter().filter_map(RawSeason::number).collect();
        tracing::debug!("Fetched {} seasons for library {library_id}", numbers.len());
        Ok(numbers)
    }

    fn delete_item(&self, item_id: &str) -> Result<()> {
        let url = format!("{}Items/{item_id}", self.base_url);
        tracing::debug!("DELETE {url}");

        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .map_err(|e| AppError::DeleteFailed {
                item_id: item_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AppError::DeleteFailed {
                item_id: item_id.to_string(),
                reason: format!("Jellyfin returned HTTP {}", response.status()),
            });
        }

        Ok(())
    }
}
