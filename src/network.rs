use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::filters::Filters;
use crate::models::{Company, Launch, Page, Rocket, StarlinkSat};

/// Thin client for the public SpaceX API (v4).
#[derive(Clone)]
pub struct SpacexClient {
    http: Client,
    base_url: String,
}

impl SpacexClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacedash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn company(&self) -> Result<Company> {
        self.get_json("company").await
    }

    pub async fn latest_launch(&self) -> Result<Launch> {
        self.get_json("launches/latest").await
    }

    pub async fn next_launch(&self) -> Result<Launch> {
        self.get_json("launches/next").await
    }

    pub async fn rockets(&self) -> Result<Vec<Rocket>> {
        self.get_json("rockets").await
    }

    /// Paged launch query scoped by the filter record: rocket equality when a
    /// rocket is selected, inclusive year bounds on `date_utc`, newest first.
    pub async fn query_launches(&self, filters: &Filters) -> Result<Page<Launch>> {
        self.post_query("launches/query", launch_query(filters)).await
    }

    pub async fn query_starlink(&self, filters: &Filters) -> Result<Page<StarlinkSat>> {
        self.post_query("starlink/query", starlink_query(filters)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()?;
        response
            .json()
            .await
            .with_context(|| format!("decoding response from {url}"))
    }

    async fn post_query<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<Page<T>> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()?;
        response
            .json()
            .await
            .with_context(|| format!("decoding response from {url}"))
    }
}

fn launch_query(filters: &Filters) -> Value {
    let mut query = serde_json::Map::new();
    if !filters.rocket_id.is_empty() {
        query.insert("rocket".into(), json!(filters.rocket_id));
    }
    let mut date_range = serde_json::Map::new();
    if let Some(year) = filters.start_year {
        date_range.insert("$gte".into(), json!(format!("{year:04}-01-01T00:00:00.000Z")));
    }
    if let Some(year) = filters.end_year {
        date_range.insert("$lte".into(), json!(format!("{year:04}-12-31T23:59:59.999Z")));
    }
    if !date_range.is_empty() {
        query.insert("date_utc".into(), Value::Object(date_range));
    }
    json!({
        "query": query,
        "options": {
            "limit": filters.limit,
            "page": filters.page,
            "sort": { "date_utc": "desc" },
        },
    })
}

fn starlink_query(filters: &Filters) -> Value {
    json!({
        "query": {},
        "options": {
            "limit": filters.limit,
            "page": filters.page,
            "sort": { "spaceTrack.LAUNCH_DATE": "desc" },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_query_everything() {
        let body = launch_query(&Filters::default());

        assert_eq!(body["query"], json!({}));
        assert_eq!(body["options"]["limit"], 100);
        assert_eq!(body["options"]["page"], 1);
    }

    #[test]
    fn rocket_and_year_bounds_land_in_the_query() {
        let filters = Filters {
            rocket_id: "5e9d0d95eda69973a809d1ec".into(),
            start_year: Some(2018),
            end_year: Some(2020),
            limit: 25,
            page: 3,
        };

        let body = launch_query(&filters);

        assert_eq!(body["query"]["rocket"], "5e9d0d95eda69973a809d1ec");
        assert_eq!(body["query"]["date_utc"]["$gte"], "2018-01-01T00:00:00.000Z");
        assert_eq!(body["query"]["date_utc"]["$lte"], "2020-12-31T23:59:59.999Z");
        assert_eq!(body["options"]["limit"], 25);
        assert_eq!(body["options"]["page"], 3);
    }

    #[test]
    fn open_ended_year_range_sets_only_one_bound() {
        let filters = Filters {
            start_year: Some(2021),
            ..Filters::default()
        };

        let body = launch_query(&filters);

        assert_eq!(body["query"]["date_utc"]["$gte"], "2021-01-01T00:00:00.000Z");
        assert!(body["query"]["date_utc"].get("$lte").is_none());
    }

    #[test]
    fn starlink_query_pages_with_the_record() {
        let filters = Filters {
            limit: 50,
            page: 2,
            ..Filters::default()
        };

        let body = starlink_query(&filters);

        assert_eq!(body["options"]["limit"], 50);
        assert_eq!(body["options"]["page"], 2);
    }
}
