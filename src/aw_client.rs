//! Client for the ActivityWatch REST API and the query scripts it runs

use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::config::validate_server_url;
use crate::error::{ApiError, Result};
use crate::models::{CategoryClass, Event, Theme};

pub const NEXTBLOCK_BUCKET_PREFIX: &str = "aw-watcher-nextblock";
pub const WINDOW_BUCKET_PREFIX: &str = "aw-watcher-window";
pub const AFK_BUCKET_PREFIX: &str = "aw-watcher-afk";

/// Half-open query range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    timeperiods: Vec<String>,
    query: Vec<String>,
}

pub fn bucket_id(prefix: &str, hostname: &str) -> String {
    format!("{}_{}", prefix, hostname)
}

/// Dumps the raw nextblock marker bucket.
pub fn nextblock_query(hostname: &str) -> String {
    format!(
        "RETURN = query_bucket(\"{}\");",
        bucket_id(NEXTBLOCK_BUCKET_PREFIX, hostname)
    )
}

/// Runs window events through `categorize` with the given classes.
pub fn categorize_query(hostname: &str, classes: &[CategoryClass]) -> Result<String> {
    let rules: Vec<(&[String], &Value)> = classes
        .iter()
        .map(|class| (class.name.as_slice(), &class.rule))
        .collect();

    Ok(format!(
        "events = query_bucket(\"{}\");\nevents = categorize(events, {});\nRETURN = events;",
        bucket_id(WINDOW_BUCKET_PREFIX, hostname),
        serde_json::to_string(&rules)?
    ))
}

/// Keeps only AFK events whose status is "afk".
pub fn afk_query(hostname: &str) -> String {
    format!(
        "afk_events = query_bucket(\"{}\");\nafk = filter_keyvals(afk_events, \"status\", [\"afk\"]);\nRETURN = afk;",
        bucket_id(AFK_BUCKET_PREFIX, hostname)
    )
}

/// Client for the ActivityWatch REST API
pub struct AwClient {
    client: Client,
    base_url: Url,
}

impl AwClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base_url = validate_server_url(server_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(AwClient {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidResponse(format!("bad endpoint {}: {}", path, e)).into())
    }

    /// Reads one setting value, e.g. `classes` or `theme`.
    pub async fn get_setting(&self, key: &str) -> Result<Value> {
        let url = self.endpoint(&format!("api/0/settings/{}", key))?;
        debug!(%url, key, "Fetching setting");

        let response = self.client.get(url.clone()).send().await?;
        let body = Self::read_body(&url, response).await?;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("setting {}: {}", key, e)).into()
        })
    }

    pub async fn get_classes(&self) -> Result<Vec<CategoryClass>> {
        let value = self.get_setting("classes").await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("classes: {}", e)).into())
    }

    pub async fn get_theme(&self) -> Result<Theme> {
        let value = self.get_setting("theme").await?;
        Ok(Theme::from_setting(&value))
    }

    /// Runs one query script over one time period and returns its events.
    pub async fn query(&self, period: &TimePeriod, script: &str) -> Result<Vec<Event>> {
        let url = self.endpoint("api/0/query/")?;
        let request_body = QueryRequest {
            timeperiods: vec![period.to_string()],
            query: vec![script.to_string()],
        };
        debug!(%url, %period, "Submitting query");

        let response = self.client.post(url.clone()).json(&request_body).send().await?;
        let body = Self::read_body(&url, response).await?;

        parse_query_response(&body)
    }

    async fn read_body(url: &Url, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::RequestFailed {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response.text().await?)
    }
}

/// Takes the first period's events from a query response.
pub fn parse_query_response(body: &str) -> Result<Vec<Event>> {
    let periods: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("query response: {}", e)))?;

    match periods.into_iter().next() {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(events) => serde_json::from_value(events)
            .map_err(|e| ApiError::InvalidResponse(format!("query events: {}", e)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_fake_server, FakeData};
    use serde_json::json;

    fn period() -> TimePeriod {
        TimePeriod {
            start: DateTime::parse_from_rfc3339("2024-05-01T00:00:00+02:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2024-05-02T00:00:00+02:00").unwrap(),
        }
    }

    #[test]
    fn test_bucket_ids() {
        assert_eq!(
            bucket_id(NEXTBLOCK_BUCKET_PREFIX, "laptop"),
            "aw-watcher-nextblock_laptop"
        );
        assert_eq!(bucket_id(AFK_BUCKET_PREFIX, "laptop"), "aw-watcher-afk_laptop");
    }

    #[test]
    fn test_time_period_display() {
        assert_eq!(
            period().to_string(),
            "2024-05-01T00:00:00+02:00/2024-05-02T00:00:00+02:00"
        );
    }

    #[test]
    fn test_query_scripts() {
        assert_eq!(
            nextblock_query("laptop"),
            r#"RETURN = query_bucket("aw-watcher-nextblock_laptop");"#
        );

        let afk = afk_query("laptop");
        assert!(afk.contains(r#"query_bucket("aw-watcher-afk_laptop")"#));
        assert!(afk.contains(r#"filter_keyvals(afk_events, "status", ["afk"])"#));

        let classes: Vec<CategoryClass> = serde_json::from_value(json!([
            {"name": ["Work"], "rule": {"type": "regex", "regex": "code"}},
            {"name": ["Work", "Email"], "rule": {"type": "none"}, "data": {"color": "#f00"}}
        ]))
        .unwrap();
        let script = categorize_query("laptop", &classes).unwrap();
        assert!(script.contains(r#"query_bucket("aw-watcher-window_laptop")"#));
        assert!(script.contains(
            r#"categorize(events, [[["Work"],{"regex":"code","type":"regex"}],[["Work","Email"],{"type":"none"}]])"#
        ));
        assert!(script.ends_with("RETURN = events;"));
    }

    #[test]
    fn test_parse_query_response() {
        let events = parse_query_response(
            r#"[[{"timestamp": "2024-05-01T10:00:00Z", "duration": 5, "data": {}}]]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration, 5.0);

        assert!(parse_query_response("[]").unwrap().is_empty());
        assert!(parse_query_response("[null]").unwrap().is_empty());
        assert!(parse_query_response(r#"{"error": "x"}"#).is_err());
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let client = AwClient::new("http://localhost:5600/aw").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5600/aw/");
        assert!(AwClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_settings_and_query_against_fake_server() {
        let server = spawn_fake_server(FakeData {
            classes: json!([{"name": ["Work"], "rule": {"type": "none"}, "data": {"color": "#123456"}}]),
            theme: json!("dark"),
            nextblock: json!([{"timestamp": "2024-05-01T10:00:00Z", "duration": 60, "data": {"block": "A"}}]),
            ..FakeData::default()
        })
        .await;
        let client = AwClient::new(&server.url).unwrap();

        let classes = client.get_classes().await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].color(), Some("#123456"));
        assert_eq!(client.get_theme().await.unwrap(), Theme::Dark);

        let events = client
            .query(&period(), &nextblock_query("laptop"))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_name(), "A");

        let requests = server.query_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0]["timeperiods"],
            json!(["2024-05-01T00:00:00+02:00/2024-05-02T00:00:00+02:00"])
        );
    }

    #[tokio::test]
    async fn test_error_status_is_request_failed() {
        let server = spawn_fake_server(FakeData {
            fail_settings: true,
            ..FakeData::default()
        })
        .await;
        let client = AwClient::new(&server.url).unwrap();

        let err = client.get_setting("theme").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::BlockchartError::Api(ApiError::RequestFailed { status: 500, .. })
        ));
    }
}
