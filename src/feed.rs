use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid feed url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("feed responded with status {status}")]
    Status { status: StatusCode },
    #[error("decode feed: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Post {
    pub title: String,
    pub link: String,
    pub author: String,
    // unix seconds
    pub posted: i64,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, FeedError> {
        let user_agent = if config.user_agent.trim().is_empty() {
            format!("argot/{}", crate::VERSION)
        } else {
            config.user_agent
        };

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .build()
                .map_err(FeedError::Client)?,
        };

        Ok(Client { http, user_agent })
    }

    pub fn fetch(&self, url: &str) -> Result<Vec<Post>, FeedError> {
        let parsed = parse_feed_url(url)?;
        debug!("fetching feed from {parsed}");

        let response = self
            .http
            .get(parsed.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|source| FeedError::Network {
                url: parsed.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FeedError::Status { status });
        }

        let body = response.bytes().map_err(|source| FeedError::Network {
            url: parsed.to_string(),
            source,
        })?;

        let posts = decode_posts(&body)?;
        info!("fetched {} posts from {parsed}", posts.len());
        Ok(posts)
    }
}

fn parse_feed_url(raw: &str) -> Result<Url, FeedError> {
    let invalid = |reason: String| FeedError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

// Only a non-JSON body or a non-array top level fails. Bad fields become empty.
pub fn decode_posts(body: &[u8]) -> Result<Vec<Post>, FeedError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| FeedError::Decode(err.to_string()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(FeedError::Decode(format!(
                "expected a JSON array of posts, found {}",
                kind_of(&other)
            )))
        }
    };

    let mut posts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::Object(fields) => posts.push(post_from_fields(fields)),
            other => debug!("skipping feed entry {index}: {} is not an object", kind_of(other)),
        }
    }
    Ok(posts)
}

fn post_from_fields(fields: &Map<String, Value>) -> Post {
    Post {
        title: string_field(fields, "title"),
        link: string_field(fields, "link"),
        author: string_field(fields, "author"),
        posted: timestamp_field(fields, "posted"),
        content: string_field(fields, "content"),
        tags: tags_field(fields, "tags"),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn timestamp_field(fields: &Map<String, Value>, key: &str) -> i64 {
    match fields.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn tags_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
