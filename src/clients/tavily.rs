use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::config::Config;
use crate::service::{SearchHit, SearchService, ServiceError};
use crate::tools::{agent, post_json};

/// Tavily web search client.
pub struct TavilyClient {
    http: Agent,
    url: String,
    api_key: String,
    search_depth: String,
}

impl TavilyClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: agent(config.timeout()),
            url: config.tavily_url.clone(),
            api_key: config.tavily_api_key.clone(),
            search_depth: config.search_depth.clone(),
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

fn parse_hits(body: serde_json::Value, max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
    let response: SearchResponse = serde_json::from_value(body)?;
    Ok(response.results.into_iter().take(max_results).collect())
}

impl SearchService for TavilyClient {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        let body = serde_json::to_value(SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: &self.search_depth,
            max_results,
        })?;
        let reply = post_json(&self.http, &self.url, None, &body)?;
        parse_hits(reply, max_results)
    }
}
