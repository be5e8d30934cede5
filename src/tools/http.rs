use std::time::Duration;

use crate::service::ServiceError;
use ureq::Agent;

/// Build a blocking HTTP agent with a global timeout.
///
/// Non-2xx statuses are returned as responses so the body can be reported.
pub fn agent(timeout: Duration) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();

    config.into()
}

/// POST a JSON body and decode the JSON response.
pub fn post_json(
    agent: &Agent,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
) -> Result<serde_json::Value, ServiceError> {
    let mut request = agent.post(url).header("Accept", "application/json");
    if let Some(token) = bearer {
        request = request.header("Authorization", format!("Bearer {token}"));
    }

    let mut response = request.send_json(body)?;
    let code = response.status().as_u16();
    let text = response.body_mut().read_to_string()?;

    if !(200..300).contains(&code) {
        return Err(ServiceError::Status { code, body: text });
    }

    Ok(serde_json::from_str(&text)?)
}
