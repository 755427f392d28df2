use std::borrow::Cow;

use tracing::{info, warn};

use crate::adapter::Client;
use crate::config::{FactsConfig, FactsParams};
use crate::outcome::Outcome;
use crate::response::Response;
use crate::rest::Rest;

/// Read-only listings this crate can report as facts.
///
/// Only the first page is fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactsTarget {
    FloatingIps,
    SshKeys,
}

impl FactsTarget {
    pub fn path(self) -> &'static str {
        match self {
            // TODO: walk `links.pages.next` once the listing outgrows a single page.
            Self::FloatingIps => "floating_ips?page=1&per_page=20",
            Self::SshKeys => "account/keys",
        }
    }

    pub fn token_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::FloatingIps => &["DO_OAUTH_TOKEN"],
            Self::SshKeys => &["DO_API_TOKEN", "DO_API_KEY"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FloatingIps => "floating_ips",
            Self::SshKeys => "ssh_keys",
        }
    }
}

pub async fn fetch_facts(rest: &Rest, target: FactsTarget) -> Outcome {
    let response = rest.get(target.path(), None, &[]).await;
    facts_outcome(&response)
}

/// Maps a listing response to an outcome: `200` reports the parsed body
/// untouched, anything else fails with the status and the best detail available.
pub fn facts_outcome(response: &Response) -> Outcome {
    let status = response.status_code();
    if status == 200 {
        return Outcome::facts(response.json().cloned());
    }

    let detail = response
        .api_message()
        .or_else(|| response.info().msg.as_deref().map(Cow::Borrowed));
    let msg = match detail {
        Some(detail) => format!("Error fetching facts [{status}: {detail}]"),
        None => format!("Error fetching facts [{status}]"),
    };
    warn!(status, url = %response.info().url, "fetching facts failed");
    Outcome::failure(msg)
}

pub async fn run(config: &FactsConfig, client: Client) -> Outcome {
    let rest = Rest::with_bearer_token(client, config.oauth_token.expose())
        .with_base_url(config.api_url.as_str())
        .with_timeout(Some(config.timeout));
    info!(listing = config.target.name(), "fetching facts");
    fetch_facts(&rest, config.target).await
}

/// Resolves the configuration and runs one fetch. Every error on the way,
/// including a missing token, ends up as a failure outcome.
pub async fn invoke<F>(params: FactsParams, target: FactsTarget, lookup: F, client: Client) -> Outcome
where
    F: Fn(&str) -> Option<String>,
{
    match params.resolve(target, lookup) {
        Ok(config) => run(&config, client).await,
        Err(err) => {
            warn!(error = %err, "invalid configuration");
            Outcome::failure(err.to_string())
        }
    }
}
