use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{FactsError, FactsResult};
use crate::facts::FactsTarget;
use crate::rest::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// API credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthToken(String);

impl OAuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OAuthToken(********)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl FromStr for State {
    type Err = FactsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(FactsError::InvalidChoice {
                name: "state",
                choices: "present, absent",
                value: other.to_string(),
            }),
        }
    }
}

/// Invocation input as received, before any validation.
#[derive(Clone, Debug, Default)]
pub struct FactsParams {
    pub oauth_token: Option<String>,
    pub state: Option<String>,
    pub ip: Option<String>,
    pub region: Option<String>,
    pub droplet_id: Option<String>,
    pub api_url: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct FactsConfig {
    pub target: FactsTarget,
    pub oauth_token: OAuthToken,
    pub state: State,
    pub ip: Option<String>,
    pub region: Option<String>,
    pub droplet_id: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl FactsParams {
    /// Validates the parameters for `target`, falling back to the target's
    /// token environment variables (in order) through `lookup`.
    pub fn resolve<F>(self, target: FactsTarget, lookup: F) -> FactsResult<FactsConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let oauth_token = non_empty(self.oauth_token)
            .or_else(|| {
                target
                    .token_env_vars()
                    .iter()
                    .find_map(|name| non_empty(lookup(name)))
            })
            .map(OAuthToken::new)
            .ok_or(FactsError::MissingArgument("oauth_token"))?;

        let state = match self.state.as_deref() {
            Some(state) => state.parse()?,
            None => State::default(),
        };

        Ok(FactsConfig {
            target,
            oauth_token,
            state,
            ip: self.ip,
            region: self.region,
            droplet_id: self.droplet_id,
            api_url: self.api_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
