//! DigitalOcean facts: list read-only API resources and report them as a
//! structured outcome. The transport is a small wrapper around reqwest with an
//! in-memory mock for fully deterministic tests.

pub mod adapter;
pub mod config;
pub mod error;
pub mod facts;
pub mod mock;
pub mod outcome;
pub mod response;
pub mod rest;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest,
    RestResponse, RestResult, RestTransport, RestTransportState,
};
pub use config::{FactsConfig, FactsParams, OAuthToken, State};
pub use error::{FactsError, FactsResult};
pub use facts::{FactsTarget, facts_outcome, fetch_facts, invoke, run};
pub use mock::{MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot};
pub use outcome::Outcome;
pub use response::{Response, ResponseInfo, TRANSPORT_FAILURE_STATUS};
pub use rest::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Rest};
