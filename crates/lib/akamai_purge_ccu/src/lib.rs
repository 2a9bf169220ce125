mod batch;
mod ccu;
mod config;
mod credential;
mod edgerc;
mod error;
mod metrics;
mod request;
mod response;
mod signing;

pub use batch::{ChunkLimits, PurgeChunk, split_into_chunks};
pub use ccu::{Ccu, CcuBehaviour, real::RealCcu};
pub use config::{
    Config, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_URLS_PER_REQUEST, Network, PurgeAction,
    PurgeObjectType, PurgeOptions,
};
pub use credential::Credential;
pub use edgerc::EdgercError;
pub use error::{IncompletePurge, PurgeError};
pub use metrics::CcuMetrics;
pub use request::{APP_USER_AGENT, PurgeRequest};
pub use response::{PurgeOutcome, PurgeResponse};
