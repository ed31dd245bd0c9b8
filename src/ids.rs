//! Request correlation ids.
//!
//! Every dispatch runs under a [`RequestId`]. A caller that already minted one (an upstream
//! service or a retrying client) sends it in [`REQUEST_ID_HEADER`]; a missing or malformed
//! value gets a fresh ULID instead.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::debug;
use ulid::Ulid;

use crate::server::Request;

/// Header a caller may use to supply its own request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Mint a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Id carried by `req`, or a fresh one.
    #[must_use]
    pub fn for_request(req: &Request) -> Self {
        let Some(raw) = req.header(REQUEST_ID_HEADER).map(str::trim) else {
            return Self::generate();
        };
        raw.parse().unwrap_or_else(|err: ulid::DecodeError| {
            debug!(header = %raw, error = %err, "Ignoring malformed request id");
            Self::generate()
        })
    }

    #[must_use]
    pub fn ulid(&self) -> Ulid {
        self.0
    }

    /// Milliseconds since the Unix epoch at which the id was minted.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

// Logged and echoed as the canonical 26 character string.
impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
