use std::future::Future;
use std::time::Duration;

use crate::errors::DispatchError;

/// An explicit deadline must leave at least this much room.
pub const MIN_HEADROOM_SECS: i64 = 5;

/// Default whole-request budget when the caller sends no deadline.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;

/// Absolute point in time (epoch seconds) by which the request must
/// complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline {
    pub at: i64,
}

impl Deadline {
    /// Derive the deadline from the inbound hint or the configured budget.
    ///
    /// An explicit hint is taken as absolute epoch seconds and must leave
    /// `MIN_HEADROOM_SECS` of room, else the request is rejected before
    /// dispatch. An unparsable hint is treated as absent.
    pub fn resolve(
        now: i64,
        hint: Option<&str>,
        default_budget_secs: u64,
    ) -> Result<Self, DispatchError> {
        let explicit = hint.and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(at) => Some(at),
            Err(_) => {
                tracing::warn!(value = raw, "invalid X-Timeout header");
                None
            }
        });

        match explicit {
            Some(at) => {
                if at < now + MIN_HEADROOM_SECS {
                    return Err(DispatchError::timeout_in_past());
                }
                Ok(Self { at })
            }
            None => Ok(Self {
                at: now + default_budget_secs as i64,
            }),
        }
    }

    pub fn remaining(&self, now: i64) -> Duration {
        Duration::from_secs((self.at - now).max(0) as u64)
    }

    /// Run `fut` under this deadline. Cancellation is cooperative: elapse
    /// drops the future at its next suspension point, which also disarms
    /// the timer on every exit path. Only this elapse maps to a gateway
    /// timeout; no other failure is ever classified as one.
    pub async fn enforce<F>(&self, now: i64, fut: F) -> Result<F::Output, DispatchError>
    where
        F: Future,
    {
        tokio::time::timeout(self.remaining(now), fut)
            .await
            .map_err(|_| DispatchError::gateway_timeout())
    }
}
