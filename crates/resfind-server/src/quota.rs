//! Token bucket guarding the search route.
//!
//! Every search spends upstream API quota, so one bucket is shared by all
//! clients of a deployment. Health and taxonomy listing are never charged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use tokio::sync::Mutex;

use crate::api::ApiError;
use crate::middleware::RequestId;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug, Clone)]
pub struct SearchQuota {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl SearchQuota {
    /// Sustains `per_minute` searches and allows a burst of the same size.
    /// Zero is treated as one.
    #[must_use]
    pub fn per_minute(per_minute: u32) -> Self {
        let capacity = f64::from(per_minute.max(1));
        Self {
            capacity,
            refill_per_sec: capacity / 60.0,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Takes one token, or returns how long until the next one refills.
    pub(crate) async fn try_acquire(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut bucket = self.bucket.lock().await;
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - bucket.tokens) / self.refill_per_sec,
            ))
        }
    }
}

/// Whole seconds to advertise in `retry-after`, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
}

/// Rejects a search with `429 rate_limited` once the quota is spent.
pub async fn enforce_search_quota(
    State(quota): State<SearchQuota>,
    Extension(req_id): Extension<RequestId>,
    req: Request,
    next: Next,
) -> Response {
    let wait = match quota.try_acquire().await {
        Ok(()) => return next.run(req).await,
        Err(wait) => wait,
    };

    let retry_after = retry_after_secs(wait);
    tracing::warn!(
        request_id = %req_id.0,
        retry_after,
        "search quota exhausted"
    );

    let mut response = ApiError::new(
        req_id.0,
        "rate_limited",
        format!("search rate limit exceeded; retry in {retry_after}s"),
    )
    .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
