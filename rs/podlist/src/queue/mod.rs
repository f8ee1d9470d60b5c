mod queue;
mod ratelimit;

pub use queue::{ShutdownGuard, WorkQueue};
pub use ratelimit::{
    default_controller_rate_limiter, BucketRateLimiter, ItemExponentialFailureRateLimiter,
    MaxOfRateLimiter, RateLimiter,
};
