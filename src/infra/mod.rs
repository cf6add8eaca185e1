pub mod email;
pub mod factory;
pub mod rate_limiter;
pub mod repositories;
pub mod verification;
