pub mod ask;
pub mod collections;
pub mod embed;
pub mod liveness;
pub mod readiness;
pub mod upload;
