pub mod job_tracker;
pub mod notifications;
pub mod otp;
pub mod payments;
pub mod pricing;
pub mod push;
pub mod queue;
pub mod search;
