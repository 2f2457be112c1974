pub mod address;
pub mod booking;
pub mod job;
pub mod money;
pub mod user;

use serde::{Deserialize, Serialize};

/// Plain `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
