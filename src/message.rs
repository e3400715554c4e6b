//! The JSON body for successful requests that have nothing else to return.

use serde::{Deserialize, Serialize};

use crate::extract::Json;

/// A confirmation message for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What the server did.
    pub message: String,
}

/// Wrap `text` in a JSON [MessageResponse].
pub fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_owned(),
    })
}
