use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Single object response.
/// Wire: `{ "object": "server_schedule", "attributes": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub object: String,
    pub attributes: T,
}

impl<T> Envelope<T> {
    pub fn new(object: impl Into<String>, attributes: T) -> Self {
        Self {
            object: object.into(),
            attributes,
        }
    }

    /// Unwrap the attributes, checking the object discriminator first.
    pub fn expect_object(self, object: &str) -> Result<T, ProtocolError> {
        if self.object != object {
            return Err(ProtocolError::UnexpectedObject {
                expected: object.to_string(),
                found: self.object,
            });
        }
        Ok(self.attributes)
    }
}

/// List response.
/// Wire: `{ "object": "list", "data": [ { "object": ..., "attributes": ... } ] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub object: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<Envelope<T>>,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<Envelope<T>>) -> Self {
        Self {
            object: crate::paths::OBJECT_LIST.to_string(),
            data,
        }
    }

    /// Unwrap every item, checking each discriminator.
    pub fn expect_items(self, object: &str) -> Result<Vec<T>, ProtocolError> {
        self.data
            .into_iter()
            .map(|item| item.expect_object(object))
            .collect()
    }
}

impl<T> Default for ListEnvelope<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
