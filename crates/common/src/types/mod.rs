use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Uniform success wrapper: `{message, statusCode, data}`.
#[derive(Serialize, Debug, Clone)]
pub struct Envelope<T> {
    pub message: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(status_code: u16, data: T) -> Self {
        Self { message: "success", status_code, data }
    }
}
