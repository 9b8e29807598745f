//! Shared building blocks for the article directory workspace:
//! logging setup, small wire types and startup environment checks.

pub mod types;
pub mod utils;
pub mod env;

pub use types::{Envelope, Health};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn envelope_uses_camel_case_status() {
        let env = Envelope::success(201, serde_json::json!({"id": "k"}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["message"], "success");
        assert_eq!(v["statusCode"], 201);
        assert_eq!(v["data"]["id"], "k");
    }
}
