//! Version information for asynchttp.

/// Crate version from Cargo.toml
pub const ASYNCHTTP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent by the default transport.
pub fn default_user_agent() -> String {
    format!("asynchttp/{}", ASYNCHTTP_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("asynchttp/"));
        assert!(ua.ends_with(ASYNCHTTP_VERSION));
    }
}
