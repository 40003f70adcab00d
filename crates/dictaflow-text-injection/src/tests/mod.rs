//! Shared test support and end-to-end tests against the mock platform.

pub mod mock_platform;


/// Initialize tracing for tests with debug level - resilient to multiple calls.
#[allow(dead_code)]
pub fn init_test_tracing() {
    use std::sync::Once;
    use tracing_subscriber::{fmt, EnvFilter};

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}
