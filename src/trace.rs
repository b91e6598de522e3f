//! Tracing setup in the "pay only when asked" style: the subscriber is
//! initialised only when `ENUMGEN_LOG` (or `RUST_LOG`) is set, so normal
//! runs carry zero logging overhead.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let spec = std::env::var("ENUMGEN_LOG").or_else(|_| std::env::var("RUST_LOG"));
    let Ok(spec) = spec else { return };
    if spec.is_empty() {
        return;
    }
    let filter = EnvFilter::try_new(&spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
