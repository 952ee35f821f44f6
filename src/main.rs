//! Codegen harness CLI entry point

fn main() {
    // Logs go to stderr; stdout belongs to the cargo and compiler children
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    codegen_harness::cli::run();
}
