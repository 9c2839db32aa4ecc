use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber used by the API server.
///
/// `RUST_LOG` wins over the defaults when set.
pub fn init_server_logger(verbose: bool) {
    let default_directives = if verbose {
        "ti_services=debug,tower_http=debug,info"
    } else {
        "ti_services=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}
