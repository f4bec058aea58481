// Forbid unwrap() in production code; configuration errors are reported, not panicked on.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use auth_server::{CliArgs, ConfigResolver, Defaults, SigningKeys};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = CliArgs::parse();
    let backend = cli.key_backend.backend();
    tracing::debug!("using {} key backend", backend.name());

    let resolver = ConfigResolver::new(Defaults::default(), backend.as_ref());
    let config = resolver.resolve(&cli).unwrap_or_else(|e| fail(&e));

    // The token layer must accept the pair before startup is reported as done.
    let _signing_keys = SigningKeys::from_configuration(&config).unwrap_or_else(|e| fail(&e));

    tracing::info!(
        "Loaded configuration: listen_address={}, users={}, key_backend={}",
        config.socket_addr(),
        config.users().len(),
        backend.name()
    );
}

/// Print a configuration error and terminate.
fn fail(error: &dyn std::fmt::Display) -> ! {
    eprintln!("{error}");
    std::process::exit(1);
}
