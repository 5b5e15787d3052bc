use std::sync::Arc;

use modesty_classifier::HttpClassifier;
use modesty_core::{classifier::Classifier, config::Config};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), modesty_core::Error> {
    modesty_core::logging::init("modesty")?;

    let cfg = Arc::new(Config::load()?);

    let classifier = Arc::new(HttpClassifier::new(
        cfg.classifier_endpoint.clone(),
        cfg.health_timeout,
    )?);
    // An unreachable classifier at startup is fatal.
    classifier.healthy().await?;
    info!(endpoint = %classifier.endpoint(), "classifier is healthy");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                signal.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    modesty_telegram::router::run_polling(cfg, classifier, shutdown)
        .await
        .map_err(|e| modesty_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
