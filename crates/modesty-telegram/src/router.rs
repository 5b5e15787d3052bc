use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use modesty_core::{
    audit::AuditLogger,
    classifier::Classifier,
    config::Config,
    messaging::port::MessagingPort,
    pipeline::Moderator,
    policy::{JsonPolicyStore, PolicyStore},
};

use crate::handlers;
use crate::media::TelegramMediaResolver;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PolicyStore>,
    pub messenger: Arc<dyn MessagingPort>,
    pub moderator: Arc<Moderator>,
    pub audit: Option<Arc<AuditLogger>>,
    /// Cancelled on process shutdown; aborts in-flight pipeline calls.
    pub shutdown: CancellationToken,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    classifier: Arc<dyn Classifier>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!(username = %me.username(), "modesty started");
    }
    info!(
        endpoint = %cfg.classifier_endpoint,
        store = %cfg.policy_store_path.display(),
        "serving"
    );

    let store: Arc<dyn PolicyStore> = Arc::new(JsonPolicyStore::open(&cfg.policy_store_path)?);
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let resolver = Arc::new(TelegramMediaResolver::new(bot.clone(), cfg.temp_dir.clone()));
    let audit = cfg
        .audit_log_path
        .as_ref()
        .map(|p| Arc::new(AuditLogger::new(p.clone(), cfg.audit_log_json)));

    let mut moderator = Moderator::new(store.clone(), classifier, resolver, messenger.clone());
    if let Some(a) = &audit {
        moderator = moderator.with_audit(a.clone());
    }

    let state = Arc::new(AppState {
        store,
        messenger,
        moderator: Arc::new(moderator),
        audit,
        shutdown: shutdown.clone(),
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!(error = %e, "dispatcher was not running at shutdown"),
        }
    });

    dispatcher.dispatch().await;
    info!("dispatcher stopped");

    Ok(())
}
