use crate::bot::handlers::{self, Command};
use crate::bot::RelayContext;
use crate::config::BotSettings;
use crate::platform::TelegramPlatform;
use autoforward_core::platform::ChannelClient;
use autoforward_core::wizard::ForwardMode;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let bot = Bot::new(settings.telegram.bot_token.clone());
    let platform = init_platform(bot.clone(), &settings).await;
    let context = Arc::new(RelayContext::new(
        platform,
        settings.relay.executor_config(),
    ));
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![context, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn init_platform(bot: Bot, settings: &BotSettings) -> Arc<dyn ChannelClient> {
    let platform = match TelegramPlatform::connect(bot, settings.telegram.as_ref()).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize Telegram platform: {e:#}");
            std::process::exit(1);
        }
    };
    match platform.self_identity().await {
        Ok(name) => info!("Signed in as {name}"),
        Err(e) => {
            error!("Failed to resolve bot identity: {e}");
            std::process::exit(1);
        }
    }
    Arc::new(platform)
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.chat.is_private() && msg.text().is_some())
                .endpoint(handle_text),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    context: Arc<RelayContext>,
) -> Result<(), teloxide::RequestError> {
    let user_id = handlers::get_user_id_safe(&msg);
    info!(user_id, command = ?cmd, "Command received");

    let res = match cmd {
        Command::Start => handlers::start(bot, msg).await,
        Command::Forward => handlers::open_setup(bot, msg, context, ForwardMode::Simple).await,
        Command::ForwardEdit => handlers::open_setup(bot, msg, context, ForwardMode::Edit).await,
        Command::Status => handlers::status(bot, msg, context).await,
        Command::Stop => handlers::stop(bot, msg, context).await,
    };

    if let Err(e) = res {
        error!(user_id, "Command error: {e}");
    }

    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    context: Arc<RelayContext>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_conversation(bot, msg, context).await {
        error!("Conversation handler error: {e}");
    }
    respond(())
}
