use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use lib::channels::{InboundMessage, InstagramResponder};
use lib::generate::ResponseGenerator;
use lib::llm::ClaudeClient;
use lib::pipeline::Pipeline;
use lib::relay::Relay;
use lib::store::MemoryStore;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Instagram chatbot message relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a sample config with one demo bot.
    Init {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run one message through the decision pipeline and print the result.
    Decide {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Bot id from the config's bots list.
        #[arg(long, value_name = "ID")]
        bot: String,

        /// Customer id the reply would be delivered to.
        #[arg(long, value_name = "ID", default_value = "local")]
        customer: String,

        /// The inbound message text.
        #[arg(long, value_name = "TEXT")]
        message: String,

        /// Also persist a transcript row and deliver via Instagram (needs the bot's accessToken).
        #[arg(long)]
        deliver: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Decide {
            config,
            bot,
            customer,
            message,
            deliver,
        }) => {
            if let Err(e) = run_decide(config, bot, customer, message, deliver).await {
                log::error!("decide failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_decide(
    config_path: Option<std::path::PathBuf>,
    bot: String,
    customer: String,
    message: String,
    deliver: bool,
) -> anyhow::Result<()> {
    let (config, _path) = lib::config::load_config(config_path)?;

    let store = Arc::new(MemoryStore::new());
    store.seed_from_config(&config).await;

    let api_key = lib::config::resolve_api_key(&config).unwrap_or_default();
    if api_key.is_empty() {
        log::debug!("no Claude API key configured; AI-enabled bots will degrade");
    }
    let backend = Arc::new(ClaudeClient::new(
        api_key,
        config.claude.model.clone(),
        config.claude.base_url.clone(),
    ));
    let generator = ResponseGenerator::new(
        backend,
        Duration::from_secs(config.claude.timeout_secs),
        config.claude.max_tokens,
    );
    let pipeline = Pipeline::new(
        store.clone(),
        store.clone(),
        store.clone(),
        generator,
        config.context.window_size,
    );

    let inbound = InboundMessage {
        bot_id: bot,
        customer_id: customer,
        text: message,
    };

    let decision = if deliver {
        let responder = Arc::new(InstagramResponder::new(config.instagram.api_base.clone()));
        let relay = Relay::new(store.clone(), pipeline, store.clone(), responder);
        relay.handle(&inbound).await?
    } else {
        pipeline.decide(&inbound).await?
    };

    match decision {
        Some(d) => println!("{}", serde_json::to_string_pretty(&d)?),
        None => println!("blank message, no decision"),
    }
    Ok(())
}
