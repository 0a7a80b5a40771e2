mod bootstrap;
mod chat;
mod render;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use folio_assistant::SubmitOutcome;
use folio_config::{Config, ConfigManager};
use folio_contact::{ContactError, ContactForm, StatusBoard, SubmitStatus};
use folio_observability::{LogManager, LoggingConfig};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio chat assistant")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, env = "FOLIO_CONFIG", default_value = "~/.folio/config.json")]
    config: String,

    /// Use scripted replies only, never call the remote endpoint
    #[arg(long, default_value = "false")]
    offline: bool,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动交互式聊天
    Chat,
    /// 发送单条消息
    Ask {
        /// 消息内容
        message: String,
    },
    /// 会话历史
    History(HistoryArgs),
    /// 发送联系表单
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// 配置管理命令
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommands,
}

#[derive(Subcommand, Clone)]
enum HistoryCommands {
    /// 列出已归档的会话
    List,
    /// 显示某个会话
    Show {
        /// 会话 ID
        id: String,
    },
    /// 清空历史
    Clear,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// 获取配置值
    Get {
        /// 配置键 (如: remote.endpoint, history.capacity)
        key: String,
    },
    /// 设置配置值
    Set {
        /// 配置键 (如: remote.endpoint, history.capacity)
        key: String,
        /// 配置值
        value: String,
    },
    /// 初始化默认配置
    Init {
        /// 强制覆盖已有配置
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// 显示当前配置
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = folio_config::expand_tilde(&cli.config).unwrap_or_else(|| PathBuf::from(&cli.config));
    if cli.debug {
        eprintln!("{}", format!("[DEBUG] using config {:?}", config_path).dimmed());
    }

    match cli.command {
        Commands::Chat => {
            let mut manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;
            let log_manager = Arc::new(Mutex::new(init_logging(&config, cli.debug)?));
            if !cli.debug {
                if let Err(e) = bootstrap::follow_log_level(&mut manager, log_manager.clone()) {
                    tracing::warn!("Config changes will need a restart: {}", e);
                }
            }
            let assistant = bootstrap::build_assistant(&config, cli.offline).await?;
            chat::run_chat(assistant, cli.debug).await
        }
        Commands::Ask { message } => {
            let (config, _log_manager) = load_runtime(&config_path, cli.debug).await?;
            ask(&config, &message, cli.offline, cli.debug).await
        }
        Commands::History(args) => {
            let (config, _log_manager) = load_runtime(&config_path, cli.debug).await?;
            handle_history(args, &config).await
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let (config, _log_manager) = load_runtime(&config_path, cli.debug).await?;
            send_contact(&config, ContactForm::new(name, email, subject, message)).await
        }
        Commands::Config(args) => handle_config(args, &config_path).await,
    }
}

/// Load the config and install logging. The returned manager must outlive the
/// command so buffered file logs are flushed.
async fn load_runtime(config_path: &Path, debug: bool) -> anyhow::Result<(Config, LogManager)> {
    let config = ConfigManager::load(config_path).await?.snapshot().await;
    let log_manager = init_logging(&config, debug)?;
    Ok((config, log_manager))
}

fn init_logging(config: &Config, debug: bool) -> anyhow::Result<LogManager> {
    let mut logging = LoggingConfig::from(&config.logging);
    if debug {
        logging = logging.with_level("debug");
    }
    Ok(LogManager::new(logging)?)
}

async fn init_config(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("{}", format!("⚠️  {:?} already exists (pass --force to replace it)", config_path).yellow());
        return Ok(());
    }

    let manager = ConfigManager::new(Config::default(), config_path.to_path_buf());
    manager.save().await?;

    println!("{}", format!("✅ Wrote default config to {:?}", config_path).green());
    Ok(())
}

async fn ask(config: &Config, message: &str, offline: bool, debug: bool) -> anyhow::Result<()> {
    let assistant = bootstrap::build_assistant(config, offline).await?;

    match assistant.submit(message).await {
        SubmitOutcome::Replied(receipt) => {
            if debug {
                eprintln!("{}", format!("[DEBUG] reply source: {}", receipt.source).dimmed());
            }
            let reply = assistant
                .messages()
                .into_iter()
                .find(|m| m.id == receipt.message_id);
            if let Some(reply) = reply {
                let fragment = assistant.renderer().render(&reply.content);
                println!("{}", render::render_terminal(&fragment));
            }
        }
        SubmitOutcome::Rejected(reason) => {
            println!("{}", format!("❌ {}", reason).red());
            std::process::exit(1);
        }
        SubmitOutcome::Discarded => {}
    }

    assistant.end_chat().await;
    Ok(())
}

async fn handle_history(args: HistoryArgs, config: &Config) -> anyhow::Result<()> {
    let history = bootstrap::build_history(&config.history).await?;

    match args.command {
        HistoryCommands::List => {
            let entries = history.list().await?;
            if entries.is_empty() {
                println!("{}", "No archived conversations.".dimmed());
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.session_id.dimmed(),
                    entry.title.bold(),
                    format!(
                        "({} messages, {})",
                        entry.message_count(),
                        entry.archived_at.format("%Y-%m-%d %H:%M")
                    )
                    .dimmed()
                );
            }
        }
        HistoryCommands::Show { id } => {
            let Some(entry) = history.load(&id).await? else {
                println!("{}", format!("❌ No archived conversation: {}", id).red());
                std::process::exit(1);
            };

            let renderer = folio_markup::MarkupRenderer::new(config.markup.clone());
            println!("{}", entry.title.cyan().bold());
            println!();
            for message in &entry.messages {
                if message.is_user() {
                    println!("{} {}", "You:".cyan().bold(), message.content);
                } else {
                    println!("{}", "Assistant:".green().bold());
                    println!("{}", render::render_terminal(&renderer.render(&message.content)));
                }
                println!();
            }
        }
        HistoryCommands::Clear => {
            history.clear().await?;
            println!("{}", "✅ History cleared".green());
        }
    }

    Ok(())
}

async fn send_contact(config: &Config, form: ContactForm) -> anyhow::Result<()> {
    if let Err(errors) = form.validate() {
        for error in errors {
            println!("{}", format!("❌ {}", error).red());
        }
        std::process::exit(1);
    }

    let relay = bootstrap::build_relay(&config.contact)?;
    let result = relay.send(&form).await;

    let mut board = StatusBoard::default();
    let status = board.record_result(&result);
    if let Some(banner) = status.banner() {
        match status {
            SubmitStatus::Success => println!("{}", banner.green()),
            _ => println!("{}", banner.red()),
        }
    }

    match result {
        Ok(()) => Ok(()),
        Err(ContactError::Rejected(message)) => {
            eprintln!("{}", message.dimmed());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_config(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => match ConfigManager::load(config_path).await?.get_value(&key).await {
            Some(value) => {
                println!("{}", format!("{} = {}", key, value).green());
            }
            None => {
                println!("{}", format!("❌ {} is unset or not a known key", key).red());
                std::process::exit(1);
            }
        },
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(config_path).await?;
            if let Err(e) = manager.set_value(&key, &value).await {
                eprintln!("{}", format!("❌ {}", e).red());
                std::process::exit(1);
            }
            println!("{}", format!("✅ {} = {}", key, value).green());
        }
        ConfigCommands::Init { force } => init_config(config_path, force).await?,
        ConfigCommands::Show => {
            let config = ConfigManager::load(config_path).await?.snapshot().await;
            println!("{}", format!("📋 {:?}", config_path).cyan().bold());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
