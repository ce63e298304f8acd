//! Demo shell: dispatches lines typed on stdin as chat events.
//!
//! Shows the intended wiring — a descriptor table assembled once at startup,
//! one explicitly owned dispatcher, and a console-backed message sender
//! standing in for the platform client.

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chatforge_commands::{
    ArgumentValue, CommandDescriptor, CommandDispatcher, CommandEvent, CommandHandler,
    CommandRegistry, ControllerDescriptor, CooldownSpec, ParamType, ParameterSpec, TimeUnit,
    TypeAdapterRegistry, ValidatorRegistry,
};
use chatforge_core::{
    Author, ChannelKind, ChatError, Message, MessageEvent, MessageSender, ScopeSettings,
    StaticSettings,
};

#[derive(Parser, Debug)]
#[command(name = "chatforge", about = "Dispatch chat commands typed on stdin")]
struct Args {
    /// Command prefix.
    #[arg(long, default_value = "!")]
    prefix: String,

    /// Log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Platform client stand-in: every outbound message goes to stdout.
struct ConsoleSender;

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send_reply(&self, _event: &MessageEvent, message: Message) -> Result<(), ChatError> {
        println!("{}", message.content);
        Ok(())
    }
}

struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn invoke(&self, event: CommandEvent, _args: Vec<ArgumentValue>) -> Result<()> {
        event.reply("pong").await
    }
}

struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn invoke(&self, event: CommandEvent, args: Vec<ArgumentValue>) -> Result<()> {
        let text = args.first().and_then(|a| a.as_str()).unwrap_or_default();
        event.reply(text).await
    }
}

struct AddHandler;

#[async_trait]
impl CommandHandler for AddHandler {
    async fn invoke(&self, event: CommandEvent, args: Vec<ArgumentValue>) -> Result<()> {
        let a = args[0].as_int().unwrap_or(0);
        let b = args[1].as_int().unwrap_or(0);
        event.reply(format!("{a} + {b} = {}", a + b)).await
    }
}

struct RollHandler;

#[async_trait]
impl CommandHandler for RollHandler {
    async fn invoke(&self, event: CommandEvent, args: Vec<ArgumentValue>) -> Result<()> {
        let sides = args[0].as_int().unwrap_or(6) as u64;
        let roll = rand_offset() % sides + 1;
        event.reply(format!("You rolled a {roll} (d{sides})")).await
    }
}

/// Simple xorshift64, enough for a demo die without a rand dep.
fn rand_offset() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEED: AtomicU64 = AtomicU64::new(0x9e3779b97f4a7c15);
    let x = SEED.load(Ordering::Relaxed);
    let x = x ^ (x << 13);
    let x = x ^ (x >> 7);
    let x = x ^ (x << 17);
    SEED.store(x, Ordering::Relaxed);
    x
}

/// The shell's static command table.
fn descriptors() -> Vec<ControllerDescriptor> {
    vec![
        ControllerDescriptor::new("demo")
            .with_command(
                CommandDescriptor::new(["ping"], Arc::new(PingHandler))
                    .with_description("Round-trip check.")
                    .with_usage("{prefix}ping"),
            )
            .with_command(
                CommandDescriptor::new(["echo", "repeat"], Arc::new(EchoHandler))
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("text", ParamType::Str).remainder(),
                    ])
                    .with_description("Repeat your message back.")
                    .with_usage("{prefix}echo <text>"),
            )
            .with_command(
                CommandDescriptor::new(["add"], Arc::new(AddHandler))
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("a", ParamType::Int),
                        ParameterSpec::adapted("b", ParamType::Int),
                    ])
                    .with_description("Add two integers.")
                    .with_usage("{prefix}add <a> <b>"),
            )
            .with_command(
                CommandDescriptor::new(["roll"], Arc::new(RollHandler))
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("sides", ParamType::Int)
                            .with_default("6")
                            .with_constraint("min", json!(2), "a die needs at least two sides"),
                    ])
                    .with_cooldown(CooldownSpec::new(5, TimeUnit::Seconds))
                    .with_description("Roll a die (5s cooldown).")
                    .with_usage("{prefix}roll [sides]"),
            ),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&logging::LogConfig { level: args.log_level.clone(), dir: None })?;

    let adapters = Arc::new(TypeAdapterRegistry::new());
    let validators = Arc::new(ValidatorRegistry::new());
    let registry = CommandRegistry::build(descriptors(), &adapters, &validators)?;
    let settings = StaticSettings::new(ScopeSettings::default().with_prefix(&args.prefix));

    let dispatcher = CommandDispatcher::new(
        registry,
        adapters,
        validators,
        Arc::new(settings),
        Arc::new(ConsoleSender),
    );

    info!(prefix = %args.prefix, "Shell ready; type commands, Ctrl-D to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let event = MessageEvent::new(
            Some("shell".into()),
            "console",
            ChannelKind::GuildText,
            Author::new("operator", "operator").with_permissions(["moderator"]),
            line,
        );
        dispatcher.dispatch(event).await;
    }

    Ok(())
}
