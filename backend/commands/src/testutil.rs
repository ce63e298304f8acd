//! Shared fixtures for the crate's tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chatforge_core::{
    Author, ChannelKind, ChatError, Message, MessageEvent, MessageSender, ScopeSettings,
};

use crate::adapter::TypeAdapterRegistry;
use crate::context::CommandContext;
use crate::dispatch::{CommandEvent, CommandHandler};
use crate::registry::CommandRegistry;
use crate::types::{
    ArgumentValue, CommandDescriptor, ControllerDescriptor, CooldownSpec, ParamType,
    ParameterSpec, TimeUnit,
};
use crate::validation::ValidatorRegistry;

pub struct NoopHandler;

#[async_trait]
impl CommandHandler for NoopHandler {
    async fn invoke(&self, _event: CommandEvent, _args: Vec<ArgumentValue>) -> Result<()> {
        Ok(())
    }
}

pub fn noop_handler() -> Arc<dyn CommandHandler> {
    Arc::new(NoopHandler)
}

/// Counts invocations and records every argument list it receives.
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: AtomicUsize,
    pub args: Mutex<Vec<Vec<ArgumentValue>>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn invoke(&self, _event: CommandEvent, args: Vec<ArgumentValue>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.args.lock().unwrap().push(args);
        Ok(())
    }
}

pub struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn invoke(&self, _event: CommandEvent, _args: Vec<ArgumentValue>) -> Result<()> {
        bail!("boom")
    }
}

/// Records everything the dispatcher hands to the platform client.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(&'static str, Message)>>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(&'static str, Message)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(|(kind, _)| *kind).collect()
    }

    fn record(&self, kind: &'static str, message: Message) {
        self.sent.lock().unwrap().push((kind, message));
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_reply(&self, _event: &MessageEvent, message: Message) -> Result<(), ChatError> {
        self.record("reply", message);
        Ok(())
    }

    async fn send_error(&self, _event: &MessageEvent, message: Message) -> Result<(), ChatError> {
        self.record("error", message);
        Ok(())
    }

    async fn send_generic_help(
        &self,
        _event: &MessageEvent,
        message: Message,
    ) -> Result<(), ChatError> {
        self.record("generic_help", message);
        Ok(())
    }

    async fn send_specific_help(
        &self,
        _event: &MessageEvent,
        message: Message,
    ) -> Result<(), ChatError> {
        self.record("specific_help", message);
        Ok(())
    }
}

pub fn guild_event(content: &str) -> MessageEvent {
    MessageEvent::new(
        Some("guild-1".into()),
        "channel-1",
        ChannelKind::GuildText,
        Author::new("user-1", "alice"),
        content,
    )
}

pub fn dm_event(content: &str) -> MessageEvent {
    MessageEvent::new(
        None,
        "dm-1",
        ChannelKind::DirectMessage,
        Author::new("user-1", "alice"),
        content,
    )
}

pub fn context_for(content: &str) -> CommandContext {
    CommandContext::new(guild_event(content), ScopeSettings::default())
}

/// The descriptor table used across the crate's tests; every command shares
/// the given handler.
pub fn sample_descriptors(handler: Arc<dyn CommandHandler>) -> Vec<ControllerDescriptor> {
    vec![
        ControllerDescriptor::new("util")
            .with_command(
                CommandDescriptor::new(["ping"], handler.clone())
                    .with_description("Round-trip check.")
                    .with_usage("{prefix}ping"),
            )
            .with_command(
                CommandDescriptor::new(["echo"], handler.clone())
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("text", ParamType::Str),
                    ])
                    .with_description("Repeat one word back.")
                    .with_usage("{prefix}echo <text>"),
            )
            .with_command(
                CommandDescriptor::new(["add"], handler.clone())
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("a", ParamType::Int),
                        ParameterSpec::adapted("b", ParamType::Int),
                    ])
                    .with_usage("{prefix}add <a> <b>"),
            )
            .with_command(
                CommandDescriptor::new(["say"], handler.clone()).with_parameters([
                    ParameterSpec::injectable("event"),
                    ParameterSpec::adapted("text", ParamType::Str).remainder(),
                ]),
            )
            .with_command(
                CommandDescriptor::new(["roll"], handler.clone()).with_parameters([
                    ParameterSpec::injectable("event"),
                    ParameterSpec::adapted("sides", ParamType::Int)
                        .with_default("6")
                        .with_constraint("min", json!(2), "need at least two sides"),
                ]),
            )
            .with_command(
                CommandDescriptor::new(["slow"], handler.clone())
                    .with_cooldown(CooldownSpec::new(60, TimeUnit::Seconds)),
            ),
        ControllerDescriptor::new("moderation")
            .with_labels(["mod", ""])
            .with_permissions(["moderator"])
            .guild_only()
            .with_command(
                CommandDescriptor::new(["ban", "b"], handler)
                    .with_parameters([
                        ParameterSpec::injectable("event"),
                        ParameterSpec::adapted("user", ParamType::User),
                        ParameterSpec::adapted("reason", ParamType::Str)
                            .optional()
                            .remainder(),
                    ])
                    .with_usage("{prefix}mod ban <user> [reason]"),
            ),
    ]
}

pub fn sample_registry() -> CommandRegistry {
    CommandRegistry::build(
        sample_descriptors(noop_handler()),
        &TypeAdapterRegistry::new(),
        &ValidatorRegistry::new(),
    )
    .expect("sample registry builds")
}
