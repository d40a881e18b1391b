//! CLI entry point for Parlance.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{
    GenerationConfigStore, Patch, PartialGenerationConfig, PartialReasoningConfig, ProviderSettings,
};
use crate::error::{ParlanceError, Result};
use crate::generation::{GenerationRequest, Pipeline};
use crate::models::{CapabilityRegistry, ModelGenerationCapability};
use crate::provider::OpenRouterProvider;
use crate::types::{ControlMode, ModelMessage, ReasoningEffort, StreamChunk};

/// Parlance CLI
#[derive(Parser, Debug)]
#[command(name = "parlance", version, about = "Inspect and run LLM generation requests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the capability and adapted reasoning payload for a model
    Inspect(InspectArgs),
    /// Stream a reply from a model
    Chat(ChatArgs),
}

/// Reasoning flags shared by both subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ReasoningArgs {
    /// Reasoning control mode (disabled, effort, max_tokens)
    #[arg(long)]
    pub reasoning: Option<ControlMode>,

    /// Reasoning effort (none, low, medium, high)
    #[arg(long)]
    pub effort: Option<ReasoningEffort>,

    /// Numeric reasoning budget in tokens
    #[arg(long)]
    pub budget: Option<u32>,

    /// Total completion budget
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Ask the provider to hide reasoning text
    #[arg(long)]
    pub hide_reasoning: bool,
}

impl ReasoningArgs {
    /// Request override layer built from the flags.
    pub fn overrides(&self) -> PartialGenerationConfig {
        let reasoning = PartialReasoningConfig {
            control_mode: Patch::from_option(self.reasoning),
            effort: Patch::from_option(self.effort),
            max_reasoning_tokens: Patch::from_option(self.budget),
            max_completion_tokens: Patch::from_option(self.max_tokens),
            show_reasoning_content: if self.hide_reasoning {
                Patch::Set(false)
            } else {
                Patch::Absent
            },
        };
        PartialGenerationConfig {
            reasoning: if reasoning == PartialReasoningConfig::default() {
                Patch::Absent
            } else {
                Patch::Set(reasoning)
            },
            ..Default::default()
        }
    }
}

/// Arguments for `parlance inspect`.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Model id (e.g. anthropic/claude-sonnet-4)
    pub model: String,

    /// Provider model-list JSON (an array, or an object with `data`)
    #[arg(long)]
    pub models: PathBuf,

    #[command(flatten)]
    pub reasoning: ReasoningArgs,
}

/// Arguments for `parlance chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Model id
    #[arg(short, long, default_value = "openrouter/auto")]
    pub model: String,

    /// Provider model-list JSON; without it the model gets basic capabilities
    #[arg(long)]
    pub models: Option<PathBuf>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    #[command(flatten)]
    pub reasoning: ReasoningArgs,

    /// User prompt (positional)
    pub prompt: Option<String>,
}

/// Read model records from a provider model-list file.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw)? {
        Value::Array(records) => Ok(records),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ParlanceError::InvalidArgument(format!(
                "{} has no `data` array",
                path.display()
            ))),
        },
        _ => Err(ParlanceError::InvalidArgument(format!(
            "{} is not a model list",
            path.display()
        ))),
    }
}

/// Print the capability, adapter outcome and request body for a model.
pub fn handle_inspect(args: &InspectArgs) -> Result<()> {
    let registry = CapabilityRegistry::from_records(&load_records(&args.models)?);
    let configs = GenerationConfigStore::new();
    let config = configs.resolve(Some(&args.model), None, Some(&args.reasoning.overrides()));
    let capability = registry.get(&args.model)?;
    let outcome = crate::reasoning::ReasoningAdapter::default().adapt(&capability, &config.reasoning);
    let body = crate::provider::prepare_request(&[], &capability, &config, &outcome);

    let report = serde_json::json!({
        "capability": capability,
        "payload": outcome.payload,
        "warnings": outcome.warnings,
        "request": body,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Stream one reply to stdout. Ctrl-C cancels quietly.
pub async fn handle_chat(args: ChatArgs) -> Result<()> {
    let prompt = args
        .prompt
        .clone()
        .ok_or_else(|| ParlanceError::InvalidArgument("missing prompt".into()))?;

    let registry = match &args.models {
        Some(path) => CapabilityRegistry::from_records(&load_records(path)?),
        None => CapabilityRegistry::new(),
    };
    if !registry.contains(&args.model) {
        registry.insert(ModelGenerationCapability::basic(&args.model));
    }

    let provider = OpenRouterProvider::new(ProviderSettings::load()?)?;
    let pipeline = Pipeline::new(registry, GenerationConfigStore::new(), Arc::new(provider));

    let mut overrides = args.reasoning.overrides();
    overrides.temperature = Patch::from_option(args.temperature);
    overrides.system_prompt = Patch::from_option(args.system.clone());

    let request = GenerationRequest::builder()
        .model_id(args.model.clone())
        .messages(vec![ModelMessage::user(prompt)])
        .overrides(overrides)
        .build();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let outcome = pipeline
        .run(&request, cancel, |chunk| {
            let mut out = std::io::stdout();
            match chunk {
                StreamChunk::Text { content } => {
                    let _ = write!(out, "{content}");
                    let _ = out.flush();
                }
                StreamChunk::ReasoningStreamText { text } => eprint!("{text}"),
                StreamChunk::Image { content } => {
                    eprintln!("\n[image: {} bytes]", content.len());
                }
                _ => {}
            }
        })
        .await;
    println!(); // newline after streaming

    match outcome {
        Ok(result) => {
            for warning in &result.warnings {
                eprintln!("note: {} ({})", warning.message, warning.field);
            }
            if let Some(usage) = &result.usage {
                eprintln!(
                    "tokens: prompt={} completion={} reasoning={}",
                    usage.prompt_tokens().unwrap_or(0),
                    usage.completion_tokens().unwrap_or(0),
                    usage.reasoning_tokens().unwrap_or(0)
                );
            }
            Ok(())
        }
        Err(err) if err.is_cancellation() => Ok(()),
        Err(err) => Err(err),
    }
}
