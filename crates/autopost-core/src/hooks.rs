//! Extension hooks for replication events
//!
//! After a copy is created and after each field category is applied, the
//! engine fires a [`HookEvent`]. Two kinds of listeners receive it:
//! in-process observers registered on a [`HookRegistry`], and command
//! hooks configured as `[[hooks]]` entries and executed as subprocesses.
//! A failing listener never stops replication.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use autopost_meta::FieldCategory;

use crate::copiers::CopyTarget;
use crate::error::{Error, Result};

/// Arguments every hook receives: source site, target site, source id,
/// target id
pub type HookArgs = CopyTarget;

/// Events that can trigger hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// A copy was created on a target site
    DocumentCreated,
    TitleCopied,
    ContentCopied,
    ThumbnailCopied,
    TaxonomiesCopied,
    AttachmentsCopied,
    MetaCopied,
    RelationalMetaCopied,
    ExtendedFieldsCopied,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentCreated => write!(f, "document-created"),
            Self::TitleCopied => write!(f, "title-copied"),
            Self::ContentCopied => write!(f, "content-copied"),
            Self::ThumbnailCopied => write!(f, "thumbnail-copied"),
            Self::TaxonomiesCopied => write!(f, "taxonomies-copied"),
            Self::AttachmentsCopied => write!(f, "attachments-copied"),
            Self::MetaCopied => write!(f, "meta-copied"),
            Self::RelationalMetaCopied => write!(f, "relational-meta-copied"),
            Self::ExtendedFieldsCopied => write!(f, "extended-fields-copied"),
        }
    }
}

impl HookEvent {
    /// Parse a hook event from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document-created" => Some(Self::DocumentCreated),
            "title-copied" => Some(Self::TitleCopied),
            "content-copied" => Some(Self::ContentCopied),
            "thumbnail-copied" => Some(Self::ThumbnailCopied),
            "taxonomies-copied" => Some(Self::TaxonomiesCopied),
            "attachments-copied" => Some(Self::AttachmentsCopied),
            "meta-copied" => Some(Self::MetaCopied),
            "relational-meta-copied" => Some(Self::RelationalMetaCopied),
            "extended-fields-copied" => Some(Self::ExtendedFieldsCopied),
            _ => None,
        }
    }

    /// List all valid event names
    pub fn all_names() -> &'static [&'static str] {
        &[
            "document-created",
            "title-copied",
            "content-copied",
            "thumbnail-copied",
            "taxonomies-copied",
            "attachments-copied",
            "meta-copied",
            "relational-meta-copied",
            "extended-fields-copied",
        ]
    }

    /// Event fired after `category` is applied
    pub fn for_category(category: FieldCategory) -> Self {
        match category {
            FieldCategory::Title => Self::TitleCopied,
            FieldCategory::Content => Self::ContentCopied,
            FieldCategory::Thumbnail => Self::ThumbnailCopied,
            FieldCategory::Taxonomies => Self::TaxonomiesCopied,
            FieldCategory::Attachments => Self::AttachmentsCopied,
            FieldCategory::Meta => Self::MetaCopied,
            FieldCategory::RelationalMeta => Self::RelationalMetaCopied,
            FieldCategory::ExtendedFields => Self::ExtendedFieldsCopied,
        }
    }
}

/// Configuration for a single command hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    /// The event that triggers this hook
    pub event: HookEvent,
    /// The command to execute
    pub command: String,
    /// Arguments to pass to the command
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory override (defaults to the current directory)
    pub working_dir: Option<PathBuf>,
}

/// Variables available to command hooks during execution
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    /// Variables available for substitution in hook args
    pub vars: HashMap<String, String>,
}

impl HookContext {
    /// Create context for one event on one source/target pair
    pub fn for_copy(event: HookEvent, args: &HookArgs) -> Self {
        let mut vars = HashMap::new();
        vars.insert("HOOK_EVENT".to_string(), event.to_string());
        vars.insert("SOURCE_SITE".to_string(), args.source_site.to_string());
        vars.insert("TARGET_SITE".to_string(), args.target_site.to_string());
        vars.insert("SOURCE_ID".to_string(), args.source_id.to_string());
        vars.insert("TARGET_ID".to_string(), args.target_id.to_string());
        Self { vars }
    }
}

/// Result of running a single command hook
#[derive(Debug)]
pub struct HookResult {
    /// The hook that was run
    pub event: HookEvent,
    /// The command that was run
    pub command: String,
    /// Whether the hook succeeded
    pub success: bool,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Exit code
    pub exit_code: Option<i32>,
}

/// In-process hook callback
pub type HookObserver = Box<dyn FnMut(&HookArgs)>;

/// Listeners for replication events
#[derive(Default)]
pub struct HookRegistry {
    observers: Vec<(HookEvent, HookObserver)>,
    commands: Vec<HookConfig>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("observers", &self.observers.len())
            .field("commands", &self.commands)
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry running the given command hooks
    pub fn with_commands(commands: Vec<HookConfig>) -> Self {
        Self {
            observers: Vec::new(),
            commands,
        }
    }

    /// Register an in-process observer for `event`
    pub fn on(&mut self, event: HookEvent, observer: impl FnMut(&HookArgs) + 'static) {
        self.observers.push((event, Box::new(observer)));
    }

    /// Configured command hooks
    pub fn commands(&self) -> &[HookConfig] {
        &self.commands
    }

    /// Notify every listener of `event`, observers first, each kind in
    /// registration order.
    ///
    /// Returns one message per failed command hook; failures are logged
    /// and do not stop the remaining hooks.
    pub fn fire(&mut self, event: HookEvent, args: &HookArgs) -> Vec<String> {
        for (_, observer) in self.observers.iter_mut().filter(|(e, _)| *e == event) {
            observer(args);
        }

        let context = HookContext::for_copy(event, args);
        let mut failures = Vec::new();
        for hook in self.commands.iter().filter(|h| h.event == event) {
            let outcome = execute_hook(hook, &context).and_then(|result| check_result(hook, result));
            if let Err(e) = outcome {
                tracing::warn!("{}", e);
                failures.push(e.to_string());
            }
        }
        failures
    }
}

fn check_result(hook: &HookConfig, result: HookResult) -> Result<HookResult> {
    if result.success {
        tracing::debug!("Hook '{}' ran '{}'", result.event, result.command);
        return Ok(result);
    }
    let stderr_snippet = result.stderr.trim();
    let message = if stderr_snippet.is_empty() {
        format!(
            "Hook exited with non-zero status (exit code: {:?})",
            result.exit_code
        )
    } else {
        format!(
            "Hook exited with non-zero status (exit code: {:?}): {}",
            result.exit_code, stderr_snippet
        )
    };
    Err(Error::HookFailed {
        event: hook.event.to_string(),
        command: hook.command.clone(),
        message,
    })
}

/// Execute a single hook as a subprocess
fn execute_hook(hook: &HookConfig, context: &HookContext) -> Result<HookResult> {
    let args: Vec<String> = hook
        .args
        .iter()
        .map(|arg| substitute_vars(arg, &context.vars))
        .collect();

    let mut command = Command::new(&hook.command);
    command.args(&args).envs(&context.vars);
    if let Some(dir) = &hook.working_dir {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| Error::HookFailed {
        event: hook.event.to_string(),
        command: hook.command.clone(),
        message: e.to_string(),
    })?;

    Ok(HookResult {
        event: hook.event,
        command: hook.command.clone(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
    })
}

/// Substitute ${VAR_NAME} patterns in a string with context variables
fn substitute_vars(input: &str, vars: &HashMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}
