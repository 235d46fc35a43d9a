//! Command router - an action that dispatches messages to named commands

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::application::errors::ActionError;
use crate::domain::entities::{
    Command, CommandInfo, CommandRegistry, CommandResult, Invocation, OutputFormat, Payload, Reply,
};
use crate::domain::traits::{Action, Emitter};

/// Text rendered by the built-in `test` command
pub const TEST_COMMAND_REPLY: &str = "Bot test command executed.";

/// Decides whether a successful result is worth emitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Emit whenever the formatted body is non-empty. `{}` is emitted.
    #[default]
    NonEmptyOutput,
    /// Also drop untemplated results whose data is `null`, `{}`, `[]` or `""`
    NonEmptyData,
}

impl EmitPolicy {
    pub fn should_emit(&self, result: &CommandResult, reply: &Reply) -> bool {
        if reply.body.is_empty() {
            return false;
        }
        match self {
            EmitPolicy::NonEmptyOutput => true,
            EmitPolicy::NonEmptyData => {
                result.output_format().has_template() || !result.has_empty_data()
            }
        }
    }
}

/// An action owning a command registry
#[derive(Debug)]
pub struct CommandRouterAction {
    name: String,
    registry: CommandRegistry,
    catalog: Arc<[CommandInfo]>,
    policy: EmitPolicy,
}

impl CommandRouterAction {
    pub fn builder(name: impl Into<String>) -> CommandRouterBuilder {
        CommandRouterBuilder::new(name)
    }

    /// Router with only the built-in commands
    pub fn with_defaults(name: impl Into<String>) -> Result<Self, ActionError> {
        Self::builder(name).build()
    }

    /// Resolves and runs the command named by `data["name"]`
    pub async fn execute(&self, data: &Payload) -> Result<CommandResult, ActionError> {
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::CommandNotFound("<missing name>".to_string()))?;
        let command = self.registry.lookup(name)?;

        tracing::debug!(action = %self.name, command = %name, "Invoking command");
        let invocation = Invocation::new(data.clone()).with_commands(Arc::clone(&self.catalog));
        command.invoke(invocation).await
    }
}

#[async_trait]
impl Action for CommandRouterAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_message(&self, data: &Payload, emit: &dyn Emitter) -> Result<(), ActionError> {
        let result = self.execute(data).await?;
        let reply = result.to_reply()?;

        if self.policy.should_emit(&result, &reply) {
            emit.emit(reply).await?;
        } else {
            tracing::debug!(action = %self.name, "Empty result, nothing to emit");
        }
        Ok(())
    }

    fn list_commands(&self) -> Vec<CommandInfo> {
        self.catalog.to_vec()
    }
}

/// Builder for [`CommandRouterAction`]
pub struct CommandRouterBuilder {
    name: String,
    commands: Vec<Command>,
    builtins: bool,
    formatter: Option<OutputFormat>,
    policy: EmitPolicy,
}

impl CommandRouterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            builtins: true,
            formatter: None,
            policy: EmitPolicy::default(),
        }
    }

    /// Add a command; registered in call order after the built-ins
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Skip the `help` and `test` commands
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Output format for commands that declare no template of their own
    pub fn with_formatter(mut self, format: OutputFormat) -> Self {
        self.formatter = Some(format);
        self
    }

    pub fn with_policy(mut self, policy: EmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers every command. Fails on the first duplicate name.
    pub fn build(self) -> Result<CommandRouterAction, ActionError> {
        let mut registry = CommandRegistry::new();
        let builtins = if self.builtins {
            vec![help_command(), test_command()]
        } else {
            Vec::new()
        };

        for mut command in builtins.into_iter().chain(self.commands) {
            if let Some(format) = &self.formatter {
                if !command.format.has_template() {
                    command.format = format.clone();
                }
            }
            registry.register(command)?;
        }

        let catalog: Arc<[CommandInfo]> = registry.describe().into();
        tracing::debug!(action = %self.name, commands = catalog.len(), "Command router ready");

        Ok(CommandRouterAction {
            name: self.name,
            registry,
            catalog,
            policy: self.policy,
        })
    }
}

/// Lists every command of the owning router
pub fn help_command() -> Command {
    Command::new("help")
        .with_description("Get all available commands.")
        .with_sync_handler(|inv| Ok(json!({ "help": &*inv.commands })))
}

/// Diagnostic command acknowledging with a fixed text
pub fn test_command() -> Command {
    Command::new("test")
        .with_description("This is test command.")
        .with_template(TEST_COMMAND_REPLY, "text/plain")
        .with_sync_handler(|_| {
            tracing::info!("{}", TEST_COMMAND_REPLY);
            Ok(Value::Null)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmitter {
        replies: Mutex<Vec<Reply>>,
    }

    impl RecordingEmitter {
        fn replies(&self) -> Vec<Reply> {
            self.replies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Emitter for RecordingEmitter {
        async fn emit(&self, reply: Reply) -> Result<(), ActionError> {
            self.replies.lock().unwrap().push(reply);
            Ok(())
        }
    }

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => Payload::new(),
        }
    }

    #[tokio::test]
    async fn test_help_lists_commands_in_order() {
        let router = CommandRouterAction::with_defaults("commands").unwrap();
        let result = router.execute(&payload(json!({"name": "help"}))).await.unwrap();

        assert_eq!(
            result.data(),
            &json!({"help": [
                {"name": "help", "description": "Get all available commands."},
                {"name": "test", "description": "This is test command."},
            ]})
        );
        assert_eq!(result.content_type(), "application/json");
        assert_eq!(
            result.format().unwrap(),
            r#"{"help":[{"name":"help","description":"Get all available commands."},{"name":"test","description":"This is test command."}]}"#
        );
    }

    #[tokio::test]
    async fn test_test_command_reply() {
        let router = CommandRouterAction::with_defaults("commands").unwrap();
        let emitter = RecordingEmitter::default();

        router
            .on_message(&payload(json!({"name": "test"})), &emitter)
            .await
            .unwrap();

        assert_eq!(
            emitter.replies(),
            vec![Reply::new("text/plain", "Bot test command executed.")]
        );
    }

    #[tokio::test]
    async fn test_unknown_command_does_not_emit() {
        let router = CommandRouterAction::with_defaults("commands").unwrap();
        let emitter = RecordingEmitter::default();

        let err = router
            .on_message(&payload(json!({"name": "unknown"})), &emitter)
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::CommandNotFound(name) if name == "unknown"));
        assert!(emitter.replies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_non_string_name() {
        let router = CommandRouterAction::with_defaults("commands").unwrap();
        let emitter = RecordingEmitter::default();

        for data in [json!({}), json!({"name": 42})] {
            let err = router.on_message(&payload(data), &emitter).await.unwrap_err();
            assert!(matches!(err, ActionError::CommandNotFound(_)));
        }
        assert!(emitter.replies().is_empty());
    }

    #[tokio::test]
    async fn test_handler_receives_full_payload() {
        let router = CommandRouterAction::builder("echo")
            .without_builtins()
            .command(Command::new("echo").with_sync_handler(|inv| Ok(Value::Object(inv.payload))))
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        router
            .on_message(&payload(json!({"name": "echo", "text": "hi"})), &emitter)
            .await
            .unwrap();

        assert_eq!(emitter.replies()[0].body, r#"{"name":"echo","text":"hi"}"#);
    }

    #[test]
    fn test_duplicate_command_aborts_build() {
        let err = CommandRouterAction::builder("dup")
            .command(Command::new("help"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ActionError::CommandAlreadyRegistered(name) if name == "help"));
    }

    #[test]
    fn test_list_commands_without_builtins() {
        let router = CommandRouterAction::builder("custom")
            .without_builtins()
            .command(Command::new("ping").with_description("Ping"))
            .build()
            .unwrap();
        assert_eq!(
            router.list_commands(),
            vec![CommandInfo {
                name: "ping".into(),
                description: "Ping".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_object_emitted_by_default() {
        let router = CommandRouterAction::builder("empty")
            .command(Command::new("nothing").with_sync_handler(|_| Ok(json!({}))))
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        router
            .on_message(&payload(json!({"name": "nothing"})), &emitter)
            .await
            .unwrap();

        assert_eq!(emitter.replies(), vec![Reply::new("application/json", "{}")]);
    }

    #[tokio::test]
    async fn test_non_empty_data_policy_drops_empty_results() {
        let router = CommandRouterAction::builder("empty")
            .with_policy(EmitPolicy::NonEmptyData)
            .command(Command::new("nothing").with_sync_handler(|_| Ok(json!({}))))
            .command(Command::new("null"))
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        for name in ["nothing", "null"] {
            router
                .on_message(&payload(json!({ "name": name })), &emitter)
                .await
                .unwrap();
        }
        assert!(emitter.replies().is_empty());

        // Templated replies still go out even without data
        router
            .on_message(&payload(json!({"name": "test"})), &emitter)
            .await
            .unwrap();
        assert_eq!(emitter.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_template_output_not_emitted() {
        let router = CommandRouterAction::builder("quiet")
            .command(Command::new("quiet").with_template("", "text/plain"))
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        router
            .on_message(&payload(json!({"name": "quiet"})), &emitter)
            .await
            .unwrap();
        assert!(emitter.replies().is_empty());
    }

    #[tokio::test]
    async fn test_formatter_applies_to_untemplated_commands() {
        let router = CommandRouterAction::builder("fmt")
            .with_formatter(OutputFormat::template("Got {{ value }}", "text/markdown"))
            .command(Command::new("value").with_sync_handler(|_| Ok(json!({"value": 7}))))
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        router
            .on_message(&payload(json!({"name": "value"})), &emitter)
            .await
            .unwrap();
        router
            .on_message(&payload(json!({"name": "test"})), &emitter)
            .await
            .unwrap();

        assert_eq!(
            emitter.replies(),
            vec![
                Reply::new("text/markdown", "Got 7"),
                Reply::new("text/plain", "Bot test command executed."),
            ]
        );
    }

    #[tokio::test]
    async fn test_formatting_error_propagates() {
        let router = CommandRouterAction::builder("fmt")
            .command(
                Command::new("greet")
                    .with_template("Hi {{ who }}", "text/plain")
                    .with_sync_handler(|_| Ok(json!({}))),
            )
            .build()
            .unwrap();
        let emitter = RecordingEmitter::default();

        let err = router
            .on_message(&payload(json!({"name": "greet"})), &emitter)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Formatting(_)));
        assert!(emitter.replies().is_empty());
    }
}
