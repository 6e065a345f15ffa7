use std::sync::Arc;

use cmdgraph_diagnostics::SyntaxError;
use tracing::{debug, trace};

use super::CommandContext;
use crate::command::{Command, ResultConsumer, Source};

/// Kind of the first stage of a [`ContextChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A redirect modifier maps sources for the next stage.
    Modify,
    /// The terminal handler runs.
    Execute,
}

/// A finished context flattened into its redirect stages: zero or more
/// modifier contexts followed by one executable context.
pub struct ContextChain<S> {
    modifiers: Vec<CommandContext<S>>,
    executable: CommandContext<S>,
    command: Command<S>,
}

impl<S: Clone> Clone for ContextChain<S> {
    fn clone(&self) -> Self {
        Self {
            modifiers: self.modifiers.clone(),
            executable: self.executable.clone(),
            command: Arc::clone(&self.command),
        }
    }
}

impl<S: Source> ContextChain<S> {
    /// Walk `context`'s redirect chain. Returns `None` when the innermost
    /// context has no handler.
    pub fn try_flatten(context: &CommandContext<S>) -> Option<Self> {
        let mut modifiers = Vec::new();
        let mut current = context;
        while let Some(child) = current.child() {
            modifiers.push(current.clone());
            current = child;
        }
        let command = Arc::clone(current.command()?);
        Some(Self {
            modifiers,
            executable: current.clone(),
            command,
        })
    }

    /// Whether the next step modifies sources or executes.
    pub fn stage(&self) -> Stage {
        if self.modifiers.is_empty() {
            Stage::Execute
        } else {
            Stage::Modify
        }
    }

    /// Context of the first stage.
    pub fn top_context(&self) -> &CommandContext<S> {
        self.modifiers.first().unwrap_or(&self.executable)
    }

    /// The chain without its first modifier stage, or `None` at the
    /// execute stage.
    pub fn next_stage(&self) -> Option<Self> {
        if self.modifiers.is_empty() {
            return None;
        }
        Some(Self {
            modifiers: self.modifiers[1..].to_vec(),
            executable: self.executable.clone(),
            command: Arc::clone(&self.command),
        })
    }

    /// The terminal context.
    pub fn executable(&self) -> &CommandContext<S> {
        &self.executable
    }

    /// Number of modifier stages.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Run every stage starting from `source`.
    ///
    /// Once any stage forks, failures are reported to `consumer` and drop
    /// only the failing source; before that they abort the chain. The
    /// result is the sum over all executed sources.
    pub fn execute_all(&self, source: S, consumer: &dyn ResultConsumer<S>) -> Result<i32, SyntaxError> {
        if self.modifiers.is_empty() {
            return self.run_executable(source, consumer, false);
        }

        let mut forked = false;
        let mut sources = vec![source];
        for (index, modifier) in self.modifiers.iter().enumerate() {
            forked |= modifier.is_forked();
            let mut next = Vec::new();
            for source in sources {
                next.extend(run_modifier(modifier, source, consumer, forked)?);
            }
            trace!(stage = index, sources = next.len(), forked, "modifier stage done");
            if next.is_empty() {
                return Ok(0);
            }
            sources = next;
        }

        let mut result = 0_i32;
        for source in sources {
            result = result.wrapping_add(self.run_executable(source, consumer, forked)?);
        }
        Ok(result)
    }

    fn run_executable(
        &self,
        source: S,
        consumer: &dyn ResultConsumer<S>,
        forked: bool,
    ) -> Result<i32, SyntaxError> {
        let context = self.executable.copy_for(source);
        match (self.command)(&context) {
            Ok(result) => {
                consumer.on_command_complete(&context, true, result);
                Ok(result)
            }
            Err(err) => {
                consumer.on_command_complete(&context, false, 0);
                if forked {
                    debug!(error = %err, "forked command failed");
                    Ok(0)
                } else {
                    Err(err)
                }
            }
        }
    }
}

fn run_modifier<S: Source>(
    modifier: &CommandContext<S>,
    source: S,
    consumer: &dyn ResultConsumer<S>,
    forked: bool,
) -> Result<Vec<S>, SyntaxError> {
    let Some(redirect) = modifier.redirect_modifier() else {
        return Ok(vec![source]);
    };
    let context = modifier.copy_for(source);
    match redirect(&context) {
        Ok(sources) => Ok(sources),
        Err(err) => {
            consumer.on_command_complete(&context, false, 0);
            if forked {
                debug!(error = %err, "forked redirect modifier failed");
                Ok(Vec::new())
            } else {
                Err(err)
            }
        }
    }
}
