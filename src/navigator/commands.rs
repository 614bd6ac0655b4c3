//! Navigator commands.
//!
//! Each command decides for itself whether a typed line is meant for it.
//! The navigator tries them in a fixed order and stops at the first taker,
//! so order matters where matchers overlap: a bare number is a goto, never
//! anything else.

use crate::graph::Term;
use crate::provenance::CompletionDetails;

use super::{NavResult, NavigationContext, NavigatorState};

/// A command the user can type at the navigator prompt.
pub trait CommandHandler {
    /// Keyword shown in help text.
    fn keyword(&self) -> &'static str;

    /// One-line description shown in help text.
    fn description(&self) -> &'static str;

    /// Handle `input` if it is meant for this command.
    ///
    /// Returns `Ok(false)` without side effects when the input does not match.
    fn try_handle(&self, input: &str, ctx: &mut NavigationContext<'_>) -> NavResult<bool>;
}

/// The built-in commands in dispatch order: exit, generate, goto.
pub fn default_commands() -> Vec<Box<dyn CommandHandler>> {
    vec![
        Box::new(ExitCommand),
        Box::new(GenerateCommand),
        Box::new(GotoCommand),
    ]
}

/// Whether `input` is a numeric term reference.
pub fn is_reference(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_digit())
}

/// Query asking for concepts `x` such that `(concept, predicate, x)` holds.
pub fn completion_query(concept: &str, predicate: &str) -> String {
    format!(
        "For what concept x is the following true: \"{concept}\" \"{predicate}\" x ? \
         Name a list of the most relevant concepts x, that are connected in this way to \
         the concept \"{concept}\". The list should be formatted as a json object \
         [\"concept nr 1\", \"concept nr 2\", ...] and contain from 0 to 10 concepts. \
         Return nothing but the list as an answer."
    )
}

/// Parse a gateway reply as a JSON array of concept names.
pub fn parse_concepts(reply: &str) -> serde_json::Result<Vec<Term>> {
    serde_json::from_str(reply.trim())
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

/// Leaves the navigator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitCommand;

impl CommandHandler for ExitCommand {
    fn keyword(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Exit the navigator"
    }

    fn try_handle(&self, input: &str, ctx: &mut NavigationContext<'_>) -> NavResult<bool> {
        if input != "exit" {
            return Ok(false);
        }
        ctx.state = NavigatorState::Exited;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

/// Asks the completion gateway for new objects of the current concept.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateCommand;

impl GenerateCommand {
    /// The inverse of `predicate`, asking the user and registering the pair
    /// when none is on file. `None` means the user aborted.
    fn resolve_inverse(predicate: &str, ctx: &mut NavigationContext<'_>) -> NavResult<Option<Term>> {
        if let Some(inverse) = ctx.store.inverse_of(predicate)? {
            return Ok(Some(inverse));
        }
        let inverse = match ctx.ask("Enter the inverse predicate (empty to abort): ")? {
            Some(inverse) if !inverse.is_empty() => inverse,
            _ => return Ok(None),
        };
        ctx.store.register_manual_predicate(predicate, &inverse)?;
        Ok(Some(inverse))
    }
}

impl CommandHandler for GenerateCommand {
    fn keyword(&self) -> &'static str {
        "generate"
    }

    fn description(&self) -> &'static str {
        "Generate triples"
    }

    fn try_handle(&self, input: &str, ctx: &mut NavigationContext<'_>) -> NavResult<bool> {
        if input != "generate" && input != "g" {
            return Ok(false);
        }
        let subject = ctx.current_concept.clone();

        let predicate = match ctx.ask("Enter the predicate: ")? {
            Some(predicate) if !predicate.is_empty() => ctx.resolve(&predicate)?,
            _ => return Ok(true),
        };
        let Some(inverse) = Self::resolve_inverse(&predicate, ctx)? else {
            return Ok(true);
        };

        let seed = ctx.seed;
        let reply = ctx
            .gateway
            .complete(&completion_query(&subject, &predicate), seed)?;

        let concepts = match parse_concepts(&reply) {
            Ok(concepts) => concepts,
            Err(e) => {
                tracing::warn!(error = %e, "completion reply is not a JSON list of strings");
                ctx.say("Failed to parse the answer:")?;
                ctx.say(&reply)?;
                return Ok(true);
            }
        };

        let details = CompletionDetails {
            model: ctx.gateway.model().to_string(),
            seed,
            fingerprint: ctx.gateway.fingerprint().map(str::to_string),
        };
        ctx.store
            .record_completion_episode(&subject, &predicate, &inverse, &concepts, &details)?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// goto
// ---------------------------------------------------------------------------

/// Moves the cursor to another concept, by name or by number.
#[derive(Debug, Clone, Copy, Default)]
pub struct GotoCommand;

impl CommandHandler for GotoCommand {
    fn keyword(&self) -> &'static str {
        "goto"
    }

    fn description(&self) -> &'static str {
        "Go to a concept"
    }

    fn try_handle(&self, input: &str, ctx: &mut NavigationContext<'_>) -> NavResult<bool> {
        let target = if is_reference(input) {
            ctx.resolve(input)?
        } else if input == "goto" || input == "go" {
            match ctx.ask("Enter the concept: ")? {
                Some(concept) if !concept.is_empty() => ctx.resolve(&concept)?,
                _ => return Ok(true),
            }
        } else {
            return Ok(false);
        };

        tracing::debug!(from = %ctx.current_concept, to = %target, "goto");
        ctx.current_concept = target;
        Ok(true)
    }
}
