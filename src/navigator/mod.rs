//! Interactive navigator: browse the graph and grow it on demand.
//!
//! The navigator is a two-state machine. While [`NavigatorState::Browsing`] it
//! repeats one session iteration: render the current concept's neighborhood,
//! read one command line, dispatch it. The `exit` command (or end of input)
//! moves it to [`NavigatorState::Exited`] and the loop ends.
//!
//! All session state lives in an explicit [`NavigationContext`] built up front
//! and passed by reference to every command.

pub mod commands;
pub mod render;
pub mod terminal;

use crate::error::NavigatorError;
use crate::graph::Term;
use crate::llm::CompletionGateway;
use crate::store::KnowledgeStore;
use crate::term_index::TermIndex;

use commands::{CommandHandler, default_commands, is_reference};
use terminal::Terminal;

/// Result type for navigator operations.
pub type NavResult<T> = std::result::Result<T, NavigatorError>;

/// Concept the cursor starts on when none is configured.
pub const DEFAULT_START_CONCEPT: &str = "Physics";

/// Where the navigator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    /// Rendering and taking commands.
    Browsing,
    /// Terminal; the loop has ended.
    Exited,
}

/// Per-run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Concept the cursor starts on.
    pub start_concept: Term,
    /// Seed sent with every completion request.
    pub seed: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            start_concept: DEFAULT_START_CONCEPT.into(),
            seed: 0,
        }
    }
}

/// Everything a navigator run owns or borrows.
pub struct NavigationContext<'a> {
    pub store: &'a KnowledgeStore,
    pub gateway: &'a mut dyn CompletionGateway,
    pub terminal: &'a mut dyn Terminal,
    pub terms: TermIndex,
    pub current_concept: Term,
    pub seed: u64,
    pub state: NavigatorState,
}

impl<'a> NavigationContext<'a> {
    pub fn new(
        store: &'a KnowledgeStore,
        gateway: &'a mut dyn CompletionGateway,
        terminal: &'a mut dyn Terminal,
        settings: &SessionSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            terminal,
            terms: TermIndex::new(),
            current_concept: settings.start_concept.clone(),
            seed: settings.seed,
            state: NavigatorState::Browsing,
        }
    }

    /// Write one line to the user.
    pub fn say(&mut self, line: &str) -> NavResult<()> {
        self.terminal
            .write_line(line)
            .map_err(|e| NavigatorError::Terminal { source: e })
    }

    /// Prompt the user for one line. `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> NavResult<Option<String>> {
        self.terminal
            .read_line(prompt)
            .map_err(|e| NavigatorError::Terminal { source: e })
    }

    /// Turn user input into a term: numbers go through the term index,
    /// anything else is taken literally.
    pub fn resolve(&self, input: &str) -> NavResult<Term> {
        if !is_reference(input) {
            return Ok(input.to_string());
        }
        // Too many digits for u64: never allocated either.
        input
            .parse::<u64>()
            .ok()
            .and_then(|number| self.terms.term_of(number))
            .ok_or_else(|| NavigatorError::UnresolvedReference {
                reference: input.to_string(),
            })
    }
}

/// The navigator control loop.
pub struct Navigator<'a> {
    ctx: NavigationContext<'a>,
    commands: Vec<Box<dyn CommandHandler>>,
}

impl<'a> Navigator<'a> {
    /// A navigator with the built-in commands.
    pub fn new(ctx: NavigationContext<'a>) -> Self {
        Self::with_commands(ctx, default_commands())
    }

    /// A navigator with a custom command list, tried in the given order.
    pub fn with_commands(ctx: NavigationContext<'a>, commands: Vec<Box<dyn CommandHandler>>) -> Self {
        Self { ctx, commands }
    }

    pub fn context(&self) -> &NavigationContext<'a> {
        &self.ctx
    }

    pub fn state(&self) -> NavigatorState {
        self.ctx.state
    }

    /// Run session iterations until the navigator exits.
    pub fn run(&mut self) -> NavResult<()> {
        tracing::info!(concept = %self.ctx.current_concept, seed = self.ctx.seed, "navigator started");
        while self.ctx.state == NavigatorState::Browsing {
            self.run_session()?;
        }
        tracing::info!("navigator exited");
        Ok(())
    }

    /// One iteration: render, read a command, dispatch it.
    pub fn run_session(&mut self) -> NavResult<()> {
        self.render()?;
        let Some(line) = self.ctx.ask("Enter a command: ")? else {
            self.ctx.state = NavigatorState::Exited;
            return Ok(());
        };

        match self.dispatch(line.trim()) {
            Ok(true) => {}
            Ok(false) => {
                self.ctx.say("Invalid command")?;
                self.help()?;
                self.acknowledge()?;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "command failed");
                self.ctx.say(&format!("Error: {e}"))?;
                self.acknowledge()?;
            }
            Err(e) => return Err(e),
        }

        self.ctx.say("")?;
        self.ctx.say("")?;
        Ok(())
    }

    /// Offer `input` to each command in order; `Ok(false)` if none took it.
    pub fn dispatch(&mut self, input: &str) -> NavResult<bool> {
        for command in &self.commands {
            if command.try_handle(input, &mut self.ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The current concept's neighborhood as display lines.
    pub fn neighborhood(&self) -> NavResult<Vec<String>> {
        let triples: Vec<_> = self
            .ctx
            .store
            .triples_with_subject(&self.ctx.current_concept)?
            .into_iter()
            .map(|(_, triple)| triple)
            .collect();
        let groups = render::group_by_predicate(&triples);
        Ok(render::neighborhood_lines(
            &self.ctx.current_concept,
            &groups,
            &self.ctx.terms,
        ))
    }

    /// Write the neighborhood to the terminal.
    pub fn render(&mut self) -> NavResult<()> {
        for line in self.neighborhood()? {
            self.ctx.say(&line)?;
        }
        Ok(())
    }

    /// List every command with its description.
    fn help(&mut self) -> NavResult<()> {
        let lines: Vec<String> = self
            .commands
            .iter()
            .map(|c| format!("  {}: {}", c.keyword(), c.description()))
            .collect();
        for line in &lines {
            self.ctx.say(line)?;
        }
        Ok(())
    }

    fn acknowledge(&mut self) -> NavResult<()> {
        if self.ctx.ask("OK")?.is_none() {
            self.ctx.state = NavigatorState::Exited;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedCompletion;
    use crate::navigator::terminal::ScriptedTerminal;

    const SUBTOPIC: &str = "has specific subtopic";
    const SUBTOPIC_OF: &str = "is specific subtopic of";

    fn run(store: &KnowledgeStore, gateway: &mut ScriptedCompletion, term: &mut ScriptedTerminal) -> String {
        let ctx = NavigationContext::new(store, gateway, term, &SessionSettings::default());
        let mut nav = Navigator::new(ctx);
        nav.run().unwrap();
        assert_eq!(nav.state(), NavigatorState::Exited);
        nav.context().current_concept.clone()
    }

    #[test]
    fn empty_store_renders_only_the_concept() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::default();
        let nav = Navigator::new(NavigationContext::new(
            &store,
            &mut gateway,
            &mut term,
            &SessionSettings::default(),
        ));
        assert_eq!(nav.neighborhood().unwrap(), vec!["Physics"]);
    }

    #[test]
    fn exit_ends_the_loop() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["exit"]);
        run(&store, &mut gateway, &mut term);
        assert_eq!(term.prompts(), ["Enter a command: "]);
        assert_eq!(term.remaining(), 0);
    }

    #[test]
    fn end_of_input_exits() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::default();
        run(&store, &mut gateway, &mut term);
        assert_eq!(term.output()[0], "Physics");
    }

    #[test]
    fn generate_registers_inverse_and_writes_episode() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway =
            ScriptedCompletion::new([r#"["Mechanics","Thermodynamics"]"#]).with_model("gpt-test");
        let mut term = ScriptedTerminal::new(["generate", SUBTOPIC, SUBTOPIC_OF, "exit"]);
        run(&store, &mut gateway, &mut term);

        let stats = store.stats().unwrap();
        assert_eq!(stats.triples, 4);
        assert_eq!(stats.triple_generations, 1);
        assert_eq!(stats.predicates, 2);
        assert_eq!(stats.predicate_generations, 1);

        let (_, entry) = &store.triple_generations().unwrap()[0];
        assert_eq!(entry.triple_ids.len(), 2);
        let details = entry.details_json().unwrap();
        assert_eq!(details["model"], "gpt-test");
        assert_eq!(details["seed"], 0);
        assert_eq!(details["fingerprint"], "scripted-1");

        // The second render shows the new neighborhood.
        assert!(term.printed("  has specific subtopic 1:"));
        assert!(term.printed("      Mechanics 2"));
        assert!(term.printed("      Thermodynamics 3"));
        assert_eq!(gateway.queries()[0].1, 0);
    }

    #[test]
    fn known_predicate_skips_inverse_prompt() {
        let store = KnowledgeStore::in_memory().unwrap();
        store.register_manual_predicate(SUBTOPIC, SUBTOPIC_OF).unwrap();
        let mut gateway = ScriptedCompletion::new([r#"["Optics"]"#]);
        let mut term = ScriptedTerminal::new(["g", SUBTOPIC, "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(!term.prompts().iter().any(|p| p.starts_with("Enter the inverse")));
        assert_eq!(
            store.inverse_of("has specific subtopic").unwrap().as_deref(),
            Some(SUBTOPIC_OF)
        );
        assert_eq!(store.triples_with_subject("Optics").unwrap()[0].1.predicate, SUBTOPIC_OF);
    }

    #[test]
    fn empty_inverse_aborts_without_writes() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::new([r#"["Optics"]"#]);
        let mut term = ScriptedTerminal::new(["generate", SUBTOPIC, "", "exit"]);
        run(&store, &mut gateway, &mut term);

        assert_eq!(store.stats().unwrap(), Default::default());
        assert!(gateway.queries().is_empty());
        assert!(!term.printed("Invalid command"));
    }

    #[test]
    fn unparsable_reply_is_shown_and_nothing_written() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::new(["Mechanics, Optics and more"]);
        let mut term = ScriptedTerminal::new(["generate", SUBTOPIC, SUBTOPIC_OF, "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(term.printed("Failed to parse the answer:"));
        assert!(term.printed("Mechanics, Optics and more"));
        let stats = store.stats().unwrap();
        assert_eq!(stats.triples, 0);
        assert_eq!(stats.triple_generations, 0);
    }

    #[test]
    fn numeric_input_jumps_to_numbered_term() {
        let store = KnowledgeStore::in_memory().unwrap();
        store.insert_pair("Physics", SUBTOPIC, "Optics", SUBTOPIC_OF).unwrap();
        let mut gateway = ScriptedCompletion::default();
        // 1 is the predicate, 2 is Optics.
        let mut term = ScriptedTerminal::new(["2", "exit"]);
        let concept = run(&store, &mut gateway, &mut term);

        assert_eq!(concept, "Optics");
        assert!(term.printed("  is specific subtopic of 3:"));
        // The concept header line is never numbered, so Physics is new here.
        assert!(term.printed("      Physics 4"));
    }

    #[test]
    fn goto_keyword_accepts_name_or_number() {
        let store = KnowledgeStore::in_memory().unwrap();
        store.insert_pair("Physics", SUBTOPIC, "Optics", SUBTOPIC_OF).unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["goto", "Unknown Concept", "go", "Physics", "go", "2", "exit"]);
        let concept = run(&store, &mut gateway, &mut term);
        assert_eq!(concept, "Optics");
        // Navigating to an unknown concept renders an empty neighborhood.
        assert!(term.printed("Unknown Concept"));
    }

    #[test]
    fn unresolved_reference_is_an_error_not_a_term() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::default();
        let mut nav = Navigator::new(NavigationContext::new(
            &store,
            &mut gateway,
            &mut term,
            &SessionSettings::default(),
        ));

        let err = nav.dispatch("2").unwrap_err();
        assert!(matches!(&err, NavigatorError::UnresolvedReference { reference } if reference == "2"));
        assert_eq!(nav.context().current_concept, "Physics");
    }

    #[test]
    fn unresolved_reference_is_reported_and_session_continues() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["goto", "9", "", "exit"]);
        let concept = run(&store, &mut gateway, &mut term);

        assert_eq!(concept, "Physics");
        assert!(term.printed("Error: no term is numbered 9 in this session"));
        assert!(term.prompts().iter().any(|p| p == "OK"));
    }

    #[test]
    fn invalid_command_needs_acknowledgement() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["fly", "ok", "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(term.printed("Invalid command"));
        assert!(term.printed("  exit: Exit the navigator"));
        assert!(term.printed("  generate: Generate triples"));
        assert!(term.printed("  goto: Go to a concept"));
        assert_eq!(term.prompts(), ["Enter a command: ", "OK", "Enter a command: "]);
    }

    #[test]
    fn gateway_failure_is_recoverable() {
        let store = KnowledgeStore::in_memory().unwrap();
        // No scripted replies: the gateway fails on first use.
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["generate", SUBTOPIC, SUBTOPIC_OF, "", "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(term.output().iter().any(|l| l.starts_with("Error: ")));
        // The predicate pair was committed before the request went out.
        assert_eq!(store.stats().unwrap().predicates, 2);
        assert_eq!(store.stats().unwrap().triples, 0);
    }

    #[test]
    fn render_is_deterministic_within_a_run() {
        let store = KnowledgeStore::in_memory().unwrap();
        for object in ["b", "B", "a", "C"] {
            store.insert_pair("Physics", SUBTOPIC, object, SUBTOPIC_OF).unwrap();
        }
        store.insert_pair("Physics", "Relates to", "x", "relates to").unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::default();
        let nav = Navigator::new(NavigationContext::new(
            &store,
            &mut gateway,
            &mut term,
            &SessionSettings::default(),
        ));

        let first = nav.neighborhood().unwrap();
        let second = nav.neighborhood().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                "Physics",
                "  has specific subtopic 1:",
                "      a 2",
                "      B 3",
                "      b 4",
                "      C 5",
                "  Relates to 6:",
                "      x 7",
            ]
        );
    }

    #[test]
    fn overlong_number_is_reported_as_typed() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::default();
        let mut term = ScriptedTerminal::new(["123456789012345678901234567890", "", "exit"]);
        let concept = run(&store, &mut gateway, &mut term);

        assert_eq!(concept, "Physics");
        assert!(term.printed("Error: no term is numbered 123456789012345678901234567890 in this session"));
    }

    #[test]
    fn generate_accepts_numbered_predicate() {
        let store = KnowledgeStore::in_memory().unwrap();
        store.register_manual_predicate(SUBTOPIC, SUBTOPIC_OF).unwrap();
        store.insert_pair("Physics", SUBTOPIC, "Optics", SUBTOPIC_OF).unwrap();
        let mut gateway = ScriptedCompletion::new([r#"["Acoustics"]"#]);
        // The first render numbers the predicate 1.
        let mut term = ScriptedTerminal::new(["g", "1", "exit"]);
        run(&store, &mut gateway, &mut term);

        let entries = store.triple_generations().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.predicate, SUBTOPIC);
        assert!(gateway.queries()[0].0.contains("\"has specific subtopic\""));
        assert_eq!(
            store.triples_with_subject("Acoustics").unwrap()[0].1.predicate,
            SUBTOPIC_OF
        );
    }

    #[test]
    fn unallocated_predicate_number_writes_nothing() {
        let store = KnowledgeStore::in_memory().unwrap();
        let mut gateway = ScriptedCompletion::new([r#"["Optics"]"#]);
        let mut term = ScriptedTerminal::new(["generate", "5", "", "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(term.printed("Error: no term is numbered 5 in this session"));
        assert!(!term.prompts().iter().any(|p| p.starts_with("Enter the inverse")));
        assert!(gateway.queries().is_empty());
        assert_eq!(store.stats().unwrap(), Default::default());
    }

    #[test]
    fn conflicting_inverse_is_refused_and_registry_stays_consistent() {
        let store = KnowledgeStore::in_memory().unwrap();
        store.register_manual_predicate("has part", "is part of").unwrap();
        let mut gateway = ScriptedCompletion::new([r#"["Wheel"]"#]);
        let mut term = ScriptedTerminal::new(["generate", "contains", "is part of", "", "exit"]);
        run(&store, &mut gateway, &mut term);

        assert!(term.output().iter().any(|l| l.starts_with("Error: ")));
        assert!(gateway.queries().is_empty());
        assert_eq!(store.inverse_of("is part of").unwrap().as_deref(), Some("has part"));
        assert_eq!(store.inverse_of("contains").unwrap(), None);
        let stats = store.stats().unwrap();
        assert_eq!(stats.predicates, 2);
        assert_eq!(stats.predicate_generations, 1);
        assert_eq!(stats.triples, 0);
    }
}
