//! Shared test utilities for query and matcher testing

use crate::{
    properties::TodoState,
    query::{ast::Query, matcher::NoteFacts},
    tags::TagName,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A fact-view double with every fact preset.
#[derive(Debug, Default, Clone)]
pub struct TestFacts {
    pub name: String,
    pub content: String,
    pub tags: Vec<TagName>,
    pub todos: Vec<TodoState>,
    /// Containers/paths this note lies within.
    pub scopes: Vec<String>,
    /// References whose nodes link to this note.
    pub inbound: Vec<String>,
    /// What any nested query resolves to.
    pub resolutions: Vec<String>,
}

impl TestFacts {
    pub fn named(name: &str) -> Self {
        TestFacts {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|raw| TagName::from(*raw)).collect();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_todos(mut self, todos: &[TodoState]) -> Self {
        self.todos = todos.to_vec();
        self
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_inbound(mut self, inbound: &[&str]) -> Self {
        self.inbound = inbound.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_resolutions(mut self, resolutions: &[&str]) -> Self {
        self.resolutions = resolutions.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl NoteFacts for TestFacts {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[TagName] {
        &self.tags
    }

    fn todo_states(&self) -> &[TodoState] {
        &self.todos
    }

    fn in_scope(&self, reference: &str) -> bool {
        self.scopes.iter().any(|scope| scope == reference)
    }

    fn linked_from(&self, reference: &str) -> bool {
        self.inbound.iter().any(|source| source == reference)
    }

    fn resolve(&self, _query: &Query) -> Vec<String> {
        self.resolutions.clone()
    }
}
