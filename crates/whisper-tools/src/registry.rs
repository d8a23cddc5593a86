//! Operation registry: tool name to [`Operation`].
//!
//! Built once at startup. The router resolves every invocation through it and
//! the transport lists its definitions.

use std::collections::HashMap;

use tracing::debug;
use whisper_core::Tool;

use crate::operation::Operation;

/// A registered operation and its cached definition.
#[derive(Clone, Debug)]
pub struct RegisteredOperation {
    /// The dispatch target.
    pub operation: Operation,
    /// Schema sent to hosts.
    pub definition: Tool,
}

/// Central registry mapping tool names to operations.
#[derive(Clone, Debug)]
pub struct ToolRegistry {
    entries: Vec<RegisteredOperation>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registry holding every [`Operation`].
    pub fn with_all_operations() -> Self {
        let mut registry = Self::new();
        for op in Operation::ALL {
            registry.register(op);
        }
        registry
    }

    /// Register an operation. Registering the same name again replaces it.
    pub fn register(&mut self, operation: Operation) {
        debug!(tool_name = operation.name(), "operation registered");
        let entry = RegisteredOperation {
            operation,
            definition: operation.definition(),
        };
        match self.by_name.get(operation.name()) {
            Some(&index) => self.entries[index] = entry,
            None => {
                let _ = self.by_name.insert(operation.name().to_owned(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Look up an operation by tool name.
    pub fn get(&self, name: &str) -> Option<&RegisteredOperation> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    /// Registered names, sorted alphabetically.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn all_operations_are_registered() {
        let reg = ToolRegistry::with_all_operations();
        assert_eq!(reg.len(), 7);
        for op in Operation::ALL {
            assert_eq!(reg.get(op.name()).unwrap().operation, op);
        }
    }

    #[test]
    fn get_unknown_returns_none() {
        let reg = ToolRegistry::with_all_operations();
        assert!(reg.get("transcribe").is_none());
        assert!(!reg.contains("delete_everything"));
    }

    #[test]
    fn register_duplicate_replaces() {
        let mut reg = ToolRegistry::new();
        reg.register(Operation::Convert);
        reg.register(Operation::Convert);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn definitions_keep_registration_order() {
        let reg = ToolRegistry::with_all_operations();
        let names: Vec<String> = reg.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names[0], "transcribe_audio");
        assert_eq!(names[6], "get_file_support");
    }

    #[test]
    fn names_returns_sorted() {
        let reg = ToolRegistry::with_all_operations();
        let names = reg.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "chat_with_audio");
    }
}
