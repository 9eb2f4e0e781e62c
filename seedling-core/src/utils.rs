//! Utility functions for the container
//!
//! Naming conventions for bean names and processor names, plus the creation
//! stack used for cycle detection.

/// Naming convention utilities for bean names
pub mod naming {
    /// Converts a snake_case field identifier to the bean name it binds to.
    ///
    /// Injection binds by field name, so `order_service` resolves the bean
    /// `orderService`. Identifiers without underscores are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use seedling_core::utils::naming::field_to_bean_name;
    ///
    /// assert_eq!(field_to_bean_name("order_service"), "orderService");
    /// assert_eq!(field_to_bean_name("a"), "a");
    /// assert_eq!(field_to_bean_name("r#type"), "type");
    /// ```
    pub fn field_to_bean_name(field: &str) -> String {
        let field = field.strip_prefix("r#").unwrap_or(field);
        let trimmed = field.trim_start_matches('_');

        let mut result = String::with_capacity(trimmed.len());
        let mut upper_next = false;

        for ch in trimmed.chars() {
            if ch == '_' {
                upper_next = !result.is_empty();
            } else if upper_next {
                result.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                result.push(ch);
            }
        }

        result
    }

    /// Strips the module path and generic arguments from a `type_name` string.
    ///
    /// Used as the default display name of post processors.
    ///
    /// # Examples
    ///
    /// ```
    /// use seedling_core::utils::naming::short_type_name;
    ///
    /// assert_eq!(short_type_name("app::processors::AuditProcessor"), "AuditProcessor");
    /// assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper");
    /// ```
    pub fn short_type_name(type_name: &str) -> &str {
        let base = type_name.split('<').next().unwrap_or(type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Checks that a module path segment is a valid Rust identifier.
    pub fn is_identifier(segment: &str) -> bool {
        let segment = segment.strip_prefix("r#").unwrap_or(segment);
        let mut chars = segment.chars();

        match chars.next() {
            Some(first) if first == '_' || first.is_alphabetic() => {
                chars.all(|c| c == '_' || c.is_alphanumeric())
            }
            _ => false,
        }
    }
}

/// Dependency resolution utilities
pub mod dependency {
    /// Tracks the beans being created along one resolution chain.
    ///
    /// A stack is owned by a single `get_bean` call and threaded through every
    /// nested dependency lookup, so concurrent prototype constructions never
    /// observe each other.
    #[derive(Debug, Default)]
    pub struct CreationStack {
        creating: Vec<String>,
    }

    impl CreationStack {
        /// Creates a new empty creation stack.
        pub fn new() -> Self {
            Self::default()
        }

        /// Checks if a bean is currently being created on this chain.
        pub fn is_creating(&self, name: &str) -> bool {
            self.creating.iter().any(|n| n == name)
        }

        /// Marks a bean as being created.
        ///
        /// # Errors
        ///
        /// Returns the cycle (`a -> b -> a`) when the bean is already on the stack.
        pub fn enter(&mut self, name: &str) -> Result<(), String> {
            if self.is_creating(name) {
                let start = self
                    .creating
                    .iter()
                    .position(|n| n == name)
                    .unwrap_or_default();
                let mut cycle: Vec<&str> = self.creating[start..].iter().map(String::as_str).collect();
                cycle.push(name);
                return Err(cycle.join(" -> "));
            }

            self.creating.push(name.to_string());
            Ok(())
        }

        /// Marks the innermost bean as finished.
        pub fn exit(&mut self, name: &str) {
            if let Some(pos) = self.creating.iter().rposition(|n| n == name) {
                self.creating.remove(pos);
            }
        }

        /// Current chain depth.
        pub fn depth(&self) -> usize {
            self.creating.len()
        }

    }
}
