use serde::{Deserialize, Serialize};

/// A namespace together with its enclosing namespaces, outermost first.
///
/// Consumers use this to suggest `using` directives: a symbol declared in
/// `A.B.C` is reachable from any of `A`, `A.B` and `A.B.C`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hierarchy {
    pub namespace: String,
    pub parents: Vec<String>,
}

impl Hierarchy {
    pub fn new(namespace: impl Into<String>, parents: Vec<String>) -> Self {
        Self {
            namespace: namespace.into(),
            parents,
        }
    }

    /// Builds the hierarchy of a dotted namespace.
    /// `"A.B.C"` has parents `["A", "A.B"]`.
    pub fn from_namespace(namespace: &str) -> Self {
        let mut parents = Vec::new();
        for (idx, ch) in namespace.char_indices() {
            if ch == '.' && idx > 0 {
                parents.push(namespace[..idx].to_string());
            }
        }
        Self::new(namespace, parents)
    }

    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    pub fn is_ancestor_of(&self, other: &Hierarchy) -> bool {
        other.parents.iter().any(|p| p == &self.namespace)
    }
}
