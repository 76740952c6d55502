//! # Hierarchical Evaluation Results
//!
//! The schema engine reports violations as a flat list of
//! (instance pointer, keyword, message) triples. This module rebuilds
//! the hierarchical view — one node per instance location, nested by
//! pointer segment — and reduces it to an overall pass/fail decision
//! plus per-node diagnostic blocks.
//!
//! A node's validity is its own: a node is valid iff its own error list
//! is empty. Children are visited solely to surface their own messages,
//! never to recompute the parent's validity.
//!
//! Reduction walks the tree with an explicit stack, not recursion, so
//! stack usage stays bounded regardless of document nesting depth
//! (e.g. long arrays produce deep result trees).

/// A single error attached to one node of the evaluation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    /// The schema keyword that produced the error (e.g. `required`,
    /// `type`, `format`).
    pub keyword: String,
    /// Human-readable description of the violation.
    pub message: String,
}

/// One node of the hierarchical evaluation result tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationNode {
    /// JSON Pointer to this node's location in the instance document.
    /// Empty for the document root.
    pub instance_location: String,
    /// Errors reported against this node itself.
    pub errors: Vec<NodeError>,
    /// Nested sub-evaluations.
    pub children: Vec<EvaluationNode>,
}

impl EvaluationNode {
    /// Create an empty root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// A node is valid iff it has no errors of its own.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Attach an error at the given instance pointer, creating the
    /// chain of intermediate nodes as needed.
    ///
    /// `pointer` is a JSON Pointer (`""` for the root, otherwise
    /// `/`-separated segments).
    pub fn insert_error(&mut self, pointer: &str, keyword: impl Into<String>, message: impl Into<String>) {
        let node = self.node_at_mut(pointer);
        node.errors.push(NodeError {
            keyword: keyword.into(),
            message: message.into(),
        });
    }

    /// Find or create the node at the given instance pointer.
    fn node_at_mut(&mut self, pointer: &str) -> &mut EvaluationNode {
        let mut current = self;
        if pointer.is_empty() {
            return current;
        }
        let mut path = String::new();
        for segment in pointer.split('/').skip(1) {
            path.push('/');
            path.push_str(segment);
            let position = current
                .children
                .iter()
                .position(|child| child.instance_location == path);
            let index = match position {
                Some(index) => index,
                None => {
                    current.children.push(EvaluationNode {
                        instance_location: path.clone(),
                        ..Default::default()
                    });
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current
    }

    /// Total number of nodes in the tree, iteratively.
    pub fn node_count(&self) -> usize {
        let mut count = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Diagnostics for one failing node: its location and each message
/// reported against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBlock {
    /// JSON Pointer to the failing node (empty for the root).
    pub instance_location: String,
    /// One entry per error on the node.
    pub messages: Vec<String>,
}

impl DiagnosticBlock {
    /// URI-style rendering of the location (`#` for the root,
    /// `#/stores/steam` for nested nodes).
    pub fn location_display(&self) -> String {
        format!("#{}", self.instance_location)
    }
}

/// Outcome of reducing an evaluation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    /// True iff any node in the tree had a non-empty error list.
    pub failed: bool,
    /// Exactly one block per node with errors.
    pub blocks: Vec<DiagnosticBlock>,
}

impl ResultSummary {
    /// Emit the diagnostic blocks as error-level log lines: a header
    /// naming the error count and node location, then each message.
    pub fn log(&self) {
        for block in &self.blocks {
            tracing::error!(
                "{} error(s) in node {}:",
                block.messages.len(),
                block.location_display()
            );
            for message in &block.messages {
                tracing::error!("{message}");
            }
        }
    }
}

/// Reduce an evaluation tree to an overall pass/fail decision plus
/// per-node diagnostics.
///
/// Walks the whole tree exactly once with an explicit stack and never
/// short-circuits, so every failing location is reported in a single
/// pass. Sibling visitation order is unspecified; diagnostics are
/// independent per node. Pure function of the tree — reducing the same
/// tree twice yields identical results.
pub fn reduce(root: &EvaluationNode) -> ResultSummary {
    let mut failed = false;
    let mut blocks = Vec::new();

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        stack.extend(node.children.iter());

        if node.errors.is_empty() {
            continue;
        }
        failed = true;
        blocks.push(DiagnosticBlock {
            instance_location: node.instance_location.clone(),
            messages: node.errors.iter().map(|e| e.message.clone()).collect(),
        });
    }

    ResultSummary { failed, blocks }
}
