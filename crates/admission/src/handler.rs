use std::collections::HashSet;

use crate::{interfaces::Interface, operation::Operation};

/// Keeps track of the operations a plugin handles.
#[derive(Debug, Clone)]
pub struct Handler {
    operations: HashSet<Operation>,
}

impl Handler {
    pub fn new(operations: &[Operation]) -> Self {
        Handler {
            operations: operations.iter().copied().collect(),
        }
    }

    pub fn new_create_update() -> Self {
        Handler::new(&[Operation::Create, Operation::Update])
    }

    pub fn new_all() -> Self {
        Handler::new(&[
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Connect,
        ])
    }
}

impl Interface for Handler {
    fn handles(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}
