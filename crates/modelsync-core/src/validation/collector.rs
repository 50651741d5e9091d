use super::message::{MessageCode, ValidationMessage};
use crate::model::{Iri, Term};

/// Accumulates validation findings in the order they were reported
#[derive(Debug, Clone, Default)]
pub struct ValidationMessageCollector {
    messages: Vec<ValidationMessage>,
}

impl ValidationMessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate should hold nothing but holds `found`
    pub fn add_excess(&mut self, node: &Iri, predicate: &Iri, found: &[Term]) {
        self.push(
            node,
            MessageCode::ExcessResources,
            vec![
                node.as_str().to_string(),
                predicate.as_str().to_string(),
                join_values(found),
            ],
        );
    }

    /// Predicate should hold `expected` but holds nothing
    pub fn add_missing(&mut self, node: &Iri, predicate: &Iri, expected: &Term) {
        self.push(
            node,
            MessageCode::MissingResources,
            vec![
                node.as_str().to_string(),
                predicate.as_str().to_string(),
                expected.value_string(),
            ],
        );
    }

    /// Predicate holds `found`, which does not include `expected`
    pub fn add_mismatch(&mut self, node: &Iri, predicate: &Iri, expected: &Term, found: &[Term]) {
        self.push(
            node,
            MessageCode::ResourcesMismatch,
            vec![
                node.as_str().to_string(),
                predicate.as_str().to_string(),
                expected.value_string(),
                join_values(found),
            ],
        );
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    fn push(&mut self, node: &Iri, code: MessageCode, args: Vec<String>) {
        self.messages
            .push(ValidationMessage::new(node.as_str(), code, args));
    }
}

fn join_values(terms: &[Term]) -> String {
    terms
        .iter()
        .map(Term::value_string)
        .collect::<Vec<_>>()
        .join(", ")
}
