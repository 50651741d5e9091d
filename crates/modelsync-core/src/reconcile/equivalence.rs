use crate::model::{Statement, Term};

/// Removal policy derived from the shape of a target object
///
/// - `PlainString`: the predicate is treated as single-valued for plain
///   strings, so every plain-string value is a candidate.
/// - `Language`: one value per language; the exact triple if present,
///   otherwise every value tagged with the same language.
/// - `Exact`: IRIs, blank nodes and typed literals; only the exact triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralEquivalenceClass {
    PlainString,
    Language(String),
    Exact,
}

impl LiteralEquivalenceClass {
    pub fn of(term: &Term) -> Self {
        match term.as_literal() {
            Some(l) if l.is_plain_string() => LiteralEquivalenceClass::PlainString,
            Some(l) => match l.language() {
                Some(lang) => LiteralEquivalenceClass::Language(lang.to_string()),
                None => LiteralEquivalenceClass::Exact,
            },
            None => LiteralEquivalenceClass::Exact,
        }
    }

    /// Whether `term` falls in the same class as the one this was derived from
    fn admits(&self, term: &Term) -> bool {
        match self {
            LiteralEquivalenceClass::PlainString => {
                term.as_literal().is_some_and(|l| l.is_plain_string())
            }
            LiteralEquivalenceClass::Language(lang) => term
                .as_literal()
                .and_then(|l| l.language())
                .is_some_and(|l| l == lang),
            LiteralEquivalenceClass::Exact => false,
        }
    }

    /// Statements to remove for `target`, chosen from `found`
    ///
    /// `found` holds every current statement sharing the target's subject and
    /// predicate. Returns `None` when no rule selects anything, which the
    /// caller reports as an inconsistency.
    pub fn candidates_for_removal(
        target: &Statement,
        found: &[Statement],
    ) -> Option<Vec<Statement>> {
        if let [only] = found {
            if only.same_triple(target) {
                return Some(vec![only.clone()]);
            }
        }

        let class = Self::of(&target.object);
        let selected: Vec<Statement> = match &class {
            LiteralEquivalenceClass::PlainString => found
                .iter()
                .filter(|s| class.admits(&s.object))
                .cloned()
                .collect(),
            LiteralEquivalenceClass::Language(_) | LiteralEquivalenceClass::Exact => {
                let exact: Vec<Statement> = found
                    .iter()
                    .filter(|s| s.same_triple(target))
                    .cloned()
                    .collect();
                if exact.is_empty() {
                    found
                        .iter()
                        .filter(|s| class.admits(&s.object))
                        .cloned()
                        .collect()
                } else {
                    exact
                }
            }
        };

        if selected.is_empty() {
            None
        } else {
            Some(selected)
        }
    }
}
