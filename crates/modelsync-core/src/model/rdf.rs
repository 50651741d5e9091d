//! RDF terms and statements exchanged with the semantic store
//!
//! Literals follow RDF 1.1: every literal has a datatype, plain literals are
//! `xsd:string`, and language-tagged literals are `rdf:langString`. Language
//! tags are normalized to lowercase so comparisons are case-insensitive.

use serde::{Deserialize, Serialize};

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Shape of a literal, which drives the removal policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralKind {
    /// `xsd:string` with no language tag
    String,
    /// `rdf:langString` with the (lowercased) language tag
    Language(String),
    /// Any other datatype
    Typed(Iri),
}

/// Deserialization goes through `RawLiteral` so decoded literals are
/// normalized the same way as constructed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLiteral")]
pub struct Literal {
    lexical: String,
    kind: LiteralKind,
}

/// Wire form of a literal, before normalization
#[derive(Deserialize)]
struct RawLiteral {
    lexical: String,
    kind: LiteralKind,
}

impl From<RawLiteral> for Literal {
    fn from(raw: RawLiteral) -> Self {
        match raw.kind {
            LiteralKind::String => Literal::string(raw.lexical),
            LiteralKind::Language(tag) => Literal::lang(raw.lexical, &tag),
            LiteralKind::Typed(datatype) => Literal::typed(raw.lexical, datatype),
        }
    }
}

impl Literal {
    /// Plain string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            kind: LiteralKind::String,
        }
    }

    /// Language-tagged literal; an empty tag yields a plain string
    pub fn lang(value: impl Into<String>, language: &str) -> Self {
        if language.is_empty() {
            return Self::string(value);
        }
        Self {
            lexical: value.into(),
            kind: LiteralKind::Language(language.to_ascii_lowercase()),
        }
    }

    /// Datatype-typed literal; `xsd:string` is normalized to a plain string
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        if datatype.as_str() == XSD_STRING {
            return Self::string(value);
        }
        Self {
            lexical: value.into(),
            kind: LiteralKind::Typed(datatype),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn kind(&self) -> &LiteralKind {
        &self.kind
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Language(l) => Some(l.as_str()),
            _ => None,
        }
    }

    pub fn datatype(&self) -> &str {
        match &self.kind {
            LiteralKind::String => XSD_STRING,
            LiteralKind::Language(_) => RDF_LANG_STRING,
            LiteralKind::Typed(dt) => dt.as_str(),
        }
    }

    pub fn is_plain_string(&self) -> bool {
        self.kind == LiteralKind::String
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.lexical.replace('"', "\\\""))?;
        match &self.kind {
            LiteralKind::String => Ok(()),
            LiteralKind::Language(l) => write!(f, "@{}", l),
            LiteralKind::Typed(dt) => write!(f, "^^{}", dt),
        }
    }
}

/// Object position of a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    Iri(Iri),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(Iri::new(iri))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal(Literal::string(value))
    }

    pub fn lang(value: impl Into<String>, language: &str) -> Self {
        Term::Literal(Literal::lang(value, language))
    }

    pub fn typed(value: impl Into<String>, datatype: &str) -> Self {
        Term::Literal(Literal::typed(value, Iri::new(datatype)))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// A literal with an empty label: "the predicate should hold nothing"
    pub fn is_empty_literal_marker(&self) -> bool {
        self.as_literal().is_some_and(|l| l.lexical().is_empty())
    }

    /// Value rendered for validation message arguments
    ///
    /// IRIs and blank nodes render as their identifier; literals as their
    /// lexical form, with `@lang` appended when tagged.
    pub fn value_string(&self) -> String {
        match self {
            Term::Iri(i) => i.as_str().to_string(),
            Term::Blank(b) => format!("_:{}", b),
            Term::Literal(l) => match l.language() {
                Some(lang) => format!("{}@{}", l.lexical(), lang),
                None => l.lexical().to_string(),
            },
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(i) => write!(f, "{}", i),
            Term::Blank(b) => write!(f, "_:{}", b),
            Term::Literal(l) => write!(f, "{}", l),
        }
    }
}

/// An RDF triple, optionally bound to the named graph it was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Iri>,
}

impl Statement {
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
            context: None,
        }
    }

    pub fn in_context(mut self, context: Iri) -> Self {
        self.context = Some(context);
        self
    }

    /// Triple identity, ignoring the named graph
    pub fn same_triple(&self, other: &Statement) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.object == other.object
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(ctx) = &self.context {
            write!(f, " {}", ctx)?;
        }
        Ok(())
    }
}
