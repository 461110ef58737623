//! Declarations extracted from a schema and the violations found in them.

use crate::span::Span;
use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;
use std::fmt;

/// Declarations keyed by entity name, in document order of first appearance.
pub type DeclarationMap = IndexMap<SmolStr, Declaration>;

/// One declaration marker in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Zero-based ordinal among all declaration markers.
    pub position: usize,
    /// Span of the declared name.
    pub span: Span,
}

/// An entity declared in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: SmolStr,
    /// Ordinal of the first marker declaring this name. Drives ordering checks.
    pub position: usize,
    /// Span of the name in the first marker.
    pub span: Span,
    /// Referenced entities in discovery order, with the first reference site.
    /// Never contains `name` itself.
    pub dependencies: IndexMap<SmolStr, Span>,
    /// Every marker that declared this name, in document order.
    pub occurrences: Vec<Occurrence>,
}

impl Declaration {
    pub(crate) fn new(name: SmolStr, position: usize, span: Span) -> Self {
        Self {
            name,
            position,
            span: span.clone(),
            dependencies: IndexMap::new(),
            occurrences: vec![Occurrence { position, span }],
        }
    }

    pub fn is_duplicated(&self) -> bool {
        self.occurrences.len() > 1
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }
}

/// The category of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    UndeclaredReference,
    ForwardReference,
    DuplicateDeclaration,
}

impl ViolationKind {
    /// Stable diagnostic code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::UndeclaredReference => "order::undeclared_reference",
            Self::ForwardReference => "order::forward_reference",
            Self::DuplicateDeclaration => "order::duplicate_declaration",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredReference => write!(f, "undeclared reference"),
            Self::ForwardReference => write!(f, "forward reference"),
            Self::DuplicateDeclaration => write!(f, "duplicate declaration"),
        }
    }
}

/// A problem found by the order validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Violation {
    /// `subject` references `target`, which is never declared.
    UndeclaredReference {
        subject: SmolStr,
        subject_position: usize,
        target: SmolStr,
        /// Where `target` is referenced.
        span: Span,
    },
    /// `subject` references `target`, which is declared later.
    ForwardReference {
        subject: SmolStr,
        subject_position: usize,
        target: SmolStr,
        target_position: usize,
        /// Where `target` is referenced.
        span: Span,
    },
    /// `name` is declared more than once.
    DuplicateDeclaration {
        name: SmolStr,
        /// Ordinals of every declaration of `name`.
        positions: Vec<usize>,
        /// Spans of every declaration of `name`.
        spans: Vec<Span>,
    },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::UndeclaredReference { .. } => ViolationKind::UndeclaredReference,
            Violation::ForwardReference { .. } => ViolationKind::ForwardReference,
            Violation::DuplicateDeclaration { .. } => ViolationKind::DuplicateDeclaration,
        }
    }

    /// The entity exhibiting the problem.
    pub fn subject(&self) -> &str {
        match self {
            Violation::UndeclaredReference { subject, .. }
            | Violation::ForwardReference { subject, .. } => subject,
            Violation::DuplicateDeclaration { name, .. } => name,
        }
    }

    /// The referenced entity, for reference violations.
    pub fn target(&self) -> Option<&str> {
        match self {
            Violation::UndeclaredReference { target, .. }
            | Violation::ForwardReference { target, .. } => Some(target),
            Violation::DuplicateDeclaration { .. } => None,
        }
    }

    pub fn subject_position(&self) -> usize {
        match self {
            Violation::UndeclaredReference {
                subject_position, ..
            }
            | Violation::ForwardReference {
                subject_position, ..
            } => *subject_position,
            Violation::DuplicateDeclaration { positions, .. } => {
                positions.first().copied().unwrap_or_default()
            }
        }
    }

    /// Position of the referenced entity. Only forward references have one.
    pub fn target_position(&self) -> Option<usize> {
        match self {
            Violation::ForwardReference {
                target_position, ..
            } => Some(*target_position),
            _ => None,
        }
    }

    /// The primary source location: the reference site, or the second declaration.
    pub fn span(&self) -> Span {
        match self {
            Violation::UndeclaredReference { span, .. }
            | Violation::ForwardReference { span, .. } => span.clone(),
            Violation::DuplicateDeclaration { spans, .. } => {
                spans.get(1).or(spans.first()).cloned().unwrap_or(0..0)
            }
        }
    }
}

/// Positions in messages are 1-based, as a reader counts tables.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UndeclaredReference { subject, target, .. } => {
                write!(f, "table '{subject}' references undefined table '{target}'")
            }
            Violation::ForwardReference {
                subject,
                subject_position,
                target,
                target_position,
                ..
            } => write!(
                f,
                "table '{subject}' (position {}) references table '{target}' (position {}) which is defined later",
                subject_position + 1,
                target_position + 1
            ),
            Violation::DuplicateDeclaration { name, positions, .. } => {
                let list = positions
                    .iter()
                    .map(|p| (p + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "table '{name}' is defined {} times (positions {list})",
                    positions.len()
                )
            }
        }
    }
}
