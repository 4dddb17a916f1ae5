//! Location descriptors and selector paths.
//!
//! Two encodings of "where the cursor is":
//!
//! - [`Location`]: what the rendering engine reports, a comma-separated list
//!   of `KEY=<int>` steps, each an index into the direct-content children of
//!   the current outline node. A leading `HTML=` step is skipped.
//! - [`SelectorPath`]: what the engine is handed back, element ordinals from
//!   the document element down, rendered as a CSS selector.

use std::fmt;
use std::str::FromStr;

use crate::dom::{Document, NodeId};

/// One `KEY=<int>` step of a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationStep {
    pub key: String,
    pub index: usize,
}

/// A parsed location descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    steps: Vec<LocationStep>,
}

impl Location {
    pub fn new(steps: Vec<LocationStep>) -> Self {
        Self { steps }
    }

    /// Parse a location descriptor leniently.
    ///
    /// `HTML=` steps are skipped wherever they appear. Parsing stops at the
    /// first malformed step; the steps before it are kept.
    pub fn parse(input: &str) -> Self {
        let mut steps = Vec::new();

        for token in input.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let Some((key, value)) = token.split_once('=') else {
                log::warn!("malformed location step {token:?} in {input:?}");
                break;
            };
            if key.trim().eq_ignore_ascii_case("html") {
                continue;
            }
            match value.trim().parse::<usize>() {
                Ok(index) => steps.push(LocationStep {
                    key: key.trim().to_string(),
                    index,
                }),
                Err(_) => {
                    log::warn!("malformed location step {token:?} in {input:?}");
                    break;
                }
            }
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[LocationStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Content indexes only.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().map(|s| s.index)
    }
}

impl FromStr for Location {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", step.key, step.index)?;
        }
        Ok(())
    }
}

/// Element ordinals from the document element down to a target element.
///
/// Displays as `:root > :nth-child(a) > :nth-child(b) ...`, which any CSS
/// engine (including [`Document::select_first`]) resolves back to the
/// element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorPath {
    ordinals: Vec<usize>,
}

impl SelectorPath {
    pub fn new(ordinals: Vec<usize>) -> Self {
        Self { ordinals }
    }

    /// Compute the path of `element`.
    ///
    /// `None` if the element or one of its ancestors is detached from the
    /// document.
    pub fn of(doc: &Document, element: NodeId) -> Option<Self> {
        if !doc.is_element(element) {
            return None;
        }

        let mut ordinals = Vec::new();
        let mut current = element;
        while let Some(parent) = doc.parent_element(current) {
            ordinals.push(doc.element_index(current)?);
            current = parent;
        }

        if doc.parent(current) != Some(doc.document()) {
            return None;
        }

        ordinals.reverse();
        Some(Self { ordinals })
    }

    /// 0-based element ordinals, outermost first.
    pub fn ordinals(&self) -> &[usize] {
        &self.ordinals
    }

    /// Resolve the path against a document through CSS selector matching.
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        doc.select_first(&self.to_string())
    }
}

impl fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(":root")?;
        for ordinal in &self.ordinals {
            write!(f, " > :nth-child({})", ordinal + 1)?;
        }
        Ok(())
    }
}
