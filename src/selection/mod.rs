//! Selection cutflow: a DAG of cut/weight nodes rooted at nullable
//! no-parent, each backed by a decision column.
//!
//! `passed`/`weight` are never stored — they're recomputed on demand from
//! the node's decision column and its parent's `passed`/`weight`, per the
//! rules below. `execute` is therefore a no-op for every node; the decision
//! column underneath does the per-entry memoization.
//!
//! ```text
//! root cut:    passed = decision != 0          weight = 1
//! root weight: passed = true                   weight = decision
//! child cut:   passed = parent.passed && decision != 0   weight = parent.weight
//! child weight:passed = parent.passed                    weight = parent.weight * decision
//! ```

use crate::action::{Action, Entry, Slot};
use crate::column::ColumnComputation;
use crate::error::EngineResult;
use crate::value::Dynamic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Cut,
    Weight,
}

struct Node {
    kind: Kind,
    parent: Option<SelectionId>,
    decision: crate::column::ColumnId,
}

impl Action for Node {}

/// Decodes a decision column's dynamic value into the `f64`/`bool` pair the
/// cutflow rules need, regardless of whether the column was declared with a
/// `bool` or numeric payload.
fn decode_decision(kind: Kind, value: &Dynamic) -> EngineResult<(bool, f64)> {
    match kind {
        Kind::Cut => {
            let nonzero = if let Some(b) = value.downcast_ref::<bool>() {
                *b
            } else if let Some(x) = value.downcast_ref::<f64>() {
                *x != 0.0
            } else if let Some(x) = value.downcast_ref::<i64>() {
                *x != 0
            } else {
                return Err(crate::error::EngineError::Evaluation {
                    column: "<cut decision>".to_string(),
                    entry: 0,
                    reason: "cut decision column must be bool, f64, or i64".to_string(),
                });
            };
            Ok((nonzero, 1.0))
        }
        Kind::Weight => {
            let w = if let Some(x) = value.downcast_ref::<f64>() {
                *x
            } else if let Some(x) = value.downcast_ref::<i64>() {
                *x as f64
            } else {
                return Err(crate::error::EngineError::Evaluation {
                    column: "<weight decision>".to_string(),
                    entry: 0,
                    reason: "weight decision column must be f64 or i64".to_string(),
                });
            };
            Ok((true, w))
        }
    }
}

/// Owns every selection node for one slot.
#[derive(Default)]
pub struct SelectionCutflow {
    nodes: Vec<Node>,
}

impl SelectionCutflow {
    pub fn new() -> Self {
        SelectionCutflow { nodes: Vec::new() }
    }

    /// Wrap an existing boolean-valued column as a cut, optionally rooted at
    /// `parent`.
    pub fn apply_cut(
        &mut self,
        parent: Option<SelectionId>,
        decision: crate::column::ColumnId,
    ) -> SelectionId {
        self.push(Kind::Cut, parent, decision)
    }

    /// Wrap an existing real-valued column as a weight, optionally rooted at
    /// `parent`.
    pub fn apply_weight(
        &mut self,
        parent: Option<SelectionId>,
        decision: crate::column::ColumnId,
    ) -> SelectionId {
        self.push(Kind::Weight, parent, decision)
    }

    fn push(
        &mut self,
        kind: Kind,
        parent: Option<SelectionId>,
        decision: crate::column::ColumnId,
    ) -> SelectionId {
        self.nodes.push(Node { kind, parent, decision });
        SelectionId(self.nodes.len() - 1)
    }

    pub fn passed(
        &self,
        id: SelectionId,
        columns: &ColumnComputation,
        slot: Slot,
        entry: Entry,
    ) -> EngineResult<bool> {
        Ok(self.resolve(id, columns, slot, entry)?.0)
    }

    pub fn weight(
        &self,
        id: SelectionId,
        columns: &ColumnComputation,
        slot: Slot,
        entry: Entry,
    ) -> EngineResult<f64> {
        Ok(self.resolve(id, columns, slot, entry)?.1)
    }

    fn resolve(
        &self,
        id: SelectionId,
        columns: &ColumnComputation,
        slot: Slot,
        entry: Entry,
    ) -> EngineResult<(bool, f64)> {
        let node = &self.nodes[id.0];
        let value = columns.value(node.decision, slot, entry)?;
        let (local_passed, local_weight) = decode_decision(node.kind, &value)?;
        match node.parent {
            None => match node.kind {
                Kind::Cut => Ok((local_passed, 1.0)),
                Kind::Weight => Ok((true, local_weight)),
            },
            Some(parent_id) => {
                let (parent_passed, parent_weight) = self.resolve(parent_id, columns, slot, entry)?;
                match node.kind {
                    Kind::Cut => Ok((parent_passed && local_passed, parent_weight)),
                    Kind::Weight => Ok((parent_passed, parent_weight * local_weight)),
                }
            }
        }
    }

    pub fn initialize_all(&mut self, slot: Slot, begin: Entry, end: Entry) -> EngineResult<()> {
        for node in &mut self.nodes {
            node.initialize(slot, begin, end)?;
        }
        Ok(())
    }

    pub fn finalize_all(&mut self, slot: Slot) -> EngineResult<()> {
        for node in &mut self.nodes {
            node.finalize(slot)?;
        }
        Ok(())
    }
}
