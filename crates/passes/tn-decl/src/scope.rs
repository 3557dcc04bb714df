//! Declaration stack
//!
//! Lexical scoping is an undo log: before a symbol is rebound its previous
//! state is pushed as a snapshot, and closing a scope copies the snapshots
//! back. Scope boundaries are marker entries carrying the block id that was
//! active when the scope opened. Snapshots are stored by value and refer to
//! symbols by id, never by reference into the table.

use crate::decl::DeclId;
use crate::error::InternalError;
use crate::symbol::{SymbolId, SymbolTable};
use std::fmt::Write as _;
use tn_span::Pos;
use tracing::trace;

/// Identifier of one lexical block; never reused within a compilation
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Saved state of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// The symbol the state belongs to
    pub sym: SymbolId,
    /// Binding before the push
    pub def: Option<DeclId>,
    /// Block before the push
    pub block: Option<BlockId>,
    /// Last declaration line before the push
    pub last_line: Option<Pos>,
}

/// One entry of the declaration stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEntry {
    /// Saved symbol state
    Saved(Snapshot),
    /// Scope boundary, carrying the block active when the scope opened
    Mark {
        /// Block to restore when the scope closes
        block: BlockId,
    },
}

/// LIFO undo log of symbol snapshots and scope markers
#[derive(Debug, Clone)]
pub struct DeclStack {
    entries: Vec<StackEntry>,
    block: BlockId,
    block_gen: u32,
    trace: bool,
}

impl DeclStack {
    /// Create an empty stack; top-level code runs in block 1
    pub fn new(trace: bool) -> Self {
        Self {
            entries: Vec::new(),
            block: BlockId(1),
            block_gen: 1,
            trace,
        }
    }

    /// Block new bindings are made in
    pub fn current_block(&self) -> BlockId {
        self.block
    }

    /// Number of entries, markers included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Save a symbol's current state; returns the index of the new entry
    pub fn push_snapshot(&mut self, sym: SymbolId, table: &SymbolTable) -> usize {
        let data = table.get(sym);
        self.entries.push(StackEntry::Saved(Snapshot {
            sym,
            def: data.def,
            block: data.block,
            last_line: data.last_line,
        }));
        if self.trace {
            trace!(target: "decl", symbol = table.name(sym), def = ?data.def, "push");
        }
        self.entries.len() - 1
    }

    /// Open a scope with a freshly minted block id
    pub fn mark_scope(&mut self) {
        self.entries.push(StackEntry::Mark { block: self.block });
        self.block_gen += 1;
        self.block = BlockId(self.block_gen);
    }

    /// Close the innermost scope, restoring every symbol rebound in it.
    ///
    /// The live `last_line` of a restored symbol is kept so later
    /// diagnostics can still point at the inner declaration.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::ScopeUnderflow` if no marker is left.
    pub fn pop_scope(&mut self, table: &mut SymbolTable) -> Result<(), InternalError> {
        while let Some(entry) = self.entries.pop() {
            match entry {
                StackEntry::Saved(snapshot) => {
                    let data = table.get_mut(snapshot.sym);
                    data.def = snapshot.def;
                    data.block = snapshot.block;
                    if self.trace {
                        trace!(
                            target: "decl",
                            symbol = table.name(snapshot.sym),
                            def = ?snapshot.def,
                            "pop"
                        );
                    }
                }
                StackEntry::Mark { block } => {
                    self.block = block;
                    return Ok(());
                }
            }
        }
        Err(InternalError::ScopeUnderflow)
    }

    /// Replace the innermost scope by a new one with a distinct block id
    ///
    /// # Errors
    ///
    /// Returns `InternalError::ScopeUnderflow` if no marker is left.
    pub fn repoint_scope(&mut self, table: &mut SymbolTable) -> Result<(), InternalError> {
        self.pop_scope(table)?;
        self.mark_scope();
        Ok(())
    }

    /// Number of scope markers still on the stack
    pub fn leftover_marks(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, StackEntry::Mark { .. }))
            .count()
    }

    /// Human-readable listing, top of stack first
    pub fn dump(&self, table: &SymbolTable) -> String {
        let mut out = String::new();
        for (idx, entry) in self.entries.iter().rev().enumerate() {
            match entry {
                StackEntry::Mark { block } => {
                    let _ = writeln!(out, "    {:02} mark (block {})", idx + 1, block.0);
                }
                StackEntry::Saved(snapshot) => {
                    let _ = writeln!(
                        out,
                        "    {:02} '{}' saved {:?}",
                        idx + 1,
                        table.name(snapshot.sym),
                        snapshot.def
                    );
                }
            }
        }
        out
    }
}
