//! Score ledger

use crate::core::backend::BackendId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One row of the final (or running) standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position; ties get consecutive ranks in enumeration order
    pub rank: usize,
    pub backend: BackendId,
    pub points: u32,
}

/// Per-backend point totals (Entity)
///
/// The key set is fixed when the ledger is created and keeps the order it
/// was given in, which is also the tie-break order of [`ScoreLedger::standings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    totals: Vec<(BackendId, u32)>,
}

impl ScoreLedger {
    /// Create a ledger with zero points for each backend (duplicates ignored)
    pub fn new(backends: &[BackendId]) -> Self {
        let mut totals: Vec<(BackendId, u32)> = Vec::with_capacity(backends.len());
        for backend in backends {
            if !totals.iter().any(|(b, _)| b == backend) {
                totals.push((*backend, 0));
            }
        }
        Self { totals }
    }

    /// Add exactly one point to a backend, returning its new total
    pub fn award(&mut self, backend: BackendId) -> Result<u32, DomainError> {
        let entry = self
            .totals
            .iter_mut()
            .find(|(b, _)| *b == backend)
            .ok_or_else(|| DomainError::BackendNotInGame(backend.to_string()))?;
        entry.1 += 1;
        Ok(entry.1)
    }

    pub fn points(&self, backend: BackendId) -> Option<u32> {
        self.totals
            .iter()
            .find(|(b, _)| *b == backend)
            .map(|(_, p)| *p)
    }

    pub fn contains(&self, backend: BackendId) -> bool {
        self.totals.iter().any(|(b, _)| *b == backend)
    }

    /// Backends in enumeration order
    pub fn backends(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.totals.iter().map(|(b, _)| *b)
    }

    /// Totals in enumeration order (for a running score panel)
    pub fn totals(&self) -> &[(BackendId, u32)] {
        &self.totals
    }

    pub fn total_points(&self) -> u32 {
        self.totals.iter().map(|(_, p)| p).sum()
    }

    /// Backends ordered by descending points, ties in enumeration order
    pub fn standings(&self) -> Vec<Standing> {
        let mut sorted = self.totals.clone();
        // sort_by is stable, so equal totals keep enumeration order
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, (backend, points))| Standing {
                rank: i + 1,
                backend,
                points,
            })
            .collect()
    }

    /// Zero every total, keeping the key set
    pub fn reset(&mut self) {
        for entry in &mut self.totals {
            entry.1 = 0;
        }
    }
}
