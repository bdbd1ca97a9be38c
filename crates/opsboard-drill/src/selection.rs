use crate::crossfilter::FilterClause;
use serde::{Deserialize, Serialize};

/// The cross-filter clauses active on one dashboard page.
///
/// Owned by the page controller and passed into the filter/drill functions explicitly. Switching
/// to another page (filter context) starts from an empty selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    context: Option<String>,
    clauses: Vec<FilterClause>,
    #[serde(skip)]
    revision: u64,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_context(context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::default()
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Bumped on every mutation that changed the clause list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.clauses.iter().any(|c| c.same_selection(field, value))
    }

    pub fn values_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.clauses
            .iter()
            .filter(move |c| c.field == field)
            .map(|c| c.value.as_str())
    }

    /// Add `clause` unless the same field/value pair is already selected.
    pub fn add(&mut self, clause: FilterClause) -> bool {
        if self.contains(&clause.field, &clause.value) {
            return false;
        }
        self.clauses.push(clause);
        self.bump();
        true
    }

    /// Select `clause`, or deselect it when it is already active. Returns whether the clause is
    /// selected afterwards.
    pub fn toggle(&mut self, clause: FilterClause) -> bool {
        if self.remove(&clause.field, &clause.value) {
            return false;
        }
        self.add(clause)
    }

    pub fn remove(&mut self, field: &str, value: &str) -> bool {
        let before = self.clauses.len();
        self.clauses.retain(|c| !c.same_selection(field, value));
        let changed = self.clauses.len() != before;
        if changed {
            self.bump();
        }
        changed
    }

    /// Drop every clause on `field`; returns how many were removed.
    pub fn clear_field(&mut self, field: &str) -> usize {
        let before = self.clauses.len();
        self.clauses.retain(|c| c.field != field);
        let removed = before - self.clauses.len();
        if removed > 0 {
            self.bump();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.clauses.is_empty() {
            self.clauses.clear();
            self.bump();
        }
    }

    /// Move the selection to another page/filter context. Returns `true` when that discarded the
    /// previous clauses.
    pub fn enter_context(&mut self, context: &str) -> bool {
        if self.context.as_deref() == Some(context) {
            return false;
        }
        self.context = Some(context.to_string());
        let had_clauses = !self.clauses.is_empty();
        self.clear();
        had_clauses
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
