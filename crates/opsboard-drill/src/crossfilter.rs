use opsboard_model::{HierarchyColumn, HierarchyRow, Record, Value};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

/// A single `field = value` selection, usually created by clicking a chart bar or table cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub value: String,
    /// Human-readable chip text. Defaults to the value.
    #[serde(default)]
    pub label: String,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            field: field.into(),
            label: value.clone(),
            value,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub(crate) fn same_selection(&self, field: &str, value: &str) -> bool {
        self.field == field && self.value == value
    }
}

/// What a row holds for a filter field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldProbe<'a> {
    /// The row has no such field; filters on it do not apply to this row.
    Absent,
    /// The field is present but null.
    Null,
    /// Trimmed string form of the value.
    Text(Cow<'a, str>),
}

/// Access to filterable fields of a row type.
pub trait FieldLookup {
    fn probe(&self, field: &str) -> FieldProbe<'_>;
}

impl FieldLookup for Record {
    fn probe(&self, field: &str) -> FieldProbe<'_> {
        match self.get(field) {
            None => FieldProbe::Absent,
            Some(value) => match value.filter_key() {
                Some(text) => FieldProbe::Text(text),
                None => FieldProbe::Null,
            },
        }
    }
}

fn probe_column(row: &HierarchyRow, column: HierarchyColumn) -> FieldProbe<'_> {
    if !row.carries(column) {
        return FieldProbe::Absent;
    }
    match row.column(column) {
        Some(text) => FieldProbe::Text(Cow::Borrowed(text.trim())),
        None => FieldProbe::Null,
    }
}

fn probe_number(value: f64) -> FieldProbe<'static> {
    match Value::from(value).filter_key() {
        Some(text) => FieldProbe::Text(Cow::Owned(text.into_owned())),
        None => FieldProbe::Null,
    }
}

impl FieldLookup for HierarchyRow {
    fn probe(&self, field: &str) -> FieldProbe<'_> {
        if let Some(column) = HierarchyColumn::from_field(field) {
            return probe_column(self, column);
        }
        match field {
            "date" => FieldProbe::Text(Cow::Owned(self.iso_date())),
            "revenue" | "rev" => probe_number(self.revenue),
            "profit" => probe_number(self.profit),
            "requests" => probe_number(self.requests),
            "paid" => probe_number(self.paid),
            _ => FieldProbe::Absent,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct FieldGroup {
    field: String,
    accepted: HashSet<String>,
    accepts_null: bool,
}

/// Clauses grouped by field: OR inside a group, AND across groups.
///
/// Compile once per clause list and reuse it for every dataset on the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledFilter {
    groups: Vec<FieldGroup>,
}

impl CompiledFilter {
    pub fn compile(clauses: &[FilterClause]) -> Self {
        let mut groups: Vec<FieldGroup> = Vec::new();
        for clause in clauses {
            let group = match groups.iter().position(|g| g.field == clause.field) {
                Some(idx) => &mut groups[idx],
                None => {
                    groups.push(FieldGroup {
                        field: clause.field.clone(),
                        accepted: HashSet::new(),
                        accepts_null: false,
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            let value = clause.value.trim();
            if value.is_empty() || value == "null" {
                group.accepts_null = true;
            }
            group.accepted.insert(value.to_string());
        }
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Filtered fields, in order of first appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.field.as_str())
    }

    pub fn matches<R: FieldLookup + ?Sized>(&self, row: &R) -> bool {
        self.groups.iter().all(|group| match row.probe(&group.field) {
            FieldProbe::Absent => true,
            FieldProbe::Null => group.accepts_null,
            FieldProbe::Text(text) => group.accepted.contains(text.as_ref()),
        })
    }

    /// Stable filter: matching rows in input order.
    pub fn apply<R: FieldLookup + Clone>(&self, data: &[R]) -> Vec<R> {
        data.iter().filter(|row| self.matches(*row)).cloned().collect()
    }
}

/// Rows of `data` that satisfy every field group of `clauses`.
///
/// With no clauses (or no data) the input slice itself is returned, so callers must treat the
/// result as read-only.
pub fn filter_records<'a, R: FieldLookup + Clone>(
    data: &'a [R],
    clauses: &[FilterClause],
) -> Cow<'a, [R]> {
    if data.is_empty() || clauses.is_empty() {
        return Cow::Borrowed(data);
    }
    Cow::Owned(CompiledFilter::compile(clauses).apply(data))
}

/// Distinct non-null values of `field`, in first-seen order.
pub fn field_values<R: FieldLookup>(data: &[R], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in data {
        if let FieldProbe::Text(text) = row.probe(field) {
            if seen.insert(text.to_string()) {
                out.push(text.into_owned());
            }
        }
    }
    out
}

#[derive(Clone, Debug)]
struct MemoEntry<R> {
    data: Arc<[R]>,
    clauses: Vec<FilterClause>,
    result: Arc<[R]>,
}

/// Caches the last filter result keyed on dataset identity and clause list.
///
/// The cache holds on to the dataset `Arc`, so a pointer match always means the same rows.
#[derive(Clone, Debug)]
pub struct MemoizedFilter<R> {
    last: Option<MemoEntry<R>>,
    recomputations: u64,
}

impl<R> Default for MemoizedFilter<R> {
    fn default() -> Self {
        Self {
            last: None,
            recomputations: 0,
        }
    }
}

impl<R: FieldLookup + Clone> MemoizedFilter<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&mut self, data: &Arc<[R]>, clauses: &[FilterClause]) -> Arc<[R]> {
        if let Some(entry) = &self.last {
            if Arc::ptr_eq(&entry.data, data) && entry.clauses.as_slice() == clauses {
                return Arc::clone(&entry.result);
            }
        }

        self.recomputations += 1;
        let result: Arc<[R]> = if clauses.is_empty() {
            Arc::clone(data)
        } else {
            let rows: &[R] = data;
            CompiledFilter::compile(clauses).apply(rows).into()
        };
        self.last = Some(MemoEntry {
            data: Arc::clone(data),
            clauses: clauses.to_vec(),
            result: Arc::clone(&result),
        });
        result
    }

    /// How many times the filter actually scanned (or passed through) a dataset.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use opsboard_model::ColumnSet;
    use pretty_assertions::assert_eq;

    fn market(m: &str) -> Record {
        Record::new().with("market", m)
    }

    #[test]
    fn null_values_match_only_empty_or_null_literals() {
        let rows = vec![
            Record::new().with("partner", Value::Blank),
            Record::new().with("partner", "Acme"),
        ];
        let out = filter_records(&rows, &[FilterClause::new("partner", "null")]);
        assert_eq!(out.as_ref(), &rows[..1]);

        let out = filter_records(&rows, &[FilterClause::new("partner", "")]);
        assert_eq!(out.as_ref(), &rows[..1]);

        let out = filter_records(&rows, &[FilterClause::new("partner", "Acme")]);
        assert_eq!(out.as_ref(), &rows[1..]);
    }

    #[test]
    fn record_values_are_trimmed_and_numbers_compare_as_text() {
        let rows = vec![
            Record::new().with("market", " US "),
            Record::new().with("pid", 17),
            Record::new().with("pid", 17.5),
        ];
        assert_eq!(
            filter_records(&rows, &[FilterClause::new("market", "US")]).len(),
            3
        );
        let out = filter_records(&rows, &[FilterClause::new("pid", "17")]);
        assert_eq!(out.as_ref(), &rows[..2]);
    }

    #[test]
    fn hierarchy_rows_expose_their_fixed_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = vec![
            HierarchyRow {
                pid: Some("1".into()),
                pub_name: Some("Daily".into()),
                ..HierarchyRow::on(date)
            },
            HierarchyRow {
                pid: Some("2".into()),
                ..HierarchyRow::on(date)
            },
        ];
        let out = filter_records(&rows, &[FilterClause::new("pubname", "Daily")]);
        assert_eq!(out.as_ref(), &rows[..1]);
        assert_eq!(
            filter_records(&rows, &[FilterClause::new("date", "2024-01-01")]).len(),
            2
        );
        assert_eq!(
            filter_records(&rows, &[FilterClause::new("country", "US")]).len(),
            2
        );
    }

    #[test]
    fn columns_a_row_never_carried_are_absent() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let row = HierarchyRow {
            pid: Some("17".into()),
            columns: ColumnSet::empty()
                .with(HierarchyColumn::Pid)
                .with(HierarchyColumn::Mid),
            ..HierarchyRow::on(date)
        };
        assert_eq!(row.probe("zid"), FieldProbe::Absent);
        assert_eq!(row.probe("mid"), FieldProbe::Null);
        assert_eq!(row.probe("pid"), FieldProbe::Text(Cow::Borrowed("17")));

        let rows = vec![row];
        assert_eq!(filter_records(&rows, &[FilterClause::new("zid", "1700")]).len(), 1);
        assert!(filter_records(&rows, &[FilterClause::new("mid", "170")]).is_empty());
    }

    #[test]
    fn field_values_are_distinct_in_first_seen_order() {
        let rows = vec![market("JP"), market("US"), market(" JP"), Record::new()];
        assert_eq!(field_values(&rows, "market"), vec!["JP", "US"]);
    }

    #[test]
    fn memoized_filter_reuses_results_for_identical_inputs() {
        let data: Arc<[Record]> = vec![market("US"), market("JP")].into();
        let clauses = vec![FilterClause::new("market", "US")];
        let mut memo = MemoizedFilter::new();

        let first = memo.filter(&data, &clauses);
        let second = memo.filter(&data, &clauses);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(memo.recomputations(), 1);

        let copy: Arc<[Record]> = data.to_vec().into();
        memo.filter(&copy, &clauses);
        assert_eq!(memo.recomputations(), 2);

        let unfiltered = memo.filter(&copy, &[]);
        assert!(Arc::ptr_eq(&unfiltered, &copy));
        assert_eq!(memo.recomputations(), 3);
    }
}
