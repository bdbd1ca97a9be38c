use crate::aggregate::TimeSeriesPoint;
use crate::drill::Metric;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Whole-range totals of one entity; one legend entry of a breakdown chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityTotal {
    pub entity_id: String,
    pub entity_name: String,
    pub revenue: f64,
    pub profit: f64,
}

impl EntityTotal {
    pub fn value(&self, metric: Metric) -> f64 {
        metric.pick(self.revenue, self.profit)
    }

    /// Fraction of `grand_total` this entity accounts for; `0.0` when the total is zero.
    pub fn share(&self, metric: Metric, grand_total: f64) -> f64 {
        if grand_total == 0.0 {
            0.0
        } else {
            self.value(metric) / grand_total
        }
    }
}

/// Sum every point per entity, in first-seen order.
pub fn entity_totals(points: &[TimeSeriesPoint]) -> Vec<EntityTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<EntityTotal> = Vec::new();
    for point in points {
        let idx = *index.entry(point.entity_id.as_str()).or_insert_with(|| {
            totals.push(EntityTotal {
                entity_id: point.entity_id.clone(),
                entity_name: point.entity_name.clone(),
                revenue: 0.0,
                profit: 0.0,
            });
            totals.len() - 1
        });
        totals[idx].revenue += point.revenue;
        totals[idx].profit += point.profit;
    }
    totals
}

/// The `n` entities with the largest summed `metric`.
///
/// Ties are broken by name ascending, then id, so the result does not depend on input order.
/// Entities past `n` are dropped.
pub fn select_top(points: &[TimeSeriesPoint], metric: Metric, n: usize) -> Vec<EntityTotal> {
    let mut totals = entity_totals(points);
    totals.sort_by_cached_key(|t| {
        (
            Reverse(OrderedFloat(t.value(metric))),
            t.entity_name.clone(),
            t.entity_id.clone(),
        )
    });
    totals.truncate(n);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point(id: &str, name: &str, revenue: f64, profit: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: "Jan 01".into(),
            raw_date: "2024-01-01".into(),
            entity_id: id.into(),
            entity_name: name.into(),
            revenue,
            profit,
        }
    }

    #[test]
    fn ranks_by_metric_and_drops_the_tail() {
        let points = vec![
            point("a", "A", 10.0, 9.0),
            point("b", "B", 30.0, 1.0),
            point("a", "A", 25.0, 0.0),
            point("c", "C", 5.0, 20.0),
        ];
        let ids = |totals: Vec<EntityTotal>| -> Vec<String> {
            totals.into_iter().map(|t| t.entity_id).collect()
        };
        assert_eq!(ids(select_top(&points, Metric::Revenue, 2)), vec!["a", "b"]);
        assert_eq!(ids(select_top(&points, Metric::Profit, 5)), vec!["c", "a", "b"]);
    }

    #[test]
    fn ties_break_by_name_then_id() {
        let points = vec![
            point("2", "Same", 1.0, 0.0),
            point("z", "Alpha", 1.0, 0.0),
            point("1", "Same", 1.0, 0.0),
        ];
        let order: Vec<_> = select_top(&points, Metric::Revenue, 3)
            .into_iter()
            .map(|t| t.entity_id)
            .collect();
        assert_eq!(order, vec!["z", "1", "2"]);
    }

    #[test]
    fn share_of_zero_total_is_zero() {
        let total = entity_totals(&[point("a", "A", 3.0, 1.0)]).remove(0);
        assert_eq!(total.share(Metric::Revenue, 12.0), 0.25);
        assert_eq!(total.share(Metric::Profit, 0.0), 0.0);
    }
}
