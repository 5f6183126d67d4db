//! Cart recommendation queries

use super::types::{Recommendation, ScoredItem};
use crate::model::{CopurchaseModel, ItemId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Default number of recommendations per cart
pub const DEFAULT_TOP_N: usize = 3;

/// Default weight of the popularity bias added to co-occurring candidates
pub const DEFAULT_POPULARITY_WEIGHT: f64 = 0.1;

/// Errors that can occur while recommending
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    /// The requested count was zero
    #[error("top_n must be at least 1")]
    InvalidTopN,

    /// Fallback fill was needed but the model has no items to draw from
    #[error("cannot fallback-fill from a model with no items")]
    EmptyModel,
}

/// Query recommending items for a partially-filled cart
///
/// Candidates are items that co-occur with at least one cart item in the
/// historical orders; each accumulates the co-occurrence counts of every
/// cart item it was bought alongside, plus a small popularity bias.
/// Popularity alone never qualifies an item. When fewer candidates exist
/// than requested, the list is padded with the globally most popular item.
#[derive(Debug, Clone)]
pub struct RecommendQuery {
    /// Items already in the cart
    pub cart: Vec<ItemId>,
    /// Number of recommendations to return
    pub top_n: usize,
    /// Weight of the popularity bias
    pub popularity_weight: f64,
}

impl RecommendQuery {
    /// Create a query for the given cart with default parameters
    pub fn for_cart<I, T>(cart: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        Self {
            cart: cart.into_iter().map(Into::into).collect(),
            top_n: DEFAULT_TOP_N,
            popularity_weight: DEFAULT_POPULARITY_WEIGHT,
        }
    }

    /// Set the number of recommendations to return
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the weight of the popularity bias
    pub fn popularity_weight(mut self, weight: f64) -> Self {
        self.popularity_weight = weight;
        self
    }

    /// Execute the query against a model
    ///
    /// Always returns exactly `top_n` items on success. Cart items unknown
    /// to the model contribute nothing and are not errors; they degrade the
    /// result toward fallback fill.
    pub fn execute(&self, model: &CopurchaseModel) -> Result<Recommendation, RecommendError> {
        if self.top_n == 0 {
            return Err(RecommendError::InvalidTopN);
        }

        // Cart membership is a set: blank entries are dropped, duplicates
        // collapse, and every cart item is excluded from candidacy.
        let cart: HashSet<&ItemId> = self.cart.iter().filter(|item| !item.is_blank()).collect();

        let mut scores: HashMap<&ItemId, f64> = HashMap::new();
        for item in cart.iter().copied() {
            for (partner, count) in model.partners(item) {
                if cart.contains(partner) {
                    continue;
                }
                *scores.entry(partner).or_insert(0.0) += count as f64;
            }
        }

        // Popularity only breaks ties among co-occurring candidates; an item
        // with zero co-occurrence with the cart is never considered.
        let mut candidates: Vec<ScoredItem> = scores
            .into_iter()
            .map(|(item, score)| ScoredItem {
                score: score + self.popularity_weight * model.popularity(item) as f64,
                item: item.clone(),
            })
            .collect();

        // Score descending, ties broken by ascending identifier.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.item.cmp(&b.item))
        });
        candidates.truncate(self.top_n);

        let mut items: Vec<ItemId> = candidates.iter().map(|c| c.item.clone()).collect();

        // Fallback fill ignores cart exclusion and deduplication; the
        // repeated-filler quirk is intentional (see DESIGN.md).
        let mut fill_count = 0;
        if items.len() < self.top_n {
            let filler = model.most_popular().ok_or(RecommendError::EmptyModel)?;
            while items.len() < self.top_n {
                items.push(filler.clone());
                fill_count += 1;
            }
        }

        Ok(Recommendation {
            items,
            candidates,
            fill_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;

    fn model(orders: &[&[&str]]) -> CopurchaseModel {
        CopurchaseModel::from_orders(
            "test",
            orders
                .iter()
                .map(|items| Order::from_items(items.iter().copied())),
        )
    }

    #[test]
    fn ranks_by_co_occurrence_plus_popularity_bias() {
        let model = model(&[&["A", "B"], &["A", "B"], &["A", "C"]]);
        let rec = RecommendQuery::for_cart(["A"])
            .top_n(2)
            .execute(&model)
            .unwrap();

        // B: 2 + 0.1*2 = 2.2, C: 1 + 0.1*1 = 1.1
        assert_eq!(rec.items, vec![ItemId::from("B"), ItemId::from("C")]);
        assert_eq!(rec.fill_count, 0);
        assert!((rec.candidates[0].score - 2.2).abs() < 1e-9);
        assert!((rec.candidates[1].score - 1.1).abs() < 1e-9);
    }

    #[test]
    fn fills_short_results_with_the_most_popular_item() {
        let model = model(&[&["A", "B"]]);
        let rec = RecommendQuery::for_cart(["A"])
            .top_n(3)
            .execute(&model)
            .unwrap();

        assert_eq!(rec.len(), 3);
        assert_eq!(rec.items[0], ItemId::from("B"));
        assert_eq!(rec.fill_count, 2);
    }

    #[test]
    fn unknown_cart_falls_back_entirely_to_popularity() {
        let model = model(&[&["A", "B"], &["A", "C"]]);
        let rec = RecommendQuery::for_cart(["Z"])
            .top_n(2)
            .execute(&model)
            .unwrap();

        assert!(rec.is_fallback_only());
        assert_eq!(rec.items, vec![ItemId::from("A"), ItemId::from("A")]);
        assert_eq!(rec.fill_count, 2);
    }

    #[test]
    fn cart_items_are_excluded_from_candidates() {
        let model = model(&[&["A", "B", "C"], &["A", "B"]]);
        let rec = RecommendQuery::for_cart(["A", "B"])
            .top_n(1)
            .execute(&model)
            .unwrap();

        assert_eq!(rec.items, vec![ItemId::from("C")]);
    }

    #[test]
    fn duplicate_cart_entries_contribute_once() {
        let model = model(&[&["A", "B"], &["A", "C"], &["A", "C"]]);

        let once = RecommendQuery::for_cart(["A"]).top_n(2).execute(&model).unwrap();
        let twice = RecommendQuery::for_cart(["A", "A"])
            .top_n(2)
            .execute(&model)
            .unwrap();

        assert_eq!(once.candidates, twice.candidates);
    }

    #[test]
    fn blank_cart_entries_are_dropped() {
        let model = model(&[&["A", "B"]]);
        let rec = RecommendQuery::for_cart(["", "  ", "A"])
            .top_n(1)
            .execute(&model)
            .unwrap();

        assert_eq!(rec.items, vec![ItemId::from("B")]);
    }

    #[test]
    fn contributions_accumulate_across_cart_items() {
        // D co-occurs once with A and once with B: score 2 + bias
        let model = model(&[&["A", "D"], &["B", "D"], &["A", "E"]]);
        let rec = RecommendQuery::for_cart(["A", "B"])
            .top_n(2)
            .execute(&model)
            .unwrap();

        assert_eq!(rec.items[0], ItemId::from("D"));
        // D: 2 + 0.1*2 = 2.2, E: 1 + 0.1*1 = 1.1
        assert!((rec.candidates[0].score - 2.2).abs() < 1e-9);
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let model = model(&[&["A", "B"]]);
        let err = RecommendQuery::for_cart(["A"])
            .top_n(0)
            .execute(&model)
            .unwrap_err();
        assert_eq!(err, RecommendError::InvalidTopN);
    }

    #[test]
    fn empty_model_cannot_fallback_fill() {
        let model = model(&[]);
        let err = RecommendQuery::for_cart(["A"])
            .top_n(2)
            .execute(&model)
            .unwrap_err();
        assert_eq!(err, RecommendError::EmptyModel);
    }

    #[test]
    fn distinct_scores_rank_deterministically() {
        let model = model(&[
            &["A", "B"],
            &["A", "B"],
            &["A", "C"],
            &["A", "C"],
            &["A", "D"],
        ]);

        let first = RecommendQuery::for_cart(["A"]).top_n(3).execute(&model).unwrap();
        let second = RecommendQuery::for_cart(["A"]).top_n(3).execute(&model).unwrap();
        assert_eq!(first.items, second.items);
        // B and C tie on co-occurrence but differ on popularity bias order
        // only via identifier; D is strictly last.
        assert_eq!(first.items[2], ItemId::from("D"));
    }

    #[test]
    fn model_is_not_mutated_by_queries() {
        let model = model(&[&["A", "B"], &["A", "C"]]);
        let before: u64 = model.popularity(&"A".into());

        for _ in 0..3 {
            RecommendQuery::for_cart(["A"]).top_n(2).execute(&model).unwrap();
        }

        assert_eq!(model.popularity(&"A".into()), before);
        assert_eq!(model.co_occurrence(&"A".into(), &"B".into()), 1);
    }
}
