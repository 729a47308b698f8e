use bevy::prelude::*;
use smallvec::SmallVec;

/// What a heuristic term sees when scoring a candidate node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicInput {
    pub candidate: Vec3,
    /// Position scored against, e.g. the threat's node.
    pub reference: Vec3,
    /// Steps from the search source to the candidate.
    pub steps: u32,
}

/// A single scoring criterion. Higher scores are better.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeuristicTerm {
    /// Straight-line distance to the reference.
    MaximizeDistance,
    /// Distance to the reference, capped at `max`.
    MaximizeDistanceClamped { max: f32 },
    /// `max` minus the distance to the reference.
    MinimizeDistance { max: f32 },
    /// `-steps * cost_per_step`: penalizes long detours.
    StepCost { cost_per_step: f32 },
}

impl HeuristicTerm {
    pub fn score(&self, input: &HeuristicInput) -> f32 {
        match *self {
            HeuristicTerm::MaximizeDistance => input.candidate.distance(input.reference),
            HeuristicTerm::MaximizeDistanceClamped { max } => {
                input.candidate.distance(input.reference).min(max)
            }
            HeuristicTerm::MinimizeDistance { max } => max - input.candidate.distance(input.reference),
            HeuristicTerm::StepCost { cost_per_step } => input.steps as f32 * -cost_per_step,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedTerm {
    pub term: HeuristicTerm,
    pub weight: f32,
}

/// Weighted sum of heuristic terms, evaluated in order.
///
/// ```rust
/// use waymark::nav::{HeuristicSpec, HeuristicTerm};
///
/// let spec = HeuristicSpec::default()
///     .with_term(HeuristicTerm::MaximizeDistanceClamped { max: 12.0 }, 1.0)
///     .with_term(HeuristicTerm::StepCost { cost_per_step: 0.1 }, 1.0);
/// assert_eq!(spec.terms().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeuristicSpec {
    terms: SmallVec<[WeightedTerm; 4]>,
}

impl HeuristicSpec {
    pub fn single(term: HeuristicTerm) -> Self {
        Self::default().with_term(term, 1.0)
    }

    pub fn with_term(mut self, term: HeuristicTerm, weight: f32) -> Self {
        self.terms.push(WeightedTerm { term, weight });
        self
    }

    /// Scoring used when fleeing. Unbounded: raw distance from the threat.
    /// Bounded: distance clamped at `range`, minus accumulated step cost.
    pub fn flee(range: Option<f32>, step_cost: f32) -> Self {
        match range {
            None => Self::single(HeuristicTerm::MaximizeDistance),
            Some(max) => Self::default()
                .with_term(HeuristicTerm::MaximizeDistanceClamped { max }, 1.0)
                .with_term(HeuristicTerm::StepCost { cost_per_step: step_cost }, 1.0),
        }
    }

    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    pub fn evaluate(&self, input: &HeuristicInput) -> f32 {
        self.terms
            .iter()
            .map(|weighted| weighted.weight * weighted.term.score(input))
            .sum()
    }
}
