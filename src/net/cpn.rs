use std::collections::HashMap;

use crate::guard::{self, Env, GuardError};

use super::place::{Place, PlaceId};
use super::transition::{ArcKind, Transition, TransitionId};

/// Safety cap on firings within one call to [`Net::fire_to_quiescence`]
/// (`spec.md` §4.3). Reaching it is reported as an oscillation warning, not
/// an error.
pub const MAX_FIRINGS_PER_QUIESCENCE: u32 = 10;

/// The result of running the CPN to quiescence once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiringOutcome {
    /// Names of the transitions that fired, in firing order.
    pub fired: Vec<String>,
    /// `true` if [`MAX_FIRINGS_PER_QUIESCENCE`] was reached without the net
    /// settling — an oscillatory guard configuration.
    pub oscillation: bool,
}

/// The Context Petri Net: places, transitions, and the arcs between them,
/// plus the relation bookkeeping ([`Net::exclusion_groups`],
/// [`Net::requirements`]) kept around for invariant checks.
///
/// Built exclusively through [`super::builder::NetBuilder`]; there is no
/// public way to add places or transitions after construction — the net's
/// structure is fixed for the run, only token counts change.
#[derive(Debug, Clone)]
pub struct Net {
    pub(super) places: Vec<Place>,
    pub(super) place_index: HashMap<String, PlaceId>,
    pub(super) transitions: Vec<Transition>,
    pub(super) transition_index: HashMap<String, TransitionId>,
    pub(super) globals: Vec<String>,
    pub(super) exclusion_groups: Vec<Vec<String>>,
    pub(super) requirements: Vec<(String, String)>,
}

impl Net {
    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.place_index.get(name).copied()
    }

    pub fn token_count(&self, place_name: &str) -> Option<u32> {
        self.place_id(place_name).map(|id| self.places[id.0].tokens)
    }

    /// A comparable snapshot of every place's token count, in place
    /// declaration order. Used by the engine's progress watchdog to detect
    /// an inner loop that made no observable progress.
    pub fn token_snapshot(&self) -> Vec<u32> {
        self.places.iter().map(|p| p.tokens).collect()
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_index.get(name).copied()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }

    pub fn globals(&self) -> &[String] {
        &self.globals
    }

    pub fn exclusion_groups(&self) -> &[Vec<String>] {
        &self.exclusion_groups
    }

    pub fn requirements(&self) -> &[(String, String)] {
        &self.requirements
    }

    /// P1: every context's pair with its `_ModeSwitch` twin sums to 1.
    /// Structural — holds by construction unless a relation-expansion bug
    /// unbalances an arc pair; kept as a cheap runtime/testing assertion.
    pub fn check_pair_conservation(&self) -> Result<(), (String, String)> {
        for place in &self.places {
            if place.name.ends_with("_ModeSwitch") {
                continue;
            }
            let twin_name = format!("{}_ModeSwitch", place.name);
            if let Some(twin) = self.place_id(&twin_name) {
                let total = place.tokens + self.places[twin.0].tokens;
                if total != 1 {
                    return Err((place.name.clone(), twin_name));
                }
            }
        }
        Ok(())
    }

    /// P3: at most one place in any exclusion group holds a token.
    pub fn check_exclusion_groups(&self) -> Result<(), Vec<String>> {
        for group in &self.exclusion_groups {
            let active: Vec<String> = group
                .iter()
                .filter(|c| self.token_count(c).unwrap_or(0) >= 1)
                .cloned()
                .collect();
            if active.len() > 1 {
                return Err(active);
            }
        }
        Ok(())
    }

    /// P4: `tokens(dep) = 1 ⇒ tokens(req) = 1` for every declared requirement.
    pub fn check_requirements(&self) -> Result<(), (String, String)> {
        for (dep, req) in &self.requirements {
            let dep_active = self.token_count(dep).unwrap_or(0) >= 1;
            let req_active = self.token_count(req).unwrap_or(0) >= 1;
            if dep_active && !req_active {
                return Err((dep.clone(), req.clone()));
            }
        }
        Ok(())
    }

    fn is_enabled(&self, transition: &Transition, env: &Env) -> Result<bool, GuardError> {
        for (place_id, kind) in &transition.inputs {
            let tokens = self.places[place_id.0].tokens;
            let blocked = match kind {
                ArcKind::Normal { weight } => tokens < *weight,
                ArcKind::Inhibitor { weight } => tokens >= *weight,
            };
            if blocked {
                return Ok(false);
            }
        }
        guard::eval(&transition.guard, env)
    }

    fn fire(&mut self, id: TransitionId) {
        let transition = self.transitions[id.0].clone();
        for (place_id, kind) in &transition.inputs {
            if let ArcKind::Normal { weight } = kind {
                self.places[place_id.0].tokens -= weight;
            }
        }
        for (place_id, weight) in &transition.outputs {
            self.places[place_id.0].tokens += weight;
        }
    }

    /// Fire enabled transitions, in declaration order, until none remain
    /// enabled or [`MAX_FIRINGS_PER_QUIESCENCE`] firings have happened.
    ///
    /// Re-scans from the first transition after every firing so that
    /// declaration order remains the tie-break even as enablement changes
    /// mid-quiescence (`spec.md` §4.3's determinism requirement).
    pub fn fire_to_quiescence(&mut self, env: &Env) -> Result<FiringOutcome, GuardError> {
        let mut fired = Vec::new();
        for _ in 0..MAX_FIRINGS_PER_QUIESCENCE {
            let mut next = None;
            for idx in 0..self.transitions.len() {
                if self.is_enabled(&self.transitions[idx], env)? {
                    next = Some(idx);
                    break;
                }
            }
            match next {
                Some(idx) => {
                    let id = TransitionId(idx);
                    self.fire(id);
                    fired.push(self.transitions[idx].name.clone());
                }
                None => return Ok(FiringOutcome { fired, oscillation: false }),
            }
        }
        log::warn!(
            "fire_to_quiescence hit the {MAX_FIRINGS_PER_QUIESCENCE}-firing cap: {fired:?}"
        );
        Ok(FiringOutcome { fired, oscillation: true })
    }
}
