use std::sync::Arc;

use crate::guard::Expr;

use super::place::PlaceId;

/// Index into [`super::cpn::Net`]'s transition table, in declaration order —
/// the order `fire_to_quiescence` scans in (`spec.md` §4.3's determinism
/// requirement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionId(pub(crate) usize);

/// An arc's effect on enabling, tagged per the "inhibitor arcs" design
/// note: `Normal` requires at least `weight` tokens to enable and consumes
/// them on firing; `Inhibitor` requires *fewer than* `weight` tokens to
/// enable and is never consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    Normal { weight: u32 },
    Inhibitor { weight: u32 },
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub name: String,
    pub guard: Arc<Expr>,
    pub inputs: Vec<(PlaceId, ArcKind)>,
    pub outputs: Vec<(PlaceId, u32)>,
}
