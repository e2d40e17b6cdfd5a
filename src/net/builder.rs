use std::collections::HashMap;
use std::sync::Arc;

use crate::guard;

use super::cpn::Net;
use super::error::NetError;
use super::place::{Place, PlaceId};
use super::transition::{ArcKind, Transition, TransitionId};

/// `spec.md` §6's `context_cfg`: a declarative description of places,
/// globals, guards, and relations, deserialized straight off the
/// configuration document. Declaration order in every `Vec` here is load-
/// bearing — it is the base for the CPN's deterministic firing order.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ContextConfig {
    pub places: Vec<PlaceDecl>,
    #[serde(default)]
    pub globals: Vec<String>,
    pub guards: Vec<GuardDecl>,
    #[serde(default)]
    pub relations: Relations,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PlaceDecl {
    pub name: String,
    pub initial: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct GuardDecl {
    /// `Activate_<context>` or `Deactivate_<context>`.
    pub transition: String,
    pub expr: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct InclusionDecl {
    pub src: String,
    pub tgt: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RequirementDecl {
    pub dep: String,
    pub req: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Relations {
    #[serde(default)]
    pub exclusion: Vec<Vec<String>>,
    #[serde(default)]
    pub weak_inclusions: Vec<InclusionDecl>,
    #[serde(default)]
    pub strong_inclusions: Vec<InclusionDecl>,
    #[serde(default)]
    pub requirements: Vec<RequirementDecl>,
}

/// Builds a [`Net`] from a [`ContextConfig`]: base wiring first (one
/// `Activate_C`/`Deactivate_C` pair per declared context, in declaration
/// order), then relation expansion in the order `spec.md` §4.3 lists the
/// four relation kinds — exclusion, weak inclusion, strong inclusion,
/// requirement.
pub struct NetBuilder {
    places: Vec<Place>,
    place_index: HashMap<String, PlaceId>,
    transitions: Vec<Transition>,
    transition_index: HashMap<String, TransitionId>,
    guards: HashMap<String, Arc<guard::Expr>>,
}

impl NetBuilder {
    pub fn build(config: &ContextConfig) -> Result<Net, NetError> {
        let mut guards = HashMap::new();
        for decl in &config.guards {
            let expr = guard::parse(&decl.expr).map_err(NetError::Guard)?;
            guards.insert(decl.transition.clone(), Arc::new(expr));
        }

        let mut builder = NetBuilder {
            places: Vec::new(),
            place_index: HashMap::new(),
            transitions: Vec::new(),
            transition_index: HashMap::new(),
            guards,
        };

        for decl in &config.places {
            builder.declare_context(&decl.name, decl.initial)?;
        }

        for group in &config.relations.exclusion {
            builder.expand_exclusion(group)?;
        }
        for inc in &config.relations.weak_inclusions {
            builder.expand_weak_inclusion(&inc.src, &inc.tgt)?;
        }
        for inc in &config.relations.strong_inclusions {
            builder.expand_strong_inclusion(&inc.src, &inc.tgt)?;
        }
        for req in &config.relations.requirements {
            builder.expand_requirement(&req.dep, &req.req)?;
        }

        Ok(Net {
            places: builder.places,
            place_index: builder.place_index,
            transitions: builder.transitions,
            transition_index: builder.transition_index,
            globals: config.globals.clone(),
            exclusion_groups: config.relations.exclusion.clone(),
            requirements: config
                .relations
                .requirements
                .iter()
                .map(|r| (r.dep.clone(), r.req.clone()))
                .collect(),
        })
    }

    fn add_place(&mut self, name: &str, initial: u32) -> PlaceId {
        if let Some(&id) = self.place_index.get(name) {
            return id;
        }
        let id = PlaceId(self.places.len());
        self.places.push(Place {
            name: name.to_string(),
            tokens: initial,
        });
        self.place_index.insert(name.to_string(), id);
        id
    }

    fn place_id(&self, name: &str) -> Result<PlaceId, NetError> {
        self.place_index
            .get(name)
            .copied()
            .ok_or_else(|| NetError::UnknownContext(name.to_string()))
    }

    fn guard_for(&self, transition: &str) -> Result<Arc<guard::Expr>, NetError> {
        self.guards
            .get(transition)
            .cloned()
            .ok_or_else(|| NetError::MissingGuard(transition.to_string()))
    }

    fn add_transition(&mut self, name: String, guard: Arc<guard::Expr>) -> TransitionId {
        let id = TransitionId(self.transitions.len());
        self.transitions.push(Transition {
            name: name.clone(),
            guard,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.transition_index.insert(name, id);
        id
    }

    fn transition_id(&self, name: &str) -> Result<TransitionId, NetError> {
        self.transition_index
            .get(name)
            .copied()
            .ok_or_else(|| NetError::UnknownContext(name.to_string()))
    }

    fn transition_mut(&mut self, id: TransitionId) -> &mut Transition {
        &mut self.transitions[id.0]
    }

    /// Base wiring for one context `C` (`spec.md` §4.3): the twin
    /// `C_ModeSwitch` place starts with the complementary token count so
    /// `tokens(C) + tokens(C_ModeSwitch) = 1` holds from the first
    /// observation.
    fn declare_context(&mut self, name: &str, initial: u32) -> Result<(), NetError> {
        let switch_name = format!("{name}_ModeSwitch");
        let c = self.add_place(name, initial);
        let c_switch = self.add_place(&switch_name, 1u32.saturating_sub(initial.min(1)));

        let activate_name = format!("Activate_{name}");
        let activate_guard = self.guard_for(&activate_name)?;
        let activate = self.add_transition(activate_name, activate_guard);
        self.transition_mut(activate)
            .inputs
            .push((c_switch, ArcKind::Normal { weight: 1 }));
        self.transition_mut(activate).outputs.push((c, 1));

        let deactivate_name = format!("Deactivate_{name}");
        let deactivate_guard = self.guard_for(&deactivate_name)?;
        let deactivate = self.add_transition(deactivate_name, deactivate_guard);
        self.transition_mut(deactivate)
            .inputs
            .push((c, ArcKind::Normal { weight: 1 }));
        self.transition_mut(deactivate).outputs.push((c_switch, 1));

        Ok(())
    }

    /// Exclusion over group `G`: every ordered pair `(a, b)`, `a != b`,
    /// gets an inhibitor arc from `b` into `Activate_a` — `a` cannot
    /// activate while any other group member is active.
    fn expand_exclusion(&mut self, group: &[String]) -> Result<(), NetError> {
        for a in group {
            let activate_a = self.transition_id(&format!("Activate_{a}"))?;
            for b in group {
                if a == b {
                    continue;
                }
                let place_b = self.place_id(b)?;
                self.transition_mut(activate_a)
                    .inputs
                    .push((place_b, ArcKind::Inhibitor { weight: 1 }));
            }
        }
        Ok(())
    }

    /// Weak inclusion `src ⤳ tgt`: activating `src` also activates `tgt`;
    /// deactivating `src` alone does not deactivate `tgt` — only the
    /// duplicate transition does, and only while `tgt` is inactive.
    ///
    /// The duplicate's output into `src_ModeSwitch`, and the original
    /// `Deactivate_src`'s paired output into `tgt_ModeSwitch` once it also
    /// consumes `tgt`'s token, aren't spelled out as separate bullet points
    /// in the relation's prose description but are required for token
    /// conservation (P1) on both `src` and `tgt` — see `DESIGN.md`.
    fn expand_weak_inclusion(&mut self, src: &str, tgt: &str) -> Result<(), NetError> {
        let src_place = self.place_id(src)?;
        let tgt_place = self.place_id(tgt)?;
        let src_switch = self.place_id(&format!("{src}_ModeSwitch"))?;
        let tgt_switch = self.place_id(&format!("{tgt}_ModeSwitch"))?;

        let activate_src = self.transition_id(&format!("Activate_{src}"))?;
        self.transition_mut(activate_src).outputs.push((tgt_place, 1));

        let deactivate_src = self.transition_id(&format!("Deactivate_{src}"))?;
        let deactivate_src_guard = self.transitions[deactivate_src.0].guard.clone();

        let duplicate_name = format!("Deactivate_{src}_weak_{tgt}");
        let duplicate = self.add_transition(duplicate_name, deactivate_src_guard);
        self.transition_mut(duplicate)
            .inputs
            .push((src_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(duplicate)
            .inputs
            .push((tgt_place, ArcKind::Inhibitor { weight: 1 }));
        self.transition_mut(duplicate).outputs.push((src_switch, 1));

        self.transition_mut(deactivate_src)
            .inputs
            .push((tgt_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(deactivate_src)
            .outputs
            .push((tgt_switch, 1));

        Ok(())
    }

    /// Strong inclusion `src ⇒ tgt`: activating `tgt` also activates `src`;
    /// deactivating `tgt` while `src` is active is blocked except through
    /// the original transition, which now also deactivates `src`.
    ///
    /// Structurally the mirror image of [`Self::expand_weak_inclusion`]
    /// with `src`/`tgt` swapped on the activation side, per `spec.md`
    /// §4.3's literal wording; the same P1-conservation addition applies.
    fn expand_strong_inclusion(&mut self, src: &str, tgt: &str) -> Result<(), NetError> {
        let src_place = self.place_id(src)?;
        let tgt_place = self.place_id(tgt)?;
        let src_switch = self.place_id(&format!("{src}_ModeSwitch"))?;
        let tgt_switch = self.place_id(&format!("{tgt}_ModeSwitch"))?;

        let activate_tgt = self.transition_id(&format!("Activate_{tgt}"))?;
        self.transition_mut(activate_tgt).outputs.push((src_place, 1));

        let deactivate_tgt = self.transition_id(&format!("Deactivate_{tgt}"))?;
        let deactivate_tgt_guard = self.transitions[deactivate_tgt.0].guard.clone();

        let duplicate_name = format!("Deactivate_{tgt}_strong_{src}");
        let duplicate = self.add_transition(duplicate_name, deactivate_tgt_guard);
        self.transition_mut(duplicate)
            .inputs
            .push((tgt_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(duplicate)
            .inputs
            .push((src_place, ArcKind::Inhibitor { weight: 1 }));
        self.transition_mut(duplicate).outputs.push((tgt_switch, 1));

        self.transition_mut(deactivate_tgt)
            .inputs
            .push((src_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(deactivate_tgt)
            .outputs
            .push((src_switch, 1));

        Ok(())
    }

    /// Requirement `dep requires req`: `dep` can only activate while `req`
    /// is active (borrowed-and-returned token on `Activate_dep`); `req`
    /// cannot deactivate while `dep` is still active except through the
    /// cascading duplicate, which deactivates both together.
    fn expand_requirement(&mut self, dep: &str, req: &str) -> Result<(), NetError> {
        let dep_place = self.place_id(dep)?;
        let req_place = self.place_id(req)?;
        let dep_switch = self.place_id(&format!("{dep}_ModeSwitch"))?;
        let req_switch = self.place_id(&format!("{req}_ModeSwitch"))?;

        let activate_dep = self.transition_id(&format!("Activate_{dep}"))?;
        self.transition_mut(activate_dep)
            .inputs
            .push((req_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(activate_dep).outputs.push((req_place, 1));

        let deactivate_req = self.transition_id(&format!("Deactivate_{req}"))?;
        let deactivate_req_guard = self.transitions[deactivate_req.0].guard.clone();

        let duplicate_name = format!("Deactivate_{req}_req_{dep}");
        let duplicate = self.add_transition(duplicate_name, deactivate_req_guard);
        self.transition_mut(duplicate)
            .inputs
            .push((req_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(duplicate)
            .inputs
            .push((dep_place, ArcKind::Normal { weight: 1 }));
        self.transition_mut(duplicate).outputs.push((req_switch, 1));
        self.transition_mut(duplicate).outputs.push((dep_switch, 1));

        self.transition_mut(deactivate_req)
            .inputs
            .push((dep_place, ArcKind::Inhibitor { weight: 1 }));

        Ok(())
    }
}
