//! The Context Petri Net: places, transitions, arcs, relation expansion,
//! and firing (`spec.md` §4.3).

mod builder;
mod cpn;
mod error;
mod place;
mod transition;

pub use builder::{
    ContextConfig, GuardDecl, InclusionDecl, NetBuilder, PlaceDecl, Relations, RequirementDecl,
};
pub use cpn::{FiringOutcome, Net, MAX_FIRINGS_PER_QUIESCENCE};
pub use error::NetError;
pub use place::{Place, PlaceId};
pub use transition::{ArcKind, Transition, TransitionId};

#[cfg(test)]
mod tests {
    use super::*;
    use builder::NetBuilder;
    use crate::guard;

    fn guard(transition: &str, expr: &str) -> GuardDecl {
        GuardDecl {
            transition: transition.to_string(),
            expr: expr.to_string(),
        }
    }

    fn place(name: &str, initial: u32) -> PlaceDecl {
        PlaceDecl {
            name: name.to_string(),
            initial,
        }
    }

    fn two_context_config() -> ContextConfig {
        ContextConfig {
            places: vec![place("A", 1), place("B", 0)],
            globals: vec!["x".into()],
            guards: vec![
                guard("Activate_A", "x < 0"),
                guard("Deactivate_A", "x >= 0"),
                guard("Activate_B", "x >= 0"),
                guard("Deactivate_B", "x < 0"),
            ],
            relations: Relations::default(),
        }
    }

    fn env(x: f64) -> guard::Env {
        [("x".to_string(), x)].into_iter().collect()
    }

    #[test]
    fn base_wiring_conserves_pair_tokens() {
        let net = NetBuilder::build(&two_context_config()).unwrap();
        assert_eq!(net.token_count("A"), Some(1));
        assert_eq!(net.token_count("A_ModeSwitch"), Some(0));
        assert_eq!(net.token_count("B"), Some(0));
        assert_eq!(net.token_count("B_ModeSwitch"), Some(1));
        net.check_pair_conservation().unwrap();
    }

    #[test]
    fn deactivate_then_activate_swaps_tokens() {
        let mut net = NetBuilder::build(&two_context_config()).unwrap();
        let outcome = net.fire_to_quiescence(&env(-1.0)).unwrap();
        assert!(!outcome.oscillation);
        assert_eq!(net.token_count("A"), Some(1), "guard keeps A active when x<0");
        assert_eq!(net.token_count("B"), Some(0));

        let outcome = net.fire_to_quiescence(&env(1.0)).unwrap();
        assert!(outcome.fired.contains(&"Deactivate_A".to_string()));
        assert!(outcome.fired.contains(&"Activate_B".to_string()));
        assert_eq!(net.token_count("A"), Some(0));
        assert_eq!(net.token_count("B"), Some(1));
        net.check_pair_conservation().unwrap();
    }

    #[test]
    fn exclusion_blocks_simultaneous_activation() {
        let mut config = two_context_config();
        config.places = vec![place("A", 0), place("B", 0)];
        config.guards = vec![
            guard("Activate_A", "x >= 0"),
            guard("Deactivate_A", "x < 0"),
            guard("Activate_B", "x >= 0"),
            guard("Deactivate_B", "x < 0"),
        ];
        config.relations.exclusion = vec![vec!["A".into(), "B".into()]];
        let mut net = NetBuilder::build(&config).unwrap();

        net.fire_to_quiescence(&env(1.0)).unwrap();
        // A is declared first, so Activate_A fires before the inhibitor
        // arc from A blocks Activate_B.
        assert_eq!(net.token_count("A"), Some(1));
        assert_eq!(net.token_count("B"), Some(0));
        net.check_exclusion_groups().unwrap();
    }

    #[test]
    fn oscillating_guard_hits_the_cap() {
        let mut config = two_context_config();
        config.places = vec![place("A", 0)];
        config.guards = vec![
            guard("Activate_A", "true_branch < 1"),
            guard("Deactivate_A", "true_branch < 1"),
        ];
        config.globals = vec!["true_branch".into()];
        let mut net = NetBuilder::build(&config).unwrap();
        let outcome = net.fire_to_quiescence(&env(0.0)).unwrap();
        assert!(outcome.oscillation);
        assert_eq!(outcome.fired.len(), MAX_FIRINGS_PER_QUIESCENCE as usize);
    }

    fn req_env(gdep: f64, greq: f64) -> guard::Env {
        [("gdep".to_string(), gdep), ("greq".to_string(), greq)]
            .into_iter()
            .collect()
    }

    fn requirement_config() -> ContextConfig {
        let mut config = ContextConfig {
            places: vec![place("dep", 0), place("req", 0)],
            globals: vec!["gdep".into(), "greq".into()],
            guards: vec![
                guard("Activate_dep", "gdep < 0"),
                guard("Deactivate_dep", "gdep >= 0"),
                guard("Activate_req", "greq < 0"),
                guard("Deactivate_req", "greq >= 0"),
            ],
            relations: Relations::default(),
        };
        config.relations.requirements = vec![RequirementDecl {
            dep: "dep".into(),
            req: "req".into(),
        }];
        config
    }

    #[test]
    fn requirement_blocks_dependent_without_requirement_active() {
        let mut net = NetBuilder::build(&requirement_config()).unwrap();
        // Only `dep` wants to activate; `req` does not.
        net.fire_to_quiescence(&req_env(-1.0, 1.0)).unwrap();
        assert_eq!(
            net.token_count("dep"),
            Some(0),
            "dep cannot activate while req is inactive"
        );
        net.check_requirements().unwrap();
    }

    #[test]
    fn requirement_activation_borrows_and_returns_reqs_token() {
        let mut net = NetBuilder::build(&requirement_config()).unwrap();
        net.fire_to_quiescence(&req_env(-1.0, -1.0)).unwrap();
        assert_eq!(net.token_count("dep"), Some(1));
        assert_eq!(
            net.token_count("req"),
            Some(1),
            "dep's activation borrows req's token and returns it"
        );
        net.check_requirements().unwrap();
    }

    #[test]
    fn requirement_cascades_deactivation_when_dep_still_active() {
        let mut net = NetBuilder::build(&requirement_config()).unwrap();
        net.fire_to_quiescence(&req_env(-1.0, -1.0)).unwrap();
        assert_eq!((net.token_count("dep"), net.token_count("req")), (Some(1), Some(1)));

        // req wants to deactivate but dep still does not: the original
        // Deactivate_req is inhibited while dep is active, so only the
        // cascading duplicate can fire, taking dep down with it.
        net.fire_to_quiescence(&req_env(-1.0, 1.0)).unwrap();
        assert_eq!(net.token_count("dep"), Some(0));
        assert_eq!(net.token_count("req"), Some(0));
        net.check_requirements().unwrap();
        net.check_pair_conservation().unwrap();
    }
}
