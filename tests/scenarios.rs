//! End-to-end scenarios driving a full `Config` through `Engine::run`,
//! using `fixtures::MockSlave` in place of a real FMU shared library.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use fixtures::{variable_table, MockSlave};
use modalsim::config::{Config, ModeConfig, PlotConfig, SimConfig};
use modalsim::engine::{EngineError, FmuOpener};
use modalsim::fmu::CoSimulationBinding;
use modalsim::net::{ContextConfig, GuardDecl, PlaceDecl, Relations};
use modalsim::Engine;

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

fn mode(fmu: &str, outputs: &[&str], stop_condition: &str) -> ModeConfig {
    ModeConfig {
        fmu: PathBuf::from(fmu),
        outputs: outputs.iter().map(|s| s.to_string()).collect(),
        parameters: HashMap::new(),
        stop_condition: stop_condition.to_string(),
    }
}

#[test]
fn two_mode_handover_carries_state_across_the_switch() {
    let context_cfg = ContextConfig {
        places: vec![place("Falling", 1), place("Bouncing", 0)],
        // Deliberately not seeded as a global: the engine only pre-seeds
        // globals with 0.0, which would make `h <= 0` vacuously true before
        // the first FMU output ever arrives. Leaving it unseeded means the
        // entry-time stop-condition check safely treats the undefined name
        // as "not stopping yet" until the first step populates it.
        globals: vec![],
        guards: vec![
            // Falling is a one-shot entry mode: it never reactivates once left.
            guard("Activate_Falling", "0 > 1"),
            guard("Deactivate_Falling", "h <= 0"),
            guard("Activate_Bouncing", "h <= 0"),
            // Terminal: once Bouncing recovers past this height, the whole
            // net settles with no place holding a token and the run ends.
            guard("Deactivate_Bouncing", "h >= 0.2"),
        ],
        relations: Relations {
            exclusion: vec![vec!["Falling".into(), "Bouncing".into()]],
            ..Default::default()
        },
    };

    let sim_cfg = SimConfig {
        initial_time: 0.0,
        stop_time: 1.0,
        step_size: 0.2,
        modes: vec![
            ("Falling".into(), mode("mock:Falling", &["h"], "h <= 0")),
            ("Bouncing".into(), mode("mock:Bouncing", &["h"], "h < -1000")),
        ],
        variable_mapping: vec![],
    };

    let config = Config {
        context_cfg,
        sim_cfg,
        plot_cfg: PlotConfig::default(),
    };

    let opener: FmuOpener = Box::new(|_path, instance_name| {
        let table = variable_table(&[("h", 0)]);
        let slave: Box<dyn CoSimulationBinding> = match instance_name {
            "Falling" => Box::new(MockSlave::new(|_, h, regs| {
                let v = regs.entry(0).or_insert(1.0);
                *v -= 2.0 * h;
            }).with_initial(0, 1.0)),
            _ => Box::new(MockSlave::new(|_, h, regs| {
                let v = regs.entry(0).or_insert(0.0);
                *v += 1.0 * h;
            })),
        };
        Ok((table, slave))
    });

    let mut engine = Engine::new(&config, opener).unwrap();
    engine.run().unwrap();

    let modes: Vec<&str> = engine
        .logger()
        .mode_trace()
        .iter()
        .map(|(_, m)| m.as_str())
        .collect();
    assert_eq!(modes, vec!["Falling", "Bouncing"]);

    let h_series = engine.logger().time_series("h");
    let switch_index = h_series.iter().position(|(_, v)| *v <= 0.0).unwrap();
    assert!(switch_index + 1 < h_series.len());
    let (_, handed_over) = h_series[switch_index];
    let (_, after_switch) = h_series[switch_index + 1];
    assert!(
        after_switch > handed_over,
        "Bouncing's first output should continue from Falling's last handed-over value, not reset to 0"
    );
}

#[test]
fn zero_step_size_is_reported_as_a_stuck_simulation() {
    let context_cfg = ContextConfig {
        places: vec![place("Idle", 1)],
        globals: vec!["x".into()],
        guards: vec![
            guard("Activate_Idle", "x < -1000"),
            guard("Deactivate_Idle", "x < -1000"),
        ],
        relations: Relations::default(),
    };

    let sim_cfg = SimConfig {
        initial_time: 0.0,
        stop_time: 1.0,
        step_size: 0.0,
        modes: vec![("Idle".into(), mode("mock:Idle", &["x"], "x < -1000"))],
        variable_mapping: vec![],
    };

    let config = Config {
        context_cfg,
        sim_cfg,
        plot_cfg: PlotConfig::default(),
    };

    let opener: FmuOpener = Box::new(|_path, _instance_name| {
        let table = variable_table(&[("x", 0)]);
        Ok((table, Box::new(MockSlave::idle()) as Box<dyn CoSimulationBinding>))
    });

    let mut engine = Engine::new(&config, opener).unwrap();
    assert!(matches!(engine.run(), Err(EngineError::StuckSimulation(_))));
}

#[test]
fn a_mode_whose_stop_condition_holds_at_entry_never_opens_its_fmu() {
    let context_cfg = ContextConfig {
        places: vec![place("Armed", 1)],
        globals: vec![],
        guards: vec![
            guard("Activate_Armed", "0 > 1"),
            guard("Deactivate_Armed", "0 < 1"),
        ],
        relations: Relations::default(),
    };

    let sim_cfg = SimConfig {
        initial_time: 0.0,
        stop_time: 1.0,
        step_size: 0.1,
        modes: vec![("Armed".into(), mode("mock:Armed", &[], "0 < 1"))],
        variable_mapping: vec![],
    };

    let config = Config {
        context_cfg,
        sim_cfg,
        plot_cfg: PlotConfig::default(),
    };

    let opened = Rc::new(RefCell::new(0u32));
    let opened_inner = opened.clone();
    let opener: FmuOpener = Box::new(move |_path, _instance_name| {
        *opened_inner.borrow_mut() += 1;
        let table = variable_table(&[]);
        Ok((table, Box::new(MockSlave::idle()) as Box<dyn CoSimulationBinding>))
    });

    let mut engine = Engine::new(&config, opener).unwrap();
    engine.run().unwrap();

    assert_eq!(*opened.borrow(), 0, "early stop must never instantiate the FMU");
    assert_eq!(
        engine.logger().mode_trace().iter().map(|(_, m)| m.as_str()).collect::<Vec<_>>(),
        vec!["Armed"]
    );
}
