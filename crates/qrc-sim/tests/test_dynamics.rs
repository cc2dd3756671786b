//! Tests for statevector time evolution.

use std::f64::consts::PI;

use qrc_sim::DynamicsError;
use qrc_sim::dynamics::{
    DynamicsEngine, EngineOptions, SplittingOrder, StatevectorEngine, TimeSchedule,
};
use qrc_sim::hamiltonian::{
    DriveParams, Hamiltonian, HamiltonianParams, InteractionParams, build_hamiltonian,
};
use qrc_sim::layout::generate_sites;
use qrc_sim::observable::Observable;

/// Square pulse of amplitude `rabi` over `[0, duration]`.
fn square_pulse(
    sites: usize,
    spacing: f64,
    rabi: f64,
    duration: f64,
    sample: &[f64],
) -> Hamiltonian {
    let layout = generate_sites(sites, spacing).unwrap();
    let params = HamiltonianParams {
        drive: DriveParams {
            rabi_frequency: rabi,
            phase: 0.0,
            ramp_time: 0.0,
            duration,
        },
        max_detuning: 6.0 * 2.0 * PI,
        interaction: InteractionParams::default(),
    };
    build_hamiltonian(&layout, sample, params).unwrap()
}

fn engine(order: SplittingOrder, max_step: f64) -> StatevectorEngine {
    StatevectorEngine::new(EngineOptions {
        order,
        max_step,
        ..EngineOptions::default()
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

#[test]
fn pi_pulse_fully_excites_a_single_atom() {
    let h = square_pulse(1, 5.0, PI, 1.0, &[]);
    let schedule = TimeSchedule::new(vec![0.0, 0.5, 1.0]).unwrap();
    let trace = StatevectorEngine::default().evolve(&h, &schedule).unwrap();

    assert_eq!(trace.shape(), (3, 1));
    assert_eq!(trace.value(0, 0), Some(0.0));
    assert!((trace.value(1, 0).unwrap() - 0.5).abs() < 1e-9);
    assert!((trace.value(2, 0).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn detuned_rabi_oscillation_matches_closed_form() {
    let omega = 2.0 * PI;
    let delta = 2.0 * PI;
    let t = 0.3;
    let h = square_pulse(1, 5.0, omega, 1.0, &[delta]);
    let schedule = TimeSchedule::new(vec![t]).unwrap();

    let general = (omega * omega + delta * delta).sqrt();
    let expected = omega * omega / (general * general) * (general * t / 2.0).sin().powi(2);

    for order in [SplittingOrder::First, SplittingOrder::Second] {
        let trace = engine(order, 1e-4).evolve(&h, &schedule).unwrap();
        assert!(
            (trace.value(0, 0).unwrap() - expected).abs() < 1e-3,
            "{order:?}: {} vs {expected}",
            trace.value(0, 0).unwrap()
        );
    }
}

#[test]
fn blockade_shares_one_excitation_between_close_atoms() {
    // V(4 µm) ≈ 2π·210 rad/µs ≫ Ω, so the pair oscillates at √2·Ω.
    let omega = 2.0 * PI;
    let t = PI / (2.0_f64.sqrt() * omega);
    let h = square_pulse(2, 4.0, omega, t, &[]);
    let schedule = TimeSchedule::new(vec![0.0, t]).unwrap();
    let trace = engine(SplittingOrder::Second, 1e-4)
        .evolve(&h, &schedule)
        .unwrap();

    for site in 0..2 {
        let p = trace.value(1, site).unwrap();
        assert!((p - 0.5).abs() < 0.02, "site {site}: {p}");
    }
}

#[test]
fn pauli_z_tracks_density() {
    let h = square_pulse(2, 8.0, 2.0 * PI, 1.0, &[1.0, -1.0]);
    let schedule = TimeSchedule::new(vec![0.0, 0.2, 0.7]).unwrap();
    let density = StatevectorEngine::default().evolve(&h, &schedule).unwrap();
    let z_engine = StatevectorEngine::new(EngineOptions {
        observable: Observable::PauliZ,
        ..EngineOptions::default()
    })
    .unwrap();
    let z = z_engine.evolve(&h, &schedule).unwrap();

    for (n, z) in density.values().iter().zip(z.values()) {
        assert!((z - (1.0 - 2.0 * n)).abs() < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Determinism and contract
// ---------------------------------------------------------------------------

#[test]
fn repeated_evolution_is_bit_identical() {
    let h = square_pulse(4, 6.0, 2.0 * PI, 1.0, &[2.0, -3.0]);
    let schedule = TimeSchedule::new(vec![0.0, 0.25, 0.5, 1.0]).unwrap();
    let engine = StatevectorEngine::default();
    let a = engine.evolve(&h, &schedule).unwrap();
    let b = engine.evolve(&h, &schedule).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sampled_density_is_reproducible_and_close_to_exact() {
    let h = square_pulse(2, 8.0, 2.0 * PI, 1.0, &[]);
    let schedule = TimeSchedule::new(vec![0.0, 0.15]).unwrap();
    let sampled_engine = StatevectorEngine::new(EngineOptions {
        observable: Observable::SampledDensity {
            shots: 4000,
            seed: 42,
        },
        ..EngineOptions::default()
    })
    .unwrap();
    let a = sampled_engine.evolve(&h, &schedule).unwrap();
    let b = sampled_engine.evolve(&h, &schedule).unwrap();
    assert_eq!(a, b);

    let exact = StatevectorEngine::default().evolve(&h, &schedule).unwrap();
    for (s, e) in a.values().iter().zip(exact.values()) {
        assert!((s - e).abs() < 0.05);
    }
}

#[test]
fn repeated_time_points_record_the_same_state() {
    let h = square_pulse(2, 6.0, 2.0 * PI, 1.0, &[1.0]);
    let schedule = TimeSchedule::new(vec![0.3, 0.3]).unwrap();
    let trace = StatevectorEngine::default().evolve(&h, &schedule).unwrap();
    assert_eq!(trace.row(0), trace.row(1));
}

#[test]
fn too_many_sites_is_rejected() {
    let h = square_pulse(5, 6.0, 2.0 * PI, 1.0, &[]);
    let engine = StatevectorEngine::new(EngineOptions {
        max_sites: 4,
        ..EngineOptions::default()
    })
    .unwrap();
    let schedule = TimeSchedule::new(vec![1.0]).unwrap();
    assert_eq!(
        engine.evolve(&h, &schedule),
        Err(DynamicsError::TooManySites { sites: 5, max: 4 })
    );
}

#[test]
fn norm_drift_beyond_tolerance_aborts_the_evolution() {
    let h = square_pulse(4, 6.0, 2.0 * PI, 1.0, &[0.3, -0.7, 1.1, 0.2]);
    let schedule = TimeSchedule::new(vec![0.0, 0.5, 1.0]).unwrap();
    let engine = StatevectorEngine::new(EngineOptions {
        norm_tolerance: 1e-300,
        ..EngineOptions::default()
    })
    .unwrap();

    match engine.evolve(&h, &schedule) {
        Err(DynamicsError::NormDrift {
            time,
            norm_sqr,
            tolerance,
        }) => {
            assert!(time > 0.0, "drift detected at t = {time}");
            assert!((norm_sqr - 1.0).abs() > tolerance);
            assert_eq!(tolerance, 1e-300);
        }
        other => panic!("expected a norm drift error, got {other:?}"),
    }
}

#[test]
fn malformed_schedules_are_rejected() {
    assert!(matches!(
        TimeSchedule::new(vec![]),
        Err(DynamicsError::InvalidSchedule(_))
    ));
    assert!(matches!(
        TimeSchedule::new(vec![0.0, 1.0, 0.5]),
        Err(DynamicsError::InvalidSchedule(_))
    ));
    assert!(matches!(
        TimeSchedule::new(vec![-0.1, 1.0]),
        Err(DynamicsError::InvalidSchedule(_))
    ));
}

#[test]
fn engine_reports_name_and_observable() {
    let engine = StatevectorEngine::default();
    assert_eq!(engine.name(), "statevector");
    assert_eq!(engine.observable(), Observable::RydbergDensity);
}
