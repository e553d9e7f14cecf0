//! Magnetization on either side of the Onsager temperature.

use ews_info_dynamics::{simulate_ising, InitialState, IsingConfig, IsingDynamics};

fn mean_abs_magnetization(temperature: f64, dynamics: IsingDynamics) -> f64 {
    mean_abs_magnetization_from(temperature, dynamics, InitialState::Ordered)
}

fn mean_abs_magnetization_from(temperature: f64, dynamics: IsingDynamics, initial_state: InitialState) -> f64 {
    let config = IsingConfig {
        size: 32,
        temperature,
        n_steps: 100,
        n_equilib: 200,
        dynamics,
        initial_state,
    };
    simulate_ising(&config, 2024).unwrap().mean_magnetization()
}

#[test]
fn test_magnetization_boundaries_metropolis() {
    let cold = mean_abs_magnetization(1.0, IsingDynamics::Metropolis);
    let hot = mean_abs_magnetization(4.0, IsingDynamics::Metropolis);
    let critical = mean_abs_magnetization(2.27, IsingDynamics::Metropolis);

    assert!(cold > 0.95, "T=1.0: <|m|> = {cold}");
    assert!(hot < 0.10, "T=4.0: <|m|> = {hot}");
    assert!(critical > hot && critical < cold, "T=2.27: <|m|> = {critical}");
}

#[test]
fn test_magnetization_boundaries_wolff() {
    let cold = mean_abs_magnetization(1.0, IsingDynamics::Wolff);
    // Small clusters at high T barely move an ordered lattice, so start hot
    let hot = mean_abs_magnetization_from(4.0, IsingDynamics::Wolff, InitialState::Random);
    let critical = mean_abs_magnetization(2.27, IsingDynamics::Wolff);

    assert!(cold > 0.95, "T=1.0: <|m|> = {cold}");
    assert!(hot < 0.10, "T=4.0: <|m|> = {hot}");
    assert!(critical > hot && critical < cold, "T=2.27: <|m|> = {critical}");
}
