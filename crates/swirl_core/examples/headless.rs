//! Drives one session the way a GUI timer would, without any GUI: ticks a
//! Lorenz run, swaps coefficients mid-flight, and prints the rolling
//! statistics as they refresh.

use anyhow::Result;
use swirl_core::field::Attractor;
use swirl_core::session::IntegrationSession;
use swirl_core::solvers::Solver;

fn main() -> Result<()> {
    let mut session = IntegrationSession::new(Attractor::Lorenz, Solver::Fehlberg45);

    for tick in 1..=200 {
        session.advance();

        if tick == 100 {
            // A slider move: same attractor, hotter convection.
            session.set_parameters(&[10.0, 35.0, 8.0 / 3.0])?;
        }

        if let Some(stats) = session.latest_stats() {
            if tick % 20 == 0 {
                println!(
                    "t = {:.2}  points = {}  mean step cost = {:?}  mean rel. error = {:?}",
                    session.elapsed(),
                    session.trajectory().len(),
                    stats.mean_calc_time,
                    stats.mean_relative_error,
                );
            }
        }
    }

    if let Some(last) = session.trajectory().last() {
        println!("final state: ({:.4}, {:.4}, {:.4})", last.x, last.y, last.z);
    }
    Ok(())
}
