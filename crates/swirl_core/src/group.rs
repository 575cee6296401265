use crate::field::{Attractor, State};
use crate::session::{IntegrationSession, RestartStatus};
use crate::solvers::Solver;

/// A set of independently running sessions driven together, the way the
/// main window's "Pause all" and "Restart all" controls act on every plot
/// at once. Sessions share no state; the group is plain iteration.
#[derive(Debug, Clone, Default)]
pub struct SessionGroup {
    sessions: Vec<IntegrationSession>,
}

/// Aggregate outcome of [`SessionGroup::restart_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRestart {
    pub restarted: usize,
    /// Sessions whose seed was invalid and fell back to the default state.
    pub degraded: usize,
}

impl SessionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` sessions of the same attractor and solver, mirroring the
    /// multi-plot startup layout.
    pub fn uniform(count: usize, attractor: Attractor, solver: Solver) -> Self {
        Self {
            sessions: (0..count)
                .map(|_| IntegrationSession::new(attractor, solver))
                .collect(),
        }
    }

    pub fn push(&mut self, session: IntegrationSession) {
        self.sessions.push(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[IntegrationSession] {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut [IntegrationSession] {
        &mut self.sessions
    }

    /// Ticks every session once; paused members stay put.
    pub fn advance_all(&mut self) {
        for session in &mut self.sessions {
            session.advance();
        }
    }

    pub fn pause_all(&mut self) {
        for session in &mut self.sessions {
            session.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for session in &mut self.sessions {
            session.resume();
        }
    }

    /// Restarts every session. `seeds` pairs up with the sessions by
    /// index; missing entries restart from the attractor defaults. The
    /// returned tally says how many seeds had to be replaced.
    pub fn restart_all(&mut self, seeds: &[Option<State>]) -> GroupRestart {
        let mut degraded = 0;
        for (idx, session) in self.sessions.iter_mut().enumerate() {
            let seed = seeds.get(idx).copied().flatten();
            if session.restart(seed) == RestartStatus::InvalidSeedReplaced {
                degraded += 1;
            }
        }
        GroupRestart {
            restarted: self.sessions.len(),
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn pause_all_freezes_every_member() {
        let mut group = SessionGroup::uniform(3, Attractor::Lorenz, Solver::RungeKutta4);
        group.advance_all();
        let lens: Vec<usize> = group.sessions().iter().map(|s| s.trajectory().len()).collect();

        group.pause_all();
        group.advance_all();
        for (session, len) in group.sessions().iter().zip(&lens) {
            assert!(session.is_paused());
            assert_eq!(session.trajectory().len(), *len);
        }

        group.resume_all();
        group.advance_all();
        for (session, len) in group.sessions().iter().zip(&lens) {
            assert_eq!(session.trajectory().len(), len + 1);
        }
    }

    #[test]
    fn restart_all_counts_degraded_seeds() {
        let mut group = SessionGroup::uniform(3, Attractor::Lorenz, Solver::ExplicitEuler);
        for _ in 0..4 {
            group.advance_all();
        }

        let seeds = [
            Some(Vector3::new(2.0, 2.0, 2.0)),
            Some(Vector3::new(f64::INFINITY, 0.0, 0.0)),
            None,
        ];
        let outcome = group.restart_all(&seeds);

        assert_eq!(outcome.restarted, 3);
        assert_eq!(outcome.degraded, 1);
        for session in group.sessions() {
            assert_eq!(session.trajectory().len(), 1);
            assert_eq!(session.elapsed(), 0.0);
            assert!(!session.is_paused());
        }
        assert_eq!(
            group.sessions()[0].trajectory().points()[0],
            Vector3::new(2.0, 2.0, 2.0)
        );
        assert_eq!(
            group.sessions()[1].trajectory().points()[0],
            Attractor::Lorenz.default_initial_state()
        );
    }

    #[test]
    fn restart_all_tolerates_short_seed_list() {
        let mut group = SessionGroup::uniform(2, Attractor::Roessler, Solver::Fehlberg45);
        let outcome = group.restart_all(&[]);

        assert_eq!(outcome.restarted, 2);
        assert_eq!(outcome.degraded, 0);
        for session in group.sessions() {
            assert_eq!(
                session.trajectory().points()[0],
                Attractor::Roessler.default_initial_state()
            );
        }
    }
}
