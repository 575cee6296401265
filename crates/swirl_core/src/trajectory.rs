use crate::field::State;

/// Ordered record of every state a session has visited.
///
/// Append-only apart from `reset`. Growth is unbounded; a host that needs
/// bounded memory must cap or compact externally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<State>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: State) -> Self {
        Self { points: vec![seed] }
    }

    pub fn append(&mut self, state: State) {
        self.points.push(state);
    }

    /// Most recently appended state, if any.
    pub fn last(&self) -> Option<State> {
        self.points.last().copied()
    }

    /// Replaces the whole sequence with `[seed]`, or empties it.
    pub fn reset(&mut self, seed: Option<State>) {
        self.points.clear();
        if let Some(seed) = seed {
            self.points.push(seed);
        }
    }

    /// All visited states in simulation-time order.
    pub fn points(&self) -> &[State] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Plain-array copy of the points for exporters and serializers.
    pub fn snapshot(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn append_preserves_insertion_order() {
        let mut trajectory = Trajectory::seeded(Vector3::new(0.0, 0.0, 0.0));
        trajectory.append(Vector3::new(1.0, 0.0, 0.0));
        trajectory.append(Vector3::new(2.0, 0.0, 0.0));

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.last(), Some(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(trajectory.points()[1], Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn reset_with_seed_leaves_single_point() {
        let mut trajectory = Trajectory::seeded(Vector3::new(0.0, 0.0, 0.0));
        trajectory.append(Vector3::new(1.0, 1.0, 1.0));
        trajectory.reset(Some(Vector3::new(5.0, 6.0, 7.0)));

        assert_eq!(trajectory.points(), &[Vector3::new(5.0, 6.0, 7.0)]);
    }

    #[test]
    fn reset_without_seed_empties() {
        let mut trajectory = Trajectory::seeded(Vector3::new(1.0, 1.0, 1.0));
        trajectory.reset(None);

        assert!(trajectory.is_empty());
        assert_eq!(trajectory.last(), None);
    }

    #[test]
    fn snapshot_copies_points_in_order() {
        let mut trajectory = Trajectory::new();
        trajectory.append(Vector3::new(1.0, 2.0, 3.0));
        trajectory.append(Vector3::new(4.0, 5.0, 6.0));

        assert_eq!(trajectory.snapshot(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }
}
