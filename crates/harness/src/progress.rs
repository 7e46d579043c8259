/// Tracks which tenth of the warm-up has last been reported.
///
/// A marker is due when the completed fraction reaches a decile that has not
/// been reported yet. Crossing several deciles in one step still yields a
/// single marker, so counts below ten report fewer than ten markers.
///
/// `advance` takes the number of iterations completed so far (1-based), not a
/// percentage taken before the step. A pre-step percentage gives 9 markers
/// for 10 iterations; this rule gives 10, and 3 for 3, and 1 for 1.
#[derive(Debug, Clone)]
pub struct DecileProgress {
    total: u64,
    last_decile: u64,
}

impl DecileProgress {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            last_decile: 0,
        }
    }

    /// Records that `completed` iterations are done. Returns `true` when a
    /// progress marker should be emitted.
    pub fn advance(&mut self, completed: u64) -> bool {
        if self.total == 0 {
            return false;
        }
        let completed = completed.min(self.total);
        let decile = (u128::from(completed) * 10 / u128::from(self.total)) as u64;
        if decile > self.last_decile {
            self.last_decile = decile;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers_for(total: u64) -> u64 {
        let mut progress = DecileProgress::new(total);
        (1..=total).filter(|&done| progress.advance(done)).count() as u64
    }

    #[test]
    fn ten_iterations_emit_one_marker_each() {
        assert_eq!(markers_for(10), 10);
    }

    #[test]
    fn large_counts_emit_exactly_ten_markers() {
        for total in [11, 25, 99, 100, 1_000, 12_345] {
            assert_eq!(markers_for(total), 10, "total={total}");
        }
    }

    #[test]
    fn small_counts_emit_fewer_markers() {
        assert_eq!(markers_for(0), 0);
        assert_eq!(markers_for(1), 1);
        assert_eq!(markers_for(3), 3);
        assert_eq!(markers_for(9), 9);
    }

    #[test]
    fn markers_never_repeat_a_decile() {
        let mut progress = DecileProgress::new(200);
        assert!(!progress.advance(19));
        assert!(progress.advance(20));
        assert!(!progress.advance(20));
        assert!(!progress.advance(39));
        assert_eq!(progress.last_decile, 1);
    }

    #[test]
    fn multiple_crossings_in_one_step_emit_once() {
        let mut progress = DecileProgress::new(100);
        assert!(progress.advance(55));
        assert_eq!(progress.last_decile, 5);
        assert!(!progress.advance(59));
        assert!(progress.advance(100));
        assert_eq!(progress.last_decile, 10);
    }
}
