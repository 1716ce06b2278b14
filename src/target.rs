use crate::config::TargetRange;
use rand::Rng;

/// Roll a target center uniformly from the configured range. Draws are
/// independent; every unit gets a fresh roll at session start and again on
/// every full reset.
pub fn roll_target<R: Rng>(rng: &mut R, range: &TargetRange) -> f64 {
    rng.gen_range(range.min..=range.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_rolls_stay_within_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        let range = TargetRange {
            min: 30.0,
            max: 70.0,
        };

        for _ in 0..1000 {
            let t = roll_target(&mut rng, &range);
            assert!((30.0..=70.0).contains(&t));
        }
    }

    #[test]
    fn test_rolls_spread_across_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let range = TargetRange {
            min: 10.0,
            max: 90.0,
        };

        let rolls: Vec<f64> = (0..200).map(|_| roll_target(&mut rng, &range)).collect();
        let below = rolls.iter().filter(|t| **t < 50.0).count();

        // A uniform draw should land on both halves of the range.
        assert!(below > 0);
        assert!(below < rolls.len());
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let range = TargetRange {
            min: 30.0,
            max: 70.0,
        };
        let a: Vec<f64> = {
            let mut rng = SmallRng::seed_from_u64(99);
            (0..10).map(|_| roll_target(&mut rng, &range)).collect()
        };
        let b: Vec<f64> = {
            let mut rng = SmallRng::seed_from_u64(99);
            (0..10).map(|_| roll_target(&mut rng, &range)).collect()
        };
        assert_eq!(a, b);
    }
}
