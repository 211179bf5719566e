//! Initial placement shared by both model variants

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::GridConfig;
use crate::core::types::{CellPos, Group};

/// `floor(density * cells)` distinct cells, sampled without replacement
pub fn sample_cells<R: Rng + ?Sized>(grid: &GridConfig, density: f64, rng: &mut R) -> Vec<CellPos> {
    let count = grid.population_for(density);
    let height = grid.height;
    let mut cells: Vec<CellPos> = (0..grid.width)
        .flat_map(|x| (0..height).map(move |y| CellPos::new(x, y)))
        .collect();
    cells.shuffle(rng);
    cells.truncate(count);
    cells
}

/// Majority with probability `majority_share`
pub fn draw_group<R: Rng + ?Sized>(majority_share: f64, rng: &mut R) -> Group {
    if rng.gen::<f64>() < majority_share {
        Group::Majority
    } else {
        Group::Minority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_cells_exact_count_and_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = GridConfig::new(10, 8, false);
        let cells = sample_cells(&grid, 0.5, &mut rng);
        assert_eq!(cells.len(), 40);

        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 40);
        assert!(cells.iter().all(|c| c.x < 10 && c.y < 8));
    }

    #[test]
    fn test_full_density_covers_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = GridConfig::new(5, 5, true);
        assert_eq!(sample_cells(&grid, 1.0, &mut rng).len(), 25);
        assert!(sample_cells(&grid, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn test_group_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(draw_group(1.0, &mut rng), Group::Majority);
            assert_eq!(draw_group(0.0, &mut rng), Group::Minority);
        }
    }
}
