//! Sparse heuristic weights over the unbounded grid.
//!
//! The [`WeightField`] knows nothing about players or lines. It tracks which
//! cells hold a stone, the bounding box of those cells, and a weight per cell:
//!
//! - Untouched cells use a default formula (distance decay from the origin
//!   with bonuses for the origin, its orthogonal neighbors, and cells on the
//!   axes or main diagonals). Defaults are computed on demand and never stored.
//! - Occupying a cell shrinks its own weight and raises its 8 neighbors, which
//!   pulls move generation toward the frontier of existing clusters.
//! - Freeing a cell puts its default weight back.
//!
//! Only modified weights live in the map, so its size follows the number of
//! stones played rather than the area of the board. Stones are confined to
//! the play area of [`COORDINATE_LIMIT`] around the origin, which keeps all
//! coordinate arithmetic inside `i32`.

use std::collections::{HashMap, HashSet};

use crate::constants::{
    AXIS_BONUS, COORDINATE_LIMIT, EMPTY_BOARD_RADIUS, FLAT_WEIGHT, MAX_SCAN_AREA, NEIGHBOR_BOOST,
    OCCUPIED_DECAY, ORIGIN_BONUS, ORTHOGONAL_BONUS, WEIGHT_DECAY_MIN, WEIGHT_DECAY_SCALE,
    WEIGHT_FLOOR,
};

/// A cell of the grid as `(x, y)`.
pub type Cell = (i32, i32);

/// Offsets of the 8 neighbors of a cell.
pub const NEIGHBORS: [Cell; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Whether `(x, y)` lies in the play area.
#[inline]
pub fn in_play_area(x: i32, y: i32) -> bool {
    let range = -COORDINATE_LIMIT..=COORDINATE_LIMIT;
    range.contains(&x) && range.contains(&y)
}

/// Axis-aligned bounding box of the occupied cells (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    fn around(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// The box grown by `padding` on every side.
    pub fn padded(&self, padding: i32) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(padding),
            max_x: self.max_x.saturating_add(padding),
            min_y: self.min_y.saturating_sub(padding),
            max_y: self.max_y.saturating_add(padding),
        }
    }

    pub fn contains(&self, (x, y): Cell) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    pub fn width(&self) -> i64 {
        i64::from(self.max_x) - i64::from(self.min_x) + 1
    }

    pub fn height(&self) -> i64 {
        i64::from(self.max_y) - i64::from(self.min_y) + 1
    }

    /// Number of cells in the box.
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.min_x..=self.max_x).flat_map(move |x| (self.min_y..=self.max_y).map(move |y| (x, y)))
    }
}

/// Minimum, maximum and mean weight over a square region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Sparse weight map plus occupancy tracking.
#[derive(Debug, Clone)]
pub struct WeightField {
    occupied: HashSet<Cell>,
    weights: HashMap<Cell, f64>,
    bounds: Option<Bounds>,
    /// Largest Chebyshev distance of an occupied cell from the origin
    radius: i32,
    position_bonuses: bool,
}

impl Default for WeightField {
    fn default() -> Self {
        Self::new(true)
    }
}

impl WeightField {
    /// Create an empty field. With `position_bonuses` off every untouched
    /// cell weighs [`FLAT_WEIGHT`].
    pub fn new(position_bonuses: bool) -> Self {
        Self {
            occupied: HashSet::new(),
            weights: HashMap::new(),
            bounds: None,
            radius: 0,
            position_bonuses,
        }
    }

    /// Weight of a cell nobody has touched yet.
    pub fn default_weight(&self, x: i32, y: i32) -> f64 {
        if self.position_bonuses {
            formula_weight(x, y)
        } else {
            FLAT_WEIGHT
        }
    }

    /// Current weight of a cell (always at least [`WEIGHT_FLOOR`]).
    #[inline]
    pub fn weight(&self, x: i32, y: i32) -> f64 {
        match self.weights.get(&(x, y)) {
            Some(&w) => w,
            None => self.default_weight(x, y),
        }
    }

    pub fn set_weight(&mut self, x: i32, y: i32, weight: f64) {
        self.weights.insert((x, y), weight.max(WEIGHT_FLOOR));
    }

    pub fn increase_weight(&mut self, x: i32, y: i32, amount: f64) {
        let w = self.weight(x, y);
        self.set_weight(x, y, w + amount);
    }

    pub fn decrease_weight(&mut self, x: i32, y: i32, amount: f64) {
        let w = self.weight(x, y);
        self.set_weight(x, y, w - amount);
    }

    /// Record a stone at `(x, y)`. Repeated calls for the same cell, and
    /// cells outside the play area, are no-ops.
    pub fn mark_occupied(&mut self, x: i32, y: i32) {
        if !in_play_area(x, y) || !self.occupied.insert((x, y)) {
            return;
        }
        match &mut self.bounds {
            Some(b) => b.include(x, y),
            None => self.bounds = Some(Bounds::around(x, y)),
        }
        self.radius = self.radius.max(x.abs().max(y.abs()));

        let w = self.weight(x, y);
        self.set_weight(x, y, w * OCCUPIED_DECAY);
        for (dx, dy) in NEIGHBORS {
            self.increase_weight(x + dx, y + dy, NEIGHBOR_BOOST);
        }
    }

    /// Remove the stone at `(x, y)` and restore the default weight there.
    /// Freeing a cell that holds no stone is a no-op.
    pub fn mark_free(&mut self, x: i32, y: i32) {
        if !self.occupied.remove(&(x, y)) {
            return;
        }
        self.recalculate_bounds();
        let w = self.default_weight(x, y);
        self.set_weight(x, y, w);
    }

    fn recalculate_bounds(&mut self) {
        let mut bounds: Option<Bounds> = None;
        let mut radius = 0;
        for &(x, y) in &self.occupied {
            match &mut bounds {
                Some(b) => b.include(x, y),
                None => bounds = Some(Bounds::around(x, y)),
            }
            radius = radius.max(x.abs().max(y.abs()));
        }
        self.bounds = bounds;
        self.radius = radius;
    }

    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.occupied.contains(&(x, y))
    }

    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn occupied(&self) -> impl Iterator<Item = Cell> + '_ {
        self.occupied.iter().copied()
    }

    /// Bounding box of the occupied cells, `None` while the field is empty.
    #[inline]
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Largest Chebyshev distance of a stone from the origin.
    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Free cells inside the occupied bounding box grown by `padding`.
    ///
    /// On an empty field this is the square of radius
    /// [`EMPTY_BOARD_RADIUS`] around the origin. When the padded box holds
    /// more than [`MAX_SCAN_AREA`] cells (stones spread far apart), only the
    /// cells within `padding` of some stone are returned, so the cost follows
    /// the number of stones instead of the distance between them.
    pub fn free_positions_near(&self, padding: i32) -> Vec<Cell> {
        let area = match self.bounds {
            Some(b) => b.padded(padding),
            None => Bounds::around(0, 0).padded(EMPTY_BOARD_RADIUS),
        };
        if area.area() > MAX_SCAN_AREA {
            return self.free_positions_around_stones(padding);
        }

        area.cells()
            .filter(|&(x, y)| in_play_area(x, y) && !self.occupied.contains(&(x, y)))
            .collect()
    }

    /// Free cells within Chebyshev distance `padding` of a stone, sorted.
    fn free_positions_around_stones(&self, padding: i32) -> Vec<Cell> {
        let mut free = HashSet::new();
        for &stone in &self.occupied {
            for (x, y) in Bounds::around(stone.0, stone.1).padded(padding).cells() {
                if in_play_area(x, y) && !self.occupied.contains(&(x, y)) {
                    free.insert((x, y));
                }
            }
        }
        let mut free: Vec<Cell> = free.into_iter().collect();
        free.sort_unstable();
        free
    }

    /// Empty cells in the 8-neighborhood of any stone.
    ///
    /// On an empty field this is the 3x3 square around the origin.
    pub fn adjacent_to_occupied(&self) -> HashSet<Cell> {
        if self.occupied.is_empty() {
            let mut center: HashSet<Cell> = NEIGHBORS.iter().copied().collect();
            center.insert((0, 0));
            return center;
        }

        let mut adjacent = HashSet::new();
        for &(x, y) in &self.occupied {
            for (dx, dy) in NEIGHBORS {
                let n = (x + dx, y + dy);
                if in_play_area(n.0, n.1) && !self.occupied.contains(&n) {
                    adjacent.insert(n);
                }
            }
        }
        adjacent
    }

    /// The `count` heaviest free cells within `radius` of the origin or next
    /// to a stone, heaviest first.
    pub fn top_cells(&self, count: usize, radius: i32) -> Vec<(Cell, f64)> {
        let mut candidates: HashSet<Cell> = square(radius)
            .filter(|&(x, y)| !self.is_occupied(x, y))
            .collect();
        candidates.extend(self.adjacent_to_occupied());

        let mut cells: Vec<(Cell, f64)> = candidates
            .into_iter()
            .map(|(x, y)| ((x, y), self.weight(x, y)))
            .collect();
        cells.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        cells.truncate(count);
        cells
    }

    /// Weight statistics over the square of `radius` around the origin.
    pub fn stats(&self, radius: i32) -> WeightStats {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;
        for (x, y) in square(radius) {
            let w = self.weight(x, y);
            min = min.min(w);
            max = max.max(w);
            sum += w;
            n += 1;
        }
        WeightStats {
            min,
            max,
            mean: sum / n as f64,
        }
    }
}

/// Distance-decay weight with position bonuses, rounded to 2 decimals.
fn formula_weight(x: i32, y: i32) -> f64 {
    let (fx, fy) = (x as f64, y as f64);
    let distance = (fx * fx + fy * fy).sqrt();
    let mut w = (WEIGHT_DECAY_SCALE / (1.0 + distance)).max(WEIGHT_DECAY_MIN);

    if x == 0 || y == 0 || x.unsigned_abs() == y.unsigned_abs() {
        w *= AXIS_BONUS;
    }
    if x == 0 && y == 0 {
        w *= ORIGIN_BONUS;
    } else if matches!((x, y), (0, 1) | (0, -1) | (1, 0) | (-1, 0)) {
        w *= ORTHOGONAL_BONUS;
    }

    (w * 100.0).round() / 100.0
}

fn square(radius: i32) -> impl Iterator<Item = Cell> {
    (-radius..=radius).flat_map(move |x| (-radius..=radius).map(move |y| (x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_weights() {
        let field = WeightField::default();
        assert!(approx(field.weight(0, 0), 24.0));
        assert!(approx(field.weight(1, 0), 9.0));
        assert!(approx(field.weight(0, -1), 9.0));
        assert!(approx(field.weight(1, 1), 4.97));
        assert!(approx(field.weight(2, 3), 2.17));
        // Far away cells bottom out at the decay minimum
        assert!(approx(field.weight(1000, 7), 0.5));
    }

    #[test]
    fn test_weights_decrease_with_distance() {
        let field = WeightField::default();
        for d in 1..20 {
            assert!(field.weight(d, 0) >= field.weight(d + 1, 0));
        }
    }

    #[test]
    fn test_flat_profile() {
        let field = WeightField::new(false);
        assert!(approx(field.weight(0, 0), 1.0));
        assert!(approx(field.weight(-40, 12), 1.0));
    }

    #[test]
    fn test_mark_occupied_updates_weights() {
        let mut field = WeightField::default();
        field.mark_occupied(0, 0);
        assert!(approx(field.weight(0, 0), 24.0 * 0.3));
        assert!(approx(field.weight(1, 0), 9.5));
        assert!(approx(field.weight(-1, -1), 4.97 + 0.5));
        assert!(field.is_occupied(0, 0));
        assert_eq!(field.occupied_count(), 1);
    }

    #[test]
    fn test_mark_occupied_is_idempotent() {
        let mut field = WeightField::default();
        field.mark_occupied(2, 2);
        let w = field.weight(2, 2);
        let n = field.weight(3, 3);
        field.mark_occupied(2, 2);
        assert!(approx(field.weight(2, 2), w));
        assert!(approx(field.weight(3, 3), n));
        assert_eq!(field.occupied_count(), 1);
    }

    #[test]
    fn test_mark_free_restores_default() {
        let mut field = WeightField::default();
        field.mark_occupied(3, -2);
        field.mark_free(3, -2);
        assert!(approx(field.weight(3, -2), field.default_weight(3, -2)));
        assert!(!field.is_occupied(3, -2));
        assert_eq!(field.bounds(), None);

        // Freeing again changes nothing
        field.set_weight(3, -2, 7.0);
        field.mark_free(3, -2);
        assert!(approx(field.weight(3, -2), 7.0));
    }

    #[test]
    fn test_weight_floor() {
        let mut field = WeightField::default();
        field.set_weight(0, 0, -5.0);
        assert!(approx(field.weight(0, 0), WEIGHT_FLOOR));
        field.decrease_weight(9, 9, 100.0);
        assert!(approx(field.weight(9, 9), WEIGHT_FLOOR));
    }

    #[test]
    fn test_bounds_and_radius() {
        let mut field = WeightField::default();
        field.mark_occupied(5, 5);
        assert_eq!(field.bounds(), Some(Bounds::around(5, 5)));
        field.mark_occupied(-2, 7);
        let b = field.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-2, 5, 5, 7));
        assert_eq!(field.radius(), 7);

        field.mark_free(-2, 7);
        assert_eq!(field.bounds(), Some(Bounds::around(5, 5)));
        assert_eq!(field.radius(), 5);
    }

    #[test]
    fn test_free_positions_near() {
        let mut field = WeightField::default();
        assert_eq!(field.free_positions_near(2).len(), 49);

        field.mark_occupied(0, 0);
        let free = field.free_positions_near(1);
        assert_eq!(free.len(), 8);
        assert!(!free.contains(&(0, 0)));

        field.mark_occupied(4, 0);
        // 7 x 3 box minus two stones
        assert_eq!(field.free_positions_near(1).len(), 19);
    }

    #[test]
    fn test_free_positions_with_distant_groups() {
        let mut field = WeightField::default();
        for x in 0..3 {
            field.mark_occupied(x, 0);
            field.mark_occupied(50_000 + x, 50_000);
        }
        let free = field.free_positions_near(3);
        // Two 9 x 7 neighborhoods minus three stones each
        assert_eq!(free.len(), 2 * (9 * 7 - 3));
        assert!(free.contains(&(-3, 3)));
        assert!(free.contains(&(50_005, 49_997)));
        assert!(!free.contains(&(25_000, 25_000)));
    }

    #[test]
    fn test_play_area() {
        assert!(in_play_area(COORDINATE_LIMIT, -COORDINATE_LIMIT));
        assert!(!in_play_area(COORDINATE_LIMIT + 1, 0));
        assert!(!in_play_area(0, i32::MIN));

        let mut field = WeightField::default();
        field.mark_occupied(i32::MAX, 0);
        assert_eq!(field.occupied_count(), 0);
        assert!(field.weight(i32::MIN, i32::MAX) >= WEIGHT_FLOOR);

        // A corner stone only has 3 neighbors inside the area
        field.mark_occupied(COORDINATE_LIMIT, COORDINATE_LIMIT);
        assert_eq!(field.adjacent_to_occupied().len(), 3);
        assert_eq!(field.free_positions_near(1).len(), 3);
    }

    #[test]
    fn test_adjacent_to_occupied() {
        let mut field = WeightField::default();
        let empty = field.adjacent_to_occupied();
        assert_eq!(empty.len(), 9);
        assert!(empty.contains(&(0, 0)));

        field.mark_occupied(10, 10);
        field.mark_occupied(11, 10);
        let adjacent = field.adjacent_to_occupied();
        assert_eq!(adjacent.len(), 10);
        assert!(!adjacent.contains(&(10, 10)));
        assert!(adjacent.contains(&(12, 11)));
        assert!(!adjacent.contains(&(0, 0)));
    }

    #[test]
    fn test_top_cells_and_stats() {
        let mut field = WeightField::default();
        let top = field.top_cells(3, 2);
        assert_eq!(top[0].0, (0, 0));
        assert_eq!(top.len(), 3);

        field.mark_occupied(0, 0);
        let top = field.top_cells(1, 2);
        assert_ne!(top[0].0, (0, 0));

        let stats = field.stats(1);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!(approx(stats.max, 9.5));
    }
}
