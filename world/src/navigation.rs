//! Distance-field builder used by the world crate.

use std::collections::VecDeque;

use rampart_core::{TileCoord, TileKind, TileMap};

/// Dense breadth-first distance grid seeded from the base tile.
///
/// The field mirrors the map's dimensions and stores the hop count from every
/// tile to the base, along with the predecessor tile walked during the
/// search. Distances default to `-1` so callers can tell unreachable tiles
/// apart from traversable ones; a map without a base tile leaves the whole
/// field at `-1`.
#[derive(Clone, Debug, Default)]
pub(crate) struct NavigationField {
    columns: u32,
    rows: u32,
    distances: Vec<i32>,
    parents: Vec<Option<TileCoord>>,
}

impl NavigationField {
    /// Rebuilds the field for the provided map and blocked-tile overlay.
    ///
    /// A tile is traversable iff it lies in bounds, its terrain is not
    /// [`TileKind::Obstacle`], and `is_blocked` reports false for it.
    pub(crate) fn rebuild<F>(&mut self, map: &TileMap, mut is_blocked: F)
    where
        F: FnMut(TileCoord) -> bool,
    {
        let columns = map.columns();
        let rows = map.rows();
        let cell_count = columns as usize * rows as usize;

        self.columns = columns;
        self.rows = rows;
        if self.distances.len() != cell_count {
            self.distances = vec![-1; cell_count];
            self.parents = vec![None; cell_count];
        } else {
            self.distances.fill(-1);
            self.parents.fill(None);
        }

        let Some(base) = map.base_tile() else {
            return;
        };

        let Some(base_index) = self.index(base) else {
            return;
        };

        let mut frontier = VecDeque::new();
        self.distances[base_index] = 0;
        frontier.push_back(base);

        while let Some(current) = frontier.pop_front() {
            let Some(current_index) = self.index(current) else {
                continue;
            };
            let next_distance = self.distances[current_index] + 1;

            for neighbor in neighbors(current, columns, rows) {
                if map.tile(neighbor) == Some(TileKind::Obstacle) || is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != -1 {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                self.parents[neighbor_index] = Some(current);
                frontier.push_back(neighbor);
            }
        }
    }

    /// Distance recorded for the provided tile, `-1` outside the field.
    #[must_use]
    pub(crate) fn distance(&self, tile: TileCoord) -> i32 {
        self.index(tile).map_or(-1, |index| self.distances[index])
    }

    /// Predecessor tile walked while the search reached the provided tile.
    #[must_use]
    pub(crate) fn parent(&self, tile: TileCoord) -> Option<TileCoord> {
        self.index(tile).and_then(|index| self.parents[index])
    }

    /// Dense row-major distances backing the field.
    #[must_use]
    pub(crate) fn cells(&self) -> &[i32] {
        &self.distances
    }

    /// Walks predecessors from the provided tile to the base.
    ///
    /// Returns an empty route when the tile is unreachable. The route starts
    /// at the tile itself and ends at the base.
    #[must_use]
    pub(crate) fn route_from(&self, tile: TileCoord) -> Vec<TileCoord> {
        if self.distance(tile) < 0 {
            return Vec::new();
        }

        let mut route = vec![tile];
        let mut current = tile;
        while let Some(previous) = self.parent(current) {
            route.push(previous);
            current = previous;
        }
        route
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            Some((tile.row() * self.columns + tile.column()) as usize)
        } else {
            None
        }
    }
}

fn neighbors(tile: TileCoord, columns: u32, rows: u32) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if tile.column() + 1 < columns {
        candidates[count] = Some(TileCoord::new(tile.column() + 1, tile.row()));
        count += 1;
    }
    if let Some(column) = tile.column().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(column, tile.row()));
        count += 1;
    }
    if tile.row() + 1 < rows {
        candidates[count] = Some(TileCoord::new(tile.column(), tile.row() + 1));
        count += 1;
    }
    if let Some(row) = tile.row().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(tile.column(), row));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> TileMap {
        TileMap::parse("4 0 0 0 3\n", 48.0).expect("corridor parses")
    }

    #[test]
    fn distances_step_by_one_from_base() {
        let mut field = NavigationField::default();
        field.rebuild(&corridor(), |_| false);

        for column in 0..5 {
            assert_eq!(field.distance(TileCoord::new(column, 0)), 4 - column as i32);
        }
    }

    #[test]
    fn obstacles_and_blocked_tiles_are_excluded() {
        let map = TileMap::parse("4 0 0\n0 2 0\n0 0 3\n", 48.0).expect("grid parses");
        let mut field = NavigationField::default();
        let blocked = TileCoord::new(1, 0);
        field.rebuild(&map, |tile| tile == blocked);

        assert_eq!(field.distance(TileCoord::new(1, 1)), -1);
        assert_eq!(field.distance(blocked), -1);
        // The spawn corner can only be reached down the left edge.
        assert_eq!(field.distance(TileCoord::new(0, 0)), 4);
    }

    #[test]
    fn missing_base_leaves_field_unreachable() {
        let map = TileMap::parse("4 0 0 0 0\n", 48.0).expect("baseless map parses");
        let mut field = NavigationField::default();
        field.rebuild(&map, |_| false);

        assert!(field.cells().iter().all(|&distance| distance == -1));
    }

    #[test]
    fn routes_follow_predecessors_to_the_base() {
        let mut field = NavigationField::default();
        field.rebuild(&corridor(), |_| false);

        let route = field.route_from(TileCoord::new(0, 0));
        let columns: Vec<u32> = route.iter().map(TileCoord::column).collect();
        assert_eq!(columns, vec![0, 1, 2, 3, 4]);

        let map = TileMap::parse("4 2 3\n", 48.0).expect("split map parses");
        field.rebuild(&map, |_| false);
        assert!(field.route_from(TileCoord::new(0, 0)).is_empty());
    }
}
