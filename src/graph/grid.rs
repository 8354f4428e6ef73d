use std::hash::{Hash, Hasher};

use crate::error::PlanError;
use crate::torus::{ring_mod, Plane, Position};

use super::{Graph, GraphBuilder, NodeId, PlanRequest, SearchNode, SearchState};

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Clone, Debug)]
pub struct GridCell {
    column: usize,
    row: usize,
    center: Position,
    top_left: Position,
    blocked: bool,
    state: SearchState,
}

impl GridCell {
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn center(&self) -> Position {
        self.center
    }

    pub fn top_left(&self) -> Position {
        self.top_left
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    fn reset(&mut self) {
        self.blocked = false;
        self.state.reset();
    }
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column && self.row == other.row
    }
}

impl Eq for GridCell {}

impl Hash for GridCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column.hash(state);
        self.row.hash(state);
    }
}

impl SearchNode for GridCell {
    fn position(&self) -> Position {
        self.center
    }

    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }
}

/// Fixed cell matrix covering the whole plane, reused across planning calls.
///
/// Cells are stored row-major. Every build resets blocked flags and search
/// state in place, remasks obstacles and refills the adjacency buffers.
#[derive(Clone, Debug)]
pub struct GridIndex {
    plane: Plane,
    columns: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    cells: Vec<GridCell>,
    edges: Vec<Vec<NodeId>>,
}

impl GridIndex {
    pub fn new(plane: Plane, columns: usize, rows: usize) -> Result<Self, PlanError> {
        if columns == 0 || rows == 0 {
            return Err(PlanError::InvalidGrid { columns, rows });
        }

        let cell_width = plane.width() / columns as f64;
        let cell_height = plane.height() / rows as f64;
        let mut cells = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let left = column as f64 * cell_width;
                let top = row as f64 * cell_height;
                cells.push(GridCell {
                    column,
                    row,
                    center: plane.wrap(Position::new(
                        left + cell_width * 0.5,
                        top + cell_height * 0.5,
                    )),
                    top_left: Position::new(left, top),
                    blocked: false,
                    state: SearchState::default(),
                });
            }
        }

        Ok(Self {
            plane,
            columns,
            rows,
            cell_width,
            cell_height,
            cells,
            edges: vec![Vec::with_capacity(NEIGHBOR_OFFSETS.len()); columns * rows],
        })
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell at a wrapped column/row pair.
    pub fn cell(&self, column: usize, row: usize) -> &GridCell {
        &self.cells[self.index_of(column, row)]
    }

    pub fn index_of(&self, column: usize, row: usize) -> NodeId {
        (row % self.rows) * self.columns + (column % self.columns)
    }

    pub fn cell_index_for(&self, position: &Position) -> NodeId {
        let wrapped = self.plane.wrap(*position);
        let column = ((wrapped.x / self.cell_width).floor() as usize).min(self.columns - 1);
        let row = ((wrapped.y / self.cell_height).floor() as usize).min(self.rows - 1);
        self.index_of(column, row)
    }

    pub fn cell_for(&self, position: &Position) -> &GridCell {
        &self.cells[self.cell_index_for(position)]
    }

    /// Adjacency from the most recent build.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.edges[id]
    }

    fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        for edges in &mut self.edges {
            edges.clear();
        }
    }

    /// Blocks every cell overlapping the square of half-size `radius` around
    /// `center`, wrapping across both seams.
    fn mask_footprint(&mut self, center: &Position, radius: f64) {
        let columns = spanned_indices(
            center.x - radius,
            center.x + radius,
            self.cell_width,
            self.columns,
        );
        let rows = spanned_indices(
            center.y - radius,
            center.y + radius,
            self.cell_height,
            self.rows,
        );
        for row in rows {
            for column in columns.clone() {
                let id = self.index_of(column, row);
                self.cells[id].blocked = true;
            }
        }
    }

    fn connect(&mut self) {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let id = self.index_of(column, row);
                if self.cells[id].blocked {
                    continue;
                }
                for (dc, dr) in NEIGHBOR_OFFSETS {
                    let neighbor = self.index_of(
                        ring_mod(column as isize + dc, self.columns),
                        ring_mod(row as isize + dr, self.rows),
                    );
                    if neighbor == id
                        || self.cells[neighbor].blocked
                        || self.edges[id].contains(&neighbor)
                    {
                        continue;
                    }
                    self.edges[id].push(neighbor);
                }
            }
        }
    }
}

/// Wrapped indices of the cells on one axis that overlap `[lo, hi]`.
fn spanned_indices(
    lo: f64,
    hi: f64,
    size: f64,
    count: usize,
) -> impl Iterator<Item = usize> + Clone {
    let first = (lo / size).floor();
    let last = ((hi / size).ceil() - 1.0).max(first);
    // Footprints wider than the plane cover the whole axis.
    let span = if last - first + 1.0 >= count as f64 {
        count
    } else {
        (last - first) as usize + 1
    };
    let start = (first.rem_euclid(count as f64) as usize) % count;
    (0..span).map(move |offset| (start + offset) % count)
}

impl GraphBuilder for GridIndex {
    type Node = GridCell;

    fn build(&mut self, request: &PlanRequest<'_>) -> Graph<'_, GridCell> {
        self.reset();

        let inflation = request.mover.radius;
        for obstacle in request.obstacles {
            if obstacle.position.same_location(&request.goal) {
                continue;
            }
            self.mask_footprint(&obstacle.position, obstacle.radius + inflation);
        }

        let start = self.cell_index_for(&request.mover.position);
        let goal = self.cell_index_for(&request.goal);
        self.cells[start].blocked = false;
        self.cells[goal].blocked = false;
        self.connect();

        let heuristic = self
            .plane
            .distance(&self.cells[start].center, &self.cells[goal].center);
        let state = &mut self.cells[start].state;
        state.path_cost = 0.0;
        state.heuristic = heuristic;

        tracing::trace!(
            start,
            goal,
            blocked = self.cells.iter().filter(|cell| cell.blocked).count(),
            "grid graph built"
        );

        Graph::new(self.plane, &mut self.cells, &self.edges, start, goal)
    }
}
