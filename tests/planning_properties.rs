use torus_nav::graph::{
    Graph, GraphBuilder, GridCell, GridIndex, NodeId, PlanRequest, SearchNode, SearchState,
};
use torus_nav::scenario::Scenario;
use torus_nav::search::heap::IndexedHeap;
use torus_nav::{
    search, Body, BodyId, GraphMode, Maintenance, PathSearchStrategy, Plane, Planner,
    PlannerConfig, Position, SearchLimits,
};

const EPS: f64 = 1e-6;

fn arena() -> Plane {
    Plane::new(1600.0, 1080.0).unwrap()
}

fn default_grid() -> GridIndex {
    GridIndex::new(arena(), 100, 60).unwrap()
}

fn ship_at(x: f64, y: f64) -> Body {
    Body::ship(BodyId(0), Position::new(x, y), 12.0)
}

/// Exact shortest path on an open 8-connected grid with wraparound.
fn octile_cost(grid: &GridIndex, from: &GridCell, to: &GridCell) -> f64 {
    let (w, h) = grid.cell_size();
    let dc = from.column().abs_diff(to.column());
    let dr = from.row().abs_diff(to.row());
    let dc = dc.min(grid.columns() - dc) as f64;
    let dr = dr.min(grid.rows() - dr) as f64;
    let diagonal = (w * w + h * h).sqrt();
    let straight = if dc > dr { w } else { h };
    dc.min(dr) * diagonal + (dc - dr).abs() * straight
}

/// Cost-to-goal for every node, by Dijkstra from the goal over the same edges.
fn true_remaining_cost<N: SearchNode>(graph: &Graph<'_, N>) -> Vec<f64> {
    let plane = graph.plane();
    let mut dist = vec![f64::INFINITY; graph.len()];
    let mut done = vec![false; graph.len()];
    let mut heap = IndexedHeap::with_capacity(graph.len());
    dist[graph.goal()] = 0.0;
    heap.push_or_update(graph.goal(), 0.0, 0.0);
    while let Some((node, cost)) = heap.pop() {
        done[node] = true;
        for &next in graph.neighbors(node) {
            if done[next] {
                continue;
            }
            let step = plane.distance(&graph.node(node).position(), &graph.node(next).position());
            if cost + step < dist[next] {
                dist[next] = cost + step;
                heap.push_or_update(next, dist[next], 0.0);
            }
        }
    }
    dist
}

fn path_ids<N: SearchNode>(graph: &Graph<'_, N>) -> Vec<NodeId> {
    let mut ids = vec![graph.goal()];
    let mut cursor = graph.node(graph.goal()).state().predecessor;
    while let Some(id) = cursor {
        ids.push(id);
        cursor = graph.node(id).state().predecessor;
    }
    ids.reverse();
    ids
}

#[test]
fn open_grid_a_star_matches_octile_distance() {
    let mut grid = default_grid();
    let cases = [
        ((100.0, 100.0), (900.0, 100.0)),
        ((100.0, 100.0), (100.0, 800.0)),
        ((40.0, 45.0), (1560.0, 1040.0)),
        ((800.0, 540.0), (1300.0, 200.0)),
        ((10.0, 500.0), (1590.0, 520.0)),
    ];
    for ((sx, sy), (gx, gy)) in cases {
        let mover = ship_at(sx, sy);
        let goal = Position::new(gx, gy);
        let request = PlanRequest {
            mover: &mover,
            goal,
            obstacles: &[],
        };
        let mut graph = grid.build(&request);
        let result = search(&mut graph, PathSearchStrategy::AStar, SearchLimits::default()).unwrap();
        drop(graph);

        let from = grid.cell_for(&mover.position).clone();
        let to = grid.cell_for(&goal).clone();
        let expected = octile_cost(&grid, &from, &to);
        assert!(
            (result.cost - expected).abs() < EPS,
            "{sx},{sy} -> {gx},{gy}: cost {} expected {expected}",
            result.cost
        );

        // Along an axis the path stays within one cell diagonal of the straight line.
        let straight = arena().distance(&from.center(), &to.center());
        let (w, h) = grid.cell_size();
        assert!(result.cost + EPS >= straight);
        if from.row() == to.row() || from.column() == to.column() {
            assert!(result.cost <= straight + (w * w + h * h).sqrt());
        }
    }
}

#[test]
fn a_star_expands_only_admissible_nodes() {
    let mut grid = default_grid();
    let scenario = Scenario::generate(0xA57E_0001, arena(), 40);
    let mover = *scenario.world.body(scenario.mover).unwrap();
    let target = scenario.target.resolve(&scenario.world).unwrap();
    let obstacles = scenario.world.obstructions(mover.id, &target);
    let request = PlanRequest {
        mover: &mover,
        goal: target.position,
        obstacles: &obstacles,
    };
    let mut graph = grid.build(&request);
    let result = search(&mut graph, PathSearchStrategy::AStar, SearchLimits::default());
    let remaining = true_remaining_cost(&graph);

    let mut explored = 0;
    for (id, node) in graph.nodes().iter().enumerate() {
        let state = node.state();
        if state.explored {
            explored += 1;
            assert!(
                state.heuristic <= remaining[id] + EPS,
                "node {id}: h={} true={}",
                state.heuristic,
                remaining[id]
            );
        }
    }
    assert!(explored > 0);

    if let Ok(path) = result {
        assert!((path.cost - remaining[graph.start()]).abs() < EPS);
    }
}

#[test]
fn path_cost_never_decreases_along_a_star_path() {
    let mut grid = default_grid();
    for seed in [3_u32, 17, 99, 1234] {
        let scenario = Scenario::generate(seed, arena(), 30);
        let mover = *scenario.world.body(scenario.mover).unwrap();
        let target = scenario.target.resolve(&scenario.world).unwrap();
        let obstacles = scenario.world.obstructions(mover.id, &target);
        let request = PlanRequest {
            mover: &mover,
            goal: target.position,
            obstacles: &obstacles,
        };
        let mut graph = grid.build(&request);
        if search(&mut graph, PathSearchStrategy::AStar, SearchLimits::default()).is_err() {
            continue;
        }
        let ids = path_ids(&graph);
        assert_eq!(ids[0], graph.start());
        for pair in ids.windows(2) {
            let before = graph.node(pair[0]).state().path_cost;
            let after = graph.node(pair[1]).state().path_cost;
            assert!(after >= before, "seed {seed}: g fell from {before} to {after}");
        }
    }
}

#[test]
fn blocked_cells_never_join_the_graph() {
    let mut grid = default_grid();
    let scenario = Scenario::generate(0xBEEF, arena(), 50);
    let mover = *scenario.world.body(scenario.mover).unwrap();
    let target = scenario.target.resolve(&scenario.world).unwrap();
    let obstacles = scenario.world.obstructions(mover.id, &target);
    let request = PlanRequest {
        mover: &mover,
        goal: target.position,
        obstacles: &obstacles,
    };
    let graph = grid.build(&request);
    let plane = arena();

    for (id, cell) in graph.nodes().iter().enumerate() {
        let covered = obstacles.iter().any(|rock| {
            let offset = plane.shortest_vector(&rock.position, &cell.center());
            let reach = rock.radius + mover.radius;
            offset.x.abs() <= reach && offset.y.abs() <= reach
        });
        if covered && id != graph.start() && id != graph.goal() {
            assert!(cell.is_blocked(), "cell {id} center sits inside a footprint");
        }
        if cell.is_blocked() {
            assert!(graph.neighbors(id).is_empty());
        }
        for &next in graph.neighbors(id) {
            assert!(!graph.node(next).is_blocked());
        }
    }
}

#[test]
fn gbfs_and_a_star_both_reach_the_goal() {
    let config = PlannerConfig {
        fallback_to_radial: false,
        ..PlannerConfig::default()
    };
    let mut planner = Planner::new(config).unwrap();
    let (w, h) = planner.grid().cell_size();
    let max_step = (w * w + h * h).sqrt() + EPS;
    let mut compared = 0;

    for seed in 1..=12_u32 {
        let scenario = Scenario::generate(seed, arena(), 25);
        let plan = |planner: &mut Planner, strategy| {
            planner
                .plan_with(
                    &scenario.world,
                    scenario.mover,
                    scenario.target,
                    GraphMode::Grid,
                    strategy,
                )
                .unwrap()
        };
        let optimal = plan(&mut planner, PathSearchStrategy::AStar);
        let greedy = plan(&mut planner, PathSearchStrategy::Gbfs);
        if optimal.failure().is_some() {
            assert!(greedy.failure().is_some(), "seed {seed}: only A* failed");
            continue;
        }
        let greedy_ok = greedy.failure().is_none();
        assert!(greedy_ok, "seed {seed}: GBFS failed where A* succeeded");

        for route in [&optimal, &greedy] {
            for pair in route.waypoints().windows(2) {
                assert!(arena().distance(&pair[0], &pair[1]) <= max_step);
            }
        }
        assert!(optimal.waypoints()[0].same_location(&greedy.waypoints()[0]));
        assert!(greedy.cost() + EPS >= optimal.cost());
        compared += 1;
    }
    assert!(compared > 0);
}

/// Bare node for hand-built graphs.
struct Waypoint {
    position: Position,
    state: SearchState,
}

impl Waypoint {
    fn at(x: f64, y: f64) -> Self {
        Self {
            position: Position::new(x, y),
            state: SearchState::default(),
        }
    }
}

impl SearchNode for Waypoint {
    fn position(&self) -> Position {
        self.position
    }

    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }
}

/// Start, goal, a detour that looks close to the goal but costs a lot to
/// reach, and a cheap hop that starts out further away.
fn detour_graph() -> (Vec<Waypoint>, Vec<Vec<NodeId>>) {
    const START: NodeId = 0;
    const GOAL: NodeId = 1;
    const DETOUR: NodeId = 2;
    const HOP: NodeId = 3;
    let nodes = vec![
        Waypoint::at(100.0, 500.0),
        Waypoint::at(500.0, 500.0),
        Waypoint::at(400.0, 700.0),
        Waypoint::at(200.0, 500.0),
    ];
    let mut edges = vec![Vec::new(); nodes.len()];
    edges[START] = vec![DETOUR, HOP];
    edges[DETOUR] = vec![START, GOAL];
    edges[HOP] = vec![START, GOAL];
    (nodes, edges)
}

#[test]
fn gbfs_takes_the_tempting_detour_while_a_star_stays_optimal() {
    let plane = Plane::new(1000.0, 1000.0).unwrap();
    let detour_cost = 300.0_f64.hypot(200.0) + 100.0_f64.hypot(200.0);

    let (mut nodes, edges) = detour_graph();
    let mut graph = Graph::new(plane, &mut nodes, &edges, 0, 1);
    let greedy = search(&mut graph, PathSearchStrategy::Gbfs, SearchLimits::default()).unwrap();
    let greedy_xs: Vec<f64> = greedy.waypoints.iter().map(|p| p.x).collect();
    assert_eq!(greedy_xs, vec![100.0, 400.0, 500.0]);
    assert!((greedy.cost - detour_cost).abs() < EPS);

    let (mut nodes, edges) = detour_graph();
    let mut graph = Graph::new(plane, &mut nodes, &edges, 0, 1);
    let optimal = search(&mut graph, PathSearchStrategy::AStar, SearchLimits::default()).unwrap();
    let optimal_xs: Vec<f64> = optimal.waypoints.iter().map(|p| p.x).collect();
    assert_eq!(optimal_xs, vec![100.0, 200.0, 500.0]);
    assert!((optimal.cost - 400.0).abs() < EPS);

    assert!(greedy.cost > optimal.cost + 100.0);
}

#[test]
fn following_a_route_with_upkeep_reaches_the_end() {
    let mut planner = Planner::new(PlannerConfig::default()).unwrap();
    let mut scenario = Scenario::generate(0x5EED_0042, arena(), 20);
    let index_of = |id: BodyId, scenario: &Scenario| {
        scenario
            .world
            .bodies
            .iter()
            .position(|body| body.id == id)
            .unwrap()
    };
    let mover_index = index_of(scenario.mover, &scenario);
    let target_index = index_of(BodyId(1), &scenario);
    let parked = &mut scenario.world.bodies[target_index].position;
    parked.vx = 0.0;
    parked.vy = 0.0;

    let mut route = planner
        .plan(&scenario.world, scenario.mover, scenario.target)
        .unwrap();
    assert!(route.failure().is_none());

    for tick in 1..400_u64 {
        let Some(step) = route.next_step() else {
            break;
        };
        scenario.world.tick = tick;
        scenario.world.bodies[mover_index].position = step;
        route.advance();
        let outcome = planner
            .maintain(&scenario.world, scenario.mover, &mut route)
            .unwrap();
        assert!(!matches!(outcome, Maintenance::ReplanFailed(_)), "tick {tick}");
    }

    assert!(route.next_step().is_none());
    let last = *route.waypoints().last().unwrap();
    assert!(scenario.world.bodies[mover_index].position.same_location(&last));
}
