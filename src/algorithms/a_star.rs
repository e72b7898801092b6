use crate::algorithms::common::{PathfindingAlgorithm, Route};
use crate::grid::{Coordinate, GridMap, Marker, ORTHOGONAL_OFFSETS};
use crate::statistics::SearchStats;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace, warn};

/// Index of a node inside the [`SearchResult`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One step of the search. Never modified once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchNode {
    pub position: Coordinate,
    pub parent: Option<NodeId>,
    /// Accumulated cost along the parent chain.
    pub g: u32,
    /// Euclidean distance to the goal, fixed at creation.
    pub h: f64,
    pub f: f64,
}

impl SearchNode {
    fn root(position: Coordinate) -> Self {
        SearchNode {
            position,
            parent: None,
            g: 0,
            h: 0.0,
            f: 0.0,
        }
    }
}

/// How a candidate is reconciled with open nodes at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Relaxation {
    /// Drop the candidate if any open duplicate has `f <= candidate.f`,
    /// otherwise add it next to the duplicates it beats.
    #[default]
    Compatible,
    /// Keep only the lower-`f` duplicate: a better candidate retires the open
    /// ones, and closed positions are never expanded twice.
    Standard,
}

#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f: f64,
    seq: u64,
    id: NodeId,
}

// Min-heap on f, ties go to the entry pushed first.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Priority queue plus a position index of the entries that are still live.
#[derive(Default)]
struct OpenSet {
    heap: BinaryHeap<FrontierEntry>,
    members: FxHashMap<Coordinate, Vec<NodeId>>,
    live: usize,
    next_seq: u64,
}

impl OpenSet {
    fn push(&mut self, id: NodeId, node: &SearchNode) {
        self.heap.push(FrontierEntry {
            f: node.f,
            seq: self.next_seq,
            id,
        });
        self.next_seq += 1;
        self.members.entry(node.position).or_default().push(id);
        self.live += 1;
    }

    /// Pops the best entry. The flag is false when the entry was retired.
    fn pop(&mut self, nodes: &[SearchNode]) -> Option<(NodeId, bool)> {
        let entry = self.heap.pop()?;
        let position = nodes[entry.id.0].position;
        let Some(ids) = self.members.get_mut(&position) else {
            return Some((entry.id, false));
        };
        let Some(slot) = ids.iter().position(|&id| id == entry.id) else {
            return Some((entry.id, false));
        };
        ids.swap_remove(slot);
        if ids.is_empty() {
            self.members.remove(&position);
        }
        self.live -= 1;
        Some((entry.id, true))
    }

    fn duplicates(&self, position: Coordinate) -> impl Iterator<Item = NodeId> + '_ {
        self.members.get(&position).into_iter().flatten().copied()
    }

    /// True when an open node at the candidate's position has `f <= candidate.f`.
    fn dominates(&self, nodes: &[SearchNode], candidate: &SearchNode) -> bool {
        self.duplicates(candidate.position).any(|id| nodes[id.0].f <= candidate.f)
    }

    fn retire(&mut self, position: Coordinate) {
        if let Some(ids) = self.members.remove(&position) {
            self.live -= ids.len();
        }
    }

    fn len(&self) -> usize {
        self.live
    }
}

/// Best-first grid search over four-connected cells, ordered by `g + h` with
/// a Euclidean `h`.
///
/// The goal is accepted as soon as it is generated as a neighbor, before the
/// closed and open checks. When every cell costs at least one the Euclidean
/// estimate never overestimates, and the returned route is a cheapest one.
#[derive(Debug, Clone, Default)]
pub struct AStar {
    relaxation: Relaxation,
    max_expansions: Option<usize>,
    last_stats: SearchStats,
}

impl AStar {
    pub const NAME: &'static str = "a_star";

    pub fn new() -> Self {
        AStar::default()
    }

    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Gives up (reporting no path) after `limit` expansions.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    /// Counters from the most recent call, including failed ones.
    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Searches from `start` to `goal`.
    ///
    /// Returns `None` when the frontier runs dry (or the expansion limit is
    /// hit). Every cell pushed onto the frontier is reported to the map with
    /// [`Marker::Frontier`].
    pub fn find_path<M>(
        &mut self,
        start: Coordinate,
        goal: Coordinate,
        map: &mut M,
    ) -> Option<SearchResult>
    where
        M: GridMap + ?Sized,
    {
        let mut nodes = vec![SearchNode::root(start)];
        let mut stats = SearchStats::default();

        if start == goal {
            debug!(%start, "start is the goal");
            self.last_stats = stats;
            return Some(SearchResult {
                nodes,
                goal: NodeId(0),
                stats,
            });
        }

        let mut open = OpenSet::default();
        let mut closed: FxHashSet<Coordinate> = FxHashSet::default();
        open.push(NodeId(0), &nodes[0]);
        stats.record_frontier_len(open.len());

        while let Some((current_id, live)) = open.pop(&nodes) {
            let current = nodes[current_id.0];
            if !live
                || (self.relaxation == Relaxation::Standard && closed.contains(&current.position))
            {
                stats.skipped_stale += 1;
                continue;
            }

            if let Some(limit) = self.max_expansions {
                if stats.expanded >= limit {
                    warn!(limit, %start, %goal, "expansion limit reached, giving up");
                    self.last_stats = stats;
                    return None;
                }
            }

            closed.insert(current.position);
            stats.expanded += 1;
            trace!(position = %current.position, g = current.g, f = current.f, "expanding");

            for (dr, dc) in ORTHOGONAL_OFFSETS {
                let Some(position) = current.position.offset(dr, dc) else {
                    continue;
                };
                let Some(cost) = map.get_cell_value(position) else {
                    continue;
                };
                stats.generated += 1;
                let g = current.g.saturating_add(cost);

                if position == goal {
                    nodes.push(SearchNode {
                        position,
                        parent: Some(current_id),
                        g,
                        h: 0.0,
                        f: f64::from(g),
                    });
                    let goal_id = NodeId(nodes.len() - 1);
                    debug!(%start, %goal, cost = g, expanded = stats.expanded, "path found");
                    self.last_stats = stats;
                    return Some(SearchResult {
                        nodes,
                        goal: goal_id,
                        stats,
                    });
                }

                if closed.contains(&position) {
                    stats.discarded_closed += 1;
                    continue;
                }

                let h = position.euclidean(goal);
                let candidate = SearchNode {
                    position,
                    parent: Some(current_id),
                    g,
                    h,
                    f: f64::from(g) + h,
                };

                if open.dominates(&nodes, &candidate) {
                    stats.discarded_duplicate += 1;
                    continue;
                }
                if self.relaxation == Relaxation::Standard {
                    open.retire(position);
                }

                let id = NodeId(nodes.len());
                nodes.push(candidate);
                open.push(id, &candidate);
                map.set_cell_value(position, Marker::Frontier);
                stats.pushed += 1;
                stats.record_frontier_len(open.len());
            }
        }

        debug!(%start, %goal, expanded = stats.expanded, "frontier exhausted, no path");
        self.last_stats = stats;
        None
    }
}

impl PathfindingAlgorithm for AStar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn find_route(
        &mut self,
        map: &mut dyn GridMap,
        start: Coordinate,
        goal: Coordinate,
    ) -> Option<Route> {
        let result = self.find_path(start, goal, map)?;
        Some(Route {
            positions: result.path(),
            cost: result.cost(),
        })
    }

    fn last_stats(&self) -> Option<SearchStats> {
        Some(self.last_stats)
    }
}

/// Every node created by one successful search, plus the node that reached
/// the goal.
#[derive(Debug, Clone)]
pub struct SearchResult {
    nodes: Vec<SearchNode>,
    goal: NodeId,
    stats: SearchStats,
}

impl SearchResult {
    /// The node sitting on the goal cell.
    pub fn goal_node(&self) -> &SearchNode {
        &self.nodes[self.goal.0]
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn nodes_created(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the parent chain from the goal node back to the start.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            nodes: &self.nodes,
            next: Some(self.goal),
        }
    }

    /// Coordinates from start to goal, both included.
    pub fn path(&self) -> Vec<Coordinate> {
        let mut path: Vec<Coordinate> = self.ancestors().map(|node| node.position).collect();
        path.reverse();
        path
    }

    /// Number of moves on the path.
    pub fn steps(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Total cost of the cells entered along the path.
    pub fn cost(&self) -> u32 {
        self.goal_node().g
    }

    /// The cells strictly between start and goal, in travel order.
    ///
    /// The goal node is one step past the last intermediate cell, so this
    /// starts from its parent and stops before the parentless start node.
    pub fn interior(&self) -> Vec<Coordinate> {
        let mut cells: Vec<Coordinate> = self
            .ancestors()
            .skip(1)
            .filter(|node| node.parent.is_some())
            .map(|node| node.position)
            .collect();
        cells.reverse();
        cells
    }

    /// Marks the interior cells with [`Marker::Path`].
    pub fn mark_path<M: GridMap + ?Sized>(&self, map: &mut M) {
        for position in self.interior() {
            map.set_cell_value(position, Marker::Path);
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

/// Iterator over a node and its parents.
pub struct Ancestors<'a> {
    nodes: &'a [SearchNode],
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a SearchNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.next?.0];
        self.next = node.parent;
        Some(node)
    }
}
