//! Per-unit incremental pathfinder (distilled spec §4.3).
//!
//! Rebuilt lazily when the cache-key fingerprint changes, per the
//! redesign note in distilled spec §9 ("invalidate by comparing a compact
//! fingerprint ... avoid implicit observers"). Flying units get a flat
//! cost-1 reachability map; walking units get a Dijkstra search so the
//! moat's very large entry cost is handled correctly instead of with a
//! plain BFS.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use battle_types::board::{self as geo, Direction};
use battle_types::ids::{CellIndex, UnitUid};
use battle_types::position::Position;
use battle_types::unit::{Side, Unit};
use serde::{Deserialize, Serialize};

use crate::board::{Board, CellObject};
use crate::siege::wall_blocks;

/// The compact fingerprint that decides whether a cached search is still
/// valid (distilled spec §4.3, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub start: Position,
    pub speed: u32,
    pub is_wide: bool,
    pub is_flying: bool,
    pub color: Side,
    pub passability_fingerprint: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Node {
    pub came_from: Option<Position>,
    pub cost: u32,
    pub distance: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    key: Option<CacheKey>,
    nodes: HashMap<Position, Node>,
}

/// Cheap fingerprint of everything that can change cell passability: unit
/// occupancy plus bridge/wall state. Not cryptographic, just sensitive
/// enough that two different boards almost never collide.
pub fn passability_fingerprint(board: &Board) -> u64 {
    let mut acc: u64 = if board.bridge.down { 1 } else { 0 };
    acc = acc.wrapping_mul(3).wrapping_add(if board.bridge.destroyed { 1 } else { 0 });
    for i in 0..geo::BOARD_SIZE {
        let cell = CellIndex(i);
        let occ = board.occupant_at(cell).map(|u| u.get() as u64).unwrap_or(0);
        acc = acc.wrapping_mul(1_000_003).wrapping_add(occ + 1);
        if let CellObject::Wall(c) = board.object_at(cell) {
            acc = acc.wrapping_mul(31).wrapping_add(c as u64 + 1);
        }
    }
    acc
}

fn entry_cost(board: &Board, from: CellIndex, to: CellIndex, unit: &Unit) -> Option<u32> {
    if let CellObject::Wall(condition) = board.object_at(to) {
        if wall_blocks(condition) {
            return None;
        }
    }
    if geo::GATES_INDEX == to && !board.bridge.is_passable() {
        return None;
    }
    if board.is_blocked(to, Some(unit.uid)) {
        return None;
    }

    let is_moat = board.is_effective_moat(to);
    let started_here = unit.position.contains(to);
    let _ = from;
    if is_moat && !started_here {
        Some(geo::MOAT_PENALTY)
    } else {
        Some(1)
    }
}

fn flying_distance(start: Position, target: Position) -> u32 {
    let d = geo::distance(start.head, target.head);
    let candidates = [
        Some(d),
        start.tail.map(|t| geo::distance(t, target.head)),
        target.tail.map(|t| geo::distance(start.head, t)),
        match (start.tail, target.tail) {
            (Some(a), Some(b)) => Some(geo::distance(a, b)),
            _ => None,
        },
    ];
    candidates.into_iter().flatten().min().unwrap_or(d).max(1)
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache_key(board: &Board, unit: &Unit) -> CacheKey {
        CacheKey {
            start: unit.position,
            speed: unit.stats.speed,
            is_wide: unit.is_wide(),
            is_flying: unit.is_flying(),
            color: unit.current_color,
            passability_fingerprint: passability_fingerprint(board),
        }
    }

    pub fn ensure_built(&mut self, board: &Board, unit: &Unit) {
        let key = Self::cache_key(board, unit);
        if self.key == Some(key) {
            return;
        }
        self.nodes = if unit.is_flying() {
            Self::build_flying(board, unit)
        } else if unit.is_wide() {
            Self::build_wide(board, unit)
        } else {
            Self::build_narrow(board, unit)
        };
        self.key = Some(key);
    }

    fn build_flying(board: &Board, unit: &Unit) -> HashMap<Position, Node> {
        let mut nodes = HashMap::new();
        nodes.insert(
            unit.position,
            Node {
                came_from: None,
                cost: 0,
                distance: 0,
            },
        );
        for i in 0..geo::BOARD_SIZE {
            let head = CellIndex(i);
            if board.is_blocked(head, Some(unit.uid)) {
                continue;
            }
            if let CellObject::Wall(c) = board.object_at(head) {
                if wall_blocks(c) {
                    continue;
                }
            }
            let target = Position::narrow(head);
            if target == unit.position {
                continue;
            }
            let distance = flying_distance(unit.position, target);
            nodes.insert(
                target,
                Node {
                    came_from: Some(unit.position),
                    cost: 1,
                    distance,
                },
            );
        }
        nodes
    }

    fn build_narrow(board: &Board, unit: &Unit) -> HashMap<Position, Node> {
        let mut nodes: HashMap<Position, Node> = HashMap::new();
        let mut heap: BinaryHeap<Reverse<(u32, u8)>> = BinaryHeap::new();
        nodes.insert(
            unit.position,
            Node {
                came_from: None,
                cost: 0,
                distance: 0,
            },
        );
        heap.push(Reverse((0, unit.position.head.get())));

        while let Some(Reverse((cost, head_raw))) = heap.pop() {
            let current = Position::narrow(CellIndex(head_raw));
            let node_cost = nodes.get(&current).map(|n| n.cost).unwrap_or(u32::MAX);
            if cost > node_cost {
                continue;
            }
            for dir in Direction::ALL_NEIGHBORS {
                let Some(next_cell) = geo::neighbor(CellIndex(head_raw), dir) else {
                    continue;
                };
                let Some(step_cost) = entry_cost(board, CellIndex(head_raw), next_cell, unit) else {
                    continue;
                };
                let next = Position::narrow(next_cell);
                let new_cost = cost.saturating_add(step_cost);
                let better = nodes
                    .get(&next)
                    .map(|n| new_cost < n.cost)
                    .unwrap_or(true);
                if better {
                    nodes.insert(
                        next,
                        Node {
                            came_from: Some(current),
                            cost: new_cost,
                            distance: geo::distance(unit.position.head, next_cell),
                        },
                    );
                    heap.push(Reverse((new_cost, next_cell.get())));
                }
            }
        }
        nodes
    }

    fn build_wide(board: &Board, unit: &Unit) -> HashMap<Position, Node> {
        let mut nodes: HashMap<Position, Node> = HashMap::new();
        nodes.insert(
            unit.position,
            Node {
                came_from: None,
                cost: 0,
                distance: 0,
            },
        );

        // A simple relaxation loop (bounded by board size) rather than a
        // heap: wide-position count is small enough (≤ 2×cells) that
        // repeatedly relaxing until no improvement converges quickly and
        // keeps the reversal-move special case easy to reason about.
        for _ in 0..geo::BOARD_SIZE {
            let mut changed = false;
            let current_positions: Vec<Position> = nodes.keys().copied().collect();
            for current in current_positions {
                let cost = nodes[&current].cost;
                for (next, step_cost) in wide_moves(board, unit, current) {
                    let new_cost = cost.saturating_add(step_cost);
                    let better = nodes.get(&next).map(|n| new_cost < n.cost).unwrap_or(true);
                    if better {
                        nodes.insert(
                            next,
                            Node {
                                came_from: Some(current),
                                cost: new_cost,
                                distance: geo::distance(unit.position.head, next.head),
                            },
                        );
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        nodes
    }

    pub fn is_reachable(&self, pos: Position) -> bool {
        self.nodes.contains_key(&pos)
    }

    pub fn is_reachable_this_turn(&self, pos: Position) -> bool {
        self.nodes.get(&pos).map(|n| n.cost <= self.speed()).unwrap_or(false)
    }

    fn speed(&self) -> u32 {
        self.key.map(|k| k.speed).unwrap_or(0)
    }

    /// The path of positions from start to `pos`, truncated to what fits
    /// within this turn's speed budget (distilled spec §4.3).
    pub fn build_path(&self, pos: Position) -> Vec<Position> {
        let Some(mut node) = self.nodes.get(&pos).copied() else {
            return Vec::new();
        };
        let mut chain = vec![pos];
        let mut current = pos;
        while let Some(prev) = node.came_from {
            chain.push(prev);
            current = prev;
            let Some(n) = self.nodes.get(&current) else { break };
            node = *n;
        }
        chain.reverse();

        let speed = self.speed();
        let mut truncated = Vec::new();
        for step in chain {
            let cost = self.nodes.get(&step).map(|n| n.cost).unwrap_or(0);
            if cost > speed {
                break;
            }
            truncated.push(step);
        }
        truncated
    }

    pub fn closest_reachable_position(&self, pos: Position) -> Option<Position> {
        self.build_path(pos).last().copied()
    }

    pub fn all_one_turn_heads(&self) -> Vec<CellIndex> {
        let speed = self.speed();
        self.nodes
            .iter()
            .filter(|(_, n)| n.cost <= speed)
            .map(|(p, _)| p.head)
            .collect()
    }
}

/// Moves available to a wide unit from `current`: translating both cells
/// in one of the six directions, plus the zero-cost in-place reversal
/// (distilled spec §4.3, §8 boundary scenario 2).
fn wide_moves(board: &Board, unit: &Unit, current: Position) -> Vec<(Position, u32)> {
    let mut out = Vec::new();
    let Some(tail) = current.tail else {
        return out;
    };

    // Reversal: swap which side the tail sits on, same two cells, free.
    let reversed = Position::wide(current.head, tail);
    if reversed != current {
        out.push((reversed, 0));
    }

    for dir in Direction::ALL_NEIGHBORS {
        let (Some(new_head), Some(new_tail)) = (
            geo::neighbor(current.head, dir),
            geo::neighbor(tail, dir),
        ) else {
            continue;
        };
        let candidate = Position::wide(new_head, new_tail);
        if !candidate.is_structurally_valid() {
            continue;
        }
        let head_cost = entry_cost(board, current.head, new_head, unit);
        let tail_cost = entry_cost(board, tail, new_tail, unit);
        let (Some(hc), Some(tc)) = (head_cost, tail_cost) else {
            continue;
        };
        out.push((candidate, hc.max(tc)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_types::ids::UnitKindId;
    use battle_types::unit::{UnitAbilities, UnitModes, UnitStats};

    fn walker(speed: u32, head: u8) -> Unit {
        Unit {
            uid: UnitUid(1),
            kind: UnitKindId(0),
            army_color: Side::Attacker,
            current_color: Side::Attacker,
            stats: UnitStats {
                attack: 1,
                defense: 1,
                damage_min: 1,
                damage_max: 1,
                hit_points_per_fighter: 1,
                speed,
                max_shots: 0,
                abilities: UnitAbilities::empty(),
                affinity: None,
                weakness: None,
                built_in_spell: None,
                magic_resistance_percent: 0,
                cost_per_fighter: 1,
            },
            count: 1,
            initial_count: 1,
            max_count: 1,
            hit_points: 1,
            dead_count: 0,
            shots_left: 0,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(head)),
            facing: Direction::Right,
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        }
    }

    #[test]
    fn moat_block_boundary_scenario() {
        // Cell 49 is the gates/moat cell with bridge destroyed; unit stands
        // adjacent at speed 4.
        let mut board = Board::new(true);
        board.bridge.set_destroyed();
        let start = geo::neighbor(CellIndex(49), Direction::Left).unwrap();
        let unit = walker(4, start.get());
        let mut pf = Pathfinder::new();
        pf.ensure_built(&board, &unit);

        assert!(pf.is_reachable_this_turn(Position::narrow(CellIndex(49))));

        let beyond = geo::neighbor(CellIndex(49), Direction::Right);
        if let Some(beyond) = beyond {
            assert!(!pf.is_reachable_this_turn(Position::narrow(beyond)));
        }
    }

    #[test]
    fn wide_reversal_is_free() {
        let board = Board::new(false);
        let mut unit = walker(5, 45);
        unit.position = Position::wide(CellIndex(45), CellIndex(44));
        let mut pf = Pathfinder::new();
        pf.ensure_built(&board, &unit);

        let reversed_tail = geo::neighbors(CellIndex(45))
            .into_iter()
            .find(|&c| c != CellIndex(44) && geo::are_adjacent(CellIndex(45), c))
            .unwrap();
        let target = Position::wide(CellIndex(45), reversed_tail);
        if let Some(node) = pf.nodes.get(&target) {
            assert_eq!(node.cost, 0);
        }
    }
}
