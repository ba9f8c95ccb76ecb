//! Simulated agent and world state.
//!
//! [`AgentState`] is the context passed to every task and chain. Leaf tasks
//! change the world only through its methods, and every world-affecting step
//! is appended to [`AgentState::actions`] so hosts and tests can observe it.
//! The log keeps the last [`ACTION_LOG_CAPACITY`] entries; long runs read
//! [`AgentState::action_count`] for totals.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, trace};

use crate::BehaviourStack;

pub const MAX_HEALTH: u32 = 20;
pub const MAX_HUNGER: u32 = 20;

/// Grid position in the simulated world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: CardinalDirection) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance.
    pub fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of the first step towards `target`, x axis first.
    pub fn direction_towards(self, target: Position) -> Option<CardinalDirection> {
        if target.x > self.x {
            Some(CardinalDirection::East)
        } else if target.x < self.x {
            Some(CardinalDirection::West)
        } else if target.y > self.y {
            Some(CardinalDirection::North)
        } else if target.y < self.y {
            Some(CardinalDirection::South)
        } else {
            None
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum CardinalDirection {
    North,
    South,
    East,
    West,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::North,
        CardinalDirection::East,
        CardinalDirection::South,
        CardinalDirection::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            CardinalDirection::North => (0, 1),
            CardinalDirection::South => (0, -1),
            CardinalDirection::East => (1, 0),
            CardinalDirection::West => (-1, 0),
        }
    }

    /// Clockwise neighbour, used for sidestepping obstacles.
    pub fn clockwise(self) -> Self {
        match self {
            CardinalDirection::North => CardinalDirection::East,
            CardinalDirection::East => CardinalDirection::South,
            CardinalDirection::South => CardinalDirection::West,
            CardinalDirection::West => CardinalDirection::North,
        }
    }
}

/// Items the agent can carry.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Item {
    Bread,
    Apple,
    CookedBeef,
    Cobblestone,
    Torch,
}

impl Item {
    pub const FOOD: [Item; 3] = [Item::CookedBeef, Item::Bread, Item::Apple];

    /// Hunger points restored by eating one unit, zero for non-food.
    pub fn nourishment(self) -> u32 {
        match self {
            Item::CookedBeef => 8,
            Item::Bread => 5,
            Item::Apple => 4,
            Item::Cobblestone | Item::Torch => 0,
        }
    }

    pub fn is_food(self) -> bool {
        self.nourishment() > 0
    }
}

/// A hostile mob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mob {
    pub id: u32,
    pub position: Position,
    pub health: u32,
}

/// A world-affecting step performed by a leaf task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafAction {
    Move {
        from: Position,
        to: Position,
    },
    /// A move into a blocked tile.
    Bump {
        at: Position,
        direction: CardinalDirection,
    },
    Attack {
        mob: u32,
    },
    Eat(Item),
}

/// Passive world rules applied once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldRules {
    /// Ticks between hunger increments.
    pub hunger_interval: u64,
    /// Damage taken per tick while standing on a hazard.
    pub hazard_damage: u32,
    /// Damage dealt per attack.
    pub attack_damage: u32,
}

impl Default for WorldRules {
    fn default() -> Self {
        Self {
            hunger_interval: 40,
            hazard_damage: 1,
            attack_damage: 4,
        }
    }
}

/// Agent and world state, passed explicitly to every task and chain.
#[derive(Clone, Debug)]
pub struct AgentState {
    pub tick: u64,
    pub position: Position,
    pub health: u32,
    /// 0 is full, [`MAX_HUNGER`] is starving.
    pub hunger: u32,
    pub inventory: BTreeMap<Item, u32>,
    pub mobs: Vec<Mob>,
    pub hazards: BTreeSet<Position>,
    pub blocked: BTreeSet<Position>,
    /// Consecutive moves that went nowhere.
    pub stuck_ticks: u32,
    pub behaviour: BehaviourStack,
    /// Most recent leaf actions, oldest first.
    pub actions: VecDeque<LeafAction>,
    /// Leaf actions recorded since the state was created.
    pub action_count: u64,
    pub rules: WorldRules,
}

/// Number of leaf actions kept in [`AgentState::actions`].
pub const ACTION_LOG_CAPACITY: usize = 256;

impl AgentState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            position: Position::ORIGIN,
            health: MAX_HEALTH,
            hunger: 0,
            inventory: BTreeMap::new(),
            mobs: Vec::new(),
            hazards: BTreeSet::new(),
            blocked: BTreeSet::new(),
            stuck_ticks: 0,
            behaviour: BehaviourStack::new(),
            actions: VecDeque::with_capacity(ACTION_LOG_CAPACITY),
            action_count: 0,
            rules: WorldRules::default(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_item(mut self, item: Item, count: u32) -> Self {
        self.add_item(item, count);
        self
    }

    pub fn with_rules(mut self, rules: WorldRules) -> Self {
        self.rules = rules;
        self
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    pub fn item_count(&self, item: Item) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item: Item, count: u32) {
        if count > 0 {
            *self.inventory.entry(item).or_insert(0) += count;
        }
    }

    /// Removes one unit of `item`. Returns `false` if none was carried.
    pub fn take_item(&mut self, item: Item) -> bool {
        match self.inventory.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.inventory.remove(&item);
                }
                true
            }
            _ => false,
        }
    }

    pub fn food_count(&self) -> u32 {
        Item::FOOD.iter().map(|item| self.item_count(*item)).sum()
    }

    /// Most nourishing food carried.
    pub fn best_food(&self) -> Option<Item> {
        Item::FOOD
            .iter()
            .copied()
            .find(|item| self.item_count(*item) > 0)
    }

    // ------------------------------------------------------------------
    // Mobs
    // ------------------------------------------------------------------

    pub fn mob(&self, id: u32) -> Option<&Mob> {
        self.mobs.iter().find(|mob| mob.id == id)
    }

    pub fn spawn_mob(&mut self, id: u32, position: Position, health: u32) {
        debug!(mob = id, %position, "mob spawned");
        self.mobs.push(Mob {
            id,
            position,
            health,
        });
    }

    /// Closest mob within `radius`, lowest id first on ties.
    pub fn nearest_mob_within(&self, radius: u32) -> Option<&Mob> {
        self.mobs
            .iter()
            .filter(|mob| self.position.distance(mob.position) <= radius)
            .min_by_key(|mob| (self.position.distance(mob.position), mob.id))
    }

    /// Hits `mob` for the configured damage; dead mobs are removed.
    pub fn attack(&mut self, mob: u32) {
        self.record(LeafAction::Attack { mob });
        let damage = self.rules.attack_damage;
        if let Some(target) = self.mobs.iter_mut().find(|m| m.id == mob) {
            target.health = target.health.saturating_sub(damage);
            if target.health == 0 {
                debug!(mob, "mob killed");
                self.mobs.retain(|m| m.id != mob);
            }
        }
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    pub fn is_blocked(&self, position: Position) -> bool {
        self.blocked.contains(&position)
    }

    pub fn on_hazard(&self) -> bool {
        self.hazards.contains(&self.position)
    }

    /// Moves one tile. A blocked move counts towards [`AgentState::stuck_ticks`].
    pub fn try_move(&mut self, direction: CardinalDirection) -> bool {
        let from = self.position;
        let to = from.step(direction);
        if self.is_blocked(to) {
            self.stuck_ticks += 1;
            self.record(LeafAction::Bump {
                at: from,
                direction,
            });
            return false;
        }
        self.position = to;
        self.stuck_ticks = 0;
        self.record(LeafAction::Move { from, to });
        true
    }

    /// Nearest tile that is neither a hazard nor blocked.
    pub fn nearest_safe(&self) -> Position {
        let origin = self.position;
        let mut frontier = VecDeque::from([origin]);
        let mut seen = BTreeSet::from([origin]);
        while let Some(position) = frontier.pop_front() {
            if !self.hazards.contains(&position) && !self.is_blocked(position) {
                return position;
            }
            // Hazard fields are small; bail out instead of flooding the plane
            if origin.distance(position) > 32 {
                break;
            }
            for direction in CardinalDirection::ALL {
                let next = position.step(direction);
                if seen.insert(next) {
                    frontier.push_back(next);
                }
            }
        }
        origin
    }

    // ------------------------------------------------------------------
    // Food
    // ------------------------------------------------------------------

    /// Eats one unit of `item`. Returns `false` if none was carried.
    pub fn eat(&mut self, item: Item) -> bool {
        if !self.take_item(item) {
            return false;
        }
        self.hunger = self.hunger.saturating_sub(item.nourishment());
        self.record(LeafAction::Eat(item));
        true
    }

    // ------------------------------------------------------------------
    // World
    // ------------------------------------------------------------------

    /// Applies passive effects for one tick: hunger drain and hazard damage.
    pub fn advance_world(&mut self) {
        self.tick += 1;
        if self.rules.hunger_interval > 0 && self.tick % self.rules.hunger_interval == 0 {
            self.hunger = (self.hunger + 1).min(MAX_HUNGER);
        }
        if self.on_hazard() {
            self.health = self.health.saturating_sub(self.rules.hazard_damage);
            trace!(health = self.health, position = %self.position, "hazard damage");
        }
    }

    fn record(&mut self, action: LeafAction) {
        trace!(tick = self.tick, ?action, "leaf action");
        if self.actions.len() == ACTION_LOG_CAPACITY {
            self.actions.pop_front();
        }
        self.actions.push_back(action);
        self.action_count += 1;
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}
