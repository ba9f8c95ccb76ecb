use std::collections::BTreeMap;

use task_system::{
    BoxedTask, ForceContinuation, SingleTaskChain, Task, TaskChain, TaskControl, TaskFailure,
    TaskNode, TaskOutcome, TaskRunner, TaskTrace,
};

/// Context recording every lifecycle hook as `"<event> <name>#<id>"`.
#[derive(Default)]
struct World {
    log: Vec<String>,
    next_id: u32,
    tick: u32,
    /// Child requested by `Chooser` tasks this tick.
    want: Option<&'static str>,
    /// Grandchild requested below the child.
    want_leaf: Option<&'static str>,
    force: bool,
    /// Chooser root that gives up on its next tick.
    fail: Option<&'static str>,
    b_flag: bool,
    a_relevant: bool,
}

impl World {
    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn events(&self, event: &str, name: &str) -> usize {
        self.log
            .iter()
            .filter(|entry| {
                let mut parts = entry.split(' ');
                parts.next() == Some(event)
                    && parts
                        .next()
                        .is_some_and(|task| task.split('#').next() == Some(name))
            })
            .count()
    }

    fn index_of(&self, entry_prefix: &str) -> usize {
        self.log
            .iter()
            .position(|entry| entry.starts_with(entry_prefix))
            .unwrap_or_else(|| panic!("{entry_prefix} not found in {:?}", self.log))
    }
}

/// Leaf or intermediate node; delegates to `want_leaf` when `delegate` is set.
struct Node {
    name: &'static str,
    id: u32,
    delegate: bool,
}

impl Node {
    fn new(world: &mut World, name: &'static str, delegate: bool) -> Self {
        Self {
            name,
            id: world.id(),
            delegate,
        }
    }
}

impl Task<World> for Node {
    fn on_start(&mut self, world: &mut World, _control: &mut TaskControl) {
        world.log.push(format!("start {}#{}", self.name, self.id));
    }

    fn on_tick(&mut self, world: &mut World, _control: &mut TaskControl) -> Option<BoxedTask<World>> {
        world.log.push(format!("tick {}#{}", self.name, self.id));
        if !self.delegate {
            return None;
        }
        let leaf = world.want_leaf?;
        Some(Box::new(Node::new(world, leaf, false)))
    }

    fn on_stop(&mut self, world: &mut World, _interrupting: Option<&dyn Task<World>>) {
        world.log.push(format!("stop {}#{}", self.name, self.id));
    }

    fn is_equal(&self, other: &dyn Task<World>) -> bool {
        other
            .downcast_ref::<Node>()
            .is_some_and(|other| other.name == self.name)
    }

    fn debug_label(&self) -> String {
        self.name.to_string()
    }

    fn force_continuation(&self) -> Option<&dyn ForceContinuation<World>> {
        Some(self)
    }
}

impl ForceContinuation<World> for Node {
    fn should_force(&self, world: &World, _candidate: Option<&dyn Task<World>>) -> bool {
        world.force && self.name == "atomic"
    }
}

/// Root task picking its child from `World::want`.
struct Chooser {
    name: &'static str,
    id: u32,
}

impl Task<World> for Chooser {
    fn on_start(&mut self, world: &mut World, _control: &mut TaskControl) {
        world.log.push(format!("start {}#{}", self.name, self.id));
    }

    fn on_tick(&mut self, world: &mut World, control: &mut TaskControl) -> Option<BoxedTask<World>> {
        if world.fail == Some(self.name) {
            control.fail("gave up");
            return None;
        }
        control.set_debug_state(world.want.unwrap_or("nothing"));
        let child = world.want?;
        Some(Box::new(Node::new(world, child, true)))
    }

    fn on_stop(&mut self, world: &mut World, _interrupting: Option<&dyn Task<World>>) {
        world.log.push(format!("stop {}#{}", self.name, self.id));
    }

    fn is_equal(&self, other: &dyn Task<World>) -> bool {
        other
            .downcast_ref::<Chooser>()
            .is_some_and(|other| other.name == self.name)
    }

    fn debug_label(&self) -> String {
        self.name.to_string()
    }
}

fn chooser_chain(world: &mut World, name: &'static str, priority: f32) -> SingleTaskChain<World> {
    let id = world.id();
    let mut chain = SingleTaskChain::new(name, priority);
    chain.run_task(world, Chooser { name, id });
    chain
}

/// Checks that every task instance alternates start/stop, starting with start.
fn assert_paired(log: &[String], require_balanced: bool) {
    let mut open: BTreeMap<&str, bool> = BTreeMap::new();
    for entry in log {
        let (event, task) = entry.split_once(' ').expect("malformed entry");
        match event {
            "start" => {
                let was_open = open.insert(task, true).unwrap_or(false);
                assert!(!was_open, "{task} started twice without stop: {log:?}");
            }
            "stop" => {
                let was_open = open.insert(task, false).unwrap_or(false);
                assert!(was_open, "{task} stopped without start: {log:?}");
            }
            "tick" => {
                assert_eq!(open.get(task), Some(&true), "{task} ticked while not started");
            }
            _ => unreachable!(),
        }
    }
    if require_balanced {
        assert!(
            open.values().all(|is_open| !is_open),
            "unbalanced tasks: {open:?}"
        );
    }
}

fn tick_node(node: &mut TaskNode<World>, world: &mut World, n: u32) {
    let mut trace = TaskTrace::new();
    for _ in 0..n {
        world.tick += 1;
        trace.clear();
        node.tick(world, &mut trace);
    }
}

#[test]
fn start_stop_pairs_hold_across_arbitrary_schedules() {
    let mut world = World::default();
    let mut runner = TaskRunner::new();
    let survival = chooser_chain(&mut world, "survival", 100.0)
        .with_relevance(|world: &World| world.tick % 7 < 2);
    let user = chooser_chain(&mut world, "user", 50.0);
    runner.register(survival);
    runner.register(user);

    let children = [Some("walk"), Some("walk"), Some("dig"), None, Some("atomic")];
    let leaves = [Some("step"), None, Some("swing"), Some("step")];

    for tick in 0..200u32 {
        world.tick = tick;
        world.want = children[(tick as usize * 7 / 3) % children.len()];
        world.want_leaf = leaves[(tick as usize * 5 / 2) % leaves.len()];
        world.force = tick % 11 < 3;
        runner.tick(&mut world);
        assert_paired(&world.log, false);
    }

    runner.disable(&mut world);
    assert_paired(&world.log, true);
}

#[test]
fn equal_child_for_five_ticks_then_none() {
    let mut world = World {
        want: Some("walk"),
        ..Default::default()
    };
    let id = world.id();
    let mut root = TaskNode::new(Chooser { name: "root", id });

    tick_node(&mut root, &mut world, 5);
    assert_eq!(world.events("start", "walk"), 1);
    assert_eq!(world.events("tick", "walk"), 5);
    assert_eq!(world.events("stop", "walk"), 0);

    world.want = None;
    let before = world.log.len();
    tick_node(&mut root, &mut world, 1);

    assert_eq!(world.events("start", "walk"), 1);
    assert_eq!(world.events("stop", "walk"), 1);
    assert!(world.index_of("stop walk") >= before);
}

#[test]
fn vetoing_child_outlasts_three_different_candidates() {
    let mut world = World {
        want: Some("atomic"),
        force: true,
        ..Default::default()
    };
    let id = world.id();
    let mut root = TaskNode::new(Chooser { name: "root", id });
    tick_node(&mut root, &mut world, 1);

    world.want = Some("walk");
    tick_node(&mut root, &mut world, 3);
    assert_eq!(world.events("tick", "atomic"), 4);
    assert_eq!(world.events("start", "walk"), 0);

    world.force = false;
    tick_node(&mut root, &mut world, 1);

    assert_eq!(world.events("stop", "atomic"), 1);
    assert_eq!(world.events("start", "walk"), 1);
    assert!(world.index_of("stop atomic") < world.index_of("start walk"));
}

#[test]
fn veto_deep_in_the_spine_rejects_whole_replacement() {
    let mut world = World {
        want: Some("walk"),
        want_leaf: Some("atomic"),
        force: true,
        ..Default::default()
    };
    let id = world.id();
    let mut root = TaskNode::new(Chooser { name: "root", id });
    tick_node(&mut root, &mut world, 1);

    // The child does not veto, but its own child does
    world.want = Some("dig");
    tick_node(&mut root, &mut world, 2);

    assert_eq!(world.events("stop", "walk"), 0);
    assert_eq!(world.events("start", "dig"), 0);
    assert!(root.this_or_child_satisfies(|task| task.debug_label() == "atomic"));
}

#[test]
fn higher_priority_chain_keeps_control_until_irrelevant() {
    let mut world = World {
        want: Some("walk"),
        a_relevant: true,
        ..Default::default()
    };
    let a = chooser_chain(&mut world, "a", 10.0).with_relevance(|world: &World| world.a_relevant);
    let b = chooser_chain(&mut world, "b", 5.0).with_relevance(|world: &World| world.b_flag);
    let mut runner = TaskRunner::new();
    runner.register(a);
    runner.register(b);

    for _ in 0..3 {
        runner.tick(&mut world);
        assert_eq!(runner.current_chain_name(), Some("a"));
    }

    world.b_flag = true;
    for _ in 0..3 {
        runner.tick(&mut world);
        assert_eq!(runner.current_chain_name(), Some("a"));
    }
    assert_eq!(world.events("start", "b"), 0);

    world.a_relevant = false;
    runner.tick(&mut world);
    assert_eq!(runner.current_chain_name(), Some("b"));
}

#[test]
fn failed_root_hands_control_to_next_chain() {
    let mut world = World {
        want: Some("walk"),
        ..Default::default()
    };
    let hi = chooser_chain(&mut world, "hi", 10.0);
    let lo = chooser_chain(&mut world, "lo", 5.0);
    let mut runner = TaskRunner::new();
    let hi_id = runner.register(hi);
    runner.register(lo);

    runner.tick(&mut world);
    assert_eq!(runner.current_chain_name(), Some("hi"));

    world.fail = Some("hi");
    runner.tick(&mut world);
    assert_eq!(world.events("stop", "hi"), 1);
    assert_eq!(world.events("start", "lo"), 0);

    runner.tick(&mut world);
    assert_eq!(runner.current_chain_name(), Some("lo"));
    assert!(world.index_of("stop hi") < world.index_of("start lo"));

    let hi = runner
        .chain_by_id(hi_id)
        .and_then(|chain| chain.downcast_ref::<SingleTaskChain<World>>())
        .expect("hi registered");
    assert!(!hi.has_task());
    assert_eq!(
        hi.outcome(),
        Some(&TaskOutcome::Failed(TaskFailure {
            task: "hi".to_string(),
            reason: "gave up".to_string(),
        }))
    );
}

#[test]
fn chain_switch_tears_down_to_the_leaf_before_new_root_starts() {
    let mut world = World {
        want: Some("walk"),
        want_leaf: Some("step"),
        ..Default::default()
    };
    let base = chooser_chain(&mut world, "base", 10.0);
    let urgent = chooser_chain(&mut world, "urgent", 90.0).with_relevance(|world: &World| world.b_flag);
    let mut runner = TaskRunner::new();
    runner.register(base);
    runner.register(urgent);

    runner.tick(&mut world);
    assert_eq!(runner.active_spine().len(), 3);

    world.b_flag = true;
    runner.tick(&mut world);

    let urgent_start = world.index_of("start urgent");
    assert!(world.index_of("stop base") < urgent_start);
    assert!(world.index_of("stop walk") < urgent_start);
    assert!(world.index_of("stop step") < urgent_start);
    assert_eq!(
        runner
            .chain::<SingleTaskChain<World>>()
            .and_then(|chain| chain.root())
            .map(|root| root.is_active()),
        Some(false)
    );
}

#[test]
fn status_report_lists_active_spine() {
    let mut world = World {
        want: Some("walk"),
        want_leaf: Some("step"),
        ..Default::default()
    };
    let user = chooser_chain(&mut world, "user", 50.0);
    let mut runner = TaskRunner::new();
    runner.register(user);

    runner.tick(&mut world);

    let report = runner.status_report();
    assert_eq!(report.chain.as_deref(), Some("user"));
    assert_eq!(report.spine, vec!["<user> walk", "<walk> ", "<step> "]);
    assert_eq!(report.to_string(), "user -> <user> walk -> <walk> -> <step>");
}

#[test]
fn equal_tasks_never_restart_across_many_ticks() {
    // Start counter stays at one as long as the requested child is equal
    let mut world = World {
        want: Some("walk"),
        want_leaf: Some("step"),
        ..Default::default()
    };
    let id = world.id();
    let mut root = TaskNode::new(Chooser { name: "root", id });

    tick_node(&mut root, &mut world, 50);

    assert_eq!(world.events("start", "walk"), 1);
    assert_eq!(world.events("start", "step"), 1);
    assert_eq!(world.events("tick", "step"), 50);
    // Each tick still constructs fresh candidates, which are dropped unstarted
    assert!(world.next_id > 50);
}
