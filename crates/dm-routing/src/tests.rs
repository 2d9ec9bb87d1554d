//! Unit tests for dm-routing.
//!
//! Agents are driven directly with recording fakes for the communication
//! substrate; the `mesh` tests wire several agents through a small in-test
//! dispatcher.

use std::collections::VecDeque;

use dm_comm::{CommunicationApi, Role};
use dm_core::{AgentId, AgentRng, PackageId, Point, Tick};
use dm_spatial::{EuclideanRoad, RoadModel};

use crate::{Ant, Hop, InverseCost, Package, PackageAgent, Path, RoutingConfig, RoutingContext};

// ── Helpers ───────────────────────────────────────────────────────────────────

static ROAD: EuclideanRoad = EuclideanRoad;
static POLICY: InverseCost = InverseCost { deposit: 1.0, reference_cost: 1_000.0 };

fn ctx() -> RoutingContext<'static> {
    RoutingContext::new(Tick(0), 0, 1_000, &ROAD, &POLICY)
}

fn hop(id: u32) -> Hop {
    Hop::new(AgentId(id), Point::new(id as f64 * 100.0, 0.0))
}

fn path(ids: &[u32]) -> Path {
    Path::from_hops(ids.iter().map(|&i| hop(i)))
}

fn ids(p: &Path) -> Vec<u32> {
    p.agents().map(|a| a.0).collect()
}

/// Road model that never connects anything.
struct Disconnected;

impl RoadModel for Disconnected {
    fn distance(&self, _from: Point, _to: Point) -> Option<f64> {
        None
    }
}

/// Captures everything an agent emits.
struct Recorder {
    sender:     AgentId,
    sent:       Vec<(AgentId, Ant)>,
    broadcasts: Vec<(Ant, Role)>,
}

impl Recorder {
    fn new(sender: u32) -> Self {
        Self { sender: AgentId(sender), sent: Vec::new(), broadcasts: Vec::new() }
    }
}

impl CommunicationApi<Ant> for Recorder {
    fn sender(&self) -> AgentId {
        self.sender
    }

    fn send(&mut self, to: AgentId, message: Ant) {
        self.sent.push((to, message));
    }

    fn broadcast(&mut self, message: Ant, role: Role) {
        self.broadcasts.push((message, role));
    }
}

fn package(id: u32) -> Package {
    Package::new(
        PackageId(id),
        Point::new(id as f64 * 100.0, 0.0),
        Point::new(1_000.0, 0.0),
    )
}

/// Agent `id` whose destination endpoint is `100 + id`.
fn agent(id: u32, config: RoutingConfig) -> (PackageAgent, Package) {
    let pkg = package(id);
    let agent = PackageAgent::new(AgentId(id), AgentId(100 + id), &pkg, config, AgentRng::new(7, AgentId(id)));
    (agent, pkg)
}

/// Teach `agent` a one-hop route via each of `neighbours`.
fn teach(agent: &mut PackageAgent, pkg: &Package, neighbours: &[u32]) {
    let mut rec = Recorder::new(agent.id().0);
    for &n in neighbours {
        let ant = crate::FeasibilityAnt { path: path(&[n]), hops_left: 1 };
        agent.receive(AgentId(n), ant.into(), pkg, &ctx(), &mut rec);
    }
    assert!(rec.broadcasts.is_empty());
}

// ── Path ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn extension_is_non_destructive() {
        let p = path(&[1, 2]);
        let q = p.extended(hop(3));
        let r = p.prepended(hop(0));
        assert_eq!(ids(&p), vec![1, 2]);
        assert_eq!(ids(&q), vec![1, 2, 3]);
        assert_eq!(ids(&r), vec![0, 1, 2]);
    }

    #[test]
    fn remove_last_splits_off_tail() {
        let p = path(&[1, 2, 3]);
        let (rest, last) = p.remove_last().unwrap();
        assert_eq!(ids(&rest), vec![1, 2]);
        assert_eq!(last.agent, AgentId(3));
        assert_eq!(p.len(), 3);
        assert!(Path::empty().remove_last().is_none());
    }

    #[test]
    fn reversed_and_loops() {
        assert_eq!(ids(&path(&[1, 2, 3]).reversed()), vec![3, 2, 1]);
        assert!(path(&[1, 2, 3]).is_loop_free());
        assert!(!path(&[1, 2, 1]).is_loop_free());
        assert!(Path::empty().is_loop_free());
    }

    #[test]
    fn display_lists_raw_ids() {
        assert_eq!(path(&[4, 7]).to_string(), "[4 -> 7]");
        assert_eq!(Path::default().to_string(), "[]");
    }

    proptest! {
        #[test]
        fn contains_iff_present(hops in prop::collection::vec(0u32..20, 0..12), probe in 0u32..20) {
            let p = path(&hops);
            prop_assert_eq!(p.contains(AgentId(probe)), hops.contains(&probe));
        }

        #[test]
        fn extension_keeps_membership(hops in prop::collection::vec(0u32..20, 0..12), extra in 0u32..20) {
            let p = path(&hops);
            let q = p.extended(hop(extra));
            prop_assert!(q.contains(AgentId(extra)));
            for &h in &hops {
                prop_assert!(q.contains(AgentId(h)));
            }
            prop_assert_eq!(q.len(), p.len() + 1);
        }
    }
}

// ── PathTable ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path_table {
    use proptest::prelude::*;

    use super::*;
    use crate::PathTable;

    #[test]
    fn add_path_is_idempotent() {
        let mut t = PathTable::new(0.9, 1.0);
        assert!(t.add_path(path(&[3])));
        assert!(!t.add_path(path(&[3])));
        assert!(!t.add_path(path(&[3, 4])));
        assert_eq!(t.len(), 1);
        assert_eq!(t.intensity(AgentId(3)), Some(1.0));
        assert_eq!(ids(&t.get(AgentId(3)).unwrap().path), vec![3]);
    }

    #[test]
    fn empty_path_not_stored() {
        let mut t = PathTable::new(0.9, 1.0);
        assert!(!t.add_path(Path::empty()));
        assert!(t.is_empty());
    }

    #[test]
    fn evaporation_floors_at_zero() {
        let mut t = PathTable::new(0.5, 1.0);
        t.add_path(path(&[1]));
        for _ in 0..2_000 {
            t.evaporate();
        }
        let i = t.intensity(AgentId(1)).unwrap();
        assert!(i >= 0.0);
        assert_eq!(t.len(), 1, "entries are never removed");
    }

    #[test]
    fn update_creates_missing_entry() {
        let mut t = PathTable::new(0.9, 1.0);
        let eval = path(&[2, 5]);
        let reward = t.update_pheromones(&eval, Point::new(500.0, 0.0), &ROAD, &POLICY).unwrap();
        assert!((reward - 1.0).abs() < 1e-12, "path ends on the delivery point");
        assert!((t.intensity(AgentId(2)).unwrap() - 2.0).abs() < 1e-12);
        assert!((t.total_intensity() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn update_keeps_stored_path() {
        let mut t = PathTable::new(0.9, 1.0);
        t.add_path(path(&[2]));
        t.update_pheromones(&path(&[2, 6]), Point::new(0.0, 0.0), &ROAD, &POLICY);
        assert_eq!(ids(&t.get(AgentId(2)).unwrap().path), vec![2]);
        assert!(t.intensity(AgentId(2)).unwrap() > 1.0);
    }

    #[test]
    fn uncostable_path_is_not_reinforced() {
        let mut t = PathTable::new(0.9, 1.0);
        t.add_path(path(&[2]));
        assert!(t.update_pheromones(&path(&[2]), Point::new(0.0, 0.0), &Disconnected, &POLICY).is_none());
        assert!(t.update_pheromones(&Path::empty(), Point::new(0.0, 0.0), &ROAD, &POLICY).is_none());
        assert_eq!(t.intensity(AgentId(2)), Some(1.0));
    }

    #[test]
    fn empty_or_zero_table_chooses_nothing() {
        let mut rng = AgentRng::new(1, AgentId(0));
        let mut t = PathTable::new(0.9, 0.0);
        assert!(t.choose_path(&mut rng).is_none());
        t.add_path(path(&[1]));
        t.add_path(path(&[2]));
        assert!(t.choose_path(&mut rng).is_none());
    }

    #[test]
    fn choice_is_reproducible() {
        let mut t = PathTable::new(0.9, 1.0);
        for i in 1..6 {
            t.add_path(path(&[i]));
        }
        let draw = |seed| {
            let mut rng = AgentRng::new(seed, AgentId(0));
            (0..20).map(|_| t.choose_path(&mut rng).unwrap().first().unwrap().agent).collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn choice_follows_intensity() {
        let mut t = PathTable::new(0.9, 1.0);
        t.add_path(path(&[1]));
        t.add_path(path(&[2]));
        let heavy = InverseCost::new(1_000.0, 1_000.0);
        t.update_pheromones(&path(&[2]), hop(2).position, &ROAD, &heavy);

        let mut rng = AgentRng::new(3, AgentId(0));
        let via_2 = (0..200)
            .filter(|_| t.choose_path(&mut rng).unwrap().first().unwrap().agent == AgentId(2))
            .count();
        assert!(via_2 > 180, "heavy route chosen {via_2}/200 times");
    }

    proptest! {
        #[test]
        fn evaporation_composes(d in 0.01f64..0.99, n in 0u32..50, base in 0.1f64..10.0) {
            let mut t = PathTable::new(d, base);
            t.add_path(path(&[1]));
            for _ in 0..n {
                t.evaporate();
            }
            let expected = base * d.powi(n as i32);
            let got = t.intensity(AgentId(1)).unwrap();
            prop_assert!(got >= 0.0);
            prop_assert!((got - expected).abs() <= 1e-9 * base.max(1.0));
        }

        #[test]
        fn cheaper_paths_earn_more(c1 in 0.0f64..10_000.0, delta in 0.001f64..10_000.0) {
            let delivery = Point::new(0.0, 0.0);
            let near = Path::single(Hop::new(AgentId(1), Point::new(c1, 0.0)));
            let far = Path::single(Hop::new(AgentId(1), Point::new(c1 + delta, 0.0)));

            let mut a = PathTable::new(0.9, 1.0);
            let mut b = PathTable::new(0.9, 1.0);
            let ra = a.update_pheromones(&near, delivery, &ROAD, &POLICY).unwrap();
            let rb = b.update_pheromones(&far, delivery, &ROAD, &POLICY).unwrap();
            prop_assert!(ra > rb);
            prop_assert!(a.intensity(AgentId(1)).unwrap() > b.intensity(AgentId(1)).unwrap());
        }
    }
}

// ── Ants ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ant {
    use proptest::prelude::*;

    use super::*;
    use crate::{AntKind, FeasibilityAnt, ForwardAnt};

    #[test]
    fn feasibility_relay_spends_budget() {
        let ant = FeasibilityAnt::originate(hop(1), 2);
        assert_eq!(ids(&ant.path), vec![1]);
        let relay = ant.relayed(hop(2)).unwrap();
        assert_eq!(ids(&relay.path), vec![1, 2]);
        assert_eq!(relay.hops_left, 1);
        assert!(relay.relayed(hop(3)).is_none());
        assert!(FeasibilityAnt::originate(hop(1), 0).relayed(hop(2)).is_none());
    }

    #[test]
    fn turn_back_on_empty_path_returns_to_origin() {
        let ant = ForwardAnt::launch(AgentId(50), 3);
        let (to, back) = ant.turn_back(hop(4));
        assert_eq!(to, AgentId(50));
        assert!(back.path_to_do.is_empty());
        assert_eq!(ids(&back.path_to_eval), vec![4]);
        assert!(back.is_home());
    }

    #[test]
    fn turn_back_addresses_last_traveled() {
        let ant = ForwardAnt { origin: AgentId(50), path: path(&[1, 2]), hops_left: 1 };
        let (to, back) = ant.turn_back(hop(3));
        assert_eq!(to, AgentId(2));
        assert_eq!(ids(&back.path_to_do), vec![1, 2]);
        assert!(back.concerns(AgentId(2)));
        assert!(!back.concerns(AgentId(3)));
    }

    #[test]
    fn forwarded_extends_and_decrements() {
        let ant = ForwardAnt::launch(AgentId(50), 3);
        let next = ant.forwarded(hop(1));
        assert_eq!(ids(&next.path), vec![1]);
        assert_eq!(next.hops_left, 2);
        assert!(next.would_loop(AgentId(2), AgentId(1)));
        assert!(next.would_loop(AgentId(2), AgentId(2)));
        assert!(!next.would_loop(AgentId(2), AgentId(3)));
    }

    #[test]
    fn kind_discriminant() {
        let f: Ant = FeasibilityAnt::originate(hop(1), 1).into();
        let g: Ant = ForwardAnt::launch(AgentId(1), 1).into();
        assert_eq!(f.kind(), AntKind::Feasibility);
        assert_eq!(g.kind().to_string(), "forward");
    }

    proptest! {
        #[test]
        fn retrace_terminates(n in 0usize..16) {
            let traveled = Path::from_hops((0..n as u32).map(hop));
            let fwd = ForwardAnt { origin: AgentId(99), path: traveled, hops_left: 0 };
            let (mut to, mut back) = fwd.turn_back(hop(98));

            let mut steps = 0;
            while !back.is_home() {
                prop_assert!(back.concerns(to));
                let before = back.path_to_do.len();
                let (next_to, next) = back.retraced(Hop::new(to, Point::new(0.0, 0.0))).unwrap();
                prop_assert_eq!(next.path_to_do.len(), before - 1);
                to = next_to;
                back = next;
                steps += 1;
                prop_assert!(steps <= n);
            }
            prop_assert_eq!(steps, n);
            prop_assert_eq!(to, AgentId(99));
            prop_assert_eq!(back.path_to_eval.len(), n + 1);
            prop_assert!(back.path_to_eval.is_loop_free());
        }
    }
}

// ── Package ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod package {
    use super::*;
    use crate::{PackageState, RoutingError};

    #[test]
    fn happy_path() {
        let mut p = package(1);
        assert!(p.needs_pickup());
        p.pickup().unwrap();
        assert!(p.is_picked_up());
        p.deliver().unwrap();
        assert!(p.is_delivered());
    }

    #[test]
    fn invalid_transitions_rejected() {
        let mut p = package(1);
        assert!(matches!(
            p.deliver(),
            Err(RoutingError::InvalidTransition { from: PackageState::NeedsPickup, .. })
        ));
        assert!(p.drop_at(Point::new(0.0, 0.0)).is_err());
        p.pickup().unwrap();
        assert!(p.pickup().is_err());
        p.deliver().unwrap();
        assert!(p.pickup().is_err());
        assert!(p.deliver().is_err());
        assert_eq!(p.state(), PackageState::Delivered);
    }

    #[test]
    fn drop_moves_pickup() {
        let mut p = package(1);
        p.pickup().unwrap();
        p.drop_at(Point::new(5.0, 5.0)).unwrap();
        assert!(p.needs_pickup());
        assert_eq!(p.pickup_location(), Point::new(5.0, 5.0));
        assert_eq!(p.delivery_location(), Point::new(1_000.0, 0.0));
    }
}

// ── PackageAgent ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use super::*;
    use crate::{BackwardAnt, FeasibilityAnt, ForwardAnt};

    fn config(interval: u32, hops: u32) -> RoutingConfig {
        RoutingConfig { feasibility_interval: interval, max_feasibility_hops: hops, ..RoutingConfig::default() }
    }

    #[test]
    fn feasibility_waves_follow_countdown() {
        let (mut a, pkg) = agent(1, config(2, 3));
        let mut waves = Vec::new();
        for t in 0..7 {
            let mut rec = Recorder::new(1);
            a.tick(&pkg, &ctx(), &mut rec);
            if !rec.broadcasts.is_empty() {
                waves.push(t);
            }
        }
        assert_eq!(waves, vec![0, 3, 6]);
    }

    #[test]
    fn wave_probes_destinations_from_self() {
        let (mut a, pkg) = agent(1, config(5, 3));
        let mut rec = Recorder::new(1);
        a.tick(&pkg, &ctx(), &mut rec);
        let (ant, role) = &rec.broadcasts[0];
        assert_eq!(*role, Role::PackageDestination);
        let Ant::Feasibility(f) = ant else { panic!("expected feasibility ant") };
        assert_eq!(ids(&f.path), vec![1]);
        assert_eq!(f.hops_left, 3);
    }

    #[test]
    fn zero_budget_never_broadcasts() {
        let (mut a, pkg) = agent(1, config(0, 0));
        let mut rec = Recorder::new(1);
        for _ in 0..5 {
            a.tick(&pkg, &ctx(), &mut rec);
        }
        assert!(rec.broadcasts.is_empty());
    }

    #[test]
    fn begin_tick_evaporates_and_tick_does_not() {
        let cfg = RoutingConfig { evaporation: 0.5, ..config(100, 3) };
        let (mut a, pkg) = agent(1, cfg);
        teach(&mut a, &pkg, &[2]);
        a.begin_tick(&pkg);
        assert_eq!(a.path_table().intensity(AgentId(2)), Some(0.5));
        a.tick(&pkg, &ctx(), &mut Recorder::new(1));
        assert_eq!(a.path_table().intensity(AgentId(2)), Some(0.5));
    }

    #[test]
    fn feasibility_learns_reversed_and_relays() {
        let (mut a, pkg) = agent(3, config(5, 3));
        let mut rec = Recorder::new(3);
        let ant = FeasibilityAnt { path: path(&[1, 2]), hops_left: 2 };
        a.receive(AgentId(102), ant.into(), &pkg, &ctx(), &mut rec);

        let entry = a.path_table().get(AgentId(2)).unwrap();
        assert_eq!(ids(&entry.path), vec![2, 1]);

        assert_eq!(rec.broadcasts.len(), 1);
        let Ant::Feasibility(relay) = &rec.broadcasts[0].0 else { panic!("expected relay") };
        assert_eq!(ids(&relay.path), vec![1, 2, 3]);
        assert_eq!(relay.hops_left, 1);
    }

    #[test]
    fn last_hop_learns_without_relaying() {
        let (mut a, pkg) = agent(3, config(5, 3));
        let mut rec = Recorder::new(3);
        let ant = FeasibilityAnt { path: path(&[1]), hops_left: 1 };
        a.receive(AgentId(101), ant.into(), &pkg, &ctx(), &mut rec);
        assert_eq!(a.path_table().len(), 1);
        assert!(rec.broadcasts.is_empty());
    }

    #[test]
    fn feasibility_loop_is_dropped() {
        let (mut a, pkg) = agent(3, config(5, 3));
        let mut rec = Recorder::new(3);
        let ant = FeasibilityAnt { path: path(&[3, 1]), hops_left: 5 };
        a.receive(AgentId(101), ant.into(), &pkg, &ctx(), &mut rec);
        assert!(a.path_table().is_empty());
        assert!(rec.broadcasts.is_empty());
    }

    #[test]
    fn repeated_feasibility_keeps_intensity() {
        let (mut a, pkg) = agent(3, config(5, 3));
        teach(&mut a, &pkg, &[1]);
        let before = a.path_table().intensity(AgentId(1));
        teach(&mut a, &pkg, &[1]);
        assert_eq!(a.path_table().intensity(AgentId(1)), before);
    }

    #[test]
    fn forward_with_empty_table_turns_back_immediately() {
        let (mut a, pkg) = agent(1, config(5, 3));
        let mut rec = Recorder::new(1);
        a.receive(AgentId(50), ForwardAnt::launch(AgentId(50), 4).into(), &pkg, &ctx(), &mut rec);

        assert_eq!(rec.sent.len(), 1);
        let (to, Ant::BackwardExploration(back)) = &rec.sent[0] else { panic!("expected backward ant") };
        assert_eq!(*to, AgentId(50));
        assert!(back.path_to_do.is_empty());
        assert_eq!(ids(&back.path_to_eval), vec![1]);
    }

    #[test]
    fn forward_follows_table() {
        let (mut a, pkg) = agent(1, config(5, 3));
        teach(&mut a, &pkg, &[2]);
        let mut rec = Recorder::new(1);
        a.receive(AgentId(50), ForwardAnt::launch(AgentId(50), 3).into(), &pkg, &ctx(), &mut rec);

        let (to, Ant::ForwardExploration(fwd)) = &rec.sent[0] else { panic!("expected forward ant") };
        assert_eq!(*to, AgentId(2));
        assert_eq!(ids(&fwd.path), vec![1]);
        assert_eq!(fwd.hops_left, 2);
        assert_eq!(fwd.origin, AgentId(50));
    }

    #[test]
    fn spent_budget_turns_back_despite_routes() {
        let (mut a, pkg) = agent(2, config(5, 3));
        teach(&mut a, &pkg, &[3]);
        let mut rec = Recorder::new(2);
        let ant = ForwardAnt { origin: AgentId(50), path: path(&[1]), hops_left: 1 };
        a.receive(AgentId(1), ant.into(), &pkg, &ctx(), &mut rec);

        let (to, Ant::BackwardExploration(back)) = &rec.sent[0] else { panic!("expected backward ant") };
        assert_eq!(*to, AgentId(1));
        assert_eq!(ids(&back.path_to_do), vec![1]);
        assert_eq!(ids(&back.path_to_eval), vec![2]);
    }

    #[test]
    fn loop_turns_back() {
        let (mut a, pkg) = agent(2, config(5, 3));
        teach(&mut a, &pkg, &[1]);
        let mut rec = Recorder::new(2);
        let ant = ForwardAnt { origin: AgentId(50), path: path(&[1]), hops_left: 5 };
        a.receive(AgentId(1), ant.into(), &pkg, &ctx(), &mut rec);

        assert_eq!(rec.sent.len(), 1);
        assert!(matches!(rec.sent[0], (AgentId(1), Ant::BackwardExploration(_))));
    }

    #[test]
    fn backward_reinforces_and_retraces() {
        let (mut a, pkg) = agent(2, config(5, 3));
        let mut rec = Recorder::new(2);
        let eval = Path::single(Hop::new(AgentId(3), Point::new(900.0, 0.0)));
        let ant = BackwardAnt { origin: AgentId(50), path_to_do: path(&[1, 2]), path_to_eval: eval };
        a.receive(AgentId(3), ant.into(), &pkg, &ctx(), &mut rec);

        // base 1.0 plus 1000 / (1000 + 100)
        let expected = 1.0 + 1_000.0 / 1_100.0;
        assert!((a.path_table().intensity(AgentId(3)).unwrap() - expected).abs() < 1e-9);

        let (to, Ant::BackwardExploration(next)) = &rec.sent[0] else { panic!("expected backward ant") };
        assert_eq!(*to, AgentId(1));
        assert_eq!(ids(&next.path_to_do), vec![1]);
        assert_eq!(ids(&next.path_to_eval), vec![2, 3]);
    }

    #[test]
    fn backward_for_someone_else_is_dropped() {
        let (mut a, pkg) = agent(2, config(5, 3));
        let mut rec = Recorder::new(2);
        let ant = BackwardAnt { origin: AgentId(50), path_to_do: path(&[1]), path_to_eval: path(&[3]) };
        a.receive(AgentId(3), ant.into(), &pkg, &ctx(), &mut rec);
        assert!(rec.sent.is_empty());
        assert!(a.path_table().is_empty());
    }

    #[test]
    fn picked_up_agent_goes_quiet() {
        let cfg = RoutingConfig { evaporation: 0.5, ..config(0, 3) };
        let (mut a, mut pkg) = agent(1, cfg);
        teach(&mut a, &pkg, &[2]);
        pkg.pickup().unwrap();

        let mut rec = Recorder::new(1);
        a.begin_tick(&pkg);
        a.tick(&pkg, &ctx(), &mut rec);
        a.receive(AgentId(50), ForwardAnt::launch(AgentId(50), 4).into(), &pkg, &ctx(), &mut rec);
        teach(&mut a, &pkg, &[3]);

        assert!(!a.is_active());
        assert!(rec.sent.is_empty() && rec.broadcasts.is_empty());
        assert_eq!(a.path_table().intensity(AgentId(2)), Some(1.0), "no evaporation while picked up");
        assert_eq!(a.path_table().len(), 1);
    }

    #[test]
    fn drop_resumes_routing_from_new_spot() {
        let (mut a, mut pkg) = agent(1, config(0, 3));
        pkg.pickup().unwrap();
        a.sync(&pkg);
        pkg.drop_at(Point::new(42.0, 0.0)).unwrap();
        a.sync(&pkg);

        assert!(a.is_active());
        assert_eq!(a.endpoint().position, Point::new(42.0, 0.0));
        let mut rec = Recorder::new(1);
        a.tick(&pkg, &ctx(), &mut rec);
        assert_eq!(rec.broadcasts.len(), 1);
    }

    #[test]
    fn endpoints_follow_config() {
        let cfg = RoutingConfig { broadcast_range: 123.0, reliability: 0.25, ..RoutingConfig::default() };
        let (a, _) = agent(4, cfg);
        let ep = a.endpoint();
        assert_eq!(ep.role, Role::PackageAgent);
        assert_eq!(ep.radius, 123.0);
        assert_eq!(ep.reliability, 0.25);
        let dest = a.destination().endpoint();
        assert_eq!(dest.id, AgentId(104));
        assert_eq!(dest.role, Role::PackageDestination);
        assert_eq!(dest.position, Point::new(1_000.0, 0.0));
        assert_eq!(a.destination().owner, AgentId(4));
    }
}

// ── Explorer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod explorer {
    use super::*;
    use crate::{BackwardAnt, Explorer, FeasibilityAnt};

    #[test]
    fn tick_launches_queued_requests() {
        let mut e = Explorer::new(AgentId(50), Point::new(0.0, 0.0));
        e.request(AgentId(1), 3);
        e.request(AgentId(2), 0);
        assert_eq!(e.pending_requests(), 2);

        let mut rec = Recorder::new(50);
        e.tick(&ctx(), &mut rec);
        assert_eq!(e.pending_requests(), 0);
        assert_eq!(rec.sent.len(), 1, "zero budget discarded");
        let (to, Ant::ForwardExploration(fwd)) = &rec.sent[0] else { panic!("expected forward ant") };
        assert_eq!(*to, AgentId(1));
        assert!(fwd.path.is_empty());
        assert_eq!(fwd.origin, AgentId(50));
    }

    #[test]
    fn records_only_own_completed_ants() {
        let mut e = Explorer::new(AgentId(50), Point::new(0.0, 0.0));
        let home = BackwardAnt { origin: AgentId(50), path_to_do: Path::empty(), path_to_eval: path(&[1, 2]) };
        let foreign = BackwardAnt { origin: AgentId(51), path_to_do: Path::empty(), path_to_eval: path(&[1]) };
        let midway = BackwardAnt { origin: AgentId(50), path_to_do: path(&[1]), path_to_eval: path(&[2]) };

        e.receive(AgentId(1), home.into(), &ctx());
        e.receive(AgentId(1), foreign.into(), &ctx());
        e.receive(AgentId(1), midway.into(), &ctx());
        e.receive(AgentId(1), FeasibilityAnt::originate(hop(1), 1).into(), &ctx());

        assert_eq!(e.routes().len(), 1);
        assert_eq!(ids(&e.routes()[0].path), vec![1, 2]);
        assert_eq!(e.routes()[0].discovered_at, Tick(0));
    }

    #[test]
    fn best_route_prefers_longer_then_newer() {
        let mut e = Explorer::new(AgentId(50), Point::new(0.0, 0.0));
        assert!(e.best_route().is_none());
        for p in [path(&[1]), path(&[1, 2]), path(&[3, 4])] {
            let ant = BackwardAnt { origin: AgentId(50), path_to_do: Path::empty(), path_to_eval: p };
            e.receive(AgentId(1), ant.into(), &ctx());
        }
        assert_eq!(ids(&e.best_route().unwrap().path), vec![3, 4]);
        e.clear_routes();
        assert!(e.routes().is_empty());
    }
}

// ── Mesh ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod mesh {
    use proptest::prelude::*;

    use super::*;
    use crate::{Explorer, ForwardAnt};

    type Queue = VecDeque<(AgentId, AgentId, Ant)>;

    /// Point-to-point only outbox into a shared queue.
    struct Outbox<'a> {
        sender: AgentId,
        queue:  &'a mut Queue,
    }

    impl CommunicationApi<Ant> for Outbox<'_> {
        fn sender(&self) -> AgentId {
            self.sender
        }

        fn send(&mut self, to: AgentId, message: Ant) {
            self.queue.push_back((self.sender, to, message));
        }

        fn broadcast(&mut self, _message: Ant, _role: Role) {
            panic!("exploration never broadcasts");
        }
    }

    const EXPLORER: AgentId = AgentId(999);

    /// `n` agents that all know a one-hop route to each other; one
    /// exploration of budget `hops` launched at agent 0.  Returns the
    /// explorer and the number of messages exchanged.
    fn explore(n: u32, hops: u32, seed: u64) -> Result<(Explorer, usize), TestCaseError> {
        let cfg = RoutingConfig::default();
        let packages: Vec<Package> = (0..n).map(package).collect();
        let mut agents: Vec<PackageAgent> = (0..n)
            .map(|i| {
                let rng = AgentRng::new(seed, AgentId(i));
                PackageAgent::new(AgentId(i), AgentId(100 + i), &packages[i as usize], cfg, rng)
            })
            .collect();
        for i in 0..n {
            let others: Vec<u32> = (0..n).filter(|&j| j != i).collect();
            teach(&mut agents[i as usize], &packages[i as usize], &others);
        }

        let mut explorer = Explorer::new(EXPLORER, Point::new(0.0, 0.0));
        let mut queue = Queue::new();
        queue.push_back((EXPLORER, AgentId(0), ForwardAnt::launch(EXPLORER, hops).into()));

        let mut messages = 0;
        while let Some((from, to, ant)) = queue.pop_front() {
            messages += 1;
            prop_assert!(messages <= 2 * hops as usize + 2, "exploration did not terminate");

            if let Ant::ForwardExploration(fwd) = &ant {
                prop_assert!(!fwd.path.contains(to), "forwarded into a loop");
                prop_assert!(fwd.path.is_loop_free());
                prop_assert!(fwd.path.len() <= hops as usize);
            }

            if to == EXPLORER {
                explorer.receive(from, ant, &ctx());
            } else {
                let i = to.index();
                let mut out = Outbox { sender: to, queue: &mut queue };
                agents[i].receive(from, ant, &packages[i], &ctx(), &mut out);
            }
        }
        Ok((explorer, messages))
    }

    #[test]
    fn two_agents_bounce_back() {
        let (explorer, _) = explore(2, 5, 1).unwrap();
        let route = &explorer.routes()[0];
        assert_eq!(ids(&route.path), vec![0, 1]);
    }

    proptest! {
        #[test]
        fn exploration_is_loop_free_and_terminates(n in 1u32..8, hops in 1u32..8, seed in any::<u64>()) {
            let (explorer, _) = explore(n, hops, seed)?;
            prop_assert_eq!(explorer.routes().len(), 1);
            let route = &explorer.routes()[0].path;
            prop_assert!(route.is_loop_free());
            prop_assert!(route.len() <= hops as usize);
            prop_assert_eq!(route.first().map(|h| h.agent), Some(AgentId(0)));
        }
    }
}

// ── Config & loader ───────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    #[test]
    fn default_is_valid() {
        RoutingConfig::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_rejected() {
        let bad = [
            RoutingConfig { evaporation: 1.0, ..RoutingConfig::default() },
            RoutingConfig { evaporation: 0.0, ..RoutingConfig::default() },
            RoutingConfig { reliability: 1.5, ..RoutingConfig::default() },
            RoutingConfig { broadcast_range: -1.0, ..RoutingConfig::default() },
            RoutingConfig { base_intensity: 0.0, ..RoutingConfig::default() },
            RoutingConfig { deposit: 0.0, ..RoutingConfig::default() },
            RoutingConfig { deposit: f64::INFINITY, ..RoutingConfig::default() },
            RoutingConfig { reference_cost: f64::NAN, ..RoutingConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn policy_halves_at_reference_cost() {
        let p = RoutingConfig::default().policy();
        assert!((p.reward_for_cost(0.0) - 1.0).abs() < 1e-12);
        assert!((p.reward_for_cost(1_000.0) - 0.5).abs() < 1e-12);
    }
}

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::{PackageState, RoutingError, load_packages_reader};

    #[test]
    fn reads_rows_in_order() {
        let csv = "package_id,pickup_x,pickup_y,delivery_x,delivery_y\n\
                   4,0.0,0.0,100.0,0.0\n\
                   2,10.0,5.0,-20.0,7.5\n";
        let pkgs = load_packages_reader(Cursor::new(csv)).unwrap();
        assert_eq!(pkgs.len(), 2);
        assert_eq!(pkgs[0].id, PackageId(4));
        assert_eq!(pkgs[1].pickup_location(), Point::new(10.0, 5.0));
        assert_eq!(pkgs[1].delivery_location(), Point::new(-20.0, 7.5));
        assert!(pkgs.iter().all(|p| p.state() == PackageState::NeedsPickup));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let csv = "package_id,pickup_x,pickup_y,delivery_x,delivery_y\n1,0,0,1,1\n1,2,2,3,3\n";
        assert!(matches!(
            load_packages_reader(Cursor::new(csv)),
            Err(RoutingError::DuplicatePackage(PackageId(1)))
        ));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let csv = "package_id,pickup_x,pickup_y,delivery_x,delivery_y\n1,zero,0,1,1\n";
        assert!(matches!(load_packages_reader(Cursor::new(csv)), Err(RoutingError::Parse(_))));
    }
}
