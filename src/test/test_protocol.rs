use crate::bgp::{BgpRoute, Extender, NoopExtender, Path, ShortestPathExtender};
use crate::notification::{Collector, DetectNotification, ExportNotification, Notifier};
use crate::protocol::{Context, Detection, Protocol};
use crate::{NodeId, Time};
use pretty_assertions::assert_eq;

fn protocol(detection: Detection, mrai: Time, neighbors: &[NodeId]) -> Protocol {
    let mut p = Protocol::new(detection, mrai);
    for n in neighbors {
        p.add_neighbor(*n);
    }
    p
}

fn notifier() -> (Notifier, Collector) {
    let mut notifier = Notifier::new();
    let collector = Collector::new();
    notifier.subscribe(collector.clone());
    (notifier, collector)
}

#[test]
fn test_sub_path_before() {
    let path = Path::from(vec![0, 1, 3, 2]);
    assert_eq!(path.sub_path_before(1), Path::from(vec![0]));
    assert_eq!(path.sub_path_before(2), Path::from(vec![0, 1, 3]));
    assert_eq!(path.sub_path_before(0), Path::empty());
    assert_eq!(path.sub_path_before(7), path);
    assert_eq!(path.next_hop(), Some(2));
    assert_eq!(path.to_string(), "[0, 1, 3, 2]");

    let collected: Path = path.iter().copied().filter(|n| *n != 1).collect();
    assert_eq!(collected, Path::from(vec![0, 3, 2]));
    assert_eq!(collected.len(), 3);
}

#[test]
fn test_shortest_path_extender() {
    let e = ShortestPathExtender::new(10);
    assert_eq!(e.extend(&BgpRoute::invalid(), 3), BgpRoute::invalid());
    assert_eq!(e.extend(&BgpRoute::self_route(), 3), BgpRoute::with(10, vec![3]));
    assert_eq!(
        e.extend(&BgpRoute::with(-4, vec![0, 1]), 3),
        BgpRoute::with(6, vec![0, 1, 3])
    );
    assert_eq!(
        NoopExtender.extend(&BgpRoute::with(-4, vec![0, 1]), 3),
        BgpRoute::with(-4, vec![0, 1, 3])
    );
}

#[test]
fn test_route_preference() {
    use std::cmp::Ordering::*;
    let invalid = BgpRoute::invalid();
    let own = BgpRoute::self_route();
    let a = BgpRoute::with(5, vec![0, 1]);
    let b = BgpRoute::with(5, vec![0]);
    let c = BgpRoute::with(-100, vec![0]);
    assert_eq!(own.preference_cmp(&a), Greater);
    assert_eq!(c.preference_cmp(&invalid), Greater);
    assert_eq!(a.preference_cmp(&b), Less);
    assert_eq!(a.preference_cmp(&c), Greater);
    assert_eq!(b.preference_cmp(&BgpRoute::with(5, vec![3])), Equal);
    assert!(!invalid.is_valid());
    assert!(own.is_valid() && own.is_self());
}

#[test]
fn test_detection_conditions() {
    let learned = BgpRoute::with(5, vec![0, 3, 1, 2]);
    let same_prefix = BgpRoute::with(0, vec![0, 3]);
    let other_prefix = BgpRoute::with(0, vec![0]);

    assert!(!Detection::None.is_recurrent(1, &learned, &same_prefix));

    assert!(Detection::Weak.is_recurrent(1, &learned, &same_prefix));
    assert!(Detection::Weak.is_recurrent(1, &learned, &other_prefix));
    assert!(!Detection::Weak.is_recurrent(1, &learned, &BgpRoute::with(5, vec![0, 3])));

    assert!(Detection::Strong.is_recurrent(1, &learned, &same_prefix));
    assert!(!Detection::Strong.is_recurrent(1, &learned, &other_prefix));
    assert!(!Detection::Strong.is_recurrent(1, &learned, &BgpRoute::with(5, vec![0, 3])));
}

#[test]
fn test_start_exports_self_route() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Weak, 0, &[0]);
    let mut ctx = Context::new(0, &mut notifier);
    p.start(0, &mut ctx);
    assert_eq!(ctx.exported(), Some(&BgpRoute::self_route()));
    assert_eq!(ctx.timer(), None);
    assert_eq!(p.selected_route(), &BgpRoute::self_route());
    assert_eq!(p.selected_neighbor(), Some(0));
    assert_eq!(
        collector.exports(),
        vec![ExportNotification {
            node: 0,
            route: BgpRoute::self_route()
        }]
    );
}

#[test]
fn test_receive_and_export() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Weak, 0, &[1, 0, 2]);

    let mut ctx = Context::new(1, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    assert_eq!(ctx.exported(), Some(&BgpRoute::with(0, vec![0])));
    assert_eq!(p.selected_neighbor(), Some(0));

    // worse route, nothing is exported
    let mut ctx = Context::new(2, &mut notifier);
    p.on_receive(1, 2, &BgpRoute::with(0, vec![0]), &ShortestPathExtender::new(-1), &mut ctx);
    assert_eq!(ctx.exported(), None);
    assert_eq!(p.table().get(2), &BgpRoute::with(-1, vec![0, 2]));

    // the same route again
    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    assert_eq!(ctx.exported(), None);

    assert_eq!(collector.exports().len(), 1);
}

#[test]
fn test_bgp_withdraws_looping_route() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::None, 0, &[1, 0, 2]);

    let mut ctx = Context::new(1, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    let mut ctx = Context::new(2, &mut notifier);
    p.on_receive(1, 2, &BgpRoute::with(0, vec![0]), &ShortestPathExtender::new(1), &mut ctx);
    assert_eq!(p.selected_neighbor(), Some(2));

    // route via 2 now loops over 1
    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(5, vec![0, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    assert_eq!(ctx.exported(), Some(&BgpRoute::with(0, vec![0])));
    assert_eq!(p.table().get(2), &BgpRoute::invalid());
    assert!(p.is_enabled(2));
    assert_eq!(p.selected_neighbor(), Some(0));
    assert!(collector.detections().is_empty());
}

#[test]
fn test_ssbgp_disables_recurrent_loop() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Weak, 0, &[1, 0, 2]);

    let mut ctx = Context::new(1, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);

    let mut ctx = Context::new(2, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(1, vec![0, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    // the selection did not change
    assert_eq!(ctx.exported(), None);
    assert!(!p.is_enabled(2));
    assert_eq!(p.table().get(2), &BgpRoute::invalid());
    assert_eq!(
        collector.detections(),
        vec![DetectNotification {
            node: 1,
            route: BgpRoute::with(2, vec![0, 1, 3, 2]),
            alternative_route: BgpRoute::with(0, vec![0]),
            disabled_neighbor: 2,
        }]
    );

    // a second loop from the disabled neighbor is ignored
    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(4, vec![0, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    assert_eq!(collector.detections().len(), 1);

    // valid routes are stored, but the neighbor stays disabled
    let mut ctx = Context::new(4, &mut notifier);
    p.on_receive(1, 2, &BgpRoute::with(4, vec![0, 3]), &ShortestPathExtender::new(1), &mut ctx);
    assert_eq!(ctx.exported(), None);
    assert!(!p.is_enabled(2));
    assert_eq!(p.table().get(2), &BgpRoute::with(5, vec![0, 3, 2]));
    assert_eq!(p.selected_neighbor(), Some(0));

    // enabling the neighbor selects the stored route, exported with the next event
    assert!(p.enable_neighbor(2));
    assert_eq!(p.selected_neighbor(), Some(2));
    let mut ctx = Context::new(5, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    assert_eq!(ctx.exported(), Some(&BgpRoute::with(5, vec![0, 3, 2])));
}

#[test]
fn test_ssbgp_loop_via_selected_neighbor() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Weak, 0, &[1, 0, 2]);

    let mut ctx = Context::new(1, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    let mut ctx = Context::new(2, &mut notifier);
    p.on_receive(1, 2, &BgpRoute::with(0, vec![0]), &ShortestPathExtender::new(1), &mut ctx);
    assert_eq!(p.selected_neighbor(), Some(2));

    // not recurrent: the looping route is not preferred over the alternative
    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(-5, vec![0, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    assert_eq!(ctx.exported(), Some(&BgpRoute::with(0, vec![0])));
    assert!(p.is_enabled(2));
    assert!(collector.detections().is_empty());
}

#[test]
fn test_issbgp_requires_same_path() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Strong, 0, &[1, 0, 2]);

    let mut ctx = Context::new(1, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);

    // the loop starts with a different prefix than the alternative route
    let mut ctx = Context::new(2, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(1, vec![5, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    assert!(p.is_enabled(2));
    assert!(collector.detections().is_empty());

    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(
        1,
        2,
        &BgpRoute::with(1, vec![0, 1, 3]),
        &ShortestPathExtender::new(1),
        &mut ctx,
    );
    assert!(!p.is_enabled(2));
    assert_eq!(collector.detections().len(), 1);
}

#[test]
fn test_mrai() {
    let (mut notifier, collector) = notifier();
    let mut p = protocol(Detection::Weak, 10, &[1, 0, 2]);

    let mut ctx = Context::new(0, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    assert_eq!(ctx.exported(), Some(&BgpRoute::with(0, vec![0])));
    assert_eq!(ctx.timer(), Some(10));
    assert!(p.is_mrai_running(0));
    assert!(p.is_mrai_running(9));
    assert!(!p.is_mrai_running(10));

    // new selection while the timer is running
    let mut ctx = Context::new(3, &mut notifier);
    p.on_receive(1, 2, &BgpRoute::with(4, vec![0, 5]), &ShortestPathExtender::new(1), &mut ctx);
    assert_eq!(p.selected_route(), &BgpRoute::with(5, vec![0, 5, 2]));
    assert_eq!(ctx.finish(), (None, None));

    let mut ctx = Context::new(10, &mut notifier);
    p.on_mrai_expired(1, &mut ctx);
    assert_eq!(
        ctx.finish(),
        (Some(BgpRoute::with(5, vec![0, 5, 2])), Some(10))
    );

    // nothing changed since the last export
    let mut ctx = Context::new(20, &mut notifier);
    p.on_mrai_expired(1, &mut ctx);
    assert_eq!(ctx.finish(), (None, None));
    assert!(!p.is_mrai_running(20));

    assert_eq!(collector.exports().len(), 2);
}

#[test]
fn test_reset() {
    let (mut notifier, _) = notifier();
    let mut p = protocol(Detection::Weak, 10, &[1, 0, 2]);

    let mut ctx = Context::new(0, &mut notifier);
    p.on_receive(1, 0, &BgpRoute::self_route(), &ShortestPathExtender::new(0), &mut ctx);
    p.disable_neighbor(2);

    p.reset();
    assert_eq!(p.selected_route(), &BgpRoute::invalid());
    assert_eq!(p.selected_neighbor(), None);
    assert_eq!(p.last_exported(), &BgpRoute::invalid());
    assert!(p.is_enabled(2));
    assert!(!p.is_mrai_running(0));
    assert_eq!(p.table().len(), 3);
    assert_eq!(p.mrai(), 10);
    assert_eq!(p.detection(), Detection::Weak);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "admits a route containing itself")]
fn test_admit_looping_route_panics() {
    let mut p = protocol(Detection::Weak, 0, &[0, 2]);
    let (mut notifier, _) = notifier();
    let mut ctx = Context::new(0, &mut notifier);
    p.admit(1, 2, BgpRoute::with(3, vec![0, 1, 2]), &mut ctx);
}
