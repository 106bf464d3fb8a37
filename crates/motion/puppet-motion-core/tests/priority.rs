use std::sync::Arc;

use puppet_motion_core::{
    config::MotionConfig,
    data::MotionClip,
    manager::{MotionManager, Priority},
    model::ParameterTable,
    queue::Motion,
    raw::RawClip,
};

fn ramp() -> Motion {
    let raw: RawClip = puppet_motion_fixtures::clips::load("linear-ramp").expect("load fixture");
    let clip = Arc::new(MotionClip::from_raw(raw).expect("valid clip"));
    Motion::clip(clip, MotionConfig::default().with_fades(0.0, 0.0))
}

#[test]
fn reservation_rules() {
    let mut mgr = MotionManager::default();
    assert!(mgr.reserve_motion(Priority::IDLE));
    // A pending reservation blocks equal priorities.
    assert!(!mgr.reserve_motion(Priority::IDLE));
    assert_eq!(mgr.reserved_priority(), Priority::IDLE);

    mgr.start_motion_priority(ramp(), Priority::IDLE);
    assert_eq!(mgr.reserved_priority(), Priority::NONE);
    assert_eq!(mgr.current_priority(), Priority::IDLE);
    // The playing priority blocks equal priorities too.
    assert!(!mgr.reserve_motion(Priority::IDLE));
    assert!(mgr.reserve_motion(Priority::NORMAL));
}

#[test]
fn force_always_wins() {
    let mut mgr = MotionManager::default();
    assert!(mgr.try_start_motion(ramp(), Priority::FORCE).is_some());
    assert_eq!(mgr.current_priority(), Priority::FORCE);
    assert_eq!(mgr.reserved_priority(), Priority::NONE);
    assert!(mgr.try_start_motion(ramp(), Priority::NORMAL).is_none());
    assert!(mgr.try_start_motion(ramp(), Priority::FORCE).is_some());
}

#[test]
fn higher_priority_preempts_and_priority_resets_when_done() {
    let mut model = ParameterTable::new().with("ParamAngleX", 0.0, -30.0, 30.0);
    let mut mgr = MotionManager::default();

    let idle = mgr.try_start_motion(ramp(), Priority::IDLE).unwrap();
    assert!(mgr.try_start_motion(ramp(), Priority::IDLE).is_none());
    let normal = mgr.try_start_motion(ramp(), Priority::NORMAL).unwrap();
    assert!(mgr.queue().is_entry_finished(idle));
    assert!(!mgr.queue().is_entry_finished(normal));

    mgr.update(&mut model, 0.0);
    assert_eq!(mgr.current_priority(), Priority::NORMAL);
    mgr.update(&mut model, 1.5);
    assert!(mgr.is_finished());
    assert_eq!(mgr.current_priority(), Priority::NONE);

    assert!(mgr.try_start_motion(ramp(), Priority::IDLE).is_some());
}
