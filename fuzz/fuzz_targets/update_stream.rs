#![no_main]

use arbitrary::Arbitrary;
use glam::Vec3;
use libfuzzer_sys::fuzz_target;
use lissom_rig::{Armature, JointSource, Transform};
use lissom_sway::{JointConfig, SwayOptions, SwaySystem};

#[derive(Arbitrary, Debug)]
struct Frame {
    dt_ms: f32,
    hips: [i8; 3],
}

fuzz_target!(|frames: Vec<Frame>| {
    let mut arm = Armature::new();
    let hips = arm.add_joint("hips", None, Transform::IDENTITY);
    let a = arm.add_joint(
        "tail_a",
        Some(hips),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.1)),
    );
    arm.add_joint(
        "tail_b",
        Some(a),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.0)),
    );

    let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(100.0));
    let configs = [JointConfig::hair("tail_a"), JointConfig::ponytail("tail_b")];
    system.setup(&mut arm, &configs).unwrap();

    // arbitrary frame deltas and hip motion should never panic the stepper
    for frame in frames {
        let target = Vec3::new(
            frame.hips[0] as f32 * 0.05,
            frame.hips[1] as f32 * 0.05,
            frame.hips[2] as f32 * 0.05,
        );
        arm.set_local_position(hips, target);
        let _ = system.update(&mut arm, frame.dt_ms);
    }
});
