#![no_main]

use arbitrary::Arbitrary;
use glam::Vec3;
use libfuzzer_sys::fuzz_target;
use lissom_rig::{Armature, Transform};
use lissom_sway::{JointConfig, JointKind, SwaySystem, ZoneConfig};

#[derive(Arbitrary, Debug)]
struct RawConfig {
    joint: u8,
    kind: u8,
    stiffness: [f32; 4],
    damping: f32,
    external_factor: f32,
    limit: Option<(f32, f32)>,
    local_offset: Option<[f32; 3]>,
    world_offset: Option<[f32; 3]>,
    pivot: bool,
    zone: Option<(u8, f32)>,
}

const NAMES: [&str; 6] = ["root", "spine", "tail_a", "tail_b", "tail_c", "marker"];

fn kind(tag: u8) -> JointKind {
    match tag % 5 {
        0 => JointKind::Point,
        1 => JointKind::Link,
        2 => JointKind::MixStretch,
        3 => JointKind::MixTwist,
        _ => JointKind::Full,
    }
}

fn rig() -> Armature {
    let mut arm = Armature::new();
    let root = arm.add_joint("root", None, Transform::IDENTITY);
    let spine = arm.add_joint(
        "spine",
        Some(root),
        Transform::from_translation(Vec3::new(0.0, 0.3, 0.0)),
    );
    let a = arm.add_joint(
        "tail_a",
        Some(spine),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.1)),
    );
    let b = arm.add_joint(
        "tail_b",
        Some(a),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.0)),
    );
    arm.add_joint(
        "tail_c",
        Some(b),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.0)),
    );
    arm.add_joint("marker", Some(spine), Transform::IDENTITY);
    arm
}

fuzz_target!(|raws: Vec<RawConfig>| {
    let mut arm = rig();
    let configs: Vec<JointConfig> = raws
        .iter()
        .map(|raw| {
            let mut config =
                JointConfig::new(NAMES[raw.joint as usize % NAMES.len()], kind(raw.kind))
                    .with_stiffness(raw.stiffness)
                    .with_damping(raw.damping)
                    .with_external_factor(raw.external_factor)
                    .with_pivot(raw.pivot);
            if let Some((min, max)) = raw.limit {
                config = config.with_limit(raw.joint as usize % 4, min, max);
            }
            if let Some(v) = raw.local_offset {
                config = config.with_local_offset(Vec3::from(v));
            }
            if let Some(v) = raw.world_offset {
                config = config.with_world_offset(Vec3::from(v));
            }
            if let Some((obstacle, radius)) = raw.zone {
                config = config
                    .with_zone(ZoneConfig::new(NAMES[obstacle as usize % NAMES.len()], radius));
            }
            config
        })
        .collect();

    // setup should reject bad input with an error, never a panic
    let mut system = SwaySystem::default();
    let _ = system.setup(&mut arm, &configs);
});
