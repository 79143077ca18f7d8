//! Benchmarks for the secondary motion pipeline.
//!
//! Run with: cargo bench -p lissom-sway

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use lissom_rig::{Armature, JointSource, Transform};
use lissom_sway::{JointConfig, JointKind, SwayOptions, SwaySystem, ZoneConfig};

const DT: f32 = 1000.0 / 60.0;

/// A character-ish rig: a spine with `strands` hanging chains of
/// `links` joints each.
fn strand_rig(strands: usize, links: usize) -> (Armature, Vec<JointConfig>) {
    let mut arm = Armature::new();
    let hips = arm.add_joint("hips", None, Transform::IDENTITY);
    let chest = arm.add_joint(
        "chest",
        Some(hips),
        Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
    );

    let mut configs = Vec::new();
    for s in 0..strands {
        let angle = s as f32 / strands as f32 * std::f32::consts::TAU;
        let mut parent = arm.add_joint(
            format!("anchor_{s}"),
            Some(chest),
            Transform::from_translation(Vec3::new(angle.cos() * 0.1, 0.2, angle.sin() * 0.1)),
        );
        for l in 0..links {
            let name = format!("strand_{s}_{l}");
            parent = arm.add_joint(
                &name,
                Some(parent),
                Transform::from_translation(Vec3::new(0.0, -0.1, 0.0)),
            );
            configs.push(JointConfig::hair(name));
        }
    }
    (arm, configs)
}

fn bench_setup(c: &mut Criterion) {
    let (mut arm, configs) = strand_rig(6, 5);

    c.bench_function("setup_30_joints", |b| {
        b.iter(|| {
            let mut system = SwaySystem::default();
            system.setup(&mut arm, &configs).unwrap();
            black_box(&system);
        })
    });
}

fn bench_update(c: &mut Criterion) {
    for (strands, links) in [(2, 4), (6, 5), (12, 8)] {
        let (mut arm, configs) = strand_rig(strands, links);
        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system.setup(&mut arm, &configs).unwrap();
        let hips = JointSource::joint(&arm, "hips").unwrap();

        c.bench_function(&format!("update_{}_joints", strands * links), |b| {
            let mut t = 0.0f32;
            b.iter(|| {
                t += DT / 1000.0;
                arm.set_local_position(hips, Vec3::new(t.sin() * 0.2, 0.0, 0.0));
                system.update(&mut arm, black_box(DT)).unwrap();
            })
        });
    }
}

fn bench_update_with_zones(c: &mut Criterion) {
    let (mut arm, mut configs) = strand_rig(6, 5);
    arm.add_joint(
        "skull",
        None,
        Transform::from_translation(Vec3::new(0.0, 0.8, 0.0)),
    );
    for config in &mut configs {
        *config = config.clone().with_zone(ZoneConfig::new("skull", 0.25));
    }
    let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
    system.setup(&mut arm, &configs).unwrap();
    let hips = JointSource::joint(&arm, "hips").unwrap();

    c.bench_function("update_30_joints_with_zones", |b| {
        let mut t = 0.0f32;
        b.iter(|| {
            t += DT / 1000.0;
            arm.set_local_position(hips, Vec3::new(t.sin() * 0.2, 0.0, 0.0));
            system.update(&mut arm, black_box(DT)).unwrap();
        })
    });
}

fn bench_point_joints(c: &mut Criterion) {
    let mut arm = Armature::new();
    let hips = arm.add_joint("hips", None, Transform::IDENTITY);
    let mut configs = Vec::new();
    for i in 0..20 {
        let name = format!("blob_{i}");
        arm.add_joint(
            &name,
            Some(hips),
            Transform::from_translation(Vec3::new(i as f32 * 0.05, 0.3, 0.0)),
        );
        configs.push(JointConfig::new(name, JointKind::Point));
    }
    let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
    system.setup(&mut arm, &configs).unwrap();

    c.bench_function("update_20_point_joints", |b| {
        let mut t = 0.0f32;
        b.iter(|| {
            t += DT / 1000.0;
            arm.set_local_position(hips, Vec3::new(0.0, t.sin() * 0.1, 0.0));
            system.update(&mut arm, black_box(DT)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_setup,
    bench_update,
    bench_update_with_zones,
    bench_point_joints
);
criterion_main!(benches);
