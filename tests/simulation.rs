//! End-to-end simulation behavior: settling, contact persistence, solver
//! invariants, and the scene pipeline driving a full world.

use impulse2d::{collide, Arbiter, Body, SceneConfig, Vec2, World};

const DT: f64 = 1.0 / 60.0;

fn dynamic_box(extents: Vec2, position: Vec2) -> Body {
    let mut body = Body::new();
    body.set_as_box(extents, 1.0);
    body.position = position;
    body
}

fn static_box(extents: Vec2, position: Vec2) -> Body {
    let mut body = Body::new();
    body.set_as_box(extents, f64::INFINITY);
    body.position = position;
    body
}

fn dynamic_circle(diameter: f64, position: Vec2) -> Body {
    let mut body = Body::new();
    body.set_as_circle(Vec2::new(diameter, diameter), 1.0);
    body.position = position;
    body
}

/// Two boxes dropped onto a static platform settle with their bottom faces
/// within the penetration slop of their supports, and stay there.
#[test]
fn stacked_boxes_settle_without_sinking_or_popping() {
    let mut world = World::default();
    world
        .add_body(static_box(Vec2::new(20.0, 1.0), Vec2::new(0.0, -0.5)))
        .unwrap();
    let lower = world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)))
        .unwrap();
    let upper = world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.05, 2.5)))
        .unwrap();

    for _ in 0..600 {
        world.step(DT, None);
    }

    let slop_band = 0.04;
    let lower_y = world.body(lower).position.y;
    let upper_y = world.body(upper).position.y;
    assert!(
        (lower_y - 0.5).abs() < slop_band,
        "lower box rests at {}, expected about 0.5",
        lower_y
    );
    assert!(
        (upper_y - 1.5).abs() < 2.0 * slop_band,
        "upper box rests at {}, expected about 1.5",
        upper_y
    );

    // Settled: the band holds over further steps, with no residual motion
    for _ in 0..120 {
        world.step(DT, None);
    }
    assert!((world.body(lower).position.y - lower_y).abs() < 0.01);
    assert!((world.body(upper).position.y - upper_y).abs() < 0.01);
    assert!(world.body(lower).velocity.magnitude() < 0.05);
    assert!(world.body(upper).velocity.magnitude() < 0.05);
}

/// At a fixed pose, consecutive frames produce identical feature pairs and
/// the accumulated impulses are consumed as next frame's warm start.
#[test]
fn features_are_stable_across_frames() {
    let mut world = World::default();
    world.gravity = Vec2::ZERO;
    let a = world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
        .unwrap();
    let b = world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.0, 0.95)))
        .unwrap();

    let first = collide(world.body(a), world.body(b));
    let second = collide(world.body(a), world.body(b));
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    for (c1, c2) in first.iter().zip(second.iter()) {
        assert_eq!(c1.feature, c2.feature);
    }

    // Run a step so the arbiter accumulates impulses, then freeze the pose
    // and step again: the carried impulses must survive feature matching.
    world.step(DT, None);
    let accumulated: Vec<(impulse2d::FeaturePair, f64, f64)> = world
        .arbiters
        .values()
        .flat_map(|arb| arb.contacts.iter().map(|c| (c.feature, c.pn, c.pt)))
        .collect();
    assert!(!accumulated.is_empty());
    assert!(accumulated.iter().any(|(_, pn, _)| *pn > 0.0));

    for body in &mut world.bodies {
        body.velocity = Vec2::ZERO;
        body.angular_velocity = 0.0;
    }
    let positions: Vec<Vec2> = world.bodies.iter().map(|b| b.position).collect();
    world.step(DT, None);
    for (body, position) in world.bodies.iter().zip(&positions) {
        assert!((body.position - *position).magnitude() < 0.05);
    }
    for arbiter in world.arbiters.values() {
        for contact in &arbiter.contacts {
            assert!(
                accumulated.iter().any(|(feature, _, _)| *feature == contact.feature),
                "contact feature changed between frames"
            );
        }
    }
}

/// Coulomb cone and non-negative normal impulse hold for every contact at
/// the end of every step.
#[test]
fn solver_invariants_hold_while_sliding() {
    let mut world = World::default();
    world
        .add_body(static_box(Vec2::new(40.0, 1.0), Vec2::new(0.0, -0.5)))
        .unwrap();
    let slider = world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(-5.0, 0.49)))
        .unwrap();
    world.body_mut(slider).velocity = Vec2::new(8.0, 0.0);

    let tumbler = world
        .add_body(dynamic_circle(1.0, Vec2::new(3.0, 2.0)))
        .unwrap();
    world.body_mut(tumbler).velocity = Vec2::new(-2.0, -1.0);

    for _ in 0..240 {
        world.step(DT, None);
        for arbiter in world.arbiters.values() {
            for contact in &arbiter.contacts {
                assert!(
                    contact.pn >= 0.0,
                    "normal impulse went negative: {}",
                    contact.pn
                );
                assert!(
                    contact.pt.abs() <= arbiter.friction * contact.pn + 1e-9,
                    "tangent impulse {} outside cone {}",
                    contact.pt,
                    arbiter.friction * contact.pn
                );
            }
        }
    }

    // Friction must actually have slowed the slider
    assert!(world.body(slider).velocity.x < 8.0);
}

/// The concrete two-circle scenario: initial separation -0.4, resolution of
/// the overlap from below one diameter, and a symmetric momentum split for
/// equal masses.
#[test]
fn overlapping_circles_push_apart_symmetrically() {
    let mut world = World::default();
    let lower = world.add_body(dynamic_circle(1.0, Vec2::ZERO)).unwrap();
    let upper = world
        .add_body(dynamic_circle(1.0, Vec2::new(0.0, 0.6)))
        .unwrap();

    let contacts = collide(world.body(lower), world.body(upper));
    assert_eq!(contacts.len(), 1);
    assert!((contacts[0].separation - -0.4).abs() < 1e-9);

    let steps = 240;
    for _ in 0..steps {
        world.step(DT, None);
    }

    // The overlap is fully resolved: never less than one diameter apart
    let distance = (world.body(upper).position - world.body(lower).position).magnitude();
    assert!(
        distance >= 1.0 - 2.0 * Arbiter::ALLOWED_PENETRATION,
        "circles still penetrating at distance {}",
        distance
    );

    // Contact impulses are internal: total momentum matches free fall
    let v_lower = world.body(lower).velocity.y;
    let v_upper = world.body(upper).velocity.y;
    let free_fall = -10.0 * DT * steps as f64;
    assert!(
        ((v_lower + v_upper) / 2.0 - free_fall).abs() < 1e-6,
        "momentum drifted: mean velocity {} vs free fall {}",
        (v_lower + v_upper) / 2.0,
        free_fall
    );

    // Equal masses: the push-apart splits symmetrically about the center
    let deviation_lower = v_lower - free_fall;
    let deviation_upper = v_upper - free_fall;
    assert!(
        (deviation_lower + deviation_upper).abs() < 1e-6,
        "push-apart was not symmetric: {} vs {}",
        deviation_lower,
        deviation_upper
    );
}

/// A static body is bit-for-bit immovable: zero inverse mass and inertia,
/// pose untouched by gravity and piled-on contacts.
#[test]
fn static_body_pose_is_invariant() {
    let mut world = World::default();
    let platform = world
        .add_body(static_box(Vec2::new(4.0, 0.5), Vec2::new(0.0, 0.0)))
        .unwrap();
    for i in 0..5 {
        world
            .add_body(dynamic_box(
                Vec2::new(0.8, 0.8),
                Vec2::new(-1.6 + 0.8 * i as f64, 1.0),
            ))
            .unwrap();
    }

    for _ in 0..300 {
        world.step(DT, None);
    }

    let body = world.body(platform);
    assert_eq!(body.inv_mass, 0.0);
    assert_eq!(body.inv_inertia, 0.0);
    assert_eq!(body.position, Vec2::new(0.0, 0.0));
    assert_eq!(body.rotation, 0.0);
}

/// Mixed shape pile: every pairing resolves without NaNs or runaway energy.
#[test]
fn mixed_shape_pile_stays_finite() {
    let mut world = World::default();
    world
        .add_body(static_box(Vec2::new(30.0, 1.0), Vec2::new(0.0, -0.5)))
        .unwrap();
    world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)))
        .unwrap();
    world
        .add_body(dynamic_circle(1.0, Vec2::new(0.0, 2.5)))
        .unwrap();
    let mut triangle = Body::new();
    triangle.set_as_triangle(Vec2::new(1.5, 1.5), 1.0);
    triangle.position = Vec2::new(1.0, 4.0);
    world.add_body(triangle).unwrap();

    for _ in 0..600 {
        world.step(DT, None);
    }

    for body in &world.bodies {
        assert!(body.position.x.is_finite() && body.position.y.is_finite());
        assert!(body.velocity.magnitude() < 20.0, "runaway velocity");
        // Everything ends up at or above the platform, not through it
        if !body.is_static() {
            assert!(body.position.y > -1.0, "body fell through the ground");
        }
    }
}

/// A scene file drives the same pipeline end to end.
#[test]
fn scene_config_runs_a_full_simulation() {
    let yaml = r#"
gravity: {x: 0.0, y: -10.0}
iterations: 10
bodies:
  - shape: box
    extents: {x: 20.0, y: 1.0}
    position: {x: 0.0, y: -0.5}
  - shape: circle
    extents: {x: 1.0, y: 1.0}
    mass: 1.0
    position: {x: 0.0, y: 4.0}
"#;
    let config: SceneConfig = serde_yaml::from_str(yaml).unwrap();
    let mut world = World::default();
    let handles = config.instantiate(&mut world).unwrap();

    for _ in 0..600 {
        world.step(DT, None);
    }

    // The ball comes to rest on the platform: center at about its radius
    let ball_y = world.body(handles[1]).position.y;
    assert!(
        (ball_y - 0.5).abs() < 0.05,
        "ball rests at {}, expected about 0.5",
        ball_y
    );
}

/// Warm-started impulses let a resting contact reach the same solution with
/// fewer iterations; the accumulators should be carried, not rebuilt.
#[test]
fn resting_contact_accumulates_impulse_across_frames() {
    let mut world = World::default();
    world
        .add_body(static_box(Vec2::new(10.0, 1.0), Vec2::new(0.0, -0.5)))
        .unwrap();
    world
        .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.0, 0.49)))
        .unwrap();

    // Let it reach steady state
    for _ in 0..120 {
        world.step(DT, None);
    }

    let arbiter: &Arbiter = world.arbiters.values().next().expect("resting contact");
    let total_pn: f64 = arbiter.contacts.iter().map(|c| c.pn).sum();
    // At rest the normal impulses must carry the body's weight for one step:
    // m * g * dt = 1 * 10 / 60
    let weight_impulse = 10.0 * DT;
    assert!(
        (total_pn - weight_impulse).abs() < 0.25 * weight_impulse,
        "accumulated normal impulse {} should be near {}",
        total_pn,
        weight_impulse
    );
}
