//! Headless scene runner: builds a handful of stacked-shape layouts,
//! switches gravity on, steps each one at a fixed timestep, and prints a
//! settle summary.

use impulse2d::{Body, BodyHandle, Vec2, World, WorldError};

const TIME_STEP: f64 = 1.0 / 60.0;
const SETTLE_STEPS: usize = 600;

fn add_static_box(world: &mut World, extents: Vec2, position: Vec2) -> Result<BodyHandle, WorldError> {
    let mut body = Body::new();
    body.set_as_box(extents, f64::INFINITY);
    body.position = position;
    body.draggable = false;
    world.add_body(body)
}

fn add_box(world: &mut World, extents: Vec2, position: Vec2, mass: f64) -> Result<BodyHandle, WorldError> {
    let mut body = Body::new();
    body.set_as_box(extents, mass);
    body.position = position;
    world.add_body(body)
}

fn add_circle(world: &mut World, diameter: f64, position: Vec2, mass: f64) -> Result<BodyHandle, WorldError> {
    let mut body = Body::new();
    body.set_as_circle(Vec2::new(diameter, diameter), mass);
    body.position = position;
    world.add_body(body)
}

fn add_triangle(world: &mut World, extents: Vec2, position: Vec2, mass: f64) -> Result<BodyHandle, WorldError> {
    let mut body = Body::new();
    body.set_as_triangle(extents, mass);
    body.position = position;
    world.add_body(body)
}

/// Boxes and circles dropped onto a pedestal-supported platform.
fn pedestal_scene(world: &mut World) -> Result<(), WorldError> {
    add_static_box(world, Vec2::new(0.4, 0.4), Vec2::new(0.0, 0.0))?;
    add_box(world, Vec2::new(5.0, 0.5), Vec2::new(0.0, 0.5), 100.0)?;
    add_box(world, Vec2::new(1.0, 1.0), Vec2::new(-1.5, 3.0), 100.0)?;
    add_box(world, Vec2::new(1.0, 1.0), Vec2::new(1.5, 3.0), 100.0)?;
    add_circle(world, 1.0, Vec2::new(-0.5, 5.0), 100.0)?;
    add_circle(world, 1.0, Vec2::new(0.5, 5.0), 100.0)?;
    Ok(())
}

/// Two triangles balanced on a pair of narrow posts.
fn triangle_scene(world: &mut World) -> Result<(), WorldError> {
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(2.0, 0.0))?;
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(-2.0, 0.0))?;
    add_triangle(world, Vec2::new(2.0, 2.0), Vec2::new(-2.0, 3.0), 100.0)?;
    add_triangle(world, Vec2::new(2.0, 2.0), Vec2::new(2.0, 3.0), 100.0)?;
    Ok(())
}

/// Tall columns with circles rolling in between.
fn column_scene(world: &mut World) -> Result<(), WorldError> {
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(0.0, 0.0))?;
    add_box(world, Vec2::new(5.0, 0.5), Vec2::new(0.0, 0.5), 100.0)?;
    add_box(world, Vec2::new(1.0, 5.0), Vec2::new(0.0, 3.5), 100.0)?;
    add_box(world, Vec2::new(1.0, 5.0), Vec2::new(-3.0, 3.5), 100.0)?;
    add_circle(world, 1.0, Vec2::new(-1.5, 6.0), 100.0)?;
    add_circle(world, 1.0, Vec2::new(1.8, 6.0), 100.0)?;
    Ok(())
}

/// Two separate platforms, each catching its own shower of shapes.
fn twin_platform_scene(world: &mut World) -> Result<(), WorldError> {
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(-2.0, 0.0))?;
    add_box(world, Vec2::new(3.0, 0.5), Vec2::new(-2.0, 0.5), 100.0)?;
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(2.0, 0.0))?;
    add_box(world, Vec2::new(3.0, 0.5), Vec2::new(2.0, 0.5), 100.0)?;
    add_box(world, Vec2::new(1.0, 1.0), Vec2::new(2.5, 3.0), 100.0)?;
    add_box(world, Vec2::new(1.0, 1.0), Vec2::new(1.5, 4.0), 100.0)?;
    add_circle(world, 1.0, Vec2::new(-2.0, 3.0), 100.0)?;
    add_circle(world, 1.0, Vec2::new(-2.5, 4.5), 100.0)?;
    Ok(())
}

/// A staircase of planks and a pendulum swinging over it.
fn staircase_scene(world: &mut World) -> Result<(), WorldError> {
    add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(0.0, 0.0))?;
    add_box(world, Vec2::new(10.0, 0.5), Vec2::new(0.0, 0.5), 100.0)?;
    add_box(world, Vec2::new(4.0, 0.5), Vec2::new(1.0, 2.0), 100.0)?;
    add_box(world, Vec2::new(3.0, 0.5), Vec2::new(1.5, 3.0), 100.0)?;
    add_box(world, Vec2::new(2.0, 0.5), Vec2::new(2.0, 4.0), 100.0)?;

    let pivot = add_static_box(world, Vec2::new(0.2, 0.2), Vec2::new(-3.0, 6.0))?;
    let bob = add_circle(world, 1.0, Vec2::new(-1.0, 6.0), 50.0)?;
    world.add_joint(pivot, bob, Vec2::new(-3.0, 6.0))?;
    Ok(())
}

fn run_scene(
    name: &str,
    build: fn(&mut World) -> Result<(), WorldError>,
) -> Result<(), WorldError> {
    let mut world = World::new(Vec2::ZERO, 10);
    build(&mut world)?;

    // Shapes get placed with gravity off, then the round starts
    world.gravity = Vec2::new(0.0, -10.0);
    for _ in 0..SETTLE_STEPS {
        world.step(TIME_STEP, None);
    }

    let contact_count: usize = world.arbiters.values().map(|a| a.contacts.len()).sum();
    let max_speed = world
        .bodies
        .iter()
        .map(|b| b.velocity.magnitude())
        .fold(0.0, f64::max);
    let fallen = world.bodies.iter().filter(|b| b.position.y < -2.0).count();

    println!(
        "{:<16} {:>3} bodies  {:>3} joints  {:>3} contacts  max speed {:>8.4}  fallen {}",
        name,
        world.bodies.len(),
        world.joints.len(),
        contact_count,
        max_speed,
        fallen
    );
    Ok(())
}

fn main() -> Result<(), WorldError> {
    println!(
        "settling each scene for {} steps at {:.4}s per step\n",
        SETTLE_STEPS, TIME_STEP
    );
    run_scene("pedestal", pedestal_scene)?;
    run_scene("triangles", triangle_scene)?;
    run_scene("columns", column_scene)?;
    run_scene("twin platforms", twin_platform_scene)?;
    run_scene("staircase", staircase_scene)?;
    Ok(())
}
