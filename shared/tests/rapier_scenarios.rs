use approx::assert_abs_diff_eq;
use galdoran_shared::{
    BodyPose, CameraConfig, CharacterConfig, CharacterHandle, ColliderShapeDef, InputState, Key,
    PhysicsAdapter, Quat, RapierPhysicsAdapter, RenderTarget, Simulation, TickOutcome, Vec3,
    WorldStaticDef,
};

/// Headless stand-in for a render node.
struct NoMesh;

impl RenderTarget for NoMesh {
    fn apply_pose(&mut self, _pose: &BodyPose) {}
}

/// Flat ground with its top face at y = 0 and a 2 m box whose near face sits at x = 4.
fn arena() -> Vec<WorldStaticDef> {
    vec![
        WorldStaticDef::new(
            0,
            Vec3::new(0.0, -0.5, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(50.0, 0.5, 50.0),
            },
        ),
        WorldStaticDef::new(
            1,
            Vec3::new(5.0, 1.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(1.0, 1.0, 1.0),
            },
        ),
    ]
}

/// Capsule center: half the height plus a little more than the skin above the ground.
const REST_Y: f32 = 1.03;

fn spawn_on_arena(
    config: CharacterConfig,
) -> (Simulation<RapierPhysicsAdapter>, CharacterHandle) {
    let mut adapter = RapierPhysicsAdapter::new();
    adapter.load_world(arena());
    let mut sim = Simulation::new(adapter);
    let handle = sim
        .spawn(
            Vec3::new(0.0, REST_Y, 0.0),
            Quat::identity(),
            config,
            CameraConfig::default(),
        )
        .unwrap();
    (sim, handle)
}

fn run(
    sim: &mut Simulation<RapierPhysicsAdapter>,
    handle: CharacterHandle,
    input: &mut InputState,
    frames: u32,
) {
    for _ in 0..frames {
        sim.run_frame::<NoMesh>(handle, input, 1.0 / 60.0, None)
            .unwrap();
    }
}

#[test]
fn walks_freely_on_flat_ground() {
    let (mut sim, handle) = spawn_on_arena(CharacterConfig::default());
    let mut input = InputState::default();
    input.press(Key::Forward);

    // One second at 5 m/s.
    run(&mut sim, handle, &mut input, 60);
    let state = sim.character_state(handle).unwrap();
    assert!(state.is_grounded);
    assert_abs_diff_eq!(state.position.z, -5.0, epsilon = 0.05);
    assert_abs_diff_eq!(state.position.x, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(state.position.y, REST_Y, epsilon = 0.03);
}

#[test]
fn wall_stops_the_capsule_without_penetration() {
    let (mut sim, handle) = spawn_on_arena(CharacterConfig::default());
    let mut input = InputState::default();
    input.press(Key::Right);

    // Far more than the 3.5 m of free travel.
    run(&mut sim, handle, &mut input, 120);
    let x = sim.character_state(handle).unwrap().position.x;
    assert!(x <= 3.5 + 1e-3, "capsule surface crossed the wall face: x = {x}");
    assert!(x > 3.3, "capsule stopped early: x = {x}");
}

#[test]
fn jump_lifts_off_and_gravity_brings_it_back() {
    let config = CharacterConfig {
        gravity_mps2: 9.81,
        ..CharacterConfig::default()
    };
    let (mut sim, handle) = spawn_on_arena(config);
    let mut input = InputState::default();

    // Settle so the first grounded answer is observed.
    run(&mut sim, handle, &mut input, 2);
    assert!(sim.character_state(handle).unwrap().is_grounded);

    input.press(Key::Jump);
    input.release(Key::Jump);
    run(&mut sim, handle, &mut input, 10);
    assert!(!input.jump_pending());
    let peak = sim.character_state(handle).unwrap().position.y;
    assert!(peak > REST_Y + 0.3, "did not leave the ground: y = {peak}");

    run(&mut sim, handle, &mut input, 180);
    let state = sim.character_state(handle).unwrap();
    assert!(state.is_grounded);
    let y = state.position.y;
    assert!(y >= 1.0 - 1e-3, "sank into the ground: y = {y}");
    assert!(y < REST_Y + 0.05, "did not land: y = {y}");
}

#[test]
fn jump_pressed_again_right_after_takeoff_waits_for_landing() {
    let config = CharacterConfig {
        gravity_mps2: 9.81,
        ..CharacterConfig::default()
    };
    let (mut sim, handle) = spawn_on_arena(config);
    let mut input = InputState::default();
    run(&mut sim, handle, &mut input, 2);

    input.press(Key::Jump);
    run(&mut sim, handle, &mut input, 1);
    assert!(!input.jump_pending());
    let takeoff = sim.character_state(handle).unwrap();
    assert!(takeoff.position.y > REST_Y);

    input.press(Key::Jump);
    let frame = sim
        .run_frame::<NoMesh>(handle, &mut input, 1.0 / 60.0, None)
        .unwrap();
    let TickOutcome::Advanced(report) = frame.outcome else {
        panic!("world is loaded");
    };
    assert!(!report.update.jumped);
    assert!(input.jump_pending());
    // Still the first jump's speed, slowed by one frame of gravity.
    let state = sim.character_state(handle).unwrap();
    assert_abs_diff_eq!(state.velocity.y, 7.0 - 9.81 / 60.0, epsilon = 1e-4);
}

#[test]
fn not_ready_until_world_is_loaded() {
    let mut sim = Simulation::new(RapierPhysicsAdapter::new());
    let handle = sim
        .spawn(
            Vec3::new(0.0, REST_Y, 0.0),
            Quat::identity(),
            CharacterConfig::default(),
            CameraConfig::default(),
        )
        .unwrap();
    let mut input = InputState::default();
    input.press(Key::Forward);

    let frame = sim
        .run_frame::<NoMesh>(handle, &mut input, 0.1, None)
        .unwrap();
    assert_eq!(frame.outcome, TickOutcome::NotReady);
    assert_eq!(sim.adapter().steps(), 1);

    sim.adapter_mut().load_world(arena());
    assert!(sim.adapter().is_ready());
    let frame = sim
        .run_frame::<NoMesh>(handle, &mut input, 0.1, None)
        .unwrap();
    assert!(frame.outcome.is_advanced());
    assert!(frame.body.position.z < -0.4);
}
