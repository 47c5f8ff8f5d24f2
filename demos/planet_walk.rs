//! Planet Walk Example
//!
//! A playable first-person example on a small spherical planet featuring:
//! - A Rapier3D ball collider as the planet
//! - A capsule walker pulled toward the planet center
//! - A camera parented to the walker's body
//! - Scattered crates and a speed-boost toggle built on speed overrides
//!
//! ## Controls
//! - **W/S** or **Up/Down**: Walk forward/back
//! - **A/D** or **Left/Right**: Strafe
//! - **Left Shift** (hold): Run
//! - **Mouse**: Look
//! - **B**: Toggle speed boost
//! - **Escape**: Release cursor, **Left click**: Capture cursor
//!
//! Run with `cargo run --example planet_walk --features rapier3d`.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use bevy_rapier3d::prelude::*;
use planet_walker::prelude::*;

// ==================== Constants ====================

const PLANET_RADIUS: f32 = 50.0;

const PLAYER_HALF_HEIGHT: f32 = 0.5;
const PLAYER_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 0.7;

const CRATE_COUNT: usize = 24;
const BOOST_SPEED: f32 = 20.0;

// ==================== Components ====================

#[derive(Component)]
struct Player;

/// Active speed boost, if any.
#[derive(Resource, Default)]
struct Boost(Option<SpeedOverrideId>);

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Planet Walk - Planet Walker Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Walker
        .add_plugins(PlanetWalkerPlugin::<Rapier3dBackend>::default())
        .add_plugins(WalkerInputPlugin::new())
        // Egui for settings UI
        .add_plugins(EguiPlugin::default())
        .init_resource::<Boost>()
        // Systems
        .add_systems(Startup, setup)
        .add_systems(Update, toggle_boost)
        .add_systems(EguiPrimaryContextPass, settings_ui)
        .add_observer(report_attach_failure)
        .run();
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let planet = spawn_planet(&mut commands, &mut meshes, &mut materials);
    spawn_crates(&mut commands, &mut meshes, &mut materials);
    spawn_player(&mut commands, &mut meshes, &mut materials, planet);

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(80.0, 120.0, 60.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // UI instructions
    commands.spawn((
        Text::new("WASD: Move | Shift: Run | Mouse: Look | B: Boost | Esc: Release cursor"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        Pickable::IGNORE,
    ));
}

fn spawn_planet(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            Transform::default(),
            RigidBody::Fixed,
            Collider::ball(PLANET_RADIUS),
            Mesh3d(meshes.add(Sphere::new(PLANET_RADIUS).mesh().uv(64, 32))),
            MeshMaterial3d(materials.add(Color::srgb(0.25, 0.45, 0.25))),
        ))
        .id()
}

/// Scatter crates over the surface on a golden-angle spiral.
fn spawn_crates(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mesh = meshes.add(Cuboid::new(2.0, 2.0, 2.0));
    let material = materials.add(Color::srgb(0.55, 0.4, 0.25));
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());

    for i in 0..CRATE_COUNT {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / CRATE_COUNT as f32;
        let ring = (1.0 - y * y).sqrt();
        let theta = golden_angle * i as f32;
        let up = Vec3::new(ring * theta.cos(), y, ring * theta.sin());

        // Keep the spawn point clear.
        if up.dot(Vec3::Y) > 0.95 {
            continue;
        }

        commands.spawn((
            Transform::from_translation(up * (PLANET_RADIUS + 1.0))
                .with_rotation(Quat::from_rotation_arc(Vec3::Y, up)),
            RigidBody::Fixed,
            Collider::cuboid(1.0, 1.0, 1.0),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
        ));
    }
}

fn spawn_player(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    planet: Entity,
) {
    let spawn_pos = Vec3::Y * (PLANET_RADIUS + PLAYER_HALF_HEIGHT + PLAYER_RADIUS + 0.5);

    let body = commands
        .spawn((
            Player,
            Transform::from_translation(spawn_pos),
            Rapier3dWalkerBundle::new().with_damping(0.5, 1.0),
            Collider::capsule_y(PLAYER_HALF_HEIGHT, PLAYER_RADIUS),
            Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_HALF_HEIGHT * 2.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 0.9))),
        ))
        .id();

    let camera = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
            ChildOf(body),
        ))
        .id();

    // Added last so the links point at entities that already exist.
    commands.entity(body).insert((
        WalkerInput,
        WalkerConfig::player(),
        WalkerLinks::new(planet, camera),
    ));
}

// ==================== Gameplay ====================

fn toggle_boost(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut boost: ResMut<Boost>,
    mut query: Query<&mut SpeedOverrides, With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyB) {
        return;
    }
    let Ok(mut overrides) = query.single_mut() else {
        return;
    };

    match boost.0.take() {
        Some(id) => {
            overrides.remove(id);
            info!("Speed boost off");
        }
        None => {
            boost.0 = Some(overrides.push(FixedSpeed(BOOST_SPEED)));
            info!("Speed boost on");
        }
    }
}

fn report_attach_failure(trigger: Trigger<AttachFailed>) {
    warn!(
        "Walker {} was not attached: {}",
        trigger.target(),
        trigger.event().error
    );
}

// ==================== Settings UI ====================

fn settings_ui(
    mut contexts: EguiContexts,
    mut query: Query<
        (&mut WalkerConfig, &mut WalkerState, &mut Transform, &mut Velocity),
        With<Player>,
    >,
    mut frame_count: Local<u32>,
) {
    let Ok((mut config, mut state, mut transform, mut velocity)) = query.single_mut() else {
        return;
    };

    // Increment frame counter
    *frame_count += 1;

    // Skip the first few frames to ensure egui is fully initialized
    if *frame_count <= 2 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Walker Settings")
        .default_pos([10.0, 10.0])
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reset to Defaults").clicked() {
                    *config = WalkerConfig::player();
                }
                if ui.button("Respawn Player").clicked() {
                    transform.translation =
                        Vec3::Y * (PLANET_RADIUS + PLAYER_HALF_HEIGHT + PLAYER_RADIUS + 0.5);
                    transform.rotation = Quat::IDENTITY;
                    velocity.linvel = Vec3::ZERO;
                    velocity.angvel = Vec3::ZERO;
                    state.reset_pitch();
                }
            });
            ui.add_space(8.0);

            ui.collapsing("Movement", |ui| {
                drag(ui, "Speed:", &mut config.speed, 0.1, 0.0..=50.0);
                ui.checkbox(&mut config.can_run, "Can Run");
                drag(ui, "Run Speed:", &mut config.run_speed, 0.1, 0.0..=50.0);
                drag(ui, "Pull Force:", &mut config.pull_force, 1.0, 0.0..=1000.0);
            });

            ui.collapsing("Look", |ui| {
                drag(ui, "Sensitivity:", &mut config.mouse_sensitivity, 0.5, 0.0..=500.0);
                drag(ui, "Pitch Limit:", &mut config.pitch_limit, 1.0, 0.0..=90.0);
                drag(ui, "Align Speed:", &mut config.align_speed, 0.1, 0.0..=100.0);
            });

            ui.collapsing("State", |ui| {
                ui.label(format!("Running: {}", state.is_running()));
                ui.label(format!("Pitch: {:.1}°", state.pitch()));
                ui.label(format!("Move speed: {:.2}", state.move_speed()));
                ui.label(format!("Velocity: {:.2}", velocity.linvel.length()));
                let n = state.normal();
                ui.label(format!("Normal: ({:.2}, {:.2}, {:.2})", n.x, n.y, n.z));
            });
        });
}

fn drag(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f32,
    speed: f64,
    range: std::ops::RangeInclusive<f32>,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(value).speed(speed).range(range));
    });
}
