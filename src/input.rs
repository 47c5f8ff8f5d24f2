//! Keyboard and mouse input.
//!
//! Optional plugin that feeds [`WalkIntent`] and [`LookIntent`] from the
//! keyboard and mouse for entities tagged [`WalkerInput`], and captures the
//! cursor when such a walker attaches.
//!
//! ## Controls
//! - **W/S** or **Up/Down**: `Vertical` axis (forward/back)
//! - **A/D** or **Left/Right**: `Horizontal` axis (strafe)
//! - Run key from [`WalkerConfig::run_key`] (Left Shift by default): run
//! - Mouse: look
//! - **Escape**: release the cursor, **left click**: capture it again

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::attach::WalkerAttached;
use crate::config::WalkerConfig;
use crate::intent::{LookIntent, WalkIntent};
use crate::PlanetWalkerSet;

/// Marker for walkers driven by the local keyboard and mouse.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct WalkerInput;

/// Plugin that reads the keyboard and mouse into walker intents.
pub struct WalkerInputPlugin {
    /// Whether to lock and hide the cursor while walking.
    lock_cursor: bool,
}

impl Default for WalkerInputPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkerInputPlugin {
    /// Input handling with cursor capture.
    pub fn new() -> Self {
        Self { lock_cursor: true }
    }

    /// Input handling that never touches the cursor.
    ///
    /// Use this when the host manages cursor state itself.
    pub fn without_cursor_lock() -> Self {
        Self { lock_cursor: false }
    }
}

/// Whether the plugin manages the cursor.
#[derive(Resource, Debug, Clone, Copy)]
struct CursorLockEnabled(bool);

impl Plugin for WalkerInputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<WalkerInput>();
        app.insert_resource(CursorLockEnabled(self.lock_cursor));

        app.add_systems(
            Update,
            (read_keyboard_input, read_pointer_input).in_set(PlanetWalkerSet::Input),
        );

        if self.lock_cursor {
            app.add_observer(lock_cursor_on_attach);
            app.add_systems(Update, toggle_cursor_lock.before(PlanetWalkerSet::Input));
        }
    }
}

/// Value of a virtual axis built from two sets of keys.
pub fn key_axis(keyboard: &ButtonInput<KeyCode>, negative: &[KeyCode], positive: &[KeyCode]) -> f32 {
    let mut value = 0.0;
    if keyboard.any_pressed(negative.iter().copied()) {
        value -= 1.0;
    }
    if keyboard.any_pressed(positive.iter().copied()) {
        value += 1.0;
    }
    value
}

/// Write the `Horizontal`/`Vertical` axes and run trigger.
pub fn read_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&WalkerConfig, &mut WalkIntent), With<WalkerInput>>,
) {
    let horizontal = key_axis(
        &keyboard,
        &[KeyCode::KeyA, KeyCode::ArrowLeft],
        &[KeyCode::KeyD, KeyCode::ArrowRight],
    );
    let vertical = key_axis(
        &keyboard,
        &[KeyCode::KeyS, KeyCode::ArrowDown],
        &[KeyCode::KeyW, KeyCode::ArrowUp],
    );

    for (config, mut intent) in &mut query {
        intent.set_axes(horizontal, vertical);
        intent.set_run_held(keyboard.pressed(config.run_key));
    }
}

/// Accumulate this frame's mouse motion into [`LookIntent`].
///
/// Screen-space Y grows downward; it is flipped so positive means pointer
/// up. Motion is ignored while the plugin manages the cursor and it is not
/// captured, so moving the mouse over other windows does not turn the view.
pub fn read_pointer_input(
    motion: Res<AccumulatedMouseMotion>,
    lock: Res<CursorLockEnabled>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut query: Query<&mut LookIntent, With<WalkerInput>>,
) {
    if lock.0 {
        let captured = windows
            .single()
            .is_ok_and(|w| w.cursor_options.grab_mode != CursorGrabMode::None);
        if !captured {
            return;
        }
    }

    let delta = Vec2::new(motion.delta.x, -motion.delta.y);
    if delta == Vec2::ZERO {
        return;
    }
    for mut look in &mut query {
        look.add(delta);
    }
}

fn set_cursor_captured(window: &mut Window, captured: bool) {
    if captured {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    } else {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Capture the cursor when a keyboard/mouse walker attaches.
fn lock_cursor_on_attach(
    trigger: Trigger<WalkerAttached>,
    q_input: Query<(), With<WalkerInput>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !q_input.contains(trigger.target()) {
        return;
    }
    if let Ok(mut window) = windows.single_mut() {
        set_cursor_captured(&mut window, true);
    }
}

/// Escape releases the cursor, a left click captures it again.
fn toggle_cursor_lock(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    q_input: Query<(), With<WalkerInput>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if q_input.is_empty() {
        return;
    }
    let Ok(mut window) = windows.single_mut() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        set_cursor_captured(&mut window, false);
    } else if mouse.just_pressed(MouseButton::Left)
        && window.cursor_options.grab_mode == CursorGrabMode::None
    {
        set_cursor_captured(&mut window, true);
    }
}
