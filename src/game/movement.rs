//! # Movement Integrator
//!
//! Turns per-tick input intent into player motion.
//!
//! The model is deliberately approximate and frame-rate dependent:
//! - horizontal momentum eases toward `direction * speed` and decays by friction
//!   while no key is held
//! - height falls by `gravity * airtime²` each tick while airborne
//! - a jump is an instantaneous bump in height, allowed only from the floor

use crate::{config, Player, Point3};
use serde::{Deserialize, Serialize};

/// Tunables for the movement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub speed: f32,
    pub jump_height: f32,
    pub gravity: f32,
    pub acceleration: f32,
    pub friction: f32,
    /// Horizontal and vertical look sensitivity
    pub mouse_sensitivity: (f32, f32),
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed: config::PLAYER_SPEED,
            jump_height: config::JUMP_HEIGHT,
            gravity: config::GRAVITY,
            acceleration: config::ACCELERATION,
            friction: config::FRICTION,
            mouse_sensitivity: (config::MOUSE_SENSITIVITY, config::MOUSE_SENSITIVITY),
        }
    }
}

/// What the player is asking for this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputIntent {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 right, -1 left
    pub strafe: f32,
    /// Pointer velocity since the last tick
    pub look_delta: (f32, f32),
    /// Look input is only applied while the pointer is locked
    pub pointer_locked: bool,
}

impl InputIntent {
    /// Builds an intent from held movement keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::InputIntent;
    ///
    /// let intent = InputIntent::from_keys(true, false, false, true);
    /// assert_eq!((intent.forward, intent.strafe), (1.0, 1.0));
    /// ```
    pub fn from_keys(forward: bool, back: bool, left: bool, right: bool) -> Self {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        Self {
            forward: axis(forward, back),
            strafe: axis(right, left),
            ..Self::default()
        }
    }

    /// Whether any movement key is held.
    pub fn has_movement(&self) -> bool {
        self.forward != 0.0 || self.strafe != 0.0
    }
}

/// Integrates player motion from input intent.
#[derive(Debug, Clone, Default)]
pub struct MovementIntegrator {
    pub settings: MovementSettings,
}

impl MovementIntegrator {
    /// Creates an integrator with the given tunables.
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }

    /// World-space unit direction for an intent, relative to `yaw` degrees.
    pub fn world_direction(intent: &InputIntent, yaw: f32) -> Point3 {
        let local = Point3::new(intent.strafe, 0.0, intent.forward).normalized();
        let (sin, cos) = yaw.to_radians().sin_cos();
        let forward = Point3::new(sin, 0.0, cos);
        let right = Point3::new(cos, 0.0, -sin);
        forward * local.z + right * local.x
    }

    /// Advances the player by `dt` seconds.
    pub fn step(&self, player: &mut Player, intent: &InputIntent, dt: f32) {
        if !player.enabled {
            return;
        }
        let s = &self.settings;

        if player.position.y > 0.0 {
            player.air_time += dt;
            player.position.y =
                (player.position.y - s.gravity * player.air_time * player.air_time).max(0.0);
        } else {
            player.air_time = 0.0;
            player.position.y = 0.0;
        }

        let direction = Self::world_direction(intent, player.yaw);
        let target = direction * s.speed;
        player.momentum = player
            .momentum
            .lerp(target, (dt * s.acceleration).clamp(0.0, 1.0));

        if !intent.has_movement() {
            player.momentum *= (1.0 - dt * s.friction).max(0.0);
        }

        player.position += player.momentum * dt;

        if intent.pointer_locked {
            let (dx, dy) = intent.look_delta;
            player.pitch -= dy * s.mouse_sensitivity.1 * dt;
            player.yaw += dx * s.mouse_sensitivity.0 * dt;
            player.pitch = player.pitch.clamp(-90.0, 90.0);
        }
    }

    /// Jumps if the player is on the floor. Returns whether the jump happened.
    pub fn jump(&self, player: &mut Player) -> bool {
        if !player.enabled || !player.is_grounded() {
            return false;
        }
        player.air_time = 0.0;
        player.position.y += self.settings.jump_height;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_player() -> Player {
        Player::new(Point3::ZERO)
    }

    #[test]
    fn test_forward_at_zero_yaw_moves_along_z() {
        let integrator = MovementIntegrator::default();
        let mut player = grounded_player();
        let intent = InputIntent::from_keys(true, false, false, false);

        for _ in 0..120 {
            integrator.step(&mut player, &intent, DT);
        }
        assert!(player.position.z > 1.0);
        assert!(player.position.x.abs() < 1e-4);
        // momentum settles at the target speed
        assert!((player.momentum.length() - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_yaw_rotates_direction() {
        let intent = InputIntent::from_keys(true, false, false, false);
        let dir = MovementIntegrator::world_direction(&intent, 90.0);
        assert!((dir.x - 1.0).abs() < 1e-5);
        assert!(dir.z.abs() < 1e-5);

        let strafe = InputIntent::from_keys(false, false, true, false);
        let dir = MovementIntegrator::world_direction(&strafe, 0.0);
        assert!((dir.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_input_is_normalized() {
        let intent = InputIntent::from_keys(true, false, true, false);
        let dir = MovementIntegrator::world_direction(&intent, 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_momentum_decays_without_input() {
        let integrator = MovementIntegrator::default();
        let mut player = grounded_player();
        player.momentum = Point3::new(2.0, 0.0, 0.0);
        let idle = InputIntent::default();

        let mut last = player.momentum.length();
        for _ in 0..600 {
            integrator.step(&mut player, &idle, DT);
            let now = player.momentum.length();
            assert!(now <= last);
            last = now;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let integrator = MovementIntegrator::default();
        let mut player = grounded_player();
        player.momentum = Point3::new(2.0, 0.0, 0.0);
        integrator.step(&mut player, &InputIntent::default(), 0.5);
        assert!(player.momentum.x >= 0.0);
    }

    #[test]
    fn test_fall_never_goes_below_floor() {
        let integrator = MovementIntegrator::default();
        let mut player = Player::new(Point3::new(0.0, 1.0, 0.0));

        let mut ticks = 0;
        while !player.is_grounded() {
            integrator.step(&mut player, &InputIntent::default(), DT);
            assert!(player.position.y >= 0.0);
            ticks += 1;
            assert!(ticks < 10_000);
        }
        // one more tick resets airtime on landing
        integrator.step(&mut player, &InputIntent::default(), DT);
        assert_eq!(player.air_time, 0.0);
    }

    #[test]
    fn test_quadratic_fall_formula() {
        let integrator = MovementIntegrator::default();
        let mut player = Player::new(Point3::new(0.0, 5.0, 0.0));
        integrator.step(&mut player, &InputIntent::default(), 0.5);
        // y = 5 - 1 * 0.5^2
        assert!((player.position.y - 4.75).abs() < 1e-6);
        integrator.step(&mut player, &InputIntent::default(), 0.5);
        // y = 4.75 - 1 * 1.0^2
        assert!((player.position.y - 3.75).abs() < 1e-6);
    }

    #[test]
    fn test_jump_only_from_floor() {
        let integrator = MovementIntegrator::default();
        let mut player = grounded_player();

        assert!(integrator.jump(&mut player));
        assert_eq!(player.position.y, 2.0);
        assert!(!integrator.jump(&mut player));
        assert_eq!(player.position.y, 2.0);
    }

    #[test]
    fn test_look_clamps_pitch_and_needs_lock() {
        let integrator = MovementIntegrator::default();
        let mut player = grounded_player();
        let mut intent = InputIntent {
            look_delta: (0.0, -1000.0),
            ..InputIntent::default()
        };

        integrator.step(&mut player, &intent, DT);
        assert_eq!(player.pitch, 0.0);

        intent.pointer_locked = true;
        integrator.step(&mut player, &intent, DT);
        assert_eq!(player.pitch, 90.0);
    }

    #[test]
    fn test_disabled_player_is_frozen() {
        let integrator = MovementIntegrator::default();
        let mut player = Player::new(Point3::new(0.0, 1.0, 0.0));
        player.enabled = false;
        let intent = InputIntent::from_keys(true, false, false, false);

        integrator.step(&mut player, &intent, DT);
        assert_eq!(player.position, Point3::new(0.0, 1.0, 0.0));
        assert!(!integrator.jump(&mut player));
    }
}
