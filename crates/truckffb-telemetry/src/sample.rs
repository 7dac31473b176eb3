//! The latest vehicle telemetry sample.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Channel, GRAVITY, MS_TO_KMH, TelemetryValue};

/// A three-component float vector in truck-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Heading, pitch and roll.
///
/// Values delivered by the host are fractions of a turn; the sample stores
/// them in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Latest value of every subscribed channel plus frame timestamps.
///
/// Channels update sparsely: a field keeps its last written value until the
/// host sends a new one or the sample is [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Accumulated simulation time in microseconds, excluding pauses.
    pub timestamp: u64,
    pub raw_render_timestamp: u64,
    pub raw_simulation_timestamp: u64,
    pub raw_paused_simulation_timestamp: u64,

    pub orientation_available: bool,
    /// Orientation in degrees.
    pub orientation: Orientation,

    /// Effective steering, -1..1.
    pub steering: f32,
    /// Raw steering input, -1..1.
    pub input_steering: f32,
    pub throttle: f32,
    pub brake: f32,
    pub clutch: f32,

    /// Forward speed in m/s; negative when reversing.
    pub speed: f32,
    pub rpm: f32,
    pub gear: i32,

    pub linear_velocity: Vec3,
    /// Rotation rates in rad/s, one component per local axis (`x`
    /// lateral, `y` vertical, `z` longitudinal).
    pub angular_velocity: Vec3,
    pub linear_acceleration: Vec3,
    pub angular_acceleration: Vec3,

    pub parking_brake: bool,
    pub motor_brake: bool,
    pub retarder_level: u32,
    pub brake_air_pressure: f32,
    pub cruise_control: f32,
    pub fuel_amount: f32,
    pub engine_enabled: bool,
}

impl TelemetrySample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed * MS_TO_KMH
    }

    pub fn lateral_g(&self) -> f32 {
        self.linear_acceleration.x / GRAVITY
    }

    pub fn vertical_g(&self) -> f32 {
        self.linear_acceleration.y / GRAVITY
    }

    pub fn longitudinal_g(&self) -> f32 {
        self.linear_acceleration.z / GRAVITY
    }

    /// The `z` component of [`angular_velocity`](Self::angular_velocity),
    /// which the force model reads as the yaw rate.
    pub fn yaw_rate(&self) -> f32 {
        self.angular_velocity.z
    }

    /// Restore every field to its neutral value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Store one channel value. Returns `false` when the value type does not
    /// match the channel's registered type; the sample is left untouched.
    pub fn apply(&mut self, channel: Channel, value: TelemetryValue) -> bool {
        use TelemetryValue as V;

        let kind = value.kind();
        match (channel, value) {
            (Channel::Speed, V::Float(v)) => self.speed = v,
            (Channel::EngineRpm, V::Float(v)) => self.rpm = v,
            (Channel::InputSteering, V::Float(v)) => self.input_steering = v,
            (Channel::EffectiveSteering, V::Float(v)) => self.steering = v,
            (Channel::EffectiveThrottle, V::Float(v)) => self.throttle = v,
            (Channel::EffectiveBrake, V::Float(v)) => self.brake = v,
            (Channel::EffectiveClutch, V::Float(v)) => self.clutch = v,
            (Channel::BrakeAirPressure, V::Float(v)) => self.brake_air_pressure = v,
            (Channel::CruiseControl, V::Float(v)) => self.cruise_control = v,
            (Channel::Fuel, V::Float(v)) => self.fuel_amount = v,

            (Channel::ParkingBrake, V::Bool(v)) => self.parking_brake = v,
            (Channel::MotorBrake, V::Bool(v)) => self.motor_brake = v,
            (Channel::EngineEnabled, V::Bool(v)) => self.engine_enabled = v,

            (Channel::EngineGear, V::S32(v)) => self.gear = v,
            (Channel::RetarderLevel, V::U32(v)) => self.retarder_level = v,

            (Channel::LocalLinearVelocity, V::FVector(v)) => self.linear_velocity = v,
            (Channel::LocalAngularVelocity, V::FVector(v)) => self.angular_velocity = v,
            (Channel::LocalLinearAcceleration, V::FVector(v)) => self.linear_acceleration = v,
            (Channel::LocalAngularAcceleration, V::FVector(v)) => self.angular_acceleration = v,

            (Channel::WorldPlacement, V::Euler(turns)) => {
                self.orientation_available = true;
                self.orientation = Orientation {
                    heading: turns.heading * 360.0,
                    pitch: turns.pitch * 360.0,
                    roll: turns.roll * 360.0,
                };
            }

            _ => {
                debug!(channel = channel.name(), ?kind, "Ignoring value of unexpected type");
                return false;
            }
        }
        true
    }
}
