//! Named telemetry channels and typed channel values.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::{Orientation, Vec3};

/// Wire type of a channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Bool,
    S32,
    U32,
    FVector,
    Euler,
}

/// One channel value as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TelemetryValue {
    Float(f32),
    Bool(bool),
    S32(i32),
    U32(u32),
    FVector(Vec3),
    /// Orientation in fractions of a full turn.
    Euler(Orientation),
}

impl TelemetryValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TelemetryValue::Float(_) => ValueKind::Float,
            TelemetryValue::Bool(_) => ValueKind::Bool,
            TelemetryValue::S32(_) => ValueKind::S32,
            TelemetryValue::U32(_) => ValueKind::U32,
            TelemetryValue::FVector(_) => ValueKind::FVector,
            TelemetryValue::Euler(_) => ValueKind::Euler,
        }
    }
}

macro_rules! channels {
    ($($variant:ident => $name:literal : $kind:ident),+ $(,)?) => {
        /// Truck channels the driver subscribes to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Channel {
            $($variant),+
        }

        impl Channel {
            /// Every subscribed channel, in registration order.
            pub const ALL: &'static [Channel] = &[$(Channel::$variant),+];

            /// SDK channel name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Channel::$variant => $name),+
                }
            }

            /// Value type the channel is registered with.
            pub const fn kind(self) -> ValueKind {
                match self {
                    $(Channel::$variant => ValueKind::$kind),+
                }
            }

            /// Look up a channel by SDK name. Unknown names return `None`.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Channel::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

channels! {
    WorldPlacement => "truck.world.placement": Euler,
    Speed => "truck.speed": Float,
    EngineRpm => "truck.engine.rpm": Float,
    EngineGear => "truck.engine.gear": S32,
    InputSteering => "truck.input.steering": Float,
    EffectiveSteering => "truck.effective.steering": Float,
    EffectiveThrottle => "truck.effective.throttle": Float,
    EffectiveBrake => "truck.effective.brake": Float,
    EffectiveClutch => "truck.effective.clutch": Float,
    LocalLinearVelocity => "truck.local.velocity.linear": FVector,
    LocalAngularVelocity => "truck.local.velocity.angular": FVector,
    LocalLinearAcceleration => "truck.local.acceleration.linear": FVector,
    LocalAngularAcceleration => "truck.local.acceleration.angular": FVector,
    ParkingBrake => "truck.brake.parking": Bool,
    MotorBrake => "truck.brake.motor": Bool,
    RetarderLevel => "truck.brake.retarder": U32,
    BrakeAirPressure => "truck.brake.air.pressure": Float,
    CruiseControl => "truck.cruise_control": Float,
    Fuel => "truck.fuel.amount": Float,
    EngineEnabled => "truck.engine.enabled": Bool,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
