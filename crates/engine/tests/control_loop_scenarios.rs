//! Control loop and host adapter scenarios against mock wheels.

use std::sync::Arc;
use std::time::Duration;

use tracing_test::traced_test;
use truckffb_engine::{
    ControlLoop, GameInfo, GameVersion, HostAdapter, HostEvent, NoDelay, RecordingDelay,
    TruckGame, WheelState, WheelTimings,
};
use truckffb_errors::{DeviceError, TruckFfbError};
use truckffb_ffb::FfbConfig;
use truckffb_hid_common::mock::{JournalEntry, MockHidDevice, MockHidPort};
use truckffb_hid_g923_protocol::{LOGITECH_VENDOR_ID, led_patterns, opcodes, product_ids};
use truckffb_telemetry::{Channel, FrameStart, TelemetryValue, Vec3};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn g923(path: &str) -> MockHidDevice {
    MockHidDevice::new(LOGITECH_VENDOR_ID, product_ids::G923, path)
}

fn quick_loop() -> Result<ControlLoop, Box<dyn std::error::Error>> {
    Ok(ControlLoop::with_timing(
        FfbConfig::default(),
        WheelTimings::immediate(),
        Arc::new(NoDelay),
    )?)
}

fn opcodes_of(device: &MockHidDevice) -> Vec<u8> {
    device
        .get_write_history()
        .iter()
        .filter_map(|w| w.first().copied())
        .collect()
}

#[test]
fn test_teardown_order_for_every_wheel() -> TestResult {
    let mut port = MockHidPort::new();
    let a = port.add_device(g923("/dev/hidraw0"));
    let b = port.add_device(g923("/dev/hidraw1"));

    let mut control = quick_loop()?;
    assert_eq!(control.initialize(&port)?, 2);
    control.set_paused(false);
    control.advance();
    port.journal().clear();

    control.shutdown();

    for device in [&a, &b] {
        let path = device.info().path.clone();
        let tail: Vec<JournalEntry> = port
            .journal()
            .entries()
            .into_iter()
            .filter(|e| match e {
                JournalEntry::Write { path: p, .. } | JournalEntry::Close { path: p } => *p == path,
            })
            .collect();
        let n = tail.len();
        assert!(n >= 4);
        let led_off = vec![opcodes::SET_LED_PATTERN, opcodes::LED_SUBTYPE, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            &tail[n - 4..],
            &[
                JournalEntry::Write {
                    path: path.clone(),
                    data: vec![opcodes::STOP_FORCES, 0, 0, 0, 0, 0, 0, 0],
                },
                JournalEntry::Write {
                    path: path.clone(),
                    data: vec![opcodes::DISABLE_AUTOCENTER, 0, 0, 0, 0, 0, 0, 0],
                },
                JournalEntry::Write {
                    path: path.clone(),
                    data: led_off,
                },
                JournalEntry::Close { path },
            ]
        );
        assert_eq!(device.close_count(), 1);
    }
    Ok(())
}

#[test]
fn test_shutdown_waits_settle_times() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    let delay = RecordingDelay::new();
    let mut control = ControlLoop::with_timing(
        FfbConfig::default(),
        WheelTimings::default(),
        Arc::new(delay.clone()),
    )?;
    control.initialize(&port)?;
    delay.clear();

    control.shutdown();
    assert_eq!(
        delay.waits(),
        vec![Duration::from_millis(200), Duration::from_millis(100)]
    );
    Ok(())
}

#[traced_test]
#[test]
fn test_pause_drives_wheels_neutral() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;
    control.set_paused(false);
    control.store_float(Channel::Speed, 20.0);
    control.advance();
    port.journal().clear();

    let report = control.set_paused(true);
    assert_eq!(report.sent, 3);
    assert_eq!(
        opcodes_of(&wheel),
        vec![
            opcodes::STOP_FORCES,
            opcodes::DISABLE_AUTOCENTER,
            opcodes::SET_LED_PATTERN
        ]
    );
    assert!(logs_contain("Telemetry paused"));

    // Further frames while paused send nothing.
    port.journal().clear();
    for _ in 0..40 {
        assert!(control.advance().paused);
    }
    assert!(wheel.get_write_history().is_empty());

    // Pausing again is not a new transition.
    assert_eq!(control.set_paused(true).sent, 0);
    Ok(())
}

#[test]
fn test_kickback_tick_sends_constant_force_only() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;

    control.store_float(Channel::Speed, 11.0);
    control.store_fvector(Channel::LocalAngularAcceleration, Vec3::new(0.0, 0.0, -3.0));
    control.set_paused(false);
    port.journal().clear();

    let report = control.advance();
    let forces = report.forces.ok_or("force update was due")?;
    assert!(forces.use_constant_force);

    let writes = wheel.get_write_history();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], vec![0xF1, 0x00, 30, 30, 30, 30, 0, 0]);
    assert_eq!(writes[1][0], opcodes::SET_LED_PATTERN);
    Ok(())
}

#[test]
fn test_parked_truck_flashes_leds_on_led_ticks() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    let config = FfbConfig {
        led_update_rate: 1,
        ..FfbConfig::default()
    };
    let mut control = ControlLoop::with_timing(config, WheelTimings::immediate(), Arc::new(NoDelay))?;
    control.initialize(&port)?;
    control.store_bool(Channel::ParkingBrake, true);
    control.store_float(Channel::EngineRpm, 2500.0);
    control.set_paused(false);

    let leds: Vec<Option<u8>> = (0..4).map(|_| control.advance().led).collect();
    assert_eq!(
        leds,
        vec![
            Some(led_patterns::STEP_5),
            Some(led_patterns::OFF),
            Some(led_patterns::STEP_5),
            Some(led_patterns::OFF),
        ]
    );
    Ok(())
}

#[traced_test]
#[test]
fn test_write_failure_marks_tick_degraded() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;
    control.set_paused(false);
    wheel.fail_opcode(opcodes::STOP_FORCES);

    let report = control.advance();
    assert!(report.degraded());
    assert_eq!(report.commands_failed, 1);
    assert!(logs_contain("Force feedback update failed"));

    wheel.clear_failures();
    for _ in 0..7 {
        control.advance();
    }
    let report = control.advance();
    assert!(report.forces.is_some());
    assert!(!report.degraded());
    Ok(())
}

#[test]
fn test_unplugged_wheel_degrades_without_teardown() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;
    control.set_paused(false);
    wheel.disconnect();

    let report = control.advance();
    assert!(report.degraded());
    assert_eq!(report.commands_sent, 0);
    assert_eq!(control.wheel_count(), 1);
    assert_eq!(control.wheels()[0].state(), WheelState::Active);
    Ok(())
}

#[traced_test]
#[test]
fn test_calibration_failure_drops_wheel() -> TestResult {
    let mut port = MockHidPort::new();
    let good = port.add_device(g923("/dev/hidraw0"));
    let bad = port.add_device(g923("/dev/hidraw1"));
    bad.fail_opcode(opcodes::SET_FORCE_EFFECT);

    let mut control = quick_loop()?;
    assert_eq!(control.initialize(&port)?, 1);
    assert_eq!(control.wheels()[0].info().path, good.info().path);
    assert!(logs_contain("Failed to calibrate wheel"));
    // The dropped wheel was still torn down.
    assert_eq!(bad.close_count(), 1);
    Ok(())
}

#[traced_test]
#[test]
fn test_no_known_wheels_is_an_error() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(MockHidDevice::new(LOGITECH_VENDOR_ID, 0xC24F, "/dev/hidraw0"));
    let mut control = quick_loop()?;
    let err = control.initialize(&port);
    assert!(matches!(
        err,
        Err(TruckFfbError::Device(DeviceError::NotFound(_)))
    ));
    assert!(!control.is_initialized());
    assert!(logs_contain("No compatible wheels found"));
    Ok(())
}

#[test]
fn test_all_wheels_failing_is_an_error() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    wheel.set_fail_open(true);
    let mut control = quick_loop()?;
    assert!(control.initialize(&port).is_err());
    assert_eq!(control.wheel_count(), 0);
    Ok(())
}

#[test]
fn test_enumeration_failure_is_an_error() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    port.set_fail_enumeration(true);
    let mut control = quick_loop()?;
    assert!(matches!(
        control.initialize(&port),
        Err(TruckFfbError::Device(DeviceError::ConnectionFailed { .. }))
    ));
    Ok(())
}

#[traced_test]
#[test]
fn test_host_session() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let game = GameInfo::new("eut2", GameVersion::new(1, 18));
    let mut host = HostAdapter::init(&game, quick_loop()?, &port)?;
    assert_eq!(host.game(), Some(TruckGame::Ets2));
    assert!(host.control().is_paused());

    let frame = FrameStart {
        render_time: 1_000,
        simulation_time: 1_000,
        paused_simulation_time: 1_000,
        timer_restart: false,
    };
    assert_eq!(host.handle(HostEvent::FrameStart(frame)), None);
    host.handle(HostEvent::Channel {
        name: "truck.speed",
        value: TelemetryValue::Float(25.0),
    });
    host.handle(HostEvent::Channel {
        name: "truck.engine.rpm",
        value: TelemetryValue::Float(1500.0),
    });
    host.handle(HostEvent::Channel {
        name: "truck.engine.enabled",
        value: TelemetryValue::Bool(true),
    });
    host.handle(HostEvent::Channel {
        name: "truck.unknown.channel",
        value: TelemetryValue::U32(9),
    });

    let report = host.handle(HostEvent::FrameEnd).ok_or("frame end reports")?;
    assert!(report.paused);
    assert!(report.forces.is_none());

    host.handle(HostEvent::Started);
    port.journal().clear();
    let report = host.handle(HostEvent::FrameEnd).ok_or("frame end reports")?;
    let forces = report.forces.ok_or("force update was due")?;
    assert_eq!(forces.autocenter_slope, 4);
    assert_eq!(forces.autocenter_force, 12);
    assert_eq!(report.led, Some(led_patterns::STEP_4));
    assert!(!wheel.get_write_history().is_empty());

    let next = FrameStart {
        paused_simulation_time: 1_500,
        ..frame
    };
    host.handle(HostEvent::FrameStart(next));
    assert_eq!(host.control().sample().timestamp, 500);

    host.handle(HostEvent::Paused);
    assert!(host.control().is_paused());

    host.shutdown();
    assert_eq!(wheel.close_count(), 1);
    assert!(logs_contain("Initialization successful"));
    Ok(())
}

#[test]
fn test_unknown_game_still_initializes() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    let game = GameInfo::new("unknown", GameVersion::V1_00);
    let host = HostAdapter::init(&game, quick_loop()?, &port)?;
    assert_eq!(host.game(), None);
    assert!(host.control().is_initialized());
    Ok(())
}

fn hex_writes(device: &MockHidDevice) -> Vec<String> {
    device
        .get_write_history()
        .iter()
        .map(|w| {
            w.iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[test]
fn test_highway_tick_on_the_wire() -> TestResult {
    let mut port = MockHidPort::new();
    let wheel = port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;
    control.store_float(Channel::Speed, 25.0);
    control.store_float(Channel::EngineRpm, 1500.0);
    control.store_bool(Channel::EngineEnabled, true);
    control.set_paused(false);
    port.journal().clear();

    let report = control.advance();
    assert_eq!(report.commands_sent, 4);
    insta::assert_debug_snapshot!(hex_writes(&wheel), @r#"
    [
        "F3 00 00 00 00 00 00 00",
        "F1 02 02 00 02 00 00 00",
        "F4 00 00 00 00 00 00 00",
        "FE 00 04 04 0C 00 00 00",
        "F8 12 0F 00 00 00 00 00",
    ]
    "#);
    Ok(())
}

fn jolt_then_settle(control: &mut ControlLoop) {
    control.store_float(Channel::Speed, 10.0);
    control.store_fvector(Channel::LocalLinearAcceleration, Vec3::new(0.0, 3.0, 0.0));
    control.set_paused(false);
    control.advance();
    control.store_fvector(Channel::LocalLinearAcceleration, Vec3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_impact_window_ends_after_half_a_second_of_frames() -> TestResult {
    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;

    jolt_then_settle(&mut control);
    assert!(control.terrain().impact_active());

    // Frames 2..=25 still fall inside the 0.5 s window at 60 Hz.
    for _ in 2..=25 {
        control.advance();
    }
    assert!(control.terrain().impact_active());

    for _ in 26..=33 {
        control.advance();
    }
    assert!(!control.terrain().impact_active());
    assert!(control.terrain().in_cooldown());
    Ok(())
}

#[test]
fn test_impact_window_follows_host_clock() -> TestResult {
    const FRAME_US: u64 = 33_333;

    let mut port = MockHidPort::new();
    port.add_device(g923("/dev/hidraw0"));
    let mut control = quick_loop()?;
    control.initialize(&port)?;

    let frame = |n: u64| FrameStart {
        paused_simulation_time: n * FRAME_US,
        ..FrameStart::default()
    };

    control.on_frame_start(&frame(0));
    jolt_then_settle(&mut control);
    assert!(control.terrain().impact_active());

    // At 30 Hz the half-second window closes on the second force update
    // after the jolt, frame 17.
    for n in 1..16 {
        control.on_frame_start(&frame(n));
        control.advance();
    }
    assert!(control.terrain().impact_active());

    control.on_frame_start(&frame(16));
    let report = control.advance();
    assert!(report.forces.is_some());
    assert!(!control.terrain().impact_active());
    Ok(())
}
