//! Snapshot tests for error message formatting.
//!
//! Log lines are built from these strings, so they must stay stable.

use truckffb_errors::{
    CalibrationError, CalibrationStep, DeviceError, TruckFfbError, ValidationError,
};

mod device_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_not_found() {
        assert_snapshot!(DeviceError::not_found("G923").to_string(), @"Device not found: G923");
    }

    #[test]
    fn test_unsupported_device() {
        assert_snapshot!(
            DeviceError::unsupported(0x046D, 0xC24F).to_string(),
            @"Unsupported device: vendor=0x046d, product=0xc24f"
        );
    }

    #[test]
    fn test_write_failed() {
        assert_snapshot!(
            DeviceError::write_failed("G923", "broken pipe").to_string(),
            @"Failed to write report to device G923: broken pipe"
        );
    }

    #[test]
    fn test_not_open() {
        assert_snapshot!(DeviceError::NotOpen("G923".into()).to_string(), @"Device G923 is not open");
    }
}

mod calibration_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_not_initialized() {
        assert_snapshot!(
            CalibrationError::NotInitialized.to_string(),
            @"Cannot calibrate: wheel not initialized"
        );
    }

    #[test]
    fn test_step_failed() {
        let err = CalibrationError::step_failed(
            CalibrationStep::EnableAutocenter,
            DeviceError::disconnected("G923"),
        );
        assert_snapshot!(
            err.to_string(),
            @"Calibration step 'enable-autocenter' failed: Device disconnected: G923"
        );
    }
}

mod wrapper_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_wrapped_validation() {
        let err: TruckFfbError =
            ValidationError::relation("speed_low_threshold", "less than", "speed_medium_threshold")
                .into();
        assert_snapshot!(
            err.to_string(),
            @"Validation error: Field 'speed_low_threshold' must be less than 'speed_medium_threshold'"
        );
    }

    #[test]
    fn test_wrapped_device() {
        let err: TruckFfbError = DeviceError::not_found("G923").into();
        assert_snapshot!(err.to_string(), @"Device error: Device not found: G923");
    }
}
