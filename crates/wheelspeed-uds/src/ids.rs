//! Wire identifiers: service ids, sub-functions, DIDs, RIDs and DTC numbers.
//!
//! Every value here is part of the diagnostic wire contract.

/// UDS service ids.
pub mod service_id {
    /// DiagnosticSessionControl.
    pub const DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
    /// ECUReset.
    pub const ECU_RESET: u8 = 0x11;
    /// ClearDiagnosticInformation.
    pub const CLEAR_DIAGNOSTIC_INFORMATION: u8 = 0x14;
    /// ReadDTCInformation.
    pub const READ_DTC_INFORMATION: u8 = 0x19;
    /// ReadDataByIdentifier.
    pub const READ_DATA_BY_IDENTIFIER: u8 = 0x22;
    /// WriteDataByIdentifier.
    pub const WRITE_DATA_BY_IDENTIFIER: u8 = 0x2E;
    /// InputOutputControlByIdentifier.
    pub const IO_CONTROL_BY_IDENTIFIER: u8 = 0x2F;
    /// RoutineControl.
    pub const ROUTINE_CONTROL: u8 = 0x31;
    /// First byte of every negative response.
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;
    /// Added to the request service id in a positive response.
    pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;
}

/// ECUReset reset types.
pub mod reset_type {
    /// Hard reset.
    pub const HARD_RESET: u8 = 0x01;
}

/// ReadDTCInformation sub-functions.
pub mod dtc_sub_function {
    /// reportDTCByStatusMask.
    pub const REPORT_DTC_BY_STATUS_MASK: u8 = 0x02;
    /// reportSupportedDTC.
    pub const REPORT_SUPPORTED_DTC: u8 = 0x0A;
}

/// RoutineControl sub-functions.
pub mod routine_sub_function {
    /// startRoutine.
    pub const START_ROUTINE: u8 = 0x01;
}

/// Data identifiers.
pub mod did {
    /// Speed sensor data, front-left. FR, RL and RR follow.
    pub const SPEED_SENSOR_FL: u16 = 0xF100;
    /// Speed sensor data, rear-right.
    pub const SPEED_SENSOR_RR: u16 = 0xF103;
    /// Calibration parameters, front-left. FR, RL and RR follow.
    pub const CALIBRATION_FL: u16 = 0xF110;
    /// Calibration parameters, rear-right.
    pub const CALIBRATION_RR: u16 = 0xF113;
    /// Aggregate system status.
    pub const SYSTEM_STATUS: u16 = 0xF120;
    /// Per-wheel malfunction occurrence counters.
    pub const MALFUNCTION_COUNTER: u16 = 0xF121;
    /// Active diagnostic session.
    pub const DIAGNOSTIC_SESSION: u16 = 0xF1F0;
}

/// Routine identifiers.
pub mod rid {
    /// Start calibration, front-left. FR, RL and RR follow.
    pub const START_CALIBRATION_FL: u16 = 0x0201;
    /// Start calibration, rear-right.
    pub const START_CALIBRATION_RR: u16 = 0x0204;
    /// Validate calibration.
    pub const VALIDATE_CALIBRATION: u16 = 0x0210;
    /// Reset every wheel to factory calibration.
    pub const RESET_CALIBRATION_ALL: u16 = 0x0220;
    /// Sensor self-test.
    pub const SELF_TEST: u16 = 0x0230;
}

/// DTC numbers (24 bit).
pub mod dtc {
    /// Speed sensor miscalibrated, front-left. Add the wheel index for the others.
    pub const SPEED_SENSOR_MISCALIBRATED_FL: u32 = 0xC1_4100;
    /// Speed sensor failure, front-left. Add the wheel index for the others.
    pub const SPEED_SENSOR_FAILURE_FL: u32 = 0xC1_4200;
    /// General ABS system malfunction.
    pub const SYSTEM_MALFUNCTION: u32 = 0xC1_4300;
    /// Wheel speeds disagree.
    pub const SPEED_PLAUSIBILITY: u32 = 0xC1_4400;
    /// Group value that addresses every DTC in ClearDiagnosticInformation.
    pub const GROUP_ALL: u32 = 0xFF_FFFF;
}

/// Session timing parameters echoed by DiagnosticSessionControl.
pub mod timing {
    /// P2 server max (ms).
    pub const P2_SERVER_MAX_MS: u16 = 50;
    /// P2* server max (ms).
    pub const P2_STAR_SERVER_MAX_MS: u16 = 500;
}
