//! Raw calibration data.
//!
//! Saturated steam properties follow Keenan & Keyes. Valve events follow
//! Perwall's port-opening data, cylinder pressure ratios follow Henderson's
//! plates, boiler efficiency follows the Pennsylvania test plant curves.
//! Units are those of the published tables.

/// Boiler pressure keys (psig).
pub const PRESSURE_PSIG: [f64; 20] = [
    0.0, 5.3, 25.3, 45.3, 65.3, 85.3, 105.3, 125.3, 145.3, 165.3, 185.3, 205.3, 225.3, 245.3,
    265.3, 285.3, 335.3, 385.3, 435.3, 485.3,
];

/// Saturation temperature (°F) at [`PRESSURE_PSIG`].
pub const SATURATION_TEMP_F: [f64; 20] = [
    212.0, 227.96, 267.25, 292.71, 312.03, 327.81, 341.25, 353.02, 363.53, 373.06, 381.79, 389.86,
    397.37, 404.42, 411.05, 417.33, 431.72, 444.59, 456.28, 467.01,
];

/// Enthalpy of saturated water (BTU/lb).
pub const WATER_HEAT_BTU_PER_LB: [f64; 20] = [
    180.07, 196.16, 236.03, 262.09, 282.02, 298.40, 312.44, 324.82, 335.93, 346.03, 355.36, 364.02,
    372.12, 379.76, 386.98, 393.84, 409.69, 424.0, 437.2, 449.4,
];

/// Density of saturated water (lb/ft³).
pub const WATER_DENSITY_LB_PER_FT3: [f64; 20] = [
    59.81, 59.42, 58.31, 57.54, 56.92, 55.90, 55.49, 55.10, 54.73, 54.73, 54.38, 54.05, 53.76,
    53.48, 53.19, 52.91, 52.27, 51.81, 51.28, 50.76,
];

/// Enthalpy of dry saturated steam (BTU/lb).
pub const STEAM_HEAT_BTU_PER_LB: [f64; 20] = [
    1150.0, 1156.3, 1169.7, 1177.6, 1183.1, 1187.2, 1190.4, 1193.0, 1195.1, 1196.9, 1198.4,
    1199.6, 1200.6, 1201.5, 1202.3, 1202.8, 1203.9, 1204.5, 1204.6, 1204.4,
];

/// Density of dry saturated steam (lb/ft³).
pub const STEAM_DENSITY_LB_PER_FT3: [f64; 20] = [
    0.0373, 0.0498, 0.0953, 0.1394, 0.1827, 0.2256, 0.2682, 0.3106, 0.3529, 0.3949, 0.4371,
    0.4792, 0.5213, 0.5634, 0.6057, 0.6480, 0.7541, 0.8611, 0.9690, 1.0778,
];

/// Water temperature (K) of the first specific heat entry; entries step by
/// [`SPECIFIC_HEAT_STEP_K`].
pub const SPECIFIC_HEAT_START_K: f64 = 274.0;
pub const SPECIFIC_HEAT_STEP_K: f64 = 7.4;

/// Specific heat of water (kJ/kg·K).
pub const WATER_SPECIFIC_HEAT_KJ_PER_KG_K: [f64; 31] = [
    4.2170, 4.2049, 4.2165, 4.2223, 4.2287, 4.2355, 4.2427, 4.2505, 4.2587, 4.2675, 4.2769,
    4.2926, 4.3035, 4.3151, 4.3274, 4.3405, 4.3543, 4.3690, 4.3846, 4.4012, 4.4187, 4.4374,
    4.4573, 4.4784, 4.5009, 4.5248, 4.5503, 4.5774, 4.6064, 4.6373, 4.6703,
];

/// Saturation temperature (K) at gauge pressures 0, 10, ... 300 psig.
pub const SATURATION_TEMP_K: [f64; 31] = [
    372.76, 388.11, 398.94, 407.45, 414.53, 420.62, 426.01, 430.84, 435.23, 439.27, 443.02,
    446.51, 449.79, 452.88, 455.80, 458.58, 461.23, 463.77, 466.20, 468.53, 470.78, 472.94,
    475.03, 477.06, 479.02, 480.92, 482.76, 484.56, 486.30, 488.00, 489.66,
];

/// Pressure step (psig) of [`SATURATION_TEMP_K`].
pub const SATURATION_PRESSURE_STEP_PSIG: f64 = 10.0;

/// Grate combustion rate keys (lb/ft²/h).
pub const GRATE_RATE_LB_PER_FT2_H: [f64; 12] = [
    0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0,
];

pub const SATURATED_BOILER_EFFICIENCY: [f64; 12] = [
    0.80, 0.749, 0.69, 0.63, 0.571, 0.512, 0.452, 0.393, 0.334, 0.274, 0.215, 0.156,
];

pub const SUPERHEATED_BOILER_EFFICIENCY: [f64; 12] = [
    0.903, 0.8484, 0.7936, 0.7390, 0.6843, 0.6296, 0.5749, 0.5202, 0.4655, 0.4108, 0.3561,
    0.3014,
];

/// Cutoff keys (fraction of stroke) for the valve-event curves.
pub const EVENT_CUTOFF: [f64; 16] = [
    0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.75, 0.8,
];

/// Stroke fraction at which the exhaust port opens (release).
pub const EVENT_EXHAUST_OPEN: [f64; 16] = [
    0.5306, 0.6122, 0.6646, 0.7042, 0.7358, 0.7628, 0.7866, 0.8076, 0.8270, 0.8451, 0.8626,
    0.8792, 0.8955, 0.9112, 0.9269, 0.9422,
];

/// Stroke fraction, measured back from the end of the return stroke, over
/// which the exhaust is closed and the cushion steam is compressed.
pub const EVENT_COMPRESSION_CLOSE: [f64; 16] = [
    0.4580, 0.3864, 0.3418, 0.3082, 0.2811, 0.2575, 0.2363, 0.2170, 0.1988, 0.1814, 0.1641,
    0.1471, 0.1299, 0.1127, 0.0950, 0.0771,
];

/// Stroke fraction, measured back from the end of the return stroke, over
/// which steam is admitted before dead centre (lead).
pub const EVENT_ADMISSION_OPEN: [f64; 16] = [
    0.0241, 0.0121, 0.0080, 0.0058, 0.0046, 0.0037, 0.0030, 0.0026, 0.0022, 0.0019, 0.0015,
    0.0013, 0.0011, 0.0009, 0.0008, 0.0006,
];

/// Cutoff keys for the condensation curves.
pub const CONDENSATION_CUTOFF: [f64; 11] = [
    0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.55,
];

/// Fraction of admitted saturated steam lost to cylinder condensation.
pub const CONDENSATION_FRACTION: [f64; 11] = [
    0.526, 0.42, 0.345, 0.29, 0.245, 0.213, 0.181, 0.159, 0.142, 0.125, 0.11,
];

/// Superheat (°F) needed to suppress cylinder condensation.
pub const SUPERHEAT_CONDENSATION_LIMIT_F: [f64; 11] = [
    265.0, 245.0, 223.0, 190.0, 166.0, 145.0, 128.0, 110.0, 100.0, 75.0, 60.0,
];

/// Cylinder steam flow keys (lb/h) for the superheat curve, step 2000.
pub const SUPERHEAT_FLOW_STEP_LB_PER_H: f64 = 2_000.0;

/// Superheat (°F above saturation) reached at the keyed steam flow.
pub const SUPERHEAT_TEMP_F: [f64; 19] = [
    0.0, 40.0, 70.0, 100.0, 140.0, 164.0, 195.0, 220.0, 242.0, 260.0, 278.0, 290.0, 304.0,
    320.0, 335.0, 348.0, 360.0, 375.0, 384.0,
];

/// Wheel speed keys (rpm), step 50, for the initial pressure drop curve.
pub const WHEEL_RPM_STEP: f64 = 50.0;

/// Ratio of cylinder initial pressure to steam chest pressure (wire
/// drawing) for saturated engines.
pub const SATURATED_INITIAL_PRESSURE_RATIO: [f64; 16] = [
    0.98, 0.965, 0.95, 0.935, 0.92, 0.905, 0.89, 0.875, 0.87, 0.865, 0.8625, 0.86, 0.8575, 0.855,
    0.8525, 0.85,
];

/// Piston speed keys (ft/min), step 100.
pub const PISTON_SPEED_STEP_FT_PER_MIN: f64 = 100.0;

pub const SATURATED_SPEED_FACTOR: [f64; 22] = [
    1.0, 1.0, 1.0, 0.954, 0.863, 0.772, 0.680, 0.590, 0.517, 0.460, 0.412, 0.372, 0.337, 0.307,
    0.283, 0.261, 0.241, 0.225, 0.213, 0.202, 0.190, 0.185,
];

pub const SUPERHEATED_SPEED_FACTOR: [f64; 22] = [
    1.0, 1.0, 1.0, 0.988, 0.965, 0.912, 0.859, 0.800, 0.753, 0.706, 0.659, 0.612, 0.571, 0.535,
    0.500, 0.471, 0.447, 0.433, 0.424, 0.420, 0.410, 0.410,
];

/// Wheel speed rows (rpm) of the cutoff pressure ratio tables.
pub const CUTOFF_RATIO_RPM: [f64; 8] = [0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0];

/// Cutoff columns of the cutoff pressure ratio tables.
pub const CUTOFF_RATIO_CUTOFF: [f64; 11] =
    [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Ratio of cutoff to initial pressure, wide port opening (upper bound).
pub const CUTOFF_RATIO_UPPER: [[f64; 11]; 8] = [
    [1.0; 11],
    [0.79, 0.82, 0.83, 0.86, 0.875, 0.9, 0.92, 0.94, 0.96, 0.98, 1.0],
    [0.72, 0.74, 0.77, 0.795, 0.825, 0.85, 0.875, 0.9, 0.925, 0.955, 0.98],
    [0.68, 0.71, 0.735, 0.76, 0.7875, 0.8125, 0.84, 0.87, 0.9, 0.93, 0.9575],
    [0.66, 0.68, 0.705, 0.727, 0.757, 0.78, 0.81, 0.84, 0.875, 0.908, 0.938],
    [0.645, 0.665, 0.6875, 0.71, 0.73, 0.76, 0.788, 0.81, 0.85, 0.88, 0.913],
    [0.63, 0.6475, 0.665, 0.68, 0.71, 0.73, 0.7625, 0.79, 0.81, 0.85, 0.877],
    [0.6125, 0.63, 0.65, 0.663, 0.6875, 0.7125, 0.7425, 0.775, 0.809, 0.8375, 0.865],
];

/// Ratio of cutoff to initial pressure, narrow port opening (lower bound).
pub const CUTOFF_RATIO_LOWER: [[f64; 11]; 8] = [
    [1.0; 11],
    [0.745, 0.76, 0.77, 0.7875, 0.8125, 0.8375, 0.865, 0.9, 0.93, 0.97, 1.0],
    [0.6875, 0.6875, 0.69, 0.708, 0.725, 0.755, 0.79, 0.83, 0.88, 0.9325, 0.9875],
    [0.64, 0.64, 0.645, 0.6525, 0.67, 0.6975, 0.731, 0.775, 0.825, 0.875, 0.93],
    [0.61, 0.61, 0.61, 0.6125, 0.625, 0.65, 0.68, 0.72, 0.775, 0.83, 0.88],
    [0.5775, 0.5775, 0.5775, 0.585, 0.595, 0.62, 0.653, 0.69, 0.7375, 0.7825, 0.825],
    [0.55, 0.55, 0.55, 0.5575, 0.57, 0.59, 0.62, 0.6575, 0.6925, 0.73, 0.7675],
    [0.52, 0.52, 0.52, 0.528, 0.545, 0.57, 0.60, 0.635, 0.67, 0.7075, 0.74],
];

/// Live steam injector delivery pressure keys (psig).
pub const INJECTOR_PRESSURE_PSIG: [f64; 14] = [
    25.0, 50.0, 75.0, 100.0, 125.0, 150.0, 175.0, 200.0, 225.0, 250.0, 275.0, 300.0, 325.0, 350.0,
];

/// Water delivered per pound of steam used by a live steam injector.
pub const INJECTOR_WATER_PER_STEAM: [f64; 14] = [
    25.9, 20.0, 17.2, 15.2, 14.0, 12.8, 11.8, 10.7, 9.7, 8.6, 7.6, 6.6, 5.5, 4.6,
];

/// Default exhaust back pressure (psig) against indicated horsepower.
pub const BACK_PRESSURE_IHP: [f64; 5] = [0.0, 1_000.0, 2_000.0, 3_000.0, 4_000.0];
pub const BACK_PRESSURE_PSIG: [f64; 5] = [0.0, 1.5, 4.0, 7.0, 11.0];
