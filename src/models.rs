use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Column order of the single-row frame handed to the pipeline.
pub const FEATURE_COLUMNS: [&str; 21] = [
    "device_id",
    "battery_power",
    "blue",
    "clock_speed",
    "dual_sim",
    "fc",
    "four_g",
    "int_memory",
    "m_dep",
    "mobile_wt",
    "n_cores",
    "pc",
    "px_height",
    "px_width",
    "ram",
    "sc_h",
    "sc_w",
    "talk_time",
    "three_g",
    "touch_screen",
    "wifi",
];

pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Binary hardware flag. Only the integers 0 and 1 deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Flag(bool);

impl Flag {
    pub fn is_set(self) -> bool {
        self.0
    }

    fn as_f64(self) -> f64 {
        if self.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl TryFrom<i64> for Flag {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flag(false)),
            1 => Ok(Flag(true)),
            _ => Err("Value must be 0 or 1".to_string()),
        }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> u8 {
        flag.0 as u8
    }
}

/// Device specifications.
///
/// - battery_power: total energy a battery can store at once, in mAh
/// - blue: has Bluetooth
/// - clock_speed: speed at which the microprocessor executes instructions
/// - dual_sim: has dual SIM support
/// - fc: front camera megapixels
/// - four_g: has 4G
/// - int_memory: internal memory in gigabytes
/// - m_dep: mobile depth in cm
/// - mobile_wt: weight of the phone
/// - n_cores: number of processor cores
/// - pc: primary camera megapixels
/// - px_height / px_width: pixel resolution
/// - ram: random access memory in megabytes
/// - sc_h / sc_w: screen height and width in cm
/// - talk_time: longest time a single battery charge lasts while talking
/// - three_g: has 3G
/// - touch_screen: has a touch screen
/// - wifi: has wifi
///
/// Non-flag fields are not range checked.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeviceSpecs {
    pub battery_power: f64,
    pub blue: Flag,
    pub clock_speed: f64,
    pub dual_sim: Flag,
    pub fc: f64,
    pub four_g: Flag,
    pub int_memory: f64,
    pub m_dep: f64,
    pub mobile_wt: f64,
    pub n_cores: f64,
    pub pc: f64,
    pub px_height: f64,
    pub px_width: f64,
    pub ram: f64,
    pub sc_h: f64,
    pub sc_w: f64,
    pub talk_time: f64,
    pub three_g: Flag,
    pub touch_screen: Flag,
    pub wifi: Flag,
}

impl DeviceSpecs {
    /// Field values in schema order, flags widened to 0.0 / 1.0.
    pub fn named_values(&self) -> [(&'static str, f64); 20] {
        [
            ("battery_power", self.battery_power),
            ("blue", self.blue.as_f64()),
            ("clock_speed", self.clock_speed),
            ("dual_sim", self.dual_sim.as_f64()),
            ("fc", self.fc),
            ("four_g", self.four_g.as_f64()),
            ("int_memory", self.int_memory),
            ("m_dep", self.m_dep),
            ("mobile_wt", self.mobile_wt),
            ("n_cores", self.n_cores),
            ("pc", self.pc),
            ("px_height", self.px_height),
            ("px_width", self.px_width),
            ("ram", self.ram),
            ("sc_h", self.sc_h),
            ("sc_w", self.sc_w),
            ("talk_time", self.talk_time),
            ("three_g", self.three_g.as_f64()),
            ("touch_screen", self.touch_screen.as_f64()),
            ("wifi", self.wifi.as_f64()),
        ]
    }

    pub fn to_row(&self, device_id: i64) -> FeatureRow {
        let mut values = [0f32; FEATURE_COUNT];
        values[0] = device_id as f32;
        for (slot, (_, value)) in values[1..].iter_mut().zip(self.named_values()) {
            *slot = value as f32;
        }
        FeatureRow { values }
    }
}

/// Single-row tabular input, columns as in [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: [f32; FEATURE_COUNT],
}

impl FeatureRow {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f32> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i])
    }

    /// Renders the row as a two-line markdown table for the request log.
    pub fn to_markdown(&self) -> String {
        let mut header = String::from("|");
        let mut rule = String::from("|");
        let mut row = String::from("|");
        for (column, value) in FEATURE_COLUMNS.iter().zip(self.values.iter()) {
            let cell = value.to_string();
            let width = column.len().max(cell.len());
            let _ = write!(header, " {:>width$} |", column, width = width);
            let _ = write!(rule, "{}|", "-".repeat(width + 2));
            let _ = write!(row, " {:>width$} |", cell, width = width);
        }
        format!("{}\n{}\n{}", header, rule, row)
    }
}

/// Input record augmented with the caller's id and the predicted price.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionRecord {
    pub device_id: i64,
    #[serde(flatten)]
    pub specs: DeviceSpecs,
    pub predicted_price: f64,
}

impl PredictionRecord {
    pub fn new(device_id: i64, specs: DeviceSpecs, predicted_price: f64) -> Self {
        PredictionRecord {
            device_id,
            specs,
            predicted_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "battery_power": 3000,
            "blue": 1,
            "clock_speed": 2.0,
            "dual_sim": 0,
            "fc": 5.0,
            "four_g": 1,
            "int_memory": 64.0,
            "m_dep": 0.4,
            "mobile_wt": 150.0,
            "n_cores": 8.0,
            "pc": 12.0,
            "px_height": 1920.0,
            "px_width": 1080.0,
            "ram": 4.0,
            "sc_h": 5.5,
            "sc_w": 2.5,
            "talk_time": 10.0,
            "three_g": 1,
            "touch_screen": 1,
            "wifi": 1
        })
    }

    #[test]
    fn test_specs_accept_integer_for_float_field() {
        let specs: DeviceSpecs = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(specs.battery_power, 3000.0);
        assert!(specs.blue.is_set());
        assert!(!specs.dual_sim.is_set());
    }

    #[test]
    fn test_flag_out_of_domain_rejected() {
        for field in ["blue", "dual_sim", "four_g", "three_g", "touch_screen", "wifi"] {
            let mut body = sample_json();
            body[field] = json!(2);
            let err = serde_json::from_value::<DeviceSpecs>(body).unwrap_err();
            assert!(
                err.to_string().contains("Value must be 0 or 1"),
                "{}: {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_negative_flag_rejected() {
        let mut body = sample_json();
        body["wifi"] = json!(-1);
        assert!(serde_json::from_value::<DeviceSpecs>(body).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut body = sample_json();
        body.as_object_mut().unwrap().remove("ram");
        let err = serde_json::from_value::<DeviceSpecs>(body).unwrap_err();
        assert!(err.to_string().contains("ram"));
    }

    #[test]
    fn test_negative_battery_power_is_not_range_checked() {
        let mut body = sample_json();
        body["battery_power"] = json!(-50.0);
        let specs: DeviceSpecs = serde_json::from_value(body).unwrap();
        assert_eq!(specs.battery_power, -50.0);
    }

    #[test]
    fn test_row_layout() {
        let specs: DeviceSpecs = serde_json::from_value(sample_json()).unwrap();
        let row = specs.to_row(7);
        assert_eq!(row.values().len(), FEATURE_COUNT);
        assert_eq!(row.get("device_id"), Some(7.0));
        assert_eq!(row.get("blue"), Some(1.0));
        assert_eq!(row.get("dual_sim"), Some(0.0));
        assert_eq!(row.get("px_height"), Some(1920.0));
        assert_eq!(row.get("wifi"), Some(1.0));
        assert_eq!(row.get("price"), None);
    }

    #[test]
    fn test_row_narrows_to_f32() {
        let specs: DeviceSpecs = serde_json::from_value(sample_json()).unwrap();
        // The pipeline takes f32 input; ids above 2^24 lose precision.
        let row = specs.to_row(16_777_217);
        assert_eq!(row.get("device_id"), Some(16_777_216.0));

        let mut body = sample_json();
        body["battery_power"] = json!(1e300);
        let specs: DeviceSpecs = serde_json::from_value(body).unwrap();
        assert_eq!(specs.to_row(1).get("battery_power"), Some(f32::INFINITY));
    }

    #[test]
    fn test_markdown_has_every_column() {
        let specs: DeviceSpecs = serde_json::from_value(sample_json()).unwrap();
        let table = specs.to_row(1).to_markdown();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        for column in FEATURE_COLUMNS {
            assert!(lines[0].contains(column));
        }
        assert!(lines[2].contains("1920"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let specs: DeviceSpecs = serde_json::from_value(sample_json()).unwrap();
        let record = PredictionRecord::new(1, specs, 2.5);
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 22);
        assert_eq!(object["device_id"], json!(1));
        assert_eq!(object["blue"], json!(1));
        assert_eq!(object["predicted_price"], json!(2.5));
    }
}
