//! Script-visible `device` module: procedures and functions callable from BASIC programs.
//!
//! Every entry takes a parameter slice and a return slot. On failure the entry returns `false`
//! and leaves an error message in the return slot.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::core::gateway::HostCaller;
use crate::core::host::Host;
use crate::core::sensor::{SensorKind, SensorReading};
use crate::runtime::bridge::Bridge;

pub const MODULE_NAME: &str = "device";
pub const ERR_PARAM: &str = "invalid parameter";
pub const ERR_SENSOR: &str = "sensor not active";

/// Interpreter value exchanged with library entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScriptValue {
    #[default]
    Nil,
    Int(i64),
    Real(f64),
    Str(String),
    Map(BTreeMap<String, ScriptValue>),
}

impl ScriptValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value, accepting integers and reals.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ScriptValue::Int(value) => Some(*value as f64),
            ScriptValue::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        match self {
            ScriptValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    fn error(message: &str) -> Self {
        ScriptValue::Str(message.to_string())
    }
}

impl From<Value> for ScriptValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ScriptValue::Nil,
            Value::Bool(flag) => ScriptValue::Int(i64::from(flag)),
            Value::Number(number) => match number.as_i64() {
                Some(int) => ScriptValue::Int(int),
                None => ScriptValue::Real(number.as_f64().unwrap_or_default()),
            },
            Value::String(text) => ScriptValue::Str(text),
            Value::Array(items) => ScriptValue::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item.into()))
                    .collect(),
            ),
            Value::Object(fields) => ScriptValue::Map(
                fields
                    .into_iter()
                    .map(|(key, item)| (key, item.into()))
                    .collect(),
            ),
        }
    }
}

/// Device capabilities the library entries drive.
pub trait DeviceServices {
    fn gps_on(&mut self) -> bool;
    fn gps_off(&mut self) -> bool;
    /// Returns the sensor name when it could be enabled.
    fn sensor_on(&mut self, kind: SensorKind) -> Option<String>;
    fn sensor_off(&mut self);
    fn tts_pitch(&mut self, pitch: f32);
    fn tts_rate(&mut self, rate: f32);
    fn tts_lang(&mut self, locale: &str);
    fn tts_off(&mut self);
    fn speak(&mut self, text: &str);
    /// Location as the host's JSON object text.
    fn location(&mut self) -> String;
    /// Active sensor name and its latest reading, if one has arrived yet.
    fn sensor_reading(&self) -> Option<(String, Option<SensorReading>)>;
    fn close_handlers(&mut self);
}

impl<H: Host> DeviceServices for Bridge<H> {
    fn gps_on(&mut self) -> bool {
        HostCaller::new(&self.host).get_boolean("requestLocationUpdates")
    }

    fn gps_off(&mut self) -> bool {
        HostCaller::new(&self.host).get_boolean("removeLocationUpdates")
    }

    fn sensor_on(&mut self, kind: SensorKind) -> Option<String> {
        self.enable_sensor(kind)
    }

    fn sensor_off(&mut self) {
        self.disable_sensor();
    }

    fn tts_pitch(&mut self, pitch: f32) {
        HostCaller::new(&self.host).set_float("setTtsPitch", pitch);
    }

    fn tts_rate(&mut self, rate: f32) {
        HostCaller::new(&self.host).set_float("setTtsRate", rate);
    }

    fn tts_lang(&mut self, locale: &str) {
        HostCaller::new(&self.host).set_string("setTtsLocale", locale);
    }

    fn tts_off(&mut self) {
        HostCaller::new(&self.host).get_boolean("setTtsQuiet");
    }

    fn speak(&mut self, text: &str) {
        HostCaller::new(&self.host).set_string_bytes("speak", text.as_bytes());
    }

    fn location(&mut self) -> String {
        HostCaller::new(&self.host).get_string("getLocation")
    }

    fn sensor_reading(&self) -> Option<(String, Option<SensorReading>)> {
        let name = self.sensor_name()?.to_string();
        Some((name, self.shared.sensor.load()))
    }

    fn close_handlers(&mut self) {
        HostCaller::new(&self.host).get_boolean("closeLibHandlers");
    }
}

type LibEntry = fn(&mut dyn DeviceServices, &[ScriptValue], &mut ScriptValue) -> bool;

pub struct LibProc {
    pub name: &'static str,
    pub exec: LibEntry,
}

pub static PROCS: [LibProc; 9] = [
    LibProc {
        name: "GPS_ON",
        exec: gps_on,
    },
    LibProc {
        name: "GPS_OFF",
        exec: gps_off,
    },
    LibProc {
        name: "SENSOR_ON",
        exec: sensor_on,
    },
    LibProc {
        name: "SENSOR_OFF",
        exec: sensor_off,
    },
    LibProc {
        name: "TTS_PITCH",
        exec: tts_pitch,
    },
    LibProc {
        name: "TTS_RATE",
        exec: tts_rate,
    },
    LibProc {
        name: "TTS_LANG",
        exec: tts_lang,
    },
    LibProc {
        name: "TTS_OFF",
        exec: tts_off,
    },
    LibProc {
        name: "SPEAK",
        exec: speak,
    },
];

pub static FUNCS: [LibProc; 2] = [
    LibProc {
        name: "LOCATION",
        exec: location,
    },
    LibProc {
        name: "SENSOR",
        exec: sensor,
    },
];

fn find<'a>(table: &'a [LibProc], name: &str) -> Option<&'a LibProc> {
    table
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

/// Run procedure `name`. Unknown names return `false` and leave `retval` untouched.
pub fn exec_proc(
    services: &mut dyn DeviceServices,
    name: &str,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    match find(&PROCS, name) {
        Some(entry) => (entry.exec)(services, params, retval),
        None => false,
    }
}

/// Run function `name`, placing its result in `retval`.
pub fn exec_func(
    services: &mut dyn DeviceServices,
    name: &str,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    match find(&FUNCS, name) {
        Some(entry) => (entry.exec)(services, params, retval),
        None => false,
    }
}

/// Module teardown: release host listeners and the sensor.
pub fn close(services: &mut dyn DeviceServices) {
    services.close_handlers();
    services.sensor_off();
}

fn gps_on(services: &mut dyn DeviceServices, _: &[ScriptValue], _: &mut ScriptValue) -> bool {
    services.gps_on();
    true
}

fn gps_off(services: &mut dyn DeviceServices, _: &[ScriptValue], _: &mut ScriptValue) -> bool {
    services.gps_off();
    true
}

fn sensor_on(
    services: &mut dyn DeviceServices,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let kind = match params {
        [selector] => selector.as_int().and_then(SensorKind::from_index),
        _ => None,
    };
    match kind.and_then(|kind| services.sensor_on(kind)) {
        Some(_) => true,
        None => {
            *retval = ScriptValue::error(ERR_SENSOR);
            false
        }
    }
}

fn sensor_off(services: &mut dyn DeviceServices, _: &[ScriptValue], _: &mut ScriptValue) -> bool {
    services.sensor_off();
    true
}

fn single_real(params: &[ScriptValue]) -> Option<f32> {
    match params {
        [value] => value.as_real().map(|value| value as f32),
        _ => None,
    }
}

fn single_str(params: &[ScriptValue]) -> Option<&str> {
    match params {
        [value] => value.as_str(),
        _ => None,
    }
}

fn tts_pitch(
    services: &mut dyn DeviceServices,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let Some(pitch) = single_real(params) else {
        *retval = ScriptValue::error(ERR_PARAM);
        return false;
    };
    services.tts_pitch(pitch);
    true
}

fn tts_rate(
    services: &mut dyn DeviceServices,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let Some(rate) = single_real(params) else {
        *retval = ScriptValue::error(ERR_PARAM);
        return false;
    };
    services.tts_rate(rate);
    true
}

fn tts_lang(
    services: &mut dyn DeviceServices,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let Some(locale) = single_str(params) else {
        *retval = ScriptValue::error(ERR_PARAM);
        return false;
    };
    services.tts_lang(locale);
    true
}

fn tts_off(services: &mut dyn DeviceServices, _: &[ScriptValue], _: &mut ScriptValue) -> bool {
    services.tts_off();
    true
}

fn speak(
    services: &mut dyn DeviceServices,
    params: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let Some(text) = single_str(params) else {
        *retval = ScriptValue::error(ERR_PARAM);
        return false;
    };
    services.speak(text);
    true
}

fn location(
    services: &mut dyn DeviceServices,
    _: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let text = services.location();
    *retval = if text.trim().is_empty() {
        ScriptValue::Map(BTreeMap::new())
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => value.into(),
            Ok(other) => {
                warn!(location = %other, "location is not an object");
                ScriptValue::Map(BTreeMap::new())
            }
            Err(err) => {
                warn!(error = %err, "failed to parse location");
                ScriptValue::Map(BTreeMap::new())
            }
        }
    };
    true
}

fn sensor(
    services: &mut dyn DeviceServices,
    _: &[ScriptValue],
    retval: &mut ScriptValue,
) -> bool {
    let mut map = BTreeMap::new();
    if let Some((name, reading)) = services.sensor_reading() {
        map.insert("name".to_string(), ScriptValue::Str(name));
        if let Some(reading) = reading {
            let [x, y, z] = reading.values.map(f64::from);
            match reading.kind {
                kind if kind.is_vector() => {
                    map.insert("x".to_string(), ScriptValue::Real(x));
                    map.insert("y".to_string(), ScriptValue::Real(y));
                    map.insert("z".to_string(), ScriptValue::Real(z));
                }
                SensorKind::Proximity => {
                    map.insert("distance".to_string(), ScriptValue::Real(x));
                }
                _ => {
                    map.insert("light".to_string(), ScriptValue::Real(x));
                }
            }
        }
    }
    *retval = ScriptValue::Map(map);
    true
}

#[cfg(test)]
mod tests {
    use super::{
        exec_func, exec_proc, DeviceServices, ScriptValue, ERR_PARAM, ERR_SENSOR, FUNCS, PROCS,
    };
    use crate::core::sensor::{SensorKind, SensorReading};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeDevice {
        log: Vec<String>,
        sensor: Option<(String, Option<SensorReading>)>,
        location: String,
    }

    impl DeviceServices for FakeDevice {
        fn gps_on(&mut self) -> bool {
            self.log.push("gps_on".into());
            true
        }
        fn gps_off(&mut self) -> bool {
            self.log.push("gps_off".into());
            true
        }
        fn sensor_on(&mut self, kind: SensorKind) -> Option<String> {
            self.log.push(format!("sensor_on {kind:?}"));
            (kind != SensorKind::Proximity).then(|| "fake".to_string())
        }
        fn sensor_off(&mut self) {
            self.log.push("sensor_off".into());
        }
        fn tts_pitch(&mut self, pitch: f32) {
            self.log.push(format!("pitch {pitch}"));
        }
        fn tts_rate(&mut self, rate: f32) {
            self.log.push(format!("rate {rate}"));
        }
        fn tts_lang(&mut self, locale: &str) {
            self.log.push(format!("lang {locale}"));
        }
        fn tts_off(&mut self) {
            self.log.push("tts_off".into());
        }
        fn speak(&mut self, text: &str) {
            self.log.push(format!("speak {text}"));
        }
        fn location(&mut self) -> String {
            self.location.clone()
        }
        fn sensor_reading(&self) -> Option<(String, Option<SensorReading>)> {
            self.sensor.clone()
        }
        fn close_handlers(&mut self) {
            self.log.push("close".into());
        }
    }

    #[test]
    fn tables_list_every_entry() {
        let procs: Vec<_> = PROCS.iter().map(|entry| entry.name).collect();
        assert_eq!(
            procs,
            vec![
                "GPS_ON",
                "GPS_OFF",
                "SENSOR_ON",
                "SENSOR_OFF",
                "TTS_PITCH",
                "TTS_RATE",
                "TTS_LANG",
                "TTS_OFF",
                "SPEAK"
            ]
        );
        let funcs: Vec<_> = FUNCS.iter().map(|entry| entry.name).collect();
        assert_eq!(funcs, vec!["LOCATION", "SENSOR"]);
    }

    #[test]
    fn parameter_errors_land_in_the_return_slot() {
        let mut device = FakeDevice::default();
        let mut retval = ScriptValue::Nil;

        assert!(!exec_proc(&mut device, "SPEAK", &[ScriptValue::Int(1)], &mut retval));
        assert_eq!(retval, ScriptValue::Str(ERR_PARAM.into()));

        retval = ScriptValue::Nil;
        assert!(!exec_proc(&mut device, "TTS_RATE", &[], &mut retval));
        assert_eq!(retval, ScriptValue::Str(ERR_PARAM.into()));
        assert!(device.log.is_empty());
    }

    #[test]
    fn numeric_parameters_accept_int_and_real() {
        let mut device = FakeDevice::default();
        let mut retval = ScriptValue::Nil;
        assert!(exec_proc(&mut device, "TTS_PITCH", &[ScriptValue::Int(2)], &mut retval));
        assert!(exec_proc(&mut device, "tts_rate", &[ScriptValue::Real(0.5)], &mut retval));
        assert!(exec_proc(
            &mut device,
            "TTS_LANG",
            &[ScriptValue::Str("en-AU".into())],
            &mut retval
        ));
        assert_eq!(device.log, vec!["pitch 2", "rate 0.5", "lang en-AU"]);
        assert_eq!(retval, ScriptValue::Nil);
    }

    #[test]
    fn sensor_on_reports_inactive_sensor() {
        let mut device = FakeDevice::default();
        let mut retval = ScriptValue::Nil;
        assert!(exec_proc(&mut device, "SENSOR_ON", &[ScriptValue::Int(0)], &mut retval));
        assert!(!exec_proc(&mut device, "SENSOR_ON", &[ScriptValue::Int(4)], &mut retval));
        assert_eq!(retval, ScriptValue::Str(ERR_SENSOR.into()));
        retval = ScriptValue::Nil;
        assert!(!exec_proc(&mut device, "SENSOR_ON", &[ScriptValue::Int(9)], &mut retval));
        assert_eq!(retval, ScriptValue::Str(ERR_SENSOR.into()));
    }

    #[test]
    fn sensor_function_shapes_by_kind() {
        let mut device = FakeDevice {
            sensor: Some((
                "light meter".into(),
                Some(SensorReading::scalar(SensorKind::Light, 12.5)),
            )),
            ..FakeDevice::default()
        };
        let mut retval = ScriptValue::Nil;
        assert!(exec_func(&mut device, "SENSOR", &[], &mut retval));
        assert_eq!(retval.get("name"), Some(&ScriptValue::Str("light meter".into())));
        assert_eq!(retval.get("light"), Some(&ScriptValue::Real(12.5)));
        assert_eq!(retval.get("x"), None);

        device.sensor = Some(("light meter".into(), None));
        assert!(exec_func(&mut device, "SENSOR", &[], &mut retval));
        assert_eq!(retval.get("name"), Some(&ScriptValue::Str("light meter".into())));
        assert_eq!(retval.get("light"), None);

        device.sensor = None;
        assert!(exec_func(&mut device, "SENSOR", &[], &mut retval));
        assert_eq!(retval, ScriptValue::Map(Default::default()));
    }

    #[test]
    fn location_parses_host_json() {
        let mut device = FakeDevice {
            location: r#"{"latitude":-33.5,"longitude":151,"provider":"gps"}"#.into(),
            ..FakeDevice::default()
        };
        let mut retval = ScriptValue::Nil;
        assert!(exec_func(&mut device, "LOCATION", &[], &mut retval));
        assert_eq!(retval.get("latitude"), Some(&ScriptValue::Real(-33.5)));
        assert_eq!(retval.get("longitude"), Some(&ScriptValue::Int(151)));
        assert_eq!(retval.get("provider"), Some(&ScriptValue::Str("gps".into())));

        device.location = "not json".into();
        assert!(exec_func(&mut device, "LOCATION", &[], &mut retval));
        assert_eq!(retval, ScriptValue::Map(Default::default()));
    }

    #[test]
    fn close_releases_handlers_then_sensor() {
        let mut device = FakeDevice::default();
        super::close(&mut device);
        assert_eq!(device.log, vec!["close", "sensor_off"]);
    }

    #[test]
    fn unknown_entries_are_rejected() {
        let mut device = FakeDevice::default();
        let mut retval = ScriptValue::Nil;
        assert!(!exec_proc(&mut device, "LAUNCH", &[], &mut retval));
        assert!(!exec_func(&mut device, "GPS_ON", &[], &mut retval));
        assert_eq!(retval, ScriptValue::Nil);
    }
}
