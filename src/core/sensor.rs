//! Latest-value sensor cell shared between the sensor callback thread and script queries.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    MagneticField,
    Gyroscope,
    Light,
    Proximity,
}

impl SensorKind {
    /// Maps the script-facing selector (`SENSOR_ON n`) to a sensor kind.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(SensorKind::Accelerometer),
            1 => Some(SensorKind::MagneticField),
            2 => Some(SensorKind::Gyroscope),
            3 => Some(SensorKind::Light),
            4 => Some(SensorKind::Proximity),
            _ => None,
        }
    }

    fn tag(self) -> u8 {
        match self {
            SensorKind::Accelerometer => 1,
            SensorKind::MagneticField => 2,
            SensorKind::Gyroscope => 3,
            SensorKind::Light => 4,
            SensorKind::Proximity => 5,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(SensorKind::Accelerometer),
            2 => Some(SensorKind::MagneticField),
            3 => Some(SensorKind::Gyroscope),
            4 => Some(SensorKind::Light),
            5 => Some(SensorKind::Proximity),
            _ => None,
        }
    }

    /// Vector sensors report x/y/z; scalar sensors report only the first component.
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            SensorKind::Accelerometer | SensorKind::MagneticField | SensorKind::Gyroscope
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub values: [f32; 3],
}

impl SensorReading {
    pub fn vector(kind: SensorKind, x: f32, y: f32, z: f32) -> Self {
        Self {
            kind,
            values: [x, y, z],
        }
    }

    pub fn scalar(kind: SensorKind, value: f32) -> Self {
        Self {
            kind,
            values: [value, 0.0, 0.0],
        }
    }
}

/// Most-recent-wins sensor cell.
///
/// Every field is its own atomic, so a reader racing the sensor callback can observe a mix of
/// an old and a new reading (a torn snapshot). That is tolerated: each field is a valid value on
/// its own and the next reading overwrites the cell anyway. There is no history and no
/// backpressure.
#[derive(Debug, Default)]
pub struct SensorSnapshot {
    kind: AtomicU8,
    values: [AtomicU32; 3],
}

impl SensorSnapshot {
    pub fn store(&self, reading: SensorReading) {
        for (slot, value) in self.values.iter().zip(reading.values) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
        self.kind.store(reading.kind.tag(), Ordering::Release);
    }

    pub fn load(&self) -> Option<SensorReading> {
        let kind = SensorKind::from_tag(self.kind.load(Ordering::Acquire))?;
        let mut values = [0.0; 3];
        for (value, slot) in values.iter_mut().zip(&self.values) {
            *value = f32::from_bits(slot.load(Ordering::Relaxed));
        }
        Some(SensorReading { kind, values })
    }

    /// Forget the last reading (sensor switched or disabled).
    pub fn clear(&self) {
        self.kind.store(0, Ordering::Release);
    }
}
