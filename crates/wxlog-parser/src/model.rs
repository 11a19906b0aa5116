use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of positional fields in a [`Record`].
pub const RECORD_WIDTH: usize = 12;

/// Number of fields that are averaged per hour (everything except the
/// timestamp and the flag).
pub const NUMERIC_FIELD_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    DirViento,
    VelViento,
    DirVientoCorr,
    Presion,
    Humedad,
    Temp,
    PuntoRocio,
    PrecipTotal,
    IntensidadPrec,
    Irradiancia,
    FechaIso,
    Flag,
}

impl Field {
    /// All fields in record order.
    pub const ALL: [Field; RECORD_WIDTH] = [
        Field::DirViento,
        Field::VelViento,
        Field::DirVientoCorr,
        Field::Presion,
        Field::Humedad,
        Field::Temp,
        Field::PuntoRocio,
        Field::PrecipTotal,
        Field::IntensidadPrec,
        Field::Irradiancia,
        Field::FechaIso,
        Field::Flag,
    ];

    /// The averaged fields, in record order.
    pub const NUMERIC: [Field; NUMERIC_FIELD_COUNT] = [
        Field::DirViento,
        Field::VelViento,
        Field::DirVientoCorr,
        Field::Presion,
        Field::Humedad,
        Field::Temp,
        Field::PuntoRocio,
        Field::PrecipTotal,
        Field::IntensidadPrec,
        Field::Irradiancia,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Field::FechaIso | Field::Flag)
    }

    /// Column name used in every tabular output.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::DirViento => "DirViento",
            Field::VelViento => "VelViento",
            Field::DirVientoCorr => "DirVientoCorr",
            Field::Presion => "Presion",
            Field::Humedad => "Humedad",
            Field::Temp => "Temp",
            Field::PuntoRocio => "PuntoRocio",
            Field::PrecipTotal => "PrecipTotal",
            Field::IntensidadPrec => "IntensidadPrec",
            Field::Irradiancia => "Irradiancia",
            Field::FechaIso => "FechaISO",
            Field::Flag => "Flag",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// One decoded telemetry frame. Values are kept as the cleaned text tokens;
/// numeric and timestamp coercion happens downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    values: [String; RECORD_WIDTH],
}

impl Record {
    pub fn new(values: [String; RECORD_WIDTH]) -> Self {
        Self { values }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn fecha_iso(&self) -> &str {
        self.get(Field::FechaIso)
    }

    pub fn flag(&self) -> &str {
        self.get(Field::Flag)
    }

    pub fn values(&self) -> &[String; RECORD_WIDTH] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

impl TryFrom<Vec<String>> for Record {
    type Error = Vec<String>;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        let values: [String; RECORD_WIDTH] = tokens.try_into()?;
        Ok(Self { values })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RECORD_WIDTH))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.canonical_name(), value)?;
        }
        map.end()
    }
}
