use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::geometry::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl ZoneBounds {
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    pub fn contains(&self, position: Vec3) -> bool {
        self.contains_xz(position.x, position.z)
    }

    fn is_valid(&self) -> bool {
        let finite = [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|value| value.is_finite());
        finite && self.min_x <= self.max_x && self.min_z <= self.max_z
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub bounds: ZoneBounds,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        brand: impl Into<String>,
        bounds: ZoneBounds,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: brand.into(),
            bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateZoneId,
    InvertedBounds,
}

#[derive(Debug, Clone)]
pub struct CatalogError {
    pub code: CatalogErrorCode,
    pub message: String,
    pub file_path: Option<PathBuf>,
    pub location: Option<SourceLocation>,
}

impl CatalogError {
    pub(crate) fn new(code: CatalogErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            file_path: None,
            location: None,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)?;
        if let Some(path) = &self.file_path {
            write!(f, " (file={})", path.display())?;
        }
        if let Some(loc) = self.location {
            write!(f, " (line={}, column={})", loc.line, loc.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
}

impl ZoneCatalog {
    pub fn new(zones: Vec<Zone>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if zone.id.trim().is_empty() {
                return Err(CatalogError::new(
                    CatalogErrorCode::MissingField,
                    "zone id must not be empty".to_string(),
                ));
            }
            if !seen.insert(zone.id.as_str()) {
                return Err(CatalogError::new(
                    CatalogErrorCode::DuplicateZoneId,
                    format!("duplicate zone id '{}'", zone.id),
                ));
            }
            if !zone.bounds.is_valid() {
                return Err(CatalogError::new(
                    CatalogErrorCode::InvertedBounds,
                    format!(
                        "zone '{}' bounds must be finite with min <= max on both axes",
                        zone.id
                    ),
                ));
            }
        }
        Ok(Self { zones })
    }

    pub fn zone_at(&self, position: Vec3) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.bounds.contains(position))
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.zone(id).is_some()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn museum() -> Self {
        let zones = vec![
            Zone::new(
                "ferrari_front_1",
                "Ferrari Gallery 1",
                "Ferrari",
                ZoneBounds::new(-20.0, -6.0, -120.0, -100.0),
            ),
            Zone::new(
                "ferrari_front_2",
                "Ferrari Gallery 2",
                "Ferrari",
                ZoneBounds::new(6.0, 20.0, -120.0, -100.0),
            ),
            Zone::new(
                "ferrari_front_3",
                "Ferrari Gallery 3",
                "Ferrari",
                ZoneBounds::new(-20.0, 20.0, -100.0, -60.0),
            ),
            Zone::new(
                "tesla_left_1",
                "Tesla Gallery 1",
                "Tesla",
                ZoneBounds::new(-120.0, -100.0, -20.0, 20.0),
            ),
            Zone::new(
                "tesla_left_2",
                "Tesla Gallery 2",
                "Tesla",
                ZoneBounds::new(-100.0, -80.0, -20.0, 20.0),
            ),
            Zone::new(
                "tesla_left_3",
                "Tesla Gallery 3",
                "Tesla",
                ZoneBounds::new(-80.0, -60.0, -20.0, 20.0),
            ),
            Zone::new(
                "porsche_back_1",
                "Porsche Gallery 1",
                "Porsche",
                ZoneBounds::new(-20.0, 20.0, 100.0, 120.0),
            ),
            Zone::new(
                "porsche_back_2",
                "Porsche Gallery 2",
                "Porsche",
                ZoneBounds::new(-20.0, 20.0, 80.0, 100.0),
            ),
            Zone::new(
                "porsche_back_3",
                "Porsche Gallery 3",
                "Porsche",
                ZoneBounds::new(-20.0, 20.0, 60.0, 80.0),
            ),
            Zone::new(
                "bmw_right_1",
                "BMW Gallery 1",
                "BMW",
                ZoneBounds::new(100.0, 120.0, -20.0, 20.0),
            ),
            Zone::new(
                "bmw_right_2",
                "BMW Gallery 2",
                "BMW",
                ZoneBounds::new(80.0, 100.0, -20.0, 20.0),
            ),
            Zone::new(
                "bmw_right_3",
                "BMW Gallery 3",
                "BMW",
                ZoneBounds::new(60.0, 80.0, -20.0, 20.0),
            ),
            Zone::new(
                "center",
                "Central Hall",
                "Center",
                ZoneBounds::new(-30.0, 30.0, -30.0, 30.0),
            ),
        ];
        Self::new(zones).expect("built-in museum catalog is valid")
    }
}
