use std::collections::HashSet;
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use super::zones::{
    CatalogError, CatalogErrorCode, SourceLocation, Zone, ZoneBounds, ZoneCatalog,
};

impl ZoneCatalog {
    pub fn from_xml_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError {
            code: CatalogErrorCode::ReadFile,
            message: format!("failed to read zone catalog: {source}"),
            file_path: Some(path.to_path_buf()),
            location: None,
        })?;
        Self::from_xml_str(&raw).map_err(|mut error| {
            error.file_path = Some(path.to_path_buf());
            error
        })
    }

    pub fn from_xml_str(raw: &str) -> Result<Self, CatalogError> {
        let doc = Document::parse(raw).map_err(|error| CatalogError {
            code: CatalogErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            file_path: None,
            location: Some(SourceLocation {
                line: error.pos().row as usize,
                column: error.pos().col as usize,
            }),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Zones" {
            return Err(error_at_node(
                CatalogErrorCode::InvalidRoot,
                "root element must be <Zones>".to_string(),
                &doc,
                root,
            ));
        }

        let mut zones = Vec::<Zone>::new();
        let mut seen_ids = HashSet::<String>::new();
        for child in root.children().filter(|node| node.is_element()) {
            if child.tag_name().name() != "Zone" {
                return Err(error_at_node(
                    CatalogErrorCode::UnknownElement,
                    format!(
                        "unsupported element <{}>; expected <Zone>",
                        child.tag_name().name()
                    ),
                    &doc,
                    child,
                ));
            }
            let zone = parse_zone(&doc, child)?;
            if !seen_ids.insert(zone.id.clone()) {
                return Err(error_at_node(
                    CatalogErrorCode::DuplicateZoneId,
                    format!("duplicate zone id '{}'", zone.id),
                    &doc,
                    child,
                ));
            }
            if zone.bounds.min_x > zone.bounds.max_x || zone.bounds.min_z > zone.bounds.max_z {
                return Err(error_at_node(
                    CatalogErrorCode::InvertedBounds,
                    format!("zone '{}' has min greater than max", zone.id),
                    &doc,
                    child,
                ));
            }
            zones.push(zone);
        }

        ZoneCatalog::new(zones)
    }
}

fn parse_zone(doc: &Document<'_>, node: Node<'_, '_>) -> Result<Zone, CatalogError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut brand: Option<String> = None;
    let mut min_x: Option<f32> = None;
    let mut max_x: Option<f32> = None;
    let mut min_z: Option<f32> = None;
    let mut max_z: Option<f32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                CatalogErrorCode::DuplicateField,
                format!("duplicate field <{}> in <Zone>", field_name),
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "id" => id = Some(required_text(doc, field, "id")?),
            "name" => name = Some(required_text(doc, field, "name")?),
            "brand" => brand = Some(required_text(doc, field, "brand")?),
            "minX" => min_x = Some(required_coordinate(doc, field, "minX")?),
            "maxX" => max_x = Some(required_coordinate(doc, field, "maxX")?),
            "minZ" => min_z = Some(required_coordinate(doc, field, "minZ")?),
            "maxZ" => max_z = Some(required_coordinate(doc, field, "maxZ")?),
            _ => {
                return Err(error_at_node(
                    CatalogErrorCode::UnknownField,
                    format!("unknown field <{}> in <Zone>", field_name),
                    doc,
                    field,
                ))
            }
        }
    }

    let missing = |field: &str| {
        error_at_node(
            CatalogErrorCode::MissingField,
            format!("missing required field <{field}> in <Zone>"),
            doc,
            node,
        )
    };
    let id = id.ok_or_else(|| missing("id"))?;
    let name = name.ok_or_else(|| missing("name"))?;
    let brand = brand.ok_or_else(|| missing("brand"))?;
    let bounds = ZoneBounds::new(
        min_x.ok_or_else(|| missing("minX"))?,
        max_x.ok_or_else(|| missing("maxX"))?,
        min_z.ok_or_else(|| missing("minZ"))?,
        max_z.ok_or_else(|| missing("maxZ"))?,
    );

    Ok(Zone {
        id,
        name,
        brand,
        bounds,
    })
}

fn required_text(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, CatalogError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            CatalogErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            doc,
            node,
        ));
    }
    Ok(value)
}

fn required_coordinate(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, CatalogError> {
    let value = required_text(doc, node, field_name)?;
    match value.parse::<f32>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(error_at_node(
            CatalogErrorCode::InvalidValue,
            format!("{field_name} '{value}' is not a finite number"),
            doc,
            node,
        )),
    }
}

fn error_at_node(
    code: CatalogErrorCode,
    message: String,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> CatalogError {
    let pos = doc.text_pos_at(node.range().start);
    CatalogError {
        code,
        message,
        file_path: None,
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
