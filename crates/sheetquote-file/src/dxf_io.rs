//! DXF实体提取
//!
//! 支持的实体：LINE、CIRCLE、ARC、LWPOLYLINE、POLYLINE（二维）、SPLINE。
//! 其他实体类型（文字、标注、填充等）直接忽略，不视为错误。

use crate::document::ExtractedDrawing;
use crate::error::FileError;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use sheetquote_core::entity::Entity;
use sheetquote_core::geometry::{Arc, Circle, Geometry, Line, Polyline, PolylineVertex, Spline};
use sheetquote_core::math::Point2;
use sheetquote_core::units::Unit;
use tracing::{debug, warn};

/// 从DXF文件提取
pub fn extract_file(path: &Path) -> Result<ExtractedDrawing, FileError> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    extract_bytes(&bytes)
}

/// 从内存中的DXF文档提取（支持文本和二进制DXF）
pub fn extract_bytes(bytes: &[u8]) -> Result<ExtractedDrawing, FileError> {
    if !bytes.starts_with(BINARY_SENTINEL) {
        validate_code_pairs(&String::from_utf8_lossy(bytes))?;
    }
    let drawing = dxf::Drawing::load(&mut Cursor::new(bytes))
        .map_err(|e| FileError::Decode(e.to_string()))?;
    Ok(extract_drawing(&drawing))
}

const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

/// 数值型组码：坐标、整数标志、实数及扩展数据
fn is_numeric_group(code: i32) -> bool {
    matches!(code, 10..=59 | 60..=79 | 90..=99 | 140..=147 | 210..=239 | 1010..=1071)
}

/// 逐对检查文本 DXF 的组码与数值
///
/// 解析器遇到无法解析的数值会静默丢弃整个实体，这里提前报错。
fn validate_code_pairs(text: &str) -> Result<(), FileError> {
    let lines: Vec<&str> = text.lines().collect();
    for (pair, chunk) in lines.chunks(2).enumerate() {
        let [code_raw, value] = chunk else {
            break;
        };
        let line = pair * 2 + 1;
        let code_raw = code_raw.trim();
        let code: i32 = code_raw.parse().map_err(|_| {
            FileError::Decode(format!("invalid group code {code_raw:?} at line {line}"))
        })?;

        let value = value.trim();
        if is_numeric_group(code) && !value.is_empty() {
            value.parse::<f64>().map_err(|e| {
                FileError::Decode(format!(
                    "invalid value {value:?} for group code {code} at line {}: {e}",
                    line + 1
                ))
            })?;
        }
    }
    Ok(())
}

/// 从已解码的图纸提取
pub fn extract_drawing(drawing: &dxf::Drawing) -> ExtractedDrawing {
    let units = drawing_units(drawing);
    let scale = units.to_inch_factor();
    let layer_colors = layer_color_table(drawing);

    let mut entities = Vec::new();
    let mut skipped = 0;

    for entity in drawing.entities() {
        let Some(geometry) = convert_dxf_entity(entity) else {
            continue;
        };

        if !geometry.is_finite() {
            warn!("Skipping {} with non-finite coordinates", geometry.type_name());
            skipped += 1;
            continue;
        }
        if geometry.is_degenerate() {
            warn!("Skipping degenerate {}", geometry.type_name());
            skipped += 1;
            continue;
        }

        let geometry = if units.needs_scaling() {
            geometry.scaled(scale)
        } else {
            geometry
        };

        let mut converted = Entity::new(geometry);
        if !entity.common.layer.is_empty() {
            converted = converted.with_layer(entity.common.layer.clone());
        }
        if let Some(index) = resolve_color_index(entity, &layer_colors) {
            converted = converted.with_color_index(index);
        }
        entities.push(converted);
    }

    let extracted = ExtractedDrawing::from_entities(entities, units, skipped);
    debug!(
        "Extracted {} entities ({} skipped), units {:?}, extent {:.3} x {:.3}",
        extracted.entity_count(),
        skipped,
        units,
        extracted.bounding_box.width(),
        extracted.bounding_box.height()
    );
    extracted
}

/// 读取 `$INSUNITS`；未知代码按无单位处理
fn drawing_units(drawing: &dxf::Drawing) -> Unit {
    let code = drawing.header.default_drawing_units as i32;
    Unit::from_insunits(code).unwrap_or_else(|| {
        warn!("Unknown $INSUNITS code {}, assuming inches", code);
        Unit::Unitless
    })
}

/// 图层名（小写）到颜色索引的映射
fn layer_color_table(drawing: &dxf::Drawing) -> HashMap<String, u8> {
    drawing
        .layers()
        .filter_map(|layer| {
            layer
                .color
                .index()
                .map(|index| (layer.name.to_lowercase(), index))
        })
        .collect()
}

/// 解析实体颜色：ByLayer 时取图层颜色
fn resolve_color_index(
    entity: &dxf::entities::Entity,
    layer_colors: &HashMap<String, u8>,
) -> Option<u8> {
    let color = &entity.common.color;
    if color.is_by_layer() {
        layer_colors
            .get(&entity.common.layer.to_lowercase())
            .copied()
    } else {
        color.index()
    }
}

/// 将DXF实体转换为几何；不支持的类型返回 None
fn convert_dxf_entity(entity: &dxf::entities::Entity) -> Option<Geometry> {
    let geometry = match &entity.specific {
        dxf::entities::EntityType::Line(line) => {
            let start = Point2::new(line.p1.x, line.p1.y);
            let end = Point2::new(line.p2.x, line.p2.y);
            Geometry::Line(Line::new(start, end))
        }

        dxf::entities::EntityType::Circle(circle) => {
            let center = Point2::new(circle.center.x, circle.center.y);
            Geometry::Circle(Circle::new(center, circle.radius))
        }

        dxf::entities::EntityType::Arc(arc) => {
            let center = Point2::new(arc.center.x, arc.center.y);
            let start_angle = arc.start_angle.to_radians();
            let end_angle = arc.end_angle.to_radians();
            Geometry::Arc(Arc::new(center, arc.radius, start_angle, end_angle))
        }

        dxf::entities::EntityType::LwPolyline(lwpoly) => {
            let vertices: Vec<PolylineVertex> = lwpoly
                .vertices
                .iter()
                .map(|v| PolylineVertex::with_bulge(Point2::new(v.x, v.y), v.bulge))
                .collect();

            Geometry::Polyline(Polyline::new(vertices, lwpoly.is_closed()))
        }

        dxf::entities::EntityType::Polyline(poly) => {
            let vertices: Vec<PolylineVertex> = poly
                .vertices()
                .map(|v| {
                    PolylineVertex::with_bulge(Point2::new(v.location.x, v.location.y), v.bulge)
                })
                .collect();

            Geometry::Polyline(Polyline::new(vertices, poly.is_closed()))
        }

        dxf::entities::EntityType::Spline(spline) => {
            let degree = spline.degree_of_curve.clamp(0, u8::MAX as i32) as u8;
            let control_points: Vec<Point2> = spline
                .control_points
                .iter()
                .map(|p| Point2::new(p.x, p.y))
                .collect();
            let fit_points: Vec<Point2> = spline
                .fit_points
                .iter()
                .map(|p| Point2::new(p.x, p.y))
                .collect();

            Geometry::Spline(Spline {
                degree,
                control_points,
                fit_points,
                closed: spline.is_closed(),
            })
        }

        _ => return None,
    };

    Some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing_with(entities: Vec<dxf::entities::Entity>) -> dxf::Drawing {
        let mut drawing = dxf::Drawing::new();
        for entity in entities {
            drawing.add_entity(entity);
        }
        drawing
    }

    fn dxf_line(x1: f64, y1: f64, x2: f64, y2: f64) -> dxf::entities::Entity {
        let mut line = dxf::entities::Line::default();
        line.p1 = dxf::Point::new(x1, y1, 0.0);
        line.p2 = dxf::Point::new(x2, y2, 0.0);
        dxf::entities::Entity::new(dxf::entities::EntityType::Line(line))
    }

    #[test]
    fn test_extract_line_keeps_layer_and_color() {
        let mut entity = dxf_line(0.0, 0.0, 3.0, 4.0);
        entity.common.layer = "BEND".to_string();
        entity.common.color = dxf::Color::from_index(3);

        let extracted = extract_drawing(&drawing_with(vec![entity]));
        assert_eq!(extracted.entity_count(), 1);
        let e = &extracted.entities[0];
        assert_eq!(e.layer.as_deref(), Some("BEND"));
        assert_eq!(e.color_index, Some(3));
        assert!(matches!(e.geometry, Geometry::Line(_)));
        assert!((extracted.bounding_box.width() - 3.0).abs() < 1e-12);
        assert!((extracted.bounding_box.height() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_entities_are_ignored() {
        let mut text = dxf::entities::Text::default();
        text.value = "PART-001".to_string();
        let text = dxf::entities::Entity::new(dxf::entities::EntityType::Text(text));

        let extracted = extract_drawing(&drawing_with(vec![text, dxf_line(0.0, 0.0, 1.0, 0.0)]));
        assert_eq!(extracted.entity_count(), 1);
        assert_eq!(extracted.skipped, 0);
    }

    #[test]
    fn test_degenerate_circle_is_skipped() {
        let mut circle = dxf::entities::Circle::default();
        circle.radius = 0.0;
        let circle = dxf::entities::Entity::new(dxf::entities::EntityType::Circle(circle));

        let extracted = extract_drawing(&drawing_with(vec![circle]));
        assert!(extracted.is_empty());
        assert_eq!(extracted.skipped, 1);
    }

    #[test]
    fn test_arc_angles_converted_to_radians() {
        let mut arc = dxf::entities::Arc::default();
        arc.center = dxf::Point::new(0.0, 0.0, 0.0);
        arc.radius = 1.0;
        arc.start_angle = 0.0;
        arc.end_angle = 90.0;
        let arc = dxf::entities::Entity::new(dxf::entities::EntityType::Arc(arc));

        let extracted = extract_drawing(&drawing_with(vec![arc]));
        match &extracted.entities[0].geometry {
            Geometry::Arc(a) => {
                assert!((a.length() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
            }
            other => panic!("expected arc, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_malformed_document_is_decode_error() {
        let err = extract_bytes(b"0\nSECTION\n2\nENTITIES\n0\nLINE\n10\nnot-a-number\n0\nENDSEC\n0\nEOF\n")
            .unwrap_err();
        match err {
            FileError::Decode(message) => {
                assert!(message.contains("not-a-number"));
                assert!(message.contains("line 8"));
            }
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn test_invalid_group_code_is_decode_error() {
        let err = extract_bytes(b"garbage").unwrap_err();
        assert!(matches!(err, FileError::Decode(_)));
    }

    #[test]
    fn test_saved_document_passes_validation() {
        let mut drawing = drawing_with(vec![dxf_line(0.0, 0.0, 2.5, -1.0)]);
        drawing.header.version = dxf::enums::AcadVersion::R2000;
        let mut buf = Vec::new();
        drawing.save(&mut buf).unwrap();

        let extracted = extract_bytes(&buf).unwrap();
        assert_eq!(extracted.entity_count(), 1);
    }

    #[test]
    fn test_crlf_line_endings_accepted() {
        let text = "0\r\nSECTION\r\n2\r\nENTITIES\r\n0\r\nLINE\r\n10\r\n1.5\r\n0\r\nENDSEC\r\n0\r\nEOF\r\n";
        assert!(validate_code_pairs(text).is_ok());
    }
}
