//! Export GeoJSON stylé d'une couche (streaming, géométries via geozero)
//!
//! Chaque feature conserve ses attributs et reçoit en plus:
//! - `_style`: `{ color, weight, fillOpacity }` pour le moteur de rendu
//! - `_color_token`: `finance`, `contact` ou absent
//! - `_tooltip`: libellé de survol (optionnel)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use rayon::prelude::*;
use serde_json::Value;
use territoire::{color_for, style_for, tooltip_label, Filters, GeoFeature, GeoLayer, Properties};
use tracing::{debug, info};

/// Exporte une couche en FeatureCollection stylée
pub fn export_styled_layer(layer: &GeoLayer, filters: Filters, output_path: &Path) -> Result<usize> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let written = write_styled_layer(&mut writer, layer, filters)?;
    writer.flush()?;

    info!(
        scale = %layer.scale,
        features = written,
        output = %output_path.display(),
        "Styled layer exported"
    );
    Ok(written)
}

/// Écrit une couche stylée dans `writer`
pub fn write_styled_layer<W: Write>(
    writer: &mut W,
    layer: &GeoLayer,
    filters: Filters,
) -> Result<usize> {
    // Attributs calculés en parallèle: la couche communale compte des milliers de features
    let styled: Vec<Properties> = layer
        .features
        .par_iter()
        .map(|feature| styled_properties(feature, layer, filters))
        .collect();

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, (feature, properties)) in layer.features.iter().zip(&styled).enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, feature, properties)?;
    }

    write!(writer, "]}}")?;

    debug!(features = styled.len(), "Wrote styled features");
    Ok(styled.len())
}

/// Attributs d'origine enrichis du style
fn styled_properties(feature: &GeoFeature, layer: &GeoLayer, filters: Filters) -> Properties {
    let mut properties = feature.properties.clone();
    let style = style_for(layer.scale, &feature.properties, filters);

    properties.insert(
        "_style".to_string(),
        serde_json::to_value(&style).unwrap_or(Value::Null),
    );
    if let Some(token) = color_for(&feature.properties, filters) {
        properties.insert(
            "_color_token".to_string(),
            serde_json::to_value(token).unwrap_or(Value::Null),
        );
    }
    if let Some(label) = tooltip_label(&feature.properties) {
        properties.insert("_tooltip".to_string(), Value::String(label));
    }

    properties
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &GeoFeature, properties: &Properties) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","#)?;

    if let Some(ref id) = feature.id {
        write!(writer, r#""id":{},"#, serde_json::to_string(id)?)?;
    }

    // Geometry via geozero
    write!(writer, r#""geometry":"#)?;
    match &feature.geometry {
        Some(geometry) => {
            let geom: geo::Geometry<f64> = geometry
                .clone()
                .try_into()
                .context("Unsupported GeoJSON geometry")?;
            let mut geom_buf = Vec::new();
            let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
            geom.process_geom(&mut geom_writer)?;
            writer.write_all(&geom_buf)?;
        }
        None => write!(writer, "null")?,
    }

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, properties)?;
    write!(writer, "}}")?;

    Ok(())
}
