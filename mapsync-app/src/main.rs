use anyhow::Context;
use mapsync::prelude::*;

const SAMPLE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"area": 1520.456},
     "geometry": {"type": "Polygon", "coordinates": [[[120.97, 24.80], [120.99, 24.80], [120.99, 24.82], [120.97, 24.80]]]}},
    {"type": "Feature", "properties": {},
     "geometry": {"type": "LineString", "coordinates": [[120.96, 24.79], [121.00, 24.83]]}},
    {"type": "Feature", "properties": {},
     "geometry": {"type": "Point", "coordinates": [13466000.0, 2850000.0]}}
  ]
}"#;

struct Args {
    geojson: Option<String>,
    backend: Option<String>,
    theme: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        geojson: None,
        backend: None,
        theme: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--backend" => args.backend = iter.next(),
            "--theme" => args.theme = iter.next(),
            _ => args.geojson = Some(arg),
        }
    }
    args
}

/// Headless driver: loads layers, swaps the theme and prints what the renderer saw
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();

    let config = match std::env::var("MAPSYNC_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            SyncConfig::from_json_str(&text)?
        }
        Err(_) => SyncConfig::default(),
    };

    let style = config.style.style_url(&config.style.default_theme);
    let mut map = MapSync::new(RecordingRenderer::new(style), config);
    map.renderer().emit_load();
    map.pump_signals();

    if let Some(url) = &args.backend {
        let backend = HttpLayerBackend::new(url.as_str())?;
        if let Some(report) = map.refresh_from(&backend).await {
            log::info!("fetched layers: {:?}", report);
        }
    }

    let (name, text) = match &args.geojson {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path))?;
            let name = std::path::Path::new(path)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("upload")
                .to_string();
            (name, text)
        }
        None => ("sample".to_string(), SAMPLE.to_string()),
    };
    let id = map.upload_geojson(&name, &text)?;
    println!("uploaded '{}' as {}", name, id);

    if let Some(theme) = &args.theme {
        let replay = map.change_theme(theme)?;
        map.renderer().finish_style_load();
        map.pump_signals();
        let report = replay.await.context("theme swap was superseded")?;
        println!(
            "theme {} replayed: {} sources, {} layers",
            map.current_theme(),
            report.created_sources,
            report.created_layers
        );
    }

    for call in map.renderer().calls() {
        println!("{:?}", call);
    }
    println!("layer order: {}", map.renderer().layer_order().join(" < "));
    println!("tile size: {}", map.config().raster.tile_size);
    Ok(())
}
