use std::collections::HashMap;

use glam::Vec2;
use image::{Rgb, RgbImage};
use prefab_scatter::prelude::PlacementSet;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,prefab_scatter=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// How one variant is drawn in the top-down view.
#[derive(Debug, Clone, Copy)]
pub enum VariantStyle {
    Circle { color: [u8; 3], radius: i32 },
    Square { color: [u8; 3], half: i32 },
}

impl Default for VariantStyle {
    fn default() -> Self {
        VariantStyle::Circle {
            color: [60, 60, 60],
            radius: 3,
        }
    }
}

/// Top-down (XZ plane) render settings. The view is centered on the world origin.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World-space width (X) and depth (Z) covered by the image.
    pub extent: Vec2,
    pub background: [u8; 3],
    /// Draw empty slots as single grey pixels.
    pub show_gaps: bool,
    styles: HashMap<String, VariantStyle>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), extent: Vec2) -> Self {
        Self {
            image_size,
            extent,
            background: [250, 250, 250],
            show_gaps: false,
            styles: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_gaps(mut self, show_gaps: bool) -> Self {
        self.show_gaps = show_gaps;
        self
    }

    pub fn with_style(mut self, variant: impl Into<String>, style: VariantStyle) -> Self {
        self.styles.insert(variant.into(), style);
        self
    }

    fn to_pixel(&self, x: f32, z: f32) -> (i32, i32) {
        let (w, h) = self.image_size;
        let u = (x / self.extent.x + 0.5) * w as f32;
        let v = (0.5 - z / self.extent.y) * h as f32;
        (u.round() as i32, v.round() as i32)
    }
}

/// Renders the placements of `set` to a PNG at `out_path`.
pub fn render_placements_to_png(
    set: &PlacementSet,
    config: &RenderConfig,
    out_path: &str,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    for slot in &set.slots {
        let p = slot.placement.position;
        let (cx, cy) = config.to_pixel(p.x, p.z);
        match &slot.variant {
            Some(variant) => {
                let style = config.styles.get(variant).copied().unwrap_or_default();
                let scale = slot.placement.scale.x.max(0.25);
                draw(&mut img, cx, cy, style, scale);
            }
            None if config.show_gaps => put(&mut img, cx, cy, [180, 180, 180]),
            None => {}
        }
    }

    img.save(out_path)?;
    tracing::info!("Wrote {} ({} slots).", out_path, set.len());
    Ok(())
}

fn draw(img: &mut RgbImage, cx: i32, cy: i32, style: VariantStyle, scale: f32) {
    match style {
        VariantStyle::Circle { color, radius } => {
            let r = ((radius as f32) * scale).round().max(1.0) as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        put(img, cx + dx, cy + dy, color);
                    }
                }
            }
        }
        VariantStyle::Square { color, half } => {
            let s = ((half as f32) * scale).round().max(1.0) as i32;
            for dy in -s..=s {
                for dx in -s..=s {
                    put(img, cx + dx, cy + dy, color);
                }
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    img.put_pixel(x as u32, y as u32, Rgb(color));
}
