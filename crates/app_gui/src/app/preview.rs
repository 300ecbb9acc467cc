use anyhow::{Context, Result};
use crop_core::SelectedFile;
use eframe::egui;

const PREVIEW_SIZE: u32 = 240;

/// Thumbnail of the selected image, uploaded once per selection.
pub(super) struct Preview {
    texture: egui::TextureHandle,
    size: egui::Vec2,
}

impl Preview {
    pub(super) fn load(ctx: &egui::Context, file: &SelectedFile) -> Option<Self> {
        if !file.is_image() {
            return None;
        }
        match thumbnail(&file.bytes) {
            Ok(color) => {
                let size = egui::vec2(color.size[0] as f32, color.size[1] as f32);
                let name = format!("preview:{}", file.file_name);
                let texture = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
                Some(Self { texture, size })
            }
            Err(e) => {
                tracing::warn!("Failed to load preview for {}: {e:#}", file.file_name);
                None
            }
        }
    }

    pub(super) fn show(&self, ui: &mut egui::Ui) {
        let (resp, painter) = ui.allocate_painter(self.size, egui::Sense::hover());
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(self.texture.id(), resp.rect, uv, egui::Color32::WHITE);
    }
}

/// Decodes `bytes` and scales it to fit a `PREVIEW_SIZE` square, keeping the aspect ratio.
fn thumbnail(bytes: &[u8]) -> Result<egui::ColorImage> {
    let img = image::load_from_memory(bytes).context("not a decodable image")?;
    let thumb = img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE).to_rgba8();
    let (w, h) = thumb.dimensions();
    let size = [w as usize, h as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, thumb.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([40, 160, 60, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn thumbnail_keeps_aspect_ratio() -> Result<()> {
        let color = thumbnail(&png(480, 320))?;
        assert_eq!(color.size, [240, 160]);
        Ok(())
    }

    #[test]
    fn small_images_are_not_upscaled_beyond_bounds() -> Result<()> {
        let color = thumbnail(&png(100, 50))?;
        assert!(color.size[0] <= 240 && color.size[1] <= 240);
        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(thumbnail(b"definitely not an image").is_err());
    }
}
