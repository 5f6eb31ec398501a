use eframe::egui::{
    Color32, CornerRadius, Painter, Rect, Stroke, StrokeKind, TextureHandle, Vec2, pos2,
};

use crate::color;
use crate::config::Settings;

/// Visual style of the marker, recomputed from the current settings on every
/// frame. Deriving everything from one place keeps restyling idempotent —
/// there is no accumulated style state to get out of sync.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub size: f32,
    pub fill: Color32,
    pub stroke: Stroke,
    pub corner_radius: CornerRadius,
    /// Tint for image markers; carries the window opacity.
    pub image_tint: Color32,
}

impl MarkerStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        let opacity = settings.opacity.clamp(0.0, 1.0);

        // With an image set the shape is not filled; the image (plus border)
        // is the whole marker.
        let fill = if settings.image.is_some() {
            Color32::TRANSPARENT
        } else {
            color::parse(&settings.color)
                .unwrap_or(Color32::RED)
                .gamma_multiply(opacity)
        };
        let border = color::parse(&settings.border_color)
            .unwrap_or(Color32::BLACK)
            .gamma_multiply(opacity);

        Self {
            size: settings.size as f32,
            fill,
            stroke: Stroke::new(settings.border_thickness as f32, border),
            // size/2 rounds the square into a circle, like the original
            // border-radius styling. Always <= 200, so u8 is fine.
            corner_radius: CornerRadius::same((settings.size / 2).min(u8::MAX as u32) as u8),
            image_tint: Color32::WHITE.gamma_multiply(opacity),
        }
    }

    /// Draw the marker into `rect`. With a texture the image is aspect-fit
    /// into the rect; otherwise the filled rounded shape is drawn. The border
    /// applies in both cases.
    pub fn paint(&self, painter: &Painter, rect: Rect, texture: Option<&TextureHandle>) {
        match texture {
            Some(texture) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(texture.id(), fit_rect(rect, texture.size_vec2()), uv, self.image_tint);
            }
            None => {
                painter.rect_filled(rect, self.corner_radius, self.fill);
            }
        }
        if self.stroke.width > 0.0 {
            painter.rect_stroke(rect, self.corner_radius, self.stroke, StrokeKind::Inside);
        }
    }
}

/// Largest rect with the image's aspect ratio that fits centered in `bounds`.
fn fit_rect(bounds: Rect, image_size: Vec2) -> Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width() / image_size.x).min(bounds.height() / image_size.y);
    Rect::from_center_size(bounds.center(), image_size * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shape_style_from_settings() {
        let settings = Settings {
            color: "blue".into(),
            border_color: "white".into(),
            size: 40,
            border_thickness: 3,
            ..Settings::default()
        };
        let style = MarkerStyle::from_settings(&settings);
        assert_eq!(style.size, 40.0);
        assert_eq!(style.fill, Color32::BLUE);
        assert_eq!(style.stroke.width, 3.0);
        assert_eq!(style.stroke.color, Color32::WHITE);
        assert_eq!(style.corner_radius, CornerRadius::same(20));
    }

    #[test]
    fn test_image_marker_has_transparent_fill_but_keeps_border() {
        let settings = Settings {
            image: Some(PathBuf::from("marker.png")),
            border_thickness: 2,
            ..Settings::default()
        };
        let style = MarkerStyle::from_settings(&settings);
        assert_eq!(style.fill, Color32::TRANSPARENT);
        assert_eq!(style.stroke.width, 2.0);
    }

    #[test]
    fn test_reset_image_restores_filled_shape() {
        let mut settings = Settings {
            image: Some(PathBuf::from("marker.png")),
            size: 24,
            ..Settings::default()
        };
        assert_eq!(MarkerStyle::from_settings(&settings).fill, Color32::TRANSPARENT);

        settings.image = None;
        let style = MarkerStyle::from_settings(&settings);
        assert_eq!(style.fill, Color32::RED);
        assert_eq!(style.size, 24.0);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let opaque = MarkerStyle::from_settings(&Settings::default());
        assert_eq!(opaque.fill.a(), 255);
        assert_eq!(opaque.image_tint, Color32::WHITE);

        let faded = MarkerStyle::from_settings(&Settings {
            opacity: 0.5,
            ..Settings::default()
        });
        assert!(faded.fill.a() < 255);
        assert!(faded.fill.a() > 0);

        let invisible = MarkerStyle::from_settings(&Settings {
            opacity: 0.0,
            ..Settings::default()
        });
        assert_eq!(invisible.fill.a(), 0);
        assert_eq!(invisible.image_tint.a(), 0);
    }

    #[test]
    fn test_unparsable_colors_fall_back_to_defaults() {
        let style = MarkerStyle::from_settings(&Settings {
            color: "definitely-not-a-color".into(),
            border_color: "???".into(),
            ..Settings::default()
        });
        assert_eq!(style.fill, Color32::RED);
        assert_eq!(style.stroke.color, Color32::BLACK);
    }

    #[test]
    fn test_fit_rect_preserves_aspect_ratio() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));

        let wide = fit_rect(bounds, Vec2::new(200.0, 100.0));
        assert_eq!(wide.width(), 100.0);
        assert_eq!(wide.height(), 50.0);
        assert_eq!(wide.center(), bounds.center());

        let tall = fit_rect(bounds, Vec2::new(50.0, 100.0));
        assert_eq!(tall.height(), 100.0);
        assert_eq!(tall.width(), 50.0);

        // Degenerate image size falls back to the full bounds
        assert_eq!(fit_rect(bounds, Vec2::ZERO), bounds);
    }
}
