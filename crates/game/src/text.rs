//! Labels rendered once into a shared texture.

use bombz_engine::{Image, RenderContext, Result, Rgba, Sprite, TextureAtlas, TextureRegion};

use crate::font;

pub const TEXT: Rgba = Rgba::opaque(230, 230, 230);
pub const HIGHLIGHT: Rgba = Rgba::opaque(250, 190, 60);

/// Every label in a normal and a highlighted version, stacked vertically
/// with a transparent row between them.
pub struct TextSheet {
    atlas: TextureAtlas,
    /// (normal, highlighted) per label
    labels: Vec<(TextureRegion, TextureRegion)>,
}

impl TextSheet {
    pub fn build(rc: &mut dyn RenderContext, labels: &[String], scale: u32) -> Result<Self> {
        let scale = scale.max(1);
        let sizes: Vec<(u32, u32)> = labels
            .iter()
            .map(|l| {
                let (w, h) = font::measure(l, scale);
                (w.max(1), h.max(1))
            })
            .collect();
        let width = sizes.iter().map(|s| s.0).max().unwrap_or(1);
        let height: u32 = sizes.iter().map(|s| (s.1 + 1) * 2).sum();

        let mut img = Image::new(width, height.max(1));
        let mut rows = Vec::with_capacity(labels.len());
        let mut y = 0;
        for (label, &(w, h)) in labels.iter().zip(&sizes) {
            font::draw_text(&mut img, label, 0, y, scale, TEXT);
            font::draw_text(&mut img, label, 0, y + h + 1, scale, HIGHLIGHT);
            rows.push((y, w, h));
            y += (h + 1) * 2;
        }

        let atlas = rc.upload_texture(&img)?;
        let labels = rows
            .into_iter()
            .map(|(y, w, h)| (atlas.region(0, y, w, h), atlas.region(0, y + h + 1, w, h)))
            .collect();
        Ok(Self { atlas, labels })
    }

    pub fn delete(&self, rc: &mut dyn RenderContext) {
        rc.delete_texture(&self.atlas);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pixel size of label `i`.
    pub fn size(&self, i: usize) -> (u32, u32) {
        self.labels
            .get(i)
            .map_or((0, 0), |(r, _)| (r.width, r.height))
    }

    /// Sprite for label `i`, unscaled.
    pub fn sprite(&self, rc: &dyn RenderContext, i: usize, highlighted: bool) -> Option<Sprite> {
        let &(normal, high) = self.labels.get(i)?;
        let region = if highlighted { high } else { normal };
        Some(rc.create_sprite(region, region.width, region.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bombz_engine::HeadlessContext;

    #[test]
    fn labels_get_their_own_regions() {
        let mut rc = HeadlessContext::new(32, 32);
        let labels = vec!["PLAY".to_string(), "QUIT".to_string(), "".to_string()];
        let sheet = TextSheet::build(&mut rc, &labels, 1).unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.size(0), font::measure("PLAY", 1));
        assert_eq!(sheet.size(2), (1, 1));
        assert_eq!(sheet.size(9), (0, 0));

        let normal = sheet.sprite(&rc, 1, false).unwrap();
        let high = sheet.sprite(&rc, 1, true).unwrap();
        assert_ne!(normal.region(), high.region());
        assert!(sheet.sprite(&rc, 3, false).is_none());
    }
}
