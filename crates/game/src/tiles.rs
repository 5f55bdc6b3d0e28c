//! Uploaded tile and sprite atlases with their regions.

use log::debug;

use bombz_core::{Level, Tile, ATLAS_CELLS};
use bombz_engine::{Platform, RenderContext, Result, TextureAtlas, TextureRegion, TileBatcher};

use crate::assets::{cell_origin, ALPHA_ATLAS, ALPHA_CELLS, TILE_ATLAS};
use crate::types::{Direction, ATLAS_COLUMNS, LEVEL_HEIGHT, LEVEL_WIDTH};

pub struct Tiles {
    size: u32,
    tile_atlas: TextureAtlas,
    alpha_atlas: TextureAtlas,
    tile_regions: Vec<TextureRegion>,
    alpha_regions: Vec<TextureRegion>,
}

fn regions(atlas: &TextureAtlas, cells: u32, size: u32) -> Vec<TextureRegion> {
    (0..cells)
        .map(|i| {
            let (x, y) = cell_origin(i % ATLAS_COLUMNS, i / ATLAS_COLUMNS, size);
            atlas.region(x, y, size, size)
        })
        .collect()
}

impl Tiles {
    /// Generate both atlases at `size` pixels per tile and upload them.
    pub fn load(rc: &mut dyn RenderContext, platform: &dyn Platform, size: u32) -> Result<Self> {
        let tile_atlas = rc.upload_texture(&platform.load_image(TILE_ATLAS, size)?)?;
        let alpha_atlas = match platform
            .load_image(ALPHA_ATLAS, size)
            .and_then(|img| rc.upload_texture(&img))
        {
            Ok(atlas) => atlas,
            Err(e) => {
                rc.delete_texture(&tile_atlas);
                return Err(e);
            }
        };
        debug!("tiles: loaded at {}px", size);
        Ok(Self {
            size,
            tile_regions: regions(&tile_atlas, ATLAS_CELLS, size),
            alpha_regions: regions(&alpha_atlas, ALPHA_CELLS, size),
            tile_atlas,
            alpha_atlas,
        })
    }

    pub fn delete(&self, rc: &mut dyn RenderContext) {
        rc.delete_texture(&self.tile_atlas);
        rc.delete_texture(&self.alpha_atlas);
    }

    /// Pixel size of one tile
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Region drawing `tile` in the tile atlas.
    pub fn tile(&self, tile: Tile) -> TextureRegion {
        let i = tile.atlas_index() as usize;
        self.tile_regions[i.min(self.tile_regions.len() - 1)]
    }

    /// Region of cell `index` in the alpha atlas.
    pub fn alpha(&self, index: u32) -> TextureRegion {
        let i = index as usize;
        self.alpha_regions[i.min(self.alpha_regions.len() - 1)]
    }

    pub fn pusher(&self, dir: Direction) -> TextureRegion {
        self.alpha(dir.index() as u32)
    }

    /// Point every batcher cell at the tile the level holds there.
    pub fn fill(&self, batcher: &mut TileBatcher, level: &Level) {
        for y in 0..LEVEL_HEIGHT as i32 {
            for x in 0..LEVEL_WIDTH as i32 {
                batcher.set_texture_at(&self.tile(level.tile_at(x, y)), x as u32, y as u32);
            }
        }
    }
}
