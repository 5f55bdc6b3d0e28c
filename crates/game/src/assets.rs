//! Procedurally generated artwork.
//!
//! Every image is drawn at the requested source tile size, so nothing needs
//! scaling when the source size matches the on-screen tile size.
//!
//! Atlas cells are `src` pixels square on a `src + 2` stride: each cell has a
//! one pixel border that repeats its edge texels, so sampling at a cell edge
//! never picks up a neighbour.
//!
//! | Atlas | Cells |
//! |-------|-------|
//! | tile | blank, earth, match, picket, two bomb looks, explosion frames 1-11, 16 chrome shapes |
//! | alpha | pusher facing left/right/up/down, two carried bombs, match icon, blast flash |
//! | logo | the title, `LOGO_TILES_W × LOGO_TILES_H` tiles |

use bombz_core::{Tile, ATLAS_CELLS, CHROME_SHAPES};
use bombz_engine::{Image, Rgba};

use crate::font;
use crate::types::{Direction, ATLAS_COLUMNS, EXPLO_TICKS};

pub const TILE_ATLAS: &str = "tile_atlas";
pub const ALPHA_ATLAS: &str = "alpha_atlas";
pub const LOGO: &str = "title_logo";

pub const ALPHA_BOMB1: u32 = 4;
pub const ALPHA_BOMB2: u32 = 5;
pub const ALPHA_MATCH: u32 = 6;
pub const ALPHA_FLASH: u32 = 7;
pub const ALPHA_CELLS: u32 = 8;

pub const LOGO_TILES_W: u32 = 16;
pub const LOGO_TILES_H: u32 = 4;

const BACKGROUND: Rgba = Rgba::opaque(18, 20, 32);
const EARTH: Rgba = Rgba::opaque(116, 78, 44);
const EARTH_DARK: Rgba = Rgba::opaque(84, 54, 28);
const STICK: Rgba = Rgba::opaque(214, 180, 120);
const MATCH_HEAD: Rgba = Rgba::opaque(220, 40, 30);
const PICKET: Rgba = Rgba::opaque(150, 150, 140);
const BOMB1: Rgba = Rgba::opaque(48, 48, 52);
const BOMB2: Rgba = Rgba::opaque(40, 44, 96);
const FUSE: Rgba = Rgba::opaque(250, 160, 40);
const CHROME: Rgba = Rgba::opaque(168, 172, 190);
const CHROME_LIGHT: Rgba = Rgba::opaque(228, 232, 244);
const PUSHER: Rgba = Rgba::opaque(70, 200, 90);
const PUSHER_FACE: Rgba = Rgba::opaque(250, 240, 200);

/// Top-left pixel of atlas cell (col, row).
pub fn cell_origin(col: u32, row: u32, src: u32) -> (u32, u32) {
    (col * (src + 2) + 1, row * (src + 2) + 1)
}

fn atlas_for(cells: u32, src: u32) -> Image {
    let rows = cells.div_ceil(ATLAS_COLUMNS);
    let stride = src + 2;
    Image::new(ATLAS_COLUMNS * stride, rows * stride)
}

/// Copy `cell` into the atlas at `index`, repeating its edges into the border.
fn place(atlas: &mut Image, index: u32, src: u32, cell: &Image) {
    let (ox, oy) = cell_origin(index % ATLAS_COLUMNS, index / ATLAS_COLUMNS, src);
    atlas.blit(cell, ox, oy);
    let last = src - 1;
    for i in 0..src {
        let edge = |x: u32, y: u32| cell.get(x, y).unwrap_or(Rgba::TRANSPARENT);
        atlas.set(ox - 1, oy + i, edge(0, i));
        atlas.set(ox + src, oy + i, edge(last, i));
        atlas.set(ox + i, oy - 1, edge(i, 0));
        atlas.set(ox + i, oy + src, edge(i, last));
    }
    let corner = |x: u32, y: u32| cell.get(x, y).unwrap_or(Rgba::TRANSPARENT);
    atlas.set(ox - 1, oy - 1, corner(0, 0));
    atlas.set(ox + src, oy - 1, corner(last, 0));
    atlas.set(ox - 1, oy + src, corner(0, last));
    atlas.set(ox + src, oy + src, corner(last, last));
}

fn disc(img: &mut Image, cx: f32, cy: f32, r: f32, colour: Rgba) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            if dx * dx + dy * dy <= r * r {
                img.set(x, y, colour);
            }
        }
    }
}

fn line(img: &mut Image, x0: f32, y0: f32, x1: f32, y1: f32, colour: Rgba) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = x0 + (x1 - x0) * t;
        let y = y0 + (y1 - y0) * t;
        if x >= 0.0 && y >= 0.0 {
            img.set(x as u32, y as u32, colour);
        }
    }
}

fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mix = |p: u8, q: u8| (p as f32 + (q as f32 - p as f32) * t).round() as u8;
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

fn earth(src: u32) -> Image {
    let mut img = Image::filled(src, src, EARTH);
    for y in 0..src {
        for x in 0..src {
            if (x * 7 + y * 13) % 5 == 0 {
                img.set(x, y, EARTH_DARK);
            }
        }
    }
    img
}

fn draw_match(img: &mut Image) {
    let s = img.width() as f32;
    line(img, s * 0.25, s * 0.75, s * 0.7, s * 0.3, STICK);
    disc(img, s * 0.72, s * 0.28, (s * 0.12).max(0.6), MATCH_HEAD);
}

fn picket(src: u32) -> Image {
    let mut img = Image::filled(src, src, BACKGROUND);
    let s = src as f32;
    let post = (src / 6).max(1);
    for px in [s * 0.25, s * 0.75] {
        let x = px as u32;
        img.fill_rect(x - (post / 2).min(x), 0, post, src, PICKET);
    }
    img.fill_rect(0, src / 3, src, post, PICKET);
    img.fill_rect(0, src * 2 / 3, src, post, PICKET);
    img
}

fn draw_bomb(img: &mut Image, body: Rgba) {
    let s = img.width() as f32;
    disc(img, s * 0.45, s * 0.55, s * 0.36, body);
    line(img, s * 0.6, s * 0.3, s * 0.8, s * 0.12, FUSE);
    if s >= 6.0 {
        img.set((s * 0.35) as u32, (s * 0.45) as u32, Rgba::opaque(140, 140, 150));
    }
}

/// Explosion frame `n` of 1..=11: a ball that shrinks and cools.
fn explosion(src: u32, n: u32) -> Image {
    let mut img = Image::filled(src, src, BACKGROUND);
    let s = src as f32;
    let last = (EXPLO_TICKS - 1) as f32;
    let t = (n as f32 - 1.0) / (last - 1.0);
    let hot = Rgba::opaque(255, 250, 200);
    let cool = Rgba::opaque(180, 40, 20);
    let r = s * (0.55 - 0.35 * t);
    disc(&mut img, s / 2.0, s / 2.0, r, lerp(hot, cool, t));
    disc(&mut img, s / 2.0, s / 2.0, r * 0.5, lerp(hot, FUSE, t));
    img
}

/// Neighbour connections for chrome shape `n` as (left, right, above, below).
pub fn chrome_connections(n: u8) -> (bool, bool, bool, bool) {
    let key = CHROME_SHAPES.iter().position(|&s| s == n).unwrap_or(0);
    (key & 8 != 0, key & 4 != 0, key & 2 != 0, key & 1 != 0)
}

fn chrome(src: u32, n: u8) -> Image {
    let mut img = Image::filled(src, src, BACKGROUND);
    let (l, r, u, d) = chrome_connections(n);
    let lo = src / 4;
    let hi = src - lo;
    let w = hi - lo;
    img.fill_rect(lo, lo, w, w, CHROME);
    if l {
        img.fill_rect(0, lo, hi, w, CHROME);
    }
    if r {
        img.fill_rect(lo, lo, src - lo, w, CHROME);
    }
    if u {
        img.fill_rect(lo, 0, w, hi, CHROME);
    }
    if d {
        img.fill_rect(lo, lo, w, src - lo, CHROME);
    }
    // Highlight along the top-left edge of the bar.
    let x0 = if l { 0 } else { lo };
    let y0 = if u { 0 } else { lo };
    let x1 = if r { src } else { hi };
    let y1 = if d { src } else { hi };
    img.fill_rect(x0, lo, x1 - x0, 1, CHROME_LIGHT);
    img.fill_rect(lo, y0, 1, y1 - y0, CHROME_LIGHT);
    img
}

fn tile_cell(src: u32, index: u32) -> Image {
    let mut img = Image::filled(src, src, BACKGROUND);
    match index {
        i if i == Tile::EARTH.0 as u32 => return earth(src),
        i if i == Tile::MATCH.0 as u32 => draw_match(&mut img),
        i if i == Tile::PICKET.0 as u32 => return picket(src),
        i if i == Tile::BOMB1.0 as u32 => draw_bomb(&mut img, BOMB1),
        i if i == Tile::BOMB2.0 as u32 => draw_bomb(&mut img, BOMB2),
        6..=16 => return explosion(src, index - 5),
        17..=32 => return chrome(src, (index - 17) as u8),
        _ => {}
    }
    img
}

/// Opaque tiles in [`Tile::atlas_index`] order.
pub fn tile_atlas(src: u32) -> Image {
    let src = src.max(1);
    let mut atlas = atlas_for(ATLAS_CELLS, src);
    for i in 0..ATLAS_CELLS {
        place(&mut atlas, i, src, &tile_cell(src, i));
    }
    atlas
}

fn pusher(src: u32, dir: Direction) -> Image {
    let mut img = Image::new(src, src);
    let s = src as f32;
    disc(&mut img, s / 2.0, s / 2.0, s * 0.38, PUSHER);
    let (dx, dy) = dir.delta();
    disc(
        &mut img,
        s / 2.0 + dx as f32 * s * 0.2,
        s / 2.0 + dy as f32 * s * 0.2,
        (s * 0.14).max(0.6),
        PUSHER_FACE,
    );
    img
}

fn flash(src: u32) -> Image {
    let mut img = Image::new(src, src);
    let c = src as f32 / 2.0;
    for y in 0..src {
        for x in 0..src {
            let (dx, dy) = (x as f32 + 0.5 - c, y as f32 + 0.5 - c);
            let d = (dx * dx + dy * dy).sqrt() / c;
            if d < 1.0 {
                let a = ((1.0 - d) * 255.0) as u8;
                img.set(x, y, Rgba::new(255, 240, 160, a));
            }
        }
    }
    img
}

/// Blended sprites: pushers by [`Direction::index`], then the `ALPHA_*` cells.
pub fn alpha_atlas(src: u32) -> Image {
    let src = src.max(1);
    let mut atlas = atlas_for(ALPHA_CELLS, src);
    for dir in Direction::ALL {
        place(&mut atlas, dir.index() as u32, src, &pusher(src, dir));
    }
    for (index, body) in [(ALPHA_BOMB1, BOMB1), (ALPHA_BOMB2, BOMB2)] {
        let mut img = Image::new(src, src);
        draw_bomb(&mut img, body);
        place(&mut atlas, index, src, &img);
    }
    let mut img = Image::new(src, src);
    draw_match(&mut img);
    place(&mut atlas, ALPHA_MATCH, src, &img);
    place(&mut atlas, ALPHA_FLASH, src, &flash(src));
    atlas
}

/// The title, centred in a `LOGO_TILES_W × LOGO_TILES_H` tile box.
pub fn logo(src: u32) -> Image {
    let src = src.max(1);
    let (w, h) = (LOGO_TILES_W * src, LOGO_TILES_H * src);
    let mut img = Image::new(w, h);
    let (tw, th) = font::measure("BOMBZ", 1);
    let scale = (w / tw).min(h / th).max(1);
    let (tw, th) = font::measure("BOMBZ", scale);
    let (x, y) = (w.saturating_sub(tw) / 2, h.saturating_sub(th) / 2);
    // Drop shadow first.
    font::draw_text(&mut img, "BOMBZ", x + scale / 2, y + scale / 2, scale, Rgba::opaque(90, 20, 10));
    font::draw_text(&mut img, "BOMBZ", x, y, scale, FUSE);
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_atlas_has_room_for_every_cell() {
        let src = 8;
        let atlas = tile_atlas(src);
        let (col, row) = Tile::CHROME15.atlas_cell();
        let (x, y) = cell_origin(col, row, src);
        assert!(x + src < atlas.width());
        assert!(y + src < atlas.height());
    }

    #[test]
    fn border_repeats_cell_edge() {
        let src = 6;
        let atlas = tile_atlas(src);
        let (col, row) = Tile::EARTH.atlas_cell();
        let (x, y) = cell_origin(col, row, src);
        for i in 0..src {
            assert_eq!(atlas.get(x - 1, y + i), atlas.get(x, y + i));
            assert_eq!(atlas.get(x + i, y + src), atlas.get(x + i, y + src - 1));
        }
    }

    #[test]
    fn chrome_connections_invert_shape_table() {
        // Nothing around: isolated block.
        assert_eq!(chrome_connections(15), (false, false, false, false));
        // Horizontal run.
        assert_eq!(chrome_connections(1), (true, true, false, false));
        // Crossroads.
        assert_eq!(chrome_connections(8), (true, true, true, true));
    }

    #[test]
    fn alpha_atlas_is_transparent_around_sprites() {
        let src = 10;
        let atlas = alpha_atlas(src);
        let (x, y) = cell_origin(0, 0, src);
        assert_eq!(atlas.get(x, y).map(|p| p.a), Some(0));
        assert_eq!(atlas.get(x + src / 2, y + src / 2).map(|p| p.a), Some(255));
    }

    #[test]
    fn tiny_tiles_still_generate() {
        assert!(tile_atlas(1).width() > 0);
        assert!(alpha_atlas(1).width() > 0);
        assert_eq!(logo(1).width(), LOGO_TILES_W);
    }
}
