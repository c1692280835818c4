/// Logical render surface.
///
/// The game draws into a fixed 500x700 RGB canvas in world pixels, exactly
/// as the simulation sees the screen. Text is not rasterized; it is kept as
/// overlays anchored at canvas coordinates and placed by the presenter.

use crate::assets::{GameAssets, Image};
use crate::domain::entity::Platform;
use crate::domain::physics::{VIEW_H, VIEW_W};
use crate::sim::world::WorldState;

pub type Rgb = [u8; 3];

const SCORE_POS: (i32, i32) = (10, 10);
const SCORE_COLOR: Rgb = [0, 0, 0];

/// Mixed into platform sprites so special platforms are recognizable.
const BOOST_TINT: Rgb = [90, 220, 90];
const TEMPORARY_TINT: Rgb = [230, 120, 70];

#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: Rgb,
}

pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Rgb>,
    texts: Vec<TextOverlay>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height],
            texts: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill([0, 0, 0]);
        self.texts.clear();
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            [0, 0, 0]
        }
    }

    pub fn texts(&self) -> &[TextOverlay] {
        &self.texts
    }

    /// Draw `image` with its top-left at (x, y), clipped to the canvas and
    /// alpha-blended over what is already there. `tint` is mixed in at half
    /// strength.
    pub fn blit(&mut self, image: &Image, x: i32, y: i32, tint: Option<Rgb>) {
        for iy in 0..image.height {
            let cy = y + iy as i32;
            if cy < 0 || cy >= self.height as i32 { continue; }
            for ix in 0..image.width {
                let cx = x + ix as i32;
                if cx < 0 || cx >= self.width as i32 { continue; }

                let [r, g, b, a] = image.get(ix, iy);
                if a == 0 { continue; }
                let mut src = [r, g, b];
                if let Some(t) = tint {
                    src = mix(src, t, 128);
                }
                let idx = cy as usize * self.width + cx as usize;
                self.pixels[idx] = mix(self.pixels[idx], src, a);
            }
        }
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: impl Into<String>, color: Rgb) {
        self.texts.push(TextOverlay { x, y, text: text.into(), color });
    }
}

/// Linear blend of `src` over `dst` with 8-bit coverage `alpha`.
fn mix(dst: Rgb, src: Rgb, alpha: u8) -> Rgb {
    let a = alpha as u32;
    let blend = |d: u8, s: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
    [blend(dst[0], src[0]), blend(dst[1], src[1]), blend(dst[2], src[2])]
}

fn platform_tint(platform: &Platform) -> Option<Rgb> {
    if platform.boost {
        Some(BOOST_TINT)
    } else if platform.temporary {
        Some(TEMPORARY_TINT)
    } else {
        None
    }
}

/// Draw one frame: background, platforms, player, then the score.
pub fn compose(canvas: &mut Canvas, world: &WorldState, assets: &GameAssets) {
    canvas.clear();
    canvas.blit(&assets.background, 0, 0, None);

    for (_, platform) in world.platforms.iter() {
        canvas.blit(
            &assets.platform,
            platform.x.floor() as i32,
            platform.y.floor() as i32,
            platform_tint(platform),
        );
    }

    canvas.blit(
        &assets.player,
        world.player.x.floor() as i32,
        world.player.y.floor() as i32,
        None,
    );

    canvas.draw_text(
        SCORE_POS.0,
        SCORE_POS.1,
        format!("Score: {}", world.player.score),
        SCORE_COLOR,
    );
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::new(VIEW_W as usize, VIEW_H as usize)
    }
}
