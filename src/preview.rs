// src/preview.rs
//! Визуализация сгенерированного мира в изображение
//!
//! Клетки рисуются цветными блоками `scale × scale`: море, суша,
//! затемнённое внеигровое кольцо. Поверх рельефа города отмечаются
//! кружками: нейтральные — тёмно-серым, стартовые — цветом владельца.
//! Палитра фиксированная, поэтому превью одного сида всегда
//! побайтово совпадает.

use image::{ImageBuffer, Rgba};
use imageproc::drawing::draw_filled_circle_mut;

use crate::city::{City, Owner};
use crate::terrain::{Terrain, WorldGrid};

const SEA_RGB: [u8; 3] = [0, 64, 128];
const LAND_RGB: [u8; 3] = [150, 200, 100];
const NEUTRAL_CITY_RGB: [u8; 3] = [45, 45, 45];

/// Цвета стартовых городов по номеру игрока.
const PLAYER_RGB: [[u8; 3]; 4] = [
    [220, 40, 40],
    [240, 200, 40],
    [60, 200, 220],
    [220, 120, 220],
];

/// Рисует карту мира в RGBA-изображение.
///
/// `scale` — сторона блока одной клетки в пикселях (минимум 1).
#[must_use]
pub fn render_world(
    grid: &WorldGrid,
    cities: &[City],
    scale: u32,
) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let scale = scale.max(1);
    let mut img = ImageBuffer::from_pixel(
        grid.width * scale,
        grid.height * scale,
        Rgba([0, 0, 0, 255]),
    );

    for loc in 0..grid.size() {
        let cell = grid.cells[loc];
        let mut rgb = match cell.terrain {
            Terrain::Sea => SEA_RGB,
            // Городская клетка — та же суша, маркер ляжет сверху.
            Terrain::Land | Terrain::City => LAND_RGB,
        };
        if !cell.on_board {
            for c in &mut rgb {
                *c /= 2;
            }
        }

        let base_x = grid.col(loc) * scale;
        let base_y = grid.row(loc) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(base_x + dx, base_y + dy, Rgba([rgb[0], rgb[1], rgb[2], 255]));
            }
        }
    }

    let radius = (scale as i32 / 3).max(1);
    for city in cities {
        let rgb = match city.owner {
            Owner::Unowned => NEUTRAL_CITY_RGB,
            Owner::Player(p) => PLAYER_RGB[usize::from(p) % PLAYER_RGB.len()],
        };
        let cx = (grid.col(city.loc) * scale + scale / 2) as i32;
        let cy = (grid.row(city.loc) * scale + scale / 2) as i32;
        draw_filled_circle_mut(&mut img, (cx, cy), radius, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    }

    img
}

/// Сохраняет превью мира в PNG-файл.
pub fn save_world_png(
    grid: &WorldGrid,
    cities: &[City],
    scale: u32,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    render_world(grid, cities, scale).save(path)?;
    Ok(())
}
