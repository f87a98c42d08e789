use image::{ImageBuffer, Luma};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Максимальная высота клетки.
pub const MAX_HEIGHT: u16 = 999;

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Двумерное поле высот: значения от 0 (глубокое море) до `MAX_HEIGHT` (горы).
///
/// Живёт только на время генерации: после классификации рельефа поле
/// больше не нужно и сохраняется лишь для отладочного экспорта в PNG.
#[derive(Debug, Clone)]
pub struct HeightField {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u16>,
}

impl HeightField {
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn to_grayscale_image(&self) -> Vec<u8> {
        #[cfg(feature = "parallel")]
        {
            self.data
                .par_iter()
                .map(|&v| (u32::from(v) * 255 / u32::from(MAX_HEIGHT)) as u8)
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.data
                .iter()
                .map(|&v| (u32::from(v) * 255 / u32::from(MAX_HEIGHT)) as u8)
                .collect()
        }
    }

    pub fn save_as_png(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image())
                .ok_or("Failed to create image buffer")?;
        img.save(path)?;
        Ok(())
    }
}

/// Генерирует поле высот: равномерный шум плюс `passes` проходов сглаживания.
///
/// Чем больше проходов, тем сильнее суша и море собираются в крупные пятна.
/// `passes = 0` оставляет сырой шум.
pub fn generate_heightfield(
    width: u32,
    height: u32,
    passes: u32,
    rng: &mut ChaCha8Rng,
) -> HeightField {
    let total = (width * height) as usize;
    let data: Vec<u16> = (0..total).map(|_| rng.gen_range(0..=MAX_HEIGHT)).collect();

    let mut field = HeightField {
        width,
        height,
        data,
    };
    smooth(&mut field, passes);
    field
}

/// Сглаживание девятиточечным средним (клетка плюс восемь соседей).
///
/// Сосед за границей поля заменяется самой клеткой, поэтому края
/// сглаживаются «об себя», без заворачивания и без паддинга. Проходы
/// чередуют два буфера, чтобы чтение и запись не пересекались.
pub fn smooth(field: &mut HeightField, passes: u32) {
    let w = field.width as i32;
    let h = field.height as i32;
    let mut back = vec![0u16; field.data.len()];

    for _ in 0..passes {
        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                let own = u32::from(field.data[idx]);
                let mut sum = own;
                for &(dx, dy) in &DIRECTIONS {
                    let nx = x + dx;
                    let ny = y + dy;
                    sum += if nx < 0 || ny < 0 || nx >= w || ny >= h {
                        own
                    } else {
                        u32::from(field.data[(ny * w + nx) as usize])
                    };
                }
                back[idx] = (sum / 9) as u16;
            }
        }
        std::mem::swap(&mut field.data, &mut back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generation_is_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        let fa = generate_heightfield(20, 12, 3, &mut a);
        let fb = generate_heightfield(20, 12, 3, &mut b);
        assert_eq!(fa.data, fb.data);
    }

    #[test]
    fn heights_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let field = generate_heightfield(30, 30, 5, &mut rng);
        assert!(field.data.iter().all(|&v| v <= MAX_HEIGHT));
    }

    #[test]
    fn zero_passes_keep_raw_noise() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        let raw = generate_heightfield(16, 16, 0, &mut a);
        let mut same = generate_heightfield(16, 16, 0, &mut b);
        smooth(&mut same, 0);
        assert_eq!(raw.data, same.data);
    }

    #[test]
    fn uniform_field_is_fixed_point() {
        let mut field = HeightField {
            width: 8,
            height: 8,
            data: vec![500; 64],
        };
        smooth(&mut field, 4);
        assert!(field.data.iter().all(|&v| v == 500));
    }

    #[test]
    fn corner_uses_itself_for_missing_neighbours() {
        // Угол (0,0) имеет лишь трёх настоящих соседей; остальные
        // пять слагаемых — копии самой клетки.
        let mut field = HeightField {
            width: 2,
            height: 2,
            data: vec![0, 900, 900, 900],
        };
        smooth(&mut field, 1);
        // (0*6 + 900*3) / 9 = 300
        assert_eq!(field.get(0, 0), 300);
    }
}
