// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие генерацией мира и
//! рассадкой игроков:
//! - Размеры карты и сид детерминированной генерации
//! - Доля воды и степень сглаживания рельефа
//! - Число городов и минимальный разнос между ними
//! - Число игроков и альтернативные режимы (прямоугольная карта, самоигра)
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для настройки через
//! конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::world::GenError;

/// Параметры генерации одного мира
///
/// Полная конфигурация прогона генератора. Поддерживает загрузку из
/// TOML-файлов; каждое поле, кроме сида, имеет разумное значение по
/// умолчанию (карта 100×60, 70% воды, 70 городов, два игрока).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    pub seed: u64,

    /// Ширина карты в клетках (по умолчанию 100)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в клетках (по умолчанию 60)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Целевая доля воды в процентах, допустимо 10..=90 (по умолчанию 70)
    #[serde(default = "default_water_ratio")]
    pub water_ratio: u32,

    /// Число проходов сглаживания рельефа:
    /// - `0` — сырой шум, суша рассыпана поодиночке,
    /// - больше — суша и море собираются в крупные массивы.
    #[serde(default = "default_smooth")]
    pub smooth: u32,

    /// Число городов на обычной карте (по умолчанию 70)
    #[serde(default = "default_num_cities")]
    pub num_cities: u32,

    /// Число городов на прямоугольной карте — она вчетверо меньше по
    /// площади суши, городов нужно меньше (по умолчанию 10)
    #[serde(default = "default_num_cities_box")]
    pub num_cities_box: u32,

    /// Число игроков, допустимо 1..=4 (по умолчанию 2)
    #[serde(default = "default_num_players")]
    pub num_players: u32,

    /// Минимальный разнос городов при размещении.
    ///
    /// `None` — вычисляется из бюджета суши: `isqrt(суша / число городов)`.
    /// Разнос может уменьшаться по ходу размещения на тесной карте.
    #[serde(default)]
    pub min_city_dist: Option<u32>,

    /// Прямоугольная детерминированная карта вместо случайной
    /// (воспроизводимые малые сценарии, рассадка по углам)
    #[serde(default)]
    pub box_map: bool,

    /// Режим самоигры: производство стартовых городов сразу назначается
    /// армией, внешний выбор производства не вызывается
    #[serde(default)]
    pub sim_mode: bool,

    /// Предел попыток полной перегенерации мира, когда на карте не
    /// находится ни одного пригодного континента (по умолчанию 100)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_width() -> u32 {
    100
}
fn default_height() -> u32 {
    60
}
fn default_water_ratio() -> u32 {
    70
}
fn default_smooth() -> u32 {
    5
}
fn default_num_cities() -> u32 {
    70
}
fn default_num_cities_box() -> u32 {
    10
}
fn default_num_players() -> u32 {
    2
}
fn default_max_attempts() -> u32 {
    100
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 100,
            height: 60,
            water_ratio: 70,
            smooth: 5,
            num_cities: 70,
            num_cities_box: 10,
            num_players: 2,
            min_city_dist: None,
            box_map: false,
            sim_mode: false,
            max_attempts: 100,
        }
    }
}

impl GenParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый
    /// формат.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 100
    /// height = 60
    /// water_ratio = 70
    /// num_players = 4
    /// ```
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let params = worldgen::GenParams::from_toml_file("world.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&contents)?;
        Ok(params)
    }

    /// Проверяет допустимость параметров.
    ///
    /// Нарушение диапазона — фатальная ошибка конфигурации, а не повод
    /// перегенерировать карту.
    pub fn validate(&self) -> Result<(), GenError> {
        if !(10..=90).contains(&self.water_ratio) {
            return Err(GenError::InvalidParams(format!(
                "доля воды {} вне диапазона 10..=90",
                self.water_ratio
            )));
        }
        if !(1..=4).contains(&self.num_players) {
            return Err(GenError::InvalidParams(format!(
                "число игроков {} вне диапазона 1..=4",
                self.num_players
            )));
        }
        if self.width < 3 || self.height < 3 {
            return Err(GenError::InvalidParams(format!(
                "карта {}×{} не оставляет играбельных клеток внутри границы",
                self.width, self.height
            )));
        }
        if self.target_cities() < 2 {
            return Err(GenError::InvalidParams(
                "городов должно быть не меньше двух".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(GenError::InvalidParams(
                "нужна хотя бы одна попытка генерации".to_string(),
            ));
        }
        Ok(())
    }

    /// Целевое число городов с учётом режима карты.
    #[must_use]
    pub fn target_cities(&self) -> u32 {
        if self.box_map {
            self.num_cities_box
        } else {
            self.num_cities
        }
    }

    /// Действующий минимальный разнос городов.
    ///
    /// Если разнос не задан явно, он выводится из бюджета суши: сколько
    /// клеток суши приходится на город, столько и закладываем в квадрат
    /// дистанции.
    ///
    /// # Примеры
    /// ```
    /// use worldgen::GenParams;
    /// // 6000 клеток, 30% суши, 70 городов: isqrt(1800 / 70) = 5.
    /// assert_eq!(GenParams::default().effective_min_city_dist(), 5);
    /// ```
    #[must_use]
    pub fn effective_min_city_dist(&self) -> u32 {
        if let Some(d) = self.min_city_dist {
            return d;
        }
        let size = u64::from(self.width) * u64::from(self.height);
        let land = size * u64::from(100 - self.water_ratio) / 100;
        isqrt(land / u64::from(self.target_cities().max(1))) as u32
    }
}

/// Целочисленный квадратный корень (округление вниз).
fn isqrt(v: u64) -> u64 {
    let mut r = (v as f64).sqrt() as u64;
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    while r > 0 && r * r > v {
        r -= 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_describe_a_standard_map() {
        let p = GenParams::default();
        assert_eq!((p.width, p.height), (100, 60));
        assert_eq!(p.water_ratio, 70);
        assert_eq!(p.smooth, 5);
        assert_eq!(p.num_cities, 70);
        assert_eq!(p.num_players, 2);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_with_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "seed = 99\nwater_ratio = 50\nnum_players = 3\n").unwrap();
        let p = GenParams::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(p.seed, 99);
        assert_eq!(p.water_ratio, 50);
        assert_eq!(p.num_players, 3);
        // Остальное — значения по умолчанию.
        assert_eq!(p.width, 100);
        assert_eq!(p.smooth, 5);
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let p = GenParams {
            water_ratio: 95,
            ..GenParams::default()
        };
        assert!(p.validate().is_err());

        let p = GenParams {
            num_players: 5,
            ..GenParams::default()
        };
        assert!(p.validate().is_err());

        let p = GenParams {
            num_cities: 1,
            ..GenParams::default()
        };
        assert!(p.validate().is_err());

        let p = GenParams {
            max_attempts: 0,
            ..GenParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn min_city_dist_override_wins() {
        let p = GenParams {
            min_city_dist: Some(12),
            ..GenParams::default()
        };
        assert_eq!(p.effective_min_city_dist(), 12);
    }

    #[test]
    fn isqrt_rounds_down() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(24), 4);
        assert_eq!(isqrt(25), 5);
        assert_eq!(isqrt(26), 5);
    }
}
