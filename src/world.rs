//! Сборка мира: полный конвейер генерации с внешним циклом повторов.
//!
//! Конвейер строго последователен: высоты → рельеф → города → континенты →
//! пары → старты. Если анализ не находит ни одного пригодного континента,
//! карта отбрасывается целиком и генерация начинается заново с поля высот;
//! число таких попыток ограничено `max_attempts`, чтобы патологические
//! параметры не зацикливали процесс.

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::city::{self, City};
use crate::config::GenParams;
use crate::continent::{self, ContinentTable};
use crate::heightfield::{self, HeightField};
use crate::pairing::{self, RankedPair};
use crate::start::{self, PendingProduction, ProductionPicker, ViewMap};
use crate::terrain::{self, Terrain, WorldGrid};

/// Ошибки генерации мира.
#[derive(Debug, Error)]
pub enum GenError {
    /// Конфигурация недопустима; перегенерация не поможет.
    #[error("недопустимые параметры: {0}")]
    InvalidParams(String),

    /// Городов больше, чем умещается на этой суше даже вплотную.
    #[error("суша исчерпана: размещено {placed} городов из {target}")]
    OutOfLand { placed: usize, target: usize },

    /// Ни одна попытка не дала пригодного континента.
    #[error("ни одного пригодного континента за {attempts} попыток")]
    NoContinents { attempts: u32 },

    /// Свободных городов на всех игроков не хватило.
    #[error("не удалось выбрать стартовый город для игрока {player}")]
    StartExhausted { player: usize },
}

/// Готовый мир — артефакт передачи внешним подсистемам.
///
/// Ходовой цикл, бой и сохранение работают только с `grid` и `cities`;
/// таблицы континентов и пар оставлены для статистики и отладки, поле
/// высот — для экспорта превью удачной попытки.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: WorldGrid,
    pub cities: Vec<City>,
    pub continents: ContinentTable,
    pub pairs: Vec<RankedPair>,
    /// Карты видимости игроков: стартовые города уже открыты владельцам.
    pub views: Vec<ViewMap>,
    /// Поле высот удачной попытки; `None` на прямоугольной карте.
    pub height: Option<HeightField>,
    /// Сколько попыток потребовалось.
    pub attempts: u32,
}

/// Генерирует мир с выбором производства по умолчанию (отложенным).
pub fn generate_world(params: &GenParams) -> Result<World, GenError> {
    generate_world_with(params, &mut PendingProduction)
}

/// Генерирует мир, спрашивая производство у переданного коллаборатора.
pub fn generate_world_with(
    params: &GenParams,
    picker: &mut dyn ProductionPicker,
) -> Result<World, GenError> {
    params.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let target = params.target_cities();
    let min_dist = params.effective_min_city_dist();

    for attempt in 1..=params.max_attempts {
        let field = if params.box_map {
            None
        } else {
            Some(heightfield::generate_heightfield(
                params.width,
                params.height,
                params.smooth,
                &mut rng,
            ))
        };
        let mut grid = match &field {
            Some(f) => terrain::classify_terrain(f, params.water_ratio, target),
            None => terrain::box_terrain(params.width, params.height),
        };

        // Классификатор мог штатно отдать сплошное море.
        let has_land = grid
            .cells
            .iter()
            .any(|c| c.on_board && c.terrain == Terrain::Land);
        if !has_land {
            debug!("попытка {attempt}: играбельной суши нет, карта отброшена");
            continue;
        }

        let mut cities = city::place_cities(&mut grid, target, min_dist, &mut rng)?;

        let table = continent::find_continents(&grid);
        if table.conts.is_empty() {
            debug!("попытка {attempt}: пригодных континентов нет, карта отброшена");
            continue;
        }

        let pairs = pairing::make_pairs(&table);
        let views = start::assign_starts(
            &grid, &mut cities, &table, &pairs, params, picker, &mut rng,
        )?;

        info!(
            "мир готов: попытка {attempt}, континентов {}, городов {}",
            table.conts.len(),
            cities.len()
        );
        return Ok(World {
            grid,
            cities,
            continents: table,
            pairs,
            views,
            height: field,
            attempts: attempt,
        });
    }

    Err(GenError::NoContinents {
        attempts: params.max_attempts,
    })
}
