use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::{Loc, Terrain, WorldGrid};
use crate::world::GenError;

/// Число типов боевых единиц.
pub const UNIT_TYPE_COUNT: usize = 8;

/// Тип боевой единицы, которую может производить город.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    Army,
    Fighter,
    PatrolBoat,
    Destroyer,
    Submarine,
    Transport,
    Carrier,
    Battleship,
}

/// Постоянный приказ города производимым единицам данного типа.
///
/// Заполняется производственной подсистемой; генератор создаёт города
/// с пустой таблицей приказов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CityFunc {
    #[default]
    None,
    Fill,
    Destination(Loc),
}

/// Владелец города.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Owner {
    #[default]
    Unowned,
    Player(u8),
}

/// Город: создаётся размещателем, позже забирается распределителем стартов
/// и живёт до конца партии.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub loc: Loc,
    pub owner: Owner,
    /// Текущее производство; `None` — выбор ещё не сделан.
    pub prod: Option<UnitType>,
    /// Накопленная работа над текущим производством.
    pub work: u32,
    pub funcs: [CityFunc; UNIT_TYPE_COUNT],
}

impl City {
    fn new(loc: Loc) -> Self {
        Self {
            loc,
            owner: Owner::Unowned,
            prod: None,
            work: 0,
            funcs: [CityFunc::None; UNIT_TYPE_COUNT],
        }
    }
}

/// Случайно размещает `target` городов на суше.
///
/// Держим список допустимых клеток суши и выбираем из него равномерно.
/// После каждого выбора вычёркиваем клетки ближе `min_city_dist` к новому
/// городу. Когда список пустеет, перестраиваем его по всей карте, уменьшив
/// дистанцию на единицу (кроме самого первого построения), — поэтому на
/// тесной карте поздние города могут стоять плотнее ранних. Дистанция
/// обязана оставаться неотрицательной: потребность опуститься ниже нуля
/// означает, что городов больше, чем помещается на этой суше.
pub fn place_cities(
    grid: &mut WorldGrid,
    target: u32,
    min_city_dist: u32,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<City>, GenError> {
    let mut cities: Vec<City> = Vec::with_capacity(target as usize);
    let mut min_dist = min_city_dist;
    let mut land: Vec<Loc> = Vec::new();

    while (cities.len() as u32) < target {
        while land.is_empty() {
            land = regen_land(grid, &cities, &mut min_dist, target)?;
        }

        let loc = land[rng.gen_range(0..land.len())];
        let id = cities.len();
        cities.push(City::new(loc));
        grid.cells[loc].terrain = Terrain::City;
        grid.cells[loc].city = Some(id);

        // Занятая клетка уходит из списка всегда, даже при нулевой дистанции.
        land.retain(|&l| l != loc && grid.dist(loc, l) >= min_dist);
    }

    log::debug!(
        "размещено {} городов, итоговая дистанция {}",
        cities.len(),
        min_dist
    );
    Ok(cities)
}

/// Перестраивает список допустимой суши после исчерпания.
///
/// Собираем все играбельные клетки суши, уменьшаем дистанцию (не в первый
/// раз) и вычёркиваем всё, что слишком близко к уже стоящим городам.
fn regen_land(
    grid: &WorldGrid,
    cities: &[City],
    min_dist: &mut u32,
    target: u32,
) -> Result<Vec<Loc>, GenError> {
    let mut land: Vec<Loc> = (0..grid.size())
        .filter(|&i| grid.cells[i].on_board && grid.cells[i].terrain == Terrain::Land)
        .collect();

    if cities.is_empty() {
        if land.is_empty() {
            // Суши нет вовсе; перестраивать список повторно бессмысленно.
            return Err(GenError::OutOfLand {
                placed: 0,
                target: target as usize,
            });
        }
        return Ok(land);
    }

    if *min_dist == 0 {
        return Err(GenError::OutOfLand {
            placed: cities.len(),
            target: target as usize,
        });
    }
    *min_dist -= 1;

    for city in cities {
        let d = *min_dist;
        land.retain(|&l| grid.dist(city.loc, l) >= d);
    }
    Ok(land)
}
