use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::city::{City, Owner, UnitType};
use crate::config::GenParams;
use crate::continent::ContinentTable;
use crate::pairing::{RankedPair, balanced_index};
use crate::terrain::{CityId, Loc, WorldGrid};
use crate::world::GenError;

/// Минимальный разнос стартовых городов разных игроков.
pub const MIN_START_SEPARATION: u32 = 8;

/// Предел случайных проб на целевом континенте для одного игрока.
const ASSIGN_ATTEMPTS: u32 = 1000;

/// Карта видимости одного игрока: что уже открыто на его экране.
#[derive(Debug, Clone, Serialize)]
pub struct ViewMap {
    pub seen: Vec<bool>,
}

impl ViewMap {
    fn new(size: usize) -> Self {
        Self {
            seen: vec![false; size],
        }
    }

    pub fn reveal(&mut self, loc: Loc) {
        self.seen[loc] = true;
    }

    #[must_use]
    pub fn is_seen(&self, loc: Loc) -> bool {
        self.seen[loc]
    }
}

/// Коллаборатор выбора производства для свежеприсвоенного города.
///
/// Вне режима самоигры генератор спрашивает его один раз на игрока;
/// `None` оставляет выбор производства за внешней подсистемой.
pub trait ProductionPicker {
    fn pick(&mut self, player: u8, city: &City) -> Option<UnitType> {
        let _ = (player, city);
        None
    }
}

/// Выбор по умолчанию: производство остаётся неназначенным.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingProduction;

impl ProductionPicker for PendingProduction {}

/// Раздаёт каждому игроку по стартовому городу.
///
/// Базовые континенты берутся из середины таблицы пар («сбалансированная»
/// пара): первый игрок садится на сторону `b`, второй — на сторону `a`;
/// дополнительным игрокам курсор шагает по таблице дальше с заворотом.
/// Город на континенте выбирается случайно с проверкой разноса от уже
/// посаженных игроков; при неудачах поиск расширяется на все континенты,
/// затем на любой свободный город без оглядки на дистанцию. Если и это
/// не удаётся — городов на всех не хватает, отказ окончательный.
pub fn assign_starts(
    grid: &WorldGrid,
    cities: &mut [City],
    table: &ContinentTable,
    pairs: &[RankedPair],
    params: &GenParams,
    picker: &mut dyn ProductionPicker,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<ViewMap>, GenError> {
    let nplayers = params.num_players as usize;
    let mut views: Vec<ViewMap> = (0..nplayers).map(|_| ViewMap::new(grid.size())).collect();

    if params.box_map {
        assign_box_corners(grid, cities, params, picker, &mut views)?;
        return Ok(views);
    }

    let ncont = table.conts.len();
    let wrap = ncont * ncont / 2 + 1;
    let mut cursor = balanced_index(ncont);

    let mut targets = Vec::with_capacity(nplayers);
    targets.push(pairs[cursor].b);
    if nplayers >= 2 {
        targets.push(pairs[cursor].a);
    }
    for _ in 2..nplayers {
        cursor = (cursor + 1) % wrap;
        targets.push(pairs[cursor].a);
    }

    let mut assigned: Vec<Loc> = Vec::with_capacity(nplayers);
    for (player, &target) in targets.iter().enumerate() {
        let id = choose_start(grid, cities, table, target, &assigned, rng)
            .ok_or(GenError::StartExhausted { player })?;
        assigned.push(cities[id].loc);
        claim_city(cities, id, player as u8, params.sim_mode, picker, &mut views);
        log::debug!("игрок {player}: стартовый город в клетке {}", cities[id].loc);
    }
    Ok(views)
}

/// Ищет свободный город для игрока: целевой континент, затем все
/// континенты, затем любой свободный город.
fn choose_start(
    grid: &WorldGrid,
    cities: &[City],
    table: &ContinentTable,
    target: usize,
    assigned: &[Loc],
    rng: &mut ChaCha8Rng,
) -> Option<CityId> {
    let mut attempts = 0;
    while attempts < ASSIGN_ATTEMPTS {
        let pool = &table.conts[target].cities;
        if pool.is_empty() {
            attempts += 1;
            continue;
        }
        let id = pool[rng.gen_range(0..pool.len())];
        if start_fits(grid, &cities[id], assigned) {
            return Some(id);
        }
        attempts += 1;
    }

    // Шире: по одной случайной пробе на каждом континенте.
    for cont in &table.conts {
        if cont.cities.is_empty() {
            continue;
        }
        let id = cont.cities[rng.gen_range(0..cont.cities.len())];
        if start_fits(grid, &cities[id], assigned) {
            return Some(id);
        }
    }

    // Крайний случай: первый свободный город, дистанция уже не важна.
    for cont in &table.conts {
        for &id in &cont.cities {
            if cities[id].owner == Owner::Unowned {
                return Some(id);
            }
        }
    }
    None
}

fn start_fits(grid: &WorldGrid, city: &City, assigned: &[Loc]) -> bool {
    city.owner == Owner::Unowned
        && assigned
            .iter()
            .all(|&a| grid.dist(city.loc, a) >= MIN_START_SEPARATION)
}

/// Передаёт город игроку: владелец, сброс работы, открытие на карте
/// видимости и выбор производства (в самоигре — сразу армия).
fn claim_city(
    cities: &mut [City],
    id: CityId,
    player: u8,
    sim_mode: bool,
    picker: &mut dyn ProductionPicker,
    views: &mut [ViewMap],
) {
    cities[id].owner = Owner::Player(player);
    cities[id].work = 0;
    views[player as usize].reveal(cities[id].loc);
    cities[id].prod = if sim_mode {
        Some(UnitType::Army)
    } else {
        picker.pick(player, &cities[id])
    };
}

/// Рассадка по углам прямоугольной карты: каждому игроку — ближайший
/// свободный город к «его» внутренней точке квадранта. Ранги континентов
/// здесь не используются.
fn assign_box_corners(
    grid: &WorldGrid,
    cities: &mut [City],
    params: &GenParams,
    picker: &mut dyn ProductionPicker,
    views: &mut [ViewMap],
) -> Result<(), GenError> {
    let top = grid.height / 4;
    let bottom = grid.height * 3 / 4;
    let left = grid.width / 4;
    let right = grid.width * 3 / 4;
    let corners = [
        grid.loc_at(top + 2, left + 2),
        grid.loc_at(top + 2, right - 3),
        grid.loc_at(bottom - 3, left + 2),
        grid.loc_at(bottom - 3, right - 3),
    ];

    for player in 0..params.num_players.min(4) as usize {
        let corner = corners[player];
        let mut best: Option<(CityId, u32)> = None;
        for (id, city) in cities.iter().enumerate() {
            if city.owner != Owner::Unowned {
                continue;
            }
            let row = grid.row(city.loc);
            let col = grid.col(city.loc);
            if row < top || row >= bottom || col < left || col >= right {
                continue;
            }
            let d = grid.dist(city.loc, corner);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        let (id, _) = best.ok_or(GenError::StartExhausted { player })?;
        claim_city(cities, id, player as u8, params.sim_mode, picker, views);
    }
    Ok(())
}
