use serde::{Deserialize, Serialize};

use crate::heightfield::{HeightField, MAX_HEIGHT};

/// Линейный индекс клетки: `row * width + col`.
pub type Loc = usize;
/// Индекс города в таблице городов мира.
pub type CityId = usize;
/// Индекс боевой единицы; принадлежит боевой подсистеме.
pub type UnitId = usize;

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

/// Вид клетки карты.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    Sea,
    Land,
    City,
}

/// Постоянное состояние одной клетки мира.
///
/// `on_board` выделяет играбельную часть: внешнее кольцо карты всегда
/// вне игры, независимо от рельефа. `unit` заполняет боевая подсистема,
/// генератор оставляет его пустым.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldCell {
    pub terrain: Terrain,
    pub on_board: bool,
    pub city: Option<CityId>,
    pub unit: Option<UnitId>,
}

/// Карта мира: прямоугольная решётка клеток.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<WorldCell>,
}

impl WorldGrid {
    /// Пустая карта: всё море, граница вне игры.
    fn blank(width: u32, height: u32) -> Self {
        let cells = (0..(width * height) as usize)
            .map(|i| {
                let row = i as u32 / width;
                let col = i as u32 % width;
                WorldCell {
                    terrain: Terrain::Sea,
                    on_board: !(col == 0 || col == width - 1 || row == 0 || row == height - 1),
                    city: None,
                    unit: None,
                }
            })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn row(&self, loc: Loc) -> u32 {
        loc as u32 / self.width
    }

    pub fn col(&self, loc: Loc) -> u32 {
        loc as u32 % self.width
    }

    pub fn loc_at(&self, row: u32, col: u32) -> Loc {
        (row * self.width + col) as usize
    }

    /// Дистанция Чебышёва: число шагов короля между клетками.
    ///
    /// Единая метрика и для разноса городов, и для разноса стартов:
    /// согласована с восьмисвязным соседством всей остальной логики.
    pub fn dist(&self, a: Loc, b: Loc) -> u32 {
        let dr = self.row(a).abs_diff(self.row(b));
        let dc = self.col(a).abs_diff(self.col(b));
        dr.max(dc)
    }

    /// Восемь соседей клетки, не выходящие за пределы карты.
    pub fn neighbors8(&self, loc: Loc) -> Vec<Loc> {
        let row = self.row(loc) as i32;
        let col = self.col(loc) as i32;
        let mut out = Vec::with_capacity(8);
        for &(dx, dy) in &DIRECTIONS {
            let nc = col + dx;
            let nr = row + dy;
            if nc >= 0 && nr >= 0 && nc < self.width as i32 && nr < self.height as i32 {
                out.push((nr as u32 * self.width + nc as u32) as usize);
            }
        }
        out
    }

    /// Прибрежная ли клетка: есть ли море среди восьми соседей.
    ///
    /// Рельеф граничного кольца учитывается — оно вне игры, но вода в нём
    /// настоящая, и порт у края карты остаётся портом.
    pub fn is_shore(&self, loc: Loc) -> bool {
        self.neighbors8(loc)
            .iter()
            .any(|&n| self.cells[n].terrain == Terrain::Sea)
    }
}

/// Классифицирует поле высот в сушу и море.
///
/// Ватерлиния — наименьшая высота `h`, при которой доля клеток не выше `h`
/// превышает `water_ratio` процентов И выше `h` остаётся не меньше
/// `num_cities` клеток под города. Если такой высоты нет, вся карта
/// становится морем: это штатный отказ, внешний цикл перегенерирует мир.
pub fn classify_terrain(field: &HeightField, water_ratio: u32, num_cities: u32) -> WorldGrid {
    let total = field.data.len();
    let mut hist = vec![0u32; usize::from(MAX_HEIGHT) + 1];
    for &v in &field.data {
        hist[usize::from(v)] += 1;
    }

    let mut waterline = None;
    let mut water = 0u64;
    for h in 0..=usize::from(MAX_HEIGHT) {
        water += u64::from(hist[h]);
        let land_left = total as u64 - water;
        if water * 100 / total as u64 > u64::from(water_ratio)
            && land_left >= u64::from(num_cities)
        {
            waterline = Some(h as u16);
            break;
        }
    }
    log::debug!(
        "классификация: ватерлиния {:?}, water_ratio {}",
        waterline,
        water_ratio
    );

    // Нет ватерлинии — всё не выше MAX_HEIGHT, то есть всё море.
    let line = waterline.unwrap_or(MAX_HEIGHT);

    let mut grid = WorldGrid::blank(field.width, field.height);
    for (i, cell) in grid.cells.iter_mut().enumerate() {
        cell.terrain = if field.data[i] > line {
            Terrain::Land
        } else {
            Terrain::Sea
        };
    }
    grid
}

/// Детерминированная карта без случайности: прямоугольник суши в центре
/// морского поля. Используется для воспроизводимых малых сценариев.
pub fn box_terrain(width: u32, height: u32) -> WorldGrid {
    let top = height / 4;
    let bottom = height * 3 / 4;
    let left = width / 4;
    let right = width * 3 / 4;

    let mut grid = WorldGrid::blank(width, height);
    for (i, cell) in grid.cells.iter_mut().enumerate() {
        let row = i as u32 / width;
        let col = i as u32 % width;
        if row >= top && row < bottom && col >= left && col < right {
            cell.terrain = Terrain::Land;
        }
    }
    grid
}
