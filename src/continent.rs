use std::collections::VecDeque;

use serde::Serialize;

use crate::terrain::{CityId, Loc, Terrain, WorldGrid};

/// Предел отслеживаемых континентов. Поиск останавливается, как только
/// набрано столько: континенты дальше по порядку обхода в этой попытке
/// просто не будут открыты.
pub const MAX_CONT: usize = 10;

/// Пригодный континент: связная масса суши с двумя и более городами,
/// хотя бы один из которых прибрежный. Перестраивается при каждой
/// попытке генерации.
#[derive(Debug, Clone, Serialize)]
pub struct Continent {
    /// Ценность для ранжирования: города весят в тысячу раз больше,
    /// чем клетки суши.
    pub value: i64,
    /// Клеток суши (включая городские).
    pub land: u32,
    /// Прибрежных городов.
    pub shore: u32,
    /// Города в порядке обнаружения обходом.
    pub cities: Vec<CityId>,
}

/// Таблица континентов: порядок обнаружения плюс перестановка по рангу.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContinentTable {
    pub conts: Vec<Continent>,
    /// Индексы `conts` по убыванию ценности; при равенстве раньше стоит
    /// раньше открытый.
    pub rank: Vec<usize>,
}

/// Находит и ранжирует континенты.
///
/// Карта сканируется в фиксированном порядке; каждая непосещённая клетка
/// суши затапливается заливкой. Отвергнутые массивы (без двух городов или
/// без порта) всё равно помечаются посещёнными и записей не дают. Если
/// таблица пуста, вызывающая сторона обязана отбросить карту целиком и
/// начать генерацию заново — частичного восстановления здесь нет.
pub fn find_continents(grid: &WorldGrid) -> ContinentTable {
    let mut visited = vec![false; grid.size()];
    let mut table = ContinentTable::default();

    for seed in 0..grid.size() {
        if table.conts.len() >= MAX_CONT {
            break;
        }
        let cell = &grid.cells[seed];
        if !cell.on_board || visited[seed] || cell.terrain == Terrain::Sea {
            continue;
        }
        if let Some(cont) = mark_continent(grid, seed, &mut visited) {
            insert_ranked(&mut table, cont);
        }
    }

    log::debug!("найдено пригодных континентов: {}", table.conts.len());
    table
}

/// Затапливает один связный массив суши от затравочной клетки.
///
/// Явная очередь вместо рекурсии: глубина компоненты ограничена лишь
/// размером карты. Порядок обхода на подсчёты не влияет.
fn mark_continent(grid: &WorldGrid, seed: Loc, visited: &mut [bool]) -> Option<Continent> {
    let mut queue = VecDeque::new();
    visited[seed] = true;
    queue.push_back(seed);

    let mut land = 0u32;
    let mut shore = 0u32;
    let mut cities: Vec<CityId> = Vec::new();

    while let Some(loc) = queue.pop_front() {
        land += 1;
        if grid.cells[loc].terrain == Terrain::City {
            if let Some(id) = grid.cells[loc].city {
                cities.push(id);
            }
            if grid.is_shore(loc) {
                shore += 1;
            }
        }
        for n in grid.neighbors8(loc) {
            if !visited[n] && grid.cells[n].on_board && grid.cells[n].terrain != Terrain::Sea {
                visited[n] = true;
                queue.push_back(n);
            }
        }
    }

    if cities.len() < 2 || shore < 1 {
        return None;
    }

    // Первые два города (один из них обязан быть портом) — базовые и
    // ценности не добавляют. Дальше порт стоит как полтора внутренних
    // города, а любой город — как тысяча клеток суши.
    let ncity = cities.len() as i64;
    let nshore = i64::from(shore);
    let val = if ncity == nshore {
        (nshore - 2) * 3
    } else {
        (nshore - 1) * 3 + (ncity - nshore - 1) * 2
    };

    Some(Continent {
        value: val * 1000 + i64::from(land),
        land,
        shore,
        cities,
    })
}

/// Вставляет континент в таблицу, поднимая его в перестановке рангов,
/// пока его ценность строго больше соседа сверху.
fn insert_ranked(table: &mut ContinentTable, cont: Continent) {
    let value = cont.value;
    table.conts.push(cont);
    table.rank.push(table.conts.len() - 1);

    let mut i = table.rank.len() - 1;
    while i > 0 && value > table.conts[table.rank[i - 1]].value {
        table.rank.swap(i, i - 1);
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::WorldCell;

    /// Собирает карту из текстовой схемы: `.` море, `#` суша, `C` город.
    /// Внешнее кольцо всегда вне игры, как и в настоящей карте.
    fn grid_from_rows(rows: &[&str]) -> WorldGrid {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut cells = Vec::new();
        let mut next_city = 0usize;
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                let terrain = match ch {
                    '.' => Terrain::Sea,
                    '#' => Terrain::Land,
                    'C' => Terrain::City,
                    other => panic!("неизвестный символ схемы: {other}"),
                };
                let city = if ch == 'C' {
                    let id = next_city;
                    next_city += 1;
                    Some(id)
                } else {
                    None
                };
                cells.push(WorldCell {
                    terrain,
                    on_board: !(r == 0
                        || c == 0
                        || r + 1 == rows.len()
                        || c + 1 == row.len()),
                    city,
                    unit: None,
                });
            }
        }
        WorldGrid {
            width,
            height,
            cells,
        }
    }

    #[test]
    fn accepts_two_city_coastal_continent() {
        let grid = grid_from_rows(&[
            "........",
            ".C#C....",
            ".###....",
            "........",
        ]);
        let table = find_continents(&grid);
        assert_eq!(table.conts.len(), 1);
        let cont = &table.conts[0];
        assert_eq!(cont.cities.len(), 2);
        assert_eq!(cont.land, 6);
        assert_eq!(cont.shore, 2);
        // ncity == nshore == 2: (2-2)*3*1000 + 6 клеток.
        assert_eq!(cont.value, 6);
    }

    #[test]
    fn rejects_single_city_island_but_marks_it() {
        let grid = grid_from_rows(&[
            "...........",
            ".C#........",
            "....C#C....",
            "....###....",
            "...........",
        ]);
        let table = find_continents(&grid);
        // Остров с одним городом отвергнут, второй массив принят.
        assert_eq!(table.conts.len(), 1);
        assert_eq!(table.conts[0].cities.len(), 2);
    }

    #[test]
    fn inland_cities_use_the_mixed_value_branch() {
        // Массив 4×5 суши: один порт в углу и два города в глубине.
        let grid = grid_from_rows(&[
            ".........",
            ".C####...",
            ".##C##...",
            ".###C#...",
            ".#####...",
            ".........",
        ]);
        let table = find_continents(&grid);
        assert_eq!(table.conts.len(), 1);
        let cont = &table.conts[0];
        assert_eq!(cont.cities.len(), 3);
        assert_eq!(cont.shore, 1);
        assert_eq!(cont.land, 20);
        // (1-1)*3 + (3-1-1)*2 = 2 тысячи плюс 20 клеток суши.
        assert_eq!(cont.value, 2020);
    }

    #[test]
    fn rank_is_descending_and_stable() {
        let mut table = ContinentTable::default();
        for value in [3000, 9000, 9000, 1000] {
            insert_ranked(
                &mut table,
                Continent {
                    value,
                    land: 1,
                    shore: 1,
                    cities: vec![0, 1],
                },
            );
        }
        // 9000 и 9000 сохраняют порядок открытия (индексы 1, затем 2).
        assert_eq!(table.rank, vec![1, 2, 0, 3]);
    }

    #[test]
    fn discovery_stops_at_capacity() {
        // Одиннадцать островов по два города; откроются только десять.
        let mut rows: Vec<String> = Vec::new();
        rows.push(".".repeat(9));
        for _ in 0..11 {
            rows.push(".CC......".to_string());
            rows.push(".".repeat(9));
        }
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let table = find_continents(&grid_from_rows(&refs));
        assert_eq!(table.conts.len(), MAX_CONT);
    }
}
