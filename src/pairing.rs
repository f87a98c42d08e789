use serde::Serialize;

use crate::continent::ContinentTable;

/// Упорядоченная пара континентов с разностью ценностей.
///
/// Таблица пар — все `ncont²` упорядоченных сочетаний, включая пары
/// континента с самим собой, по убыванию `value(a) − value(b)`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedPair {
    pub value: i64,
    pub a: usize,
    pub b: usize,
}

/// Строит таблицу ранжированных пар.
///
/// Та же устойчивая вставка с всплытием, что и у рангов континентов:
/// при равных разностях раньше стоит раньше построенная пара.
pub fn make_pairs(table: &ContinentTable) -> Vec<RankedPair> {
    let n = table.conts.len();
    let mut pairs: Vec<RankedPair> = Vec::with_capacity(n * n);

    for a in 0..n {
        for b in 0..n {
            let value = table.conts[a].value - table.conts[b].value;
            pairs.push(RankedPair { value, a, b });
            let mut k = pairs.len() - 1;
            while k > 0 && pairs[k].value > pairs[k - 1].value {
                pairs.swap(k, k - 1);
                k -= 1;
            }
        }
    }
    pairs
}

/// Середина таблицы пар — сбалансированный выбор по умолчанию.
pub fn balanced_index(ncont: usize) -> usize {
    ncont * ncont / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::Continent;

    fn table_with_values(values: &[i64]) -> ContinentTable {
        let mut table = ContinentTable::default();
        for &value in values {
            table.conts.push(Continent {
                value,
                land: 1,
                shore: 1,
                cities: vec![0, 1],
            });
            table.rank.push(table.rank.len());
        }
        table
    }

    #[test]
    fn pairs_cover_all_ordered_combinations() {
        let table = table_with_values(&[5000, 3000, 1000]);
        let pairs = make_pairs(&table);
        assert_eq!(pairs.len(), 9);
        let mut seen: Vec<(usize, usize)> = pairs.iter().map(|p| (p.a, p.b)).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 9, "каждая пара встречается один раз");
    }

    #[test]
    fn pairs_are_sorted_descending() {
        let table = table_with_values(&[5000, 3000, 1000]);
        let pairs = make_pairs(&table);
        for w in pairs.windows(2) {
            assert!(w[0].value >= w[1].value);
        }
        // Крайние разности: 5000-1000 и 1000-5000.
        assert_eq!(pairs[0].value, 4000);
        assert_eq!(pairs[8].value, -4000);
    }

    #[test]
    fn middle_pair_is_balanced() {
        let table = table_with_values(&[5000, 3000, 1000]);
        let pairs = make_pairs(&table);
        let mid = pairs[balanced_index(3)];
        // В середине таблицы — нулевая разность.
        assert_eq!(mid.value, 0);
    }

    #[test]
    fn value_matches_index_difference() {
        let table = table_with_values(&[7000, 2000]);
        for pair in make_pairs(&table) {
            assert_eq!(
                pair.value,
                table.conts[pair.a].value - table.conts[pair.b].value
            );
        }
    }

    #[test]
    fn single_continent_pairs_with_itself() {
        let table = table_with_values(&[4000]);
        let pairs = make_pairs(&table);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].a, pairs[0].b, pairs[0].value), (0, 0, 0));
        assert_eq!(balanced_index(1), 0);
    }
}
