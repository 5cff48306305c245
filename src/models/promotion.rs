//! Ценовые акции: набор уровней (множитель + диапазон номеров мест).
//!
//! Акция проверяется один раз при создании и дальше не меняется, кроме имени.
//! Диапазоны могут выходить за вместимость зала, поэтому множества мест
//! не разворачиваются явно: вместо этого строится отсортированный индекс
//! непересекающихся интервалов, поиск по нему - двоичный.

use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::RangeInclusive;

use crate::error::{EngineError, Result};
use crate::ids::{PromotionId, SeatId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub multiplier: Decimal,
    pub low: u32,
    pub high: u32,
}

impl Tier {
    pub fn seats(&self) -> RangeInclusive<u32> {
        self.low..=self.high
    }

    pub fn contains(&self, seat: SeatId) -> bool {
        self.seats().contains(&seat.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Promotion {
    id: PromotionId,
    name: String,
    tiers: Vec<Tier>,
    #[serde(skip)]
    index: Vec<(u32, u32, usize)>,
}

impl Promotion {
    /// Создаёт акцию из параллельных списков множителей и диапазонов `[low, high]`.
    ///
    /// Ошибка `Validation`, если длины списков не совпадают, диапазон не из двух
    /// чисел, `low > high`, множитель не положительный или диапазоны пересекаются.
    pub fn new(
        id: PromotionId,
        name: impl Into<String>,
        multipliers: &[Decimal],
        ranges: &[Vec<u32>],
    ) -> Result<Self> {
        if multipliers.len() != ranges.len() {
            return Err(EngineError::validation(format!(
                "{} price multipliers given for {} seat ranges",
                multipliers.len(),
                ranges.len()
            )));
        }
        if let Some(range) = ranges.iter().find(|r| r.len() != 2) {
            return Err(EngineError::validation(format!(
                "seat range must have exactly two bounds, got {}",
                range.len()
            )));
        }
        if let Some(range) = ranges.iter().find(|r| r[0] > r[1]) {
            return Err(EngineError::validation(format!(
                "seat range {}-{} is ordered high to low",
                range[0], range[1]
            )));
        }
        if let Some(m) = multipliers.iter().find(|m| **m <= Decimal::ZERO) {
            return Err(EngineError::validation(format!(
                "price multiplier {} must be positive",
                m
            )));
        }

        let tiers: Vec<Tier> = multipliers
            .iter()
            .zip(ranges)
            .map(|(multiplier, range)| Tier {
                multiplier: *multiplier,
                low: range[0],
                high: range[1],
            })
            .collect();

        let mut index: Vec<(u32, u32, usize)> = tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| (tier.low, tier.high, i))
            .collect();
        index.sort_unstable();

        // После сортировки по нижней границе пересечение видно у соседей
        if let Some(pair) = index.windows(2).find(|w| w[1].0 <= w[0].1) {
            return Err(EngineError::validation(format!(
                "seat ranges {}-{} and {}-{} overlap",
                pair[0].0, pair[0].1, pair[1].0, pair[1].1
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            tiers,
            index,
        })
    }

    pub fn id(&self) -> PromotionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Уровни в порядке объявления.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Уровень, которому принадлежит место, если он есть.
    pub fn tier_for(&self, seat: SeatId) -> Option<&Tier> {
        let pos = self.index.partition_point(|(low, _, _)| *low <= seat.0);
        let (_, high, tier) = *self.index.get(pos.checked_sub(1)?)?;
        (seat.0 <= high).then(|| &self.tiers[tier])
    }

    pub fn multiplier_for(&self, seat: SeatId) -> Option<Decimal> {
        self.tier_for(seat).map(|tier| tier.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn promo(multipliers: &[Decimal], ranges: &[Vec<u32>]) -> Result<Promotion> {
        Promotion::new(PromotionId(0), "test", multipliers, ranges)
    }

    #[test]
    fn builds_valid_tiers() {
        let p = promo(&[dec!(0.5), dec!(0.75)], &[vec![0, 9], vec![10, 19]]).unwrap();
        assert_eq!(p.tiers().len(), 2);
        assert_eq!(p.multiplier_for(SeatId(0)), Some(dec!(0.5)));
        assert_eq!(p.multiplier_for(SeatId(9)), Some(dec!(0.5)));
        assert_eq!(p.multiplier_for(SeatId(10)), Some(dec!(0.75)));
        assert_eq!(p.multiplier_for(SeatId(19)), Some(dec!(0.75)));
        assert_eq!(p.multiplier_for(SeatId(20)), None);
    }

    #[test]
    fn lookup_ignores_declaration_order() {
        let p = promo(&[dec!(2), dec!(0.5)], &[vec![50, 60], vec![5, 5]]).unwrap();
        assert_eq!(p.multiplier_for(SeatId(5)), Some(dec!(0.5)));
        assert_eq!(p.multiplier_for(SeatId(4)), None);
        assert_eq!(p.multiplier_for(SeatId(6)), None);
        assert_eq!(p.multiplier_for(SeatId(55)), Some(dec!(2)));
        assert_eq!(p.tiers()[0].multiplier, dec!(2));
    }

    #[test]
    fn rejects_count_mismatch() {
        let err = promo(&[dec!(0.5), dec!(0.5)], &[vec![0, 9]]).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_range() {
        assert!(promo(&[dec!(0.5)], &[vec![0]]).is_err());
        assert!(promo(&[dec!(0.5)], &[vec![0, 1, 2]]).is_err());
    }

    #[test]
    fn rejects_descending_range() {
        assert!(matches!(
            promo(&[dec!(0.5)], &[vec![9, 0]]),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_positive_multiplier() {
        assert!(promo(&[dec!(0)], &[vec![0, 9]]).is_err());
        assert!(promo(&[dec!(-1.5)], &[vec![0, 9]]).is_err());
    }

    #[test]
    fn rejects_overlapping_ranges() {
        assert!(promo(&[dec!(0.5), dec!(0.8)], &[vec![0, 9], vec![9, 12]]).is_err());
        assert!(promo(&[dec!(0.5), dec!(0.8)], &[vec![3, 3], vec![0, 10]]).is_err());
        assert!(promo(&[dec!(0.5), dec!(0.8)], &[vec![0, 9], vec![0, 9]]).is_err());
    }

    #[test]
    fn ranges_may_exceed_capacity() {
        let p = promo(&[dec!(1.0)], &[vec![0, u32::MAX]]).unwrap();
        assert_eq!(p.multiplier_for(SeatId(123_456)), Some(dec!(1.0)));
    }

    #[test]
    fn rename_keeps_tiers() {
        let mut p = promo(&[dec!(0.5)], &[vec![0, 9]]).unwrap();
        p.rename("Matinee");
        assert_eq!(p.name(), "Matinee");
        assert_eq!(p.multiplier_for(SeatId(3)), Some(dec!(0.5)));
    }
}
