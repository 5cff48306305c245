//! venue.rs
//!
//! Площадка - единственный владелец шоу, каталога акций и счётчиков
//! идентификаторов. Шоу ссылается на акцию только по id; все операции,
//! меняющие цены, проходят через площадку, чтобы пересчёт всегда получал
//! актуальную акцию из каталога.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::ids::{BookingId, IdAllocator, PromotionId, ShowId};
use crate::models::{Promotion, Show, ShowDefaults};

#[derive(Debug)]
pub struct Venue {
    name: String,
    rows: u32,
    cols: u32,
    defaults: ShowDefaults,
    ids: IdAllocator,
    shows: BTreeMap<ShowId, Show>,
    promotions: BTreeMap<PromotionId, Promotion>,
}

impl Venue {
    pub fn new(name: impl Into<String>, rows: u32, cols: u32, defaults: ShowDefaults) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
            defaults,
            ids: IdAllocator::new(),
            shows: BTreeMap::new(),
            promotions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn capacity(&self) -> u32 {
        self.rows * self.cols
    }

    // === Шоу ===

    pub fn add_show(&mut self, name: impl Into<String>, at: NaiveDateTime) -> ShowId {
        let id = self.ids.next_show();
        let show = Show::new(id, name, at, self.rows, self.cols, &self.defaults);
        info!("Show {} '{}' scheduled at {}", id, show.name(), at);
        self.shows.insert(id, show);
        id
    }

    pub fn cancel_show(&mut self, id: ShowId) -> Result<Show> {
        let show = self
            .shows
            .remove(&id)
            .ok_or_else(|| EngineError::not_found("show", id))?;
        info!("Show {} '{}' cancelled", id, show.name());
        Ok(show)
    }

    pub fn show(&self, id: ShowId) -> Result<&Show> {
        self.shows
            .get(&id)
            .ok_or_else(|| EngineError::not_found("show", id))
    }

    pub fn show_mut(&mut self, id: ShowId) -> Result<&mut Show> {
        self.shows
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("show", id))
    }

    pub fn shows(&self) -> impl Iterator<Item = &Show> {
        self.shows.values()
    }

    /// Шоу строго между `from` и `to`, по времени начала.
    pub fn shows_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<&Show> {
        let mut shows: Vec<&Show> = self
            .shows
            .values()
            .filter(|s| s.scheduled_at() > from && s.scheduled_at() < to)
            .collect();
        shows.sort_by_key(|s| (s.scheduled_at(), s.id()));
        shows
    }

    pub fn reschedule_show(&mut self, id: ShowId, at: NaiveDateTime) -> Result<()> {
        self.show_mut(id)?.reschedule(at);
        info!("Show {} rescheduled to {}", id, at);
        Ok(())
    }

    pub fn set_default_seat_price(&mut self, id: ShowId, price: Decimal) -> Result<()> {
        if price < Decimal::ZERO {
            return Err(EngineError::validation("seat price cannot be negative"));
        }
        let show = self
            .shows
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("show", id))?;
        let promotion = show.promotion().and_then(|p| self.promotions.get(&p));
        show.set_default_seat_price(price, promotion)?;
        info!("Show {} default seat price set to {}", id, price);
        Ok(())
    }

    pub fn set_max_seats_per_user(&mut self, id: ShowId, max: u32) -> Result<()> {
        if max == 0 {
            return Err(EngineError::validation("max seats per user must be at least 1"));
        }
        self.show_mut(id)?.set_max_seats_per_user(max);
        Ok(())
    }

    // === Акции ===

    pub fn create_promotion(
        &mut self,
        name: &str,
        multipliers: &[Decimal],
        ranges: &[Vec<u32>],
    ) -> Result<PromotionId> {
        let promotion = Promotion::new(self.ids.next_promotion(), name, multipliers, ranges)?;
        let id = promotion.id();
        info!("Promotion {} '{}' created with {} tiers", id, name, promotion.tiers().len());
        self.promotions.insert(id, promotion);
        Ok(id)
    }

    pub fn promotion(&self, id: PromotionId) -> Result<&Promotion> {
        self.promotions
            .get(&id)
            .ok_or_else(|| EngineError::not_found("promotion", id))
    }

    pub fn promotions(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.values()
    }

    pub fn rename_promotion(&mut self, id: PromotionId, name: &str) -> Result<()> {
        self.promotions
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("promotion", id))?
            .rename(name);
        Ok(())
    }

    /// Удаляет акцию из каталога и снимает её со всех шоу, где она применена.
    pub fn remove_promotion(&mut self, id: PromotionId) -> Result<Promotion> {
        let promotion = self
            .promotions
            .remove(&id)
            .ok_or_else(|| EngineError::not_found("promotion", id))?;

        let mut detached = 0;
        for show in self.shows.values_mut().filter(|s| s.promotion() == Some(id)) {
            show.clear_promotion();
            detached += 1;
        }
        info!("Promotion {} removed, detached from {} shows", id, detached);
        Ok(promotion)
    }

    pub fn apply_promotion(&mut self, show_id: ShowId, promotion_id: PromotionId) -> Result<()> {
        let promotion = self
            .promotions
            .get(&promotion_id)
            .ok_or_else(|| EngineError::not_found("promotion", promotion_id))?;
        let show = self
            .shows
            .get_mut(&show_id)
            .ok_or_else(|| EngineError::not_found("show", show_id))?;
        show.apply_promotion(promotion)?;
        info!("Promotion {} applied to show {}", promotion_id, show_id);
        Ok(())
    }

    pub fn remove_show_promotion(&mut self, show_id: ShowId) -> Result<()> {
        self.show_mut(show_id)?.clear_promotion();
        info!("Promotion removed from show {}", show_id);
        Ok(())
    }

    pub(crate) fn next_booking_id(&mut self) -> BookingId {
        self.ids.next_booking()
    }
}
