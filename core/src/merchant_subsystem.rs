//! Merchant visits and trading.
//!
//! A merchant is in camp when `day >= min_day` and
//! `(day - min_day) mod frequency < duration`. Stock refills on the
//! first day of every visit.

use crate::{
    config::{GameConfig, MerchantDef},
    error::{GameError, GameResult},
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    subsystem::{GameSubsystem, TickContext},
};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MerchantSubsystem;

impl MerchantSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl GameSubsystem for MerchantSubsystem {
    fn name(&self) -> &'static str { "merchant" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        _rng:       &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        if !ctx.new_day {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        for merchant in &ctx.config.merchants {
            if !merchant.availability.arrives_on(ctx.at.day) {
                continue;
            }
            restock(state, merchant);
            state.log(format!("{} has arrived at camp", merchant.name));
            events.push(GameEvent::MerchantArrived { merchant: merchant.id.clone() });
        }
        Ok(events)
    }
}

fn restock(state: &mut Snapshot, merchant: &MerchantDef) {
    let stock: BTreeMap<String, u32> =
        merchant.items.iter().map(|i| (i.id.clone(), i.stock)).collect();
    state.merchant_stock.insert(merchant.id.clone(), stock);
}

/// Merchants in camp today.
pub fn present<'a>(state: &Snapshot, config: &'a GameConfig) -> Vec<&'a MerchantDef> {
    config
        .merchants
        .iter()
        .filter(|m| m.availability.is_present(state.clock.day))
        .collect()
}

fn visiting<'a>(state: &Snapshot, config: &'a GameConfig, id: &str) -> GameResult<&'a MerchantDef> {
    let merchant = config
        .merchant(id)
        .ok_or_else(|| GameError::UnknownMerchant { id: id.to_string() })?;
    if !merchant.availability.is_present(state.clock.day) {
        return Err(GameError::MerchantUnavailable { id: id.to_string() });
    }
    Ok(merchant)
}

/// Pay the item's price and receive its goods.
pub fn buy(state: &mut Snapshot, config: &GameConfig, merchant_id: &str, item_id: &str) -> GameResult<Vec<GameEvent>> {
    let merchant = visiting(state, config, merchant_id)?;
    let item = merchant
        .items
        .iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| GameError::OutOfStock { merchant: merchant_id.into(), item: item_id.into() })?;

    if !state.merchant_stock.contains_key(&merchant.id) {
        restock(state, merchant);
    }
    let left = state
        .merchant_stock
        .get(&merchant.id)
        .and_then(|s| s.get(&item.id))
        .copied()
        .unwrap_or(0);
    if left == 0 {
        return Err(GameError::OutOfStock { merchant: merchant_id.into(), item: item_id.into() });
    }

    state.ledger.consume_all(&item.price)?;
    if let Some(stock) = state.merchant_stock.get_mut(&merchant.id).and_then(|s| s.get_mut(&item.id)) {
        *stock -= 1;
    }

    let mut events: Vec<GameEvent> = item
        .price
        .iter()
        .map(|(r, n)| GameEvent::ResourceSpent { resource: r.clone(), amount: *n })
        .collect();
    events.extend(state.gain_resource(&item.resource, item.amount));
    state.log(format!("Bought {} {} from {}", item.amount, item.resource, merchant.name));
    events.push(GameEvent::TradeCompleted { merchant: merchant.id.clone(), item: item.id.clone() });
    Ok(events)
}

/// Give one unit of the offer's resource for its price.
pub fn sell(state: &mut Snapshot, config: &GameConfig, merchant_id: &str, offer_id: &str) -> GameResult<Vec<GameEvent>> {
    let merchant = visiting(state, config, merchant_id)?;
    let offer = merchant
        .buys
        .iter()
        .find(|o| o.id == offer_id)
        .ok_or_else(|| GameError::OutOfStock { merchant: merchant_id.into(), item: offer_id.into() })?;

    state.ledger.consume(&offer.resource, 1)?;
    let mut events = vec![GameEvent::ResourceSpent { resource: offer.resource.clone(), amount: 1 }];
    for (resource, amount) in &offer.price {
        events.extend(state.gain_resource(resource, *amount));
    }
    state.log(format!("Sold 1 {} to {}", offer.resource, merchant.name));
    events.push(GameEvent::TradeCompleted { merchant: merchant.id.clone(), item: offer.id.clone() });
    Ok(events)
}

/// Consume the trade's inputs and apply its reward.
pub fn special_trade(
    state:       &mut Snapshot,
    config:      &GameConfig,
    merchant_id: &str,
    trade_id:    &str,
    rng:         &mut SubsystemRng,
) -> GameResult<Vec<GameEvent>> {
    let merchant = visiting(state, config, merchant_id)?;
    let trade = merchant
        .special
        .iter()
        .find(|t| t.id == trade_id)
        .ok_or_else(|| GameError::OutOfStock { merchant: merchant_id.into(), item: trade_id.into() })?;

    state.ledger.consume_all(&trade.inputs)?;
    let mut events: Vec<GameEvent> = trade
        .inputs
        .iter()
        .map(|(r, n)| GameEvent::ResourceSpent { resource: r.clone(), amount: *n })
        .collect();
    state.log(format!("{} with {}", trade.name, merchant.name));
    events.extend(trade.reward.apply(state, rng));
    events.push(GameEvent::TradeCompleted { merchant: merchant.id.clone(), item: trade.id.clone() });
    Ok(events)
}
