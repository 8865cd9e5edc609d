//! The read-only game catalog: items, plants, villagers, shop listings and
//! the opening order board.
//!
//! [`Catalog::starter`] builds the stock world. Its identifiers are fixed
//! so seeding a database twice inserts nothing new and the in-memory store
//! and `PostgreSQL` agree on ids.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use farmstead_types::{
    ItemDef, ItemId, ItemKind, OrderId, OrderStatus, PlantDef, PlantId, ShopItem, Villager,
    VillagerId, VillagerOrder,
};
use uuid::Uuid;

/// Problems found by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two records of the same kind share a name.
    #[error("duplicate {entity} name {name:?}")]
    DuplicateName {
        /// Record kind.
        entity: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A record references an item that is not in the catalog.
    #[error("{entity} {name:?} references unknown item {item}")]
    UnknownItem {
        /// Referencing record kind.
        entity: &'static str,
        /// Referencing record name or id.
        name: String,
        /// The missing item.
        item: ItemId,
    },

    /// A referenced item has the wrong category.
    #[error("plant {plant:?} expects {expected:?} item {item}, found {found:?}")]
    WrongItemKind {
        /// The plant name.
        plant: String,
        /// The referenced item.
        item: ItemId,
        /// What the plant needs.
        expected: ItemKind,
        /// What the item is.
        found: ItemKind,
    },

    /// An order references a villager that is not in the catalog.
    #[error("order {order} references unknown villager {villager}")]
    UnknownVillager {
        /// The order.
        order: OrderId,
        /// The missing villager.
        villager: VillagerId,
    },

    /// A numeric field that must be positive is zero.
    #[error("{entity} {name:?} has zero {field}")]
    ZeroField {
        /// Record kind.
        entity: &'static str,
        /// Record name or id.
        name: String,
        /// The offending field.
        field: &'static str,
    },
}

/// Every catalog record plus the opening order board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Item definitions.
    pub items: Vec<ItemDef>,
    /// Plant definitions.
    pub plants: Vec<PlantDef>,
    /// Villagers.
    pub villagers: Vec<Villager>,
    /// Shop listings.
    pub shop: Vec<ShopItem>,
    /// Orders posted when the world is created.
    pub orders: Vec<VillagerOrder>,
}

// Fixed ids for the starter world.
const RADISH_SEED: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0101));
const CARROT_SEED: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0102));
const WHEAT_SEED: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0103));
const RADISH: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0201));
const CARROT: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0202));
const WHEAT: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0203));
const WATER: ItemId = ItemId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0301));

const RADISH_PLANT: PlantId = PlantId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0001_0001));
const CARROT_PLANT: PlantId = PlantId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0001_0002));
const WHEAT_PLANT: PlantId = PlantId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0001_0003));

const XIAO_FANG: VillagerId =
    VillagerId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0002_0001));
const LAO_ZHANG: VillagerId =
    VillagerId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0002_0002));

const RADISH_ORDER: OrderId = OrderId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0003_0001));
const WHEAT_ORDER: OrderId = OrderId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0003_0002));

fn item(id: ItemId, name: &str, kind: ItemKind, description: &str) -> ItemDef {
    ItemDef {
        id,
        name: name.to_owned(),
        kind,
        description: Some(description.to_owned()),
    }
}

#[allow(clippy::too_many_arguments)]
fn plant(
    id: PlantId,
    name: &str,
    base_growth_time: u32,
    water_effect_per_time: u32,
    max_water_times: u32,
    sell_price: u64,
    seed_item: ItemId,
    crop_item: ItemId,
) -> PlantDef {
    PlantDef {
        id,
        name: name.to_owned(),
        base_growth_time,
        water_effect_per_time,
        max_water_times,
        harvest_yield: 1,
        sell_price,
        seed_item,
        crop_item,
    }
}

fn order(
    id: OrderId,
    villager: VillagerId,
    required_item: ItemId,
    required_quantity: u32,
    reward_gold: u64,
    reward_affection: u32,
    posted_at: DateTime<Utc>,
) -> VillagerOrder {
    VillagerOrder {
        id,
        villager,
        required_item,
        required_quantity,
        reward_gold,
        reward_affection,
        status: OrderStatus::Available,
        fulfilled_by: None,
        posted_at,
        expires_at: None,
        completed_at: None,
    }
}

impl Catalog {
    /// The stock world: three crops, their seeds, water, two villagers
    /// with one order each, and a shop selling radish seeds and water.
    pub fn starter(posted_at: DateTime<Utc>) -> Self {
        let items = vec![
            item(RADISH_SEED, "Radish Seed", ItemKind::Seed, "Grows into a radish."),
            item(CARROT_SEED, "Carrot Seed", ItemKind::Seed, "Grows into a carrot."),
            item(WHEAT_SEED, "Wheat Seed", ItemKind::Seed, "Grows into wheat."),
            item(RADISH, "Radish", ItemKind::Crop, "A crisp radish."),
            item(CARROT, "Carrot", ItemKind::Crop, "A sweet carrot."),
            item(WHEAT, "Wheat", ItemKind::Crop, "A bundle of wheat."),
            item(WATER, "Water", ItemKind::Material, "Speeds up a growing crop."),
        ];
        let plants = vec![
            plant(RADISH_PLANT, "Radish", 60, 10, 3, 15, RADISH_SEED, RADISH),
            plant(CARROT_PLANT, "Carrot", 90, 15, 8, 20, CARROT_SEED, CARROT),
            plant(WHEAT_PLANT, "Wheat", 70, 13, 6, 18, WHEAT_SEED, WHEAT),
        ];
        let villagers = vec![
            Villager {
                id: XIAO_FANG,
                name: "Xiao Fang".to_owned(),
                gender: "F".to_owned(),
                description: Some("Runs the village kitchen.".to_owned()),
            },
            Villager {
                id: LAO_ZHANG,
                name: "Lao Zhang".to_owned(),
                gender: "M".to_owned(),
                description: Some("Bakes bread by the well.".to_owned()),
            },
        ];
        let shop = vec![
            ShopItem {
                item: RADISH_SEED,
                price: 5,
            },
            ShopItem {
                item: WATER,
                price: 2,
            },
        ];
        let orders = vec![
            order(RADISH_ORDER, XIAO_FANG, RADISH, 5, 50, 5, posted_at),
            order(WHEAT_ORDER, LAO_ZHANG, WHEAT, 3, 70, 8, posted_at),
        ];
        Self {
            items,
            plants,
            villagers,
            shop,
            orders,
        }
    }

    /// Look up an item by name.
    pub fn item_named(&self, name: &str) -> Option<&ItemDef> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Look up a plant by name.
    pub fn plant_named(&self, name: &str) -> Option<&PlantDef> {
        self.plants.iter().find(|plant| plant.name == name)
    }

    /// Look up a villager by name.
    pub fn villager_named(&self, name: &str) -> Option<&Villager> {
        self.villagers.iter().find(|villager| villager.name == name)
    }

    fn item_by_id(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Check names are unique, every reference resolves, plants point at
    /// a seed and a crop, and the positive fields are positive.
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_unique("item", self.items.iter().map(|i| i.name.as_str()))?;
        check_unique("plant", self.plants.iter().map(|p| p.name.as_str()))?;
        check_unique("villager", self.villagers.iter().map(|v| v.name.as_str()))?;

        for plant in &self.plants {
            if plant.base_growth_time == 0 {
                return Err(CatalogError::ZeroField {
                    entity: "plant",
                    name: plant.name.clone(),
                    field: "base_growth_time",
                });
            }
            self.check_plant_item(plant, plant.seed_item, ItemKind::Seed)?;
            self.check_plant_item(plant, plant.crop_item, ItemKind::Crop)?;
        }

        for listing in &self.shop {
            if self.item_by_id(listing.item).is_none() {
                return Err(CatalogError::UnknownItem {
                    entity: "shop listing",
                    name: listing.item.to_string(),
                    item: listing.item,
                });
            }
        }

        for order in &self.orders {
            if !self.villagers.iter().any(|v| v.id == order.villager) {
                return Err(CatalogError::UnknownVillager {
                    order: order.id,
                    villager: order.villager,
                });
            }
            if self.item_by_id(order.required_item).is_none() {
                return Err(CatalogError::UnknownItem {
                    entity: "order",
                    name: order.id.to_string(),
                    item: order.required_item,
                });
            }
            if order.required_quantity == 0 {
                return Err(CatalogError::ZeroField {
                    entity: "order",
                    name: order.id.to_string(),
                    field: "required_quantity",
                });
            }
        }
        Ok(())
    }

    fn check_plant_item(
        &self,
        plant: &PlantDef,
        item: ItemId,
        expected: ItemKind,
    ) -> Result<(), CatalogError> {
        let def = self
            .item_by_id(item)
            .ok_or_else(|| CatalogError::UnknownItem {
                entity: "plant",
                name: plant.name.clone(),
                item,
            })?;
        if def.kind != expected {
            return Err(CatalogError::WrongItemKind {
                plant: plant.name.clone(),
                item,
                expected,
                found: def.kind,
            });
        }
        Ok(())
    }
}

fn check_unique<'a>(
    entity: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName {
                entity,
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starter_catalog_is_valid() {
        assert_eq!(Catalog::starter(Utc::now()).validate(), Ok(()));
    }

    #[test]
    fn starter_ids_are_stable() {
        let a = Catalog::starter(Utc::now());
        let b = Catalog::starter(Utc::now());
        assert_eq!(a.items, b.items);
        assert_eq!(a.plants, b.plants);
        assert_eq!(a.orders.first().unwrap().id, b.orders.first().unwrap().id);
    }

    #[test]
    fn radish_matches_starter_numbers() {
        let catalog = Catalog::starter(Utc::now());
        let radish = catalog.plant_named("Radish").unwrap();
        assert_eq!(radish.base_growth_time, 60);
        assert_eq!(radish.water_effect_per_time, 10);
        assert_eq!(radish.max_water_times, 3);
        assert_eq!(radish.harvest_yield, 1);
        assert_eq!(radish.sell_price, 15);
        assert_eq!(radish.seed_item, catalog.item_named("Radish Seed").unwrap().id);
        assert_eq!(radish.crop_item, catalog.item_named("Radish").unwrap().id);
    }

    #[test]
    fn starter_orders_are_available() {
        let catalog = Catalog::starter(Utc::now());
        let fang = catalog.villager_named("Xiao Fang").unwrap();
        let order = catalog
            .orders
            .iter()
            .find(|o| o.villager == fang.id)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Available);
        assert_eq!(order.required_quantity, 5);
        assert_eq!(order.reward_gold, 50);
        assert_eq!(order.reward_affection, 5);
    }

    #[test]
    fn duplicate_item_name_rejected() {
        let mut catalog = Catalog::starter(Utc::now());
        let mut dup = catalog.items.first().cloned().unwrap();
        dup.id = ItemId::new();
        catalog.items.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateName { entity: "item", .. })
        ));
    }

    #[test]
    fn plant_with_crop_as_seed_rejected() {
        let mut catalog = Catalog::starter(Utc::now());
        let crop = catalog.item_named("Radish").unwrap().id;
        if let Some(radish) = catalog.plants.first_mut() {
            radish.seed_item = crop;
        }
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::WrongItemKind {
                expected: ItemKind::Seed,
                found: ItemKind::Crop,
                ..
            })
        ));
    }

    #[test]
    fn order_for_unknown_villager_rejected() {
        let mut catalog = Catalog::starter(Utc::now());
        if let Some(order) = catalog.orders.first_mut() {
            order.villager = VillagerId::new();
        }
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::UnknownVillager { .. })
        ));
    }
}
