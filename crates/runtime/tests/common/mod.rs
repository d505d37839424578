//! Shared fixtures: a fighter, an archer, a mage and a goblin to hit.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tactics_core::{
    Ability, ActorId, ActorSnapshot, DamageType, InventoryStack, ItemId, ResourceKind,
    WeaponKind, WeaponSummary,
};
use tactics_runtime::{
    ActorDocument, InMemoryDocumentStore, PromptRequest, Prompter, Runtime, RuntimeBuilder,
    ScriptedRoller,
};

pub const FIGHTER: ActorId = ActorId(1);
pub const GOBLIN: ActorId = ActorId(2);
pub const ARCHER: ActorId = ActorId(3);
pub const MAGE: ActorId = ActorId(4);

pub const SWORD: ItemId = ItemId(10);
pub const BOW: ItemId = ItemId(11);
pub const ARROWS: ItemId = ItemId(20);
pub const FIRE_ARROWS: ItemId = ItemId(21);

pub fn sword() -> WeaponSummary {
    WeaponSummary {
        item: SWORD,
        name: "Longsword".into(),
        kind: WeaponKind::Melee,
        damage: 6,
        damage_type: DamageType::Slashing,
        action_cost: 2,
        range: 1,
        scaling: vec![Ability::Strength],
        enchantment: 0,
        ammunition: None,
        two_handed: false,
    }
}

pub fn bow() -> WeaponSummary {
    WeaponSummary {
        item: BOW,
        name: "Shortbow".into(),
        kind: WeaponKind::Ranged,
        damage: 4,
        damage_type: DamageType::Piercing,
        action_cost: 2,
        range: 30,
        scaling: vec![Ability::Dexterity],
        enchantment: 0,
        ammunition: Some("arrow".into()),
        two_handed: true,
    }
}

/// Strength 3 and a longsword: attack bonus +3, 6 slashing.
pub fn fighter() -> ActorSnapshot {
    ActorSnapshot::new(FIGHTER, "Brann")
        .with_ability(Ability::Strength, 3)
        .with_resource(ResourceKind::Action, 6)
        .with_main_hand(sword())
}

pub fn archer(arrows: u32, fire_arrows: u32) -> ActorSnapshot {
    ActorSnapshot::new(ARCHER, "Ilse")
        .with_ability(Ability::Dexterity, 2)
        .with_resource(ResourceKind::Action, 6)
        .with_main_hand(bow())
        .with_stack(InventoryStack {
            item: ARROWS,
            name: "Arrows".into(),
            category: "arrow".into(),
            quantity: arrows,
        })
        .with_stack(InventoryStack {
            item: FIRE_ARROWS,
            name: "Fire Arrows".into(),
            category: "arrow".into(),
            quantity: fire_arrows,
        })
}

/// Intellect 4, arcana 2: spell bonus +6 on firebolt.
pub fn mage() -> ActorSnapshot {
    ActorSnapshot::new(MAGE, "Oona")
        .with_ability(Ability::Intellect, 4)
        .with_ability(Ability::Wisdom, 2)
        .with_skill("arcana", 2)
        .with_resource(ResourceKind::Action, 6)
        .with_resource(ResourceKind::Focus, 4)
}

/// Physical DC 12 (armor 2, dodge 10) and will 10.
pub fn goblin() -> ActorSnapshot {
    ActorSnapshot::new(GOBLIN, "Goblin")
        .with_resource(ResourceKind::Health, 20)
        .with_defense("armor", 2)
        .with_defense("dodge", 10)
        .with_defense("will", 10)
}

pub fn documents() -> InMemoryDocumentStore {
    InMemoryDocumentStore::with_actors([
        ActorDocument::new(FIGHTER)
            .with_resource(ResourceKind::Action, 6)
            .with_equipped(SWORD),
        ActorDocument::new(GOBLIN).with_resource(ResourceKind::Health, 20),
        ActorDocument::new(ARCHER)
            .with_resource(ResourceKind::Action, 6)
            .with_equipped(BOW)
            .with_item(ARROWS, 5)
            .with_item(FIRE_ARROWS, 1),
        ActorDocument::new(MAGE)
            .with_resource(ResourceKind::Action, 6)
            .with_resource(ResourceKind::Focus, 4),
    ])
}

/// Runtime over a shared store with scripted dice.
pub fn table(
    store: &Arc<InMemoryDocumentStore>,
    roller: &Arc<ScriptedRoller>,
) -> RuntimeBuilder {
    Runtime::builder()
        .store(store.clone())
        .roller(roller.clone())
}

pub async fn health(store: &InMemoryDocumentStore, actor: ActorId) -> i32 {
    use tactics_runtime::DocumentStore;

    store
        .load_actor(actor)
        .await
        .expect("store should be readable")
        .expect("actor should exist")
        .resource(ResourceKind::Health)
}

pub async fn document(store: &InMemoryDocumentStore, actor: ActorId) -> ActorDocument {
    use tactics_runtime::DocumentStore;

    store
        .load_actor(actor)
        .await
        .expect("store should be readable")
        .expect("actor should exist")
}

/// Answers every prompt with a fixed choice and remembers the questions.
#[derive(Default)]
pub struct FixedPrompter {
    pub choice: Option<usize>,
    pub asked: Mutex<Vec<PromptRequest>>,
}

impl FixedPrompter {
    pub fn new(choice: Option<usize>) -> Self {
        Self {
            choice,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.lock().map(|asked| asked.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Prompter for FixedPrompter {
    async fn choose(&self, request: &PromptRequest) -> Result<Option<usize>, String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(request.clone());
        }
        Ok(self.choice)
    }
}
