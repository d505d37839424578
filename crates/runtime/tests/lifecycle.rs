//! Executor behavior observed through the public runtime API.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::*;
use tactics_core::{
    ActionError, ActionRecord, ActorSnapshot, Degree, Outcome, Phase, PhaseSet, ResourceKind,
    StatusTone,
};
use tactics_runtime::{
    ActionContext, BehaviorTable, ConfirmContext, DocumentStore, HookCriticality, HookName,
    HookRegistry, Runtime, RuntimeError, ScriptedRoller, TagBehavior, Talent, render_record,
};

/// Forwards to a stock behavior and logs `tag:phase` for every dispatch.
struct Recorder {
    inner: Arc<dyn TagBehavior>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn wrap(table: &mut BehaviorTable, tag: &str, log: &Arc<Mutex<Vec<String>>>) {
        let inner = table.get(tag).expect("tag should be bound").clone();
        table.bind(
            tag,
            Arc::new(Recorder {
                inner,
                log: log.clone(),
            }),
        );
    }

    fn note(&self, phase: Phase) {
        self.log
            .lock()
            .expect("log lock")
            .push(format!("{}:{phase}", self.inner.name()));
    }
}

#[async_trait]
impl TagBehavior for Recorder {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn phases(&self) -> PhaseSet {
        self.inner.phases()
    }

    async fn prepare(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        self.note(Phase::Prepare);
        self.inner.prepare(cx).await
    }

    async fn can_use(&self, cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        self.note(Phase::CanUse);
        self.inner.can_use(cx).await
    }

    async fn configure(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
    ) -> Result<(), ActionError> {
        self.note(Phase::Configure);
        self.inner.configure(cx, target).await
    }

    async fn roll(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        self.note(Phase::Roll);
        self.inner.roll(cx, target, outcome).await
    }

    async fn post_activate(
        &self,
        cx: &mut ActionContext<'_>,
        target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        self.note(Phase::PostActivate);
        self.inner.post_activate(cx, target, outcome).await
    }

    async fn confirm(&self, cx: &mut ConfirmContext<'_>) -> Result<(), ActionError> {
        self.inner.confirm(cx).await
    }
}

/// Adds two extra damage on a hit.
struct Brutal;

#[async_trait]
impl TagBehavior for Brutal {
    fn name(&self) -> &'static str {
        "brutal"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::POST_ACTIVATE
    }

    async fn post_activate(
        &self,
        _cx: &mut ActionContext<'_>,
        _target: &ActorSnapshot,
        outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        if outcome.is_hit() && !outcome.is_self {
            outcome.resources.add(ResourceKind::Health, -2);
        }
        Ok(())
    }
}

/// Fails with a fixed error in `canUse` and `roll`.
struct Faulty(ActionError);

#[async_trait]
impl TagBehavior for Faulty {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::CAN_USE | PhaseSet::ROLL
    }

    async fn can_use(&self, _cx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        Err(self.0.clone())
    }

    async fn roll(
        &self,
        _cx: &mut ActionContext<'_>,
        _target: &ActorSnapshot,
        _outcome: &mut Outcome,
    ) -> Result<(), ActionError> {
        Err(self.0.clone())
    }
}

fn statuses(outcome: &Outcome) -> Vec<&str> {
    outcome.status_text.iter().map(|s| s.text.as_str()).collect()
}

#[tokio::test]
async fn strike_reads_the_weapon_melee_selected() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut behaviors = BehaviorTable::standard();
    Recorder::wrap(&mut behaviors, "melee", &log);
    Recorder::wrap(&mut behaviors, "strike", &log);

    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller)
        .behaviors(behaviors)
        .build()
        .await
        .expect("runtime should build");

    let prepared = runtime
        .prepare("strike", &fighter())
        .await
        .expect("strike should prepare");
    assert_eq!(prepared.cost.action, 2);
    assert_eq!(prepared.range.maximum, 1);
    assert_eq!(
        prepared.usage.weapon.as_ref().map(|w| w.item),
        Some(SWORD)
    );

    log.lock().expect("log lock").clear();
    let record = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike should resolve");

    let order = log.lock().expect("log lock").clone();
    assert_eq!(
        order,
        [
            "melee:prepare",
            "strike:prepare",
            "melee:can_use",
            "strike:can_use",
            "strike:roll",
            "strike:post_activate",
        ]
    );

    // 4+4+4 +3 strength = 15 against physical DC 12
    let hit = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(hit.rolls.len(), 1);
    assert_eq!(hit.rolls[0].total, 15);
    assert_eq!(hit.rolls[0].degree, Degree::Success);
    assert_eq!(hit.resources.get(ResourceKind::Health), -9);
    assert_eq!(statuses(hit), ["-9 health"]);
    assert_eq!(hit.status_text[0].tone, StatusTone::Damage);

    let own = record.self_outcome().expect("self outcome");
    assert_eq!(own.resources.get(ResourceKind::Action), -2);
    assert_eq!(roller.remaining(), 0);
}

#[tokio::test]
async fn prepare_can_be_repeated_without_accumulating() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let mut instance = runtime
        .instance("strike", FIGHTER)
        .expect("strike is in the catalog");
    for _ in 0..3 {
        runtime
            .prepare_instance(&mut instance, &fighter())
            .await
            .expect("prepare");
    }
    assert_eq!(instance.cost.action, 2);
    assert_eq!(instance.usage.damage.base, 6);
}

#[tokio::test]
async fn glancing_blow_deals_half_damage() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[2, 2, 3]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let record = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike should resolve");

    // 10 falls 2 short, which armor 2 covers
    let outcome = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert!(matches!(outcome.rolls[0].degree, Degree::Partial { .. }));
    assert_eq!(outcome.resources.get(ResourceKind::Health), -3);
    assert_eq!(statuses(outcome), ["Glance", "-3 health"]);
}

#[tokio::test]
async fn dodged_attack_deals_nothing() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[1, 1, 1]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let record = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("a miss is still a record");

    let outcome = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(outcome.rolls[0].degree, Degree::CriticalFailure);
    assert_eq!(outcome.resources.get(ResourceKind::Health), 0);
    assert_eq!(statuses(outcome), ["Dodge"]);
    // the swing is still paid for
    let own = record.self_outcome().expect("self outcome");
    assert_eq!(own.resources.get(ResourceKind::Action), -2);
}

#[tokio::test]
async fn flanked_target_grows_the_first_die() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[10, 1, 1], [10, 1, 1]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let mut surrounded = goblin();
    surrounded.flanked_by = 2;
    let record = runtime
        .use_action("strike", &fighter(), &[surrounded])
        .await
        .expect("a ten fits the boon die");
    let outcome = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(outcome.rolls[0].pool.formula(), "1d10 + 1d8 + 1d8");
    assert_eq!(outcome.rolls[0].total, 15);

    let err = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect_err("a ten cannot come off a d8");
    assert!(matches!(
        err,
        RuntimeError::Action(ActionError::InvalidRoll { .. })
    ));
}

#[tokio::test]
async fn failed_precondition_rolls_nothing() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let mut unarmed = fighter();
    unarmed.weapons.main_hand = None;
    let err = runtime
        .use_action("strike", &unarmed, &[goblin()])
        .await
        .expect_err("no weapon, no strike");

    assert!(err.is_precondition());
    assert_eq!(err.to_string(), "melee: no melee weapon equipped");
    assert_eq!(roller.remaining(), 1);
    let stored = store.list_records().await.expect("list");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn too_many_targets_is_a_precondition() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let targets: Vec<_> = (10..14)
        .map(|id| {
            let mut target = goblin();
            target.id = tactics_core::ActorId(id);
            target
        })
        .collect();
    let err = runtime
        .use_action("chain-lightning", &mage(), &targets)
        .await
        .expect_err("chain lightning stops at three");
    assert!(err.is_precondition());
}

#[tokio::test]
async fn spell_checks_will_and_uses_its_damage_type() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[2, 2, 2]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let record = runtime
        .use_action("firebolt", &mage(), &[goblin()])
        .await
        .expect("firebolt should resolve");

    // 6 +4 intellect +2 arcana = 12 against will 10
    let outcome = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(outcome.rolls[0].dc, 10);
    assert_eq!(outcome.rolls[0].degree, Degree::Success);
    assert_eq!(outcome.resources.get(ResourceKind::Health), -8);
    assert_eq!(
        record.usage.damage.damage_type,
        Some(tactics_core::DamageType::Fire)
    );

    let own = record.self_outcome().expect("self outcome");
    assert_eq!(own.resources.get(ResourceKind::Action), -2);
    assert_eq!(own.resources.get(ResourceKind::Focus), -1);
}

#[tokio::test]
async fn resisted_hex_carries_no_effect() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[1, 1, 1], [4, 4, 4]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let missed = runtime
        .use_action("hex", &mage(), &[goblin()])
        .await
        .expect("hex should resolve");
    let outcome = missed.outcome_for(GOBLIN).expect("goblin outcome");
    assert!(outcome.effects.is_empty());
    assert_eq!(statuses(outcome), ["Resisted"]);

    let landed = runtime
        .use_action("hex", &mage(), &[goblin()])
        .await
        .expect("hex should resolve");
    let outcome = landed.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(outcome.effects.len(), 1);
    assert_eq!(outcome.effects[0].id, "hexed");
}

#[tokio::test]
async fn ammunition_prompt_picks_the_stack() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let prompter = Arc::new(FixedPrompter::new(Some(1)));
    let runtime = table(&store, &roller)
        .prompter(prompter.clone())
        .build()
        .await
        .expect("runtime");

    let record = runtime
        .use_action("shoot", &archer(5, 1), &[goblin()])
        .await
        .expect("shoot should resolve");

    assert_eq!(prompter.asked(), 1);
    let asked = prompter.asked.lock().expect("lock")[0].clone();
    assert_eq!(asked.options, ["Arrows (5)", "Fire Arrows (1)"]);
    let consumed = record.usage.consumed.expect("a stack was loaded");
    assert_eq!(consumed.item, FIRE_ARROWS);
    assert!(record.tags.contains("ammunition"));
}

#[tokio::test]
async fn single_stack_is_loaded_without_asking() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let prompter = Arc::new(FixedPrompter::new(None));
    let runtime = table(&store, &roller)
        .prompter(prompter.clone())
        .build()
        .await
        .expect("runtime");

    let record = runtime
        .use_action("shoot", &archer(5, 0), &[goblin()])
        .await
        .expect("shoot should resolve");
    assert_eq!(prompter.asked(), 0);
    assert_eq!(record.usage.consumed.map(|c| c.item), Some(ARROWS));
}

#[tokio::test]
async fn cancelled_prompt_aborts_before_rolling() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller)
        .prompter(Arc::new(FixedPrompter::new(None)))
        .build()
        .await
        .expect("runtime");

    let err = runtime
        .use_action("shoot", &archer(5, 1), &[goblin()])
        .await
        .expect_err("no ammunition chosen");
    assert!(err.is_precondition());
    assert_eq!(roller.remaining(), 1);
}

#[tokio::test]
async fn empty_quiver_cannot_shoot() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let err = runtime
        .use_action("shoot", &archer(0, 0), &[goblin()])
        .await
        .expect_err("out of arrows");
    assert_eq!(err.to_string(), "ammunition: out of arrow");
    assert_eq!(roller.remaining(), 1);
}

#[tokio::test]
async fn spent_reaction_blocks_another() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let record = runtime
        .use_action("riposte", &fighter(), &[goblin()])
        .await
        .expect("riposte should resolve");
    let own = record.self_outcome().expect("self outcome");
    assert_eq!(own.resources.get(ResourceKind::Action), 0);

    let tired = fighter().with_status(tactics_runtime::behavior::tags::REACTION_USED);
    let err = runtime
        .use_action("riposte", &tired, &[goblin()])
        .await
        .expect_err("one reaction per round");
    assert!(err.is_precondition());
}

#[tokio::test]
async fn talents_run_after_tags() {
    let mut talents = HookRegistry::new();
    talents.subscribe(
        FIGHTER,
        HookName::PostActivateAction,
        Talent::new("brutal", Arc::new(Brutal)),
    );

    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller)
        .talents(talents)
        .build()
        .await
        .expect("runtime");

    let record = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike should resolve");
    let outcome = record.outcome_for(GOBLIN).expect("goblin outcome");
    assert_eq!(outcome.resources.get(ResourceKind::Health), -11);
}

async fn strike_with_talent(
    hook: HookName,
    talent: Talent,
) -> Result<ActionRecord, RuntimeError> {
    let mut talents = HookRegistry::new();
    talents.subscribe(FIGHTER, hook, talent);

    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller)
        .talents(talents)
        .build()
        .await
        .expect("runtime");
    runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
}

#[tokio::test]
async fn talent_criticality_decides_whether_misfires_abort() {
    for (criticality, aborts) in [
        (HookCriticality::Critical, true),
        (HookCriticality::Important, false),
        (HookCriticality::Optional, false),
    ] {
        let stray = Faulty(ActionError::TargetNotFound(ARCHER));
        let talent = Talent::new("faulty", Arc::new(stray)).with_criticality(criticality);

        let result = strike_with_talent(HookName::CanUseAction, talent).await;
        assert_eq!(result.is_err(), aborts, "{criticality:?}");
    }
}

#[tokio::test]
async fn talent_content_errors_surface_at_any_criticality() {
    for criticality in [
        HookCriticality::Critical,
        HookCriticality::Important,
        HookCriticality::Optional,
    ] {
        let broken = Faulty(ActionError::data_integrity("faulty", "talent misconfigured"));
        let talent = Talent::new("faulty", Arc::new(broken)).with_criticality(criticality);

        let err = strike_with_talent(HookName::CanUseAction, talent)
            .await
            .expect_err("broken talent content must not be ignored");
        assert!(
            matches!(err, RuntimeError::Action(ActionError::DataIntegrity { .. })),
            "{criticality:?}: {err}"
        );
    }
}

#[tokio::test]
async fn talent_roller_failure_reaches_the_caller() {
    let relay = Faulty(ActionError::Roller("remote roll relay failed".into()));
    let talent = Talent::new("remote dice", Arc::new(relay));

    let err = strike_with_talent(HookName::RollAction, talent)
        .await
        .expect_err("a failed roller is not a talent misfire");
    assert!(matches!(err, RuntimeError::Action(ActionError::Roller(_))));
}

#[tokio::test]
async fn seeded_tables_resolve_identically() {
    let first = Runtime::builder().build().await.expect("runtime");
    let second = Runtime::builder().build().await.expect("runtime");

    let a = first
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike");
    let b = second
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike");
    assert_eq!(a, b);
}

#[tokio::test]
async fn records_are_stored_and_rendered() {
    let store = Arc::new(documents());
    let roller = Arc::new(ScriptedRoller::new([[4, 4, 4]]));
    let runtime = table(&store, &roller).build().await.expect("runtime");

    let record = runtime
        .use_action("strike", &fighter(), &[goblin()])
        .await
        .expect("strike should resolve");
    let stored = runtime.record(&record.id).await.expect("record is stored");
    assert_eq!(stored, record);
    assert!(!stored.confirmed);

    let json = render_record(&stored).expect("render");
    assert_eq!(json["action"], "strike");
    assert_eq!(json["confirmed"], false);
}

#[tokio::test]
async fn unknown_action_is_reported() {
    let runtime = Runtime::builder().build().await.expect("runtime");
    let err = runtime
        .use_action("fireball", &mage(), &[goblin()])
        .await
        .expect_err("not in the catalog");
    assert!(matches!(err, RuntimeError::UnknownAction(name) if name == "fireball"));
}
