//! Movement systems.
//!
//! These systems feed every [`Character`] its input, collision view and
//! timing, generic over the physics backend. Kinematic data is copied from
//! the backend into the player before a pass and written back after it.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::StateChanged;
use crate::animation::{AnimationCue, ClipTimeline};
use crate::backend::MovementPhysicsBackend;
use crate::character::Character;
use crate::error::MovementError;
use crate::input::InputState;
use crate::machine::Transition;
use crate::sensor::CollisionQuery;
use crate::signal::{Signal, SignalInbox};

type PassResult = Result<Option<Transition>, MovementError>;

/// Run `step` for every character inside the backend's collider scope.
fn drive<B, F>(world: &mut World, entities: Vec<(Entity, InputState)>, mut step: F)
where
    B: MovementPhysicsBackend,
    F: FnMut(Entity, &mut Character, &InputState, &dyn CollisionQuery) -> Vec<PassResult>,
{
    if entities.is_empty() {
        return;
    }

    let mut changes = Vec::new();
    let scoped = world.try_resource_scope(|world, colliders: Mut<B::Colliders>| {
        for (entity, input) in entities {
            let position = B::get_position(world, entity);
            let velocity = B::get_velocity(world, entity);

            let (position, velocity) = {
                let Some(mut character) = world.get_mut::<Character>(entity) else {
                    continue;
                };
                let player = character.player_mut();
                player.set_position(position);
                player.set_velocity(velocity);

                let query = B::collision_query(&colliders, entity);
                for result in step(entity, &mut *character, &input, query.as_ref()) {
                    match result {
                        Ok(Some(Transition { from, to })) => {
                            changes.push(StateChanged { entity, from, to });
                        }
                        Ok(None) => {}
                        Err(error) => log::warn!("movement pass for {entity} failed: {error}"),
                    }
                }
                (character.player().position(), character.player().velocity())
            };

            B::set_position(world, entity, position);
            B::set_velocity(world, entity, velocity);
        }
    });

    if scoped.is_none() {
        log::warn!("collision resource missing; movement pass skipped");
    }
    for change in changes {
        world.write_message(change);
    }
}

/// Characters with their current input and pending signals.
fn collect_characters(world: &mut World) -> Vec<(Entity, InputState, Vec<Signal>)> {
    world
        .query_filtered::<(Entity, Option<&InputState>, Option<&mut SignalInbox>), With<Character>>()
        .iter_mut(world)
        .map(|(entity, input, inbox)| {
            let signals = inbox.map(|mut inbox| inbox.drain()).unwrap_or_default();
            (entity, input.copied().unwrap_or_default(), signals)
        })
        .collect()
}

/// Variable-rate pass: signals first, then the update hook.
pub fn update_pass<B: MovementPhysicsBackend>(world: &mut World) {
    let dt = world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .unwrap_or(0.0);

    let characters = collect_characters(world);
    let mut signals: HashMap<Entity, Vec<Signal>> = HashMap::new();
    let entities = characters
        .into_iter()
        .map(|(entity, input, pending)| {
            signals.insert(entity, pending);
            (entity, input)
        })
        .collect();

    drive::<B, _>(world, entities, |entity, character, input, query| {
        let mut results: Vec<PassResult> = signals
            .remove(&entity)
            .unwrap_or_default()
            .iter()
            .map(|signal| character.signal(signal, input, query))
            .collect();
        results.push(character.update(input, query, dt));
        results
    });
}

/// Clear input edges once the update pass has seen them.
pub fn consume_input_edges(mut q_inputs: Query<&mut InputState>) {
    for mut input in &mut q_inputs {
        input.consume_edges();
    }
}

/// Fixed-rate pass.
pub fn fixed_pass<B: MovementPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);
    let entities = collect_inputs(world);
    drive::<B, _>(world, entities, |_, character, input, query| {
        vec![character.fixed_update(input, query, dt)]
    });
}

fn collect_inputs(world: &mut World) -> Vec<(Entity, InputState)> {
    world
        .query_filtered::<(Entity, Option<&InputState>), With<Character>>()
        .iter(world)
        .map(|(entity, input)| (entity, input.copied().unwrap_or_default()))
        .collect()
}

/// Advance clip timelines and report completed one-shot clips.
pub fn advance_clip_timelines<B: MovementPhysicsBackend>(world: &mut World) {
    let dt = world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .unwrap_or(0.0);

    let finished: HashMap<Entity, AnimationCue> = world
        .query::<(Entity, &Character, &mut ClipTimeline)>()
        .iter_mut(world)
        .filter_map(|(entity, character, mut timeline)| {
            timeline
                .advance(character.player().animation(), dt)
                .map(|cue| (entity, cue))
        })
        .collect();
    if finished.is_empty() {
        return;
    }

    let entities = collect_inputs(world)
        .into_iter()
        .filter(|(entity, _)| finished.contains_key(entity))
        .collect();
    drive::<B, _>(world, entities, |entity, character, input, query| {
        finished
            .get(&entity)
            .map(|cue| vec![character.animation_finished(cue.state, cue.clip, input, query)])
            .unwrap_or_default()
    });
}
