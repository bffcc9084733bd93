// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Genome mutation operators.

[`mutate`] clones the parent and hands the copy to [`apply_mutations`], which
consumes and returns an owned genome, so the caller's value is never touched.
Sections are visited in a fixed order (muscles, brain, vision, pheromones,
materials) and every random decision is drawn from the supplied stream, so
the result is a pure function of `(genome, config, stream)`.

A section whose rate is zero, or which is empty, consumes no draws. Values
are clamped into their documented bounds instead of being rejected.
*/

use morphogen_config::MutationConfig;
use morphogen_genome::{Brain, Genome, Material, PheromonePair, Vision};
use tracing::debug;

use crate::random::DeterministicStream;

/// Strength floor for every muscle
pub const MIN_MUSCLE_STRENGTH: f64 = 0.1;

/// Full field-of-view scale in degrees
pub const FIELD_OF_VIEW_MAX: f64 = 360.0;
pub const FIELD_OF_VIEW_MIN: f64 = 1.0;

/// Full vision range scale
pub const RANGE_MAX: u32 = 128;
pub const RANGE_MIN: u32 = 1;

// never panics on lo > hi or NaN bounds, unlike f64::clamp
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

fn changed(delta: f64) -> bool {
    delta.abs() >= f64::EPSILON
}

/// Mutate a copy of `genome`
pub fn mutate(genome: &Genome, config: &MutationConfig, stream: &mut DeterministicStream) -> Genome {
    apply_mutations(genome.clone(), config, stream)
}

/// Mutate an owned genome and hand it back
pub fn apply_mutations(mut genome: Genome, config: &MutationConfig, stream: &mut DeterministicStream) -> Genome {
    let muscles = mutate_muscles(&mut genome, config, stream);
    let brain = mutate_brain(&mut genome.brain, config, stream);
    let vision = match genome.senses.vision.as_mut() {
        Some(vision) => mutate_vision(vision, config, stream),
        None => false,
    };
    let pheromones = mutate_pheromones(&mut genome.pheromone_pairs, config, stream);
    let materials = mutate_materials(&mut genome, config, stream);

    debug!(
        "🧪 [MUTATE] {}: muscles={} brain={} vision={} pheromones={:?} materials={}",
        genome.id, muscles, brain, vision, pheromones, materials
    );
    genome
}

/// Jitter selected muscle strengths; returns how many changed
fn mutate_muscles(genome: &mut Genome, config: &MutationConfig, stream: &mut DeterministicStream) -> usize {
    if config.muscle_rate <= 0.0 {
        return 0;
    }
    let max_strength = config.max_muscle_strength.max(MIN_MUSCLE_STRENGTH);
    let mut count = 0;
    for muscle in &mut genome.muscles {
        if !stream.next_bool(config.muscle_rate) {
            continue;
        }
        let jittered = muscle.strength + stream.next_symmetric(config.muscle_strength_jitter);
        let next = clamp(jittered, MIN_MUSCLE_STRENGTH, max_strength);
        if changed(next - muscle.strength) {
            muscle.strength = next;
            count += 1;
        }
    }
    count
}

fn mutate_brain(brain: &mut Brain, config: &MutationConfig, stream: &mut DeterministicStream) -> bool {
    if config.brain_rate <= 0.0 || !stream.next_bool(config.brain_rate) {
        return false;
    }
    clamp_brain_limits(brain);
    if stream.coin() {
        grow_brain(brain);
    } else {
        shrink_brain(brain);
    }
    true
}

/// Pull the stored maxima back under what the cell count allows
pub fn clamp_brain_limits(brain: &mut Brain) {
    let max_hidden = brain.max_hidden_nodes().min(u64::from(u32::MAX)) as u32;
    let max_layers = brain.max_layers().min(u64::from(u32::MAX)) as u32;
    brain.hidden_max = brain.hidden_max.min(max_hidden);
    brain.layer_limit = brain.layer_limit.clamp(1, max_layers.max(1));
}

/// Add one hidden node, or a whole layer when the current budget is full
pub fn grow_brain(brain: &mut Brain) {
    let max_hidden = brain.max_hidden_nodes();
    let budget = brain.hidden_budget_per_layer();
    if brain.hidden_used < brain.hidden_max {
        brain.hidden_used += 1;
    } else if brain.layers_used < brain.layer_limit {
        brain.layers_used += 1;
        let raised = (u64::from(brain.hidden_max) + budget).min(max_hidden);
        brain.hidden_max = raised as u32;
        brain.hidden_used = brain.hidden_used.saturating_add(1).min(brain.hidden_max);
    }
    finish_brain(brain);
}

/// Drop one hidden node, and a layer once a whole layer's budget is free
pub fn shrink_brain(brain: &mut Brain) {
    let budget = brain.hidden_budget_per_layer();
    if brain.hidden_used > 0 {
        brain.hidden_used -= 1;
    }
    if brain.layers_used > 1 && u64::from(brain.hidden_used) + budget <= u64::from(brain.hidden_max) {
        brain.layers_used -= 1;
        let lowered = u64::from(brain.hidden_max).saturating_sub(budget);
        brain.hidden_max = lowered.max(u64::from(brain.hidden_used)) as u32;
    }
    finish_brain(brain);
}

fn finish_brain(brain: &mut Brain) {
    brain.hidden_used = brain.hidden_used.min(brain.hidden_max);
    brain.layers_used = brain.layers_used.clamp(1, brain.layer_limit.max(1));
}

fn mutate_vision(vision: &mut Vision, config: &MutationConfig, stream: &mut DeterministicStream) -> bool {
    if config.vision_rate <= 0.0 || !stream.next_bool(config.vision_rate) {
        return false;
    }
    let widen = stream.coin();
    shift_vision(vision, widen, config.vision_step);

    let energy = vision.processing_energy + stream.next_symmetric(config.vision_energy_step);
    vision.processing_energy = clamp(energy, 0.0, 1.0);
    let clarity = vision.clarity_falloff + stream.next_symmetric(config.vision_clarity_step);
    vision.clarity_falloff = clarity.max(0.0);
    true
}

/// Trade field of view against range: widening the field shortens the range
pub fn shift_vision(vision: &mut Vision, widen: bool, step: f64) {
    let field_delta = (FIELD_OF_VIEW_MAX * step).max(1.0);
    let range_delta = (f64::from(RANGE_MAX) * step).round().max(1.0);
    let range = f64::from(vision.range);
    let (field, range) = if widen {
        (vision.field_of_view + field_delta, range - range_delta)
    } else {
        (vision.field_of_view - field_delta, range + range_delta)
    };
    vision.field_of_view = clamp(field, FIELD_OF_VIEW_MIN, FIELD_OF_VIEW_MAX);
    vision.range = clamp(range, f64::from(RANGE_MIN), f64::from(RANGE_MAX)) as u32;
}

/// Toggle one pair on or off; returns the id of the flipped pair
fn mutate_pheromones(
    pairs: &mut [PheromonePair],
    config: &MutationConfig,
    stream: &mut DeterministicStream,
) -> Option<String> {
    if pairs.is_empty() || config.pheromone_rate <= 0.0 || !stream.next_bool(config.pheromone_rate) {
        return None;
    }
    let index = stream.next_index(pairs.len()).ok()?;
    let pair = &mut pairs[index];
    toggle_pheromone_pair(pair, config);
    Some(pair.id.clone())
}

/// A pair counts as enabled while its emitter energy is above the disable threshold
pub fn pheromone_pair_enabled(pair: &PheromonePair, config: &MutationConfig) -> bool {
    pair.emitter.specialization_energy > config.pheromone_disable_threshold
}

pub fn toggle_pheromone_pair(pair: &mut PheromonePair, config: &MutationConfig) {
    let energy = if pheromone_pair_enabled(pair, config) {
        0.0
    } else {
        clamp(config.pheromone_enable_value, 0.0, 1.0)
    };
    pair.emitter.specialization_energy = energy;
    pair.receptor.specialization_energy = energy;
}

fn mutate_materials(genome: &mut Genome, config: &MutationConfig, stream: &mut DeterministicStream) -> usize {
    if config.material_rate <= 0.0 {
        return 0;
    }
    let mut count = 0;
    for material in genome.body.cells.iter_mut().filter_map(|cell| cell.material.as_mut()) {
        if !stream.next_bool(config.material_rate) {
            continue;
        }
        if nudge_material(material, stream, config.material_nudge) {
            count += 1;
        }
    }
    count
}

fn nudge_material(material: &mut Material, stream: &mut DeterministicStream, nudge: f64) -> bool {
    let de = stream.next_symmetric(nudge);
    let dt = stream.next_symmetric(nudge);
    if !changed(de) && !changed(dt) {
        return false;
    }
    material.elasticity = clamp(material.elasticity + de, 0.0, 1.0);
    material.toughness = clamp(material.toughness + dt, 0.0, 1.0);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_genome::{load_minimal_genome, PheromoneEnd, PheromoneShape};

    fn brain(cell_count: u32, hidden_max: u32, hidden_used: u32, layer_limit: u32, layers_used: u32) -> Brain {
        Brain {
            cell_count,
            hidden_max,
            hidden_used,
            layer_limit,
            layers_used,
        }
    }

    fn always() -> MutationConfig {
        MutationConfig {
            muscle_rate: 1.0,
            brain_rate: 1.0,
            vision_rate: 1.0,
            pheromone_rate: 1.0,
            material_rate: 1.0,
            ..MutationConfig::default()
        }
    }

    fn never() -> MutationConfig {
        MutationConfig {
            muscle_rate: 0.0,
            brain_rate: 0.0,
            vision_rate: 0.0,
            pheromone_rate: 0.0,
            material_rate: 0.0,
            ..MutationConfig::default()
        }
    }

    #[test]
    fn test_grow_adds_layer_when_hidden_budget_full() {
        let mut b = brain(4, 16, 16, 2, 1);
        clamp_brain_limits(&mut b);
        grow_brain(&mut b);
        assert_eq!(b, brain(4, 16, 16, 2, 2));
    }

    #[test]
    fn test_grow_prefers_hidden_node() {
        let mut b = brain(4, 8, 3, 2, 1);
        grow_brain(&mut b);
        assert_eq!(b, brain(4, 8, 4, 2, 1));
    }

    #[test]
    fn test_grow_layer_raises_hidden_max_by_cell_count() {
        let mut b = brain(4, 8, 8, 2, 1);
        grow_brain(&mut b);
        assert_eq!(b, brain(4, 12, 9, 2, 2));
    }

    #[test]
    fn test_grow_at_every_limit_is_noop() {
        let mut b = brain(4, 16, 16, 2, 2);
        grow_brain(&mut b);
        assert_eq!(b, brain(4, 16, 16, 2, 2));
    }

    #[test]
    fn test_shrink_drops_layer_once_budget_is_free() {
        let mut b = brain(4, 12, 9, 2, 2);
        shrink_brain(&mut b);
        assert_eq!(b, brain(4, 8, 8, 2, 1));

        let mut b = brain(4, 0, 0, 2, 1);
        shrink_brain(&mut b);
        assert_eq!(b, brain(4, 0, 0, 2, 1));
    }

    #[test]
    fn test_limits_clamped_to_cell_count() {
        let mut b = brain(3, 50, 40, 9, 5);
        clamp_brain_limits(&mut b);
        assert_eq!(b.hidden_max, 9);
        assert_eq!(b.layer_limit, 1);
        shrink_brain(&mut b);
        assert!(b.hidden_used <= 9);
        assert_eq!(b.layers_used, 1);

        let mut b = brain(1, 1, 1, 0, 1);
        clamp_brain_limits(&mut b);
        assert_eq!(b.layer_limit, 1);
    }

    #[test]
    fn test_vision_widen_scenario() {
        let mut v = Vision {
            field_of_view: 180.0,
            range: 64,
            processing_energy: 0.3,
            clarity_falloff: 0.1,
        };
        shift_vision(&mut v, true, 0.05);
        assert_eq!(v.field_of_view, 198.0);
        assert_eq!(v.range, 58);

        shift_vision(&mut v, false, 0.05);
        assert_eq!(v.field_of_view, 180.0);
        assert_eq!(v.range, 64);
    }

    #[test]
    fn test_vision_small_step_still_moves_and_clamps() {
        let mut v = Vision {
            field_of_view: 359.5,
            range: 1,
            processing_energy: 0.0,
            clarity_falloff: 0.0,
        };
        shift_vision(&mut v, true, 0.0);
        assert_eq!(v.field_of_view, 360.0);
        assert_eq!(v.range, 1);

        shift_vision(&mut v, false, 1.0);
        assert_eq!(v.field_of_view, 1.0);
        assert_eq!(v.range, 128);
    }

    #[test]
    fn test_toggle_pheromone_pair() {
        let end = |energy| PheromoneEnd {
            specialization_energy: energy,
            radius: 1.0,
            angle: None,
            shape: PheromoneShape::Circle,
        };
        let mut pair = PheromonePair {
            id: "p".to_string(),
            emitter: end(0.0005),
            receptor: end(0.2),
        };
        let config = MutationConfig {
            pheromone_enable_value: 3.0,
            ..MutationConfig::default()
        };
        assert!(!pheromone_pair_enabled(&pair, &config));
        toggle_pheromone_pair(&mut pair, &config);
        assert_eq!(pair.emitter.specialization_energy, 1.0);
        assert_eq!(pair.receptor.specialization_energy, 1.0);
        toggle_pheromone_pair(&mut pair, &config);
        assert_eq!(pair.emitter.specialization_energy, 0.0);
        assert_eq!(pair.receptor.specialization_energy, 0.0);
    }

    #[test]
    fn test_mutate_leaves_parent_untouched() {
        let parent = load_minimal_genome().unwrap();
        let before = parent.canonical_text().unwrap();
        let mut stream = DeterministicStream::derive(1, &[0, 0, 3]);
        let _child = mutate(&parent, &always(), &mut stream);
        assert_eq!(parent.canonical_text().unwrap(), before);
    }

    #[test]
    fn test_zero_rates_draw_nothing() {
        let parent = load_minimal_genome().unwrap();
        let mut stream = DeterministicStream::derive(9, &[1]);
        let untouched = stream.clone();
        let child = mutate(&parent, &never(), &mut stream);
        assert_eq!(child, parent);
        assert_eq!(stream, untouched);
    }

    #[test]
    fn test_full_rate_mutation_changes_genome() {
        let parent = load_minimal_genome().unwrap();
        let mut stream = DeterministicStream::derive(21, &[0, 0, 3]);
        let child = mutate(&parent, &always(), &mut stream);
        assert_ne!(child.canonical_text().unwrap(), parent.canonical_text().unwrap());
        // exactly one pair exists, so the toggle must have hit it
        let flipped = &child.pheromone_pairs[0];
        assert_eq!(flipped.emitter.specialization_energy, 0.0);
        assert_eq!(flipped.receptor.specialization_energy, 0.0);
    }
}
