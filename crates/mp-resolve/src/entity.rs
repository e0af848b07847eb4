// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity coalescence by name and alias transitivity.

use mp_core::{Entity, EntityType};
use std::collections::HashMap;

/// Case-insensitive trimmed identity for names and aliases.
pub(crate) fn entity_ident(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Merge `incoming` into the existing entity list.
///
/// A match is found when the incoming name equals an existing name, the
/// incoming name equals an existing alias, or any incoming alias equals an
/// existing name or alias. Matches merge (canonical name preserved, alias
/// union, type upgraded away from `other`); everything else appends.
///
/// Returns the number of entities touched (merged or appended). The indices
/// built here are per-merge scratch state.
pub(crate) fn coalesce_entities(existing: &mut Vec<Entity>, incoming: Vec<Entity>) -> usize {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut alias_owner: HashMap<String, String> = HashMap::new();
    for (idx, entity) in existing.iter().enumerate() {
        let ident = entity_ident(&entity.name);
        for alias in &entity.aliases {
            alias_owner.insert(entity_ident(alias), ident.clone());
        }
        by_name.insert(ident, idx);
    }

    let mut touched = 0usize;
    for inc in incoming {
        if inc.name.trim().is_empty() {
            continue;
        }
        let inc_ident = entity_ident(&inc.name);
        let target = find_target(&by_name, &alias_owner, &inc_ident, &inc.aliases);

        match target {
            None => {
                for alias in &inc.aliases {
                    alias_owner.insert(entity_ident(alias), inc_ident.clone());
                }
                by_name.insert(inc_ident, existing.len());
                existing.push(inc);
                touched += 1;
            }
            Some(idx) => {
                merge_into(&mut existing[idx], &inc);
                let owner = entity_ident(&existing[idx].name);
                for alias in &existing[idx].aliases {
                    alias_owner.insert(entity_ident(alias), owner.clone());
                }
                touched += 1;
            }
        }
    }
    touched
}

fn find_target(
    by_name: &HashMap<String, usize>,
    alias_owner: &HashMap<String, String>,
    inc_ident: &str,
    inc_aliases: &[String],
) -> Option<usize> {
    let resolve = |ident: &str| -> Option<usize> {
        if let Some(&idx) = by_name.get(ident) {
            return Some(idx);
        }
        alias_owner
            .get(ident)
            .and_then(|owner| by_name.get(owner))
            .copied()
    };

    if let Some(idx) = resolve(inc_ident) {
        return Some(idx);
    }
    inc_aliases
        .iter()
        .find_map(|alias| resolve(&entity_ident(alias)))
}

/// Merge rule: the existing canonical name wins; the alias set is the union
/// (incoming name included when it differs); `other` upgrades to any more
/// specific incoming type.
fn merge_into(existing: &mut Entity, incoming: &Entity) {
    if entity_ident(&existing.name) != entity_ident(&incoming.name) {
        existing.push_alias(&incoming.name);
    }
    for alias in &incoming.aliases {
        existing.push_alias(alias);
    }
    if existing.kind == EntityType::Other && incoming.kind != EntityType::Other {
        existing.kind = incoming.kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, kind: EntityType, aliases: &[&str]) -> Entity {
        let mut e = Entity::new(name, kind);
        for a in aliases {
            e.push_alias(a);
        }
        e
    }

    #[test]
    fn merge_by_exact_name() {
        let mut existing = vec![entity("Rust", EntityType::Tool, &[])];
        let touched = coalesce_entities(
            &mut existing,
            vec![entity("rust", EntityType::Tool, &["rust-lang"])],
        );
        assert_eq!(touched, 1);
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name, "Rust");
        assert_eq!(existing[0].aliases, vec!["rust-lang"]);
    }

    #[test]
    fn merge_when_incoming_name_is_an_existing_alias() {
        let mut existing = vec![entity("SozoGraph", EntityType::Project, &["Sozo Graph"])];
        coalesce_entities(
            &mut existing,
            vec![entity("Sozo Graph", EntityType::Project, &["SozoGraph v1"])],
        );
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name, "SozoGraph");
        assert!(existing[0].aliases.contains(&"Sozo Graph".to_string()));
        assert!(existing[0].aliases.contains(&"SozoGraph v1".to_string()));
    }

    #[test]
    fn merge_when_incoming_alias_hits_existing_name() {
        let mut existing = vec![entity("Acme Corp", EntityType::Organization, &[])];
        coalesce_entities(
            &mut existing,
            vec![entity("Acme", EntityType::Organization, &["acme corp"])],
        );
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name, "Acme Corp");
        assert!(existing[0].aliases.contains(&"Acme".to_string()));
    }

    #[test]
    fn type_upgrades_only_from_other() {
        let mut existing = vec![entity("Harare", EntityType::Other, &[])];
        coalesce_entities(&mut existing, vec![entity("Harare", EntityType::Place, &[])]);
        assert_eq!(existing[0].kind, EntityType::Place);

        coalesce_entities(&mut existing, vec![entity("Harare", EntityType::Concept, &[])]);
        assert_eq!(existing[0].kind, EntityType::Place);
    }

    #[test]
    fn unmatched_entities_append_and_index_their_aliases() {
        let mut existing = vec![];
        coalesce_entities(
            &mut existing,
            vec![entity("Alpha", EntityType::Project, &["A1"])],
        );
        // A later entity named after Alpha's alias should merge, proving the
        // alias index was updated for the appended entity.
        coalesce_entities(&mut existing, vec![entity("A1", EntityType::Project, &[])]);
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name, "Alpha");
    }

    #[test]
    fn blank_names_are_skipped() {
        let mut existing = vec![];
        let touched = coalesce_entities(&mut existing, vec![entity("  ", EntityType::Other, &[])]);
        assert_eq!(touched, 0);
        assert!(existing.is_empty());
    }
}
