use ecs_core::{FamilyId, Handle, Table, World};

/// Iterates the entities that make up `table_family` (i.e. `TF` itself,
/// treated as a set of entity/component handles) and asks each one's own
/// family whether it contains `needle`. Mirrors the ancestor's
/// `components_contain`, which is what `FromComponent` predicates reduce to:
/// unlike `FromEntity` predicates, these can't be answered by interning
/// alone because the requirement is about entities *carried by* the table's
/// members, not about the table's own family.
fn components_contain(
    world: &World,
    table_family: FamilyId,
    needle: FamilyId,
    match_all: bool,
) -> Handle {
    components_contain_with_entity(world, table_family, needle, match_all)
        .map(|(_, component)| component)
        .unwrap_or(Handle::NIL)
}

pub fn components_contain_with_entity(
    world: &World,
    table_family: FamilyId,
    needle: FamilyId,
    match_all: bool,
) -> Option<(Handle, Handle)> {
    for &entity in world.family_members(table_family) {
        if let Some(record) = world.entity_index_get(entity) {
            let component = world.family_contains(record.family, needle, match_all);
            if component != Handle::NIL {
                return Some((entity, component));
            }
        }
    }
    None
}

/// C2 — the six-predicate table in spec.md §4.2. An unset (`FamilyId::EMPTY`)
/// operator family is vacuously satisfied and skipped.
pub fn match_table(world: &World, table: &Table, from_entity: &crate::column::OperatorFamilies, from_component: &crate::column::OperatorFamilies) -> bool {
    let tf = table.family();

    if from_entity.and != FamilyId::EMPTY
        && world.family_contains(tf, from_entity.and, true) == Handle::NIL
    {
        return false;
    }
    if from_entity.or != FamilyId::EMPTY
        && world.family_contains(tf, from_entity.or, false) == Handle::NIL
    {
        return false;
    }
    if from_entity.not != FamilyId::EMPTY
        && world.family_contains(tf, from_entity.not, false) != Handle::NIL
    {
        return false;
    }

    if from_component.and != FamilyId::EMPTY
        && components_contain(world, tf, from_component.and, true) == Handle::NIL
    {
        return false;
    }
    if from_component.or != FamilyId::EMPTY
        && components_contain(world, tf, from_component.or, false) == Handle::NIL
    {
        return false;
    }
    if from_component.not != FamilyId::EMPTY
        && components_contain(world, tf, from_component.not, false) != Handle::NIL
    {
        return false;
    }

    true
}
