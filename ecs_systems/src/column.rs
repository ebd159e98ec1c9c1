use crate::error::BuildError;
pub use ecs_core::signature::{Operator, Source};
use ecs_core::{FamilyId, Handle, World};

/// A column's value: either a single required handle (`And`), or a family
/// of alternatives (`Or`, folded). This is the "distinct variant" split the
/// design notes (§9) ask a reimplementation to make explicit, replacing the
/// ancestor's sign-free reuse of the `And` tag for folded `Or` columns.
#[derive(Clone, Copy, Debug)]
pub enum Payload {
    Handle(Handle),
    Family(FamilyId),
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub source: Source,
    pub payload: Payload,
}

/// Per-operator interned families, one trio per source. Used only by the
/// table matcher (C2); columns carry no operator once folding completes.
#[derive(Clone, Copy, Debug, Default)]
pub struct OperatorFamilies {
    pub and: FamilyId,
    pub or: FamilyId,
    pub not: FamilyId,
}

impl OperatorFamilies {
    fn add(&mut self, world: &mut World, operator: Operator, handle: Handle) {
        let slot = match operator {
            Operator::And => &mut self.and,
            Operator::Or => &mut self.or,
            Operator::Not => &mut self.not,
        };
        *slot = world.family_add(*slot, handle);
    }
}

/// C1 — consumes parsed tokens in signature order and incrementally builds
/// `columns` plus the per-operator family sets the table matcher (C2)
/// reads.
#[derive(Default)]
pub struct SignatureBuilder {
    pub columns: Vec<Column>,
    pub from_entity: OperatorFamilies,
    pub from_component: OperatorFamilies,
}

impl SignatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one `(source, operator, component_name)` token. Resolves the
    /// name through `world.lookup`, updates the matching operator family,
    /// and emits/folds a column per §4.1's rules.
    pub fn add_component(
        &mut self,
        world: &mut World,
        source: Source,
        operator: Operator,
        component_name: &str,
    ) -> Result<(), BuildError> {
        let handle = world
            .lookup_or_err(component_name)
            .map_err(|_| BuildError::UnresolvedComponent(component_name.to_string()))?;

        match source {
            Source::FromEntity => self.from_entity.add(world, operator, handle),
            Source::FromComponent => self.from_component.add(world, operator, handle),
        }

        match operator {
            Operator::And => {
                self.columns.push(Column {
                    source,
                    payload: Payload::Handle(handle),
                });
            }
            Operator::Or => self.fold_or(world, source, handle)?,
            Operator::Not => {
                // Negative requirements never index into row data.
            }
        }

        Ok(())
    }

    fn fold_or(&mut self, world: &mut World, source: Source, handle: Handle) -> Result<(), BuildError> {
        match self.columns.last_mut() {
            None => {
                // No preceding column to promote; start a folded column of
                // our own, matching what promotion would have produced.
                let family = world.family_add(FamilyId::EMPTY, handle);
                self.columns.push(Column {
                    source,
                    payload: Payload::Family(family),
                });
            }
            Some(last) => match last.payload {
                Payload::Handle(existing) => {
                    // Promote: wrap the single handle into a family and
                    // adopt the incoming token's source unconditionally.
                    // The cross-source guard fires only on a *subsequent*
                    // Or term (see DESIGN.md, Open Question (a)) — matching
                    // the ancestor C parser, which never checks `source` on
                    // this branch.
                    let family = world.family_add(FamilyId::EMPTY, existing);
                    let family = world.family_add(family, handle);
                    last.payload = Payload::Family(family);
                    last.source = source;
                }
                Payload::Family(family) => {
                    if last.source != source {
                        return Err(BuildError::CrossSourceOr);
                    }
                    last.payload = Payload::Family(world.family_add(family, handle));
                }
            },
        }
        Ok(())
    }
}
