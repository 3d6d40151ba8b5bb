//! Literal, tuple and record shapes, plus the `bool` and `nil` base types.

use crate::constraints::Constraints;
use crate::def::well_known;
use crate::diagnostics::{CheckError, RelationResult, SubtypeError};
use crate::relation::Relation;
use crate::subtype::SubtypeChecker;
use crate::types::Type;

impl<'a> SubtypeChecker<'a> {
    /// `super_type` is a literal, tuple or record: only the same shape fits.
    pub(crate) fn check_shape(
        &mut self,
        relation: &Relation,
        constraints: &mut Constraints,
    ) -> RelationResult {
        match (&relation.sub_type, &relation.super_type) {
            (Type::Tuple(sub_elements), Type::Tuple(super_elements))
                if sub_elements.len() == super_elements.len() =>
            {
                for (sub_element, super_element) in sub_elements.iter().zip(super_elements) {
                    self.check_relation(sub_element, super_element, constraints)?;
                }
                Ok(())
            }
            (Type::Record(sub_fields), Type::Record(super_fields))
                if sub_fields.keys().eq(super_fields.keys()) =>
            {
                for (sub_field, super_field) in sub_fields.values().zip(super_fields.values()) {
                    self.check_relation(sub_field, super_field, constraints)?;
                }
                Ok(())
            }
            _ => Err(self.incompatible(relation)),
        }
    }

    /// `T <: bool` holds for `TrueClass`, `FalseClass` and their unions.
    pub(crate) fn check_bool(
        &mut self,
        relation: &Relation,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let env = self.env();
        if env.class_decl(well_known::TRUE_CLASS).is_none()
            || env.class_decl(well_known::FALSE_CLASS).is_none()
        {
            return Err(self.incompatible(relation));
        }
        let booleans = Type::union([
            Type::instance(well_known::TRUE_CLASS),
            Type::instance(well_known::FALSE_CLASS),
        ]);
        self.check_relation(&relation.sub_type, &booleans, constraints)
    }

    pub(crate) fn check_nil(&mut self, relation: &Relation) -> RelationResult {
        if relation.sub_type == Type::instance(well_known::NIL_CLASS) {
            Ok(())
        } else {
            Err(self.incompatible(relation))
        }
    }

    fn incompatible(&self, relation: &Relation) -> CheckError {
        self.fail(SubtypeError::Incompatible {
            relation: relation.clone(),
        })
    }
}
