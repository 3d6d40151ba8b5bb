//! Union and intersection decomposition.
//!
//! - `A | B <: T` requires every member.
//! - `T <: A & B` requires every member.
//! - `T <: A | B` requires some member.
//! - `A & B <: T` requires some member.
//!
//! The "every member" rules run first so that `A | B <: A | B | C` is proven
//! member by member instead of against a single branch.

use crate::constraints::Constraints;
use crate::diagnostics::{CheckError, Failure, RelationResult, SubtypeError};
use crate::subtype::SubtypeChecker;
use crate::types::Type;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_all_sub_members(
        &mut self,
        members: &[Type],
        super_type: &Type,
        constraints: &mut Constraints,
    ) -> RelationResult {
        for member in members {
            self.check_relation(member, super_type, constraints)?;
        }
        Ok(())
    }

    pub(crate) fn check_all_super_members(
        &mut self,
        sub_type: &Type,
        members: &[Type],
        constraints: &mut Constraints,
    ) -> RelationResult {
        for member in members {
            self.check_relation(sub_type, member, constraints)?;
        }
        Ok(())
    }

    pub(crate) fn check_any_super_member(
        &mut self,
        sub_type: &Type,
        members: &[Type],
        constraints: &mut Constraints,
    ) -> RelationResult {
        let mut failures = Vec::with_capacity(members.len());
        for member in members {
            match self.check_relation(sub_type, member, constraints) {
                Ok(()) => return Ok(()),
                Err(CheckError::Failed(failure)) => failures.push(failure),
                Err(err) => return Err(err),
            }
        }
        Err(no_branch(failures))
    }

    pub(crate) fn check_any_sub_member(
        &mut self,
        members: &[Type],
        super_type: &Type,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let mut failures = Vec::with_capacity(members.len());
        for member in members {
            match self.check_relation(member, super_type, constraints) {
                Ok(()) => return Ok(()),
                Err(CheckError::Failed(failure)) => failures.push(failure),
                Err(err) => return Err(err),
            }
        }
        Err(no_branch(failures))
    }
}

/// Every branch failed: keep them all, reporting the first branch's trace.
fn no_branch(failures: Vec<Failure>) -> CheckError {
    let trace = failures
        .first()
        .map(|failure| failure.trace.clone())
        .unwrap_or_default();
    CheckError::Failed(Failure::new(SubtypeError::NoBranch { failures }, trace))
}
