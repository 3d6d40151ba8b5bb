//! Type arguments of two applications of the same generic declaration.

use crate::constraints::Constraints;
use crate::diagnostics::{RelationResult, ResolveError};
use crate::subtype::SubtypeChecker;
use crate::types::NominalType;
use tracing::trace;

impl<'a> SubtypeChecker<'a> {
    /// Compare `C[S..] <: C[T..]` argument by argument according to the
    /// declared variance of each parameter.
    ///
    /// Invariant parameters need both directions, covariant ones `S <: T`,
    /// contravariant ones `T <: S`. A parameter with neither flag is not
    /// compared.
    pub(crate) fn check_type_args(
        &mut self,
        sub_type: &NominalType,
        super_type: &NominalType,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let params = self.resolver().type_params(super_type)?;
        for nominal in [sub_type, super_type] {
            if nominal.args.len() != params.len() {
                return Err(ResolveError::InvalidTypeApplication {
                    name: nominal.name.clone(),
                    expected: params.len(),
                    actual: nominal.args.len(),
                }
                .into());
            }
        }

        for ((param, sub_arg), super_arg) in params.iter().zip(&sub_type.args).zip(&super_type.args) {
            trace!(param = %param.name, variance = ?param.variance, "compare type argument");
            if param.variance.is_covariant() {
                self.check_relation(sub_arg, super_arg, constraints)?;
            }
            if param.variance.is_contravariant() {
                self.check_relation(super_arg, sub_arg, constraints)?;
            }
        }
        Ok(())
    }
}
