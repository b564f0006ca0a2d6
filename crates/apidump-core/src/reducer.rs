//! Removal of uninteresting members and redundant exceptions.

use std::cell::OnceCell;
use std::collections::BTreeSet;

use apidump_schema::{OBJECT, TypeRef};

use crate::error::LoadError;
use crate::member::{Member, MemberKind};
use crate::ordering::compare_types;
use crate::type_system::{ERROR, RUNTIME_EXCEPTION, TypeSystem, is_subtype};
use crate::walker::TypeGraphWalker;

/// The base-type member every type reports on its own, because overrides
/// narrow its return type.
const RETAINED: &str = "clone";

/// Suppresses the universal base-type surface and reduces exception lists to
/// their most general checked types.
pub struct SurfaceReducer<'a> {
    types: &'a dyn TypeSystem,
    suppressed: OnceCell<BTreeSet<Member>>,
}

impl std::fmt::Debug for SurfaceReducer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceReducer")
            .field("suppressed", &self.suppressed.get().map(BTreeSet::len))
            .finish_non_exhaustive()
    }
}

impl<'a> SurfaceReducer<'a> {
    /// A reducer resolving supertypes through `types`.
    pub fn new(types: &'a dyn TypeSystem) -> Self {
        Self {
            types,
            suppressed: OnceCell::new(),
        }
    }

    /// The surface of `java.lang.Object` minus `clone()`, computed on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the base type cannot be loaded.
    pub fn suppressed(&self) -> Result<&BTreeSet<Member>, LoadError> {
        if let Some(members) = self.suppressed.get() {
            return Ok(members);
        }

        let object = self.types.load(OBJECT)?;
        let mut members = TypeGraphWalker::new(self.types, true).collect_members(&object)?;
        members.retain(|m| {
            !(m.kind() == MemberKind::Method && m.name == RETAINED && m.params().is_empty())
        });
        tracing::debug!("Suppressing {} base-type members", members.len());
        Ok(self.suppressed.get_or_init(|| members))
    }

    /// Drop every member whose key matches a suppressed base-type member.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the base type cannot be loaded.
    pub fn suppress(&self, members: BTreeSet<Member>) -> Result<BTreeSet<Member>, LoadError> {
        let suppressed = self.suppressed()?;
        Ok(members
            .into_iter()
            .filter(|m| !suppressed.contains(m))
            .collect())
    }

    /// Reduce declared exceptions to the minimal set of checked ones.
    ///
    /// Subtypes of `java.lang.RuntimeException` and `java.lang.Error` are
    /// dropped. Of the rest, an exception is dropped when a retained one is
    /// its supertype, and evicts retained subtypes of itself when added.
    /// Type variables are kept as declared. The result is sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if an exception type or one of its supertypes
    /// cannot be loaded.
    pub fn reduce_exceptions(&self, declared: &[TypeRef]) -> Result<Vec<TypeRef>, LoadError> {
        let mut retained: Vec<TypeRef> = Vec::with_capacity(declared.len());

        'candidates: for exception in declared {
            let Some(name) = exception.raw_name() else {
                if !retained.contains(exception) {
                    retained.push(exception.clone());
                }
                continue;
            };
            if is_subtype(self.types, name, RUNTIME_EXCEPTION)?
                || is_subtype(self.types, name, ERROR)?
            {
                continue;
            }

            for existing in retained.iter().filter_map(TypeRef::raw_name) {
                if is_subtype(self.types, name, existing)? {
                    continue 'candidates;
                }
            }

            let mut kept = Vec::with_capacity(retained.len() + 1);
            for existing in retained.drain(..) {
                match existing.raw_name() {
                    Some(sub) if is_subtype(self.types, sub, name)? => {}
                    _ => kept.push(existing),
                }
            }
            kept.push(exception.clone());
            retained = kept;
        }

        retained.sort_by(compare_types);
        Ok(retained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{io_exceptions, registry};
    use serde_json::json;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn names(refs: &[TypeRef]) -> Vec<String> {
        refs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_suppressed_surface_keeps_clone() {
        let types = registry(&[]);
        let reducer = SurfaceReducer::new(&types);
        let suppressed = reducer.suppressed().unwrap();
        assert!(suppressed.iter().any(|m| m.name == "toString"));
        assert!(suppressed.iter().any(|m| m.name == "wait" && m.params().len() == 2));
        assert!(!suppressed.iter().any(|m| m.name == "clone"));
        // Computed once.
        assert!(std::ptr::eq(suppressed, reducer.suppressed().unwrap()));
    }

    #[test]
    fn test_exception_antichain() {
        let types = registry(&io_exceptions());
        let reducer = SurfaceReducer::new(&types);

        let reduced = reducer
            .reduce_exceptions(&[ty("java.io.IOException"), ty("java.io.FileNotFoundException")])
            .unwrap();
        assert_eq!(names(&reduced), vec!["java.io.IOException"]);

        // Order of the candidates does not matter.
        let reduced = reducer
            .reduce_exceptions(&[ty("java.io.FileNotFoundException"), ty("java.io.IOException")])
            .unwrap();
        assert_eq!(names(&reduced), vec!["java.io.IOException"]);

        let reduced = reducer
            .reduce_exceptions(&[ty("java.io.FileNotFoundException")])
            .unwrap();
        assert_eq!(names(&reduced), vec!["java.io.FileNotFoundException"]);
    }

    #[test]
    fn test_unchecked_exceptions_are_dropped() {
        let types = registry(&[json!({
            "name": "java.lang.IllegalStateException",
            "modifiers": ["public"],
            "superclass": "java.lang.RuntimeException"
        })]);
        let reducer = SurfaceReducer::new(&types);
        let reduced = reducer
            .reduce_exceptions(&[
                ty("java.lang.IllegalStateException"),
                ty("java.lang.Error"),
                ty("java.lang.InterruptedException"),
            ])
            .unwrap();
        assert_eq!(names(&reduced), vec!["java.lang.InterruptedException"]);
    }

    #[test]
    fn test_unrelated_exceptions_are_sorted_and_variables_kept() {
        let types = registry(&io_exceptions());
        let reducer = SurfaceReducer::new(&types);
        let x = TypeRef::Variable("X".into());
        let reduced = reducer
            .reduce_exceptions(&[
                ty("java.lang.InterruptedException"),
                x.clone(),
                ty("java.io.IOException"),
                x,
            ])
            .unwrap();
        assert_eq!(
            names(&reduced),
            vec!["X", "java.io.IOException", "java.lang.InterruptedException"]
        );
        assert!(reducer.reduce_exceptions(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_default_package_exceptions_are_checked() {
        let types = registry(&[
            json!({"name": "Oops", "modifiers": ["public"], "superclass": "java.lang.RuntimeException"}),
            json!({"name": "Failed", "modifiers": ["public"], "superclass": "java.lang.Exception"}),
        ]);
        let reducer = SurfaceReducer::new(&types);
        let reduced = reducer
            .reduce_exceptions(&[ty("Oops"), ty("Failed"), ty("java.lang.Exception")])
            .unwrap();
        assert_eq!(names(&reduced), vec!["java.lang.Exception"]);
    }

    #[test]
    fn test_unknown_exception_is_a_load_error() {
        let types = registry(&[]);
        let reducer = SurfaceReducer::new(&types);
        assert!(reducer.reduce_exceptions(&[ty("p.Missing")]).is_err());
    }
}
