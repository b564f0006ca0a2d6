//! The dump driver: scan, walk, reduce, render.

use std::collections::{BTreeSet, HashSet};
use std::io::Write;
use std::sync::Arc;

use apidump_schema::TypeHandle;

use crate::error::{DumpError, LoadError};
use crate::locator::Locator;
use crate::member::Member;
use crate::reducer::SurfaceReducer;
use crate::render::{Format, Renderer};
use crate::scanner::PackageScanner;
use crate::type_system::TypeSystem;
use crate::walker::TypeGraphWalker;

/// Report options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Prefix every line with its owner instead of grouping by type.
    pub grep_format: bool,
    /// Walk supertypes and report inherited methods.
    pub include_inherited: bool,
}

/// What a dump produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Number of type blocks written.
    pub types_rendered: usize,
    /// Requested packages in which no type was found, in request order.
    pub empty_packages: Vec<String>,
}

/// Writes the API report of a set of packages.
pub struct ApiDump<'a> {
    scanner: PackageScanner<'a>,
    types: &'a dyn TypeSystem,
    walker: TypeGraphWalker<'a>,
    reducer: SurfaceReducer<'a>,
    renderer: Renderer,
}

impl std::fmt::Debug for ApiDump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDump")
            .field("scanner", &self.scanner)
            .field("walker", &self.walker)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl<'a> ApiDump<'a> {
    /// A dump discovering packages through `locator` and loading types
    /// through `types`.
    pub fn new(locator: &'a dyn Locator, types: &'a dyn TypeSystem, options: DumpOptions) -> Self {
        Self {
            scanner: PackageScanner::new(locator, types),
            types,
            walker: TypeGraphWalker::new(types, options.include_inherited),
            reducer: SurfaceReducer::new(types),
            renderer: Renderer::new(Format::from_grep_flag(options.grep_format)),
        }
    }

    /// Every type of `package` and its subpackages, with their member types,
    /// ordered by canonical name.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a discovered type cannot be loaded.
    pub fn collect_types(&self, package: &str) -> Result<BTreeSet<Arc<TypeHandle>>, LoadError> {
        let mut sink = BTreeSet::new();
        let mut pending: Vec<Arc<TypeHandle>> = self
            .scanner
            .top_level_types_recursive(package)?
            .into_iter()
            .collect();

        while let Some(ty) = pending.pop() {
            if sink.contains(&ty) {
                continue;
            }
            for inner in &ty.member_types {
                pending.push(self.types.load(inner)?);
            }
            sink.insert(ty);
        }
        Ok(sink)
    }

    /// The report block of `ty`, or `None` if the type is not visible.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a supertype or exception type cannot be
    /// loaded.
    pub fn render_type(&self, ty: &TypeHandle) -> Result<Option<String>, LoadError> {
        if !ty.is_visible() {
            return Ok(None);
        }

        let members = self.reducer.suppress(self.walker.collect_members(ty)?)?;
        let members = members
            .into_iter()
            .filter(Member::is_visible)
            .map(|mut member| {
                if let Some(signature) = member.signature_mut() {
                    signature.throws = self.reducer.reduce_exceptions(&signature.throws)?;
                }
                Ok(member)
            })
            .collect::<Result<BTreeSet<_>, LoadError>>()?;
        let interfaces = self.walker.collect_interfaces(ty)?;

        Ok(Some(self.renderer.render_type(ty, &interfaces, &members)))
    }

    /// Write the report of `packages` to `out`.
    ///
    /// Packages are reported in the order given; a type reached through more
    /// than one package is reported once. A package without types is logged
    /// and recorded in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Load`] if a type cannot be loaded and
    /// [`DumpError::Write`] if `out` fails.
    pub fn dump<W: Write + ?Sized>(
        &self,
        packages: &[String],
        out: &mut W,
    ) -> Result<DumpSummary, DumpError> {
        let mut summary = DumpSummary::default();
        let mut reported = HashSet::new();

        for package in packages {
            let types = self.collect_types(package)?;
            if types.is_empty() {
                tracing::warn!("No classes found in {package}");
                summary.empty_packages.push(package.clone());
                continue;
            }

            for ty in types {
                if !reported.insert(ty.name.clone()) {
                    continue;
                }
                if let Some(block) = self.render_type(&ty)? {
                    out.write_all(block.as_bytes())?;
                    summary.types_rendered += 1;
                }
            }
        }

        out.flush()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;
    use serde_json::json;

    #[test]
    fn test_member_types_are_collected_recursively() {
        let types = registry(&[
            json!({"name": "p.Outer", "modifiers": ["public"], "member_types": ["p.Outer$Mid"]}),
            json!({"name": "p.Outer$Mid", "modifiers": ["public", "static"], "member_types": ["p.Outer$Mid$Leaf"]}),
            json!({"name": "p.Outer$Mid$Leaf", "modifiers": ["private"]}),
        ]);
        let dump = ApiDump::new(&types, &types, DumpOptions::default());
        let names: Vec<String> = dump
            .collect_types("p")
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["p.Outer", "p.Outer$Mid", "p.Outer$Mid$Leaf"]);
    }

    #[test]
    fn test_invisible_types_are_not_rendered() {
        let types = registry(&[
            json!({"name": "p.Shown", "modifiers": ["public"]}),
            json!({"name": "p.Hidden"}),
        ]);
        let dump = ApiDump::new(&types, &types, DumpOptions::default());

        let mut out = Vec::new();
        let summary = dump.dump(&["p".to_string(), "p".to_string()], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "public class p.Shown {\n}\n");
        assert_eq!(summary.types_rendered, 1);
        assert!(summary.empty_packages.is_empty());
    }

    #[test]
    fn test_missing_member_type_aborts() {
        let types = registry(&[json!({
            "name": "p.Outer",
            "modifiers": ["public"],
            "member_types": ["p.Outer$Gone"]
        })]);
        let dump = ApiDump::new(&types, &types, DumpOptions::default());
        let err = dump.dump(&["p".to_string()], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DumpError::Load(LoadError::NotFound(_))));
    }
}
