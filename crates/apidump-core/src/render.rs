//! Text rendering of a type and its surface.
//!
//! Grouped format:
//!
//! ```text
//! public class java.util.HashMap<K, V>
//!     extends java.util.AbstractMap<K, V>
//!     implements java.io.Serializable, java.lang.Cloneable, java.util.Map<K, V> {
//!   public java.util.HashMap(int, float);
//!   protected void finalize() throws java.lang.Throwable;
//! }
//! ```
//!
//! Grep format prefixes every line with its owner, so each line stands alone:
//!
//! ```text
//! java.util.HashMap	public class java.util.HashMap<K, V> extends java.util.AbstractMap<K, V> {}
//! java.util.HashMap.<init>	public java.util.HashMap(int, float);
//! ```

use std::collections::BTreeSet;

use apidump_schema::{Modifiers, OBJECT, TypeHandle, TypeKind, TypeRef};

use crate::member::{Member, MemberBody, Signature};

/// Report layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// One indented block per type.
    #[default]
    Grouped,
    /// One self-describing line per declaration.
    Grep,
}

impl Format {
    /// The format selected by the `--grep-format` flag.
    pub const fn from_grep_flag(grep: bool) -> Self {
        if grep { Self::Grep } else { Self::Grouped }
    }
}

/// Renders type declarations and member lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: Format,
}

impl Renderer {
    /// A renderer for `format`.
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    const fn is_grep(self) -> bool {
        matches!(self.format, Format::Grep)
    }

    /// Render `ty` with its collected `interfaces` and its `members`.
    ///
    /// Members that are neither public nor protected are skipped. Exception
    /// lists are printed as given, so they should already be reduced.
    ///
    /// # Panics
    ///
    /// Panics if a variadic member's last parameter is not an array. Loaded
    /// descriptors are validated against this.
    pub fn render_type(
        self,
        ty: &TypeHandle,
        interfaces: &[TypeRef],
        members: &BTreeSet<Member>,
    ) -> String {
        let mut out = self.render_declaration(ty, interfaces);
        for member in members.iter().filter(|m| m.is_visible()) {
            out.push_str(&self.render_member(ty, member));
        }
        if !self.is_grep() {
            out.push_str("}\n");
        }
        out
    }

    fn render_declaration(self, ty: &TypeHandle, interfaces: &[TypeRef]) -> String {
        let mut out = String::new();
        if self.is_grep() {
            out.push_str(&ty.name);
            out.push('\t');
        }
        let separator = if self.is_grep() { " " } else { "\n    " };

        out.push_str(&modifiers(ty.modifiers, ty.kind));
        out.push_str(&format!(" {} {}", ty.kind.keyword(), ty.name));
        if !ty.type_params.is_empty() {
            out.push_str(&format!("<{}>", ty.type_params.join(", ")));
        }

        let superclass = ty.superclass.as_ref();
        if let Some(superclass) = superclass.filter(|s| s.raw_name() != Some(OBJECT)) {
            out.push_str(&format!("{separator}extends {superclass}"));
        }
        if !interfaces.is_empty() {
            out.push_str(&format!("{separator}implements {}", join(interfaces)));
        }

        out.push_str(if self.is_grep() { " {}\n" } else { " {\n" });
        out
    }

    fn render_member(self, owner: &TypeHandle, member: &Member) -> String {
        let mut out = String::new();
        if self.is_grep() {
            let name = match member.body {
                MemberBody::Constructor(_) => "<init>",
                _ => member.name.as_str(),
            };
            out.push_str(&format!("{}.{name}\t", owner.name));
        } else {
            out.push_str("  ");
        }

        out.push_str(&modifiers(member.modifiers, member.declarer_kind));
        match &member.body {
            MemberBody::Field { ty } => {
                out.push_str(&format!(" {ty} {}", member.name));
            }
            MemberBody::Constructor(signature) => {
                out.push_str(&type_params(signature));
                out.push_str(&format!(" {}{}", member.name, parameters(signature)));
                out.push_str(&throws(signature));
            }
            MemberBody::Method { returns, signature } => {
                out.push_str(&type_params(signature));
                out.push_str(&format!(" {returns} {}{}", member.name, parameters(signature)));
                out.push_str(&throws(signature));
            }
        }
        out.push_str(";\n");
        out
    }
}

/// Visibility word, then `static`, `final` and `abstract` where they carry
/// meaning for the declaring kind.
fn modifiers(modifiers: Modifiers, declarer: TypeKind) -> String {
    let mut out = modifiers.visibility().to_string();
    if modifiers.is_static() {
        out.push_str(" static");
    }
    if !declarer.is_enum() && modifiers.is_final() {
        out.push_str(" final");
    }
    if !declarer.is_enum() && !declarer.is_interface() && modifiers.is_abstract() {
        out.push_str(" abstract");
    }
    out
}

fn type_params(signature: &Signature) -> String {
    if signature.type_params.is_empty() {
        String::new()
    } else {
        format!(" <{}>", signature.type_params.join(", "))
    }
}

fn parameters(signature: &Signature) -> String {
    let last = signature.params.len().saturating_sub(1);
    let params: Vec<String> = signature
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            if signature.varargs && i == last {
                variadic(param)
            } else {
                param.to_string()
            }
        })
        .collect();
    format!("({})", params.join(", "))
}

fn variadic(param: &TypeRef) -> String {
    match param {
        TypeRef::Array(component) => format!("{component}..."),
        other => panic!("variadic parameter '{other}' is not an array"),
    }
}

fn throws(signature: &Signature) -> String {
    if signature.throws.is_empty() {
        String::new()
    } else {
        format!(" throws {}", join(&signature.throws))
    }
}

fn join(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
