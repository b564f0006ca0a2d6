//! Canonical ordering of type references and members.
//!
//! Types sort by their rendered string, so sort order and report order agree
//! even across arrays and generic instantiations. Members sort by kind rank,
//! then name, then parameter types element-wise with fewer parameters first.

use std::cmp::Ordering;

use apidump_schema::TypeRef;

use crate::member::Member;

/// Compare two type references by their rendered form.
pub fn compare_types(a: &TypeRef, b: &TypeRef) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    a.to_string().cmp(&b.to_string())
}

/// Compare parameter lists element-wise, then by length.
pub fn compare_params(a: &[TypeRef], b: &[TypeRef]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_types(x, y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// The member key: kind rank, name, then parameters.
///
/// Two members comparing equal are the same entry of a surface, which is how
/// an override hides the member it overrides.
pub fn compare_members(a: &Member, b: &Member) -> Ordering {
    a.kind()
        .cmp(&b.kind())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| compare_params(a.params(), b.params()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_types_order_by_rendered_string() {
        assert_eq!(compare_types(&ty("int"), &ty("int")), Ordering::Equal);
        assert_eq!(
            compare_types(&ty("java.lang.String"), &ty("java.lang.String[]")),
            Ordering::Less
        );
        assert_eq!(
            compare_types(&ty("java.util.List<T>"), &ty("java.util.List")),
            Ordering::Greater
        );
        assert_eq!(compare_types(&ty("boolean"), &ty("T")), Ordering::Greater);
    }

    #[test]
    fn test_params_compare_elementwise_then_by_length() {
        let int = ty("int");
        let long = ty("long");
        assert_eq!(compare_params(&[], &[]), Ordering::Equal);
        assert_eq!(compare_params(&[int.clone()], &[int.clone(), int.clone()]), Ordering::Less);
        assert_eq!(
            compare_params(&[long.clone()], &[int.clone(), int.clone()]),
            Ordering::Greater
        );
        assert_eq!(compare_params(&[int.clone(), long.clone()], &[int, long]), Ordering::Equal);
    }
}
