//! Resolved type mentions and their canonical string form.
//!
//! The rendered form doubles as the descriptor syntax, so a `TypeRef` read
//! from a descriptor prints back exactly as it was written:
//!
//! ```text
//! int
//! java.lang.String[]
//! java.util.Map<K, java.util.List<? extends T>>
//! ```
//!
//! Parsing cannot tell a type variable from a class in the default package,
//! so every non-primitive name parses as [`TypeRef::Named`].
//! [`TypeRef::resolve_variables`] turns the names of the type parameters in
//! scope into [`TypeRef::Variable`]s.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// A resolved type mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A primitive type such as `int`, or `void` in return position.
    Primitive(String),
    /// A named type with its ordered type arguments (empty when raw).
    Named {
        /// Canonical dotted name of the raw type.
        name: String,
        /// Type arguments, in declaration order.
        args: Vec<TypeRef>,
    },
    /// An unresolved type variable such as `T`.
    Variable(String),
    /// One array dimension over a component type.
    Array(Box<TypeRef>),
    /// A wildcard type argument.
    Wildcard(Wildcard),
}

/// The bound of a wildcard type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wildcard {
    /// `?`
    Unbounded,
    /// `? extends T`
    Extends(Box<TypeRef>),
    /// `? super T`
    Super(Box<TypeRef>),
}

impl TypeRef {
    /// A raw named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A named type instantiated with `args`.
    pub fn parameterized(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Wrap `self` in one more array dimension.
    pub fn array_of(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// The canonical name of the raw type, for named types only.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of a named type; empty for every other shape.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Mark raw names listed in `scope` as type variables, at any depth.
    ///
    /// Names with type arguments and names not in `scope` are left as
    /// classes.
    pub fn resolve_variables(&self, scope: &[String]) -> Self {
        if scope.is_empty() {
            return self.clone();
        }
        match self {
            Self::Named { name, args } if args.is_empty() && scope.contains(name) => {
                Self::Variable(name.clone())
            }
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.resolve_variables(scope)).collect(),
            },
            Self::Array(component) => Self::Array(Box::new(component.resolve_variables(scope))),
            Self::Wildcard(Wildcard::Extends(bound)) => {
                Self::Wildcard(Wildcard::Extends(Box::new(bound.resolve_variables(scope))))
            }
            Self::Wildcard(Wildcard::Super(bound)) => {
                Self::Wildcard(Wildcard::Super(Box::new(bound.resolve_variables(scope))))
            }
            Self::Primitive(_) | Self::Variable(_) | Self::Wildcard(Wildcard::Unbounded) => {
                self.clone()
            }
        }
    }

    /// Replace every type variable bound in `bindings` with its argument.
    ///
    /// Unbound variables are kept as written.
    pub fn substitute(&self, bindings: &Bindings) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            Self::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            Self::Array(component) => Self::Array(Box::new(component.substitute(bindings))),
            Self::Wildcard(Wildcard::Extends(bound)) => {
                Self::Wildcard(Wildcard::Extends(Box::new(bound.substitute(bindings))))
            }
            Self::Wildcard(Wildcard::Super(bound)) => {
                Self::Wildcard(Wildcard::Super(Box::new(bound.substitute(bindings))))
            }
            Self::Primitive(_) | Self::Wildcard(Wildcard::Unbounded) => self.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(name) | Self::Variable(name) => f.write_str(name),
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Wildcard(Wildcard::Unbounded) => f.write_str("?"),
            Self::Wildcard(Wildcard::Extends(bound)) => write!(f, "? extends {bound}"),
            Self::Wildcard(Wildcard::Super(bound)) => write!(f, "? super {bound}"),
        }
    }
}

/// Type-variable bindings of one instantiation, e.g. `{K: String, V: Integer}`
/// for `java.util.Map<java.lang.String, java.lang.Integer>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(HashMap<String, TypeRef>);

impl Bindings {
    /// Bind `params` to `args` positionally.
    ///
    /// A raw instantiation (no arguments) or an arity mismatch binds nothing,
    /// leaving every variable as written.
    pub fn new(params: &[String], args: &[TypeRef]) -> Self {
        if params.len() != args.len() {
            return Self::default();
        }
        Self(params.iter().cloned().zip(args.iter().cloned()).collect())
    }

    /// The argument bound to `variable`, if any.
    pub fn get(&self, variable: &str) -> Option<&TypeRef> {
        self.0.get(variable)
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy with `shadowed` names unbound, for members that declare their
    /// own type parameters.
    pub fn without(&self, shadowed: &[String]) -> Self {
        if shadowed.is_empty() {
            return self.clone();
        }
        Self(
            self.0
                .iter()
                .filter(|(name, _)| !shadowed.contains(name))
                .map(|(name, ty)| (name.clone(), ty.clone()))
                .collect(),
        )
    }
}

/// Errors from parsing the string form of a [`TypeRef`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeRefError {
    /// The input was empty or only whitespace.
    #[error("Empty type reference")]
    Empty,

    /// A type name was expected but not found.
    #[error("Expected a type name at offset {offset} in '{input}'")]
    ExpectedName {
        /// The full input.
        input: String,
        /// Byte offset of the failure.
        offset: usize,
    },

    /// A character that does not fit the grammar.
    #[error("Unexpected '{found}' at offset {offset} in '{input}'")]
    Unexpected {
        /// The full input.
        input: String,
        /// The offending character.
        found: char,
        /// Byte offset of the failure.
        offset: usize,
    },

    /// The input ended inside a type argument list or array suffix.
    #[error("Unterminated type reference '{0}'")]
    Unterminated(String),
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TypeRefError::Empty);
        }
        let mut parser = Parser { input: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.peek().is_some() {
            return Err(parser.unexpected());
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.')
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let Some(after) = rest.strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().is_some_and(is_ident_char) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    fn ident(&mut self) -> Result<&'a str, TypeRefError> {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(TypeRefError::ExpectedName {
                input: self.input.to_string(),
                offset: self.pos,
            });
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn unexpected(&self) -> TypeRefError {
        match self.peek() {
            Some(found) => TypeRefError::Unexpected {
                input: self.input.to_string(),
                found,
                offset: self.pos,
            },
            None => TypeRefError::Unterminated(self.input.to_string()),
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefError> {
        if self.eat('?') {
            let wildcard = if self.eat_keyword("extends") {
                Wildcard::Extends(Box::new(self.parse_type()?))
            } else if self.eat_keyword("super") {
                Wildcard::Super(Box::new(self.parse_type()?))
            } else {
                Wildcard::Unbounded
            };
            return Ok(TypeRef::Wildcard(wildcard));
        }

        let name = self.ident()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.unexpected());
            }
        }

        let mut ty = classify(name, args);
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.unexpected());
            }
            ty = ty.array_of();
        }
        Ok(ty)
    }
}

fn classify(name: &str, args: Vec<TypeRef>) -> TypeRef {
    if args.is_empty() && PRIMITIVES.contains(&name) {
        TypeRef::Primitive(name.to_string())
    } else {
        TypeRef::parameterized(name, args)
    }
}
