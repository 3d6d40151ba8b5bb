//! RBS-like rendering of types for diagnostics and traces.

use crate::types::{LiteralValue, MethodType, NominalKind, NominalType, Params, Type, TypeSet};
use std::fmt::{self, Display, Formatter, Write};

fn write_joined<T: Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_args(f: &mut Formatter<'_>, args: &[Type]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_char('[')?;
    write_joined(f, args, ", ")?;
    f.write_char(']')
}

fn write_members(f: &mut Formatter<'_>, members: &TypeSet, separator: &str) -> fmt::Result {
    f.write_char('(')?;
    write_joined(f, members.as_slice(), separator)?;
    f.write_char(')')
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Integer(value) => write!(f, "{value}"),
            LiteralValue::String(value) => write!(f, "{:?}", value.as_str()),
            LiteralValue::Symbol(value) => write!(f, ":{value}"),
            LiteralValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl Display for NominalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            NominalKind::Class { .. } => write!(f, "singleton({})", self.name),
            NominalKind::Instance | NominalKind::Interface | NominalKind::Alias => {
                write!(f, "{}", self.name)?;
                write_args(f, &self.args)
            }
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("untyped"),
            Type::Bot => f.write_str("bot"),
            Type::Void => f.write_str("void"),
            Type::Nil => f.write_str("nil"),
            Type::Bool => f.write_str("bool"),
            Type::Var(name) => write!(f, "'{name}"),
            Type::SelfType => f.write_str("self"),
            Type::Instance => f.write_str("instance"),
            Type::Class => f.write_str("class"),
            Type::Name(nominal) => write!(f, "{nominal}"),
            Type::Union(members) => write_members(f, members, " | "),
            Type::Intersection(members) => write_members(f, members, " & "),
            Type::Literal(value) => write!(f, "{value}"),
            Type::Tuple(elements) => {
                f.write_char('[')?;
                write_joined(f, elements, ", ")?;
                f.write_char(']')
            }
            Type::Record(fields) => {
                f.write_str("{ ")?;
                for (i, (key, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {ty}")?;
                }
                f.write_str(" }")
            }
            Type::Proc(method_type) => write!(f, "^{method_type}"),
        }
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.required.iter().map(ToString::to_string));
        parts.extend(self.optional.iter().map(|ty| format!("?{ty}")));
        if let Some(rest) = &self.rest {
            parts.push(format!("*{rest}"));
        }
        parts.extend(
            self.required_keywords
                .iter()
                .map(|(name, ty)| format!("{name}: {ty}")),
        );
        parts.extend(
            self.optional_keywords
                .iter()
                .map(|(name, ty)| format!("?{name}: {ty}")),
        );
        if let Some(rest) = &self.rest_keywords {
            parts.push(format!("**{rest}"));
        }
        f.write_char('(')?;
        write_joined(f, &parts, ", ")?;
        f.write_char(')')
    }
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            f.write_char('[')?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "'{param}")?;
            }
            f.write_str("] ")?;
        }
        write!(f, "{}", self.params)?;
        if let Some(block) = &self.block {
            if block.optional {
                f.write_str(" ?")?;
            } else {
                f.write_char(' ')?;
            }
            let inner = &block.method_type;
            write!(f, "{{ {} -> {} }}", inner.params, inner.return_type)?;
        }
        write!(f, " -> {}", self.return_type)
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
