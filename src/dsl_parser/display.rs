//! Canonical text rendering of the syntax tree. Parsing the rendered text of
//! any `Program` yields an equal tree.

use std::fmt;

use super::ast::*;

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Program<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{};", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::EntityDef(def) => write!(f, "{}", def),
            Statement::RelationshipDef(def) => write!(f, "{}", def),
            Statement::InsertEntity(insert) => write!(f, "{}", insert),
            Statement::ConnectRel(connect) => write!(f, "{}", connect),
            Statement::Update(update) => write!(f, "{}", update),
            Statement::Delete(delete) => write!(f, "{}", delete),
            Statement::Query(query) => write!(f, "{}", query),
        }
    }
}

impl fmt::Display for DataType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive(kind) => f.write_str(kind.keyword()),
            DataType::PrimitiveArray(kind) => write!(f, "{}[]", kind.keyword()),
            DataType::EntityRef(name) => f.write_str(name),
            DataType::EntityRefArray(name) => write!(f, "{}[]", name),
        }
    }
}

impl fmt::Display for FieldDecl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

fn write_block<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    write_separated(f, items, ", ")?;
    f.write_str(" }")
}

impl fmt::Display for EntityDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ENTITY {} ", self.name)?;
        if let Some(parent) = self.extends {
            write!(f, "EXTENDS {} ", parent)?;
        }
        write_block(f, &self.fields)
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::One => f.write_str("1"),
            Multiplicity::Many => f.write_str("*"),
        }
    }
}

impl fmt::Display for RelationshipDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RELATIONSHIP {} ({} {} -> {} {})",
            self.name,
            self.source,
            self.source_multiplicity,
            self.target,
            self.target_multiplicity
        )?;
        if !self.fields.is_empty() {
            f.write_str(" ")?;
            write_block(f, &self.fields)?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{:.1}", value)
            }
            Literal::Float(value) => write!(f, "{}", value),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::String(body) => write!(f, "\"{}\"", body),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for AssignValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignValue::Literal(literal) => write!(f, "{}", literal),
            AssignValue::Reference(alias) => f.write_str(alias),
            AssignValue::Array(items) => {
                f.write_str("[")?;
                write_separated(f, items, ", ")?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Assignment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

impl fmt::Display for InsertEntity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT {} ", self.type_name)?;
        write_block(f, &self.assignments)?;
        if let Some(alias) = self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

impl fmt::Display for AliasOrId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasOrId::Alias(alias) => f.write_str(alias),
            AliasOrId::Id(id) => write!(f, "{}", id),
        }
    }
}

impl fmt::Display for ConnectRel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CONNECT {} - {} -> {}",
            self.source, self.relationship, self.target
        )?;
        if !self.properties.is_empty() {
            f.write_str(" ")?;
            write_block(f, &self.properties)?;
        }
        Ok(())
    }
}

impl fmt::Display for TargetRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Element(element) => write!(f, "{}", element),
            TargetRef::Pattern {
                type_name,
                condition,
            } => write!(f, "{} {{ {} }}", type_name, condition),
        }
    }
}

impl fmt::Display for UpdateStmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.target)?;
        write_separated(f, &self.assignments, ", ")
    }
}

impl fmt::Display for DeleteStmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE {}", self.target)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("AND"),
            LogicalOperator::Or => f.write_str("OR"),
        }
    }
}

impl fmt::Display for PropertyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias {
            Some(alias) => write!(f, "{}.{}", alias, self.property),
            None => f.write_str(self.property),
        }
    }
}

impl fmt::Display for PropertyEquals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.path, self.value)
    }
}

impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (operator, predicate) in &self.rest {
            write!(f, " {} {}", operator, predicate)?;
        }
        Ok(())
    }
}

fn write_element_body(
    f: &mut fmt::Formatter<'_>,
    name: Option<&str>,
    label: Option<&str>,
    properties: Option<&Condition<'_>>,
) -> fmt::Result {
    if let Some(name) = name {
        f.write_str(name)?;
    }
    if let Some(label) = label {
        write!(f, ":{}", label)?;
    }
    if let Some(condition) = properties {
        if name.is_some() || label.is_some() {
            f.write_str(" ")?;
        }
        write!(f, "{{ {} }}", condition)?;
    }
    Ok(())
}

impl fmt::Display for NodePattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_element_body(f, self.name, self.label, self.properties.as_ref())?;
        f.write_str(")")
    }
}

impl fmt::Display for RelationshipPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.direction {
            Direction::Outgoing => ("-[", "]->"),
            Direction::Incoming => ("<-[", "]-"),
            Direction::Either => ("-[", "]-"),
        };
        f.write_str(open)?;
        write_element_body(f, self.name, self.label, self.properties.as_ref())?;
        f.write_str(close)
    }
}

impl fmt::Display for PathPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for (relationship, node) in &self.hops {
            write!(f, "{}{}", relationship, node)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReturnItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Display for QueryStmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MATCH {}", self.pattern)?;
        if let Some(condition) = &self.where_clause {
            write!(f, " WHERE {}", condition)?;
        }
        if !self.return_items.is_empty() {
            f.write_str(" RETURN ")?;
            write_separated(f, &self.return_items, ", ")?;
        }
        Ok(())
    }
}
