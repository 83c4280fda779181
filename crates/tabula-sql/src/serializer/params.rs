use super::{Flavor, Formatter, ToSql};

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Number(f64),
    Boolean(bool),
}

pub trait Params {
    fn push(&mut self, param: Param) -> Placeholder;
}

/// One-based position of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Param> {
    fn push(&mut self, param: Param) -> Placeholder {
        Vec::push(self, param);
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = match f.serializer.flavor {
            Flavor::Postgresql => format!("${}", self.0),
            Flavor::Sqlite => format!("?{}", self.0),
        };
        f.dst.push_str(&placeholder);
    }
}
