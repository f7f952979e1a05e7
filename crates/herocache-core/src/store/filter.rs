//! Hero query filters.

use rusqlite::types::Value;

use crate::utils::fold_key;

/// Criteria for `HeroStore::fetch_heroes`. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroFilter {
    pub id: Option<String>,
    /// Case- and diacritic-insensitive substring of the hero name
    pub name_contains: Option<String>,
    pub favorite: Option<bool>,
}

impl HeroFilter {
    /// Matches every hero
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn name_contains(name: impl Into<String>) -> Self {
        Self {
            name_contains: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name filter from optional user input; blank input matches everything.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Self::name_contains(name),
            None => Self::all(),
        }
    }

    pub fn favorites(mut self, favorite: bool) -> Self {
        self.favorite = Some(favorite);
        self
    }

    /// Render as a SQL `WHERE` clause (empty when unfiltered) plus bound values.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(ref id) = self.id {
            values.push(Value::Text(id.clone()));
            clauses.push(format!("id = ?{}", values.len()));
        }
        if let Some(ref name) = self.name_contains {
            values.push(Value::Text(format!("%{}%", escape_like(&fold_key(name)))));
            clauses.push(format!("name_key LIKE ?{} ESCAPE '\\'", values.len()));
        }
        if let Some(favorite) = self.favorite {
            values.push(Value::Integer(i64::from(favorite)));
            clauses.push(format!("favorite = ?{}", values.len()));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
