//! Static field descriptors for search models.
//!
//! Every search-model type carries a descriptor table describing, per field,
//! the store column it maps to and how values of that field turn into filter
//! clauses. The table is built once — by the `Searchable` derive at compile
//! time, or by hand in a `const` table — and shared by every search call
//! against that model type, so concurrent reads need no synchronization.
//!
//! Column names follow a three-level fallback at declaration time: an
//! explicit `#[search(column = "...")]` annotation, else the field's
//! `#[serde(rename = "...")]` wire name, else the field identifier verbatim.
//! A model without annotations therefore degrades to filtering on its Rust
//! field names.

/// How a textual field value is turned into a pattern clause.
///
/// `Prefix` anchors the pattern at the start of the column value, `Contain`
/// allows word characters on both sides, and `Exact` compares by equality
/// instead of emitting a pattern at all. The default for text fields is
/// `Contain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Equality comparison against the raw value.
    Exact,
    /// Pattern anchored at the start of the value (`^v`).
    Prefix,
    /// Pattern allowing surrounding word characters (`\w*v\w*`).
    Contain,
}

impl MatchMode {
    /// Parses a match-mode name as written in a model annotation.
    ///
    /// The accepted set is closed: `exact`, `prefix`, `contain`.
    ///
    /// # Panics
    ///
    /// Panics on any other name. An unsupported mode is a broken model
    /// declaration that would fail identically on every call, so it must
    /// stop the process rather than silently fall back to a default. The
    /// `Searchable` derive reports the same condition as a compile error
    /// before this path is ever reached.
    pub fn parse(name: &str) -> Self {
        match name {
            "exact" => MatchMode::Exact,
            "prefix" => MatchMode::Prefix,
            "contain" => MatchMode::Contain,
            other => panic!("match mode \"{other}\" is not supported"),
        }
    }

    /// Renders the pattern for a value under this mode.
    ///
    /// Returns `None` for [`MatchMode::Exact`], which compares by equality
    /// rather than by pattern.
    pub fn pattern(&self, value: &str) -> Option<String> {
        match self {
            MatchMode::Exact => None,
            MatchMode::Prefix => Some(format!("^{value}")),
            MatchMode::Contain => Some(format!("\\w*{value}\\w*")),
        }
    }
}

/// Closed classification of a search-model field, decided at declaration time.
///
/// The compiler dispatches on this tag rather than on the runtime shape of
/// the value, so every field has exactly one clause-building rule for the
/// lifetime of the model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional text criterion compiled to a pattern (or equality) clause.
    Text,
    /// Nested search directive: projection columns, exclusion sets, free-text keyword.
    Directive,
    /// Half-open timestamp range (`start ≤ x < end`).
    Time,
    /// Date range with independently optional bounds (both inclusive).
    Date,
    /// Numeric range with inclusive (`min`/`max`) or exclusive (`lower`/`upper`) bounds.
    Number,
    /// List of values compiled to an inclusion-set clause.
    List,
    /// Scalar compiled to an equality clause; zero/empty values produce no clause.
    Scalar,
}

/// Resolved metadata for one search-model field.
///
/// Descriptors are plain `'static` data so a model's table can live in a
/// `static` slice produced by the derive:
///
/// ```ignore
/// static DESCRIPTORS: &[FieldDescriptor] = &[
///     FieldDescriptor::new("username", FieldKind::Text).with_matches(MatchMode::Prefix),
///     FieldDescriptor::new("created_at", FieldKind::Date).with_column("createdAt"),
/// ];
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The logical field name as declared on the model.
    pub name: &'static str,
    /// The store column this field filters on.
    pub column: &'static str,
    /// How values of this field compile into clauses.
    pub kind: FieldKind,
    /// Pattern mode for an explicit text value.
    pub matches: MatchMode,
    /// Pattern mode for the deferred free-text keyword, if this field opts in.
    pub keyword: Option<MatchMode>,
}

impl FieldDescriptor {
    /// Creates a descriptor whose column defaults to the logical name.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: name,
            kind,
            matches: MatchMode::Contain,
            keyword: None,
        }
    }

    /// Overrides the store column name.
    pub const fn with_column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    /// Overrides the pattern mode used for explicit text values.
    pub const fn with_matches(mut self, matches: MatchMode) -> Self {
        self.matches = matches;
        self
    }

    /// Opts this field into the free-text keyword scan with the given mode.
    pub const fn with_keyword(mut self, keyword: MatchMode) -> Self {
        self.keyword = Some(keyword);
        self
    }
}

/// Resolves a logical field name against a descriptor table.
///
/// Returns `None` for a name the model does not declare; callers must treat
/// that as "cannot filter on this field" rather than an error.
pub fn resolve<'a>(
    descriptors: &'a [FieldDescriptor],
    name: &str,
) -> Option<&'a FieldDescriptor> {
    descriptors
        .iter()
        .find(|descriptor| descriptor.name == name)
}

/// Resolves a logical field name to its store column, degrading to the name
/// itself when the model does not declare it.
///
/// Sort expressions and exclusion maps address columns by logical name; an
/// undeclared name passes through verbatim so a caller can still sort on a
/// raw store column.
pub fn resolve_column<'a>(descriptors: &'a [FieldDescriptor], name: &'a str) -> &'a str {
    resolve(descriptors, name)
        .map(|descriptor| descriptor.column)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: &[FieldDescriptor] = &[
        FieldDescriptor::new("createdAt", FieldKind::Date).with_column("created_at"),
        FieldDescriptor::new("name", FieldKind::Text),
    ];

    #[test]
    fn resolves_declared_fields() {
        let descriptor = resolve(TABLE, "createdAt").unwrap();
        assert_eq!(descriptor.column, "created_at");
        assert_eq!(descriptor.kind, FieldKind::Date);
    }

    #[test]
    fn unknown_field_is_absent() {
        assert!(resolve(TABLE, "missing").is_none());
    }

    #[test]
    fn unknown_column_passes_through() {
        assert_eq!(resolve_column(TABLE, "raw_column"), "raw_column");
        assert_eq!(resolve_column(TABLE, "createdAt"), "created_at");
    }

    #[test]
    fn patterns_follow_mode() {
        assert_eq!(MatchMode::Prefix.pattern("al"), Some("^al".to_string()));
        assert_eq!(
            MatchMode::Contain.pattern("al"),
            Some("\\w*al\\w*".to_string())
        );
        assert_eq!(MatchMode::Exact.pattern("al"), None);
    }

    #[test]
    #[should_panic(expected = "not supported")]
    fn unknown_mode_panics() {
        MatchMode::parse("fuzzy");
    }
}
