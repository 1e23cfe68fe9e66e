//! Cypher text generation for the CRUD surface
//!
//! Pure functions over property bags. Values never appear in the generated
//! text; they travel in the parameter bundles. Only a value's kind shows up:
//! points and datetimes are wrapped in `point()` / `datetime()` so the server
//! stores them as spatial and temporal values rather than maps and strings.

use crate::graph::{Label, PropertyMap, PropertyValue};

/// Reserved filter/result key carrying the engine identity
pub const IDENTITY_KEY: &str = "_id";

/// Parameter bundle holding the match filter
pub const PROPS: &str = "props";

/// Parameter bundle holding the values assigned by `update`
pub const NEW_PROPS: &str = "newProps";

/// Parameter holding the engine identity
pub const ID_PARAM: &str = "id";

/// Variable every generated statement binds the node to
pub const NODE: &str = "n";

/// `n.k1 = $P.k1 AND n.k2 = $P.k2 ...` in key insertion order.
///
/// An empty bag yields an empty string.
pub fn conditions(props: &PropertyMap, bundle: &str) -> String {
    clauses(props, bundle).join(" AND ")
}

/// `n.k1 = $P.k1, n.k2 = $P.k2, ...` in key insertion order.
///
/// An empty bag yields an empty string.
pub fn set_statements(props: &PropertyMap, bundle: &str) -> String {
    clauses(props, bundle).join(", ")
}

fn clauses(props: &PropertyMap, bundle: &str) -> Vec<String> {
    props
        .iter()
        .map(|(key, value)| {
            let escaped = escape_identifier(key);
            format!("{NODE}.{escaped} = {}", value_expression(bundle, key, value))
        })
        .collect()
}

/// Expression reading `key` out of `bundle`.
///
/// Plain values are referenced as `$bundle.key`. Points and datetimes, and
/// arrays made only of them, are converted server-side.
pub fn value_expression(bundle: &str, key: &str, value: &PropertyValue) -> String {
    let reference = format!("${bundle}.{}", escape_identifier(key));
    match value {
        PropertyValue::Point(_) => format!("point({reference})"),
        PropertyValue::DateTime(_) => format!("datetime({reference})"),
        PropertyValue::Array(items) if !items.is_empty() => {
            if items.iter().all(|item| matches!(item, PropertyValue::Point(_))) {
                format!("[v IN {reference} | point(v)]")
            } else if items.iter().all(|item| matches!(item, PropertyValue::DateTime(_))) {
                format!("[v IN {reference} | datetime(v)]")
            } else {
                reference
            }
        }
        _ => reference,
    }
}

fn is_plain(bundle: &str, key: &str, value: &PropertyValue) -> bool {
    value_expression(bundle, key, value) == format!("${bundle}.{}", escape_identifier(key))
}

/// Quote `name` with backticks unless it is a plain identifier.
pub fn escape_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) => (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// How a filter selects nodes: the `WHERE` clause plus the parameters it needs
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Either empty or ` WHERE ...` (leading space included)
    pub clause: String,
    pub parameters: PropertyMap,
}

impl Selection {
    /// Resolve a filter bag.
    ///
    /// An `_id` key takes precedence over every other key and selects by
    /// engine identity. Otherwise the keys form an equality conjunction
    /// against the `props` bundle; an empty filter selects every node.
    pub fn from_filter(filter: &PropertyMap) -> Self {
        let mut parameters = PropertyMap::new();

        if let Some(id) = filter.get(IDENTITY_KEY) {
            parameters.insert(ID_PARAM.to_string(), id.clone());
            return Self {
                clause: format!(" WHERE ID({NODE}) = ${ID_PARAM}"),
                parameters,
            };
        }

        let conditions = conditions(filter, PROPS);
        parameters.insert(PROPS.to_string(), PropertyValue::Map(filter.clone()));
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {conditions}")
        };
        Self { clause, parameters }
    }

    pub fn by_identity(&self) -> bool {
        self.parameters.contains_key(ID_PARAM)
    }

    /// Whether the selection has no `WHERE` clause and so matches every node
    /// of the label
    pub fn matches_all(&self) -> bool {
        self.clause.is_empty()
    }
}

/// `CREATE (n:L $props) RETURN n`
///
/// When `props` holds points or datetimes, the bundle cannot be used as a
/// property map directly; each key is listed with its converting expression
/// instead: `CREATE (n:L {k1: $props.k1, k2: point($props.k2)}) RETURN n`.
pub fn create(label: &Label, props: &PropertyMap) -> String {
    let label = escape_identifier(label.as_str());
    if props.iter().all(|(key, value)| is_plain(PROPS, key, value)) {
        return format!("CREATE ({NODE}:{label} ${PROPS}) RETURN {NODE}");
    }

    let entries: Vec<String> = props
        .iter()
        .map(|(key, value)| {
            format!("{}: {}", escape_identifier(key), value_expression(PROPS, key, value))
        })
        .collect();
    format!("CREATE ({NODE}:{label} {{{}}}) RETURN {NODE}", entries.join(", "))
}

/// `MATCH (n:L)<where> RETURN n`
pub fn find(label: &Label, selection: &Selection) -> String {
    format!("{} RETURN {NODE}", match_prefix(label, selection))
}

/// `MATCH (n:L)<where> DELETE n`, or `DETACH DELETE n` when `detach` is set
pub fn delete(label: &Label, selection: &Selection, detach: bool) -> String {
    let verb = if detach { "DETACH DELETE" } else { "DELETE" };
    format!("{} {verb} {NODE}", match_prefix(label, selection))
}

/// `MATCH (n:L)<where> SET <assignments> RETURN n`
///
/// No `SET` clause is emitted when `new_props` is empty.
pub fn update(label: &Label, selection: &Selection, new_props: &PropertyMap) -> String {
    let assignments = set_statements(new_props, NEW_PROPS);
    if assignments.is_empty() {
        find(label, selection)
    } else {
        format!("{} SET {assignments} RETURN {NODE}", match_prefix(label, selection))
    }
}

fn match_prefix(label: &Label, selection: &Selection) -> String {
    format!("MATCH ({NODE}:{}){}", escape_identifier(label.as_str()), selection.clause)
}
