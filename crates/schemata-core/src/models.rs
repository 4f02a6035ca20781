//! Core data models for the content-type catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::defaults;

/// Generic, transport-friendly representation of a projected record.
pub type RecordMap = Map<String, JsonValue>;

// =============================================================================
// BASE CONTENT TYPE
// =============================================================================

/// Coarse classifier of a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BaseContentType {
    /// Matches every base type; never stored on a record.
    #[default]
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "CONTENT")]
    Content,
    #[serde(rename = "WIDGET")]
    Widget,
    #[serde(rename = "FORM")]
    Form,
    #[serde(rename = "FILEASSET")]
    FileAsset,
    #[serde(rename = "HTMLPAGE")]
    HtmlPage,
    #[serde(rename = "PERSONA")]
    Persona,
    #[serde(rename = "VANITY_URL")]
    VanityUrl,
    #[serde(rename = "KEY_VALUE")]
    KeyValue,
    #[serde(rename = "DOTASSET")]
    DotAsset,
}

impl BaseContentType {
    /// Every base type, in code order.
    pub const ALL: [BaseContentType; 10] = [
        Self::Any,
        Self::Content,
        Self::Widget,
        Self::Form,
        Self::FileAsset,
        Self::HtmlPage,
        Self::Persona,
        Self::VanityUrl,
        Self::KeyValue,
        Self::DotAsset,
    ];

    /// Canonical upper-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Content => "CONTENT",
            Self::Widget => "WIDGET",
            Self::Form => "FORM",
            Self::FileAsset => "FILEASSET",
            Self::HtmlPage => "HTMLPAGE",
            Self::Persona => "PERSONA",
            Self::VanityUrl => "VANITY_URL",
            Self::KeyValue => "KEY_VALUE",
            Self::DotAsset => "DOTASSET",
        }
    }

    /// Integer code used in storage.
    pub fn code(&self) -> i32 {
        match self {
            Self::Any => 0,
            Self::Content => 1,
            Self::Widget => 2,
            Self::Form => 3,
            Self::FileAsset => 4,
            Self::HtmlPage => 5,
            Self::Persona => 6,
            Self::VanityUrl => 7,
            Self::KeyValue => 8,
            Self::DotAsset => 9,
        }
    }

    /// Look up a base type by its storage code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Whether this base type places no restriction on a query.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl std::fmt::Display for BaseContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BaseContentType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Invalid base content type: {}", s))
    }
}

// =============================================================================
// ORDER DIRECTION
// =============================================================================

/// Sort direction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for OrderDirection {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Invalid order direction: {}", s)),
        }
    }
}

// =============================================================================
// CONTENT TYPE RECORDS
// =============================================================================

/// A field definition belonging to a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    pub variable: String,
    /// Widget kind, e.g. "text", "date", "binary".
    pub field_type: String,
    /// Storage kind, e.g. "text", "integer", "system".
    pub data_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub listed: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl Field {
    /// Build a text-backed field; the variable is the lower-cased name.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            variable: name.to_lowercase(),
            name,
            field_type: field_type.into(),
            data_type: "text".to_string(),
            required: false,
            indexed: false,
            listed: false,
            sort_order: 0,
        }
    }
}

/// A typed schema definition ("content type").
///
/// `variable` is the case-preserving identifier used to join enrichment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: Uuid,
    pub name: String,
    pub variable: String,
    pub description: Option<String>,
    pub base_type: BaseContentType,
    /// Owning site id.
    pub host: String,
    pub folder: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub default_type: bool,
    pub detail_page: Option<String>,
    pub url_map_pattern: Option<String>,
    pub publish_date_var: Option<String>,
    pub expire_date_var: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub owner: Option<String>,
    pub mod_date: DateTime<Utc>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub metadata: JsonValue,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl ContentType {
    /// Build a minimal content type, mostly useful for fixtures.
    pub fn new(
        name: impl Into<String>,
        variable: impl Into<String>,
        base_type: BaseContentType,
        host: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            variable: variable.into(),
            description: None,
            base_type,
            host: host.into(),
            folder: None,
            icon: None,
            system: false,
            fixed: false,
            default_type: false,
            detail_page: None,
            url_map_pattern: None,
            publish_date_var: None,
            expire_date_var: None,
            sort_order: 0,
            owner: None,
            mod_date: now,
            created: now,
            metadata: JsonValue::Object(Map::new()),
            fields: Vec::new(),
        }
    }

    /// Attach field definitions.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// WORKFLOW
// =============================================================================

/// A named set of workflow steps and actions assignable to a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowScheme {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub default_scheme: bool,
    pub mod_date: DateTime<Utc>,
}

impl WorkflowScheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            archived: false,
            default_scheme: false,
            mod_date: Utc::now(),
        }
    }
}

/// Lifecycle action a workflow action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemAction {
    New,
    Edit,
    Publish,
    Unpublish,
    Archive,
    Unarchive,
    Delete,
    Destroy,
}

impl std::fmt::Display for SystemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Edit => write!(f, "EDIT"),
            Self::Publish => write!(f, "PUBLISH"),
            Self::Unpublish => write!(f, "UNPUBLISH"),
            Self::Archive => write!(f, "ARCHIVE"),
            Self::Unarchive => write!(f, "UNARCHIVE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Destroy => write!(f, "DESTROY"),
        }
    }
}

impl std::str::FromStr for SystemAction {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "EDIT" => Ok(Self::Edit),
            "PUBLISH" => Ok(Self::Publish),
            "UNPUBLISH" => Ok(Self::Unpublish),
            "ARCHIVE" => Ok(Self::Archive),
            "UNARCHIVE" => Ok(Self::Unarchive),
            "DELETE" => Ok(Self::Delete),
            "DESTROY" => Ok(Self::Destroy),
            _ => Err(format!("Invalid system action: {}", s)),
        }
    }
}

/// Binding from a lifecycle action to a workflow action for a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemActionMapping {
    pub identifier: Uuid,
    pub system_action: SystemAction,
    pub workflow_action_id: Uuid,
    /// Variable of the owning content type (or scheme id when not type-owned).
    pub owner: String,
    #[serde(default)]
    pub owner_content_type: bool,
}

impl SystemActionMapping {
    /// Mapping owned by the content type with the given variable.
    pub fn for_content_type(owner: impl Into<String>, system_action: SystemAction) -> Self {
        Self {
            identifier: Uuid::now_v7(),
            system_action,
            workflow_action_id: Uuid::now_v7(),
            owner: owner.into(),
            owner_content_type: true,
        }
    }
}

// =============================================================================
// PRINCIPAL
// =============================================================================

/// The identity a catalog call runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// An authenticated user with a whitespace-separated scope list.
    User { user_id: String, scope: String },
    /// The built-in system identity; bypasses visibility restrictions.
    System { user_id: String },
    Anonymous,
}

impl Principal {
    pub fn user(user_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            scope: scope.into(),
        }
    }

    /// System principal with the default system user id.
    pub fn system() -> Self {
        Self::system_as(defaults::SYSTEM_USER_ID)
    }

    /// System principal with an explicit user id.
    pub fn system_as(user_id: impl Into<String>) -> Self {
        Self::System {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::User { user_id, .. } | Self::System { user_id } => user_id,
            Self::Anonymous => "anonymous",
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    /// Check if the principal has the required scope.
    ///
    /// Scope hierarchy: admin > write > read. The system principal holds
    /// every scope; anonymous holds none.
    pub fn has_scope(&self, required: &str) -> bool {
        let scope = match self {
            Self::System { .. } => return true,
            Self::Anonymous => return false,
            Self::User { scope, .. } => scope,
        };

        scope.split_whitespace().any(|granted| match granted {
            "admin" => true,
            "write" => required == "read" || required == "write",
            other => other == required,
        })
    }
}

// =============================================================================
// PAGE REQUEST
// =============================================================================

/// Open mapping of optional query parameters.
///
/// Recognized keys: `types`, `sites`, `type`, `host`. Values of the wrong
/// shape are treated as absent rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraParams(Map<String, JsonValue>);

impl ExtraParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty list under `key`, or `None` when absent, empty, or not a list.
    ///
    /// Every element is kept so the list length matches the raw array; a
    /// null element becomes a blank entry.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.0.get(key)?.as_array()?;
        if items.is_empty() {
            return None;
        }
        let list = items
            .iter()
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                JsonValue::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        Some(list)
    }

    /// Explicit content type identifiers (`types`).
    pub fn types(&self) -> Option<Vec<String>> {
        self.string_list(defaults::TYPES_PARAM)
    }

    /// Site ids to search across (`sites`).
    pub fn sites(&self) -> Option<Vec<String>> {
        self.string_list(defaults::SITES_PARAM)
    }

    /// Raw base type token (`type`), rendered as text; `"ANY"` when absent.
    ///
    /// Lists render bracketed (`["FORM"]` becomes `[FORM]`); brackets are
    /// stripped during base type resolution.
    pub fn type_token(&self) -> String {
        self.0
            .get(defaults::TYPE_PARAM)
            .and_then(render_text)
            .unwrap_or_else(|| defaults::BASE_TYPE_ANY.to_string())
    }

    /// Single site id (`host`); blank when absent.
    pub fn host(&self) -> String {
        self.0
            .get(defaults::HOST_PARAM)
            .and_then(render_text)
            .unwrap_or_default()
    }
}

impl From<Map<String, JsonValue>> for ExtraParams {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

fn render_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(items) => {
            let inner: Vec<String> = items
                .iter()
                .map(|v| render_text(v).unwrap_or_else(|| "null".to_string()))
                .collect();
            Some(format!("[{}]", inner.join(", ")))
        }
        other => Some(other.to_string()),
    }
}

/// One page request against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Substring filter; empty matches everything.
    pub filter: String,
    pub limit: i64,
    pub offset: i64,
    /// Raw sort expression, normalized before use.
    pub order_by: Option<String>,
    pub direction: Option<OrderDirection>,
    pub extra: ExtraParams,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            filter: String::new(),
            limit: defaults::PAGE_LIMIT,
            offset: defaults::PAGE_OFFSET,
            order_by: None,
            direction: None,
            extra: ExtraParams::default(),
        }
    }
}

impl PageRequest {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn direction(mut self, direction: OrderDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_extra(mut self, extra: ExtraParams) -> Self {
        self.extra = extra;
        self
    }

    /// Add a single extra parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key, value);
        self
    }
}

// =============================================================================
// PAGE RESULT
// =============================================================================

/// Entry-count annotation: a looked-up count, or "could not look up".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCount {
    Count(i64),
    Unavailable,
}

impl From<EntryCount> for JsonValue {
    fn from(count: EntryCount) -> Self {
        match count {
            EntryCount::Count(n) => JsonValue::from(n),
            EntryCount::Unavailable => JsonValue::from(defaults::ENTRY_COUNT_UNAVAILABLE),
        }
    }
}

impl Serialize for EntryCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            EntryCount::Count(n) => serializer.serialize_i64(*n),
            EntryCount::Unavailable => serializer.serialize_str(defaults::ENTRY_COUNT_UNAVAILABLE),
        }
    }
}

/// A page of projected, enriched content types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypePage {
    pub items: Vec<RecordMap>,
    /// Size of the selected strategy's universe, independent of the window.
    pub total_results: i64,
    pub limit: i64,
    pub offset: i64,
}

impl ContentTypePage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether records remain past this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total_results
    }

    /// Variables of the records on this page, in page order.
    pub fn variables(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|m| m.get(defaults::VARIABLE_KEY).and_then(JsonValue::as_str))
            .collect()
    }
}
