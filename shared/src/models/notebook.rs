//! Notebook and block models.
//!
//! A notebook is an ordered list of content blocks. Text blocks keep their
//! content directly in `props`; chart and number blocks keep a JSON-encoded
//! [`BlockConfig`] string under `props.config`, which is what the editor
//! persists for embedded metric visualizations.

use super::{Aggregation, Filter, TimeWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Key under which chart and number blocks store their encoded configuration.
pub const CONFIG_PROP: &str = "config";

/// Kind of content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Plain text.
    Paragraph,
    /// Section heading.
    Heading,
    /// Time-series chart of a metric query.
    Chart,
    /// Single scalar value of a metric query.
    Number,
    /// Embedded flow execution summary.
    Flow,
}

impl BlockKind {
    /// Returns true for blocks that embed a metric query.
    #[must_use]
    pub const fn is_metric(&self) -> bool {
        matches!(self, Self::Chart | Self::Number)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paragraph => write!(f, "paragraph"),
            Self::Heading => write!(f, "heading"),
            Self::Chart => write!(f, "chart"),
            Self::Number => write!(f, "number"),
            Self::Flow => write!(f, "flow"),
        }
    }
}

/// Query configuration of a chart or number block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlockConfig {
    /// Selected catalog metric, if one has been picked yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_key: Option<String>,

    /// Label filters.
    #[serde(default)]
    pub filters: Vec<Filter>,

    /// Selected aggregation; the kind default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,

    /// Aggregate over the whole window before aggregating across series.
    #[serde(default)]
    pub agg_over_time: bool,

    /// Labels to group by.
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Window the block displays.
    #[serde(default)]
    pub time_window: TimeWindow,
}

/// Errors that can occur when reading a block's configuration.
#[derive(Debug, Error)]
pub enum BlockConfigError {
    /// The block kind does not carry a query configuration.
    #[error("Block kind '{0}' has no query configuration")]
    NotAMetricBlock(BlockKind),

    /// The `config` prop is present but not a string.
    #[error("Block config must be a JSON-encoded string")]
    NotAString,

    /// The `config` prop could not be decoded.
    #[error("Malformed block config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A single content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier.
    pub id: Uuid,
    /// Block kind.
    pub kind: BlockKind,
    /// Kind-specific properties.
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl Block {
    /// Creates an empty block of the given kind.
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            props: Map::new(),
        }
    }

    /// Creates a paragraph block.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph).with_prop("text", Value::String(text.into()))
    }

    /// Creates a heading block of the given level (1-3).
    #[must_use]
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::new(BlockKind::Heading)
            .with_prop("text", Value::String(text.into()))
            .with_prop("level", Value::from(level.clamp(1, 3)))
    }

    /// Creates a block embedding a flow.
    #[must_use]
    pub fn flow(flow_id: Uuid) -> Self {
        Self::new(BlockKind::Flow).with_prop("flow_id", Value::String(flow_id.to_string()))
    }

    /// Creates a chart or number block with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `BlockConfigError::NotAMetricBlock` if `kind` does not embed a query.
    pub fn metric(kind: BlockKind, config: &BlockConfig) -> Result<Self, BlockConfigError> {
        let mut block = Self::new(kind);
        block.set_config(config)?;
        Ok(block)
    }

    /// Sets a property.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Returns the text of paragraph and heading blocks.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.props.get("text").and_then(Value::as_str)
    }

    /// Decodes the query configuration of a chart or number block.
    ///
    /// Returns `Ok(None)` for a metric block that has not been configured yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not a metric block or its config
    /// prop is not a valid JSON-encoded [`BlockConfig`].
    pub fn config(&self) -> Result<Option<BlockConfig>, BlockConfigError> {
        if !self.kind.is_metric() {
            return Err(BlockConfigError::NotAMetricBlock(self.kind));
        }

        match self.props.get(CONFIG_PROP) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(encoded)) => Ok(Some(serde_json::from_str(encoded)?)),
            Some(_) => Err(BlockConfigError::NotAString),
        }
    }

    /// Encodes and stores the query configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not a metric block.
    pub fn set_config(&mut self, config: &BlockConfig) -> Result<(), BlockConfigError> {
        if !self.kind.is_metric() {
            return Err(BlockConfigError::NotAMetricBlock(self.kind));
        }
        let encoded = serde_json::to_string(config)?;
        self.props
            .insert(CONFIG_PROP.to_string(), Value::String(encoded));
        Ok(())
    }
}

/// A notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Notebook {
    /// Unique identifier.
    pub id: Uuid,

    /// Owning tenant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,

    /// Notebook title.
    #[validate(length(min = 1, max = 200, message = "Notebook title must be 1-200 characters"))]
    pub title: String,

    /// Ordered content blocks.
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Time of the last applied update.
    pub updated_at: DateTime<Utc>,
}

impl Notebook {
    /// Creates an empty notebook.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id: None,
            title: title.into(),
            blocks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a block.
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Finds a block by id.
    #[must_use]
    pub fn block(&self, id: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Applies a partial update and bumps `updated_at`.
    pub fn apply(&mut self, patch: NotebookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(blocks) = patch.blocks {
            self.blocks = blocks;
        }
        self.updated_at = Utc::now();
    }
}

/// A partial notebook update.
///
/// Fields left as `None` are untouched when the patch is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NotebookPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Replacement block list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

impl NotebookPatch {
    /// Creates a patch that renames the notebook.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            blocks: None,
        }
    }

    /// Creates a patch that replaces the block list.
    #[must_use]
    pub fn blocks(blocks: Vec<Block>) -> Self {
        Self {
            title: None,
            blocks: Some(blocks),
        }
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.blocks.is_none()
    }

    /// Folds a later patch into this one; the later value wins per field.
    pub fn merge(&mut self, later: NotebookPatch) {
        if later.title.is_some() {
            self.title = later.title;
        }
        if later.blocks.is_some() {
            self.blocks = later.blocks;
        }
    }
}
