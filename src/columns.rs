use crate::error::{Result, ViewerError};
use crate::record::Field;
use serde::{Deserialize, Serialize};

/// How a column's values are turned into cell content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Plain,
    LongText,
    IssueReference,
    SasReference,
    TxtReference,
}

impl ColumnKind {
    pub fn for_field(field: Field) -> Self {
        match field {
            Field::ArticleContent => ColumnKind::LongText,
            Field::ReferencedInDefects | Field::ReferencedInReqts => ColumnKind::IssueReference,
            Field::ReferencedInSas => ColumnKind::SasReference,
            Field::ReferencedInTxt => ColumnKind::TxtReference,
            _ => ColumnKind::Plain,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub field: Field,
    pub label: String,
    pub visible: bool,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(field: Field, label: &str, visible: bool) -> Self {
        Column {
            field,
            label: label.to_string(),
            visible,
            kind: ColumnKind::for_field(field),
        }
    }
}

/// Ordered table columns. Only [`ColumnConfig::set_visible`] mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    columns: Vec<Column>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            columns: vec![
                Column::new(Field::Article, "Article", true),
                Column::new(Field::ArticleName, "Article Name", true),
                Column::new(Field::ArticleContent, "Article Content", true),
                Column::new(Field::OutOfScope, "Out of Scope", false),
                Column::new(Field::ReferencedInSas, "Referenced In SAS", true),
                Column::new(Field::ReferencedInTxt, "Referenced In TXT", true),
                Column::new(Field::ReferencedInDefects, "Referenced In Defects", true),
                Column::new(Field::ReferencedInReqts, "Referenced In Requirements", true),
            ],
        }
    }
}

impl ColumnConfig {
    pub fn all(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.visible)
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        let column = self
            .columns
            .get_mut(index)
            .ok_or(ViewerError::InvalidColumn(index))?;
        column.visible = visible;
        Ok(())
    }
}
