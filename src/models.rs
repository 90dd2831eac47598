use serde::{Deserialize, Serialize};

use crate::utils::{new_id, now_millis};

/// A reusable checklist blueprint: ordered sections of item texts.
///
/// Templates are not actionable, so their items carry no id and no
/// completion flag. Older data files stored a flat `items` list instead of
/// `sections`; that shape is still accepted on read and projected through
/// `section_data()` so no other code has to branch on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Legacy flat shape. Read-compatible forever, never written for new
    /// records (empty lists are omitted on serialization).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TemplateItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<TemplateItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateItem {
    pub text: String,
}

/// Plain section content without identity: the input to template/group
/// creation and the output of the legacy-shape projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionData {
    pub title: String,
    pub items: Vec<String>,
}

impl SectionData {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Title given to the single section synthesized from legacy flat items.
pub const LEGACY_SECTION_TITLE: &str = "General";

impl Template {
    pub fn new(title: String, sections: Vec<SectionData>) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            title,
            sections: sections.into_iter().map(Section::from_data).collect(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Project this template into plain section data, regardless of shape.
    ///
    /// A legacy flat-item template yields one synthesized "General" section.
    pub fn section_data(&self) -> Vec<SectionData> {
        if !self.sections.is_empty() {
            return self
                .sections
                .iter()
                .map(|s| {
                    SectionData::new(
                        s.title.clone(),
                        s.items.iter().map(|i| i.text.clone()).collect(),
                    )
                })
                .collect();
        }
        if self.items.is_empty() {
            return Vec::new();
        }
        vec![SectionData::new(
            LEGACY_SECTION_TITLE,
            self.items.iter().map(|i| i.text.clone()).collect(),
        )]
    }
}

impl Section {
    pub fn from_data(data: SectionData) -> Self {
        Self {
            id: new_id(),
            title: data.title,
            items: data
                .items
                .into_iter()
                .map(|text| TemplateItem { text })
                .collect(),
        }
    }
}

/// Lifecycle status of a group. Transitions only active <-> archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Active,
    Archived,
}

/// Query filter for listing groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    Active,
    Archived,
}

impl GroupFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn matches(self, status: GroupStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == GroupStatus::Active,
            Self::Archived => status == GroupStatus::Archived,
        }
    }
}

/// An actionable checklist instantiated from a template (or created ad hoc).
///
/// Group content is a deep copy made at creation: `template_id` records the
/// origin but is never kept in sync with later template edits or deletion.
/// Legacy flat `items` are tolerated the same way as on templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub template_id: Option<String>,
    pub status: GroupStatus,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<GroupSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TodoItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<TodoItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Group {
    pub fn new(title: String, template_id: Option<String>, sections: Vec<SectionData>) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            template_id,
            status: GroupStatus::Active,
            title,
            sections: sections.into_iter().map(GroupSection::from_data).collect(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Instantiate a template into a fresh active group. Every section and
    /// item gets a new id; completion starts at false.
    pub fn from_template(template: &Template) -> Self {
        Self::new(
            template.title.clone(),
            Some(template.id.clone()),
            template.section_data(),
        )
    }

    /// Iterate all items across sections, then any legacy flat items.
    pub fn todos(&self) -> impl Iterator<Item = &TodoItem> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .chain(self.items.iter())
    }

    pub fn todos_mut(&mut self) -> impl Iterator<Item = &mut TodoItem> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.items.iter_mut())
            .chain(self.items.iter_mut())
    }

    /// True iff the group has at least one item and every item is completed.
    /// A group with no items (or only empty sections) is never complete.
    pub fn all_completed(&self) -> bool {
        let mut any = false;
        for todo in self.todos() {
            if !todo.completed {
                return false;
            }
            any = true;
        }
        any
    }
}

impl GroupSection {
    pub fn from_data(data: SectionData) -> Self {
        Self {
            id: new_id(),
            title: data.title,
            items: data
                .items
                .into_iter()
                .map(|text| TodoItem {
                    id: new_id(),
                    text,
                    completed: false,
                })
                .collect(),
        }
    }
}
