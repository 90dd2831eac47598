use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Group, GroupFilter, GroupStatus, Section, SectionData, Template};
use crate::utils::now_millis;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write store file: {0}")]
    WriteError(#[from] std::io::Error),
    #[error("Failed to serialize store state: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("Failed to create store directory: {0}")]
    DirectoryError(String),
}

/// Full persisted state: one JSON document holding every template and group.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct State {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Owns all templates and groups and persists them as a single JSON blob.
///
/// Every mutating operation writes the full state back to disk before
/// returning (write-through, no batching). Unknown ids are signalled with
/// `None`, never with an error; `StoreError` is reserved for persistence
/// faults.
pub struct Store {
    path: PathBuf,
    state: State,
}

impl Store {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// Missing or unparsable data degrades to the empty state rather than
    /// failing: a corrupt file is treated the same as no file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let state = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => State::default(),
        };

        Ok(Store { path, state })
    }

    /// Serialize the full state and write it to disk.
    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    // --- Template operations ---

    /// Get all templates in insertion order.
    pub fn get_templates(&self) -> &[Template] {
        &self.state.templates
    }

    /// Get a single template by id.
    pub fn get_template(&self, id: &str) -> Option<&Template> {
        self.state.templates.iter().find(|t| t.id == id)
    }

    /// Create a template with fresh ids for itself and each section.
    pub fn create_template(
        &mut self,
        title: String,
        sections: Vec<SectionData>,
    ) -> Result<Template, StoreError> {
        let template = Template::new(title, sections);
        self.state.templates.push(template.clone());
        self.save()?;
        Ok(template)
    }

    /// Replace a template's title and/or sections wholesale.
    ///
    /// Section ids are regenerated on replacement. Only `updated_at` is
    /// bumped; `created_at` stays. Returns `None` if the id is unknown.
    pub fn update_template(
        &mut self,
        id: &str,
        title: Option<String>,
        sections: Option<Vec<SectionData>>,
    ) -> Result<Option<Template>, StoreError> {
        let Some(template) = self.state.templates.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = title {
            template.title = title;
        }
        if let Some(sections) = sections {
            template.sections = sections.into_iter().map(Section::from_data).collect();
            // A rewritten template is current-shape only from here on.
            template.items.clear();
        }
        template.updated_at = now_millis();

        let updated = template.clone();
        self.save()?;
        Ok(Some(updated))
    }

    /// Delete a template by id. No-op if absent. Groups already
    /// instantiated from it are left untouched.
    pub fn delete_template(&mut self, id: &str) -> Result<(), StoreError> {
        self.state.templates.retain(|t| t.id != id);
        self.save()
    }

    /// Deep-copy a template under a decorated title. Ids are stripped and
    /// regenerated; a legacy flat-item source gets one "General" section.
    /// Returns `None` if the source is unknown.
    pub fn duplicate_template(&mut self, id: &str) -> Result<Option<Template>, StoreError> {
        let Some(source) = self.get_template(id) else {
            return Ok(None);
        };
        let title = format!("{} (copy)", source.title);
        let sections = source.section_data();
        self.create_template(title, sections).map(Some)
    }

    // --- Group operations ---

    /// Get groups matching the filter, in insertion order.
    pub fn get_groups(&self, filter: GroupFilter) -> Vec<&Group> {
        self.state
            .groups
            .iter()
            .filter(|g| filter.matches(g.status))
            .collect()
    }

    /// Get a single group by id.
    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.state.groups.iter().find(|g| g.id == id)
    }

    /// Instantiate a template into a new active group.
    ///
    /// The group is a structural deep copy: fresh ids for every section and
    /// item, `completed=false` everywhere, `template_id` recording the
    /// origin. Returns `None` if the template is unknown.
    pub fn create_group_from_template(
        &mut self,
        template_id: &str,
    ) -> Result<Option<Group>, StoreError> {
        let Some(template) = self.get_template(template_id) else {
            return Ok(None);
        };
        let group = Group::from_template(template);
        self.state.groups.push(group.clone());
        self.save()?;
        Ok(Some(group))
    }

    /// Create an ad hoc group not tied to any template.
    pub fn create_group(
        &mut self,
        title: String,
        sections: Vec<SectionData>,
    ) -> Result<Group, StoreError> {
        let group = Group::new(title, None, sections);
        self.state.groups.push(group.clone());
        self.save()?;
        Ok(group)
    }

    /// Flip the completion flag of one item in a group.
    ///
    /// Sectioned items are searched first, then legacy flat items. Returns
    /// `None` if the group or the item is unknown.
    pub fn toggle_todo(
        &mut self,
        group_id: &str,
        item_id: &str,
    ) -> Result<Option<Group>, StoreError> {
        let Some(group) = self.state.groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(None);
        };

        let Some(todo) = group.todos_mut().find(|t| t.id == item_id) else {
            return Ok(None);
        };
        todo.completed = !todo.completed;
        group.updated_at = now_millis();

        let updated = group.clone();
        self.save()?;
        Ok(Some(updated))
    }

    /// True iff the group exists, has at least one item, and every item is
    /// completed. The trigger condition for auto-archival; the store never
    /// archives on its own.
    pub fn all_completed(&self, group_id: &str) -> bool {
        self.get_group(group_id)
            .map(Group::all_completed)
            .unwrap_or(false)
    }

    /// Archive a group. Returns `None` if the id is unknown.
    pub fn archive_group(&mut self, id: &str) -> Result<Option<Group>, StoreError> {
        self.set_group_status(id, GroupStatus::Archived)
    }

    /// Move an archived group back to active. Returns `None` if unknown.
    pub fn unarchive_group(&mut self, id: &str) -> Result<Option<Group>, StoreError> {
        self.set_group_status(id, GroupStatus::Active)
    }

    fn set_group_status(
        &mut self,
        id: &str,
        status: GroupStatus,
    ) -> Result<Option<Group>, StoreError> {
        let Some(group) = self.state.groups.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        group.status = status;
        group.updated_at = now_millis();

        let updated = group.clone();
        self.save()?;
        Ok(Some(updated))
    }

    /// Delete a group by id. No-op if absent.
    pub fn delete_group(&mut self, id: &str) -> Result<(), StoreError> {
        self.state.groups.retain(|g| g.id != id);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LEGACY_SECTION_TITLE;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.json")).unwrap();
        (dir, store)
    }

    fn packing_sections() -> Vec<SectionData> {
        vec![SectionData::new(
            "Clothes",
            vec!["Shirt".to_string(), "Pants".to_string()],
        )]
    }

    #[test]
    fn create_template_assigns_unique_ids() {
        let (_dir, mut store) = temp_store();
        let a = store
            .create_template("A".to_string(), packing_sections())
            .unwrap();
        let b = store
            .create_template("B".to_string(), packing_sections())
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(
            store
                .get_templates()
                .iter()
                .filter(|t| t.id == a.id)
                .count(),
            1
        );
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn update_template_replaces_sections_and_bumps_updated_at_only() {
        let (_dir, mut store) = temp_store();
        let created = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();

        let updated = store
            .update_template(
                &created.id,
                Some("Packing v2".to_string()),
                Some(vec![SectionData::new("Gear", vec!["Tent".to_string()])]),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Packing v2");
        assert_eq!(updated.sections.len(), 1);
        assert_eq!(updated.sections[0].title, "Gear");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_template_unknown_id_returns_none() {
        let (_dir, mut store) = temp_store();
        let result = store.update_template("missing", None, None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn duplicate_template_deep_copies_with_copy_suffix() {
        let (_dir, mut store) = temp_store();
        let source = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();

        let copy = store.duplicate_template(&source.id).unwrap().unwrap();

        assert_eq!(copy.title, "Packing (copy)");
        assert_ne!(copy.id, source.id);
        assert_ne!(copy.sections[0].id, source.sections[0].id);
        assert_eq!(copy.sections[0].items[0].text, "Shirt");
        assert!(store.duplicate_template("missing").unwrap().is_none());
    }

    #[test]
    fn instantiation_is_a_deep_copy() {
        let (_dir, mut store) = temp_store();
        let template = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();

        let mut group = store
            .create_group_from_template(&template.id)
            .unwrap()
            .unwrap();

        assert_eq!(group.template_id.as_deref(), Some(template.id.as_str()));
        assert_eq!(group.status, GroupStatus::Active);
        assert_eq!(group.sections.len(), 1);
        assert_eq!(group.sections[0].items.len(), 2);
        assert!(group.todos().all(|t| !t.completed));

        // Mutating the returned group must not reach back into the template.
        group.sections[0].items[0].text = "Hat".to_string();
        let template = store.get_template(&template.id).unwrap();
        assert_eq!(template.sections[0].items[0].text, "Shirt");
    }

    #[test]
    fn toggle_is_idempotent_and_advances_updated_at() {
        let (_dir, mut store) = temp_store();
        let template = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();
        let group = store
            .create_group_from_template(&template.id)
            .unwrap()
            .unwrap();
        let item_id = group.sections[0].items[0].id.clone();

        let once = store.toggle_todo(&group.id, &item_id).unwrap().unwrap();
        assert!(once.sections[0].items[0].completed);
        assert!(once.updated_at >= group.updated_at);

        let twice = store.toggle_todo(&group.id, &item_id).unwrap().unwrap();
        assert!(!twice.sections[0].items[0].completed);
        assert!(twice.updated_at >= once.updated_at);
    }

    #[test]
    fn toggle_unknown_group_or_item_returns_none() {
        let (_dir, mut store) = temp_store();
        let group = store
            .create_group("Ad hoc".to_string(), packing_sections())
            .unwrap();

        assert!(store.toggle_todo("missing", "x").unwrap().is_none());
        assert!(store.toggle_todo(&group.id, "missing").unwrap().is_none());
    }

    #[test]
    fn completion_archive_scenario() {
        let (_dir, mut store) = temp_store();
        let template = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();
        let group = store
            .create_group_from_template(&template.id)
            .unwrap()
            .unwrap();

        assert!(!store.all_completed(&group.id));

        let item_ids: Vec<String> = group.todos().map(|t| t.id.clone()).collect();
        for id in &item_ids {
            store.toggle_todo(&group.id, id).unwrap().unwrap();
        }
        assert!(store.all_completed(&group.id));

        let archived = store.archive_group(&group.id).unwrap().unwrap();
        assert_eq!(archived.status, GroupStatus::Archived);

        assert!(
            store
                .get_groups(GroupFilter::Active)
                .iter()
                .all(|g| g.id != group.id)
        );
        assert!(
            store
                .get_groups(GroupFilter::Archived)
                .iter()
                .any(|g| g.id == group.id)
        );
        assert_eq!(store.get_groups(GroupFilter::All).len(), 1);

        let unarchived = store.unarchive_group(&group.id).unwrap().unwrap();
        assert_eq!(unarchived.status, GroupStatus::Active);
    }

    #[test]
    fn all_completed_is_false_for_missing_or_empty_groups() {
        let (_dir, mut store) = temp_store();
        assert!(!store.all_completed("missing"));

        let empty = store.create_group("Empty".to_string(), Vec::new()).unwrap();
        assert!(!store.all_completed(&empty.id));
    }

    #[test]
    fn delete_template_does_not_cascade_to_groups() {
        let (_dir, mut store) = temp_store();
        let template = store
            .create_template("Packing".to_string(), packing_sections())
            .unwrap();
        let group = store
            .create_group_from_template(&template.id)
            .unwrap()
            .unwrap();

        store.delete_template(&template.id).unwrap();

        assert!(store.get_template(&template.id).is_none());
        let survivor = store.get_group(&group.id).unwrap();
        assert_eq!(survivor.template_id.as_deref(), Some(template.id.as_str()));
        assert_eq!(survivor.sections[0].items.len(), 2);
    }

    #[test]
    fn deletes_are_noops_for_unknown_ids() {
        let (_dir, mut store) = temp_store();
        store.delete_template("missing").unwrap();
        store.delete_group("missing").unwrap();
        assert!(store.get_templates().is_empty());
        assert!(store.get_groups(GroupFilter::All).is_empty());
    }

    #[test]
    fn reload_round_trips_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let (template_id, group_id);
        {
            let mut store = Store::open(&path).unwrap();
            let template = store
                .create_template("Packing".to_string(), packing_sections())
                .unwrap();
            let group = store
                .create_group_from_template(&template.id)
                .unwrap()
                .unwrap();
            template_id = template.id;
            group_id = group.id;
        }

        let store = Store::open(&path).unwrap();
        let template = store.get_template(&template_id).unwrap();
        assert_eq!(template.title, "Packing");
        assert_eq!(template.sections[0].items.len(), 2);

        let group = store.get_group(&group_id).unwrap();
        assert_eq!(group.status, GroupStatus::Active);
        assert_eq!(group.todos().count(), 2);
    }

    #[test]
    fn corrupt_store_file_degrades_to_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json at all {{{").unwrap();

        let store = Store::open(&path).unwrap();
        assert!(store.get_templates().is_empty());
        assert!(store.get_groups(GroupFilter::All).is_empty());
    }

    #[test]
    fn legacy_template_instantiates_with_synthesized_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{
                "templates": [{
                    "id": "tpl-legacy",
                    "title": "Groceries",
                    "items": [{"text": "Milk"}, {"text": "Eggs"}],
                    "createdAt": 1000,
                    "updatedAt": 1000
                }],
                "groups": []
            }"#,
        )
        .unwrap();

        let mut store = Store::open(&path).unwrap();
        let group = store
            .create_group_from_template("tpl-legacy")
            .unwrap()
            .unwrap();

        assert_eq!(group.sections.len(), 1);
        assert_eq!(group.sections[0].title, LEGACY_SECTION_TITLE);
        let texts: Vec<&str> = group.todos().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Milk", "Eggs"]);
        assert!(group.todos().all(|t| !t.completed));
    }

    #[test]
    fn legacy_template_duplicates_into_sectioned_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{
                "templates": [{
                    "id": "tpl-legacy",
                    "title": "Groceries",
                    "items": [{"text": "Milk"}],
                    "createdAt": 1000,
                    "updatedAt": 1000
                }],
                "groups": []
            }"#,
        )
        .unwrap();

        let mut store = Store::open(&path).unwrap();
        let copy = store.duplicate_template("tpl-legacy").unwrap().unwrap();

        assert_eq!(copy.title, "Groceries (copy)");
        assert_eq!(copy.sections.len(), 1);
        assert_eq!(copy.sections[0].title, LEGACY_SECTION_TITLE);
        assert_eq!(copy.sections[0].items[0].text, "Milk");
        assert!(copy.items.is_empty());
    }

    #[test]
    fn legacy_group_toggles_through_flat_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{
                "templates": [],
                "groups": [{
                    "id": "grp-legacy",
                    "templateId": null,
                    "status": "active",
                    "title": "Old list",
                    "items": [{"id": "i1", "text": "One", "completed": false}],
                    "createdAt": 1000,
                    "updatedAt": 1000
                }]
            }"#,
        )
        .unwrap();

        let mut store = Store::open(&path).unwrap();
        let toggled = store.toggle_todo("grp-legacy", "i1").unwrap().unwrap();
        assert!(toggled.items[0].completed);
        assert!(store.all_completed("grp-legacy"));

        // Legacy shape must survive the write-through save.
        let reloaded = Store::open(&path).unwrap();
        let group = reloaded.get_group("grp-legacy").unwrap();
        assert_eq!(group.items.len(), 1);
        assert!(group.items[0].completed);
    }
}
