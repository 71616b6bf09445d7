//! The ordered table of resource slots mirrored from the target.
//!
//! Slot `i` lives at `base + i * 4` in the target, so the order of names is
//! significant. Categories only group slots for display.

use std::collections::HashMap;

mod cultures;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlotTableError {
    #[error("slot {name:?} is listed more than once")]
    DuplicateSlot { name: String },
    #[error("unknown slot {name:?}")]
    UnknownSlot { name: String },
    #[error("slot {name:?} appears in {count} categories")]
    MultipleCategories { name: String, count: usize },
    #[error("slot {name:?} is not in any category")]
    Uncategorized { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub slots: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct SlotTable {
    names: Vec<String>,
    indexes: HashMap<String, usize>,
    categories: Vec<Category>,
}

impl SlotTable {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, SlotTableError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut indexes = HashMap::with_capacity(names.len());

        for (index, name) in names.iter().enumerate() {
            if indexes.insert(name.clone(), index).is_some() {
                return Err(SlotTableError::DuplicateSlot { name: name.clone() });
            }
        }

        Ok(Self { names, indexes, categories: Vec::new() })
    }

    /// Adds a display category made of already known slot names.
    pub fn with_category<S: AsRef<str>>(
        mut self,
        name: &str,
        members: impl IntoIterator<Item = S>,
    ) -> Result<Self, SlotTableError> {
        let slots = members.into_iter()
            .map(|member| self.index_of(member.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        self.categories.push(Category { name: name.to_string(), slots });
        Ok(self)
    }

    /// The slot table of Cultures, 49 goods in storage order.
    pub fn cultures() -> Self {
        cultures::table()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Result<usize, SlotTableError> {
        self.indexes.get(name)
            .copied()
            .ok_or_else(|| SlotTableError::UnknownSlot { name: name.to_string() })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Checks that every slot belongs to exactly one category.
    pub fn validate_categories(&self) -> Result<(), SlotTableError> {
        let mut counts = vec![0usize; self.names.len()];
        for category in &self.categories {
            for index in &category.slots {
                counts[*index] += 1;
            }
        }

        for (index, count) in counts.into_iter().enumerate() {
            let name = self.names[index].clone();
            match count {
                0 => return Err(SlotTableError::Uncategorized { name }),
                1 => {}
                count => return Err(SlotTableError::MultipleCategories { name, count }),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{SlotTable, SlotTableError};

    #[test]
    fn indexes_follow_the_name_order() {
        let table = SlotTable::new(["Food", "Cake", "Mead"]).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of("Food").unwrap(), 0);
        assert_eq!(table.index_of("Mead").unwrap(), 2);
        assert_eq!(table.name(1), Some("Cake"));
        assert_eq!(table.name(3), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = SlotTable::new(["Food", "Food"]);

        assert_eq!(result.unwrap_err(), SlotTableError::DuplicateSlot { name: "Food".to_string() });
    }

    #[test]
    fn unknown_names_are_reported() {
        let table = SlotTable::new(["Food"]).unwrap();

        assert_eq!(table.index_of("Gold"), Err(SlotTableError::UnknownSlot { name: "Gold".to_string() }));
        assert!(table.with_category("Treasure", ["Gold"]).is_err());
    }

    #[test]
    fn categories_must_cover_each_slot_once() {
        let table = SlotTable::new(["Food", "Cake", "Mead"]).unwrap()
            .with_category("Meals", ["Food", "Cake"]).unwrap();
        assert_eq!(table.validate_categories(), Err(SlotTableError::Uncategorized { name: "Mead".to_string() }));

        let table = table.with_category("Drinks", ["Mead", "Cake"]).unwrap();
        assert_eq!(
            table.validate_categories(),
            Err(SlotTableError::MultipleCategories { name: "Cake".to_string(), count: 2 })
        );
    }

    #[test]
    fn the_cultures_table_is_complete() {
        let table = SlotTable::cultures();

        assert_eq!(table.len(), 49);
        assert_eq!(table.categories().len(), 6);
        assert_eq!(table.validate_categories(), Ok(()));
        for (index, name) in table.names().iter().enumerate() {
            assert_eq!(table.index_of(name).unwrap(), index);
        }
    }

    #[test]
    fn the_cultures_table_keeps_the_storage_order() {
        let table = SlotTable::cultures();

        assert_eq!(table.index_of("Nahrung").unwrap(), 0);
        assert_eq!(table.index_of("Holz").unwrap(), 7);
        assert_eq!(table.index_of("Windamulett").unwrap(), 48);
    }
}
