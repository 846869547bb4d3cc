//! Opaque per-cell storage owned by the presentation layer
//!
//! The engine carries this slot around with each cell but never looks inside.
//! Callers choose the stored type and must ask for the same type back; a
//! mismatched request simply yields `None`.

use std::any::Any;
use std::fmt;

/// A type-erased slot holding at most one value
#[derive(Default)]
pub struct UserData {
    slot: Option<Box<dyn Any + Send + Sync>>,
}

impl UserData {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing whatever was there
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.slot = Some(Box::new(value));
    }

    /// Borrow the stored value if it is a `T`
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.slot.as_ref()?.downcast_ref::<T>()
    }

    /// Mutably borrow the stored value if it is a `T`
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.slot.as_mut()?.downcast_mut::<T>()
    }

    /// Remove and return the stored value if it is a `T`
    ///
    /// A value of another type is left in place.
    pub fn take<T: Any + Send + Sync>(&mut self) -> Option<T> {
        if !self.holds::<T>() {
            return None;
        }
        let boxed = self.slot.take()?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// Whether any value is stored
    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }

    /// Whether the stored value is a `T`
    pub fn holds<T: Any + Send + Sync>(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|v| v.is::<T>())
    }

    /// Drop the stored value
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserData")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Layout {
        width: f32,
        height: f32,
    }

    #[test]
    fn test_empty_slot() {
        let data = UserData::new();
        assert!(!data.is_set());
        assert!(data.get::<Layout>().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut data = UserData::new();
        data.set(Layout {
            width: 80.0,
            height: 20.0,
        });

        assert!(data.is_set());
        assert!(data.holds::<Layout>());
        assert_eq!(data.get::<Layout>().map(|l| l.width), Some(80.0));

        // Asking for the wrong type is not an error, just nothing
        assert!(data.get::<String>().is_none());
        assert!(!data.holds::<String>());
    }

    #[test]
    fn test_get_mut_and_take() {
        let mut data = UserData::new();
        data.set(Layout {
            width: 80.0,
            height: 20.0,
        });

        if let Some(layout) = data.get_mut::<Layout>() {
            layout.height = 32.0;
        }

        assert!(data.take::<u32>().is_none());
        assert!(data.is_set());

        let layout = data.take::<Layout>().unwrap();
        assert_eq!(layout.height, 32.0);
        assert!(!data.is_set());
    }

    #[test]
    fn test_replace_with_other_type() {
        let mut data = UserData::new();
        data.set(1u8);
        data.set(String::from("editing"));
        assert!(data.get::<u8>().is_none());
        assert_eq!(data.get::<String>().map(String::as_str), Some("editing"));

        data.clear();
        assert!(!data.is_set());
    }
}
