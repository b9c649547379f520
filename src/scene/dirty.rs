use js_sys::Error;
use serde::{Serialize, Serializer};

/// Tracks mutable access to a value using a dirty flag.
///
/// The flag is raised whenever this type's `DerefMut` impl is invoked and
/// is lowered by `Dirty::clean` once the device has consumed the value.
///
/// Values are initially dirty when created or cloned.
#[derive(Copy, Debug, Default)]
pub struct Dirty<T> {
    is_clean: bool,
    inner: T,
}

impl<T> Dirty<T> {
    pub fn new(inner: T) -> Self {
        Self {
            is_clean: false,
            inner,
        }
    }

    /// Forcibly dirties the value.
    pub fn dirty(this: &mut Self) {
        this.is_clean = false;
    }

    pub fn is_dirty(this: &Self) -> bool {
        !this.is_clean
    }

    /// Marks the value as clean and returns whether it was dirty.
    ///
    /// The `update` callback is invoked only if the value is dirty. If it
    /// fails, the value stays dirty so the next update retries it.
    pub fn clean(
        this: &mut Self,
        update: impl FnOnce(&T) -> Result<(), Error>,
    ) -> Result<bool, Error> {
        if this.is_clean {
            return Ok(false);
        }

        update(&this.inner)?;
        this.is_clean = true;

        Ok(true)
    }
}

impl<T: Clone + PartialEq> Dirty<T> {
    /// Mutates the value, dirtying it only if the mutation changed it.
    pub fn modify(this: &mut Self, callback: impl FnOnce(&mut T)) {
        let mut modified = this.inner.clone();

        callback(&mut modified);

        if this.inner != modified {
            this.inner = modified;
            this.is_clean = false;
        }
    }
}

impl<T: Clone> Clone for Dirty<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<T> std::ops::Deref for Dirty<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> std::ops::DerefMut for Dirty<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.is_clean = false;

        &mut self.inner
    }
}

impl<T: PartialEq> PartialEq for Dirty<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq(&other.inner)
    }
}

impl<T: Serialize> Serialize for Dirty<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(value: &mut Dirty<u32>) -> bool {
        Dirty::clean(value, |_| Ok(())).unwrap()
    }

    #[test]
    fn new_values_are_dirty() {
        let mut value = Dirty::new(1);

        assert!(clean(&mut value));
        assert!(!clean(&mut value));
    }

    #[test]
    fn mutable_access_dirties() {
        let mut value = Dirty::new(1);
        clean(&mut value);

        *value += 1;

        assert!(Dirty::is_dirty(&value));
        assert_eq!(*value, 2);
    }

    #[test]
    fn shared_access_keeps_clean() {
        let mut value = Dirty::new(1);
        clean(&mut value);

        assert_eq!(*value + 1, 2);
        assert!(!Dirty::is_dirty(&value));
    }

    #[test]
    fn modify_without_change_keeps_clean() {
        let mut value = Dirty::new(7);
        clean(&mut value);

        Dirty::modify(&mut value, |v| *v = 7);
        assert!(!Dirty::is_dirty(&value));

        Dirty::modify(&mut value, |v| *v = 8);
        assert!(Dirty::is_dirty(&value));
    }

    #[test]
    fn clones_start_dirty() {
        let mut value = Dirty::new(3);
        clean(&mut value);

        let copy = value.clone();

        assert!(Dirty::is_dirty(&copy));
        assert_eq!(copy, value);
    }
}
