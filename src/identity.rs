//! Identity-keyed handles for values without a meaningful `Eq`/`Hash`.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;
use std::rc::Rc;

/// Key that compares by allocation identity rather than by contents.
///
/// Clones of one handle are the same key; two handles created from equal
/// values are different keys.
pub struct IdentityKey<T: ?Sized>(Rc<T>);

impl<T> IdentityKey<T> {
    pub fn new(value: T) -> Self {
        IdentityKey(Rc::new(value))
    }
}

impl<T: ?Sized> IdentityKey<T> {
    pub fn from_rc(rc: Rc<T>) -> Self {
        IdentityKey(rc)
    }

    pub fn as_rc(&self) -> &Rc<T> {
        &self.0
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: ?Sized> Clone for IdentityKey<T> {
    fn clone(&self) -> Self {
        IdentityKey(self.0.clone())
    }
}

impl<T: ?Sized> PartialEq for IdentityKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for IdentityKey<T> {}

impl<T: ?Sized> Hash for IdentityKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> Deref for IdentityKey<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for IdentityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({:#x}, {:?})", self.addr(), &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityKey;
    use std::rc::Rc;

    #[test]
    fn clones_are_equal() {
        let a = IdentityKey::new(String::from("x"));
        assert_eq!(a, a.clone());
    }

    #[test]
    fn equal_contents_are_distinct() {
        let a = IdentityKey::new(String::from("x"));
        let b = IdentityKey::new(String::from("x"));
        assert_ne!(a, b);
        assert_eq!(*a, *b);
    }

    #[test]
    fn from_rc_shares_identity() {
        let rc: Rc<str> = Rc::from("shared");
        let a = IdentityKey::from_rc(rc.clone());
        let b = IdentityKey::from_rc(rc);
        assert_eq!(a, b);
        assert_eq!(&*a, "shared");
    }
}
