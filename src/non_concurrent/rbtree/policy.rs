//! Ordering policies for [`RBTree`](super::RBTree).
//!
//! A tree is parameterized by an equivalence relation and a strict order
//! over its elements. They must agree: if neither `less(a, b)` nor
//! `less(b, a)` holds then `equivalent(a, b)` must hold. This is not checked.

pub trait Equivalence<T: ?Sized> {
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

pub trait StrictOrder<T: ?Sized> {
    fn less(&self, a: &T, b: &T) -> bool;
}

/// Equivalence through `PartialEq`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualTo;

impl<T: PartialEq + ?Sized> Equivalence<T> for EqualTo {
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Strict order through `PartialOrd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Less;

impl<T: PartialOrd + ?Sized> StrictOrder<T> for Less {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Lets a plain `Fn(&T, &T) -> bool` act as either policy.
#[derive(Debug, Clone, Copy)]
pub struct FnPolicy<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Equivalence<T> for FnPolicy<F> {
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

impl<T: ?Sized, F: Fn(&T, &T) -> bool> StrictOrder<T> for FnPolicy<F> {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_std_traits() {
        assert!(EqualTo.equivalent(&3, &3));
        assert!(!EqualTo.equivalent("a", "b"));
        assert!(Less.less(&1.5, &2.0));
        assert!(!Less.less(&2, &2));
    }

    #[test]
    fn closures_as_policies() {
        let case_insensitive = FnPolicy(|a: &str, b: &str| a.eq_ignore_ascii_case(b));
        let by_len = FnPolicy(|a: &str, b: &str| a.len() < b.len());
        assert!(case_insensitive.equivalent("Key", "kEY"));
        assert!(by_len.less("ab", "abc"));
    }
}
